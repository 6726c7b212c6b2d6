//! Element selectors.
//!
//! A [`Selector`] compiles to a JavaScript expression that evaluates to the
//! array of matching elements. Drivers build every element operation on top
//! of that array, so the browser and the scripted driver agree on what a
//! selector means. `Display` yields a stable key used in logs, errors and the
//! scripted driver's element table.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Selector for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// Test ID selector (`data-testid` attribute)
    TestId(String),
    /// Innermost element whose text contains the string
    Text(String),
    /// CSS selector filtered by contained text
    CssWithText {
        /// Base CSS selector
        css: String,
        /// Text content to match
        text: String,
    },
    /// ARIA role with optional accessible name
    Role {
        /// Role name (button, link, heading, textbox, checkbox)
        role: String,
        /// Accessible name substring
        name: Option<String>,
    },
    /// Form control labelled by the given text
    Label(String),
    /// Input with the given placeholder
    Placeholder(String),
    /// The `index`th match of `inner`
    Nth {
        /// Base selector
        inner: Box<Selector>,
        /// Zero-based index
        index: usize,
    },
    /// The first match of the inner selector
    First(Box<Selector>),
}

impl Selector {
    /// Create a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create a test ID selector
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::TestId(id.into())
    }

    /// Create a text selector
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// CSS selector whose matches must contain `text`
    #[must_use]
    pub fn css_with_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::CssWithText {
            css: css.into(),
            text: text.into(),
        }
    }

    /// Role selector
    #[must_use]
    pub fn role(role: impl Into<String>, name: Option<&str>) -> Self {
        Self::Role {
            role: role.into(),
            name: name.map(str::to_string),
        }
    }

    /// Label selector
    #[must_use]
    pub fn label(text: impl Into<String>) -> Self {
        Self::Label(text.into())
    }

    /// Placeholder selector
    #[must_use]
    pub fn placeholder(text: impl Into<String>) -> Self {
        Self::Placeholder(text.into())
    }

    /// Narrow to the `index`th match
    #[must_use]
    pub fn nth(self, index: usize) -> Self {
        Self::Nth {
            inner: Box::new(self),
            index,
        }
    }

    /// Narrow to the first match
    #[must_use]
    pub fn first(self) -> Self {
        Self::First(Box::new(self))
    }

    /// Expression evaluating to the array of matching elements
    #[must_use]
    pub fn to_all_query(&self) -> String {
        match self {
            Self::Css(s) => format!("Array.from(document.querySelectorAll({s:?}))"),
            Self::TestId(id) => {
                let css = format!("[data-testid=\"{id}\"]");
                format!("Array.from(document.querySelectorAll({css:?}))")
            }
            Self::Text(t) => format!(
                "Array.from(document.querySelectorAll('body *')).filter(el => \
                 el.textContent.includes({t:?}) && \
                 !Array.from(el.children).some(c => c.textContent.includes({t:?})))"
            ),
            Self::CssWithText { css, text } => format!(
                "Array.from(document.querySelectorAll({css:?})).filter(el => el.textContent.includes({text:?}))"
            ),
            Self::Role { role, name } => {
                let css = role_css(role);
                let base = format!("Array.from(document.querySelectorAll({css:?}))");
                match name {
                    Some(n) => format!(
                        "{base}.filter(el => ((el.getAttribute('aria-label') || el.textContent || el.value || '')).includes({n:?}))"
                    ),
                    None => base,
                }
            }
            Self::Label(t) => format!(
                "Array.from(document.querySelectorAll('label')).filter(l => l.textContent.includes({t:?}))\
                 .map(l => l.control || (l.htmlFor ? document.getElementById(l.htmlFor) : null))\
                 .concat(Array.from(document.querySelectorAll('[aria-label]')).filter(el => el.getAttribute('aria-label').includes({t:?})))\
                 .filter(Boolean)"
            ),
            Self::Placeholder(t) => format!(
                "Array.from(document.querySelectorAll('[placeholder]')).filter(el => el.getAttribute('placeholder').includes({t:?}))"
            ),
            Self::Nth { inner, index } => {
                format!("(({}).slice({index}, {}))", inner.to_all_query(), index + 1)
            }
            Self::First(inner) => format!("(({}).slice(0, 1))", inner.to_all_query()),
        }
    }

    /// Expression evaluating to the first match or `null`
    #[must_use]
    pub fn to_query(&self) -> String {
        format!("(({})[0] || null)", self.to_all_query())
    }

    /// Expression evaluating to the number of matches
    #[must_use]
    pub fn to_count_query(&self) -> String {
        format!("(({}).length)", self.to_all_query())
    }

    /// Expression evaluating to whether the first match is rendered
    #[must_use]
    pub fn to_visible_query(&self) -> String {
        format!(
            "(() => {{ const el = {}; if (!el) return false; \
             const style = window.getComputedStyle(el); \
             if (style.visibility === 'hidden' || style.display === 'none') return false; \
             const r = el.getBoundingClientRect(); return r.width > 0 && r.height > 0; }})()",
            self.to_query()
        )
    }
}

fn role_css(role: &str) -> String {
    let implicit = match role {
        "button" => "button, input[type=\"submit\"], input[type=\"button\"]",
        "link" => "a[href]",
        "heading" => "h1, h2, h3, h4, h5, h6",
        "textbox" => "input:not([type]), input[type=\"text\"], input[type=\"email\"], textarea",
        "checkbox" => "input[type=\"checkbox\"]",
        "combobox" => "select",
        _ => "",
    };
    if implicit.is_empty() {
        format!("[role=\"{role}\"]")
    } else {
        format!("{implicit}, [role=\"{role}\"]")
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(s) => write!(f, "css={s}"),
            Self::TestId(id) => write!(f, "testid={id}"),
            Self::Text(t) => write!(f, "text={t}"),
            Self::CssWithText { css, text } => write!(f, "css={css} >> text={text}"),
            Self::Role { role, name: Some(n) } => write!(f, "role={role}[name={n}]"),
            Self::Role { role, name: None } => write!(f, "role={role}"),
            Self::Label(t) => write!(f, "label={t}"),
            Self::Placeholder(t) => write!(f, "placeholder={t}"),
            Self::Nth { inner, index } => write!(f, "{inner} >> nth={index}"),
            Self::First(inner) => write!(f, "{inner} >> nth=0"),
        }
    }
}

impl From<&str> for Selector {
    fn from(css: &str) -> Self {
        Self::css(css)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod display_tests {
        use super::*;

        #[test]
        fn test_css_key() {
            assert_eq!(Selector::css("#slider-carousel").to_string(), "css=#slider-carousel");
        }

        #[test]
        fn test_css_with_text_key() {
            let s = Selector::css_with_text("li", "Logged in as");
            assert_eq!(s.to_string(), "css=li >> text=Logged in as");
        }

        #[test]
        fn test_nth_and_first_keys() {
            let base = Selector::css(".product-image-wrapper");
            assert_eq!(base.clone().nth(2).to_string(), "css=.product-image-wrapper >> nth=2");
            assert_eq!(base.first().to_string(), "css=.product-image-wrapper >> nth=0");
        }

        #[test]
        fn test_role_key() {
            assert_eq!(
                Selector::role("button", Some("Login")).to_string(),
                "role=button[name=Login]"
            );
            assert_eq!(Selector::role("heading", None).to_string(), "role=heading");
        }

        #[test]
        fn test_from_str_is_css() {
            assert_eq!(Selector::from("nav"), Selector::css("nav"));
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn test_css_query_escapes_quotes() {
            let s = Selector::css("input[data-qa=\"login-email\"]");
            let q = s.to_all_query();
            assert!(q.contains("querySelectorAll(\"input[data-qa=\\\"login-email\\\"]\")"));
        }

        #[test]
        fn test_count_and_first_wrap_all_query() {
            let s = Selector::css("tbody tr");
            assert!(s.to_count_query().ends_with(".length)"));
            assert!(s.to_query().contains("[0] || null"));
        }

        #[test]
        fn test_nth_slices() {
            let q = Selector::css("a").nth(3).to_all_query();
            assert!(q.contains(".slice(3, 4)"));
        }

        #[test]
        fn test_text_filters_innermost() {
            let q = Selector::text("Thank you").to_all_query();
            assert!(q.contains("el.children"));
        }

        #[test]
        fn test_role_uses_implicit_tags() {
            let q = Selector::role("link", None).to_all_query();
            assert!(q.contains("a[href]"));
            let q = Selector::role("tab", None).to_all_query();
            assert!(q.contains("[role=\\\"tab\\\"]"));
        }

        #[test]
        fn test_visible_query_checks_box() {
            let q = Selector::css("#scrollUp").to_visible_query();
            assert!(q.contains("getBoundingClientRect"));
        }
    }
}
