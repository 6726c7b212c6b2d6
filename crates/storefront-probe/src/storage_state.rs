//! Persisted authentication state.
//!
//! A [`StorageState`] is a snapshot of cookies and per-origin local storage
//! taken once after a successful login. It is written to disk with the field
//! names browser tooling already understands, and loaded by value into every
//! session that should start signed in. Readers never write back.

use crate::data::UserCredentials;
use crate::page_object::{PageContext, PageObject};
use crate::pages::{HomePage, LoginPage};
use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Default location of the authentication snapshot
pub const DEFAULT_STORAGE_STATE_PATH: &str = "tests/auth/user.json";

/// One browser cookie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    /// Unix seconds, `-1` for session cookies
    #[serde(default = "session_expiry")]
    pub expires: f64,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
    #[serde(default = "default_same_site")]
    pub same_site: String,
}

fn session_expiry() -> f64 {
    -1.0
}

fn default_same_site() -> String {
    "Lax".to_string()
}

/// A local storage item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageEntry {
    pub name: String,
    pub value: String,
}

/// Local storage of one origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginState {
    pub origin: String,
    #[serde(default)]
    pub local_storage: Vec<StorageEntry>,
}

/// Cookies plus local storage
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageState {
    #[serde(default)]
    pub cookies: Vec<Cookie>,
    #[serde(default)]
    pub origins: Vec<OriginState>,
}

impl StorageState {
    /// True when nothing was captured
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty() && self.origins.iter().all(|o| o.local_storage.is_empty())
    }

    /// Cookie by name
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    /// Write the snapshot, replacing any previous file atomically
    pub fn save(&self, path: &Path) -> ProbeResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        let tmp = path.with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4().simple()));
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            ProbeError::StorageState {
                message: format!("cannot replace {}: {e}", path.display()),
            }
        })
    }

    /// Read a snapshot written by [`StorageState::save`]
    pub fn load(path: &Path) -> ProbeResult<Self> {
        let json = std::fs::read_to_string(path).map_err(|e| ProbeError::StorageState {
            message: format!("cannot read {}: {e}", path.display()),
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Log in through the UI and write the resulting snapshot to `path`
pub async fn capture_authenticated_state(
    ctx: PageContext<'_>,
    credentials: &UserCredentials,
    path: &Path,
) -> ProbeResult<StorageState> {
    let login = LoginPage::new(ctx);
    login.open().await?;
    login.login(&credentials.email, &credentials.password).await?;

    let home = HomePage::new(ctx);
    home.wait_until_ready().await?;
    if !home.is_user_logged_in().await? {
        return Err(ProbeError::StorageState {
            message: format!("login as {} did not reach a signed-in page", credentials.email),
        });
    }

    let state = ctx.driver.storage_state().await?;
    state.save(path)?;
    info!(path = %path.display(), cookies = state.cookies.len(), "authentication state saved");
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> StorageState {
        StorageState {
            cookies: vec![Cookie {
                name: "sessionid".to_string(),
                value: "abc123".to_string(),
                domain: "automationexercise.com".to_string(),
                path: "/".to_string(),
                expires: -1.0,
                http_only: true,
                secure: true,
                same_site: "Lax".to_string(),
            }],
            origins: vec![OriginState {
                origin: "https://automationexercise.com".to_string(),
                local_storage: vec![StorageEntry {
                    name: "theme".to_string(),
                    value: "dark".to_string(),
                }],
            }],
        }
    }

    mod format_tests {
        use super::*;

        #[test]
        fn test_uses_browser_field_names() {
            let json = serde_json::to_value(sample()).unwrap();
            assert_eq!(json["cookies"][0]["httpOnly"], true);
            assert_eq!(json["cookies"][0]["sameSite"], "Lax");
            assert_eq!(json["origins"][0]["localStorage"][0]["name"], "theme");
        }

        #[test]
        fn test_accepts_minimal_cookie() {
            let json = r#"{"cookies":[{"name":"a","value":"b","domain":"d","path":"/"}]}"#;
            let state: StorageState = serde_json::from_str(json).unwrap();
            assert_eq!(state.cookies[0].expires, -1.0);
            assert!(!state.cookies[0].secure);
            assert!(state.origins.is_empty());
        }

        #[test]
        fn test_is_empty_and_lookup() {
            assert!(StorageState::default().is_empty());
            let state = sample();
            assert!(!state.is_empty());
            assert_eq!(state.cookie("sessionid").unwrap().value, "abc123");
            assert!(state.cookie("missing").is_none());
        }
    }

    mod file_tests {
        use super::*;

        #[test]
        fn test_save_then_load() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("auth").join("user.json");
            sample().save(&path).unwrap();
            let loaded = StorageState::load(&path).unwrap();
            assert_eq!(loaded, sample());
        }

        #[test]
        fn test_save_leaves_no_temp_files() {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("user.json");
            sample().save(&path).unwrap();
            StorageState::default().save(&path).unwrap();
            let names: Vec<_> = std::fs::read_dir(dir.path())
                .unwrap()
                .map(|e| e.unwrap().file_name())
                .collect();
            assert_eq!(names.len(), 1);
            assert!(StorageState::load(&path).unwrap().is_empty());
        }

        #[test]
        fn test_load_missing_file() {
            let dir = TempDir::new().unwrap();
            let err = StorageState::load(&dir.path().join("nope.json")).unwrap_err();
            assert!(matches!(err, ProbeError::StorageState { .. }));
        }
    }

    mod capture_tests {
        use super::*;
        use crate::mock::scripted_login_flow;
        use crate::page_object::SiteSettings;

        #[tokio::test(start_paused = true)]
        async fn test_capture_writes_snapshot() {
            let driver = scripted_login_flow("https://shop.test", "Test User");
            driver.set_stored_state(sample());
            let site = SiteSettings::new("https://shop.test");
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("auth").join("user.json");
            let state = capture_authenticated_state(
                PageContext::new(&driver, &site),
                &UserCredentials::new("user@example.com", "secret"),
                &path,
            )
            .await
            .unwrap();
            assert_eq!(state, sample());
            assert_eq!(StorageState::load(&path).unwrap(), sample());
        }

        #[tokio::test(start_paused = true)]
        async fn test_capture_refuses_signed_out_page() {
            let driver = scripted_login_flow("https://shop.test", "Test User");
            driver.on_click(
                &LoginPage::login_button(),
                vec![crate::mock::MockAction::Remove(HomePage::logged_in_as())],
            );
            let site = SiteSettings::new("https://shop.test");
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("user.json");
            let err = capture_authenticated_state(
                PageContext::new(&driver, &site),
                &UserCredentials::new("user@example.com", "wrong"),
                &path,
            )
            .await
            .unwrap_err();
            assert!(matches!(err, ProbeError::StorageState { .. }));
            assert!(!path.exists());
        }
    }
}
