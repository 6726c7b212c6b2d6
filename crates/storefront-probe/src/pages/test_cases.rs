//! List of documented test cases on the store.

use crate::locator::Selector;
use crate::page_object::{PageContext, PageObject};
use crate::readiness::Landmark;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy)]
pub struct TestCasesPage<'a> {
    ctx: PageContext<'a>,
}

impl<'a> TestCasesPage<'a> {
    #[must_use]
    pub const fn new(ctx: PageContext<'a>) -> Self {
        Self { ctx }
    }

    #[must_use]
    pub fn title() -> Selector {
        Selector::css_with_text("h2.title", "Test Cases")
    }
}

#[async_trait]
impl PageObject for TestCasesPage<'_> {
    fn name(&self) -> &'static str {
        "TestCasesPage"
    }

    fn path(&self) -> &str {
        "/test_cases"
    }

    fn landmarks(&self) -> Vec<Landmark> {
        vec![Landmark::new("test cases title", Self::title())]
    }

    fn context(&self) -> PageContext<'_> {
        self.ctx
    }
}
