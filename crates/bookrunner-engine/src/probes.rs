//! Read-only checks of page state used to steer the workflow.

use crate::backend::{Backend, BackendError};
use async_trait::async_trait;
use bookrunner_common::protocol::{
    AnyVisibleRequest, EmptyInputRequest, ListElementsRequest, ListedElement, PageQuery,
    ReadTextRequest, TextContainsRequest,
};
use bookrunner_common::selector::SelectorStrategy;
use bookrunner_common::time::MonthYear;

/// A stateless page check. `Ok(None)` means "not yet".
#[async_trait]
pub trait Probe: Send + Sync {
    type Output: Send;

    fn name(&self) -> &str;

    async fn check<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
    ) -> Result<Option<Self::Output>, BackendError>;
}

/// Visible text contains any word of a vocabulary. Yields the word found.
#[derive(Debug, Clone)]
pub struct TextProbe {
    pub words: Vec<String>,
    pub scope: Option<String>,
}

impl TextProbe {
    pub fn new(words: Vec<String>) -> Self {
        Self { words, scope: None }
    }

    pub fn within(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }
}

#[async_trait]
impl Probe for TextProbe {
    type Output = String;

    fn name(&self) -> &str {
        "text"
    }

    async fn check<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
    ) -> Result<Option<String>, BackendError> {
        backend
            .evaluate(PageQuery::TextContains(TextContainsRequest {
                needles: self.words.clone(),
                scope: self.scope.clone(),
            }))
            .await?
            .into_text()
    }
}

/// Whether any target is visible, or, with `expect_visible == false`,
/// whether none is.
#[derive(Debug, Clone)]
pub struct Presence {
    pub label: &'static str,
    pub targets: Vec<SelectorStrategy>,
    pub expect_visible: bool,
}

impl Presence {
    pub fn visible(label: &'static str, targets: Vec<SelectorStrategy>) -> Self {
        Self {
            label,
            targets,
            expect_visible: true,
        }
    }

    pub fn absent(label: &'static str, targets: Vec<SelectorStrategy>) -> Self {
        Self {
            label,
            targets,
            expect_visible: false,
        }
    }
}

#[async_trait]
impl Probe for Presence {
    type Output = ();

    fn name(&self) -> &str {
        self.label
    }

    async fn check<B: Backend + ?Sized>(&self, backend: &mut B) -> Result<Option<()>, BackendError> {
        let visible = backend
            .evaluate(PageQuery::AnyVisible(AnyVisibleRequest {
                targets: self.targets.clone(),
            }))
            .await?
            .into_flag()?;
        Ok((visible == self.expect_visible).then_some(()))
    }
}

/// Month and year shown by a calendar header.
#[derive(Debug, Clone)]
pub struct CalendarHeaderProbe {
    pub selectors: Vec<String>,
}

#[async_trait]
impl Probe for CalendarHeaderProbe {
    type Output = MonthYear;

    fn name(&self) -> &str {
        "calendar header"
    }

    async fn check<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
    ) -> Result<Option<MonthYear>, BackendError> {
        let text = backend
            .evaluate(PageQuery::ReadText(ReadTextRequest {
                selectors: self.selectors.clone(),
            }))
            .await?
            .into_text()?;
        Ok(text.and_then(|t| MonthYear::parse_header(&t).ok()))
    }
}

/// Visible elements matching a CSS selector; satisfied once at least one is
/// rendered.
#[derive(Debug, Clone)]
pub struct ElementsProbe {
    pub selector: String,
}

#[async_trait]
impl Probe for ElementsProbe {
    type Output = Vec<ListedElement>;

    fn name(&self) -> &str {
        "elements"
    }

    async fn check<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
    ) -> Result<Option<Vec<ListedElement>>, BackendError> {
        let items = backend
            .evaluate(PageQuery::ListElements(ListElementsRequest {
                selector: self.selector.clone(),
            }))
            .await?
            .into_elements()?;
        Ok((!items.is_empty()).then_some(items))
    }
}

/// A visible, enabled field matching `selector` that has not been filled yet.
/// Yields a marker selector for it.
#[derive(Debug, Clone)]
pub struct EmptyField {
    pub selector: String,
}

#[async_trait]
impl Probe for EmptyField {
    type Output = String;

    fn name(&self) -> &str {
        "empty field"
    }

    async fn check<B: Backend + ?Sized>(
        &self,
        backend: &mut B,
    ) -> Result<Option<String>, BackendError> {
        backend
            .evaluate(PageQuery::EmptyInput(EmptyInputRequest {
                selector: self.selector.clone(),
            }))
            .await?
            .into_marker()
    }
}
