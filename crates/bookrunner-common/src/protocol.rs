//! Typed queries evaluated inside the page, and their replies.
//!
//! Every piece of logic that has to run in the browser's script context goes
//! through [`PageQuery`]. Backends serialize the query to JSON and hand it to
//! the injected page script, which answers with a [`PageReply`].

use crate::error::BackendError;
use crate::selector::SelectorStrategy;
use serde::{Deserialize, Serialize};

/// Attribute the page script stamps on elements it found, so the backend can
/// re-address them with a plain CSS selector.
pub const MARKER_ATTRIBUTE: &str = "data-bookrunner-ref";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PageQuery {
    /// Text containment matches in order, then XPath evaluation. Returns a
    /// marker selector for the first visible hit.
    FindElement(FindElementRequest),
    /// First visible `<input>` on the page.
    FirstVisibleInput,
    /// First visible, enabled field matching the selector whose value is
    /// still empty.
    EmptyInput(EmptyInputRequest),
    SetValue(SetValueRequest),
    DispatchClick(DispatchClickRequest),
    /// First needle found in the visible text, if any.
    TextContains(TextContainsRequest),
    /// Whether any of the targets is currently rendered and visible.
    AnyVisible(AnyVisibleRequest),
    /// Visible text of the first matching element.
    ReadText(ReadTextRequest),
    /// All visible elements matching the selector, each stamped with a marker.
    ListElements(ListElementsRequest),
}

impl PageQuery {
    pub fn name(&self) -> &'static str {
        match self {
            PageQuery::FindElement(_) => "find_element",
            PageQuery::FirstVisibleInput => "first_visible_input",
            PageQuery::EmptyInput(_) => "empty_input",
            PageQuery::SetValue(_) => "set_value",
            PageQuery::DispatchClick(_) => "dispatch_click",
            PageQuery::TextContains(_) => "text_contains",
            PageQuery::AnyVisible(_) => "any_visible",
            PageQuery::ReadText(_) => "read_text",
            PageQuery::ListElements(_) => "list_elements",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindElementRequest {
    pub strategies: Vec<SelectorStrategy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmptyInputRequest {
    pub selector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetValueRequest {
    pub target: SelectorStrategy,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchClickRequest {
    pub target: SelectorStrategy,
    /// Send pointerdown/mousedown, pointerup/mouseup, click instead of a bare
    /// `element.click()`.
    #[serde(default)]
    pub pointer_events: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextContainsRequest {
    pub needles: Vec<String>,
    /// Restrict the scan to elements matching this CSS selector.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnyVisibleRequest {
    pub targets: Vec<SelectorStrategy>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadTextRequest {
    pub selectors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListElementsRequest {
    pub selector: String,
}

/// A visible element reported by [`PageQuery::ListElements`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedElement {
    /// Marker selector addressing exactly this element.
    pub selector: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageReply {
    Marker {
        #[serde(default)]
        selector: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        matched: Option<SelectorStrategy>,
    },
    Flag {
        value: bool,
    },
    Text {
        #[serde(default)]
        value: Option<String>,
    },
    Assigned {
        value: String,
        #[serde(default)]
        events: Vec<String>,
    },
    Elements {
        items: Vec<ListedElement>,
    },
    Error {
        message: String,
    },
}

impl PageReply {
    fn unexpected(self, wanted: &str) -> BackendError {
        match self {
            PageReply::Error { message } => BackendError::ScriptError(message),
            other => BackendError::Scanner(format!("expected {} reply, got {:?}", wanted, other)),
        }
    }

    pub fn into_marker(self) -> Result<Option<String>, BackendError> {
        match self {
            PageReply::Marker { selector, .. } => Ok(selector),
            other => Err(other.unexpected("marker")),
        }
    }

    pub fn into_flag(self) -> Result<bool, BackendError> {
        match self {
            PageReply::Flag { value } => Ok(value),
            other => Err(other.unexpected("flag")),
        }
    }

    pub fn into_text(self) -> Result<Option<String>, BackendError> {
        match self {
            PageReply::Text { value } => Ok(value),
            other => Err(other.unexpected("text")),
        }
    }

    pub fn into_elements(self) -> Result<Vec<ListedElement>, BackendError> {
        match self {
            PageReply::Elements { items } => Ok(items),
            other => Err(other.unexpected("elements")),
        }
    }
}
