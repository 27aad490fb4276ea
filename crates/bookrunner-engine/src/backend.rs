use async_trait::async_trait;
pub use bookrunner_common::error::BackendError;
use bookrunner_common::protocol::{PageQuery, PageReply};
use bookrunner_common::selector::{ClickOffset, SelectorStrategy};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct NavigationResult {
    pub url: String,
    pub title: String,
}

/// Opaque reference to a DOM node the backend has located. Only valid until
/// the next navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u32);

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// The browser capabilities the interaction engine needs. One implementation
/// drives a real Chromium over CDP; tests substitute a scripted fake page.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Start the browser and open a page.
    async fn launch(&mut self) -> Result<(), BackendError>;

    /// Close page and browser. Must succeed when called twice or after the
    /// browser process has already died.
    async fn close(&mut self) -> Result<(), BackendError>;

    async fn is_ready(&self) -> bool;

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError>;

    /// Wait for an in-flight navigation to finish.
    async fn wait_for_navigation(&mut self, timeout: Duration) -> Result<(), BackendError>;

    /// Wait up to `timeout` for an element matching a direct strategy
    /// (css, accessible name, xpath) to be attached to the DOM.
    async fn wait_for_element(
        &mut self,
        strategy: &SelectorStrategy,
        timeout: Duration,
    ) -> Result<ElementHandle, BackendError>;

    /// Rendered box of the element, or `None` when it is not displayed
    /// (`display:none`, `visibility:hidden`, zero-sized).
    async fn element_box(&mut self, handle: ElementHandle) -> Result<Option<Rect>, BackendError>;

    /// Native pointer click at the element's center, or at `offset` from its
    /// top-left corner.
    async fn click(
        &mut self,
        handle: ElementHandle,
        offset: Option<ClickOffset>,
    ) -> Result<(), BackendError>;

    async fn focus(&mut self, handle: ElementHandle) -> Result<(), BackendError>;

    /// Send literal key events for `text` to the element.
    async fn type_text(&mut self, handle: ElementHandle, text: &str) -> Result<(), BackendError>;

    async fn press_key(&mut self, key: &str) -> Result<(), BackendError>;

    /// Evaluate a typed query inside the page.
    async fn evaluate(&mut self, query: PageQuery) -> Result<PageReply, BackendError>;

    /// Capture a PNG of the current viewport.
    async fn screenshot(&mut self) -> Result<Vec<u8>, BackendError>;
}
