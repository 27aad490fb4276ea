use crate::cdp::{CdpClient, LaunchOptions};
use crate::inject::run_query;
use async_trait::async_trait;
use bookrunner_engine::backend::{Backend, BackendError, ElementHandle, NavigationResult, Rect};
use bookrunner_engine::config::schema::BrowserConfig;
use bookrunner_engine::protocol::{FindElementRequest, PageQuery, PageReply};
use bookrunner_engine::selector::{ClickOffset, SelectorStrategy};
use chromiumoxide::element::Element;
use chromiumoxide::layout::Point;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Interval between element lookups while waiting for attachment.
const LOOKUP_INTERVAL: Duration = Duration::from_millis(100);

pub struct HeadlessBackend {
    client: Option<CdpClient>,
    options: LaunchOptions,
    elements: HashMap<u32, Element>,
    next_handle: u32,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::with_options(LaunchOptions {
            no_sandbox: true,
            ..LaunchOptions::default()
        })
    }

    pub fn with_options(options: LaunchOptions) -> Self {
        Self {
            client: None,
            options,
            elements: HashMap::new(),
            next_handle: 0,
        }
    }

    pub fn from_config(config: &BrowserConfig) -> Self {
        Self::with_options(LaunchOptions {
            visible: config.visible,
            no_sandbox: config.no_sandbox,
            args: config.args.clone(),
        })
    }

    pub fn get_client(&self) -> Option<&CdpClient> {
        self.client.as_ref()
    }

    fn page(&self) -> Result<&chromiumoxide::Page, BackendError> {
        self.client
            .as_ref()
            .map(|c| &c.page)
            .ok_or(BackendError::NotReady)
    }

    fn element(&self, handle: ElementHandle) -> Result<&Element, BackendError> {
        self.elements
            .get(&handle.0)
            .ok_or(BackendError::ElementStale { handle: handle.0 })
    }

    fn remember(&mut self, element: Element) -> ElementHandle {
        self.next_handle += 1;
        self.elements.insert(self.next_handle, element);
        ElementHandle(self.next_handle)
    }

    async fn get_navigation_result(
        page: &chromiumoxide::Page,
    ) -> Result<NavigationResult, BackendError> {
        let title = page
            .get_title()
            .await
            .unwrap_or_default()
            .unwrap_or_default();
        let url = page
            .url()
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?
            .unwrap_or_default();
        Ok(NavigationResult { url, title })
    }

    /// Marker for the first visible element the page script finds for
    /// `strategy`.
    async fn visible_marker(
        page: &chromiumoxide::Page,
        strategy: &SelectorStrategy,
    ) -> Result<Option<String>, BackendError> {
        run_query(
            page,
            &PageQuery::FindElement(FindElementRequest {
                strategies: vec![strategy.clone()],
            }),
        )
        .await?
        .into_marker()
    }

    /// One lookup attempt. The page script picks the first visible match and
    /// stamps a marker that CDP can then address. A CSS selector with no
    /// visible match falls back to its first DOM match, so hidden elements
    /// still resolve and fail the visibility check.
    async fn lookup_once(&self, strategy: &SelectorStrategy) -> Result<Element, BackendError> {
        let page = self.page()?;
        let not_found = || BackendError::ElementNotFound {
            selector: strategy.to_string(),
        };
        let css = match strategy {
            SelectorStrategy::Css(css) => Self::visible_marker(page, strategy)
                .await?
                .unwrap_or_else(|| css.clone()),
            SelectorStrategy::AccessibleName(_) | SelectorStrategy::Xpath(_) => {
                Self::visible_marker(page, strategy)
                    .await?
                    .ok_or_else(not_found)?
            }
            SelectorStrategy::TextContains(_) => {
                return Err(BackendError::SelectorInvalid {
                    selector: strategy.to_string(),
                });
            }
        };
        page.find_element(css).await.map_err(|_| not_found())
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Backend for HeadlessBackend {
    async fn launch(&mut self) -> Result<(), BackendError> {
        info!("Launching Headless Backend (Chromium)...");
        let client = CdpClient::launch(&self.options)
            .await
            .map_err(|e| BackendError::Launch(e.to_string()))?;
        self.client = Some(client);
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        self.elements.clear();
        if let Some(client) = self.client.take() {
            client.close().await;
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.client.is_some()
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        self.elements.clear();
        let page = self.page()?;

        info!("Navigating to: {}", url);
        page.goto(url)
            .await
            .map_err(|e| BackendError::Navigation(e.to_string()))?;

        Self::get_navigation_result(page).await
    }

    async fn wait_for_navigation(&mut self, timeout: Duration) -> Result<(), BackendError> {
        // Handles from the previous document are dead after this.
        self.elements.clear();
        let page = self.page()?;
        match tokio::time::timeout(timeout, page.wait_for_navigation()).await {
            Err(_) => Err(BackendError::NavigationTimeout {
                timeout_ms: timeout.as_millis() as u64,
            }),
            Ok(Err(e)) => Err(BackendError::Navigation(e.to_string())),
            Ok(Ok(_)) => Ok(()),
        }
    }

    async fn wait_for_element(
        &mut self,
        strategy: &SelectorStrategy,
        timeout: Duration,
    ) -> Result<ElementHandle, BackendError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.lookup_once(strategy).await {
                Ok(element) => return Ok(self.remember(element)),
                Err(e @ (BackendError::NotReady | BackendError::SelectorInvalid { .. })) => {
                    return Err(e);
                }
                Err(e) if Instant::now() >= deadline => {
                    debug!(strategy = %strategy, error = %e, "element lookup timed out");
                    return Err(BackendError::ElementNotFound {
                        selector: strategy.to_string(),
                    });
                }
                Err(_) => tokio::time::sleep(LOOKUP_INTERVAL).await,
            }
        }
    }

    async fn element_box(&mut self, handle: ElementHandle) -> Result<Option<Rect>, BackendError> {
        let element = self.element(handle)?;
        let styled_visible = element
            .call_js_fn(
                "function() { const s = window.getComputedStyle(this); \
                 return s.display !== 'none' && s.visibility !== 'hidden'; }",
                false,
            )
            .await
            .map_err(|e| BackendError::ScriptError(e.to_string()))?
            .result
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        if !styled_visible {
            return Ok(None);
        }
        // No box model means the node is not rendered.
        Ok(element.bounding_box().await.ok().map(|b| Rect {
            x: b.x,
            y: b.y,
            width: b.width,
            height: b.height,
        }))
    }

    async fn click(
        &mut self,
        handle: ElementHandle,
        offset: Option<ClickOffset>,
    ) -> Result<(), BackendError> {
        let element = self.element(handle)?;
        match offset {
            None => {
                element
                    .click()
                    .await
                    .map_err(|e| BackendError::Input(format!("click failed: {}", e)))?;
            }
            Some(offset) => {
                element
                    .scroll_into_view()
                    .await
                    .map_err(|e| BackendError::Input(format!("scroll failed: {}", e)))?;
                let b = element
                    .bounding_box()
                    .await
                    .map_err(|e| BackendError::Input(format!("no box to click: {}", e)))?;
                let point = Point {
                    x: b.x + offset.x,
                    y: b.y + offset.y,
                };
                self.page()?
                    .click(point)
                    .await
                    .map_err(|e| BackendError::Input(format!("click at offset failed: {}", e)))?;
            }
        }
        Ok(())
    }

    async fn focus(&mut self, handle: ElementHandle) -> Result<(), BackendError> {
        self.element(handle)?
            .focus()
            .await
            .map_err(|e| BackendError::Input(format!("focus failed: {}", e)))?;
        Ok(())
    }

    async fn type_text(&mut self, handle: ElementHandle, text: &str) -> Result<(), BackendError> {
        self.element(handle)?
            .type_str(text)
            .await
            .map_err(|e| BackendError::Input(format!("typing failed: {}", e)))?;
        Ok(())
    }

    async fn press_key(&mut self, key: &str) -> Result<(), BackendError> {
        use chromiumoxide::cdp::browser_protocol::input::{
            DispatchKeyEventParams, DispatchKeyEventType,
        };

        let page = self.page()?;
        let text = match key {
            "Enter" => Some("\r"),
            "Tab" => Some("\t"),
            _ => None,
        };

        let mut key_down = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyDown)
            .key(key)
            .code(key);
        if let Some(text) = text {
            key_down = key_down.text(text);
        }
        let key_down = key_down
            .build()
            .map_err(|e| BackendError::Input(format!("Failed to build key event: {:?}", e)))?;
        page.execute(key_down)
            .await
            .map_err(|e| BackendError::Input(format!("press_key down failed: {}", e)))?;

        let key_up = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyUp)
            .key(key)
            .code(key)
            .build()
            .map_err(|e| BackendError::Input(format!("Failed to build key event: {:?}", e)))?;
        page.execute(key_up)
            .await
            .map_err(|e| BackendError::Input(format!("press_key up failed: {}", e)))?;

        Ok(())
    }

    async fn evaluate(&mut self, query: PageQuery) -> Result<PageReply, BackendError> {
        let page = self.page()?;
        run_query(page, &query).await
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, BackendError> {
        let page = self.page()?;
        page.screenshot(chromiumoxide::page::ScreenshotParams::builder().build())
            .await
            .map_err(|e| BackendError::Other(format!("Screenshot failed: {}", e)))
    }
}
