#![allow(dead_code)]

use async_trait::async_trait;
use bookrunner_common::protocol::{ListedElement, PageQuery, PageReply};
use bookrunner_common::selector::{ClickOffset, SelectorStrategy};
use bookrunner_common::time::MonthYear;
use bookrunner_engine::backend::{Backend, BackendError, ElementHandle, NavigationResult, Rect};
use bookrunner_engine::config::BookrunnerConfig;
use std::collections::{HashMap, HashSet};
use std::time::Duration;

/// Scripted stand-in for a browser page.
///
/// In permissive mode every direct selector resolves to a visible element.
/// Otherwise only strategies registered through `show`/`hide` exist.
#[derive(Debug)]
pub struct FakePage {
    pub permissive: bool,
    pub launched: bool,
    pub fail_launch: bool,
    pub close_calls: usize,
    pub fail_close: bool,
    pub fail_native_click: bool,
    /// Inputs drop assigned values, like a masked field rejecting them.
    pub mask_values: bool,
    pub navigate_delay: Duration,

    /// Strategy -> visible.
    pub elements: HashMap<SelectorStrategy, bool>,
    /// Strategies matched by the in-page text scan.
    pub text_matches: HashSet<SelectorStrategy>,
    /// Targets reported as visible by `AnyVisible`.
    pub visible_targets: HashSet<SelectorStrategy>,
    pub page_text: String,
    /// Text appended to the page once something containing `trigger` is clicked.
    pub reveal_on_click: Option<(String, String)>,
    /// (trigger, target): clicking something containing `trigger` makes
    /// `target` visible to `AnyVisible`.
    pub show_on_click: Vec<(String, SelectorStrategy)>,
    /// (selector, marker): additional inputs answering `EmptyInput` for
    /// `selector`, addressed by `marker`.
    pub extra_inputs: Vec<(String, String)>,

    pub month: MonthYear,
    /// When false, next/prev clicks leave the header unchanged.
    pub month_moves: bool,
    pub events: Vec<String>,
    pub suggestions: Vec<String>,

    handles: Vec<SelectorStrategy>,
    next_marker: u32,
    pub lookups: Vec<SelectorStrategy>,
    pub clicks: Vec<SelectorStrategy>,
    pub dispatched: Vec<SelectorStrategy>,
    pub typed: String,
    pub keys: Vec<String>,
    pub values: HashMap<String, String>,
    pub value_events: Vec<String>,
    pub navigations: Vec<String>,
}

impl Default for FakePage {
    fn default() -> Self {
        Self {
            permissive: false,
            launched: false,
            fail_launch: false,
            close_calls: 0,
            fail_close: false,
            fail_native_click: false,
            mask_values: false,
            navigate_delay: Duration::ZERO,
            elements: HashMap::new(),
            text_matches: HashSet::new(),
            visible_targets: HashSet::new(),
            page_text: String::new(),
            reveal_on_click: None,
            show_on_click: Vec::new(),
            extra_inputs: Vec::new(),
            month: MonthYear {
                year: 2025,
                month: 11,
            },
            month_moves: true,
            events: Vec::new(),
            suggestions: Vec::new(),
            handles: Vec::new(),
            next_marker: 0,
            lookups: Vec::new(),
            clicks: Vec::new(),
            dispatched: Vec::new(),
            typed: String::new(),
            keys: Vec::new(),
            values: HashMap::new(),
            value_events: Vec::new(),
            navigations: Vec::new(),
        }
    }
}

impl FakePage {
    /// A page on which every step of the booking flow finds what it needs.
    pub fn permissive() -> Self {
        let mut page = Self {
            permissive: true,
            events: vec![
                "7:00am Yoga".to_string(),
                "8:00am Spin".to_string(),
                "8:00pm HIIT".to_string(),
            ],
            suggestions: vec!["Acme Gym Downtown".to_string(), "a@b.com".to_string()],
            reveal_on_click: Some(("charge".to_string(), "Payment successful".to_string())),
            ..Self::default()
        };
        for target in [
            ".dropdown-menu.show",
            ".daterangepicker",
            ".modal.show",
        ] {
            page.visible_targets
                .insert(SelectorStrategy::Css(target.to_string()));
        }
        page
    }

    pub fn show(mut self, strategy: SelectorStrategy) -> Self {
        self.elements.insert(strategy, true);
        self
    }

    pub fn hide(mut self, strategy: SelectorStrategy) -> Self {
        self.elements.insert(strategy, false);
        self
    }

    pub fn hide_target(&mut self, css: &str) {
        self.visible_targets
            .remove(&SelectorStrategy::Css(css.to_string()));
    }

    pub fn clicked(&self, needle: &str) -> usize {
        self.clicks
            .iter()
            .filter(|s| s.value().contains(needle))
            .count()
    }

    fn handle_for(&mut self, strategy: &SelectorStrategy) -> ElementHandle {
        self.handles.push(strategy.clone());
        ElementHandle(self.handles.len() as u32 - 1)
    }

    fn strategy_of(&self, handle: ElementHandle) -> Result<SelectorStrategy, BackendError> {
        self.handles
            .get(handle.0 as usize)
            .cloned()
            .ok_or(BackendError::ElementStale { handle: handle.0 })
    }

    fn marker(&mut self) -> String {
        self.next_marker += 1;
        let css = format!("[data-bookrunner-ref='m{}']", self.next_marker);
        self.elements.insert(SelectorStrategy::Css(css.clone()), true);
        css
    }

    fn on_click(&mut self, strategy: &SelectorStrategy) {
        self.clicks.push(strategy.clone());
        let value = strategy.value().to_string();
        if self.month_moves {
            if value.contains("th.next") || value == "Next month" {
                self.month = shift(self.month, 1);
            } else if value.contains("th.prev") || value == "Previous month" {
                self.month = shift(self.month, -1);
            }
        }
        for (trigger, target) in &self.show_on_click {
            if value.contains(trigger.as_str()) {
                self.visible_targets.insert(target.clone());
            }
        }
        if let Some((trigger, text)) = &self.reveal_on_click {
            if value.to_lowercase().contains(trigger) {
                self.page_text.push(' ');
                self.page_text.push_str(text);
            }
        }
    }

    fn listed(&self, selector: &str) -> Vec<ListedElement> {
        let source = if selector == ".fc-event" {
            &self.events
        } else {
            &self.suggestions
        };
        source
            .iter()
            .enumerate()
            .map(|(i, text)| ListedElement {
                selector: format!(
                    "{}[data-bookrunner-ref='l{}']",
                    selector.split(',').next().unwrap_or(selector).trim(),
                    i
                ),
                text: text.clone(),
            })
            .collect()
    }

    /// The field matching `selector` itself, then any extra inputs, whichever
    /// is first to have no value yet.
    fn empty_input(&self, selector: &str) -> Option<String> {
        let own = (self.exists(&SelectorStrategy::Css(selector.to_string())) == Some(true))
            .then(|| selector.to_string());
        let extra = self
            .extra_inputs
            .iter()
            .filter(|(sel, _)| sel == selector)
            .map(|(_, marker)| marker.clone());
        own.into_iter()
            .chain(extra)
            .find(|key| self.values.get(key).is_none_or(|v| v.is_empty()))
    }

    fn exists(&self, strategy: &SelectorStrategy) -> Option<bool> {
        match self.elements.get(strategy) {
            Some(visible) => Some(*visible),
            None if self.permissive => Some(true),
            None => None,
        }
    }
}

fn shift(m: MonthYear, by: i64) -> MonthYear {
    let index = m.linear_index() - 1 + by;
    MonthYear {
        year: (index / 12) as i32,
        month: (index % 12 + 1) as u8,
    }
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

#[async_trait]
impl Backend for FakePage {
    async fn launch(&mut self) -> Result<(), BackendError> {
        if self.fail_launch {
            return Err(BackendError::Launch("chrome not found".into()));
        }
        self.launched = true;
        Ok(())
    }

    async fn close(&mut self) -> Result<(), BackendError> {
        self.close_calls += 1;
        self.launched = false;
        if self.fail_close {
            return Err(BackendError::Other("browser already gone".into()));
        }
        Ok(())
    }

    async fn is_ready(&self) -> bool {
        self.launched
    }

    async fn navigate(&mut self, url: &str) -> Result<NavigationResult, BackendError> {
        if !self.navigate_delay.is_zero() {
            tokio::time::sleep(self.navigate_delay).await;
        }
        self.navigations.push(url.to_string());
        self.handles.clear();
        Ok(NavigationResult {
            url: url.to_string(),
            title: "Login".to_string(),
        })
    }

    async fn wait_for_navigation(&mut self, _timeout: Duration) -> Result<(), BackendError> {
        Ok(())
    }

    async fn wait_for_element(
        &mut self,
        strategy: &SelectorStrategy,
        _timeout: Duration,
    ) -> Result<ElementHandle, BackendError> {
        self.lookups.push(strategy.clone());
        match self.exists(strategy) {
            Some(_) => Ok(self.handle_for(strategy)),
            None => Err(BackendError::ElementNotFound {
                selector: strategy.value().to_string(),
            }),
        }
    }

    async fn element_box(&mut self, handle: ElementHandle) -> Result<Option<Rect>, BackendError> {
        let strategy = self.strategy_of(handle)?;
        let visible = self.exists(&strategy).unwrap_or(false);
        Ok(visible.then_some(Rect {
            x: 10.0,
            y: 10.0,
            width: 80.0,
            height: 20.0,
        }))
    }

    async fn click(
        &mut self,
        handle: ElementHandle,
        _offset: Option<ClickOffset>,
    ) -> Result<(), BackendError> {
        let strategy = self.strategy_of(handle)?;
        if self.fail_native_click {
            return Err(BackendError::Input("element is covered".into()));
        }
        self.on_click(&strategy);
        Ok(())
    }

    async fn focus(&mut self, handle: ElementHandle) -> Result<(), BackendError> {
        self.strategy_of(handle).map(|_| ())
    }

    async fn type_text(&mut self, handle: ElementHandle, text: &str) -> Result<(), BackendError> {
        self.strategy_of(handle)?;
        self.typed.push_str(text);
        Ok(())
    }

    async fn press_key(&mut self, key: &str) -> Result<(), BackendError> {
        self.keys.push(key.to_string());
        Ok(())
    }

    async fn evaluate(&mut self, query: PageQuery) -> Result<PageReply, BackendError> {
        Ok(match query {
            PageQuery::FindElement(req) => {
                let hit = req
                    .strategies
                    .iter()
                    .find(|s| self.permissive || self.text_matches.contains(*s))
                    .cloned();
                match hit {
                    Some(matched) => PageReply::Marker {
                        selector: Some(self.marker()),
                        matched: Some(matched),
                    },
                    None => PageReply::Marker {
                        selector: None,
                        matched: None,
                    },
                }
            }
            PageQuery::FirstVisibleInput => {
                PageReply::Marker {
                    selector: Some(self.marker()),
                    matched: None,
                }
            }
            PageQuery::EmptyInput(req) => PageReply::Marker {
                selector: self.empty_input(&req.selector),
                matched: None,
            },
            PageQuery::SetValue(req) => {
                let events: Vec<String> = ["input", "change", "focus", "blur"]
                    .iter()
                    .map(|e| e.to_string())
                    .collect();
                self.value_events.extend(events.iter().cloned());
                let kept = if self.mask_values {
                    String::new()
                } else {
                    req.value
                };
                self.values
                    .insert(req.target.value().to_string(), kept.clone());
                PageReply::Assigned {
                    value: kept,
                    events,
                }
            }
            PageQuery::DispatchClick(req) => {
                let found = self.exists(&req.target).is_some()
                    || self.text_matches.contains(&req.target);
                if found {
                    self.dispatched.push(req.target.clone());
                    self.on_click(&req.target);
                }
                PageReply::Flag { value: found }
            }
            PageQuery::TextContains(req) => {
                let text = self.page_text.to_lowercase();
                PageReply::Text {
                    value: req
                        .needles
                        .into_iter()
                        .find(|n| text.contains(&n.to_lowercase())),
                }
            }
            PageQuery::AnyVisible(req) => PageReply::Flag {
                value: req.targets.iter().any(|t| self.visible_targets.contains(t)),
            },
            PageQuery::ReadText(_) => PageReply::Text {
                value: Some(format!(
                    "{} {}",
                    MONTH_NAMES[self.month.month as usize - 1],
                    self.month.year
                )),
            },
            PageQuery::ListElements(req) => PageReply::Elements {
                items: self.listed(&req.selector),
            },
        })
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, BackendError> {
        Ok(vec![0x89, b'P', b'N', b'G'])
    }
}

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Defaults with every wait shortened so tests do not sleep.
pub fn fast_config() -> BookrunnerConfig {
    let mut config = BookrunnerConfig::default();
    config.site.login_url = "https://dashboard.example.com/login".into();
    config.timing.resolve_timeout_ms = 100;
    config.timing.settle_ms = 0;
    config.timing.typing_delay_ms = 0;
    config.timing.poll_interval_ms = 1;
    config.timing.confirmation_interval_ms = 1;
    config.timing.navigation_timeout_ms = 100;
    config
}
