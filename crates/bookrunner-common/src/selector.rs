//! Selector strategies: the typed description of "how to find one UI target".
//!
//! A [`SelectorSet`] is an ordered, non-empty list of strategies. Earlier
//! entries have priority. Sets are built once per call site and never mutated
//! afterwards; the only way to obtain one is through a constructor that takes
//! the first strategy, so an empty set cannot exist.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One way of identifying a UI element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum SelectorStrategy {
    Css(String),
    AccessibleName(String),
    Xpath(String),
    TextContains(String),
}

impl SelectorStrategy {
    /// Direct strategies are resolvable through the browser backend's own
    /// element lookup. Text containment needs an in-page scan.
    pub fn is_direct(&self) -> bool {
        !matches!(self, SelectorStrategy::TextContains(_))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SelectorStrategy::Css(_) => "css",
            SelectorStrategy::AccessibleName(_) => "aria",
            SelectorStrategy::Xpath(_) => "xpath",
            SelectorStrategy::TextContains(_) => "text",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            SelectorStrategy::Css(v)
            | SelectorStrategy::AccessibleName(v)
            | SelectorStrategy::Xpath(v)
            | SelectorStrategy::TextContains(v) => v,
        }
    }
}

impl fmt::Display for SelectorStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.kind(), self.value())
    }
}

/// Pixel offset from an element's top-left corner, recorded from previously
/// observed geometry. Best effort only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickOffset {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectorEntry {
    pub strategy: SelectorStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<ClickOffset>,
}

impl SelectorEntry {
    pub fn new(strategy: SelectorStrategy) -> Self {
        Self {
            strategy,
            offset: None,
        }
    }
}

/// Ordered, non-empty, immutable list of strategies for one logical target.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorSet {
    entries: Vec<SelectorEntry>,
}

impl SelectorSet {
    pub fn new(first: SelectorStrategy) -> Self {
        Self {
            entries: vec![SelectorEntry::new(first)],
        }
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(SelectorStrategy::Css(selector.into()))
    }

    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::new(SelectorStrategy::Xpath(expr.into()))
    }

    pub fn aria(name: impl Into<String>) -> Self {
        Self::new(SelectorStrategy::AccessibleName(name.into()))
    }

    pub fn text(needle: impl Into<String>) -> Self {
        Self::new(SelectorStrategy::TextContains(needle.into()))
    }

    /// Builds a set from a list, returning `None` when the list is empty.
    pub fn from_strategies(strategies: Vec<SelectorStrategy>) -> Option<Self> {
        if strategies.is_empty() {
            return None;
        }
        Some(Self {
            entries: strategies.into_iter().map(SelectorEntry::new).collect(),
        })
    }

    pub fn or(mut self, strategy: SelectorStrategy) -> Self {
        self.entries.push(SelectorEntry::new(strategy));
        self
    }

    pub fn or_css(self, selector: impl Into<String>) -> Self {
        self.or(SelectorStrategy::Css(selector.into()))
    }

    pub fn or_xpath(self, expr: impl Into<String>) -> Self {
        self.or(SelectorStrategy::Xpath(expr.into()))
    }

    pub fn or_aria(self, name: impl Into<String>) -> Self {
        self.or(SelectorStrategy::AccessibleName(name.into()))
    }

    pub fn or_text(self, needle: impl Into<String>) -> Self {
        self.or(SelectorStrategy::TextContains(needle.into()))
    }

    /// Attaches an offset hint to the most recently added entry.
    pub fn at_offset(mut self, x: f64, y: f64) -> Self {
        if let Some(last) = self.entries.last_mut() {
            last.offset = Some(ClickOffset { x, y });
        }
        self
    }

    pub fn entries(&self) -> &[SelectorEntry] {
        &self.entries
    }

    pub fn strategies(&self) -> impl Iterator<Item = &SelectorStrategy> {
        self.entries.iter().map(|e| &e.strategy)
    }

    pub fn offset_for(&self, strategy: &SelectorStrategy) -> Option<ClickOffset> {
        self.entries
            .iter()
            .find(|e| &e.strategy == strategy)
            .and_then(|e| e.offset)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Human readable list of every strategy, in order.
    pub fn describe(&self) -> Vec<String> {
        self.strategies().map(|s| s.to_string()).collect()
    }
}
