use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookrunnerConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub vocabulary: VocabularyConfig,
    #[serde(default)]
    pub browser: BrowserConfig,
    #[serde(default)]
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default = "default_login_url")]
    pub login_url: String,
    /// Customer selected in the booking modal. Empty means "use the email
    /// from the booking request".
    #[serde(default)]
    pub customer_name: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            login_url: default_login_url(),
            customer_name: String::new(),
        }
    }
}

fn default_login_url() -> String {
    "https://dashboard.example.com/login".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_resolve_timeout_ms")]
    pub resolve_timeout_ms: u64,
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    #[serde(default = "default_typing_delay_ms")]
    pub typing_delay_ms: u64,
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_suggestion_attempts")]
    pub suggestion_attempts: u32,
    #[serde(default = "default_events_attempts")]
    pub events_attempts: u32,
    #[serde(default = "default_confirmation_attempts")]
    pub confirmation_attempts: u32,
    #[serde(default = "default_confirmation_interval_ms")]
    pub confirmation_interval_ms: u64,
    #[serde(default = "default_max_month_steps")]
    pub max_month_steps: u32,
    #[serde(default = "default_watchdog_secs")]
    pub watchdog_secs: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            resolve_timeout_ms: default_resolve_timeout_ms(),
            settle_ms: default_settle_ms(),
            typing_delay_ms: default_typing_delay_ms(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            suggestion_attempts: default_suggestion_attempts(),
            events_attempts: default_events_attempts(),
            confirmation_attempts: default_confirmation_attempts(),
            confirmation_interval_ms: default_confirmation_interval_ms(),
            max_month_steps: default_max_month_steps(),
            watchdog_secs: default_watchdog_secs(),
        }
    }
}

impl TimingConfig {
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn confirmation_interval(&self) -> Duration {
        Duration::from_millis(self.confirmation_interval_ms)
    }

    pub fn watchdog(&self) -> Duration {
        Duration::from_secs(self.watchdog_secs)
    }
}

fn default_resolve_timeout_ms() -> u64 {
    10000
}

fn default_settle_ms() -> u64 {
    500
}

fn default_typing_delay_ms() -> u64 {
    100
}

fn default_navigation_timeout_ms() -> u64 {
    30000
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_suggestion_attempts() -> u32 {
    5
}

fn default_events_attempts() -> u32 {
    10
}

fn default_confirmation_attempts() -> u32 {
    15
}

fn default_confirmation_interval_ms() -> u64 {
    1000
}

fn default_max_month_steps() -> u32 {
    12
}

fn default_watchdog_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyConfig {
    /// Words whose presence in the visible page text counts as a booking
    /// confirmation. Matched case-insensitively.
    #[serde(default = "default_success_words")]
    pub success: Vec<String>,
}

impl Default for VocabularyConfig {
    fn default() -> Self {
        Self {
            success: default_success_words(),
        }
    }
}

fn default_success_words() -> Vec<String> {
    vec![
        "success".to_string(),
        "booked".to_string(),
        "confirmed".to_string(),
        "complete".to_string(),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default)]
    pub visible: bool,
    #[serde(default = "default_no_sandbox")]
    pub no_sandbox: bool,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            visible: false,
            no_sandbox: default_no_sandbox(),
            args: Vec::new(),
        }
    }
}

fn default_no_sandbox() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(default = "default_sensitive_fields")]
    pub sensitive_fields: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            sensitive_fields: default_sensitive_fields(),
        }
    }
}

fn default_sensitive_fields() -> Vec<String> {
    vec!["password".to_string(), "pin".to_string()]
}
