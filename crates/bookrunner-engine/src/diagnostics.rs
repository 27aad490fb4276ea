use crate::backend::Backend;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bookrunner_common::request::Screenshot;
use tracing::{debug, warn};

/// Named screenshots, collected only in debug mode. Capture failures are
/// logged and otherwise ignored.
#[derive(Debug, Default)]
pub struct Diagnostics {
    enabled: bool,
    shots: Vec<Screenshot>,
}

impl Diagnostics {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            shots: Vec::new(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub async fn capture<B: Backend + ?Sized>(&mut self, backend: &mut B, name: &str) {
        if !self.enabled {
            return;
        }
        match backend.screenshot().await {
            Ok(png) => {
                debug!(name, bytes = png.len(), "screenshot captured");
                self.shots.push(Screenshot {
                    name: name.to_string(),
                    data: STANDARD.encode(png),
                });
            }
            Err(e) => warn!(name, error = %e, "screenshot failed"),
        }
    }

    pub fn into_shots(self) -> Vec<Screenshot> {
        self.shots
    }
}
