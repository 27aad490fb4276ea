use crate::error::WorkflowError;
use crate::report::StepResult;
use crate::time::{TargetDate, TargetTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One booking attempt, as handed over by the caller.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub email: String,
    pub password: String,
    pub facility_name: String,
    pub target_date: String,
    pub target_time: String,
    #[serde(default)]
    pub debug: bool,
}

impl fmt::Debug for BookingRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BookingRequest")
            .field("email", &self.email)
            .field("password", &"********")
            .field("facility_name", &self.facility_name)
            .field("target_date", &self.target_date)
            .field("target_time", &self.target_time)
            .field("debug", &self.debug)
            .finish()
    }
}

impl BookingRequest {
    /// Checks required fields and parses the date and time up front, so a
    /// malformed request never launches a browser.
    pub fn validate(&self) -> Result<(TargetDate, TargetTime), WorkflowError> {
        for (name, value) in [
            ("email", &self.email),
            ("password", &self.password),
            ("facilityName", &self.facility_name),
        ] {
            if value.trim().is_empty() {
                return Err(WorkflowError::InvalidRequest(format!("{} is required", name)));
            }
        }
        let date = TargetDate::parse(&self.target_date)
            .map_err(|e| WorkflowError::InvalidRequest(e.to_string()))?;
        let time = TargetTime::parse(&self.target_time)
            .map_err(|e| WorkflowError::InvalidRequest(e.to_string()))?;
        Ok((date, time))
    }
}

/// A named screenshot, base64-encoded PNG.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Screenshot {
    pub name: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingResponse {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub screenshots: Vec<Screenshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepResult>,
}

impl BookingResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: Some(message.into()),
            error: None,
            screenshots: Vec::new(),
            steps: Vec::new(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: None,
            error: Some(error.into()),
            screenshots: Vec::new(),
            steps: Vec::new(),
        }
    }
}
