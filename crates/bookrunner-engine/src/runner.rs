use crate::backend::Backend;
use crate::config::BookrunnerConfig;
use crate::session::run_booking;
use bookrunner_common::request::{BookingRequest, BookingResponse};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// A booking running on its own task.
pub struct BookingJob {
    handle: JoinHandle<BookingResponse>,
}

pub enum JobStatus {
    Finished(BookingResponse),
    /// The bound elapsed. The job keeps running and can be waited on again.
    StillRunning(BookingJob),
}

impl BookingJob {
    pub fn spawn<B>(backend: B, request: BookingRequest, config: BookrunnerConfig) -> Self
    where
        B: Backend + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut backend = backend;
            run_booking(&mut backend, &request, &config).await
        });
        Self { handle }
    }

    pub async fn wait(mut self, bound: Duration) -> JobStatus {
        match tokio::time::timeout(bound, &mut self.handle).await {
            Ok(joined) => JobStatus::Finished(Self::into_response(joined)),
            Err(_) => {
                info!(bound_secs = bound.as_secs(), "booking still running");
                JobStatus::StillRunning(self)
            }
        }
    }

    pub async fn finish(self) -> BookingResponse {
        Self::into_response(self.handle.await)
    }

    fn into_response(joined: Result<BookingResponse, tokio::task::JoinError>) -> BookingResponse {
        joined.unwrap_or_else(|e| {
            warn!(error = %e, "booking task did not complete");
            BookingResponse::failure(format!("booking task failed: {}", e))
        })
    }
}
