use crate::backend::Backend;
use crate::probes::Probe;
use std::time::Duration;
use tracing::trace;

/// Bounded retry: up to `attempts` checks, `interval` apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub attempts: u32,
    pub interval: Duration,
}

impl PollPolicy {
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    /// A single check, no waiting.
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

/// Runs `probe` until it reports a value or the policy runs out.
///
/// Backend errors count as a miss. Pages being polled are usually mid
/// navigation, and a lost execution context there is expected.
pub async fn poll_until<B, P>(backend: &mut B, probe: &P, policy: PollPolicy) -> Option<P::Output>
where
    B: Backend + ?Sized,
    P: Probe,
{
    for attempt in 1..=policy.attempts.max(1) {
        match probe.check(backend).await {
            Ok(Some(value)) => {
                trace!(probe = probe.name(), attempt, "probe satisfied");
                return Some(value);
            }
            Ok(None) => trace!(probe = probe.name(), attempt, "probe not satisfied"),
            Err(e) => trace!(probe = probe.name(), attempt, error = %e, "probe errored"),
        }
        if attempt < policy.attempts && !policy.interval.is_zero() {
            tokio::time::sleep(policy.interval).await;
        }
    }
    None
}
