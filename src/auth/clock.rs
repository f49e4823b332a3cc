use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Time source for poll loops and deadlines.
///
/// Engines never read the wall clock or sleep directly; tests substitute a
/// clock whose `sleep` advances virtual time instantly.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `tokio::time`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[async_trait]
impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Time left until `deadline`, or zero once it has passed.
pub fn remaining_until(clock: &dyn Clock, deadline: DateTime<Utc>) -> Duration {
    (deadline - clock.now()).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn system_clock_sleep_follows_tokio_time() {
        let started = tokio::time::Instant::now();
        SystemClock.sleep(Duration::from_secs(3)).await;
        assert!(started.elapsed() >= Duration::from_secs(3));
    }

    #[test]
    fn remaining_is_zero_after_deadline() {
        let deadline = Utc::now() - chrono::Duration::seconds(1);
        assert_eq!(remaining_until(&SystemClock, deadline), Duration::ZERO);
    }
}
