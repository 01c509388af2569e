//! Reset scheduling
//!
//! A reset signal arms a deadline; the controller restarts the session when
//! it elapses. Cancelling disarms it, so a torn-down client never acts on a
//! stale timer.

use std::time::Duration;

use tokio::time::Instant;

pub struct ResetCoordinator {
    delay: Duration,
    deadline: Option<Instant>,
}

impl ResetCoordinator {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm the reset `delay` from now, replacing any earlier deadline
    pub fn schedule(&mut self) -> Instant {
        let deadline = Instant::now() + self.delay;
        self.deadline = Some(deadline);
        tracing::debug!(delay_ms = self.delay.as_millis() as u64, "Reset scheduled");
        deadline
    }

    /// Disarm a pending reset; returns whether one was pending
    pub fn cancel(&mut self) -> bool {
        let was_pending = self.deadline.take().is_some();
        if was_pending {
            tracing::debug!("Pending reset cancelled");
        }
        was_pending
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

/// Resolve when `deadline` passes; never resolves without one
pub async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready, task};

    #[tokio::test(start_paused = true)]
    async fn test_fires_only_after_delay() {
        let mut coordinator = ResetCoordinator::new(Duration::from_millis(2000));
        coordinator.schedule();

        let mut fired = task::spawn(until(coordinator.deadline()));
        assert_pending!(fired.poll());

        tokio::time::advance(Duration::from_millis(1999)).await;
        assert_pending!(fired.poll());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert_ready!(fired.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_scheduled_never_fires() {
        let coordinator = ResetCoordinator::new(Duration::from_millis(10));

        let mut fired = task::spawn(until(coordinator.deadline()));
        tokio::time::advance(Duration::from_secs(60)).await;
        assert_pending!(fired.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_disarms() {
        let mut coordinator = ResetCoordinator::new(Duration::from_millis(10));
        coordinator.schedule();
        assert!(coordinator.is_pending());

        assert!(coordinator.cancel());
        assert!(!coordinator.is_pending());
        assert!(!coordinator.cancel());

        let mut fired = task::spawn(until(coordinator.deadline()));
        tokio::time::advance(Duration::from_secs(1)).await;
        assert_pending!(fired.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_moves_deadline() {
        let mut coordinator = ResetCoordinator::new(Duration::from_millis(100));
        let first = coordinator.schedule();
        tokio::time::advance(Duration::from_millis(50)).await;
        let second = coordinator.schedule();

        assert_eq!(second - first, Duration::from_millis(50));
        assert_eq!(coordinator.deadline(), Some(second));
    }
}
