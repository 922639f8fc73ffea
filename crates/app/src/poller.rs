//! Periodic refresh loop.
//!
//! The host owns the schedule: integrations are polled at a fixed interval
//! and never run timers of their own.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::ports::Integration;
use crate::services::integration_service::IntegrationService;

/// Spawn a task polling `service` every `interval`.
///
/// The first poll happens one `interval` after spawning, since setup has
/// just produced fresh snapshots. Ticks missed while a poll is still running
/// are delayed rather than bunched up. Errors are logged and the loop keeps
/// going; abort the returned handle to stop it.
pub fn spawn_poll_loop<I>(service: IntegrationService<I>, interval: Duration) -> JoinHandle<()>
where
    I: Integration + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match service.poll_once().await {
                Ok(count) => tracing::debug!(count, "poll complete"),
                Err(err) => tracing::warn!(error = %err, "poll failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::services::integration_service::tests::service;

    #[tokio::test(start_paused = true)]
    async fn should_poll_once_per_interval() {
        let (service, _) = service().await;
        let integration = service.clone();
        let handle = spawn_poll_loop(service, Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(95)).await;
        handle.abort();

        assert_eq!(integration.integration().polls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_poll_before_first_interval() {
        let (service, _) = service().await;
        let integration = service.clone();
        let handle = spawn_poll_loop(service, Duration::from_secs(30));

        tokio::time::sleep(Duration::from_secs(29)).await;
        handle.abort();

        assert_eq!(integration.integration().polls.load(Ordering::SeqCst), 0);
    }
}
