//! Audit trail subscriber.
//!
//! [`AuditLog`] subscribes to the [`EventBus`](crate::bus::EventBus) and
//! writes every [`RegisterEvent`] to the tracing log under the `audit`
//! target. It runs as a background task and exits when the bus is dropped.

use tokio::sync::broadcast;

use crate::bus::RegisterEvent;

pub struct AuditLog;

impl AuditLog {
    /// Run the audit loop until the channel closes. Returns the number of
    /// events logged.
    pub async fn run(mut receiver: broadcast::Receiver<RegisterEvent>) -> u64 {
        let mut logged = 0;
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    Self::record(&event);
                    logged += 1;
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Audit log lagged, some events were not logged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!(logged, "Event bus closed, audit log shutting down");
                    break;
                }
            }
        }
        logged
    }

    fn record(event: &RegisterEvent) {
        tracing::info!(
            target: "audit",
            event_type = %event.event_type,
            asset_id = ?event.asset_id,
            actor = event.actor.as_deref().unwrap_or("-"),
            payload = %event.payload,
            at = %event.timestamp,
            "Register event"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::{event_types, EventBus};

    #[tokio::test]
    async fn logs_until_bus_is_dropped() {
        let bus = EventBus::default();
        let handle = tokio::spawn(AuditLog::run(bus.subscribe()));

        bus.publish(RegisterEvent::new(event_types::ASSET_CREATED).for_asset(1));
        bus.publish(RegisterEvent::new(event_types::ASSET_DELETED).for_asset(1));
        drop(bus);

        let logged = handle.await.expect("audit task should not panic");
        assert_eq!(logged, 2);
    }
}
