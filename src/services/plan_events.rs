use tokio::sync::broadcast;

use crate::models::PlanEvent;

const EVENT_CAPACITY: usize = 64;

/// Fan-out of plan change notifications to any number of listeners.
///
/// Publishing never blocks; listeners that fall behind see a `Lagged`
/// error and skip ahead.
#[derive(Debug, Clone)]
pub struct PlanEventBus {
    event_tx: broadcast::Sender<PlanEvent>,
}

impl Default for PlanEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl PlanEventBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self { event_tx: tx }
    }

    /// Publish an event; returns how many listeners received it
    pub fn publish(&self, event: PlanEvent) -> usize {
        match self.event_tx.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                tracing::debug!("No listeners for {:?}", event);
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlanEvent> {
        self.event_tx.subscribe()
    }

    pub fn listener_count(&self) -> usize {
        self.event_tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = PlanEventBus::new();
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        let event = PlanEvent::ActivePlanChanged {
            user_id: "user-1".to_string(),
            plan_id: Some("plan-1".to_string()),
        };
        assert_eq!(bus.publish(event.clone()), 2);

        assert_eq!(first.recv().await.unwrap(), event);
        assert_eq!(second.recv().await.unwrap(), event);
    }

    #[test]
    fn test_publish_without_listeners() {
        let bus = PlanEventBus::new();
        let sent = bus.publish(PlanEvent::ActivePlanChanged {
            user_id: "user-1".to_string(),
            plan_id: None,
        });
        assert_eq!(sent, 0);
        assert_eq!(bus.listener_count(), 0);
    }
}
