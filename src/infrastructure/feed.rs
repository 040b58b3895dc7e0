use crate::domain::ports::{ChangeEvent, ChangeFeed};
use tokio::sync::broadcast;

/// An in-process change feed backed by a `tokio::sync::broadcast` channel,
/// standing in for the hosted backend's realtime change notifications.
///
/// Cloning shares the underlying channel. Publishing never blocks; events
/// published while nobody is subscribed are dropped, and slow subscribers
/// observe a `Lagged` error rather than stalling the engine.
#[derive(Clone)]
pub struct BroadcastChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl BroadcastChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }
}

impl ChangeFeed for BroadcastChangeFeed {
    fn publish(&self, event: ChangeEvent) {
        // No subscribers is fine
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::request::RequestStatus;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let feed = BroadcastChangeFeed::new(8);
        let mut rx = feed.subscribe();

        feed.publish(ChangeEvent::RequestChanged {
            request_id: 100,
            status: RequestStatus::Pending,
        });
        feed.publish(ChangeEvent::MessagePosted {
            request_id: 100,
            message_id: 2,
        });

        assert_eq!(
            rx.recv().await.unwrap(),
            ChangeEvent::RequestChanged {
                request_id: 100,
                status: RequestStatus::Pending,
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            ChangeEvent::MessagePosted {
                request_id: 100,
                message_id: 2,
            }
        );
    }

    #[test]
    fn test_publish_without_subscribers_is_silent() {
        let feed = BroadcastChangeFeed::new(8);
        feed.publish(ChangeEvent::NotificationCreated {
            user: 7,
            notification_id: 1,
        });
    }
}
