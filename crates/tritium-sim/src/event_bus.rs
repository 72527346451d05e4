//! Multi-subscriber event bus. Each subscriber gets a bounded queue;
//! a slow subscriber drops its own events rather than stalling the tick.

use crossbeam_channel::{Receiver, Sender, TrySendError};
use tritium_core::constants::EVENT_QUEUE_CAPACITY;
use tritium_core::events::SimEvent;

pub struct EventBus {
    subscribers: Vec<Sender<SimEvent>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self { subscribers: Vec::new() }
    }

    pub fn subscribe(&mut self) -> Receiver<SimEvent> {
        let (tx, rx) = crossbeam_channel::bounded(EVENT_QUEUE_CAPACITY);
        self.subscribers.push(tx);
        rx
    }

    /// Best-effort fan-out: a full subscriber queue drops this event
    /// for that subscriber only, logged at debug level. Subscribers
    /// whose receiver was dropped are pruned here.
    pub fn publish(&mut self, event: SimEvent) {
        self.subscribers.retain(|sub| match sub.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::debug!(kind = event.kind(), "subscriber queue full, dropping event");
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        });
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_receives_published_event() {
        let mut bus = EventBus::new();
        let rx = bus.subscribe();
        bus.publish(SimEvent::GameOver { victory: true });
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_full_queue_drops_without_panicking() {
        let mut bus = EventBus::new();
        let _rx = bus.subscribe();
        for _ in 0..(EVENT_QUEUE_CAPACITY + 10) {
            bus.publish(SimEvent::WaveStart { wave_number: 1 });
        }
    }

    #[test]
    fn test_dropped_receiver_is_pruned() {
        let mut bus = EventBus::new();
        let rx = bus.subscribe();
        drop(rx);
        bus.publish(SimEvent::WaveStart { wave_number: 1 });
        assert_eq!(bus.subscriber_count(), 0);
    }
}
