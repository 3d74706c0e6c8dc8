//! Edge-triggered gesture events fanned out to any number of consumers.
//!
//! Subscribers get their own bounded channel; a full or dropped receiver
//! never blocks the classifier thread.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};

use crate::types::GestureKind;

#[derive(Clone, Debug, PartialEq)]
pub enum GestureEvent {
    /// The discrete gesture label changed to a non-none state.
    GestureChanged {
        gesture: GestureKind,
        confidence: f32,
    },
    PinchStarted,
    PinchEnded,
    HandDetected,
    HandLost,
    TwoHandsDetected,
    TwoHandsLost,
}

const SUBSCRIBER_CAPACITY: usize = 64;

pub struct EventBus {
    senders: Vec<Sender<GestureEvent>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            senders: Vec::new(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<GestureEvent> {
        let (tx, rx) = bounded(SUBSCRIBER_CAPACITY);
        self.senders.push(tx);
        rx
    }

    /// Deliver an event to every live subscriber. Disconnected receivers
    /// are pruned; a full queue drops the event for that subscriber only.
    pub fn publish(&mut self, event: GestureEvent) {
        self.senders.retain(|tx| {
            !matches!(tx.try_send(event.clone()), Err(TrySendError::Disconnected(_)))
        });
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_subscriber_sees_each_event() {
        let mut bus = EventBus::new();
        let a = bus.subscribe();
        let b = bus.subscribe();
        bus.publish(GestureEvent::PinchStarted);
        assert_eq!(a.try_recv().unwrap(), GestureEvent::PinchStarted);
        assert_eq!(b.try_recv().unwrap(), GestureEvent::PinchStarted);
    }

    #[test]
    fn dropped_subscriber_does_not_block_publish() {
        let mut bus = EventBus::new();
        let keep = bus.subscribe();
        drop(bus.subscribe());
        bus.publish(GestureEvent::HandDetected);
        bus.publish(GestureEvent::HandLost);
        assert_eq!(keep.try_recv().unwrap(), GestureEvent::HandDetected);
        assert_eq!(keep.try_recv().unwrap(), GestureEvent::HandLost);
    }

    #[test]
    fn full_subscriber_queue_drops_instead_of_blocking() {
        let mut bus = EventBus::new();
        let rx = bus.subscribe();
        for _ in 0..(SUBSCRIBER_CAPACITY + 10) {
            bus.publish(GestureEvent::PinchStarted);
        }
        let mut received = 0;
        while rx.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, SUBSCRIBER_CAPACITY);
    }
}
