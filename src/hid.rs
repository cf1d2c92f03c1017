//! Console-side consumer of pad updates

pub use crate::controller::state::PadUpdate;

use tokio::sync::watch;
use tracing::trace;

/// Receives the pad state after every input tick
///
/// Called from the tick context outside any input core lock. Implementations
/// must not block for long.
pub trait HidConsumer: Send + Sync {
    fn pad_state_updated(&self, update: PadUpdate);
}

/// Publishes pad updates on a watch channel
///
/// Receivers only wake when the pad actually changed.
#[derive(Debug)]
pub struct WatchHidConsumer {
    sender: watch::Sender<PadUpdate>,
}

impl WatchHidConsumer {
    pub fn new() -> (Self, watch::Receiver<PadUpdate>) {
        let (sender, receiver) = watch::channel(PadUpdate::default());
        (Self { sender }, receiver)
    }

    pub fn subscribe(&self) -> watch::Receiver<PadUpdate> {
        self.sender.subscribe()
    }
}

impl HidConsumer for WatchHidConsumer {
    fn pad_state_updated(&self, update: PadUpdate) {
        self.sender.send_if_modified(|current| {
            if *current == update {
                return false;
            }
            trace!("Pad update: {:?}", update);
            *current = update;
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::state::CirclePad;
    use crate::mapping::PadState;

    #[test]
    fn unchanged_update_does_not_wake_receivers() {
        let (consumer, mut receiver) = WatchHidConsumer::new();
        let update = PadUpdate {
            buttons: PadState::A,
            circle_pad: CirclePad { x: 10, y: -4 },
        };

        consumer.pad_state_updated(update);
        assert!(receiver.has_changed().unwrap());
        assert_eq!(*receiver.borrow_and_update(), update);

        consumer.pad_state_updated(update);
        assert!(!receiver.has_changed().unwrap());
    }

    #[test]
    fn late_subscriber_sees_latest_update() {
        let (consumer, _receiver) = WatchHidConsumer::new();
        let update = PadUpdate {
            buttons: PadState::START | PadState::L,
            circle_pad: CirclePad::default(),
        };
        consumer.pad_state_updated(update);

        let mut late = consumer.subscribe();
        assert!(!late.has_changed().unwrap());
        assert_eq!(*late.borrow_and_update(), update);
    }
}
