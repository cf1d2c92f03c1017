//! Keyboard fed by the host window's key events

use crate::device::{DeviceError, InputDevice, InputSnapshot};
use crate::mapping::{DeviceFramework, DeviceIdentity, DeviceKind};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, trace};

/// Platform key code as delivered by the window system
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyCode(pub u32);

/// Keyboard device
///
/// The window thread reports transitions through [`Keyboard::key_pressed`] and
/// [`Keyboard::key_released`]; polls report every key seen since the last clear.
#[derive(Debug, Default)]
pub struct Keyboard {
    index: AtomicUsize,
    keys: Mutex<BTreeMap<KeyCode, bool>>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_pressed(&self, key: KeyCode) {
        trace!("Key pressed: {}", key.0);
        self.keys.lock().insert(key, true);
    }

    pub fn key_released(&self, key: KeyCode) {
        trace!("Key released: {}", key.0);
        self.keys.lock().insert(key, false);
    }
}

impl InputDevice for Keyboard {
    fn initialize(&self, index: usize) -> Result<(), DeviceError> {
        debug!("Keyboard bound to index {}", index);
        self.index.store(index, Ordering::Relaxed);
        Ok(())
    }

    fn poll(&self) -> InputSnapshot {
        // Copy under the lock, build the snapshot outside of it
        let keys = self.keys.lock().clone();
        let identity = self.identity();

        keys.into_iter()
            .map(|(key, pressed)| {
                let strength = if pressed { 1.0 } else { 0.0 };
                (identity.input(key.0.to_string()), strength)
            })
            .collect()
    }

    fn clear_edge_state(&self) {
        self.keys.lock().clear();
    }

    fn identity(&self) -> DeviceIdentity {
        DeviceIdentity::new(
            DeviceFramework::Window,
            DeviceKind::Keyboard,
            self.index.load(Ordering::Relaxed),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::InputMapping;

    #[test]
    fn poll_reports_seen_keys() {
        let keyboard = Keyboard::new();
        keyboard.initialize(0).unwrap();
        assert!(keyboard.poll().is_empty());

        keyboard.key_pressed(KeyCode(65));
        keyboard.key_pressed(KeyCode(66));
        keyboard.key_released(KeyCode(66));

        let snapshot = keyboard.poll();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[&InputMapping::keyboard(65)], 1.0);
        assert_eq!(snapshot[&InputMapping::keyboard(66)], 0.0);
    }

    #[test]
    fn clear_forgets_keys() {
        let keyboard = Keyboard::new();
        keyboard.key_pressed(KeyCode(65));
        keyboard.clear_edge_state();
        assert!(keyboard.poll().is_empty());
    }

    #[test]
    fn index_tags_the_samples() {
        let keyboard = Keyboard::new();
        keyboard.initialize(2).unwrap();
        keyboard.key_pressed(KeyCode(10));

        let snapshot = keyboard.poll();
        let (mapping, _) = snapshot.iter().next().unwrap();
        assert_eq!(mapping.to_string(), "Window/2/Keyboard/10");
    }
}
