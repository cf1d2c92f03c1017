//! Gamepads read through gilrs
//!
//! All gamepads of one backend share a single gilrs context. Polling pumps the
//! pending gilrs events (which keeps gilrs' cached gamepad state current) and then
//! samples every button and half-axis of the bound gamepad.

use crate::device::{DeviceError, DeviceHandle, InputDevice, InputSnapshot};
use crate::mapping::{DeviceFramework, DeviceIdentity, DeviceKind};
use gilrs::{Axis, Button, GamepadId, Gilrs};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const BUTTONS: [Button; 17] = [
    Button::South,
    Button::East,
    Button::North,
    Button::West,
    Button::LeftTrigger,
    Button::LeftTrigger2,
    Button::RightTrigger,
    Button::RightTrigger2,
    Button::Select,
    Button::Start,
    Button::Mode,
    Button::LeftThumb,
    Button::RightThumb,
    Button::DPadUp,
    Button::DPadDown,
    Button::DPadLeft,
    Button::DPadRight,
];

const AXES: [Axis; 6] = [
    Axis::LeftStickX,
    Axis::LeftStickY,
    Axis::RightStickX,
    Axis::RightStickY,
    Axis::LeftZ,
    Axis::RightZ,
];

type SharedGilrs = Arc<Mutex<Gilrs>>;

/// Source of gamepad devices
pub trait GamepadBackend: Send + Sync {
    /// Creates an uninitialized gamepad device
    fn open(&self) -> DeviceHandle;

    /// Every connected gamepad, already initialized
    fn enumerate(&self) -> Vec<DeviceHandle>;
}

/// Gamepad backend on top of one shared gilrs context
pub struct GilrsBackend {
    context: Option<SharedGilrs>,
}

impl GilrsBackend {
    /// Starts gilrs; on failure the backend stays usable but reports no gamepads
    pub fn new() -> Self {
        info!("Initializing gilrs controller interface");
        let context = match Gilrs::new() {
            Ok(gilrs) => {
                info!("Successfully initialized gilrs");
                Some(Arc::new(Mutex::new(gilrs)))
            }
            Err(e) => {
                error!("Failed to initialize gilrs: {}", e);
                None
            }
        };
        Self { context }
    }

    fn connected_count(&self) -> usize {
        match &self.context {
            Some(context) => {
                let mut gilrs = context.lock();
                while gilrs.next_event().is_some() {}
                gilrs.gamepads().count()
            }
            None => 0,
        }
    }
}

impl Default for GilrsBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GamepadBackend for GilrsBackend {
    fn open(&self) -> DeviceHandle {
        Arc::new(GilrsGamepad::new(self.context.clone()))
    }

    fn enumerate(&self) -> Vec<DeviceHandle> {
        let count = self.connected_count();
        info!("Found {} gamepads", count);

        (0..count)
            .filter_map(|index| {
                let gamepad = GilrsGamepad::new(self.context.clone());
                match gamepad.initialize(index) {
                    Ok(()) => Some(Arc::new(gamepad) as DeviceHandle),
                    Err(e) => {
                        warn!("Skipping gamepad {}: {}", index, e);
                        None
                    }
                }
            })
            .collect()
    }
}

/// One gilrs gamepad, bound by connection index
pub struct GilrsGamepad {
    context: Option<SharedGilrs>,
    index: AtomicUsize,
    id: Mutex<Option<GamepadId>>,
}

impl GilrsGamepad {
    fn new(context: Option<SharedGilrs>) -> Self {
        Self {
            context,
            index: AtomicUsize::new(0),
            id: Mutex::new(None),
        }
    }
}

impl InputDevice for GilrsGamepad {
    fn initialize(&self, index: usize) -> Result<(), DeviceError> {
        self.index.store(index, Ordering::Relaxed);

        let context = self
            .context
            .as_ref()
            .ok_or_else(|| DeviceError::BackendUnavailable("gilrs not initialized".into()))?;

        let mut gilrs = context.lock();
        while gilrs.next_event().is_some() {}

        let Some((id, gamepad)) = gilrs.gamepads().nth(index) else {
            return Err(DeviceError::NotConnected(index));
        };
        info!("Selected gamepad {}: {} ({})", index, gamepad.name(), id);
        *self.id.lock() = Some(id);
        Ok(())
    }

    fn poll(&self) -> InputSnapshot {
        let mut snapshot = InputSnapshot::new();
        let (Some(context), Some(id)) = (&self.context, *self.id.lock()) else {
            return snapshot;
        };

        let mut gilrs = context.lock();
        while let Some(event) = gilrs.next_event() {
            debug!("Processing gilrs event: {:?}", event.event);
        }

        let Some(gamepad) = gilrs.connected_gamepad(id) else {
            debug!("Gamepad {} disconnected", id);
            return snapshot;
        };

        let identity = self.identity();
        for button in BUTTONS {
            let strength = if gamepad.is_pressed(button) { 1.0 } else { 0.0 };
            snapshot.insert(identity.input(format!("Button {:?}", button)), strength);
        }
        for axis in AXES {
            let value = gamepad.value(axis);
            snapshot.insert(identity.input(format!("Axis {:?}+", axis)), value.max(0.0));
            snapshot.insert(identity.input(format!("Axis {:?}-", axis)), (-value).max(0.0));
        }
        snapshot
    }

    fn clear_edge_state(&self) {}

    fn identity(&self) -> DeviceIdentity {
        DeviceIdentity::new(
            DeviceFramework::Gilrs,
            DeviceKind::Gamepad,
            self.index.load(Ordering::Relaxed),
        )
    }
}
