//! Physical input devices
//!
//! Every device exposes the same capability set through [`InputDevice`]:
//!
//! 1. [`InputDevice::initialize`] - bind to the n-th device of its kind
//! 2. [`InputDevice::poll`] - sample every input into an [`InputSnapshot`]
//! 3. [`InputDevice::clear_edge_state`] - forget latched key state
//!
//! Devices are shared as [`DeviceHandle`]s. A handle lives as long as either the
//! active device set or an outside caller (e.g. the window feeding the keyboard)
//! still holds it.

pub mod gamepad;
pub mod keyboard;
pub mod registry;

pub use gamepad::{GamepadBackend, GilrsBackend, GilrsGamepad};
pub use keyboard::{KeyCode, Keyboard};
pub use registry::DeviceRegistry;

use crate::mapping::{DeviceIdentity, InputMapping};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Strength per physical input for one poll, in `[-1, 1]` for axes and `[0, 1]` for buttons
pub type InputSnapshot = BTreeMap<InputMapping, f32>;

/// Shared handle to a live device
pub type DeviceHandle = Arc<dyn InputDevice>;

// Device errors
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Input backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("No device connected at index {0}")]
    NotConnected(usize),
}

/// Capability interface implemented by every input source
///
/// Implementations synchronize internally: `poll` may run on the tick thread
/// while a detection session polls the same device from a UI thread.
pub trait InputDevice: Send + Sync {
    /// Binds the device to its connection index
    fn initialize(&self, index: usize) -> Result<(), DeviceError>;

    /// Samples every input the device knows about
    fn poll(&self) -> InputSnapshot;

    /// Clears latched state from previous polls
    fn clear_edge_state(&self);

    fn identity(&self) -> DeviceIdentity;
}
