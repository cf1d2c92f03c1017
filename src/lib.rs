//! padcore - emulated console input core
//!
//! Resolves configured physical inputs into devices, polls them once per tick
//! and folds the samples into the console's pad register and circle pad.

pub mod config;
pub mod controller;
pub mod device;
pub mod hid;
pub mod mapping;
pub mod timing;

pub use config::{InputConfig, SettingsPortal, SettingsProvider};
pub use controller::{CirclePad, InputCore, PadUpdate, TouchState};
pub use device::{DeviceHandle, InputDevice, Keyboard};
pub use hid::{HidConsumer, WatchHidConsumer};
pub use mapping::{InputMapping, PadState, VirtualTarget};
pub use timing::{TickScheduler, TokioTickScheduler};
