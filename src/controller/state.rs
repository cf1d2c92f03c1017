//! Shared state read by the console side

use crate::config::InputConfig;
use crate::mapping::{InputMapping, PadState};
use tracing::warn;

/// Largest usable deadzone; at 1.0 the rescale divides by zero
pub const MAX_DEADZONE: f32 = 0.99;

/// Circle pad position in console units, y pointing up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CirclePad {
    pub x: i16,
    pub y: i16,
}

/// Touch screen state as set by the window thread
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TouchState {
    pub x: u16,
    pub y: u16,
    pub pressed: bool,
}

/// Snapshot handed to the HID consumer after every tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PadUpdate {
    pub buttons: PadState,
    pub circle_pad: CirclePad,
}

/// Per-tick tuning, captured from configuration at init and reload
#[derive(Debug, Clone, PartialEq)]
pub struct TickParams {
    pub modifier: InputMapping,
    pub modifier_scale: f32,
    pub deadzone: f32,
    pub max_circle_pad: i16,
    pub threshold: f32,
}

impl From<&InputConfig> for TickParams {
    fn from(config: &InputConfig) -> Self {
        Self {
            modifier: config.circle_pad_modifier.clone(),
            modifier_scale: config.circle_pad_modifier_scale,
            deadzone: usable_deadzone(config.circle_pad_deadzone),
            max_circle_pad: config.max_circle_pad,
            threshold: config.detect_threshold,
        }
    }
}

fn usable_deadzone(deadzone: f32) -> f32 {
    if (0.0..=MAX_DEADZONE).contains(&deadzone) {
        return deadzone;
    }
    // NaN ends up at 0
    let clamped = if deadzone > MAX_DEADZONE { MAX_DEADZONE } else { 0.0 };
    warn!("Circle pad deadzone {} out of range, using {}", deadzone, clamped);
    clamped
}

impl Default for TickParams {
    fn default() -> Self {
        Self::from(&InputConfig::default())
    }
}
