//! Circle pad: direction inputs folded into one deadzoned stick vector

use crate::controller::state::{CirclePad, TickParams};
use crate::mapping::{InputMapping, VirtualTarget};

/// Radial deadzone
///
/// Inputs with a magnitude at or below `deadzone` collapse to the origin. The
/// remaining range `[deadzone, 1]` is stretched onto `[0, 1]` along the original
/// direction.
pub fn apply_deadzone(x: f32, y: f32, deadzone: f32) -> (f32, f32) {
    let magnitude = (x * x + y * y).sqrt();
    if magnitude <= deadzone || magnitude == 0.0 {
        return (0.0, 0.0);
    }

    let rescaled = (magnitude - deadzone) / (1.0 - deadzone);
    let normalized_x = x / magnitude;
    let normalized_y = y / magnitude;
    (normalized_x * rescaled, normalized_y * rescaled)
}

/// Collects one tick's circle pad contributions
///
/// Each direction keeps the last non-zero strength it saw; contributions from
/// several devices bound to the same direction are not summed.
#[derive(Debug, Clone)]
pub struct CirclePadAccumulator {
    x: f32,
    y: f32,
    modifier: f32,
}

impl Default for CirclePadAccumulator {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            modifier: 1.0,
        }
    }
}

impl CirclePadAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one sample together with the targets its input is bound to
    pub fn feed(
        &mut self,
        mapping: &InputMapping,
        strength: f32,
        targets: &[VirtualTarget],
        params: &TickParams,
    ) {
        if strength != 0.0 {
            for target in targets {
                match target {
                    VirtualTarget::CircleUp => self.y = -strength,
                    VirtualTarget::CircleDown => self.y = strength,
                    VirtualTarget::CircleLeft => self.x = -strength,
                    VirtualTarget::CircleRight => self.x = strength,
                    _ => {}
                }
            }
        }

        if *mapping == params.modifier {
            self.modifier = if strength > params.threshold {
                params.modifier_scale
            } else {
                1.0
            };
        }
    }

    /// Raw stick vector before deadzone, screen convention (y down)
    pub fn raw(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Final circle pad in console units, y flipped to point up
    ///
    /// Each axis is bounded to `max_circle_pad` before the modifier applies.
    pub fn finish(&self, params: &TickParams) -> CirclePad {
        let (x, y) = apply_deadzone(self.x, self.y, params.deadzone);
        let (x, y) = (x.clamp(-1.0, 1.0), y.clamp(-1.0, 1.0));
        let max = f32::from(params.max_circle_pad);

        CirclePad {
            x: (x * max * self.modifier) as i16,
            y: (y * max * -1.0 * self.modifier) as i16,
        }
    }
}
