//! Edge-triggered digital buttons

use crate::mapping::{PadState, VirtualTarget};
use std::collections::BTreeMap;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Pressed,
    Released,
}

/// Last known pressed/released state per digital target
///
/// The pad state is only touched on a transition, so a button held across many
/// ticks sets its bit once, and bits written by someone else (see
/// `InputCore::set_pad_state`) survive until the bound input changes.
#[derive(Debug, Clone, Default)]
pub struct EdgeDetector {
    pressed: BTreeMap<VirtualTarget, bool>,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one tick's decision for `target`, returning the transition if any
    pub fn update(
        &mut self,
        target: VirtualTarget,
        pressed: bool,
        pad_state: &mut PadState,
    ) -> Option<Edge> {
        if target.is_analog() {
            return None;
        }
        let bit = target.pad_bit();
        let was_pressed = self.pressed.entry(target).or_insert(false);

        match (*was_pressed, pressed) {
            (false, true) => {
                *was_pressed = true;
                pad_state.insert(bit);
                trace!("{} pressed", target);
                Some(Edge::Pressed)
            }
            (true, false) => {
                *was_pressed = false;
                pad_state.remove(bit);
                trace!("{} released", target);
                Some(Edge::Released)
            }
            _ => None,
        }
    }

    pub fn is_pressed(&self, target: VirtualTarget) -> bool {
        self.pressed.get(&target).copied().unwrap_or(false)
    }

    /// Forgets every target; all read as released afterwards
    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_button_transitions_once() {
        let mut edges = EdgeDetector::new();
        let mut pad = PadState::empty();
        let samples = [false, true, true, true, true, false, false];

        let transitions: Vec<_> = samples
            .iter()
            .filter_map(|&pressed| edges.update(VirtualTarget::A, pressed, &mut pad))
            .collect();

        assert_eq!(transitions, vec![Edge::Pressed, Edge::Released]);
        assert!(pad.is_empty());
    }

    #[test]
    fn externally_set_bit_survives_while_input_idle() {
        let mut edges = EdgeDetector::new();
        let mut pad = PadState::B;

        assert_eq!(edges.update(VirtualTarget::B, false, &mut pad), None);
        assert!(pad.contains(PadState::B));
    }

    #[test]
    fn analog_targets_are_ignored() {
        let mut edges = EdgeDetector::new();
        let mut pad = PadState::empty();

        assert_eq!(edges.update(VirtualTarget::CircleUp, true, &mut pad), None);
        assert!(!edges.is_pressed(VirtualTarget::CircleUp));
        assert!(pad.is_empty());
    }

    #[test]
    fn clear_resets_to_released() {
        let mut edges = EdgeDetector::new();
        let mut pad = PadState::empty();
        edges.update(VirtualTarget::Start, true, &mut pad);

        edges.clear();
        assert!(!edges.is_pressed(VirtualTarget::Start));
        assert_eq!(
            edges.update(VirtualTarget::Start, true, &mut pad),
            Some(Edge::Pressed)
        );
    }
}
