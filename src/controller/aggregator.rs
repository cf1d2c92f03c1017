//! Per-tick fold of device snapshots into console pad state

use crate::controller::analog::CirclePadAccumulator;
use crate::controller::digital::EdgeDetector;
use crate::controller::state::{CirclePad, TickParams};
use crate::device::InputSnapshot;
use crate::mapping::{MappingTable, PadState};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Turns polled snapshots into pad bits and a circle pad position
///
/// Every tick runs two passes over the same snapshots. The analog pass builds
/// the circle pad from the four direction targets and the modifier input. The
/// digital pass reduces every bound sample to a pressed decision per target
/// (pressed if any sample reaches the threshold) and feeds those decisions
/// through the edge detector. Targets without any sample this tick keep their
/// previous state.
#[derive(Debug, Clone, Default)]
pub struct TickAggregator {
    edges: EdgeDetector,
}

impl TickAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(
        &mut self,
        inputs: &[InputSnapshot],
        table: &MappingTable,
        params: &TickParams,
        pad_state: &mut PadState,
    ) -> CirclePad {
        let circle_pad = Self::analog_pass(inputs, table, params);
        let edges = self.digital_pass(inputs, table, params, pad_state);

        if edges > 0 {
            debug!(
                "Tick applied {} button transitions, pad state {:#010x}",
                edges,
                pad_state.bits()
            );
        }
        circle_pad
    }

    /// Forgets button history, e.g. after the mapping table was rebuilt
    pub fn reset(&mut self) {
        self.edges.clear();
    }

    fn analog_pass(
        inputs: &[InputSnapshot],
        table: &MappingTable,
        params: &TickParams,
    ) -> CirclePad {
        let mut accumulator = CirclePadAccumulator::new();
        for snapshot in inputs {
            for (mapping, &strength) in snapshot {
                accumulator.feed(mapping, strength, table.targets(mapping), params);
            }
        }

        let circle_pad = accumulator.finish(params);
        trace!(
            "Circle pad raw {:?} -> ({}, {})",
            accumulator.raw(),
            circle_pad.x,
            circle_pad.y
        );
        circle_pad
    }

    fn digital_pass(
        &mut self,
        inputs: &[InputSnapshot],
        table: &MappingTable,
        params: &TickParams,
        pad_state: &mut PadState,
    ) -> usize {
        let mut decisions = BTreeMap::new();
        for snapshot in inputs {
            for (mapping, &strength) in snapshot {
                for &target in table.targets(mapping) {
                    if target.is_analog() {
                        continue;
                    }
                    let pressed = decisions.entry(target).or_insert(false);
                    *pressed |= strength.abs() >= params.threshold;
                }
            }
        }

        decisions
            .into_iter()
            .filter_map(|(target, pressed)| self.edges.update(target, pressed, pad_state))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{InputMapping, VirtualTarget};

    fn table_with(bindings: &[(VirtualTarget, InputMapping)]) -> MappingTable {
        let mappings: Vec<_> = VirtualTarget::ALL
            .iter()
            .map(|target| {
                bindings
                    .iter()
                    .find(|(bound, _)| bound == target)
                    .map(|(_, mapping)| mapping.clone())
                    .unwrap_or_default()
            })
            .collect();
        MappingTable::build(&mappings)
    }

    fn snapshot(samples: &[(InputMapping, f32)]) -> InputSnapshot {
        samples.iter().cloned().collect()
    }

    #[test]
    fn one_key_drives_two_targets() {
        let key = InputMapping::keyboard(65);
        let table = table_with(&[(VirtualTarget::A, key.clone()), (VirtualTarget::B, key.clone())]);
        let params = TickParams::default();
        let mut aggregator = TickAggregator::new();
        let mut pad = PadState::empty();

        aggregator.process(&[snapshot(&[(key.clone(), 1.0)])], &table, &params, &mut pad);
        assert_eq!(pad, PadState::A | PadState::B);

        aggregator.process(&[snapshot(&[(key, 0.0)])], &table, &params, &mut pad);
        assert!(pad.is_empty());
    }

    #[test]
    fn empty_table_touches_nothing() {
        let table = MappingTable::default();
        let params = TickParams::default();
        let mut aggregator = TickAggregator::new();
        let mut pad = PadState::X;

        let circle_pad = aggregator.process(
            &[snapshot(&[(InputMapping::keyboard(65), 1.0)])],
            &table,
            &params,
            &mut pad,
        );
        assert_eq!(pad, PadState::X);
        assert_eq!(circle_pad, CirclePad::default());
    }

    #[test]
    fn each_device_decides_its_own_targets() {
        let pad0 = InputMapping::gamepad(0, "Button South");
        let pad1 = InputMapping::gamepad(1, "Button South");
        let table = table_with(&[
            (VirtualTarget::A, pad0.clone()),
            (VirtualTarget::B, pad1.clone()),
        ]);
        let mut aggregator = TickAggregator::new();
        let mut pad = PadState::empty();

        aggregator.process(
            &[snapshot(&[(pad0, 0.0)]), snapshot(&[(pad1, 0.9)])],
            &table,
            &TickParams::default(),
            &mut pad,
        );
        assert_eq!(pad, PadState::B);
    }

    #[test]
    fn negative_strength_counts_by_magnitude() {
        let axis = InputMapping::gamepad(0, "Axis LeftZ-");
        let table = table_with(&[(VirtualTarget::ZL, axis.clone())]);
        let mut aggregator = TickAggregator::new();
        let mut pad = PadState::empty();

        aggregator.process(&[snapshot(&[(axis, -0.9)])], &table, &TickParams::default(), &mut pad);
        assert_eq!(pad, PadState::ZL);
    }

    #[test]
    fn circle_directions_never_set_bits() {
        let up = InputMapping::keyboard(38);
        let table = table_with(&[(VirtualTarget::CircleUp, up.clone())]);
        let params = TickParams {
            deadzone: 0.0,
            ..TickParams::default()
        };
        let mut aggregator = TickAggregator::new();
        let mut pad = PadState::empty();

        let circle_pad = aggregator.process(&[snapshot(&[(up, 1.0)])], &table, &params, &mut pad);
        assert!(pad.is_empty());
        assert_eq!(circle_pad, CirclePad { x: 0, y: 156 });
    }
}
