//! Translation table from physical inputs to console targets

use crate::mapping::{InputMapping, VirtualTarget};
use std::collections::BTreeMap;
use tracing::debug;

/// Physical input → virtual targets
///
/// One physical input may drive several targets. The table is only ever
/// replaced as a whole; see [`MappingTable::build`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingTable {
    entries: BTreeMap<InputMapping, Vec<VirtualTarget>>,
}

impl MappingTable {
    /// Builds the table from the positional configuration list
    ///
    /// Entry `i` of `mappings` binds to `VirtualTarget::ALL[i]`. Unbound entries
    /// are skipped; extra entries beyond the known targets are ignored.
    pub fn build(mappings: &[InputMapping]) -> Self {
        let mut entries: BTreeMap<InputMapping, Vec<VirtualTarget>> = BTreeMap::new();

        for (mapping, target) in mappings.iter().zip(VirtualTarget::ALL) {
            if mapping.is_unbound() {
                continue;
            }
            entries.entry(mapping.clone()).or_default().push(target);
        }

        debug!(
            "Built mapping table with {} physical inputs from {} configured slots",
            entries.len(),
            mappings.len()
        );
        Self { entries }
    }

    /// Targets bound to `mapping`, empty when it is not bound at all
    pub fn targets(&self, mapping: &InputMapping) -> &[VirtualTarget] {
        self.entries
            .get(mapping)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InputMapping, &[VirtualTarget])> {
        self.entries.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_configuration_builds_empty_table() {
        let table = MappingTable::build(&[]);
        assert!(table.is_empty());
    }

    #[test]
    fn shared_input_accumulates_targets() {
        let jump = InputMapping::keyboard(32);
        let table = MappingTable::build(&[jump.clone(), jump.clone()]);

        assert_eq!(table.len(), 1);
        assert_eq!(table.targets(&jump), &[VirtualTarget::A, VirtualTarget::B]);
    }

    #[test]
    fn positions_bind_to_fixed_targets() {
        let mut mappings = vec![InputMapping::default(); VirtualTarget::COUNT];
        mappings[VirtualTarget::CircleUp as usize] = InputMapping::gamepad(0, "Axis LeftStickY+");
        mappings[VirtualTarget::Start as usize] = InputMapping::keyboard(13);

        let table = MappingTable::build(&mappings);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.targets(&InputMapping::gamepad(0, "Axis LeftStickY+")),
            &[VirtualTarget::CircleUp]
        );
        assert_eq!(
            table.targets(&InputMapping::keyboard(13)),
            &[VirtualTarget::Start]
        );
        assert!(table.targets(&InputMapping::keyboard(14)).is_empty());
    }

    #[test]
    fn rebuild_discards_previous_entries() {
        let first = MappingTable::build(&[InputMapping::keyboard(1)]);
        let second = MappingTable::build(&[InputMapping::keyboard(2)]);
        assert_ne!(first, second);
        assert!(second.targets(&InputMapping::keyboard(1)).is_empty());
    }

    #[test]
    fn iterates_in_mapping_order() {
        let table = MappingTable::build(&[
            InputMapping::keyboard(90),
            InputMapping::keyboard(88),
            InputMapping::keyboard(90),
        ]);

        let entries: Vec<_> = table.iter().collect();
        assert_eq!(
            entries,
            vec![
                (&InputMapping::keyboard(88), &[VirtualTarget::B][..]),
                (&InputMapping::keyboard(90), &[VirtualTarget::A, VirtualTarget::X][..]),
            ]
        );
    }
}
