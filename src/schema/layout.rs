//! Byte layout of channels inside the flat telemetry store.
//!
//! The store mirrors a packed C struct. Non-trailer channels come first, in the
//! order general, truck, trailer group and declaration order within each group. A
//! block holding every trailer channel follows, repeated once per trailer slot.
//!
//! Each channel slot is laid out value first:
//!
//! ```text
//! plain:   [value][initialized: u8]
//! indexed: [capacity × value][initialized: u8][count: u32]
//! ```
//!
//! Event records are framed per response and have no place in the store.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::tree::{NodeKind, SchemaTree, TelemetryId, TelemetryNode};
use crate::codec::{INITIALIZED_FLAG_SIZE, channel_storage_size};
use crate::{CommunicationResult, Result, TelemetryError};

/// Byte offsets of one channel slot inside the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct FieldOffsets {
    pub value: usize,
    pub initialized: usize,
    /// Present for indexed channels only.
    pub count: Option<usize>,
}

impl FieldOffsets {
    /// First byte of the slot.
    pub fn slot_start(&self) -> usize {
        self.value
    }

    /// Total bytes the slot occupies.
    pub fn slot_len(&self) -> usize {
        let end = match self.count {
            Some(count) => count + crate::codec::COUNT_FIELD_SIZE,
            None => self.initialized + INITIALIZED_FLAG_SIZE,
        };
        end - self.value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
    offset: usize,
    trailer: bool,
}

/// Slot offsets for every channel, computed once per schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StorageLayout {
    slots: HashMap<TelemetryId, Slot>,
    order: Vec<TelemetryId>,
    regular_size: usize,
    trailer_block_size: usize,
    trailer_count: u32,
}

impl StorageLayout {
    pub(crate) fn compute(nodes: &[TelemetryNode], channels: TelemetryId, trailer_count: u32) -> Self {
        let mut layout = Self {
            slots: HashMap::new(),
            order: Vec::new(),
            regular_size: 0,
            trailer_block_size: 0,
            trailer_count,
        };

        let groups = match nodes.get(channels.index()).map(|node| &node.kind) {
            Some(NodeKind::Structure(structure)) => structure.children.as_slice(),
            _ => &[][..],
        };
        let members = groups.iter().filter_map(|group| match nodes.get(group.index()).map(|n| &n.kind) {
            Some(NodeKind::Structure(structure)) => Some(structure.children.iter()),
            _ => None,
        });

        for id in members.flatten() {
            let Some(NodeKind::Channel(channel)) = nodes.get(id.index()).map(|node| &node.kind) else {
                continue;
            };
            let size = channel_storage_size(channel.value_type, channel.indexed, channel.max_count);
            let region = if channel.is_trailer_channel {
                &mut layout.trailer_block_size
            } else {
                &mut layout.regular_size
            };
            layout.slots.insert(*id, Slot { offset: *region, trailer: channel.is_trailer_channel });
            *region += size;
            layout.order.push(*id);
        }

        layout
    }

    pub(crate) fn store_size(&self) -> usize {
        self.regular_size + self.trailer_count as usize * self.trailer_block_size
    }
}

impl SchemaTree {
    /// Total size of the flat store.
    pub fn store_size(&self) -> usize {
        self.layout().store_size()
    }

    /// Size of the region holding non-trailer channels.
    pub fn regular_region_size(&self) -> usize {
        self.layout().regular_size
    }

    /// Size of one trailer block.
    pub fn trailer_block_size(&self) -> usize {
        self.layout().trailer_block_size
    }

    /// Channels in store order.
    pub fn store_fields(&self) -> impl Iterator<Item = &TelemetryNode> + '_ {
        self.layout().order.iter().filter_map(|id| self.node(*id))
    }

    /// Offsets of a channel inside the store.
    ///
    /// Trailer channels default to trailer slot 0. Passing an index for a
    /// non-trailer channel fails with `InvalidTrailerIndex`; an index past the
    /// trailer count fails with `TrailerIndexOutOfBounds`; ids that are not
    /// channels fail with `InvalidTelemetry`.
    pub fn offsets_of(&self, id: TelemetryId, trailer_index: Option<u32>) -> Result<FieldOffsets> {
        let channel = self
            .require(id)?
            .as_channel()
            .ok_or_else(|| TelemetryError::communication(CommunicationResult::InvalidTelemetry))?;
        let layout = self.layout();
        let slot = layout
            .slots
            .get(&id)
            .ok_or_else(|| TelemetryError::communication(CommunicationResult::InvalidTelemetry))?;

        let base = if slot.trailer {
            let index = trailer_index.unwrap_or(0);
            if index >= layout.trailer_count {
                return Err(TelemetryError::communication(
                    CommunicationResult::TrailerIndexOutOfBounds,
                ));
            }
            layout.regular_size + index as usize * layout.trailer_block_size + slot.offset
        } else {
            if trailer_index.is_some() {
                return Err(TelemetryError::communication(CommunicationResult::InvalidTrailerIndex));
            }
            slot.offset
        };

        let initialized = base + channel.value_type.byte_len() * channel.max_count as usize;
        Ok(FieldOffsets {
            value: base,
            initialized,
            count: channel.indexed.then_some(initialized + INITIALIZED_FLAG_SIZE),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchemaConfig;
    use crate::schema::TelemetryDefinitions;
    use crate::test_utils::{channel_definition, minimal_definitions, sample_definitions};
    use crate::types::PrimitiveType;

    fn build(definitions: &TelemetryDefinitions) -> SchemaTree {
        SchemaTree::build(definitions, &SchemaConfig::default()).unwrap()
    }

    #[cfg(test)]
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        prop_compose! {
            fn arb_channel()(
                ty in prop::sample::select(
                    PrimitiveType::ALL.into_iter().filter(|ty| ty.is_constant_size()).collect::<Vec<_>>()
                ),
                indexed in any::<bool>(),
                capacity in 1u32..20,
                group in prop::sample::select(vec!["SCS_TELEMETRY_CHANNEL", "SCS_TELEMETRY_TRUCK_CHANNEL", "SCS_TELEMETRY_TRAILER_CHANNEL"]),
            ) -> (PrimitiveType, bool, u32, &'static str) {
                (ty, indexed, capacity, group)
            }
        }

        fn definitions_from(channels: &[(PrimitiveType, bool, u32, &'static str)]) -> TelemetryDefinitions {
            let mut definitions = TelemetryDefinitions::default();
            for (i, (ty, indexed, capacity, group)) in channels.iter().enumerate() {
                let mut channel = channel_definition(&format!("{}_field{}", group, i), *ty);
                channel.indexed = *indexed;
                channel.max_count = if *indexed { *capacity } else { 1 };
                channel.is_trailer_channel = group.starts_with("SCS_TELEMETRY_TRAILER");
                definitions.channels.push(channel);
            }
            definitions
        }

        proptest! {
            #[test]
            fn slots_tile_each_region_without_overlap(channels in prop::collection::vec(arb_channel(), 0..24)) {
                let tree = build(&definitions_from(&channels));

                let mut regular_end = 0;
                let mut trailer_end = tree.regular_region_size();
                for node in tree.store_fields() {
                    let channel = node.as_channel().unwrap();
                    let offsets = tree.offsets_of(node.id, None).unwrap();
                    prop_assert!(offsets.initialized >= offsets.value);
                    if let Some(count) = offsets.count {
                        prop_assert_eq!(count, offsets.initialized + 1);
                    }
                    let end = if channel.is_trailer_channel { &mut trailer_end } else { &mut regular_end };
                    prop_assert_eq!(offsets.value, *end);
                    *end += offsets.slot_len();
                }
                prop_assert_eq!(regular_end, tree.regular_region_size());
                prop_assert_eq!(trailer_end, tree.regular_region_size() + tree.trailer_block_size());
                prop_assert_eq!(
                    tree.store_size(),
                    tree.regular_region_size() + 10 * tree.trailer_block_size()
                );
            }

            #[test]
            fn layout_is_deterministic(channels in prop::collection::vec(arb_channel(), 0..16)) {
                let definitions = definitions_from(&channels);
                let first = build(&definitions);
                let second = build(&definitions);
                for node in first.store_fields() {
                    prop_assert_eq!(
                        first.offsets_of(node.id, None).unwrap(),
                        second.offsets_of(node.id, None).unwrap()
                    );
                }
            }
        }
    }

    #[test]
    fn minimal_store_matches_packed_struct() {
        let tree = build(&minimal_definitions());
        assert_eq!(tree.store_size(), 26);

        let speed = tree.lookup("truck_channel_speed").unwrap().id;
        assert_eq!(
            tree.offsets_of(speed, None).unwrap(),
            FieldOffsets { value: 0, initialized: 4, count: None }
        );

        let wheels = tree.lookup("truck_channel_wheel_substance").unwrap().id;
        let offsets = tree.offsets_of(wheels, None).unwrap();
        assert_eq!(offsets, FieldOffsets { value: 5, initialized: 21, count: Some(22) });
        assert_eq!(offsets.slot_len(), 21);
    }

    #[test]
    fn trailer_slots_are_strictly_increasing() {
        let tree = build(&sample_definitions());
        let connected = tree.lookup("trailer_channel_connected").unwrap().id;
        let bases: Vec<usize> = (0..tree.trailer_count())
            .map(|index| tree.offsets_of(connected, Some(index)).unwrap().value)
            .collect();
        assert!(bases.windows(2).all(|pair| pair[1] - pair[0] == tree.trailer_block_size()));
        assert_eq!(bases[0], tree.regular_region_size());
        assert_eq!(tree.offsets_of(connected, None).unwrap().value, bases[0]);
    }

    #[test]
    fn trailer_index_bounds() {
        let tree = build(&sample_definitions());
        let connected = tree.lookup("trailer_channel_connected").unwrap().id;
        for index in [tree.trailer_count(), tree.trailer_count() + 1, u32::MAX] {
            let err = tree.offsets_of(connected, Some(index)).unwrap_err();
            assert_eq!(
                err.communication_result(),
                Some(CommunicationResult::TrailerIndexOutOfBounds)
            );
        }
    }

    #[test]
    fn trailer_index_on_regular_channel_is_invalid() {
        let tree = build(&sample_definitions());
        let speed = tree.lookup("truck_channel_speed").unwrap().id;
        let err = tree.offsets_of(speed, Some(0)).unwrap_err();
        assert_eq!(err.communication_result(), Some(CommunicationResult::InvalidTrailerIndex));
    }

    #[test]
    fn non_channels_have_no_offsets() {
        let tree = build(&sample_definitions());
        for id in [TelemetryId::MASTER, tree.lookup("gameplay_job_delivered_info").unwrap().id, TelemetryId::new(9999)] {
            let err = tree.offsets_of(id, None).unwrap_err();
            assert_eq!(err.communication_result(), Some(CommunicationResult::InvalidTelemetry));
        }
    }

    #[test]
    fn store_order_follows_groups() {
        let tree = build(&sample_definitions());
        let groups: Vec<&str> = tree
            .store_fields()
            .map(|node| tree.parent(node.id).unwrap().name.as_str())
            .collect();
        let mut sorted = groups.clone();
        let rank = |name: &&str| match *name {
            "general" => 0,
            "truck" => 1,
            _ => 2,
        };
        sorted.sort_by_key(rank);
        assert_eq!(groups, sorted);
    }
}
