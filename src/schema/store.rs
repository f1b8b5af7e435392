//! Direct reads from the flat telemetry store.

use tracing::trace;

use super::tree::{SchemaTree, TelemetryId};
use crate::codec::reader::ByteReader;
use crate::codec::{ArrayStorage, ChannelStorage, PlainStorage, decode_scalar};
use crate::types::ScsValue;
use crate::{Result, TelemetryError};

/// Read-only view over a store buffer laid out by a [`SchemaTree`].
#[derive(Debug, Clone, Copy)]
pub struct StoreView<'a> {
    tree: &'a SchemaTree,
    data: &'a [u8],
}

impl<'a> StoreView<'a> {
    /// Wrap `data`, which must hold at least [`SchemaTree::store_size`] bytes.
    pub fn new(tree: &'a SchemaTree, data: &'a [u8]) -> Result<Self> {
        let needed = tree.store_size();
        if data.len() < needed {
            return Err(TelemetryError::out_of_bounds(0, needed, data.len()));
        }
        Ok(Self { tree, data })
    }

    pub fn read(&self, id: TelemetryId, trailer_index: Option<u32>) -> Result<ChannelStorage> {
        let offsets = self.tree.offsets_of(id, trailer_index)?;
        let node = self.tree.require(id)?;
        let channel = node.as_channel().ok_or_else(|| {
            TelemetryError::type_conversion(format!("{} is not a channel", node.name))
        })?;
        if !channel.value_type.is_constant_size() {
            return Err(TelemetryError::type_conversion(format!(
                "{} has variable size and cannot live in the store",
                node.name
            )));
        }
        trace!(field = %node.name, offset = offsets.value, "Reading store slot");

        let size = channel.value_type.byte_len();
        let values = (0..channel.max_count as usize)
            .map(|slot| decode_scalar(channel.value_type, self.data, offsets.value + slot * size))
            .map(|decoded| decoded.map(|(value, _)| value))
            .collect::<Result<Vec<_>>>()?;
        let initialized = ByteReader::new(self.data, offsets.initialized).read_flag()?;

        match offsets.count {
            Some(count_offset) => {
                let count = ByteReader::new(self.data, count_offset).read_u32()?;
                if count > channel.max_count {
                    return Err(TelemetryError::deserialization(
                        count_offset,
                        format!("array count {} exceeds capacity {}", count, channel.max_count),
                    ));
                }
                Ok(ChannelStorage::Array(ArrayStorage { initialized, values, count }))
            }
            None => {
                let value = values.into_iter().next().ok_or_else(|| {
                    TelemetryError::deserialization(offsets.value, "channel has no value slot")
                })?;
                Ok(ChannelStorage::Plain(PlainStorage { initialized, value }))
            }
        }
    }

    pub fn read_named(&self, name: &str, trailer_index: Option<u32>) -> Result<ChannelStorage> {
        let id = self.tree.lookup(name)?.id;
        self.read(id, trailer_index)
    }

    /// Typed value of a plain channel, `None` while uninitialized.
    pub fn value<T: ScsValue>(&self, name: &str) -> Result<Option<T>> {
        match self.read_named(name, None)? {
            ChannelStorage::Plain(plain) => plain.get(),
            ChannelStorage::Array(_) => Err(TelemetryError::type_conversion(format!(
                "{} is indexed; read it with StoreView::read",
                name
            ))),
        }
    }
}
