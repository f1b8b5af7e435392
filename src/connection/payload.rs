//! Decoding of telemetry response payloads.
//!
//! A payload is the serialization of one schema node:
//! - channel: plain storage, or fixed array storage when indexed
//! - event info: its attributes in order; indexed attributes are dynamic vectors,
//!   the rest plain storage, starting with the `latest` counter
//! - structure: its children in order, with the trailer structure and the trailer
//!   configuration each repeated once per trailer slot
//!
//! A request carrying a trailer count returns that many consecutive copies of the
//! trailer-addressed node.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::request::TrailerIndexOrCount;
use crate::codec::reader::ByteReader;
use crate::codec::{
    ChannelStorage, PlainStorage, read_dynamic_vector, read_fixed_array_storage,
    read_plain_storage,
};
use crate::schema::{NodeKind, SchemaTree, TelemetryId, TelemetryNode};
use crate::types::{ScsValue, Value};
use crate::{CommunicationResult, Result, TelemetryError};

/// Decoded attribute of an event record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum AttributeValue {
    Plain(PlainStorage),
    Vector(Vec<Value>),
}

/// Decoded event record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub struct EventRecord {
    pub name: String,
    pub attributes: Vec<(String, AttributeValue)>,
}

impl EventRecord {
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.iter().find(|(attribute, _)| attribute == name).map(|(_, value)| value)
    }

    /// Update counter of the record, `None` while uninitialized.
    pub fn latest(&self) -> Result<Option<u32>> {
        match self.attribute("latest") {
            Some(AttributeValue::Plain(plain)) => plain.get(),
            _ => Err(TelemetryError::FieldNotFound { field: format!("{}.latest", self.name) }),
        }
    }

    /// Typed value of a plain attribute, `None` while uninitialized.
    pub fn value<T: ScsValue>(&self, name: &str) -> Result<Option<T>> {
        match self.attribute(name) {
            Some(AttributeValue::Plain(plain)) => plain.get(),
            Some(AttributeValue::Vector(_)) => Err(TelemetryError::type_conversion(format!(
                "{}.{} is a vector",
                self.name, name
            ))),
            None => Err(TelemetryError::FieldNotFound { field: format!("{}.{}", self.name, name) }),
        }
    }
}

/// Decoded response payload, shaped like the requested node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DecodedTelemetry {
    Channel(ChannelStorage),
    EventInfo(EventRecord),
    Structure(Vec<(String, DecodedTelemetry)>),
    /// One entry per trailer slot.
    Repeated(Vec<DecodedTelemetry>),
}

impl DecodedTelemetry {
    /// Child of a structure by node name.
    pub fn get(&self, name: &str) -> Option<&DecodedTelemetry> {
        match self {
            DecodedTelemetry::Structure(children) => {
                children.iter().find(|(child, _)| child == name).map(|(_, value)| value)
            }
            _ => None,
        }
    }

    /// Follow a path of node names from this structure.
    pub fn path<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Option<&DecodedTelemetry> {
        names.into_iter().try_fold(self, |node, name| node.get(name))
    }

    pub fn as_channel(&self) -> Option<&ChannelStorage> {
        match self {
            DecodedTelemetry::Channel(storage) => Some(storage),
            _ => None,
        }
    }

    pub fn as_event_info(&self) -> Option<&EventRecord> {
        match self {
            DecodedTelemetry::EventInfo(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_repeated(&self) -> Option<&[DecodedTelemetry]> {
        match self {
            DecodedTelemetry::Repeated(items) => Some(items),
            _ => None,
        }
    }
}

/// Check a request against the schema before it goes on the wire.
pub fn validate_request(
    tree: &SchemaTree,
    id: TelemetryId,
    argument: TrailerIndexOrCount,
) -> Result<()> {
    tree.require(id)?;
    if argument.is_default() {
        return Ok(());
    }
    if !tree.is_trailer_addressed(id) {
        return Err(TelemetryError::communication(CommunicationResult::InvalidTrailerIndex));
    }
    let magnitude = u32::from(argument.index_or_count);
    if argument.is_count && magnitude > tree.trailer_count() {
        return Err(TelemetryError::communication(CommunicationResult::TrailerCountOutOfBounds));
    }
    if !argument.is_count && magnitude >= tree.trailer_count() {
        return Err(TelemetryError::communication(CommunicationResult::TrailerIndexOutOfBounds));
    }
    Ok(())
}

/// Decode the payload for `id` starting at `offset`.
///
/// Returns the decoded node and the number of bytes consumed.
pub fn decode_telemetry(
    tree: &SchemaTree,
    id: TelemetryId,
    argument: TrailerIndexOrCount,
    data: &[u8],
    offset: usize,
) -> Result<(DecodedTelemetry, usize)> {
    validate_request(tree, id, argument)?;
    let node = tree.require(id)?;
    let mut reader = ByteReader::new(data, offset);

    let decoded = if argument.is_count {
        let copies = (0..argument.index_or_count)
            .map(|_| read_node(tree, node, &mut reader))
            .collect::<Result<Vec<_>>>()?;
        DecodedTelemetry::Repeated(copies)
    } else {
        read_node(tree, node, &mut reader)?
    };

    trace!(node = %node.name, %argument, bytes = reader.consumed(), "Decoded telemetry payload");
    Ok((decoded, reader.consumed()))
}

fn read_node(
    tree: &SchemaTree,
    node: &TelemetryNode,
    reader: &mut ByteReader<'_>,
) -> Result<DecodedTelemetry> {
    match &node.kind {
        NodeKind::Channel(channel) => {
            let storage = if channel.indexed {
                ChannelStorage::Array(read_fixed_array_storage(
                    channel.value_type,
                    channel.max_count,
                    reader,
                )?)
            } else {
                ChannelStorage::Plain(read_plain_storage(channel.value_type, reader)?)
            };
            Ok(DecodedTelemetry::Channel(storage))
        }
        NodeKind::EventInfo(event_info) => {
            let attributes = event_info
                .attributes
                .iter()
                .map(|attribute| {
                    let value = if attribute.indexed {
                        AttributeValue::Vector(read_dynamic_vector(attribute.value_type, reader)?)
                    } else {
                        AttributeValue::Plain(read_plain_storage(attribute.value_type, reader)?)
                    };
                    Ok((attribute.simple_name.clone(), value))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(DecodedTelemetry::EventInfo(EventRecord { name: node.name.clone(), attributes }))
        }
        NodeKind::Structure(_) => {
            let children = tree
                .children(node.id)
                .map(|child| {
                    let value = if tree.is_trailer_template(child.id) {
                        DecodedTelemetry::Repeated(
                            (0..tree.trailer_count())
                                .map(|_| read_node(tree, child, reader))
                                .collect::<Result<Vec<_>>>()?,
                        )
                    } else {
                        read_node(tree, child, reader)?
                    };
                    Ok((child.name.clone(), value))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(DecodedTelemetry::Structure(children))
        }
    }
}
