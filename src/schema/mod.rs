//! Telemetry schema
//!
//! This module turns the SDK's channel and event definitions into a tree of
//! numbered telemetry nodes, and derives the byte layout of the flat store.
//!
//! # Architecture
//!
//! - Definitions are loaded from JSON or YAML ([`TelemetryDefinitions`])
//! - [`SchemaTree::build`] groups them into structures, assigns stable ids and
//!   computes the store layout once
//! - [`StoreView`] reads channel slots out of a store buffer using the computed
//!   [`FieldOffsets`]
//!
//! The tree is immutable after build and can be shared between connections.

mod definitions;
mod layout;
mod store;
mod tree;

pub use definitions::{
    AttributeDefinition, ChannelDefinition, EventDefinition, EventInfoDefinition,
    TelemetryDefinitions,
};
pub use layout::FieldOffsets;
pub use store::StoreView;
pub use tree::{
    Attribute, Channel, ChannelCategory, EventInfo, EventMeta, NodeKind, SchemaTree, Structure,
    TRAILER_CONFIGURATION_NAME, TRAILER_STRUCTURE_NAME, TelemetryId, TelemetryNode,
};
