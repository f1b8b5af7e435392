//! Telemetry schema tree.
//!
//! The tree is an arena of [`TelemetryNode`]s indexed by [`TelemetryId`]. Parent links
//! are ids into the same arena, so the structure has no owning cycles. IDs follow a
//! fixed global order (structures, then event infos, then channels, with `master`
//! relocated to id 0) that depends only on the definition list, which keeps client
//! and plugin builds in agreement.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::definitions::{
    AttributeDefinition, ChannelDefinition, EventDefinition, EventInfoDefinition,
    TelemetryDefinitions,
};
use super::layout::StorageLayout;
use crate::config::SchemaConfig;
use crate::types::PrimitiveType;
use crate::{CommunicationResult, Result, TelemetryError};

/// Name of the structure grouping per-trailer channels.
pub const TRAILER_STRUCTURE_NAME: &str = "trailer";

/// Name of the per-trailer configuration record.
pub const TRAILER_CONFIGURATION_NAME: &str = "configuration_trailer_info";

const MACRO_PREFIX: &str = "SCS_TELEMETRY_";

/// Stable numeric identifier of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
#[serde(transparent)]
pub struct TelemetryId(u32);

impl TelemetryId {
    /// The root structure always has id 0.
    pub const MASTER: TelemetryId = TelemetryId(0);

    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u32 {
        self.0
    }

    /// The id as sent in a request frame.
    pub fn to_wire(self) -> Result<u8> {
        u8::try_from(self.0)
            .map_err(|_| TelemetryError::communication(CommunicationResult::InvalidTelemetry))
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for TelemetryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Channel group, decided by the macro prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "tauri", derive(specta::Type))]
pub enum ChannelCategory {
    General,
    Truck,
    Trailer,
}

impl ChannelCategory {
    pub fn of(channel_macro: &str) -> Result<Self> {
        if channel_macro.starts_with("SCS_TELEMETRY_TRUCK_CHANNEL") {
            Ok(ChannelCategory::Truck)
        } else if channel_macro.starts_with("SCS_TELEMETRY_TRAILER_CHANNEL") {
            Ok(ChannelCategory::Trailer)
        } else if channel_macro.starts_with("SCS_TELEMETRY_CHANNEL")
            || channel_macro.starts_with("SCS_TELEMETRY_JOB_CHANNEL")
        {
            Ok(ChannelCategory::General)
        } else {
            Err(TelemetryError::schema(format!("unknown channel macro prefix: {}", channel_macro)))
        }
    }

    /// Name of the structure holding channels of this group.
    pub const fn structure_name(self) -> &'static str {
        match self {
            ChannelCategory::General => "general",
            ChannelCategory::Truck => "truck",
            ChannelCategory::Trailer => TRAILER_STRUCTURE_NAME,
        }
    }
}

/// Event domain a structure stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMeta {
    pub macro_name: String,
    pub expansion: String,
    pub simple_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Structure {
    pub children: Vec<TelemetryId>,
    pub event: Option<EventMeta>,
}

/// Attribute of an event record. The implicit `latest` counter has no macro.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub simple_name: String,
    pub macro_name: Option<String>,
    pub expansion: Option<String>,
    pub value_type: PrimitiveType,
    pub indexed: bool,
}

impl Attribute {
    fn latest() -> Self {
        Self {
            simple_name: "latest".to_string(),
            macro_name: None,
            expansion: None,
            value_type: PrimitiveType::U32,
            indexed: false,
        }
    }

    fn from_definition(definition: &AttributeDefinition) -> Result<Self> {
        if definition.value_type == PrimitiveType::Invalid {
            return Err(TelemetryError::schema(format!(
                "attribute {} has an invalid type",
                definition.macro_name
            )));
        }
        Ok(Self {
            simple_name: definition.simple_name.clone(),
            macro_name: Some(definition.macro_name.clone()),
            expansion: Some(definition.expansion.clone()),
            value_type: definition.value_type,
            indexed: definition.indexed,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventInfo {
    pub macro_name: String,
    pub expansion: String,
    pub simple_name: String,
    /// Simple name of the owning event.
    pub event: String,
    /// Attributes in wire order, starting with `latest`.
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub macro_name: String,
    pub expansion: String,
    pub simple_name: String,
    pub value_type: PrimitiveType,
    pub indexed: bool,
    /// Capacity when indexed, 1 otherwise.
    pub max_count: u32,
    pub is_trailer_channel: bool,
    pub category: ChannelCategory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    Structure(Structure),
    EventInfo(EventInfo),
    Channel(Channel),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryNode {
    pub id: TelemetryId,
    pub parent: Option<TelemetryId>,
    pub name: String,
    pub kind: NodeKind,
    pub constant_size: bool,
}

impl TelemetryNode {
    /// Sort rank used when assigning ids.
    pub const fn rank(&self) -> u8 {
        kind_rank(&self.kind)
    }

    pub fn as_structure(&self) -> Option<&Structure> {
        match &self.kind {
            NodeKind::Structure(structure) => Some(structure),
            _ => None,
        }
    }

    pub fn as_event_info(&self) -> Option<&EventInfo> {
        match &self.kind {
            NodeKind::EventInfo(event_info) => Some(event_info),
            _ => None,
        }
    }

    pub fn as_channel(&self) -> Option<&Channel> {
        match &self.kind {
            NodeKind::Channel(channel) => Some(channel),
            _ => None,
        }
    }
}

const fn kind_rank(kind: &NodeKind) -> u8 {
    match kind {
        NodeKind::Structure(_) => 0,
        NodeKind::EventInfo(_) => 1,
        NodeKind::Channel(_) => 2,
    }
}

/// Immutable schema built once from the telemetry definitions.
#[derive(Debug, Clone)]
pub struct SchemaTree {
    nodes: Vec<TelemetryNode>,
    by_name: HashMap<String, TelemetryId>,
    channels: TelemetryId,
    trailer_structure: TelemetryId,
    trailer_configuration: Option<TelemetryId>,
    trailer_count: u32,
    layout: StorageLayout,
}

/// Node under construction, addressed by its creation index.
struct Draft {
    name: String,
    kind: NodeKind,
    children: Vec<usize>,
    parent: Option<usize>,
}

impl Draft {
    fn structure(name: impl Into<String>, event: Option<EventMeta>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Structure(Structure { children: Vec::new(), event }),
            children: Vec::new(),
            parent: None,
        }
    }

    fn leaf(name: String, kind: NodeKind) -> Self {
        Self { name, kind, children: Vec::new(), parent: None }
    }

    fn into_node(self, id: TelemetryId, id_of: &[TelemetryId]) -> TelemetryNode {
        let kind = match self.kind {
            NodeKind::Structure(structure) => NodeKind::Structure(Structure {
                children: self.children.iter().map(|&child| id_of[child]).collect(),
                event: structure.event,
            }),
            other => other,
        };
        TelemetryNode {
            id,
            parent: self.parent.map(|parent| id_of[parent]),
            name: self.name,
            kind,
            constant_size: false,
        }
    }
}

struct Drafts(Vec<Draft>);

impl Drafts {
    fn push(&mut self, draft: Draft) -> usize {
        self.0.push(draft);
        self.0.len() - 1
    }

    fn attach(&mut self, parent: usize, child: usize) {
        self.0[parent].children.push(child);
        self.0[child].parent = Some(parent);
    }
}

impl SchemaTree {
    /// Build the tree from raw definitions.
    ///
    /// Fails with [`TelemetryError::Schema`] on malformed input: unknown channel
    /// prefixes, duplicate names, invalid value types or empty indexed channels.
    pub fn build(definitions: &TelemetryDefinitions, config: &SchemaConfig) -> Result<Self> {
        if config.trailer_count == 0 {
            return Err(TelemetryError::schema("trailer count must be at least 1"));
        }

        let mut drafts = Drafts(Vec::new());
        let mut order = Vec::new();

        for event in &definitions.events {
            if !config.is_telemetry_event(&event.macro_name) {
                debug!(event = %event.macro_name, "Skipping event outside telemetry domains");
                continue;
            }
            let structure = drafts.push(Draft::structure(
                event.simple_name.clone(),
                Some(EventMeta {
                    macro_name: event.macro_name.clone(),
                    expansion: event.expansion.clone(),
                    simple_name: event.simple_name.clone(),
                }),
            ));
            order.push(structure);
            for event_info in &event.event_infos {
                let node = drafts.push(event_info_draft(event, event_info)?);
                drafts.attach(structure, node);
                order.push(node);
            }
        }

        let general = drafts.push(Draft::structure(ChannelCategory::General.structure_name(), None));
        let truck = drafts.push(Draft::structure(ChannelCategory::Truck.structure_name(), None));
        let trailer = drafts.push(Draft::structure(ChannelCategory::Trailer.structure_name(), None));

        for definition in &definitions.channels {
            if config.is_excluded(&definition.macro_name) {
                debug!(channel = %definition.macro_name, "Excluding channel");
                continue;
            }
            let channel = channel_from_definition(definition)?;
            let group = match channel.category {
                ChannelCategory::General => general,
                ChannelCategory::Truck => truck,
                ChannelCategory::Trailer => trailer,
            };
            let node = drafts.push(Draft::leaf(channel_name(&channel.macro_name), NodeKind::Channel(channel)));
            drafts.attach(group, node);
            order.push(node);
        }

        let channels = drafts.push(Draft::structure("channels", None));
        for group in [general, truck, trailer] {
            drafts.attach(channels, group);
        }
        order.extend([channels, general, truck, trailer]);

        order.sort_by_key(|&draft| kind_rank(&drafts.0[draft].kind));

        let roots: Vec<usize> = order
            .iter()
            .copied()
            .filter(|&draft| {
                matches!(drafts.0[draft].kind, NodeKind::Structure(_))
                    && drafts.0[draft].parent.is_none()
            })
            .collect();
        let master = drafts.push(Draft::structure("master", None));
        for root in roots {
            drafts.attach(master, root);
        }
        order.insert(0, master);

        let mut id_of = vec![TelemetryId::MASTER; drafts.0.len()];
        for (position, &draft) in order.iter().enumerate() {
            let id = u32::try_from(position)
                .map_err(|_| TelemetryError::schema("too many telemetry nodes"))?;
            id_of[draft] = TelemetryId(id);
        }

        let mut slots: Vec<Option<TelemetryNode>> = (0..drafts.0.len()).map(|_| None).collect();
        for (index, draft) in drafts.0.into_iter().enumerate() {
            let id = id_of[index];
            slots[id.index()] = Some(draft.into_node(id, &id_of));
        }
        let mut nodes: Vec<TelemetryNode> = slots.into_iter().flatten().collect();

        let constant: Vec<bool> = (0..nodes.len()).map(|index| is_constant_size(&nodes, index)).collect();
        for (node, constant_size) in nodes.iter_mut().zip(constant) {
            node.constant_size = constant_size;
        }

        let mut by_name = HashMap::with_capacity(nodes.len());
        for node in &nodes {
            if by_name.insert(node.name.clone(), node.id).is_some() {
                return Err(TelemetryError::schema(format!("duplicate telemetry name: {}", node.name)));
            }
        }

        let channels = id_of[channels];
        let trailer_structure = id_of[trailer];
        let trailer_configuration = by_name.get(TRAILER_CONFIGURATION_NAME).copied();
        let layout = StorageLayout::compute(&nodes, channels, config.trailer_count);

        info!(
            nodes = nodes.len(),
            store_size = layout.store_size(),
            trailer_count = config.trailer_count,
            "Built telemetry schema"
        );

        Ok(Self {
            nodes,
            by_name,
            channels,
            trailer_structure,
            trailer_configuration,
            trailer_count: config.trailer_count,
            layout,
        })
    }

    /// The root structure.
    pub fn master(&self) -> &TelemetryNode {
        &self.nodes[TelemetryId::MASTER.index()]
    }

    /// The `channels` structure grouping general, truck and trailer channels.
    pub fn channels(&self) -> &TelemetryNode {
        &self.nodes[self.channels.index()]
    }

    /// The structure replicated once per trailer slot.
    pub fn trailer_structure(&self) -> &TelemetryNode {
        &self.nodes[self.trailer_structure.index()]
    }

    /// The configuration record replicated once per trailer slot, when the
    /// definitions contain one.
    pub fn trailer_configuration(&self) -> Option<&TelemetryNode> {
        self.trailer_configuration.map(|id| &self.nodes[id.index()])
    }

    pub fn trailer_count(&self) -> u32 {
        self.trailer_count
    }

    pub fn node(&self, id: TelemetryId) -> Option<&TelemetryNode> {
        self.nodes.get(id.index())
    }

    /// Like [`SchemaTree::node`], failing with `InvalidTelemetry` for unknown ids.
    pub fn require(&self, id: TelemetryId) -> Result<&TelemetryNode> {
        self.node(id)
            .ok_or_else(|| TelemetryError::communication(CommunicationResult::InvalidTelemetry))
    }

    pub fn find(&self, name: &str) -> Option<&TelemetryNode> {
        self.by_name.get(name).map(|id| &self.nodes[id.index()])
    }

    /// Like [`SchemaTree::find`], failing with `FieldNotFound`.
    pub fn lookup(&self, name: &str) -> Result<&TelemetryNode> {
        self.find(name).ok_or_else(|| TelemetryError::FieldNotFound { field: name.to_string() })
    }

    pub fn children(&self, id: TelemetryId) -> impl Iterator<Item = &TelemetryNode> + '_ {
        self.node(id)
            .and_then(TelemetryNode::as_structure)
            .map(|structure| structure.children.as_slice())
            .unwrap_or_default()
            .iter()
            .map(|child| &self.nodes[child.index()])
    }

    pub fn parent(&self, id: TelemetryId) -> Option<&TelemetryNode> {
        self.node(id)?.parent.and_then(|parent| self.node(parent))
    }

    /// All nodes in id order.
    pub fn nodes(&self) -> &[TelemetryNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether `id` is one of the two nodes physically repeated per trailer slot.
    pub fn is_trailer_template(&self, id: TelemetryId) -> bool {
        id == self.trailer_structure || Some(id) == self.trailer_configuration
    }

    /// Whether a request for `id` may carry a trailer index or count.
    pub fn is_trailer_addressed(&self, id: TelemetryId) -> bool {
        self.is_trailer_template(id)
            || self.node(id).and_then(TelemetryNode::as_channel).is_some_and(|c| c.is_trailer_channel)
    }

    pub(crate) fn layout(&self) -> &StorageLayout {
        &self.layout
    }
}

fn event_info_draft(event: &EventDefinition, event_info: &EventInfoDefinition) -> Result<Draft> {
    let attributes = std::iter::once(Ok(Attribute::latest()))
        .chain(event_info.attributes.iter().map(Attribute::from_definition))
        .collect::<Result<Vec<_>>>()?;
    Ok(Draft::leaf(
        format!("{}_{}_info", event.simple_name, event_info.simple_name),
        NodeKind::EventInfo(EventInfo {
            macro_name: event_info.macro_name.clone(),
            expansion: event_info.expansion.clone(),
            simple_name: event_info.simple_name.clone(),
            event: event.simple_name.clone(),
            attributes,
        }),
    ))
}

fn channel_from_definition(definition: &ChannelDefinition) -> Result<Channel> {
    let category = ChannelCategory::of(&definition.macro_name)?;
    if definition.value_type == PrimitiveType::Invalid {
        return Err(TelemetryError::schema(format!(
            "channel {} has an invalid type",
            definition.macro_name
        )));
    }
    if definition.indexed && definition.max_count == 0 {
        return Err(TelemetryError::schema(format!(
            "indexed channel {} has no capacity",
            definition.macro_name
        )));
    }
    if definition.is_trailer_channel != (category == ChannelCategory::Trailer) {
        warn!(
            channel = %definition.macro_name,
            is_trailer_channel = definition.is_trailer_channel,
            "Trailer flag disagrees with channel prefix"
        );
    }
    Ok(Channel {
        macro_name: definition.macro_name.clone(),
        expansion: definition.expansion.clone(),
        simple_name: definition.simple_name.clone(),
        value_type: definition.value_type,
        indexed: definition.indexed,
        max_count: if definition.indexed { definition.max_count } else { 1 },
        is_trailer_channel: definition.is_trailer_channel,
        category,
    })
}

/// `SCS_TELEMETRY_TRUCK_CHANNEL_speed` becomes `truck_channel_speed`.
fn channel_name(channel_macro: &str) -> String {
    channel_macro.strip_prefix(MACRO_PREFIX).unwrap_or(channel_macro).to_lowercase()
}

fn is_constant_size(nodes: &[TelemetryNode], index: usize) -> bool {
    match &nodes[index].kind {
        NodeKind::Channel(channel) => channel.value_type.is_constant_size(),
        NodeKind::EventInfo(_) => false,
        NodeKind::Structure(structure) => {
            structure.children.iter().all(|child| is_constant_size(nodes, child.index()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{channel_definition, minimal_definitions, sample_definitions};

    fn sample_tree() -> SchemaTree {
        SchemaTree::build(&sample_definitions(), &SchemaConfig::default()).unwrap()
    }

    #[test]
    fn master_is_id_zero_and_owns_root_structures() {
        let tree = sample_tree();
        let master = tree.master();
        assert_eq!(master.id, TelemetryId::MASTER);
        assert_eq!(master.name, "master");
        assert!(master.parent.is_none());
        let roots: Vec<&str> = tree.children(master.id).map(|n| n.name.as_str()).collect();
        assert_eq!(roots, vec!["configuration", "gameplay", "channels"]);
    }

    #[test]
    fn ids_follow_rank_order() {
        let tree = sample_tree();
        let ranks: Vec<u8> = tree.nodes().iter().skip(1).map(TelemetryNode::rank).collect();
        assert!(ranks.windows(2).all(|pair| pair[0] <= pair[1]));
        for (position, node) in tree.nodes().iter().enumerate() {
            assert_eq!(node.id.get() as usize, position);
        }
    }

    #[test]
    fn structures_come_in_definition_order() {
        let tree = sample_tree();
        let names: Vec<&str> = tree.nodes()[..8].iter().map(|n| n.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["master", "configuration", "gameplay", "channels", "general", "truck", "trailer",
                 "configuration_substances_info"]
        );
    }

    #[test]
    fn builds_are_deterministic() {
        let first = sample_tree();
        let second = sample_tree();
        assert_eq!(first.nodes(), second.nodes());
    }

    #[test]
    fn node_names() {
        let tree = sample_tree();
        assert!(tree.find("truck_channel_speed").is_some());
        assert!(tree.find("trailer_channel_connected").is_some());
        assert!(tree.find("channel_paused").is_some());
        assert!(tree.find("job_channel_cargo_damage").is_some());
        assert!(tree.find("gameplay_job_delivered_info").is_some());
        assert!(matches!(
            tree.lookup("truck_channel_warp"),
            Err(TelemetryError::FieldNotFound { .. })
        ));
    }

    #[test]
    fn channels_are_grouped_by_prefix() {
        let tree = sample_tree();
        let speed = tree.find("truck_channel_speed").unwrap();
        assert_eq!(tree.parent(speed.id).unwrap().name, "truck");
        let cargo = tree.find("job_channel_cargo_damage").unwrap();
        assert_eq!(tree.parent(cargo.id).unwrap().name, "general");
        let connected = tree.find("trailer_channel_connected").unwrap();
        assert_eq!(tree.parent(connected.id).unwrap().id, tree.trailer_structure().id);
    }

    #[test]
    fn event_infos_lead_with_latest() {
        let tree = sample_tree();
        for node in tree.nodes() {
            if let Some(event_info) = node.as_event_info() {
                let latest = &event_info.attributes[0];
                assert_eq!(latest.simple_name, "latest");
                assert_eq!(latest.value_type, PrimitiveType::U32);
                assert!(!latest.indexed);
                assert!(!node.constant_size);
            }
        }
    }

    #[test]
    fn constant_size_propagates_upwards() {
        let tree = sample_tree();
        // events contain records, which are never constant size
        assert!(!tree.master().constant_size);
        assert!(!tree.find("configuration").unwrap().constant_size);
        assert!(tree.find("truck").unwrap().constant_size);
        assert!(tree.channels().constant_size);
    }

    #[test]
    fn trailer_templates_are_designated() {
        let tree = sample_tree();
        assert_eq!(tree.trailer_structure().name, TRAILER_STRUCTURE_NAME);
        let configuration = tree.trailer_configuration().unwrap();
        assert_eq!(configuration.name, TRAILER_CONFIGURATION_NAME);
        assert!(tree.is_trailer_template(configuration.id));
        let connected = tree.find("trailer_channel_connected").unwrap();
        assert!(!tree.is_trailer_template(connected.id));
        assert!(tree.is_trailer_addressed(connected.id));
        assert!(!tree.is_trailer_addressed(tree.find("truck_channel_speed").unwrap().id));
    }

    #[test]
    fn minimal_schema_has_no_trailer_configuration() {
        let tree = SchemaTree::build(&minimal_definitions(), &SchemaConfig::default()).unwrap();
        assert!(tree.trailer_configuration().is_none());
        assert_eq!(tree.len(), 7);
        assert!(tree.master().constant_size);
    }

    #[test]
    fn unknown_prefix_aborts_build() {
        let mut definitions = minimal_definitions();
        definitions.channels.push(channel_definition("SCS_TELEMETRY_BOAT_CHANNEL_sail", PrimitiveType::Float));
        let err = SchemaTree::build(&definitions, &SchemaConfig::default()).unwrap_err();
        assert!(matches!(err, TelemetryError::Schema { .. }));
    }

    #[test]
    fn duplicate_channels_abort_build() {
        let mut definitions = minimal_definitions();
        let duplicate = definitions.channels[0].clone();
        definitions.channels.push(duplicate);
        let err = SchemaTree::build(&definitions, &SchemaConfig::default()).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn invalid_types_abort_build() {
        let mut definitions = minimal_definitions();
        definitions.channels[0].value_type = PrimitiveType::Invalid;
        assert!(SchemaTree::build(&definitions, &SchemaConfig::default()).is_err());
    }

    #[test]
    fn excluded_channels_are_skipped() {
        let config = SchemaConfig {
            exclude_channels: vec!["SCS_TELEMETRY_TRUCK_CHANNEL_speed".to_string()],
            ..SchemaConfig::default()
        };
        let tree = SchemaTree::build(&minimal_definitions(), &config).unwrap();
        assert!(tree.find("truck_channel_speed").is_none());
        assert!(tree.find("truck_channel_wheel_substance").is_some());
    }

    #[test]
    fn events_outside_domains_are_ignored() {
        let config = SchemaConfig { telemetry_events: vec![], ..SchemaConfig::default() };
        let tree = SchemaTree::build(&sample_definitions(), &config).unwrap();
        assert!(tree.find("configuration").is_none());
        assert!(tree.nodes().iter().all(|node| node.as_event_info().is_none()));
    }

    #[test]
    fn non_indexed_channels_have_capacity_one() {
        let mut definitions = minimal_definitions();
        definitions.channels[0].max_count = 7;
        let tree = SchemaTree::build(&definitions, &SchemaConfig::default()).unwrap();
        let speed = tree.find("truck_channel_speed").unwrap().as_channel().unwrap();
        assert_eq!(speed.max_count, 1);
    }

    #[test]
    fn wire_ids_must_fit_a_byte() {
        assert_eq!(TelemetryId::new(200).to_wire().unwrap(), 200);
        let err = TelemetryId::new(256).to_wire().unwrap_err();
        assert_eq!(err.communication_result(), Some(CommunicationResult::InvalidTelemetry));
    }

    #[test]
    fn zero_trailer_count_is_rejected() {
        let config = SchemaConfig { trailer_count: 0, ..SchemaConfig::default() };
        assert!(SchemaTree::build(&minimal_definitions(), &config).is_err());
    }
}
