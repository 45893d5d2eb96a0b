//! # powerplan-core: Temporary Power Plan Model
//!
//! Data structures for planning generator-fed temporary power installations
//! (events, film sets): generators feed distribution panels ("distros"), which
//! feed further distros and finally loads.
//!
//! ## Design
//!
//! A [`Plan`] is a **directed graph** (petgraph `DiGraph<PowerNode, Connection>`):
//! - **Nodes**: equipment ([`NodeKind::Generator`], [`NodeKind::Distro`],
//!   [`NodeKind::Amf`]), loads, and logical grid links
//! - **Edges**: cable runs ([`Connection`]), directed from supply to load
//!
//! The graph owns every node. Nodes never hold a pointer back to their plan;
//! a [`NodeIndex`] is the handle used to query a node's neighbours.
//!
//! Behaviour is dispatched on capability rather than concrete kind:
//!
//! | Capability | Kinds | Meaning |
//! |------------|-------|---------|
//! | source | Generator, LogicalSource | no inputs, outputs only |
//! | sink | Load, LogicalSink | consumes load, no electrical solving |
//! | distributable | Distro, Amf | has inputs and outputs |
//! | multi-input | Amf | may legally have two supplies |
//!
//! ## Quick Start
//!
//! ```rust
//! use powerplan_core::*;
//!
//! let mut plan = Plan::new().with_name("Main stage");
//! let gen = plan.add_node(PowerNode::generator("A", "135kVA"));
//! let a1 = plan.add_node(PowerNode::distro("A1", "SPEC-7"));
//! let load = plan.add_node(PowerNode::load("A1 Load", 12_000.0));
//!
//! plan.add_connection(gen, a1, Connection::new(400.0, 3).with_length(10.0));
//! plan.add_connection(a1, load, Connection::unrated());
//!
//! assert_eq!(plan.nodes(false).count(), 2);
//! assert_eq!(plan.nodes(true).count(), 3);
//! ```
//!
//! ## Modules
//!
//! - [`catalog`] - Equipment and cable stock lookup
//! - [`cable_data`] - Cable rating and voltage drop reference tables
//! - [`diagnostics`] - Collected validation findings
//! - [`graph_utils`] - Connectivity helpers
//! - [`units`] - Unit-safe electrical quantities

use std::collections::BTreeSet;
use std::sync::Arc;

use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;
use tracing::{debug, trace};

pub mod cable_data;
pub mod catalog;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod graph_utils;
pub mod units;

pub use cable_data::{CableConfiguration, Methodology};
pub use catalog::{
    CableSpec, Catalog, EquipmentCatalog, EquipmentKind, EquipmentSpec, PortSpec, VoltageDrop,
};
pub use config::PlanConfig;
pub use diagnostics::{Category, Finding, Findings, Severity};
pub use error::{PlanError, PlanResult, PortSide};
pub use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
pub use units::{Amperes, Meters, MilliohmsPerMeter, Ohms, VoltAmperes, Volts, Watts};

/// Stand-in supply for one input of an AMF panel once its grids are split.
///
/// Carries the electrical state seen at that AMF input in the undivided plan,
/// so the AMF's own grid can be analyzed on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalSource {
    pub voltage: Volts,
    pub v_drop: Option<Volts>,
    pub z_s: Option<Ohms>,
    pub spec: EquipmentSpec,
}

impl LogicalSource {
    pub fn new(
        voltage: Volts,
        v_drop: Option<Volts>,
        z_s: Option<Ohms>,
        current: Amperes,
        phases: u8,
    ) -> Self {
        Self {
            voltage,
            v_drop,
            z_s,
            spec: EquipmentSpec::link(true, current, phases),
        }
    }

    pub fn rated_current(&self) -> Option<Amperes> {
        self.spec.outputs.first().map(|p| p.current)
    }
}

/// Stand-in load for the AMF panel on the upstream side of a split.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalSink {
    pub load: Watts,
    pub spec: EquipmentSpec,
}

impl LogicalSink {
    pub fn new(load: Watts, current: Amperes, phases: u8) -> Self {
        Self {
            load,
            spec: EquipmentSpec::link(false, current, phases),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Generator,
    Distro,
    /// Automatic mains failure panel: two supplies, one live at a time
    Amf,
    /// Fixed load
    Load(Watts),
    LogicalSource(LogicalSource),
    LogicalSink(LogicalSink),
}

impl NodeKind {
    /// Outputs only, no inputs
    pub fn is_source(&self) -> bool {
        matches!(self, NodeKind::Generator | NodeKind::LogicalSource(_))
    }

    /// Consumes load; no electrical quantities are solved at a sink
    pub fn is_sink(&self) -> bool {
        matches!(self, NodeKind::Load(_) | NodeKind::LogicalSink(_))
    }

    /// Has inputs and outputs; fault and drop values propagate through it
    pub fn is_distributable(&self) -> bool {
        matches!(self, NodeKind::Distro | NodeKind::Amf)
    }

    /// May legally have more than one electrical input
    pub fn is_multi_input(&self) -> bool {
        matches!(self, NodeKind::Amf)
    }

    /// Not physical equipment: skipped by default iteration, port assignment,
    /// cabling and validation
    pub fn is_virtual(&self) -> bool {
        matches!(
            self,
            NodeKind::Load(_) | NodeKind::LogicalSource(_) | NodeKind::LogicalSink(_)
        )
    }

    /// Inserted by grid partitioning
    pub fn is_logical(&self) -> bool {
        matches!(self, NodeKind::LogicalSource(_) | NodeKind::LogicalSink(_))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Generator => "Generator",
            NodeKind::Distro => "Distro",
            NodeKind::Amf => "AMF",
            NodeKind::Load(_) => "Load",
            NodeKind::LogicalSource(_) => "LogicalSource",
            NodeKind::LogicalSink(_) => "LogicalSink",
        }
    }
}

/// Port indices already taken by a cable, one cable per physical port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortAllocation {
    pub inputs: BTreeSet<usize>,
    pub outputs: BTreeSet<usize>,
}

impl PortAllocation {
    pub fn is_allocated(&self, side: PortSide, port: usize) -> bool {
        match side {
            PortSide::Input => self.inputs.contains(&port),
            PortSide::Output => self.outputs.contains(&port),
        }
    }

    /// Returns false if the port was already taken.
    pub fn allocate(&mut self, side: PortSide, port: usize) -> bool {
        match side {
            PortSide::Input => self.inputs.insert(port),
            PortSide::Output => self.outputs.insert(port),
        }
    }

    /// Returns false if the port was not taken.
    pub fn release(&mut self, side: PortSide, port: usize) -> bool {
        match side {
            PortSide::Input => self.inputs.remove(&port),
            PortSide::Output => self.outputs.remove(&port),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PowerNode {
    /// Unique within a plan; duplicates are reported by validation
    pub name: Option<String>,
    /// Catalog type name; `None` means not yet assigned
    pub equipment: Option<String>,
    pub id: Option<u64>,
    pub kind: NodeKind,
    pub ports: PortAllocation,
}

impl PowerNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: None,
            equipment: None,
            id: None,
            kind,
            ports: PortAllocation::default(),
        }
    }

    pub fn generator(name: impl Into<String>, equipment: impl Into<String>) -> Self {
        Self::new(NodeKind::Generator)
            .with_name(name)
            .with_equipment(equipment)
    }

    pub fn distro(name: impl Into<String>, equipment: impl Into<String>) -> Self {
        Self::new(NodeKind::Distro)
            .with_name(name)
            .with_equipment(equipment)
    }

    pub fn amf(name: impl Into<String>, equipment: impl Into<String>) -> Self {
        Self::new(NodeKind::Amf)
            .with_name(name)
            .with_equipment(equipment)
    }

    pub fn load(name: impl Into<String>, watts: f64) -> Self {
        Self::new(NodeKind::Load(Watts(watts))).with_name(name)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_equipment(mut self, equipment: impl Into<String>) -> Self {
        self.equipment = Some(equipment.into());
        self
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Human-readable label, e.g. `Distro(A1)`.
    pub fn label(&self) -> String {
        let kind = self.kind.type_name();
        match (&self.name, self.id) {
            (Some(name), _) => format!("{kind}({name})"),
            (None, Some(id)) => format!("{kind}(id={id})"),
            (None, None) => format!("{kind}(unnamed)"),
        }
    }
}

impl std::fmt::Display for PowerNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// A cable run between two nodes.
///
/// The first group of fields is supplied by the planner; the rest are filled
/// in by plan generation and are `None` until then.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    /// Rated current of the run; `None` for connections to loads
    pub current: Option<Amperes>,
    pub phases: u8,
    /// Required run length
    pub length: Option<Meters>,
    /// No physical cable of its own (adaptor tail or grid link)
    pub logical: bool,
    /// Protective device rating when it differs from `current`
    pub rating: Option<Amperes>,

    pub out_port: Option<usize>,
    pub in_port: Option<usize>,
    pub connector: Option<String>,
    /// Cross-sectional area in mm²
    pub csa: Option<f64>,
    /// Stock cable lengths making up the run
    pub cable_lengths: Option<Vec<Meters>>,
    /// Per-metre impedance (r1 + r2)
    pub impedance: Option<MilliohmsPerMeter>,
    pub voltage_drop: Option<Volts>,
}

impl Default for Connection {
    fn default() -> Self {
        Self {
            current: None,
            phases: 1,
            length: None,
            logical: false,
            rating: None,
            out_port: None,
            in_port: None,
            connector: None,
            csa: None,
            cable_lengths: None,
            impedance: None,
            voltage_drop: None,
        }
    }
}

impl Connection {
    pub fn new(current: f64, phases: u8) -> Self {
        Self {
            current: Some(Amperes(current)),
            phases,
            ..Self::default()
        }
    }

    /// Connection with no rating, as used for loads
    pub fn unrated() -> Self {
        Self::default()
    }

    pub fn with_length(mut self, length: f64) -> Self {
        self.length = Some(Meters(length));
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(Amperes(rating));
        self
    }

    pub fn as_logical(mut self) -> Self {
        self.logical = true;
        self
    }

    /// Sum of assigned cable lengths, if cables have been assigned.
    pub fn total_cable_length(&self) -> Option<Meters> {
        self.cable_lengths.as_ref().map(|l| l.iter().sum())
    }
}

/// Plan generation progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub enum PlanStage {
    #[default]
    Unwired,
    PortsAssigned,
    CablesAssigned,
    Solved,
}

/// One end of a connection as seen from a node.
#[derive(Debug, Clone, Copy)]
pub struct Link<'a> {
    /// The node at the other end
    pub node: NodeIndex,
    pub edge: EdgeIndex,
    pub connection: &'a Connection,
}

/// A temporary power plan.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    pub name: Option<String>,
    pub graph: DiGraph<PowerNode, Connection>,
    catalog: Option<Arc<dyn Catalog>>,
    config: PlanConfig,
    stage: PlanStage,
}

impl Plan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_catalog(self, catalog: impl Catalog + 'static) -> Self {
        self.with_shared_catalog(Arc::new(catalog))
    }

    pub fn with_shared_catalog(mut self, catalog: Arc<dyn Catalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_config(mut self, config: PlanConfig) -> Self {
        self.config = config;
        self
    }

    pub fn catalog(&self) -> Option<&dyn Catalog> {
        self.catalog.as_deref()
    }

    /// Shared handle to the catalog, for callers that mutate the plan while
    /// holding specs.
    pub fn shared_catalog(&self) -> Option<Arc<dyn Catalog>> {
        self.catalog.clone()
    }

    pub fn config(&self) -> &PlanConfig {
        &self.config
    }

    pub fn stage(&self) -> PlanStage {
        self.stage
    }

    /// Record generation progress. Called by the generation stages.
    pub fn set_stage(&mut self, stage: PlanStage) {
        self.stage = stage;
    }

    pub fn add_node(&mut self, node: PowerNode) -> NodeIndex {
        self.stage = PlanStage::Unwired;
        self.graph.add_node(node)
    }

    /// Connect `from` to `to`. A second connection between the same pair
    /// replaces the first and frees the ports it held.
    ///
    /// Port allocations on both nodes always mirror the ports recorded on
    /// their connections, so ports carried by `connection` are taken.
    pub fn add_connection(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        connection: Connection,
    ) -> EdgeIndex {
        self.stage = PlanStage::Unwired;
        if let Some(old) = self.graph.find_edge(from, to) {
            let (out_port, in_port) = (self.graph[old].out_port, self.graph[old].in_port);
            if let Some(port) = out_port {
                self.graph[from].ports.release(PortSide::Output, port);
            }
            if let Some(port) = in_port {
                self.graph[to].ports.release(PortSide::Input, port);
            }
            debug!(
                from = %self.graph[from].label(),
                to = %self.graph[to].label(),
                ?out_port,
                ?in_port,
                "replacing connection"
            );
        }
        if let Some(port) = connection.out_port {
            self.graph[from].ports.allocate(PortSide::Output, port);
        }
        if let Some(port) = connection.in_port {
            self.graph[to].ports.allocate(PortSide::Input, port);
        }
        self.graph.update_edge(from, to, connection)
    }

    pub fn node(&self, n: NodeIndex) -> &PowerNode {
        &self.graph[n]
    }

    pub fn node_mut(&mut self, n: NodeIndex) -> &mut PowerNode {
        &mut self.graph[n]
    }

    pub fn connection(&self, e: EdgeIndex) -> &Connection {
        &self.graph[e]
    }

    pub fn connection_mut(&mut self, e: EdgeIndex) -> &mut Connection {
        &mut self.graph[e]
    }

    pub fn connection_between(&self, from: NodeIndex, to: NodeIndex) -> Option<&Connection> {
        self.graph.find_edge(from, to).map(|e| &self.graph[e])
    }

    pub fn find_node(&self, name: &str) -> Option<NodeIndex> {
        self.graph
            .node_indices()
            .find(|&n| self.graph[n].name.as_deref() == Some(name))
    }

    pub fn label(&self, n: NodeIndex) -> String {
        self.graph[n].label()
    }

    /// The node's name, falling back to its label for unnamed nodes.
    pub fn display_name(&self, n: NodeIndex) -> String {
        let node = &self.graph[n];
        node.name.clone().unwrap_or_else(|| node.label())
    }

    /// Nodes in insertion order. Virtual nodes are skipped unless `include_virtual`.
    pub fn nodes(&self, include_virtual: bool) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph
            .node_indices()
            .filter(move |&n| include_virtual || !self.graph[n].kind.is_virtual())
    }

    /// Cables as `(from, to, connection)`. Edges touching a virtual node are
    /// skipped unless `include_virtual`.
    pub fn edges(
        &self,
        include_virtual: bool,
    ) -> impl Iterator<Item = (NodeIndex, NodeIndex, &Connection)> + '_ {
        self.graph
            .edge_references()
            .filter(move |e| include_virtual || !self.touches_virtual(e.source(), e.target()))
            .map(|e| (e.source(), e.target(), e.weight()))
    }

    /// Edge indices in index order, with the same filtering as [`Plan::edges`].
    pub fn edge_indices(&self, include_virtual: bool) -> Vec<EdgeIndex> {
        self.graph
            .edge_references()
            .filter(|e| include_virtual || !self.touches_virtual(e.source(), e.target()))
            .map(|e| e.id())
            .collect()
    }

    pub fn endpoints(&self, e: EdgeIndex) -> Option<(NodeIndex, NodeIndex)> {
        self.graph.edge_endpoints(e)
    }

    fn touches_virtual(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.graph[a].kind.is_virtual() || self.graph[b].kind.is_virtual()
    }

    /// Incoming connections in edge index order.
    ///
    /// That is the order they were added in, unless connections were removed
    /// from `graph` directly: petgraph moves the last edge into the freed slot.
    pub fn inputs(&self, n: NodeIndex, include_virtual: bool) -> Vec<Link<'_>> {
        self.links(n, Direction::Incoming, include_virtual)
    }

    /// Outgoing connections in edge index order, as for [`Plan::inputs`].
    pub fn outputs(&self, n: NodeIndex, include_virtual: bool) -> Vec<Link<'_>> {
        self.links(n, Direction::Outgoing, include_virtual)
    }

    fn links(&self, n: NodeIndex, direction: Direction, include_virtual: bool) -> Vec<Link<'_>> {
        let mut links: Vec<Link<'_>> = self
            .graph
            .edges_directed(n, direction)
            .map(|e| Link {
                node: match direction {
                    Direction::Incoming => e.source(),
                    Direction::Outgoing => e.target(),
                },
                edge: e.id(),
                connection: e.weight(),
            })
            .filter(|link| include_virtual || !self.graph[link.node].kind.is_virtual())
            .collect();
        links.sort_by_key(|link| link.edge);
        links
    }

    /// The resolved spec for a node, if it has one.
    ///
    /// Logical nodes carry their own spec; other nodes resolve their
    /// equipment type through the catalog.
    pub fn spec_of(&self, n: NodeIndex) -> Option<&EquipmentSpec> {
        let node = &self.graph[n];
        match &node.kind {
            NodeKind::LogicalSource(source) => Some(&source.spec),
            NodeKind::LogicalSink(sink) => Some(&sink.spec),
            NodeKind::Load(_) => None,
            _ => {
                let equipment = node.equipment.as_deref()?;
                match self.catalog()?.get_spec(equipment) {
                    Ok(spec) => Some(spec),
                    Err(err) => {
                        trace!(node = %node.label(), %err, "spec unavailable");
                        None
                    }
                }
            }
        }
    }

    /// Like [`Plan::spec_of`], but explains why a spec is unavailable.
    pub fn require_spec(&self, n: NodeIndex) -> PlanResult<&EquipmentSpec> {
        let node = &self.graph[n];
        match &node.kind {
            NodeKind::LogicalSource(source) => Ok(&source.spec),
            NodeKind::LogicalSink(sink) => Ok(&sink.spec),
            _ => {
                let equipment = node.equipment.as_deref().ok_or(PlanError::MissingSpecField {
                    node: node.label(),
                    field: "type",
                })?;
                self.catalog()
                    .ok_or(PlanError::MissingCatalog)?
                    .get_spec(equipment)
            }
        }
    }

    pub fn num_generators(&self) -> usize {
        self.count_kind(|k| matches!(k, NodeKind::Generator))
    }

    pub fn num_distros(&self) -> usize {
        self.count_kind(|k| matches!(k, NodeKind::Distro))
    }

    fn count_kind(&self, predicate: impl Fn(&NodeKind) -> bool) -> usize {
        self.graph
            .node_weights()
            .filter(|node| predicate(&node.kind))
            .count()
    }

    pub fn stats(&self) -> PlanStats {
        let mut stats = PlanStats::default();
        for node in self.graph.node_weights() {
            match &node.kind {
                NodeKind::Generator => stats.num_generators += 1,
                NodeKind::Distro => stats.num_distros += 1,
                NodeKind::Amf => stats.num_amfs += 1,
                NodeKind::Load(watts) => {
                    stats.num_loads += 1;
                    stats.total_load = stats.total_load + *watts;
                }
                NodeKind::LogicalSource(_) | NodeKind::LogicalSink(_) => stats.num_logical += 1,
            }
        }
        stats.num_connections = self.edges(false).count();
        stats
    }
}

/// Equipment counts for a plan
#[derive(Debug, Clone, Default)]
pub struct PlanStats {
    pub num_generators: usize,
    pub num_distros: usize,
    pub num_amfs: usize,
    pub num_loads: usize,
    pub num_logical: usize,
    /// Connections between physical equipment
    pub num_connections: usize,
    pub total_load: Watts,
}

impl std::fmt::Display for PlanStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} generators, {} distros, {} AMFs, {} connections, {} loads ({:.0} W)",
            self.num_generators,
            self.num_distros,
            self.num_amfs,
            self.num_connections,
            self.num_loads,
            self.total_load.value()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_plan() -> (Plan, NodeIndex, NodeIndex, NodeIndex) {
        let mut plan = Plan::new();
        let gen = plan.add_node(PowerNode::generator("A", "135kVA"));
        let a1 = plan.add_node(PowerNode::distro("A1", "SPEC-7"));
        let load = plan.add_node(PowerNode::load("A1 Load", 1000.0));
        plan.add_connection(gen, a1, Connection::new(400.0, 3).with_length(10.0));
        plan.add_connection(a1, load, Connection::unrated());
        (plan, gen, a1, load)
    }

    #[test]
    fn test_plan_creation() {
        let (plan, gen, a1, _) = simple_plan();

        assert_eq!(plan.graph.node_count(), 3);
        assert_eq!(plan.graph.edge_count(), 2);
        assert_eq!(plan.node(gen).name.as_deref(), Some("A"));
        let conn = plan.connection_between(gen, a1).unwrap();
        assert_eq!(conn.current, Some(Amperes(400.0)));
        assert_eq!(conn.length, Some(Meters(10.0)));
    }

    #[test]
    fn test_virtual_filtering() {
        let (plan, _, a1, load) = simple_plan();

        assert_eq!(plan.nodes(false).count(), 2);
        assert_eq!(plan.nodes(true).count(), 3);
        assert_eq!(plan.edges(false).count(), 1);
        assert_eq!(plan.edges(true).count(), 2);
        assert!(plan.outputs(a1, false).is_empty());
        let outputs = plan.outputs(a1, true);
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].node, load);
    }

    #[test]
    fn test_reconnecting_replaces_attributes() {
        let (mut plan, gen, a1, _) = simple_plan();
        plan.add_connection(gen, a1, Connection::new(400.0, 3).with_length(25.0));

        assert_eq!(plan.graph.edge_count(), 2);
        assert_eq!(plan.connection_between(gen, a1).unwrap().length, Some(Meters(25.0)));
    }

    #[test]
    fn test_inputs_in_insertion_order() {
        let mut plan = Plan::new();
        let a = plan.add_node(PowerNode::distro("A1", "X"));
        let b = plan.add_node(PowerNode::distro("B1", "X"));
        let amf = plan.add_node(PowerNode::amf("AMF-1", "Y"));
        plan.add_connection(a, amf, Connection::new(125.0, 3));
        plan.add_connection(b, amf, Connection::new(125.0, 3));

        let inputs: Vec<_> = plan.inputs(amf, false).iter().map(|l| l.node).collect();
        assert_eq!(inputs, vec![a, b]);
    }

    #[test]
    fn test_adding_resets_stage() {
        let (mut plan, _, a1, _) = simple_plan();
        plan.set_stage(PlanStage::Solved);
        let a2 = plan.add_node(PowerNode::distro("A2", "EPS/63-3"));
        assert_eq!(plan.stage(), PlanStage::Unwired);
        plan.set_stage(PlanStage::Solved);
        plan.add_connection(a1, a2, Connection::new(63.0, 3));
        assert_eq!(plan.stage(), PlanStage::Unwired);
    }

    #[test]
    fn test_capabilities() {
        assert!(NodeKind::Generator.is_source());
        assert!(NodeKind::Amf.is_distributable());
        assert!(NodeKind::Amf.is_multi_input());
        assert!(!NodeKind::Distro.is_multi_input());
        assert!(NodeKind::Load(Watts(1.0)).is_sink());
        assert!(NodeKind::Load(Watts(1.0)).is_virtual());

        let source = NodeKind::LogicalSource(LogicalSource::new(
            Volts(400.0),
            None,
            None,
            Amperes(125.0),
            3,
        ));
        assert!(source.is_source());
        assert!(source.is_logical());
        assert!(source.is_virtual());
    }

    #[test]
    fn test_spec_resolution() {
        let mut catalog = EquipmentCatalog::new();
        catalog.insert(
            EquipmentSpec::distro("SPEC-7").with_input(PortSpec::new(400.0, 3, "Powerlock")),
        );
        let mut plan = Plan::new().with_catalog(catalog);
        let known = plan.add_node(PowerNode::distro("A1", "SPEC-7"));
        let unknown = plan.add_node(PowerNode::distro("A2", "SPEC-99"));
        let untyped = plan.add_node(PowerNode::new(NodeKind::Distro).with_name("A3"));
        let link = plan.add_node(PowerNode::new(NodeKind::LogicalSink(LogicalSink::new(
            Watts(0.0),
            Amperes(125.0),
            3,
        ))));

        assert_eq!(plan.spec_of(known).unwrap().reference, "SPEC-7");
        assert!(plan.spec_of(unknown).is_none());
        assert!(matches!(plan.require_spec(unknown), Err(PlanError::SpecNotFound(_))));
        assert!(matches!(
            plan.require_spec(untyped),
            Err(PlanError::MissingSpecField { field: "type", .. })
        ));
        assert_eq!(plan.spec_of(link).unwrap().inputs[0].current, Amperes(125.0));
    }

    #[test]
    fn test_labels() {
        assert_eq!(PowerNode::distro("A1", "X").label(), "Distro(A1)");
        assert_eq!(PowerNode::new(NodeKind::Amf).with_id(7).label(), "AMF(id=7)");
        assert_eq!(PowerNode::new(NodeKind::Generator).to_string(), "Generator(unnamed)");
    }

    #[test]
    fn test_plan_stats() {
        let (plan, _, _, _) = simple_plan();
        let stats = plan.stats();

        assert_eq!(stats.num_generators, 1);
        assert_eq!(stats.num_distros, 1);
        assert_eq!(stats.num_loads, 1);
        assert_eq!(stats.num_connections, 1);
        assert_eq!(stats.total_load, Watts(1000.0));
        assert_eq!(plan.num_generators(), 1);
        assert_eq!(plan.num_distros(), 1);
        assert!(stats.to_string().starts_with("1 generators, 1 distros"));
    }

    #[test]
    fn test_replacing_connection_frees_ports() {
        let (mut plan, gen, a1, _) = simple_plan();
        let mut wired = Connection::new(400.0, 3).with_length(10.0);
        wired.out_port = Some(0);
        wired.in_port = Some(0);
        plan.add_connection(gen, a1, wired);
        assert!(plan.node(gen).ports.is_allocated(PortSide::Output, 0));
        assert!(plan.node(a1).ports.is_allocated(PortSide::Input, 0));

        plan.add_connection(gen, a1, Connection::new(400.0, 3).with_length(30.0));
        assert!(plan.node(gen).ports.outputs.is_empty());
        assert!(plan.node(a1).ports.inputs.is_empty());
        assert_eq!(plan.graph.edge_count(), 2);
    }

    #[test]
    fn test_port_allocation() {
        let mut ports = PortAllocation::default();
        assert!(ports.allocate(PortSide::Output, 2));
        assert!(!ports.allocate(PortSide::Output, 2));
        assert!(ports.is_allocated(PortSide::Output, 2));
        assert!(!ports.is_allocated(PortSide::Input, 2));
        assert!(ports.release(PortSide::Output, 2));
        assert!(!ports.release(PortSide::Output, 2));
    }
}
