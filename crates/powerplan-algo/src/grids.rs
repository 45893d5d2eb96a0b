//! Grid partitioning.
//!
//! A grid is a weakly connected part of the plan fed by its own source.
//! AMF panels join two grids; with splitting enabled each AMF input is cut
//! and replaced by a logical pair:
//!
//! ```text
//!   upstream ──X──> AMF          upstream ──> LogicalSink "AMF G1"
//!                          =>
//!                                LogicalSource "Grid G1" ──> AMF
//! ```
//!
//! The sink carries the AMF's load back to the upstream grid. The source
//! carries the voltage, voltage drop and loop impedance seen at that AMF input
//! before the split, so the AMF's own grid still reports the values of the
//! full installation.

use std::borrow::Cow;
use std::collections::HashMap;

use petgraph::visit::EdgeRef;
use powerplan_core::graph_utils::weak_components;
use powerplan_core::{
    Amperes, EdgeIndex, LogicalSink, LogicalSource, Meters, NodeIndex, NodeKind, Plan,
    PlanResult, PowerNode, Volts,
};
use tracing::debug;

use crate::solver::Solver;

/// One electrically independent grid, as indices into the partitioned plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    pub name: String,
    /// Member nodes in index order
    pub nodes: Vec<NodeIndex>,
    /// Connections between member nodes
    pub edges: Vec<EdgeIndex>,
}

/// The result of [`grids`]: the analyzed plan together with its grids.
///
/// Without AMF splitting the plan is borrowed from the caller; with splitting
/// it is an owned copy carrying the logical nodes.
#[derive(Debug, Clone)]
pub struct Partition<'a> {
    plan: Cow<'a, Plan>,
    grids: Vec<Grid>,
}

impl<'a> Partition<'a> {
    /// The plan the grid indices refer to
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn len(&self) -> usize {
        self.grids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    /// Grids in name order
    pub fn iter(&self) -> impl Iterator<Item = GridView<'_>> {
        let plan = self.plan();
        self.grids.iter().map(move |grid| GridView { plan, grid })
    }

    pub fn get(&self, name: &str) -> Option<GridView<'_>> {
        self.iter().find(|view| view.name() == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.grids.iter().map(|g| g.name.as_str()).collect()
    }

    pub fn into_grids(self) -> Vec<Grid> {
        self.grids
    }
}

/// A grid together with the plan it indexes into.
#[derive(Debug, Clone, Copy)]
pub struct GridView<'p> {
    plan: &'p Plan,
    grid: &'p Grid,
}

impl<'p> GridView<'p> {
    pub fn name(&self) -> &'p str {
        &self.grid.name
    }

    pub fn plan(&self) -> &'p Plan {
        self.plan
    }

    pub fn nodes(&self) -> &'p [NodeIndex] {
        &self.grid.nodes
    }

    pub fn edges(&self) -> &'p [EdgeIndex] {
        &self.grid.edges
    }

    pub fn contains(&self, n: NodeIndex) -> bool {
        self.grid.nodes.binary_search(&n).is_ok()
    }

    /// Generators in the grid; empty for a grid fed only through an AMF.
    pub fn generators(&self) -> Vec<NodeIndex> {
        self.filter_nodes(|kind| matches!(kind, NodeKind::Generator))
    }

    /// Every source-capable node, logical sources included.
    pub fn sources(&self) -> Vec<NodeIndex> {
        self.filter_nodes(NodeKind::is_source)
    }

    fn filter_nodes(&self, predicate: impl Fn(&NodeKind) -> bool) -> Vec<NodeIndex> {
        self.grid
            .nodes
            .iter()
            .copied()
            .filter(|&n| predicate(&self.plan.node(n).kind))
            .collect()
    }
}

/// Partition a plan into independently analyzable grids, sorted by name.
///
/// Components with no source are dropped. A grid is named after its first
/// source, or after its AMF when that source is logical.
pub fn grids(plan: &Plan, split_amf: bool) -> PlanResult<Partition<'_>> {
    let plan = if split_amf {
        Cow::Owned(split_amfs(plan)?)
    } else {
        Cow::Borrowed(plan)
    };

    let components = weak_components(&plan.graph);
    let mut membership = HashMap::new();
    for (id, members) in components.iter().enumerate() {
        for &n in members {
            membership.insert(n, id);
        }
    }
    let mut edges: Vec<Vec<EdgeIndex>> = vec![Vec::new(); components.len()];
    for edge in plan.graph.edge_references() {
        if let Some(&id) = membership.get(&edge.source()) {
            edges[id].push(edge.id());
        }
    }

    let mut result = Vec::new();
    for (members, edges) in components.into_iter().zip(edges) {
        let Some(name) = grid_name(&plan, &members) else {
            continue;
        };
        result.push(Grid {
            name,
            nodes: members,
            edges,
        });
    }
    result.sort_by(|a, b| a.name.cmp(&b.name));

    debug!(grids = result.len(), split_amf, "partitioned plan");
    Ok(Partition {
        plan,
        grids: result,
    })
}

fn grid_name(plan: &Plan, members: &[NodeIndex]) -> Option<String> {
    let source = members
        .iter()
        .copied()
        .find(|&n| plan.node(n).kind.is_source())?;
    if plan.node(source).kind.is_logical() {
        if let Some(amf) = members
            .iter()
            .copied()
            .find(|&n| plan.node(n).kind.is_multi_input())
        {
            return Some(plan.display_name(amf));
        }
    }
    Some(plan.display_name(source))
}

/// Copy of `plan` with every AMF input replaced by a logical sink/source pair.
///
/// Electrical values for the logical source are taken from the unsplit plan.
fn split_amfs(plan: &Plan) -> PlanResult<Plan> {
    let solver = Solver::new(plan);
    let mut split = plan.clone();

    let amfs: Vec<NodeIndex> = plan
        .graph
        .node_indices()
        .filter(|&n| plan.node(n).kind.is_multi_input())
        .collect();

    for amf in amfs {
        let amf_name = plan.display_name(amf);
        let voltage: Volts = solver.voltage(amf)?;
        let load = solver.load(amf)?;

        for link in plan.inputs(amf, true) {
            let upstream = link.node;
            let source_name = plan.display_name(solver.source(amf, Some(upstream))?);
            let v_drop = solver.v_drop(amf, Some(upstream))?;
            let z_s = solver.z_s(amf, Some(upstream))?;
            let current = link.connection.current.unwrap_or(Amperes::ZERO);
            let phases = link.connection.phases;

            let sink = split.add_node(
                PowerNode::new(NodeKind::LogicalSink(LogicalSink::new(load, current, phases)))
                    .with_name(format!("{amf_name} {source_name}")),
            );
            let source = split.add_node(
                PowerNode::new(NodeKind::LogicalSource(LogicalSource::new(
                    voltage, v_drop, z_s, current, phases,
                )))
                .with_name(format!("Grid {source_name}")),
            );

            // Moves the last edge into the freed index
            if let Some(edge) = split.graph.find_edge(upstream, amf) {
                split.graph.remove_edge(edge);
            }
            split.add_connection(upstream, sink, link.connection.clone());

            let mut bridge = link.connection.clone();
            bridge.length = Some(Meters::ZERO);
            bridge.cable_lengths = Some(vec![Meters::ZERO]);
            bridge.voltage_drop = Some(Volts::ZERO);
            bridge.logical = true;
            split.add_connection(source, amf, bridge);

            debug!(amf = %amf_name, source = %source_name, "split AMF input");
        }
    }

    split.set_stage(plan.stage());
    Ok(split)
}
