//! Port assignment.
//!
//! Every cable between two pieces of physical equipment occupies one output
//! socket on the supplying node and one inlet on the receiving node. Ports are
//! matched on exact `(current, phases)` and must share a connector type.
//!
//! Assignment is deterministic: nodes are visited in insertion order and each
//! node's outgoing cables in order of destination name (unnamed last), so a
//! structurally identical plan always gets identical port indices. Edges that
//! already carry an input port are left alone, which makes re-running a no-op.

use std::cmp::Ordering;

use powerplan_core::{
    Amperes, Catalog, EdgeIndex, EquipmentSpec, NodeIndex, Plan, PlanError, PlanResult, PlanStage,
    PortSide, PortSpec,
};
use tracing::debug;

/// Assign an output port and an input port to every cable between physical
/// equipment.
///
/// Cables touching a node with no resolvable spec are left unassigned; that
/// is reported by validation rather than here.
pub fn assign_ports(plan: &mut Plan) -> PlanResult<()> {
    let catalog = plan.shared_catalog().ok_or(PlanError::MissingCatalog)?;
    let sources: Vec<NodeIndex> = plan.nodes(false).collect();

    for a in sources {
        let Some(a_spec) = physical_spec(plan, catalog.as_ref(), a) else {
            continue;
        };

        for (b, edge) in outgoing_by_name(plan, a) {
            if plan.connection(edge).in_port.is_some() {
                continue;
            }
            let Some(b_spec) = physical_spec(plan, catalog.as_ref(), b) else {
                debug!(from = %plan.label(a), to = %plan.label(b), "no spec, leaving ports unassigned");
                continue;
            };

            let conn = plan.connection(edge);
            let current = conn.current.unwrap_or(Amperes::ZERO);
            let phases = conn.phases;

            // Nothing is allocated until both ends match
            let out_port = free_port(plan, a, &a_spec.outputs, PortSide::Output, current, phases)?;
            let in_port = free_port(plan, b, &b_spec.inputs, PortSide::Input, current, phases)?;

            let output = &a_spec.outputs[out_port];
            let input = &b_spec.inputs[in_port];
            if output.connector != input.connector {
                return Err(PlanError::ConnectorMismatch {
                    from: plan.label(a),
                    from_connector: output.connector.clone(),
                    to: plan.label(b),
                    to_connector: input.connector.clone(),
                });
            }

            plan.node_mut(a).ports.allocate(PortSide::Output, out_port);
            plan.node_mut(b).ports.allocate(PortSide::Input, in_port);
            debug!(
                from = %plan.label(a),
                to = %plan.label(b),
                out_port,
                in_port,
                connector = %output.connector,
                "assigned ports"
            );

            let conn = plan.connection_mut(edge);
            conn.out_port = Some(out_port);
            conn.in_port = Some(in_port);
            conn.connector = Some(output.connector.clone());
            if output.cable {
                // Adaptor tail: the run is part of the adaptor, not separate stock
                conn.logical = true;
            }
        }
    }

    plan.set_stage(PlanStage::PortsAssigned);
    Ok(())
}

/// Spec of a physical node, resolved through the catalog.
fn physical_spec<'c>(
    plan: &Plan,
    catalog: &'c dyn Catalog,
    n: NodeIndex,
) -> Option<&'c EquipmentSpec> {
    let equipment = plan.node(n).equipment.as_deref()?;
    catalog.get_spec(equipment).ok()
}

/// Outgoing cables to physical equipment, ordered by destination name.
fn outgoing_by_name(plan: &Plan, a: NodeIndex) -> Vec<(NodeIndex, EdgeIndex)> {
    let mut outgoing: Vec<(NodeIndex, EdgeIndex)> = plan
        .outputs(a, false)
        .iter()
        .map(|link| (link.node, link.edge))
        .collect();
    outgoing.sort_by(|x, y| {
        compare_names(
            plan.node(x.0).name.as_deref(),
            plan.node(y.0).name.as_deref(),
        )
    });
    outgoing
}

fn compare_names(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// The first free port in spec order matching `(current, phases)`.
fn free_port(
    plan: &Plan,
    n: NodeIndex,
    ports: &[PortSpec],
    side: PortSide,
    current: Amperes,
    phases: u8,
) -> PlanResult<usize> {
    let node = plan.node(n);
    ports
        .iter()
        .enumerate()
        .find(|(i, port)| !node.ports.is_allocated(side, *i) && port.matches(current, phases))
        .map(|(i, _)| i)
        .ok_or_else(|| PlanError::PortUnavailable {
            node: node.label(),
            side,
            current: current.value(),
            phases,
        })
}
