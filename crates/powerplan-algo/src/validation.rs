//! Plan validation.
//!
//! Checks wiring and catalog consistency and collects every problem found,
//! so a planner can fix them in one pass. Validation never fails; an empty
//! [`Findings`] means the plan is ready to generate.
//!
//! Logical nodes and loads are not equipment and are not validated, but
//! logical sources still count as inputs when checking AMF wiring.

use std::collections::BTreeMap;

use powerplan_core::{
    Category, Connection, EquipmentSpec, Findings, NodeIndex, NodeKind, Plan, PortSpec,
};
use tracing::debug;

/// Validate wiring, names and, if the plan has a catalog, equipment specs.
pub fn validate(plan: &Plan) -> Findings {
    let mut findings = Findings::new();
    validate_topology(plan, &mut findings);
    validate_names(plan, &mut findings);
    if plan.catalog().is_some() {
        validate_specs(plan, &mut findings);
    }
    debug!(summary = %findings.summary(), "validated plan");
    findings
}

fn validate_topology(plan: &Plan, findings: &mut Findings) {
    for n in plan.nodes(false) {
        let node = plan.node(n);
        let entity = node.label();
        let kind = node.kind.type_name();
        let inputs = plan.inputs(n, true).len();
        let outputs = plan.outputs(n, true).len();

        match node.kind {
            NodeKind::Generator => {
                if outputs == 0 {
                    findings.add_error(
                        Category::Topology,
                        format!("{kind} has no outgoing connections"),
                        &entity,
                        Some(n.index()),
                    );
                }
                if inputs > 0 {
                    findings.add_error(
                        Category::Topology,
                        format!("{kind} has incoming connections"),
                        &entity,
                        Some(n.index()),
                    );
                }
            }
            NodeKind::Distro => match inputs {
                0 => findings.add_error(
                    Category::Topology,
                    "Distro has no incoming connections",
                    &entity,
                    Some(n.index()),
                ),
                1 => {}
                count => findings.add_error(
                    Category::Topology,
                    format!("Distro has {count} incoming connections, expected one"),
                    &entity,
                    Some(n.index()),
                ),
            },
            NodeKind::Amf if inputs != 2 => findings.add_error(
                Category::Topology,
                format!("AMF has {inputs} incoming connections, expected two"),
                &entity,
                Some(n.index()),
            ),
            _ => {}
        }
    }
}

/// One finding per node sharing a name with another node.
fn validate_names(plan: &Plan, findings: &mut Findings) {
    let mut by_name: BTreeMap<&str, Vec<NodeIndex>> = BTreeMap::new();
    for n in plan.nodes(false) {
        if let Some(name) = plan.node(n).name.as_deref() {
            by_name.entry(name).or_default().push(n);
        }
    }

    let mut duplicates: Vec<NodeIndex> = by_name
        .into_values()
        .filter(|nodes| nodes.len() > 1)
        .flatten()
        .collect();
    duplicates.sort();

    for n in duplicates {
        findings.add_error(
            Category::Naming,
            "Duplicate node name",
            plan.label(n),
            Some(n.index()),
        );
    }
}

fn validate_specs(plan: &Plan, findings: &mut Findings) {
    for n in plan.nodes(false) {
        let node = plan.node(n);
        let entity = node.label();

        let Some(equipment) = node.equipment.as_deref() else {
            findings.add_warning(Category::Spec, "Node has no type", &entity, Some(n.index()));
            continue;
        };
        let Some(spec) = plan.spec_of(n) else {
            findings.add_error(
                Category::Spec,
                format!("Spec not found for item: {equipment}"),
                &entity,
                Some(n.index()),
            );
            continue;
        };

        let outputs = plan.outputs(n, false);
        let inputs = plan.inputs(n, false);

        if outputs.len() > spec.outputs.len() {
            findings.add_error(
                Category::Ports,
                format!(
                    "More outputs than available: {} connected, {} on {equipment}",
                    outputs.len(),
                    spec.outputs.len()
                ),
                &entity,
                Some(n.index()),
            );
            continue;
        }
        if inputs.len() > spec.inputs.len() {
            findings.add_error(
                Category::Ports,
                format!(
                    "More inputs than available: {} connected, {} on {equipment}",
                    inputs.len(),
                    spec.inputs.len()
                ),
                &entity,
                Some(n.index()),
            );
            continue;
        }

        for link in &outputs {
            check_rating(findings, spec, &spec.outputs, "output", link.connection, &entity, n);
        }
        for link in &inputs {
            check_rating(findings, spec, &spec.inputs, "input", link.connection, &entity, n);
        }
    }
}

fn check_rating(
    findings: &mut Findings,
    spec: &EquipmentSpec,
    ports: &[PortSpec],
    side: &str,
    connection: &Connection,
    entity: &str,
    n: NodeIndex,
) {
    let Some(current) = connection.current else {
        findings.add_error(
            Category::Ports,
            format!("Connection to {} has no current rating", spec.reference),
            entity,
            Some(n.index()),
        );
        return;
    };
    if !ports.iter().any(|port| port.matches(current, connection.phases)) {
        findings.add_error(
            Category::Ports,
            format!(
                "No {side} for current: {}, phases: {}",
                current.value(),
                connection.phases
            ),
            entity,
            Some(n.index()),
        );
    }
}
