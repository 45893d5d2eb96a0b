//! Shared fixtures for integration tests.

#![allow(dead_code)]

use powerplan_core::{
    CableSpec, Connection, EquipmentCatalog, EquipmentSpec, NodeIndex, Plan, PortSpec, PowerNode,
};

pub const POWERLOCK: &str = "Powerlock";
pub const IEC: &str = "IEC 60309";

/// Install a test subscriber; honours `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A small hire company's stock.
pub fn catalog() -> EquipmentCatalog {
    let mut catalog = EquipmentCatalog::new();
    catalog
        .insert(
            EquipmentSpec::generator("135kVA", 400.0, 135_000.0, 0.12)
                .with_supplier("Test Hire")
                .with_output(PortSpec::new(400.0, 3, POWERLOCK)),
        )
        .insert(
            EquipmentSpec::generator("60kVA", 400.0, 60_000.0, 0.1)
                .with_supplier("Test Hire")
                .with_output(PortSpec::new(125.0, 3, IEC)),
        )
        .insert(
            EquipmentSpec::distro("SPEC-7")
                .with_input(PortSpec::new(400.0, 3, POWERLOCK))
                .with_output(PortSpec::new(125.0, 3, IEC))
                .with_outputs(3, PortSpec::new(63.0, 3, IEC))
                .with_outputs(2, PortSpec::new(32.0, 1, IEC)),
        )
        .insert(
            EquipmentSpec::distro("EPS/63-3")
                .with_input(PortSpec::new(63.0, 3, IEC))
                .with_outputs(3, PortSpec::new(32.0, 1, IEC).with_rcd("30mA"))
                .with_outputs(6, PortSpec::new(16.0, 1, IEC).with_rcd("30mA")),
        )
        .insert(
            EquipmentSpec::distro("TOB-32")
                .with_input(PortSpec::new(32.0, 1, IEC))
                .with_outputs(4, PortSpec::new(16.0, 1, IEC)),
        )
        .insert(
            EquipmentSpec::amf("125AMF-EVENT")
                .with_inputs(2, PortSpec::new(125.0, 3, IEC))
                .with_outputs(2, PortSpec::new(63.0, 3, IEC)),
        )
        .insert_cable(CableSpec::new(POWERLOCK, 400.0, 3, 120.0, &[5.0, 10.0, 25.0, 50.0]))
        .insert_cable(CableSpec::new(IEC, 125.0, 3, 35.0, &[10.0, 25.0, 50.0]))
        .insert_cable(CableSpec::new(IEC, 63.0, 3, 16.0, &[5.0, 10.0, 25.0, 50.0]))
        .insert_cable(CableSpec::new(IEC, 32.0, 1, 6.0, &[5.0, 10.0, 25.0]))
        .insert_cable(CableSpec::new(IEC, 16.0, 1, 2.5, &[5.0, 10.0, 25.0, 50.0]));
    catalog
}

pub struct TreePlan {
    pub plan: Plan,
    pub gen: NodeIndex,
    pub a1: NodeIndex,
    pub a2: NodeIndex,
    pub a3: NodeIndex,
}

/// ```text
/// A (135kVA) ─20m─> A1 (SPEC-7) ─34m─> A2 (EPS/63-3) -> 5 kW
///                      │    └─────41m─> A3 (EPS/63-3) -> 8 kW
///                      └─> 20 kW
/// ```
pub fn tree_plan(catalog: EquipmentCatalog) -> TreePlan {
    let mut plan = Plan::new().with_name("Main stage").with_catalog(catalog);
    let gen = plan.add_node(PowerNode::generator("A", "135kVA"));
    let a1 = plan.add_node(PowerNode::distro("A1", "SPEC-7"));
    let a3 = plan.add_node(PowerNode::distro("A3", "EPS/63-3"));
    let a2 = plan.add_node(PowerNode::distro("A2", "EPS/63-3"));
    let catering = plan.add_node(PowerNode::load("Catering", 20_000.0));
    let lights = plan.add_node(PowerNode::load("Lights", 5_000.0));
    let sound = plan.add_node(PowerNode::load("Sound", 8_000.0));

    plan.add_connection(gen, a1, Connection::new(400.0, 3).with_length(20.0));
    plan.add_connection(a1, a3, Connection::new(63.0, 3).with_length(41.0));
    plan.add_connection(a1, a2, Connection::new(63.0, 3).with_length(34.0));
    plan.add_connection(a1, catering, Connection::unrated());
    plan.add_connection(a2, lights, Connection::unrated());
    plan.add_connection(a3, sound, Connection::unrated());

    TreePlan {
        plan,
        gen,
        a1,
        a2,
        a3,
    }
}

/// ```text
/// A (135kVA) ─> A1 (SPEC-7) ─50m─┐
///                                 ├─> Stage AMF ─25m─> D1 (EPS/63-3) -> 12 kW
/// B (60kVA) ────────────────25m──┘
/// ```
pub fn amf_plan() -> Plan {
    let mut plan = Plan::new().with_name("Festival").with_catalog(catalog());
    let a = plan.add_node(PowerNode::generator("A", "135kVA"));
    let b = plan.add_node(PowerNode::generator("B", "60kVA"));
    let a1 = plan.add_node(PowerNode::distro("A1", "SPEC-7"));
    let amf = plan.add_node(PowerNode::amf("Stage AMF", "125AMF-EVENT"));
    let d1 = plan.add_node(PowerNode::distro("D1", "EPS/63-3"));
    let load = plan.add_node(PowerNode::load("Stage", 12_000.0));

    plan.add_connection(a, a1, Connection::new(400.0, 3).with_length(10.0));
    plan.add_connection(a1, amf, Connection::new(125.0, 3).with_length(50.0));
    plan.add_connection(b, amf, Connection::new(125.0, 3).with_length(25.0));
    plan.add_connection(amf, d1, Connection::new(63.0, 3).with_length(25.0));
    plan.add_connection(d1, load, Connection::unrated());
    plan
}
