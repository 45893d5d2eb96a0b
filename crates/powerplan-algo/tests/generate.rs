//! End-to-end plan generation and electrical queries.

mod common;

use std::collections::BTreeSet;

use common::{catalog, init_tracing, tree_plan, TreePlan, IEC};
use powerplan_algo::{assign_ports, generate, Solver};
use powerplan_core::{
    CableSpec, Connection, EquipmentSpec, Meters, Plan, PlanError, PlanStage, PortSide,
    PortSpec, PowerNode, Volts, Watts,
};
use proptest::prelude::*;

#[test]
fn test_generate_fills_every_cable() -> anyhow::Result<()> {
    init_tracing();
    let TreePlan {
        mut plan,
        gen,
        a1,
        a2,
        a3,
    } = tree_plan(catalog());

    generate(&mut plan)?;
    assert_eq!(plan.stage(), PlanStage::Solved);

    let feed = plan.connection_between(gen, a1).unwrap();
    assert_eq!(feed.connector.as_deref(), Some("Powerlock"));
    assert_eq!(feed.cable_lengths, Some(vec![Meters(25.0)]));
    assert_eq!(feed.csa, Some(120.0));

    let to_a2 = plan.connection_between(a1, a2).unwrap();
    assert_eq!(to_a2.out_port, Some(1));
    assert_eq!(to_a2.cable_lengths, Some(vec![Meters(25.0), Meters(10.0)]));

    let to_a3 = plan.connection_between(a1, a3).unwrap();
    assert_eq!(to_a3.out_port, Some(2));
    assert_eq!(to_a3.cable_lengths, Some(vec![Meters(50.0)]));

    for (_, _, conn) in plan.edges(false) {
        assert!(conn.impedance.is_some());
        assert!(conn.voltage_drop.is_some());
    }
    Ok(())
}

#[test]
fn test_electrical_values_at_leaf() -> anyhow::Result<()> {
    let TreePlan { mut plan, a2, .. } = tree_plan(catalog());
    generate(&mut plan)?;
    let solver = Solver::new(&plan);

    // Powerlock 120 mm² two single-core: 0.46 mΩ/m; IEC 16 mm² multi-core: 2.7 mΩ/m
    let r1 = 25.0 * 0.46e-3 / 2.0 + 35.0 * 2.7e-3 / 2.0;
    let z_e = 400.0_f64.powi(2) * 0.12 / 135_000.0;
    let z_s = solver.z_s(a2, None)?.unwrap();
    assert!((z_s.value() - (z_e + 2.0 * r1)).abs() < 1e-9);

    let v_ln = 400.0 / 3f64.sqrt();
    let i_pf = solver.i_pf(a2, None)?.unwrap();
    assert!((i_pf.value() - v_ln / (z_e + 2.0 * r1)).abs() < 1e-6);

    let v_drop = solver.v_drop(a2, None)?.unwrap();
    let expected = (33_000.0 / 400.0) * 25.0 * 0.46e-3 + (5_000.0 / 400.0) * 35.0 * 2.7e-3;
    assert!((v_drop.value() - expected).abs() < 1e-9);

    let ratio = solver.v_drop_ratio(a2, None)?.unwrap();
    assert!(ratio > 0.0 && ratio < 0.05);

    assert_eq!(solver.i_n(a2, None)?, Some(powerplan_core::Amperes(63.0)));
    assert_eq!(solver.cable_length_from_source(a2, None)?, Some(Meters(60.0)));
    assert_eq!(solver.voltage(a2)?, Volts(400.0));
    Ok(())
}

#[test]
fn test_z_e_matches_fault_current_derivation() {
    let TreePlan { plan, gen, .. } = tree_plan(catalog());
    let solver = Solver::new(&plan);

    let (p, v, x) = (135_000.0_f64, 400.0_f64, 0.12_f64);
    let z_e = solver.z_e(gen).unwrap().unwrap().value();
    assert!((z_e - v * v * x / p).abs() < 1e-12);

    let i_base = p / (3f64.sqrt() * v);
    let i_fault = i_base / x;
    let z = v / (3f64.sqrt() * i_fault);
    assert!((z_e - z).abs() < 1e-9);
}

#[test]
fn test_load_sums_leaves() {
    let TreePlan { plan, gen, a1, a2, .. } = tree_plan(catalog());
    let solver = Solver::new(&plan);
    assert_eq!(solver.load(gen).unwrap(), Watts(33_000.0));
    assert_eq!(solver.load(a1).unwrap(), Watts(33_000.0));
    assert_eq!(solver.load(a2).unwrap(), Watts(5_000.0));
}

fn port_indices(plan: &Plan) -> Vec<(Option<usize>, Option<usize>)> {
    plan.edges(true)
        .map(|(_, _, conn)| (conn.out_port, conn.in_port))
        .collect()
}

#[test]
fn test_port_assignment_is_deterministic() {
    let mut first = tree_plan(catalog()).plan;
    let mut second = tree_plan(catalog()).plan;
    assign_ports(&mut first).unwrap();
    assign_ports(&mut second).unwrap();
    assert_eq!(port_indices(&first), port_indices(&second));
}

#[test]
fn test_port_assignment_is_idempotent() {
    let mut plan = tree_plan(catalog()).plan;
    assign_ports(&mut plan).unwrap();
    let ports = port_indices(&plan);
    let allocations: Vec<_> = plan.graph.node_weights().map(|n| n.ports.clone()).collect();

    assign_ports(&mut plan).unwrap();
    assert_eq!(port_indices(&plan), ports);
    let again: Vec<_> = plan.graph.node_weights().map(|n| n.ports.clone()).collect();
    assert_eq!(again, allocations);
}

#[test]
fn test_missing_table_data_omits_fault_values() -> anyhow::Result<()> {
    let mut catalog = catalog();
    // No reference table row for this size
    catalog.insert_cable(CableSpec::new(IEC, 63.0, 3, 17.0, &[5.0, 10.0, 25.0, 50.0]));
    let TreePlan { mut plan, a1, a2, .. } = tree_plan(catalog);
    generate(&mut plan)?;

    let to_a2 = plan.connection_between(a1, a2).unwrap();
    assert_eq!(to_a2.impedance, None);
    assert_eq!(to_a2.voltage_drop, None);

    let solver = Solver::new(&plan);
    assert!(solver.i_pf(a1, None)?.is_some());
    assert_eq!(solver.i_pf(a2, None)?, None);
    assert_eq!(solver.v_drop_ratio(a2, None)?, None);
    Ok(())
}

#[test]
fn test_generate_is_rerunnable() -> anyhow::Result<()> {
    let TreePlan { mut plan, a1, a2, .. } = tree_plan(catalog());
    generate(&mut plan)?;
    let before = plan.connection_between(a1, a2).cloned();

    // Adding a load resets the stage; regenerating refreshes voltage drop
    let extra = plan.add_node(PowerNode::load("Extra", 5_000.0));
    plan.add_connection(a2, extra, Connection::unrated());
    assert_eq!(plan.stage(), PlanStage::Unwired);
    generate(&mut plan)?;

    let after = plan.connection_between(a1, a2).cloned().unwrap();
    let before = before.unwrap();
    assert_eq!(after.out_port, before.out_port);
    let ratio = after.voltage_drop.unwrap() / before.voltage_drop.unwrap();
    assert!((ratio - 2.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_regenerate_after_replacing_cables() -> anyhow::Result<()> {
    let TreePlan {
        mut plan,
        gen,
        a1,
        a2,
        a3,
    } = tree_plan(catalog());
    generate(&mut plan)?;

    // Both runs re-measured on site
    plan.add_connection(gen, a1, Connection::new(400.0, 3).with_length(30.0));
    plan.add_connection(a1, a2, Connection::new(63.0, 3).with_length(12.0));
    generate(&mut plan)?;

    let feed = plan.connection_between(gen, a1).unwrap();
    assert_eq!((feed.out_port, feed.in_port), (Some(0), Some(0)));
    assert_eq!(feed.cable_lengths, Some(vec![Meters(25.0), Meters(10.0)]));

    let to_a2 = plan.connection_between(a1, a2).unwrap();
    assert_eq!((to_a2.out_port, to_a2.in_port), (Some(1), Some(0)));
    assert_eq!(to_a2.cable_lengths, Some(vec![Meters(10.0), Meters(5.0)]));
    assert_eq!(plan.connection_between(a1, a3).unwrap().out_port, Some(2));

    assert_eq!(plan.node(gen).ports.outputs, BTreeSet::from([0]));
    assert_eq!(plan.node(a1).ports.outputs, BTreeSet::from([1, 2]));
    assert_eq!(plan.node(a2).ports.inputs, BTreeSet::from([0]));
    Ok(())
}

#[test]
fn test_regenerate_after_failed_port_assignment() -> anyhow::Result<()> {
    let mut catalog = catalog();
    catalog.insert(EquipmentSpec::distro("CEE-32").with_input(PortSpec::new(32.0, 1, "CEE 7/7")));
    let TreePlan { mut plan, a1, .. } = tree_plan(catalog);
    let bar = plan.add_node(PowerNode::distro("Bar", "CEE-32"));
    plan.add_connection(a1, bar, Connection::new(32.0, 1).with_length(8.0));

    assert!(matches!(
        generate(&mut plan),
        Err(PlanError::ConnectorMismatch { .. })
    ));
    assert!(!plan.node(a1).ports.is_allocated(PortSide::Output, 4));

    plan.node_mut(bar).equipment = Some("TOB-32".to_string());
    generate(&mut plan)?;

    // First 32 A socket on SPEC-7, not the one after it
    let to_bar = plan.connection_between(a1, bar).unwrap();
    assert_eq!((to_bar.out_port, to_bar.in_port), (Some(4), Some(0)));
    assert_eq!(plan.node(a1).ports.outputs, BTreeSet::from([1, 2, 4]));
    assert_eq!(to_bar.cable_lengths, Some(vec![Meters(10.0)]));
    Ok(())
}

proptest! {
    #[test]
    fn prop_generator_load_is_sum_of_loads(
        tree in prop::collection::vec((any::<prop::sample::Index>(), 0.0f64..50_000.0), 1..24)
    ) {
        let mut plan = Plan::new();
        let gen = plan.add_node(PowerNode::generator("G", "GEN"));
        let mut distros = vec![gen];
        let mut total = 0.0;
        for (i, (parent, watts)) in tree.iter().enumerate() {
            let parent = distros[parent.index(distros.len())];
            let distro = plan.add_node(PowerNode::distro(format!("D{i}"), "D"));
            let load = plan.add_node(PowerNode::load(format!("L{i}"), *watts));
            plan.add_connection(parent, distro, Connection::new(32.0, 1));
            plan.add_connection(distro, load, Connection::unrated());
            distros.push(distro);
            total += watts;
        }

        let load = Solver::new(&plan).load(gen).unwrap();
        prop_assert!((load.value() - total).abs() < 1e-6);
    }
}
