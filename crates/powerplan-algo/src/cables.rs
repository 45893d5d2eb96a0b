//! Cable selection and assignment.
//!
//! A run is made up of standard stock lengths, chosen greedily:
//!
//! 1. Scan stock lengths shortest first.
//! 2. Take the first length that finishes the run on its own, or the first
//!    adjacent pair that together covers the whole run.
//! 3. If neither exists, take the longest length and repeat.
//!
//! This keeps the number of segments low for typical runs but is not an
//! optimal covering. The only guarantee is that the selection covers the run.

use powerplan_core::cable_data::{cable_configuration, cable_ratings, select_cable_size};
use powerplan_core::{
    Amperes, Catalog, Meters, MilliohmsPerMeter, Plan, PlanError, PlanResult, PlanStage,
};
use tracing::{debug, warn};

/// Longest single run accepted by [`select_cable`].
pub const MAX_RUN_LENGTH: Meters = Meters(10_000.0);

/// Pick stock lengths covering `requested` and return them with the CSA.
///
/// With no requested length, only the CSA is resolved. Runs that are
/// negative, not finite or longer than [`MAX_RUN_LENGTH`] are rejected.
pub fn select_cable(
    catalog: &dyn Catalog,
    connector: &str,
    current: Amperes,
    phases: u8,
    requested: Option<Meters>,
) -> PlanResult<(Option<Vec<Meters>>, f64)> {
    let cable = catalog.lookup_cable(connector, current, phases)?;
    let Some(requested) = requested else {
        return Ok((None, cable.csa));
    };
    if !requested.is_finite() || requested < Meters::ZERO || requested > MAX_RUN_LENGTH {
        return Err(PlanError::InvalidLength(requested.value()));
    }

    let stock: Vec<Meters> = cable
        .sorted_lengths()
        .into_iter()
        .filter(|l| *l > Meters::ZERO)
        .collect();
    if stock.is_empty() && requested > Meters::ZERO {
        return Err(PlanError::NoCableData {
            connector: connector.to_string(),
            current: current.value(),
            phases,
        });
    }

    let mut selected = Vec::new();
    let mut total = Meters::ZERO;
    if let Some(&longest) = stock.last() {
        // While more than two longest lengths remain, no single length or pair
        // finishes the run and each round takes the longest.
        let whole = (requested / longest).floor() as usize;
        if whole > 2 {
            selected.extend(std::iter::repeat(longest).take(whole - 2));
            total = selected.iter().sum();
        }
    }
    while total < requested {
        for length in next_segments(&stock, total, requested) {
            total = total + length;
            selected.push(length);
        }
    }

    debug!(connector, %requested, ?selected, csa = cable.csa, "selected cable");
    Ok((Some(selected), cable.csa))
}

/// One greedy round. `stock` is sorted ascending and non-empty.
fn next_segments(stock: &[Meters], total: Meters, requested: Meters) -> Vec<Meters> {
    for i in 0..stock.len() {
        if stock[i] + total >= requested {
            return vec![stock[i]];
        }
        if i > 0 && stock[i] + stock[i - 1] >= requested {
            return vec![stock[i], stock[i - 1]];
        }
    }
    stock.last().copied().into_iter().collect()
}

/// Assign stock lengths, CSA and per-metre impedance to every cable with
/// an assigned connector.
///
/// Impedance comes from the catalog cable record when it quotes one, and
/// otherwise from the reference table selected by the plan's methodology.
/// A size missing from the table leaves impedance unset.
pub fn assign_cables(plan: &mut Plan) -> PlanResult<()> {
    let Some(catalog) = plan.shared_catalog() else {
        warn!("plan has no catalog, skipping cable assignment");
        return Ok(());
    };
    let methodology = plan.config().methodology;

    for edge in plan.edge_indices(false) {
        let conn = plan.connection(edge);
        let Some(connector) = conn.connector.clone() else {
            debug!(edge = edge.index(), "no connector assigned, skipping");
            continue;
        };

        let current = conn.current.unwrap_or(Amperes::ZERO);
        let phases = conn.phases;
        let requested = conn.length;

        if conn.logical {
            let conn = plan.connection_mut(edge);
            conn.cable_lengths = Some(Vec::new());
            conn.impedance = Some(MilliohmsPerMeter::ZERO);
            continue;
        }

        let (lengths, csa) = select_cable(catalog.as_ref(), &connector, current, phases, requested)?;

        let configuration = cable_configuration(&connector, phases)?;
        if let Some(minimum) = select_cable_size(current, methodology, configuration) {
            if csa < minimum {
                warn!(
                    %connector,
                    %current,
                    csa,
                    minimum,
                    ?methodology,
                    "stock cable is below the tabulated size for its rating"
                );
            }
        }

        let stock = catalog.lookup_cable(&connector, current, phases)?;
        let impedance = match stock.voltage_drop {
            Some(drop) => Some(drop.impedance()),
            None => cable_ratings(csa, methodology, configuration)
                .voltage_drop
                .map(|drop| drop.impedance()),
        };
        if impedance.is_none() {
            debug!(%connector, csa, ?methodology, "no voltage drop data for cable size");
        }

        let conn = plan.connection_mut(edge);
        conn.csa = Some(csa);
        conn.cable_lengths = lengths;
        conn.impedance = impedance;
    }

    plan.set_stage(PlanStage::CablesAssigned);
    Ok(())
}
