use powerplan_core::{Plan, PlanResult};
use tracing::info;

use crate::cables::assign_cables;
use crate::ports::assign_ports;
use crate::solver::calculate_voltage_drop;

/// Run every generation stage in order: ports, cables, voltage drop.
///
/// Each stage is idempotent, but none of them clears values written by an
/// earlier run. After editing a plan, re-run `generate` to refresh derived
/// attributes.
pub fn generate(plan: &mut Plan) -> PlanResult<()> {
    info!(plan = plan.name.as_deref().unwrap_or("unnamed"), "generating plan");

    assign_ports(plan)?;
    info!(stage = ?plan.stage(), "ports assigned");

    assign_cables(plan)?;
    info!(stage = ?plan.stage(), "cables assigned");

    calculate_voltage_drop(plan)?;
    info!(stage = ?plan.stage(), "voltage drop calculated");
    Ok(())
}
