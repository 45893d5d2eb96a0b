//! # powerplan-algo: Plan Generation and Electrical Analysis
//!
//! Algorithms over a [`powerplan_core::Plan`]:
//!
//! | Stage | Function | Writes to each cable |
//! |-------|----------|----------------------|
//! | Ports | [`assign_ports`] | `out_port`, `in_port`, `connector` |
//! | Cables | [`assign_cables`] | `cable_lengths`, `csa`, `impedance` |
//! | Voltage drop | [`calculate_voltage_drop`] | `voltage_drop` |
//!
//! [`generate`] runs all three in order. Once a plan is generated, the
//! [`Solver`] answers per-node questions (fault current, loop impedance,
//! voltage drop) and [`grids`] splits the plan into independently fed grids.
//! [`validate`] reports wiring and catalog problems without failing.
//!
//! ## Example
//!
//! ```ignore
//! use powerplan_algo::{generate, grids, validate, Solver};
//!
//! let findings = validate(&plan);
//! if findings.has_errors() {
//!     eprintln!("{findings}");
//! }
//!
//! generate(&mut plan)?;
//! let solver = Solver::new(&plan);
//! let distro = plan.find_node("A1").unwrap();
//! println!("Zs at A1: {:?}", solver.z_s(distro, None)?);
//!
//! for grid in grids(&plan, true)?.iter() {
//!     println!("{}: {} generators", grid.name(), grid.generators().len());
//! }
//! ```

pub mod cables;
pub mod generate;
pub mod grids;
pub mod ports;
pub mod solver;
pub mod validation;

pub use cables::{assign_cables, select_cable, MAX_RUN_LENGTH};
pub use generate::generate;
pub use grids::{grids, Grid, GridView, Partition};
pub use ports::assign_ports;
pub use solver::{calculate_voltage_drop, Solver};
pub use validation::validate;
