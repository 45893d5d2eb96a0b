//! Unified error type for plan generation and electrical queries.
//!
//! These are the hard failures: they abort the generation step or query that
//! raised them. Topology problems that can be reported together are collected
//! as [`Findings`](crate::diagnostics::Findings) instead and never surface here.
//!
//! # Example
//!
//! ```ignore
//! use powerplan_core::{PlanError, PlanResult};
//!
//! fn wire(plan: &mut Plan) -> PlanResult<()> {
//!     assign_ports(plan)?;
//!     assign_cables(plan)?;
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Which side of a connection a port is being matched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortSide {
    Input,
    Output,
}

impl std::fmt::Display for PortSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortSide::Input => f.write_str("input"),
            PortSide::Output => f.write_str("output"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PlanError {
    /// No free port of the requested rating on a node (assignment error)
    #[error("cannot assign {side} on {node}: no free {current} A {phases}-phase port")]
    PortUnavailable {
        node: String,
        side: PortSide,
        current: f64,
        phases: u8,
    },

    /// Matched ports have different connector types (assignment error)
    #[error("connector types don't match: {from_connector} on {from} != {to_connector} on {to}")]
    ConnectorMismatch {
        from: String,
        from_connector: String,
        to: String,
        to_connector: String,
    },

    #[error("no cable data available for {connector}, {current} A, {phases} phases")]
    NoCableData {
        connector: String,
        current: f64,
        phases: u8,
    },

    #[error("spec not found for equipment type '{0}'")]
    SpecNotFound(String),

    #[error("unknown cable configuration for connector '{connector}' with {phases} phases")]
    UnknownCableConfiguration { connector: String, phases: u8 },

    /// A multi-input node was queried without naming the input to follow
    #[error("{node} has more than one input; {quantity} needs the input specified")]
    AmbiguousInput { node: String, quantity: &'static str },

    #[error("{via} does not feed {node}")]
    NotAnInput { node: String, via: String },

    #[error("invalid cable run length: {0} m")]
    InvalidLength(f64),

    #[error("nominal voltages differ between sources of {node}: {voltages:?}")]
    VoltageMismatch { node: String, voltages: Vec<f64> },

    /// The node has no supply to walk up to
    #[error("{0} is not wired to a source")]
    NotWired(String),

    #[error("{node} spec is missing required field '{field}'")]
    MissingSpecField { node: String, field: &'static str },

    #[error("plan has no equipment catalog")]
    MissingCatalog,

    /// Cycle guard for upstream/downstream walks
    #[error("traversal from {node} exceeded {depth} hops; the plan may contain a cycle")]
    DepthExceeded { node: String, depth: usize },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

impl PlanError {
    /// Whether this error came from matching physical ports.
    pub fn is_assignment_error(&self) -> bool {
        matches!(
            self,
            PlanError::PortUnavailable { .. } | PlanError::ConnectorMismatch { .. }
        )
    }
}

pub type PlanResult<T> = Result<T, PlanError>;
