//! Electrical quantities at nodes of a wired plan.
//!
//! Every query walks the graph from the queried node towards its source (or,
//! for load, towards the leaves) and recomputes from scratch; nothing is
//! cached, so answers always reflect the current edge attributes.
//!
//! ## Quantities
//!
//! | Query | Meaning | AMF without `via` |
//! |-------|---------|-------------------|
//! | [`Solver::load`] | Sum of downstream load | n/a |
//! | [`Solver::r1`] | Phase conductor resistance from source | max |
//! | [`Solver::z_e`] | Source earth fault loop impedance | max |
//! | [`Solver::z_s`] | `z_e + 2·r1` | max |
//! | [`Solver::i_pf`] | Prospective fault current `V_ln / z_s` | min |
//! | [`Solver::v_drop`] | Accumulated L-N voltage drop | max |
//! | [`Solver::cable_length_from_source`] | Accumulated cable length | max |
//!
//! AMF panels take the worst case across their inputs. This assumes the two
//! supplies are never live at the same time.
//!
//! Queries return `Ok(None)` when an upstream cable has no impedance, length
//! or voltage drop assigned yet, and `Err` only for structural problems: an
//! unwired node, an ambiguous multi-input query, a catalog gap on a
//! generator, or a traversal deeper than [`PlanConfig::max_depth`].
//!
//! The plan's [`PlanStage`] is not checked. A node counts as unwired when it
//! has no supply; a connected plan that has not been generated answers with
//! whatever cable data it already carries, which is `None` for any quantity
//! that needs it.
//!
//! [`PlanConfig::max_depth`]: powerplan_core::PlanConfig

use powerplan_core::{
    Amperes, Link, Meters, NodeIndex, NodeKind, Ohms, Plan, PlanError, PlanResult, PlanStage,
    Volts, Watts,
};
use tracing::{debug, warn};

/// Read-only electrical queries over a plan.
#[derive(Debug, Clone, Copy)]
pub struct Solver<'a> {
    plan: &'a Plan,
    max_depth: usize,
}

impl<'a> Solver<'a> {
    pub fn new(plan: &'a Plan) -> Self {
        Self {
            plan,
            max_depth: plan.config().max_depth,
        }
    }

    pub fn plan(&self) -> &'a Plan {
        self.plan
    }

    fn deeper(&self, n: NodeIndex, depth: usize) -> PlanResult<usize> {
        if depth >= self.max_depth {
            return Err(PlanError::DepthExceeded {
                node: self.plan.label(n),
                depth,
            });
        }
        Ok(depth + 1)
    }

    fn is_amf(&self, n: NodeIndex) -> bool {
        self.plan.node(n).kind.is_multi_input()
    }

    /// Upstream neighbours of `n`, including logical sources.
    fn supplies(&self, n: NodeIndex) -> PlanResult<Vec<NodeIndex>> {
        let inputs: Vec<NodeIndex> = self.plan.inputs(n, true).iter().map(|l| l.node).collect();
        if inputs.is_empty() {
            return Err(PlanError::NotWired(self.plan.label(n)));
        }
        Ok(inputs)
    }

    /// The incoming connection to follow: the one from `via`, or the only one.
    fn input(
        &self,
        n: NodeIndex,
        via: Option<NodeIndex>,
        quantity: &'static str,
    ) -> PlanResult<Link<'a>> {
        let inputs = self.plan.inputs(n, true);
        match via {
            Some(via) => inputs
                .into_iter()
                .find(|link| link.node == via)
                .ok_or_else(|| PlanError::NotAnInput {
                    node: self.plan.label(n),
                    via: self.plan.label(via),
                }),
            None => match inputs.as_slice() {
                [] => Err(PlanError::NotWired(self.plan.label(n))),
                [link] => Ok(*link),
                _ => Err(PlanError::AmbiguousInput {
                    node: self.plan.label(n),
                    quantity,
                }),
            },
        }
    }

    /// Evaluate `query` through each input of an AMF. `None` if any input
    /// is unknown.
    fn across_inputs<T>(
        &self,
        n: NodeIndex,
        mut query: impl FnMut(NodeIndex) -> PlanResult<Option<T>>,
    ) -> PlanResult<Option<Vec<T>>> {
        let mut values = Vec::new();
        for via in self.supplies(n)? {
            match query(via)? {
                Some(value) => values.push(value),
                None => return Ok(None),
            }
        }
        Ok(Some(values))
    }

    /// Total load downstream of `n`. A load node returns its own value.
    pub fn load(&self, n: NodeIndex) -> PlanResult<Watts> {
        self.load_at(n, 0)
    }

    fn load_at(&self, n: NodeIndex, depth: usize) -> PlanResult<Watts> {
        match &self.plan.node(n).kind {
            NodeKind::Load(watts) => Ok(*watts),
            NodeKind::LogicalSink(sink) => Ok(sink.load),
            _ => {
                let depth = self.deeper(n, depth)?;
                let mut total = Watts::ZERO;
                for link in self.plan.outputs(n, true) {
                    total = total + self.load_at(link.node, depth)?;
                }
                Ok(total)
            }
        }
    }

    /// The source feeding `n`, following `via` at a multi-input node.
    pub fn source(&self, n: NodeIndex, via: Option<NodeIndex>) -> PlanResult<NodeIndex> {
        self.source_at(n, via, 0)
    }

    fn source_at(&self, n: NodeIndex, via: Option<NodeIndex>, depth: usize) -> PlanResult<NodeIndex> {
        if self.plan.node(n).kind.is_source() {
            return Ok(n);
        }
        let depth = self.deeper(n, depth)?;
        let link = self.input(n, via, "source")?;
        self.source_at(link.node, None, depth)
    }

    /// Nominal line-to-line voltage.
    pub fn voltage(&self, n: NodeIndex) -> PlanResult<Volts> {
        self.voltage_at(n, 0)
    }

    fn voltage_at(&self, n: NodeIndex, depth: usize) -> PlanResult<Volts> {
        match &self.plan.node(n).kind {
            NodeKind::Generator => {
                self.plan
                    .require_spec(n)?
                    .voltage
                    .ok_or_else(|| PlanError::MissingSpecField {
                        node: self.plan.label(n),
                        field: "voltage",
                    })
            }
            NodeKind::LogicalSource(source) => Ok(source.voltage),
            _ => {
                let depth = self.deeper(n, depth)?;
                let mut voltages: Vec<Volts> = Vec::new();
                for supply in self.supplies(n)? {
                    let v = self.voltage_at(supply, depth)?;
                    if !voltages.contains(&v) {
                        voltages.push(v);
                    }
                }
                match voltages.as_slice() {
                    [v] => Ok(*v),
                    _ => Err(PlanError::VoltageMismatch {
                        node: self.plan.label(n),
                        voltages: voltages.iter().map(|v| v.value()).collect(),
                    }),
                }
            }
        }
    }

    /// Nominal line-to-neutral voltage.
    pub fn voltage_ln(&self, n: NodeIndex) -> PlanResult<Volts> {
        Ok(self.voltage(n)?.line_to_neutral())
    }

    /// Earth fault loop impedance external to the installation.
    ///
    /// For a generator this is `V² · X / S`, from its line voltage, per-unit
    /// transient reactance and rated apparent power.
    pub fn z_e(&self, n: NodeIndex) -> PlanResult<Option<Ohms>> {
        self.z_e_at(n, 0)
    }

    fn z_e_at(&self, n: NodeIndex, depth: usize) -> PlanResult<Option<Ohms>> {
        match &self.plan.node(n).kind {
            NodeKind::Generator => self.generator_z_e(n).map(Some),
            NodeKind::LogicalSource(source) => Ok(source.z_s),
            _ => {
                let depth = self.deeper(n, depth)?;
                let values = self.across_inputs(n, |supply| self.z_e_at(supply, depth))?;
                Ok(values.and_then(worst_max))
            }
        }
    }

    fn generator_z_e(&self, n: NodeIndex) -> PlanResult<Ohms> {
        let spec = self.plan.require_spec(n)?;
        let missing = |field| PlanError::MissingSpecField {
            node: self.plan.label(n),
            field,
        };
        let voltage = spec.voltage.ok_or_else(|| missing("voltage"))?;
        let power = spec.power.ok_or_else(|| missing("power"))?;
        let reactance = spec
            .transient_reactance
            .ok_or_else(|| missing("transient_reactance"))?;
        Ok(Ohms(voltage.value().powi(2) * reactance / power.value()))
    }

    /// Phase conductor resistance from the source to `n`.
    ///
    /// Cable impedance is quoted as r1 + r2 per metre, so each hop adds half
    /// of impedance times run length.
    pub fn r1(&self, n: NodeIndex, via: Option<NodeIndex>) -> PlanResult<Option<Ohms>> {
        self.r1_at(n, via, 0)
    }

    fn r1_at(&self, n: NodeIndex, via: Option<NodeIndex>, depth: usize) -> PlanResult<Option<Ohms>> {
        if self.plan.node(n).kind.is_source() {
            return Ok(Some(Ohms::ZERO));
        }
        let depth = self.deeper(n, depth)?;
        if via.is_none() && self.is_amf(n) {
            let values = self.across_inputs(n, |supply| self.r1_at(n, Some(supply), depth))?;
            return Ok(values.and_then(worst_max));
        }

        let link = self.input(n, via, "r1")?;
        let conn = link.connection;
        let (Some(impedance), Some(length)) = (conn.impedance, conn.total_cable_length()) else {
            return Ok(None);
        };
        let Some(upstream) = self.r1_at(link.node, None, depth)? else {
            return Ok(None);
        };
        Ok(Some(upstream + impedance.over(length) * 0.5))
    }

    /// Earth fault loop impedance at `n`.
    pub fn z_s(&self, n: NodeIndex, via: Option<NodeIndex>) -> PlanResult<Option<Ohms>> {
        self.z_s_at(n, via, 0)
    }

    fn z_s_at(&self, n: NodeIndex, via: Option<NodeIndex>, depth: usize) -> PlanResult<Option<Ohms>> {
        match &self.plan.node(n).kind {
            NodeKind::LogicalSource(source) => return Ok(source.z_s),
            NodeKind::Generator => return self.z_e_at(n, depth),
            _ => {}
        }
        let depth = self.deeper(n, depth)?;
        if via.is_none() && self.is_amf(n) {
            let values = self.across_inputs(n, |supply| self.z_s_at(n, Some(supply), depth))?;
            return Ok(values.and_then(worst_max));
        }

        let Some(z_e) = self.z_e_at(n, depth)? else {
            return Ok(None);
        };
        let Some(r1) = self.r1_at(n, via, depth)? else {
            return Ok(None);
        };
        Ok(Some(z_e + r1 * 2.0))
    }

    /// Prospective fault current for a line-neutral or line-earth fault.
    pub fn i_pf(&self, n: NodeIndex, via: Option<NodeIndex>) -> PlanResult<Option<Amperes>> {
        if via.is_none() && self.is_amf(n) {
            let values = self.across_inputs(n, |supply| self.i_pf(n, Some(supply)))?;
            return Ok(values.and_then(|v| {
                v.into_iter().reduce(Amperes::min)
            }));
        }
        let Some(z_s) = self.z_s(n, via)? else {
            return Ok(None);
        };
        if z_s <= Ohms::ZERO {
            return Ok(None);
        }
        Ok(Some(self.voltage_ln(n)? / z_s))
    }

    /// Accumulated line-to-neutral voltage drop from the source.
    pub fn v_drop(&self, n: NodeIndex, via: Option<NodeIndex>) -> PlanResult<Option<Volts>> {
        self.v_drop_at(n, via, 0)
    }

    fn v_drop_at(&self, n: NodeIndex, via: Option<NodeIndex>, depth: usize) -> PlanResult<Option<Volts>> {
        match &self.plan.node(n).kind {
            NodeKind::Generator => return Ok(Some(Volts::ZERO)),
            NodeKind::LogicalSource(source) => return Ok(source.v_drop),
            _ => {}
        }
        let depth = self.deeper(n, depth)?;
        if via.is_none() && self.is_amf(n) {
            let values = self.across_inputs(n, |supply| self.v_drop_at(n, Some(supply), depth))?;
            return Ok(values.and_then(worst_max));
        }

        let link = self.input(n, via, "v_drop")?;
        let Some(hop) = link.connection.voltage_drop else {
            return Ok(None);
        };
        Ok(self.v_drop_at(link.node, None, depth)?.map(|up| up + hop))
    }

    /// Voltage drop as a fraction of the nominal line-to-neutral voltage.
    pub fn v_drop_ratio(&self, n: NodeIndex, via: Option<NodeIndex>) -> PlanResult<Option<f64>> {
        let Some(v_drop) = self.v_drop(n, via)? else {
            return Ok(None);
        };
        Ok(Some(v_drop / self.voltage_ln(n)?))
    }

    /// Nominal breaker rating at the input of `n`.
    ///
    /// The connection's `rating` takes precedence over its `current`. An AMF
    /// queried without `via` must have equally rated inputs.
    pub fn i_n(&self, n: NodeIndex, via: Option<NodeIndex>) -> PlanResult<Option<Amperes>> {
        match &self.plan.node(n).kind {
            NodeKind::LogicalSource(source) => return Ok(source.rated_current()),
            NodeKind::Generator => return Ok(None),
            _ => {}
        }
        let rating = |link: &Link<'_>| link.connection.rating.or(link.connection.current);
        if via.is_none() && self.is_amf(n) {
            let inputs = self.plan.inputs(n, true);
            let Some(first) = inputs.first() else {
                return Err(PlanError::NotWired(self.plan.label(n)));
            };
            let first = rating(first);
            if inputs.iter().any(|link| rating(link) != first) {
                return Err(PlanError::AmbiguousInput {
                    node: self.plan.label(n),
                    quantity: "i_n",
                });
            }
            return Ok(first);
        }
        Ok(rating(&self.input(n, via, "i_n")?))
    }

    /// Total cable length between the source and `n`.
    pub fn cable_length_from_source(
        &self,
        n: NodeIndex,
        via: Option<NodeIndex>,
    ) -> PlanResult<Option<Meters>> {
        self.length_at(n, via, 0)
    }

    fn length_at(&self, n: NodeIndex, via: Option<NodeIndex>, depth: usize) -> PlanResult<Option<Meters>> {
        if self.plan.node(n).kind.is_source() {
            return Ok(Some(Meters::ZERO));
        }
        let depth = self.deeper(n, depth)?;
        if via.is_none() && self.is_amf(n) {
            let values = self.across_inputs(n, |supply| self.length_at(n, Some(supply), depth))?;
            return Ok(values.and_then(worst_max));
        }

        let link = self.input(n, via, "cable_length_from_source")?;
        let Some(length) = link.connection.total_cable_length() else {
            return Ok(None);
        };
        Ok(self.length_at(link.node, None, depth)?.map(|up| up + length))
    }
}

fn worst_max<T: PartialOrd>(values: Vec<T>) -> Option<T> {
    values
        .into_iter()
        .reduce(|a, b| if b > a { b } else { a })
}

/// Compute the voltage drop along every cable with assigned lengths and
/// impedance.
///
/// The drop is the per-phase current into the downstream node (its load over
/// its line voltage) times the run's impedance. Cables into a node with no
/// source are skipped.
pub fn calculate_voltage_drop(plan: &mut Plan) -> PlanResult<()> {
    let mut drops = Vec::new();
    {
        let solver = Solver::new(plan);
        for edge in plan.edge_indices(false) {
            let conn = plan.connection(edge);
            let (Some(impedance), Some(length)) = (conn.impedance, conn.total_cable_length()) else {
                continue;
            };
            let Some((_, b)) = plan.endpoints(edge) else {
                continue;
            };

            let voltage = match solver.voltage(b) {
                Ok(voltage) => voltage,
                Err(PlanError::NotWired(node)) => {
                    warn!(%node, "not wired to a source, skipping voltage drop");
                    continue;
                }
                Err(err) => return Err(err),
            };
            let current = solver.load(b)? / voltage;
            let drop = current * impedance.over(length);
            debug!(to = %plan.label(b), %current, %drop, "voltage drop");
            drops.push((edge, drop));
        }
    }

    for (edge, drop) in drops {
        plan.connection_mut(edge).voltage_drop = Some(drop);
    }
    plan.set_stage(PlanStage::Solved);
    Ok(())
}
