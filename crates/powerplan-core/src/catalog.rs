//! Equipment and cable catalog.
//!
//! A plan refers to equipment by type name (e.g. `"135kVA"`, `"EPS/63-3"`);
//! the [`Catalog`] resolves those names to port layouts and electrical ratings,
//! and resolves `(connector, current, phases)` keys to standard cable stock.
//!
//! [`EquipmentCatalog`] is the in-memory implementation. It derives
//! `Deserialize`, so suppliers' data can be read with any serde format; where
//! that data lives is up to the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PlanError, PlanResult};
use crate::units::{Amperes, Meters, MilliohmsPerMeter, VoltAmperes, Volts};

/// Connector name used for the synthetic ports of logical nodes.
pub const LINK_CONNECTOR: &str = "Link";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentKind {
    Generator,
    Distro,
    Amf,
    /// Synthetic grid link, never present in a supplier catalog
    Link,
}

fn default_phases() -> u8 {
    1
}

/// One physical socket or inlet on a piece of equipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortSpec {
    pub current: Amperes,
    #[serde(default = "default_phases")]
    pub phases: u8,
    /// Connector type, e.g. `"Powerlock"` or `"IEC 60309"`
    #[serde(rename = "type", alias = "connector")]
    pub connector: String,
    /// Output is a captive adaptor tail rather than a socket
    #[serde(default)]
    pub cable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rcd: Option<String>,
}

impl PortSpec {
    pub fn new(current: f64, phases: u8, connector: impl Into<String>) -> Self {
        Self {
            current: Amperes(current),
            phases,
            connector: connector.into(),
            cable: false,
            rcd: None,
        }
    }

    /// Mark as a captive adaptor cable
    pub fn as_adaptor(mut self) -> Self {
        self.cable = true;
        self
    }

    pub fn with_rcd(mut self, rcd: impl Into<String>) -> Self {
        self.rcd = Some(rcd.into());
        self
    }

    /// Whether this port carries the given rating exactly.
    pub fn matches(&self, current: Amperes, phases: u8) -> bool {
        self.current == current && self.phases == phases
    }
}

/// Catalog record for one equipment type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSpec {
    #[serde(rename = "ref")]
    pub reference: String,
    #[serde(rename = "type")]
    pub kind: EquipmentKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(default)]
    pub inputs: Vec<PortSpec>,
    #[serde(default)]
    pub outputs: Vec<PortSpec>,
    /// Nominal line-to-line voltage (generators)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage: Option<Volts>,
    /// Rated apparent power (generators)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub power: Option<VoltAmperes>,
    /// Transient reactance as a per-unit ratio, 0..1 (generators)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transient_reactance: Option<f64>,
}

impl EquipmentSpec {
    fn empty(reference: impl Into<String>, kind: EquipmentKind) -> Self {
        Self {
            reference: reference.into(),
            kind,
            supplier: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            voltage: None,
            power: None,
            transient_reactance: None,
        }
    }

    pub fn generator(
        reference: impl Into<String>,
        voltage: f64,
        power: f64,
        transient_reactance: f64,
    ) -> Self {
        Self {
            voltage: Some(Volts(voltage)),
            power: Some(VoltAmperes(power)),
            transient_reactance: Some(transient_reactance),
            ..Self::empty(reference, EquipmentKind::Generator)
        }
    }

    pub fn distro(reference: impl Into<String>) -> Self {
        Self::empty(reference, EquipmentKind::Distro)
    }

    pub fn amf(reference: impl Into<String>) -> Self {
        Self::empty(reference, EquipmentKind::Amf)
    }

    /// Spec for a logical grid link with a single port on one side.
    pub fn link(side_is_output: bool, current: Amperes, phases: u8) -> Self {
        let port = PortSpec {
            current,
            phases,
            connector: LINK_CONNECTOR.to_string(),
            cable: false,
            rcd: None,
        };
        let mut spec = Self::empty(LINK_CONNECTOR, EquipmentKind::Link);
        if side_is_output {
            spec.outputs.push(port);
        } else {
            spec.inputs.push(port);
        }
        spec
    }

    pub fn with_supplier(mut self, supplier: impl Into<String>) -> Self {
        self.supplier = Some(supplier.into());
        self
    }

    pub fn with_input(self, port: PortSpec) -> Self {
        self.with_inputs(1, port)
    }

    /// Append `count` identical inputs
    pub fn with_inputs(mut self, count: usize, port: PortSpec) -> Self {
        self.inputs
            .extend(std::iter::repeat(port).take(count));
        self
    }

    pub fn with_output(self, port: PortSpec) -> Self {
        self.with_outputs(1, port)
    }

    /// Append `count` identical outputs
    pub fn with_outputs(mut self, count: usize, port: PortSpec) -> Self {
        self.outputs
            .extend(std::iter::repeat(port).take(count));
        self
    }
}

/// Per-metre voltage drop quoted by a cable table, in mV/A/m.
///
/// Larger multi-core cables are quoted as resistive, reactive and impedance
/// components; the scalar impedance is used for drop calculations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VoltageDrop {
    Scalar(f64),
    Components(f64, f64, f64),
}

impl VoltageDrop {
    pub fn impedance(&self) -> MilliohmsPerMeter {
        match *self {
            VoltageDrop::Scalar(z) => MilliohmsPerMeter(z),
            VoltageDrop::Components(_, _, z) => MilliohmsPerMeter(z),
        }
    }
}

/// Stock cable for one connector/rating combination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CableSpec {
    pub connector: String,
    pub rating: Amperes,
    #[serde(default = "default_phases")]
    pub phases: u8,
    /// Standard lengths held in stock, any order
    pub lengths: Vec<Meters>,
    /// Cross-sectional area in mm²
    pub csa: f64,
    /// Overrides the reference-table impedance when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage_drop: Option<VoltageDrop>,
}

impl CableSpec {
    pub fn new(connector: impl Into<String>, rating: f64, phases: u8, csa: f64, lengths: &[f64]) -> Self {
        Self {
            connector: connector.into(),
            rating: Amperes(rating),
            phases,
            lengths: lengths.iter().copied().map(Meters).collect(),
            csa,
            voltage_drop: None,
        }
    }

    pub fn with_voltage_drop(mut self, drop: VoltageDrop) -> Self {
        self.voltage_drop = Some(drop);
        self
    }

    /// Stock lengths sorted ascending
    pub fn sorted_lengths(&self) -> Vec<Meters> {
        let mut lengths = self.lengths.clone();
        lengths.sort_by(|a, b| a.0.total_cmp(&b.0));
        lengths
    }
}

/// Lookup interface the plan consumes.
pub trait Catalog: std::fmt::Debug + Send + Sync {
    /// Resolve an equipment type name. Fails with [`PlanError::SpecNotFound`].
    fn get_spec(&self, type_name: &str) -> PlanResult<&EquipmentSpec>;

    /// Resolve stock cable for a run. Fails with [`PlanError::NoCableData`].
    fn lookup_cable(&self, connector: &str, current: Amperes, phases: u8) -> PlanResult<&CableSpec>;
}

/// In-memory catalog keyed by equipment reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquipmentCatalog {
    #[serde(default)]
    pub equipment: BTreeMap<String, EquipmentSpec>,
    #[serde(default)]
    pub cables: Vec<CableSpec>,
}

impl EquipmentCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an equipment spec, keyed by its reference.
    pub fn insert(&mut self, spec: EquipmentSpec) -> &mut Self {
        self.equipment.insert(spec.reference.clone(), spec);
        self
    }

    /// Add cable stock, replacing any record with the same key.
    pub fn insert_cable(&mut self, cable: CableSpec) -> &mut Self {
        self.cables.retain(|c| {
            !(c.connector == cable.connector && c.rating == cable.rating && c.phases == cable.phases)
        });
        self.cables.push(cable);
        self
    }

    pub fn count_of(&self, kind: EquipmentKind) -> usize {
        self.equipment.values().filter(|s| s.kind == kind).count()
    }
}

impl Catalog for EquipmentCatalog {
    fn get_spec(&self, type_name: &str) -> PlanResult<&EquipmentSpec> {
        self.equipment
            .get(type_name)
            .ok_or_else(|| PlanError::SpecNotFound(type_name.to_string()))
    }

    fn lookup_cable(&self, connector: &str, current: Amperes, phases: u8) -> PlanResult<&CableSpec> {
        self.cables
            .iter()
            .find(|c| c.connector == connector && c.rating == current && c.phases == phases)
            .ok_or_else(|| PlanError::NoCableData {
                connector: connector.to_string(),
                current: current.value(),
                phases,
            })
    }
}
