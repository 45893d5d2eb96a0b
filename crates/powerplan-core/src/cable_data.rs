//! Cable current ratings and voltage drop reference tables.
//!
//! Each [`Methodology`] is one published table of flexible cable data:
//!
//! | Methodology | Source |
//! |-------------|--------|
//! | [`Methodology::Bs7671Table4F1A`] | BS 7671:2008 table 4F1A, 60 °C thermosetting flexible, non-armoured |
//! | [`Methodology::Bs7671Table4F3A`] | BS 7671:2008 table 4F3A, flexible cords |
//! | [`Methodology::Eland`] | Eland Cables H07RN-F data sheet |
//!
//! Ratings are indexed by [`CableConfiguration`]. Voltage drop columns are two-core DC,
//! two-core AC, multi-core AC, touching AC and touching single-core; values are mV/A/m.

use serde::{Deserialize, Serialize};

use crate::catalog::VoltageDrop;
use crate::error::{PlanError, PlanResult};
use crate::units::Amperes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Methodology {
    #[serde(rename = "bs7671-4f1a")]
    Bs7671Table4F1A,
    #[serde(rename = "bs7671-4f3a")]
    Bs7671Table4F3A,
    #[default]
    #[serde(rename = "eland")]
    Eland,
}

/// How the conductors of a run are laid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CableConfiguration {
    /// Two-core cable, with or without protective conductor
    TwoCore,
    /// Three-, four- or five-core multi-phase cable
    MultiCore,
    /// Two single-core cables, laid touching
    TwoSingle,
}

impl CableConfiguration {
    fn rating_column(self) -> usize {
        match self {
            CableConfiguration::TwoCore => 0,
            CableConfiguration::MultiCore => 1,
            CableConfiguration::TwoSingle => 2,
        }
    }

    fn voltage_drop_column(self) -> usize {
        match self {
            CableConfiguration::TwoCore => 1,
            CableConfiguration::MultiCore => 2,
            CableConfiguration::TwoSingle => 4,
        }
    }
}

/// Map a connector family and phase count to how its cable is built.
pub fn cable_configuration(connector: &str, phases: u8) -> PlanResult<CableConfiguration> {
    let connector_lower = connector.to_ascii_lowercase();
    match (connector_lower.as_str(), phases) {
        ("powerlock", _) => Ok(CableConfiguration::TwoSingle),
        ("iec 60309", 3) => Ok(CableConfiguration::MultiCore),
        ("iec 60309", 1) => Ok(CableConfiguration::TwoCore),
        _ => Err(PlanError::UnknownCableConfiguration {
            connector: connector.to_string(),
            phases,
        }),
    }
}

struct RatingRow {
    csa: f64,
    amps: [Option<f64>; 3],
}

struct DropRow {
    csa: f64,
    drops: [Option<VoltageDrop>; 5],
}

struct Table {
    ratings: &'static [RatingRow],
    voltage_drop: &'static [DropRow],
}

const fn r(csa: f64, two: Option<f64>, multi: Option<f64>, single: Option<f64>) -> RatingRow {
    RatingRow {
        csa,
        amps: [two, multi, single],
    }
}

const fn s(v: f64) -> Option<VoltageDrop> {
    Some(VoltageDrop::Scalar(v))
}

const fn t(r: f64, x: f64, z: f64) -> Option<VoltageDrop> {
    Some(VoltageDrop::Components(r, x, z))
}

const N: Option<VoltageDrop> = None;

const fn d(csa: f64, drops: [Option<VoltageDrop>; 5]) -> DropRow {
    DropRow { csa, drops }
}

static TABLE_4F1A: Table = Table {
    ratings: &[
        r(4.0, Some(30.0), Some(26.0), None),
        r(6.0, Some(39.0), Some(34.0), None),
        r(10.0, Some(51.0), Some(47.0), None),
        r(16.0, Some(73.0), Some(63.0), None),
        r(25.0, Some(97.0), Some(83.0), None),
        r(35.0, None, Some(102.0), Some(140.0)),
        r(50.0, None, Some(124.0), Some(175.0)),
        r(70.0, None, Some(158.0), Some(216.0)),
        r(95.0, None, Some(192.0), Some(258.0)),
        r(120.0, None, Some(222.0), Some(302.0)),
        r(150.0, None, Some(255.0), Some(347.0)),
        r(185.0, None, Some(291.0), Some(394.0)),
        r(240.0, None, Some(343.0), Some(471.0)),
        r(300.0, None, Some(394.0), Some(541.0)),
        r(400.0, None, None, Some(644.0)),
        r(500.0, None, None, Some(738.0)),
        r(630.0, None, None, Some(861.0)),
    ],
    voltage_drop: &[
        d(4.0, [s(12.0), s(12.0), s(10.0), N, N]),
        d(6.0, [s(7.8), s(7.8), s(6.7), N, N]),
        d(10.0, [s(4.6), s(4.6), s(4.0), N, N]),
        d(16.0, [s(2.9), s(2.9), s(2.5), N, N]),
        d(25.0, [s(1.8), t(1.8, 0.175, 1.85), t(1.55, 0.150, 1.55), N, N]),
        d(35.0, [N, N, t(1.10, 0.150, 1.15), s(1.31), t(1.31, 0.21, 1.32)]),
        d(50.0, [N, N, t(0.83, 0.145, 0.84), s(0.91), t(0.91, 0.21, 0.93)]),
        d(70.0, [N, N, t(0.57, 0.140, 0.58), s(0.64), t(0.64, 0.20, 0.67)]),
        d(95.0, [N, N, t(0.42, 0.135, 0.44), s(0.49), t(0.49, 0.195, 0.53)]),
        d(120.0, [N, N, t(0.33, 0.135, 0.36), s(0.38), t(0.38, 0.190, 0.43)]),
        d(150.0, [N, N, t(0.27, 0.130, 0.30), s(0.31), t(0.31, 0.190, 0.36)]),
        d(185.0, [N, N, t(0.22, 0.130, 0.26), s(0.25), t(0.25, 0.190, 0.32)]),
        d(240.0, [N, N, t(0.170, 0.130, 0.21), s(0.19), t(0.195, 0.185, 0.27)]),
        d(300.0, [N, N, t(0.135, 0.125, 0.185), s(0.150), t(0.155, 0.180, 0.24)]),
        d(400.0, [N, N, N, s(0.115), t(0.120, 0.175, 0.21)]),
        d(500.0, [N, N, N, s(0.090), t(0.099, 0.170, 0.20)]),
        d(630.0, [N, N, N, s(0.068), t(0.079, 0.170, 0.185)]),
    ],
};

// Ratings are subject to temperature derating factors not applied here.
static TABLE_4F3A: Table = Table {
    ratings: &[
        r(0.5, Some(3.0), Some(3.0), None),
        r(0.75, Some(6.0), Some(6.0), None),
        r(1.0, Some(10.0), Some(10.0), None),
        r(1.25, Some(13.0), None, None),
        r(1.5, Some(16.0), Some(16.0), None),
        r(2.5, Some(25.0), Some(20.0), None),
        r(4.0, Some(32.0), Some(25.0), None),
    ],
    voltage_drop: &[
        d(0.5, [N, s(93.0), s(80.0), N, N]),
        d(0.75, [N, s(62.0), s(54.0), N, N]),
        d(1.0, [N, s(46.0), s(40.0), N, N]),
        d(1.25, [N, s(37.0), N, N, N]),
        d(1.5, [N, s(32.0), s(27.0), N, N]),
        d(2.5, [N, s(19.0), s(16.0), N, N]),
        d(4.0, [N, s(12.0), s(10.0), N, N]),
    ],
};

static TABLE_ELAND: Table = Table {
    ratings: &[
        r(2.5, Some(25.0), Some(20.0), None),
        r(4.0, Some(41.0), Some(36.0), None),
        r(6.0, Some(53.0), Some(47.0), None),
        r(10.0, Some(73.0), Some(64.0), None),
        r(16.0, Some(99.0), Some(86.0), None),
        r(25.0, Some(131.0), Some(114.0), None),
        r(35.0, None, Some(140.0), Some(192.0)),
        r(50.0, None, Some(170.0), Some(240.0)),
        r(70.0, None, Some(216.0), Some(297.0)),
        r(95.0, None, Some(262.0), Some(354.0)),
        r(120.0, None, Some(303.0), Some(414.0)),
        r(150.0, None, Some(348.0), Some(476.0)),
        r(185.0, None, Some(397.0), Some(540.0)),
        r(240.0, None, Some(467.0), Some(645.0)),
        r(300.0, None, Some(537.0), Some(741.0)),
        r(400.0, None, None, Some(885.0)),
        r(630.0, None, None, Some(1190.0)),
    ],
    voltage_drop: &[
        d(1.5, [s(32.0), s(32.0), s(27.0), N, N]),
        d(2.5, [s(19.0), s(19.0), s(16.0), N, N]),
        d(4.0, [s(13.0), s(13.0), s(11.0), N, N]),
        d(6.0, [s(8.4), s(8.4), s(7.30), N, N]),
        d(10.0, [s(5.0), s(5.0), s(4.3), N, N]),
        d(16.0, [s(3.1), s(3.1), s(2.7), N, N]),
        d(25.0, [s(2.0), t(2.0, 0.175, 2.0), t(1.700, 0.150, 1.700), N, N]),
        d(35.0, [s(1.42), N, t(1.200, 0.150, 1.200), N, t(1.420, 0.210, 1.430)]),
        d(50.0, [s(0.99), N, t(0.900, 0.145, 0.910), N, t(0.990, 0.210, 1.010)]),
        d(70.0, [s(0.70), N, t(0.610, 0.140, 0.630), N, t(0.700, 0.200, 0.720)]),
        d(95.0, [N, N, t(0.460, 0.135, 0.480), N, t(0.530, 0.195, 0.560)]),
        d(120.0, [N, N, t(0.360, 0.135, 0.390), N, t(0.410, 0.190, 0.460)]),
        d(150.0, [N, N, t(0.290, 0.130, 0.320), N, t(0.330, 0.190, 0.380)]),
        d(185.0, [N, N, t(0.240, 0.130, 0.270), N, t(0.270, 0.190, 0.330)]),
        d(240.0, [N, N, t(0.185, 0.130, 0.220), N, t(0.210, 0.185, 0.280)]),
        d(300.0, [N, N, t(0.145, 0.125, 0.195), N, t(0.170, 0.180, 0.250)]),
        d(400.0, [N, N, N, N, t(0.130, 0.175, 0.220)]),
        d(630.0, [N, N, N, N, t(0.084, 0.170, 0.190)]),
    ],
};

fn table(methodology: Methodology) -> &'static Table {
    match methodology {
        Methodology::Bs7671Table4F1A => &TABLE_4F1A,
        Methodology::Bs7671Table4F3A => &TABLE_4F3A,
        Methodology::Eland => &TABLE_ELAND,
    }
}

/// Rating and voltage drop for one cable size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CableRatings {
    pub rating: Option<Amperes>,
    pub voltage_drop: Option<VoltageDrop>,
}

/// Smallest cross-sectional area rated for `current` in the given configuration.
pub fn select_cable_size(
    current: Amperes,
    methodology: Methodology,
    configuration: CableConfiguration,
) -> Option<f64> {
    let col = configuration.rating_column();
    table(methodology)
        .ratings
        .iter()
        .find(|row| row.amps[col].is_some_and(|amps| amps >= current.value()))
        .map(|row| row.csa)
}

/// Look up the rating and voltage drop for an exact cross-sectional area.
pub fn cable_ratings(
    csa: f64,
    methodology: Methodology,
    configuration: CableConfiguration,
) -> CableRatings {
    let data = table(methodology);
    let rating = data
        .ratings
        .iter()
        .find(|row| row.csa == csa)
        .and_then(|row| row.amps[configuration.rating_column()])
        .map(Amperes);
    let voltage_drop = data
        .voltage_drop
        .iter()
        .find(|row| row.csa == csa)
        .and_then(|row| row.drops[configuration.voltage_drop_column()]);
    CableRatings {
        rating,
        voltage_drop,
    }
}
