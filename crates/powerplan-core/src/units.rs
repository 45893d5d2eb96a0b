//! Unit-safe quantities for temporary power calculations.
//!
//! Prevents mixing incompatible quantities like amps and volts, or a per-metre
//! cable impedance with an absolute loop impedance.
//!
//! All types are `#[repr(transparent)]` wrappers around `f64` and serialize as
//! bare numbers, so catalog and plan data stay readable in JSON/TOML.
//!
//! ```
//! use powerplan_core::units::{Amperes, Meters, MilliohmsPerMeter, Volts, Watts};
//!
//! let current = Watts(23_000.0) / Volts(230.0);
//! assert_eq!(current, Amperes(100.0));
//!
//! // 2.7 mΩ/m over a 50 m run
//! let r = MilliohmsPerMeter(2.7).over(Meters(50.0));
//! assert!((r.value() - 0.135).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Neg, Sub};

macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $type {
            type Output = Self;
            fn neg(self) -> Self::Output {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Mul<$type> for f64 {
            type Output = $type;
            fn mul(self, rhs: $type) -> Self::Output {
                <$type>::new(self * rhs.0)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl Div<$type> for $type {
            type Output = f64;
            fn div(self, rhs: $type) -> Self::Output {
                self.0 / rhs.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.4} {}", self.0, $unit_name)
            }
        }

        impl $type {
            pub const ZERO: Self = Self(0.0);

            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }

            #[inline]
            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0))
            }

            #[inline]
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0))
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }

        impl<'a> std::iter::Sum<&'a $type> for $type {
            fn sum<I: Iterator<Item = &'a Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

// =============================================================================
// Electrical Units
// =============================================================================

/// Current in amperes (A). Port and cable ratings are expressed in this unit.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Amperes(pub f64);

impl_unit_ops!(Amperes, "A");

/// Voltage in volts (V). Nominal voltages are line-to-line unless stated.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Volts(pub f64);

impl_unit_ops!(Volts, "V");

/// Resistance or loop impedance in ohms (Ω)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Ohms(pub f64);

impl_unit_ops!(Ohms, "Ω");

/// Active power in watts (W). Loads are specified in watts.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Watts(pub f64);

impl_unit_ops!(Watts, "W");

/// Apparent power in volt-amperes (VA). Generator ratings are quoted in VA.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct VoltAmperes(pub f64);

impl_unit_ops!(VoltAmperes, "VA");

/// Cable length in metres
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct Meters(pub f64);

impl_unit_ops!(Meters, "m");

/// Per-length cable impedance in milliohms per metre (mΩ/m).
///
/// Cable tables quote voltage drop in mV/A/m, which is numerically the same
/// quantity. For single-phase runs this is the `r1 + r2` loop value.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[repr(transparent)]
pub struct MilliohmsPerMeter(pub f64);

impl_unit_ops!(MilliohmsPerMeter, "mΩ/m");

// =============================================================================
// Relationships
// =============================================================================

impl MilliohmsPerMeter {
    /// Total impedance over a run of the given length.
    #[inline]
    pub fn over(self, length: Meters) -> Ohms {
        Ohms(self.0 * length.0 / 1000.0)
    }
}

impl Volts {
    /// Line-to-neutral voltage for a line-to-line nominal: V / √3
    #[inline]
    pub fn line_to_neutral(self) -> Volts {
        Volts(self.0 / 3.0_f64.sqrt())
    }
}

impl Div<Volts> for Watts {
    type Output = Amperes;
    fn div(self, rhs: Volts) -> Amperes {
        Amperes(self.0 / rhs.0)
    }
}

impl Div<Ohms> for Volts {
    type Output = Amperes;
    fn div(self, rhs: Ohms) -> Amperes {
        Amperes(self.0 / rhs.0)
    }
}

impl Mul<Ohms> for Amperes {
    type Output = Volts;
    fn mul(self, rhs: Ohms) -> Volts {
        Volts(self.0 * rhs.0)
    }
}
