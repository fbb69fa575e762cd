//! # Unit Types
//!
//! Type-safe wrappers for the units used by the joint analysis. They are plain
//! f64 newtypes that serialize as bare numbers.
//!
//! ## Unit System
//!
//! The engine works in a consistent N / mm / MPa system:
//! - Length: millimeters (mm); embedding depths in micrometers (µm)
//! - Area: square millimeters (mm²)
//! - Force: newtons (N)
//! - Stress: megapascals (MPa = N/mm²)
//! - Torque: newton-meters (Nm) at the input boundary, newton-millimeters (Nmm) internally
//!
//! The two unit crossings that appear in the formulas (Nm → Nmm for the
//! tightening torque and µm → mm for embedding) go through these types.
//!
//! ## Example
//!
//! ```rust
//! use bolt_core::units::{Micrometers, Millimeters, NewtonMeters, NewtonMillimeters};
//!
//! let torque = NewtonMeters(10.0);
//! let torque_nmm: NewtonMillimeters = torque.into();
//! assert_eq!(torque_nmm.0, 10_000.0);
//!
//! let f_z: Millimeters = Micrometers(12.0).into();
//! assert!((f_z.0 - 0.012).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

// ============================================================================
// Length Units
// ============================================================================

/// Length in millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Millimeters(pub f64);

/// Length in micrometers (embedding depths)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Micrometers(pub f64);

impl From<Micrometers> for Millimeters {
    fn from(um: Micrometers) -> Self {
        Millimeters(um.0 / 1000.0)
    }
}

impl From<Millimeters> for Micrometers {
    fn from(mm: Millimeters) -> Self {
        Micrometers(mm.0 * 1000.0)
    }
}

// ============================================================================
// Area Units
// ============================================================================

/// Area in square millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SqMm(pub f64);

impl SqMm {
    /// Area of an annulus between two diameters: π/4·(outer² − inner²)
    pub fn annulus(outer: Millimeters, inner: Millimeters) -> Self {
        SqMm(std::f64::consts::PI / 4.0 * (outer.0 * outer.0 - inner.0 * inner.0))
    }
}

// ============================================================================
// Force and Stress Units
// ============================================================================

/// Force in newtons
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Newtons(pub f64);

/// Stress in megapascals (N/mm²)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Megapascals(pub f64);

impl Div<SqMm> for Newtons {
    type Output = Megapascals;
    fn div(self, rhs: SqMm) -> Megapascals {
        Megapascals(self.0 / rhs.0)
    }
}

// ============================================================================
// Torque Units
// ============================================================================

/// Torque in newton-meters (tightening torque input unit)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewtonMeters(pub f64);

/// Torque in newton-millimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NewtonMillimeters(pub f64);

impl From<NewtonMeters> for NewtonMillimeters {
    fn from(nm: NewtonMeters) -> Self {
        NewtonMillimeters(nm.0 * 1000.0)
    }
}

impl From<NewtonMillimeters> for NewtonMeters {
    fn from(nmm: NewtonMillimeters) -> Self {
        NewtonMeters(nmm.0 / 1000.0)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
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

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }

            /// Create from raw f64 value
            pub fn new(value: f64) -> Self {
                Self(value)
            }
        }
    };
}

impl_arithmetic!(Millimeters);
impl_arithmetic!(Micrometers);
impl_arithmetic!(SqMm);
impl_arithmetic!(Newtons);
impl_arithmetic!(Megapascals);
impl_arithmetic!(NewtonMeters);
impl_arithmetic!(NewtonMillimeters);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_torque_conversion() {
        let nmm: NewtonMillimeters = NewtonMeters(2.5).into();
        assert_eq!(nmm.0, 2500.0);
        let back: NewtonMeters = nmm.into();
        assert_eq!(back.0, 2.5);
    }

    #[test]
    fn test_embedding_conversion() {
        let mm: Millimeters = Micrometers(5.5).into();
        assert!((mm.0 - 0.0055).abs() < 1e-15);
    }

    #[test]
    fn test_pressure_from_force_and_area() {
        let p = Newtons(1000.0) / SqMm(50.0);
        assert_eq!(p, Megapascals(20.0));
    }

    #[test]
    fn test_annulus() {
        let a = SqMm::annulus(Millimeters(13.0), Millimeters(8.4));
        assert!((a.0 - std::f64::consts::PI / 4.0 * (169.0 - 70.56)).abs() < 1e-9);
    }

    #[test]
    fn test_arithmetic() {
        let a = Newtons(10.0);
        let b = Newtons(4.0);
        assert_eq!((a + b).0, 14.0);
        assert_eq!((a - b).0, 6.0);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((a / 2.0).0, 5.0);
    }

    #[test]
    fn test_serialization() {
        let t = NewtonMeters(12.5);
        let json = serde_json::to_string(&t).unwrap();
        assert_eq!(json, "12.5");

        let roundtrip: NewtonMeters = serde_json::from_str(&json).unwrap();
        assert_eq!(t, roundtrip);
    }
}
