//! Bolt thread and head geometry.
//!
//! A bolt is described by its nominal thread dimensions; the areas, the
//! thread lead angle and the stress diameter are derived once when the
//! geometry is built, so every `BoltGeometry` in circulation is complete and
//! consistent.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::errors::{BoltError, BoltResult};

fn default_bearing_angle() -> f64 {
    180.0
}

/// Nominal bolt dimensions as stored in the bolt database.
///
/// ## TOML Example
///
/// ```toml
/// [bolts.S_M8]
/// d_mm = 8.0
/// p_mm = 1.25
/// d2_mm = 7.188
/// d3_mm = 6.466
/// as_mm2 = 36.6
/// dh_mm = 13.0
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoltRecord {
    /// Nominal diameter d (mm)
    pub d_mm: f64,
    /// Thread pitch p (mm)
    pub p_mm: f64,
    /// Pitch diameter d2 (mm)
    pub d2_mm: f64,
    /// Minor diameter d3 (mm)
    pub d3_mm: f64,
    /// Tensile stress area As (mm²)
    pub as_mm2: f64,
    /// Head bearing diameter dh (mm)
    pub dh_mm: f64,
    /// Bearing angle under the head (degrees, 180 for flat heads)
    #[serde(default = "default_bearing_angle")]
    pub lbd_deg: f64,
}

/// Complete bolt geometry with derived quantities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoltRecord", into = "BoltRecord")]
pub struct BoltGeometry {
    pub d_mm: f64,
    pub p_mm: f64,
    pub d2_mm: f64,
    pub d3_mm: f64,
    pub as_mm2: f64,
    pub dh_mm: f64,
    pub lbd_deg: f64,
    /// Nominal cross section A1 = π/4·d² (mm²)
    pub a1_mm2: f64,
    /// Pitch-diameter cross section Ap = π/4·d2² (mm²)
    pub ap_mm2: f64,
    /// Minor-diameter cross section A3 = π/4·d3² (mm²)
    pub a3_mm2: f64,
    /// Stress diameter ds = √(4·As/π) (mm)
    pub ds_mm: f64,
    /// Thread lead angle atan(p/(π·d2)) (rad)
    pub slope_rad: f64,
}

impl BoltGeometry {
    /// Build the geometry from nominal dimensions.
    ///
    /// Fails if any dimension is non-positive, if `d3 < d2 < d` does not
    /// hold, or if the head bearing diameter is not larger than `d`.
    pub fn new(record: BoltRecord) -> BoltResult<Self> {
        let positive = [
            ("d_mm", record.d_mm),
            ("p_mm", record.p_mm),
            ("d2_mm", record.d2_mm),
            ("d3_mm", record.d3_mm),
            ("as_mm2", record.as_mm2),
            ("dh_mm", record.dh_mm),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(BoltError::invalid_input(field, value.to_string(), "Bolt dimension must be positive"));
            }
        }
        if !(record.d3_mm < record.d2_mm && record.d2_mm < record.d_mm) {
            return Err(BoltError::invalid_input(
                "d3_mm/d2_mm/d_mm",
                format!("{}/{}/{}", record.d3_mm, record.d2_mm, record.d_mm),
                "Thread diameters must satisfy d3 < d2 < d",
            ));
        }
        if record.dh_mm <= record.d_mm {
            return Err(BoltError::invalid_input(
                "dh_mm",
                record.dh_mm.to_string(),
                format!("Head bearing diameter must exceed the nominal diameter {}", record.d_mm),
            ));
        }
        if !(record.lbd_deg > 0.0 && record.lbd_deg <= 180.0) {
            return Err(BoltError::invalid_input(
                "lbd_deg",
                record.lbd_deg.to_string(),
                "Bearing angle must be in (0, 180] degrees",
            ));
        }

        Ok(BoltGeometry {
            d_mm: record.d_mm,
            p_mm: record.p_mm,
            d2_mm: record.d2_mm,
            d3_mm: record.d3_mm,
            as_mm2: record.as_mm2,
            dh_mm: record.dh_mm,
            lbd_deg: record.lbd_deg,
            a1_mm2: PI / 4.0 * record.d_mm.powi(2),
            ap_mm2: PI / 4.0 * record.d2_mm.powi(2),
            a3_mm2: PI / 4.0 * record.d3_mm.powi(2),
            ds_mm: (4.0 * record.as_mm2 / PI).sqrt(),
            slope_rad: (record.p_mm / (PI * record.d2_mm)).atan(),
        })
    }

    /// sin(lbd/2), the divisor of the head friction radius
    pub fn bearing_angle_factor(&self) -> f64 {
        (self.lbd_deg.to_radians() / 2.0).sin()
    }

    /// Polar section modulus of the stress cross section, π·ds³/16 (mm³)
    pub fn polar_section_modulus(&self) -> f64 {
        PI * self.ds_mm.powi(3) / 16.0
    }
}

impl TryFrom<BoltRecord> for BoltGeometry {
    type Error = BoltError;

    fn try_from(record: BoltRecord) -> BoltResult<Self> {
        BoltGeometry::new(record)
    }
}

impl From<BoltGeometry> for BoltRecord {
    fn from(bolt: BoltGeometry) -> Self {
        BoltRecord {
            d_mm: bolt.d_mm,
            p_mm: bolt.p_mm,
            d2_mm: bolt.d2_mm,
            d3_mm: bolt.d3_mm,
            as_mm2: bolt.as_mm2,
            dh_mm: bolt.dh_mm,
            lbd_deg: bolt.lbd_deg,
        }
    }
}
