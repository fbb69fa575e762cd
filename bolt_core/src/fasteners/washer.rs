//! Washer / shim geometry.

use serde::{Deserialize, Serialize};

use crate::errors::{BoltError, BoltResult};

/// Flat washer used as a shim under the bolt head.
///
/// ## TOML Example
///
/// ```toml
/// [washers.W_M8]
/// dmin_mm = 8.4
/// dmaj_mm = 16.0
/// h_mm = 1.6
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WasherGeometry {
    /// Inner diameter (mm)
    pub dmin_mm: f64,
    /// Outer diameter (mm)
    pub dmaj_mm: f64,
    /// Thickness (mm)
    pub h_mm: f64,
}

impl WasherGeometry {
    pub fn validate(&self, id: &str) -> BoltResult<()> {
        for (field, value) in [("dmin_mm", self.dmin_mm), ("dmaj_mm", self.dmaj_mm), ("h_mm", self.h_mm)] {
            if !(value > 0.0) {
                return Err(BoltError::invalid_input(
                    format!("washers.{}.{}", id, field),
                    value.to_string(),
                    "Washer dimension must be positive",
                ));
            }
        }
        if self.dmin_mm >= self.dmaj_mm {
            return Err(BoltError::invalid_input(
                format!("washers.{}.dmin_mm", id),
                self.dmin_mm.to_string(),
                format!("Inner diameter must be smaller than outer diameter {}", self.dmaj_mm),
            ));
        }
        Ok(())
    }
}
