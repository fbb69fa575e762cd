//! # Materials Database
//!
//! Mechanical and thermal properties of bolt, shim and clamped-part
//! materials, keyed by a free-form material id (e.g. `"A286"`,
//! `"AL7075-T7351"`, `"AL7075-T7351@120C"` for a temperature-dependent set).
//!
//! ## TOML Format
//!
//! ```toml
//! [materials.A286]
//! e_mpa = 201000.0
//! sig_u_mpa = 1000.0
//! sig_y_mpa = 660.0
//! alpha_per_k = 16.5e-6
//! remark = "Iron-base superalloy bolt material"
//! ```
//!
//! ## Example
//!
//! ```rust
//! use bolt_core::materials::MaterialTable;
//!
//! let table = MaterialTable::from_toml_str(r#"
//!     [materials.TI6AL4V]
//!     e_mpa = 110000.0
//!     sig_u_mpa = 900.0
//!     sig_y_mpa = 830.0
//!     alpha_per_k = 8.6e-6
//! "#).unwrap();
//!
//! let ti = table.lookup("TI6AL4V").unwrap();
//! assert!((ti.tau_y_mpa() - 0.577 * 830.0).abs() < 1e-9);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{BoltError, BoltResult};

/// Ratio of shear to tensile strength used for derived shear strengths
pub const SHEAR_STRENGTH_RATIO: f64 = 0.577;

/// Properties of one material at one temperature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialProperty {
    /// Young's modulus E (MPa)
    pub e_mpa: f64,
    /// Ultimate tensile strength (MPa)
    pub sig_u_mpa: f64,
    /// Yield strength (MPa)
    pub sig_y_mpa: f64,
    /// Coefficient of thermal expansion (1/K)
    pub alpha_per_k: f64,
    /// Optional free-text note
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
}

impl MaterialProperty {
    /// Create a material without a remark
    pub fn new(e_mpa: f64, sig_u_mpa: f64, sig_y_mpa: f64, alpha_per_k: f64) -> Self {
        MaterialProperty {
            e_mpa,
            sig_u_mpa,
            sig_y_mpa,
            alpha_per_k,
            remark: None,
        }
    }

    /// Shear yield strength (0.577 · yield)
    pub fn tau_y_mpa(&self) -> f64 {
        SHEAR_STRENGTH_RATIO * self.sig_y_mpa
    }

    /// Shear ultimate strength (0.577 · ultimate)
    pub fn tau_u_mpa(&self) -> f64 {
        SHEAR_STRENGTH_RATIO * self.sig_u_mpa
    }

    /// Check that the property set is physically consistent
    pub fn validate(&self, id: &str) -> BoltResult<()> {
        if !(self.e_mpa > 0.0) {
            return Err(BoltError::invalid_input(
                format!("materials.{}.e_mpa", id),
                self.e_mpa.to_string(),
                "Young's modulus must be positive",
            ));
        }
        if !(self.sig_y_mpa > 0.0) {
            return Err(BoltError::invalid_input(
                format!("materials.{}.sig_y_mpa", id),
                self.sig_y_mpa.to_string(),
                "Yield strength must be positive",
            ));
        }
        if self.sig_y_mpa > self.sig_u_mpa {
            return Err(BoltError::invalid_input(
                format!("materials.{}.sig_y_mpa", id),
                self.sig_y_mpa.to_string(),
                format!("Yield strength exceeds ultimate strength {}", self.sig_u_mpa),
            ));
        }
        if !self.alpha_per_k.is_finite() {
            return Err(BoltError::invalid_input(
                format!("materials.{}.alpha_per_k", id),
                self.alpha_per_k.to_string(),
                "Thermal expansion coefficient must be finite",
            ));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct MaterialFile {
    #[serde(default)]
    materials: BTreeMap<String, MaterialProperty>,
}

/// Material id → properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialTable {
    materials: BTreeMap<String, MaterialProperty>,
}

impl MaterialTable {
    /// Empty table
    pub fn new() -> Self {
        MaterialTable::default()
    }

    /// Parse a TOML material database, validating every entry.
    pub fn from_toml_str(text: &str) -> BoltResult<Self> {
        let file: MaterialFile = toml::from_str(text)
            .map_err(|e| BoltError::serialization(format!("Invalid material database: {}", e)))?;
        for (id, mat) in &file.materials {
            mat.validate(id)?;
        }
        Ok(MaterialTable {
            materials: file.materials,
        })
    }

    /// Look up a material by id
    pub fn lookup(&self, id: &str) -> BoltResult<&MaterialProperty> {
        self.materials.get(id).ok_or_else(|| BoltError::unknown_material(id))
    }

    /// Add or replace a material
    pub fn insert(&mut self, id: impl Into<String>, material: MaterialProperty) -> BoltResult<()> {
        let id = id.into();
        material.validate(&id)?;
        self.materials.insert(id, material);
        Ok(())
    }

    /// Overlay another table; its entries replace ours on id collision
    pub fn merge(&mut self, other: MaterialTable) {
        self.materials.extend(other.materials);
    }

    /// Iterate materials in id order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MaterialProperty)> {
        self.materials.iter().map(|(id, m)| (id.as_str(), m))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
