//! # Catalog
//!
//! The three lookup tables an analysis needs (bolts, washers, materials),
//! bundled together.
//!
//! A built-in catalog is compiled into the crate from the TOML files under
//! `assets/db/` and parsed once on first use. Projects can point at a
//! directory with their own `bolts.toml`, `washers.toml` and
//! `materials.toml`; those entries are overlaid on the built-in ones.
//!
//! ## Example
//!
//! ```rust
//! use bolt_core::catalog::Catalog;
//!
//! let catalog = Catalog::builtin().unwrap();
//! assert!(catalog.bolts.lookup("S_M8").is_ok());
//! assert!(catalog.materials.lookup("A286").is_ok());
//! ```

use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::{BoltError, BoltResult};
use crate::fasteners::{BoltTable, WasherTable};
use crate::materials::MaterialTable;

const BUILTIN_BOLTS: &str = include_str!("../assets/db/bolts.toml");
const BUILTIN_WASHERS: &str = include_str!("../assets/db/washers.toml");
const BUILTIN_MATERIALS: &str = include_str!("../assets/db/materials.toml");

/// File names looked up inside a database directory
pub const BOLT_DB_FILE: &str = "bolts.toml";
pub const WASHER_DB_FILE: &str = "washers.toml";
pub const MATERIAL_DB_FILE: &str = "materials.toml";

static BUILTIN: Lazy<BoltResult<Catalog>> = Lazy::new(|| {
    Ok(Catalog {
        bolts: BoltTable::from_toml_str(BUILTIN_BOLTS)?,
        washers: WasherTable::from_toml_str(BUILTIN_WASHERS)?,
        materials: MaterialTable::from_toml_str(BUILTIN_MATERIALS)?,
    })
});

/// Bolt, washer and material tables used to resolve a joint description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub bolts: BoltTable,
    pub washers: WasherTable,
    pub materials: MaterialTable,
}

impl Catalog {
    /// The catalog compiled into the crate.
    pub fn builtin() -> BoltResult<&'static Catalog> {
        BUILTIN.as_ref().map_err(Clone::clone)
    }

    /// Read the database files found in `dir`. Missing files yield empty tables.
    pub fn load_dir(dir: &Path) -> BoltResult<Catalog> {
        let mut catalog = Catalog::default();
        if let Some(text) = read_optional(&dir.join(BOLT_DB_FILE))? {
            catalog.bolts = BoltTable::from_toml_str(&text)?;
        }
        if let Some(text) = read_optional(&dir.join(WASHER_DB_FILE))? {
            catalog.washers = WasherTable::from_toml_str(&text)?;
        }
        if let Some(text) = read_optional(&dir.join(MATERIAL_DB_FILE))? {
            catalog.materials = MaterialTable::from_toml_str(&text)?;
        }
        Ok(catalog)
    }

    /// Built-in catalog with the databases in `dir` overlaid on top.
    pub fn with_overrides(dir: &Path) -> BoltResult<Catalog> {
        let mut catalog = Catalog::builtin()?.clone();
        catalog.merge(Catalog::load_dir(dir)?);
        Ok(catalog)
    }

    /// Overlay another catalog; its entries replace ours on id collision.
    pub fn merge(&mut self, other: Catalog) {
        self.bolts.merge(other.bolts);
        self.washers.merge(other.washers);
        self.materials.merge(other.materials);
    }
}

fn read_optional(path: &Path) -> BoltResult<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    fs::read_to_string(path)
        .map(Some)
        .map_err(|e| BoltError::file_error("read database", path.display().to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env::temp_dir;

    #[test]
    fn test_builtin_catalog_parses() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.bolts.len() >= 10);
        assert!(catalog.washers.lookup("W_M8").is_ok());
        assert!(catalog.materials.lookup("AL7075-T7351@120C").is_ok());
    }

    #[test]
    fn test_builtin_countersunk_angle() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.bolts.lookup("CS_M6").unwrap().lbd_deg, 90.0);
        assert_eq!(catalog.bolts.lookup("S_M6").unwrap().lbd_deg, 180.0);
    }

    #[test]
    fn test_overrides_from_directory() {
        let dir = temp_dir().join("bolt_core_catalog_override");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(MATERIAL_DB_FILE),
            "[materials.A286]\ne_mpa = 200000.0\nsig_u_mpa = 1100.0\nsig_y_mpa = 900.0\nalpha_per_k = 16.0e-6\n",
        )
        .unwrap();

        let catalog = Catalog::with_overrides(&dir).unwrap();
        assert_eq!(catalog.materials.lookup("A286").unwrap().sig_y_mpa, 900.0);
        // untouched tables still come from the built-in set
        assert!(catalog.bolts.lookup("S_M8").is_ok());

        let _ = fs::remove_dir_all(&dir);
    }
}
