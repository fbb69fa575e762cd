//! # Fastener Databases
//!
//! Bolt and washer geometry tables. Bolts are looked up by id (e.g.
//! `"S_M8"` for a socket head M8, `"H_M10"` for a hex head M10), washers the
//! same way (e.g. `"W_M8"`).
//!
//! ## Example
//!
//! ```rust
//! use bolt_core::fasteners::BoltTable;
//!
//! let bolts = BoltTable::from_toml_str(r#"
//!     [bolts.S_M6]
//!     d_mm = 6.0
//!     p_mm = 1.0
//!     d2_mm = 5.35
//!     d3_mm = 4.773
//!     as_mm2 = 20.1
//!     dh_mm = 10.0
//! "#).unwrap();
//!
//! let m6 = bolts.lookup("S_M6").unwrap();
//! assert!(m6.ds_mm < m6.d_mm);
//! ```

pub mod bolt;
pub mod washer;

pub use bolt::{BoltGeometry, BoltRecord};
pub use washer::WasherGeometry;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{BoltError, BoltResult};

#[derive(Deserialize)]
struct BoltFile {
    #[serde(default)]
    bolts: BTreeMap<String, BoltGeometry>,
}

#[derive(Deserialize)]
struct WasherFile {
    #[serde(default)]
    washers: BTreeMap<String, WasherGeometry>,
}

/// Bolt id → geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoltTable {
    bolts: BTreeMap<String, BoltGeometry>,
}

impl BoltTable {
    pub fn new() -> Self {
        BoltTable::default()
    }

    /// Parse a TOML bolt database. Geometry is validated while parsing.
    pub fn from_toml_str(text: &str) -> BoltResult<Self> {
        let file: BoltFile = toml::from_str(text)
            .map_err(|e| BoltError::serialization(format!("Invalid bolt database: {}", e)))?;
        Ok(BoltTable { bolts: file.bolts })
    }

    pub fn lookup(&self, id: &str) -> BoltResult<&BoltGeometry> {
        self.bolts.get(id).ok_or_else(|| BoltError::unknown_part("bolt", id))
    }

    pub fn insert(&mut self, id: impl Into<String>, bolt: BoltGeometry) {
        self.bolts.insert(id.into(), bolt);
    }

    /// Overlay another table; its entries replace ours on id collision
    pub fn merge(&mut self, other: BoltTable) {
        self.bolts.extend(other.bolts);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoltGeometry)> {
        self.bolts.iter().map(|(id, b)| (id.as_str(), b))
    }

    pub fn len(&self) -> usize {
        self.bolts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bolts.is_empty()
    }
}

/// Washer id → geometry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WasherTable {
    washers: BTreeMap<String, WasherGeometry>,
}

impl WasherTable {
    pub fn new() -> Self {
        WasherTable::default()
    }

    /// Parse a TOML washer database, validating every entry.
    pub fn from_toml_str(text: &str) -> BoltResult<Self> {
        let file: WasherFile = toml::from_str(text)
            .map_err(|e| BoltError::serialization(format!("Invalid washer database: {}", e)))?;
        for (id, washer) in &file.washers {
            washer.validate(id)?;
        }
        Ok(WasherTable { washers: file.washers })
    }

    pub fn lookup(&self, id: &str) -> BoltResult<&WasherGeometry> {
        self.washers.get(id).ok_or_else(|| BoltError::unknown_part("washer", id))
    }

    pub fn insert(&mut self, id: impl Into<String>, washer: WasherGeometry) -> BoltResult<()> {
        let id = id.into();
        washer.validate(&id)?;
        self.washers.insert(id, washer);
        Ok(())
    }

    pub fn merge(&mut self, other: WasherTable) {
        self.washers.extend(other.washers);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &WasherGeometry)> {
        self.washers.iter().map(|(id, w)| (id.as_str(), w))
    }

    pub fn len(&self) -> usize {
        self.washers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.washers.is_empty()
    }
}
