//! # Error Types
//!
//! Structured error types for bolt_core. Every variant carries enough context
//! (field names, offending values, ids) for a caller to report or fix the
//! problem without parsing the message text.
//!
//! Errors fall into three groups:
//!
//! - **Validation**: the joint description is inconsistent or incomplete
//! - **Lookup**: a bolt, washer or material id is not in the catalog
//! - **Persistence**: project/database files could not be read or written
//!
//! ## Example
//!
//! ```rust
//! use bolt_core::errors::{BoltError, BoltResult};
//!
//! fn validate_thickness(t_mm: f64) -> BoltResult<()> {
//!     if t_mm <= 0.0 {
//!         return Err(BoltError::invalid_input(
//!             "thickness",
//!             t_mm.to_string(),
//!             "Clamped part thickness must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_thickness(-1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for bolt_core operations
pub type BoltResult<T> = Result<T, BoltError>;

/// Structured error type for joint analysis operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum BoltError {
    /// An input value is invalid (out of range, inconsistent, missing)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// Maximum friction coefficient is below the minimum one
    #[error("Friction coefficients for {pair}: max {max} is below min {min}")]
    FrictionOrder { pair: String, max: f64, min: f64 },

    /// Margin-of-safety convention other than "min" or "mean"
    #[error("Unsupported margin of safety type: '{value}' (expected \"min\" or \"mean\")")]
    UnsupportedMosType { value: String },

    /// Embedding roughness category not in the supported set
    #[error("Unsupported embedding category: '{value}' (expected \"<10\", \"10-40\", \"40-160\" or \"5%\")")]
    UnsupportedEmbeddingCategory { value: String },

    /// Number of embedding interfaces outside the tabulated range
    #[error("Embedding interface count {count} is outside the tabulated range")]
    InterfaceCountOutOfRange { count: usize },

    /// VDI thermal model requested without its temperature-dependent data
    #[error("Missing thermal data: {field} is required for the VDI thermal model")]
    MissingThermalData { field: String },

    /// Material id not present in the material table
    #[error("Material not found: {id}")]
    UnknownMaterial { id: String },

    /// Bolt or washer id not present in its catalog
    #[error("Unknown {kind}: {id}")]
    UnknownPart { kind: String, id: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl BoltError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        BoltError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnknownMaterial error
    pub fn unknown_material(id: impl Into<String>) -> Self {
        BoltError::UnknownMaterial { id: id.into() }
    }

    /// Create an UnknownPart error (`kind` is "bolt" or "washer")
    pub fn unknown_part(kind: impl Into<String>, id: impl Into<String>) -> Self {
        BoltError::UnknownPart {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Create a MissingThermalData error
    pub fn missing_thermal_data(field: impl Into<String>) -> Self {
        BoltError::MissingThermalData { field: field.into() }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        BoltError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        BoltError::SerializationError { reason: reason.into() }
    }

    /// True for errors caused by an inconsistent joint description
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BoltError::InvalidInput { .. }
                | BoltError::FrictionOrder { .. }
                | BoltError::UnsupportedMosType { .. }
                | BoltError::UnsupportedEmbeddingCategory { .. }
                | BoltError::InterfaceCountOutOfRange { .. }
                | BoltError::MissingThermalData { .. }
        )
    }

    /// True for catalog lookup failures
    pub fn is_lookup(&self) -> bool {
        matches!(self, BoltError::UnknownMaterial { .. } | BoltError::UnknownPart { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            BoltError::InvalidInput { .. } => "INVALID_INPUT",
            BoltError::FrictionOrder { .. } => "FRICTION_ORDER",
            BoltError::UnsupportedMosType { .. } => "UNSUPPORTED_MOS_TYPE",
            BoltError::UnsupportedEmbeddingCategory { .. } => "UNSUPPORTED_EMBEDDING_CATEGORY",
            BoltError::InterfaceCountOutOfRange { .. } => "INTERFACE_COUNT_OUT_OF_RANGE",
            BoltError::MissingThermalData { .. } => "MISSING_THERMAL_DATA",
            BoltError::UnknownMaterial { .. } => "UNKNOWN_MATERIAL",
            BoltError::UnknownPart { .. } => "UNKNOWN_PART",
            BoltError::FileError { .. } => "FILE_ERROR",
            BoltError::SerializationError { .. } => "SERIALIZATION_ERROR",
            BoltError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = BoltError::invalid_input("through_hole_mm", "-8.4", "Through hole must be positive");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: BoltError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(BoltError::unknown_material("AL7075").error_code(), "UNKNOWN_MATERIAL");
        assert_eq!(BoltError::unknown_part("bolt", "S_M99").error_code(), "UNKNOWN_PART");
        assert_eq!(
            BoltError::InterfaceCountOutOfRange { count: 1 }.error_code(),
            "INTERFACE_COUNT_OUT_OF_RANGE"
        );
    }

    #[test]
    fn test_error_classification() {
        let friction = BoltError::FrictionOrder {
            pair: "head".to_string(),
            max: 0.1,
            min: 0.2,
        };
        assert!(friction.is_validation());
        assert!(!friction.is_lookup());
        assert!(BoltError::unknown_material("X").is_lookup());
        assert!(!BoltError::serialization("bad").is_validation());
    }
}
