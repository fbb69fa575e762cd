//! # bolt_core - Bolted Joint Analysis Engine
//!
//! `bolt_core` computes preload, stresses and margins of safety of preloaded
//! bolted joints according to ESA PSS-03-208 and ECSS-E-HB-32-23A. All inputs
//! and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: `analyze` is a pure function of a joint description and a catalog
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **No printing**: notes and warnings come back as [`diagnostics`]
//!
//! ## Quick Start
//!
//! ```rust
//! use bolt_core::{analyze, Catalog, JointSpec, Project};
//!
//! let mut project = Project::new("Jane Engineer", "26-001", "Acme Space");
//! let joint = JointSpec::template("Bracket I/F", &project.settings);
//!
//! let analysis = analyze(&joint, Catalog::builtin().unwrap()).unwrap();
//! println!("governing margin: {:?}", analysis.results.governing_margin());
//!
//! project.add_joint(joint);
//! let json = serde_json::to_string_pretty(&project).unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`project`] - Project container, metadata, and settings
//! - [`joint`] - Joint description: bolt, stack, tightening, load cases
//! - [`analysis`] - Stage pipeline and the two standards
//! - [`results`] - Preload, stress and margin records
//! - [`catalog`] - Built-in and user bolt / washer / material databases
//! - [`fasteners`] - Bolt and washer geometry
//! - [`materials`] - Material properties
//! - [`units`] - Type-safe unit wrappers
//! - [`diagnostics`] - Notes and warnings collected during an analysis
//! - [`errors`] - Structured error types
//! - [`file_io`] - Project files with atomic saves

pub mod analysis;
pub mod catalog;
pub mod diagnostics;
pub mod errors;
pub mod fasteners;
pub mod file_io;
pub mod joint;
pub mod materials;
pub mod project;
pub mod results;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use analysis::{analyze, Analysis};
pub use catalog::Catalog;
pub use diagnostics::{Diagnostic, DiagnosticLevel};
pub use errors::{BoltError, BoltResult};
pub use file_io::{load_project, project_catalog, save_project};
pub use joint::JointSpec;
pub use project::{GlobalSettings, Project, ProjectMetadata};
pub use results::{Bracket, JointResults, Margin};
