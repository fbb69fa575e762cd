//! # Project Data Structures
//!
//! The `Project` struct is the root container of a bolted-joint job file.
//! Projects serialize to `.bjp` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (version, engineer, job info, timestamps)
//! ├── settings: GlobalSettings (default factors, database directory)
//! └── joints: HashMap<Uuid, JointSpec> (all joints of the job)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use bolt_core::joint::JointSpec;
//! use bolt_core::project::Project;
//!
//! let mut project = Project::new("Jane Engineer", "26-042", "ACME Space");
//! let joint = JointSpec::template("Bracket I/F", &project.settings);
//! let id = project.add_joint(joint);
//!
//! assert!(project.joints.contains_key(&id));
//! let json = serde_json::to_string_pretty(&project).unwrap();
//! assert!(json.contains("Bracket I/F"));
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::joint::{JointSpec, MosConvention, SafetyFactors};

/// Current schema version for .bjp files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root project container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Project metadata (version, engineer, job info)
    pub meta: ProjectMetadata,

    /// Defaults for new joints and catalog location
    pub settings: GlobalSettings,

    /// All joints, keyed by UUID
    pub joints: HashMap<Uuid, JointSpec>,
}

impl Project {
    /// Create a new empty project.
    ///
    /// # Arguments
    ///
    /// * `engineer` - Name of the responsible engineer
    /// * `job_id` - Job/project number (e.g., "26-001")
    /// * `client` - Client name
    pub fn new(engineer: impl Into<String>, job_id: impl Into<String>, client: impl Into<String>) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            settings: GlobalSettings::default(),
            joints: HashMap::new(),
        }
    }

    /// Add a joint to the project. Returns the UUID assigned to it.
    pub fn add_joint(&mut self, joint: JointSpec) -> Uuid {
        let id = Uuid::new_v4();
        self.joints.insert(id, joint);
        self.touch();
        id
    }

    /// Remove a joint by UUID.
    pub fn remove_joint(&mut self, id: &Uuid) -> Option<JointSpec> {
        let joint = self.joints.remove(id);
        if joint.is_some() {
            self.touch();
        }
        joint
    }

    pub fn get_joint(&self, id: &Uuid) -> Option<&JointSpec> {
        self.joints.get(id)
    }

    /// Joints ordered by label (then id), for stable reports.
    pub fn joints_by_label(&self) -> Vec<(&Uuid, &JointSpec)> {
        let mut joints: Vec<_> = self.joints.iter().collect();
        joints.sort_by(|a, b| a.1.label.cmp(&b.1.label).then(a.0.cmp(b.0)));
        joints
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new("", "", "")
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Name of the responsible engineer
    pub engineer: String,

    /// Job/project number
    pub job_id: String,

    /// Client name
    pub client: String,

    /// When the project was created
    pub created: DateTime<Utc>,

    /// When the project was last modified
    pub modified: DateTime<Utc>,
}

/// Global project settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Safety factors given to new joints
    pub default_safety_factors: SafetyFactors,

    /// Slippage margin convention given to new joints
    pub default_mos_convention: MosConvention,

    /// Directory with bolts.toml / washers.toml / materials.toml overriding
    /// the built-in catalog, relative to the project file
    #[serde(default)]
    pub database_dir: Option<PathBuf>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        GlobalSettings {
            default_safety_factors: SafetyFactors::default(),
            default_mos_convention: MosConvention::Min,
            database_dir: None,
        }
    }
}
