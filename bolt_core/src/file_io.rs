//! # File I/O Module
//!
//! Project file operations:
//! - **Atomic saves**: Write to .tmp, sync, rename to prevent corruption
//! - **Version validation**: Ensure schema compatibility
//! - **Catalog resolution**: Built-in databases plus the project's overrides
//!
//! ## File Format
//!
//! Projects are saved as `.bjp` (bolted joint project) files containing JSON.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bolt_core::file_io::{save_project, load_project};
//! use bolt_core::project::Project;
//! use std::path::Path;
//!
//! let project = Project::new("Engineer", "26-001", "Client");
//! let path = Path::new("myproject.bjp");
//!
//! save_project(&project, path)?;
//! let loaded = load_project(path)?;
//! assert_eq!(loaded.meta.job_id, "26-001");
//! # Ok::<(), bolt_core::errors::BoltError>(())
//! ```

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use crate::catalog::Catalog;
use crate::errors::{BoltError, BoltResult};
use crate::project::{Project, SCHEMA_VERSION};

/// Save a project to a file with atomic write semantics.
///
/// The save process:
/// 1. Serialize project to JSON
/// 2. Write to a temporary file (.tmp)
/// 3. Sync to disk (fsync)
/// 4. Rename .tmp to the final name (atomic on most filesystems)
pub fn save_project(project: &Project, path: &Path) -> BoltResult<()> {
    let json = serde_json::to_string_pretty(project).map_err(|e| BoltError::serialization(e.to_string()))?;

    let tmp_path = path.with_extension("bjp.tmp");

    let mut tmp_file = File::create(&tmp_path).map_err(|e| {
        BoltError::file_error("create temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.write_all(json.as_bytes()).map_err(|e| {
        BoltError::file_error("write temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    tmp_file.sync_all().map_err(|e| {
        BoltError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string())
    })?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        BoltError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Load a project from a file.
///
/// # Returns
///
/// * `Ok(Project)` - Successfully loaded project
/// * `Err(BoltError::VersionMismatch)` - File version is incompatible
/// * `Err(BoltError::SerializationError)` - Invalid JSON or unknown tag values
/// * `Err(BoltError::FileError)` - I/O error
pub fn load_project(path: &Path) -> BoltResult<Project> {
    let mut file = File::open(path).map_err(|e| {
        BoltError::file_error("open", path.display().to_string(), e.to_string())
    })?;

    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(|e| {
        BoltError::file_error("read", path.display().to_string(), e.to_string())
    })?;

    let project: Project = serde_json::from_str(&contents)
        .map_err(|e| BoltError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))?;

    validate_version(&project.meta.version)?;

    Ok(project)
}

/// Catalog for a loaded project: the built-in databases, overlaid with the
/// project's database directory (resolved relative to the project file).
pub fn project_catalog(project: &Project, project_path: &Path) -> BoltResult<Catalog> {
    match &project.settings.database_dir {
        Some(dir) if dir.is_absolute() => Catalog::with_overrides(dir),
        Some(dir) => {
            let base = project_path.parent().unwrap_or_else(|| Path::new("."));
            Catalog::with_overrides(&base.join(dir))
        }
        None => Ok(Catalog::builtin()?.clone()),
    }
}

/// Validate that a file version is compatible with the current schema.
fn validate_version(file_version: &str) -> BoltResult<()> {
    let mismatch = || BoltError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION.split('.').filter_map(|p| p.parse().ok()).collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // For 0.x versions, a newer minor version is not readable
    if current_parts[0] == 0 && file_parts.len() > 1 && current_parts.len() > 1 && file_parts[1] > current_parts[1] {
        return Err(mismatch());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::JointSpec;
    use std::env::temp_dir;
    use std::path::PathBuf;

    fn temp_project_path(name: &str) -> PathBuf {
        temp_dir().join(format!("bolt_core_test_{}.bjp", name))
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let path = temp_project_path("roundtrip");

        let mut project = Project::new("Test Engineer", "TEST-001", "Test Client");
        let settings = project.settings.clone();
        project.add_joint(JointSpec::template("J-1", &settings));
        save_project(&project, &path).unwrap();

        let loaded = load_project(&path).unwrap();
        assert_eq!(loaded.meta.engineer, "Test Engineer");
        assert_eq!(loaded.joint_count(), 1);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_save_creates_no_tmp_file() {
        let path = temp_project_path("atomic");
        let tmp_path = path.with_extension("bjp.tmp");

        let project = Project::new("Test", "TEST", "Client");
        save_project(&project, &path).unwrap();

        assert!(!tmp_path.exists());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_invalid_json_reported() {
        let path = temp_project_path("invalid");
        fs::write(&path, "{ not json").unwrap();
        let err = load_project(&path).unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_reported() {
        let err = load_project(&temp_project_path("does_not_exist")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.5").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_project_catalog_without_overrides() {
        let project = Project::new("Test", "TEST", "Client");
        let catalog = project_catalog(&project, Path::new("job.bjp")).unwrap();
        assert!(catalog.bolts.lookup("S_M10").is_ok());
    }
}
