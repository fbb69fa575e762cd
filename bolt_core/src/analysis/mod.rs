//! # Joint Analysis Pipeline
//!
//! Turns a [`JointSpec`] into [`JointResults`] by running a fixed sequence
//! of stages:
//!
//! ```text
//! INIT ──► STIFFNESS ──► EMBEDDING ──► THERMAL ──► RESULTS ──► DONE
//!  │          │              │            │           │
//!  resolve    strategy       strategy     shared      strategy
//! ```
//!
//! The two standards differ only in the stiffness, embedding and results
//! stages; each implements [`JointAnalysisStrategy`]. Stage outputs are plain
//! structs handed to the next stage, so every intermediate value is written
//! exactly once.
//!
//! ## Example
//!
//! ```rust
//! use bolt_core::analysis::analyze;
//! use bolt_core::catalog::Catalog;
//! use bolt_core::joint::JointSpec;
//! use bolt_core::project::GlobalSettings;
//!
//! let spec = JointSpec::template("J-1", &GlobalSettings::default());
//! let analysis = analyze(&spec, Catalog::builtin().unwrap()).unwrap();
//!
//! assert!(analysis.results.tightening_factor >= 1.0);
//! for note in &analysis.diagnostics {
//!     println!("{}", note);
//! }
//! ```

pub mod assembly;
pub mod bearing;
pub mod ecss;
pub mod esa_pss;
pub mod thermal;

pub use ecss::EcssAnalysis;
pub use esa_pss::EsaPssAnalysis;
pub use thermal::ThermalResult;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::diagnostics::{AnalysisStage, Diagnostic, Diagnostics};
use crate::errors::{BoltError, BoltResult};
use crate::fasteners::{BoltGeometry, WasherGeometry};
use crate::joint::{AnalysisMethod, ClampedPart, JointSpec};
use crate::materials::{MaterialProperty, MaterialTable};
use crate::results::{JointResults, SubstitutionArea};

// ============================================================================
// Resolved joint
// ============================================================================

/// One layer of the clamped stack with its material resolved.
#[derive(Debug, Clone, Copy)]
pub struct Layer<'a> {
    pub material_id: &'a str,
    pub material: &'a MaterialProperty,
    pub thickness_mm: f64,
    pub is_shim: bool,
}

/// Materials at service temperature (VDI thermal model).
#[derive(Debug, Clone)]
pub struct ServiceTemperature<'a> {
    pub bolt_material: &'a MaterialProperty,
    /// Same layout as the room-temperature stack, shim first if present
    pub stack: Vec<Layer<'a>>,
}

/// A joint description with every catalog reference looked up.
#[derive(Debug, Clone)]
pub struct ResolvedJoint<'a> {
    pub spec: &'a JointSpec,
    pub bolt: &'a BoltGeometry,
    pub bolt_material: &'a MaterialProperty,
    /// Clamped stack, shim first if present
    pub stack: Vec<Layer<'a>>,
    pub shim: Option<&'a WasherGeometry>,
    pub service: Option<ServiceTemperature<'a>>,
}

impl<'a> ResolvedJoint<'a> {
    /// Look up bolt, washer and materials and check the geometric
    /// compatibility of hole, head and shim.
    pub fn resolve(spec: &'a JointSpec, catalog: &'a Catalog, diag: &mut Diagnostics) -> BoltResult<Self> {
        let bolt = catalog.bolts.lookup(&spec.bolt)?;
        let bolt_material = catalog.materials.lookup(&spec.bolt_material)?;

        if spec.through_hole_mm < bolt.d_mm || spec.through_hole_mm >= bolt.dh_mm {
            return Err(BoltError::invalid_input(
                "through_hole_mm",
                spec.through_hole_mm.to_string(),
                format!("Through hole must lie in [d, dh) = [{}, {}) for bolt {}", bolt.d_mm, bolt.dh_mm, spec.bolt),
            ));
        }

        let mut stack = Vec::with_capacity(spec.clamped_parts.len() + 1);
        let shim = match &spec.shim {
            Some(shim) => {
                let washer = catalog.washers.lookup(&shim.washer)?;
                if washer.dmin_mm >= bolt.dh_mm || washer.dmaj_mm <= spec.through_hole_mm {
                    return Err(BoltError::invalid_input(
                        "shim.washer",
                        shim.washer.as_str(),
                        "Washer must overlap both the bolt head and the through hole",
                    ));
                }
                stack.push(Layer {
                    material_id: shim.material.as_str(),
                    material: catalog.materials.lookup(&shim.material)?,
                    thickness_mm: washer.h_mm,
                    is_shim: true,
                });
                Some(washer)
            }
            None => None,
        };
        stack.extend(resolve_parts(&spec.clamped_parts, &catalog.materials)?);

        let service = match &spec.thermal {
            Some(thermal) if thermal.use_vdi_method => {
                let bolt_id = thermal
                    .bolt_material
                    .as_deref()
                    .ok_or_else(|| BoltError::missing_thermal_data("thermal.bolt_material"))?;
                if thermal.clamped_parts.is_empty() {
                    return Err(BoltError::missing_thermal_data("thermal.clamped_parts"));
                }

                let mut service_stack = Vec::with_capacity(stack.len());
                if let Some(rt_shim) = stack.first().filter(|l| l.is_shim) {
                    let layer = match thermal.shim_material.as_deref() {
                        Some(id) => Layer {
                            material_id: id,
                            material: catalog.materials.lookup(id)?,
                            ..*rt_shim
                        },
                        None => {
                            diag.warn(
                                AnalysisStage::Init,
                                format!(
                                    "No service-temperature shim material given; using room-temperature {}",
                                    rt_shim.material_id
                                ),
                            );
                            *rt_shim
                        }
                    };
                    service_stack.push(layer);
                }
                service_stack.extend(resolve_parts(&thermal.clamped_parts, &catalog.materials)?);

                Some(ServiceTemperature {
                    bolt_material: catalog.materials.lookup(bolt_id)?,
                    stack: service_stack,
                })
            }
            _ => None,
        };

        Ok(ResolvedJoint {
            spec,
            bolt,
            bolt_material,
            stack,
            shim,
            service,
        })
    }

    /// l_K: total clamped thickness, shim included (mm)
    pub fn clamp_length(&self) -> f64 {
        self.stack.iter().map(|l| l.thickness_mm).sum()
    }

    /// Number of clamped layers, shim included
    pub fn layer_count(&self) -> usize {
        self.stack.len()
    }

    /// D_Km: mean head bearing diameter (mm)
    pub fn mean_bearing_diameter(&self) -> f64 {
        (self.spec.through_hole_mm + self.bolt.dh_mm) / 2.0
    }

    /// Lever arm of the head friction: D_Km / (2·sin(lbd/2)) (mm)
    pub fn head_friction_radius(&self) -> f64 {
        self.mean_bearing_diameter() / (2.0 * self.bolt.bearing_angle_factor())
    }

    /// Σ t_i/(A_sub·E_i) over the room-temperature stack (mm/N)
    pub fn clamped_compliance(&self, substitution_area_mm2: f64) -> f64 {
        stack_compliance(&self.stack, substitution_area_mm2)
    }

    /// Materials loaded in bearing: shim (if any) and first structural part.
    pub fn bearing_materials(&self, service_temperature: bool) -> (Option<&'a MaterialProperty>, &'a MaterialProperty) {
        let stack = match (&self.service, service_temperature) {
            (Some(service), true) => &service.stack,
            _ => &self.stack,
        };
        let shim = stack.iter().find(|l| l.is_shim).map(|l| l.material);
        // validate() guarantees at least one structural part
        let first = stack.iter().find(|l| !l.is_shim).map_or(self.bolt_material, |l| l.material);
        (shim, first)
    }

    /// Bolt material whose strengths enter the strength margins
    pub fn strength_material(&self) -> &'a MaterialProperty {
        self.service.as_ref().map_or(self.bolt_material, |s| s.bolt_material)
    }
}

fn resolve_parts<'a>(parts: &'a [ClampedPart], materials: &'a MaterialTable) -> BoltResult<Vec<Layer<'a>>> {
    parts
        .iter()
        .map(|part| {
            Ok(Layer {
                material_id: part.material.as_str(),
                material: materials.lookup(&part.material)?,
                thickness_mm: part.thickness_mm,
                is_shim: false,
            })
        })
        .collect()
}

pub(crate) fn stack_compliance(stack: &[Layer<'_>], substitution_area_mm2: f64) -> f64 {
    stack
        .iter()
        .map(|l| l.thickness_mm / (substitution_area_mm2 * l.material.e_mpa))
        .sum()
}

// ============================================================================
// Stage results
// ============================================================================

/// Output of the STIFFNESS stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StiffnessResult {
    /// l_K (mm)
    pub clamp_length_mm: f64,
    /// A_sub (mm²)
    pub substitution_area_mm2: f64,
    pub substitution: SubstitutionArea,
    /// δ_b (mm/N)
    pub bolt_compliance: f64,
    /// δ_c (mm/N)
    pub clamped_compliance: f64,
    /// Φ
    pub force_ratio: f64,
    /// Φn = n·Φ
    pub force_ratio_n: f64,
}

impl StiffnessResult {
    /// Complete the stiffness record from the compliances.
    pub fn from_compliances(
        joint: &ResolvedJoint<'_>,
        substitution_area_mm2: f64,
        substitution: SubstitutionArea,
        bolt_compliance: f64,
    ) -> Self {
        let clamped_compliance = joint.clamped_compliance(substitution_area_mm2);
        let force_ratio = clamped_compliance / (bolt_compliance + clamped_compliance);
        StiffnessResult {
            clamp_length_mm: joint.clamp_length(),
            substitution_area_mm2,
            substitution,
            bolt_compliance,
            clamped_compliance,
            force_ratio,
            force_ratio_n: joint.spec.loading_plane_factor * force_ratio,
        }
    }

    /// δ_b + δ_c (mm/N)
    pub fn total_compliance(&self) -> f64 {
        self.bolt_compliance + self.clamped_compliance
    }
}

/// Settled embedding values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub interfaces: usize,
    /// f_Z (µm)
    pub depth_um: f64,
    /// F_Z (N, negative = loss)
    pub preload_n: f64,
    /// Taken as 5 % of the maximum assembly preload
    pub five_percent: bool,
}

/// Output of the EMBEDDING stage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EmbeddingResult {
    Settled(Embedding),
    /// Resolved in the RESULTS stage once the assembly preload is known
    DeferredFivePercent { interfaces: usize },
}

// ============================================================================
// Strategy and orchestrator
// ============================================================================

/// Standard-specific part of the analysis.
pub trait JointAnalysisStrategy {
    fn method(&self) -> AnalysisMethod;

    /// Compliances, substitution area and force ratio
    fn compute_stiffness(&self, joint: &ResolvedJoint<'_>, diag: &mut Diagnostics) -> BoltResult<StiffnessResult>;

    /// Embedding depth and preload loss
    fn compute_embedding(
        &self,
        joint: &ResolvedJoint<'_>,
        stiffness: &StiffnessResult,
        diag: &mut Diagnostics,
    ) -> BoltResult<EmbeddingResult>;

    /// Preload, stresses and margins
    fn assemble_results(
        &self,
        joint: &ResolvedJoint<'_>,
        stiffness: StiffnessResult,
        embedding: EmbeddingResult,
        thermal: ThermalResult,
        diag: &mut Diagnostics,
    ) -> BoltResult<JointResults>;
}

/// Results plus the diagnostics collected along the way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub results: JointResults,
    pub diagnostics: Vec<Diagnostic>,
}

/// Analyze one joint.
///
/// Validates the description, resolves it against `catalog` and runs the
/// stage sequence with the strategy selected by `spec.method`. Pure: no I/O,
/// and two calls with the same inputs give identical results.
pub fn analyze(spec: &JointSpec, catalog: &Catalog) -> BoltResult<Analysis> {
    spec.validate()?;

    let mut diag = Diagnostics::new();
    let joint = ResolvedJoint::resolve(spec, catalog, &mut diag)?;

    let results = match spec.method {
        AnalysisMethod::EsaPss => run_pipeline(&EsaPssAnalysis, &joint, &mut diag)?,
        AnalysisMethod::Ecss => run_pipeline(&EcssAnalysis, &joint, &mut diag)?,
    };

    Ok(Analysis {
        results,
        diagnostics: diag.into_vec(),
    })
}

/// Run the stage sequence with one strategy.
pub fn run_pipeline<S: JointAnalysisStrategy>(
    strategy: &S,
    joint: &ResolvedJoint<'_>,
    diag: &mut Diagnostics,
) -> BoltResult<JointResults> {
    diag.info(
        AnalysisStage::Init,
        format!("{} analysis of {}", strategy.method().display_name(), joint.spec.label),
    );
    let stiffness = strategy.compute_stiffness(joint, diag)?;
    let embedding = strategy.compute_embedding(joint, &stiffness, diag)?;
    let thermal = thermal::compute(joint, &stiffness, diag)?;
    strategy.assemble_results(joint, stiffness, embedding, thermal, diag)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::joint::{
        AnalysisMethod, BoltLoadCase, ClampedPart, EmbeddingRoughness, FrictionCoefficients, JointSpec, JointType,
        MosConvention, SafetyFactors, TighteningTorque, TorqueScatter,
    };

    /// S_M8 / A286 through two 10 mm AL7075 plates (l_K/d = 2.5)
    pub fn m8_joint(method: AnalysisMethod) -> JointSpec {
        JointSpec {
            label: "J-1".to_string(),
            method,
            joint_type: JointType::ThroughBolt,
            mos_convention: MosConvention::Min,
            bolt: "S_M8".to_string(),
            bolt_material: "A286".to_string(),
            friction: FrictionCoefficients {
                mu_head_max: 0.2,
                mu_thread_max: 0.2,
                mu_head_min: 0.1,
                mu_thread_min: 0.1,
            },
            mu_clamp: 0.2,
            shear_planes: 1,
            through_hole_mm: 8.4,
            torque: TighteningTorque {
                nominal_nm: 18.0,
                scatter: TorqueScatter::Percent(10.0),
            },
            locking: None,
            loading_plane_factor: 0.5,
            safety_factors: SafetyFactors {
                fos_y: 1.1,
                fos_u: 1.25,
                fos_slip: 1.1,
                fos_gap: 1.0,
                fos_fit: 1.0,
            },
            embedding: EmbeddingRoughness::Below10,
            substitution_diameter_mm: None,
            edge_distance_mm: Some(12.0),
            shim: None,
            clamped_parts: vec![
                ClampedPart::new("AL7075-T7351", 10.0),
                ClampedPart::new("AL7075-T7351", 10.0),
            ],
            load_cases: vec![BoltLoadCase::new("LC-1", 1000.0, 500.0, 0.0)],
            thermal: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::m8_joint;
    use super::*;
    use crate::joint::{Shim, ThermalSpec};

    #[test]
    fn test_resolve_stack_with_shim() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::EsaPss);
        spec.shim = Some(Shim {
            material: "CRES-15-5PH".to_string(),
            washer: "W_M8".to_string(),
        });
        let mut diag = Diagnostics::new();
        let joint = ResolvedJoint::resolve(&spec, catalog, &mut diag).unwrap();

        assert_eq!(joint.layer_count(), 3);
        assert!(joint.stack[0].is_shim);
        assert_eq!(joint.stack[0].thickness_mm, 1.6);
        assert!((joint.clamp_length() - 21.6).abs() < 1e-12);

        let (shim, first) = joint.bearing_materials(false);
        assert_eq!(shim.unwrap().sig_y_mpa, 1000.0);
        assert_eq!(first.sig_y_mpa, 390.0);
    }

    #[test]
    fn test_unknown_references() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::EsaPss);
        spec.bolt = "S_M99".to_string();
        assert_eq!(analyze(&spec, catalog).unwrap_err(), BoltError::unknown_part("bolt", "S_M99"));

        let mut spec = m8_joint(AnalysisMethod::EsaPss);
        spec.clamped_parts[1].material = "UNOBTAINIUM".to_string();
        assert_eq!(analyze(&spec, catalog).unwrap_err(), BoltError::unknown_material("UNOBTAINIUM"));
    }

    #[test]
    fn test_hole_larger_than_head_rejected() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::EsaPss);
        spec.through_hole_mm = 13.5;
        assert_eq!(analyze(&spec, catalog).unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_service_stack_defaults_shim_material() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::EsaPss);
        spec.shim = Some(Shim {
            material: "CRES-15-5PH".to_string(),
            washer: "W_M8".to_string(),
        });
        let mut thermal = ThermalSpec::standard(80.0);
        thermal.use_vdi_method = true;
        thermal.bolt_material = Some("A286@120C".to_string());
        thermal.clamped_parts = vec![
            ClampedPart::new("AL7075-T7351@120C", 10.0),
            ClampedPart::new("AL7075-T7351@120C", 10.0),
        ];
        spec.thermal = Some(thermal);

        let mut diag = Diagnostics::new();
        let joint = ResolvedJoint::resolve(&spec, catalog, &mut diag).unwrap();
        let service = joint.service.as_ref().unwrap();
        assert_eq!(service.stack.len(), 3);
        assert_eq!(service.stack[0].material_id, "CRES-15-5PH");
        assert_eq!(diag.warnings().count(), 1);
        assert_eq!(joint.strength_material().sig_y_mpa, 640.0);

        let (_, first) = joint.bearing_materials(true);
        assert_eq!(first.sig_y_mpa, 355.0);
    }

    #[test]
    fn test_analysis_is_idempotent() {
        let catalog = Catalog::builtin().unwrap();
        for method in AnalysisMethod::ALL {
            let spec = m8_joint(method);
            let first = analyze(&spec, catalog).unwrap();
            let second = analyze(&spec, catalog).unwrap();
            assert_eq!(first, second);
            assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }
    }

    #[test]
    fn test_tightening_factor_at_least_one() {
        let catalog = Catalog::builtin().unwrap();
        for method in AnalysisMethod::ALL {
            let analysis = analyze(&m8_joint(method), catalog).unwrap();
            assert!(analysis.results.tightening_factor >= 1.0);
        }
    }
}
