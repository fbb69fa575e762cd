//! ESA PSS-03-208 Issue 1 (1989).
//!
//! Substitution area from the ratio of clamped length to nominal diameter,
//! embedding from the fitted interface table (table 18.4) and the joint
//! coefficient with the thread friction angle added to the lead angle.

use std::f64::consts::PI;

use crate::analysis::assembly::{self, GapModel};
use crate::analysis::{
    Embedding, EmbeddingResult, JointAnalysisStrategy, ResolvedJoint, StiffnessResult, ThermalResult,
};
use crate::diagnostics::{AnalysisStage, Diagnostics};
use crate::errors::{BoltError, BoltResult};
use crate::joint::{AnalysisMethod, EmbeddingRoughness};
use crate::results::{JointResults, SubstitutionArea};
use crate::units::{Micrometers, Millimeters, SqMm};

/// Valid range of l_K/d for the embedding fits
const EMBEDDING_RATIO_RANGE: (f64, f64) = (1.0, 11.0);

/// ESA PSS-03-208 analysis strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct EsaPssAnalysis;

/// Embedding per interface (µm) over l_K/d, by interface count
fn embedding_per_interface(interfaces: usize, ratio: f64) -> f64 {
    let x = ratio.clamp(EMBEDDING_RATIO_RANGE.0, EMBEDDING_RATIO_RANGE.1);
    match interfaces {
        2 | 3 => -0.0133 * x * x + 0.3 * x + 0.8333,
        4 | 5 => -0.0067 * x * x + 0.15 * x + 0.6667,
        _ => -0.0053 * x * x + 0.12 * x + 0.4333,
    }
}

/// K = d2/2·tan(φ + ρ') + μ_head·D_Km/2, ρ' = atan(μ_thread/cos 30°)
///
/// The head term ignores the bearing angle; countersunk heads only see it
/// in the thread torque of the stress check.
fn joint_coefficient(joint: &ResolvedJoint<'_>, mu_head: f64, mu_thread: f64) -> f64 {
    let bolt = joint.bolt;
    let rho = (mu_thread / (PI / 6.0).cos()).atan();
    bolt.d2_mm / 2.0 * (bolt.slope_rad + rho).tan() + mu_head * joint.mean_bearing_diameter() / 2.0
}

impl JointAnalysisStrategy for EsaPssAnalysis {
    fn method(&self) -> AnalysisMethod {
        AnalysisMethod::EsaPss
    }

    fn compute_stiffness(&self, joint: &ResolvedJoint<'_>, diag: &mut Diagnostics) -> BoltResult<StiffnessResult> {
        let bolt = joint.bolt;
        let l_k = joint.clamp_length();
        let ratio = l_k / bolt.d_mm;

        let bolt_compliance =
            (0.4 * bolt.d_mm / bolt.a1_mm2 + l_k / bolt.a3_mm2 + 0.4 * bolt.d_mm / bolt.a3_mm2) / joint.bolt_material.e_mpa;

        let dh = Millimeters(bolt.dh_mm);
        let hole = Millimeters(joint.spec.through_hole_mm);
        let bearing = SqMm::annulus(dh, hole).value();

        let (a_sub, substitution) = if (1.0..=2.0).contains(&ratio) {
            let (d_a, rule_of_thumb) = match joint.spec.substitution_diameter_mm {
                Some(d_a) => (d_a, false),
                None => {
                    let d_a = 2.5 * bolt.dh_mm;
                    diag.info(
                        AnalysisStage::Stiffness,
                        format!("No substitution diameter given; D_A = 2.5·dh = {:.2} mm", d_a),
                    );
                    (d_a, true)
                }
            };
            let cone = PI / 8.0 * (d_a / bolt.dh_mm - 1.0) * (bolt.dh_mm * l_k / 5.0 + l_k * l_k / 100.0);
            diag.info(
                AnalysisStage::Stiffness,
                format!("l_K/d = {:.2}: substitution area case (ii), short cone", ratio),
            );
            (bearing + cone, SubstitutionArea::EsaShortCone { d_a_mm: d_a, rule_of_thumb })
        } else if ratio > 2.0 {
            diag.info(
                AnalysisStage::Stiffness,
                format!("l_K/d = {:.2}: substitution area case (iii), long cone", ratio),
            );
            let outer = Millimeters(bolt.dh_mm + l_k / 10.0);
            (SqMm::annulus(outer, hole).value(), SubstitutionArea::EsaLongCone)
        } else {
            diag.warn(
                AnalysisStage::Stiffness,
                format!(
                    "l_K/d = {:.2} below 1.0; substitution area limited to the head bearing annulus",
                    ratio
                ),
            );
            (bearing, SubstitutionArea::EsaBearingOnly)
        };

        Ok(StiffnessResult::from_compliances(joint, a_sub, substitution, bolt_compliance))
    }

    fn compute_embedding(
        &self,
        joint: &ResolvedJoint<'_>,
        stiffness: &StiffnessResult,
        diag: &mut Diagnostics,
    ) -> BoltResult<EmbeddingResult> {
        let interfaces = joint.layer_count() + 1;
        if interfaces < 2 {
            return Err(BoltError::InterfaceCountOutOfRange { count: interfaces });
        }
        if interfaces > 7 {
            diag.warn(
                AnalysisStage::Embedding,
                format!("{} interfaces exceed the embedding table; the 6-7 interface row is used", interfaces),
            );
        }
        if joint.spec.embedding == EmbeddingRoughness::FivePercent {
            diag.warn(
                AnalysisStage::Embedding,
                "The 5% embedding rule is an ECSS option; the ESA interface table is used",
            );
        }

        let ratio = stiffness.clamp_length_mm / joint.bolt.d_mm;
        let per_interface = embedding_per_interface(interfaces, ratio);
        let depth = Micrometers(per_interface * interfaces as f64);
        let depth_mm: Millimeters = depth.into();
        let preload_n = -depth_mm.value() * stiffness.force_ratio / stiffness.clamped_compliance;

        diag.info(
            AnalysisStage::Embedding,
            format!(
                "{} interfaces at l_K/d = {:.2}: {:.3} µm each, f_Z = {:.2} µm",
                interfaces,
                ratio,
                per_interface,
                depth.value()
            ),
        );

        Ok(EmbeddingResult::Settled(Embedding {
            interfaces,
            depth_um: depth.value(),
            preload_n,
            five_percent: false,
        }))
    }

    fn assemble_results(
        &self,
        joint: &ResolvedJoint<'_>,
        stiffness: StiffnessResult,
        embedding: EmbeddingResult,
        thermal: ThermalResult,
        diag: &mut Diagnostics,
    ) -> BoltResult<JointResults> {
        let tightening = assembly::tighten(joint, |mu_head, mu_thread| joint_coefficient(joint, mu_head, mu_thread));
        let embedding = assembly::settle_embedding(embedding, &stiffness, tightening.assembly_preload_n, diag);
        Ok(assembly::assemble(
            joint,
            stiffness,
            embedding,
            &thermal,
            tightening,
            GapModel::Linear,
            diag,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;
    use crate::analysis::test_support::m8_joint;
    use crate::catalog::Catalog;
    use crate::diagnostics::DiagnosticLevel;
    use crate::joint::{BoltLoadCase, ClampedPart, TighteningTorque, TorqueScatter};
    use crate::results::Margin;

    #[test]
    fn test_long_cone_substitution_area() {
        let catalog = Catalog::builtin().unwrap();
        let spec = m8_joint(AnalysisMethod::EsaPss);
        let mut diag = Diagnostics::new();
        let joint = ResolvedJoint::resolve(&spec, catalog, &mut diag).unwrap();
        let stiffness = EsaPssAnalysis.compute_stiffness(&joint, &mut diag).unwrap();

        let expected = PI / 4.0 * ((13.0_f64 + 2.0).powi(2) - 8.4_f64.powi(2));
        assert!((stiffness.substitution_area_mm2 - expected).abs() < 1e-9);
        assert_eq!(stiffness.substitution, SubstitutionArea::EsaLongCone);
        assert!((stiffness.force_ratio_n - 0.5 * stiffness.force_ratio).abs() < 1e-15);
    }

    #[test]
    fn test_short_cone_rule_of_thumb() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::EsaPss);
        spec.clamped_parts = vec![ClampedPart::new("AL7075-T7351", 6.0), ClampedPart::new("AL7075-T7351", 6.0)];
        let mut diag = Diagnostics::new();
        let joint = ResolvedJoint::resolve(&spec, catalog, &mut diag).unwrap();
        let stiffness = EsaPssAnalysis.compute_stiffness(&joint, &mut diag).unwrap();

        let l_k = 12.0;
        let expected = PI / 4.0 * (13.0_f64.powi(2) - 8.4_f64.powi(2))
            + PI / 8.0 * (2.5 - 1.0) * (13.0 * l_k / 5.0 + l_k * l_k / 100.0);
        assert!((stiffness.substitution_area_mm2 - expected).abs() < 1e-9);
        assert_eq!(
            stiffness.substitution,
            SubstitutionArea::EsaShortCone {
                d_a_mm: 32.5,
                rule_of_thumb: true
            }
        );
    }

    #[test]
    fn test_thin_stack_falls_back_with_warning() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::EsaPss);
        spec.clamped_parts = vec![ClampedPart::new("AL7075-T7351", 3.0), ClampedPart::new("AL7075-T7351", 3.0)];
        let analysis = analyze(&spec, catalog).unwrap();

        assert_eq!(analysis.results.substitution, SubstitutionArea::EsaBearingOnly);
        assert!(analysis
            .diagnostics
            .iter()
            .any(|d| d.level == DiagnosticLevel::Warning && d.stage == AnalysisStage::Stiffness));
    }

    #[test]
    fn test_embedding_fit_at_ratio_one() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::EsaPss);
        spec.clamped_parts = vec![ClampedPart::new("AL7075-T7351", 4.0), ClampedPart::new("AL7075-T7351", 4.0)];
        let results = analyze(&spec, catalog).unwrap().results;

        let per_interface = -0.0133 + 0.3 + 0.8333;
        assert_eq!(results.embedding_interfaces, 3);
        assert!((per_interface - 1.12_f64).abs() < 1e-12);
        assert!((results.embedding_depth_um - 3.0 * per_interface).abs() < 1e-9);

        let expected_loss = -3.0 * per_interface / 1000.0
            / (results.bolt_compliance_mm_per_n + results.clamped_compliance_mm_per_n);
        assert!((results.embedding_preload_n - expected_loss).abs() < 1e-6);
    }

    #[test]
    fn test_embedding_ratio_clamped_to_table() {
        assert_eq!(embedding_per_interface(3, 0.5), embedding_per_interface(3, 1.0));
        assert_eq!(embedding_per_interface(5, 20.0), embedding_per_interface(5, 11.0));
        assert_eq!(embedding_per_interface(9, 4.0), embedding_per_interface(7, 4.0));
    }

    #[test]
    fn test_many_interfaces_warn() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::EsaPss);
        spec.clamped_parts = (0..7).map(|_| ClampedPart::new("AL7075-T7351", 3.0)).collect();
        let analysis = analyze(&spec, catalog).unwrap();

        assert_eq!(analysis.results.embedding_interfaces, 8);
        assert!(analysis
            .diagnostics
            .iter()
            .any(|d| d.level == DiagnosticLevel::Warning && d.stage == AnalysisStage::Embedding));
    }

    #[test]
    fn test_joint_coefficient_exceeds_head_term() {
        let catalog = Catalog::builtin().unwrap();
        let spec = m8_joint(AnalysisMethod::EsaPss);
        let joint = ResolvedJoint::resolve(&spec, catalog, &mut Diagnostics::new()).unwrap();

        let k_max = joint_coefficient(&joint, 0.2, 0.2);
        let k_min = joint_coefficient(&joint, 0.1, 0.1);
        assert!(k_max > k_min);
        assert!(k_min > 0.1 * joint.mean_bearing_diameter() / 2.0);
    }

    #[test]
    fn test_pure_axial_case() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::EsaPss);
        spec.load_cases = vec![BoltLoadCase::new("LC-A", 2000.0, 0.0, 0.0)];
        let results = analyze(&spec, catalog).unwrap().results;

        let lc = results.load_case("LC-A").unwrap();
        assert_eq!(lc.mos_slip, Margin::UNBOUNDED);
        assert_eq!(results.mos_global_slip, Margin::UNBOUNDED);
        assert!(!lc.gapping);
        assert!(lc.gap_limit_n.is_none());
    }

    #[test]
    fn test_countersunk_head_preload_and_torsion() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::EsaPss);
        spec.bolt = "CS_M6".to_string();
        spec.through_hole_mm = 6.4;
        spec.torque = TighteningTorque {
            nominal_nm: 8.0,
            scatter: TorqueScatter::Percent(10.0),
        };
        let joint = ResolvedJoint::resolve(&spec, catalog, &mut Diagnostics::new()).unwrap();

        // D_Km = 9.2 mm; the 90° head does not enter K
        assert!((joint_coefficient(&joint, 0.2, 0.2) - 1.70774).abs() < 1e-5);
        assert!((joint_coefficient(&joint, 0.1, 0.1) - 0.93128).abs() < 1e-5);

        let r = analyze(&spec, catalog).unwrap().results;
        assert!((r.assembly_preload_n.min - 4216.09).abs() < 0.01);
        assert!((r.assembly_preload_n.max - 9449.41).abs() < 0.01);

        // thread torque uses D_Km/(2·sin 45°)
        assert!((r.torsion_stress_mpa.min - 67.447).abs() < 1e-3);
        assert!((r.torsion_stress_mpa.max - 104.355).abs() < 1e-3);
    }
}
