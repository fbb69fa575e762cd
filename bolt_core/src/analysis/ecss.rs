//! ECSS-E-HB-32-23A (2010).
//!
//! Compression cone model of the clamped parts (§7.6), embedding from
//! table 6-3 or the 5 % preload rule, and a gapping-limit correction of the
//! additional bolt force.

use std::f64::consts::PI;

use crate::analysis::assembly::{self, GapModel};
use crate::analysis::{
    Embedding, EmbeddingResult, JointAnalysisStrategy, ResolvedJoint, StiffnessResult, ThermalResult,
};
use crate::diagnostics::{AnalysisStage, Diagnostics};
use crate::errors::{BoltError, BoltResult};
use crate::joint::{AnalysisMethod, EmbeddingRoughness, JointType};
use crate::results::{JointResults, SubstitutionArea};
use crate::units::{Micrometers, Millimeters};

/// ECSS-E-HB-32-23A analysis strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct EcssAnalysis;

/// Table 6-3 embedding per interface (µm): thread, under head, between parts
struct EmbeddingTable {
    thread: f64,
    head: f64,
    inner: f64,
}

fn embedding_table(roughness: EmbeddingRoughness) -> Option<EmbeddingTable> {
    let (thread, head, inner) = match roughness {
        EmbeddingRoughness::Below10 => (3.0, 3.0, 2.0),
        EmbeddingRoughness::From10To40 => (3.0, 4.5, 2.5),
        EmbeddingRoughness::From40To160 => (3.0, 6.5, 3.5),
        EmbeddingRoughness::FivePercent => return None,
    };
    Some(EmbeddingTable { thread, head, inner })
}

/// K = d2/2·(tan φ + tan ρ') + μ_head·D_Km/(2·sin(λ/2)), tan ρ' = μ_thread/cos 30°
fn joint_coefficient(joint: &ResolvedJoint<'_>, mu_head: f64, mu_thread: f64) -> f64 {
    let bolt = joint.bolt;
    let tan_rho = mu_thread / (PI / 6.0).cos();
    bolt.d2_mm / 2.0 * (bolt.slope_rad.tan() + tan_rho) + mu_head * joint.head_friction_radius()
}

/// Diameter available for the compression cone
fn available_diameter(joint: &ResolvedJoint<'_>) -> BoltResult<f64> {
    let spec = joint.spec;
    let d_avail = match (spec.substitution_diameter_mm, spec.edge_distance_mm) {
        (Some(d), _) => d,
        (None, Some(edge)) => 2.0 * edge,
        (None, None) => {
            return Err(BoltError::invalid_input(
                "substitution_diameter_mm",
                "none",
                "ECSS needs a substitution diameter or an edge distance",
            ))
        }
    };
    if d_avail <= joint.bolt.d_mm {
        return Err(BoltError::invalid_input(
            "substitution_diameter_mm",
            d_avail.to_string(),
            format!("Available diameter must exceed the nominal diameter {}", joint.bolt.d_mm),
        ));
    }
    Ok(d_avail)
}

impl JointAnalysisStrategy for EcssAnalysis {
    fn method(&self) -> AnalysisMethod {
        AnalysisMethod::Ecss
    }

    fn compute_stiffness(&self, joint: &ResolvedJoint<'_>, diag: &mut Diagnostics) -> BoltResult<StiffnessResult> {
        let bolt = joint.bolt;
        let (d, dh) = (bolt.d_mm, bolt.dh_mm);
        let l_k = joint.clamp_length();
        let joint_type = joint.spec.joint_type;

        let l_eng = match joint_type {
            JointType::ThroughBolt => 0.4 * d,
            JointType::TappedThread => 0.33 * d,
        };
        let bolt_compliance = (0.4 * d / bolt.a1_mm2 + l_k / bolt.a3_mm2 + 0.4 * d / bolt.a1_mm2 + l_eng / bolt.a3_mm2)
            / joint.bolt_material.e_mpa;

        let d_avail = available_diameter(joint)?;
        let x = l_k / dh;
        let y = d_avail / dh;
        let (tan_phi, w) = match joint_type {
            JointType::ThroughBolt => (0.362 + 0.032 * (x / 2.0).ln() + 0.153 * y.ln(), 1.0),
            JointType::TappedThread => (1.295 - 0.246 * x.ln() + 0.94 * y.ln(), 2.0),
        };
        let d_lim = dh + w * l_k * tan_phi;

        let (x_c, substitution) = if d_avail > d_lim {
            diag.info(
                AnalysisStage::Stiffness,
                format!("Full compression cone: D_avail {:.2} > D_lim {:.2} mm", d_avail, d_lim),
            );
            let log_term = ((dh + d) * (d_lim - d)) / ((dh - d) * (d_lim + d));
            (
                2.0 * log_term.ln() / (w * PI * d * tan_phi),
                SubstitutionArea::EcssFullCone {
                    d_avail_mm: d_avail,
                    d_lim_mm: d_lim,
                    tan_phi,
                },
            )
        } else if dh > d_avail {
            diag.info(
                AnalysisStage::Stiffness,
                format!("Compression sleeve only: dh {:.2} > D_avail {:.2} mm", dh, d_avail),
            );
            (
                4.0 * l_k / (PI * (d_avail * d_avail - d * d)),
                SubstitutionArea::EcssSleeve {
                    d_avail_mm: d_avail,
                    d_lim_mm: d_lim,
                    tan_phi,
                },
            )
        } else {
            diag.info(
                AnalysisStage::Stiffness,
                format!(
                    "Partial compression cone and sleeve: dh {:.2} <= D_avail {:.2} <= D_lim {:.2} mm",
                    dh, d_avail, d_lim
                ),
            );
            let log_term = ((dh + d) * (d_avail - d)) / ((dh - d) * (d_avail + d));
            let cone = 2.0 / (w * d * tan_phi) * log_term.ln();
            let sleeve = 4.0 / (d_avail * d_avail - d * d) * (l_k - (d_avail - dh) / (w * tan_phi));
            (
                (cone + sleeve) / PI,
                SubstitutionArea::EcssConeAndSleeve {
                    d_avail_mm: d_avail,
                    d_lim_mm: d_lim,
                    tan_phi,
                },
            )
        };

        let a_sub = l_k / x_c;
        if !(a_sub.is_finite() && a_sub > 0.0) {
            return Err(BoltError::invalid_input(
                "substitution_diameter_mm",
                d_avail.to_string(),
                format!("Compression cone model gives no positive substitution area ({})", a_sub),
            ));
        }

        Ok(StiffnessResult::from_compliances(joint, a_sub, substitution, bolt_compliance))
    }

    fn compute_embedding(
        &self,
        joint: &ResolvedJoint<'_>,
        stiffness: &StiffnessResult,
        diag: &mut Diagnostics,
    ) -> BoltResult<EmbeddingResult> {
        let parts = joint.layer_count();
        // thread, head side(s) and every contact between clamped layers
        let interfaces = parts + 2;

        let table = match embedding_table(joint.spec.embedding) {
            Some(table) => table,
            None => return Ok(EmbeddingResult::DeferredFivePercent { interfaces }),
        };

        let depth = match joint.spec.joint_type {
            JointType::ThroughBolt => table.thread + 2.0 * table.head + (parts as f64 - 1.0) * table.inner,
            JointType::TappedThread => table.thread + table.head + parts as f64 * table.inner,
        };
        let depth = Micrometers(depth);
        let depth_mm: Millimeters = depth.into();
        let preload_n = -depth_mm.value() / stiffness.total_compliance();

        diag.info(
            AnalysisStage::Embedding,
            format!(
                "Rz {} over {} clamped layers: f_Z = {:.1} µm",
                joint.spec.embedding,
                parts,
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
            GapModel::LimitCorrected,
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
    use crate::joint::{BoltLoadCase, ClampedPart, PrevailingTorque, Shim, TighteningTorque, TorqueScatter};
    use crate::results::Margin;

    #[test]
    fn test_full_cone_for_wide_flange() {
        let catalog = Catalog::builtin().unwrap();
        let spec = m8_joint(AnalysisMethod::Ecss);
        let mut diag = Diagnostics::new();
        let joint = ResolvedJoint::resolve(&spec, catalog, &mut diag).unwrap();
        let stiffness = EcssAnalysis.compute_stiffness(&joint, &mut diag).unwrap();

        let (x, y) = (20.0_f64 / 13.0, 24.0_f64 / 13.0);
        let tan_phi = 0.362 + 0.032 * (x / 2.0).ln() + 0.153 * y.ln();
        let d_lim = 13.0 + 20.0 * tan_phi;
        match stiffness.substitution {
            SubstitutionArea::EcssFullCone {
                d_avail_mm,
                d_lim_mm,
                tan_phi: t,
            } => {
                assert_eq!(d_avail_mm, 24.0);
                assert!((d_lim_mm - d_lim).abs() < 1e-9);
                assert!((t - tan_phi).abs() < 1e-12);
            }
            other => panic!("unexpected substitution case {:?}", other),
        }
        let log_term = (21.0 * (d_lim - 8.0)) / (5.0 * (d_lim + 8.0));
        let expected = 20.0 / (2.0 * log_term.ln() / (PI * 8.0 * tan_phi));
        assert!((stiffness.substitution_area_mm2 - expected).abs() < 1e-6);
    }

    #[test]
    fn test_sleeve_and_partial_cone_cases() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::Ecss);
        spec.substitution_diameter_mm = Some(12.0);
        let analysis = analyze(&spec, catalog).unwrap();
        assert!(matches!(analysis.results.substitution, SubstitutionArea::EcssSleeve { .. }));
        let expected = PI * (144.0 - 64.0) / 4.0;
        assert!((analysis.results.substitution_area_mm2 - expected).abs() < 1e-9);

        spec.substitution_diameter_mm = Some(16.0);
        let analysis = analyze(&spec, catalog).unwrap();
        assert!(matches!(
            analysis.results.substitution,
            SubstitutionArea::EcssConeAndSleeve { .. }
        ));
    }

    #[test]
    fn test_missing_available_diameter() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::Ecss);
        spec.edge_distance_mm = None;
        let err = analyze(&spec, catalog).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_table_embedding_through_bolt_with_shim() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::Ecss);
        spec.embedding = EmbeddingRoughness::From10To40;
        spec.shim = Some(Shim {
            material: "CRES-15-5PH".to_string(),
            washer: "W_M8".to_string(),
        });
        let results = analyze(&spec, catalog).unwrap().results;

        // three layers: 3 + 2·4.5 + 2·2.5
        assert!((results.embedding_depth_um - 17.0).abs() < 1e-12);
        assert_eq!(results.embedding_interfaces, 5);
        let expected = -0.017 / (results.bolt_compliance_mm_per_n + results.clamped_compliance_mm_per_n);
        assert!((results.embedding_preload_n - expected).abs() < 1e-6);
    }

    #[test]
    fn test_table_embedding_tapped_thread() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::Ecss);
        spec.joint_type = JointType::TappedThread;
        spec.embedding = EmbeddingRoughness::From40To160;
        let results = analyze(&spec, catalog).unwrap().results;

        // 3 + 6.5 + 2·3.5
        assert!((results.embedding_depth_um - 16.5).abs() < 1e-12);
    }

    #[test]
    fn test_five_percent_embedding() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::Ecss);
        spec.embedding = EmbeddingRoughness::FivePercent;
        let results = analyze(&spec, catalog).unwrap().results;

        assert!(results.embedding_five_percent);
        assert!((results.embedding_preload_n + 0.05 * results.assembly_preload_n.max).abs() < 1e-9);
        assert!(
            (results.service_preload_n.min - results.assembly_preload_n.min - results.embedding_preload_n).abs() < 1e-9
        );
    }

    /// M10 bolt tightened to 21 ± 2.65 Nm with a prevailing torque of
    /// 0.41..1.5 Nm (ECSS-E-HB-32-23A worked example 7.14)
    #[test]
    fn test_preload_bracket_of_worked_example() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::Ecss);
        spec.bolt = "S_M10".to_string();
        spec.through_hole_mm = 10.5;
        spec.friction.mu_head_max = 0.22;
        spec.friction.mu_thread_max = 0.24;
        spec.friction.mu_head_min = 0.16;
        spec.friction.mu_thread_min = 0.12;
        spec.torque = TighteningTorque {
            nominal_nm: 21.0,
            scatter: TorqueScatter::Absolute(2.65),
        };
        spec.locking = Some(PrevailingTorque { min_nm: 0.41, max_nm: 1.5 });
        spec.edge_distance_mm = Some(15.0);
        let results = analyze(&spec, catalog).unwrap().results;

        assert!((results.assembly_preload_n.min - 5717.85).abs() < 0.01);
        assert!((results.assembly_preload_n.max - 12078.55).abs() < 0.01);
        assert!((results.tightening_factor - 2.11).abs() < 0.005);
    }

    #[test]
    fn test_compressive_load_never_gaps() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::Ecss);
        spec.load_cases = vec![BoltLoadCase::new("LC-C", -3000.0, 200.0, 0.0)];
        let results = analyze(&spec, catalog).unwrap().results;
        assert_eq!(results.load_cases[0].mos_gap, Margin::UNBOUNDED);
    }

    #[test]
    fn test_gapping_flag_and_corrected_yield() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::Ecss);
        spec.load_cases = vec![
            BoltLoadCase::new("LC-low", 1000.0, 0.0, 0.0),
            BoltLoadCase::new("LC-high", 40000.0, 0.0, 0.0),
        ];
        let results = analyze(&spec, catalog).unwrap().results;

        let low = results.load_case("LC-low").unwrap();
        let high = results.load_case("LC-high").unwrap();
        assert!(!low.gapping);
        assert!(high.gapping);

        let limit = high.gap_limit_n.unwrap();
        let phi_n = results.force_ratio_n;
        let corrected = phi_n * limit.max + (40000.0 - limit.max);
        assert!((high.effective_bolt_force_n - corrected).abs() < 1e-6);

        let sig_y = 660.0;
        let tension = (results.service_preload_n.max + corrected * 1.1) / 36.6;
        let shear = 3.0 * (0.5 * results.torsion_stress_mpa.max).powi(2);
        let expected = Margin::from_raw(sig_y / (tension * tension + shear).sqrt() - 1.0);
        assert!((high.mos_yield.value() - expected.value()).abs() < 1e-9);
    }

    #[test]
    fn test_two_parts_ecss_layers() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::Ecss);
        spec.clamped_parts.push(ClampedPart::new("AL7075-T7351", 5.0));
        let results = analyze(&spec, catalog).unwrap().results;
        // 3 + 2·3 + 2·2
        assert!((results.embedding_depth_um - 13.0).abs() < 1e-12);
    }

    #[test]
    fn test_countersunk_head_preload_and_torsion() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::Ecss);
        spec.bolt = "CS_M6".to_string();
        spec.through_hole_mm = 6.4;
        spec.torque = TighteningTorque {
            nominal_nm: 8.0,
            scatter: TorqueScatter::Percent(10.0),
        };
        let joint = ResolvedJoint::resolve(&spec, catalog, &mut Diagnostics::new()).unwrap();

        // head term μ·D_Km/(2·sin 45°), D_Km = 9.2 mm
        assert!((joint_coefficient(&joint, 0.2, 0.2) - 2.07800).abs() < 1e-5);
        assert!((joint_coefficient(&joint, 0.1, 0.1) - 1.11858).abs() < 1e-5);

        let r = analyze(&spec, catalog).unwrap().results;
        assert!((r.assembly_preload_n.min - 3464.88).abs() < 0.01);
        assert!((r.assembly_preload_n.max - 7867.15).abs() < 0.01);
        assert!((r.torsion_stress_mpa.min - 105.895).abs() < 1e-3);
        assert!((r.torsion_stress_mpa.max - 144.847).abs() < 1e-3);
    }
}
