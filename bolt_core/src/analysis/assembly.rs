//! Results assembly shared by both standards.
//!
//! The standards agree on the shape of the RESULTS stage and differ in three
//! places, which the strategies pass in:
//!
//! - the joint coefficient `K(μ_head, μ_thread)`
//! - how the embedding loss is settled (the ECSS 5 % rule needs `F_M`)
//! - the gapping treatment of the additional bolt force ([`GapModel`])

use crate::analysis::bearing::bearing_margin;
use crate::analysis::{Embedding, EmbeddingResult, ResolvedJoint, StiffnessResult, ThermalResult};
use crate::diagnostics::{AnalysisStage, Diagnostics};
use crate::joint::BoltLoadCase;
use crate::results::{Bracket, JointResults, LoadCaseResult, Margin, MarginSummary};
use crate::units::{Micrometers, Millimeters, NewtonMeters, NewtonMillimeters};

/// Tightening values: torque range, joint coefficients and assembly preload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tightening {
    /// M_p (Nm)
    pub prevailing_torque_nm: Bracket,
    /// [T_min, T_max] (Nm)
    pub torque_nm: Bracket,
    /// [K_max, K_min]: K at maximum friction on the `min` side (mm)
    pub coefficient_mm: Bracket,
    /// F_M (N)
    pub assembly_preload_n: Bracket,
    /// α_A
    pub tightening_factor: f64,
}

/// Torque-to-preload conversion.
///
/// `coefficient` gives K in mm for a (head, thread) friction pair; the
/// minimum preload comes from the lowest net torque at the highest friction.
pub fn tighten(joint: &ResolvedJoint<'_>, coefficient: impl Fn(f64, f64) -> f64) -> Tightening {
    let friction = &joint.spec.friction;
    let prevailing = joint.spec.prevailing_torque();
    let torque = joint.spec.torque.range();

    let k_max = coefficient(friction.mu_head_max, friction.mu_thread_max);
    let k_min = coefficient(friction.mu_head_min, friction.mu_thread_min);

    let net_min: NewtonMillimeters = NewtonMeters(torque.min - prevailing.max).into();
    let net_max: NewtonMillimeters = NewtonMeters(torque.max - prevailing.min).into();
    let preload = Bracket::new(net_min.value() / k_max, net_max.value() / k_min);

    Tightening {
        prevailing_torque_nm: prevailing,
        torque_nm: torque,
        coefficient_mm: Bracket::new(k_max, k_min),
        assembly_preload_n: preload,
        tightening_factor: preload.max / preload.min,
    }
}

/// Settle the embedding stage output against the assembly preload.
///
/// A deferred 5 % embedding becomes `F_Z = −0.05·F_M_max` with the matching
/// depth `f_Z = −F_Z·(δ_b + δ_c)`.
pub fn settle_embedding(
    embedding: EmbeddingResult,
    stiffness: &StiffnessResult,
    assembly_preload: Bracket,
    diag: &mut Diagnostics,
) -> Embedding {
    match embedding {
        EmbeddingResult::Settled(embedding) => embedding,
        EmbeddingResult::DeferredFivePercent { interfaces } => {
            let preload_n = -0.05 * assembly_preload.max;
            let depth: Micrometers = Millimeters(-preload_n * stiffness.total_compliance()).into();
            diag.info(
                AnalysisStage::Embedding,
                format!("5% embedding used: F_Z = {:.1} N", preload_n),
            );
            Embedding {
                interfaces,
                depth_um: depth.value(),
                preload_n,
                five_percent: true,
            }
        }
    }
}

/// Tightening stresses in the bolt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoltStresses {
    pub torsion_mpa: Bracket,
    pub axial_mpa: Bracket,
    pub von_mises_mpa: Bracket,
    pub utilization: Bracket,
}

/// Torsion from the thread torque (tool torque minus head friction torque),
/// axial stress from F_M, von Mises combination and yield utilization.
pub fn bolt_stresses(joint: &ResolvedJoint<'_>, tightening: &Tightening) -> BoltStresses {
    let bolt = joint.bolt;
    let friction = &joint.spec.friction;
    let arm = joint.head_friction_radius();
    let preload = tightening.assembly_preload_n;
    let t_min: NewtonMillimeters = NewtonMeters(tightening.torque_nm.min).into();
    let t_max: NewtonMillimeters = NewtonMeters(tightening.torque_nm.max).into();

    let thread_torque = Bracket::new(
        t_min.value() - preload.min * friction.mu_head_max * arm,
        t_max.value() - preload.max * friction.mu_head_min * arm,
    );
    let w_p = bolt.polar_section_modulus();
    let torsion = thread_torque.map(|m| m / w_p);
    let axial = preload.map(|f| f / bolt.as_mm2);
    let von_mises = Bracket::new(
        (axial.min.powi(2) + 3.0 * torsion.min.powi(2)).sqrt(),
        (axial.max.powi(2) + 3.0 * torsion.max.powi(2)).sqrt(),
    );
    let sig_y = joint.bolt_material.sig_y_mpa;

    BoltStresses {
        torsion_mpa: torsion,
        axial_mpa: axial,
        von_mises_mpa: von_mises,
        utilization: von_mises.map(|s| s / sig_y),
    }
}

/// Treatment of the additional bolt force near separation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapModel {
    /// FSA = Φn·FA throughout; gapping margin from the raw formula
    Linear,
    /// Above the gapping limit the full excess axial force goes into the
    /// bolt; FA ≤ 0 gives an unbounded gapping margin
    LimitCorrected,
}

/// Margins of one load case.
pub fn load_case_margins(
    joint: &ResolvedJoint<'_>,
    stiffness: &StiffnessResult,
    service_preload: Bracket,
    torsion_max_mpa: f64,
    case: &BoltLoadCase,
    gap_model: GapModel,
) -> LoadCaseResult {
    let spec = joint.spec;
    let fos = &spec.safety_factors;
    let phi_n = stiffness.force_ratio_n;

    let fa = case.axial_n * fos.fos_fit;
    let fq = ((case.shear1_n * fos.fos_fit).powi(2) + (case.shear2_n * fos.fos_fit).powi(2)).sqrt();
    let fpa = fa * (1.0 - phi_n);
    let fsa = fa * phi_n;
    let fk_req = fq / (spec.shear_planes as f64 * spec.mu_clamp);

    let (gap_limit, fsa_eff, gapping) = match gap_model {
        GapModel::Linear => (None, fsa, false),
        GapModel::LimitCorrected => {
            let limit = service_preload.map(|f| f / (1.0 - phi_n));
            if fa > limit.max {
                (Some(limit), phi_n * limit.max + (fa - limit.max), true)
            } else {
                (Some(limit), fsa, false)
            }
        }
    };

    let mos_slip = if fk_req == 0.0 {
        f64::INFINITY
    } else {
        (spec.mos_convention.slip_preload(service_preload) - fpa) / (fk_req * fos.fos_slip) - 1.0
    };

    let mos_gap = if gap_model == GapModel::LimitCorrected && fa <= 0.0 {
        f64::INFINITY
    } else {
        service_preload.min / (fos.fos_gap * fpa) - 1.0
    };

    let strength = joint.strength_material();
    let tension = |fos_factor: f64| (service_preload.max + fsa_eff * fos_factor) / joint.bolt.as_mm2;
    let shear_term = 3.0 * (0.5 * torsion_max_mpa).powi(2);
    let mos_yield = strength.sig_y_mpa / (tension(fos.fos_y).powi(2) + shear_term).sqrt() - 1.0;
    let mos_ultimate = strength.sig_u_mpa / (tension(fos.fos_u).powi(2) + shear_term).sqrt() - 1.0;

    let mos_bearing = bearing_margin(joint, service_preload.max + fsa_eff * fos.fos_y, joint.service.is_some());

    LoadCaseResult {
        id: case.id.clone(),
        axial_force_n: fa,
        shear_force_n: fq,
        bolt_additional_force_n: fsa,
        plate_relief_force_n: fpa,
        effective_bolt_force_n: fsa_eff,
        gap_limit_n: gap_limit,
        mos_slip: Margin::from_raw(mos_slip),
        mos_gap: Margin::from_raw(mos_gap),
        mos_yield: Margin::from_raw(mos_yield),
        mos_ultimate: Margin::from_raw(mos_ultimate),
        mos_bearing: Margin::from_raw(mos_bearing),
        gapping,
    }
}

/// Slippage margin of the whole bolt group: every load case is treated as
/// one bolt carrying the mean service preload.
pub fn global_slip_margin(joint: &ResolvedJoint<'_>, service_preload: Bracket, cases: &[LoadCaseResult]) -> Margin {
    let spec = joint.spec;
    let sum_fq: f64 = cases.iter().map(|c| c.shear_force_n).sum();
    if sum_fq == 0.0 {
        return Margin::UNBOUNDED;
    }
    let sum_fpa: f64 = cases.iter().map(|c| c.plate_relief_force_n).sum();
    let sum_preload = cases.len() as f64 * service_preload.mean();
    let raw = (sum_preload - sum_fpa) * spec.mu_clamp * spec.shear_planes as f64
        / (sum_fq * spec.safety_factors.fos_slip)
        - 1.0;
    Margin::from_raw(raw)
}

/// Everything downstream of the assembly preload: service preload, stresses
/// and margins.
pub fn assemble(
    joint: &ResolvedJoint<'_>,
    stiffness: StiffnessResult,
    embedding: Embedding,
    thermal: &ThermalResult,
    tightening: Tightening,
    gap_model: GapModel,
    diag: &mut Diagnostics,
) -> JointResults {
    let preload = tightening.assembly_preload_n;
    let thermal_change = thermal.preload_change(preload);
    // embedding only lowers the minimum side
    let service_preload = Bracket::new(
        preload.min + embedding.preload_n + thermal_change.min,
        preload.max + thermal_change.max,
    );
    if service_preload.min <= 0.0 {
        diag.warn(
            AnalysisStage::Results,
            format!("Minimum service preload {:.1} N is not positive", service_preload.min),
        );
    }

    let stresses = bolt_stresses(joint, &tightening);
    if joint.service.is_some() {
        diag.info(
            AnalysisStage::Results,
            "Strength and bearing margins use service-temperature materials",
        );
    }

    let load_cases: Vec<LoadCaseResult> = joint
        .spec
        .load_cases
        .iter()
        .map(|case| {
            load_case_margins(joint, &stiffness, service_preload, stresses.torsion_mpa.max, case, gap_model)
        })
        .collect();

    for case in load_cases.iter().filter(|c| c.gapping) {
        diag.warn(
            AnalysisStage::Results,
            format!(
                "{}: axial force {:.1} N exceeds the gapping limit; excess carried by the bolt",
                case.id, case.axial_force_n
            ),
        );
    }

    let mos_global_slip = global_slip_margin(joint, service_preload, &load_cases);
    let summary = MarginSummary::from_cases(&load_cases);

    JointResults {
        label: joint.spec.label.clone(),
        method: joint.spec.method,
        joint_type: joint.spec.joint_type,
        clamp_length_mm: stiffness.clamp_length_mm,
        substitution_area_mm2: stiffness.substitution_area_mm2,
        substitution: stiffness.substitution,
        bolt_compliance_mm_per_n: stiffness.bolt_compliance,
        clamped_compliance_mm_per_n: stiffness.clamped_compliance,
        force_ratio: stiffness.force_ratio,
        force_ratio_n: stiffness.force_ratio_n,
        embedding_interfaces: embedding.interfaces,
        embedding_depth_um: embedding.depth_um,
        embedding_preload_n: embedding.preload_n,
        embedding_five_percent: embedding.five_percent,
        prevailing_torque_nm: tightening.prevailing_torque_nm,
        tightening_torque_nm: tightening.torque_nm,
        joint_coefficient_mm: tightening.coefficient_mm,
        assembly_preload_n: preload,
        tightening_factor: tightening.tightening_factor,
        thermal_preload_n: thermal_change,
        thermal_properties: thermal.properties,
        service_preload_n: service_preload,
        torsion_stress_mpa: stresses.torsion_mpa,
        axial_stress_mpa: stresses.axial_mpa,
        von_mises_stress_mpa: stresses.von_mises_mpa,
        utilization: stresses.utilization,
        mos_pressure: Margin::from_raw(bearing_margin(joint, preload.max, false)),
        mos_global_slip,
        load_cases,
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::m8_joint;
    use crate::analysis::{EsaPssAnalysis, JointAnalysisStrategy};
    use crate::catalog::Catalog;
    use crate::joint::{AnalysisMethod, MosConvention, PrevailingTorque};

    fn flat_k(_mu_head: f64, _mu_thread: f64) -> f64 {
        2.0
    }

    #[test]
    fn test_tighten_uses_prevailing_torque_crosswise() {
        let catalog = Catalog::builtin().unwrap();
        let mut spec = m8_joint(AnalysisMethod::EsaPss);
        spec.locking = Some(PrevailingTorque { min_nm: 0.5, max_nm: 1.5 });
        let joint = ResolvedJoint::resolve(&spec, catalog, &mut Diagnostics::new()).unwrap();

        let t = tighten(&joint, flat_k);
        // T = 18 ± 1.8 Nm
        assert!((t.assembly_preload_n.min - (16.2 - 1.5) * 1000.0 / 2.0).abs() < 1e-9);
        assert!((t.assembly_preload_n.max - (19.8 - 0.5) * 1000.0 / 2.0).abs() < 1e-9);
        assert!(t.tightening_factor > 1.0);
    }

    fn margins_for(spec: &crate::joint::JointSpec, case: &BoltLoadCase, gap_model: GapModel) -> LoadCaseResult {
        let catalog = Catalog::builtin().unwrap();
        let mut diag = Diagnostics::new();
        let joint = ResolvedJoint::resolve(spec, catalog, &mut diag).unwrap();
        let stiffness = EsaPssAnalysis.compute_stiffness(&joint, &mut diag).unwrap();
        load_case_margins(&joint, &stiffness, Bracket::new(4000.0, 8000.0), 100.0, case, gap_model)
    }

    #[test]
    fn test_deferred_embedding_is_five_percent_of_max_preload() {
        let catalog = Catalog::builtin().unwrap();
        let spec = m8_joint(AnalysisMethod::Ecss);
        let mut diag = Diagnostics::new();
        let joint = ResolvedJoint::resolve(&spec, catalog, &mut diag).unwrap();
        let stiffness = EsaPssAnalysis.compute_stiffness(&joint, &mut diag).unwrap();

        let embedding = settle_embedding(
            EmbeddingResult::DeferredFivePercent { interfaces: 4 },
            &stiffness,
            Bracket::new(6000.0, 10000.0),
            &mut diag,
        );
        assert!((embedding.preload_n + 500.0).abs() < 1e-9);
        assert!((embedding.depth_um - 500.0 * stiffness.total_compliance() * 1000.0).abs() < 1e-9);
        assert!(embedding.five_percent);
        assert_eq!(embedding.interfaces, 4);
    }

    #[test]
    fn test_zero_shear_gives_unbounded_slip() {
        let spec = m8_joint(AnalysisMethod::EsaPss);
        let lc = margins_for(&spec, &BoltLoadCase::new("LC", 1000.0, 0.0, 0.0), GapModel::Linear);
        assert_eq!(lc.mos_slip, Margin::UNBOUNDED);
    }

    #[test]
    fn test_slip_convention() {
        let mut spec = m8_joint(AnalysisMethod::EsaPss);
        let case = BoltLoadCase::new("LC", 1000.0, 300.0, 400.0);
        let min = margins_for(&spec, &case, GapModel::Linear);
        assert!((min.shear_force_n - 500.0).abs() < 1e-9);

        spec.mos_convention = MosConvention::Mean;
        let mean = margins_for(&spec, &case, GapModel::Linear);
        let fk_req = 500.0 / 0.2;
        let expected = (6000.0 - mean.plate_relief_force_n) / (fk_req * 1.1) - 1.0;
        assert!((mean.mos_slip.value() - expected).abs() < 1e-9);
        assert!(mean.mos_slip > min.mos_slip);
    }

    #[test]
    fn test_limit_corrected_gap_for_compression() {
        let spec = m8_joint(AnalysisMethod::Ecss);
        let lc = margins_for(&spec, &BoltLoadCase::new("LC", -500.0, 100.0, 0.0), GapModel::LimitCorrected);
        assert_eq!(lc.mos_gap, Margin::UNBOUNDED);
        assert!(!lc.gapping);
    }

    #[test]
    fn test_gapping_excess_goes_into_bolt() {
        let spec = m8_joint(AnalysisMethod::Ecss);
        let lc = margins_for(&spec, &BoltLoadCase::new("LC", 20000.0, 0.0, 0.0), GapModel::LimitCorrected);
        let limit = lc.gap_limit_n.unwrap();
        assert!(lc.gapping);
        assert!(20000.0 > limit.max);
        let phi_n = lc.bolt_additional_force_n / lc.axial_force_n;
        let expected = phi_n * limit.max + (20000.0 - limit.max);
        assert!((lc.effective_bolt_force_n - expected).abs() < 1e-6);
        assert!(lc.effective_bolt_force_n > lc.bolt_additional_force_n);
    }

    #[test]
    fn test_yield_margin_decreases_with_fos_y() {
        let mut spec = m8_joint(AnalysisMethod::EsaPss);
        let case = BoltLoadCase::new("LC", 2000.0, 0.0, 0.0);
        let low = margins_for(&spec, &case, GapModel::Linear);
        spec.safety_factors.fos_y = 1.5;
        let high = margins_for(&spec, &case, GapModel::Linear);
        assert!(low.effective_bolt_force_n > 0.0);
        assert!(high.mos_yield < low.mos_yield);
    }
}
