//! Thermal preload change.
//!
//! Two models:
//!
//! - **Standard**: constant material properties. The free length mismatch
//!   between clamped stack and bolt, `(α_c,eff − α_b)·l_K·ΔT`, is shared out
//!   over the series stiffness of bolt and stack. Both bracket sides get the
//!   same change.
//! - **VDI**: Young's moduli and expansion coefficients at service
//!   temperature. The change depends on the preload itself, so the model is
//!   prepared here and evaluated on `[F_M_min, F_M_max]` once the results
//!   stage knows the assembly preload.

use crate::analysis::{stack_compliance, ResolvedJoint, StiffnessResult};
use crate::diagnostics::{AnalysisStage, Diagnostics};
use crate::errors::{BoltError, BoltResult};
use crate::results::{Bracket, TemperaturePair, ThermalProperties};

/// Output of the THERMAL stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalResult {
    model: ThermalModel,
    /// Effective properties (VDI model only)
    pub properties: Option<ThermalProperties>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ThermalModel {
    /// ΔF independent of the preload (N)
    Standard { preload_change_n: f64 },
    /// ΔF(F) = −[F·(1 − δ/D) + l_K·(α_b,T − α_c,T)·ΔT/D]
    Vdi {
        total_compliance: f64,
        denominator: f64,
        mismatch_mm: f64,
    },
}

impl ThermalResult {
    /// ΔF_th for an assembly preload bracket (N)
    pub fn preload_change(&self, assembly_preload: Bracket) -> Bracket {
        match self.model {
            ThermalModel::Standard { preload_change_n } => Bracket::uniform(preload_change_n),
            ThermalModel::Vdi {
                total_compliance,
                denominator,
                mismatch_mm,
            } => assembly_preload
                .map(|f| -(f * (1.0 - total_compliance / denominator) + mismatch_mm / denominator)),
        }
    }

    pub fn is_vdi(&self) -> bool {
        matches!(self.model, ThermalModel::Vdi { .. })
    }
}

/// Thickness-weighted mean CTE of a stack over the clamp length
fn stack_alpha(layers: &[crate::analysis::Layer<'_>], clamp_length_mm: f64) -> f64 {
    layers
        .iter()
        .map(|l| l.material.alpha_per_k * l.thickness_mm)
        .sum::<f64>()
        / clamp_length_mm
}

/// Run the THERMAL stage.
pub fn compute(joint: &ResolvedJoint<'_>, stiffness: &StiffnessResult, diag: &mut Diagnostics) -> BoltResult<ThermalResult> {
    let delta_t = joint.spec.delta_t_k();
    let l_k = stiffness.clamp_length_mm;

    if !joint.spec.uses_vdi() {
        let alpha_stack = stack_alpha(&joint.stack, l_k);
        let c_b = 1.0 / stiffness.bolt_compliance;
        let c_c = 1.0 / stiffness.clamped_compliance;
        let mismatch_mm = (alpha_stack - joint.bolt_material.alpha_per_k) * l_k * delta_t;
        let preload_change_n = mismatch_mm * c_b * c_c / (c_b + c_c);
        if delta_t != 0.0 {
            diag.info(
                AnalysisStage::Thermal,
                format!("Standard thermal model: ΔT = {:.1} K, ΔF_th = {:.1} N", delta_t, preload_change_n),
            );
        }
        return Ok(ThermalResult {
            model: ThermalModel::Standard { preload_change_n },
            properties: None,
        });
    }

    let service = joint
        .service
        .as_ref()
        .ok_or_else(|| BoltError::missing_thermal_data("thermal.bolt_material"))?;

    let service_length: f64 = service.stack.iter().map(|l| l.thickness_mm).sum();
    if (service_length - l_k).abs() > 1e-9 {
        diag.warn(
            AnalysisStage::Thermal,
            format!(
                "Service-temperature stack is {:.3} mm thick but l_K is {:.3} mm; l_K is used",
                service_length, l_k
            ),
        );
    }

    let a_sub = stiffness.substitution_area_mm2;
    let service_compliance = stack_compliance(&service.stack, a_sub);

    let bolt_modulus = TemperaturePair {
        room: joint.bolt_material.e_mpa,
        service: service.bolt_material.e_mpa,
    };
    let stack_modulus = TemperaturePair {
        room: l_k / (stiffness.clamped_compliance * a_sub),
        service: l_k / (service_compliance * a_sub),
    };
    let bolt_alpha = TemperaturePair {
        room: joint.bolt_material.alpha_per_k,
        service: service.bolt_material.alpha_per_k,
    };
    let stack_alpha = TemperaturePair {
        room: stack_alpha(&joint.stack, l_k),
        service: stack_alpha(&service.stack, l_k),
    };

    let denominator = stiffness.bolt_compliance * bolt_modulus.room / bolt_modulus.service
        + stiffness.clamped_compliance * stack_modulus.room / stack_modulus.service;
    let mismatch_mm = l_k * (bolt_alpha.service - stack_alpha.service) * delta_t;

    diag.info(
        AnalysisStage::Thermal,
        format!(
            "VDI thermal model: ΔT = {:.1} K, E_bolt {:.0} -> {:.0} MPa, E_stack {:.0} -> {:.0} MPa",
            delta_t, bolt_modulus.room, bolt_modulus.service, stack_modulus.room, stack_modulus.service
        ),
    );

    Ok(ThermalResult {
        model: ThermalModel::Vdi {
            total_compliance: stiffness.total_compliance(),
            denominator,
            mismatch_mm,
        },
        properties: Some(ThermalProperties {
            bolt_modulus_mpa: bolt_modulus,
            stack_modulus_mpa: stack_modulus,
            bolt_alpha_per_k: bolt_alpha,
            stack_alpha_per_k: stack_alpha,
        }),
    })
}
