//! # Analysis Results
//!
//! Output records of a joint analysis: the global preload, stiffness and
//! stress values of the joint plus one margin record per load case.
//!
//! Two small value types are used throughout:
//!
//! - [`Bracket`]: a `[min, max]` pair (preload scatter, torque scatter, ...)
//! - [`Margin`]: a margin of safety, normalized so that any margin of 1000 %
//!   or more (in either direction) is reported as unbounded
//!
//! ## JSON Example (per load case)
//!
//! ```json
//! {
//!   "id": "LC-1",
//!   "axial_force_n": 1150.0,
//!   "shear_force_n": 575.0,
//!   "bolt_additional_force_n": 172.4,
//!   "plate_relief_force_n": 977.6,
//!   "effective_bolt_force_n": 172.4,
//!   "gap_limit_n": null,
//!   "mos_slip": 0.54,
//!   "mos_gap": 3.92,
//!   "mos_yield": 0.12,
//!   "mos_ultimate": 0.31,
//!   "mos_bearing": "+inf",
//!   "gapping": false
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::joint::{AnalysisMethod, JointType};

/// Margins at or beyond ±1000 % are reported as ±∞
pub const MARGIN_LIMIT: f64 = 10.0;

// ============================================================================
// Bracket
// ============================================================================

/// A `[min, max]` pair of values.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bracket {
    pub min: f64,
    pub max: f64,
}

impl Bracket {
    pub fn new(min: f64, max: f64) -> Self {
        Bracket { min, max }
    }

    /// Same value on both sides
    pub fn uniform(value: f64) -> Self {
        Bracket { min: value, max: value }
    }

    pub fn mean(&self) -> f64 {
        (self.min + self.max) / 2.0
    }

    /// Apply `f` to both sides
    pub fn map(self, f: impl Fn(f64) -> f64) -> Self {
        Bracket {
            min: f(self.min),
            max: f(self.max),
        }
    }
}

impl fmt::Display for Bracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.2}, {:.2}]", self.min, self.max)
    }
}

// ============================================================================
// Margin
// ============================================================================

/// Margin of safety (dimensionless, 0.25 = 25 %).
///
/// Serializes as a JSON number when finite and as `"+inf"` / `"-inf"` when
/// unbounded.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "MarginRepr", into = "MarginRepr")]
pub struct Margin(f64);

impl Margin {
    pub const UNBOUNDED: Margin = Margin(f64::INFINITY);

    /// Normalize a raw margin: `m ≥ 10` becomes +∞, `m ≤ −10` becomes −∞.
    pub fn from_raw(raw: f64) -> Self {
        if raw >= MARGIN_LIMIT {
            Margin(f64::INFINITY)
        } else if raw <= -MARGIN_LIMIT {
            Margin(f64::NEG_INFINITY)
        } else {
            Margin(raw)
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn percent(self) -> f64 {
        self.0 * 100.0
    }

    pub fn is_unbounded(self) -> bool {
        self.0.is_infinite()
    }

    /// Non-negative margin
    pub fn passes(self) -> bool {
        self.0 >= 0.0
    }

    /// Smaller of two margins
    pub fn min(self, other: Margin) -> Margin {
        if other.0 < self.0 {
            other
        } else {
            self
        }
    }
}

impl fmt::Display for Margin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == f64::INFINITY {
            write!(f, "+inf")
        } else if self.0 == f64::NEG_INFINITY {
            write!(f, "-inf")
        } else {
            write!(f, "{:.1}%", self.percent())
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum MarginRepr {
    Value(f64),
    Text(String),
}

impl From<Margin> for MarginRepr {
    fn from(m: Margin) -> Self {
        if m.0 == f64::INFINITY {
            MarginRepr::Text("+inf".to_string())
        } else if m.0 == f64::NEG_INFINITY {
            MarginRepr::Text("-inf".to_string())
        } else {
            MarginRepr::Value(m.0)
        }
    }
}

impl TryFrom<MarginRepr> for Margin {
    type Error = String;

    fn try_from(repr: MarginRepr) -> Result<Self, Self::Error> {
        match repr {
            MarginRepr::Value(v) => Ok(Margin::from_raw(v)),
            MarginRepr::Text(s) => match s.as_str() {
                "+inf" | "inf" => Ok(Margin(f64::INFINITY)),
                "-inf" => Ok(Margin(f64::NEG_INFINITY)),
                other => Err(format!("invalid margin value '{}'", other)),
            },
        }
    }
}

// ============================================================================
// Stage detail records
// ============================================================================

/// How the substitution area of the clamped parts was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "case", rename_all = "snake_case")]
pub enum SubstitutionArea {
    /// ESA case (i): l_K/d below 1, head bearing annulus only
    EsaBearingOnly,
    /// ESA case (ii): 1 ≤ l_K/d ≤ 2, with outer diameter D_A
    EsaShortCone { d_a_mm: f64, rule_of_thumb: bool },
    /// ESA case (iii): l_K/d > 2
    EsaLongCone,
    /// ECSS: the full compression cone fits in the available diameter
    EcssFullCone { d_avail_mm: f64, d_lim_mm: f64, tan_phi: f64 },
    /// ECSS: available diameter smaller than the head, sleeve only
    EcssSleeve { d_avail_mm: f64, d_lim_mm: f64, tan_phi: f64 },
    /// ECSS: truncated cone followed by a sleeve
    EcssConeAndSleeve { d_avail_mm: f64, d_lim_mm: f64, tan_phi: f64 },
}

/// A quantity at room and at service temperature
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperaturePair {
    pub room: f64,
    pub service: f64,
}

/// Effective moduli and expansion coefficients used by the VDI thermal model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThermalProperties {
    /// Bolt Young's modulus (MPa)
    pub bolt_modulus_mpa: TemperaturePair,
    /// Effective clamped-stack modulus (MPa)
    pub stack_modulus_mpa: TemperaturePair,
    /// Bolt CTE (1/K)
    pub bolt_alpha_per_k: TemperaturePair,
    /// Thickness-weighted clamped-stack CTE (1/K)
    pub stack_alpha_per_k: TemperaturePair,
}

// ============================================================================
// Per-load-case results
// ============================================================================

/// Margins of one bolt load case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadCaseResult {
    /// Load case identifier
    pub id: String,
    /// FA: axial force including the fitting factor (N)
    pub axial_force_n: f64,
    /// FQ: resultant shear force including the fitting factor (N)
    pub shear_force_n: f64,
    /// FSA: additional bolt force, FA·Φn (N)
    pub bolt_additional_force_n: f64,
    /// FPA: clamped-part relief force, FA·(1 − Φn) (N)
    pub plate_relief_force_n: f64,
    /// Additional bolt force used for the strength margins (N)
    pub effective_bolt_force_n: f64,
    /// ECSS gapping limit of the axial force at [F_V_min, F_V_max] (N)
    pub gap_limit_n: Option<Bracket>,
    pub mos_slip: Margin,
    pub mos_gap: Margin,
    pub mos_yield: Margin,
    pub mos_ultimate: Margin,
    pub mos_bearing: Margin,
    /// The axial force exceeds the gapping limit at maximum service preload
    pub gapping: bool,
}

/// Lowest margin of each kind over all load cases.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginSummary {
    pub mos_slip: Margin,
    pub mos_gap: Margin,
    pub mos_yield: Margin,
    pub mos_ultimate: Margin,
    pub mos_bearing: Margin,
}

impl MarginSummary {
    pub fn from_cases(cases: &[LoadCaseResult]) -> Self {
        let start = MarginSummary {
            mos_slip: Margin::UNBOUNDED,
            mos_gap: Margin::UNBOUNDED,
            mos_yield: Margin::UNBOUNDED,
            mos_ultimate: Margin::UNBOUNDED,
            mos_bearing: Margin::UNBOUNDED,
        };
        cases.iter().fold(start, |acc, lc| MarginSummary {
            mos_slip: acc.mos_slip.min(lc.mos_slip),
            mos_gap: acc.mos_gap.min(lc.mos_gap),
            mos_yield: acc.mos_yield.min(lc.mos_yield),
            mos_ultimate: acc.mos_ultimate.min(lc.mos_ultimate),
            mos_bearing: acc.mos_bearing.min(lc.mos_bearing),
        })
    }

    fn all(&self) -> [(&'static str, Margin); 5] {
        [
            ("slip", self.mos_slip),
            ("gapping", self.mos_gap),
            ("yield", self.mos_yield),
            ("ultimate", self.mos_ultimate),
            ("bearing", self.mos_bearing),
        ]
    }
}

// ============================================================================
// Joint results
// ============================================================================

/// Complete result of one joint analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointResults {
    /// Joint label
    pub label: String,
    pub method: AnalysisMethod,
    pub joint_type: JointType,

    /// l_K: clamped length including the shim (mm)
    pub clamp_length_mm: f64,
    /// A_sub: substitution area of the clamped parts (mm²)
    pub substitution_area_mm2: f64,
    /// How A_sub was obtained
    pub substitution: SubstitutionArea,
    /// δ_b: bolt compliance (mm/N)
    pub bolt_compliance_mm_per_n: f64,
    /// δ_c: clamped-part compliance (mm/N)
    pub clamped_compliance_mm_per_n: f64,
    /// Φ: force ratio
    pub force_ratio: f64,
    /// Φn: force ratio including the loading-plane factor
    pub force_ratio_n: f64,

    /// Number of interfaces considered for embedding
    pub embedding_interfaces: usize,
    /// f_Z: embedding depth (µm)
    pub embedding_depth_um: f64,
    /// F_Z: preload change due to embedding (N, negative = loss)
    pub embedding_preload_n: f64,
    /// Embedding taken as 5 % of the maximum assembly preload
    pub embedding_five_percent: bool,

    /// M_p: prevailing torque range (Nm)
    pub prevailing_torque_nm: Bracket,
    /// Tightening torque range after scatter (Nm)
    pub tightening_torque_nm: Bracket,
    /// K: joint coefficient at [max friction, min friction] (mm)
    pub joint_coefficient_mm: Bracket,

    /// F_M: assembly preload (N)
    pub assembly_preload_n: Bracket,
    /// α_A: tightening factor F_M_max / F_M_min
    pub tightening_factor: f64,
    /// ΔF_th: thermal preload change (N)
    pub thermal_preload_n: Bracket,
    /// Temperature-dependent properties (VDI thermal model only)
    pub thermal_properties: Option<ThermalProperties>,
    /// F_V: service preload (N)
    pub service_preload_n: Bracket,

    /// τ: torsional stress from tightening (MPa)
    pub torsion_stress_mpa: Bracket,
    /// σ_n: axial stress from assembly preload (MPa)
    pub axial_stress_mpa: Bracket,
    /// σ_v: von Mises equivalent stress (MPa)
    pub von_mises_stress_mpa: Bracket,
    /// ν: yield utilization σ_v / σ_y
    pub utilization: Bracket,

    /// Bearing pressure margin under the head at F_M_max
    pub mos_pressure: Margin,
    /// Global slippage margin over all load cases
    pub mos_global_slip: Margin,

    /// One record per load case, in input order
    pub load_cases: Vec<LoadCaseResult>,
    /// Lowest margins over all load cases
    pub summary: MarginSummary,
}

impl JointResults {
    /// Result of a load case by id
    pub fn load_case(&self, id: &str) -> Option<&LoadCaseResult> {
        self.load_cases.iter().find(|lc| lc.id == id)
    }

    /// True if every margin is non-negative
    pub fn passes(&self) -> bool {
        self.governing_margin().1.passes()
    }

    /// The lowest margin and its name.
    pub fn governing_margin(&self) -> (&'static str, Margin) {
        let mut governing = ("pressure", self.mos_pressure);
        for candidate in self.summary.all() {
            if candidate.1 < governing.1 {
                governing = candidate;
            }
        }
        if self.mos_global_slip < governing.1 {
            governing = ("global slip", self.mos_global_slip);
        }
        governing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margin_clamp_boundaries() {
        assert_eq!(Margin::from_raw(10.0).value(), f64::INFINITY);
        assert_eq!(Margin::from_raw(-10.0).value(), f64::NEG_INFINITY);
        assert_eq!(Margin::from_raw(9.99999).value(), 9.99999);
        assert_eq!(Margin::from_raw(-9.99999).value(), -9.99999);
        assert_eq!(Margin::from_raw(0.35).value(), 0.35);
    }

    #[test]
    fn test_margin_serialization() {
        let json = serde_json::to_string(&Margin::from_raw(25.0)).unwrap();
        assert_eq!(json, "\"+inf\"");
        let json = serde_json::to_string(&Margin::from_raw(-12.0)).unwrap();
        assert_eq!(json, "\"-inf\"");
        let json = serde_json::to_string(&Margin::from_raw(0.5)).unwrap();
        assert_eq!(json, "0.5");

        let back: Margin = serde_json::from_str("\"+inf\"").unwrap();
        assert!(back.is_unbounded());
        let back: Margin = serde_json::from_str("0.25").unwrap();
        assert_eq!(back.value(), 0.25);
        assert!(serde_json::from_str::<Margin>("\"lots\"").is_err());
    }

    #[test]
    fn test_numeric_margin_clamped_on_read() {
        let back: Margin = serde_json::from_str("12.5").unwrap();
        assert_eq!(back, Margin::UNBOUNDED);
        let back: Margin = serde_json::from_str("-10.0").unwrap();
        assert_eq!(back.value(), f64::NEG_INFINITY);
        let back: Margin = serde_json::from_str("9.5").unwrap();
        assert_eq!(back.value(), 9.5);
    }

    #[test]
    fn test_margin_display() {
        assert_eq!(Margin::from_raw(0.123).to_string(), "12.3%");
        assert_eq!(Margin::UNBOUNDED.to_string(), "+inf");
    }

    #[test]
    fn test_bracket_helpers() {
        let b = Bracket::new(2.0, 4.0);
        assert_eq!(b.mean(), 3.0);
        assert_eq!(b.map(|v| v * 10.0), Bracket::new(20.0, 40.0));
        assert_eq!(Bracket::uniform(1.5).min, 1.5);
    }
}
