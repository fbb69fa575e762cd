//! # Joint Description
//!
//! `JointSpec` is the complete, validated description of one bolted joint
//! analysis job: which standard to apply, which bolt and materials, how it is
//! tightened, what it clamps and which loads it carries.
//!
//! String tags of the job file (method, joint type, margin convention,
//! embedding roughness) are closed enums here. Unknown values are rejected
//! when the job is parsed.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "label": "Bracket I/F",
//!   "method": "ESAPSS",
//!   "joint_type": "TBJ",
//!   "mos_convention": "min",
//!   "bolt": "S_M8",
//!   "bolt_material": "A286",
//!   "friction": {
//!     "mu_head_max": 0.2, "mu_thread_max": 0.2,
//!     "mu_head_min": 0.1, "mu_thread_min": 0.1
//!   },
//!   "mu_clamp": 0.2,
//!   "shear_planes": 1,
//!   "through_hole_mm": 8.4,
//!   "torque": { "nominal_nm": 18.0, "scatter": { "percent": 10.0 } },
//!   "locking": null,
//!   "loading_plane_factor": 0.5,
//!   "safety_factors": {
//!     "fos_y": 1.1, "fos_u": 1.25, "fos_slip": 1.1, "fos_gap": 1.0, "fos_fit": 1.15
//!   },
//!   "embedding": "<10",
//!   "clamped_parts": [
//!     { "material": "AL7075-T7351", "thickness_mm": 10.0 },
//!     { "material": "AL7075-T7351", "thickness_mm": 10.0 }
//!   ],
//!   "load_cases": [
//!     { "id": "LC-1", "axial_n": 1000.0, "shear1_n": 500.0 }
//!   ]
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{BoltError, BoltResult};
use crate::project::GlobalSettings;
use crate::results::Bracket;

// ============================================================================
// Tags
// ============================================================================

/// Analysis standard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum AnalysisMethod {
    /// ESA PSS-03-208
    #[serde(rename = "ESAPSS")]
    EsaPss,
    /// ECSS-E-HB-32-23A
    #[serde(rename = "ECSS")]
    Ecss,
}

impl AnalysisMethod {
    pub const ALL: [AnalysisMethod; 2] = [AnalysisMethod::EsaPss, AnalysisMethod::Ecss];

    pub fn code(&self) -> &'static str {
        match self {
            AnalysisMethod::EsaPss => "ESAPSS",
            AnalysisMethod::Ecss => "ECSS",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AnalysisMethod::EsaPss => "ESA PSS-03-208",
            AnalysisMethod::Ecss => "ECSS-E-HB-32-23A",
        }
    }

    /// Parse from common string representations
    pub fn from_str_flexible(s: &str) -> BoltResult<Self> {
        match s.trim().to_uppercase().replace([' ', '_', '-'], "").as_str() {
            "ESAPSS" | "ESA" | "PSS03208" => Ok(AnalysisMethod::EsaPss),
            "ECSS" | "ECSSEHB3223A" => Ok(AnalysisMethod::Ecss),
            _ => Err(BoltError::invalid_input("method", s, "Expected \"ESAPSS\" or \"ECSS\"")),
        }
    }
}

/// Joint configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum JointType {
    /// Through-bolt joint (bolt and nut)
    #[serde(rename = "TBJ")]
    ThroughBolt,
    /// Tapped-thread joint (bolt screwed into the last part)
    #[serde(rename = "TTJ")]
    TappedThread,
}

impl JointType {
    pub const ALL: [JointType; 2] = [JointType::ThroughBolt, JointType::TappedThread];

    pub fn code(&self) -> &'static str {
        match self {
            JointType::ThroughBolt => "TBJ",
            JointType::TappedThread => "TTJ",
        }
    }

    pub fn from_str_flexible(s: &str) -> BoltResult<Self> {
        match s.trim().to_uppercase().replace([' ', '_'], "-").as_str() {
            "TBJ" | "THROUGH-BOLT" => Ok(JointType::ThroughBolt),
            "TTJ" | "TAPPED-THREAD" => Ok(JointType::TappedThread),
            _ => Err(BoltError::invalid_input("joint_type", s, "Expected \"TBJ\" or \"TTJ\"")),
        }
    }
}

/// Which service preload the slippage margin is based on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum MosConvention {
    /// Minimum service preload
    #[serde(rename = "min")]
    Min,
    /// Mean of minimum and maximum service preload
    #[serde(rename = "mean")]
    Mean,
}

impl MosConvention {
    pub fn code(&self) -> &'static str {
        match self {
            MosConvention::Min => "min",
            MosConvention::Mean => "mean",
        }
    }

    pub fn from_str_flexible(s: &str) -> BoltResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "min" => Ok(MosConvention::Min),
            "mean" => Ok(MosConvention::Mean),
            _ => Err(BoltError::UnsupportedMosType { value: s.to_string() }),
        }
    }

    /// Preload the slippage margin works with
    pub fn slip_preload(&self, service_preload: Bracket) -> f64 {
        match self {
            MosConvention::Min => service_preload.min,
            MosConvention::Mean => service_preload.mean(),
        }
    }
}

/// Surface roughness band used for the embedding estimate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum EmbeddingRoughness {
    /// Rz below 10 µm
    #[serde(rename = "<10")]
    Below10,
    /// Rz from 10 to 40 µm
    #[serde(rename = "10-40")]
    From10To40,
    /// Rz from 40 to 160 µm
    #[serde(rename = "40-160")]
    From40To160,
    /// Preload loss taken as 5 % of the maximum assembly preload
    #[serde(rename = "5%")]
    FivePercent,
}

impl EmbeddingRoughness {
    pub const ALL: [EmbeddingRoughness; 4] = [
        EmbeddingRoughness::Below10,
        EmbeddingRoughness::From10To40,
        EmbeddingRoughness::From40To160,
        EmbeddingRoughness::FivePercent,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            EmbeddingRoughness::Below10 => "<10",
            EmbeddingRoughness::From10To40 => "10-40",
            EmbeddingRoughness::From40To160 => "40-160",
            EmbeddingRoughness::FivePercent => "5%",
        }
    }

    pub fn from_str_flexible(s: &str) -> BoltResult<Self> {
        match s.trim().replace(' ', "").as_str() {
            "<10" => Ok(EmbeddingRoughness::Below10),
            "10-40" => Ok(EmbeddingRoughness::From10To40),
            "40-160" => Ok(EmbeddingRoughness::From40To160),
            "5%" => Ok(EmbeddingRoughness::FivePercent),
            _ => Err(BoltError::UnsupportedEmbeddingCategory { value: s.to_string() }),
        }
    }
}

macro_rules! impl_tag_parsing {
    ($type:ty) => {
        impl FromStr for $type {
            type Err = BoltError;
            fn from_str(s: &str) -> BoltResult<Self> {
                <$type>::from_str_flexible(s)
            }
        }

        impl TryFrom<String> for $type {
            type Error = BoltError;
            fn try_from(s: String) -> BoltResult<Self> {
                <$type>::from_str_flexible(&s)
            }
        }

        impl fmt::Display for $type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.code())
            }
        }
    };
}

impl_tag_parsing!(AnalysisMethod);
impl_tag_parsing!(JointType);
impl_tag_parsing!(MosConvention);
impl_tag_parsing!(EmbeddingRoughness);

// ============================================================================
// Tightening
// ============================================================================

/// Friction coefficients under the head and in the thread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrictionCoefficients {
    pub mu_head_max: f64,
    pub mu_thread_max: f64,
    pub mu_head_min: f64,
    pub mu_thread_min: f64,
}

impl FrictionCoefficients {
    pub fn validate(&self) -> BoltResult<()> {
        for (field, value) in [
            ("friction.mu_head_max", self.mu_head_max),
            ("friction.mu_thread_max", self.mu_thread_max),
            ("friction.mu_head_min", self.mu_head_min),
            ("friction.mu_thread_min", self.mu_thread_min),
        ] {
            if !(value >= 0.0) {
                return Err(BoltError::invalid_input(field, value.to_string(), "Friction coefficient must be non-negative"));
            }
        }
        if self.mu_head_max < self.mu_head_min {
            return Err(BoltError::FrictionOrder {
                pair: "head".to_string(),
                max: self.mu_head_max,
                min: self.mu_head_min,
            });
        }
        if self.mu_thread_max < self.mu_thread_min {
            return Err(BoltError::FrictionOrder {
                pair: "thread".to_string(),
                max: self.mu_thread_max,
                min: self.mu_thread_min,
            });
        }
        Ok(())
    }
}

/// Scatter of the tightening device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TorqueScatter {
    /// ± value in Nm
    Absolute(f64),
    /// ± percentage of the nominal torque
    Percent(f64),
}

impl TorqueScatter {
    /// Absolute scatter in Nm for a nominal torque
    pub fn resolve(&self, nominal_nm: f64) -> f64 {
        match self {
            TorqueScatter::Absolute(nm) => *nm,
            TorqueScatter::Percent(pct) => nominal_nm * pct / 100.0,
        }
    }
}

impl FromStr for TorqueScatter {
    type Err = BoltError;

    /// Parses `"2.5"` (absolute Nm) or `"10%"`.
    fn from_str(s: &str) -> BoltResult<Self> {
        let text = s.trim();
        let invalid = || BoltError::invalid_input("torque.scatter", s, "Expected a number of Nm or a percentage like \"10%\"");
        match text.strip_suffix('%') {
            Some(pct) => pct.trim().parse().map(TorqueScatter::Percent).map_err(|_| invalid()),
            None => text.parse().map(TorqueScatter::Absolute).map_err(|_| invalid()),
        }
    }
}

/// Nominal tightening torque and its scatter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TighteningTorque {
    /// Nominal torque applied by the tool, including any prevailing torque (Nm)
    pub nominal_nm: f64,
    pub scatter: TorqueScatter,
}

impl TighteningTorque {
    /// [T − s, T + s] in Nm
    pub fn range(&self) -> Bracket {
        let s = self.scatter.resolve(self.nominal_nm);
        Bracket::new(self.nominal_nm - s, self.nominal_nm + s)
    }
}

/// Prevailing torque of a locking device (Nm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrevailingTorque {
    pub min_nm: f64,
    pub max_nm: f64,
}

/// Safety and fitting factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SafetyFactors {
    /// Yield
    pub fos_y: f64,
    /// Ultimate
    pub fos_u: f64,
    /// Slippage
    pub fos_slip: f64,
    /// Gapping
    pub fos_gap: f64,
    /// Fitting factor applied to all external loads
    pub fos_fit: f64,
}

impl Default for SafetyFactors {
    fn default() -> Self {
        SafetyFactors {
            fos_y: 1.1,
            fos_u: 1.25,
            fos_slip: 1.1,
            fos_gap: 1.0,
            fos_fit: 1.15,
        }
    }
}

// ============================================================================
// Stack and loads
// ============================================================================

/// One clamped layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClampedPart {
    pub material: String,
    pub thickness_mm: f64,
}

impl ClampedPart {
    pub fn new(material: impl Into<String>, thickness_mm: f64) -> Self {
        ClampedPart {
            material: material.into(),
            thickness_mm,
        }
    }
}

/// Shim/washer under the head. It becomes the first clamped layer, with the
/// washer thickness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shim {
    pub material: String,
    pub washer: String,
}

/// External loads on one bolt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoltLoadCase {
    pub id: String,
    /// FN: axial force, tension positive (N)
    pub axial_n: f64,
    /// FQ1: first shear component (N)
    pub shear1_n: f64,
    /// FQ2: second shear component (N)
    #[serde(default)]
    pub shear2_n: f64,
}

impl BoltLoadCase {
    pub fn new(id: impl Into<String>, axial_n: f64, shear1_n: f64, shear2_n: f64) -> Self {
        BoltLoadCase {
            id: id.into(),
            axial_n,
            shear1_n,
            shear2_n,
        }
    }
}

/// Temperature change and, for the VDI model, the service-temperature
/// material set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThermalSpec {
    /// ΔT relative to the assembly temperature (K)
    pub delta_t_k: f64,
    /// Use the VDI model with temperature-dependent properties
    #[serde(default)]
    pub use_vdi_method: bool,
    /// Bolt material at service temperature
    #[serde(default)]
    pub bolt_material: Option<String>,
    /// Shim material at service temperature (defaults to the room-temperature shim material)
    #[serde(default)]
    pub shim_material: Option<String>,
    /// Structural clamped parts at service temperature, same order as the room-temperature stack
    #[serde(default)]
    pub clamped_parts: Vec<ClampedPart>,
}

impl ThermalSpec {
    /// Standard model: only a temperature change
    pub fn standard(delta_t_k: f64) -> Self {
        ThermalSpec {
            delta_t_k,
            use_vdi_method: false,
            bolt_material: None,
            shim_material: None,
            clamped_parts: Vec::new(),
        }
    }

    pub fn validate(&self) -> BoltResult<()> {
        if !self.delta_t_k.is_finite() {
            return Err(BoltError::invalid_input("thermal.delta_t_k", self.delta_t_k.to_string(), "Temperature change must be finite"));
        }
        if self.use_vdi_method {
            if self.bolt_material.is_none() {
                return Err(BoltError::missing_thermal_data("thermal.bolt_material"));
            }
            if self.clamped_parts.is_empty() {
                return Err(BoltError::missing_thermal_data("thermal.clamped_parts"));
            }
        }
        validate_parts("thermal.clamped_parts", &self.clamped_parts)
    }
}

fn validate_parts(field: &str, parts: &[ClampedPart]) -> BoltResult<()> {
    for (i, part) in parts.iter().enumerate() {
        if !(part.thickness_mm > 0.0) {
            return Err(BoltError::invalid_input(
                format!("{}[{}].thickness_mm", field, i),
                part.thickness_mm.to_string(),
                "Clamped part thickness must be positive",
            ));
        }
    }
    Ok(())
}

// ============================================================================
// JointSpec
// ============================================================================

/// Complete description of one joint analysis job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointSpec {
    /// User label (e.g. "Bracket I/F", "Bolt-1")
    pub label: String,
    pub method: AnalysisMethod,
    pub joint_type: JointType,
    pub mos_convention: MosConvention,
    /// Bolt id in the bolt table
    pub bolt: String,
    /// Bolt material id (room temperature)
    pub bolt_material: String,
    pub friction: FrictionCoefficients,
    /// Friction coefficient between the clamped parts
    pub mu_clamp: f64,
    /// Number of shear planes
    pub shear_planes: u32,
    /// Through-hole diameter D_h (mm)
    pub through_hole_mm: f64,
    pub torque: TighteningTorque,
    /// Locking device, if any
    #[serde(default)]
    pub locking: Option<PrevailingTorque>,
    /// Loading-plane factor n
    pub loading_plane_factor: f64,
    pub safety_factors: SafetyFactors,
    pub embedding: EmbeddingRoughness,
    /// Substitution outer diameter D_A (mm); rule of thumb used when absent
    #[serde(default)]
    pub substitution_diameter_mm: Option<f64>,
    /// Distance from the bolt axis to the nearest edge (mm)
    #[serde(default)]
    pub edge_distance_mm: Option<f64>,
    #[serde(default)]
    pub shim: Option<Shim>,
    /// Structural clamped parts in stacking order, head side first
    pub clamped_parts: Vec<ClampedPart>,
    pub load_cases: Vec<BoltLoadCase>,
    #[serde(default)]
    pub thermal: Option<ThermalSpec>,
}

impl JointSpec {
    /// A starting-point joint using the defaults of `settings`.
    pub fn template(label: impl Into<String>, settings: &GlobalSettings) -> Self {
        JointSpec {
            label: label.into(),
            method: AnalysisMethod::EsaPss,
            joint_type: JointType::ThroughBolt,
            mos_convention: settings.default_mos_convention,
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
            safety_factors: settings.default_safety_factors,
            embedding: EmbeddingRoughness::Below10,
            substitution_diameter_mm: None,
            edge_distance_mm: None,
            shim: None,
            clamped_parts: vec![
                ClampedPart::new("AL7075-T7351", 10.0),
                ClampedPart::new("AL7075-T7351", 10.0),
            ],
            load_cases: vec![BoltLoadCase::new("LC-1", 1000.0, 500.0, 0.0)],
            thermal: None,
        }
    }

    /// Prevailing torque range, zero without a locking device
    pub fn prevailing_torque(&self) -> Bracket {
        match self.locking {
            Some(lock) => Bracket::new(lock.min_nm, lock.max_nm),
            None => Bracket::uniform(0.0),
        }
    }

    /// ΔT, zero without thermal data
    pub fn delta_t_k(&self) -> f64 {
        self.thermal.as_ref().map_or(0.0, |t| t.delta_t_k)
    }

    /// The VDI thermal model is requested
    pub fn uses_vdi(&self) -> bool {
        self.thermal.as_ref().is_some_and(|t| t.use_vdi_method)
    }

    /// Validate everything that does not need the catalog.
    pub fn validate(&self) -> BoltResult<()> {
        self.friction.validate()?;

        if !(self.mu_clamp > 0.0) {
            return Err(BoltError::invalid_input("mu_clamp", self.mu_clamp.to_string(), "Clamped-part friction must be positive"));
        }
        if self.shear_planes == 0 {
            return Err(BoltError::invalid_input("shear_planes", "0", "At least one shear plane is required"));
        }
        if !(self.through_hole_mm > 0.0) {
            return Err(BoltError::invalid_input("through_hole_mm", self.through_hole_mm.to_string(), "Through hole must be positive"));
        }
        if !(self.loading_plane_factor > 0.0 && self.loading_plane_factor <= 1.0) {
            return Err(BoltError::invalid_input(
                "loading_plane_factor",
                self.loading_plane_factor.to_string(),
                "Loading-plane factor must be in (0, 1]",
            ));
        }

        self.validate_torque()?;

        let fos = &self.safety_factors;
        for (field, value) in [
            ("safety_factors.fos_y", fos.fos_y),
            ("safety_factors.fos_u", fos.fos_u),
            ("safety_factors.fos_slip", fos.fos_slip),
            ("safety_factors.fos_gap", fos.fos_gap),
            ("safety_factors.fos_fit", fos.fos_fit),
        ] {
            if !(value > 0.0) {
                return Err(BoltError::invalid_input(field, value.to_string(), "Safety factor must be positive"));
            }
        }

        for (field, value) in [
            ("substitution_diameter_mm", self.substitution_diameter_mm),
            ("edge_distance_mm", self.edge_distance_mm),
        ] {
            if let Some(v) = value {
                if !(v > 0.0) {
                    return Err(BoltError::invalid_input(field, v.to_string(), "Must be positive when given"));
                }
            }
        }

        if self.clamped_parts.is_empty() {
            return Err(BoltError::invalid_input("clamped_parts", "[]", "At least one clamped part is required"));
        }
        validate_parts("clamped_parts", &self.clamped_parts)?;

        if self.load_cases.is_empty() {
            return Err(BoltError::invalid_input("load_cases", "[]", "At least one load case is required"));
        }
        for lc in &self.load_cases {
            for (name, value) in [("axial_n", lc.axial_n), ("shear1_n", lc.shear1_n), ("shear2_n", lc.shear2_n)] {
                if !value.is_finite() {
                    return Err(BoltError::invalid_input(
                        format!("load_cases[{}].{}", lc.id, name),
                        value.to_string(),
                        "Load must be finite",
                    ));
                }
            }
        }

        if let Some(thermal) = &self.thermal {
            thermal.validate()?;
        }
        Ok(())
    }

    fn validate_torque(&self) -> BoltResult<()> {
        let nominal = self.torque.nominal_nm;
        if !(nominal > 0.0) {
            return Err(BoltError::invalid_input("torque.nominal_nm", nominal.to_string(), "Tightening torque must be positive"));
        }
        let scatter = self.torque.scatter.resolve(nominal);
        if !(scatter >= 0.0 && scatter < nominal) {
            return Err(BoltError::invalid_input(
                "torque.scatter",
                scatter.to_string(),
                format!("Scatter must be non-negative and below the nominal torque {}", nominal),
            ));
        }
        if let Some(lock) = self.locking {
            if !(lock.min_nm >= 0.0 && lock.min_nm <= lock.max_nm) {
                return Err(BoltError::invalid_input(
                    "locking",
                    format!("[{}, {}]", lock.min_nm, lock.max_nm),
                    "Prevailing torque range must satisfy 0 <= min <= max",
                ));
            }
        }
        let t_min = self.torque.range().min;
        let mp_max = self.prevailing_torque().max;
        if t_min - mp_max <= 0.0 {
            return Err(BoltError::invalid_input(
                "torque",
                format!("T_min {:.3} Nm, M_p_max {:.3} Nm", t_min, mp_max),
                "Minimum tightening torque must exceed the maximum prevailing torque",
            ));
        }
        Ok(())
    }
}
