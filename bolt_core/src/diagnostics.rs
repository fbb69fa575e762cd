//! # Diagnostics
//!
//! Informational notes and warnings produced while a joint is analyzed
//! (which substitution-area case was taken, which embedding table row was
//! used, fallbacks that were applied). They are returned next to the results
//! instead of being printed, so library callers decide how to surface them.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "level": "warning",
//!   "stage": "stiffness",
//!   "message": "l_K/d = 0.80 below 1.0; substitution area limited to the head bearing annulus"
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    Info,
    Warning,
}

/// Pipeline stage that emitted a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStage {
    Init,
    Stiffness,
    Embedding,
    Thermal,
    Results,
}

impl AnalysisStage {
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisStage::Init => "init",
            AnalysisStage::Stiffness => "stiffness",
            AnalysisStage::Embedding => "embedding",
            AnalysisStage::Thermal => "thermal",
            AnalysisStage::Results => "results",
        }
    }
}

/// One note emitted during an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub stage: AnalysisStage,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.level {
            DiagnosticLevel::Info => "INFO",
            DiagnosticLevel::Warning => "WARN",
        };
        write!(f, "[{}] {}: {}", tag, self.stage.name(), self.message)
    }
}

/// Ordered collector threaded through the pipeline stages.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn info(&mut self, stage: AnalysisStage, message: impl Into<String>) {
        self.push(DiagnosticLevel::Info, stage, message);
    }

    pub fn warn(&mut self, stage: AnalysisStage, message: impl Into<String>) {
        self.push(DiagnosticLevel::Warning, stage, message);
    }

    fn push(&mut self, level: DiagnosticLevel, stage: AnalysisStage, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            level,
            stage,
            message: message.into(),
        });
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.level == DiagnosticLevel::Warning)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_preserved() {
        let mut diag = Diagnostics::new();
        diag.info(AnalysisStage::Stiffness, "first");
        diag.warn(AnalysisStage::Embedding, "second");
        assert_eq!(diag.warnings().count(), 1);

        let entries = diag.into_vec();
        assert_eq!(entries[0].message, "first");
        assert_eq!(entries[1].level, DiagnosticLevel::Warning);
    }

    #[test]
    fn test_display_and_json() {
        let d = Diagnostic {
            level: DiagnosticLevel::Warning,
            stage: AnalysisStage::Embedding,
            message: "9 interfaces".to_string(),
        };
        assert_eq!(d.to_string(), "[WARN] embedding: 9 interfaces");
        let json = serde_json::to_string(&d).unwrap();
        assert!(json.contains("\"level\":\"warning\""));
    }
}
