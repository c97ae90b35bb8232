//! Core types for the scoring engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Score on the 0-100 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Score(u8);

impl Score {
    /// Create new score, clamped to 0-100
    pub fn new(score: u8) -> Self {
        Self(score.min(100))
    }

    /// Get raw score
    pub fn value(&self) -> u8 {
        self.0
    }
}

/// Risk band derived from a risk score via fixed thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Risk score 0-25
    Low,
    /// Risk score 26-50
    Medium,
    /// Risk score 51-75
    High,
    /// Risk score 76-100
    Critical,
}

impl RiskLevel {
    /// Map a risk score to its band. Thresholds are inclusive upper bounds:
    /// 25 is still `Low`, 50 is still `Medium`, 75 is still `High`.
    pub fn from_score(score: Score) -> Self {
        match score.value() {
            0..=25 => RiskLevel::Low,
            26..=50 => RiskLevel::Medium,
            51..=75 => RiskLevel::High,
            _ => RiskLevel::Critical,
        }
    }
}

impl From<Score> for RiskLevel {
    fn from(score: Score) -> Self {
        Self::from_score(score)
    }
}

/// Implementation status of a single control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlStatus {
    /// Fully implemented
    Compliant,
    /// Partially implemented
    Partial,
    /// Not implemented
    NonCompliant,
    /// Not yet reviewed
    NotAssessed,
}

impl ControlStatus {
    /// Parse a raw status string, degrading unrecognized values to
    /// `NotAssessed` instead of failing the scoring pass.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw {
            "compliant" => ControlStatus::Compliant,
            "partial" => ControlStatus::Partial,
            "non_compliant" => ControlStatus::NonCompliant,
            "not_assessed" => ControlStatus::NotAssessed,
            other => {
                warn!("Unrecognized control status '{}', treating as not_assessed", other);
                ControlStatus::NotAssessed
            }
        }
    }
}

/// Criticality of a control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criticality {
    /// Low criticality
    Low,
    /// Medium criticality
    Medium,
    /// High criticality
    High,
    /// Critical control
    Critical,
}

impl Criticality {
    /// Whether a gap on a control of this criticality warrants a finding
    pub fn warrants_finding(&self) -> bool {
        matches!(self, Criticality::High | Criticality::Critical)
    }
}

/// A single control response submitted for scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlResponse {
    /// Control identifier (e.g., "AC-2")
    pub control_id: String,

    /// Implementation status
    pub status: ControlStatus,

    /// Category the control belongs to (e.g., "Access Control")
    pub category: String,

    /// Criticality of the control
    pub criticality: Criticality,

    /// Optional weight; defaults to 1.0
    pub weight: Option<f64>,
}

impl ControlResponse {
    /// Effective weight of this control. Missing, non-finite, or
    /// non-positive weights degrade to 1.0.
    pub fn effective_weight(&self) -> f64 {
        match self.weight {
            Some(w) if w.is_finite() && w > 0.0 => w,
            Some(w) => {
                warn!("Invalid weight {} on control {}, using 1.0", w, self.control_id);
                1.0
            }
            None => 1.0,
        }
    }
}

/// Per-category score breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    /// Category name
    pub category: String,

    /// Compliance score for this category (0-100)
    pub score: Score,

    /// Total control weight in this category
    pub weight: f64,

    /// Number of controls in this category
    pub control_count: u32,

    /// Controls with status `compliant`
    pub compliant_count: u32,

    /// Controls with status `partial`
    pub partial_count: u32,

    /// Controls with status `non_compliant`
    pub non_compliant_count: u32,

    /// Controls with status `not_assessed`
    pub not_assessed_count: u32,

    /// Weighted compliance percentage (0.0-100.0)
    pub compliance_percentage: f64,
}

/// Remediation priority of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FindingPriority {
    /// Immediate remediation (critical control gap)
    P0,
    /// Urgent remediation (high-criticality control gap)
    P1,
}

/// A flagged gap between required and actual control status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Finding identifier
    pub finding_id: Uuid,

    /// Control that triggered the finding
    pub control_id: String,

    /// Category of the control
    pub category: String,

    /// Criticality of the control
    pub criticality: Criticality,

    /// Remediation priority
    pub priority: FindingPriority,

    /// Human-readable description
    pub description: String,
}

/// Scoring input for one assessment pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringInput {
    /// Assessment identifier
    pub assessment_id: Uuid,

    /// Framework identifier (e.g., "soc2", "iso27001")
    pub framework_id: String,

    /// Control responses to score
    pub controls: Vec<ControlResponse>,
}

/// Assessment scoring result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResult {
    /// Assessment identifier
    pub assessment_id: Uuid,

    /// Framework identifier
    pub framework_id: String,

    /// Overall compliance score (0-100)
    pub overall_score: Score,

    /// Risk band for the residual risk (100 - overall_score)
    pub risk_level: RiskLevel,

    /// Per-category breakdown, ordered by first appearance in the input
    pub category_scores: Vec<CategoryScore>,

    /// Prioritized remediation findings (P0 first)
    pub findings: Vec<Finding>,

    /// Confidence in the result (0.0-1.0), proportional to completion
    pub confidence: f64,

    /// Percentage of controls with an assessed status (0.0-100.0)
    pub completion_percentage: f64,

    /// Computation timestamp
    pub computed_at: DateTime<Utc>,
}
