//! Scoring engine for Compass GRC
//!
//! Deterministic scoring of control-compliance assessments and travel
//! advisories

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod types;
pub mod scoring;
pub mod travel;

pub use error::{Error, Result};
pub use types::*;
pub use scoring::{AssessmentScorer, CategoryWeighting, ScoringConfig};
pub use travel::{TravelAdvisoryInput, TravelRiskScore, TravelRiskScorer, TravelScorerConfig};
