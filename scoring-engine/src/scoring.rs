//! Assessment scoring engine

use crate::{
    AssessmentResult, CategoryScore, ControlStatus, Error, Finding, FindingPriority, Result,
    RiskLevel, Score, ScoringInput,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// How category scores are weighted into the overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryWeighting {
    /// A category's weight is its control count, so larger categories are
    /// not diluted by small ones
    ControlCount,
    /// Every category contributes equally
    Uniform,
}

/// Scoring configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Fraction of a control's weight earned by a `partial` status
    pub partial_credit: f64,

    /// Category weighting used for the overall score
    pub category_weighting: CategoryWeighting,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            partial_credit: 0.5,
            category_weighting: CategoryWeighting::ControlCount,
        }
    }
}

/// Per-category accumulator used during a scoring pass
struct CategoryAccumulator {
    category: String,
    weight_possible: f64,
    weight_earned: f64,
    control_count: u32,
    compliant_count: u32,
    partial_count: u32,
    non_compliant_count: u32,
    not_assessed_count: u32,
}

impl CategoryAccumulator {
    fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            weight_possible: 0.0,
            weight_earned: 0.0,
            control_count: 0,
            compliant_count: 0,
            partial_count: 0,
            non_compliant_count: 0,
            not_assessed_count: 0,
        }
    }

    fn finish(self) -> CategoryScore {
        // weight_possible > 0 whenever control_count > 0
        let percentage = if self.weight_possible > 0.0 {
            self.weight_earned / self.weight_possible * 100.0
        } else {
            0.0
        };

        CategoryScore {
            category: self.category,
            score: Score::new(percentage.round() as u8),
            weight: self.weight_possible,
            control_count: self.control_count,
            compliant_count: self.compliant_count,
            partial_count: self.partial_count,
            non_compliant_count: self.non_compliant_count,
            not_assessed_count: self.not_assessed_count,
            compliance_percentage: percentage,
        }
    }
}

/// Assessment scorer
///
/// Pure computation over its input: no network, no storage, no shared state.
pub struct AssessmentScorer {
    config: ScoringConfig,
}

impl AssessmentScorer {
    /// Create new scorer
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    /// Score one assessment pass
    ///
    /// The overall score measures compliance; the risk band reflects the
    /// residual risk, i.e. the band of `100 - overall_score`. An empty
    /// control set scores 0 with zero confidence and no findings.
    pub fn score(&self, input: &ScoringInput) -> Result<AssessmentResult> {
        self.validate(input)?;

        if input.controls.is_empty() {
            return Ok(AssessmentResult {
                assessment_id: input.assessment_id,
                framework_id: input.framework_id.clone(),
                overall_score: Score::new(0),
                risk_level: RiskLevel::Low,
                category_scores: Vec::new(),
                findings: Vec::new(),
                confidence: 0.0,
                completion_percentage: 0.0,
                computed_at: chrono::Utc::now(),
            });
        }

        let partial_credit = self.config.partial_credit.clamp(0.0, 1.0);

        // Accumulate per category, preserving first-appearance order so
        // identical inputs produce identically ordered output
        let mut accumulators: Vec<CategoryAccumulator> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        let mut assessed_count = 0u32;

        for control in &input.controls {
            let idx = *index.entry(control.category.clone()).or_insert_with(|| {
                accumulators.push(CategoryAccumulator::new(&control.category));
                accumulators.len() - 1
            });
            let acc = &mut accumulators[idx];

            let weight = control.effective_weight();
            acc.weight_possible += weight;
            acc.control_count += 1;

            match control.status {
                ControlStatus::Compliant => {
                    acc.weight_earned += weight;
                    acc.compliant_count += 1;
                }
                ControlStatus::Partial => {
                    acc.weight_earned += weight * partial_credit;
                    acc.partial_count += 1;
                }
                ControlStatus::NonCompliant => {
                    acc.non_compliant_count += 1;
                }
                ControlStatus::NotAssessed => {
                    acc.not_assessed_count += 1;
                }
            }

            if control.status != ControlStatus::NotAssessed {
                assessed_count += 1;
            }
        }

        let category_scores: Vec<CategoryScore> =
            accumulators.into_iter().map(CategoryAccumulator::finish).collect();

        let overall_score = self.overall_score(&category_scores);
        let residual_risk = Score::new(100 - overall_score.value());
        let findings = self.generate_findings(input);

        let total = input.controls.len() as f64;
        let completion_percentage = assessed_count as f64 / total * 100.0;

        Ok(AssessmentResult {
            assessment_id: input.assessment_id,
            framework_id: input.framework_id.clone(),
            overall_score,
            risk_level: RiskLevel::from_score(residual_risk),
            category_scores,
            findings,
            confidence: completion_percentage / 100.0,
            completion_percentage,
            computed_at: chrono::Utc::now(),
        })
    }

    fn validate(&self, input: &ScoringInput) -> Result<()> {
        if input.framework_id.trim().is_empty() {
            return Err(Error::InvalidInput("framework_id is required".to_string()));
        }
        for control in &input.controls {
            if control.control_id.trim().is_empty() {
                return Err(Error::InvalidInput("control_id is required".to_string()));
            }
            if control.category.trim().is_empty() {
                return Err(Error::InvalidInput(format!(
                    "control {} has no category",
                    control.control_id
                )));
            }
        }
        Ok(())
    }

    fn overall_score(&self, category_scores: &[CategoryScore]) -> Score {
        if category_scores.is_empty() {
            return Score::new(0);
        }

        let (weighted_sum, weight_total) = match self.config.category_weighting {
            CategoryWeighting::ControlCount => category_scores.iter().fold(
                (0.0f64, 0.0f64),
                |(sum, total), cat| {
                    let w = cat.control_count as f64;
                    (sum + cat.compliance_percentage * w, total + w)
                },
            ),
            CategoryWeighting::Uniform => category_scores.iter().fold(
                (0.0f64, 0.0f64),
                |(sum, total), cat| (sum + cat.compliance_percentage, total + 1.0),
            ),
        };

        Score::new((weighted_sum / weight_total).round() as u8)
    }

    fn generate_findings(&self, input: &ScoringInput) -> Vec<Finding> {
        let mut p0 = Vec::new();
        let mut p1 = Vec::new();

        for control in &input.controls {
            let gap = matches!(
                control.status,
                ControlStatus::NonCompliant | ControlStatus::NotAssessed
            );
            if !gap || !control.criticality.warrants_finding() {
                continue;
            }

            let priority = match control.criticality {
                crate::Criticality::Critical => FindingPriority::P0,
                _ => FindingPriority::P1,
            };
            let verb = match control.status {
                ControlStatus::NonCompliant => "is not implemented",
                _ => "has not been assessed",
            };

            let finding = Finding {
                finding_id: Uuid::new_v4(),
                control_id: control.control_id.clone(),
                category: control.category.clone(),
                criticality: control.criticality,
                priority,
                description: format!("Control {} {}", control.control_id, verb),
            };

            match priority {
                FindingPriority::P0 => p0.push(finding),
                FindingPriority::P1 => p1.push(finding),
            }
        }

        p0.extend(p1);
        p0
    }
}

impl Default for AssessmentScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}
