//! Travel advisory risk scoring

use crate::{Error, Result, RiskLevel, Score};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Travel advisory input for one destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelAdvisoryInput {
    /// ISO country code of the destination
    pub destination_country_code: String,

    /// State advisory level, 1 (normal precautions) through 4 (do not travel)
    pub advisory_level: u8,

    /// Active health/security factors (e.g., "disease outbreak")
    pub health_factors: Vec<String>,
}

/// Travel risk score for a destination
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelRiskScore {
    /// ISO country code of the destination
    pub destination_country_code: String,

    /// Risk score (0-100)
    pub score: Score,

    /// Risk band
    pub risk_level: RiskLevel,

    /// Factors that contributed to the score
    pub factors: Vec<String>,

    /// Computation timestamp
    pub computed_at: DateTime<Utc>,
}

/// Travel scorer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelScorerConfig {
    /// Base risk score per advisory level 1-4
    pub level_base: [u8; 4],

    /// Score added per health/security factor
    pub factor_bump: u8,
}

impl Default for TravelScorerConfig {
    fn default() -> Self {
        Self {
            level_base: [10, 35, 60, 90],
            factor_bump: 5,
        }
    }
}

/// Travel risk scorer
pub struct TravelRiskScorer {
    config: TravelScorerConfig,
}

impl TravelRiskScorer {
    /// Create new travel scorer
    pub fn new(config: TravelScorerConfig) -> Self {
        Self { config }
    }

    /// Score a destination: advisory-level base plus a bump per active
    /// factor, clamped to 0-100, then the standard four-band table
    pub fn score_travel(&self, input: &TravelAdvisoryInput) -> Result<TravelRiskScore> {
        if !(1..=4).contains(&input.advisory_level) {
            return Err(Error::InvalidInput(format!(
                "advisory_level must be 1-4, got {}",
                input.advisory_level
            )));
        }
        if input.destination_country_code.trim().is_empty() {
            return Err(Error::InvalidInput("destination_country_code is required".to_string()));
        }

        let base = self.config.level_base[(input.advisory_level - 1) as usize];
        let mut factors = vec![format!("State advisory level {}", input.advisory_level)];

        let mut raw = base as u32;
        for factor in &input.health_factors {
            raw += self.config.factor_bump as u32;
            factors.push(factor.clone());
        }

        let score = Score::new(raw.min(100) as u8);

        Ok(TravelRiskScore {
            destination_country_code: input.destination_country_code.to_uppercase(),
            score,
            risk_level: RiskLevel::from_score(score),
            factors,
            computed_at: Utc::now(),
        })
    }
}

impl Default for TravelRiskScorer {
    fn default() -> Self {
        Self::new(TravelScorerConfig::default())
    }
}
