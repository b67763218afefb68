//! Purpose: Weighted, explainable reward used to rank provider candidates.
//! Exports: `RewardTerms`, `RewardBreakdown`, `DEFAULT_WEIGHTS`, `compute_reward`.
//! Invariants: Inputs are clamped to [0, 1]; the total is clamped and rounded to 4 places.
use serde::Serialize;

use super::scoring::round_to;

/// One value per reward signal. Used for raw inputs, weights, and weighted terms.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct RewardTerms {
    pub base_confidence: f64,
    pub citation_quality: f64,
    pub freshness: f64,
    pub route_bonus: f64,
}

pub const DEFAULT_WEIGHTS: RewardTerms = RewardTerms {
    base_confidence: 0.45,
    citation_quality: 0.30,
    freshness: 0.15,
    route_bonus: 0.10,
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RewardBreakdown {
    pub raw: RewardTerms,
    pub weights: RewardTerms,
    pub weighted: RewardTerms,
}

impl RewardTerms {
    fn clamped(self) -> Self {
        Self {
            base_confidence: clamp01(self.base_confidence),
            citation_quality: clamp01(self.citation_quality),
            freshness: clamp01(self.freshness),
            route_bonus: clamp01(self.route_bonus),
        }
    }

    fn weighted_by(self, weights: &RewardTerms) -> Self {
        Self {
            base_confidence: self.base_confidence * weights.base_confidence,
            citation_quality: self.citation_quality * weights.citation_quality,
            freshness: self.freshness * weights.freshness,
            route_bonus: self.route_bonus * weights.route_bonus,
        }
    }

    fn rounded(self, places: i32) -> Self {
        Self {
            base_confidence: round_to(self.base_confidence, places),
            citation_quality: round_to(self.citation_quality, places),
            freshness: round_to(self.freshness, places),
            route_bonus: round_to(self.route_bonus, places),
        }
    }

    fn sum(&self) -> f64 {
        self.base_confidence + self.citation_quality + self.freshness + self.route_bonus
    }
}

pub fn compute_reward(signals: RewardTerms, weights: &RewardTerms) -> (f64, RewardBreakdown) {
    let raw = signals.clamped();
    let weighted = raw.weighted_by(weights);
    let total = clamp01(weighted.sum());
    let breakdown = RewardBreakdown {
        raw,
        weights: *weights,
        weighted: weighted.rounded(4),
    };
    (round_to(total, 4), breakdown)
}

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}
