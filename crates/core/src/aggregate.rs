//! Blends per-model values into one fair value under a selectable weighting policy.

use crate::domain::fundamentals::Fundamentals;
use crate::domain::valuation::{ModelId, ModelOutcome};
use crate::models::{run_model, upside_pct};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightingPolicy {
    /// RIM, DCF, multiples, AEG and EVA. DDM is not run.
    #[default]
    Advanced,
    /// DCF, multiples and DDM.
    Auto,
}

const ADVANCED_WEIGHTS: [(ModelId, f64); 5] = [
    (ModelId::Rim, 0.30),
    (ModelId::Dcf, 0.25),
    (ModelId::Multiples, 0.20),
    (ModelId::Aeg, 0.15),
    (ModelId::Eva, 0.10),
];

const AUTO_WEIGHTS: [(ModelId, f64); 3] = [
    (ModelId::Dcf, 0.5),
    (ModelId::Multiples, 0.3),
    (ModelId::Ddm, 0.2),
];

impl WeightingPolicy {
    pub const ALL: [WeightingPolicy; 2] = [WeightingPolicy::Advanced, WeightingPolicy::Auto];

    /// Models this policy runs, in priority order, with their weights.
    pub fn weights(self) -> &'static [(ModelId, f64)] {
        match self {
            WeightingPolicy::Advanced => &ADVANCED_WEIGHTS,
            WeightingPolicy::Auto => &AUTO_WEIGHTS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            WeightingPolicy::Advanced => "advanced",
            WeightingPolicy::Auto => "auto",
        }
    }
}

impl fmt::Display for WeightingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WeightingPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "advanced" => Ok(WeightingPolicy::Advanced),
            "auto" => Ok(WeightingPolicy::Auto),
            other => anyhow::bail!("unknown weighting policy: {other} (expected advanced|auto)"),
        }
    }
}

/// Buy/hold/sell call derived from the blended upside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    StrongBuy,
    Buy,
    CautiousBuy,
    Hold,
    ConsiderSelling,
    Sell,
}

/// Coarse buy/hold/sell grouping of a [`Signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Buy,
    Hold,
    Sell,
}

impl Signal {
    pub fn from_upside(upside: f64) -> Self {
        if upside >= 25.0 {
            Signal::StrongBuy
        } else if upside >= 15.0 {
            Signal::Buy
        } else if upside >= 5.0 {
            Signal::CautiousBuy
        } else if upside > -10.0 {
            Signal::Hold
        } else if upside > -25.0 {
            Signal::ConsiderSelling
        } else {
            Signal::Sell
        }
    }

    pub fn stance(self) -> Stance {
        match self {
            Signal::StrongBuy | Signal::Buy | Signal::CautiousBuy => Stance::Buy,
            Signal::Hold => Stance::Hold,
            Signal::ConsiderSelling | Signal::Sell => Stance::Sell,
        }
    }
}

/// A model whose value entered the blend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Contribution {
    pub model: ModelId,
    pub weight: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateResult {
    pub ticker: String,
    pub policy: WeightingPolicy,
    pub price: f64,
    /// Absent when no model produced a positive value.
    pub fair_value: Option<f64>,
    pub upside: Option<f64>,
    /// Sum of the weights that contributed, in `[0, 1]`.
    pub confidence: f64,
    pub signal: Option<Signal>,
    pub stance: Option<Stance>,
    pub contributions: Vec<Contribution>,
    /// Every model the policy ran, declined ones included.
    pub models: Vec<ModelOutcome>,
}

impl AggregateResult {
    pub fn outcome(&self, model: ModelId) -> Option<&ModelOutcome> {
        self.models.iter().find(|o| o.model() == model)
    }
}

pub fn aggregate(f: &Fundamentals, policy: WeightingPolicy) -> AggregateResult {
    let weights = policy.weights();
    let models: Vec<ModelOutcome> = weights.iter().map(|(m, _)| run_model(*m, f)).collect();

    let contributions: Vec<Contribution> = weights
        .iter()
        .zip(&models)
        .filter_map(|((model, weight), outcome)| {
            let value = outcome.value_per_share().filter(|v| *v > 0.0)?;
            Some(Contribution {
                model: *model,
                weight: *weight,
                value,
            })
        })
        .collect();

    let total_weight: f64 = contributions.iter().map(|c| c.weight).sum();
    let weighted_sum: f64 = contributions.iter().map(|c| c.value * c.weight).sum();

    let fair_value = (total_weight > 0.0).then(|| weighted_sum / total_weight);
    let upside = fair_value.map(|v| upside_pct(v, f.price));
    let signal = upside.map(Signal::from_upside);

    tracing::debug!(
        ticker = %f.ticker,
        %policy,
        contributing = contributions.len(),
        confidence = total_weight,
        "aggregated valuation"
    );

    AggregateResult {
        ticker: f.ticker.clone(),
        policy,
        price: f.price,
        fair_value,
        upside,
        // Float sums of the weight table can land a hair above 1.
        confidence: total_weight.min(1.0),
        signal,
        stance: signal.map(Signal::stance),
        contributions,
        models,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fundamentals::fixtures::{apple, assert_close, bare};

    #[test]
    fn policy_weights_sum_to_one() {
        for policy in WeightingPolicy::ALL {
            let sum: f64 = policy.weights().iter().map(|(_, w)| w).sum();
            assert_close(sum, 1.0, 1e-12);
        }
    }

    #[test]
    fn nothing_valued_means_no_fair_value_and_zero_confidence() {
        for policy in WeightingPolicy::ALL {
            let agg = aggregate(&bare(42.0), policy);
            assert_eq!(agg.fair_value, None);
            assert_eq!(agg.upside, None);
            assert_eq!(agg.signal, None);
            assert_eq!(agg.stance, None);
            assert_eq!(agg.confidence, 0.0);
            assert!(agg.contributions.is_empty());
        }
    }

    #[test]
    fn complete_record_values_with_full_confidence() {
        let agg = aggregate(&apple(), WeightingPolicy::Advanced);
        let fv = agg.fair_value.unwrap();
        assert!(fv.is_finite() && fv > 0.0);
        assert!((0.0..=1.0).contains(&agg.confidence));
        assert_close(agg.confidence, 1.0, 1e-12);
        assert_eq!(agg.contributions.len(), 5);

        let expected: f64 = agg.contributions.iter().map(|c| c.value * c.weight).sum::<f64>()
            / agg.contributions.iter().map(|c| c.weight).sum::<f64>();
        assert_close(fv, expected, 1e-12);
        assert_close(agg.upside.unwrap(), (fv - 175.5) / 175.5 * 100.0, 1e-9);
    }

    #[test]
    fn advanced_skips_ddm_and_auto_runs_it() {
        let f = apple();
        let advanced = aggregate(&f, WeightingPolicy::Advanced);
        assert!(advanced.outcome(ModelId::Ddm).is_none());
        assert_eq!(advanced.models.len(), 5);

        let auto = aggregate(&f, WeightingPolicy::Auto);
        assert!(auto.outcome(ModelId::Ddm).is_some());
        assert!(auto.outcome(ModelId::Rim).is_none());
        assert_eq!(auto.models.len(), 3);
        assert_ne!(advanced.fair_value, auto.fair_value);
    }

    #[test]
    fn partial_coverage_renormalises_over_contributing_weights() {
        let mut f = apple();
        f.fcf = None;
        f.revenue = None;
        f.market_cap = None;
        let agg = aggregate(&f, WeightingPolicy::Auto);
        // DCF declines; multiples and DDM remain.
        assert_close(agg.confidence, 0.5, 1e-12);
        let m = agg.outcome(ModelId::Multiples).unwrap().value_per_share().unwrap();
        let d = agg.outcome(ModelId::Ddm).unwrap().value_per_share().unwrap();
        assert_close(agg.fair_value.unwrap(), (m * 0.3 + d * 0.2) / 0.5, 1e-12);
    }

    #[test]
    fn aggregate_is_idempotent() {
        let f = apple();
        for policy in WeightingPolicy::ALL {
            let a = aggregate(&f, policy);
            let b = aggregate(&f, policy);
            assert_eq!(a, b);
            assert_eq!(
                a.fair_value.map(f64::to_bits),
                b.fair_value.map(f64::to_bits)
            );
        }
    }

    #[test]
    fn signal_thresholds() {
        assert_eq!(Signal::from_upside(25.0), Signal::StrongBuy);
        assert_eq!(Signal::from_upside(15.0), Signal::Buy);
        assert_eq!(Signal::from_upside(5.0), Signal::CautiousBuy);
        assert_eq!(Signal::from_upside(-9.99), Signal::Hold);
        assert_eq!(Signal::from_upside(-10.0), Signal::ConsiderSelling);
        assert_eq!(Signal::from_upside(-25.0), Signal::Sell);
    }

    #[test]
    fn stance_groups_signals() {
        assert_eq!(Signal::StrongBuy.stance(), Stance::Buy);
        assert_eq!(Signal::CautiousBuy.stance(), Stance::Buy);
        assert_eq!(Signal::Hold.stance(), Stance::Hold);
        assert_eq!(Signal::ConsiderSelling.stance(), Stance::Sell);
        assert_eq!(Signal::Sell.stance(), Stance::Sell);

        let agg = aggregate(&apple(), WeightingPolicy::Advanced);
        assert_eq!(agg.stance, agg.signal.map(Signal::stance));
        assert!(agg.stance.is_some());
    }

    #[test]
    fn policy_parses_from_config_strings() {
        assert_eq!("AUTO".parse::<WeightingPolicy>().unwrap(), WeightingPolicy::Auto);
        assert_eq!(WeightingPolicy::default(), WeightingPolicy::Advanced);
        assert!("median".parse::<WeightingPolicy>().is_err());
    }
}
