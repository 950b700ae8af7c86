//! Heuristic risk profile: sector beta and volatility, a Sharpe ratio on the
//! blended upside, and a three-level bucket.

use crate::aggregate::AggregateResult;
use crate::domain::fundamentals::{nonzero, Fundamentals};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// T-bill rate for the Sharpe ratio.
pub const SHARPE_RISK_FREE: f64 = 0.04;
/// Expected return when the aggregate has no upside to offer.
pub const DEFAULT_EXPECTED_RETURN: f64 = 0.10;

const MIN_VOLATILITY: f64 = 0.01;

/// Optional seeded jitter on beta and volatility. Each draw adds
/// `(u - 0.5) * amplitude` with `u` uniform in `[0, 1)`. The stream is keyed
/// on the seed and the ticker, so one seed gives every ticker its own offsets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskNoise {
    pub seed: u64,
    pub beta_amplitude: f64,
    pub volatility_amplitude: f64,
}

impl RiskNoise {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed,
            beta_amplitude: 0.2,
            volatility_amplitude: 0.05,
        }
    }

    fn rng_for(&self, ticker: &str) -> ChaCha8Rng {
        // FNV-1a over the ticker; stable across builds and platforms.
        let mut h: u64 = 0xcbf2_9ce4_8422_2325;
        for b in ticker.bytes() {
            h ^= u64::from(b);
            h = h.wrapping_mul(0x0000_0100_0000_01b3);
        }
        ChaCha8Rng::seed_from_u64(self.seed ^ h)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskConfig {
    /// `None` keeps the profile a pure function of its inputs.
    pub noise: Option<RiskNoise>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn classify(beta: f64, volatility: f64) -> Self {
        if beta > 1.3 || volatility > 0.35 {
            RiskLevel::High
        } else if beta > 1.1 || volatility > 0.25 {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskAdvisory {
    LowSharpe,
    HighMarketSensitivity,
    LimitedMarginOfSafety,
    NoMarginOfSafety,
    HighVolatility,
    AcceptableProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskProfile {
    pub sharpe_ratio: f64,
    pub beta: f64,
    pub volatility: f64,
    pub expected_return: f64,
    /// Aggregate upside in percent; absent when there is no fair value.
    pub margin_of_safety: Option<f64>,
    pub level: RiskLevel,
    pub advisories: Vec<RiskAdvisory>,
}

pub fn risk_profile(f: &Fundamentals, agg: &AggregateResult) -> RiskProfile {
    risk_profile_with(f, agg, &RiskConfig::default())
}

pub fn risk_profile_with(f: &Fundamentals, agg: &AggregateResult, cfg: &RiskConfig) -> RiskProfile {
    let params = f.sector.params();
    // A reported beta of 0 means the provider had none.
    let mut beta = nonzero(f.beta).unwrap_or(params.beta);
    let mut volatility = params.volatility;

    if let Some(noise) = cfg.noise {
        let mut rng = noise.rng_for(&f.ticker);
        beta += (rng.gen::<f64>() - 0.5) * noise.beta_amplitude;
        volatility += (rng.gen::<f64>() - 0.5) * noise.volatility_amplitude;
    }
    let volatility = volatility.max(MIN_VOLATILITY);

    let expected_return = agg
        .upside
        .map(|u| u / 100.0)
        .unwrap_or(DEFAULT_EXPECTED_RETURN);
    let sharpe_ratio = (expected_return - SHARPE_RISK_FREE) / volatility;
    let margin_of_safety = agg.upside;

    RiskProfile {
        sharpe_ratio,
        beta,
        volatility,
        expected_return,
        margin_of_safety,
        level: RiskLevel::classify(beta, volatility),
        advisories: advisories(sharpe_ratio, beta, volatility, margin_of_safety),
    }
}

fn advisories(sharpe: f64, beta: f64, volatility: f64, mos: Option<f64>) -> Vec<RiskAdvisory> {
    let mut out = Vec::new();
    if sharpe < 0.5 {
        out.push(RiskAdvisory::LowSharpe);
    }
    if beta > 1.2 {
        out.push(RiskAdvisory::HighMarketSensitivity);
    }
    match mos {
        Some(m) if m > 0.0 && m < 15.0 => out.push(RiskAdvisory::LimitedMarginOfSafety),
        Some(m) if m < 0.0 => out.push(RiskAdvisory::NoMarginOfSafety),
        _ => {}
    }
    if volatility > 0.30 {
        out.push(RiskAdvisory::HighVolatility);
    }
    if out.is_empty() {
        out.push(RiskAdvisory::AcceptableProfile);
    }
    out
}
