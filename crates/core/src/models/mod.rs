//! Single-model fair value calculators.
//!
//! Each model reads one [`Fundamentals`] record and either produces a per-share
//! value or declines with a [`DeclineReason`]. Models never fail: missing or
//! unusable inputs are a decline, not an error.

pub mod aeg;
pub mod dcf;
pub mod ddm;
pub mod eva;
pub mod multiples;
pub mod rim;

use crate::domain::fundamentals::Fundamentals;
use crate::domain::valuation::{DeclineReason, ModelId, ModelOutcome, ValuationResult};

/// Risk-free rate used by the DCF, RIM and AEG cost-of-equity estimates.
pub const RISK_FREE_RATE: f64 = 0.045;
/// Expected market return shared by every CAPM estimate.
pub const MARKET_RETURN: f64 = 0.10;
pub const TAX_RATE: f64 = 0.21;
/// Operating-margin proxy for EBITDA when only revenue is known.
pub const EBITDA_MARGIN: f64 = 0.15;

/// CAPM required return: `rf + beta * (rm - rf)`.
pub fn capm(risk_free: f64, beta: f64) -> f64 {
    risk_free + beta * (MARKET_RETURN - risk_free)
}

pub fn upside_pct(value: f64, price: f64) -> f64 {
    ((value - price) / price) * 100.0
}

pub type ModelResult = Result<ValuationResult, DeclineReason>;

pub fn run_model(model: ModelId, f: &Fundamentals) -> ModelOutcome {
    let res = match model {
        ModelId::Dcf => dcf::value(f),
        ModelId::Ddm => ddm::value(f),
        ModelId::Rim => rim::value(f),
        ModelId::Aeg => aeg::value(f),
        ModelId::Eva => eva::value(f),
        ModelId::Multiples => multiples::value(f),
    };

    match res {
        Ok(result) => ModelOutcome::Valued(result),
        Err(reason) => {
            tracing::debug!(ticker = %f.ticker, %model, %reason, "model declined");
            ModelOutcome::Declined { model, reason }
        }
    }
}

pub fn run_all(f: &Fundamentals) -> Vec<ModelOutcome> {
    ModelId::ALL.into_iter().map(|m| run_model(m, f)).collect()
}

pub(crate) fn require(v: Option<f64>, field: &'static str) -> Result<f64, DeclineReason> {
    v.ok_or(DeclineReason::MissingInput(field))
}

pub(crate) fn require_positive(v: Option<f64>, field: &'static str) -> Result<f64, DeclineReason> {
    let v = require(v, field)?;
    if v > 0.0 {
        Ok(v)
    } else {
        Err(DeclineReason::NonPositiveInput(field))
    }
}

/// Present and non-zero. Zero is how providers report "unknown".
pub(crate) fn require_nonzero(v: Option<f64>, field: &'static str) -> Result<f64, DeclineReason> {
    crate::domain::fundamentals::nonzero(v).ok_or(DeclineReason::MissingInput(field))
}

/// Growing perpetuity of a stream starting at `amount`: `amount * (1+g) / (r-g)`.
pub(crate) fn growing_perpetuity(
    amount: f64,
    discount: f64,
    growth: f64,
) -> Result<f64, DeclineReason> {
    if discount <= growth {
        return Err(DeclineReason::DiscountNotAboveGrowth);
    }
    Ok(amount * (1.0 + growth) / (discount - growth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fundamentals::fixtures::{apple, assert_close, bare};

    #[test]
    fn capm_matches_reference_rates() {
        assert_close(capm(RISK_FREE_RATE, 1.0), 0.10, 1e-12);
        assert_close(capm(RISK_FREE_RATE, 1.2), 0.111, 1e-12);
        assert_close(capm(0.04, 1.2), 0.112, 1e-12);
    }

    #[test]
    fn all_six_models_value_a_complete_record() {
        let outcomes = run_all(&apple());
        assert_eq!(outcomes.len(), 6);
        for o in &outcomes {
            let v = o.value_per_share();
            assert!(v.is_some(), "{} declined: {:?}", o.model(), o.decline_reason());
            assert!(v.unwrap().is_finite());
        }
    }

    #[test]
    fn zero_beta_values_like_market_beta() {
        let mut zero = apple();
        zero.beta = Some(0.0);
        let mut market = apple();
        market.beta = Some(1.0);
        let mut missing = apple();
        missing.beta = None;

        let expected = run_all(&market);
        assert_eq!(run_all(&zero), expected);
        assert_eq!(run_all(&missing), expected);
        for o in &expected {
            assert!(o.value_per_share().is_some(), "{} declined", o.model());
        }
    }

    #[test]
    fn every_model_declines_without_inputs() {
        for o in run_all(&bare(50.0)) {
            assert!(o.decline_reason().is_some(), "{} should decline", o.model());
        }
    }

    #[test]
    fn perpetuity_declines_when_discount_does_not_exceed_growth() {
        assert_eq!(
            growing_perpetuity(1.0, 0.05, 0.05),
            Err(DeclineReason::DiscountNotAboveGrowth)
        );
        assert_close(growing_perpetuity(1.0, 0.10, 0.05).unwrap(), 21.0, 1e-12);
    }
}
