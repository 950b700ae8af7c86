//! Gordon growth dividend discount model.

use super::{capm, growing_perpetuity, require_positive, upside_pct, ModelResult};
use crate::domain::fundamentals::Fundamentals;
use crate::domain::valuation::{ModelDetail, ModelId, ValuationResult};
use serde::Serialize;

/// This model discounts against a 4% bill rate rather than the 4.5% used elsewhere.
pub const RISK_FREE_RATE: f64 = 0.04;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DdmDetail {
    pub dividend: f64,
    pub next_dividend: f64,
    pub growth_rate: f64,
    pub discount_rate: f64,
    /// Current dividend as a percent of the fair value.
    pub yield_at_fair_value: f64,
}

pub fn value(f: &Fundamentals) -> ModelResult {
    let dividend = require_positive(f.dividend, "dividend")?;
    let growth_rate = f.sector.params().dividend_growth;
    let discount_rate = capm(RISK_FREE_RATE, f.capm_beta());

    let value_per_share = growing_perpetuity(dividend, discount_rate, growth_rate)?;

    Ok(ValuationResult {
        model: ModelId::Ddm,
        value_per_share,
        upside: upside_pct(value_per_share, f.price),
        note: None,
        detail: ModelDetail::Ddm(DdmDetail {
            dividend,
            next_dividend: dividend * (1.0 + growth_rate),
            growth_rate,
            discount_rate,
            yield_at_fair_value: dividend / value_per_share * 100.0,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fundamentals::fixtures::{apple, assert_close};
    use crate::domain::valuation::DeclineReason;
    use crate::sector::Sector;

    #[test]
    fn gordon_growth_value() {
        let r = value(&apple()).unwrap();
        // r = 0.04 + 1.2 * 0.06 = 0.112, g = 0.08
        assert_close(r.value_per_share, 0.96 * 1.08 / (0.112 - 0.08), 1e-9);
        let ModelDetail::Ddm(d) = &r.detail else {
            panic!("expected DDM detail");
        };
        assert_close(d.yield_at_fair_value, 0.96 / r.value_per_share * 100.0, 1e-12);
    }

    #[test]
    fn declines_whenever_discount_does_not_exceed_growth() {
        for sector in Sector::ALL {
            for beta in [0.0, 0.25, 0.5, 0.6, 0.75, 1.0, 1.5] {
                let mut f = apple();
                f.sector = sector;
                f.beta = Some(beta);
                // 0.0 is read as market beta
                let r = RISK_FREE_RATE + f.capm_beta() * (0.10 - RISK_FREE_RATE);
                let g = sector.params().dividend_growth;
                let res = value(&f);
                if r <= g {
                    assert_eq!(res, Err(DeclineReason::DiscountNotAboveGrowth), "{sector} beta={beta}");
                } else {
                    assert!(res.is_ok(), "{sector} beta={beta}");
                }
            }
        }
    }

    #[test]
    fn declines_without_dividend() {
        let mut f = apple();
        f.dividend = Some(0.0);
        assert_eq!(value(&f), Err(DeclineReason::NonPositiveInput("dividend")));
        f.dividend = None;
        assert_eq!(value(&f), Err(DeclineReason::MissingInput("dividend")));
    }
}
