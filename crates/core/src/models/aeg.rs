//! Abnormal earnings growth: book value plus the capitalised stream of earnings
//! above the required return on book.

use super::{
    capm, growing_perpetuity, require, require_positive, upside_pct, ModelResult,
    RISK_FREE_RATE,
};
use crate::domain::fundamentals::{nonzero, positive, Fundamentals};
use crate::domain::valuation::{DeclineReason, ModelDetail, ModelId, ValuationResult, ValueNote};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AegDetail {
    pub book_value: f64,
    /// True when book value was derived as price / pb.
    pub book_value_derived: bool,
    pub roe: f64,
    pub abnormal_growth: f64,
    pub required_return: f64,
    pub growth_rate: Option<f64>,
    pub terminal_value: Option<f64>,
}

pub fn value(f: &Fundamentals) -> ModelResult {
    let eps = require_positive(f.eps, "eps")?;
    require(f.shares, "shares")?;

    let (book_value, book_value_derived) = match nonzero(f.book_value) {
        Some(bv) => (bv, false),
        None => {
            let pb = positive(f.pb).ok_or(DeclineReason::MissingInput("bookValue"))?;
            (f.price / pb, true)
        }
    };

    let required_return = capm(RISK_FREE_RATE, f.capm_beta());
    let roe = eps / book_value;
    let abnormal_growth = roe * book_value - required_return * book_value;

    if abnormal_growth <= 0.0 {
        return Ok(ValuationResult {
            model: ModelId::Aeg,
            value_per_share: book_value,
            upside: upside_pct(book_value, f.price),
            note: Some(ValueNote::NoAbnormalGrowth),
            detail: ModelDetail::Aeg(AegDetail {
                book_value,
                book_value_derived,
                roe,
                abnormal_growth,
                required_return,
                growth_rate: None,
                terminal_value: None,
            }),
        });
    }

    let growth_rate = f.sector.params().abnormal_earnings_growth;
    let terminal_value = growing_perpetuity(abnormal_growth, required_return, growth_rate)?;
    let value_per_share = book_value + terminal_value;

    Ok(ValuationResult {
        model: ModelId::Aeg,
        value_per_share,
        upside: upside_pct(value_per_share, f.price),
        note: None,
        detail: ModelDetail::Aeg(AegDetail {
            book_value,
            book_value_derived,
            roe,
            abnormal_growth,
            required_return,
            growth_rate: Some(growth_rate),
            terminal_value: Some(terminal_value),
        }),
    })
}
