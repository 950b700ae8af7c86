//! Residual income model: book value plus a growing perpetuity of the earnings
//! in excess of the equity charge.

use super::{
    capm, growing_perpetuity, require_nonzero, require_positive, upside_pct, ModelResult,
    RISK_FREE_RATE,
};
use crate::domain::fundamentals::Fundamentals;
use crate::domain::valuation::{ModelDetail, ModelId, ValuationResult, ValueNote};
use serde::Serialize;

/// Book value multiple applied when residual income is not positive.
pub const VALUE_DESTRUCTION_DISCOUNT: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RimDetail {
    pub book_value: f64,
    pub residual_income: f64,
    pub cost_of_equity: f64,
    /// Absent on the value-destruction branch.
    pub growth_rate: Option<f64>,
    pub terminal_value: Option<f64>,
}

pub fn value(f: &Fundamentals) -> ModelResult {
    let book_value = require_nonzero(f.book_value, "bookValue")?;
    let eps = require_positive(f.eps, "eps")?;

    let cost_of_equity = capm(RISK_FREE_RATE, f.capm_beta());
    let residual_income = eps - book_value * cost_of_equity;

    if residual_income <= 0.0 {
        let value_per_share = book_value * VALUE_DESTRUCTION_DISCOUNT;
        return Ok(ValuationResult {
            model: ModelId::Rim,
            value_per_share,
            upside: upside_pct(value_per_share, f.price),
            note: Some(ValueNote::ValueDestruction),
            detail: ModelDetail::Rim(RimDetail {
                book_value,
                residual_income,
                cost_of_equity,
                growth_rate: None,
                terminal_value: None,
            }),
        });
    }

    let growth_rate = f.sector.params().residual_income_growth;
    let terminal_value = growing_perpetuity(residual_income, cost_of_equity, growth_rate)?;
    let value_per_share = book_value + terminal_value;

    Ok(ValuationResult {
        model: ModelId::Rim,
        value_per_share,
        upside: upside_pct(value_per_share, f.price),
        note: None,
        detail: ModelDetail::Rim(RimDetail {
            book_value,
            residual_income,
            cost_of_equity,
            growth_rate: Some(growth_rate),
            terminal_value: Some(terminal_value),
        }),
    })
}
