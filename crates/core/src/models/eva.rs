//! Economic value added: capital employed plus a perpetuity of the NOPAT earned
//! above the sector capital charge.

use super::{require, require_positive, upside_pct, ModelResult, TAX_RATE};
use crate::domain::fundamentals::Fundamentals;
use crate::domain::valuation::{ModelDetail, ModelId, ValuationResult, ValueNote};
use serde::Serialize;

/// Fixed growth of the EVA stream; sector WACCs all sit above it.
pub const EVA_GROWTH: f64 = 0.03;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaDetail {
    pub ebit_margin: f64,
    pub nopat: f64,
    pub capital_employed: f64,
    pub wacc: f64,
    pub capital_charge: f64,
    pub eva: f64,
    /// Zero unless EVA is positive.
    pub eva_value: f64,
    pub enterprise_value: f64,
    pub equity_value: f64,
}

pub fn value(f: &Fundamentals) -> ModelResult {
    let revenue = require_positive(f.revenue, "revenue")?;
    let market_cap = require_positive(f.market_cap, "marketCap")?;
    let shares = require(f.shares, "shares")?;

    let params = f.sector.params();
    let ebit_margin = params.eva_ebit_margin;
    let wacc = params.eva_wacc;

    let nopat = revenue * ebit_margin * (1.0 - TAX_RATE);
    let capital_employed = market_cap + f.debt - f.cash;
    let capital_charge = capital_employed * wacc;
    let eva = nopat - capital_charge;

    let eva_value = if eva > 0.0 {
        eva * (1.0 + EVA_GROWTH) / (wacc - EVA_GROWTH)
    } else {
        0.0
    };

    let enterprise_value = capital_employed + eva_value;
    let equity_value = enterprise_value - f.debt + f.cash;
    let value_per_share = equity_value / shares;

    let note = if eva < 0.0 {
        ValueNote::EvaNegative
    } else {
        ValueNote::EvaPositive
    };

    Ok(ValuationResult {
        model: ModelId::Eva,
        value_per_share,
        upside: upside_pct(value_per_share, f.price),
        note: Some(note),
        detail: ModelDetail::Eva(EvaDetail {
            ebit_margin,
            nopat,
            capital_employed,
            wacc,
            capital_charge,
            eva,
            eva_value,
            enterprise_value,
            equity_value,
        }),
    })
}
