//! Sector multiples adjusted for growth (PEG) and profitability (ROE), blended
//! across P/E, P/B and EV/EBITDA.

use super::{require_nonzero, upside_pct, ModelResult, EBITDA_MARGIN};
use crate::domain::fundamentals::{positive, Fundamentals};
use crate::domain::valuation::{ModelDetail, ModelId, ValuationResult};
use crate::sector::SectorMultiples;
use serde::Serialize;

pub const PE_WEIGHT: f64 = 0.40;
pub const PB_WEIGHT: f64 = 0.35;
pub const EV_EBITDA_WEIGHT: f64 = 0.25;

const CHEAP_GROWTH_PREMIUM: f64 = 1.1;
const EXPENSIVE_GROWTH_DISCOUNT: f64 = 0.85;
const HIGH_ROE_PREMIUM: f64 = 1.15;
const LOW_ROE_DISCOUNT: f64 = 0.8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiplesDetail {
    pub value_pe: f64,
    pub value_pb: f64,
    pub value_ev_ebitda: Option<f64>,
    pub pe_used: f64,
    pub pb_used: f64,
    pub peg: Option<f64>,
    /// Return on equity in percent.
    pub roe: f64,
    pub sector_multiples: SectorMultiples,
}

/// Sector P/E scaled by the PEG of the record's own P/E. Unchanged when no
/// P/E is known or the PEG sits in `[1, 2]`.
pub fn adjusted_pe(sector_pe: f64, peg: Option<f64>) -> f64 {
    match peg {
        Some(p) if p < 1.0 => sector_pe * CHEAP_GROWTH_PREMIUM,
        Some(p) if p > 2.0 => sector_pe * EXPENSIVE_GROWTH_DISCOUNT,
        _ => sector_pe,
    }
}

pub fn adjusted_pb(sector_pb: f64, roe_pct: f64) -> f64 {
    if roe_pct > 20.0 {
        sector_pb * HIGH_ROE_PREMIUM
    } else if roe_pct < 10.0 {
        sector_pb * LOW_ROE_DISCOUNT
    } else {
        sector_pb
    }
}

pub fn value(f: &Fundamentals) -> ModelResult {
    let eps = require_nonzero(f.eps, "eps")?;
    let book_value = require_nonzero(f.book_value, "bookValue")?;

    let sector_multiples = f.sector.params().multiples;

    let peg = f.pe_ratio().map(|pe| pe / (sector_multiples.pe / 10.0));
    let pe_used = adjusted_pe(sector_multiples.pe, peg);

    let roe = eps / book_value * 100.0;
    let pb_used = adjusted_pb(sector_multiples.pb, roe);

    let value_pe = eps * pe_used;
    let value_pb = book_value * pb_used;

    // Needs market cap as evidence of a listed capital structure, plus revenue
    // for EBITDA and shares for the per-share figure.
    let value_ev_ebitda = match (positive(f.market_cap), positive(f.revenue), f.shares) {
        (Some(_), Some(revenue), Some(shares)) => {
            let ev = revenue * EBITDA_MARGIN * sector_multiples.ev_ebitda;
            Some((ev - f.debt + f.cash) / shares)
        }
        _ => None,
    };

    let partial = value_pe * PE_WEIGHT + value_pb * PB_WEIGHT;
    let value_per_share = match value_ev_ebitda {
        Some(v) => partial + v * EV_EBITDA_WEIGHT,
        None => partial / (PE_WEIGHT + PB_WEIGHT),
    };

    Ok(ValuationResult {
        model: ModelId::Multiples,
        value_per_share,
        upside: upside_pct(value_per_share, f.price),
        note: None,
        detail: ModelDetail::Multiples(MultiplesDetail {
            value_pe,
            value_pb,
            value_ev_ebitda,
            pe_used,
            pb_used,
            peg,
            roe,
            sector_multiples,
        }),
    })
}
