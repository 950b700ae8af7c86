//! Two-stage discounted cash flow with sector growth decaying each year and an
//! exit-multiple terminal value.

use super::{
    capm, require, require_positive, upside_pct, ModelResult, EBITDA_MARGIN, RISK_FREE_RATE,
    TAX_RATE,
};
use crate::domain::fundamentals::Fundamentals;
use crate::domain::valuation::{DeclineReason, ModelDetail, ModelId, ValuationResult};
use serde::Serialize;

pub const PROJECTION_YEARS: usize = 5;
/// Each year's growth rate is the previous one times this factor.
pub const GROWTH_DECAY: f64 = 0.85;
/// Reported for reference; the exit-multiple terminal value does not use it.
pub const TERMINAL_GROWTH: f64 = 0.025;
/// EV/EBITDA applied to year-5 EBITDA.
pub const EXIT_MULTIPLE: f64 = 12.0;

pub const COST_OF_DEBT: f64 = 0.06;
pub const EQUITY_WEIGHT: f64 = 0.8;
pub const DEBT_WEIGHT: f64 = 0.2;

const LOW_QUALITY_RATIO: f64 = 0.8;
const LOW_QUALITY_HAIRCUT: f64 = 0.9;
const MILLIONS: f64 = 1_000_000.0;

/// DCF inputs in millions, after the cash-flow quality adjustment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DcfInputs {
    pub fcf: f64,
    pub shares: f64,
    pub ebitda: f64,
    pub net_cash: f64,
    /// fcf / (eps × shares), when net income is positive.
    pub fcf_quality: Option<f64>,
}

impl DcfInputs {
    pub fn from_fundamentals(f: &Fundamentals) -> Result<Self, DeclineReason> {
        let fcf = require_positive(f.fcf, "fcf")?;
        let shares = require(f.shares, "shares")?;
        let revenue = require_positive(f.revenue, "revenue")?;

        let fcf_quality = f
            .estimated_net_income()
            .filter(|ni| *ni > 0.0)
            .map(|ni| fcf / ni);
        let adjusted = match fcf_quality {
            Some(q) if q < LOW_QUALITY_RATIO => fcf * LOW_QUALITY_HAIRCUT,
            _ => fcf,
        };

        Ok(Self {
            fcf: adjusted / MILLIONS,
            shares: shares / MILLIONS,
            ebitda: revenue * EBITDA_MARGIN / MILLIONS,
            net_cash: f.net_cash() / MILLIONS,
            fcf_quality,
        })
    }
}

/// Fixed 80/20 equity/debt structure.
pub fn wacc(cost_of_equity: f64) -> f64 {
    EQUITY_WEIGHT * cost_of_equity + DEBT_WEIGHT * COST_OF_DEBT * (1.0 - TAX_RATE)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub projected_fcf: Vec<f64>,
    pub pv_fcf: f64,
    pub terminal_value: f64,
    pub enterprise_value: f64,
    pub equity_value: f64,
    pub value_per_share: f64,
}

/// Project, discount and convert to a per-share value. Shared by the base run
/// and every sensitivity-grid cell so the two always agree.
pub fn project(inputs: &DcfInputs, wacc: f64, growth: f64) -> Projection {
    let mut projected_fcf = Vec::with_capacity(PROJECTION_YEARS);
    let mut current = inputs.fcf;
    let mut g = growth;
    for _ in 0..PROJECTION_YEARS {
        current *= 1.0 + g;
        projected_fcf.push(current);
        g *= GROWTH_DECAY;
    }

    let pv_fcf: f64 = projected_fcf
        .iter()
        .enumerate()
        .map(|(i, cf)| cf / (1.0 + wacc).powi(i as i32 + 1))
        .sum();

    let terminal_value =
        inputs.ebitda * EXIT_MULTIPLE / (1.0 + wacc).powi(PROJECTION_YEARS as i32);

    let enterprise_value = pv_fcf + terminal_value;
    let equity_value = enterprise_value + inputs.net_cash;

    Projection {
        projected_fcf,
        pv_fcf,
        terminal_value,
        enterprise_value,
        equity_value,
        value_per_share: equity_value / inputs.shares,
    }
}

/// Money amounts are in millions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DcfDetail {
    pub cost_of_equity: f64,
    pub wacc: f64,
    pub growth_rate: f64,
    pub terminal_growth: f64,
    pub fcf_quality: Option<f64>,
    pub base_fcf: f64,
    pub projected_fcf: Vec<f64>,
    pub pv_fcf: f64,
    pub terminal_value: f64,
    pub enterprise_value: f64,
    pub equity_value: f64,
}

pub fn value(f: &Fundamentals) -> ModelResult {
    let inputs = DcfInputs::from_fundamentals(f)?;
    let growth_rate = f.sector.params().dcf_growth;
    let cost_of_equity = capm(RISK_FREE_RATE, f.capm_beta());
    let wacc = wacc(cost_of_equity);

    let p = project(&inputs, wacc, growth_rate);

    Ok(ValuationResult {
        model: ModelId::Dcf,
        value_per_share: p.value_per_share,
        upside: upside_pct(p.value_per_share, f.price),
        note: None,
        detail: ModelDetail::Dcf(DcfDetail {
            cost_of_equity,
            wacc,
            growth_rate,
            terminal_growth: TERMINAL_GROWTH,
            fcf_quality: inputs.fcf_quality,
            base_fcf: inputs.fcf,
            projected_fcf: p.projected_fcf,
            pv_fcf: p.pv_fcf,
            terminal_value: p.terminal_value,
            enterprise_value: p.enterprise_value,
            equity_value: p.equity_value,
        }),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::FundamentalsRecord;
    use crate::domain::fundamentals::fixtures::{apple, assert_close};

    fn detail(f: &Fundamentals) -> (ValuationResult, DcfDetail) {
        let r = value(f).unwrap();
        let d = r.dcf_detail().unwrap().clone();
        (r, d)
    }

    #[test]
    fn growth_decays_geometrically_each_year() {
        let (_, d) = detail(&apple());
        let mut prev = d.base_fcf;
        let mut expected_growth = d.growth_rate;
        for cf in &d.projected_fcf {
            assert_close(cf / prev - 1.0, expected_growth, 1e-9);
            prev = *cf;
            expected_growth *= GROWTH_DECAY;
        }
    }

    #[test]
    fn pv_is_sum_of_discounted_projections() {
        let (_, d) = detail(&apple());
        let expected: f64 = d
            .projected_fcf
            .iter()
            .enumerate()
            .map(|(i, cf)| cf / (1.0 + d.wacc).powf((i + 1) as f64))
            .sum();
        assert_close(d.pv_fcf, expected, 1e-9);
    }

    #[test]
    fn uses_capm_wacc_and_exit_multiple() {
        let f = apple();
        let (r, d) = detail(&f);
        // beta 1.2: 0.045 + 1.2 * 0.055
        assert_close(d.cost_of_equity, 0.111, 1e-12);
        assert_close(d.wacc, 0.8 * 0.111 + 0.2 * 0.06 * 0.79, 1e-12);
        assert_eq!(d.growth_rate, 0.18);

        let ebitda = 394_000.0 * 0.15;
        assert_close(d.terminal_value, ebitda * 12.0 / (1.0 + d.wacc).powi(5), 1e-9);
        assert_close(d.equity_value, d.pv_fcf + d.terminal_value + 49_000.0, 1e-9);
        assert_close(r.value_per_share, d.equity_value / 15_400.0, 1e-9);
        assert_close(r.upside, (r.value_per_share - 175.5) / 175.5 * 100.0, 1e-9);
    }

    #[test]
    fn penalises_low_quality_cash_flow() {
        let mut f = apple();
        // eps × shares = 2 × 15.4B = 30.8B; fcf/ni = 0.5
        f.eps = Some(2.0);
        f.fcf = Some(15_400_000_000.0);
        let (_, d) = detail(&f);
        assert_close(d.fcf_quality.unwrap(), 0.5, 1e-12);
        assert_close(d.base_fcf, 15_400.0 * 0.9, 1e-9);
    }

    #[test]
    fn no_quality_adjustment_without_positive_net_income() {
        let mut f = apple();
        f.eps = Some(-1.0);
        let (_, d) = detail(&f);
        assert_eq!(d.fcf_quality, None);
        assert_close(d.base_fcf, 99_000.0, 1e-12);
    }

    #[test]
    fn declines_without_positive_fcf_or_shares() {
        let mut f = apple();
        f.fcf = Some(-5.0);
        assert_eq!(value(&f), Err(DeclineReason::NonPositiveInput("fcf")));

        let f = FundamentalsRecord {
            ticker: "X".to_string(),
            price: Some(10.0),
            fcf: Some(1.0e9),
            revenue: Some(5.0e9),
            ..Default::default()
        }
        .validate_and_into_fundamentals()
        .unwrap();
        assert_eq!(value(&f), Err(DeclineReason::MissingInput("shares")));
    }

    #[test]
    fn declines_without_revenue_for_terminal_value() {
        let mut f = apple();
        f.revenue = None;
        assert_eq!(value(&f), Err(DeclineReason::MissingInput("revenue")));
    }
}
