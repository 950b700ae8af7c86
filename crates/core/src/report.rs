//! Full per-ticker report (aggregate, risk, optional grid) and the screener
//! that ranks many of them.

use crate::aggregate::{aggregate, AggregateResult, WeightingPolicy};
use crate::domain::contract::FundamentalsRecord;
use crate::domain::fundamentals::Fundamentals;
use crate::domain::screen::{RejectedRecord, ScreenItem, ScreenSnapshot};
use crate::domain::valuation::{ModelId, ModelOutcome};
use crate::risk::{risk_profile_with, RiskConfig, RiskProfile};
use crate::sector::Sector;
use crate::sensitivity::{sensitivity_grid, SensitivityGrid};
use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportOptions {
    pub policy: WeightingPolicy,
    pub risk: RiskConfig,
    /// Percentage-point steps for both grid axes; `None` skips the grid.
    pub grid_steps: Option<Vec<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationReport {
    pub ticker: String,
    pub name: Option<String>,
    pub sector: Sector,
    pub price: f64,
    pub aggregate: AggregateResult,
    pub risk: RiskProfile,
    /// Present when requested and the DCF produced a value.
    pub sensitivity: Option<SensitivityGrid>,
}

pub fn value_record(
    record: FundamentalsRecord,
    opts: &ReportOptions,
) -> anyhow::Result<ValuationReport> {
    let f = record.validate_and_into_fundamentals()?;
    value_fundamentals(&f, opts)
}

pub fn value_fundamentals(f: &Fundamentals, opts: &ReportOptions) -> anyhow::Result<ValuationReport> {
    let agg = aggregate(f, opts.policy);
    let risk = risk_profile_with(f, &agg, &opts.risk);

    let dcf = agg
        .outcome(ModelId::Dcf)
        .and_then(ModelOutcome::valued)
        .and_then(|r| r.dcf_detail());
    let sensitivity = match (&opts.grid_steps, dcf) {
        (Some(steps), Some(dcf)) => Some(sensitivity_grid(dcf, f, steps, steps)?),
        (Some(_), None) => {
            tracing::debug!(ticker = %f.ticker, "no DCF value; skipping sensitivity grid");
            None
        }
        (None, _) => None,
    };

    Ok(ValuationReport {
        ticker: f.ticker.clone(),
        name: f.name.clone(),
        sector: f.sector,
        price: f.price,
        aggregate: agg,
        risk,
        sensitivity,
    })
}

impl ScreenItem {
    fn from_report(report: &ValuationReport) -> Self {
        Self {
            rank: 0,
            ticker: report.ticker.clone(),
            name: report.name.clone(),
            sector: report.sector,
            price: report.price,
            fair_value: report.aggregate.fair_value,
            upside: report.aggregate.upside,
            signal: report.aggregate.signal,
            stance: report.aggregate.stance,
            confidence: report.aggregate.confidence,
            risk_level: report.risk.level,
        }
    }
}

/// Value one screener entry. A record that fails validation comes back as
/// its rejection instead of an error.
pub fn screen_record(
    record: FundamentalsRecord,
    opts: &ReportOptions,
) -> Result<ValuationReport, RejectedRecord> {
    let ticker = record.ticker.clone();
    value_record(record, opts).map_err(|err| {
        tracing::warn!(%ticker, error = %err, "skipping record");
        RejectedRecord {
            ticker,
            error: format!("{err:#}"),
        }
    })
}

/// Rank reports by upside, highest first. Tickers without a fair value go last
/// in ticker order. Rejects are listed by ticker.
pub fn rank(
    policy: WeightingPolicy,
    reports: &[ValuationReport],
    mut rejected: Vec<RejectedRecord>,
) -> ScreenSnapshot {
    let mut items: Vec<ScreenItem> = reports.iter().map(ScreenItem::from_report).collect();
    items.sort_by(|a, b| match (a.upside, b.upside) {
        (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| a.ticker.cmp(&b.ticker)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.ticker.cmp(&b.ticker),
    });
    for (i, item) in items.iter_mut().enumerate() {
        item.rank = i as i32 + 1;
    }
    rejected.sort_by(|a, b| a.ticker.cmp(&b.ticker));

    ScreenSnapshot {
        generated_at: chrono::Utc::now(),
        policy,
        items,
        rejected,
    }
}

/// Value every record in turn and rank the results.
pub fn screen(records: Vec<FundamentalsRecord>, opts: &ReportOptions) -> ScreenSnapshot {
    let mut reports = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    for record in records {
        match screen_record(record, opts) {
            Ok(report) => reports.push(report),
            Err(reject) => rejected.push(reject),
        }
    }
    rank(opts.policy, &reports, rejected)
}
