use std::collections::BTreeSet;
use std::path::Path;

use anyhow::Context;
use fairvalue_core::domain::contract::FundamentalsRecord;

/// Read a JSON array of fundamentals records.
pub async fn load_records(path: &Path) -> anyhow::Result<Vec<FundamentalsRecord>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("read {} failed", path.display()))?;
    parse_records(&raw).with_context(|| format!("parse {} failed", path.display()))
}

pub fn parse_records(raw: &str) -> anyhow::Result<Vec<FundamentalsRecord>> {
    let records: Vec<FundamentalsRecord> = serde_json::from_str(raw)?;
    anyhow::ensure!(!records.is_empty(), "no fundamentals records in input");
    Ok(records)
}

/// Keep only the requested tickers (case-insensitive). An empty filter keeps all.
pub fn select(records: Vec<FundamentalsRecord>, tickers: &[String]) -> Vec<FundamentalsRecord> {
    if tickers.is_empty() {
        return records;
    }
    let wanted: BTreeSet<String> = tickers.iter().map(|t| t.trim().to_uppercase()).collect();
    records
        .into_iter()
        .filter(|r| wanted.contains(&r.ticker.trim().to_uppercase()))
        .collect()
}
