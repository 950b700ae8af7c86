use crate::aggregate::{Signal, Stance, WeightingPolicy};
use crate::risk::RiskLevel;
use crate::sector::Sector;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Many tickers valued under one policy, best upside first.
#[derive(Debug, Clone, Serialize)]
pub struct ScreenSnapshot {
    pub generated_at: DateTime<Utc>,
    pub policy: WeightingPolicy,
    pub items: Vec<ScreenItem>,
    /// Records that failed validation or could not be valued.
    pub rejected: Vec<RejectedRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenItem {
    pub rank: i32,
    pub ticker: String,
    pub name: Option<String>,
    pub sector: Sector,
    pub price: f64,
    pub fair_value: Option<f64>,
    pub upside: Option<f64>,
    pub signal: Option<Signal>,
    pub stance: Option<Stance>,
    pub confidence: f64,
    pub risk_level: RiskLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    pub ticker: String,
    pub error: String,
}
