use crate::domain::fundamentals::Fundamentals;
use crate::sector::Sector;
use anyhow::ensure;
use serde::{Deserialize, Serialize};

/// Fundamentals as delivered by a data provider. Every numeric field is optional;
/// `validate_and_into_fundamentals` enforces the caller contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundamentalsRecord {
    pub ticker: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,

    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub change: Option<f64>,
    #[serde(default)]
    pub change_percent: Option<f64>,

    #[serde(default)]
    pub eps: Option<f64>,
    #[serde(default)]
    pub book_value: Option<f64>,
    #[serde(default)]
    pub dividend: Option<f64>,
    #[serde(default)]
    pub pe: Option<f64>,
    #[serde(default)]
    pub pb: Option<f64>,

    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub shares: Option<f64>,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub debt: Option<f64>,
    #[serde(default)]
    pub cash: Option<f64>,
    #[serde(default)]
    pub fcf: Option<f64>,

    #[serde(default)]
    pub beta: Option<f64>,
}

impl FundamentalsRecord {
    pub fn validate_and_into_fundamentals(self) -> anyhow::Result<Fundamentals> {
        let ticker = self.ticker.trim().to_uppercase();
        ensure!(!ticker.is_empty(), "ticker must be non-empty");

        let numeric = [
            ("price", self.price),
            ("change", self.change),
            ("changePercent", self.change_percent),
            ("eps", self.eps),
            ("bookValue", self.book_value),
            ("dividend", self.dividend),
            ("pe", self.pe),
            ("pb", self.pb),
            ("marketCap", self.market_cap),
            ("shares", self.shares),
            ("revenue", self.revenue),
            ("debt", self.debt),
            ("cash", self.cash),
            ("fcf", self.fcf),
            ("beta", self.beta),
        ];
        for (field, value) in numeric {
            if let Some(v) = value {
                ensure!(v.is_finite(), "{ticker}: {field} must be finite (got {v})");
            }
        }

        let Some(price) = self.price else {
            anyhow::bail!("{ticker}: price is required");
        };
        ensure!(price > 0.0, "{ticker}: price must be positive (got {price})");

        if let Some(shares) = self.shares {
            ensure!(shares > 0.0, "{ticker}: shares must be positive (got {shares})");
        }
        for (field, value) in [("debt", self.debt), ("cash", self.cash), ("beta", self.beta)] {
            if let Some(v) = value {
                ensure!(v >= 0.0, "{ticker}: {field} must be non-negative (got {v})");
            }
        }

        let name = self
            .name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let sector = self
            .sector
            .as_deref()
            .map(Sector::from_key)
            .unwrap_or_default();

        Ok(Fundamentals {
            ticker,
            name,
            sector,
            currency: self.currency,
            price,
            change: self.change,
            change_percent: self.change_percent,
            eps: self.eps,
            book_value: self.book_value,
            dividend: self.dividend,
            pe: self.pe,
            pb: self.pb,
            market_cap: self.market_cap,
            shares: self.shares,
            revenue: self.revenue,
            debt: self.debt.unwrap_or(0.0),
            cash: self.cash.unwrap_or(0.0),
            fcf: self.fcf,
            beta: self.beta,
        })
    }
}
