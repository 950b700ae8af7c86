use crate::sector::Sector;
use serde::Serialize;

/// Validated fundamentals for one valuation run.
///
/// `price` is always positive and `shares`, when present, is positive. Balance
/// sheet items the provider omitted are zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Fundamentals {
    pub ticker: String,
    pub name: Option<String>,
    pub sector: Sector,
    pub currency: Option<String>,

    pub price: f64,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,

    pub eps: Option<f64>,
    pub book_value: Option<f64>,
    pub dividend: Option<f64>,
    pub pe: Option<f64>,
    pub pb: Option<f64>,

    pub market_cap: Option<f64>,
    pub shares: Option<f64>,
    pub revenue: Option<f64>,
    pub debt: f64,
    pub cash: f64,
    pub fcf: Option<f64>,

    pub beta: Option<f64>,
}

impl Fundamentals {
    /// Beta fed into CAPM. Records without a beta, or reporting 0, are
    /// treated as market beta.
    pub fn capm_beta(&self) -> f64 {
        nonzero(self.beta).unwrap_or(1.0)
    }

    /// Reported P/E, or price/eps when the provider omitted it.
    pub fn pe_ratio(&self) -> Option<f64> {
        self.pe.or_else(|| positive(self.eps).map(|eps| self.price / eps))
    }

    pub fn net_cash(&self) -> f64 {
        self.cash - self.debt
    }

    /// eps × shares, the net-income proxy used for cash-flow quality.
    pub fn estimated_net_income(&self) -> Option<f64> {
        Some(self.eps? * self.shares?)
    }
}

/// Present and strictly positive.
pub(crate) fn positive(v: Option<f64>) -> Option<f64> {
    v.filter(|x| *x > 0.0)
}

/// Present and non-zero; providers report unknown values as zero.
pub(crate) fn nonzero(v: Option<f64>) -> Option<f64> {
    v.filter(|x| *x != 0.0)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::domain::contract::FundamentalsRecord;
    use crate::domain::fundamentals::Fundamentals;
    use serde_json::json;

    /// Apple-like record: every model has what it needs.
    pub fn apple() -> Fundamentals {
        let record: FundamentalsRecord = serde_json::from_value(json!({
            "ticker": "AAPL",
            "name": "Apple Inc.",
            "sector": "Tecnología",
            "price": 175.50,
            "eps": 6.15,
            "bookValue": 3.88,
            "fcf": 99_000_000_000.0,
            "shares": 15_400_000_000.0,
            "dividend": 0.96,
            "beta": 1.2,
            "revenue": 394_000_000_000.0,
            "marketCap": 2_800_000_000_000.0,
            "debt": 120_000_000_000.0,
            "cash": 169_000_000_000.0
        }))
        .unwrap();
        record.validate_and_into_fundamentals().unwrap()
    }

    /// Only a price; every model declines.
    pub fn bare(price: f64) -> Fundamentals {
        FundamentalsRecord {
            ticker: "BARE".to_string(),
            price: Some(price),
            ..Default::default()
        }
        .validate_and_into_fundamentals()
        .unwrap()
    }

    pub fn assert_close(actual: f64, expected: f64, rel: f64) {
        let scale = expected.abs().max(1.0);
        assert!(
            (actual - expected).abs() <= rel * scale,
            "expected {expected}, got {actual} (rel tol {rel})"
        );
    }
}
