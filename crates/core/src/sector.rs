use serde::{Deserialize, Serialize};
use std::fmt;

/// Sector classification used to key every model's parameter table.
///
/// Provider payloads use the Spanish sector labels; English names and unaccented
/// spellings are accepted as well. Anything unrecognised maps to [`Sector::Other`],
/// which resolves to the per-model defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "&'static str")]
pub enum Sector {
    Technology,
    Financials,
    Healthcare,
    Consumer,
    Energy,
    Industrials,
    Automotive,
    Diversified,
    #[default]
    Other,
}

impl Sector {
    pub const ALL: [Sector; 9] = [
        Sector::Technology,
        Sector::Financials,
        Sector::Healthcare,
        Sector::Consumer,
        Sector::Energy,
        Sector::Industrials,
        Sector::Automotive,
        Sector::Diversified,
        Sector::Other,
    ];

    pub fn from_key(key: &str) -> Self {
        let k = key.trim().to_lowercase();
        match k.as_str() {
            "tecnología" | "tecnologia" | "technology" | "tech" => Sector::Technology,
            "finanzas" | "financials" | "finance" => Sector::Financials,
            "salud" | "healthcare" | "health" => Sector::Healthcare,
            "consumo" | "consumer" => Sector::Consumer,
            "energía" | "energia" | "energy" => Sector::Energy,
            "industriales" | "industrials" => Sector::Industrials,
            "automotriz" | "automotive" => Sector::Automotive,
            "diversificado" | "diversified" => Sector::Diversified,
            _ => Sector::Other,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Sector::Technology => "Tecnología",
            Sector::Financials => "Finanzas",
            Sector::Healthcare => "Salud",
            Sector::Consumer => "Consumo",
            Sector::Energy => "Energía",
            Sector::Industrials => "Industriales",
            Sector::Automotive => "Automotriz",
            Sector::Diversified => "Diversificado",
            Sector::Other => "Otro",
        }
    }

    /// Parameter record for this sector. Sectors a model's table does not list
    /// carry that model's default value in their record.
    pub fn params(self) -> &'static SectorParams {
        match self {
            Sector::Technology => &TECHNOLOGY,
            Sector::Financials => &FINANCIALS,
            Sector::Healthcare => &HEALTHCARE,
            Sector::Consumer => &CONSUMER,
            Sector::Energy => &ENERGY,
            Sector::Industrials => &INDUSTRIALS,
            Sector::Automotive => &AUTOMOTIVE,
            Sector::Diversified | Sector::Other => &DEFAULT_PARAMS,
        }
    }
}

impl From<String> for Sector {
    fn from(s: String) -> Self {
        Sector::from_key(&s)
    }
}

impl From<Sector> for &'static str {
    fn from(s: Sector) -> Self {
        s.key()
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Baseline trading multiples for the sector-adjusted multiples model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectorMultiples {
    pub pe: f64,
    pub pb: f64,
    pub ps: f64,
    pub ev_ebitda: f64,
}

/// One row of the (model, sector) table-of-tables.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SectorParams {
    /// DCF stage-1 FCF growth.
    pub dcf_growth: f64,
    /// Gordon-growth dividend growth.
    pub dividend_growth: f64,
    pub residual_income_growth: f64,
    pub abnormal_earnings_growth: f64,
    pub eva_ebit_margin: f64,
    pub eva_wacc: f64,
    pub multiples: SectorMultiples,
    /// Risk-heuristic beta used when the record carries none.
    pub beta: f64,
    /// Annualised volatility for the risk heuristic.
    pub volatility: f64,
}

const INDUSTRIALS_MULTIPLES: SectorMultiples = SectorMultiples {
    pe: 18.0,
    pb: 3.0,
    ps: 2.0,
    ev_ebitda: 12.0,
};

pub static DEFAULT_PARAMS: SectorParams = SectorParams {
    dcf_growth: 0.08,
    dividend_growth: 0.05,
    residual_income_growth: 0.05,
    abnormal_earnings_growth: 0.04,
    eva_ebit_margin: 0.15,
    eva_wacc: 0.09,
    multiples: INDUSTRIALS_MULTIPLES,
    beta: 1.0,
    volatility: 0.22,
};

static TECHNOLOGY: SectorParams = SectorParams {
    dcf_growth: 0.18,
    dividend_growth: 0.08,
    residual_income_growth: 0.08,
    abnormal_earnings_growth: 0.06,
    eva_ebit_margin: 0.25,
    eva_wacc: 0.10,
    multiples: SectorMultiples {
        pe: 28.0,
        pb: 5.5,
        ps: 8.0,
        ev_ebitda: 22.0,
    },
    beta: 1.2,
    volatility: 0.25,
};

static FINANCIALS: SectorParams = SectorParams {
    dcf_growth: 0.08,
    dividend_growth: 0.05,
    residual_income_growth: 0.04,
    abnormal_earnings_growth: 0.03,
    eva_ebit_margin: 0.35,
    eva_wacc: 0.09,
    multiples: SectorMultiples {
        pe: 14.0,
        pb: 1.3,
        ps: 3.5,
        ev_ebitda: 12.0,
    },
    beta: 1.1,
    volatility: 0.20,
};

static HEALTHCARE: SectorParams = SectorParams {
    dcf_growth: 0.12,
    dividend_growth: 0.06,
    residual_income_growth: 0.06,
    abnormal_earnings_growth: 0.05,
    eva_ebit_margin: 0.20,
    eva_wacc: 0.085,
    multiples: SectorMultiples {
        pe: 22.0,
        pb: 4.5,
        ps: 5.0,
        ev_ebitda: 16.0,
    },
    beta: 0.8,
    volatility: 0.18,
};

static CONSUMER: SectorParams = SectorParams {
    dcf_growth: 0.06,
    dividend_growth: 0.04,
    residual_income_growth: 0.03,
    abnormal_earnings_growth: 0.03,
    eva_ebit_margin: 0.12,
    eva_wacc: 0.075,
    multiples: SectorMultiples {
        pe: 20.0,
        pb: 3.5,
        ps: 2.0,
        ev_ebitda: 14.0,
    },
    beta: 0.9,
    volatility: 0.15,
};

static ENERGY: SectorParams = SectorParams {
    dcf_growth: 0.04,
    dividend_growth: 0.03,
    residual_income_growth: 0.02,
    abnormal_earnings_growth: 0.02,
    eva_ebit_margin: 0.15,
    eva_wacc: 0.09,
    multiples: SectorMultiples {
        pe: 12.0,
        pb: 1.8,
        ps: 1.5,
        ev_ebitda: 7.0,
    },
    beta: 1.3,
    volatility: 0.30,
};

// Not listed in the risk tables; beta and volatility fall back to the defaults.
static INDUSTRIALS: SectorParams = SectorParams {
    dcf_growth: 0.07,
    dividend_growth: 0.04,
    residual_income_growth: 0.04,
    abnormal_earnings_growth: 0.03,
    eva_ebit_margin: 0.15,
    eva_wacc: 0.085,
    multiples: INDUSTRIALS_MULTIPLES,
    beta: 1.0,
    volatility: 0.22,
};

static AUTOMOTIVE: SectorParams = SectorParams {
    dcf_growth: 0.10,
    dividend_growth: 0.05,
    residual_income_growth: 0.05,
    abnormal_earnings_growth: 0.04,
    eva_ebit_margin: 0.15,
    eva_wacc: 0.09,
    multiples: SectorMultiples {
        pe: 15.0,
        pb: 1.5,
        ps: 0.8,
        ev_ebitda: 9.0,
    },
    beta: 1.4,
    volatility: 0.35,
};
