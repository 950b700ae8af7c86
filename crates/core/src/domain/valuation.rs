use crate::models::aeg::AegDetail;
use crate::models::dcf::DcfDetail;
use crate::models::ddm::DdmDetail;
use crate::models::eva::EvaDetail;
use crate::models::multiples::MultiplesDetail;
use crate::models::rim::RimDetail;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelId {
    Dcf,
    Ddm,
    Rim,
    Aeg,
    Eva,
    Multiples,
}

impl ModelId {
    pub const ALL: [ModelId; 6] = [
        ModelId::Dcf,
        ModelId::Ddm,
        ModelId::Rim,
        ModelId::Aeg,
        ModelId::Eva,
        ModelId::Multiples,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ModelId::Dcf => "dcf",
            ModelId::Ddm => "ddm",
            ModelId::Rim => "rim",
            ModelId::Aeg => "aeg",
            ModelId::Eva => "eva",
            ModelId::Multiples => "multiples",
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let key = s.trim().to_ascii_lowercase();
        ModelId::ALL
            .into_iter()
            .find(|m| m.as_str() == key)
            .ok_or_else(|| anyhow::anyhow!("unknown valuation model: {s}"))
    }
}

/// Why a model produced no value. Declining is an expected outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "field", rename_all = "snake_case")]
pub enum DeclineReason {
    MissingInput(&'static str),
    NonPositiveInput(&'static str),
    /// Discount rate does not exceed the perpetuity growth rate.
    DiscountNotAboveGrowth,
}

impl fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclineReason::MissingInput(field) => write!(f, "missing input: {field}"),
            DeclineReason::NonPositiveInput(field) => write!(f, "non-positive input: {field}"),
            DeclineReason::DiscountNotAboveGrowth => {
                write!(f, "discount rate does not exceed growth rate")
            }
        }
    }
}

/// Flag raised when a model took its degenerate branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueNote {
    /// Residual income is not positive; valued at a discount to book.
    ValueDestruction,
    /// No abnormal earnings growth; valued at book.
    NoAbnormalGrowth,
    EvaPositive,
    EvaNegative,
}

impl fmt::Display for ValueNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValueNote::ValueDestruction => "company destroys value: residual income is negative",
            ValueNote::NoAbnormalGrowth => "no abnormal earnings growth",
            ValueNote::EvaPositive => "positive EVA: creates value",
            ValueNote::EvaNegative => "negative EVA: destroys value",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum ModelDetail {
    Dcf(DcfDetail),
    Ddm(DdmDetail),
    Rim(RimDetail),
    Aeg(AegDetail),
    Eva(EvaDetail),
    Multiples(MultiplesDetail),
}

/// Output of one model that produced a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationResult {
    pub model: ModelId,
    pub value_per_share: f64,
    /// Percent difference between value and current price.
    pub upside: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<ValueNote>,
    pub detail: ModelDetail,
}

impl ValuationResult {
    pub fn dcf_detail(&self) -> Option<&DcfDetail> {
        match &self.detail {
            ModelDetail::Dcf(d) => Some(d),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelOutcome {
    Valued(ValuationResult),
    Declined {
        model: ModelId,
        reason: DeclineReason,
    },
}

impl ModelOutcome {
    pub fn model(&self) -> ModelId {
        match self {
            ModelOutcome::Valued(r) => r.model,
            ModelOutcome::Declined { model, .. } => *model,
        }
    }

    pub fn valued(&self) -> Option<&ValuationResult> {
        match self {
            ModelOutcome::Valued(r) => Some(r),
            ModelOutcome::Declined { .. } => None,
        }
    }

    pub fn value_per_share(&self) -> Option<f64> {
        self.valued().map(|r| r.value_per_share)
    }

    pub fn decline_reason(&self) -> Option<DeclineReason> {
        match self {
            ModelOutcome::Valued(_) => None,
            ModelOutcome::Declined { reason, .. } => Some(*reason),
        }
    }
}
