pub mod aggregate;
pub mod domain;
pub mod models;
pub mod report;
pub mod risk;
pub mod sector;
pub mod sensitivity;

pub mod config {
    use crate::aggregate::WeightingPolicy;
    use crate::report::ReportOptions;
    use crate::risk::{RiskConfig, RiskNoise};
    use crate::sensitivity::{DEFAULT_STEPS, MAX_GRID_STEPS};
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub valuation_policy: WeightingPolicy,
        pub risk_noise_seed: Option<u64>,
        /// Percentage-point offsets for both sensitivity axes.
        pub sensitivity_steps: Vec<f64>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Self::from_lookup(|key| std::env::var(key).ok())
        }

        pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
            let valuation_policy = match lookup("VALUATION_POLICY") {
                Some(v) => v
                    .parse::<WeightingPolicy>()
                    .context("invalid VALUATION_POLICY")?,
                None => WeightingPolicy::default(),
            };
            let risk_noise_seed = lookup("RISK_NOISE_SEED")
                .map(|v| v.trim().parse::<u64>())
                .transpose()
                .context("RISK_NOISE_SEED must be an unsigned integer")?;
            let sensitivity_steps = match lookup("SENSITIVITY_STEPS_PP") {
                Some(v) => parse_steps(&v).context("invalid SENSITIVITY_STEPS_PP")?,
                None => DEFAULT_STEPS.to_vec(),
            };

            Ok(Self {
                sentry_dsn: lookup("SENTRY_DSN").filter(|s| !s.trim().is_empty()),
                valuation_policy,
                risk_noise_seed,
                sensitivity_steps,
            })
        }

        pub fn risk_config(&self) -> RiskConfig {
            RiskConfig {
                noise: self.risk_noise_seed.map(RiskNoise::seeded),
            }
        }

        pub fn report_options(&self, with_grid: bool) -> ReportOptions {
            ReportOptions {
                policy: self.valuation_policy,
                risk: self.risk_config(),
                grid_steps: with_grid.then(|| self.sensitivity_steps.clone()),
            }
        }
    }

    /// Comma-separated percentage-point offsets, e.g. `-2,-1,0,1,2`.
    pub fn parse_steps(s: &str) -> anyhow::Result<Vec<f64>> {
        let steps = s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| -> anyhow::Result<f64> {
                let v = p.parse::<f64>().with_context(|| format!("not a number: {p}"))?;
                anyhow::ensure!(v.is_finite(), "step must be finite: {p}");
                Ok(v)
            })
            .collect::<anyhow::Result<Vec<f64>>>()?;
        anyhow::ensure!(!steps.is_empty(), "at least one step is required");
        anyhow::ensure!(
            steps.len() <= MAX_GRID_STEPS,
            "at most {MAX_GRID_STEPS} steps are allowed (got {})",
            steps.len()
        );
        Ok(steps)
    }

}
