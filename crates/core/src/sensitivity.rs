//! WACC × growth sensitivity of the DCF value per share.

use crate::domain::fundamentals::Fundamentals;
use crate::models::dcf::{project, DcfDetail, DcfInputs};
use crate::models::upside_pct;
use anyhow::{ensure, Context};
use serde::Serialize;

/// Percentage-point offsets applied to both axes by default.
pub const DEFAULT_STEPS: [f64; 5] = [-2.0, -1.0, 0.0, 1.0, 2.0];
/// Upper bound on steps per axis; each cell re-runs the projection.
pub const MAX_GRID_STEPS: usize = 21;

/// Colour band for a cell's upside against the current price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsideBand {
    Strong,
    Attractive,
    Fair,
    Stretched,
    Overvalued,
}

impl UpsideBand {
    pub fn from_upside(upside: f64) -> Self {
        if upside >= 30.0 {
            UpsideBand::Strong
        } else if upside >= 15.0 {
            UpsideBand::Attractive
        } else if upside >= 0.0 {
            UpsideBand::Fair
        } else if upside > -15.0 {
            UpsideBand::Stretched
        } else {
            UpsideBand::Overvalued
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityCell {
    pub wacc: f64,
    pub growth: f64,
    /// Absent when the shifted WACC leaves no positive discount factor.
    pub value_per_share: Option<f64>,
    pub upside: Option<f64>,
    pub band: Option<UpsideBand>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityGrid {
    pub base_wacc: f64,
    pub base_growth: f64,
    pub wacc_steps: Vec<f64>,
    pub growth_steps: Vec<f64>,
    /// One row per WACC step, one cell per growth step.
    pub rows: Vec<Vec<SensitivityCell>>,
}

impl SensitivityGrid {
    pub fn cell(&self, wacc_step: usize, growth_step: usize) -> Option<&SensitivityCell> {
        self.rows.get(wacc_step)?.get(growth_step)
    }

    /// The cell at zero offset on both axes, when both step lists contain zero.
    pub fn center(&self) -> Option<&SensitivityCell> {
        let w = self.wacc_steps.iter().position(|s| *s == 0.0)?;
        let g = self.growth_steps.iter().position(|s| *s == 0.0)?;
        self.cell(w, g)
    }
}

/// Re-run the DCF projection at every (WACC, growth) offset around `dcf`,
/// reusing the base run's cash flow, shares and EBITDA. Steps are percentage
/// points, so a step of `1.0` moves the rate by 0.01.
pub fn sensitivity_grid(
    dcf: &DcfDetail,
    f: &Fundamentals,
    wacc_steps: &[f64],
    growth_steps: &[f64],
) -> anyhow::Result<SensitivityGrid> {
    ensure!(
        !wacc_steps.is_empty() && !growth_steps.is_empty(),
        "sensitivity steps must be non-empty"
    );
    ensure!(
        wacc_steps.len() <= MAX_GRID_STEPS && growth_steps.len() <= MAX_GRID_STEPS,
        "at most {MAX_GRID_STEPS} sensitivity steps per axis (got {} x {})",
        wacc_steps.len(),
        growth_steps.len()
    );
    ensure!(
        wacc_steps.iter().chain(growth_steps).all(|s| s.is_finite()),
        "sensitivity steps must be finite"
    );

    let inputs = DcfInputs::from_fundamentals(f)
        .map_err(|reason| anyhow::anyhow!(reason))
        .with_context(|| format!("{}: DCF inputs unavailable for sensitivity grid", f.ticker))?;

    let rows = wacc_steps
        .iter()
        .map(|ws| {
            let wacc = dcf.wacc + ws / 100.0;
            growth_steps
                .iter()
                .map(|gs| {
                    let growth = dcf.growth_rate + gs / 100.0;
                    let value_per_share =
                        (1.0 + wacc > 0.0).then(|| project(&inputs, wacc, growth).value_per_share);
                    let upside = value_per_share.map(|v| upside_pct(v, f.price));
                    SensitivityCell {
                        wacc,
                        growth,
                        value_per_share,
                        upside,
                        band: upside.map(UpsideBand::from_upside),
                    }
                })
                .collect()
        })
        .collect();

    Ok(SensitivityGrid {
        base_wacc: dcf.wacc,
        base_growth: dcf.growth_rate,
        wacc_steps: wacc_steps.to_vec(),
        growth_steps: growth_steps.to_vec(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fundamentals::fixtures::{apple, assert_close};
    use crate::models::dcf;

    fn base() -> (Fundamentals, f64, DcfDetail) {
        let f = apple();
        let r = dcf::value(&f).unwrap();
        let d = r.dcf_detail().unwrap().clone();
        (f, r.value_per_share, d)
    }

    #[test]
    fn center_cell_ties_out_to_base_dcf() {
        let (f, base_value, d) = base();
        let grid = sensitivity_grid(&d, &f, &DEFAULT_STEPS, &DEFAULT_STEPS).unwrap();
        assert_eq!(grid.rows.len(), 5);
        assert!(grid.rows.iter().all(|r| r.len() == 5));

        let center = grid.center().unwrap();
        assert_eq!(center.wacc, d.wacc);
        assert_eq!(center.growth, d.growth_rate);
        assert_close(center.value_per_share.unwrap(), base_value, 1e-6);
    }

    #[test]
    fn value_falls_with_wacc_and_rises_with_growth() {
        let (f, _, d) = base();
        let grid = sensitivity_grid(&d, &f, &DEFAULT_STEPS, &DEFAULT_STEPS).unwrap();
        let v = |w, g| grid.cell(w, g).unwrap().value_per_share.unwrap();
        for g in 0..5 {
            for w in 1..5 {
                assert!(v(w, g) < v(w - 1, g));
            }
        }
        for w in 0..5 {
            for g in 1..5 {
                assert!(v(w, g) > v(w, g - 1));
            }
        }
    }

    #[test]
    fn steps_are_percentage_points() {
        let (f, _, d) = base();
        let grid = sensitivity_grid(&d, &f, &[1.0], &[-2.0]).unwrap();
        let cell = grid.cell(0, 0).unwrap();
        assert_close(cell.wacc, d.wacc + 0.01, 1e-12);
        assert_close(cell.growth, d.growth_rate - 0.02, 1e-12);
        assert_eq!(cell.band, cell.upside.map(UpsideBand::from_upside));
        assert!(grid.center().is_none());
    }

    #[test]
    fn non_positive_discount_factor_leaves_cell_empty() {
        let (f, _, d) = base();
        let grid = sensitivity_grid(&d, &f, &[-500.0], &[0.0]).unwrap();
        assert_eq!(grid.cell(0, 0).unwrap().value_per_share, None);
    }

    #[test]
    fn rejects_empty_steps_and_unusable_inputs() {
        let (f, _, d) = base();
        assert!(sensitivity_grid(&d, &f, &[], &DEFAULT_STEPS).is_err());

        let max: Vec<f64> = (0..MAX_GRID_STEPS).map(|i| i as f64 * 0.1).collect();
        let too_many: Vec<f64> = (0..=MAX_GRID_STEPS).map(|i| i as f64 * 0.1).collect();
        assert!(sensitivity_grid(&d, &f, &max, &max).is_ok());
        assert!(sensitivity_grid(&d, &f, &too_many, &[0.0]).is_err());
        assert!(sensitivity_grid(&d, &f, &[0.0], &too_many).is_err());

        let mut no_fcf = f.clone();
        no_fcf.fcf = None;
        assert!(sensitivity_grid(&d, &no_fcf, &DEFAULT_STEPS, &DEFAULT_STEPS).is_err());
    }

    #[test]
    fn upside_bands() {
        assert_eq!(UpsideBand::from_upside(30.0), UpsideBand::Strong);
        assert_eq!(UpsideBand::from_upside(15.0), UpsideBand::Attractive);
        assert_eq!(UpsideBand::from_upside(0.0), UpsideBand::Fair);
        assert_eq!(UpsideBand::from_upside(-14.9), UpsideBand::Stretched);
        assert_eq!(UpsideBand::from_upside(-15.0), UpsideBand::Overvalued);
    }
}
