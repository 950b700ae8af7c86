use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fairvalue_core::aggregate::WeightingPolicy;
use fairvalue_core::domain::contract::FundamentalsRecord;
use fairvalue_core::domain::screen::ScreenSnapshot;
use fairvalue_core::report::{self, ReportOptions};
use fairvalue_core::risk::RiskNoise;

mod universe;

#[derive(Debug, Parser)]
#[command(name = "fairvalue_worker")]
struct Args {
    /// JSON file holding an array of fundamentals records.
    #[arg(long)]
    input: PathBuf,

    /// Weighting policy (advanced|auto). Defaults to VALUATION_POLICY.
    #[arg(long)]
    policy: Option<String>,

    /// Only value these tickers. Repeatable.
    #[arg(long)]
    ticker: Vec<String>,

    /// Attach a DCF sensitivity grid to each report.
    #[arg(long)]
    with_grid: bool,

    /// Seed for beta/volatility jitter in the risk profile. Defaults to RISK_NOISE_SEED.
    #[arg(long)]
    noise_seed: Option<u64>,

    /// Keep only the N best-ranked tickers.
    #[arg(long)]
    top: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = fairvalue_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let mut opts = settings.report_options(args.with_grid);
    if let Some(p) = args.policy.as_deref() {
        opts.policy = p.parse::<WeightingPolicy>().context("invalid --policy")?;
    }
    if let Some(seed) = args.noise_seed {
        opts.risk.noise = Some(RiskNoise::seeded(seed));
    }

    let records = universe::load_records(&args.input).await?;
    let records = universe::select(records, &args.ticker);
    anyhow::ensure!(!records.is_empty(), "no records left after --ticker filter");

    tracing::info!(
        input = %args.input.display(),
        records_len = records.len(),
        policy = %opts.policy,
        with_grid = args.with_grid,
        "screening fundamentals"
    );

    let mut snapshot = run_screen(records, opts).await;
    if let Some(top) = args.top {
        snapshot.items.truncate(top);
    }

    tracing::info!(
        valued = snapshot.items.len(),
        rejected = snapshot.rejected.len(),
        "screen complete"
    );

    let out = serde_json::to_string_pretty(&snapshot).context("serialize snapshot failed")?;
    println!("{out}");
    Ok(())
}

/// Value every record on the blocking pool and rank the results. Produces the
/// same snapshot as `report::screen`, apart from `generated_at`.
async fn run_screen(records: Vec<FundamentalsRecord>, opts: ReportOptions) -> ScreenSnapshot {
    let opts = Arc::new(opts);
    let mut tasks = JoinSet::new();
    for record in records {
        let opts = Arc::clone(&opts);
        tasks.spawn_blocking(move || report::screen_record(record, &opts));
    }

    let mut reports = Vec::new();
    let mut rejected = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(report)) => reports.push(report),
            Ok(Err(reject)) => rejected.push(reject),
            Err(join_err) => {
                let err = anyhow::Error::new(join_err).context("valuation task failed");
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "valuation task failed");
            }
        }
    }

    report::rank(opts.policy, &reports, rejected)
}

fn init_sentry(settings: &fairvalue_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    const BATCH: &str = r#"[
        {"ticker": "rich", "price": 500.0, "eps": 2.0, "bookValue": 10.0},
        {"ticker": "zz", "price": -1.0},
        {"ticker": "empty", "price": 50.0},
        {"ticker": "cheap", "price": 10.0, "eps": 2.0, "bookValue": 10.0},
        {"ticker": "", "price": 10.0},
        {"ticker": "mid", "price": 40.0, "eps": 2.0, "bookValue": 10.0, "dividend": 1.0}
    ]"#;

    fn batch() -> Vec<FundamentalsRecord> {
        universe::parse_records(BATCH).unwrap()
    }

    #[tokio::test]
    async fn ranks_a_mixed_batch_and_sorts_rejects() {
        let snap = run_screen(batch(), ReportOptions::default()).await;

        let tickers: Vec<&str> = snap.items.iter().map(|i| i.ticker.as_str()).collect();
        assert_eq!(tickers.len(), 4);
        assert_eq!(tickers[0], "CHEAP");
        assert_eq!(tickers[3], "EMPTY");
        let ranks: Vec<i32> = snap.items.iter().map(|i| i.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);

        let rejected: Vec<&str> = snap.rejected.iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(rejected, vec!["", "zz"]);
    }

    #[tokio::test]
    async fn matches_the_sequential_screener() {
        for policy in WeightingPolicy::ALL {
            let opts = ReportOptions {
                policy,
                grid_steps: Some(vec![-1.0, 0.0, 1.0]),
                ..Default::default()
            };
            let sequential = report::screen(batch(), &opts);
            let pooled = run_screen(batch(), opts).await;

            assert_eq!(pooled.policy, sequential.policy);
            assert_eq!(pooled.items, sequential.items);
            assert_eq!(pooled.rejected, sequential.rejected);
        }
    }
}
