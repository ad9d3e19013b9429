// Risk report binary
//
// Loads every configured source once, then prints warnings, the key
// findings and the combined-risk ranking (as CSV) for one selection.
// Usage: risk_report [--state STATE] [--threshold T]
// Sources come from RISK_*_URL variables or a RISK_CONFIG JSON file.

use clap::Parser;
use county_risk_scorer::export::{combined_csv, hazard_csv};
use county_risk_scorer::{
    DashboardConfig, DashboardData, DashboardView, Hazard, HttpFetcher, KeyFindings, LoadCache,
    Selection, StateSelection,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "risk_report")]
#[command(about = "County climate-risk report: key findings and ranked hazard tables")]
#[command(version = "0.1.0")]
struct Cli {
    /// State to report on, or "All"
    #[arg(long, env = "RISK_STATE", default_value = "All")]
    state: String,

    /// Minimum hazard risk score (inclusive)
    #[arg(long, env = "RISK_THRESHOLD", default_value_t = 5.0)]
    threshold: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "county_risk_scorer=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let state = StateSelection::parse(&cli.state);
    let threshold = cli.threshold;

    let config = DashboardConfig::from_env()?;
    tracing::info!("Configuration:");
    tracing::info!("  State: {}", state);
    tracing::info!("  Threshold: {}", threshold);
    tracing::info!("  Top N: {}", config.top_n);

    let fetcher = HttpFetcher::new();
    let cache = LoadCache::new(config.cache_capacity);
    let data = DashboardData::load_cached(&config, &fetcher, &cache);
    for warning in &data.warnings {
        eprintln!("warning: {}", warning);
    }

    let findings = KeyFindings::compute(&data.health, data.hazard(Hazard::Wildfire));
    println!("Key findings");
    println!("  {}", findings.asthma);
    println!("  {}", findings.wildfire);
    println!();

    let selection = Selection {
        state,
        hazards: Hazard::ALL.to_vec(),
        threshold,
        top_n: config.top_n,
        ..Selection::default()
    };
    let view = DashboardView::compute(&data, &selection);

    println!("{}", view.hazard_title);
    for hazard in &view.hazards {
        match &hazard.warning {
            Some(warning) => println!("{}: {}", hazard.hazard, warning),
            None => print!("{}", hazard_csv(hazard.hazard, &hazard.top)?),
        }
        println!();
    }

    println!("Combined Risk Score ({})", selection.state.scope_label());
    match &view.combined.warning {
        Some(warning) => println!("{}", warning),
        None => print!("{}", combined_csv(view.combined.outcome.rows())?),
    }

    Ok(())
}
