//! Print the customer spending report for a date range as JSON.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use storefront::domain::ReportWindow;
use storefront::reporting::render_report;
use storefront::{PersistenceState, StorefrontSettings};
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `storefront-report` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "storefront-report",
    about = "Rank customers by total order spend within a date range",
    version
)]
struct CliArgs {
    /// First day (`YYYY-MM-DD`) or instant (RFC 3339) of the range.
    #[arg(long, value_name = "date")]
    start: String,
    /// Last day (inclusive) or instant of the range.
    #[arg(long, value_name = "date")]
    end: String,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("failed to create Tokio runtime")?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let args = CliArgs::parse();
    let window = ReportWindow::parse(&args.start, &args.end).wrap_err("invalid report range")?;

    // Settings come from the environment and config files only; clap owns argv.
    let settings = StorefrontSettings::load_from_iter([OsString::from("storefront-report")])
        .wrap_err("failed to load storefront settings")?;
    let state = PersistenceState::connect(&settings, Arc::new(DefaultClock))
        .await
        .wrap_err_with(|| format!("failed to connect to {}", settings.database()))?;

    let rendered = render_report(&state.orders, window)
        .await
        .wrap_err("failed to generate report")?;

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{rendered}").wrap_err("failed to write report")?;
    Ok(())
}
