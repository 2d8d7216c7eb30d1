// Engine command-line entry point: drives one pricing session end to end.
use anyhow::{bail, Context, Result};
use clap::Parser;
use engine::config::CalculatorSettings;
use engine::data::csv_parser::{SAMPLE_CSV, SAMPLE_FILE_NAME};
use engine::services::{OfflineRateSource, OpenErApiSource, RateSource};
use engine::PricingSession;
use shared::Strategy;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "engine", version, about = "Localize product prices across countries using PPP data and live FX rates")]
struct Cli {
    /// Product CSV with a header row and at least one data row
    file: Option<PathBuf>,

    /// Currency the prices are in (defaults to the configured base currency)
    #[arg(long)]
    currency: Option<String>,

    /// ISO-3 code of the home country, when several share the currency
    #[arg(long)]
    home: Option<String>,

    /// Zero-based index of the product name column (inferred from headers otherwise)
    #[arg(long)]
    name_column: Option<usize>,

    /// Zero-based index of the price column (inferred from headers otherwise)
    #[arg(long)]
    price_column: Option<usize>,

    /// lazy, ratio, ppp or final
    #[arg(long)]
    strategy: Option<Strategy>,

    /// Product to show (defaults to the first valid row)
    #[arg(long)]
    product: Option<String>,

    /// Write the export CSV to this path
    #[arg(long, conflicts_with = "export_dir")]
    export: Option<PathBuf>,

    /// Write the export CSV into this directory under its default name
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Skip the live rate fetch; Lazy Conversion shows N/A
    #[arg(long)]
    offline: bool,

    /// JSON settings file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the sample product CSV to this path (a directory gets sample-products.csv)
    #[arg(long)]
    write_sample: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Some(target) = &cli.write_sample {
        let path = if target.is_dir() { target.join(SAMPLE_FILE_NAME) } else { target.clone() };
        std::fs::write(&path, SAMPLE_CSV).with_context(|| format!("Failed to write sample to {}", path.display()))?;
        info!("Sample CSV written to {}", path.display());
        if cli.file.is_none() {
            return Ok(());
        }
    }

    let Some(file) = cli.file.clone() else {
        bail!("No input file given. Pass a CSV path or use --write-sample to get a template.");
    };

    let settings = match &cli.config {
        Some(path) => CalculatorSettings::load_from_path(path),
        None => CalculatorSettings::load_default(),
    }
    .context("Failed to load calculator settings")?;

    let source = rate_source(&settings, cli.offline);

    let mut session = PricingSession::with_settings(settings, source);
    info!(session_id = %session.id(), "Starting Global Price Calculator session");

    // Step 1
    session.load_path(&file).context("Upload rejected")?;
    session.continue_to_configure()?;

    // Step 2
    if let Some(index) = cli.name_column {
        session.set_name_column(index)?;
    }
    if let Some(index) = cli.price_column {
        session.set_price_column(index)?;
    }
    if let Some(currency) = &cli.currency {
        session.select_currency(currency)?;
    }
    if let Some(home) = &cli.home {
        session.set_home_country(home)?;
    }
    if let Some(strategy) = cli.strategy {
        session.set_strategy(strategy);
    }
    let fetch = session.generate_prices().context("Cannot generate prices")?;

    // Step 3
    if let Some(name) = &cli.product {
        session.select_product(name)?;
    }
    let pending = fetch.map(|f| tokio::spawn(f.run()));

    // PPP-based strategies don't wait for the network.
    if !session.strategy().needs_rates() {
        print_grid(&session);
    }
    if let Some(handle) = pending {
        let outcome = handle.await.context("FX fetch task failed")?;
        session.apply_rates(outcome);
    }
    if session.strategy().needs_rates() {
        print_grid(&session);
    }
    if let Some(notice) = session.rates_notice() {
        warn!("{}", notice);
    }

    if let Some(path) = &cli.export {
        let export = session.export_selected()?;
        std::fs::write(path, &export.contents).with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Export written to {}", path.display());
    } else if let Some(dir) = &cli.export_dir {
        let export = session.export_selected()?;
        let path = export.write_to_dir(dir).with_context(|| format!("Failed to write into {}", dir.display()))?;
        info!("Export written to {}", path.display());
    }

    Ok(())
}

/// Live source unless offline. A client that fails to build degrades to the
/// offline source, same as a failed fetch.
fn rate_source(settings: &CalculatorSettings, offline: bool) -> Arc<dyn RateSource> {
    if offline {
        return Arc::new(OfflineRateSource);
    }
    match OpenErApiSource::new(settings) {
        Ok(source) => Arc::new(source),
        Err(e) => {
            warn!(error = %e, "Failed to build FX client, continuing without live rates");
            Arc::new(OfflineRateSource)
        }
    }
}

fn print_grid(session: &PricingSession) {
    let Some(product) = session.selected_product() else {
        return;
    };
    let home = session.home_country();
    println!(
        "{} · {} · {} {} ({})",
        product.name,
        engine::pricing::format_amount(product.price, session.base_currency()),
        home.flag(),
        home.name,
        session.base_currency()
    );
    println!("Strategy: {} ({})", session.strategy().label(), session.strategy().hint());
    let grid = session.result_grid();
    for cell in &grid {
        let marker = if cell.is_home { " HOME" } else { "" };
        let estimate = if cell.country.estimated { " *" } else { "" };
        println!(
            "  {} {:<16} {:<4} {:>16}{}{}",
            cell.country.flag(),
            cell.country.name,
            cell.country.currency,
            cell.display,
            estimate,
            marker
        );
    }
    if grid.iter().any(|c| c.country.estimated) {
        println!("  * PPP factor is an estimate");
    }
}
