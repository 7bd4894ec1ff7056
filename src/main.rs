use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::error;

use price_tracker::history::latest_prices;
use price_tracker::{PriceLog, SiteRules, Tracker, TrackerConfig, TrackerError};

#[derive(Parser)]
#[command(name = "price-tracker", about = "Track product prices into a CSV log")]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    // サブコマンド省略時は `run` として扱う
    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every configured product once and append to the log
    Run(RunArgs),
    /// Show the latest valid price per product
    Report(ReportArgs),
}

#[derive(Args)]
struct RunArgs {
    #[arg(long, default_value = "products.csv")]
    products: PathBuf,
    #[arg(long, default_value = "price_data.csv")]
    log: PathBuf,
    /// JSON file with cookie-consent and fallback selectors
    #[arg(long)]
    site_rules: Option<PathBuf>,
    /// Polite delay between products
    #[arg(long, default_value_t = 2)]
    delay_secs: u64,
    /// Show the browser window for dynamic products
    #[arg(long, default_value_t = false)]
    headful: bool,
    /// Log a screenshot when a dynamic fetch fails
    #[arg(long, default_value_t = false)]
    debug: bool,
}

#[derive(Args)]
struct ReportArgs {
    #[arg(long, default_value = "price_data.csv")]
    log: PathBuf,
}

/// RUST_LOG（既定 info）と PRICE_TRACKER_LOG_FORMAT=json に従ってログを初期化
fn init_tracing() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer().with_target(false);
    let builder = tracing_subscriber::registry().with(filter);

    match std::env::var("PRICE_TRACKER_LOG_FORMAT").as_deref() {
        Ok("json") => {
            let _ = builder.with(fmt_layer.json().flatten_event(true)).try_init();
        }
        _ => {
            let _ = builder.with(fmt_layer.compact()).try_init();
        }
    }
}

async fn run(args: RunArgs) -> Result<(), TrackerError> {
    let mut config = TrackerConfig::new(args.products, args.log)
        .with_polite_delay(Duration::from_secs(args.delay_secs))
        .with_headless(!args.headful)
        .with_debug(args.debug);

    if let Some(path) = args.site_rules {
        config = config.with_site_rules(SiteRules::load(path)?);
    }

    let mut tracker = Tracker::new(config)?;
    tracker.run().await?;
    Ok(())
}

fn report(args: ReportArgs) -> Result<(), TrackerError> {
    let records = PriceLog::new(args.log).read_all()?;

    for latest in latest_prices(&records) {
        if let Some(price) = latest.formatted_price() {
            println!("{:<40} {:>12}  ({})", latest.product, price, latest.date);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::Run(cli.run)) {
        Commands::Run(args) => run(args).await,
        Commands::Report(args) => report(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
