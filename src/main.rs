use census_geocode::adapters::source::address_source;
use census_geocode::core::ConfigProvider;
use census_geocode::utils::{logger, validation::Validate};
use census_geocode::{
    BatchOptions, BatchSummary, CensusGeocoder, CliConfig, GeocodeEngine, GeocodeError,
    LocalStorage, Result, TomlConfig,
};
use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("🚀 Starting census-geocode");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let outcome = match &cli.config {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path) {
                Ok(config) => run(&config, &cli).await,
                Err(e) => Err(e),
            }
        }
        None => run(&cli, &cli).await,
    };

    match outcome {
        Ok(summary) => {
            tracing::info!("✅ Geocoding completed successfully!");
            println!("✅ Geocoded {} of {} addresses", summary.rows_geocoded, summary.total_rows);
            println!("📁 Output saved to: {}", summary.output_path.display());
        }
        Err(e) => exit_with(e),
    }

    Ok(())
}

async fn run<C: ConfigProvider + Validate>(config: &C, cli: &CliConfig) -> Result<BatchSummary> {
    config.validate()?;

    let input = cli.input.as_deref().or(config.input_path());
    let has_headers = config.input_has_headers() && !cli.no_header;
    let monitor_enabled = cli.monitor || config.monitoring_enabled();
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let client = CensusGeocoder::from_config(config)?;
    let engine = GeocodeEngine::new_with_monitoring(
        address_source(input, has_headers),
        storage,
        client,
        monitor_enabled,
    );

    engine
        .run_batch(BatchOptions::from_config(config, cli.resume))
        .await
}

fn exit_with(e: GeocodeError) -> ! {
    tracing::error!(
        "❌ Geocoding failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());
    std::process::exit(e.exit_code());
}
