use census_geocode::adapters::source::address_source;
use census_geocode::core::accuracy::AccuracyReport;
use census_geocode::core::sampler::SampleParams;
use census_geocode::core::ConfigProvider;
use census_geocode::utils::{logger, validation::Validate};
use census_geocode::{
    AccuracyCliConfig, CensusGeocoder, GeocodeEngine, LocalStorage, Result, SamplingOptions, TomlConfig,
};
use clap::Parser;

/// Samples an address file, geocodes the sample and reports the match rate.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = AccuracyCliConfig::parse();

    logger::init_cli_logger(cli.verbose);
    tracing::info!("🚀 Starting geocoder accuracy check");

    let outcome = match &cli.config {
        Some(path) => match TomlConfig::from_file(path) {
            Ok(config) => run(&config, &cli).await,
            Err(e) => Err(e),
        },
        None => run(&cli, &cli).await,
    };

    match outcome {
        Ok(report) => println!("{}", report),
        Err(e) => {
            tracing::error!(
                "❌ Accuracy check failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    }

    Ok(())
}

async fn run<C: ConfigProvider + Validate>(
    config: &C,
    cli: &AccuracyCliConfig,
) -> Result<AccuracyReport> {
    config.validate()?;

    let input = cli.input.as_deref().or(config.input_path());
    let has_headers = config.input_has_headers() && !cli.no_header;
    let options = SamplingOptions {
        params: SampleParams {
            proportion: config.sample_proportion(),
            bound: config.sample_bound(),
        },
        seed: config.sample_seed(),
        sample_file: config.sample_file().to_string(),
    };

    let monitor_enabled = cli.monitor || config.monitoring_enabled();
    let engine = GeocodeEngine::new_with_monitoring(
        address_source(input, has_headers),
        LocalStorage::new(config.output_path().to_string()),
        CensusGeocoder::from_config(config)?,
        monitor_enabled,
    );
    engine.run_accuracy_check(&options).await
}
