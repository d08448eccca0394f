use crate::core::accuracy::AccuracyReport;
use crate::core::addresses::addresses_to_csv;
use crate::core::pipeline::{BatchOptions, BatchPipeline, BatchSummary};
use crate::core::sampler::{draw_sample, prop_sample_size, SampleParams};
use crate::domain::ports::{AddressSource, GeocodeClient, Storage};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

#[derive(Debug, Clone)]
pub struct SamplingOptions {
    pub params: SampleParams,
    pub seed: u64,
    pub sample_file: String,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            params: SampleParams::default(),
            seed: crate::core::sampler::DEFAULT_SAMPLE_SEED,
            sample_file: "sample_geo.csv".to_string(),
        }
    }
}

/// Wires an address source to a storage backend and a geocoder client.
pub struct GeocodeEngine<A: AddressSource, S: Storage, G: GeocodeClient> {
    source: A,
    storage: S,
    client: G,
    monitor_enabled: bool,
}

impl<A: AddressSource, S: Storage, G: GeocodeClient> GeocodeEngine<A, S, G> {
    pub fn new(source: A, storage: S, client: G) -> Self {
        Self {
            source,
            storage,
            client,
            monitor_enabled: false,
        }
    }

    pub fn new_with_monitoring(source: A, storage: S, client: G, monitor_enabled: bool) -> Self {
        Self {
            source,
            storage,
            client,
            monitor_enabled,
        }
    }

    pub async fn run_batch(self, options: BatchOptions) -> Result<BatchSummary> {
        tracing::info!("Starting batch geocode");
        let addresses = self.source.load().await?;

        let pipeline = BatchPipeline::new(self.storage, self.client, options)
            .with_monitoring(self.monitor_enabled);
        let summary = pipeline.run(&addresses).await?;

        tracing::info!(
            "Geocoded {} rows across {} chunk(s); output at {}",
            summary.rows_geocoded,
            summary.total_chunks,
            summary.output_path.display()
        );
        Ok(summary)
    }

    pub async fn run_accuracy_check(&self, options: &SamplingOptions) -> Result<AccuracyReport> {
        tracing::info!("Starting geocoder accuracy check");
        let monitor = SystemMonitor::new(self.monitor_enabled);
        let addresses = self.source.load().await?;

        let sample_size = prop_sample_size(addresses.len(), options.params);
        tracing::info!(
            "Sampling {} of {} addresses (p = {}, B = {}, seed = {})",
            sample_size,
            addresses.len(),
            options.params.proportion,
            options.params.bound,
            options.seed
        );
        let sample = draw_sample(&addresses, sample_size, options.seed);

        self.storage
            .write_file(&options.sample_file, &addresses_to_csv(&sample)?)
            .await?;

        let results = self
            .client
            .geocode_file(&self.storage.resolve(&options.sample_file))
            .await?;
        monitor.log_stats("Sample geocoded");
        monitor.log_final_stats();
        Ok(AccuracyReport::from_results(&results))
    }
}
