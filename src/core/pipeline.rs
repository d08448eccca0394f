use crate::core::addresses::addresses_to_csv;
use crate::core::checkpoint::CheckpointStore;
use crate::core::chunk::ChunkPlan;
use crate::domain::model::{AddressRecord, MAX_BATCH_ROWS};
use crate::domain::ports::{ConfigProvider, GeocodeClient, Storage};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::path::PathBuf;

pub const DEFAULT_OUTPUT_FILE: &str = "geocode_output.csv";
pub const DEFAULT_WORKING_FILE: &str = "temp_geo.csv";
pub const DEFAULT_STATE_FILE: &str = "geocode_output.state.json";

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub chunk_size: usize,
    pub working_file: String,
    pub output_file: String,
    pub state_file: String,
    pub resume: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            chunk_size: MAX_BATCH_ROWS,
            working_file: DEFAULT_WORKING_FILE.to_string(),
            output_file: DEFAULT_OUTPUT_FILE.to_string(),
            state_file: DEFAULT_STATE_FILE.to_string(),
            resume: false,
        }
    }
}

impl BatchOptions {
    pub fn from_config<C: ConfigProvider>(config: &C, resume: bool) -> Self {
        Self {
            chunk_size: config.chunk_size(),
            working_file: config.working_file().to_string(),
            output_file: config.output_file().to_string(),
            state_file: config.state_file().to_string(),
            resume,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub total_rows: usize,
    pub total_chunks: usize,
    pub resumed_from: usize,
    pub chunks_processed: usize,
    pub rows_geocoded: usize,
    pub output_path: PathBuf,
}

/// Splits the address table into batch-sized chunks and geocodes them one at a
/// time, committing each chunk's results to the output before starting the next.
pub struct BatchPipeline<S: Storage, G: GeocodeClient> {
    storage: S,
    client: G,
    options: BatchOptions,
    monitor: SystemMonitor,
}

impl<S: Storage, G: GeocodeClient> BatchPipeline<S, G> {
    pub fn new(storage: S, client: G, options: BatchOptions) -> Self {
        Self {
            storage,
            client,
            options,
            monitor: SystemMonitor::default(),
        }
    }

    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = SystemMonitor::new(enabled);
        self
    }

    pub async fn run(&self, addresses: &[AddressRecord]) -> Result<BatchSummary> {
        let plan = ChunkPlan::new(addresses.len(), self.options.chunk_size)?;
        let checkpoint = CheckpointStore::new(
            &self.storage,
            &self.options.output_file,
            &self.options.state_file,
        );
        let output_path = self.storage.resolve(&self.options.output_file);

        let mut state = if self.options.resume {
            checkpoint.resume(&plan).await?
        } else {
            checkpoint.start(&plan).await?
        };
        let resumed_from = state.completed_chunks;

        tracing::info!(
            "Geocoding {} addresses in {} chunk(s) of up to {} rows",
            plan.total_rows(),
            plan.total_chunks(),
            plan.chunk_size()
        );

        let working_path = self.storage.resolve(&self.options.working_file);
        for range in plan.ranges().skip(resumed_from) {
            let payload = addresses_to_csv(&addresses[range.start..range.end])?;
            self.storage
                .write_file(&self.options.working_file, &payload)
                .await?;

            tracing::debug!(
                "Submitting chunk {} (rows {}..{})",
                range.index + 1,
                range.start,
                range.end
            );
            let results = self.client.geocode_file(&working_path).await?;
            if results.len() != range.len() {
                tracing::warn!(
                    "Chunk {} returned {} rows for {} addresses",
                    range.index + 1,
                    results.len(),
                    range.len()
                );
            }

            checkpoint.commit(&mut state, &results).await?;

            tracing::info!(
                "Chunk {}/{} geocoded ({} rows so far)",
                state.completed_chunks,
                state.total_chunks,
                state.rows_written
            );
            println!("Loops Completed: {}", state.completed_chunks);
            println!("Total Loops Needed: {}", state.total_chunks);
            println!("Geocoded file available under \"{}\"", output_path.display());
            println!("Exit program at any time and current output will be available");

            self.monitor.log_stats(&format!(
                "Chunk {}/{}",
                state.completed_chunks, state.total_chunks
            ));
        }

        if self
            .storage
            .file_len(&self.options.working_file)
            .await?
            .is_some()
        {
            self.storage.remove_file(&self.options.working_file).await?;
        }
        self.monitor.log_final_stats();

        Ok(BatchSummary {
            total_rows: plan.total_rows(),
            total_chunks: plan.total_chunks(),
            resumed_from,
            chunks_processed: state.completed_chunks - resumed_from,
            rows_geocoded: state.rows_written,
            output_path,
        })
    }
}
