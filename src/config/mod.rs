pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_config::{AccuracyCliConfig, CliConfig};

#[cfg(feature = "cli")]
mod cli_config {
    use crate::adapters::http::{DEFAULT_BENCHMARK, DEFAULT_ENDPOINT, DEFAULT_RETURN_TYPE};
    use crate::config::toml_config::validate_provider;
    use crate::core::pipeline::{DEFAULT_OUTPUT_FILE, DEFAULT_STATE_FILE, DEFAULT_WORKING_FILE};
    use crate::core::ConfigProvider;
    use crate::utils::error::Result;
    use crate::utils::validation::Validate;
    use clap::Parser;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "census-geocode")]
    #[command(about = "Batch geocode addresses through the US Census Bureau geocoder")]
    pub struct CliConfig {
        /// Pipe-delimited address file (ID|street|city|state|zip); prompted for when omitted
        #[arg(long)]
        pub input: Option<String>,

        /// The address file has no header row
        #[arg(long)]
        pub no_header: bool,

        /// TOML configuration file; replaces the geocoder/output flags below
        #[arg(long)]
        pub config: Option<String>,

        #[arg(long, default_value = DEFAULT_ENDPOINT)]
        pub endpoint: String,

        #[arg(long, default_value = DEFAULT_BENCHMARK)]
        pub benchmark: String,

        #[arg(long)]
        pub timeout_seconds: Option<u64>,

        #[arg(long, default_value = "0")]
        pub retry_attempts: u32,

        #[arg(long, default_value = "5")]
        pub retry_delay_seconds: u64,

        #[arg(long, default_value = ".")]
        pub output_path: String,

        #[arg(long, default_value = "geocode_output.csv")]
        pub output_file: String,

        #[arg(long, default_value = "temp_geo.csv")]
        pub working_file: String,

        #[arg(long, default_value = "geocode_output.state.json")]
        pub state_file: String,

        #[arg(long, default_value = "sample_geo.csv")]
        pub sample_file: String,

        /// Rows per upload (the geocoder accepts at most 10000)
        #[arg(long, default_value = "10000")]
        pub chunk_size: usize,

        /// Continue from the last completed chunk recorded in the state file
        #[arg(long)]
        pub resume: bool,

        #[arg(long, default_value = "0.5")]
        pub proportion: f64,

        #[arg(long, default_value = "0.02")]
        pub bound: f64,

        #[arg(long, default_value = "133")]
        pub seed: u64,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log CPU and memory usage after each chunk")]
        pub monitor: bool,
    }

    impl ConfigProvider for CliConfig {
        fn api_endpoint(&self) -> &str {
            &self.endpoint
        }

        fn benchmark(&self) -> &str {
            &self.benchmark
        }

        fn return_type(&self) -> &str {
            DEFAULT_RETURN_TYPE
        }

        fn request_timeout(&self) -> Option<Duration> {
            self.timeout_seconds.map(Duration::from_secs)
        }

        fn retry_attempts(&self) -> u32 {
            self.retry_attempts
        }

        fn retry_delay(&self) -> Duration {
            Duration::from_secs(self.retry_delay_seconds)
        }

        fn input_path(&self) -> Option<&str> {
            self.input.as_deref()
        }

        fn input_has_headers(&self) -> bool {
            !self.no_header
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_file(&self) -> &str {
            &self.output_file
        }

        fn working_file(&self) -> &str {
            &self.working_file
        }

        fn state_file(&self) -> &str {
            &self.state_file
        }

        fn sample_file(&self) -> &str {
            &self.sample_file
        }

        fn chunk_size(&self) -> usize {
            self.chunk_size
        }

        fn sample_proportion(&self) -> f64 {
            self.proportion
        }

        fn sample_bound(&self) -> f64 {
            self.bound
        }

        fn sample_seed(&self) -> u64 {
            self.seed
        }

        fn monitoring_enabled(&self) -> bool {
            self.monitor
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validate_provider(self)
        }
    }

    /// Flags of the accuracy check: no chunking, output or resume options.
    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "geocode_accuracy")]
    #[command(about = "Geocode a random sample of an address file and report the match rate")]
    pub struct AccuracyCliConfig {
        /// Pipe-delimited address file (ID|street|city|state|zip); prompted for when omitted
        #[arg(long)]
        pub input: Option<String>,

        /// The address file has no header row
        #[arg(long)]
        pub no_header: bool,

        /// TOML configuration file; replaces the geocoder/sampling flags below
        #[arg(long)]
        pub config: Option<String>,

        #[arg(long, default_value = DEFAULT_ENDPOINT)]
        pub endpoint: String,

        #[arg(long, default_value = DEFAULT_BENCHMARK)]
        pub benchmark: String,

        #[arg(long)]
        pub timeout_seconds: Option<u64>,

        #[arg(long, default_value = "0")]
        pub retry_attempts: u32,

        #[arg(long, default_value = "5")]
        pub retry_delay_seconds: u64,

        /// Directory the sample file is written to
        #[arg(long, default_value = ".")]
        pub output_path: String,

        #[arg(long, default_value = "sample_geo.csv")]
        pub sample_file: String,

        /// Expected match proportion p
        #[arg(long, default_value = "0.5")]
        pub proportion: f64,

        /// Bound B on the error of estimation
        #[arg(long, default_value = "0.02")]
        pub bound: f64,

        #[arg(long, default_value = "133")]
        pub seed: u64,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log CPU and memory usage after the sample is geocoded")]
        pub monitor: bool,
    }

    impl ConfigProvider for AccuracyCliConfig {
        fn api_endpoint(&self) -> &str {
            &self.endpoint
        }

        fn benchmark(&self) -> &str {
            &self.benchmark
        }

        fn return_type(&self) -> &str {
            DEFAULT_RETURN_TYPE
        }

        fn request_timeout(&self) -> Option<Duration> {
            self.timeout_seconds.map(Duration::from_secs)
        }

        fn retry_attempts(&self) -> u32 {
            self.retry_attempts
        }

        fn retry_delay(&self) -> Duration {
            Duration::from_secs(self.retry_delay_seconds)
        }

        fn input_path(&self) -> Option<&str> {
            self.input.as_deref()
        }

        fn input_has_headers(&self) -> bool {
            !self.no_header
        }

        fn output_path(&self) -> &str {
            &self.output_path
        }

        fn output_file(&self) -> &str {
            DEFAULT_OUTPUT_FILE
        }

        fn working_file(&self) -> &str {
            DEFAULT_WORKING_FILE
        }

        fn state_file(&self) -> &str {
            DEFAULT_STATE_FILE
        }

        fn sample_file(&self) -> &str {
            &self.sample_file
        }

        fn chunk_size(&self) -> usize {
            crate::domain::model::MAX_BATCH_ROWS
        }

        fn sample_proportion(&self) -> f64 {
            self.proportion
        }

        fn sample_bound(&self) -> f64 {
            self.bound
        }

        fn sample_seed(&self) -> u64 {
            self.seed
        }

        fn monitoring_enabled(&self) -> bool {
            self.monitor
        }
    }

    impl Validate for AccuracyCliConfig {
        fn validate(&self) -> Result<()> {
            validate_provider(self)
        }
    }

}
