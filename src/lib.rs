pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{AccuracyCliConfig, CliConfig};
pub use config::toml_config::TomlConfig;

pub use adapters::http::CensusGeocoder;
pub use adapters::source::{FileAddressSource, InMemorySource, PromptAddressSource};
pub use adapters::storage::LocalStorage;
pub use core::engine::{GeocodeEngine, SamplingOptions};
pub use core::pipeline::{BatchOptions, BatchPipeline, BatchSummary};
pub use utils::error::{GeocodeError, Result};
