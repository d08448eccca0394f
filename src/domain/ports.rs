use crate::domain::model::{AddressTable, GeocodeResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn append_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn truncate_file(
        &self,
        path: &str,
        len: u64,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn rename_file(
        &self,
        from: &str,
        to: &str,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn remove_file(&self, path: &str) -> impl std::future::Future<Output = Result<()>> + Send;
    /// `None` when the file does not exist.
    fn file_len(&self, path: &str)
        -> impl std::future::Future<Output = Result<Option<u64>>> + Send;
    fn resolve(&self, path: &str) -> PathBuf;
}

/// Where the address table comes from: a file, an interactive prompt, or memory.
#[async_trait]
pub trait AddressSource: Send + Sync {
    async fn load(&self) -> Result<AddressTable>;
}

/// Uploads a headerless address CSV and returns the parsed response rows.
#[async_trait]
pub trait GeocodeClient: Send + Sync {
    async fn geocode_file(&self, path: &Path) -> Result<Vec<GeocodeResult>>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn benchmark(&self) -> &str;
    fn return_type(&self) -> &str;
    fn request_timeout(&self) -> Option<Duration>;
    fn retry_attempts(&self) -> u32;
    fn retry_delay(&self) -> Duration;

    fn input_path(&self) -> Option<&str>;
    fn input_has_headers(&self) -> bool;

    fn output_path(&self) -> &str;
    fn output_file(&self) -> &str;
    fn working_file(&self) -> &str;
    fn state_file(&self) -> &str;
    fn sample_file(&self) -> &str;

    fn chunk_size(&self) -> usize;

    fn sample_proportion(&self) -> f64;
    fn sample_bound(&self) -> f64;
    fn sample_seed(&self) -> u64;

    fn monitoring_enabled(&self) -> bool;
}
