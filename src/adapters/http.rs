use crate::core::response::parse_response;
use crate::domain::model::GeocodeResult;
use crate::domain::ports::{ConfigProvider, GeocodeClient};
use crate::utils::error::{GeocodeError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str =
    "https://geocoding.geo.census.gov/geocoder/locations/addressbatch?form";
pub const DEFAULT_BENCHMARK: &str = "Public_AR_Current";
pub const DEFAULT_RETURN_TYPE: &str = "locations";

/// Client for the Census Bureau batch geocoder.
pub struct CensusGeocoder {
    client: Client,
    endpoint: String,
    benchmark: String,
    return_type: String,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl CensusGeocoder {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            benchmark: DEFAULT_BENCHMARK.to_string(),
            return_type: DEFAULT_RETURN_TYPE.to_string(),
            retry_attempts: 0,
            retry_delay: Duration::from_secs(5),
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: config.api_endpoint().to_string(),
            benchmark: config.benchmark().to_string(),
            return_type: config.return_type().to_string(),
            retry_attempts: config.retry_attempts(),
            retry_delay: config.retry_delay(),
        })
    }

    pub fn with_retries(mut self, attempts: u32, delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay = delay;
        self
    }

    async fn post_batch(&self, file_name: &str, payload: &[u8]) -> Result<Vec<u8>> {
        let part = Part::bytes(payload.to_vec())
            .file_name(file_name.to_string())
            .mime_str("text/csv")?;
        let form = Form::new()
            .part("addressFile", part)
            .text("returntype", self.return_type.clone())
            .text("benchmark", self.benchmark.clone());

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;
        tracing::debug!("Geocoder response status: {}", response.status());

        let body = response.error_for_status()?.bytes().await?;
        Ok(body.to_vec())
    }

    async fn post_with_retry(&self, file_name: &str, payload: &[u8]) -> Result<Vec<u8>> {
        let mut attempt = 0;
        loop {
            match self.post_batch(file_name, payload).await {
                Err(GeocodeError::ApiError(e))
                    if attempt < self.retry_attempts && is_retryable(&e) =>
                {
                    attempt += 1;
                    tracing::warn!(
                        "Geocoder request failed ({}), retry {}/{} in {:?}",
                        e,
                        attempt,
                        self.retry_attempts,
                        self.retry_delay
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                other => return other,
            }
        }
    }
}

fn is_retryable(error: &reqwest::Error) -> bool {
    error.is_connect()
        || error.is_timeout()
        || error.status().is_some_and(|s| s.is_server_error())
}

#[async_trait]
impl GeocodeClient for CensusGeocoder {
    async fn geocode_file(&self, path: &Path) -> Result<Vec<GeocodeResult>> {
        let payload = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("addresses.csv");

        tracing::debug!(
            "Uploading {} ({} bytes) to {}",
            file_name,
            payload.len(),
            self.endpoint
        );
        let body = self.post_with_retry(file_name, &payload).await?;
        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use tempfile::TempDir;

    const RESPONSE: &str = "\"1\",\"4600 Silver Hill Rd, Washington, DC, 20233\",\"Match\",\"Exact\",\"4600 SILVER HILL RD, WASHINGTON, DC, 20233\",\"-76.92744,38.845985\",\"76355984\",\"L\"\n\"2\",\"1 Nowhere Ln, Nowhere, ZZ, 00000\",\"No_Match\"\n";

    fn write_batch(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("temp_geo.csv");
        std::fs::write(
            &path,
            "1,4600 Silver Hill Rd,Washington,DC,20233\n2,1 Nowhere Ln,Nowhere,ZZ,00000\n",
        )
        .unwrap();
        path
    }

    #[tokio::test]
    async fn test_geocode_file_posts_multipart_form() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/geocoder/locations/addressbatch")
                .body_contains("name=\"addressFile\"")
                .body_contains("Public_AR_Current")
                .body_contains("locations")
                .body_contains("4600 Silver Hill Rd");
            then.status(200)
                .header("Content-Type", "text/csv")
                .body(RESPONSE);
        });

        let dir = TempDir::new().unwrap();
        let path = write_batch(&dir);
        let geocoder = CensusGeocoder::new(server.url("/geocoder/locations/addressbatch"));

        let results = geocoder.geocode_file(&path).await.unwrap();

        api_mock.assert();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].match_type.as_deref(), Some("Exact"));
        assert_eq!(results[1].match_indicator.as_deref(), Some("No_Match"));
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried_by_default() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/batch");
            then.status(500);
        });

        let dir = TempDir::new().unwrap();
        let path = write_batch(&dir);
        let geocoder = CensusGeocoder::new(server.url("/batch"));

        let err = geocoder.geocode_file(&path).await.unwrap_err();

        api_mock.assert_hits(1);
        assert!(matches!(err, GeocodeError::ApiError(_)));
    }

    #[tokio::test]
    async fn test_server_error_retried_when_configured() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/batch");
            then.status(503);
        });

        let dir = TempDir::new().unwrap();
        let path = write_batch(&dir);
        let geocoder = CensusGeocoder::new(server.url("/batch"))
            .with_retries(2, Duration::from_millis(10));

        assert!(geocoder.geocode_file(&path).await.is_err());
        api_mock.assert_hits(3);
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/batch");
            then.status(400);
        });

        let dir = TempDir::new().unwrap();
        let path = write_batch(&dir);
        let geocoder = CensusGeocoder::new(server.url("/batch"))
            .with_retries(3, Duration::from_millis(10));

        assert!(geocoder.geocode_file(&path).await.is_err());
        api_mock.assert_hits(1);
    }

    #[tokio::test]
    async fn test_missing_upload_file_is_io_error() {
        let geocoder = CensusGeocoder::new("http://127.0.0.1:9/batch");
        let err = geocoder
            .geocode_file(Path::new("/nonexistent/temp_geo.csv"))
            .await
            .unwrap_err();
        assert!(matches!(err, GeocodeError::IoError(_)));
    }
}
