use crate::adapters::http::{DEFAULT_BENCHMARK, DEFAULT_ENDPOINT, DEFAULT_RETURN_TYPE};
use crate::core::ConfigProvider;
use crate::domain::model::MAX_BATCH_ROWS;
use crate::utils::error::{GeocodeError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_unit_interval,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub source: SourceConfig,
    pub input: InputConfig,
    pub batch: BatchConfig,
    pub output: OutputConfig,
    pub sampling: SamplingConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub endpoint: String,
    pub benchmark: String,
    pub return_type: String,
    pub timeout_seconds: Option<u64>,
    pub retry_attempts: u32,
    pub retry_delay_seconds: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            benchmark: DEFAULT_BENCHMARK.to_string(),
            return_type: DEFAULT_RETURN_TYPE.to_string(),
            timeout_seconds: None,
            retry_attempts: 0,
            retry_delay_seconds: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub path: Option<String>,
    pub has_headers: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: None,
            has_headers: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub chunk_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: MAX_BATCH_ROWS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
    pub output_file: String,
    pub working_file: String,
    pub state_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: ".".to_string(),
            output_file: "geocode_output.csv".to_string(),
            working_file: "temp_geo.csv".to_string(),
            state_file: "geocode_output.state.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub proportion: f64,
    pub bound: f64,
    pub seed: u64,
    pub sample_file: String,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            proportion: 0.5,
            bound: 0.02,
            seed: crate::core::sampler::DEFAULT_SAMPLE_SEED,
            sample_file: "sample_geo.csv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GeocodeError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| GeocodeError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GEOCODER_ENDPOINT})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| GeocodeError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for TomlConfig {
    fn api_endpoint(&self) -> &str {
        &self.source.endpoint
    }

    fn benchmark(&self) -> &str {
        &self.source.benchmark
    }

    fn return_type(&self) -> &str {
        &self.source.return_type
    }

    fn request_timeout(&self) -> Option<Duration> {
        self.source.timeout_seconds.map(Duration::from_secs)
    }

    fn retry_attempts(&self) -> u32 {
        self.source.retry_attempts
    }

    fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.source.retry_delay_seconds)
    }

    fn input_path(&self) -> Option<&str> {
        self.input.path.as_deref()
    }

    fn input_has_headers(&self) -> bool {
        self.input.has_headers
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }

    fn output_file(&self) -> &str {
        &self.output.output_file
    }

    fn working_file(&self) -> &str {
        &self.output.working_file
    }

    fn state_file(&self) -> &str {
        &self.output.state_file
    }

    fn sample_file(&self) -> &str {
        &self.sampling.sample_file
    }

    fn chunk_size(&self) -> usize {
        self.batch.chunk_size
    }

    fn sample_proportion(&self) -> f64 {
        self.sampling.proportion
    }

    fn sample_bound(&self) -> f64 {
        self.sampling.bound
    }

    fn sample_seed(&self) -> u64 {
        self.sampling.seed
    }

    fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}

/// Checks shared by every configuration front end.
pub fn validate_provider<C: ConfigProvider>(config: &C) -> Result<()> {
    validate_url("source.endpoint", config.api_endpoint())?;
    validate_non_empty_string("source.benchmark", config.benchmark())?;
    validate_non_empty_string("source.return_type", config.return_type())?;
    validate_range("batch.chunk_size", config.chunk_size(), 1, MAX_BATCH_ROWS)?;
    validate_path("output.path", config.output_path())?;
    validate_path("output.output_file", config.output_file())?;
    validate_path("output.working_file", config.working_file())?;
    validate_path("output.state_file", config.state_file())?;
    validate_path("sampling.sample_file", config.sample_file())?;
    validate_unit_interval("sampling.proportion", config.sample_proportion())?;
    validate_unit_interval("sampling.bound", config.sample_bound())?;

    let files = [config.output_file(), config.working_file(), config.state_file()];
    if files[0] == files[1] || files[0] == files[2] || files[1] == files[2] {
        return Err(GeocodeError::ConfigValidationError {
            field: "output".to_string(),
            message: "output, working and state files must be distinct".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_census_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();

        assert_eq!(config.api_endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.benchmark(), "Public_AR_Current");
        assert_eq!(config.return_type(), "locations");
        assert_eq!(config.chunk_size(), 10_000);
        assert_eq!(config.output_file(), "geocode_output.csv");
        assert_eq!(config.sample_seed(), 133);
        assert!(config.input_has_headers());
        assert_eq!(config.request_timeout(), None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[source]
endpoint = "https://geocoder.example.com/batch"
benchmark = "Public_AR_Census2020"
timeout_seconds = 600
retry_attempts = 2

[input]
path = "addresses.txt"
has_headers = false

[batch]
chunk_size = 2500

[output]
path = "./out"

[sampling]
bound = 0.05
seed = 7
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.api_endpoint(), "https://geocoder.example.com/batch");
        assert_eq!(config.benchmark(), "Public_AR_Census2020");
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(600)));
        assert_eq!(config.retry_attempts(), 2);
        assert_eq!(config.input_path(), Some("addresses.txt"));
        assert!(!config.input_has_headers());
        assert_eq!(config.chunk_size(), 2500);
        assert_eq!(config.output_path(), "./out");
        assert_eq!(config.working_file(), "temp_geo.csv");
        assert_eq!(config.sample_bound(), 0.05);
        assert_eq!(config.sample_proportion(), 0.5);
        assert_eq!(config.sample_seed(), 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CENSUS_GEOCODE_TEST_ENDPOINT", "https://test.geocoder.com/batch");

        let toml_content = r#"
[source]
endpoint = "${CENSUS_GEOCODE_TEST_ENDPOINT}"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api_endpoint(), "https://test.geocoder.com/batch");

        std::env::remove_var("CENSUS_GEOCODE_TEST_ENDPOINT");
    }

    #[test]
    fn test_config_validation() {
        let oversized = TomlConfig::from_toml_str("[batch]\nchunk_size = 20000\n").unwrap();
        assert!(oversized.validate().is_err());

        let bad_url = TomlConfig::from_toml_str("[source]\nendpoint = \"invalid-url\"\n").unwrap();
        assert!(bad_url.validate().is_err());

        let bad_bound = TomlConfig::from_toml_str("[sampling]\nbound = 1.5\n").unwrap();
        assert!(bad_bound.validate().is_err());

        let clashing = TomlConfig::from_toml_str("[output]\nworking_file = \"geocode_output.csv\"\n")
            .unwrap();
        assert!(clashing.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = TomlConfig::from_toml_str("[batch\nchunk_size = 1").unwrap_err();
        assert!(matches!(err, GeocodeError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[output]\noutput_file = \"results.csv\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.output_file(), "results.csv");
    }
}
