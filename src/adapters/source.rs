use crate::core::addresses::parse_addresses;
use crate::domain::model::AddressTable;
use crate::domain::ports::AddressSource;
use crate::utils::error::{GeocodeError, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

/// Reads `input` when given, otherwise prompts for a path.
pub fn address_source(input: Option<&str>, has_headers: bool) -> Box<dyn AddressSource> {
    match input {
        Some(path) => Box::new(FileAddressSource::new(path, has_headers)),
        None => Box::new(PromptAddressSource::new(has_headers)),
    }
}

#[async_trait]
impl<T: AddressSource + ?Sized> AddressSource for Box<T> {
    async fn load(&self) -> Result<AddressTable> {
        (**self).load().await
    }
}

#[derive(Debug, Clone)]
pub struct FileAddressSource {
    path: PathBuf,
    has_headers: bool,
}

impl FileAddressSource {
    pub fn new(path: impl Into<PathBuf>, has_headers: bool) -> Self {
        Self {
            path: path.into(),
            has_headers,
        }
    }
}

#[async_trait]
impl AddressSource for FileAddressSource {
    async fn load(&self) -> Result<AddressTable> {
        tracing::info!("📁 Loading addresses from {}", self.path.display());
        let data = tokio::fs::read(&self.path).await?;
        let table = parse_addresses(&data, self.has_headers)?;
        tracing::info!("Loaded {} addresses", table.len());
        Ok(table)
    }
}

/// Asks for the address file path on stdin.
#[derive(Debug, Clone)]
pub struct PromptAddressSource {
    has_headers: bool,
}

impl PromptAddressSource {
    pub fn new(has_headers: bool) -> Self {
        Self { has_headers }
    }
}

#[async_trait]
impl AddressSource for PromptAddressSource {
    async fn load(&self) -> Result<AddressTable> {
        let path = prompt_for_path(
            &mut BufReader::new(tokio::io::stdin()),
            &mut tokio::io::stdout(),
        )
        .await?;
        FileAddressSource::new(path, self.has_headers).load().await
    }
}

async fn prompt_for_path<R, W>(reader: &mut R, writer: &mut W) -> Result<String>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    writer.write_all(b"Choose Address File: ").await?;
    writer.flush().await?;

    let mut line = String::new();
    reader.read_line(&mut line).await?;
    let path = line.trim();
    if path.is_empty() {
        return Err(GeocodeError::MissingConfigError {
            field: "input".to_string(),
        });
    }
    Ok(path.to_string())
}

/// A table that is already in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    table: AddressTable,
}

impl InMemorySource {
    pub fn new(table: AddressTable) -> Self {
        Self { table }
    }
}

#[async_trait]
impl AddressSource for InMemorySource {
    async fn load(&self) -> Result<AddressTable> {
        Ok(self.table.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_file_source_reads_pipe_delimited_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"id|street|city|state|zip\n1|4600 Silver Hill Rd|Washington|DC|20233\n")
            .unwrap();

        let table = FileAddressSource::new(file.path(), true).load().await.unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].zip, "20233");
    }

    #[tokio::test]
    async fn test_boxed_source_delegates() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"1|a|b|c|d\n2|e|f|g|h\n").unwrap();

        let source = address_source(file.path().to_str(), false);
        assert_eq!(source.load().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_prompt_reads_trimmed_path() {
        let mut input: &[u8] = b"  /data/addresses.txt \n";
        let mut output = Vec::new();

        let path = prompt_for_path(&mut input, &mut output).await.unwrap();
        assert_eq!(path, "/data/addresses.txt");
        assert_eq!(output, b"Choose Address File: ");
    }

    #[tokio::test]
    async fn test_prompt_rejects_empty_answer() {
        for answer in [&b"\n"[..], &b"   \n"[..], &b""[..]] {
            let mut input = answer;
            let mut output = Vec::new();
            let err = prompt_for_path(&mut input, &mut output).await.unwrap_err();
            assert!(matches!(err, GeocodeError::MissingConfigError { ref field } if field == "input"));
        }
    }

    #[tokio::test]
    async fn test_file_source_missing_file_is_io_error() {
        let err = FileAddressSource::new("/nonexistent/addresses.txt", true)
            .load()
            .await
            .unwrap_err();
        assert!(matches!(err, GeocodeError::IoError(_)));
    }
}
