use crate::core::chunk::ChunkPlan;
use crate::domain::model::{GeocodeResult, RESULT_HEADER};
use crate::domain::ports::Storage;
use crate::utils::error::{GeocodeError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Progress record stored next to the output file. `bytes_written` is the
/// output length at the last committed chunk, so a half-appended chunk can be
/// cut off on resume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointState {
    pub total_rows: usize,
    pub chunk_size: usize,
    pub total_chunks: usize,
    pub completed_chunks: usize,
    pub rows_written: usize,
    pub bytes_written: u64,
    pub updated_at: DateTime<Utc>,
}

impl CheckpointState {
    fn new(plan: &ChunkPlan, header_len: u64) -> Self {
        Self {
            total_rows: plan.total_rows(),
            chunk_size: plan.chunk_size(),
            total_chunks: plan.total_chunks(),
            completed_chunks: 0,
            rows_written: 0,
            bytes_written: header_len,
            updated_at: Utc::now(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed_chunks >= self.total_chunks
    }
}

pub struct CheckpointStore<'a, S: Storage> {
    storage: &'a S,
    output_file: &'a str,
    state_file: &'a str,
}

impl<'a, S: Storage> CheckpointStore<'a, S> {
    pub fn new(storage: &'a S, output_file: &'a str, state_file: &'a str) -> Self {
        Self {
            storage,
            output_file,
            state_file,
        }
    }

    pub async fn load(&self) -> Result<Option<CheckpointState>> {
        if self.storage.file_len(self.state_file).await?.is_none() {
            return Ok(None);
        }
        let data = self.storage.read_file(self.state_file).await?;
        Ok(Some(serde_json::from_slice(&data)?))
    }

    /// Truncates the output to a bare header and records zero completed chunks.
    pub async fn start(&self, plan: &ChunkPlan) -> Result<CheckpointState> {
        let header = results_to_csv(&[], true)?;
        self.storage.write_file(self.output_file, &header).await?;

        let state = CheckpointState::new(plan, header.len() as u64);
        self.save_state(&state).await?;
        Ok(state)
    }

    pub async fn resume(&self, plan: &ChunkPlan) -> Result<CheckpointState> {
        let Some(state) = self.load().await? else {
            tracing::info!("No checkpoint found at {}, starting from the first chunk", self.state_file);
            return self.start(plan).await;
        };

        if state.total_rows != plan.total_rows() || state.chunk_size != plan.chunk_size() {
            return Err(GeocodeError::CheckpointError {
                message: format!(
                    "checkpoint was written for {} rows in chunks of {}, but the input has {} rows in chunks of {}",
                    state.total_rows,
                    state.chunk_size,
                    plan.total_rows(),
                    plan.chunk_size()
                ),
            });
        }

        match self.storage.file_len(self.output_file).await? {
            None => {
                return Err(GeocodeError::CheckpointError {
                    message: format!("output file {} is missing", self.output_file),
                })
            }
            Some(len) if len < state.bytes_written => {
                return Err(GeocodeError::CheckpointError {
                    message: format!(
                        "output file {} has {} bytes, checkpoint expects {}",
                        self.output_file, len, state.bytes_written
                    ),
                })
            }
            Some(len) if len > state.bytes_written => {
                tracing::warn!(
                    "Discarding {} bytes of an unfinished chunk from {}",
                    len - state.bytes_written,
                    self.output_file
                );
                self.storage
                    .truncate_file(self.output_file, state.bytes_written)
                    .await?;
            }
            Some(_) => {}
        }

        tracing::info!(
            "Resuming at chunk {} of {} ({} rows already geocoded)",
            state.completed_chunks + 1,
            state.total_chunks,
            state.rows_written
        );
        Ok(state)
    }

    /// Appends one chunk's rows, then advances the recorded progress.
    pub async fn commit(&self, state: &mut CheckpointState, results: &[GeocodeResult]) -> Result<()> {
        let payload = results_to_csv(results, false)?;
        self.storage.append_file(self.output_file, &payload).await?;

        state.completed_chunks += 1;
        state.rows_written += results.len();
        state.bytes_written += payload.len() as u64;
        state.updated_at = Utc::now();
        self.save_state(state).await
    }

    async fn save_state(&self, state: &CheckpointState) -> Result<()> {
        let staging = format!("{}.tmp", self.state_file);
        let json = serde_json::to_vec_pretty(state)?;
        self.storage.write_file(&staging, &json).await?;
        self.storage.rename_file(&staging, self.state_file).await
    }
}

pub fn results_to_csv(rows: &[GeocodeResult], include_header: bool) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    if include_header {
        writer.write_record(RESULT_HEADER)?;
    }
    for row in rows {
        writer.write_record(row.to_row())?;
    }

    writer
        .into_inner()
        .map_err(|e| GeocodeError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            self.files.lock().await.get(path).cloned()
        }
    }

    fn not_found(path: &str) -> GeocodeError {
        GeocodeError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("File not found: {}", path),
        ))
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            self.get_file(path).await.ok_or_else(|| not_found(path))
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files.lock().await.insert(path.to_string(), data.to_vec());
            Ok(())
        }

        async fn append_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.entry(path.to_string()).or_default().extend_from_slice(data);
            Ok(())
        }

        async fn truncate_file(&self, path: &str, len: u64) -> Result<()> {
            let mut files = self.files.lock().await;
            let file = files.get_mut(path).ok_or_else(|| not_found(path))?;
            file.truncate(len as usize);
            Ok(())
        }

        async fn rename_file(&self, from: &str, to: &str) -> Result<()> {
            let mut files = self.files.lock().await;
            let data = files.remove(from).ok_or_else(|| not_found(from))?;
            files.insert(to.to_string(), data);
            Ok(())
        }

        async fn remove_file(&self, path: &str) -> Result<()> {
            self.files.lock().await.remove(path);
            Ok(())
        }

        async fn file_len(&self, path: &str) -> Result<Option<u64>> {
            Ok(self.get_file(path).await.map(|f| f.len() as u64))
        }

        fn resolve(&self, path: &str) -> PathBuf {
            PathBuf::from(path)
        }
    }

    fn result(id: &str, match_type: Option<&str>) -> GeocodeResult {
        GeocodeResult {
            id: Some(id.to_string()),
            input_address: Some(format!("{} Main St, Springfield, IL, 62701", id)),
            match_indicator: Some(if match_type.is_some() { "Match" } else { "No_Match" }.to_string()),
            match_type: match_type.map(str::to_string),
            ..Default::default()
        }
    }

    fn output_lines(data: &[u8]) -> Vec<String> {
        String::from_utf8(data.to_vec())
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_start_writes_header_and_state() {
        let storage = MockStorage::default();
        let store = CheckpointStore::new(&storage, "out.csv", "out.state.json");
        let plan = ChunkPlan::new(25, 10).unwrap();

        let state = store.start(&plan).await.unwrap();

        assert_eq!(state.total_chunks, 3);
        assert_eq!(state.completed_chunks, 0);
        let output = storage.get_file("out.csv").await.unwrap();
        assert_eq!(
            output_lines(&output),
            vec!["id,input_address,match,match_type,matched_address,coordinates,tiger_line_id,side"]
        );
        assert_eq!(store.load().await.unwrap(), Some(state));
        assert!(storage.get_file("out.state.json.tmp").await.is_none());
    }

    #[tokio::test]
    async fn test_commit_appends_only_new_rows() {
        let storage = MockStorage::default();
        let store = CheckpointStore::new(&storage, "out.csv", "out.state.json");
        let plan = ChunkPlan::new(4, 2).unwrap();

        let mut state = store.start(&plan).await.unwrap();
        store
            .commit(&mut state, &[result("1", Some("Exact")), result("2", None)])
            .await
            .unwrap();
        store
            .commit(&mut state, &[result("3", Some("Non_Exact")), result("4", Some("Exact"))])
            .await
            .unwrap();

        let output = storage.get_file("out.csv").await.unwrap();
        let lines = output_lines(&output);
        assert_eq!(lines.len(), 5);
        assert!(lines[2].starts_with("2,"));
        assert!(lines[2].contains(",No_Match,"));
        assert_eq!(state.rows_written, 4);
        assert_eq!(state.bytes_written, output.len() as u64);
        assert!(state.is_complete());
    }

    #[tokio::test]
    async fn test_resume_discards_unfinished_append() {
        let storage = MockStorage::default();
        let store = CheckpointStore::new(&storage, "out.csv", "out.state.json");
        let plan = ChunkPlan::new(4, 2).unwrap();

        let mut state = store.start(&plan).await.unwrap();
        store.commit(&mut state, &[result("1", Some("Exact"))]).await.unwrap();
        let committed = storage.get_file("out.csv").await.unwrap();

        // Rows appended without a state update, as if the process died mid-commit.
        storage.append_file("out.csv", b"2,partial\n").await.unwrap();

        let resumed = store.resume(&plan).await.unwrap();
        assert_eq!(resumed.completed_chunks, 1);
        assert_eq!(storage.get_file("out.csv").await.unwrap(), committed);
    }

    #[tokio::test]
    async fn test_resume_without_state_starts_fresh() {
        let storage = MockStorage::default();
        let store = CheckpointStore::new(&storage, "out.csv", "out.state.json");
        let plan = ChunkPlan::new(4, 2).unwrap();

        let state = store.resume(&plan).await.unwrap();
        assert_eq!(state.completed_chunks, 0);
        assert!(storage.get_file("out.csv").await.is_some());
    }

    #[tokio::test]
    async fn test_resume_rejects_different_input_shape() {
        let storage = MockStorage::default();
        let store = CheckpointStore::new(&storage, "out.csv", "out.state.json");
        store.start(&ChunkPlan::new(4, 2).unwrap()).await.unwrap();

        let err = store.resume(&ChunkPlan::new(5, 2).unwrap()).await.unwrap_err();
        assert!(matches!(err, GeocodeError::CheckpointError { .. }));
    }

    #[tokio::test]
    async fn test_resume_rejects_missing_output() {
        let storage = MockStorage::default();
        let store = CheckpointStore::new(&storage, "out.csv", "out.state.json");
        let plan = ChunkPlan::new(4, 2).unwrap();
        store.start(&plan).await.unwrap();
        storage.remove_file("out.csv").await.unwrap();

        let err = store.resume(&plan).await.unwrap_err();
        assert!(err.to_string().contains("missing"));
    }
}
