use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    async fn ensure_parent(full_path: &Path) -> Result<()> {
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.resolve(path)).await?)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);
        Self::ensure_parent(&full_path).await?;
        fs::write(full_path, data).await?;
        Ok(())
    }

    async fn append_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path);
        Self::ensure_parent(&full_path).await?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(full_path)
            .await?;
        file.write_all(data).await?;
        file.sync_data().await?;
        Ok(())
    }

    async fn truncate_file(&self, path: &str, len: u64) -> Result<()> {
        let file = fs::OpenOptions::new()
            .write(true)
            .open(self.resolve(path))
            .await?;
        file.set_len(len).await?;
        file.sync_data().await?;
        Ok(())
    }

    async fn rename_file(&self, from: &str, to: &str) -> Result<()> {
        fs::rename(self.resolve(from), self.resolve(to)).await?;
        Ok(())
    }

    async fn remove_file(&self, path: &str) -> Result<()> {
        fs::remove_file(self.resolve(path)).await?;
        Ok(())
    }

    async fn file_len(&self, path: &str) -> Result<Option<u64>> {
        match fs::metadata(self.resolve(path)).await {
            Ok(meta) => Ok(Some(meta.len())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        Path::new(&self.base_path).join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_append_truncate_and_rename() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());

        storage.write_file("nested/out.csv", b"header\n").await.unwrap();
        storage.append_file("nested/out.csv", b"row1\n").await.unwrap();
        assert_eq!(storage.file_len("nested/out.csv").await.unwrap(), Some(12));

        storage.truncate_file("nested/out.csv", 7).await.unwrap();
        assert_eq!(storage.read_file("nested/out.csv").await.unwrap(), b"header\n");

        storage.rename_file("nested/out.csv", "moved.csv").await.unwrap();
        assert_eq!(storage.file_len("nested/out.csv").await.unwrap(), None);
        assert!(storage.resolve("moved.csv").exists());

        storage.remove_file("moved.csv").await.unwrap();
        assert_eq!(storage.file_len("moved.csv").await.unwrap(), None);
    }
}
