use crate::core::Storage;
use crate::utils::error::{EtlError, Result};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Filesystem-backed storage: the key `rawdata/to_processed/x.json` lives at
/// `<base_path>/rawdata/to_processed/x.json`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        if key.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(EtlError::storage("resolve", key, "key must be a relative path without '..'"));
        }
        Ok(self.base_path.join(relative))
    }

    fn key_for(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.base_path).ok()?;
        let parts: Vec<&str> = relative
            .components()
            .map(|c| c.as_os_str().to_str())
            .collect::<Option<_>>()?;
        Some(parts.join("/"))
    }

    async fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

fn not_found_as(key: &str, err: std::io::Error) -> EtlError {
    if err.kind() == ErrorKind::NotFound {
        EtlError::ObjectNotFound {
            path: key.to_string(),
        }
    } else {
        EtlError::IoError(err)
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.resolve(path)?;
        tokio::fs::read(full_path)
            .await
            .map_err(|e| not_found_as(path, e))
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.resolve(path)?;
        Self::ensure_parent(&full_path).await?;
        tokio::fs::write(full_path, data).await?;
        Ok(())
    }

    async fn list_files(&self, prefix: &str) -> Result<Vec<String>> {
        // 從前綴中最後一個 '/' 之前的目錄開始走訪
        let dir = match prefix.rfind('/') {
            Some(idx) => self.resolve(&prefix[..idx])?,
            None => self.base_path.clone(),
        };

        let mut keys = Vec::new();
        let mut pending = vec![dir];
        while let Some(dir) = pending.pop() {
            let mut entries = match tokio::fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if file_type.is_file() {
                    if let Some(key) = self.key_for(&entry.path()) {
                        if key.starts_with(prefix) {
                            keys.push(key);
                        }
                    }
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn copy_file(&self, from: &str, to: &str) -> Result<()> {
        let source = self.resolve(from)?;
        let target = self.resolve(to)?;
        Self::ensure_parent(&target).await?;
        tokio::fs::copy(&source, &target)
            .await
            .map_err(|e| not_found_as(from, e))?;
        Ok(())
    }

    async fn delete_file(&self, path: &str) -> Result<bool> {
        let full_path = self.resolve(path)?;
        match tokio::fs::remove_file(full_path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        storage
            .write_file("rawdata/to_processed/a.json", b"{\"items\":[]}")
            .await
            .unwrap();

        let data = storage.read_file("rawdata/to_processed/a.json").await.unwrap();
        assert_eq!(data, b"{\"items\":[]}");
        assert!(temp_dir.path().join("rawdata/to_processed/a.json").exists());
    }

    #[tokio::test]
    async fn test_missing_object_is_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        let err = storage.read_file("rawdata/to_processed/nope.json").await.unwrap_err();
        assert!(matches!(err, EtlError::ObjectNotFound { .. }));

        let err = storage
            .copy_file("rawdata/to_processed/nope.json", "rawdata/processed/nope.json")
            .await
            .unwrap_err();
        assert!(matches!(err, EtlError::ObjectNotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_only_returns_keys_under_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        for key in [
            "rawdata/to_processed/b.json",
            "rawdata/to_processed/a.json",
            "rawdata/processed/c.json",
        ] {
            storage.write_file(key, b"{}").await.unwrap();
        }

        let keys = storage.list_files("rawdata/to_processed/").await.unwrap();
        assert_eq!(
            keys,
            vec!["rawdata/to_processed/a.json", "rawdata/to_processed/b.json"]
        );

        assert!(storage.list_files("transformeddata/album_data/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_object_is_noop() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        storage.write_file("rawdata/to_processed/a.json", b"{}").await.unwrap();

        assert!(storage.delete_file("rawdata/to_processed/a.json").await.unwrap());
        assert!(!storage.delete_file("rawdata/to_processed/a.json").await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_escaping_keys() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        assert!(storage.read_file("../outside.json").await.is_err());
        assert!(storage.write_file("/etc/passwd", b"x").await.is_err());
    }
}
