//! In-memory storage for unit tests, with deletes that can be made to fail per key.

use crate::domain::ports::Storage;
use crate::utils::error::{EtlError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct MemoryStorage {
    files: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
    failing_deletes: Arc<Mutex<BTreeSet<String>>>,
}

impl MemoryStorage {
    pub fn with(paths: &[&str]) -> Self {
        let storage = Self::default();
        for path in paths {
            storage.insert(path, b"{}");
        }
        storage
    }

    pub fn insert(&self, path: &str, data: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), data.to_vec());
    }

    pub fn keys(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }

    pub fn fail_delete_of(&self, path: &str) {
        self.failing_deletes.lock().unwrap().insert(path.to_string());
    }
}

impl Storage for MemoryStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| EtlError::ObjectNotFound {
                path: path.to_string(),
            })
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        self.insert(path, data);
        Ok(())
    }

    async fn list_files(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }

    async fn copy_file(&self, from: &str, to: &str) -> Result<()> {
        let data = self.read_file(from).await?;
        self.write_file(to, &data).await
    }

    async fn delete_file(&self, path: &str) -> Result<bool> {
        if self.failing_deletes.lock().unwrap().contains(path) {
            return Err(EtlError::storage("delete", path, "access denied"));
        }
        Ok(self.files.lock().unwrap().remove(path).is_some())
    }
}
