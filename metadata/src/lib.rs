use async_trait::async_trait;
use displaydoc::Display;
use serde_json::{Map, Value};
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;
use vmrig_fs::{self as fs, FsError};

#[derive(Debug, Error, Display)]
pub enum MetadataError {
    /// metadata file access failed: {0}
    Fs(#[from] FsError),

    /// metadata file '{path}' is not a JSON object: {source}
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// metadata file '{path}' could not be encoded: {source}
    Encode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Records kept about VMs outside their bundles.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    async fn delete_vm_info(&self, vm_name: &str) -> Result<(), MetadataError>;
}

/// A JSON object on disk, keyed by VM name.
#[derive(Debug, Clone)]
pub struct Inventory {
    path: PathBuf,
}

impl Inventory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn load(&self) -> Result<Map<String, Value>, MetadataError> {
        if !fs::path_exists(&self.path).await? {
            return Ok(Map::new());
        }
        let text = fs::read_file_to_string(&self.path).await?;
        if text.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&text).map_err(|source| MetadataError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    pub async fn save(&self, records: &Map<String, Value>) -> Result<(), MetadataError> {
        let text =
            serde_json::to_string_pretty(records).map_err(|source| MetadataError::Encode {
                path: self.path.clone(),
                source,
            })?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir(parent).await?;
        }
        fs::write_file(&self.path, text.as_bytes()).await?;
        Ok(())
    }
}

#[async_trait]
impl MetadataStore for Inventory {
    async fn delete_vm_info(&self, vm_name: &str) -> Result<(), MetadataError> {
        let mut records = self.load().await?;
        if records.remove(vm_name).is_none() {
            debug!("no metadata recorded for {vm_name}");
            return Ok(());
        }
        self.save(&records).await?;
        debug!("deleted metadata for {vm_name}");
        Ok(())
    }
}
