mod binary;

pub use crate::binary::{is_binary, is_binary_file};

use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::{fs, io::AsyncWriteExt};

#[derive(Error, Debug)]
pub enum FsError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to list directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read an entry of {path}: {source}")]
    ReadDirEntry {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to remove directory {path}: {source}")]
    RemoveDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to stat {path}: {source}")]
    Metadata {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to create {path}: {source}")]
    CreateFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to open {path}: {source}")]
    OpenFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to check whether {path} exists: {source}")]
    PathExists {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to copy {from} to {to}: {source}")]
    CopyFile {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to remove {path}: {source}")]
    RemoveFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A directory entry, already classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

impl DirEntry {
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|name| name.to_str())
    }
}

pub async fn create_dir(path: impl AsRef<Path>) -> Result<(), FsError> {
    let path = path.as_ref();
    fs::create_dir_all(path)
        .await
        .map_err(|source| FsError::CreateDir {
            path: path.to_owned(),
            source,
        })
}

/// Entries of a directory sorted by path.
pub async fn read_dir(path: impl AsRef<Path>) -> Result<Vec<DirEntry>, FsError> {
    let path = path.as_ref();
    let mut dir = fs::read_dir(path).await.map_err(|source| FsError::ReadDir {
        path: path.to_owned(),
        source,
    })?;

    let mut entries = Vec::new();
    while let Some(entry) = dir
        .next_entry()
        .await
        .map_err(|source| FsError::ReadDirEntry {
            path: path.to_owned(),
            source,
        })?
    {
        let entry_path = entry.path();
        // symlinks are not followed, so a dangling link is just a file
        let is_dir = entry
            .file_type()
            .await
            .map_err(|source| FsError::Metadata {
                path: entry_path.clone(),
                source,
            })?
            .is_dir();
        entries.push(DirEntry {
            path: entry_path,
            is_dir,
        });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

pub async fn remove_dir_all(path: impl AsRef<Path>) -> Result<(), FsError> {
    let path = path.as_ref();
    fs::remove_dir_all(path)
        .await
        .map_err(|source| FsError::RemoveDir {
            path: path.to_owned(),
            source,
        })
}

/// Removes a directory only if it is empty. Returns whether it was removed.
pub async fn remove_dir_if_empty(path: impl AsRef<Path>) -> Result<bool, FsError> {
    let path = path.as_ref();
    if !read_dir(path).await?.is_empty() {
        return Ok(false);
    }
    fs::remove_dir(path)
        .await
        .map_err(|source| FsError::RemoveDir {
            path: path.to_owned(),
            source,
        })?;
    Ok(true)
}

pub async fn path_exists(path: impl AsRef<Path>) -> Result<bool, FsError> {
    let path = path.as_ref();
    fs::try_exists(path)
        .await
        .map_err(|source| FsError::PathExists {
            path: path.to_owned(),
            source,
        })
}

pub async fn is_dir(path: impl AsRef<Path>) -> Result<bool, FsError> {
    let path = path.as_ref();
    if !path_exists(path).await? {
        return Ok(false);
    }
    let metadata = fs::metadata(path).await.map_err(|source| FsError::Metadata {
        path: path.to_owned(),
        source,
    })?;
    Ok(metadata.is_dir())
}

pub async fn create_file(path: impl AsRef<Path>) -> Result<tokio::fs::File, FsError> {
    let path = path.as_ref();
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
        .await
        .map_err(|source| FsError::CreateFile {
            path: path.to_owned(),
            source,
        })
}

pub async fn open_file(path: impl AsRef<Path>) -> Result<tokio::fs::File, FsError> {
    let path = path.as_ref();
    fs::File::open(path).await.map_err(|source| FsError::OpenFile {
        path: path.to_owned(),
        source,
    })
}

pub async fn write_file(path: impl AsRef<Path>, data: &[u8]) -> Result<(), FsError> {
    let path = path.as_ref();
    let mut file = create_file(path).await?;
    file.write_all(data)
        .await
        .map_err(|source| FsError::WriteFile {
            path: path.to_owned(),
            source,
        })?;
    file.flush().await.map_err(|source| FsError::WriteFile {
        path: path.to_owned(),
        source,
    })
}

pub async fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>, FsError> {
    let path = path.as_ref();
    fs::read(path).await.map_err(|source| FsError::ReadFile {
        path: path.to_owned(),
        source,
    })
}

pub async fn read_file_to_string(path: impl AsRef<Path>) -> Result<String, FsError> {
    let path = path.as_ref();
    fs::read_to_string(path)
        .await
        .map_err(|source| FsError::ReadFile {
            path: path.to_owned(),
            source,
        })
}

pub async fn copy_file(from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<(), FsError> {
    let (from, to) = (from.as_ref(), to.as_ref());
    fs::copy(from, to)
        .await
        .map(|_| ())
        .map_err(|source| FsError::CopyFile {
            from: from.to_owned(),
            to: to.to_owned(),
            source,
        })
}

pub async fn remove_file(path: impl AsRef<Path>) -> Result<(), FsError> {
    let path = path.as_ref();
    fs::remove_file(path)
        .await
        .map_err(|source| FsError::RemoveFile {
            path: path.to_owned(),
            source,
        })
}
