mod parse;

pub use crate::parse::parse_leases;

use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;
use vmrig_fs::{self as fs, FsError};

#[derive(Error, Debug)]
pub enum LeaseError {
    #[error("lease file not found: {0}")]
    NotFound(PathBuf),

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("lease lookup failed: {0}")]
    Lookup(String),
}

/// An address handed out to a MAC by the host's DHCP service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lease {
    pub ip_address: String,
    pub mac_address: String,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Resolves MAC addresses to leases.
///
/// `Ok(None)` means the lookup worked and no lease exists for the MAC.
#[async_trait]
pub trait LeaseLookup: Send + Sync {
    async fn find_by_mac_address(&self, mac_address: &str) -> Result<Option<Lease>, LeaseError>;
}

/// Leases read from a `vmnet-dhcpd` leases file on every lookup.
#[derive(Debug, Clone)]
pub struct LeaseFile {
    path: PathBuf,
}

impl LeaseFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub async fn all(&self) -> Result<Vec<Lease>, LeaseError> {
        if !fs::path_exists(&self.path).await? {
            return Err(LeaseError::NotFound(self.path.clone()));
        }
        let text = fs::read_file_to_string(&self.path).await?;
        Ok(parse_leases(&text))
    }
}

#[async_trait]
impl LeaseLookup for LeaseFile {
    async fn find_by_mac_address(&self, mac_address: &str) -> Result<Option<Lease>, LeaseError> {
        let leases = self.all().await?;
        let lease = leases
            .into_iter()
            .filter(|lease| lease.mac_address.eq_ignore_ascii_case(mac_address))
            .max_by(|a, b| a.end.cmp(&b.end));
        debug!(
            "lease for {mac_address}: {:?}",
            lease.as_ref().map(|l| &l.ip_address)
        );
        Ok(lease)
    }
}
