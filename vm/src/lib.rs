mod bundle;
mod clone;
mod context;
mod delete;
mod network;
mod paths;
mod response;
mod state;
mod vm;
mod vmrun;

#[cfg(test)]
mod testing;

pub use crate::clone::clone;
pub use crate::context::{Context, VmConfig};
pub use crate::network::{AdapterInfo, NetworkInfo};
pub use crate::paths::{
    AUXILIARY_CONFIG_EXTENSION, BUNDLE_EXTENSION, CONFIG_EXTENSION, DISK_EXTENSION, Paths,
    SUSPEND_EXTENSION,
};
pub use crate::response::OperationResult;
pub use crate::state::RunState;
pub use crate::vm::{StartOptions, Vm};
pub use crate::vmrun::{Vmrun, VmrunCommand};

pub use vmrig_cmd::CommandError;
pub use vmrig_lease::{Lease, LeaseError, LeaseFile, LeaseLookup};
pub use vmrig_metadata::{Inventory, MetadataError, MetadataStore};

use std::path::PathBuf;
use thiserror::Error;
use vmrig_fs::FsError;

#[derive(Error, Debug)]
pub enum VmError {
    #[error("no config file found for VM '{name}' (in '{pattern}')")]
    ConfigNotFound { name: String, pattern: PathBuf },

    #[error("multiple config files found for VM '{name}' ({candidates} in '{dir}')")]
    MultipleConfigs {
        name: String,
        candidates: String,
        dir: PathBuf,
    },

    #[error("VM '{0}' does not exist")]
    NotFound(String),

    #[error("VM '{0}' already exists")]
    AlreadyExists(String),

    #[error("invalid VM name '{0}'")]
    InvalidName(String),

    #[error(transparent)]
    Vmrun(#[from] CommandError),

    #[error("failed to look up lease for {mac_address}: {source}")]
    Lease {
        mac_address: String,
        #[source]
        source: LeaseError,
    },

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("config file '{path}' is not valid UTF-8")]
    Encoding { path: PathBuf },
}
