use serde::Deserialize;
use std::path::PathBuf;
use vmrig_lease::LeaseLookup;
use vmrig_metadata::MetadataStore;

use crate::{paths::Paths, vmrun::Vmrun};

#[derive(Debug, Clone, Deserialize)]
pub struct VmConfig {
    /// Directory holding one `<name>.vmwarevm` bundle per VM.
    pub vm_dir: PathBuf,
}

/// Configuration plus the external collaborators every operation goes through.
pub struct Context {
    paths: Paths,
    vmrun: Box<dyn Vmrun>,
    leases: Box<dyn LeaseLookup>,
    metadata: Box<dyn MetadataStore>,
}

impl Context {
    pub fn new(
        config: VmConfig,
        vmrun: impl Vmrun + 'static,
        leases: impl LeaseLookup + 'static,
        metadata: impl MetadataStore + 'static,
    ) -> Self {
        Self {
            paths: Paths::new(config.vm_dir),
            vmrun: Box::new(vmrun),
            leases: Box::new(leases),
            metadata: Box::new(metadata),
        }
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn vmrun(&self) -> &dyn Vmrun {
        self.vmrun.as_ref()
    }

    pub fn leases(&self) -> &dyn LeaseLookup {
        self.leases.as_ref()
    }

    pub fn metadata(&self) -> &dyn MetadataStore {
        self.metadata.as_ref()
    }
}
