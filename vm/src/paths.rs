use std::path::{Path, PathBuf};

pub const BUNDLE_EXTENSION: &str = "vmwarevm";
pub const CONFIG_EXTENSION: &str = "vmx";
pub const AUXILIARY_CONFIG_EXTENSION: &str = "vmxf";
pub const DISK_EXTENSION: &str = "vmdk";
pub const SUSPEND_EXTENSION: &str = "vmem";

#[derive(Debug, Clone)]
pub struct Paths {
    vm_dir: PathBuf,
}

impl Paths {
    pub fn new(vm_dir: impl Into<PathBuf>) -> Self {
        Self {
            vm_dir: vm_dir.into(),
        }
    }

    pub fn vm_dir(&self) -> &Path {
        &self.vm_dir
    }

    pub fn bundle_dir(&self, name: &str) -> PathBuf {
        self.vm_dir.join(format!("{name}.{BUNDLE_EXTENSION}"))
    }

    pub fn config_pattern(&self, name: &str) -> PathBuf {
        self.bundle_dir(name).join(format!("*.{CONFIG_EXTENSION}"))
    }
}

/// The VM name for a bundle directory, if it carries the bundle extension.
pub(crate) fn bundle_name(dir: &Path) -> Option<&str> {
    let file_name = dir.file_name()?.to_str()?;
    file_name
        .strip_suffix(BUNDLE_EXTENSION)?
        .strip_suffix('.')
        .filter(|name| !name.is_empty())
}
