use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs::{read_to_string, try_exists};
use vmrig_env::Environment;

const DEFAULT_VMRUN_BIN: &str = "/Applications/VMware Fusion.app/Contents/Library/vmrun";
const DEFAULT_VM_DIR: &str = "~/Documents/Virtual Machines.localized";
const DEFAULT_LEASE_FILE: &str = "/var/db/vmware/vmnet-dhcpd-vmnet8.leases";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config file not found at: {0}")]
    NotFound(PathBuf),

    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigToml {
    vmrun_bin: Option<PathBuf>,
    vm_dir: Option<PathBuf>,
    lease_file: Option<PathBuf>,
    metadata_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub path: Option<PathBuf>,
    pub vmrun_bin: PathBuf,
    pub vm_dir: PathBuf,
    pub lease_file: PathBuf,
    pub metadata_file: PathBuf,
}

impl Config {
    /// Loads `path` if given (it must exist), else the default config file
    /// if present, else defaults.
    pub async fn load(path: Option<&Path>, env: &Environment) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_owned(), true),
            None => (env.config_file(), false),
        };

        let exists = try_exists(&path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
        if !exists {
            if required {
                return Err(ConfigError::NotFound(path));
            }
            return Ok(Self::from_toml(None, ConfigToml::default(), env));
        }

        let string = read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
        let toml = Self::parse(&path, &string)?;
        Ok(Self::from_toml(Some(path), toml, env))
    }

    fn parse(path: &Path, string: &str) -> Result<ConfigToml, ConfigError> {
        toml::from_str(string).map_err(|source| ConfigError::Parse {
            path: path.to_owned(),
            source,
        })
    }

    fn from_toml(path: Option<PathBuf>, toml: ConfigToml, env: &Environment) -> Self {
        let ConfigToml {
            vmrun_bin,
            vm_dir,
            lease_file,
            metadata_file,
        } = toml;
        let expand = |value: Option<PathBuf>, default: &str| {
            env.expand_home(&value.unwrap_or_else(|| PathBuf::from(default)))
        };
        Self {
            path,
            vmrun_bin: expand(vmrun_bin, DEFAULT_VMRUN_BIN),
            vm_dir: expand(vm_dir, DEFAULT_VM_DIR),
            lease_file: expand(lease_file, DEFAULT_LEASE_FILE),
            metadata_file: metadata_file
                .map(|path| env.expand_home(&path))
                .unwrap_or_else(|| env.inventory_file()),
        }
    }
}
