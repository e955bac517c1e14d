use std::{
    env::{self, VarError},
    path::{Path, PathBuf},
};

use thiserror::Error;

const PROJECT_NAME: &str = "vmrig";

#[derive(Debug, Clone)]
pub struct Environment {
    home_dir: PathBuf,
    data_dir: PathBuf,
    config_dir: PathBuf,
}

#[derive(Error, Debug, Clone)]
pub enum EnvironmentError {
    #[error("environment variable {name}: {source}")]
    Var {
        name: String,
        #[source]
        source: VarError,
    },
}

impl Environment {
    pub fn new(home_dir: PathBuf, data_dir: PathBuf, config_dir: PathBuf) -> Self {
        Self {
            home_dir,
            data_dir,
            config_dir,
        }
    }

    #[cfg(not(target_os = "macos"))]
    pub fn create() -> Result<Environment, EnvironmentError> {
        let home_dir: PathBuf = Self::var("HOME").map(From::from)?;

        let data_dir: PathBuf = Self::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir.join(".local").join("share"));

        let config_dir: PathBuf = Self::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir.join(".config"));

        Ok(Environment::new(
            home_dir,
            data_dir.join(PROJECT_NAME),
            config_dir.join(PROJECT_NAME),
        ))
    }

    #[cfg(target_os = "macos")]
    pub fn create() -> Result<Environment, EnvironmentError> {
        let home_dir: PathBuf = Self::var("HOME").map(From::from)?;
        let support_dir = home_dir
            .join("Library")
            .join("Application Support")
            .join(PROJECT_NAME);

        Ok(Environment::new(
            home_dir,
            support_dir.clone(),
            support_dir,
        ))
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn inventory_file(&self) -> PathBuf {
        self.data_dir.join("inventory.json")
    }

    /// Expands a leading `~/` against the home directory.
    pub fn expand_home(&self, path: &Path) -> PathBuf {
        match path.strip_prefix("~") {
            Ok(rest) => self.home_dir.join(rest),
            Err(_) => path.to_owned(),
        }
    }

    fn var(name: &str) -> Result<String, EnvironmentError> {
        env::var(name).map_err(|source| EnvironmentError::Var {
            name: name.to_owned(),
            source,
        })
    }
}
