//! Infrastructure implementation of the `ConfigStore` port.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::application::ports::ConfigStore;
use crate::domain::config::{BringupConfig, expand_home};

/// Production implementation of `ConfigStore` that uses a YAML file on disk.
///
/// A missing file yields the defaults; a present but invalid one is an error.
pub struct YamlConfigStore {
    path: PathBuf,
}

impl YamlConfigStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// `~/.crcup/config.yaml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".crcup").join("config.yaml"))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<BringupConfig> {
        let path = &self.path;
        if !path.exists() {
            return Ok(BringupConfig::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        let mut config: BringupConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid config in {}", path.display()))?;
        expand_paths(&mut config, dirs::home_dir().as_deref());
        Ok(config)
    }
}

fn expand_paths(config: &mut BringupConfig, home: Option<&Path>) {
    for slot in [
        &mut config.ssh.identity_file,
        &mut config.oc.kubeconfig,
        &mut config.pull_secret_file,
    ] {
        if let Some(path) = slot.as_mut() {
            *path = expand_home(path, home);
        }
    }
}
