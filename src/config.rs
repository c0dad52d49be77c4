use std::env;
use std::fs::File;
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;

use permcat_definitions::CALICO_API_GROUP;

use super::filebacked::ClusterState;
use super::{Calculator, ErrorKind, ResourceCatalog, Result};

fn default_primary_group() -> String {
    CALICO_API_GROUP.to_string()
}

fn default_state() -> PathBuf {
    PathBuf::from("cluster.yml")
}

/// Configuration for the permcat binary
///
/// Read from `permcat.yml` in `PERMCAT_CONFIG_DIR` or the working directory.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Api group owning tiers and tiered policies
    #[serde(default = "default_primary_group")]
    pub primaryApiGroup: String,

    /// Minimum number of seconds between resource catalog reloads
    #[serde(default)]
    pub minRefreshIntervalSecs: u64,

    /// Cluster state file, relative to the config directory
    #[serde(default = "default_state")]
    pub state: PathBuf,

    #[serde(skip)]
    pub dir: PathBuf,
}

impl Config {
    pub fn read_from(dir: &Path) -> Result<Config> {
        let cpath = dir.join("permcat.yml");
        trace!("Using config in {}", cpath.display());
        if !cpath.exists() {
            bail!(ErrorKind::MissingConfig(dir.display().to_string()));
        }
        let mut f = File::open(&cpath)?;
        let mut data = String::new();
        f.read_to_string(&mut data)?;
        let mut conf: Config = serde_yaml::from_str(&data)?;
        conf.dir = dir.to_path_buf();
        Ok(conf)
    }

    /// Read the config from `PERMCAT_CONFIG_DIR` or the working directory
    pub fn read() -> Result<Config> {
        let dir = match env::var("PERMCAT_CONFIG_DIR") {
            Ok(d) => PathBuf::from(d),
            Err(_) => PathBuf::from("."),
        };
        Config::read_from(&dir)
    }

    pub fn verify(&self) -> Result<()> {
        let group_re = Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$")?;
        if !group_re.is_match(&self.primaryApiGroup) {
            bail!(ErrorKind::InvalidConfig(format!(
                "primaryApiGroup '{}' is not a valid api group",
                self.primaryApiGroup
            )));
        }
        if !self.state_path().exists() {
            bail!(ErrorKind::InvalidConfig(format!(
                "state file {} does not exist",
                self.state_path().display()
            )));
        }
        Ok(())
    }

    /// Print Config to stdout
    pub fn print(&self) -> Result<()> {
        println!("{}", serde_yaml::to_string(self)?);
        Ok(())
    }

    pub fn state_path(&self) -> PathBuf {
        self.dir.join(&self.state)
    }

    pub fn min_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.minRefreshIntervalSecs)
    }

    /// Build a calculator over the configured cluster state
    pub fn calculator(&self) -> Result<Calculator> {
        let state = Arc::new(ClusterState::read_from(&self.state_path())?);
        let catalog = ResourceCatalog::new(state.clone())
            .with_primary_group(&self.primaryApiGroup)
            .with_min_refresh_interval(self.min_refresh_interval());
        Ok(Calculator::new(Arc::new(catalog), state))
    }
}
