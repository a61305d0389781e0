use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::core::UnknownKindPolicy;
use crate::error::{Error, Result};

const CONFIG_BASENAME: &str = "gasgrid";
const ENV_PREFIX: &str = "GASGRID";

/// Runtime settings for a simulator instance.
///
/// Sources, lowest precedence first: built-in defaults, `gasgrid.toml`, `gasgrid.ron`,
/// then `GASGRID__*` environment variables (e.g. `GASGRID__GRID__WIDTH=64`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimConfig {
    pub grid: GridConfig,
    pub store: StoreConfig,
    pub unknown_kind: UnknownKindPolicy,
}

/// Shape and seed of generated grids.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GridConfig {
    pub width: u32,
    pub height: u32,
    /// Seed for the initial grid; random when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Where the current snapshot lives.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoreConfig {
    pub path: PathBuf,
    /// Drop any persisted snapshot when the simulator opens.
    pub clear_on_start: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig {
                width: 200,
                height: 200,
                seed: None,
            },
            store: StoreConfig {
                path: PathBuf::from("gasgrid.json"),
                clear_on_start: true,
            },
            unknown_kind: UnknownKindPolicy::TreatAsEmpty,
        }
    }
}

impl SimConfig {
    /// Reject settings the simulator cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(Error::InvalidParam(format!(
                "grid dimensions must be > 0, got {}x{}",
                self.grid.width, self.grid.height
            )));
        }
        if self.store.path.as_os_str().is_empty() {
            return Err(Error::InvalidParam("store.path must not be empty".into()));
        }
        Ok(())
    }
}

/// Load configuration from the working directory and environment, falling back to
/// defaults when anything goes wrong.
pub fn load_config() -> SimConfig {
    or_defaults(try_load_config(None))
}

fn or_defaults(loaded: Result<SimConfig>) -> SimConfig {
    match loaded {
        Ok(config) => config,
        Err(error) => {
            log::warn!("Failed to load config, using defaults: {error}");
            SimConfig::default()
        }
    }
}

/// Load and validate configuration. `path` names an explicit TOML/RON file (format
/// taken from its extension) that must exist; without it the default basename is
/// looked up and is optional.
pub fn try_load_config(path: Option<&Path>) -> Result<SimConfig> {
    load_layered(
        path,
        Path::new("."),
        Environment::with_prefix(ENV_PREFIX).separator("__"),
    )
}

fn load_layered(path: Option<&Path>, search_dir: &Path, env: Environment) -> Result<SimConfig> {
    let defaults = SimConfig::default();

    let mut builder = Config::builder()
        .set_default("grid.width", defaults.grid.width)?
        .set_default("grid.height", defaults.grid.height)?
        .set_default("store.path", defaults.store.path.to_string_lossy().into_owned())?
        .set_default("store.clear_on_start", defaults.store.clear_on_start)?
        .set_default("unknown_kind", "treat_as_empty")?;

    builder = match path {
        Some(p) => builder.add_source(File::from(p).required(true)),
        None => {
            let base = search_dir.join(CONFIG_BASENAME);
            let base = base.to_string_lossy();
            builder
                .add_source(File::new(&base, FileFormat::Toml).required(false))
                .add_source(File::new(&base, FileFormat::Ron).required(false))
        }
    };

    let config: SimConfig = builder.add_source(env).build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
