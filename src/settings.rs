//! Layered configuration loading.
//!
//! Sources, lowest precedence first: built-in defaults, the per-user config
//! file, an explicit `--config` file, `SAYONARA_SHRED_*` environment variables,
//! and finally command-line overrides applied by the caller.

use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File};
use directories::ProjectDirs;

use crate::error::{ShredError, ShredResult};
use crate::io::IOMode;
use crate::{Method, ShredConfig};

/// Environment variable prefix, e.g. `SAYONARA_SHRED_METHOD=dod-3-pass`
pub const ENV_PREFIX: &str = "SAYONARA_SHRED";

const CONFIG_FILE_NAME: &str = "config.toml";

/// `<config dir>/sayonara-shred/config.toml` for the current user, if a home
/// directory can be determined
pub fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sayonara-shred").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Load the configuration from every standard layer.
///
/// `explicit` must exist if given; the per-user file is optional.
pub fn load(explicit: Option<&Path>) -> ShredResult<ShredConfig> {
    load_layers(user_config_path().as_deref(), explicit, Some(ENV_PREFIX))
}

/// Load from the given layers only. File formats are inferred from the
/// extension (TOML, JSON and YAML are accepted).
pub fn load_layers(
    user_file: Option<&Path>,
    explicit: Option<&Path>,
    env_prefix: Option<&str>,
) -> ShredResult<ShredConfig> {
    let mut builder = Config::builder();

    if let Some(path) = user_file {
        tracing::debug!(path = %path.display(), "Checking user config file");
        builder = builder.add_source(File::from(path).required(false));
    }
    if let Some(path) = explicit {
        tracing::debug!(path = %path.display(), "Loading config file");
        builder = builder.add_source(File::from(path).required(true));
    }
    if let Some(prefix) = env_prefix {
        builder = builder.add_source(Environment::with_prefix(prefix).try_parsing(true));
    }

    let config: ShredConfig = builder
        .build()
        .and_then(|c| c.try_deserialize())
        .map_err(|e| ShredError::Config(e.to_string()))?;

    config.validate()?;
    Ok(config)
}

/// Command-line values that take precedence over every config layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub method: Option<Method>,
    pub passes: Option<u32>,
    pub verify: Option<bool>,
    pub repetitions: Option<u32>,
    pub io_mode: Option<IOMode>,
    pub chunk_size: Option<usize>,
    pub jobs: Option<usize>,
}

impl Overrides {
    /// Apply onto `config` and re-validate the result
    pub fn apply(&self, mut config: ShredConfig) -> ShredResult<ShredConfig> {
        if let Some(method) = self.method {
            config.method = method;
        }
        if self.passes.is_some() {
            config.passes = self.passes;
        }
        if self.verify.is_some() {
            config.verify = self.verify;
        }
        if let Some(repetitions) = self.repetitions {
            config.repetitions = repetitions;
        }
        if let Some(io_mode) = self.io_mode {
            config.io_mode = io_mode;
        }
        if let Some(chunk_size) = self.chunk_size {
            config.chunk_size = chunk_size;
        }
        if let Some(jobs) = self.jobs {
            config.jobs = jobs;
        }

        config.validate()?;
        Ok(config)
    }
}
