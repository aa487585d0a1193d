// Connection settings: defaults, optional file, CELLAR_* environment, flags

use std::path::PathBuf;

use anyhow::Context;
use cellar_client::{
    ConnectionConfig,
    constants::{DEFAULT_HOST, DEFAULT_SCHEME, DEFAULT_TIMEOUT_MS},
};
use config::{Config, Environment, Map};

pub const ENV_PREFIX: &str = "CELLAR";

const SCHEME: &str = "scheme";
const HOST: &str = "host";
const TIMEOUT_MS: &str = "timeout_ms";

/// Connection values given on the command line
#[derive(Clone, Debug, Default)]
pub struct ConnectionOverrides {
    pub config_file: Option<PathBuf>,
    pub scheme: Option<String>,
    pub host: Option<String>,
    pub timeout_ms: Option<u64>,
}

/// Resolve the connection config. Later sources win: defaults, config file,
/// environment, command line. `env` replaces the process environment when set.
pub fn load(
    overrides: &ConnectionOverrides,
    env: Option<Map<String, String>>,
) -> anyhow::Result<ConnectionConfig> {
    let mut builder = Config::builder()
        .set_default(SCHEME, DEFAULT_SCHEME)?
        .set_default(HOST, DEFAULT_HOST)?
        .set_default(TIMEOUT_MS, DEFAULT_TIMEOUT_MS)?;

    if let Some(path) = &overrides.config_file {
        builder = builder.add_source(config::File::from(path.as_path()));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .source(env),
    );

    if let Some(v) = &overrides.scheme {
        builder = builder.set_override(SCHEME, v.as_str())?;
    }
    if let Some(v) = &overrides.host {
        builder = builder.set_override(HOST, v.as_str())?;
    }
    if let Some(v) = overrides.timeout_ms {
        builder = builder.set_override(TIMEOUT_MS, v)?;
    }

    let settings = builder
        .build()
        .context("Failed to build cellar connection settings")?;

    let timeout_ms = settings.get_int(TIMEOUT_MS)?;
    Ok(ConnectionConfig {
        scheme: settings.get_string(SCHEME)?,
        host: settings.get_string(HOST)?,
        timeout_ms: u64::try_from(timeout_ms)
            .with_context(|| format!("Invalid timeout_ms: {}", timeout_ms))?,
    }
    .normalized())
}
