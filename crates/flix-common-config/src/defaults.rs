//! Process-wide client defaults.
//!
//! Every client resolves its own [`ClientOptions`] over these defaults when
//! it is constructed. Layers, highest priority first:
//!
//! 1. values set through [`configure`]
//! 2. `FLIX_*` environment variables, including those loaded from `.env`
//!    files in the working directory
//! 3. the YAML config file (`.flix/config.yaml`, or `FLIX_CONFIG_PATH`)
//! 4. built-in defaults

use crate::env::{options_from_env, vars, Environment};
use crate::loader::{ConfigError, ConfigLoader};
use crate::types::{ClientConfig, ClientOptions};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::path::Path;

static CONFIGURED: Lazy<RwLock<ClientOptions>> = Lazy::new(|| RwLock::new(ClientOptions::default()));

/// Adjust the process-wide defaults.
///
/// Clients that already exist keep the configuration they were built with.
pub fn configure(f: impl FnOnce(&mut ClientOptions)) {
    f(&mut CONFIGURED.write());
}

/// Drop everything set through [`configure`].
pub fn reset() {
    *CONFIGURED.write() = ClientOptions::default();
}

/// Options currently set through [`configure`].
pub fn configured() -> ClientOptions {
    CONFIGURED.read().clone()
}

/// The loader for the process-wide config file under `dir`, unless
/// `FLIX_CONFIG_PATH` names another file.
pub fn config_loader(dir: &Path) -> ConfigLoader {
    match Environment::get(vars::FLIX_CONFIG_PATH) {
        Some(path) => ConfigLoader::from_file(path),
        None => ConfigLoader::new(dir),
    }
}

/// Resolve the full process-wide defaults for the working directory.
pub fn defaults() -> Result<ClientConfig, ConfigError> {
    let dir = std::env::current_dir()?;
    defaults_in(&dir)
}

/// Resolve the full process-wide defaults, reading `.env` files and
/// `.flix/config.yaml` from `dir`.
pub fn defaults_in(dir: &Path) -> Result<ClientConfig, ConfigError> {
    Environment::init_in(dir)?;

    let file = config_loader(dir).load()?;

    let layered = configured().or(options_from_env()).or(file);
    layered.resolve(&ClientConfig::default())
}

/// Resolve per-client options over the process-wide defaults.
pub fn resolve(options: ClientOptions) -> Result<ClientConfig, ConfigError> {
    let base = defaults()?;
    options.resolve(&base)
}
