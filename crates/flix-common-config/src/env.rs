//! Environment variable handling.

use crate::credentials::Credentials;
use crate::types::ClientOptions;
use flix_common_secret::SecretString;
use std::env;
use std::path::Path;
use thiserror::Error;

/// Environment variable errors.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("failed to load .env file: {0}")]
    DotenvError(#[from] dotenvy::Error),
}

/// Environment variable names.
pub mod vars {
    // Credentials
    pub const FLIX_CONSUMER_KEY: &str = "FLIX_CONSUMER_KEY";
    pub const FLIX_CONSUMER_SECRET: &str = "FLIX_CONSUMER_SECRET";
    pub const FLIX_OAUTH_TOKEN: &str = "FLIX_OAUTH_TOKEN";
    pub const FLIX_OAUTH_TOKEN_SECRET: &str = "FLIX_OAUTH_TOKEN_SECRET";

    // Configuration
    pub const FLIX_ENDPOINT: &str = "FLIX_ENDPOINT";
    pub const FLIX_CONFIG_PATH: &str = "FLIX_CONFIG_PATH";
    pub const FLIX_ENV: &str = "FLIX_ENV";
}

/// Access to `FLIX_*` environment variables.
pub struct Environment;

impl Environment {
    /// Load `.env` files from the working directory. See
    /// [`Environment::init_in`].
    pub fn init() -> Result<(), EnvError> {
        Self::init_in(".")
    }

    /// Load `.env.$FLIX_ENV`, `.env.local` and `.env` from `dir` into the
    /// process environment. Missing files are skipped. Variables already
    /// set are never overwritten, so the first file to name a variable
    /// wins.
    pub fn init_in(dir: impl AsRef<Path>) -> Result<(), EnvError> {
        let dir = dir.as_ref();
        if let Some(env) = Self::get(vars::FLIX_ENV) {
            load_dotenv(&dir.join(format!(".env.{env}")))?;
        }
        load_dotenv(&dir.join(".env.local"))?;
        load_dotenv(&dir.join(".env"))
    }

    /// Get an optional string variable. Empty values count as unset.
    pub fn get(var: &str) -> Option<String> {
        env::var(var).ok().filter(|v| !v.is_empty())
    }
}

fn load_dotenv(file: &Path) -> Result<(), EnvError> {
    match dotenvy::from_filename(file) {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Client options taken from the process environment.
pub fn options_from_env() -> ClientOptions {
    options_from_lookup(Environment::get)
}

/// Client options built from an arbitrary variable lookup.
pub fn options_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ClientOptions {
    let secret = |var: &str| lookup(var).map(SecretString::new);

    ClientOptions {
        endpoint: lookup(vars::FLIX_ENDPOINT),
        credentials: Credentials {
            consumer_key: secret(vars::FLIX_CONSUMER_KEY),
            consumer_secret: secret(vars::FLIX_CONSUMER_SECRET),
            token: secret(vars::FLIX_OAUTH_TOKEN),
            token_secret: secret(vars::FLIX_OAUTH_TOKEN_SECRET),
        },
        ..ClientOptions::default()
    }
}
