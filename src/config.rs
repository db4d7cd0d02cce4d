use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Login credentials, treated as opaque strings. Format validation is
/// the site's problem.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Load credentials from a file layered under `OKC_*` environment
/// variables. Without an explicit path, `okc-backup.{toml,yaml,json}`
/// in the working directory is picked up if present.
pub fn load(path: Option<&Path>) -> Result<Credentials> {
    let builder = match path {
        Some(p) => config::Config::builder().add_source(config::File::from(p)),
        None => config::Config::builder()
            .add_source(config::File::with_name("okc-backup").required(false)),
    };

    let settings = builder
        .add_source(config::Environment::with_prefix("OKC"))
        .build()
        .context("Failed to load configuration")?;

    settings
        .try_deserialize()
        .context("Configuration must supply username and password")
}
