use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::{Path, PathBuf};

use super::{types::Config, ConfigError};

/// Config file picked up from the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "copcify.toml";

/// Bucket and prefix settings with the legacy variable that also sets each.
///
/// These are always taken verbatim from the environment: a folder named
/// `2024` must stay a string.
const LOCATION_ENV: [(&str, &str); 4] = [
    ("storage.source_bucket", "S3_SOURCE_BUCKET"),
    ("storage.source_prefix", "S3_SOURCE_FOLDER"),
    ("storage.dest_bucket", "S3_TARGET_BUCKET"),
    ("storage.dest_prefix", "S3_TARGET_FOLDER"),
];

/// Explicit path if given, otherwise `copcify.toml` when it exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            default.exists().then_some(default)
        }
    }
}

/// Load configuration from an optional file with environment variable overrides
///
/// Later layers win: defaults, the TOML file, the legacy `S3_*` variables,
/// then `COPCIFY_` variables with `__` separating sections.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let mut figment = Figment::new();

    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    // Env turns `2024` into a number, so the location settings are read
    // directly and merged as strings, the prefixed ones after Env.
    let figment = merge_location_env(figment, |_, legacy| legacy.to_string());
    let figment = figment.merge(Env::prefixed("COPCIFY_").split("__"));
    let config: Config = merge_location_env(figment, |key, _| prefixed_var(key))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn merge_location_env(
    mut figment: Figment,
    var_name: impl Fn(&str, &str) -> String,
) -> Figment {
    for (key, legacy) in LOCATION_ENV {
        if let Ok(value) = std::env::var(var_name(key, legacy)) {
            figment = figment.merge(Serialized::default(key, value));
        }
    }
    figment
}

/// `storage.dest_prefix` -> `COPCIFY_STORAGE__DEST_PREFIX`
fn prefixed_var(key: &str) -> String {
    format!("COPCIFY_{}", key.replace('.', "__").to_ascii_uppercase())
}
