use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Yaml},
};

use crate::error::Error;

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub conversion: Conversion,
    #[serde(default)]
    pub references: References,
    #[serde(default)]
    pub mapping: Mapping,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default, PartialEq)]
pub struct Conversion {
    /// Hash unmapped Kotatsu source names into Mihon ids instead of skipping.
    #[serde(default)]
    pub allow_fallback: bool,
    /// Abort on the first unresolvable source instead of skipping the entry.
    #[serde(default)]
    pub strict: bool,
    /// Keep only entries whose source exists on both sides.
    #[serde(default)]
    pub common_only: bool,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default, PartialEq)]
pub struct References {
    pub root: Option<PathBuf>,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    /// Extra mapping table merged over the built-in one.
    pub table: Option<PathBuf>,
}

impl Config {
    /// Defaults, then `base.yaml` in `config_directory`, then `BKCONV_*`
    /// variables, then `REFERENCES_ROOT`.
    pub fn figment(config_directory: &Path) -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Yaml::file(config_directory.join("base.yaml")))
            .merge(Env::prefixed("BKCONV_").split("__"))
            .merge(
                Env::raw()
                    .only(&["REFERENCES_ROOT"])
                    .map(|_| "references.root".into()),
            )
    }
}

/// Reads configuration from `config_directory`, or `./configuration` when
/// none is given.
pub fn read_config(config_directory: Option<&Path>) -> Result<Config, Error> {
    let config_directory = match config_directory {
        Some(directory) => directory.to_path_buf(),
        None => std::env::current_dir()
            .map_err(|e| Error::Usage(format!("Failed to determine the current directory: {}", e)))?
            .join("configuration"),
    };

    let config: Config = Config::figment(&config_directory).extract()?;
    tracing::debug!(?config, directory = %config_directory.display(), "Configuration loaded");

    Ok(config)
}
