use super::errors::{ErrorKind, Result};
use log::info;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Knobs for turning level tables into flat meshes.
#[derive(Debug, Copy, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Size of one flat tile, in map units.
    pub flat_size: f32,

    /// Whether `F_SKY1` floors and ceilings get vertices.
    pub mesh_sky_flats: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            flat_size: 64.0,
            mesh_sky_flats: false,
        }
    }
}

impl BuildConfig {
    pub fn from_file<P: AsRef<Path>>(path: &P) -> Result<BuildConfig> {
        let path = path.as_ref();
        info!("Loading build config from {:?}...", path);
        let contents = fs::read_to_string(path).map_err(|error| {
            ErrorKind::Config(format!("could not read {:?}: {}", path, error))
        })?;
        BuildConfig::from_text(&contents)
    }

    pub fn from_text(text: &str) -> Result<BuildConfig> {
        let config: BuildConfig =
            toml::from_str(text).map_err(|error| ErrorKind::Config(error.to_string()))?;
        if !(config.flat_size.is_finite() && config.flat_size > 0.0) {
            return Err(ErrorKind::Config(format!(
                "flat_size must be positive, got {}",
                config.flat_size
            ))
            .into());
        }
        Ok(config)
    }
}
