//! Configure the asset builder.

pub mod toml;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::{
    cli::Opts,
    util::path::{canonicalize_missing, PathExt},
};

/// Configuration file looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = "prebuild.toml";

/// Configuration for the asset builder.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory of input files.
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Directory of output files.
    ///
    /// The directory is removed and recreated on each build.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Maximum number of files processed concurrently.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// WebP encoding quality, from `0` to `100`.
    #[serde(default = "default_image_quality")]
    pub image_quality: f32,

    /// Variables available to HTML templates.
    #[serde(default)]
    pub context: ::toml::Table,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            batch_size: default_batch_size(),
            image_quality: default_image_quality(),
            context: Default::default(),
        }
    }
}

/// Default value for `input_dir`.
pub fn default_input_dir() -> PathBuf {
    PathBuf::from("site")
}

/// Default value for `output_dir`.
pub fn default_output_dir() -> PathBuf {
    PathBuf::from("cache")
}

/// Default value for `batch_size`.
pub fn default_batch_size() -> usize {
    50
}

/// Default value for `image_quality`.
pub fn default_image_quality() -> f32 {
    80.0
}

impl Config {
    /// Create a configuration from a [`Opts`] object.
    ///
    /// Values are layered: defaults, then the configuration file (if any),
    /// then command line options. The result is normalized and checked.
    pub fn from_opts(opts: &Opts) -> Result<Self> {
        let config_path = opts.config.clone().or_else(|| {
            Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|path| path.exists())
        });

        let config = match config_path {
            Some(config_path) => Self::from_file(&config_path)?,
            None => Self::default(),
        };

        let config = Self {
            input_dir: opts.input.clone().unwrap_or(config.input_dir),
            output_dir: opts.output.clone().unwrap_or(config.output_dir),
            batch_size: opts.batch_size.unwrap_or(config.batch_size),
            image_quality: opts.quality.unwrap_or(config.image_quality),
            ..config
        };

        let config = config.normalize()?;

        config.check()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// Relative directories are resolved against the directory containing
    /// the file.
    pub fn from_file(config_path: impl AsRef<Path>) -> Result<Self> {
        let config_path = config_path.as_ref();

        let config: Self = self::toml::read_file(config_path)
            .with_context(|| format!("reading configuration file {config_path:?}"))?;

        let base_dir = std::env::current_dir()?
            .join(config_path)
            .normalize()
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| anyhow!("invalid configuration path {config_path:?}"))?;

        Ok(Self {
            input_dir: base_dir.join(config.input_dir),
            output_dir: base_dir.join(config.output_dir),
            ..config
        })
    }

    /// Normalize configuration.
    ///
    /// Make all paths absolute. The input directory must exist.
    pub fn normalize(self) -> Result<Self> {
        let current_dir = std::env::current_dir()?;

        let input_dir = self
            .input_dir
            .canonicalize()
            .with_context(|| format!("input directory {:?} not found", self.input_dir))?;

        let output_dir = canonicalize_missing(current_dir.join(&self.output_dir).normalize())
            .with_context(|| format!("resolving output directory {:?}", self.output_dir))?;

        Ok(Self {
            input_dir,
            output_dir,
            ..self
        })
    }

    /// Check if configuration is valid.
    pub fn check(&self) -> Result<()> {
        debug_assert!(self.input_dir.is_absolute());
        debug_assert!(self.output_dir.is_absolute());

        if self.batch_size == 0 {
            return Err(anyhow!("`batch_size` must be greater than 0"));
        }

        if !(0.0..=100.0).contains(&self.image_quality) {
            return Err(anyhow!(
                "`image_quality` must be between 0 and 100, got {}",
                self.image_quality
            ));
        }

        // Prevent removing input files
        if self.input_dir.starts_with(&self.output_dir) {
            return Err(anyhow!("`input_dir` must be located outside `output_dir`"));
        }

        Ok(())
    }
}
