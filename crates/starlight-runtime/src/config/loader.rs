//! Layered loading of [`StarlightConfig`] with figment.
//!
//! Later sources override earlier ones:
//!
//! 1. built-in defaults
//! 2. values passed to [`ConfigLoader::merge`]
//! 3. the profile variant of the config file (`starlight.production.toml`)
//! 4. the config file itself (`starlight.toml`)
//! 5. `STARLIGHT_*` environment variables, `__` separating nested keys
//!    (`STARLIGHT_PAGINATION__TIMEOUT_SECS=60`)
//!
//! Config files are looked up in each search path in turn; the first
//! directory holding a `starlight.*` or `config.*` file wins. TOML needs the
//! `toml-config` feature (on by default), YAML needs `yaml-config`.
//!
//! ```rust,ignore
//! let config = ConfigLoader::new()
//!     .profile("production")
//!     .search_path("/etc/my-bot")
//!     .load()?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
#[cfg(any(feature = "toml-config", feature = "yaml-config"))]
use figment::providers::Format;
#[cfg(feature = "toml-config")]
use figment::providers::Toml;
#[cfg(feature = "yaml-config")]
use figment::providers::Yaml;
use figment::providers::{Env, Serialized};
use tracing::{debug, info, trace, warn};

use super::error::{ConfigError, ConfigResult};
use super::schema::StarlightConfig;
use super::validation::validate_config;

const ENV_PREFIX: &str = "STARLIGHT_";
const PROFILE_VAR: &str = "STARLIGHT_PROFILE";
const FILE_STEMS: [&str; 2] = ["starlight", "config"];

// =============================================================================
// Formats
// =============================================================================

/// A config file format compiled into this build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    #[cfg(feature = "toml-config")]
    Toml,
    #[cfg(feature = "yaml-config")]
    Yaml,
}

impl FileFormat {
    /// Enabled formats, in lookup order.
    pub const ENABLED: &'static [FileFormat] = &[
        #[cfg(feature = "toml-config")]
        FileFormat::Toml,
        #[cfg(feature = "yaml-config")]
        FileFormat::Yaml,
    ];

    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => &["toml"],
            #[cfg(feature = "yaml-config")]
            Self::Yaml => &["yaml", "yml"],
        }
    }

    /// The format that reads `path`, judged by its extension.
    pub fn for_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ENABLED
            .iter()
            .copied()
            .find(|format| format.extensions().contains(&ext))
    }

    fn merge_into(self, figment: Figment, path: &Path) -> Figment {
        match self {
            #[cfg(feature = "toml-config")]
            Self::Toml => figment.merge(Toml::file(path)),
            #[cfg(feature = "yaml-config")]
            Self::Yaml => figment.merge(Yaml::file(path)),
        }
    }
}

// =============================================================================
// Profile
// =============================================================================

/// Selects the `starlight.{profile}.*` overlay file.
///
/// Names are lowercased; `dev` and `prod` expand to their long forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile(String);

impl Profile {
    pub const DEVELOPMENT: &'static str = "development";
    pub const PRODUCTION: &'static str = "production";

    pub fn new(name: &str) -> Self {
        let name = name.trim().to_lowercase();
        Self(match name.as_str() {
            "dev" => Self::DEVELOPMENT.to_string(),
            "prod" => Self::PRODUCTION.to_string(),
            _ => name,
        })
    }

    /// Reads `STARLIGHT_PROFILE`, defaulting to development.
    pub fn from_env() -> Self {
        std::env::var(PROFILE_VAR)
            .map(|name| Self::new(&name))
            .unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_production(&self) -> bool {
        self.0 == Self::PRODUCTION
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self(Self::DEVELOPMENT.to_string())
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// ConfigLoader
// =============================================================================

/// Builds a [`StarlightConfig`] from defaults, files and the environment.
pub struct ConfigLoader {
    overrides: Figment,
    profile: Profile,
    search_paths: Vec<PathBuf>,
    file: Option<PathBuf>,
    read_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            overrides: Figment::new(),
            profile: Profile::from_env(),
            search_paths: Vec::new(),
            file: None,
            read_env: true,
        }
    }

    pub fn profile(mut self, name: impl AsRef<str>) -> Self {
        self.profile = Profile::new(name.as_ref());
        self
    }

    /// Adds a directory to look for config files in.
    ///
    /// Without any, the working directory and `<user config dir>/starlight`
    /// are searched.
    pub fn search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_paths.push(dir.into());
        self
    }

    pub fn with_current_dir(self) -> Self {
        match std::env::current_dir() {
            Ok(cwd) => self.search_path(cwd),
            Err(_) => self,
        }
    }

    pub fn with_user_config_dir(self) -> Self {
        match user_config_dir() {
            Some(dir) => self.search_path(dir),
            None => self,
        }
    }

    /// Reads exactly this file, skipping the search. It must exist.
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    pub fn with_env(mut self) -> Self {
        self.read_env = true;
        self
    }

    pub fn without_env(mut self) -> Self {
        self.read_env = false;
        self
    }

    /// Layers `config` above the defaults and below files and environment.
    pub fn merge(mut self, config: StarlightConfig) -> Self {
        self.overrides = self.overrides.merge(Serialized::defaults(config));
        self
    }

    /// The files [`load`](Self::load) would read, lowest priority first.
    pub fn discover(&self) -> ConfigResult<Vec<PathBuf>> {
        if let Some(path) = &self.file {
            if !path.exists() {
                return Err(ConfigError::MissingFile(path.clone()));
            }
            if FileFormat::for_path(path).is_none() {
                return Err(ConfigError::UnknownFormat { path: path.clone() });
            }
            return Ok(vec![path.clone()]);
        }

        let dirs: Vec<PathBuf> = if self.search_paths.is_empty() {
            std::env::current_dir()
                .ok()
                .into_iter()
                .chain(user_config_dir())
                .collect()
        } else {
            self.search_paths.clone()
        };

        for dir in &dirs {
            if let Some(files) = self.discover_in(dir) {
                return Ok(files);
            }
        }
        warn!(search_paths = ?dirs, "No configuration file found, using defaults");
        Ok(Vec::new())
    }

    /// The profile variant and base file of the first name present in `dir`.
    fn discover_in(&self, dir: &Path) -> Option<Vec<PathBuf>> {
        for stem in FILE_STEMS {
            for format in FileFormat::ENABLED {
                for ext in format.extensions() {
                    let overlay = dir.join(format!("{stem}.{}.{ext}", self.profile));
                    let base = dir.join(format!("{stem}.{ext}"));
                    let files: Vec<_> = [overlay, base].into_iter().filter(|p| p.exists()).collect();
                    if !files.is_empty() {
                        return Some(files);
                    }
                }
            }
        }
        None
    }

    /// Loads, extracts and validates the configuration.
    pub fn load(self) -> ConfigResult<StarlightConfig> {
        let files = self.discover()?;

        let mut figment =
            Figment::from(Serialized::defaults(StarlightConfig::default())).merge(self.overrides);
        for path in &files {
            let Some(format) = FileFormat::for_path(path) else {
                continue;
            };
            info!(path = %path.display(), "Loading configuration file");
            figment = format.merge_into(figment, path);
        }
        if self.read_env {
            trace!(prefix = ENV_PREFIX, "Reading environment overrides");
            figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        }

        let config: StarlightConfig = figment.extract().map_err(Box::new)?;
        validate_config(&config)?;
        debug!(
            profile = %self.profile,
            files = files.len(),
            level = %config.logging.level,
            "Configuration loaded"
        );
        Ok(config)
    }
}

fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("starlight"))
}

/// Loads configuration from the default locations.
pub fn load_config() -> ConfigResult<StarlightConfig> {
    ConfigLoader::new().load()
}

/// Loads one file plus environment overrides.
pub fn load_config_from_file(path: impl Into<PathBuf>) -> ConfigResult<StarlightConfig> {
    ConfigLoader::new().file(path).load()
}
