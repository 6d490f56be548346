//! Configuration for `NuPlanner`
//!
//! Settings live in a TOML file under the platform config directory. The
//! compiled-in defaults differ between debug and release builds, and values
//! may reference `$NU_PLANNER`, which expands to that directory.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

#[cfg(not(debug_assertions))]
const CONFIG_DEFAULTS: &str = include_str!("../assets/DefaultCLIConfigRelease.toml");

#[cfg(debug_assertions)]
const CONFIG_DEFAULTS: &str = include_str!("../assets/DefaultCLIConfigDebug.toml");

#[cfg(not(debug_assertions))]
const CONFIG_FILE_NAME: &str = "config.toml";

#[cfg(debug_assertions)]
const CONFIG_FILE_NAME: &str = "dconfig.toml";

const DIR_VARIABLE: &str = "$NU_PLANNER";

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    #[serde(default)]
    pub level: String,
    /// Log file path
    #[serde(default)]
    pub file: String,
    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,
}

/// Where catalog data is read from and cached
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory of catalog CSV sheets
    #[serde(default)]
    pub catalog_dir: String,
    /// JSON snapshot of the constructed catalog
    #[serde(default)]
    pub cache_file: String,
}

/// Solver settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Wall-clock budget per solve in seconds; 0 disables the limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<u64>,
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Logging settings
    pub logging: LoggingConfig,
    /// Path settings
    #[serde(default)]
    pub paths: PathsConfig,
    /// Solver settings
    #[serde(default)]
    pub solver: SolverConfig,
}

/// Optional CLI overrides for configuration values
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override logging level
    pub level: Option<String>,
    /// Override log file path
    pub file: Option<String>,
    /// Override verbose flag
    pub verbose: Option<bool>,
    /// Override catalog sheet directory
    pub catalog_dir: Option<String>,
    /// Override cache file
    pub cache_file: Option<String>,
    /// Override solver time limit
    pub time_limit_secs: Option<u64>,
}

impl Config {
    /// Get the `$NU_PLANNER` directory path
    ///
    /// Returns:
    /// - Linux: `~/.config/nuplanner`
    /// - macOS: `~/Library/Application Support/nuplanner`
    /// - Windows: `%APPDATA%\nuplanner`
    #[must_use]
    pub fn get_nuplanner_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nuplanner")
    }

    /// Fill empty fields from `defaults`
    ///
    /// Lets an older config file pick up settings added since it was written.
    /// Returns `true` if anything changed.
    #[allow(clippy::useless_let_if_seq)]
    pub fn merge_defaults(&mut self, defaults: &Self) -> bool {
        let mut changed = false;

        if self.logging.level.is_empty() && !defaults.logging.level.is_empty() {
            self.logging.level.clone_from(&defaults.logging.level);
            changed = true;
        }
        if self.logging.file.is_empty() && !defaults.logging.file.is_empty() {
            self.logging.file.clone_from(&defaults.logging.file);
            changed = true;
        }

        if self.paths.catalog_dir.is_empty() && !defaults.paths.catalog_dir.is_empty() {
            self.paths
                .catalog_dir
                .clone_from(&defaults.paths.catalog_dir);
            changed = true;
        }
        if self.paths.cache_file.is_empty() && !defaults.paths.cache_file.is_empty() {
            self.paths.cache_file.clone_from(&defaults.paths.cache_file);
            changed = true;
        }

        if self.solver.time_limit_secs.is_none() && defaults.solver.time_limit_secs.is_some() {
            self.solver.time_limit_secs = defaults.solver.time_limit_secs;
            changed = true;
        }

        changed
    }

    /// Apply CLI-provided overrides for this run only
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(level) = &overrides.level {
            self.logging.level.clone_from(level);
        }
        if let Some(file) = &overrides.file {
            self.logging.file.clone_from(file);
        }
        if let Some(verbose) = overrides.verbose {
            self.logging.verbose = verbose;
        }

        if let Some(catalog_dir) = &overrides.catalog_dir {
            self.paths.catalog_dir = Self::expand_variables(catalog_dir);
        }
        if let Some(cache_file) = &overrides.cache_file {
            self.paths.cache_file = Self::expand_variables(cache_file);
        }

        if let Some(secs) = overrides.time_limit_secs {
            self.solver.time_limit_secs = Some(secs);
        }
    }

    /// Solver time budget, `None` when unlimited
    #[must_use]
    pub fn time_limit(&self) -> Option<Duration> {
        self.solver
            .time_limit_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Full path of the user config file
    ///
    /// `config.toml` for release builds and `dconfig.toml` for debug builds,
    /// inside [`get_nuplanner_dir`](Self::get_nuplanner_dir).
    #[must_use]
    pub fn get_config_file_path() -> PathBuf {
        Self::get_nuplanner_dir().join(CONFIG_FILE_NAME)
    }

    fn expand_variables(value: &str) -> String {
        if value.contains(DIR_VARIABLE) {
            let dir = Self::get_nuplanner_dir();
            value.replace(DIR_VARIABLE, dir.to_str().unwrap_or("."))
        } else {
            value.to_string()
        }
    }

    /// Parse a TOML string and expand `$NU_PLANNER` in path values
    ///
    /// # Errors
    /// Returns an error if the TOML cannot be parsed or doesn't match the schema.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        let mut config: Self = toml::from_str(toml_str)?;

        config.logging.file = Self::expand_variables(&config.logging.file);
        config.paths.catalog_dir = Self::expand_variables(&config.paths.catalog_dir);
        config.paths.cache_file = Self::expand_variables(&config.paths.cache_file);

        Ok(config)
    }

    /// Compiled-in defaults for this build profile
    ///
    /// # Panics
    /// Panics if the embedded defaults are not valid TOML, which the test
    /// suite rules out.
    #[must_use]
    pub fn from_defaults() -> Self {
        Self::from_toml(CONFIG_DEFAULTS).expect("Failed to parse compiled-in default configuration")
    }

    /// Load the user config, creating it from defaults on first run
    ///
    /// An existing file is merged with the defaults and rewritten when new
    /// fields were added. Any read or parse failure falls back to defaults.
    #[must_use]
    pub fn load() -> Self {
        let config_file = Self::get_config_file_path();
        let defaults = Self::from_defaults();

        if config_file.exists() {
            if let Ok(content) = fs::read_to_string(&config_file) {
                if let Ok(mut config) = Self::from_toml(&content) {
                    if config.merge_defaults(&defaults) {
                        let _ = config.save();
                    }
                    return config;
                }
            }
        } else {
            if let Some(parent) = config_file.parent() {
                let _ = fs::create_dir_all(parent);
            }
            let _ = defaults.save();
            return defaults;
        }

        defaults
    }

    /// Write the configuration to the user config file
    ///
    /// # Errors
    /// Returns an error if the directory cannot be created or the file written.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let config_file = Self::get_config_file_path();
        if let Some(parent) = config_file.parent() {
            fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        fs::write(&config_file, toml_str)?;
        Ok(())
    }

    /// Get a configuration value by key
    ///
    /// Keys: `level`, `file`, `verbose`, `catalog_dir`, `cache_file`,
    /// `time_limit_secs` (dashes accepted in place of underscores).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "level" => Some(self.logging.level.clone()),
            "file" => Some(self.logging.file.clone()),
            "verbose" => Some(self.logging.verbose.to_string()),
            "catalog_dir" | "catalog-dir" => Some(self.paths.catalog_dir.clone()),
            "cache_file" | "cache-file" => Some(self.paths.cache_file.clone()),
            "time_limit_secs" | "time-limit-secs" => Some(
                self.solver
                    .time_limit_secs
                    .map_or_else(String::new, |secs| secs.to_string()),
            ),
            _ => None,
        }
    }

    /// Set a configuration value by key
    ///
    /// Only the in-memory config changes; call [`save`](Self::save) to persist.
    ///
    /// # Errors
    /// Returns an error for an unknown key or an unparsable value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "level" => self.logging.level = value.to_string(),
            "file" => self.logging.file = value.to_string(),
            "verbose" => {
                self.logging.verbose = value
                    .parse::<bool>()
                    .map_err(|_| format!("Invalid boolean value for 'verbose': '{value}'"))?;
            }
            "catalog_dir" | "catalog-dir" => self.paths.catalog_dir = value.to_string(),
            "cache_file" | "cache-file" => self.paths.cache_file = value.to_string(),
            "time_limit_secs" | "time-limit-secs" => {
                let secs = value.parse::<u64>().map_err(|_| {
                    format!("Invalid number of seconds for 'time_limit_secs': '{value}'")
                })?;
                self.solver.time_limit_secs = Some(secs);
            }
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Reset one key to its value in `defaults`
    ///
    /// # Errors
    /// Returns an error if the key is not recognized.
    pub fn unset(&mut self, key: &str, defaults: &Self) -> Result<(), String> {
        match key {
            "level" => self.logging.level.clone_from(&defaults.logging.level),
            "file" => self.logging.file.clone_from(&defaults.logging.file),
            "verbose" => self.logging.verbose = defaults.logging.verbose,
            "catalog_dir" | "catalog-dir" => self
                .paths
                .catalog_dir
                .clone_from(&defaults.paths.catalog_dir),
            "cache_file" | "cache-file" => self
                .paths
                .cache_file
                .clone_from(&defaults.paths.cache_file),
            "time_limit_secs" | "time-limit-secs" => {
                self.solver.time_limit_secs = defaults.solver.time_limit_secs;
            }
            _ => return Err(format!("Unknown config key: '{key}'")),
        }
        Ok(())
    }

    /// Delete the user config file so the next [`load`](Self::load) recreates it
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be removed.
    pub fn reset() -> Result<(), std::io::Error> {
        let config_file = Self::get_config_file_path();
        if config_file.exists() {
            fs::remove_file(config_file)?;
        }
        Ok(())
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[logging]")?;
        writeln!(f, "  level = \"{}\"", self.logging.level)?;
        writeln!(f, "  file = \"{}\"", self.logging.file)?;
        writeln!(f, "  verbose = {}", self.logging.verbose)?;

        writeln!(f, "\n[paths]")?;
        writeln!(f, "  catalog_dir = \"{}\"", self.paths.catalog_dir)?;
        writeln!(f, "  cache_file = \"{}\"", self.paths.cache_file)?;

        writeln!(f, "\n[solver]")?;
        match self.solver.time_limit_secs {
            Some(secs) => writeln!(f, "  time_limit_secs = {secs}")?,
            None => writeln!(f, "  # time_limit_secs unset")?,
        }

        Ok(())
    }
}
