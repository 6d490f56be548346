//! CLI argument definitions for `NuPlanner`

use clap::{builder::BoolishValueParser, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use nu_planner::config::ConfigOverrides;
use nu_planner::logger::Level;

/// CLI log level argument
#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub enum LogLevelArg {
    /// Error-level logging
    Error,
    /// Warning-level logging
    Warn,
    /// Info-level logging
    Info,
    /// Debug-level logging
    Debug,
}

impl From<LogLevelArg> for Level {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => Self::Error,
            LogLevelArg::Warn => Self::Warn,
            LogLevelArg::Info => Self::Info,
            LogLevelArg::Debug => Self::Debug,
        }
    }
}

impl std::fmt::Display for LogLevelArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let as_str = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
        };
        write!(f, "{as_str}")
    }
}

/// Output format for planning results
#[derive(Copy, Clone, Debug, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

#[derive(Debug, Subcommand)]
pub enum ConfigSubcommand {
    /// Display configuration values.
    ///
    /// If a KEY is provided, displays only that configuration value.
    Get {
        /// Optional configuration key (e.g., `level`, `cache_file`, `time_limit_secs`)
        #[arg(value_name = "KEY")]
        key: Option<String>,
    },
    /// Set a configuration value.
    Set {
        /// Configuration key to set
        #[arg(value_name = "KEY")]
        key: String,
        /// Value to set
        #[arg(value_name = "VALUE")]
        value: String,
    },
    /// Unset a configuration value.
    Unset {
        /// Configuration key to unset
        #[arg(value_name = "KEY")]
        key: String,
    },
    /// Reset configuration to defaults (requires confirmation).
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum CacheSubcommand {
    /// Read catalog CSV sheets and write the cache snapshot.
    Build {
        /// Directory of catalog sheets (defaults to config `catalog_dir`)
        #[arg(value_name = "DIR")]
        dir: Option<PathBuf>,
    },
    /// Summarize the cached catalog.
    Show,
}

/// Student history shared by `plan` and `check`
#[derive(Debug, Clone, Args)]
pub struct StudentArgs {
    /// Number of terms already studied
    #[arg(long = "term", value_name = "N", default_value_t = 1)]
    pub terms_studied: u32,

    /// Chosen minor (case-insensitive; "no minor" for none)
    #[arg(long, value_name = "NAME")]
    pub minor: Option<String>,

    /// CSV file with `course_id,grade` columns
    #[arg(long, value_name = "FILE")]
    pub grades: Option<PathBuf>,

    /// Individual grade, repeatable (e.g. `--grade CS1010=A`)
    #[arg(long = "grade", value_name = "COURSE=GRADE")]
    pub grade: Vec<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage configuration.
    ///
    /// If no subcommand is provided, displays all configuration values.
    Config {
        #[command(subcommand)]
        subcommand: Option<ConfigSubcommand>,
    },
    /// Build or inspect the catalog cache.
    Cache {
        #[command(subcommand)]
        subcommand: CacheSubcommand,
    },
    /// Recommend courses for the coming term.
    Plan {
        #[command(flatten)]
        student: StudentArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Check a proposed selection against the planning rules.
    Check {
        /// Course ids to check
        #[arg(value_name = "COURSE", num_args = 1.., required = true)]
        courses: Vec<String>,

        #[command(flatten)]
        student: StudentArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}

#[derive(Parser, Debug)]
#[command(
    name = "nuplanner",
    about = "NuPlanner term registration planner",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    /// Set the runtime log level (error|warn|info|debug). Falls back to config if omitted.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Enable verbose output (runtime only)
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Enable debug-level logging and runtime debug flag (shorthand)
    #[arg(long = "debug", global = true)]
    pub debug_flag: bool,

    /// Write runtime logs to a file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    // --- Config overrides ---
    /// Override config logging level
    #[arg(long = "config-level", value_enum)]
    pub config_level: Option<LogLevelArg>,

    /// Override config log file path
    #[arg(long = "config-log-file", value_name = "PATH")]
    pub config_log_file: Option<PathBuf>,

    /// Override config verbose flag (true/false)
    #[arg(long = "config-verbose", value_parser = BoolishValueParser::new())]
    pub config_verbose: Option<bool>,

    /// Override the catalog sheet directory
    #[arg(long = "catalog-dir", value_name = "DIR", global = true)]
    pub catalog_dir: Option<PathBuf>,

    /// Override the catalog cache file
    #[arg(long = "cache-file", value_name = "PATH", global = true)]
    pub cache_file: Option<PathBuf>,

    /// Override the solver time limit in seconds (0 = no limit)
    #[arg(long = "time-limit", value_name = "SECS", global = true)]
    pub time_limit: Option<u64>,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Convert CLI flags into config overrides
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        let path_string = |p: &PathBuf| p.to_string_lossy().to_string();
        ConfigOverrides {
            level: self.config_level.map(|lvl| lvl.to_string()),
            file: self.config_log_file.as_ref().map(path_string),
            verbose: self.config_verbose,
            catalog_dir: self.catalog_dir.as_ref().map(path_string),
            cache_file: self.cache_file.as_ref().map(path_string),
            time_limit_secs: self.time_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("nuplanner").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_log_level_display() {
        assert_eq!(LogLevelArg::Error.to_string(), "error");
        assert_eq!(LogLevelArg::Warn.to_string(), "warn");
        assert_eq!(LogLevelArg::Info.to_string(), "info");
        assert_eq!(LogLevelArg::Debug.to_string(), "debug");
    }

    #[test]
    fn test_log_level_to_logger_level() {
        assert_eq!(Level::from(LogLevelArg::Error), Level::Error);
        assert_eq!(Level::from(LogLevelArg::Warn), Level::Warn);
        assert_eq!(Level::from(LogLevelArg::Info), Level::Info);
        assert_eq!(Level::from(LogLevelArg::Debug), Level::Debug);
    }

    #[test]
    fn test_to_config_overrides_empty() {
        let overrides = parse(&["config"]).to_config_overrides();
        assert!(overrides.level.is_none());
        assert!(overrides.file.is_none());
        assert!(overrides.verbose.is_none());
        assert!(overrides.catalog_dir.is_none());
        assert!(overrides.cache_file.is_none());
        assert!(overrides.time_limit_secs.is_none());
    }

    #[test]
    fn test_to_config_overrides_with_values() {
        let cli = parse(&[
            "--config-level",
            "debug",
            "--config-log-file",
            "/tmp/test.log",
            "--config-verbose",
            "yes",
            "--catalog-dir",
            "/data/catalog",
            "--cache-file",
            "/data/catalog.json",
            "--time-limit",
            "0",
            "config",
        ]);

        let overrides = cli.to_config_overrides();
        assert_eq!(overrides.level, Some("debug".to_string()));
        assert_eq!(overrides.file, Some("/tmp/test.log".to_string()));
        assert_eq!(overrides.verbose, Some(true));
        assert_eq!(overrides.catalog_dir, Some("/data/catalog".to_string()));
        assert_eq!(overrides.cache_file, Some("/data/catalog.json".to_string()));
        assert_eq!(overrides.time_limit_secs, Some(0));
    }

    #[test]
    fn test_plan_defaults() {
        let cli = parse(&["plan"]);
        match cli.command {
            Command::Plan { student, format } => {
                assert_eq!(student.terms_studied, 1);
                assert!(student.minor.is_none());
                assert!(student.grade.is_empty());
                assert_eq!(format, OutputFormat::Text);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_plan_student_flags() {
        let cli = parse(&[
            "plan",
            "--term",
            "6",
            "--minor",
            "Maths",
            "--grade",
            "A=A",
            "--grade",
            "B=F",
            "--format",
            "json",
        ]);
        match cli.command {
            Command::Plan { student, format } => {
                assert_eq!(student.terms_studied, 6);
                assert_eq!(student.minor.as_deref(), Some("Maths"));
                assert_eq!(student.grade, vec!["A=A", "B=F"]);
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_check_requires_courses() {
        assert!(Cli::try_parse_from(["nuplanner", "check"]).is_err());
        let cli = parse(&["check", "A", "B", "--term", "3"]);
        match cli.command {
            Command::Check { courses, student, .. } => {
                assert_eq!(courses, vec!["A", "B"]);
                assert_eq!(student.terms_studied, 3);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["cache", "show", "--cache-file", "/x.json", "-v"]);
        assert!(cli.verbose);
        assert_eq!(cli.cache_file, Some(PathBuf::from("/x.json")));
    }
}
