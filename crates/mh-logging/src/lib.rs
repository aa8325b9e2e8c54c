// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Centralized logging utilities for MiniHub
//!
//! Every MiniHub binary initialises `tracing` through this crate so that the
//! filter syntax (`RUST_LOG`), output format and log file locations stay the
//! same across the server and its mock variant.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

// Re-export Level for convenience
pub use tracing::Level;

/// Output format for log messages
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable plaintext format
    #[default]
    Plaintext,
    /// Structured JSON format
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Plaintext => write!(f, "plaintext"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// CLI log level enum for clap integration
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum CliLogLevel {
    /// Only error conditions
    Error,
    /// Errors and warnings
    Warn,
    /// Errors, warnings, and informational messages
    #[default]
    Info,
    /// All above plus debug information
    Debug,
    /// All above plus detailed tracing
    Trace,
}

impl From<CliLogLevel> for Level {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

/// Standardized CLI logging arguments.
///
/// Use with `#[command(flatten)]`. Logs go to stdout unless `--log-file` or
/// `--log-dir` is given.
#[derive(Clone, Debug, Default, clap::Args, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CliLoggingArgs {
    /// Log verbosity level
    #[arg(long, value_enum, env = "MINIHUB_LOG_LEVEL")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<CliLogLevel>,

    /// Log output format
    #[arg(long, value_enum, env = "MINIHUB_LOG_FORMAT")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,

    /// Directory for log files
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// Log filename
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl CliLoggingArgs {
    /// Initialize logging based on the parsed CLI arguments
    pub fn init(self, component: &str) -> anyhow::Result<()> {
        let level = self.log_level.unwrap_or_default().into();
        let format = self.log_format.unwrap_or_default();

        if self.log_file.is_some() || self.log_dir.is_some() {
            let log_path = self.resolve_log_path(component);
            init_to_file(component, level, format, &log_path)
        } else {
            init(component, level, format)
        }
    }

    /// Resolve the log file path.
    ///
    /// An absolute `--log-file` wins; a relative one is placed under
    /// `--log-dir` when given; otherwise `<log-dir>/<component>.log` or the
    /// platform default is used.
    fn resolve_log_path(&self, component: &str) -> PathBuf {
        match (&self.log_file, &self.log_dir) {
            (Some(file), _) if Path::new(file).is_absolute() => PathBuf::from(file),
            (Some(file), Some(dir)) => Path::new(dir).join(file),
            (Some(file), None) => PathBuf::from(file),
            (None, Some(dir)) => Path::new(dir).join(format!("{}.log", component)),
            (None, None) => standard_log_path(component),
        }
    }
}

/// Platform-specific default log file for a component.
///
/// - Linux: `~/.local/share/minihub/<component>.log`
/// - macOS: `~/Library/Logs/minihub/<component>.log`
/// - Windows: `%APPDATA%\minihub\<component>.log`
pub fn standard_log_path(component: &str) -> PathBuf {
    #[cfg(target_os = "macos")]
    let mut path = {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
        path.push("Library");
        path.push("Logs");
        path
    };

    #[cfg(not(target_os = "macos"))]
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("/tmp"));

    path.push("minihub");
    path.push(format!("{}.log", component));
    path
}

/// Initialize logging to stdout
///
/// `default_level` applies when `RUST_LOG` is not set.
pub fn init(component: &str, default_level: Level, format: LogFormat) -> anyhow::Result<()> {
    init_with_writer(component, default_level, format, io::stdout)
}

/// Initialize logging to a file, creating parent directories as needed
pub fn init_to_file(
    component: &str,
    default_level: Level,
    format: LogFormat,
    log_path: &Path,
) -> anyhow::Result<()> {
    use std::fs;

    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)?;
    }
    let log_file = fs::OpenOptions::new().create(true).append(true).open(log_path)?;

    init_with_writer(component, default_level, format, std::sync::Mutex::new(log_file))
}

/// Initialize logging with a custom writer
pub fn init_with_writer<W>(
    component: &str,
    default_level: Level,
    format: LogFormat,
    writer: W,
) -> anyhow::Result<()>
where
    W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(component, default_level)));

    match format {
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer).json();
            #[cfg(debug_assertions)]
            let layer = layer.with_file(true).with_line_number(true);

            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
        LogFormat::Plaintext => {
            let layer = tracing_subscriber::fmt::layer().with_writer(writer);
            #[cfg(debug_assertions)]
            let layer = layer.with_file(true).with_line_number(true);

            tracing_subscriber::registry().with(filter).with(layer).try_init()?;
        }
    }

    Ok(())
}

/// Filter directive used when `RUST_LOG` is unset.
///
/// Crate targets use underscores, so `mh-rest-server` also enables
/// `mh_rest_server`.
fn default_filter(component: &str, level: Level) -> String {
    let target = component.replace('-', "_");
    format!("{level},{target}={level},tower_http={level}")
}

/// Redact sensitive information from log output
///
/// ```rust
/// use mh_logging::redact;
///
/// let token = "0123456789abcdef";
/// tracing::info!(token = %redact(token), "Gitea token configured");
/// ```
pub fn redact(_value: impl std::fmt::Display) -> &'static str {
    "[REDACTED]"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact() {
        assert_eq!(format!("{}", redact("super-secret-token")), "[REDACTED]");
    }

    #[test]
    fn test_level_conversion() {
        assert_eq!(Level::from(CliLogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(CliLogLevel::default()), Level::INFO);
    }

    #[test]
    fn test_default_filter_uses_crate_target() {
        let filter = default_filter("mh-rest-server", Level::DEBUG);
        assert!(filter.contains("mh_rest_server=DEBUG"), "{}", filter);
    }

    #[test]
    fn test_resolve_log_path_precedence() {
        let args = CliLoggingArgs {
            log_file: Some("server.log".to_string()),
            log_dir: Some("/var/log/minihub".to_string()),
            ..Default::default()
        };
        assert_eq!(
            args.resolve_log_path("mh-rest-server"),
            PathBuf::from("/var/log/minihub/server.log")
        );

        let args = CliLoggingArgs {
            log_dir: Some("/var/log/minihub".to_string()),
            ..Default::default()
        };
        assert_eq!(
            args.resolve_log_path("mh-rest-server"),
            PathBuf::from("/var/log/minihub/mh-rest-server.log")
        );

        let args = CliLoggingArgs {
            log_file: Some("/tmp/abs.log".to_string()),
            log_dir: Some("/ignored".to_string()),
            ..Default::default()
        };
        assert_eq!(args.resolve_log_path("x"), PathBuf::from("/tmp/abs.log"));
    }

    #[test]
    fn test_standard_log_path_names_component() {
        let path = standard_log_path("mh-rest-server");
        assert!(path.ends_with("minihub/mh-rest-server.log"), "{}", path.display());
    }

    #[test]
    fn test_init_to_file_writes_log_lines() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("test.log");
        init_to_file("mh-logging-test", Level::INFO, LogFormat::Plaintext, &path)
            .expect("init logging");
        tracing::info!("logging smoke line");
        let contents = std::fs::read_to_string(&path).expect("read log");
        assert!(contents.contains("logging smoke line"));
    }
}
