//! `neohub` command-line front end.
//!
//! Every hub command in the registry is reachable by name; replies are
//! printed as pretty JSON on stdout and diagnostics go to stderr.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use neohub_core::{HubConfig, NeoHub, registry};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Control a NeoHub heating hub from the command line
#[derive(Parser, Debug)]
#[command(name = "neohub")]
#[command(version, about, long_about = None)]
#[command(after_help = "Examples:
  neohub help                          List every hub command
  neohub help set_target_temperature   Show arguments of one command
  neohub get_system                    Print system information
  neohub set_target_temperature 21.5 Kitchen Hall
  neohub --host 192.168.1.40 get_live_data")]
struct Cli {
    /// Config file (defaults to the per-user `neohub/config.json`)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Hub host name or address
    #[arg(long)]
    host: Option<String>,

    /// Hub TCP port
    #[arg(long)]
    port: Option<u16>,

    /// Per-attempt timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<f64>,

    /// Attempts per request before giving up
    #[arg(long, value_name = "N")]
    attempts: Option<u32>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Write the effective settings back to the config file
    #[arg(long)]
    save_config: bool,

    /// Hub command to run, or `help`
    #[arg(required_unless_present = "save_config")]
    command: Option<String>,

    /// Command arguments
    #[arg(allow_hyphen_values = true, trailing_var_arg = true)]
    args: Vec<String>,
}

impl Cli {
    fn load_config(&self) -> Result<HubConfig> {
        let mut config = match &self.config {
            // A file about to be written may not exist yet
            Some(path) if self.save_config => HubConfig::load(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            Some(path) => HubConfig::load_existing(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
            None => HubConfig::load_default().context("Failed to load default config")?,
        };

        if let Some(host) = &self.host {
            config.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(attempts) = self.attempts {
            config.max_attempts = attempts;
        }

        config.validate().context("Invalid hub settings")?;
        Ok(config)
    }
}

fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "neohub=warn",
        1 => "neohub=info",
        _ => "neohub=debug",
    }
}

/// Log to stderr, and to `log_file` without colours when given.
///
/// `RUST_LOG` overrides the verbosity flag. The returned guard flushes the
/// file writer on drop and must outlive the command.
fn setup_logging(verbosity: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(path)?);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .with(filter)
        .init();

    Ok(guard)
}

fn file_appender(path: &Path) -> Result<RollingFileAppender> {
    let file_name = path
        .file_name()
        .with_context(|| format!("Log file path has no file name: {}", path.display()))?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(tracing_appender::rolling::never(dir, file_name))
}

fn save_config(config: &HubConfig, path: Option<&Path>) -> Result<PathBuf> {
    match path {
        Some(path) => {
            config
                .save(path)
                .with_context(|| format!("Failed to save config to {}", path.display()))?;
            Ok(path.to_path_buf())
        }
        None => config.save_default().context("Failed to save default config"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_logging(cli.verbose, cli.log_file.as_deref())?;

    if cli.command.as_deref() == Some("help") {
        let text = registry::render_help(cli.args.first().map(String::as_str))?;
        println!("{text}");
        return Ok(());
    }

    let config = cli.load_config()?;

    if cli.save_config {
        let path = save_config(&config, cli.config.as_deref())?;
        eprintln!("Saved config to {}", path.display());
    }

    let Some(command) = &cli.command else {
        return Ok(());
    };

    debug!("Using hub at {}:{}", config.host, config.port);
    let hub = NeoHub::from_config(&config).context("Failed to set up hub client")?;

    let value = registry::dispatch(&hub, command, &cli.args)
        .await
        .with_context(|| format!("{command} failed"))?;

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.json");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_trailing_args_keep_negative_numbers() {
        let cli = Cli::parse_from(["neohub", "set_diff", "-1", "Kitchen"]);
        assert_eq!(cli.command.as_deref(), Some("set_diff"));
        assert_eq!(cli.args, vec!["-1", "Kitchen"]);
    }

    #[test]
    fn test_global_flags_before_command() {
        let cli = Cli::parse_from([
            "neohub", "-vv", "--host", "hub.local", "--port", "4343", "get_system",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.host.as_deref(), Some("hub.local"));
        assert_eq!(cli.port, Some(4343));
        assert!(cli.args.is_empty());
    }

    #[test]
    fn test_command_required_unless_saving() {
        assert!(Cli::try_parse_from(["neohub"]).is_err());

        let cli = Cli::try_parse_from(["neohub", "--save-config"]).unwrap();
        assert!(cli.save_config);
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_default_directive_by_verbosity() {
        assert_eq!(default_directive(0), "neohub=warn");
        assert_eq!(default_directive(1), "neohub=info");
        assert_eq!(default_directive(5), "neohub=debug");
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, r#"{"host": "file-host", "port": 4000}"#);

        let cli = Cli::parse_from([
            "neohub",
            "--config",
            path.to_str().unwrap(),
            "--port",
            "4242",
            "--attempts",
            "3",
            "get_system",
        ]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.host, "file-host");
        assert_eq!(config.port, 4242);
        assert_eq!(config.max_attempts, 3);
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.json");

        let cli = Cli::parse_from(["neohub", "--config", path.to_str().unwrap(), "get_system"]);
        assert!(cli.load_config().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "{}");

        let cli = Cli::parse_from([
            "neohub",
            "--config",
            path.to_str().unwrap(),
            "--timeout",
            "0",
            "get_system",
        ]);
        assert!(cli.load_config().is_err());
    }

    #[test]
    fn test_save_config_writes_overrides_to_new_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hub.json");

        let cli = Cli::parse_from([
            "neohub",
            "--config",
            path.to_str().unwrap(),
            "--host",
            "10.0.0.7",
            "--save-config",
        ]);
        let config = cli.load_config().unwrap();
        let written = save_config(&config, cli.config.as_deref()).unwrap();

        assert_eq!(written, path);
        let saved = HubConfig::load_existing(&path).unwrap();
        assert_eq!(saved.host, "10.0.0.7");
        assert_eq!(saved.port, config.port);
    }

    #[test]
    fn test_file_appender_needs_file_name() {
        assert!(file_appender(Path::new("/")).is_err());
    }
}
