use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use ecochat::{ChatEngine, EngineConfig, HandOff, InMemoryLeadStore, LogNotifier};
use tokio::io::{BufReader, stdin, stdout};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Copy, Clone, Debug, Default, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Chat with the EcoSense assistant on the terminal.
#[derive(Parser, Debug)]
#[command(name = "ecochat", version)]
struct Cli {
    /// TOML file with an `[ecochat]` table
    #[arg(short, long, env = "ECOCHAT_CONFIG")]
    config: Option<PathBuf>,

    /// Industry key, e.g. manufacturing or hospitality
    #[arg(short, long)]
    industry: Option<String>,

    /// Name used to personalize replies
    #[arg(short, long)]
    name: Option<String>,

    /// Seed for reproducible template choices
    #[arg(long)]
    seed: Option<u64>,

    /// Logging verbosity, ignored when RUST_LOG is set
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::default().add_directive(LevelFilter::from(cli.log_level).into()),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut cfg = match &cli.config {
        Some(path) => EngineConfig::load(path).await?,
        None => EngineConfig::default(),
    };
    if let Some(industry) = cli.industry {
        cfg.industry = industry;
    }
    if let Some(name) = cli.name {
        cfg.user_name = Some(name);
    }
    if cli.seed.is_some() {
        cfg.seed = cli.seed;
    }
    info!(industry = %cfg.industry, seed = ?cfg.seed, "starting chat");

    let handoff = HandOff::new(
        Arc::new(InMemoryLeadStore::default()),
        Arc::new(LogNotifier),
        cfg.handoff.clone(),
    );
    let engine = ChatEngine::from_config(&cfg);
    ecochat::repl::run(engine, &handoff, BufReader::new(stdin()), stdout()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_defaults_to_info() {
        let cli = Cli::parse_from(["ecochat"]);
        assert!(matches!(cli.log_level, LogLevel::Info));
        assert_eq!(LevelFilter::from(LogLevel::default()), LevelFilter::INFO);
    }

    #[test]
    fn flags_parse() {
        let cli = Cli::parse_from(["ecochat", "-i", "retail", "--seed", "3", "--log-level", "debug"]);
        assert_eq!(cli.industry.as_deref(), Some("retail"));
        assert_eq!(cli.seed, Some(3));
        assert!(matches!(cli.log_level, LogLevel::Debug));
    }
}
