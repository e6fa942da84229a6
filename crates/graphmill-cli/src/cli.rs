use clap::{Parser, ValueEnum};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

use graphmill_config::{Backend, GraphmillConfig};

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Progress messages (default)
    Info,
    /// Per-chunk detail
    Debug,
    /// Everything
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "graphmill")]
#[command(about = "Load directories of *.nodes.csv / *.edges.csv files into a graph database")]
#[command(version)]
pub struct Cli {
    /// Directories to ingest, in order
    #[arg(required = true, value_name = "DIRECTORIES")]
    pub directories: Vec<String>,

    /// Config file path (defaults to ~/.config/graphmill/config.toml)
    #[arg(short = 'C', long)]
    pub config: Option<PathBuf>,

    /// Set log level; RUST_LOG takes precedence when set
    #[arg(short = 'l', long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long)]
    pub verbose: bool,

    /// Records per transaction (overrides config)
    #[arg(long)]
    pub chunk_size: Option<NonZeroUsize>,

    /// Fail a label when its constraint/index provisioning fails
    #[arg(long)]
    pub strict_provisioning: bool,

    /// Target database (neo4j or surrealdb)
    #[arg(long)]
    pub backend: Option<Backend>,
}

impl Cli {
    /// `--log-level` wins over `--verbose`; the default is info
    pub fn level_filter(&self) -> LevelFilter {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level.into(),
            (None, true) => LevelFilter::DEBUG,
            (None, false) => LevelFilter::INFO,
        }
    }

    /// Directory arguments with surrounding whitespace removed
    pub fn directory_paths(&self) -> Vec<PathBuf> {
        self.directories
            .iter()
            .map(|d| PathBuf::from(d.trim()))
            .collect()
    }

    /// Apply flag values on top of the resolved config.
    pub fn apply_overrides(&self, config: &mut GraphmillConfig) {
        if let Some(chunk_size) = self.chunk_size {
            config.ingest.chunk_size = chunk_size.get();
        }
        if self.strict_provisioning {
            config.ingest.strict_provisioning = true;
        }
        if let Some(backend) = self.backend {
            config.database.backend = backend;
        }
    }
}
