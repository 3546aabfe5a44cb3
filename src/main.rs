//! `circdesk` console entrypoint.

#![forbid(unsafe_code)]

use std::{io, path::PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};

use circdesk::{
    config::LibraryConfig,
    console::{Console, ConsoleSettings},
    logging::init_logging,
    persist::open_sink,
    runtime::library::{Library, LibraryOptions},
    types::StorageBackend,
};

/// Library catalog and circulation desk.
#[derive(Parser)]
#[command(name = "circdesk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Storage file, overrides `storage.path`.
    #[arg(long)]
    data: Option<PathBuf>,

    /// Storage format, overrides `storage.backend`.
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Log filter directive, overrides `log.level`.
    #[arg(long)]
    log_level: Option<String>,

    /// Emit JSON log lines on stderr.
    #[arg(long)]
    json_logs: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum BackendArg {
    Sqlite,
    Json,
}

impl From<BackendArg> for StorageBackend {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Sqlite => Self::Sqlite,
            BackendArg::Json => Self::Json,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => LibraryConfig::load(path)?,
        None => LibraryConfig::default(),
    };
    if let Some(data) = cli.data {
        config.storage.path = data;
    }
    if let Some(backend) = cli.backend {
        config.storage.backend = backend.into();
    }
    if let Some(level) = cli.log_level {
        config.log.level = level;
    }
    config.log.json |= cli.json_logs;
    config.validate()?;

    init_logging(&config.log)?;

    let sink = open_sink(config.storage.backend, &config.storage.path).with_context(|| {
        format!(
            "opening {} storage at {}",
            config.storage.backend,
            config.storage.path.display()
        )
    })?;
    let mut library = Library::open(
        sink,
        LibraryOptions {
            auto_commit: config.storage.auto_commit,
            ..LibraryOptions::default()
        },
    );

    let stdin = io::stdin();
    let mut console = Console::new(
        &mut library,
        ConsoleSettings::from(&config),
        stdin.lock(),
        io::stdout().lock(),
    );
    console.run().context("library session aborted")?;
    Ok(())
}
