use clap::Parser;
use sqpack_cli::{Commands, OutputFormat};
use sqpack_storage::StorageError;
use std::process::ExitCode;
use tracing::{Level, error};

/// Exit code for a corrupted index
const EXIT_INTEGRITY: u8 = 2;

#[derive(Parser)]
#[command(
    name = "sqpack",
    about = "Inspect, brute force and extract SqPack archives",
    version,
    author,
    long_about = "A command-line tool for SqPack index and data files: verifies index checksums, recovers file names by testing candidate paths against the stored hashes, and extracts raw file contents."
)]
struct Cli {
    /// Set the logging level
    #[arg(short, long, value_enum, default_value = "info")]
    log_level: LogLevel,

    /// Output format
    #[arg(short = 'o', long, value_enum, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so command output stays machine-readable
    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match sqpack_cli::handle(cli.command, cli.format).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let fatal = e
                .downcast_ref::<StorageError>()
                .is_some_and(StorageError::is_fatal);
            error!("{e:#}");
            if fatal {
                ExitCode::from(EXIT_INTEGRITY)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}
