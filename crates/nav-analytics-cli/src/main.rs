mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use commands::nav::SeriesArgs;

/// NAV series analytics: equity curve, drawdown, monthly and trailing returns
#[derive(Parser)]
#[command(
    name = "navx",
    version,
    about = "NAV series analytics: equity curve, drawdown, monthly and trailing returns",
    long_about = "Loads a NAV series (JSON or CSV, from a file or stdin), normalizes it, \
                  and derives a re-based equity index, running drawdown, month-over-month \
                  returns and a panel of trailing returns with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log verbosity (logs go to stderr; RUST_LOG takes precedence)
    #[arg(long, default_value = "warn", global = true)]
    log_level: LogLevel,
}

#[derive(Subcommand)]
enum Commands {
    /// Full dashboard snapshot (series, curves, monthly, trailing, benchmark)
    Analyse(SeriesArgs),
    /// Equity index and drawdown per observation
    Equity(SeriesArgs),
    /// Month-over-month returns by year
    Monthly(SeriesArgs),
    /// Trailing returns, current and maximum drawdown
    Trailing(SeriesArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
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

fn init_logging(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::from(level).as_str()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("{}: failed to initialise logging: {}", "warning".yellow().bold(), e);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyse(args) => commands::nav::run_analyse(args),
        Commands::Equity(args) => commands::nav::run_equity(args),
        Commands::Monthly(args) => commands::nav::run_monthly(args),
        Commands::Trailing(args) => commands::nav::run_trailing(args),
        Commands::Version => {
            println!("navx {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
