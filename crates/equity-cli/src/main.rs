//! Command-line interface for equity-research
//!
//! # Usage
//!
//! ```bash
//! # Optional data providers
//! export ALPHA_VANTAGE_API_KEY="..."
//! export FRED_API_KEY="..."
//!
//! equity analyze AAPL
//! equity search "fiserw"
//! equity serve --addr 127.0.0.1:8080
//! equity            # interactive mode
//! ```

mod commands;
mod repl;
mod server;

use clap::{Args, Parser, Subcommand, ValueEnum};
use equity_core::{ResearchConfig, ResearchPipeline};
use equity_utils::LogFormat;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_LOG_FILTER: &str = "warn,equity_core=info,equity_cli=info";

#[derive(Parser, Debug)]
#[command(name = "equity")]
#[command(about = "Rule-based equity research reports", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Directory for cached market snapshots
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Directory where reports are written
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Stock database used by search and auto-correct
    #[arg(long, global = true)]
    database: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a ticker and write a research report
    Analyze(AnalyzeArgs),
    /// Search the stock database by symbol or company name
    Search {
        query: String,
        /// Maximum number of results
        #[arg(short, long, default_value_t = 5)]
        limit: usize,
    },
    /// Backtest the dual momentum strategy on a ticker
    Backtest {
        ticker: String,
        /// Starting capital in dollars
        #[arg(short, long, default_value_t = 10_000.0)]
        capital: f64,
    },
    /// Show the macro backdrop from FRED
    Macro,
    /// Inspect or clear the snapshot cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Maintain the stock database
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
    /// Interactive prompt (default)
    Interactive,
    /// Run the web dashboard
    Serve {
        #[arg(long, default_value = "127.0.0.1:8080")]
        addr: SocketAddr,
    },
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    ticker: String,
    /// Ignore cached snapshots and fetch fresh data
    #[arg(long)]
    no_cache: bool,
    /// Score against this industry instead of detecting one
    #[arg(long)]
    industry: Option<String>,
    /// Do not write the report to the output directory
    #[arg(long)]
    no_save: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
    /// Print the full report after the summary
    #[arg(long)]
    show_report: bool,
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// File counts and size per ticker
    Stats,
    /// Delete cached snapshots for a ticker, or all of them
    Clear { ticker: Option<String> },
    /// Keep only the newest files per ticker
    Cleanup,
}

#[derive(Subcommand, Debug)]
enum DbAction {
    /// Re-derive categories and write the database file
    Build,
    /// Stock counts per category
    Categories,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    fn config(&self) -> equity_core::Result<ResearchConfig> {
        let mut builder = ResearchConfig::builder().with_env_keys();
        if let Some(dir) = &self.cache_dir {
            builder = builder.cache_dir(dir);
        }
        if let Some(dir) = &self.output_dir {
            builder = builder.output_dir(dir);
        }
        if let Some(path) = &self.database {
            builder = builder.database_path(path);
        }
        builder.build()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    equity_utils::init_tracing_with(format, DEFAULT_LOG_FILTER);

    let config = cli.config()?;

    // The database commands work on the file directly
    if let Some(Commands::Db { action }) = &cli.command {
        return match action {
            DbAction::Build => commands::db_build(&config.database_path).await,
            DbAction::Categories => commands::db_categories(&config.database_path).await,
        };
    }

    let pipeline = Arc::new(ResearchPipeline::new(config).await?);
    tracing::debug!(?pipeline, "Pipeline ready");

    match cli.command.unwrap_or(Commands::Interactive) {
        Commands::Analyze(args) => commands::analyze(&pipeline, &args).await,
        Commands::Search { query, limit } => {
            commands::search(&pipeline, &query, limit);
            Ok(())
        }
        Commands::Backtest { ticker, capital } => {
            commands::backtest(&pipeline, &ticker, capital).await
        }
        Commands::Macro => commands::macro_snapshot(&pipeline).await,
        Commands::Cache { action } => match action {
            CacheAction::Stats => commands::cache_stats(&pipeline).await,
            CacheAction::Clear { ticker } => {
                commands::cache_clear(&pipeline, ticker.as_deref()).await
            }
            CacheAction::Cleanup => commands::cache_cleanup(&pipeline).await,
        },
        Commands::Db { .. } => Ok(()),
        Commands::Interactive => repl::run(&pipeline).await,
        Commands::Serve { addr } => server::serve(pipeline, addr).await,
    }
}
