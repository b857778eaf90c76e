//! CLI argument definitions for quoteboard.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `quote` | Latest quotes for board symbols |
//! | `chart` | Intraday chart series for one symbol |
//! | `watch` | Refresh quotes on a timer |
//! | `symbols` | List the board and its provider tickers |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json, ndjson) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--provider` | `alphavantage` | Upstream provider |
//! | `--api-key` | env | Alpha Vantage API key |
//! | `--cache-ttl-secs` | `30` | Quote cache freshness window |
//! | `--rsi-source` | `upstream` | upstream, local or off |
//! | `--offline` | `false` | Serve placeholder data only |
//!
//! # Examples
//!
//! ```bash
//! quoteboard quote
//! quoteboard quote TATASTEEL NIFTY50 --format json --pretty
//! quoteboard chart HDFCBANK --interval 15 --provider yahoo
//! quoteboard watch --every 5 --iterations 3
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use quoteboard_core::{ProviderId, RsiSource};

/// Quoteboard - NSE quote board in the terminal
///
/// Quotes, intraday charts and RSI for a fixed set of NSE instruments from
/// Alpha Vantage or Yahoo Finance, with placeholder data when a provider
/// cannot be reached.
#[derive(Debug, Parser)]
#[command(
    name = "quoteboard",
    author,
    version,
    about = "NSE quote board in the terminal",
    long_about = "Quoteboard shows quotes, RSI and intraday charts for a fixed board of NSE \
instruments.\n\
\n\
  • Alpha Vantage (API key) or Yahoo Finance (no key)\n\
  • 30 second quote cache\n\
  • Placeholder data whenever a provider fails, flagged as synthetic\n\
\n\
Use 'quoteboard <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    ///
    /// - table: aligned columns (default)
    /// - json: one JSON document with metadata
    /// - ndjson: one JSON record per line
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Upstream provider (overrides QUOTEBOARD_PROVIDER).
    #[arg(long, global = true, value_parser = parse_provider)]
    pub provider: Option<ProviderId>,

    /// Alpha Vantage API key (overrides QUOTEBOARD_ALPHAVANTAGE_API_KEY).
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Quote cache freshness window in seconds (overrides QUOTEBOARD_CACHE_TTL_SECS).
    #[arg(long, global = true)]
    pub cache_ttl_secs: Option<u64>,

    /// RSI source: upstream, local or off (overrides QUOTEBOARD_RSI_SOURCE).
    #[arg(long, global = true, value_parser = parse_rsi_source)]
    pub rsi_source: Option<RsiSource>,

    /// Never call a provider; every value is placeholder data.
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns for terminal display.
    Table,
    /// Single JSON document.
    Json,
    /// Newline-delimited JSON (one record per line).
    Ndjson,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch latest quotes, RSI included.
    ///
    /// Without symbols the whole board is fetched.
    ///
    /// # Examples
    ///
    ///   quoteboard quote
    ///   quoteboard quote TATASTEEL HDFCBANK
    Quote(QuoteArgs),

    /// Fetch the intraday chart of one symbol (at most 50 points).
    ///
    /// The interval in minutes is snapped to the nearest supported bucket
    /// at or above it: 1, 5, 15, 30 or 60.
    ///
    /// # Examples
    ///
    ///   quoteboard chart NIFTY50
    ///   quoteboard chart TATAMOTORS --interval 10
    Chart(ChartArgs),

    /// Re-fetch quotes on a fixed timer and print every round.
    ///
    /// # Examples
    ///
    ///   quoteboard watch
    ///   quoteboard watch INDIAVIX --every 30 --iterations 10
    Watch(WatchArgs),

    /// List the board symbols with their provider tickers.
    Symbols,
}

/// Arguments for the `quote` command.
#[derive(Debug, Args)]
pub struct QuoteArgs {
    /// Board symbols (e.g., TATASTEEL, NIFTY50). Defaults to the whole board.
    #[arg(num_args = 0..)]
    pub symbols: Vec<String>,
}

/// Arguments for the `chart` command.
#[derive(Debug, Args)]
pub struct ChartArgs {
    /// Board symbol to chart.
    pub symbol: String,

    /// Bar interval in minutes.
    #[arg(long, default_value_t = 1)]
    pub interval: u32,
}

/// Arguments for the `watch` command.
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Board symbols. Defaults to the whole board.
    #[arg(num_args = 0..)]
    pub symbols: Vec<String>,

    /// Seconds between refreshes.
    #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub every: u64,

    /// Stop after this many refreshes; runs until interrupted when omitted.
    #[arg(long)]
    pub iterations: Option<u64>,
}

fn parse_provider(value: &str) -> Result<ProviderId, String> {
    value.parse::<ProviderId>().map_err(|error| error.to_string())
}

fn parse_rsi_source(value: &str) -> Result<RsiSource, String> {
    value.parse::<RsiSource>().map_err(|error| error.to_string())
}
