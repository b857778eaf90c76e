mod chart;
mod quote;
mod symbols;
mod watch;

use std::time::{Duration, Instant};

use quoteboard_core::{ServiceConfig, StockDataService, Symbol};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let config = resolve_config(cli, ServiceConfig::from_env());
    let service = StockDataService::builder().with_config(&config).build();

    match &cli.command {
        Command::Quote(args) => {
            let symbols = parse_symbols(&args.symbols)?;
            let report = quote::run(&service, &symbols).await?;
            output::render(&report, cli.format, cli.pretty)
        }
        Command::Chart(args) => {
            let symbol = Symbol::parse(&args.symbol)?;
            let report = chart::run(&service, &symbol, args.interval).await?;
            output::render(&report, cli.format, cli.pretty)
        }
        Command::Watch(args) => {
            let symbols = parse_symbols(&args.symbols)?;
            watch::run(&service, &symbols, args, cli.format, cli.pretty).await
        }
        Command::Symbols => {
            let report = symbols::run(&service)?;
            output::render(&report, cli.format, cli.pretty)
        }
    }
}

/// Command-line flags win over the environment.
fn resolve_config(cli: &Cli, mut config: ServiceConfig) -> ServiceConfig {
    if let Some(provider) = cli.provider {
        config.provider = provider;
    }
    if let Some(api_key) = &cli.api_key {
        config.api_key = Some(api_key.clone());
    }
    if let Some(secs) = cli.cache_ttl_secs {
        config.cache_ttl = Duration::from_secs(secs);
    }
    if let Some(rsi_source) = cli.rsi_source {
        config.rsi_source = rsi_source;
    }
    config.offline |= cli.offline;
    config
}

fn parse_symbols(raw: &[String]) -> Result<Vec<Symbol>, CliError> {
    raw.iter()
        .map(|symbol| Symbol::parse(symbol).map_err(CliError::from))
        .collect()
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Optional reading as a table cell.
fn cell(value: Option<f64>) -> String {
    value.map_or_else(|| String::from("-"), |value| format!("{value:.2}"))
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use quoteboard_core::{ProviderId, RsiSource};

    use super::*;

    #[test]
    fn flags_override_environment() {
        let cli = Cli::try_parse_from([
            "quoteboard",
            "quote",
            "--provider",
            "yahoo",
            "--cache-ttl-secs",
            "5",
            "--rsi-source",
            "off",
        ])
        .expect("parses");
        let env = ServiceConfig {
            api_key: Some(String::from("from-env")),
            ..ServiceConfig::default()
        };

        let config = resolve_config(&cli, env);

        assert_eq!(config.provider, ProviderId::Yahoo);
        assert_eq!(config.api_key.as_deref(), Some("from-env"));
        assert_eq!(config.cache_ttl, Duration::from_secs(5));
        assert_eq!(config.rsi_source, RsiSource::Off);
        assert!(!config.offline);
    }

    #[test]
    fn rejects_malformed_symbols() {
        let error = parse_symbols(&[String::from("TATASTEEL"), String::from("9BAD")])
            .expect_err("must fail");

        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn missing_reading_renders_as_dash() {
        assert_eq!(cell(None), "-");
        assert_eq!(cell(Some(61.234)), "61.23");
    }
}
