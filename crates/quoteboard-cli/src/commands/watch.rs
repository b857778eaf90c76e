use std::time::Duration;

use quoteboard_core::{StockDataService, Symbol};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info};

use crate::cli::{OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::quote;

/// Re-fetches quotes every `args.every` seconds until the iteration limit or Ctrl-C.
pub async fn run(
    service: &StockDataService,
    symbols: &[Symbol],
    args: &WatchArgs,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let mut ticker = time::interval(Duration::from_secs(args.every));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut rounds = 0_u64;

    loop {
        if args.iterations.is_some_and(|limit| rounds >= limit) {
            break;
        }

        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!(rounds, "watch interrupted");
                break;
            }
        }

        let mut report = quote::run(service, symbols).await?;
        report.meta.command = "watch";
        output::render(&report, format, pretty)?;
        rounds += 1;
        debug!(rounds, "watch round rendered");
    }

    Ok(())
}
