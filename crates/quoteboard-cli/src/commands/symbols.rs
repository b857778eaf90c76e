use quoteboard_core::StockDataService;
use serde_json::json;

use crate::error::CliError;
use crate::metadata::Metadata;
use crate::output::{Report, Table};

/// Lists the board without touching the network.
pub fn run(service: &StockDataService) -> Result<Report, CliError> {
    let provider = service.provider();
    let mut table = Table::new(vec!["symbol", "name", "ticker", "baseline"]);
    let mut records = Vec::new();

    for listing in service.universe().listings() {
        let ticker = listing.ticker_for(provider);
        table.push_row(vec![
            listing.symbol.to_string(),
            listing.display_name.clone(),
            ticker.to_owned(),
            format!("{:.2}", listing.baseline.price),
        ]);
        records.push(json!({
            "symbol": listing.symbol,
            "name": listing.display_name,
            "ticker": ticker,
            "baseline_price": listing.baseline.price,
        }));
    }

    Ok(Report {
        meta: Metadata::new("symbols", provider, 0),
        records,
        table,
    })
}

#[cfg(test)]
mod tests {
    use quoteboard_core::ProviderId;

    use super::*;

    #[test]
    fn lists_provider_specific_tickers() {
        let service = StockDataService::builder()
            .with_provider(ProviderId::Yahoo)
            .offline(true)
            .build();

        let report = run(&service).expect("report");
        let expected = service
            .universe()
            .listings()
            .iter()
            .map(|listing| listing.yahoo_ticker.clone())
            .collect::<Vec<_>>();
        let tickers = report
            .records
            .iter()
            .filter_map(|record| record["ticker"].as_str().map(str::to_owned))
            .collect::<Vec<_>>();

        assert_eq!(tickers, expected);
        assert_eq!(report.meta.origins.upstream, 0);
    }
}
