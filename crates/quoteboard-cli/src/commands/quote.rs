use std::time::Instant;

use quoteboard_core::{StockDataService, Symbol};
use serde_json::Value;

use crate::error::CliError;
use crate::metadata::Metadata;
use crate::output::{Report, Table};

use super::{cell, elapsed_ms};

/// Fetches `symbols`, or the whole board when empty.
pub async fn run(service: &StockDataService, symbols: &[Symbol]) -> Result<Report, CliError> {
    let symbols = if symbols.is_empty() {
        service.universe().symbols()
    } else {
        symbols.to_vec()
    };
    let raw = symbols.iter().map(Symbol::as_str).collect::<Vec<_>>();

    let started = Instant::now();
    let fetched = service.fetch_quotes(&raw).await;
    let mut meta = Metadata::new("quote", service.provider(), elapsed_ms(started));

    let mut table = Table::new(vec![
        "symbol", "name", "price", "change", "change%", "rsi", "as_of", "origin",
    ]);
    let mut records = Vec::with_capacity(fetched.len());

    for (symbol, result) in raw.iter().zip(&fetched) {
        meta.observe(symbol, result);
        let quote = &result.value;

        table.push_row(vec![
            quote.symbol.to_string(),
            quote.display_name.clone(),
            format!("{:.2}", quote.price),
            format!("{:+.2}", quote.change),
            format!("{:+.2}", quote.change_percent),
            cell(quote.rsi),
            quote.as_of.to_string(),
            String::from(result.origin.label()),
        ]);

        let mut record = serde_json::to_value(quote)?;
        if let Value::Object(fields) = &mut record {
            fields.insert(String::from("origin"), Value::from(result.origin.label()));
        }
        records.push(record);
    }

    Ok(Report {
        meta,
        records,
        table,
    })
}
