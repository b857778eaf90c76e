use std::time::Instant;

use quoteboard_core::{Granularity, StockDataService, Symbol};
use serde_json::Value;

use crate::error::CliError;
use crate::metadata::Metadata;
use crate::output::{Report, Table};

use super::elapsed_ms;

pub async fn run(
    service: &StockDataService,
    symbol: &Symbol,
    interval_minutes: u32,
) -> Result<Report, CliError> {
    let granularity = Granularity::from_minutes(interval_minutes);

    let started = Instant::now();
    let fetched = service
        .fetch_chart_series(symbol.as_str(), interval_minutes)
        .await;
    let mut meta = Metadata::new("chart", service.provider(), elapsed_ms(started));
    meta.observe(symbol.as_str(), &fetched);

    let mut table = Table::new(vec!["timestamp", "open", "high", "low", "close", "volume"]);
    let mut records = Vec::with_capacity(fetched.value.len());

    for point in &fetched.value {
        table.push_row(vec![
            point.timestamp.to_string(),
            format!("{:.2}", point.open),
            format!("{:.2}", point.high),
            format!("{:.2}", point.low),
            format!("{:.2}", point.close),
            point.volume.to_string(),
        ]);

        let mut record = serde_json::to_value(point)?;
        if let Value::Object(fields) = &mut record {
            fields.insert(String::from("symbol"), Value::from(symbol.as_str()));
            fields.insert(String::from("interval"), Value::from(granularity.as_str()));
            fields.insert(String::from("origin"), Value::from(fetched.origin.label()));
        }
        records.push(record);
    }

    Ok(Report {
        meta,
        records,
        table,
    })
}
