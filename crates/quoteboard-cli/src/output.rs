use std::io::{self, Write};

use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;
use crate::error::CliError;
use crate::metadata::Metadata;

/// Result of one command: metadata, machine-readable records and the same
/// data laid out for the terminal.
#[derive(Debug)]
pub struct Report {
    pub meta: Metadata,
    pub records: Vec<Value>,
    pub table: Table,
}

#[derive(Serialize)]
struct Document<'a> {
    meta: &'a Metadata,
    data: &'a [Value],
}

/// Column-aligned text table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        self.headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                self.rows
                    .iter()
                    .filter_map(|row| row.get(index))
                    .map(|cell| cell.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let widths = self.widths();
        let headers = self.headers.iter().map(|header| (*header).to_owned()).collect::<Vec<_>>();

        write_row(out, &headers, &widths)?;
        let rule = widths.iter().map(|width| "-".repeat(*width)).collect::<Vec<_>>();
        write_row(out, &rule, &widths)?;
        for row in &self.rows {
            write_row(out, row, &widths)?;
        }
        Ok(())
    }
}

fn write_row<W: Write>(out: &mut W, cells: &[String], widths: &[usize]) -> io::Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", line.trim_end())
}

pub fn render(report: &Report, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_report(&mut out, report, format, pretty)
}

pub fn write_report<W: Write>(
    out: &mut W,
    report: &Report,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let document = Document {
                meta: &report.meta,
                data: &report.records,
            };
            let payload = if pretty {
                serde_json::to_string_pretty(&document)?
            } else {
                serde_json::to_string(&document)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Ndjson => {
            for record in &report.records {
                writeln!(out, "{}", serde_json::to_string(record)?)?;
            }
        }
        OutputFormat::Table => render_table(out, report)?,
    }

    out.flush()?;
    Ok(())
}

fn render_table<W: Write>(out: &mut W, report: &Report) -> io::Result<()> {
    let meta = &report.meta;
    writeln!(out, "provider    : {}", meta.provider)?;
    writeln!(out, "generated_at: {}", meta.generated_at)?;
    writeln!(out, "latency_ms  : {}", meta.latency_ms)?;
    writeln!(
        out,
        "origins     : cache={} upstream={} synthetic={}",
        meta.origins.cache, meta.origins.upstream, meta.origins.synthetic
    )?;
    writeln!(out)?;

    report.table.write_to(out)?;

    if !meta.warnings.is_empty() {
        writeln!(out)?;
        writeln!(out, "warnings:")?;
        for warning in &meta.warnings {
            writeln!(out, "  - {warning}")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use quoteboard_core::ProviderId;
    use serde_json::json;

    use super::*;

    fn report() -> Report {
        let mut table = Table::new(vec!["symbol", "price"]);
        table.push_row(vec![String::from("NIFTY50"), String::from("24587.20")]);
        table.push_row(vec![String::from("INDIAVIX"), String::from("13.45")]);

        let mut meta = Metadata::new("quote", ProviderId::Yahoo, 42);
        meta.warnings.push(String::from("INDIAVIX: timeout (fetch.transport)"));

        Report {
            meta,
            records: vec![
                json!({ "symbol": "NIFTY50", "price": 24587.2 }),
                json!({ "symbol": "INDIAVIX", "price": 13.45 }),
            ],
            table,
        }
    }

    fn rendered(format: OutputFormat, pretty: bool) -> String {
        let mut buffer = Vec::new();
        write_report(&mut buffer, &report(), format, pretty).expect("renders");
        String::from_utf8(buffer).expect("utf8")
    }

    #[test]
    fn table_aligns_columns_and_lists_warnings() {
        let text = rendered(OutputFormat::Table, false);

        assert!(text.contains("provider    : yahoo"));
        assert!(text.contains("symbol    price\n"));
        assert!(text.contains("--------  --------\n"));
        assert!(text.contains("INDIAVIX  13.45\n"));
        assert!(text.contains("  - INDIAVIX: timeout (fetch.transport)"));
    }

    #[test]
    fn ndjson_emits_one_line_per_record() {
        let text = rendered(OutputFormat::Ndjson, false);
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 2);
        let first: Value = serde_json::from_str(lines[0]).expect("json line");
        assert_eq!(first["symbol"], "NIFTY50");
    }

    #[test]
    fn json_wraps_records_with_meta() {
        let text = rendered(OutputFormat::Json, true);
        let document: Value = serde_json::from_str(&text).expect("json document");

        assert_eq!(document["meta"]["command"], "quote");
        assert_eq!(document["meta"]["latency_ms"], 42);
        assert_eq!(document["data"].as_array().map(Vec::len), Some(2));
    }
}
