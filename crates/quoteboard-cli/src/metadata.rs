use quoteboard_core::{DataOrigin, Fetched, ProviderId, UtcDateTime};
use serde::Serialize;

/// How many values of a report came from each origin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OriginCounts {
    pub cache: usize,
    pub upstream: usize,
    pub synthetic: usize,
}

impl OriginCounts {
    pub fn record(&mut self, origin: &DataOrigin) {
        match origin {
            DataOrigin::Cache => self.cache += 1,
            DataOrigin::Upstream(_) => self.upstream += 1,
            DataOrigin::Synthetic(_) => self.synthetic += 1,
        }
    }
}

/// Metadata printed alongside every command result.
///
/// Field order is fixed to keep JSON output stable between runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub command: &'static str,
    pub provider: ProviderId,
    pub generated_at: UtcDateTime,
    pub latency_ms: u64,
    pub origins: OriginCounts,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Metadata {
    pub fn new(command: &'static str, provider: ProviderId, latency_ms: u64) -> Self {
        Self {
            command,
            provider,
            generated_at: UtcDateTime::now(),
            latency_ms,
            origins: OriginCounts::default(),
            warnings: Vec::new(),
        }
    }

    /// Counts the origin of `fetched` and keeps its failure as a warning.
    pub fn observe<T>(&mut self, label: &str, fetched: &Fetched<T>) {
        self.origins.record(&fetched.origin);
        if let Some(error) = fetched.failure() {
            self.warnings.push(format!("{label}: {error}"));
        }
    }
}
