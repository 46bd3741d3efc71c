use std::collections::BTreeSet;

use serde::Serialize;

use crate::record::{CorrelationGroup, Record};
use crate::stats::{StatValue, Statistics};

/// Everything one pipeline run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub records: Vec<Record>,
    pub groups: Vec<CorrelationGroup>,
    pub columns: BTreeSet<String>,
    pub statistics: Statistics,
    pub patterns_used: Vec<String>,
    pub correlation_field: Option<String>,
}

impl ExtractionResult {
    pub fn is_correlated(&self) -> bool {
        self.correlation_field.is_some()
    }

    /// Global metric such as `processing_efficiency`
    pub fn stat(&self, name: &str) -> Option<&StatValue> {
        self.statistics.global(name)
    }

    pub fn metric(&self, column: &str, metric: &str) -> Option<&StatValue> {
        self.statistics.metric(column, metric)
    }

    /// Statistics for one column, in insertion order
    pub fn column_stats<'a>(
        &'a self,
        column: &str,
    ) -> impl Iterator<Item = (&'static str, &'a StatValue)> + 'a {
        self.statistics
            .column(column)
            .into_iter()
            .flat_map(|stats| stats.iter().map(|(metric, value)| (*metric, value)))
    }

    pub fn processing_efficiency(&self) -> f64 {
        self.stat("processing_efficiency")
            .and_then(StatValue::as_number)
            .unwrap_or(0.0)
    }

    pub fn total_lines_processed(&self) -> usize {
        self.stat("total_lines_processed")
            .and_then(StatValue::as_count)
            .unwrap_or(0)
    }
}
