use std::collections::{BTreeSet, HashSet};

use indexmap::IndexMap;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::ExtractionError;
use crate::pipeline::cancel::CancellationToken;
use crate::record::Record;

/// Number of entries kept in each `<column>_top_values` table
pub const TOP_K: usize = 5;

/// A single statistics value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Count(usize),
    Number(f64),
    /// Value -> occurrences, most frequent first
    Frequencies(IndexMap<String, usize>),
}

impl StatValue {
    pub fn as_count(&self) -> Option<usize> {
        match self {
            StatValue::Count(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            StatValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_frequencies(&self) -> Option<&IndexMap<String, usize>> {
        match self {
            StatValue::Frequencies(f) => Some(f),
            _ => None,
        }
    }
}

impl std::fmt::Display for StatValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatValue::Count(n) => write!(f, "{}", n),
            StatValue::Number(n) => write!(f, "{}", n),
            StatValue::Frequencies(freq) => {
                let parts: Vec<String> = freq.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

/// Metrics of one column, keyed by metric name (`count`, `unique_count`,
/// `min`, `max`, `avg`, `top_values`)
pub type ColumnStats = IndexMap<&'static str, StatValue>;

/// Per-column metrics keyed by column then metric, plus global metrics.
///
/// Serializes as one flat map with `<column>_<metric>` keys followed by the
/// globals. Two columns can spell the same flat key (`a` + `unique_count`
/// and `a_unique` + `count`); the flat form keeps the first one in column
/// order, while the lookups here stay exact.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    columns: IndexMap<String, ColumnStats>,
    globals: IndexMap<&'static str, StatValue>,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(&self, column: &str) -> Option<&ColumnStats> {
        self.columns.get(column)
    }

    pub fn metric(&self, column: &str, metric: &str) -> Option<&StatValue> {
        self.columns.get(column).and_then(|stats| stats.get(metric))
    }

    pub fn global(&self, name: &str) -> Option<&StatValue> {
        self.globals.get(name)
    }

    /// Number of metrics, column and global
    pub fn len(&self) -> usize {
        self.columns.values().map(IndexMap::len).sum::<usize>() + self.globals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The `<column>_<metric>` view used for export
    pub fn flattened(&self) -> IndexMap<String, &StatValue> {
        let mut flat = IndexMap::with_capacity(self.len());
        for (column, stats) in &self.columns {
            for (metric, value) in stats {
                flat.entry(format!("{}_{}", column, metric)).or_insert(value);
            }
        }
        for (name, value) in &self.globals {
            flat.entry(name.to_string()).or_insert(value);
        }
        flat
    }

    fn insert_metric(&mut self, column: &str, metric: &'static str, value: StatValue) {
        self.columns
            .entry(column.to_string())
            .or_default()
            .insert(metric, value);
    }

    fn insert_global(&mut self, name: &'static str, value: StatValue) {
        self.globals.insert(name, value);
    }
}

impl Serialize for Statistics {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let flat = self.flattened();
        let mut map = serializer.serialize_map(Some(flat.len()))?;
        for (key, value) in &flat {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Output of the aggregation stage
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub columns: BTreeSet<String>,
    pub statistics: Statistics,
}

/// Round to two decimal places. Values too large to scale are already
/// whole numbers and come back unchanged.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 100.0
}

/// Compute per-column and global statistics for a record set.
///
/// Columns are visited in alphabetical order so the same records always
/// produce the same mapping.
pub fn aggregate(
    records: &[Record],
    cancel: &CancellationToken,
) -> Result<Aggregation, ExtractionError> {
    let mut columns = BTreeSet::new();
    for record in records {
        cancel.check()?;
        columns.extend(record.fields.keys().cloned());
    }

    let mut statistics = Statistics::new();
    for column in &columns {
        cancel.check()?;
        column_statistics(records, column, &mut statistics);
    }

    let total_lines = records.last().map(|r| r.line_number).unwrap_or(0);
    let populated: usize = records.iter().map(Record::populated_fields).sum();
    let avg_fields = if records.is_empty() {
        0.0
    } else {
        round2(populated as f64 / records.len() as f64)
    };
    let efficiency = if total_lines == 0 {
        0.0
    } else {
        round2(records.len() as f64 / total_lines as f64 * 100.0)
    };

    statistics.insert_global("total_records", StatValue::Count(records.len()));
    statistics.insert_global("total_lines_processed", StatValue::Count(total_lines));
    statistics.insert_global("total_columns", StatValue::Count(columns.len()));
    statistics.insert_global("avg_fields_per_record", StatValue::Number(avg_fields));
    statistics.insert_global("processing_efficiency", StatValue::Number(efficiency));

    let shadowed = statistics.len() - statistics.flattened().len();
    if shadowed > 0 {
        warn!(
            shadowed,
            "column names overlap in flat statistics keys, export keeps the first column's value"
        );
    }

    debug!(
        columns = columns.len(),
        metrics = statistics.len(),
        "aggregated statistics"
    );
    Ok(Aggregation {
        columns,
        statistics,
    })
}

fn column_statistics(records: &[Record], column: &str, statistics: &mut Statistics) {
    let values: Vec<&str> = records.iter().filter_map(|r| r.value(column)).collect();

    let unique: HashSet<&str> = values.iter().copied().collect();
    statistics.insert_metric(column, "count", StatValue::Count(values.len()));
    statistics.insert_metric(column, "unique_count", StatValue::Count(unique.len()));

    let numbers: Vec<f64> = values
        .iter()
        .filter_map(|v| v.trim().parse::<f64>().ok())
        .filter(|n| n.is_finite())
        .collect();
    if !numbers.is_empty() {
        let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
        let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let avg = mean(&numbers);
        statistics.insert_metric(column, "min", StatValue::Number(min));
        statistics.insert_metric(column, "max", StatValue::Number(max));
        statistics.insert_metric(column, "avg", StatValue::Number(round2(avg)));
    }

    statistics.insert_metric(
        column,
        "top_values",
        StatValue::Frequencies(top_values(&values, TOP_K)),
    );
}

fn mean(numbers: &[f64]) -> f64 {
    let sum: f64 = numbers.iter().sum();
    if sum.is_finite() {
        return sum / numbers.len() as f64;
    }
    // running mean when the plain sum overflows
    numbers
        .iter()
        .enumerate()
        .fold(0.0, |avg, (i, n)| avg + (n - avg) / (i + 1) as f64)
}

/// Most frequent values; ties keep first-appearance order
fn top_values(values: &[&str], k: usize) -> IndexMap<String, usize> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for value in values {
        *counts.entry(*value).or_insert(0) += 1;
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    // sort_by is stable
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(k)
        .map(|(value, count)| (value.to_string(), count))
        .collect()
}
