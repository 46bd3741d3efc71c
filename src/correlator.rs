use indexmap::IndexMap;
use tracing::debug;

use crate::error::ExtractionError;
use crate::pipeline::cancel::CancellationToken;
use crate::record::{CorrelationGroup, Record};

/// Field names checked, in order, for group timestamp bounds
pub const TIMESTAMP_KEYS: &[&str] = &[
    "Timestamp",
    "timestamp",
    "Time",
    "time",
    "DateTime",
    "datetime",
    "Date",
    "date",
    "ts",
    "@timestamp",
];

/// Group records by the value of `field`.
///
/// Records without a non-empty value for the field are left out of every
/// group. Timestamp bounds compare values as plain strings, so only
/// zero-padded ISO-style timestamps order correctly.
pub fn correlate(
    records: &[Record],
    field: &str,
    cancel: &CancellationToken,
) -> Result<Vec<CorrelationGroup>, ExtractionError> {
    if field.trim().is_empty() {
        return Err(ExtractionError::EmptyCorrelationField);
    }

    let mut partitions: IndexMap<&str, Vec<&Record>> = IndexMap::new();
    let mut ungrouped = 0usize;
    for record in records {
        cancel.check()?;
        match record.value(field) {
            Some(id) => partitions.entry(id).or_default().push(record),
            None => ungrouped += 1,
        }
    }

    let mut groups: Vec<CorrelationGroup> = partitions
        .into_iter()
        .map(|(id, members)| build_group(id, members))
        .collect();

    groups.sort_by(|a, b| {
        (a.earliest_timestamp.is_none(), &a.earliest_timestamp, &a.correlation_id).cmp(&(
            b.earliest_timestamp.is_none(),
            &b.earliest_timestamp,
            &b.correlation_id,
        ))
    });

    debug!(
        field,
        groups = groups.len(),
        ungrouped,
        "correlated records"
    );
    Ok(groups)
}

fn build_group(id: &str, members: Vec<&Record>) -> CorrelationGroup {
    let mut records: Vec<Record> = members.into_iter().cloned().collect();
    records.sort_by_key(|r| r.line_number);

    let (earliest_timestamp, latest_timestamp) = timestamp_bounds(&records);

    CorrelationGroup {
        correlation_id: id.to_string(),
        records,
        earliest_timestamp,
        latest_timestamp,
    }
}

/// Earliest and latest value of the first timestamp key present in the group
fn timestamp_bounds(records: &[Record]) -> (Option<String>, Option<String>) {
    let Some(key) = TIMESTAMP_KEYS
        .iter()
        .find(|key| records.iter().any(|r| r.fields.contains_key(**key)))
    else {
        return (None, None);
    };

    let values = || records.iter().filter_map(|r| r.value(key));
    (
        values().min().map(str::to_string),
        values().max().map(str::to_string),
    )
}
