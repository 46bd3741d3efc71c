use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::ExtractionError;
use crate::pipeline::context::ExtractionResult;
use crate::pipeline::ResultSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(format!("Unknown export format: {}", s)),
        }
    }
}

impl ExportFormat {
    /// Pick the format from the file extension. Unknown extensions fall back
    /// to JSON written next to the requested path with a `.json` extension.
    pub fn resolve(path: &Path) -> (ExportFormat, PathBuf) {
        let parsed = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse::<ExportFormat>().ok());

        match parsed {
            Some(format) => (format, path.to_path_buf()),
            None => (ExportFormat::Json, path.with_extension("json")),
        }
    }
}

/// Row layout for CSV exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvLayout {
    /// One row per record
    #[default]
    Records,
    /// One row per correlation group
    Groups,
}

pub fn write_json<W: Write>(output: &mut W, result: &ExtractionResult) -> Result<(), ExtractionError> {
    serde_json::to_writer_pretty(&mut *output, result)?;
    writeln!(output)?;
    Ok(())
}

/// Header is the sorted column list, prefixed with line number and pattern
/// index when the result is correlated.
pub fn write_csv_records<W: Write>(
    output: &mut W,
    result: &ExtractionResult,
) -> Result<(), ExtractionError> {
    let mut writer = csv::Writer::from_writer(output);
    let with_provenance = result.is_correlated();

    let mut header: Vec<&str> = Vec::with_capacity(result.columns.len() + 2);
    if with_provenance {
        header.extend(["line_number", "pattern_index"]);
    }
    header.extend(result.columns.iter().map(String::as_str));
    writer.write_record(&header)?;

    for record in &result.records {
        let mut row: Vec<String> = Vec::with_capacity(header.len());
        if with_provenance {
            row.push(record.line_number.to_string());
            row.push(record.pattern_index.to_string());
        }
        for column in &result.columns {
            row.push(record.fields.get(column).cloned().unwrap_or_default());
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_csv_groups<W: Write>(
    output: &mut W,
    result: &ExtractionResult,
) -> Result<(), ExtractionError> {
    let mut writer = csv::Writer::from_writer(output);
    writer.write_record([
        "correlation_id",
        "entry_count",
        "earliest_timestamp",
        "latest_timestamp",
        "line_numbers",
        "raw_lines",
    ])?;

    for group in &result.groups {
        let line_numbers: Vec<String> = group
            .line_numbers()
            .iter()
            .map(|n| n.to_string())
            .collect();
        let raw_lines: Vec<&str> = group.records.iter().map(|r| r.raw_text.as_str()).collect();
        let entry_count = group.len().to_string();
        let line_numbers = line_numbers.join(";");
        let raw_lines = raw_lines.join(" | ");

        writer.write_record([
            group.correlation_id.as_str(),
            entry_count.as_str(),
            group.earliest_timestamp.as_deref().unwrap_or(""),
            group.latest_timestamp.as_deref().unwrap_or(""),
            line_numbers.as_str(),
            raw_lines.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the result to a file when the pipeline finishes
pub struct FileExporter {
    requested: PathBuf,
    layout: CsvLayout,
}

impl FileExporter {
    pub fn new(path: impl Into<PathBuf>, layout: CsvLayout) -> Self {
        FileExporter {
            requested: path.into(),
            layout,
        }
    }

    /// Format and path that will actually be written
    pub fn target(&self) -> (ExportFormat, PathBuf) {
        ExportFormat::resolve(&self.requested)
    }

    pub fn export(&self, result: &ExtractionResult) -> Result<PathBuf, ExtractionError> {
        let (format, path) = self.target();
        if path != self.requested {
            warn!(
                requested = %self.requested.display(),
                actual = %path.display(),
                "unrecognized output extension, writing JSON"
            );
        }

        let file = File::create(&path).map_err(|e| {
            ExtractionError::ExportError(format!(
                "Failed to create output file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let mut output = BufWriter::new(file);

        match (format, self.layout) {
            (ExportFormat::Json, _) => write_json(&mut output, result)?,
            (ExportFormat::Csv, CsvLayout::Groups) if result.is_correlated() => {
                write_csv_groups(&mut output, result)?
            }
            (ExportFormat::Csv, CsvLayout::Groups) => {
                warn!("group layout requires a correlation field, writing records");
                write_csv_records(&mut output, result)?
            }
            (ExportFormat::Csv, CsvLayout::Records) => write_csv_records(&mut output, result)?,
        }
        output.flush()?;

        info!(path = %path.display(), ?format, "exported result");
        Ok(path)
    }
}

impl ResultSink for FileExporter {
    fn name(&self) -> &str {
        "file-export"
    }

    fn deliver(&mut self, result: &ExtractionResult) -> Result<(), ExtractionError> {
        self.export(result).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::config::PipelineConfig;
    use crate::pipeline::ExtractionPipeline;
    use tempfile::tempdir;

    fn sample(correlate: bool) -> ExtractionResult {
        let mut config = PipelineConfig::new(vec![
            r"(?P<ts>\S+) user=(?P<user>\w+) action=(?P<action>\w+)".to_string(),
        ]);
        if correlate {
            config = config.with_correlation("user");
        }
        ExtractionPipeline::new(config)
            .extract(&[
                "2024-01-01T10:00 user=bob action=login",
                "",
                "2024-01-01T10:05 user=amy action=login",
                "2024-01-01T10:09 user=bob action=logout",
            ])
            .unwrap()
    }

    #[test]
    fn test_resolve_extension() {
        assert_eq!(
            ExportFormat::resolve(Path::new("out.csv")),
            (ExportFormat::Csv, PathBuf::from("out.csv"))
        );
        assert_eq!(
            ExportFormat::resolve(Path::new("out.JSON")),
            (ExportFormat::Json, PathBuf::from("out.JSON"))
        );
        assert_eq!(
            ExportFormat::resolve(Path::new("out.txt")),
            (ExportFormat::Json, PathBuf::from("out.json"))
        );
        assert_eq!(
            ExportFormat::resolve(Path::new("out")),
            (ExportFormat::Json, PathBuf::from("out.json"))
        );
    }

    #[test]
    fn test_csv_records_without_correlation() {
        let mut output = Vec::new();
        write_csv_records(&mut output, &sample(false)).unwrap();
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "action,ts,user");
        assert_eq!(lines[1], "login,2024-01-01T10:00,bob");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_csv_records_with_provenance() {
        let mut output = Vec::new();
        write_csv_records(&mut output, &sample(true)).unwrap();
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "line_number,pattern_index,action,ts,user");
        assert_eq!(lines[2], "3,0,login,2024-01-01T10:05,amy");
    }

    #[test]
    fn test_csv_groups() {
        let mut output = Vec::new();
        write_csv_groups(&mut output, &sample(true)).unwrap();
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            "correlation_id,entry_count,earliest_timestamp,latest_timestamp,line_numbers,raw_lines"
        );
        assert_eq!(lines.len(), 3);
        // bob's first entry is earlier than amy's
        assert!(lines[1].starts_with("bob,2,2024-01-01T10:00,2024-01-01T10:09,1;4,"));
        assert!(lines[1].contains("action=login | 2024-01-01T10:09"));
        assert!(lines[2].starts_with("amy,1,"));
    }

    #[test]
    fn test_json_uses_camel_case_keys() {
        let mut output = Vec::new();
        write_json(&mut output, &sample(true)).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();

        assert_eq!(value["records"][0]["lineNumber"], 1);
        assert_eq!(value["records"][0]["patternIndex"], 0);
        assert_eq!(value["groups"][0]["correlationId"], "bob");
        assert_eq!(value["correlationField"], "user");
        assert_eq!(value["statistics"]["user_unique_count"], 2);
        assert_eq!(value["columns"], serde_json::json!(["action", "ts", "user"]));
    }

    #[test]
    fn test_exporter_falls_back_to_json() {
        let dir = tempdir().unwrap();
        let exporter = FileExporter::new(dir.path().join("result.xml"), CsvLayout::Records);

        let written = exporter.export(&sample(false)).unwrap();
        assert_eq!(written, dir.path().join("result.json"));
        assert!(!dir.path().join("result.xml").exists());

        let content = std::fs::read_to_string(written).unwrap();
        assert!(content.contains("\"patternsUsed\""));
    }

    #[test]
    fn test_exporter_reports_unwritable_path() {
        let dir = tempdir().unwrap();
        let mut exporter =
            FileExporter::new(dir.path().join("missing").join("out.csv"), CsvLayout::Records);
        let err = exporter.deliver(&sample(false)).unwrap_err();
        assert!(matches!(err, ExtractionError::ExportError(_)));
    }
}
