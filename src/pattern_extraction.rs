use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::error::ExtractionError;
use crate::pipeline::cancel::CancellationToken;
use crate::record::Record;

/// A single compiled pattern and the named fields it extracts
#[derive(Debug, Clone)]
pub struct PatternExtractor {
    regex: Regex,
    fields: Vec<String>,
}

impl PatternExtractor {
    /// Compile a pattern for case-insensitive matching
    pub fn new(index: usize, pattern: &str) -> Result<Self, ExtractionError> {
        if pattern.trim().is_empty() {
            return Err(ExtractionError::EmptyPattern { index });
        }

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| ExtractionError::InvalidPattern { index, source })?;

        // Group 0 and unnamed groups carry no field name
        let fields = regex
            .capture_names()
            .flatten()
            .map(str::to_string)
            .collect();

        Ok(PatternExtractor { regex, fields })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Extract named captures from text, or `None` when the pattern does not match.
    /// Groups that did not participate in the match are left out.
    pub fn extract(&self, text: &str) -> Option<IndexMap<String, String>> {
        let captures = self.regex.captures(text)?;

        let mut fields = IndexMap::with_capacity(self.fields.len());
        for name in &self.fields {
            if let Some(capture) = captures.name(name) {
                fields.insert(name.clone(), capture.as_str().to_string());
            }
        }
        Some(fields)
    }
}

/// Ordered set of patterns applied first-match-wins to each line
#[derive(Debug, Clone)]
pub struct Parser {
    extractors: Vec<PatternExtractor>,
}

impl Parser {
    /// Compile every pattern before any line is touched, so one bad pattern
    /// aborts the whole parse.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ExtractionError> {
        if patterns.is_empty() {
            return Err(ExtractionError::EmptyPatternList);
        }

        let extractors = patterns
            .iter()
            .enumerate()
            .map(|(index, pattern)| PatternExtractor::new(index, pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(patterns = extractors.len(), "compiled patterns");
        Ok(Parser { extractors })
    }

    /// Try each pattern in order against a single line
    pub fn parse_line(&self, line: &str, line_number: usize) -> Option<Record> {
        if line.trim().is_empty() {
            return None;
        }

        self.extractors
            .iter()
            .enumerate()
            .find_map(|(pattern_index, extractor)| {
                extractor.extract(line).map(|fields| Record {
                    raw_text: line.to_string(),
                    line_number,
                    pattern_index,
                    fields,
                })
            })
    }

    /// Parse all lines; line numbers are 1-based positions in `lines`,
    /// so skipped lines leave gaps.
    pub fn parse<S: AsRef<str>>(
        &self,
        lines: &[S],
        cancel: &CancellationToken,
    ) -> Result<Vec<Record>, ExtractionError> {
        let mut records = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            cancel.check()?;
            if let Some(record) = self.parse_line(line.as_ref(), i + 1) {
                records.push(record);
            }
        }

        debug!(
            lines = lines.len(),
            records = records.len(),
            "parsed input"
        );
        Ok(records)
    }
}
