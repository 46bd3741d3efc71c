use indexmap::IndexMap;
use serde::Serialize;

/// One structured extraction result from a single matching line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub raw_text: String,
    /// 1-based position in the original input
    pub line_number: usize,
    /// Index of the pattern that matched
    pub pattern_index: usize,
    /// Named captures in pattern order
    pub fields: IndexMap<String, String>,
}

impl Record {
    /// Value of a field, treating an empty capture as absent
    pub fn value(&self, field: &str) -> Option<&str> {
        self.fields
            .get(field)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Number of fields holding a non-empty value
    pub fn populated_fields(&self) -> usize {
        self.fields.values().filter(|v| !v.is_empty()).count()
    }
}

/// Records sharing one correlation-field value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationGroup {
    pub correlation_id: String,
    pub records: Vec<Record>,
    pub earliest_timestamp: Option<String>,
    pub latest_timestamp: Option<String>,
}

impl CorrelationGroup {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn line_numbers(&self) -> Vec<usize> {
        self.records.iter().map(|r| r.line_number).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_treats_empty_as_missing() {
        let mut fields = IndexMap::new();
        fields.insert("user".to_string(), "alice".to_string());
        fields.insert("session".to_string(), String::new());
        let record = Record {
            raw_text: "alice".to_string(),
            line_number: 1,
            pattern_index: 0,
            fields,
        };

        assert_eq!(record.value("user"), Some("alice"));
        assert_eq!(record.value("session"), None);
        assert_eq!(record.value("missing"), None);
        assert_eq!(record.populated_fields(), 1);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = Record {
            raw_text: "GET /".to_string(),
            line_number: 3,
            pattern_index: 1,
            fields: IndexMap::new(),
        };
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"rawText":"GET /","lineNumber":3,"patternIndex":1,"fields":{}}"#
        );
    }
}
