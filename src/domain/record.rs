//! Normalized occurrence record
//!
//! A record always has exactly one slot per schema column. Values are
//! addressed by field name; names outside the schema are rejected, so an
//! unknown key can never reach the CSV output.

use super::schema::{self, FIELD_COUNT};

/// One output row keyed by Darwin Core field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    values: Vec<String>,
}

impl NormalizedRecord {
    /// Creates a record with every column empty.
    pub fn new() -> Self {
        Self {
            values: vec![String::new(); FIELD_COUNT],
        }
    }

    /// Sets a field value. Returns `false` (and stores nothing) when `field`
    /// is not a schema column.
    pub fn set(&mut self, field: &str, value: impl Into<String>) -> bool {
        match schema::position(field) {
            Some(i) => {
                self.values[i] = value.into();
                true
            }
            None => false,
        }
    }

    /// Value of a schema field, `None` when the field is unknown or empty.
    pub fn get(&self, field: &str) -> Option<&str> {
        schema::position(field)
            .map(|i| self.values[i].as_str())
            .filter(|v| !v.is_empty())
    }

    /// Values in header order.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Number of non-empty columns.
    pub fn populated(&self) -> usize {
        self.values.iter().filter(|v| !v.is_empty()).count()
    }

    /// Builds a composite key from the given fields, used to detect
    /// duplicate rows. Unknown fields contribute an empty component.
    pub fn key(&self, fields: &[String]) -> String {
        fields
            .iter()
            .map(|f| self.get(f).unwrap_or(""))
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl Default for NormalizedRecord {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{BASIS_OF_RECORD, OCCURRENCE_ID};

    #[test]
    fn test_new_record_has_schema_width() {
        let record = NormalizedRecord::new();
        assert_eq!(record.values().len(), FIELD_COUNT);
        assert_eq!(record.populated(), 0);
    }

    #[test]
    fn test_set_and_get() {
        let mut record = NormalizedRecord::new();
        assert!(record.set(BASIS_OF_RECORD, "Image"));
        assert_eq!(record.get(BASIS_OF_RECORD), Some("Image"));
        assert_eq!(record.values()[0], "Image");
    }

    #[test]
    fn test_unknown_field_is_dropped() {
        let mut record = NormalizedRecord::new();
        assert!(!record.set("bogusfield", "x"));
        assert_eq!(record.get("bogusfield"), None);
        assert_eq!(record.populated(), 0);
        assert_eq!(record.values().len(), FIELD_COUNT);
    }

    #[test]
    fn test_key() {
        let mut record = NormalizedRecord::new();
        record.set(OCCURRENCE_ID, "https://www.flickr.com/photos/a/1/");
        record.set("scientificName", "Felis catus");
        let key = record.key(&["occurrenceID".to_string(), "scientificName".to_string()]);
        assert_eq!(key, "https://www.flickr.com/photos/a/1/|Felis catus");
    }
}
