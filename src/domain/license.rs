//! License code lookup table

use std::collections::HashMap;

/// Immutable mapping from Flickr license code to display name.
///
/// Built once before the worker pool starts and shared behind an `Arc`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LicenseTable {
    names: HashMap<String, String>,
}

impl LicenseTable {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            names: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Display name for a license code.
    pub fn name(&self, code: &str) -> Option<&str> {
        self.names.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        let table = LicenseTable::new([
            ("0", "All Rights Reserved"),
            ("4", "Attribution License"),
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.name("4"), Some("Attribution License"));
        assert_eq!(table.name("99"), None);
    }

    #[test]
    fn test_empty() {
        assert!(LicenseTable::default().is_empty());
    }
}
