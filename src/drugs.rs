//! Static drug information table.
//!
//! Loaded once at startup from a TOML file and queried by name. A lookup is
//! a case-insensitive substring match over the name column, so partial input
//! from the viewer still finds the record:
//!
//! ```toml
//! [[drugs]]
//! name = "Aspirin"
//! precautions = "Take with food. Avoid alcohol."
//! ```
//!
//! Precautions are stored as one sentence-separated string and split on `.`
//! for display, one line per point.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Default, Deserialize)]
struct TableFile {
    #[serde(default)]
    drugs: Vec<DrugEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct DrugEntry {
    name: String,
    #[serde(default)]
    precautions: String,
}

/// # One search hit.
///
/// `precautions` is already split into display lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrugMatch {
    pub name: String,
    pub precautions: Vec<String>,
}

impl DrugMatch {
    /// One-line rendering for the notification sink.
    pub fn summary(&self) -> String {
        if self.precautions.is_empty() {
            return self.name.clone();
        }
        format!("{}: {}", self.name, self.precautions.join("; "))
    }
}

/// # In-memory drug table.
///
/// Immutable after load; safe to share behind an `Arc` without locking.
#[derive(Debug, Default)]
pub struct DrugTable {
    entries: Vec<DrugEntry>,
}

impl DrugTable {
    /// Creates a table with no entries. Every search reports no match.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Loads the table from a TOML file.
    ///
    /// A configured table that cannot be read or parsed is a startup error;
    /// running with silently missing drug data would make every lookup lie.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let raw = std::fs::read_to_string(path).map_err(|err| {
            Error::Internal(format!("drug table {}: {err}", path.display()))
        })?;
        let file: TableFile = toml::from_str(&raw).map_err(|err| {
            Error::Internal(format!("drug table {}: {err}", path.display()))
        })?;
        Ok(Self { entries: file.drugs })
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring search over drug names.
    ///
    /// Returns hits in table order. An empty query matches nothing.
    pub fn search(&self, query: &str) -> Vec<DrugMatch> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.entries
            .iter()
            .filter(|entry| entry.name.to_lowercase().contains(&needle))
            .map(|entry| DrugMatch {
                name: entry.name.clone(),
                precautions: split_precautions(&entry.precautions),
            })
            .collect()
    }
}

/// Splits a sentence-separated precautions string into trimmed lines.
fn split_precautions(raw: &str) -> Vec<String> {
    raw.split('.')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const SAMPLE: &str = r#"
[[drugs]]
name = "Aspirin"
precautions = "Take with food. Avoid alcohol."

[[drugs]]
name = "Aspirin Protect"
precautions = "Do not crush."

[[drugs]]
name = "Ibuprofen"
precautions = ""
"#;

    fn sample_table() -> DrugTable {
        let file: TableFile = toml::from_str(SAMPLE).unwrap();
        DrugTable { entries: file.drugs }
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let table = sample_table();
        let hits = table.search("aspirin");
        let names: Vec<&str> = hits.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["Aspirin", "Aspirin Protect"]);

        assert_eq!(table.search("PROT").len(), 1);
        assert!(table.search("paracetamol").is_empty());
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let table = sample_table();
        assert!(table.search("").is_empty());
        assert!(table.search("   ").is_empty());
    }

    #[test]
    fn test_precautions_split_into_lines() {
        let table = sample_table();
        let hit = &table.search("Ibuprofen")[0];
        assert!(hit.precautions.is_empty());

        let hit = &table.search("Aspirin")[0];
        assert_eq!(hit.precautions, vec!["Take with food", "Avoid alcohol"]);
        assert_eq!(hit.summary(), "Aspirin: Take with food; Avoid alcohol");
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let table = DrugTable::load(file.path()).unwrap();
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_load_rejects_malformed_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[[drugs]\nname=").unwrap();

        let err = DrugTable::load(file.path()).unwrap_err();
        assert_eq!(err.as_label(), "internal");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = DrugTable::load(Path::new("/nonexistent/drugs.toml")).unwrap_err();
        assert_eq!(err.as_label(), "internal");
    }
}
