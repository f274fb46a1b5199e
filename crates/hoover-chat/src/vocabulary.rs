//! Cryptonym dictionary: uppercase term to definition.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ChatError;

/// Read-only map of known terms. Keys are stored uppercase.
#[derive(Debug, Clone, Default)]
pub struct VocabularyIndex {
    entries: HashMap<String, String>,
}

impl VocabularyIndex {
    /// Build an index from `(term, definition)` pairs. Later duplicates win.
    pub fn from_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.as_ref().trim().to_uppercase(), v.into()))
                .filter(|(k, _)| !k.is_empty())
                .collect(),
        }
    }

    /// Load an index through the given loader.
    pub fn load(loader: &dyn VocabularyLoader) -> Result<Self, ChatError> {
        let index = loader.load()?;
        tracing::info!(
            source = %loader.describe(),
            terms = index.len(),
            "Vocabulary loaded"
        );
        Ok(index)
    }

    /// Definition for a term, case-insensitively.
    pub fn get(&self, term: &str) -> Option<&str> {
        self.entries.get(&term.to_uppercase()).map(String::as_str)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.get(term).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Source of vocabulary entries.
pub trait VocabularyLoader {
    fn load(&self) -> Result<VocabularyIndex, ChatError>;

    /// Human-readable source name for logs.
    fn describe(&self) -> String;
}

/// Loads a JSON object of `{ "TERM": "definition" }` from disk.
pub struct JsonFileLoader {
    path: PathBuf,
}

impl JsonFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VocabularyLoader for JsonFileLoader {
    fn load(&self) -> Result<VocabularyIndex, ChatError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            ChatError::Vocabulary(format!("cannot read {}: {}", self.path.display(), e))
        })?;
        let entries: HashMap<String, String> = serde_json::from_str(&content).map_err(|e| {
            ChatError::Vocabulary(format!("invalid JSON in {}: {}", self.path.display(), e))
        })?;
        Ok(VocabularyIndex::from_entries(entries))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        let index = VocabularyIndex::from_entries([("mkultra", "CIA mind-control program")]);
        assert_eq!(index.get("MKULTRA"), Some("CIA mind-control program"));
        assert_eq!(index.get("MkUltra"), Some("CIA mind-control program"));
        assert!(index.contains("mkultra"));
        assert!(!index.contains("ZRRIFLE"));
    }

    #[test]
    fn test_blank_keys_are_dropped() {
        let index = VocabularyIndex::from_entries([("  ", "nothing"), ("AM", "prefix")]);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_json_file_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cryptonyms.json");
        std::fs::write(
            &path,
            r#"{"MKULTRA": "CIA mind-control program", "ZRRIFLE": "executive action capability"}"#,
        )
        .unwrap();

        let index = VocabularyIndex::load(&JsonFileLoader::new(&path)).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(index.get("zrrifle"), Some("executive action capability"));
    }

    #[test]
    fn test_missing_file_is_vocabulary_error() {
        let loader = JsonFileLoader::new("/nonexistent/cryptonyms.json");
        assert!(matches!(
            VocabularyIndex::load(&loader),
            Err(ChatError::Vocabulary(_))
        ));
    }

    #[test]
    fn test_malformed_json_is_vocabulary_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();

        let err = JsonFileLoader::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }
}
