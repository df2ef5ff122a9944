use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::lang::Lang;

const SUPPORTED_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum KnowledgeBaseError {
    #[error("failed to read knowledge base {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid knowledge base: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported knowledge base version {0} (expected {SUPPORTED_VERSION})")]
    UnsupportedVersion(u32),

    #[error("knowledge base has no items")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    pub domain: String,
    pub lang: Lang,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct KnowledgeFile {
    version: u32,
    items: Vec<KnowledgeItem>,
}

/// Ordered, read-only passage list. Positions are the index IDs, so the
/// order must never change once an index has been built from it.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    items: Vec<KnowledgeItem>,
}

impl KnowledgeBase {
    pub fn load(path: &Path) -> Result<Self, KnowledgeBaseError> {
        let raw = fs::read_to_string(path).map_err(|source| KnowledgeBaseError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, KnowledgeBaseError> {
        let file: KnowledgeFile = serde_json::from_str(raw)?;
        if file.version != SUPPORTED_VERSION {
            return Err(KnowledgeBaseError::UnsupportedVersion(file.version));
        }
        Self::from_items(file.items)
    }

    pub fn from_items(items: Vec<KnowledgeItem>) -> Result<Self, KnowledgeBaseError> {
        if items.is_empty() {
            return Err(KnowledgeBaseError::Empty);
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[KnowledgeItem] {
        &self.items
    }

    pub fn get(&self, position: usize) -> Option<&KnowledgeItem> {
        self.items.get(position)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_versioned_file_in_order() {
        let kb = KnowledgeBase::from_json(
            r#"{"version": 1, "items": [
                {"domain": "health", "lang": "en", "text": "first"},
                {"domain": "health", "lang": "te", "text": "second"}
            ]}"#,
        )
        .unwrap();
        assert_eq!(kb.len(), 2);
        assert_eq!(kb.items()[0].text, "first");
        assert_eq!(kb.get(1).unwrap().lang, Lang::Te);
        assert!(kb.get(2).is_none());
    }

    #[test]
    fn rejects_unknown_version() {
        let err = KnowledgeBase::from_json(r#"{"version": 2, "items": []}"#).unwrap_err();
        assert!(matches!(err, KnowledgeBaseError::UnsupportedVersion(2)));
    }

    #[test]
    fn rejects_empty_items() {
        let err = KnowledgeBase::from_json(r#"{"version": 1, "items": []}"#).unwrap_err();
        assert!(matches!(err, KnowledgeBaseError::Empty));
    }

    #[test]
    fn rejects_unsupported_language() {
        let err = KnowledgeBase::from_json(
            r#"{"version": 1, "items": [{"domain": "x", "lang": "fr", "text": "t"}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, KnowledgeBaseError::Parse(_)));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = KnowledgeBase::load(Path::new("/nonexistent/kb.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/kb.json"), "got: {err}");
    }

    #[test]
    fn shipped_knowledge_base_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/knowledge_base.json");
        let kb = KnowledgeBase::load(&path).unwrap();
        let langs: Vec<Lang> = kb.items().iter().map(|i| i.lang).collect();
        assert_eq!(langs, vec![Lang::En, Lang::Hi, Lang::Te]);
        assert!(kb.items().iter().all(|i| i.domain == "health"));
    }
}
