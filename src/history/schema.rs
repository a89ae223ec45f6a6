//! On-disk shape of the history document.
//!
//! The current shape is a flat JSON object `{"<identity>": "<label>", ...}`
//! whose key order is insertion order. Older deployments wrote a bare list
//! of identities (`["123", 456]`); such documents are migrated once, here,
//! by giving every identity the caller's legacy label. Nothing else in the
//! crate looks at the raw shape.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::history::History;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// v1: bare list of identities.
    LegacyList,
    /// v2: identity to label map.
    LabelMap,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    LabelMap(IndexMap<String, String>),
    LegacyList(Vec<LegacyId>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LegacyId {
    Text(String),
    Number(i64),
}

impl LegacyId {
    fn into_identity(self) -> String {
        match self {
            LegacyId::Text(s) => s,
            LegacyId::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug)]
pub struct Decoded {
    pub history: History,
    pub version: SchemaVersion,
}

/// Parse a persisted document. Legacy lists come back marked dirty so the
/// first save rewrites them in the current shape.
pub fn decode(bytes: &[u8], legacy_label: &str) -> Result<Decoded, serde_json::Error> {
    match serde_json::from_slice::<Document>(bytes)? {
        Document::LabelMap(labels) => Ok(Decoded {
            history: History::from_labels(labels),
            version: SchemaVersion::LabelMap,
        }),
        Document::LegacyList(ids) => {
            let mut history = History::new();
            for id in ids {
                history.record(&id.into_identity(), legacy_label);
            }
            Ok(Decoded {
                history,
                version: SchemaVersion::LegacyList,
            })
        }
    }
}

pub fn encode(history: &History) -> Result<Vec<u8>, serde_json::Error> {
    serde_json::to_vec(history.labels())
}
