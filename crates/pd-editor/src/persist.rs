//! Persistence boundary.
//!
//! The editor talks to storage through the [`Store`] port: a string-keyed
//! blob store. The published blob is a versioned JSON envelope
//! (`{"version": 1, "nodes": [...]}`); a bare node array written by older
//! builds is still accepted. Anything malformed or structurally invalid is
//! rejected, and [`load_or_empty`] falls back to an empty document.

use pd_core::document::Document;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Storage key the published document is written under.
pub const STORAGE_KEY: &str = "data";

/// Current envelope version.
pub const FORMAT_VERSION: u64 = 1;

/// Persistence error type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PersistError {
    /// The blob is not valid JSON or does not match the node shape.
    #[error("malformed document: {0}")]
    Malformed(String),

    /// The envelope carries a version this build cannot read.
    #[error("unsupported document version {found}")]
    UnsupportedVersion {
        /// The version found in the envelope.
        found: u64,
    },

    /// The blob parsed but violates a document invariant.
    #[error("invalid document: {0}")]
    Invalid(String),

    /// The document could not be encoded.
    #[error("could not encode document: {0}")]
    Encode(String),

    /// The storage backend refused the operation.
    #[error("storage backend failed: {0}")]
    Backend(String),
}

/// A string-keyed blob store.
pub trait Store {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn save(&mut self, key: &str, blob: &str) -> Result<(), PersistError>;
}

/// In-process [`Store`] backed by a map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with one entry.
    pub fn with_entry(key: &str, blob: &str) -> Self {
        let mut store = Self::new();
        store.entries.insert(key.to_string(), blob.to_string());
        store
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl Store for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, blob: &str) -> Result<(), PersistError> {
        self.entries.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}

// ─── Blob format ────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Envelope<'a> {
    version: u64,
    nodes: &'a Document,
}

/// Encode a document as the published JSON envelope.
pub fn encode(doc: &Document) -> Result<String, PersistError> {
    let envelope = Envelope {
        version: FORMAT_VERSION,
        nodes: doc,
    };
    serde_json::to_string(&envelope).map_err(|e| PersistError::Encode(e.to_string()))
}

/// Decode a published blob. Accepts the versioned envelope or a legacy
/// bare node array, then validates the result.
pub fn decode(blob: &str) -> Result<Document, PersistError> {
    let value: Value =
        serde_json::from_str(blob).map_err(|e| PersistError::Malformed(e.to_string()))?;

    let nodes = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => {
            let version = map.get("version").and_then(Value::as_u64);
            match version {
                Some(FORMAT_VERSION) => {}
                Some(found) => return Err(PersistError::UnsupportedVersion { found }),
                None => {
                    return Err(PersistError::Malformed(
                        "envelope is missing a numeric version".into(),
                    ));
                }
            }
            map.remove("nodes")
                .ok_or_else(|| PersistError::Malformed("envelope has no nodes".into()))?
        }
        other => {
            return Err(PersistError::Malformed(format!(
                "expected an object or array, got {other}"
            )));
        }
    };

    let doc: Document =
        serde_json::from_value(nodes).map_err(|e| PersistError::Malformed(e.to_string()))?;
    doc.validate().map_err(PersistError::Invalid)?;
    Ok(doc)
}

/// Encode and write `doc` under `key`.
pub fn save(store: &mut dyn Store, key: &str, doc: &Document) -> Result<(), PersistError> {
    let blob = encode(doc)?;
    store.save(key, &blob)?;
    log::debug!("saved {} node(s) under {key:?}", doc.len());
    Ok(())
}

/// Load the document under `key`. A missing entry is an empty document;
/// unreadable state is logged and also yields an empty document.
pub fn load_or_empty(store: &dyn Store, key: &str) -> Document {
    let blob = match store.load(key) {
        Ok(Some(blob)) => blob,
        Ok(None) => return Document::new(),
        Err(e) => {
            log::warn!("could not read {key:?}: {e}");
            return Document::new();
        }
    };
    match decode(&blob) {
        Ok(doc) => doc,
        Err(e) => {
            log::warn!("discarding persisted document {key:?}: {e}");
            Document::new()
        }
    }
}

// ─── Snapshots ──────────────────────────────────────────────────────────

/// Opaque binary snapshot (MessagePack) for in-process save/restore.
pub fn encode_snapshot(doc: &Document) -> Result<Vec<u8>, PersistError> {
    rmp_serde::to_vec_named(doc).map_err(|e| PersistError::Encode(e.to_string()))
}

pub fn decode_snapshot(bytes: &[u8]) -> Result<Document, PersistError> {
    let doc: Document =
        rmp_serde::from_slice(bytes).map_err(|e| PersistError::Malformed(e.to_string()))?;
    doc.validate().map_err(PersistError::Invalid)?;
    Ok(doc)
}
