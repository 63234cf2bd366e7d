//! Upgrade of persisted route documents written by older releases.
//!
//! The first release stored `route -> payload` with the bare JSON payload as
//! the value. Current releases store `route -> {"type", "content"}`. Each
//! entry is decoded as the current shape first, then as a legacy payload,
//! and dropped when neither decode succeeds.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::record::{normalize_route, ContentKind, RouteContent};

#[derive(Deserialize)]
struct TaggedRecord {
    #[serde(rename = "type", alias = "kind")]
    kind: ContentKind,
    content: Value,
}

/// A payload from the first release: any object or array.
#[derive(Deserialize)]
#[serde(untagged)]
enum LegacyPayload {
    Object(Map<String, Value>),
    Array(Vec<Value>),
}

impl From<LegacyPayload> for Value {
    fn from(p: LegacyPayload) -> Self {
        match p {
            LegacyPayload::Object(m) => Value::Object(m),
            LegacyPayload::Array(a) => Value::Array(a),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Already in the tagged shape.
    Kept,
    /// Legacy payload wrapped as `json`.
    Wrapped,
    /// Unrecoverable; not carried forward.
    Dropped,
}

/// Decode a single stored value.
pub fn migrate_entry(value: Value) -> (Option<RouteContent>, EntryOutcome) {
    if let Ok(tagged) = TaggedRecord::deserialize(&value) {
        if let Ok(content) = RouteContent::from_parts(tagged.kind, tagged.content) {
            return (Some(content), EntryOutcome::Kept);
        }
    }
    match LegacyPayload::deserialize(value) {
        Ok(payload) => (Some(RouteContent::Json(payload.into())), EntryOutcome::Wrapped),
        Err(_) => (None, EntryOutcome::Dropped),
    }
}

/// Migrate a whole `route -> value` map. Never fails; dropped entries are logged.
pub fn migrate_map(raw: Map<String, Value>) -> BTreeMap<String, RouteContent> {
    let mut out = BTreeMap::new();
    for (key, value) in raw {
        let route = normalize_route(&key);
        match migrate_entry(value) {
            (Some(content), EntryOutcome::Kept) => {
                debug!(event = "migrate_entry", %route, outcome = "kept", "route record already current");
                out.insert(route, content);
            }
            (Some(content), _) => {
                info!(event = "migrate_entry", %route, outcome = "wrapped", "wrapped legacy route payload as json");
                out.insert(route, content);
            }
            (None, _) => {
                warn!(event = "migrate_entry", %route, outcome = "dropped", "dropping unrecoverable route record");
            }
        }
    }
    out
}

/// Migrate a whole persisted document. A top-level value that is not an
/// object yields an empty map.
pub fn migrate_document(doc: Value) -> BTreeMap<String, RouteContent> {
    match doc {
        Value::Object(map) => migrate_map(map),
        other => {
            warn!(event = "migrate_document", found = %type_name(&other), "routes document is not an object; ignoring it");
            BTreeMap::new()
        }
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
