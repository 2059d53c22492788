//! Nested document representation and dot-path merge

use serde_json::{Map, Value};

/// Full persisted state for one entity.
///
/// A tree of String | Number | Bool | Null | Sequence | Mapping nodes. The
/// root of a stored document is always a Mapping.
pub type Document = Value;

/// The implicit initial state of an entity that has never been persisted.
pub fn empty_document() -> Document {
    Value::Object(Map::new())
}

/// Applies one dot-addressed leaf assignment onto a document.
///
/// The path is split on `.` and walked from the root. Any intermediate
/// segment that is missing, or that holds something other than a Mapping, is
/// replaced with a fresh empty Mapping. The final segment is assigned
/// wholesale: whatever was there before is replaced, never merged.
///
/// Writes to disjoint path prefixes therefore commute, while writes to the
/// same path are strictly last-write-wins. Segments may be any string,
/// including non-ASCII keys and the empty string.
pub fn apply_path(doc: &mut Document, path: &str, value: Value) {
    let mut node = force_mapping(doc, path);
    let mut rest = path;
    while let Some((segment, tail)) = rest.split_once('.') {
        let child = node
            .entry(segment.to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        node = force_mapping(child, path);
        rest = tail;
    }
    node.insert(rest.to_owned(), value);
}

/// Returns the node's mapping, clobbering any other value kind.
///
/// Scalars and sequences found where the walk needs a Mapping are replaced
/// wholesale; sibling branches elsewhere in the document are untouched.
fn force_mapping<'a>(node: &'a mut Value, path: &str) -> &'a mut Map<String, Value> {
    if !node.is_object() {
        tracing::warn!(path, "replacing non-mapping node on merge path");
        *node = Value::Object(Map::new());
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just forced to a mapping"),
    }
}
