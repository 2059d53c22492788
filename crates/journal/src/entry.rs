//! Log entry data structures

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One durably recorded pending field write.
///
/// `sequence` is monotonically increasing per log instance and only serves to
/// recover insertion order when replaying an entity's pending entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Entity the write belongs to
    pub entity: String,
    /// Dot-delimited path addressing one leaf (e.g. `skills.回避.job`)
    pub path: String,
    /// Value to assign at the leaf, replacing whatever was there
    pub value: Value,
    /// Insertion-order sequence number
    pub sequence: u64,
}
