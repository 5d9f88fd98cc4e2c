use serde::{Deserialize, Serialize};

/// One record per counted surface, stored in the `view_counters` table with
/// the key doubling as the record id. Created lazily on first access and
/// never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ViewCounter {
    pub key: String,
    pub count: i64,
}
