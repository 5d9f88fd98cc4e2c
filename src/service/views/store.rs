use async_trait::async_trait;
use derive_new::new;
use snafu::{OptionExt, ResultExt};

use crate::model::ViewCounter;
use crate::service::database::Backend;

use super::error::*;

/// Persistence seam for view counters. The production implementation rides
/// on SurrealDB; tests substitute an in-memory map.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Fetch the counter, `None` when it was never created.
    async fn read(&self, key: &str) -> Result<Option<ViewCounter>>;

    /// Atomic increment-or-create. A record created by this call comes back
    /// with `count == 1`.
    async fn increment(&self, key: &str) -> Result<ViewCounter>;

    /// Overwrite the stored count.
    async fn set(&self, key: &str, count: i64) -> Result<ViewCounter>;

    /// Create the counter with an explicit starting count.
    async fn create(&self, key: &str, count: i64) -> Result<ViewCounter>;
}

#[derive(Debug, Clone, new)]
pub struct SurrealCounterStore {
    backend: Backend,
}

#[async_trait]
impl CounterStore for SurrealCounterStore {
    async fn read(&self, key: &str) -> Result<Option<ViewCounter>> {
        self.backend
            .select(("view_counters", key))
            .await
            .context(StoreSnafu)
    }

    async fn increment(&self, key: &str) -> Result<ViewCounter> {
        // Updating a specific record id upserts in SurrealDB, and `+=` on an
        // absent field counts up from an implicit zero, so a record created
        // by this statement comes back with count == 1. One statement, so
        // concurrent increments serialize at the store and none are lost.
        let mut response = self
            .backend
            .query(
                "UPDATE type::thing('view_counters', $key) \
                 SET key = $key, count += 1 RETURN AFTER",
            )
            .bind(("key", key.to_string()))
            .await
            .context(StoreSnafu)?;

        let updated: Option<ViewCounter> = response.take(0).context(DeserializeSnafu)?;
        updated.context(MissingRecordSnafu { key })
    }

    async fn set(&self, key: &str, count: i64) -> Result<ViewCounter> {
        let updated: Option<ViewCounter> = self
            .backend
            .update(("view_counters", key))
            .merge(serde_json::json!({ "count": count }))
            .await
            .context(StoreSnafu)?;

        updated.context(MissingRecordSnafu { key })
    }

    async fn create(&self, key: &str, count: i64) -> Result<ViewCounter> {
        let created: Option<ViewCounter> = self
            .backend
            .create(("view_counters", key))
            .content(ViewCounter {
                key: key.to_string(),
                count,
            })
            .await
            .context(StoreSnafu)?;

        created.context(MissingRecordSnafu { key })
    }
}
