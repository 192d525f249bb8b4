//! Common surface of allocators that produce the next id on demand.

use async_trait::async_trait;

use crate::result::AppResult;

/// An allocator that hands out the next id and can preview it.
#[async_trait]
pub trait IdGenerator: Send + Sync + std::fmt::Debug {
    /// Allocate the next id.
    async fn next_id(&self) -> AppResult<i64>;

    /// Preview the id the next call to [`IdGenerator::next_id`] would return.
    ///
    /// This is a snapshot; concurrent callers may consume it first.
    async fn current_next_id(&self) -> AppResult<i64>;
}
