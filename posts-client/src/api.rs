use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Post, PostDraft};

/// Remote post collection. Implementations perform one request per call:
/// no retries, no caching.
#[async_trait]
pub trait PostsApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Post>>;
    async fn create(&self, draft: &PostDraft) -> Result<Post>;
    async fn update(&self, id: i64, post: &Post) -> Result<Post>;
    async fn delete(&self, id: i64) -> Result<()>;
}
