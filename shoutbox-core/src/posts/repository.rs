use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::{NewShoutPost, PostId, ShoutPost, ShoutPostView};
use crate::ModuleId;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Post not found: {0}")]
    PostNotFound(PostId),
}

/// Storage for shout posts.
///
/// Flood control and the profanity filter run before any mutating call; the
/// repository itself performs no throttling.
#[async_trait]
pub trait ShoutPostRepository: Send + Sync + std::fmt::Debug {
    /// All posts and replies of a module, newest first.
    async fn get_posts(&self, module_id: ModuleId) -> Vec<ShoutPost>;

    async fn get_post(&self, item_id: PostId) -> Option<ShoutPost>;

    /// The newest `limit` top-level posts of a module with their replies.
    async fn get_display_posts(&self, module_id: ModuleId, limit: usize) -> Vec<ShoutPostView>;

    /// Increment the up votes of a post, returning the new count.
    async fn vote_up(&self, item_id: PostId) -> Result<i64, RepositoryError>;

    /// Increment the down votes of a post, returning the new count.
    async fn vote_down(&self, item_id: PostId) -> Result<i64, RepositoryError>;

    async fn add_post(&self, post: NewShoutPost) -> PostId;

    /// Delete a post together with its replies. Returns the number of removed posts.
    async fn delete_item(&self, item_id: PostId) -> usize;

    /// Posts of a module that are at least `age_days` whole days old.
    async fn count_old_shouts(&self, module_id: ModuleId, age_days: i64, now: DateTime<Utc>)
        -> usize;

    async fn delete_old_shouts(
        &self,
        module_id: ModuleId,
        age_days: i64,
        now: DateTime<Utc>,
    ) -> usize;
}
