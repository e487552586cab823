use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::repository::{RepositoryError, ShoutPostRepository};
use super::{NewShoutPost, PostId, ShoutPost, ShoutPostView};
use crate::ModuleId;

#[derive(Debug)]
struct PostTable {
    next_id: PostId,
    posts: BTreeMap<PostId, ShoutPost>,
}

impl Default for PostTable {
    fn default() -> Self {
        Self {
            next_id: 1,
            posts: BTreeMap::new(),
        }
    }
}

impl PostTable {
    fn module_posts(&self, module_id: ModuleId) -> impl Iterator<Item = &ShoutPost> {
        self.posts
            .values()
            .filter(move |post| post.module_id == module_id)
    }

    fn vote(
        &mut self,
        item_id: PostId,
        counter: impl FnOnce(&mut ShoutPost) -> &mut i64,
    ) -> Result<i64, RepositoryError> {
        let post = self
            .posts
            .get_mut(&item_id)
            .ok_or(RepositoryError::PostNotFound(item_id))?;
        let count = counter(post);
        *count += 1;
        Ok(*count)
    }

    /// Remove the given posts and every reply pointing at one of them.
    fn remove_with_replies(&mut self, ids: &HashSet<PostId>) -> usize {
        let before = self.posts.len();
        self.posts.retain(|item_id, post| {
            !ids.contains(item_id) && !post.reply_to.is_some_and(|parent| ids.contains(&parent))
        });
        before - self.posts.len()
    }
}

fn newest_first(a: &ShoutPost, b: &ShoutPost) -> std::cmp::Ordering {
    b.created_date
        .cmp(&a.created_date)
        .then(b.item_id.cmp(&a.item_id))
}

fn oldest_first(a: &ShoutPost, b: &ShoutPost) -> std::cmp::Ordering {
    a.created_date
        .cmp(&b.created_date)
        .then(a.item_id.cmp(&b.item_id))
}

/// Process-local post storage.
#[derive(Debug, Clone, Default)]
pub struct InMemoryShoutPostRepository {
    table: Arc<RwLock<PostTable>>,
}

impl InMemoryShoutPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ShoutPostRepository for InMemoryShoutPostRepository {
    async fn get_posts(&self, module_id: ModuleId) -> Vec<ShoutPost> {
        let table = self.table.read().await;
        let mut posts: Vec<ShoutPost> = table.module_posts(module_id).cloned().collect();
        posts.sort_by(newest_first);
        posts
    }

    async fn get_post(&self, item_id: PostId) -> Option<ShoutPost> {
        self.table.read().await.posts.get(&item_id).cloned()
    }

    #[instrument(skip(self))]
    async fn get_display_posts(&self, module_id: ModuleId, limit: usize) -> Vec<ShoutPostView> {
        let table = self.table.read().await;

        let mut top_level: Vec<&ShoutPost> = table
            .module_posts(module_id)
            .filter(|post| !post.is_reply())
            .collect();
        top_level.sort_by(|a, b| newest_first(a, b));
        top_level.truncate(limit);

        top_level
            .into_iter()
            .map(|post| {
                let mut replies: Vec<ShoutPost> = table
                    .module_posts(module_id)
                    .filter(|reply| reply.reply_to == Some(post.item_id))
                    .cloned()
                    .collect();
                replies.sort_by(oldest_first);
                ShoutPostView {
                    post: post.clone(),
                    replies,
                }
            })
            .collect()
    }

    async fn vote_up(&self, item_id: PostId) -> Result<i64, RepositoryError> {
        self.table
            .write()
            .await
            .vote(item_id, |post| &mut post.vote_up)
    }

    async fn vote_down(&self, item_id: PostId) -> Result<i64, RepositoryError> {
        self.table
            .write()
            .await
            .vote(item_id, |post| &mut post.vote_down)
    }

    async fn add_post(&self, post: NewShoutPost) -> PostId {
        let mut table = self.table.write().await;
        let item_id = table.next_id;
        table.next_id += 1;
        table.posts.insert(item_id, post.into_post(item_id));
        debug!("Stored post {}", item_id);
        item_id
    }

    async fn delete_item(&self, item_id: PostId) -> usize {
        let mut table = self.table.write().await;
        table.remove_with_replies(&HashSet::from([item_id]))
    }

    async fn count_old_shouts(
        &self,
        module_id: ModuleId,
        age_days: i64,
        now: DateTime<Utc>,
    ) -> usize {
        let table = self.table.read().await;
        table
            .module_posts(module_id)
            .filter(|post| (now - post.created_date).num_days() >= age_days)
            .count()
    }

    #[instrument(skip(self))]
    async fn delete_old_shouts(
        &self,
        module_id: ModuleId,
        age_days: i64,
        now: DateTime<Utc>,
    ) -> usize {
        let mut table = self.table.write().await;
        let expired: HashSet<PostId> = table
            .module_posts(module_id)
            .filter(|post| (now - post.created_date).num_days() >= age_days)
            .map(|post| post.item_id)
            .collect();
        table.remove_with_replies(&expired)
    }
}
