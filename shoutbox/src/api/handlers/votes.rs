use axum::{
    debug_handler,
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use shoutbox_core::posts::PostId;
use shoutbox_core::ModuleId;
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::find_module_post;
use crate::api::client::ClientContext;
use crate::api::error::AppError;
use crate::app_state::SharedAppState;

pub const FLOOD_VOTE_MESSAGE: &str = "You have already voted on this post recently.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VoteDirection {
    Up,
    Down,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct VoteCount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_up: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vote_down: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VoteResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<VoteCount>,
}

#[utoipa::path(
    post,
    path = "/api/v1/modules/{module_id}/shouts/{item_id}/vote-up",
    params(
        ("module_id" = i64, Path, description = "Module id"),
        ("item_id" = i64, Path, description = "Post to vote on")
    ),
    responses(
        (status = 200, description = "New up vote count, or success false when blocked by flood control", body = VoteResponse),
        (status = 404, description = "Post not found", body = AppError)
    )
)]
#[debug_handler]
pub async fn vote_up_handler(
    State(state): State<SharedAppState>,
    Path((module_id, item_id)): Path<(ModuleId, PostId)>,
    Extension(client): Extension<ClientContext>,
) -> Result<Json<VoteResponse>, AppError> {
    vote(&state, module_id, item_id, &client, VoteDirection::Up).await
}

#[utoipa::path(
    post,
    path = "/api/v1/modules/{module_id}/shouts/{item_id}/vote-down",
    params(
        ("module_id" = i64, Path, description = "Module id"),
        ("item_id" = i64, Path, description = "Post to vote on")
    ),
    responses(
        (status = 200, description = "New down vote count, or success false when blocked by flood control", body = VoteResponse),
        (status = 404, description = "Post not found", body = AppError)
    )
)]
#[debug_handler]
pub async fn vote_down_handler(
    State(state): State<SharedAppState>,
    Path((module_id, item_id)): Path<(ModuleId, PostId)>,
    Extension(client): Extension<ClientContext>,
) -> Result<Json<VoteResponse>, AppError> {
    vote(&state, module_id, item_id, &client, VoteDirection::Down).await
}

async fn vote(
    state: &SharedAppState,
    module_id: ModuleId,
    item_id: PostId,
    client: &ClientContext,
    direction: VoteDirection,
) -> Result<Json<VoteResponse>, AppError> {
    find_module_post(state, module_id, item_id).await?;

    let settings = state.module_settings.get(module_id).await;
    let limiter = state.flood_control.limiter_for(
        module_id,
        &client.address,
        client.is_elevated(),
        settings.throttle_policy(),
    );

    if !limiter.allow_vote(item_id) {
        warn!(
            "Flood control blocked the vote. The IP: {} has already voted on item {} in the time limit window",
            client.address, item_id
        );
        return Ok(Json(VoteResponse {
            success: false,
            message: Some(FLOOD_VOTE_MESSAGE.to_string()),
            data: None,
        }));
    }

    let counted = match direction {
        VoteDirection::Up => state.posts.vote_up(item_id).await,
        VoteDirection::Down => state.posts.vote_down(item_id).await,
    };
    // The post can vanish between the lookup and the vote.
    let count = counted.inspect_err(|_| limiter.release_vote(item_id))?;
    let data = match direction {
        VoteDirection::Up => VoteCount {
            vote_up: Some(count),
            ..Default::default()
        },
        VoteDirection::Down => VoteCount {
            vote_down: Some(count),
            ..Default::default()
        },
    };
    debug!(
        "Vote {:?} recorded, IP: {}, item: {}",
        direction, client.address, item_id
    );

    Ok(Json(VoteResponse {
        success: true,
        message: None,
        data: Some(data),
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::http::{HeaderName, HeaderValue, StatusCode};
    use chrono::{DateTime, Utc};
    use shoutbox_core::flood_control::Clock;
    use shoutbox_core::posts::{
        InMemoryShoutPostRepository, NewShoutPost, RepositoryError, ShoutPost,
        ShoutPostRepository, ShoutPostView,
    };
    use shoutbox_core::ModuleId;

    use super::*;
    use crate::api::test_utils::{create_test_app_state, create_test_server, load_test_settings};

    /// Loses the post right before the first vote lands.
    #[derive(Debug, Default)]
    struct VanishingPosts {
        inner: InMemoryShoutPostRepository,
        vanished: AtomicBool,
    }

    impl VanishingPosts {
        fn vanish_once(&self, item_id: PostId) -> Result<(), RepositoryError> {
            if self.vanished.swap(true, Ordering::SeqCst) {
                Ok(())
            } else {
                Err(RepositoryError::PostNotFound(item_id))
            }
        }
    }

    #[async_trait]
    impl ShoutPostRepository for VanishingPosts {
        async fn get_posts(&self, module_id: ModuleId) -> Vec<ShoutPost> {
            self.inner.get_posts(module_id).await
        }

        async fn get_post(&self, item_id: PostId) -> Option<ShoutPost> {
            self.inner.get_post(item_id).await
        }

        async fn get_display_posts(&self, module_id: ModuleId, limit: usize) -> Vec<ShoutPostView> {
            self.inner.get_display_posts(module_id, limit).await
        }

        async fn vote_up(&self, item_id: PostId) -> Result<i64, RepositoryError> {
            self.vanish_once(item_id)?;
            self.inner.vote_up(item_id).await
        }

        async fn vote_down(&self, item_id: PostId) -> Result<i64, RepositoryError> {
            self.vanish_once(item_id)?;
            self.inner.vote_down(item_id).await
        }

        async fn add_post(&self, post: NewShoutPost) -> PostId {
            self.inner.add_post(post).await
        }

        async fn delete_item(&self, item_id: PostId) -> usize {
            self.inner.delete_item(item_id).await
        }

        async fn count_old_shouts(
            &self,
            module_id: ModuleId,
            age_days: i64,
            now: DateTime<Utc>,
        ) -> usize {
            self.inner.count_old_shouts(module_id, age_days, now).await
        }

        async fn delete_old_shouts(
            &self,
            module_id: ModuleId,
            age_days: i64,
            now: DateTime<Utc>,
        ) -> usize {
            self.inner.delete_old_shouts(module_id, age_days, now).await
        }
    }

    #[tokio::test]
    async fn test_failed_vote_does_not_use_the_cooldown() {
        let (state, _clock) = create_test_app_state(load_test_settings(&[]));
        let mut state = Arc::try_unwrap(state).unwrap();
        let posts = Arc::new(VanishingPosts::default());
        let item_id = posts
            .add_post(NewShoutPost::new(1, "vote me", state.clock.now()))
            .await;
        state.posts = posts;
        let server = create_test_server(Arc::new(state));

        let vote_up = || {
            server
                .post(&format!("/api/v1/modules/1/shouts/{item_id}/vote-up"))
                .add_header(
                    HeaderName::from_static("x-forwarded-for"),
                    HeaderValue::from_static("203.0.113.10"),
                )
        };

        let response = vote_up().await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

        let body = vote_up().await.json::<VoteResponse>();
        assert!(body.success);
        assert_eq!(body.data.and_then(|count| count.vote_up), Some(1));

        let body = vote_up().await.json::<VoteResponse>();
        assert!(!body.success);
        assert_eq!(body.message.as_deref(), Some(FLOOD_VOTE_MESSAGE));
    }
}
