use axum::{
    debug_handler,
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use shoutbox_core::posts::{NewShoutPost, PostId, ShoutPostView};
use shoutbox_core::settings::module_settings::ProfileImage;
use shoutbox_core::ModuleId;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use super::find_module_post;
use crate::api::client::ClientContext;
use crate::api::error::AppError;
use crate::app_state::SharedAppState;

pub const PROFANITY_MESSAGE: &str = "Your message contains words that are not allowed.";
pub const FLOOD_NEW_POST_MESSAGE: &str =
    "You have posted recently. Please wait a moment before posting again.";
pub const FLOOD_REPLY_MESSAGE: &str =
    "You have replied to this post recently. Please wait a moment before replying again.";

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewPostRequest {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShoutListData {
    pub posts: Vec<ShoutPostView>,
    pub allow_edit: bool,
    pub allow_input: bool,
    pub profile_image: ProfileImage,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShoutListResponse {
    pub success: bool,
    pub data: ShoutListData,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PostsData {
    pub posts: Vec<ShoutPostView>,
}

/// Outcome of a post or reply. `message` is empty on success.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    pub success: bool,
    pub message: String,
    pub data: PostsData,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletedData {
    pub deleted: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
    pub data: DeletedData,
}

#[utoipa::path(
    get,
    path = "/api/v1/modules/{module_id}/shouts",
    params(("module_id" = i64, Path, description = "Module id")),
    responses(
        (status = 200, description = "Newest posts of the module with their replies", body = ShoutListResponse)
    )
)]
#[debug_handler]
pub async fn list_shouts_handler(
    State(state): State<SharedAppState>,
    Path(module_id): Path<ModuleId>,
    Extension(client): Extension<ClientContext>,
) -> Json<ShoutListResponse> {
    let settings = state.module_settings.get(module_id).await;
    let posts = state
        .posts
        .get_display_posts(module_id, settings.number_of_posts_to_return)
        .await;

    debug!("Sending {} posts of module {}", posts.len(), module_id);

    Json(ShoutListResponse {
        success: true,
        data: ShoutListData {
            posts,
            allow_edit: client.is_elevated(),
            allow_input: settings.allow_anonymous || client.is_authenticated(),
            profile_image: settings.profile_image,
        },
    })
}

#[utoipa::path(
    post,
    path = "/api/v1/modules/{module_id}/shouts",
    params(("module_id" = i64, Path, description = "Module id")),
    request_body = NewPostRequest,
    responses(
        (status = 200, description = "Post stored, or refused with a message", body = PostResponse),
        (status = 400, description = "Empty message", body = AppError),
        (status = 403, description = "Anonymous posting is disabled", body = AppError)
    )
)]
#[debug_handler]
pub async fn new_post_handler(
    State(state): State<SharedAppState>,
    Path(module_id): Path<ModuleId>,
    Extension(client): Extension<ClientContext>,
    Json(payload): Json<NewPostRequest>,
) -> Result<Json<PostResponse>, AppError> {
    submit(&state, module_id, &client, payload.message, None).await
}

#[utoipa::path(
    post,
    path = "/api/v1/modules/{module_id}/shouts/{item_id}/replies",
    params(
        ("module_id" = i64, Path, description = "Module id"),
        ("item_id" = i64, Path, description = "Post to reply to")
    ),
    request_body = NewPostRequest,
    responses(
        (status = 200, description = "Reply stored, or refused with a message", body = PostResponse),
        (status = 403, description = "Anonymous posting is disabled", body = AppError),
        (status = 404, description = "Post not found", body = AppError)
    )
)]
#[debug_handler]
pub async fn reply_handler(
    State(state): State<SharedAppState>,
    Path((module_id, item_id)): Path<(ModuleId, PostId)>,
    Extension(client): Extension<ClientContext>,
    Json(payload): Json<NewPostRequest>,
) -> Result<Json<PostResponse>, AppError> {
    find_module_post(&state, module_id, item_id).await?;
    submit(&state, module_id, &client, payload.message, Some(item_id)).await
}

/// Profanity check, then flood control, then persistence.
///
/// A message rejected for profanity never reaches flood control, so it does
/// not use up the client's slot.
async fn submit(
    state: &SharedAppState,
    module_id: ModuleId,
    client: &ClientContext,
    message: String,
    reply_to: Option<PostId>,
) -> Result<Json<PostResponse>, AppError> {
    if message.trim().is_empty() {
        return Err(AppError::InvalidInput("message must not be empty".to_string()));
    }

    let settings = state.module_settings.get(module_id).await;
    if !settings.allow_anonymous && !client.is_authenticated() {
        warn!(
            "Refusing anonymous post from {} in module {}",
            client.address, module_id
        );
        return Err(AppError::AnonymousPostingDisabled(module_id));
    }

    let outcome = if !state.classifier.is_acceptable(&message) {
        warn!(
            "The post was not saved due to profanity. The IP: {}",
            client.address
        );
        Err(PROFANITY_MESSAGE)
    } else {
        let limiter = state.flood_control.limiter_for(
            module_id,
            &client.address,
            client.is_elevated(),
            settings.throttle_policy(),
        );
        let permitted = match reply_to {
            Some(parent) => limiter.allow_reply(parent),
            None => limiter.allow_new_post(),
        };

        if permitted {
            let mut post = NewShoutPost::new(module_id, message, state.clock.now());
            if let Some(user) = &client.user {
                post = post.by_user(user.user_id, user.name.clone());
            }
            if let Some(parent) = reply_to {
                post = post.reply_to(parent);
            }
            let item_id = state.posts.add_post(post).await;
            info!("Saved post {} in module {}", item_id, module_id);
            Ok(())
        } else {
            warn!(
                "Flood control blocked the post. The IP: {} has already posted in the time limit window",
                client.address
            );
            Err(match reply_to {
                Some(_) => FLOOD_REPLY_MESSAGE,
                None => FLOOD_NEW_POST_MESSAGE,
            })
        }
    };

    let posts = state
        .posts
        .get_display_posts(module_id, settings.number_of_posts_to_return)
        .await;

    Ok(Json(PostResponse {
        success: outcome.is_ok(),
        message: outcome.err().unwrap_or_default().to_string(),
        data: PostsData { posts },
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/modules/{module_id}/shouts/{item_id}",
    params(
        ("module_id" = i64, Path, description = "Module id"),
        ("item_id" = i64, Path, description = "Post to delete together with its replies")
    ),
    responses(
        (status = 200, description = "Post deleted", body = DeleteResponse),
        (status = 403, description = "Editor permission required", body = AppError),
        (status = 404, description = "Post not found", body = AppError)
    ),
    security(("bearerAuth" = []))
)]
#[debug_handler]
pub async fn delete_shout_handler(
    State(state): State<SharedAppState>,
    Path((module_id, item_id)): Path<(ModuleId, PostId)>,
) -> Result<Json<DeleteResponse>, AppError> {
    find_module_post(&state, module_id, item_id).await?;
    let deleted = state.posts.delete_item(item_id).await;
    info!("Item {} deleted with {} post(s)", item_id, deleted);

    Ok(Json(DeleteResponse {
        success: true,
        data: DeletedData { deleted },
    }))
}
