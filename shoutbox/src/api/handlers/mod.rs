pub mod health;
pub mod info;
pub mod portable;
pub mod settings;
pub mod shouts;
pub mod votes;

use shoutbox_core::posts::{PostId, ShoutPost};
use shoutbox_core::ModuleId;

use crate::api::error::AppError;
use crate::app_state::SharedAppState;

/// The post `item_id`, provided it belongs to `module_id`.
pub(crate) async fn find_module_post(
    state: &SharedAppState,
    module_id: ModuleId,
    item_id: PostId,
) -> Result<ShoutPost, AppError> {
    state
        .posts
        .get_post(item_id)
        .await
        .filter(|post| post.module_id == module_id)
        .ok_or(AppError::PostNotFound(item_id))
}
