//! Export and import of a module's posts, used to copy a shoutbox between modules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::{NewShoutPost, PostId, ShoutPostRepository};
use crate::ModuleId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExportedShout {
    pub item_id: PostId,
    pub message: String,
    pub user_id: Option<i64>,
    pub display_name: Option<String>,
    pub created_date: DateTime<Utc>,
    pub vote_up: i64,
    pub vote_down: i64,
    pub reply_to: Option<PostId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShoutExport {
    pub shouts: Vec<ExportedShout>,
}

/// All posts of a module ordered by item id, so parents precede their replies.
pub async fn export_module(repo: &dyn ShoutPostRepository, module_id: ModuleId) -> ShoutExport {
    let mut posts = repo.get_posts(module_id).await;
    posts.sort_by_key(|post| post.item_id);

    ShoutExport {
        shouts: posts
            .into_iter()
            .map(|post| ExportedShout {
                item_id: post.item_id,
                message: post.message,
                user_id: post.user_id,
                display_name: post.display_name,
                created_date: post.created_date,
                vote_up: post.vote_up,
                vote_down: post.vote_down,
                reply_to: post.reply_to,
            })
            .collect(),
    }
}

/// Store exported posts under `module_id`, returning how many were imported.
///
/// Posts get fresh ids. Replies are pointed at the new id of their parent;
/// a reply whose parent was not imported before it is skipped.
pub async fn import_module(
    repo: &dyn ShoutPostRepository,
    module_id: ModuleId,
    export: ShoutExport,
) -> usize {
    let mut mapping: HashMap<PostId, PostId> = HashMap::new();

    for shout in export.shouts {
        let reply_to = match shout.reply_to {
            None => None,
            Some(parent) => match mapping.get(&parent) {
                Some(new_parent) => Some(*new_parent),
                None => {
                    warn!(
                        "Skipping imported item {}: parent {} was not imported",
                        shout.item_id, parent
                    );
                    continue;
                }
            },
        };

        let new_id = repo
            .add_post(NewShoutPost {
                module_id,
                message: shout.message,
                user_id: shout.user_id,
                display_name: shout.display_name,
                created_date: shout.created_date,
                vote_up: shout.vote_up,
                vote_down: shout.vote_down,
                reply_to,
            })
            .await;
        debug!("Imported item {} as {}", shout.item_id, new_id);
        mapping.insert(shout.item_id, new_id);
    }

    mapping.len()
}
