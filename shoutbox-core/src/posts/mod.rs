//! Shout posts and the repository they are stored in.

mod memory;
mod portable;
mod repository;

pub use memory::InMemoryShoutPostRepository;
pub use portable::{export_module, import_module, ExportedShout, ShoutExport};
pub use repository::{RepositoryError, ShoutPostRepository};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::ModuleId;

pub type PostId = i64;

/// A stored post or reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShoutPost {
    pub item_id: PostId,
    pub module_id: ModuleId,
    pub message: String,
    pub user_id: Option<i64>,
    pub display_name: Option<String>,
    pub created_date: DateTime<Utc>,
    pub vote_up: i64,
    pub vote_down: i64,
    pub reply_to: Option<PostId>,
}

impl ShoutPost {
    pub fn is_reply(&self) -> bool {
        self.reply_to.is_some()
    }
}

/// A post that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShoutPost {
    pub module_id: ModuleId,
    pub message: String,
    pub user_id: Option<i64>,
    pub display_name: Option<String>,
    pub created_date: DateTime<Utc>,
    pub vote_up: i64,
    pub vote_down: i64,
    pub reply_to: Option<PostId>,
}

impl NewShoutPost {
    pub fn new(module_id: ModuleId, message: impl Into<String>, created_date: DateTime<Utc>) -> Self {
        Self {
            module_id,
            message: message.into(),
            user_id: None,
            display_name: None,
            created_date,
            vote_up: 0,
            vote_down: 0,
            reply_to: None,
        }
    }

    pub fn by_user(mut self, user_id: i64, display_name: impl Into<String>) -> Self {
        self.user_id = Some(user_id);
        self.display_name = Some(display_name.into());
        self
    }

    pub fn reply_to(mut self, parent: PostId) -> Self {
        self.reply_to = Some(parent);
        self
    }

    pub(crate) fn into_post(self, item_id: PostId) -> ShoutPost {
        ShoutPost {
            item_id,
            module_id: self.module_id,
            message: self.message,
            user_id: self.user_id,
            display_name: self.display_name,
            created_date: self.created_date,
            vote_up: self.vote_up,
            vote_down: self.vote_down,
            reply_to: self.reply_to,
        }
    }
}

/// A top-level post as shown in the widget, with its replies oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ShoutPostView {
    #[serde(flatten)]
    pub post: ShoutPost,
    pub replies: Vec<ShoutPost>,
}
