use axum::http::StatusCode;
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use shoutbox_core::posts::{PostId, RepositoryError};
use shoutbox_core::settings::module_settings::SettingsValidationError;
use thiserror::Error;

#[derive(Clone, Error, Debug, utoipa::ToResponse, utoipa::ToSchema)]
pub enum AppError {
    #[error("Post not found: {0}")]
    PostNotFound(PostId),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid or unknown bearer token")]
    InvalidToken,

    #[error("Editor permission required")]
    EditorRequired,

    #[error("Anonymous posting is disabled for module {0}")]
    AnonymousPostingDisabled(i64),
}

impl AppError {
    fn get_error_msg(&self) -> (StatusCode, String) {
        let status = match self {
            AppError::PostNotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::EditorRequired => StatusCode::FORBIDDEN,
            AppError::AnonymousPostingDisabled(_) => StatusCode::FORBIDDEN,
        };

        (status, self.to_string())
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::PostNotFound(item_id) => AppError::PostNotFound(item_id),
        }
    }
}

impl From<SettingsValidationError> for AppError {
    fn from(e: SettingsValidationError) -> Self {
        AppError::InvalidInput(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.get_error_msg();
        let body = serde_json::json!({ "error": true, "message": body });
        (status, Json(body)).into_response()
    }
}
