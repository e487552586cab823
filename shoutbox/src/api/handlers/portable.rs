use axum::{
    debug_handler,
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shoutbox_core::posts::{export_module, import_module, ShoutExport};
use shoutbox_core::ModuleId;
use tracing::info;
use utoipa::ToSchema;

use crate::api::error::AppError;
use crate::app_state::SharedAppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImportedData {
    pub imported: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImportResponse {
    pub success: bool,
    pub data: ImportedData,
}

#[utoipa::path(
    get,
    path = "/api/v1/modules/{module_id}/export",
    params(("module_id" = i64, Path, description = "Module id")),
    responses(
        (status = 200, description = "All posts of the module", body = ShoutExport),
        (status = 403, description = "Editor permission required", body = AppError)
    ),
    security(("bearerAuth" = []))
)]
#[debug_handler]
pub async fn export_handler(
    State(state): State<SharedAppState>,
    Path(module_id): Path<ModuleId>,
) -> Json<ShoutExport> {
    Json(export_module(state.posts.as_ref(), module_id).await)
}

#[utoipa::path(
    post,
    path = "/api/v1/modules/{module_id}/import",
    params(("module_id" = i64, Path, description = "Module id")),
    request_body = ShoutExport,
    responses(
        (status = 200, description = "Number of imported posts", body = ImportResponse),
        (status = 403, description = "Editor permission required", body = AppError)
    ),
    security(("bearerAuth" = []))
)]
#[debug_handler]
pub async fn import_handler(
    State(state): State<SharedAppState>,
    Path(module_id): Path<ModuleId>,
    Json(export): Json<ShoutExport>,
) -> Json<ImportResponse> {
    let imported = import_module(state.posts.as_ref(), module_id, export).await;
    info!("Imported {} post(s) into module {}", imported, module_id);

    Json(ImportResponse {
        success: true,
        data: ImportedData { imported },
    })
}
