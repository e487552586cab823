use axum::{
    debug_handler,
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shoutbox_core::settings::module_settings::ModuleSettings;
use shoutbox_core::ModuleId;
use tracing::info;
use utoipa::ToSchema;

use crate::api::error::AppError;
use crate::app_state::SharedAppState;

/// Shouts at least this many days old count as old.
pub const OLD_SHOUT_AGE_DAYS: i64 = 30;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SettingsData {
    pub settings: ModuleSettings,
    pub old_shouts_count: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SettingsResponse {
    pub success: bool,
    pub data: SettingsData,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurgedData {
    pub deleted: usize,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PurgeResponse {
    pub success: bool,
    pub data: PurgedData,
}

async fn settings_response(state: &SharedAppState, module_id: ModuleId) -> SettingsResponse {
    let settings = state.module_settings.get(module_id).await;
    let old_shouts_count = state
        .posts
        .count_old_shouts(module_id, OLD_SHOUT_AGE_DAYS, state.clock.now())
        .await;

    SettingsResponse {
        success: true,
        data: SettingsData {
            settings,
            old_shouts_count,
        },
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/modules/{module_id}/settings",
    params(("module_id" = i64, Path, description = "Module id")),
    responses(
        (status = 200, description = "Module settings and the number of old shouts", body = SettingsResponse),
        (status = 403, description = "Editor permission required", body = AppError)
    ),
    security(("bearerAuth" = []))
)]
#[debug_handler]
pub async fn get_settings_handler(
    State(state): State<SharedAppState>,
    Path(module_id): Path<ModuleId>,
) -> Json<SettingsResponse> {
    Json(settings_response(&state, module_id).await)
}

#[utoipa::path(
    post,
    path = "/api/v1/modules/{module_id}/settings",
    params(("module_id" = i64, Path, description = "Module id")),
    request_body = ModuleSettings,
    responses(
        (status = 200, description = "Settings saved", body = SettingsResponse),
        (status = 400, description = "Invalid settings", body = AppError),
        (status = 403, description = "Editor permission required", body = AppError)
    ),
    security(("bearerAuth" = []))
)]
#[debug_handler]
pub async fn save_settings_handler(
    State(state): State<SharedAppState>,
    Path(module_id): Path<ModuleId>,
    Json(settings): Json<ModuleSettings>,
) -> Result<Json<SettingsResponse>, AppError> {
    state.module_settings.save(module_id, settings).await?;
    Ok(Json(settings_response(&state, module_id).await))
}

#[utoipa::path(
    delete,
    path = "/api/v1/modules/{module_id}/settings/old-shouts",
    params(("module_id" = i64, Path, description = "Module id")),
    responses(
        (status = 200, description = "Old shouts deleted", body = PurgeResponse),
        (status = 403, description = "Editor permission required", body = AppError)
    ),
    security(("bearerAuth" = []))
)]
#[debug_handler]
pub async fn purge_old_shouts_handler(
    State(state): State<SharedAppState>,
    Path(module_id): Path<ModuleId>,
) -> Json<PurgeResponse> {
    let deleted = state
        .posts
        .delete_old_shouts(module_id, OLD_SHOUT_AGE_DAYS, state.clock.now())
        .await;
    info!("Deleted {} old shout(s) of module {}", deleted, module_id);

    Json(PurgeResponse {
        success: true,
        data: PurgedData { deleted },
    })
}
