use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use shoutbox_core::flood_control::ActionKind;
use shoutbox_core::posts::{ExportedShout, ShoutExport, ShoutPost, ShoutPostView};
use shoutbox_core::settings::module_settings::{ModuleSettings, ProfileImage};

use utoipa::openapi::security::SecurityScheme;
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;
use utoipa_redoc::{Redoc, Servable};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::client::{identify, require_editor};
use crate::api::error::AppError;
use crate::api::handlers::health::{__path_health_checker_handler, health_checker_handler};
use crate::api::handlers::info::{ServerInfo, __path_info_handler, info_handler};
use crate::api::handlers::portable::{
    export_handler, import_handler, ImportResponse, ImportedData, __path_export_handler,
    __path_import_handler,
};
use crate::api::handlers::settings::{
    get_settings_handler, purge_old_shouts_handler, save_settings_handler, PurgeResponse,
    PurgedData, SettingsData, SettingsResponse, __path_get_settings_handler,
    __path_purge_old_shouts_handler, __path_save_settings_handler,
};
use crate::api::handlers::shouts::{
    delete_shout_handler, list_shouts_handler, new_post_handler, reply_handler, DeleteResponse,
    DeletedData, NewPostRequest, PostResponse, PostsData, ShoutListData, ShoutListResponse,
    __path_delete_shout_handler, __path_list_shouts_handler, __path_new_post_handler,
    __path_reply_handler,
};
use crate::api::handlers::votes::{
    vote_down_handler, vote_up_handler, VoteCount, VoteResponse, __path_vote_down_handler,
    __path_vote_up_handler,
};
use crate::api::rate_limiting::{
    create_public_read_limiter, create_public_write_limiter, RateLimitLoggingLayer,
};
use crate::app_state::SharedAppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        health_checker_handler,
        info_handler,
        list_shouts_handler,
        new_post_handler,
        reply_handler,
        vote_up_handler,
        vote_down_handler,
        delete_shout_handler,
        get_settings_handler,
        save_settings_handler,
        purge_old_shouts_handler,
        export_handler,
        import_handler,
    ),
    components(
        schemas(
            AppError, ServerInfo, ShoutPost, ShoutPostView, NewPostRequest,
            ShoutListData, ShoutListResponse, PostsData, PostResponse,
            DeletedData, DeleteResponse, VoteCount, VoteResponse,
            ModuleSettings, ProfileImage, SettingsData, SettingsResponse,
            PurgedData, PurgeResponse, ShoutExport, ExportedShout,
            ImportedData, ImportResponse, ActionKind
        )
    ),
    tags(
        (name = "shoutbox-service", description = "shoutbox api")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        )
    }
}

pub struct ApiRoutes;

impl ApiRoutes {
    pub fn create(state: SharedAppState) -> anyhow::Result<Router> {
        let api = ApiDoc::openapi();
        let rate_limiting = &state.settings.api.rate_limiting;

        let mut read_router =
            Router::new().route("/api/v1/modules/{module_id}/shouts", get(list_shouts_handler));

        let mut write_router = Router::new()
            .route("/api/v1/modules/{module_id}/shouts", post(new_post_handler))
            .route(
                "/api/v1/modules/{module_id}/shouts/{item_id}/replies",
                post(reply_handler),
            )
            .route(
                "/api/v1/modules/{module_id}/shouts/{item_id}/vote-up",
                post(vote_up_handler),
            )
            .route(
                "/api/v1/modules/{module_id}/shouts/{item_id}/vote-down",
                post(vote_down_handler),
            );

        if rate_limiting.enabled {
            if rate_limiting.public_read.is_enabled() {
                read_router = read_router
                    .layer(create_public_read_limiter(&rate_limiting.public_read)?)
                    .layer(RateLimitLoggingLayer::new("public_read"));
            }
            if rate_limiting.public_write.is_enabled() {
                write_router = write_router
                    .layer(create_public_write_limiter(&rate_limiting.public_write)?)
                    .layer(RateLimitLoggingLayer::new("public_write"));
            }
        }

        let editor_router = Router::new()
            .route(
                "/api/v1/modules/{module_id}/shouts/{item_id}",
                delete(delete_shout_handler),
            )
            .route(
                "/api/v1/modules/{module_id}/settings",
                get(get_settings_handler).post(save_settings_handler),
            )
            .route(
                "/api/v1/modules/{module_id}/settings/old-shouts",
                delete(purge_old_shouts_handler),
            )
            .route("/api/v1/modules/{module_id}/export", get(export_handler))
            .route("/api/v1/modules/{module_id}/import", post(import_handler))
            .route_layer(middleware::from_fn(require_editor));

        let module_router = Router::new()
            .merge(read_router)
            .merge(write_router)
            .merge(editor_router)
            .layer(DefaultBodyLimit::max(state.settings.api.max_body_size))
            .route_layer(middleware::from_fn_with_state(state.clone(), identify));

        let public_router = Router::new()
            .route("/api/v1/health", get(health_checker_handler))
            .route("/api/v1/info", get(info_handler))
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
            .merge(Redoc::with_url("/redoc", api.clone()))
            .merge(RapiDoc::new("/api-docs/openapi.json").path("/rapidoc"));

        let router = Router::new()
            .merge(module_router)
            .merge(public_router)
            .with_state(state.clone());

        Ok(router)
    }
}
