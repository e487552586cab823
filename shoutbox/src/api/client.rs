//! Resolves who is calling: the client address used by flood control and the
//! optional bearer-token user.

use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
    Extension,
};
use tracing::{debug, warn};

use crate::api::error::AppError;
use crate::app_state::SharedAppState;

const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: i64,
    pub name: String,
    pub editor: bool,
}

/// Added to the request extensions by [`identify`].
#[derive(Clone, Debug)]
pub struct ClientContext {
    pub address: String,
    pub user: Option<CurrentUser>,
}

impl ClientContext {
    /// Editors bypass flood control.
    pub fn is_elevated(&self) -> bool {
        self.user.as_ref().is_some_and(|user| user.editor)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// The address flood control keys on.
///
/// Forwarded headers (first entry of `X-Forwarded-For`, then `X-Real-IP`)
/// are only honored when the socket peer is a trusted proxy; otherwise
/// the peer address is used as is.
pub fn client_address(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    is_trusted_proxy: impl Fn(IpAddr) -> bool,
) -> String {
    let Some(peer) = peer.map(|addr| addr.ip().to_canonical()) else {
        return UNKNOWN_CLIENT.to_string();
    };
    if !is_trusted_proxy(peer) {
        return peer.to_string();
    }

    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .map(str::to_string)
        .unwrap_or_else(|| peer.to_string())
}

/// The token of a `Bearer` authorization header. Other schemes are ignored.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
}

pub async fn identify(
    State(state): State<SharedAppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let address = client_address(req.headers(), peer, |ip| {
        state.settings.api.is_trusted_proxy(ip)
    });

    let user = match bearer_token(req.headers()) {
        None => None,
        Some(token) => match state.settings.api.user_for_token(token) {
            Some(user) => Some(CurrentUser {
                user_id: user.user_id,
                name: user.name.clone(),
                editor: user.editor,
            }),
            None => {
                warn!(
                    "Bearer token authentication failed for {} (token starts with: {}...)",
                    address,
                    token.chars().take(4).collect::<String>()
                );
                return Err(AppError::InvalidToken);
            }
        },
    };

    if let Some(user) = &user {
        debug!("User authenticated: {} ({})", user.name, user.user_id);
    }

    req.extensions_mut().insert(ClientContext { address, user });
    Ok(next.run(req).await)
}

/// Only lets editors through. Must run after [`identify`].
pub async fn require_editor(
    Extension(client): Extension<ClientContext>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !client.is_elevated() {
        warn!(
            "Editor permission required for {} {} from {}",
            req.method(),
            req.uri(),
            client.address
        );
        return Err(AppError::EditorRequired);
    }
    Ok(next.run(req).await)
}
