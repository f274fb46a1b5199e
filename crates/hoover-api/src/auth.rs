//! Bearer-token authentication for the message endpoints.

use std::path::Path;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use rand::Rng;

use hoover_core::config::expand_home;
use hoover_core::HooverConfig;

use crate::error::ApiError;
use crate::state::AppState;

/// File under the data directory holding the generated token.
pub const TOKEN_FILE: &str = "api_token";

/// Random 32-character hex token.
pub fn generate_token() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    hex::encode(bytes)
}

/// Read the token stored at `token_path`, or generate one and store it there.
///
/// A token that cannot be persisted is still returned; it just won't survive
/// a restart.
pub fn load_or_generate_token(token_path: &Path) -> String {
    if let Ok(contents) = std::fs::read_to_string(token_path) {
        let token = contents.trim();
        if !token.is_empty() {
            tracing::info!(path = %token_path.display(), "API token loaded");
            return token.to_string();
        }
    }

    let token = generate_token();
    if let Some(parent) = token_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    match std::fs::write(token_path, &token) {
        Ok(()) => {
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let _ =
                    std::fs::set_permissions(token_path, std::fs::Permissions::from_mode(0o600));
            }
            tracing::info!(path = %token_path.display(), "API token generated");
        }
        Err(e) => {
            tracing::warn!(error = %e, path = %token_path.display(), "Failed to save API token");
        }
    }
    token
}

/// Token from configuration (already merged with the environment), else the
/// one persisted in the data directory.
pub fn resolve_token(config: &HooverConfig) -> String {
    match config.api.token.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => token.to_string(),
        _ => load_or_generate_token(&expand_home(&config.general.data_dir).join(TOKEN_FILE)),
    }
}

/// Middleware rejecting requests without `Authorization: Bearer <api_token>`.
pub async fn require_auth(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let header = match req.headers().get("authorization") {
        Some(value) => value,
        None => return ApiError::Unauthorized("Missing Authorization header".into()).into_response(),
    };

    let Ok(value) = header.to_str() else {
        return ApiError::Unauthorized("Invalid Authorization header encoding".into())
            .into_response();
    };

    match value.strip_prefix("Bearer ") {
        Some(token) if token == state.api_token => next.run(req).await,
        _ => ApiError::Unauthorized("Invalid bearer token".into()).into_response(),
    }
}
