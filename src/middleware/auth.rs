//! API key authentication middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract the API key from the Authorization header
//! 2. Validate it against active keys (recording its use)
//! 3. Inject authentication context into the request
//! 4. Reject unauthorized requests with HTTP 401

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, services::auth_service, state::AppState};

/// Authentication context attached to authenticated requests.
///
/// Inserted into the request's extension map; handlers extract it with
/// `Extension<AuthContext>`.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// ID of the authenticated API key
    pub api_key_id: i64,

    /// Label of the authenticated API key
    pub api_key_name: String,
}

/// Extract the token from an `Authorization: Bearer <key>` header.
///
/// The scheme is matched case-insensitively; an empty token is treated as
/// missing.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// API key authentication middleware function.
///
/// # Flow
///
/// 1. Extract `Authorization: Bearer <key>` header from request
/// 2. Authenticate the key (hash lookup among active keys, stamp `last_used_at`)
/// 3. If found: inject `AuthContext` into request, call next handler
/// 4. If not found: return 401 Unauthorized error
///
/// Missing, unknown and revoked keys all produce the same 401 response.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = bearer_token(request.headers()) else {
        tracing::debug!("Rejected request without bearer token");
        return Err(AppError::Unauthenticated);
    };

    let api_key = match auth_service::authenticate(state.store(), token).await {
        Ok(api_key) => api_key,
        Err(AppError::Unauthenticated) => {
            tracing::debug!("Rejected request with unknown or inactive API key");
            return Err(AppError::Unauthenticated);
        }
        Err(err) => return Err(err),
    };

    // Route handlers can now extract this using Extension<AuthContext>
    request.extensions_mut().insert(AuthContext {
        api_key_id: api_key.id,
        api_key_name: api_key.name,
    });

    Ok(next.run(request).await)
}
