//! Authentication middleware
//!
//! Tokens are optional on this server: diners order as guests. A request
//! that carries an `Authorization` header must carry a valid token, and the
//! resolved [`CurrentUser`] is stored in the request extensions.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::Role;

use crate::AppError;
use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;

/// Resolve the bearer token, if any, into a [`CurrentUser`]
pub async fn attach_user(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(user) = resolve_user(&state, req.headers())? {
        req.extensions_mut().insert(user);
    }
    Ok(next.run(req).await)
}

/// Validate an optional Authorization header
pub(crate) fn resolve_user(
    state: &ServerState,
    headers: &http::HeaderMap,
) -> Result<Option<CurrentUser>, AppError> {
    let Some(header) = headers.get(http::header::AUTHORIZATION) else {
        return Ok(None);
    };
    let header = header.to_str().map_err(|_| AppError::InvalidToken)?;
    let token = JwtService::bearer(header).ok_or(AppError::InvalidToken)?;
    authenticate(state.jwt_service(), token).map(Some)
}

/// Validate a raw token
pub fn authenticate(jwt: &JwtService, token: &str) -> Result<CurrentUser, AppError> {
    jwt.verify(token).map_err(|e| {
        tracing::warn!(error = %e, "Token rejected");
        AppError::from(e)
    })
}

/// Role guard middleware
///
/// ```ignore
/// Router::new()
///     .route("/", get(handler::list))
///     .layer(middleware::from_fn(require_role("staff", permissions::is_staff)));
/// ```
pub fn require_role(
    label: &'static str,
    allowed: fn(&Role) -> bool,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::Unauthorized)?;

            if !allowed(&user.role) {
                tracing::warn!(
                    user_id = %user.id,
                    role = %user.role,
                    required = label,
                    "Permission denied"
                );
                return Err(AppError::forbidden(format!("{} role required", label)));
            }

            Ok(next.run(req).await)
        })
    }
}
