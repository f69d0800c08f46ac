use axum::{
    extract::{Request, State},
    http::Method,
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, utils::jwt::Claims, AppState};

/// Routes reachable without a token, relative to the API prefix.
const PUBLIC_ROUTES: [(Method, &str); 2] = [
    (Method::POST, "/users"),
    (Method::POST, "/users/login"),
];

fn is_public(method: &Method, path: &str) -> bool {
    PUBLIC_ROUTES
        .iter()
        .any(|(m, p)| m == method && *p == path)
}

/// Authorization gate applied to every API route. Allowlisted routes pass
/// through unauthenticated; everything else needs a Bearer token that is
/// well-formed, correctly signed and unexpired. The admin flag plays no
/// part here; admin-only operations check it explicitly via
/// [`require_admin`].
pub async fn auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if is_public(req.method(), req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid token format".to_string()))?;

    let claims = state.auth.verify(token)?;

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

pub fn require_admin(claims: &Claims) -> Result<(), AppError> {
    if !claims.is_admin {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    Ok(())
}
