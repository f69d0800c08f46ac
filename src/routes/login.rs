use axum::{extract::State, Json};

use crate::{
    error::{AppError, Result},
    models::{AuthResponse, LoginRequest},
    utils::password,
    AppState,
};

pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let user = state
        .store
        .find_user_by_email(&payload.email)
        .await?
        .ok_or_else(|| AppError::BadRequest("User not found".to_string()))?;

    if !password::verify_password(&payload.password, &user.password_hash)? {
        return Err(AppError::BadRequest("Password is wrong".to_string()));
    }

    let token = state.auth.issue(&user.id, user.is_admin)?;

    Ok(Json(AuthResponse {
        user: user.email,
        token,
    }))
}
