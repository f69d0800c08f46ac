use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, Result},
    middleware::require_admin,
    models::{RegisterRequest, UpdateUserRequest, User, UserResponse},
    store,
    utils::{jwt::Claims, password},
    AppState,
};

pub async fn get_all_users(State(state): State<AppState>) -> Result<Json<Vec<UserResponse>>> {
    let users = state.store.list_users().await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>> {
    if !store::is_valid_id(&id) {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let user = state
        .store
        .find_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(user.into()))
}

pub async fn register_user(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<UserResponse>> {
    validate_registration(&payload)?;

    if state
        .store
        .find_user_by_email(&payload.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = password::hash_password(&payload.password)?;
    let user = User::new(payload, password_hash);

    let created = state.store.insert_user(user).await?;

    Ok(Json(created.into()))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>> {
    if !store::is_valid_id(&id) {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    validate_update(&payload)?;

    let mut user = state
        .store
        .find_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if let Some(ref new_email) = payload.email {
        if *new_email != user.email
            && state.store.find_user_by_email(new_email).await?.is_some()
        {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }
    }

    // Re-hash only when the caller supplied a new password; otherwise the
    // stored hash must stay exactly as it is.
    let new_password_hash = match payload.password {
        Some(ref new_password) => Some(password::hash_password(new_password)?),
        None => None,
    };

    user.apply_update(payload, new_password_hash);

    let updated = state
        .store
        .replace_user(user)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(updated.into()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    require_admin(&claims)?;

    if !store::is_valid_id(&id) {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    if !state.store.delete_user(&id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": "The user is deleted",
    })))
}

fn validate_registration(payload: &RegisterRequest) -> Result<()> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name cannot be empty".to_string()));
    }

    if payload.email.is_empty() || !payload.email.contains('@') {
        return Err(AppError::BadRequest("Invalid email address".to_string()));
    }

    if payload.password.is_empty() {
        return Err(AppError::BadRequest("Password is required".to_string()));
    }

    Ok(())
}

fn validate_update(payload: &UpdateUserRequest) -> Result<()> {
    if let Some(ref name) = payload.name {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("Name cannot be empty".to_string()));
        }
    }

    if let Some(ref email) = payload.email {
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::BadRequest("Invalid email address".to_string()));
        }
    }

    if let Some(ref new_password) = payload.password {
        if new_password.is_empty() {
            return Err(AppError::BadRequest("Password is required".to_string()));
        }
    }

    Ok(())
}
