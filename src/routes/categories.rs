use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, Result},
    models::{Category, CreateCategoryRequest, UpdateCategoryRequest},
    store,
    AppState,
};

pub async fn get_all_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = state.store.list_categories().await?;

    Ok(Json(categories))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Category>> {
    if !store::is_valid_id(&id) {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    let category = state
        .store
        .find_category(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    Ok(Json(category))
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<Json<Category>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Category name is required".to_string()));
    }

    let category = Category {
        id: String::new(),
        name: payload.name,
        icon: payload.icon.unwrap_or_default(),
        color: payload.color.unwrap_or_default(),
    };

    let created = state.store.insert_category(category).await?;

    Ok(Json(created))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<Category>> {
    if !store::is_valid_id(&id) {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    if let Some(ref name) = payload.name {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("Category name is required".to_string()));
        }
    }

    let mut category = state
        .store
        .find_category(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    category.apply_update(payload);

    let updated = state
        .store
        .replace_category(category)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    Ok(Json(updated))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    if !store::is_valid_id(&id) {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    if state.store.any_product_in_category(&id).await? {
        return Err(AppError::BadRequest(
            "Category is referenced by existing products".to_string(),
        ));
    }

    if !state.store.delete_category(&id).await? {
        return Err(AppError::NotFound("Category not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": "The category is deleted",
    })))
}
