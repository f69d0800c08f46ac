use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use crate::{
    error::{AppError, Result},
    models::{
        Category, CreateProductRequest, Product, ProductListQuery, ProductResponse,
        UpdateProductRequest, MAX_COUNT_IN_STOCK,
    },
    store::{self, ProductFilter},
    AppState,
};

pub async fn get_all_products(
    State(state): State<AppState>,
    Query(params): Query<ProductListQuery>,
) -> Result<Json<Vec<ProductResponse>>> {
    let categories = params
        .categories
        .filter(|raw| !raw.is_empty())
        .map(|raw| {
            raw.split(',')
                .map(|s| s.trim().to_string())
                .collect::<HashSet<String>>()
        });

    let filter = ProductFilter {
        categories,
        ..Default::default()
    };

    let products = state.store.list_products(filter).await?;
    let response = populate_categories(&state, products).await?;

    Ok(Json(response))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>> {
    if !store::is_valid_id(&id) {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    let product = state
        .store
        .find_product(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let category = state.store.find_category(&product.category).await?;

    Ok(Json(ProductResponse::new(product, category)))
}

pub async fn get_product_count(State(state): State<AppState>) -> Result<Json<Value>> {
    let count = state.store.count_products().await?;

    Ok(Json(json!({ "count": count })))
}

pub async fn get_featured_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>> {
    featured(state, 0).await
}

pub async fn get_featured_products_limited(
    State(state): State<AppState>,
    Path(limit): Path<u64>,
) -> Result<Json<Vec<Product>>> {
    featured(state, limit).await
}

async fn featured(state: AppState, limit: u64) -> Result<Json<Vec<Product>>> {
    let filter = ProductFilter {
        featured: Some(true),
        // A zero limit means no cap.
        limit: (limit > 0).then_some(limit),
        ..Default::default()
    };

    let products = state.store.list_products(filter).await?;

    Ok(Json(products))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<Json<Product>> {
    validate_create(&payload)?;
    resolve_category(&state, &payload.category).await?;

    let product = Product {
        id: String::new(),
        name: payload.name,
        description: payload.description,
        rich_description: payload.rich_description,
        image: payload.image,
        images: payload.images,
        brand: payload.brand,
        price: payload.price,
        category: payload.category,
        count_in_stock: payload.count_in_stock,
        rating: payload.rating,
        num_of_reviews: payload.num_of_reviews,
        is_featured: payload.is_featured,
        date_created: chrono::Utc::now(),
    };

    let created = state.store.insert_product(product).await?;

    Ok(Json(created))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<Json<Product>> {
    if !store::is_valid_id(&id) {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    validate_update(&payload)?;

    if let Some(ref category) = payload.category {
        resolve_category(&state, category).await?;
    }

    let mut product = state
        .store
        .find_product(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    product.apply_update(payload);

    let updated = state
        .store
        .replace_product(product)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    Ok(Json(updated))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    if !store::is_valid_id(&id) {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    if !state.store.delete_product(&id).await? {
        return Err(AppError::NotFound("Product not found".to_string()));
    }

    Ok(Json(json!({
        "success": true,
        "message": "The product is deleted",
    })))
}

/// Resolve the category reference before any write touches the store.
async fn resolve_category(state: &AppState, category_id: &str) -> Result<Category> {
    if !store::is_valid_id(category_id) {
        return Err(AppError::BadRequest("Invalid Category".to_string()));
    }

    state
        .store
        .find_category(category_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid Category".to_string()))
}

async fn populate_categories(
    state: &AppState,
    products: Vec<Product>,
) -> Result<Vec<ProductResponse>> {
    let categories: HashMap<String, Category> = state
        .store
        .list_categories()
        .await?
        .into_iter()
        .map(|c| (c.id.clone(), c))
        .collect();

    Ok(products
        .into_iter()
        .map(|product| {
            let category = categories.get(&product.category).cloned();
            ProductResponse::new(product, category)
        })
        .collect())
}

fn validate_create(payload: &CreateProductRequest) -> Result<()> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("Product name is required".to_string()));
    }

    if payload.description.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Product description is required".to_string(),
        ));
    }

    validate_count_in_stock(payload.count_in_stock)?;
    validate_price(payload.price)?;

    Ok(())
}

fn validate_update(payload: &UpdateProductRequest) -> Result<()> {
    if let Some(ref name) = payload.name {
        if name.trim().is_empty() {
            return Err(AppError::BadRequest("Product name is required".to_string()));
        }
    }

    if let Some(ref description) = payload.description {
        if description.trim().is_empty() {
            return Err(AppError::BadRequest(
                "Product description is required".to_string(),
            ));
        }
    }

    if let Some(count_in_stock) = payload.count_in_stock {
        validate_count_in_stock(count_in_stock)?;
    }

    if let Some(price) = payload.price {
        validate_price(price)?;
    }

    Ok(())
}

fn validate_count_in_stock(count_in_stock: i32) -> Result<()> {
    if !(0..=MAX_COUNT_IN_STOCK).contains(&count_in_stock) {
        return Err(AppError::BadRequest(format!(
            "countInStock must be between 0 and {}",
            MAX_COUNT_IN_STOCK
        )));
    }
    Ok(())
}

fn validate_price(price: f64) -> Result<()> {
    if price < 0.0 {
        return Err(AppError::BadRequest(
            "Price cannot be negative".to_string(),
        ));
    }
    Ok(())
}
