mod categories;
mod health;
mod login;
mod orders;
mod products;
mod users;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::{middleware, AppState};

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/categories",
            get(categories::get_all_categories).post(categories::create_category),
        )
        .route(
            "/categories/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route(
            "/products",
            get(products::get_all_products).post(products::create_product),
        )
        .route("/products/count", get(products::get_product_count))
        .route("/products/featured", get(products::get_featured_products))
        .route(
            "/products/featured/{limit}",
            get(products::get_featured_products_limited),
        )
        .route(
            "/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/orders", get(orders::get_all_orders))
        .route(
            "/users",
            get(users::get_all_users).post(users::register_user),
        )
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route("/users/login", post(login::login_user))
        .route_layer(from_fn_with_state(state.clone(), middleware::auth));

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .nest("/api/v1", api)
        .with_state(state)
}
