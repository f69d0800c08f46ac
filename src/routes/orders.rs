use axum::{extract::State, Json};

use crate::{error::Result, models::Order, AppState};

pub async fn get_all_orders(State(state): State<AppState>) -> Result<Json<Vec<Order>>> {
    let orders = state.store.list_orders().await?;

    Ok(Json(orders))
}
