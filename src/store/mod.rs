mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use std::collections::HashSet;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use thiserror::Error;

use crate::models::{Category, Order, Product, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(#[from] mongodb::error::Error),

    #[error("store connection failed: {0}")]
    ConnectionFailed(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Narrowing applied to product listings before they leave the store.
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    pub categories: Option<HashSet<String>>,
    pub featured: Option<bool>,
    pub limit: Option<u64>,
}

/// Generate a fresh opaque identifier for a new document.
pub fn new_id() -> String {
    ObjectId::new().to_hex()
}

/// Whether a path/reference identifier is syntactically valid.
pub fn is_valid_id(id: &str) -> bool {
    ObjectId::parse_str(id).is_ok()
}

/// Uniform document-store surface over the four collections.
///
/// Injected into controllers as `Arc<dyn Store>` so the driver-backed
/// implementation can be swapped for [`MemoryStore`] in tests. Inserts
/// assign a store-generated identifier when the entity's id is empty and
/// return the persisted entity; `replace_*` overwrites the full document
/// by id in a single atomic write and reports whether anything matched.
#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    async fn list_categories(&self) -> StoreResult<Vec<Category>>;
    async fn find_category(&self, id: &str) -> StoreResult<Option<Category>>;
    async fn insert_category(&self, category: Category) -> StoreResult<Category>;
    async fn replace_category(&self, category: Category) -> StoreResult<Option<Category>>;
    async fn delete_category(&self, id: &str) -> StoreResult<bool>;

    async fn list_products(&self, filter: ProductFilter) -> StoreResult<Vec<Product>>;
    async fn find_product(&self, id: &str) -> StoreResult<Option<Product>>;
    async fn insert_product(&self, product: Product) -> StoreResult<Product>;
    async fn replace_product(&self, product: Product) -> StoreResult<Option<Product>>;
    async fn delete_product(&self, id: &str) -> StoreResult<bool>;
    async fn count_products(&self) -> StoreResult<u64>;
    async fn any_product_in_category(&self, category_id: &str) -> StoreResult<bool>;

    async fn list_orders(&self) -> StoreResult<Vec<Order>>;
    async fn insert_order(&self, order: Order) -> StoreResult<Order>;

    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn find_user(&self, id: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn insert_user(&self, user: User) -> StoreResult<User>;
    async fn replace_user(&self, user: User) -> StoreResult<Option<User>>;
    async fn delete_user(&self, id: &str) -> StoreResult<bool>;
}
