use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::{Category, Order, Product, User};

use super::{new_id, ProductFilter, Store, StoreResult};

/// In-memory implementation of [`Store`] (for development/testing).
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    categories: Arc<RwLock<HashMap<String, Category>>>,
    products: Arc<RwLock<HashMap<String, Product>>>,
    orders: Arc<RwLock<HashMap<String, Order>>>,
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn assign_id(id: &mut String) {
    if id.is_empty() {
        *id = new_id();
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let categories = self.categories.read().await;
        let mut result: Vec<Category> = categories.values().cloned().collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn find_category(&self, id: &str) -> StoreResult<Option<Category>> {
        let categories = self.categories.read().await;
        Ok(categories.get(id).cloned())
    }

    async fn insert_category(&self, mut category: Category) -> StoreResult<Category> {
        assign_id(&mut category.id);
        let mut categories = self.categories.write().await;
        categories.insert(category.id.clone(), category.clone());
        Ok(category)
    }

    async fn replace_category(&self, category: Category) -> StoreResult<Option<Category>> {
        let mut categories = self.categories.write().await;
        if !categories.contains_key(&category.id) {
            return Ok(None);
        }
        categories.insert(category.id.clone(), category.clone());
        Ok(Some(category))
    }

    async fn delete_category(&self, id: &str) -> StoreResult<bool> {
        let mut categories = self.categories.write().await;
        Ok(categories.remove(id).is_some())
    }

    async fn list_products(&self, filter: ProductFilter) -> StoreResult<Vec<Product>> {
        let products = self.products.read().await;

        let mut result: Vec<Product> = products
            .values()
            .filter(|p| {
                if let Some(ref categories) = filter.categories {
                    if !categories.contains(&p.category) {
                        return false;
                    }
                }
                if let Some(featured) = filter.featured {
                    if p.is_featured != featured {
                        return false;
                    }
                }
                true
            })
            .cloned()
            .collect();

        result.sort_by(|a, b| b.date_created.cmp(&a.date_created));

        if let Some(limit) = filter.limit {
            result.truncate(limit as usize);
        }

        Ok(result)
    }

    async fn find_product(&self, id: &str) -> StoreResult<Option<Product>> {
        let products = self.products.read().await;
        Ok(products.get(id).cloned())
    }

    async fn insert_product(&self, mut product: Product) -> StoreResult<Product> {
        assign_id(&mut product.id);
        let mut products = self.products.write().await;
        products.insert(product.id.clone(), product.clone());
        Ok(product)
    }

    async fn replace_product(&self, product: Product) -> StoreResult<Option<Product>> {
        let mut products = self.products.write().await;
        if !products.contains_key(&product.id) {
            return Ok(None);
        }
        products.insert(product.id.clone(), product.clone());
        Ok(Some(product))
    }

    async fn delete_product(&self, id: &str) -> StoreResult<bool> {
        let mut products = self.products.write().await;
        Ok(products.remove(id).is_some())
    }

    async fn count_products(&self) -> StoreResult<u64> {
        let products = self.products.read().await;
        Ok(products.len() as u64)
    }

    async fn any_product_in_category(&self, category_id: &str) -> StoreResult<bool> {
        let products = self.products.read().await;
        Ok(products.values().any(|p| p.category == category_id))
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let orders = self.orders.read().await;
        let mut result: Vec<Order> = orders.values().cloned().collect();
        result.sort_by(|a, b| b.date_ordered.cmp(&a.date_ordered));
        Ok(result)
    }

    async fn insert_order(&self, mut order: Order) -> StoreResult<Order> {
        assign_id(&mut order.id);
        let mut orders = self.orders.write().await;
        orders.insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        let mut result: Vec<User> = users.values().cloned().collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn insert_user(&self, mut user: User) -> StoreResult<User> {
        assign_id(&mut user.id);
        let mut users = self.users.write().await;
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn replace_user(&self, user: User) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Ok(None);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(Some(user))
    }

    async fn delete_user(&self, id: &str) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        Ok(users.remove(id).is_some())
    }
}
