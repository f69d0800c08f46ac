use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::ClientOptions,
    Client, Collection, Database,
};

use crate::config::StoreConfig;
use crate::models::{Category, Order, Product, User};

use super::{new_id, ProductFilter, Store, StoreError, StoreResult};

/// Driver-backed implementation of [`Store`].
pub struct MongoStore {
    db: Database,
    categories: Collection<Category>,
    products: Collection<Product>,
    orders: Collection<Order>,
    users: Collection<User>,
}

impl MongoStore {
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(&config.url).await?;
        options.max_pool_size = Some(config.max_pool_size);
        options.connect_timeout = Some(Duration::from_secs(10));
        options.server_selection_timeout = Some(Duration::from_secs(30));

        let client = Client::with_options(options)?;
        let db = client.database(&config.database);

        // Verify the connection before the server starts taking requests.
        db.run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        tracing::info!(
            "Store connection established with {} max pooled connections",
            config.max_pool_size
        );

        Ok(Self {
            categories: db.collection("categories"),
            products: db.collection("products"),
            orders: db.collection("orders"),
            users: db.collection("users"),
            db,
        })
    }
}

#[async_trait]
impl Store for MongoStore {
    async fn ping(&self) -> StoreResult<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn list_categories(&self) -> StoreResult<Vec<Category>> {
        let cursor = self.categories.find(doc! {}).sort(doc! { "name": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_category(&self, id: &str) -> StoreResult<Option<Category>> {
        Ok(self.categories.find_one(doc! { "id": id }).await?)
    }

    async fn insert_category(&self, mut category: Category) -> StoreResult<Category> {
        if category.id.is_empty() {
            category.id = new_id();
        }
        self.categories.insert_one(&category).await?;
        Ok(category)
    }

    async fn replace_category(&self, category: Category) -> StoreResult<Option<Category>> {
        let result = self
            .categories
            .replace_one(doc! { "id": &category.id }, &category)
            .await?;
        Ok((result.matched_count > 0).then_some(category))
    }

    async fn delete_category(&self, id: &str) -> StoreResult<bool> {
        let result = self.categories.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list_products(&self, filter: ProductFilter) -> StoreResult<Vec<Product>> {
        let mut query = doc! {};
        if let Some(categories) = filter.categories {
            let ids: Vec<String> = categories.into_iter().collect();
            query.insert("category", doc! { "$in": ids });
        }
        if let Some(featured) = filter.featured {
            query.insert("isFeatured", featured);
        }

        let mut find = self
            .products
            .find(query)
            .sort(doc! { "dateCreated": -1 });
        if let Some(limit) = filter.limit {
            find = find.limit(limit as i64);
        }

        Ok(find.await?.try_collect().await?)
    }

    async fn find_product(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.products.find_one(doc! { "id": id }).await?)
    }

    async fn insert_product(&self, mut product: Product) -> StoreResult<Product> {
        if product.id.is_empty() {
            product.id = new_id();
        }
        self.products.insert_one(&product).await?;
        Ok(product)
    }

    async fn replace_product(&self, product: Product) -> StoreResult<Option<Product>> {
        let result = self
            .products
            .replace_one(doc! { "id": &product.id }, &product)
            .await?;
        Ok((result.matched_count > 0).then_some(product))
    }

    async fn delete_product(&self, id: &str) -> StoreResult<bool> {
        let result = self.products.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn count_products(&self) -> StoreResult<u64> {
        Ok(self.products.count_documents(doc! {}).await?)
    }

    async fn any_product_in_category(&self, category_id: &str) -> StoreResult<bool> {
        let found = self
            .products
            .find_one(doc! { "category": category_id })
            .await?;
        Ok(found.is_some())
    }

    async fn list_orders(&self) -> StoreResult<Vec<Order>> {
        let cursor = self
            .orders
            .find(doc! {})
            .sort(doc! { "dateOrdered": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn insert_order(&self, mut order: Order) -> StoreResult<Order> {
        if order.id.is_empty() {
            order.id = new_id();
        }
        self.orders.insert_one(&order).await?;
        Ok(order)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let cursor = self.users.find(doc! {}).sort(doc! { "name": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_user(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.users.find_one(doc! { "id": id }).await?)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self.users.find_one(doc! { "email": email }).await?)
    }

    async fn insert_user(&self, mut user: User) -> StoreResult<User> {
        if user.id.is_empty() {
            user.id = new_id();
        }
        self.users.insert_one(&user).await?;
        Ok(user)
    }

    async fn replace_user(&self, user: User) -> StoreResult<Option<User>> {
        let result = self
            .users
            .replace_one(doc! { "id": &user.id }, &user)
            .await?;
        Ok((result.matched_count > 0).then_some(user))
    }

    async fn delete_user(&self, id: &str) -> StoreResult<bool> {
        let result = self.users.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
