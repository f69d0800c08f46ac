use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Category;

pub const MAX_COUNT_IN_STOCK: i32 = 999;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub rich_description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub price: f64,
    pub category: String,
    pub count_in_stock: i32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub num_of_reviews: i32,
    #[serde(default)]
    pub is_featured: bool,
    pub date_created: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub rich_description: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub price: f64,
    pub category: String,
    pub count_in_stock: i32,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub num_of_reviews: i32,
    #[serde(default)]
    pub is_featured: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub rich_description: Option<String>,
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
    pub brand: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub count_in_stock: Option<i32>,
    pub rating: Option<f64>,
    pub num_of_reviews: Option<i32>,
    pub is_featured: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub categories: Option<String>,
}

/// Product as returned by read endpoints, with the category reference
/// resolved to the full entity (null when the reference is dangling).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub rich_description: String,
    pub image: String,
    pub images: Vec<String>,
    pub brand: String,
    pub price: f64,
    pub category: Option<Category>,
    pub count_in_stock: i32,
    pub rating: f64,
    pub num_of_reviews: i32,
    pub is_featured: bool,
    pub date_created: DateTime<Utc>,
}

impl ProductResponse {
    pub fn new(product: Product, category: Option<Category>) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            rich_description: product.rich_description,
            image: product.image,
            images: product.images,
            brand: product.brand,
            price: product.price,
            category,
            count_in_stock: product.count_in_stock,
            rating: product.rating,
            num_of_reviews: product.num_of_reviews,
            is_featured: product.is_featured,
            date_created: product.date_created,
        }
    }
}

impl Product {
    /// Apply a partial update; fields absent from the request stay untouched.
    pub fn apply_update(&mut self, update: UpdateProductRequest) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(rich_description) = update.rich_description {
            self.rich_description = rich_description;
        }
        if let Some(image) = update.image {
            self.image = image;
        }
        if let Some(images) = update.images {
            self.images = images;
        }
        if let Some(brand) = update.brand {
            self.brand = brand;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
        if let Some(count_in_stock) = update.count_in_stock {
            self.count_in_stock = count_in_stock;
        }
        if let Some(rating) = update.rating {
            self.rating = rating;
        }
        if let Some(num_of_reviews) = update.num_of_reviews {
            self.num_of_reviews = num_of_reviews;
        }
        if let Some(is_featured) = update.is_featured {
            self.is_featured = is_featured;
        }
    }
}
