//! Product model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Product entity (table `product`)
///
/// `product_id` is the public numeric id assigned from the atomic counter;
/// `id` is the store-internal record id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub product_id: i64,
    pub name: String,
    pub image: String,
    pub category: String,
    pub new_price: f64,
    pub old_price: f64,
    pub date: DateTime<Utc>,
    pub available: bool,
}

/// Create product payload (`POST /addproduct`)
///
/// Admin uploads send the stored path as `image_path`; older clients send
/// `image`. `image_path` wins when both are present.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    pub name: String,
    pub image: Option<String>,
    pub image_path: Option<String>,
    pub category: String,
    pub new_price: f64,
    pub old_price: f64,
}

impl ProductCreate {
    pub fn image_value(&self) -> String {
        self.image_path
            .clone()
            .or_else(|| self.image.clone())
            .unwrap_or_default()
    }
}

/// Wire shape served by the catalog endpoints: the numeric id is exposed
/// as `id`, matching what the storefront frontend expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub category: String,
    pub new_price: f64,
    pub old_price: f64,
    pub date: DateTime<Utc>,
    pub available: bool,
}

impl From<Product> for ProductView {
    fn from(p: Product) -> Self {
        Self {
            id: p.product_id,
            name: p.name,
            image: p.image,
            category: p.category,
            new_price: p.new_price,
            old_price: p.old_price,
            date: p.date,
            available: p.available,
        }
    }
}
