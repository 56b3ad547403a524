//! Product repository

use chrono::Utc;
use serde::Deserialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Product, ProductCreate};

const PRODUCT_TABLE: &str = "product";

#[derive(Deserialize)]
struct Counter {
    value: i64,
}

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All products in id order
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product ORDER BY product_id")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find a product by its public numeric id
    pub async fn find_by_product_id(&self, product_id: i64) -> RepoResult<Option<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE product_id = $pid LIMIT 1")
            .bind(("pid", product_id))
            .await?
            .take(0)?;
        Ok(products.into_iter().next())
    }

    /// Products of one category, id order
    pub async fn find_by_category(&self, category: &str) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE category = $cat ORDER BY product_id")
            .bind(("cat", category.to_string()))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Claim the next numeric id from the atomic counter.
    ///
    /// Single-statement UPSERT, so concurrent creations cannot observe the
    /// same value.
    pub async fn next_product_id(&self) -> RepoResult<i64> {
        let counters: Vec<Counter> = self
            .base
            .db()
            .query("UPSERT counter:product SET value += 1 RETURN AFTER")
            .await?
            .take(0)?;
        counters
            .into_iter()
            .next()
            .map(|c| c.value)
            .ok_or_else(|| RepoError::Database("Counter update returned nothing".to_string()))
    }

    /// Create a new product with the next numeric id
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        let product_id = self.next_product_id().await?;

        let product = Product {
            id: None,
            product_id,
            image: data.image_value(),
            name: data.name,
            category: data.category,
            new_price: data.new_price,
            old_price: data.old_price,
            date: Utc::now(),
            available: true,
        };

        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCT_TABLE)
            .content(product)
            .await?;

        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Delete by numeric id. Deleting a missing id is a no-op success.
    pub async fn delete_by_product_id(&self, product_id: i64) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE product WHERE product_id = $pid")
            .bind(("pid", product_id))
            .await?;
        Ok(())
    }
}
