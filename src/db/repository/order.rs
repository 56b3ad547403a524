//! Order repository

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Order;

const ORDER_TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(ORDER_TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Look up an order by its gateway intent id (webhook replay dedup)
    pub async fn find_by_intent(&self, payment_intent_id: &str) -> RepoResult<Option<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE payment_intent_id = $pid LIMIT 1")
            .bind(("pid", payment_intent_id.to_string()))
            .await?
            .take(0)?;
        Ok(orders.into_iter().next())
    }

    pub async fn find_by_user(&self, user_id: &str) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE user_id = $uid ORDER BY date")
            .bind(("uid", user_id.to_string()))
            .await?
            .take(0)?;
        Ok(orders)
    }
}
