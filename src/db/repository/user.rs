//! User repository

use serde::Serialize;
use std::collections::BTreeMap;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{CartData, User};

const USER_TABLE: &str = "user";

/// Merge payload that touches exactly one cart slot
#[derive(Serialize)]
struct CartEntryPatch {
    cart_data: BTreeMap<String, i64>,
}

#[derive(Clone)]
pub struct UserRepository {
    base: BaseRepository,
}

impl UserRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>> {
        let users: Vec<User> = self
            .base
            .db()
            .query("SELECT * FROM user WHERE email = $email LIMIT 1")
            .bind(("email", email.to_string()))
            .await?
            .take(0)?;
        Ok(users.into_iter().next())
    }

    pub async fn find_by_key(&self, key: &str) -> RepoResult<Option<User>> {
        let user: Option<User> = self.base.db().select((USER_TABLE, key)).await?;
        Ok(user)
    }

    pub async fn create(&self, user: User) -> RepoResult<User> {
        let created: Option<User> = self.base.db().create(USER_TABLE).content(user).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create user".to_string()))
    }

    /// Persist a single cart slot, leaving the rest of the map untouched
    /// (merge semantics — the add-to-cart write granularity).
    pub async fn set_cart_entry(&self, key: &str, item_id: &str, quantity: i64) -> RepoResult<()> {
        let patch = CartEntryPatch {
            cart_data: BTreeMap::from([(item_id.to_string(), quantity)]),
        };
        let _updated: Option<User> = self
            .base
            .db()
            .update((USER_TABLE, key))
            .merge(patch)
            .await?;
        Ok(())
    }

    /// Replace the whole cart map (the remove-from-cart write granularity)
    pub async fn replace_cart(&self, key: &str, cart: CartData) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $user SET cart_data = $cart")
            .bind(("user", RecordId::from_table_key(USER_TABLE, key)))
            .bind(("cart", cart))
            .await?;
        Ok(())
    }

    /// Reset the cart to an empty map (order finalization)
    pub async fn clear_cart(&self, key: &str) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $user SET cart_data = {}")
            .bind(("user", RecordId::from_table_key(USER_TABLE, key)))
            .await?;
        Ok(())
    }
}
