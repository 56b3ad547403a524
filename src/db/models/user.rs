//! User model

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Cart map: product id string -> non-negative quantity
pub type CartData = BTreeMap<String, i64>;

/// Number of zeroed cart slots seeded at signup
pub const CART_SLOTS: usize = 300;

/// User entity (table `user`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    /// Argon2 password hash
    pub password: String,
    pub cart_data: CartData,
    pub date: DateTime<Utc>,
}

impl User {
    /// Record key of this user, as carried in JWT claims
    pub fn key(&self) -> String {
        self.id
            .as_ref()
            .map(|id| id.key().to_string())
            .unwrap_or_default()
    }
}

/// Fresh cart map: slots "0".."299" all zero
pub fn seeded_cart() -> CartData {
    (0..CART_SLOTS).map(|i| (i.to_string(), 0)).collect()
}
