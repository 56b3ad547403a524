//! Order model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

use super::user::CartData;

/// Order lifecycle state
///
/// Orders are only written once payment is confirmed, so persisted records
/// are `Paid`; `Pending` exists for administrative flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Pending,
    Paid,
}

/// Shipping details submitted at checkout, carried through the payment
/// intent metadata and snapshotted onto the order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zipcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

/// Order entity (table `order`) — immutable snapshot once written
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    /// Record key of the paying user
    pub user_id: String,
    /// Cart snapshot at confirmation time
    pub items: CartData,
    /// Total in major currency units (intent amount / 100)
    pub total_amount: f64,
    pub status: OrderStatus,
    pub shipping_details: ShippingDetails,
    /// Gateway intent id, used to deduplicate webhook replays
    pub payment_intent_id: String,
    pub date: DateTime<Utc>,
}
