//! Snackaroo storefront backend
//!
//! Embedded-database web service for a snack storefront: product catalog,
//! user accounts with per-user carts, gateway checkout with webhook-driven
//! order finalization, and image upload/serving.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod payment;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState, build_app, build_router};
pub use utils::{AppError, AppResult, init_logging};
