//! Database models

pub mod order;
pub mod product;
pub mod user;

pub use order::{Order, OrderStatus, ShippingDetails};
pub use product::{Product, ProductCreate, ProductView};
pub use user::{CartData, User, seeded_cart};
