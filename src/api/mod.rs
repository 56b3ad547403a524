//! HTTP API modules, one per storefront domain

pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod upload;
