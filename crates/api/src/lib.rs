//! Shop Bridge API library.
//!
//! A thin HTTP layer between storefront clients and the Shopify Admin
//! GraphQL API: REST-style JSON routes for customers, orders and returns,
//! and the app lifecycle webhooks that keep the session table current.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod shopify;
pub mod state;
