//! Domain models for the API service.

pub mod session;

pub use session::{ShopCredentials, ShopSession, parse_scopes};
