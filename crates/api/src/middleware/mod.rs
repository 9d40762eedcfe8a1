//! Middleware and extractors for the API.

pub mod json;
pub mod request_id;
pub mod shop;

pub use json::JsonBody;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use shop::RequestShop;
