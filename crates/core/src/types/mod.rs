//! Core types for Shop Bridge.
//!
//! This module provides type-safe wrappers for the identifiers and free-text
//! inputs that arrive from storefront clients.

pub mod email;
pub mod gid;
pub mod reason;
pub mod shop;

pub use email::{Email, EmailError};
pub use gid::*;
pub use reason::{CancelReason, ReturnReason};
pub use shop::{ShopDomain, ShopDomainError};
