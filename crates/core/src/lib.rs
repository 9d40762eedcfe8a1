//! Shop Bridge Core - Shared types and pagination.
//!
//! This crate provides the pieces of Shop Bridge that carry business rules but
//! no I/O:
//! - `api` - HTTP service that fronts the Shopify Admin API
//! - `cli` - Command-line tools for migrations and session bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types, traits and pure functions - no database
//! access, no HTTP clients. Upstream calls are injected through the
//! [`pagination::PageSource`] trait so the pagination rules can be tested
//! without a network.
//!
//! # Modules
//!
//! - [`pagination`] - Fetch every page of a cursor-paginated collection
//! - [`types`] - Shopify GIDs, shop domains, emails and reason normalizers

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod pagination;
pub mod types;

pub use pagination::{
    Collected, Continuation, FetchOptions, Page, PageRequest, PageSource, PaginationError,
    Termination, Timestamped, fetch_all, page_source_fn,
};
pub use types::*;
