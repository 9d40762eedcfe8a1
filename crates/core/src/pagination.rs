//! Cursor pagination over upstream collections.
//!
//! [`fetch_all`] drives a [`PageSource`] from the first page until the source
//! reports the end of the collection, then returns every item newest first.
//!
//! The loop is strictly sequential: each request carries the cursor returned by
//! the previous page. Any page failure aborts the whole fetch and nothing that
//! was accumulated before the failure is returned.
//!
//! # Example
//!
//! ```rust
//! # use chrono::{DateTime, Utc};
//! # use shop_bridge_core::pagination::*;
//! #[derive(Debug)]
//! struct Order {
//!     created_at: DateTime<Utc>,
//! }
//!
//! impl Timestamped for Order {
//!     fn created_at(&self) -> DateTime<Utc> {
//!         self.created_at
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let source = page_source_fn(|_request: PageRequest| async {
//!     Ok::<_, std::convert::Infallible>(Page::<Order>::last(Vec::new()))
//! });
//!
//! let collected = fetch_all(&source, "gid://shopify/Customer/1", FetchOptions::default())
//!     .await
//!     .unwrap();
//! assert_eq!(collected.total_count, 0);
//! # }
//! ```

use std::cmp::Reverse;
use std::future::Future;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Page size used for upstream connections unless configured otherwise.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Upper bound on pages fetched for a single resource.
pub const DEFAULT_MAX_PAGES: u32 = 200;

/// An item that can be ordered by its creation time.
pub trait Timestamped {
    /// When the item was created upstream.
    fn created_at(&self) -> DateTime<Utc>;
}

/// Parameters for a single page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Identifier of the resource that owns the collection (e.g. a customer GID).
    pub resource_id: String,
    /// Number of items requested per page.
    pub page_size: u32,
    /// Cursor returned by the previous page, `None` for the first page.
    pub cursor: Option<String>,
}

/// What the upstream said about the pages after this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Continuation {
    /// More pages exist, continue after this cursor.
    More(String),
    /// This was the last page.
    End,
    /// Upstream claimed more pages exist but sent no usable cursor.
    MissingCursor,
}

impl Continuation {
    /// Build a continuation from a GraphQL `pageInfo` block.
    ///
    /// An empty cursor is treated the same as a missing one.
    #[must_use]
    pub fn from_page_info(has_next_page: bool, end_cursor: Option<String>) -> Self {
        match (has_next_page, end_cursor) {
            (false, _) => Self::End,
            (true, Some(cursor)) if !cursor.is_empty() => Self::More(cursor),
            (true, _) => Self::MissingCursor,
        }
    }
}

/// A batch of items returned by one upstream call.
#[derive(Debug, Clone)]
pub struct Page<T> {
    /// Items on this page, in upstream order.
    pub items: Vec<T>,
    /// How to continue after this page.
    pub continuation: Continuation,
}

impl<T> Page<T> {
    /// Create a page.
    #[must_use]
    pub const fn new(items: Vec<T>, continuation: Continuation) -> Self {
        Self {
            items,
            continuation,
        }
    }

    /// Create a page that is followed by another page at `cursor`.
    #[must_use]
    pub fn more(items: Vec<T>, cursor: impl Into<String>) -> Self {
        Self::new(items, Continuation::More(cursor.into()))
    }

    /// Create the final page of a collection.
    #[must_use]
    pub const fn last(items: Vec<T>) -> Self {
        Self::new(items, Continuation::End)
    }
}

/// One network round trip to a paginated upstream collection.
pub trait PageSource<T> {
    /// Error returned when the page could not be fetched.
    type Error;

    /// Fetch the page described by `request`.
    fn fetch_page(
        &self,
        request: PageRequest,
    ) -> impl Future<Output = Result<Page<T>, Self::Error>> + Send;
}

/// A [`PageSource`] backed by an async closure. Created by [`page_source_fn`].
#[derive(Debug, Clone, Copy)]
pub struct PageSourceFn<F> {
    f: F,
}

/// Wrap an async closure as a [`PageSource`].
pub const fn page_source_fn<F>(f: F) -> PageSourceFn<F> {
    PageSourceFn { f }
}

impl<T, E, F, Fut> PageSource<T> for PageSourceFn<F>
where
    F: Fn(PageRequest) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>> + Send,
{
    type Error = E;

    fn fetch_page(&self, request: PageRequest) -> impl Future<Output = Result<Page<T>, E>> + Send {
        (self.f)(request)
    }
}

/// Tuning for a [`fetch_all`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Items requested per page.
    pub page_size: u32,
    /// Maximum number of pages before the fetch is aborted.
    pub max_pages: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

/// How a successful fetch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The last page said there was nothing more.
    Exhausted,
    /// A page claimed more data but carried no cursor. Items after that page,
    /// if any exist upstream, are missing from the result.
    MissingCursor,
}

/// Every item of a collection, newest first.
#[derive(Debug, Clone)]
pub struct Collected<T> {
    /// All items, sorted by `created_at` descending.
    pub items: Vec<T>,
    /// Number of items in `items`.
    pub total_count: usize,
    /// Number of upstream pages requested.
    pub pages_fetched: u32,
    /// How the pagination loop ended.
    pub termination: Termination,
}

/// Errors that abort a [`fetch_all`] call.
#[derive(Debug, Error)]
pub enum PaginationError<E> {
    /// A page request failed. Nothing fetched before it is returned.
    #[error("page {page} failed: {source}")]
    Source {
        /// 1-based number of the failing page.
        page: u32,
        /// Error reported by the page source.
        #[source]
        source: E,
    },

    /// The collection did not end within the configured number of pages.
    #[error("pagination did not finish within {max_pages} pages")]
    PageLimitExceeded {
        /// The configured bound.
        max_pages: u32,
    },
}

impl<E> PaginationError<E> {
    /// Map the source error, keeping the page number.
    pub fn map_source<F, E2>(self, f: F) -> PaginationError<E2>
    where
        F: FnOnce(E) -> E2,
    {
        match self {
            Self::Source { page, source } => PaginationError::Source {
                page,
                source: f(source),
            },
            Self::PageLimitExceeded { max_pages } => PaginationError::PageLimitExceeded { max_pages },
        }
    }
}

/// Fetch every page of `resource_id` from `source` and return the items newest
/// first.
///
/// Items with equal `created_at` keep the order in which they were fetched.
///
/// # Errors
///
/// Returns [`PaginationError::Source`] as soon as any page fails, and
/// [`PaginationError::PageLimitExceeded`] if the collection does not end within
/// `options.max_pages` pages.
#[tracing::instrument(skip(source, options), fields(page_size = options.page_size))]
pub async fn fetch_all<T, S>(
    source: &S,
    resource_id: &str,
    options: FetchOptions,
) -> Result<Collected<T>, PaginationError<S::Error>>
where
    S: PageSource<T> + Sync,
    T: Timestamped + Send,
{
    let mut items: Vec<T> = Vec::new();
    let mut cursor: Option<String> = None;
    let mut pages_fetched: u32 = 0;

    let termination = loop {
        if pages_fetched >= options.max_pages {
            tracing::warn!(
                resource_id,
                max_pages = options.max_pages,
                "Pagination page limit reached"
            );
            return Err(PaginationError::PageLimitExceeded {
                max_pages: options.max_pages,
            });
        }

        let request = PageRequest {
            resource_id: resource_id.to_owned(),
            page_size: options.page_size,
            cursor: cursor.take(),
        };

        let page = source
            .fetch_page(request)
            .await
            .map_err(|source| PaginationError::Source {
                page: pages_fetched + 1,
                source,
            })?;
        pages_fetched += 1;

        tracing::debug!(page = pages_fetched, items = page.items.len(), "Fetched page");
        items.extend(page.items);

        match page.continuation {
            Continuation::More(next) => cursor = Some(next),
            Continuation::End => break Termination::Exhausted,
            Continuation::MissingCursor => {
                tracing::warn!(
                    resource_id,
                    page = pages_fetched,
                    fetched = items.len(),
                    "Upstream reported more pages without a cursor, result may be incomplete"
                );
                break Termination::MissingCursor;
            }
        }
    };

    // Stable: equal timestamps keep fetch order
    items.sort_by_key(|item| Reverse(item.created_at()));

    Ok(Collected {
        total_count: items.len(),
        items,
        pages_fetched,
        termination,
    })
}
