//! Token-driven pagination
//!
//! Cloud list APIs return one page at a time plus an opaque continuation
//! token. [`drain_pages`] turns a "fetch the page after this token" function
//! into the full item list, surfacing any failure mid-sequence as an error
//! rather than a partial result.

use crate::error::PaginationError;
use std::collections::HashSet;
use std::future::Future;

/// Upper bound on pages fetched by [`drain_pages`]
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// One page of a list response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,

    /// Token for the next page; `None` or empty when exhausted
    pub next_token: Option<String>,
}

impl<T> Page<T> {
    /// Final page with no continuation
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_token: None,
        }
    }

    /// Page followed by more
    pub fn more(items: Vec<T>, next_token: impl Into<String>) -> Self {
        Self {
            items,
            next_token: Some(next_token.into()),
        }
    }
}

/// Fetch every page, starting with no token, until the service stops
/// returning one
///
/// # Examples
///
/// ```
/// use janitor_domain::pagination::{drain_pages, Page};
/// use janitor_domain::ResourceError;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let items = drain_pages(|token: Option<String>| async move {
///     Ok::<_, ResourceError>(match token.as_deref() {
///         None => Page::more(vec![1, 2], "p2"),
///         _ => Page::last(vec![3]),
///     })
/// })
/// .await
/// .unwrap();
/// assert_eq!(items, vec![1, 2, 3]);
/// # });
/// ```
pub async fn drain_pages<T, E, F, Fut>(fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
    E: From<PaginationError>,
{
    drain_pages_with_limit(fetch, DEFAULT_MAX_PAGES).await
}

/// [`drain_pages`] with an explicit page ceiling
pub async fn drain_pages_with_limit<T, E, F, Fut>(mut fetch: F, max_pages: usize) -> Result<Vec<T>, E>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
    E: From<PaginationError>,
{
    let mut items = Vec::new();
    let mut seen_tokens = HashSet::new();
    let mut token: Option<String> = None;

    for _ in 0..max_pages {
        let page = fetch(token.take()).await?;
        items.extend(page.items);

        match page.next_token.filter(|t| !t.is_empty()) {
            None => return Ok(items),
            Some(next) => {
                if !seen_tokens.insert(next.clone()) {
                    return Err(PaginationError::Stalled(next).into());
                }
                token = Some(next);
            }
        }
    }

    Err(PaginationError::TooManyPages(max_pages).into())
}
