//! Paged listing traversal.
//!
//! Unique responsibility: walk a paged list endpoint, one page at a time,
//! following the server's `next` links.
//!
//! Every list method in this crate is a thin wrapper over [`fetch_all`]: the
//! resource supplies a closure that fetches one page for a given
//! [`ListOptions`], and the traversal lives here once.
//!
//! Ordering: pages are requested strictly in ascending page order and never in
//! parallel; items keep the server's order within a page.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::binarylane_actions::ActionLink;
use crate::binarylane_client::{Rate, null_as_default};
use crate::binarylane_error::BinaryLaneError;

/// Options for list endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListOptions {
    /// Page to fetch (1-indexed). `None` fetches every page.
    pub page: Option<u32>,
    /// Page size hint sent to the server.
    pub per_page: Option<u32>,
}

impl ListOptions {
    /// Fetch every page.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            page: None,
            per_page: None,
        }
    }

    /// Fetch exactly one page.
    #[must_use]
    pub const fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: None,
        }
    }

    /// Set the page size hint.
    #[must_use]
    pub const fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// The requested page, treating `0` as unset.
    #[must_use]
    pub fn requested_page(&self) -> Option<u32> {
        self.page.filter(|p| *p > 0)
    }

    /// Query parameters for this page request.
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(2);
        if let Some(page) = self.requested_page() {
            pairs.push(("page", page.to_string()));
        }
        if let Some(per_page) = self.per_page.filter(|p| *p > 0) {
            pairs.push(("per_page", per_page.to_string()));
        }
        pairs
    }
}

/// Navigation links of a paged response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pages {
    /// First page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    /// Previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    /// Last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
    /// Next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl Pages {
    /// True when there is no page after this one.
    #[must_use]
    pub fn is_last_page(&self) -> bool {
        self.next.as_deref().is_none_or(str::is_empty)
    }

    /// Number of the page these links belong to.
    ///
    /// Derived from `prev` (its page + 1); a response without `prev` is page 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the `prev` link carries no readable page number.
    pub fn current_page(&self) -> Result<u32, BinaryLaneError> {
        match self.prev.as_deref().filter(|s| !s.is_empty()) {
            None => Ok(1),
            Some(prev) => Ok(page_number_from_link(prev)?.saturating_add(1)),
        }
    }

    /// Page number of the `next` link, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the `next` link carries no readable page number.
    pub fn next_page(&self) -> Result<Option<u32>, BinaryLaneError> {
        self.next
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(page_number_from_link)
            .transpose()
    }
}

/// `links` object of a response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    /// Page navigation (list endpoints).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Pages>,
    /// Actions started by a mutating call.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionLink>,
}

/// `meta` object of a list response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Total number of items across all pages.
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
}

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items in server order.
    pub items: Vec<T>,
    /// Navigation links, when the server sent any.
    pub links: Option<Links>,
    /// Total-count metadata, when the server sent it.
    pub meta: Option<Meta>,
    /// Rate limit counters of the response.
    pub rate: Option<Rate>,
}

impl<T> Page<T> {
    /// A page holding `items` and no links.
    #[must_use]
    pub const fn new(items: Vec<T>) -> Self {
        Self {
            items,
            links: None,
            meta: None,
            rate: None,
        }
    }

    /// Attach a `next` link.
    #[must_use]
    pub fn with_next(mut self, next: impl Into<String>) -> Self {
        let links = self.links.get_or_insert_with(Links::default);
        links.pages.get_or_insert_with(Pages::default).next = Some(next.into());
        self
    }

    /// Navigation links, if present.
    #[must_use]
    pub fn pages(&self) -> Option<&Pages> {
        self.links.as_ref().and_then(|l| l.pages.as_ref())
    }

    /// Page number the `next` link points at, `None` on the last page.
    ///
    /// # Errors
    ///
    /// Returns an error if the `next` link carries no readable page number.
    pub fn next_page(&self) -> Result<Option<u32>, BinaryLaneError> {
        self.pages().map_or(Ok(None), Pages::next_page)
    }

    /// True when there is no page after this one.
    #[must_use]
    pub fn is_last_page(&self) -> bool {
        self.pages().is_none_or(Pages::is_last_page)
    }
}

/// Base used to read path-only links; only their query string matters.
const RELATIVE_LINK_BASE: &str = "http://localhost/";

/// Extract the `page` query parameter from a navigation link.
///
/// Absolute links and path-only links (`/v2/servers?page=2`) are both accepted.
///
/// # Errors
///
/// Returns an error if the link is not a URL or has no positive `page` parameter.
pub fn page_number_from_link(link: &str) -> Result<u32, BinaryLaneError> {
    let parsed = match Url::parse(link) {
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(RELATIVE_LINK_BASE).and_then(|base| base.join(link))
        }
        other => other,
    };
    let url = parsed.map_err(|_| BinaryLaneError::InvalidPageLink {
        link: link.to_string(),
        reason: "not a valid URL",
    })?;

    let raw = url
        .query_pairs()
        .find(|(k, _)| k == "page")
        .map(|(_, v)| v.into_owned())
        .ok_or_else(|| BinaryLaneError::InvalidPageLink {
            link: link.to_string(),
            reason: "missing page parameter",
        })?;

    match raw.parse::<u32>() {
        Ok(page) if page > 0 => Ok(page),
        _ => Err(BinaryLaneError::InvalidPageLink {
            link: link.to_string(),
            reason: "page parameter is not a positive integer",
        }),
    }
}

/// Collect the items of a paged list endpoint.
///
/// - `opts.page` set: fetch that page only and return its items.
/// - `opts.page` unset: fetch page 1, then every page named by `next`, until a
///   response has no `next` link.
///
/// `fetch_page` is called once per page, sequentially, with `page` always set.
///
/// # Errors
///
/// Returns the first page-fetch error unchanged, or `InvalidPageLink` when a
/// `next` link cannot be decoded or does not move forward. No items are
/// returned on error.
pub async fn fetch_all<T, F, Fut>(opts: ListOptions, mut fetch_page: F) -> Result<Vec<T>, BinaryLaneError>
where
    F: FnMut(ListOptions) -> Fut,
    Fut: Future<Output = Result<Page<T>, BinaryLaneError>>,
{
    if let Some(page) = opts.requested_page() {
        debug!(page, "fetching single page");
        return Ok(fetch_page(ListOptions { page: Some(page), ..opts }).await?.items);
    }

    let mut items = Vec::new();
    let mut current: u32 = 1;

    loop {
        debug!(page = current, "fetching page");
        let page = fetch_page(ListOptions {
            page: Some(current),
            ..opts
        })
        .await?;

        let next = page.next_page()?;
        items.extend(page.items);

        match next {
            None => return Ok(items),
            Some(n) if n > current => current = n,
            Some(_) => {
                let link = page
                    .links
                    .and_then(|l| l.pages)
                    .and_then(|p| p.next)
                    .unwrap_or_default();
                return Err(BinaryLaneError::InvalidPageLink {
                    link,
                    reason: "next page does not advance",
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(page: u32) -> String {
        format!("https://api.example.com/v2/servers?page={page}&per_page=1")
    }

    /// Pages 1..=n, one item each; item value equals its page number.
    fn book(n: u32) -> Vec<Page<u32>> {
        (1..=n)
            .map(|p| {
                let page = Page::new(vec![p]);
                if p < n { page.with_next(link(p + 1)) } else { page }
            })
            .collect()
    }

    async fn run(book: &[Page<u32>], opts: ListOptions) -> (Result<Vec<u32>, BinaryLaneError>, Vec<ListOptions>) {
        let mut calls = Vec::new();
        let result = fetch_all(opts, |o| {
            calls.push(o);
            let idx = o.page.unwrap_or(0) as usize;
            let page = book.get(idx.wrapping_sub(1)).cloned();
            async move {
                page.ok_or(BinaryLaneError::Api {
                    status: reqwest::StatusCode::NOT_FOUND,
                    body: String::new(),
                })
            }
        })
        .await;
        (result, calls)
    }

    #[tokio::test]
    async fn walks_every_page_in_order() {
        let (result, calls) = run(&book(3), ListOptions::all()).await;
        assert_eq!(result.ok(), Some(vec![1, 2, 3]));
        assert_eq!(
            calls.iter().map(|o| o.page).collect::<Vec<_>>(),
            vec![Some(1), Some(2), Some(3)]
        );
    }

    #[tokio::test]
    async fn explicit_page_fetches_only_that_page() {
        let (result, calls) = run(&book(3), ListOptions::page(2)).await;
        assert_eq!(result.ok(), Some(vec![2]));
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].page, Some(2));
    }

    #[tokio::test]
    async fn page_zero_means_fetch_all() {
        let (result, calls) = run(&book(2), ListOptions::page(0)).await;
        assert_eq!(result.ok(), Some(vec![1, 2]));
        assert_eq!(calls.len(), 2);
    }

    #[tokio::test]
    async fn per_page_hint_is_forwarded() {
        let (_, calls) = run(&book(2), ListOptions::all().with_per_page(1)).await;
        assert!(calls.iter().all(|o| o.per_page == Some(1)));
    }

    #[tokio::test]
    async fn empty_first_page_is_empty_result() {
        let (result, calls) = run(&[Page::new(Vec::new())], ListOptions::all()).await;
        assert_eq!(result.ok(), Some(Vec::new()));
        assert_eq!(calls.len(), 1);
    }

    #[tokio::test]
    async fn fetch_error_stops_traversal() {
        // page 2 points at a page 4 that does not exist
        let pages = vec![
            Page::new(vec![1]).with_next(link(2)),
            Page::new(vec![2]).with_next(link(4)),
        ];
        let (result, calls) = run(&pages, ListOptions::all()).await;
        assert!(matches!(result, Err(BinaryLaneError::Api { .. })));
        assert_eq!(calls.len(), 3);
    }

    #[tokio::test]
    async fn next_link_that_does_not_advance_is_rejected() {
        let pages = vec![Page::new(vec![1]).with_next(link(1))];
        let (result, calls) = run(&pages, ListOptions::all()).await;
        assert!(matches!(result, Err(BinaryLaneError::InvalidPageLink { .. })));
        assert_eq!(calls.len(), 1);
    }

    #[tokio::test]
    async fn next_link_without_page_is_rejected() {
        let pages = vec![Page::new(vec![1]).with_next("https://api.example.com/v2/servers")];
        let (result, _) = run(&pages, ListOptions::all()).await;
        assert!(matches!(
            result,
            Err(BinaryLaneError::InvalidPageLink { reason: "missing page parameter", .. })
        ));
    }

    #[test]
    fn page_number_is_read_from_query() {
        assert_eq!(page_number_from_link(&link(7)).ok(), Some(7));
        assert!(page_number_from_link("https://x.test/?page=0").is_err());
    }

    #[test]
    fn path_only_links_are_read_too() {
        assert_eq!(page_number_from_link("/v2/servers/?page=2").ok(), Some(2));
        assert_eq!(page_number_from_link("servers?per_page=5&page=3").ok(), Some(3));
        assert!(matches!(
            page_number_from_link("/v2/servers"),
            Err(BinaryLaneError::InvalidPageLink { reason: "missing page parameter", .. })
        ));
    }

    #[tokio::test]
    async fn relative_next_links_are_followed() {
        let pages = vec![
            Page::new(vec![1]).with_next("/v2/servers?page=2"),
            Page::new(vec![2]).with_next("/v2/servers?page=3"),
            Page::new(vec![3]),
        ];
        let (result, calls) = run(&pages, ListOptions::all()).await;
        assert_eq!(result.ok(), Some(vec![1, 2, 3]));
        assert_eq!(calls.len(), 3);
    }

    #[test]
    fn current_page_comes_from_prev_link() {
        let first = Pages {
            next: Some(link(2)),
            ..Pages::default()
        };
        assert_eq!(first.current_page().ok(), Some(1));

        let middle = Pages {
            first: Some(link(1)),
            prev: Some(link(1)),
            next: Some(link(3)),
            last: Some(link(3)),
        };
        assert_eq!(middle.current_page().ok(), Some(2));
        assert!(!middle.is_last_page());
    }

    #[test]
    fn query_pairs_skip_unset_options() {
        assert!(ListOptions::all().query_pairs().is_empty());
        assert_eq!(
            ListOptions::page(3).with_per_page(50).query_pairs(),
            vec![("page", "3".to_string()), ("per_page", "50".to_string())]
        );
    }

    #[test]
    fn null_total_reads_as_zero() {
        let meta: Result<Meta, _> = serde_json::from_str(r#"{"total":null}"#);
        assert_eq!(meta.ok(), Some(Meta { total: 0 }));
    }
}
