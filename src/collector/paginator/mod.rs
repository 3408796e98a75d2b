//! Cursor pagination driver.

use std::future::Future;

use tracing::{debug, warn};

use crate::github::error::IntakeError;
use crate::github::pagination::{PageInfo, SearchPage, SearchQuery, TotalEstimate};

use super::IndexProgress;

/// Walks every page of one or more search queries.
///
/// The fetcher keeps the number of collected items and the running total
/// estimate across calls to [`PaginatedFetcher::fetch_all`], so running it
/// once per repository yields one continuous progress sequence.
#[derive(Debug, Clone)]
pub struct PaginatedFetcher {
    max_pages: u32,
    collected: u64,
    estimate: TotalEstimate,
}

impl PaginatedFetcher {
    /// Creates a fetcher that reads at most `max_pages` pages per query.
    #[must_use]
    pub const fn new(max_pages: u32) -> Self {
        Self {
            max_pages,
            collected: 0,
            estimate: TotalEstimate::new(),
        }
    }

    /// Items collected across every query so far.
    #[must_use]
    pub const fn collected(&self) -> u64 {
        self.collected
    }

    /// Current running estimate of the total.
    #[must_use]
    pub const fn estimated_total(&self) -> u64 {
        self.estimate.get()
    }

    /// Fetches every page of `query`, returning nodes in page-then-node
    /// order.
    ///
    /// `fetch_page` is called with the query for each page in turn;
    /// `on_progress` is notified after every page. Paging stops when the
    /// page reports no successor or after `max_pages` pages.
    ///
    /// # Errors
    ///
    /// Returns the first error produced by `fetch_page`; nodes from earlier
    /// pages are discarded.
    pub async fn fetch_all<T, F, Fut, P>(
        &mut self,
        query: SearchQuery,
        mut fetch_page: F,
        on_progress: &mut P,
    ) -> Result<Vec<T>, IntakeError>
    where
        F: FnMut(SearchQuery) -> Fut,
        Fut: Future<Output = Result<SearchPage<T>, IntakeError>>,
        P: FnMut(IndexProgress),
    {
        let base = self.collected;
        let mut nodes = Vec::new();
        let mut next = Some(query);
        let mut pages = 0_u32;

        while pages < self.max_pages {
            let Some(current) = next.take() else {
                break;
            };
            let SearchPage {
                nodes: page_nodes,
                page_info,
                total_count,
            } = fetch_page(current.clone()).await?;
            pages = pages.saturating_add(1);

            let page_len = u64::try_from(page_nodes.len()).unwrap_or(u64::MAX);
            self.collected = self.collected.saturating_add(page_len);
            self.estimate = self
                .estimate
                .observe(base, total_count)
                .observe(self.collected, 0);
            nodes.extend(page_nodes);
            debug!(
                predicate = current.predicate(),
                page = pages,
                collected = self.collected,
                estimated_total = self.estimate.get(),
                "fetched search page"
            );
            on_progress(IndexProgress {
                collected: self.collected,
                estimated_total: self.estimate.get(),
            });

            next = following_query(current, &page_info);
        }

        Ok(nodes)
    }
}

fn following_query(current: SearchQuery, page_info: &PageInfo) -> Option<SearchQuery> {
    if !page_info.has_next_page() {
        return None;
    }
    let Some(cursor) = page_info.end_cursor() else {
        warn!(
            predicate = current.predicate(),
            "search reported another page without a cursor; stopping"
        );
        return None;
    };
    Some(current.with_cursor(Some(cursor.to_owned())))
}
