//! Relay connections over offset pagination
//!
//! Cursors are absolute row offsets. `after`/`before` bound the window,
//! `first`/`last` shrink it from the front/back, and the result never
//! exceeds [`MAX_PAGE_SIZE`] rows.

use std::future::Future;

use async_graphql::connection::{self, Connection, Edge};
use async_graphql::{OutputType, Result};

use crmctl_core::models::MAX_PAGE_SIZE;
use crmctl_core::{Page, Pagination};

use super::error::graphql_error;
use super::types::TotalCount;

pub type CountedConnection<N> = Connection<usize, N, TotalCount>;

/// Raw Relay arguments as received by a list field
#[derive(Debug, Default, Clone)]
pub struct PageArgs {
    pub after: Option<String>,
    pub before: Option<String>,
    pub first: Option<i32>,
    pub last: Option<i32>,
}

/// Resolved row window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Window {
    pub offset: usize,
    pub limit: usize,
}

impl Window {
    /// `total` is only consulted when `last` is given without `before`.
    pub(crate) fn resolve(
        after: Option<usize>,
        before: Option<usize>,
        first: Option<usize>,
        last: Option<usize>,
        total: Option<usize>,
    ) -> Self {
        let max = MAX_PAGE_SIZE as usize;
        let mut start = after.map_or(0, |a| a.saturating_add(1));
        let mut end = before.or(total).unwrap_or(usize::MAX).max(start);

        if let Some(first) = first {
            end = end.min(start.saturating_add(first));
        }
        if let Some(last) = last {
            start = start.max(end.saturating_sub(last));
        }
        if last.is_some() && end - start > max {
            start = end - max;
        }

        Self {
            offset: start,
            limit: (end - start).min(max),
        }
    }

    fn needs_total(before: Option<usize>, last: Option<usize>) -> bool {
        last.is_some() && before.is_none()
    }
}

/// Build a counted connection from a page fetcher.
///
/// `fetch` runs the list query for a pagination window; it is called a
/// second time only to learn the total when paging from the end.
pub async fn resolve<T, N, Fetch, Fut>(
    args: PageArgs,
    fetch: Fetch,
    node: fn(T) -> N,
) -> Result<CountedConnection<N>>
where
    T: Send,
    N: OutputType,
    Fetch: Fn(Pagination) -> Fut + Send + Sync,
    Fut: Future<Output = crmctl_core::Result<Page<T>>> + Send,
{
    connection::query(
        args.after,
        args.before,
        args.first,
        args.last,
        |after: Option<usize>, before: Option<usize>, first, last| async move {
            let total = if Window::needs_total(before, last) {
                let probe = fetch(Pagination::new(0, 1)).await.map_err(graphql_error)?;
                Some(probe.total.max(0) as usize)
            } else {
                None
            };

            let window = Window::resolve(after, before, first, last, total);
            let mut page = fetch(Pagination::new(window.offset as u64, window.limit as u32))
                .await
                .map_err(graphql_error)?;
            if window.limit == 0 {
                page.items.clear();
            }

            // An empty window has no following page to announce.
            let has_next = window.limit > 0 && page.has_next();
            let mut conn = Connection::with_additional_fields(
                page.has_prev(),
                has_next,
                TotalCount {
                    total_count: page.total,
                },
            );
            conn.edges.extend(
                page.items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| Edge::new(window.offset + i, node(item))),
            );
            Ok::<_, async_graphql::Error>(conn)
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_first_page() {
        assert_eq!(
            Window::resolve(None, None, None, None, None),
            Window { offset: 0, limit: 100 }
        );
    }

    #[test]
    fn first_after() {
        assert_eq!(
            Window::resolve(Some(4), None, Some(3), None, None),
            Window { offset: 5, limit: 3 }
        );
    }

    #[test]
    fn first_is_capped() {
        assert_eq!(
            Window::resolve(None, None, Some(500), None, None),
            Window { offset: 0, limit: 100 }
        );
    }

    #[test]
    fn last_uses_total() {
        assert_eq!(
            Window::resolve(None, None, None, Some(2), Some(10)),
            Window { offset: 8, limit: 2 }
        );
    }

    #[test]
    fn last_before() {
        assert_eq!(
            Window::resolve(None, Some(5), None, Some(2), None),
            Window { offset: 3, limit: 2 }
        );
    }

    #[test]
    fn long_tail_keeps_the_end() {
        assert_eq!(
            Window::resolve(None, None, None, Some(300), Some(250)),
            Window { offset: 150, limit: 100 }
        );
    }

    #[test]
    fn empty_window() {
        assert_eq!(
            Window::resolve(None, None, Some(0), None, None),
            Window { offset: 0, limit: 0 }
        );
        assert_eq!(
            Window::resolve(Some(9), Some(5), None, None, None),
            Window { offset: 10, limit: 0 }
        );
    }
}
