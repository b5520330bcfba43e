use tracing::debug;

use crate::backend::{PageWindow, SearchBackend};
use crate::cursor::resolve_cursor;
use crate::error::Result;
use crate::types::{SearchResult, USERS_PER_PAGE};

/// Fetch the page that starts right after `after`, or the first page.
pub async fn perform_forward_search(
    backend: &dyn SearchBackend,
    query: &str,
    after: Option<&str>,
) -> Result<SearchResult> {
    let window = PageWindow::Forward {
        first: USERS_PER_PAGE,
        after: after.filter(|c| !c.is_empty()).map(str::to_string),
    };
    debug!(backend = backend.name(), query, ?window, "forward search");
    backend.search(query, window).await
}

/// Fetch the page that ends right before `before`.
pub async fn perform_backwards_search(
    backend: &dyn SearchBackend,
    query: &str,
    before: &str,
) -> Result<SearchResult> {
    let window = PageWindow::Backward {
        last: USERS_PER_PAGE,
        before: before.to_string(),
    };
    debug!(backend = backend.name(), query, ?window, "backward search");
    backend.search(query, window).await
}

/// A single page load, as decided by the pagination engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetch {
    FirstPage,
    NextPage { after: String },
    PreviousPage { before: String },
    /// Walk `positions` forward from `from`, then load the page after that
    JumpForward { positions: i64, from: String },
    /// Walk `positions` (negative) back from `from`, then load the page before that
    JumpBackward { positions: i64, from: String },
}

/// Run a [`Fetch`] to completion: resolve the cursor if needed, then load.
pub async fn run_fetch(
    backend: &dyn SearchBackend,
    query: &str,
    fetch: &Fetch,
) -> Result<SearchResult> {
    match fetch {
        Fetch::FirstPage => perform_forward_search(backend, query, None).await,
        Fetch::NextPage { after } => perform_forward_search(backend, query, Some(after)).await,
        Fetch::PreviousPage { before } => perform_backwards_search(backend, query, before).await,
        Fetch::JumpForward { positions, from } => {
            let cursor = resolve_cursor(backend, query, *positions, from).await?;
            perform_forward_search(backend, query, Some(&cursor)).await
        }
        Fetch::JumpBackward { positions, from } => {
            let cursor = resolve_cursor(backend, query, *positions, from).await?;
            perform_backwards_search(backend, query, &cursor).await
        }
    }
}
