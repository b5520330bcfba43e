use async_trait::async_trait;

use crate::error::Result;
use crate::types::{MoveCursorPageInfo, SearchResult};

/// Which slice of the result set a search call asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageWindow {
    /// `first=n`, optionally `after=cursor`
    Forward { first: u32, after: Option<String> },
    /// `last=n&before=cursor`
    Backward { last: u32, before: String },
}

/// Remote side of the user search: one data endpoint and one cursor-move
/// endpoint. Both are plain request/response with no client-side state.
#[async_trait]
pub trait SearchBackend: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    async fn search(&self, query: &str, window: PageWindow) -> Result<SearchResult>;

    /// Move `shift` positions (|shift| in 1..=100) away from `cursor`.
    /// An empty cursor means the start of the result set.
    async fn move_cursor(&self, query: &str, shift: i64, cursor: &str)
        -> Result<MoveCursorPageInfo>;
}
