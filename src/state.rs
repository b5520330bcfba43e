//! Search session state and the reducer that is its only writer.

use crate::types::SearchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchingStatus {
    #[default]
    Idle,
    InProgress,
    /// First page of a new query is stored, a page jump is still owed
    IdlePaginationNeeded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftingStatus {
    #[default]
    Idle,
    InProgress,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationState {
    pub shifting_status: ShiftingStatus,
    /// Page whose users are in `SearchState::result`
    pub current_page: u32,
    /// Page most recently asked for; becomes `current_page` when the shift lands
    pub requested_page: u32,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            shifting_status: ShiftingStatus::Idle,
            current_page: 1,
            requested_page: 1,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub fetching_status: FetchingStatus,
    /// Live contents of the query box
    pub query: Option<String>,
    /// Last query whose result was stored
    pub previous_requested_query: Option<String>,
    pub result: Option<SearchResult>,
    pub last_error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct State {
    pub pagination: PaginationState,
    pub search: SearchState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    FetchNewQueryStarted {
        query: String,
    },
    FetchNewQuerySuccess {
        result: SearchResult,
        pagination_needed: bool,
        set_first_page: bool,
    },
    ShiftPageStarted {
        shift: i32,
    },
    ShiftPageSuccess,
    QueryUpdated {
        query: String,
    },
    /// A remote call failed; drop back to idle, keep what is on screen
    OperationFailed {
        message: String,
    },
    /// The in-flight operation was abandoned for a newer request
    OperationSuperseded,
    /// The page owed after a new query is out of range; settle on page 1
    PaginationAbandoned,
    ErrorDismissed,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reduce(self, action: Action) -> State {
        let State {
            mut pagination,
            mut search,
        } = self;

        match action {
            Action::FetchNewQueryStarted { query } => {
                search.fetching_status = FetchingStatus::InProgress;
                search.query = Some(query);
                search.last_error = None;
            }
            Action::FetchNewQuerySuccess {
                result,
                pagination_needed,
                set_first_page,
            } => {
                if set_first_page {
                    pagination.current_page = 1;
                    pagination.requested_page = 1;
                }
                search.result = Some(result);
                if pagination_needed {
                    search.fetching_status = FetchingStatus::IdlePaginationNeeded;
                } else {
                    search.fetching_status = FetchingStatus::Idle;
                    search.previous_requested_query = search.query.clone();
                }
            }
            Action::ShiftPageStarted { shift } => {
                pagination.shifting_status = ShiftingStatus::InProgress;
                pagination.requested_page = pagination.current_page.saturating_add_signed(shift);
                search.last_error = None;
            }
            Action::ShiftPageSuccess => {
                if search.fetching_status == FetchingStatus::IdlePaginationNeeded {
                    search.fetching_status = FetchingStatus::Idle;
                }
                pagination.shifting_status = ShiftingStatus::Idle;
                pagination.current_page = pagination.requested_page;
                search.previous_requested_query = search.query.clone();
            }
            Action::QueryUpdated { query } => {
                search.query = Some(query);
            }
            Action::OperationFailed { message } => {
                settle_idle(&mut pagination, &mut search);
                search.last_error = Some(message);
            }
            Action::OperationSuperseded => {
                settle_idle(&mut pagination, &mut search);
            }
            Action::PaginationAbandoned => {
                settle_idle(&mut pagination, &mut search);
            }
            Action::ErrorDismissed => {
                search.last_error = None;
            }
        }

        State { pagination, search }
    }
}

/// Read-only projection of [`State`] for the rendering layer
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub query: Option<&'a str>,
    pub fetching_status: FetchingStatus,
    pub shifting_status: ShiftingStatus,
    pub result: Option<&'a SearchResult>,
    pub current_page: u32,
    pub requested_page: u32,
    pub total_pages: Option<u32>,
    pub last_error: Option<&'a str>,
    previous_requested_query: Option<&'a str>,
}

impl<'a> View<'a> {
    pub fn of(state: &'a State) -> Self {
        Self {
            query: state.search.query.as_deref(),
            fetching_status: state.search.fetching_status,
            shifting_status: state.pagination.shifting_status,
            result: state.search.result.as_ref(),
            current_page: state.pagination.current_page,
            requested_page: state.pagination.requested_page,
            total_pages: state.search.result.as_ref().map(SearchResult::total_pages),
            last_error: state.search.last_error.as_deref(),
            previous_requested_query: state.search.previous_requested_query.as_deref(),
        }
    }

    /// Query box differs from the last query that produced a result
    pub fn query_has_changed(&self) -> bool {
        self.previous_requested_query != self.query
    }

    pub fn can_submit(&self) -> bool {
        self.query.is_some_and(|q| !q.trim().is_empty()) && self.query_has_changed()
    }

    /// The stored users belong to the page the bar shows
    pub fn show_result_items(&self) -> bool {
        self.shifting_status == ShiftingStatus::Idle
            && self.fetching_status != FetchingStatus::IdlePaginationNeeded
    }

    pub fn is_fetching_new_query(&self) -> bool {
        self.fetching_status == FetchingStatus::InProgress
            && self.shifting_status == ShiftingStatus::Idle
    }

    pub fn is_busy(&self) -> bool {
        self.fetching_status == FetchingStatus::InProgress
            || self.shifting_status == ShiftingStatus::InProgress
    }
}

/// Return both status flags to idle without touching the stored result.
/// A first page that was waiting on a page jump is accepted as the answer.
fn settle_idle(pagination: &mut PaginationState, search: &mut SearchState) {
    if search.fetching_status == FetchingStatus::IdlePaginationNeeded {
        search.previous_requested_query = search.query.clone();
    }
    search.fetching_status = FetchingStatus::Idle;
    pagination.shifting_status = ShiftingStatus::Idle;
    pagination.requested_page = pagination.current_page;
}
