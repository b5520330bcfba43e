//! Effect loop around the search state.
//!
//! Every state change is followed by [`Pager::step`], which looks at the
//! externally requested `(query, page)` and issues at most one command. The
//! command runs as a spawned task and reports back with exactly one
//! [`Completion`]; the owner of the pager feeds it to [`Pager::complete`].
//! The status flags in [`State`] are the only mutual exclusion: nothing new is
//! issued while a fetch or a shift is outstanding.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backend::SearchBackend;
use crate::error::{Result, ScoutError};
use crate::search::{run_fetch, Fetch};
use crate::state::{Action, FetchingStatus, ShiftingStatus, State, View};
use crate::types::{SearchResult, USERS_PER_PAGE};

/// What the outside world (CLI args, key presses) currently wants on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub query: String,
    pub page: u32,
}

impl PageRequest {
    pub fn new(query: impl Into<String>, page: u32) -> Result<Self> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(ScoutError::Validation("query must not be empty".into()));
        }
        if page == 0 {
            return Err(ScoutError::Validation("pages start at 1".into()));
        }
        Ok(Self { query, page })
    }
}

/// Next move of the effect loop for a given state and request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Load page 1 of the requested query
    NewQuery { pagination_needed: bool },
    /// Move `shift` pages away from the current one
    Shift { shift: i32, fetch: Fetch },
    /// A page jump was owed after a new query but can no longer happen
    Abandon,
}

/// Decide what, if anything, should run next. Pure; the caller dispatches.
pub fn plan(state: &State, request: &PageRequest) -> Option<Plan> {
    let fetching = state.search.fetching_status;
    let shifting_idle = state.pagination.shifting_status == ShiftingStatus::Idle;

    if state.search.previous_requested_query.as_deref() != Some(request.query.as_str())
        && fetching == FetchingStatus::Idle
        && shifting_idle
    {
        return Some(Plan::NewQuery {
            pagination_needed: request.page != 1,
        });
    }

    let result = state.search.result.as_ref()?;
    let ready = matches!(
        fetching,
        FetchingStatus::Idle | FetchingStatus::IdlePaginationNeeded
    ) && shifting_idle;
    if !ready {
        return None;
    }

    let owed = fetching == FetchingStatus::IdlePaginationNeeded;
    if owed && state.search.query.as_deref() != Some(request.query.as_str()) {
        return Some(Plan::Abandon);
    }

    let current = state.pagination.current_page;
    if request.page == current {
        return owed.then_some(Plan::Abandon);
    }

    match shift_fetch(result, current, request.page) {
        Some((shift, fetch)) => Some(Plan::Shift { shift, fetch }),
        None => owed.then_some(Plan::Abandon),
    }
}

fn shift_fetch(result: &SearchResult, current: u32, target: u32) -> Option<(i32, Fetch)> {
    let shift = i32::try_from(i64::from(target) - i64::from(current)).ok()?;
    let per_page = i64::from(USERS_PER_PAGE);
    let page_info = &result.page_info;

    let fetch = match shift {
        1 => Fetch::NextPage {
            after: page_info.end_cursor.clone(),
        },
        -1 => Fetch::PreviousPage {
            before: page_info.start_cursor.clone(),
        },
        s if s > 1 && target <= result.total_pages() => Fetch::JumpForward {
            positions: per_page * i64::from(s - 1),
            from: page_info.end_cursor.clone(),
        },
        s if s < -1 && target >= 1 => Fetch::JumpBackward {
            positions: per_page * i64::from(s + 1),
            from: page_info.start_cursor.clone(),
        },
        _ => return None,
    };
    Some((shift, fetch))
}

/// Identifies one issued command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    pub seq: u64,
    pub query: String,
    pub page: u32,
}

/// Outcome of a command, sent back to whoever owns the [`Pager`]
#[derive(Debug, Clone)]
pub struct Completion {
    pub stamp: Stamp,
    pub outcome: std::result::Result<SearchResult, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OpKind {
    NewQuery { pagination_needed: bool },
    Shift,
}

#[derive(Debug)]
struct InFlight {
    stamp: Stamp,
    kind: OpKind,
    handle: JoinHandle<()>,
}

pub struct Pager {
    state: State,
    request: Option<PageRequest>,
    backend: Arc<dyn SearchBackend>,
    completions: mpsc::UnboundedSender<Completion>,
    in_flight: Option<InFlight>,
    seq: u64,
    failed: Option<PageRequest>,
}

impl std::fmt::Debug for Pager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("state", &self.state)
            .field("request", &self.request)
            .field("in_flight", &self.in_flight.as_ref().map(|op| &op.stamp))
            .finish_non_exhaustive()
    }
}

impl Pager {
    pub fn new(
        backend: Arc<dyn SearchBackend>,
        completions: mpsc::UnboundedSender<Completion>,
    ) -> Self {
        Self {
            state: State::new(),
            request: None,
            backend,
            completions,
            in_flight: None,
            seq: 0,
            failed: None,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn view(&self) -> View<'_> {
        View::of(&self.state)
    }

    pub fn request(&self) -> Option<&PageRequest> {
        self.request.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn update_query(&mut self, query: String) {
        self.dispatch(Action::QueryUpdated { query });
    }

    pub fn dismiss_error(&mut self) {
        self.dispatch(Action::ErrorDismissed);
    }

    /// Point the pager at a new `(query, page)`. A request for a different
    /// query abandons whatever is in flight.
    pub fn set_request(&mut self, request: PageRequest) {
        if self.request.as_ref() == Some(&request) {
            return;
        }

        let superseded = self
            .in_flight
            .as_ref()
            .is_some_and(|op| op.stamp.query != request.query);
        if superseded {
            if let Some(op) = self.in_flight.take() {
                info!(seq = op.stamp.seq, query = %op.stamp.query, "superseding in-flight request");
                op.handle.abort();
            }
            self.dispatch(Action::OperationSuperseded);
        }

        debug!(query = %request.query, page = request.page, "page requested");
        self.request = Some(request);
        self.failed = None;
        self.step();
    }

    /// Try the last failed request again
    pub fn retry(&mut self) {
        if self.failed.take().is_some() {
            self.step();
        }
    }

    /// Feed back the outcome of a command issued by this pager
    pub fn complete(&mut self, completion: Completion) {
        let op = match self.in_flight.take() {
            Some(op) if op.stamp.seq == completion.stamp.seq => op,
            other => {
                debug!(seq = completion.stamp.seq, "discarding stale completion");
                self.in_flight = other;
                return;
            }
        };

        // set_request drops the in-flight op on a query change, so a matching
        // seq always belongs to the current query.
        match completion.outcome {
            Ok(result) => {
                debug!(seq = op.stamp.seq, users = result.users.len(), "request completed");
                match op.kind {
                    OpKind::NewQuery { pagination_needed } => {
                        self.dispatch(Action::FetchNewQuerySuccess {
                            result,
                            pagination_needed,
                            set_first_page: true,
                        });
                    }
                    OpKind::Shift => {
                        self.dispatch(Action::FetchNewQuerySuccess {
                            result,
                            pagination_needed: false,
                            set_first_page: false,
                        });
                        self.dispatch(Action::ShiftPageSuccess);
                    }
                }
            }
            Err(message) => {
                warn!(seq = op.stamp.seq, query = %op.stamp.query, error = %message, "request failed");
                self.failed = self.request.clone();
                self.dispatch(Action::OperationFailed { message });
            }
        }

        self.step();
    }

    /// Wait for outstanding commands until the pager is idle
    pub async fn settle(&mut self, completions: &mut mpsc::UnboundedReceiver<Completion>) {
        while self.in_flight.is_some() {
            match completions.recv().await {
                Some(completion) => self.complete(completion),
                None => break,
            }
        }
    }

    fn dispatch(&mut self, action: Action) {
        let state = std::mem::take(&mut self.state);
        self.state = state.reduce(action);
    }

    /// Run the effect loop once: issue the next command, if any.
    fn step(&mut self) {
        loop {
            if self.in_flight.is_some() {
                return;
            }
            let Some(request) = self.request.clone() else {
                return;
            };
            if self.failed.as_ref() == Some(&request) {
                return;
            }

            match plan(&self.state, &request) {
                None => return,
                Some(Plan::Abandon) => {
                    debug!(page = request.page, "owed page is out of reach, staying on page 1");
                    self.dispatch(Action::PaginationAbandoned);
                }
                Some(Plan::NewQuery { pagination_needed }) => {
                    self.dispatch(Action::FetchNewQueryStarted {
                        query: request.query.clone(),
                    });
                    self.issue(
                        &request,
                        OpKind::NewQuery { pagination_needed },
                        Fetch::FirstPage,
                    );
                    return;
                }
                Some(Plan::Shift { shift, fetch }) => {
                    self.dispatch(Action::ShiftPageStarted { shift });
                    self.issue(&request, OpKind::Shift, fetch);
                    return;
                }
            }
        }
    }

    fn issue(&mut self, request: &PageRequest, kind: OpKind, fetch: Fetch) {
        self.seq += 1;
        let stamp = Stamp {
            seq: self.seq,
            query: request.query.clone(),
            page: request.page,
        };
        info!(seq = stamp.seq, query = %stamp.query, page = stamp.page, ?fetch, "issuing request");

        let backend = Arc::clone(&self.backend);
        let tx = self.completions.clone();
        let task_stamp = stamp.clone();
        let handle = tokio::spawn(async move {
            let outcome = run_fetch(backend.as_ref(), &task_stamp.query, &fetch)
                .await
                .map_err(|e| e.to_string());
            tx.send(Completion {
                stamp: task_stamp,
                outcome,
            })
            .ok();
        });

        self.in_flight = Some(InFlight {
            stamp,
            kind,
            handle,
        });
    }
}
