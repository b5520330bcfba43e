use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::action::Action;
use crate::engine::{PageRequest, Pager};
use crate::event::Event;
use crate::types::User;

/// Where key presses go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Query,
    GotoPage,
}

pub struct App {
    pub pager: Pager,
    pub mode: InputMode,
    pub goto_input: String,
    pub selected: usize,
    pub spinner_frame: usize,
    pub notice: Option<String>,
    pub error: Option<String>,
    pub should_quit: bool,
}

impl App {
    pub fn new(pager: Pager) -> Self {
        Self {
            pager,
            mode: InputMode::default(),
            goto_input: String::new(),
            selected: 0,
            spinner_frame: 0,
            notice: None,
            error: None,
            should_quit: false,
        }
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => {
                if self.pager.request().is_none() {
                    Action::EnterQueryMode
                } else {
                    Action::None
                }
            }
            Event::Tick => Action::Tick,
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) if self.mode == InputMode::Query => Action::QueryPaste(text),
            _ => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        match self.mode {
            InputMode::Query => match key.code {
                KeyCode::Esc => Action::ExitQueryMode,
                KeyCode::Enter => Action::SubmitQuery,
                KeyCode::Backspace => Action::QueryBackspace,
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Action::QueryInput(c)
                }
                _ => Action::None,
            },
            InputMode::GotoPage => match key.code {
                KeyCode::Esc => Action::ExitGotoMode,
                KeyCode::Enter => Action::GotoConfirm,
                KeyCode::Backspace => Action::GotoBackspace,
                KeyCode::Char(c) if c.is_ascii_digit() => Action::GotoInput(c),
                _ => Action::None,
            },
            InputMode::Normal => match key.code {
                KeyCode::Char('q') => Action::Quit,
                KeyCode::Esc => {
                    if self.error.is_some() || self.pager.view().last_error.is_some() {
                        Action::DismissError
                    } else {
                        Action::Quit
                    }
                }
                KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
                KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
                KeyCode::Char('l') | KeyCode::Char('n') | KeyCode::Right => Action::NextPage,
                KeyCode::Char('h') | KeyCode::Char('p') | KeyCode::Left => Action::PrevPage,
                KeyCode::Char('H') | KeyCode::Home => Action::FirstPage,
                KeyCode::Char('L') | KeyCode::End => Action::LastPage,
                KeyCode::Char(':') => Action::EnterGotoMode,
                KeyCode::Char('/') | KeyCode::Char('i') => Action::EnterQueryMode,
                KeyCode::Enter | KeyCode::Char('o') => Action::OpenInBrowser,
                KeyCode::Char('y') => Action::YankUrl,
                KeyCode::Char('r') => Action::Retry,
                _ => Action::None,
            },
        }
    }

    pub fn update(&mut self, action: Action) {
        if !matches!(action, Action::Tick | Action::None | Action::SearchCompleted(_)) {
            self.notice = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Tick => {
                self.spinner_frame = self.spinner_frame.wrapping_add(1);
            }
            Action::ScrollUp => {
                self.selected = self.selected.saturating_sub(1);
            }
            Action::ScrollDown => {
                let len = self.users().len();
                if len > 0 && self.selected < len - 1 {
                    self.selected += 1;
                }
            }

            Action::NextPage => {
                if let Some(page) = self.target_page().map(|p| p.saturating_add(1)) {
                    self.go_to_page(page);
                }
            }
            Action::PrevPage => {
                if let Some(page) = self.target_page().map(|p| p.saturating_sub(1)) {
                    self.go_to_page(page);
                }
            }
            Action::FirstPage => self.go_to_page(1),
            Action::LastPage => {
                if let Some(total) = self.pager.view().total_pages {
                    self.go_to_page(total);
                }
            }

            Action::EnterQueryMode => {
                // Editing while a page load is out would record the half-typed
                // text as the requested query once the load lands.
                if self.pager.is_busy() {
                    self.notice = Some("Still loading, try again in a moment".to_string());
                } else {
                    self.mode = InputMode::Query;
                }
            }
            Action::ExitQueryMode => {
                self.revert_query();
                self.mode = InputMode::Normal;
            }
            Action::QueryInput(c) => {
                let mut query = self.pager.view().query.unwrap_or_default().to_string();
                query.push(c);
                self.pager.update_query(query);
            }
            Action::QueryPaste(text) => {
                let mut query = self.pager.view().query.unwrap_or_default().to_string();
                query.push_str(text.trim_end_matches(['\n', '\r']));
                self.pager.update_query(query);
            }
            Action::QueryBackspace => {
                let mut query = self.pager.view().query.unwrap_or_default().to_string();
                query.pop();
                self.pager.update_query(query);
            }
            Action::SubmitQuery => {
                let view = self.pager.view();
                let submitted = view
                    .can_submit()
                    .then(|| PageRequest::new(view.query.unwrap_or_default(), 1));
                match submitted {
                    Some(Ok(request)) => {
                        self.selected = 0;
                        self.pager.set_request(request);
                    }
                    Some(Err(e)) => {
                        self.error = Some(e.to_string());
                        self.revert_query();
                    }
                    None => self.revert_query(),
                }
                self.mode = InputMode::Normal;
            }

            Action::EnterGotoMode => {
                if self.pager.view().result.is_some() {
                    self.goto_input.clear();
                    self.mode = InputMode::GotoPage;
                }
            }
            Action::ExitGotoMode => {
                self.goto_input.clear();
                self.mode = InputMode::Normal;
            }
            Action::GotoInput(c) => {
                if self.goto_input.len() < 9 {
                    self.goto_input.push(c);
                }
            }
            Action::GotoBackspace => {
                self.goto_input.pop();
            }
            Action::GotoConfirm => {
                let input = std::mem::take(&mut self.goto_input);
                self.mode = InputMode::Normal;
                let total = self.pager.view().total_pages.unwrap_or(1);
                match input.parse::<u32>() {
                    Ok(page) if (1..=total).contains(&page) => self.go_to_page(page),
                    _ => {
                        self.error = Some(format!("Page must be between 1 and {}", total));
                    }
                }
            }

            Action::OpenInBrowser => {
                if let Some(url) = self.selected_url() {
                    if let Err(e) = open::that(&url) {
                        self.error = Some(format!("Could not open browser: {}", e));
                    }
                }
            }
            Action::YankUrl => {
                if let Some(url) = self.selected_url() {
                    match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(url.clone())) {
                        Ok(()) => self.notice = Some(format!("Copied {}", url)),
                        Err(e) => self.error = Some(format!("Clipboard unavailable: {}", e)),
                    }
                }
            }

            Action::SearchCompleted(completion) => {
                let before = self.page_key();
                self.pager.complete(completion);
                if self.page_key() != before {
                    self.selected = 0;
                }
            }
            Action::Retry => {
                self.error = None;
                self.pager.retry();
            }
            Action::DismissError => {
                self.error = None;
                self.pager.dismiss_error();
            }

            Action::None => {}
        }
    }

    pub fn users(&self) -> &[User] {
        self.pager
            .state()
            .search
            .result
            .as_ref()
            .map(|r| r.users.as_slice())
            .unwrap_or_default()
    }

    fn selected_url(&self) -> Option<String> {
        if !self.pager.view().show_result_items() {
            return None;
        }
        self.users()
            .get(self.selected)
            .map(|u| u.url.clone())
            .filter(|url| !url.is_empty())
    }

    /// Page the next relative move starts from: the latest request, which may
    /// be ahead of what is on screen while a load is out.
    fn target_page(&self) -> Option<u32> {
        self.pager.request().map(|r| r.page)
    }

    fn go_to_page(&mut self, page: u32) {
        let Some(request) = self.pager.request() else {
            return;
        };
        let total = self.pager.view().total_pages.unwrap_or(1);
        if page < 1 || page > total || page == request.page {
            return;
        }
        debug!(page, "page navigation");
        if let Ok(next) = PageRequest::new(request.query.clone(), page) {
            self.pager.set_request(next);
        }
    }

    /// Put the query box back to the query being paged. Unsubmitted text
    /// would otherwise be recorded as searched when the next shift lands.
    fn revert_query(&mut self) {
        let Some(query) = self.pager.request().map(|r| r.query.clone()) else {
            return;
        };
        if self.pager.view().query != Some(query.as_str()) {
            self.pager.update_query(query);
        }
    }

    fn page_key(&self) -> (u32, Option<String>) {
        let state = self.pager.state();
        (
            state.pagination.current_page,
            state.search.previous_requested_query.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::fake::{cursor, Call, FakeBackend};
    use crate::backend::PageWindow;
    use crate::engine::Completion;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn app(backend: FakeBackend) -> (App, mpsc::UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(Pager::new(Arc::new(backend), tx)), rx)
    }

    fn app_on(backend: &Arc<FakeBackend>) -> (App, mpsc::UnboundedReceiver<Completion>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let backend: Arc<FakeBackend> = Arc::clone(backend);
        (App::new(Pager::new(backend, tx)), rx)
    }

    async fn drain(app: &mut App, rx: &mut mpsc::UnboundedReceiver<Completion>) {
        while app.pager.is_busy() {
            let completion = rx.recv().await.unwrap();
            app.update(Action::SearchCompleted(completion));
        }
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    async fn search(app: &mut App, rx: &mut mpsc::UnboundedReceiver<Completion>, query: &str) {
        app.update(Action::EnterQueryMode);
        for c in query.chars() {
            app.update(Action::QueryInput(c));
        }
        app.update(Action::SubmitQuery);
        drain(app, rx).await;
    }

    #[test]
    fn keys_route_by_mode() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut app = App::new(Pager::new(Arc::new(FakeBackend::new()), tx));

        assert!(matches!(app.handle_event(key(KeyCode::Char('l'))), Action::NextPage));
        assert!(matches!(app.handle_event(key(KeyCode::Char(':'))), Action::EnterGotoMode));

        app.mode = InputMode::Query;
        assert!(matches!(
            app.handle_event(key(KeyCode::Char('l'))),
            Action::QueryInput('l')
        ));
        assert!(matches!(app.handle_event(key(KeyCode::Enter)), Action::SubmitQuery));

        app.mode = InputMode::GotoPage;
        assert!(matches!(app.handle_event(key(KeyCode::Char('7'))), Action::GotoInput('7')));
        assert!(matches!(app.handle_event(key(KeyCode::Char('x'))), Action::None));
    }

    #[test]
    fn init_without_request_opens_query_box() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let app = App::new(Pager::new(Arc::new(FakeBackend::new()), tx));
        assert!(matches!(app.handle_event(Event::Init), Action::EnterQueryMode));
    }

    #[tokio::test]
    async fn typing_and_submitting_loads_first_page() {
        let (mut app, mut rx) = app(FakeBackend::new().with_query("salvo", 45));

        search(&mut app, &mut rx, "salvo").await;

        assert_eq!(app.mode, InputMode::Normal);
        assert_eq!(app.users().len(), 20);
        assert_eq!(app.pager.view().total_pages, Some(3));
        assert!(!app.pager.view().can_submit());
    }

    #[tokio::test]
    async fn unchanged_query_is_not_resubmitted() {
        let (mut app, mut rx) = app(FakeBackend::new().with_query("salvo", 45));
        search(&mut app, &mut rx, "salvo").await;
        let request = app.pager.request().cloned();

        app.update(Action::EnterQueryMode);
        app.update(Action::SubmitQuery);

        assert!(!app.pager.is_busy());
        assert_eq!(app.pager.request().cloned(), request);
    }

    #[tokio::test]
    async fn paging_is_bounded_by_total_pages() {
        let (mut app, mut rx) = app(FakeBackend::new().with_query("salvo", 45));
        search(&mut app, &mut rx, "salvo").await;

        app.update(Action::PrevPage);
        assert!(!app.pager.is_busy());

        app.update(Action::LastPage);
        drain(&mut app, &mut rx).await;
        assert_eq!(app.pager.state().pagination.current_page, 3);

        app.update(Action::NextPage);
        assert!(!app.pager.is_busy());

        app.update(Action::FirstPage);
        drain(&mut app, &mut rx).await;
        assert_eq!(app.pager.state().pagination.current_page, 1);
    }

    #[tokio::test]
    async fn goto_prompt_validates_range() {
        let (mut app, mut rx) = app(FakeBackend::new().with_query("salvo", 220));
        search(&mut app, &mut rx, "salvo").await;

        app.update(Action::EnterGotoMode);
        app.update(Action::GotoInput('9'));
        app.update(Action::GotoInput('9'));
        app.update(Action::GotoConfirm);
        assert!(app.error.is_some());
        assert!(!app.pager.is_busy());

        app.update(Action::DismissError);
        app.update(Action::EnterGotoMode);
        app.update(Action::GotoInput('7'));
        app.update(Action::GotoConfirm);
        drain(&mut app, &mut rx).await;
        assert_eq!(app.pager.state().pagination.current_page, 7);
        assert_eq!(app.users()[0].login, "user121");
    }

    #[tokio::test]
    async fn selection_resets_when_page_changes() {
        let (mut app, mut rx) = app(FakeBackend::new().with_query("salvo", 220));
        search(&mut app, &mut rx, "salvo").await;
        app.update(Action::ScrollDown);
        app.update(Action::ScrollDown);
        assert_eq!(app.selected, 2);

        app.update(Action::NextPage);
        drain(&mut app, &mut rx).await;
        assert_eq!(app.selected, 0);
    }

    #[tokio::test]
    async fn query_box_locked_while_loading() {
        let (mut app, _rx) = app(FakeBackend::new().with_query("salvo", 220));
        app.pager
            .set_request(PageRequest::new("salvo", 1).unwrap());

        app.update(Action::EnterQueryMode);

        assert_eq!(app.mode, InputMode::Normal);
        assert!(app.notice.is_some());
    }

    #[tokio::test]
    async fn abandoned_edit_does_not_leak_into_paging() {
        let backend = Arc::new(FakeBackend::new().with_query("salvo", 220));
        let (mut app, mut rx) = app_on(&backend);
        search(&mut app, &mut rx, "salvo").await;
        backend.clear_calls();

        app.update(Action::EnterQueryMode);
        app.update(Action::QueryInput(' '));
        app.update(Action::QueryInput('x'));
        app.update(Action::ExitQueryMode);
        assert_eq!(app.pager.view().query, Some("salvo"));

        app.update(Action::NextPage);
        drain(&mut app, &mut rx).await;

        assert_eq!(
            backend.calls(),
            vec![Call::Search {
                query: "salvo".into(),
                window: PageWindow::Forward {
                    first: 20,
                    after: Some(cursor(20)),
                },
            }]
        );
        let state = app.pager.state();
        assert_eq!(state.pagination.current_page, 2);
        assert_eq!(state.search.query.as_deref(), Some("salvo"));
        assert_eq!(state.search.previous_requested_query.as_deref(), Some("salvo"));
    }

    #[tokio::test]
    async fn blank_submit_restores_the_active_query() {
        let (mut app, mut rx) = app(FakeBackend::new().with_query("salvo", 45));
        search(&mut app, &mut rx, "salvo").await;

        app.update(Action::EnterQueryMode);
        for _ in 0.."salvo".len() {
            app.update(Action::QueryBackspace);
        }
        app.update(Action::SubmitQuery);

        assert_eq!(app.mode, InputMode::Normal);
        assert!(!app.pager.is_busy());
        assert_eq!(app.pager.view().query, Some("salvo"));
        assert!(!app.pager.view().query_has_changed());
    }
}
