use crate::engine::Completion;

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    Tick,
    ScrollUp,
    ScrollDown,

    // Paging
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,

    // Query box
    EnterQueryMode,
    ExitQueryMode,
    QueryInput(char),
    QueryPaste(String),
    QueryBackspace,
    SubmitQuery,

    // Go-to-page prompt
    EnterGotoMode,
    ExitGotoMode,
    GotoInput(char),
    GotoBackspace,
    GotoConfirm,

    // Selected user
    OpenInBrowser,
    YankUrl,

    // Engine
    SearchCompleted(Completion),
    Retry,
    DismissError,

    None,
}

