mod popup;
mod search;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, InputMode};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, chunks[0]);
    search::render(frame, app, chunks[1]);
    render_status_bar(frame, app, chunks[2]);

    if app.mode == InputMode::GotoPage {
        let total = app.pager.view().total_pages.unwrap_or(1);
        popup::render_goto(frame, &app.goto_input, total);
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let header = Paragraph::new(Line::from(vec![Span::styled(
        "scout - Search GitHub Users",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )]))
    .style(Style::default().bg(Color::DarkGray));

    frame.render_widget(header, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.pager.view();
    let status = if let Some(error) = app.error.as_deref().or(view.last_error) {
        Line::from(vec![
            Span::styled(format!("Error: {}", error), Style::default().fg(Color::Red)),
            Span::styled("  r: retry | Esc: dismiss", Style::default().fg(Color::Gray)),
        ])
    } else if let Some(notice) = &app.notice {
        Line::from(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Green),
        ))
    } else if view.is_busy() {
        Line::from(Span::styled(
            "Loading...",
            Style::default().fg(Color::Yellow),
        ))
    } else {
        let help = match app.mode {
            InputMode::Query => "type to edit | Enter: search | Esc: done",
            InputMode::GotoPage => "digits: page | Enter: go | Esc: cancel",
            InputMode::Normal => {
                "/: search | j/k: nav | h/l: page | H/L: first/last | :: go to | Enter: open | y: yank | q: quit"
            }
        };
        Line::from(Span::styled(help, Style::default().fg(Color::Gray)))
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}
