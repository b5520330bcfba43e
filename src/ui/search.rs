use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::app::{App, InputMode};
use crate::types::User;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_query_box(frame, app, chunks[0]);
    render_found(frame, app, chunks[1]);
    render_users(frame, app, chunks[2]);
    render_page_bar(frame, app, chunks[3]);
}

fn render_query_box(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.pager.view();
    let editing = app.mode == InputMode::Query;
    let query = view.query.unwrap_or_default();

    let mut spans = vec![Span::raw(query.to_string())];
    if editing {
        spans.push(Span::styled(
            "_",
            Style::default().add_modifier(Modifier::SLOW_BLINK),
        ));
    }
    if view.can_submit() {
        spans.push(Span::styled(
            "  (Enter to search)",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let border = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let input = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title("Search users"),
    );
    frame.render_widget(input, area);
}

fn render_found(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.pager.view();
    let line = match view.result {
        Some(result) if !view.is_fetching_new_query() => Line::from(Span::styled(
            result.found_label(),
            Style::default().fg(Color::Green),
        )),
        _ => Line::from(""),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_users(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.pager.view();
    let block = Block::default().borders(Borders::ALL);

    if view.is_busy() || !view.show_result_items() {
        let spinner = SPINNER[app.spinner_frame % SPINNER.len()];
        let fetching = Paragraph::new(format!("{} FETCHING...", spinner))
            .block(block)
            .style(Style::default().fg(Color::Yellow));
        frame.render_widget(fetching, area);
        return;
    }

    let users = app.users();
    if users.is_empty() {
        let hint = if view.result.is_some() {
            "No users match this query"
        } else {
            "Press / to search"
        };
        let empty = Paragraph::new(hint)
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, area);
        return;
    }

    let width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = users
        .iter()
        .enumerate()
        .map(|(i, user)| user_card(user, i == app.selected, width))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    state.select(Some(app.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn user_card(user: &User, selected: bool, width: usize) -> ListItem<'static> {
    let title_style = if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };
    let dim = Style::default().fg(Color::DarkGray);

    let mut title = vec![Span::styled(user.login.clone(), title_style)];
    if let Some(name) = user.name.as_deref().filter(|n| !n.is_empty()) {
        title.push(Span::raw(format!("  {}", name)));
    }
    if let Some(email) = user.email.as_deref().filter(|e| !e.is_empty()) {
        title.push(Span::styled(format!("  <{}>", email), dim));
    }

    let stats = Line::from(vec![
        Span::styled(
            format!(
                "  {} followers  {} following  ★ {}",
                user.followers, user.following, user.starred_repositories
            ),
            dim,
        ),
    ]);

    let mut lines = vec![Line::from(title)];
    if let Some(bio) = user.bio_text() {
        lines.push(Line::from(Span::styled(
            format!("  {}", truncate(&bio, width.saturating_sub(2))),
            Style::default().fg(Color::Gray),
        )));
    }
    lines.push(stats);

    ListItem::new(lines)
}

fn render_page_bar(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.pager.view();
    let Some(total) = view.total_pages.filter(|_| !view.is_fetching_new_query()) else {
        frame.render_widget(Paragraph::new(""), area);
        return;
    };

    let page = view.requested_page;
    let arrow = |enabled: bool, glyph: &'static str| {
        let style = if enabled {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(glyph, style)
    };

    let line = Line::from(vec![
        arrow(page > 1, "◀ "),
        Span::raw(format!("page {} / {}", page, total)),
        arrow(page < total, " ▶"),
    ]);
    frame.render_widget(
        Paragraph::new(line).alignment(ratatui::layout::Alignment::Center),
        area,
    );
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}
