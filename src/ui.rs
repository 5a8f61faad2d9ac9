//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).  This makes it easy to change the
//! visual layout without touching the refresh engine.
//!
//! ## For contributors
//!
//! * The layout is a four-row split: header with season and countdown, tab
//!   bar, the table for the selected feed, and a one-line status bar.
//! * Cell text comes from [`crate::f1::tables`]; this module only decides
//!   widths and colours.
//! * [`ratatui`] is the TUI framework; see its docs for widget details.

use chrono::{DateTime, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};

use crate::app::App;
use crate::f1::tables::TableView;
use crate::f1::Feed;

/// Draw the complete UI for one frame.
///
/// Called once per tick from the main loop with the current time, so the
/// countdown and live markers advance without new data.
pub fn draw(app: &mut App, frame: &mut Frame, now: DateTime<Utc>) {
    let [header_area, tabs_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_header(app, frame, header_area, now);
    draw_tabs(app, frame, tabs_area);
    draw_table(app, frame, main_area, now);
    draw_status_bar(app, frame, status_area);
}

fn draw_header(app: &App, frame: &mut Frame, area: Rect, now: DateTime<Utc>) {
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " F1 Viewer ",
            Style::default()
                .fg(Color::White)
                .bg(Color::Red)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Season {}", app.season),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("  "),
        Span::styled(
            format!("Round {}", app.round),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled(app.countdown(now), Style::default().fg(Color::Yellow)),
    ]));
    frame.render_widget(header, area);
}

fn draw_tabs(app: &App, frame: &mut Frame, area: Rect) {
    let titles = Feed::ALL.iter().map(|f| {
        let style = if app.error(*f).is_some() {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        Line::styled(f.tab_title(), style)
    });

    let tabs = Tabs::new(titles)
        .select(app.tab)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

/// Render the selected feed, or its message when there is nothing to tabulate.
fn draw_table(app: &mut App, frame: &mut Frame, area: Rect, now: DateTime<Utc>) {
    let view = app.view(now);
    let block = Block::default()
        .title(format!(" {} ", view.title))
        .borders(Borders::ALL);

    if let Some(message) = &view.message {
        let text = Paragraph::new(message.as_str())
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(text, area);
        return;
    }

    let header = Row::new(view.header.iter().map(|h| Cell::from(*h)))
        .style(Style::default().add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let rows = view.rows.iter().enumerate().map(|(i, cells)| {
        let style = if Some(i) == view.marked {
            Style::default().fg(Color::Yellow)
        } else if cells.iter().any(|c| c.contains("LIVE")) {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Row::new(cells.iter().map(|c| Cell::from(c.as_str()))).style(style)
    });

    let table = Table::new(rows, column_widths(&view))
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(table, area, &mut app.table_state);
}

/// Size every column to its widest cell; the last one takes the rest.
fn column_widths(view: &TableView) -> Vec<Constraint> {
    let columns = view.header.len();
    (0..columns)
        .map(|col| {
            let widest = view
                .rows
                .iter()
                .filter_map(|r| r.get(col))
                .map(|c| Span::raw(c.as_str()).width())
                .chain(std::iter::once(view.header[col].len()))
                .max()
                .unwrap_or(0);
            if col + 1 == columns {
                Constraint::Min(widest as u16)
            } else {
                Constraint::Length(widest as u16)
            }
        })
        .collect()
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::raw("q: quit  ←/→: tabs  ↑/↓: scroll  [/]: season  Enter: results  r/R: refresh tab/all"),
    ]));
    frame.render_widget(status, area);
}
