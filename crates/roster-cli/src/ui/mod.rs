//! TUI rendering — orchestrates all panes.

pub mod history;
pub mod result_list;
pub mod student_profile;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};
use roster_core::access::APP_DENIED_MESSAGE;
use roster_search::SearchPhase;

use crate::app::{Focus, Screen, View};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, view: &View) {
  let area = f.area();

  if view.screen() == Screen::Denied {
    draw_denied(f, area);
    return;
  }

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], view);
  match view.screen() {
    Screen::Profile => student_profile::draw(f, rows[1], view),
    _ => draw_search(f, rows[1], view),
  }
  draw_status(f, rows[2], view);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, view: &View) {
  let date = Local::now().format("%Y-%m-%d").to_string();

  let left = Span::styled(
    format!(" roster  {}", view.caller),
    Style::default()
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );
  let right = Span::styled(format!("{date} "), Style::default().fg(Color::Gray));

  let pad = area
    .width
    .saturating_sub(left.width() as u16)
    .saturating_sub(right.width() as u16);

  let line = Line::from(vec![left, Span::raw(" ".repeat(pad as usize)), right]);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  let inner = block.inner(area);
  f.render_widget(block, area);
  f.render_widget(Paragraph::new(line), inner);
}

// ─── Search screen ────────────────────────────────────────────────────────────

fn draw_search(f: &mut Frame, area: Rect, view: &View) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(3), Constraint::Min(0)])
    .split(area);

  draw_input(f, rows[0], view);

  if let Some(error) = &view.search.error {
    draw_message(f, rows[1], error, Color::Red);
  } else if !view.search.results.is_empty() {
    result_list::draw(f, rows[1], view);
  } else if view.history_visible() {
    history::draw(f, rows[1], view);
  } else {
    let hint = match view.search.phase {
      SearchPhase::Success => "No students found.",
      _ if view.input.trim().is_empty() => "Type a name or student ID.  Ctrl-B lists everyone.",
      _ => "",
    };
    draw_message(f, rows[1], hint, Color::DarkGray);
  }
}

fn draw_input(f: &mut Frame, area: Rect, view: &View) {
  let title = if view.search.loading { " Search (searching…) " } else { " Search " };
  let border = if view.focus == Focus::Results { Color::Cyan } else { Color::DarkGray };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let text = Line::from(vec![
    Span::raw(view.input.clone()),
    Span::styled("_", Style::default().fg(Color::Yellow)),
  ]);
  f.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_message(f: &mut Frame, area: Rect, message: &str, color: Color) {
  let block = Block::default()
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));
  f.render_widget(
    Paragraph::new(message.to_string())
      .style(Style::default().fg(color))
      .wrap(Wrap { trim: true })
      .block(block),
    area,
  );
}

// ─── Denied ───────────────────────────────────────────────────────────────────

fn draw_denied(f: &mut Frame, area: Rect) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Percentage(40),
      Constraint::Length(4),
      Constraint::Min(0),
    ])
    .split(area);

  let lines = vec![
    Line::from(Span::styled(
      APP_DENIED_MESSAGE,
      Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
    Line::from(Span::styled(
      "Press any key to exit.",
      Style::default().fg(Color::DarkGray),
    )),
  ];
  f.render_widget(
    Paragraph::new(lines)
      .alignment(Alignment::Center)
      .wrap(Wrap { trim: true }),
    rows[1],
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, view: &View) {
  let (mode_label, hints) = match (view.screen(), view.focus) {
    (Screen::Profile, _) => ("PROFILE", "↑↓ scroll  Esc back  Ctrl-C quit"),
    (_, Focus::History) => (
      "HISTORY",
      "↑↓ navigate  Enter open  d remove  C clear  Tab/Esc back",
    ),
    _ if view.history_visible() => (
      "SEARCH",
      "Type to search  Tab history  Ctrl-B browse  Ctrl-C quit",
    ),
    _ => (
      "SEARCH",
      "Type to search  ↑↓ navigate  Enter open  Esc clear  Ctrl-C quit",
    ),
  };

  let status = match view.search.phase {
    SearchPhase::Success if view.screen() == Screen::Search => {
      format!("{} found  ·  {hints}", view.search.results.count)
    }
    _ => hints.to_string(),
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(format!("  {status}"), Style::default().fg(Color::DarkGray));

  f.render_widget(
    Paragraph::new(Line::from(vec![mode_span, hint_span]))
      .style(Style::default().bg(Color::Black)),
    area,
  );
}
