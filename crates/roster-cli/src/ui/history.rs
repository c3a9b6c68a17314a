//! Recently viewed students, shown while there are no results.

use chrono::Utc;
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::app::{Focus, View};

pub fn draw(f: &mut Frame, area: Rect, view: &View) {
  let history = &view.search.history;
  let focused = view.focus == Focus::History;

  let block = Block::default()
    .title(format!(" Recent ({}) ", history.len()))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }));

  let now = Utc::now();
  let width = area.width.saturating_sub(2) as usize;

  let items: Vec<ListItem> = history
    .iter()
    .map(|item| {
      let age = item.age_label(now);
      let left = format!("{:<12}{}", item.student.student_id, item.student.name);
      let pad = width.saturating_sub(left.chars().count() + age.len()).max(1);
      ListItem::new(Line::from(vec![
        Span::raw(left),
        Span::raw(" ".repeat(pad)),
        Span::styled(age, Style::default().fg(Color::DarkGray)),
      ]))
    })
    .collect();

  let mut state = ListState::default();
  state.select((focused && !history.is_empty()).then_some(view.history_cursor));

  f.render_stateful_widget(
    List::new(items).block(block).highlight_style(
      Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD),
    ),
    area,
    &mut state,
  );
}
