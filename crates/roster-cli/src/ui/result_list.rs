//! Result list pane.

use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::app::View;

/// Render the current results into `area`.
pub fn draw(f: &mut Frame, area: Rect, view: &View) {
  let results = &view.search.results;

  let block = Block::default()
    .title(format!(" Results ({}) ", results.count))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let matcher = SkimMatcherV2::default();
  let query = view.search.query.trim();

  let items: Vec<ListItem> = results
    .students
    .iter()
    .map(|student| {
      let mut spans = vec![Span::styled(
        format!("{:<12}", student.student_id),
        Style::default().fg(Color::Cyan),
      )];
      spans.extend(highlighted(&matcher, &student.name, query));
      if let Some(major) = &student.major {
        spans.push(Span::styled(
          format!("  {major}"),
          Style::default().fg(Color::DarkGray),
        ));
      }
      ListItem::new(Line::from(spans))
    })
    .collect();

  let mut state = ListState::default();
  state.select((!results.students.is_empty()).then_some(view.result_cursor));

  f.render_stateful_widget(
    List::new(items)
      .block(block)
      .highlight_style(
        Style::default()
          .bg(Color::Blue)
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      ),
    area,
    &mut state,
  );
}

/// `text` split into spans, with the characters the query matched in bold
/// yellow.
fn highlighted(matcher: &SkimMatcherV2, text: &str, query: &str) -> Vec<Span<'static>> {
  let indices = if query.is_empty() {
    Vec::new()
  } else {
    matcher
      .fuzzy_indices(text, query)
      .map(|(_, indices)| indices)
      .unwrap_or_default()
  };

  if indices.is_empty() {
    return vec![Span::raw(text.to_string())];
  }

  let hit = Style::default()
    .fg(Color::Yellow)
    .add_modifier(Modifier::BOLD);
  text
    .chars()
    .enumerate()
    .map(|(i, c)| {
      if indices.contains(&i) {
        Span::styled(c.to_string(), hit)
      } else {
        Span::raw(c.to_string())
      }
    })
    .collect()
}
