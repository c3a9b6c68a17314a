//! Profile pane for the selected student.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Borders, Paragraph, Wrap},
};
use roster_core::student::StudentRecord;

use crate::app::View;

// ─── Public entry ─────────────────────────────────────────────────────────────

/// Render the selected student into `area`.
pub fn draw(f: &mut Frame, area: Rect, view: &View) {
  let Some(student) = &view.search.selected else {
    return;
  };

  let block = Block::default()
    .title(format!(" {} ", student.name))
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Cyan));

  let lines: Vec<Line> = profile_rows(student)
    .into_iter()
    .map(|(label, value)| {
      Line::from(vec![
        Span::styled(
          format!("{label:<16}"),
          Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
        ),
        Span::raw(value),
      ])
    })
    .collect();

  f.render_widget(
    Paragraph::new(lines)
      .block(block)
      .wrap(Wrap { trim: false })
      .scroll((view.profile_scroll, 0)),
    area,
  );
}

// ─── Field formatting ─────────────────────────────────────────────────────────

/// `(label, value)` rows in display order. Absent optional fields are left
/// out; the birth date always shows.
fn profile_rows(s: &StudentRecord) -> Vec<(&'static str, String)> {
  let optional = [
    ("CPR", &s.cpr_no),
    ("Email", &s.email),
    ("Personal email", &s.personal_email),
    ("Mobile", &s.mobile),
    ("Gender", &s.gender),
    ("Citizenship", &s.citizenship),
    ("College", &s.college),
    ("Major", &s.major),
  ];

  let mut rows = vec![("Student ID", s.student_id.clone())];
  rows.extend(
    optional
      .into_iter()
      .filter_map(|(label, value)| {
        let value = value.as_deref()?.trim();
        (!value.is_empty()).then(|| (label, value.to_string()))
      }),
  );
  rows.push(("Birth date", s.birth_date_display()));
  if let Some(address) = s.address() {
    rows.push(("Address", address));
  }
  if let Some(picture) = s.profile_picture.as_deref().filter(|p| !p.trim().is_empty()) {
    rows.push(("Photo", picture.to_string()));
  }
  rows
}
