use std::ops::Range;

use quill::{
    segment::segment_spans,
    session::{Session, BASE_MINUTES, MAX_EXTRA_MINUTES},
    util::format_time,
    LimitStatus,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

/// Remaining time at or below which the timer is drawn as a warning.
const TIME_WARNING_SECS: u64 = 5 * 60;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match (self.state, &self.session) {
            (AppState::Writing, Some(session)) => render_writing(self, session, area, buf),
            (AppState::ConfirmFinish, Some(session)) => {
                render_writing(self, session, area, buf);
                render_confirm(area, buf);
            }
            (AppState::Results, Some(session)) => render_results(self, session, area, buf),
            _ => render_home(self, area, buf),
        }
    }
}

fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn italic_dim() -> Style {
    Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::ITALIC)
}

fn status_style(status: &LimitStatus) -> Style {
    match status {
        LimitStatus::AtHardLimit => bold().fg(Color::Red),
        s if s.is_warning() => Style::default().fg(Color::Yellow),
        _ => Style::default().fg(Color::Green),
    }
}

fn timer_style(seconds_remaining: u64) -> Style {
    match seconds_remaining {
        0 => bold().fg(Color::Red),
        s if s <= TIME_WARNING_SECS => bold().fg(Color::Yellow),
        _ => bold(),
    }
}

fn render_home(app: &App, area: Rect, buf: &mut Buffer) {
    let cfg = &app.config;
    let extra_minutes = cfg.effective_extra_minutes();
    let total_secs = (BASE_MINUTES + u64::from(extra_minutes)) * 60;

    let mut lines = vec![
        Line::from(Span::styled("quill", bold().fg(Color::Cyan))),
        Line::from(""),
        Line::from(vec![
            Span::raw(format!("writing time: {BASE_MINUTES} min + ")),
            Span::styled(
                format!("{extra_minutes}"),
                bold().add_modifier(Modifier::UNDERLINED),
            ),
            Span::raw(format!(" extra min = {}", format_time(total_secs))),
        ]),
        Line::from(format!(
            "lines: at least {}, up to {} recommended, never more than {}",
            cfg.min_lines, cfg.max_lines, cfg.hard_limit
        )),
        Line::from(format!("{} characters per line", cfg.line_capacity)),
        Line::from(""),
        Line::from(Span::styled(
            format!("type digits or use ↑/↓ to set extra minutes (0-{MAX_EXTRA_MINUTES})"),
            italic_dim(),
        )),
    ];
    if let Some(message) = &app.status_message {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(area);

    let height = lines.len() as u16;
    let top = chunks[0].height.saturating_sub(height) / 2;
    let body = Rect {
        y: chunks[0].y + top,
        height: height.min(chunks[0].height),
        ..chunks[0]
    };

    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .render(body, buf);

    Paragraph::new(Span::styled(
        "(enter) start / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[1], buf);
}

fn render_writing(app: &App, session: &Session, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1), // toolbar and timer
            Constraint::Min(3),    // paper
            Constraint::Length(1), // line status
        ])
        .split(area);

    let dim = Style::default().add_modifier(Modifier::DIM);
    let enabled = |on: bool| if on { Style::default() } else { dim };
    let has_selection = !session.selection().is_empty();
    let has_clipboard = session.clipboard().is_some_and(|c| !c.is_empty());

    let toolbar = Line::from(vec![
        Span::styled("F2 copy", enabled(has_selection)),
        Span::raw("  "),
        Span::styled("F3 paste", enabled(has_clipboard)),
        Span::raw("  "),
        Span::styled("F4 underline", enabled(has_selection)),
        Span::raw("  "),
        Span::raw("F10 finish"),
    ]);
    Paragraph::new(toolbar).render(chunks[0], buf);

    let remaining = session.seconds_remaining();
    Paragraph::new(Span::styled(format_time(remaining), timer_style(remaining)))
        .alignment(Alignment::Right)
        .render(chunks[0], buf);

    render_paper(session, chunks[1], buf);

    let status = session.limit_status();
    let mut status_line = vec![
        Span::styled(format!("{} lines", session.line_count()), bold()),
        Span::raw("  "),
        Span::styled(status.to_string(), status_style(&status)),
    ];
    if let Some(message) = &app.status_message {
        status_line.push(Span::raw("  "));
        status_line.push(Span::styled(message.clone(), italic_dim()));
    }
    Paragraph::new(Line::from(status_line)).render(chunks[2], buf);
}

fn render_paper(session: &Session, area: Rect, buf: &mut Buffer) {
    let thresholds = session.config().thresholds;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" paper, {} chars per line ", session.config().capacity.get()));
    let inner = block.inner(area);
    block.render(area, buf);
    if inner.height == 0 || inner.width == 0 {
        return;
    }

    let text = session.text();
    let spans = segment_spans(text, session.config().capacity);
    let (cursor_row, cursor_col) = cursor_position(text, &spans, session.cursor());

    let visible = inner.height as usize;
    let scroll = (cursor_row + 1).saturating_sub(visible);
    let gutter = thresholds.hard_limit().max(spans.len()).to_string().len() + 1;
    let selection = session.selection().range();
    let selected = Style::default().add_modifier(Modifier::REVERSED);

    let lines: Vec<Line> = spans
        .iter()
        .enumerate()
        .skip(scroll)
        .take(visible)
        .map(|(idx, span)| {
            let number = idx + 1;
            let number_style = if number > thresholds.max_lines() {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let mut parts = vec![Span::styled(
                format!("{number:>width$} ", width = gutter),
                number_style,
            )];
            parts.extend(
                split_at_selection(span, &selection)
                    .into_iter()
                    .filter(|(part, _)| !part.is_empty())
                    .map(|(part, is_selected)| {
                        let style = if is_selected { selected } else { Style::default() };
                        Span::styled(&text[part], style)
                    }),
            );
            Line::from(parts)
        })
        .collect();

    Paragraph::new(lines).render(inner, buf);

    let x = inner.x as usize + gutter + 1 + cursor_col;
    let y = inner.y as usize + cursor_row - scroll;
    if x < (inner.x + inner.width) as usize && y < (inner.y + inner.height) as usize {
        if let Some(cell) = buf.cell_mut((x as u16, y as u16)) {
            cell.set_style(Style::default().add_modifier(Modifier::REVERSED));
        }
    }
}

/// Row and display column of the byte offset `cursor` on the wrapped paper.
fn cursor_position(text: &str, spans: &[Range<usize>], cursor: usize) -> (usize, usize) {
    let Some(row) = spans.iter().rposition(|span| span.start <= cursor) else {
        return (0, 0);
    };
    let span = &spans[row];
    if cursor > span.end && text[span.end..cursor].contains('\n') && row + 1 < spans.len() {
        // leading spaces of the next paragraph are not on the paper
        return (row + 1, 0);
    }
    let end = cursor.min(span.end);
    (row, text[span.start..end].width())
}

/// Cut `line` into before/inside/after the selection.
fn split_at_selection(
    line: &Range<usize>,
    selection: &Range<usize>,
) -> [(Range<usize>, bool); 3] {
    let start = selection.start.clamp(line.start, line.end);
    let end = selection.end.clamp(start, line.end);
    [
        (line.start..start, false),
        (start..end, true),
        (end..line.end, false),
    ]
}

fn render_confirm(area: Rect, buf: &mut Buffer) {
    let popup = centered_rect(52, 5, area);
    Clear.render(popup, buf);
    Paragraph::new(vec![
        Line::from("Finish now? The essay can no longer be edited."),
        Line::from(""),
        Line::from(Span::styled(
            "(y)es / (n)o",
            Style::default().add_modifier(Modifier::ITALIC),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(Block::default().borders(Borders::ALL).title(" finish "))
    .render(popup, buf);
}

fn render_results(app: &App, session: &Session, area: Rect, buf: &mut Buffer) {
    let Some(report) = session.report() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1), // title
            Constraint::Length(1), // totals
            Constraint::Min(3),    // per-line table
            Constraint::Length(1), // legend
        ])
        .split(area);

    Paragraph::new(Span::styled("results", bold().fg(Color::Cyan)))
        .alignment(Alignment::Center)
        .render(chunks[0], buf);

    Paragraph::new(Line::from(vec![
        Span::styled(
            format!("{} lines   {} words   ", report.total_lines, report.total_words),
            bold(),
        ),
        Span::styled(report.status.to_string(), status_style(&report.status)),
    ]))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    let header = Row::new(vec![
        Cell::from("line"),
        Cell::from("words"),
        Cell::from("chars"),
    ])
    .style(bold().fg(Color::Yellow));

    let table_height = chunks[2].height.saturating_sub(3) as usize;
    let rows: Vec<Row> = report
        .per_line
        .iter()
        .skip(app.results_scroll)
        .take(table_height)
        .map(|line| {
            Row::new(vec![
                Cell::from(line.line_number.to_string()),
                Cell::from(line.word_count.to_string()),
                Cell::from(line.char_count.to_string()),
            ])
        })
        .collect();

    let scroll_info = if report.per_line.len() > table_height {
        format!(
            " ({}/{} lines)",
            (app.results_scroll + table_height).min(report.per_line.len()),
            report.per_line.len()
        )
    } else {
        String::new()
    };

    Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(8),
            Constraint::Length(8),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!("per line{scroll_info}")),
    )
    .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        "(↑/↓) scroll / (n)ew session / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[3], buf);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
