//! Image list screen rendering
//!
//! Renders the main view: every image URL with where it resolved to (local
//! cache file or remote fallback), details for the selected entry, and a
//! footer with key hints.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, AppState, EntryStatus, ImageEntry};

/// Status to icon mapping
fn status_icon(status: &EntryStatus) -> &'static str {
    match status {
        EntryStatus::Pending => "\u{23F3}",   // ⏳
        EntryStatus::Cached(_) => "\u{1F4BE}", // 💾
        EntryStatus::Remote => "\u{1F310}",    // 🌐
    }
}

fn status_color(status: &EntryStatus) -> Color {
    match status {
        EntryStatus::Pending => Color::DarkGray,
        EntryStatus::Cached(_) => Color::Green,
        EntryStatus::Remote => Color::Yellow,
    }
}

fn status_label(status: &EntryStatus) -> &'static str {
    match status {
        EntryStatus::Pending => "resolving",
        EntryStatus::Cached(_) => "cached",
        EntryStatus::Remote => "remote",
    }
}

/// Renders the image list screen
pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_list(frame, app, chunks[0]);
    render_selected(frame, app, chunks[1]);
    render_footer(frame, app, chunks[2]);
}

fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.state {
        AppState::Loading => " imgdock - resolving images... ".to_string(),
        AppState::Browsing => format!(" imgdock - {} images ", app.entries.len()),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if app.entries.is_empty() {
        let empty = Paragraph::new("No image URLs given. Pass URLs or --urls-file.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    // Keep the selection visible when the list is taller than the area
    let visible = area.height.saturating_sub(2) as usize;
    let offset = if visible == 0 {
        0
    } else {
        app.selected_index.saturating_sub(visible - 1)
    };

    let lines: Vec<Line> = app
        .entries
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, entry)| entry_line(entry, i == app.selected_index))
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn entry_line(entry: &ImageEntry, selected: bool) -> Line<'static> {
    let marker = if selected { "\u{25B6} " } else { "  " };
    let url_style = if selected {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::raw(marker),
        Span::raw(format!("{} ", status_icon(&entry.status))),
        Span::styled(
            format!("{:<10}", status_label(&entry.status)),
            Style::default().fg(status_color(&entry.status)),
        ),
        Span::styled(entry.url.clone(), url_style),
    ])
}

fn render_selected(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(" Source ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let lines = match app.selected_entry() {
        Some(entry) => vec![Line::from(vec![
            Span::styled(
                format!("{}: ", status_label(&entry.status)),
                Style::default().fg(status_color(&entry.status)),
            ),
            Span::raw(entry.source().to_string()),
        ])],
        None => vec![Line::from("")],
    };

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        " j/k move  r reload  c clear  d dock  ? help  q quit",
        Style::default().fg(Color::DarkGray),
    )];
    if let Some(message) = &app.status_message {
        spans.push(Span::styled(
            format!("  {}", message),
            Style::default().fg(Color::Yellow),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::LoadMessage;
    use ratatui::{backend::TestBackend, Terminal};

    fn render_to_string(app: &App) -> String {
        let backend = TestBackend::new(100, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_renders_urls_and_statuses() {
        let mut app = App::new(
            vec![
                "https://img.example.com/a.png".to_string(),
                "https://other.net/b.png".to_string(),
            ],
            "example.com",
        );
        app.apply(LoadMessage::Resolved {
            index: 0,
            source: "file:///cache/a.png".to_string(),
        });
        app.apply(LoadMessage::Resolved {
            index: 1,
            source: "https://other.net/b.png".to_string(),
        });
        app.apply(LoadMessage::Completed);

        let content = render_to_string(&app);

        assert!(content.contains("2 images"));
        assert!(content.contains("img.example.com/a.png"));
        assert!(content.contains("cached"));
        assert!(content.contains("remote"));
        assert!(content.contains("/cache/a.png"), "selected source is shown");
    }

    #[test]
    fn test_renders_loading_title() {
        let app = App::new(vec!["https://img.example.com/a.png".to_string()], "");
        let content = render_to_string(&app);
        assert!(content.contains("resolving images"));
    }

    #[test]
    fn test_renders_empty_hint() {
        let app = App::new(Vec::new(), "");
        let content = render_to_string(&app);
        assert!(content.contains("No image URLs given"));
    }

    #[test]
    fn test_footer_shows_status_message() {
        let mut app = App::new(Vec::new(), "");
        app.status_message = Some("Removed 4 cached files".to_string());
        let content = render_to_string(&app);
        assert!(content.contains("Removed 4 cached files"));
    }
}
