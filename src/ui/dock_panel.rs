//! Floating dock panel
//!
//! A small cache summary drawn on top of the list at the position kept by
//! `App::dock`. The panel measures itself from its content so the dock can be
//! placed once the size is known.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::dock::Size;

/// Human-readable byte count
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn panel_lines(app: &App) -> Vec<Line<'static>> {
    let (cached, remote, pending) = app.status_counts();
    let label = Style::default().fg(Color::DarkGray);

    let (files, size) = match &app.stats {
        Some(stats) => (stats.entries.to_string(), format_size(stats.total_size)),
        None => ("-".to_string(), "-".to_string()),
    };
    let host = if app.allowed_host.is_empty() {
        "any".to_string()
    } else {
        app.allowed_host.clone()
    };

    vec![
        Line::from(vec![Span::styled("Files  ", label), Span::raw(files)]),
        Line::from(vec![Span::styled("Size   ", label), Span::raw(size)]),
        Line::from(vec![Span::styled("Host   ", label), Span::raw(host)]),
        Line::from(vec![
            Span::styled(format!("{} local", cached), Style::default().fg(Color::Green)),
            Span::raw(" / "),
            Span::styled(format!("{} remote", remote), Style::default().fg(Color::Yellow)),
            Span::raw(if pending > 0 {
                format!(" / {} ...", pending)
            } else {
                String::new()
            }),
        ]),
    ]
}

/// Measures the panel: widest line plus borders and padding
pub fn measure(app: &App) -> Size {
    let lines = panel_lines(app);
    let content_width = lines.iter().map(|l| l.width()).max().unwrap_or(0);
    // Keep the title readable when the content is narrow
    let width = (content_width + 4).max(16);
    let height = lines.len() + 2;
    Size::new(width as f64, height as f64)
}

/// Renders the dock panel at its current position
pub fn render(frame: &mut Frame, app: &App) {
    let Some(size) = app.dock.size() else {
        return;
    };
    let area = frame.area();
    let position = app.dock.position();

    let x = position.x.round().max(0.0) as u16;
    let y = position.y.round().max(0.0) as u16;
    let panel = Rect::new(x, y, size.width as u16, size.height as u16).intersection(area);
    if panel.width == 0 || panel.height == 0 {
        return;
    }

    frame.render_widget(Clear, panel);

    let border = if app.is_dragging() {
        Color::Yellow
    } else {
        Color::Magenta
    };
    let block = Block::default()
        .title(Span::styled(
            " Cache ",
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let paragraph = Paragraph::new(panel_lines(app)).block(block);
    frame.render_widget(paragraph, panel);
}
