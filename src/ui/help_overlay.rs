//! Help overlay showing all keybindings
//!
//! Renders a centered modal listing keyboard and mouse controls, sized to fit
//! its content.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const OVERLAY_WIDTH: u16 = 50;

/// Sections of (key, description) pairs, in display order
const BINDINGS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("↑/k, ↓/j", "Move selection up/down"),
            ("g, G", "First / last image"),
            ("q, Esc", "Quit application"),
        ],
    ),
    (
        "Cache",
        &[
            ("r", "Resolve selected image again"),
            ("c", "Clear all cached files"),
        ],
    ),
    (
        "Dock",
        &[
            ("d", "Show / hide cache panel"),
            ("drag", "Move panel; release snaps to edge"),
            ("?", "Toggle this help"),
        ],
    ),
];

fn help_lines() -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];

    for (title, keys) in BINDINGS {
        lines.push(Line::from(Span::styled(
            *title,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (key, description) in keys.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<12}", key), Style::default().fg(Color::Yellow)),
                Span::raw(*description),
            ]));
        }
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "Press Esc or ? to close",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

/// Centers a `width` x `height` box in `area`, shrinking it if needed
fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Renders the help overlay on top of the current view
pub fn render(frame: &mut Frame) {
    let lines = help_lines();
    // Content plus top and bottom border
    let height = lines.len() as u16 + 2;
    let overlay_area = centered(OVERLAY_WIDTH, height, frame.area());

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Paragraph::new(lines).block(block), overlay_area);
}
