//! Help overlay showing all keybindings
//!
//! Renders a centered modal overlay with keyboard shortcuts.

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::centered_rect;

fn heading(text: &'static str) -> Line<'static> {
    Line::from(vec![Span::styled(
        text,
        Style::default().add_modifier(Modifier::BOLD),
    )])
}

/// Renders the help overlay on top of the current view
pub fn render(frame: &mut Frame) {
    let area = frame.area();
    let overlay_area = centered_rect(50, 24, area);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        heading("Navigation"),
        help_line("Tab/S-Tab", "Next / previous region"),
        help_line("←/h, →/l", "Previous / next page"),
        help_line("↑/k, ↓/j", "Select post"),
        help_line("n", "Load more content"),
        heading("Posts"),
        help_line("u", "Upvote / undo upvote"),
        help_line("s", "Save / unsave"),
        help_line("f", "Follow / unfollow author"),
        help_line("r", "Reply to post"),
        help_line("c", "New thread in section"),
        heading("Account"),
        help_line("L", "Log in (F2: sign up)"),
        help_line("O", "Log out"),
        heading("Other"),
        help_line("?", "Toggle this help"),
        help_line("q/Esc", "Quit application"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or ? to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, overlay_area);
}

/// Creates a help line with key and description
fn help_line(key: &str, description: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", key), Style::default().fg(Color::Yellow)),
        Span::raw(description.to_string()),
    ])
}
