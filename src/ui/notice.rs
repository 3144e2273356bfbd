//! Modal notice dialog
//!
//! Shows the oldest unacknowledged notice; input is blocked until the user
//! dismisses it.

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::centered_rect;

/// Renders `message`; `queued` counts it along with the notices behind it
pub fn render(frame: &mut Frame, message: &str, queued: usize) {
    let area = centered_rect(50, 7, frame.area());
    frame.render_widget(Clear, area);

    let footer = if queued > 1 {
        format!("Enter to continue ({} more)", queued - 1)
    } else {
        "Enter to continue".to_string()
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(footer, Style::default().fg(Color::DarkGray))),
    ];

    let block = Block::default()
        .title(" Notice ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::test_support::rendered;

    #[test]
    fn test_notice_renders_message() {
        let content = rendered(|frame| render(frame, "This is the last page", 1));
        assert!(content.contains("Notice"));
        assert!(content.contains("This is the last page"));
        assert!(content.contains("Enter to continue"));
        assert!(!content.contains("more)"));
    }

    #[test]
    fn test_notice_counts_queue() {
        let content = rendered(|frame| render(frame, "This is the first page", 3));
        assert!(content.contains("(2 more)"));
    }
}
