//! UI rendering module for cheroterm
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components.

pub mod form_view;
pub mod help_overlay;
pub mod notice;
pub mod section_view;

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, AppState};

/// Draws the current screen followed by any overlay
pub fn render(frame: &mut Frame, app: &App) {
    match &app.state {
        AppState::Loading => render_loading(frame),
        AppState::Browse => section_view::render(frame, app),
        AppState::Login(screen) => {
            section_view::render(frame, app);
            form_view::render_login(frame, screen, app.status.as_deref());
        }
        AppState::Compose(screen) => {
            section_view::render(frame, app);
            form_view::render_compose(frame, screen, app.status.as_deref());
        }
    }

    if app.show_help {
        help_overlay::render(frame);
    }
    // Notices go on top of everything, help included
    if let Some(message) = app.notices.front() {
        notice::render(frame, message, app.notices.len());
    }
}

/// Renders a loading message while the first pages are fetched
pub fn render_loading(frame: &mut Frame) {
    let area = frame.area();

    // Center the loading message vertically
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45),
            Constraint::Length(3),
            Constraint::Percentage(45),
        ])
        .split(area);

    let loading_text = Paragraph::new("Loading board content...")
        .style(Style::default().fg(Color::Cyan))
        .alignment(Alignment::Center);

    frame.render_widget(loading_text, chunks[1]);
}

/// Helper function to create a centered rect
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((area.height.saturating_sub(height)) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((area.width.saturating_sub(width)) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}


#[cfg(test)]
mod tests {
    use super::test_support::rendered;
    use super::*;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn test_loading_screen() {
        let app = App::default();
        let content = rendered(|frame| render(frame, &app));
        assert!(content.contains("Loading board content..."));
    }

    #[test]
    fn test_notice_drawn_over_help() {
        let mut app = App::default();
        app.state = AppState::Browse;
        app.show_help = true;
        app.notices.push_back("This is the first page".to_string());

        let content = rendered(|frame| render(frame, &app));
        assert!(content.contains("This is the first page"));
    }

    #[test]
    fn test_login_screen_over_browse() {
        let mut app = App::default();
        app.state = AppState::Browse;
        app.handle_key(KeyEvent::new(KeyCode::Char('L'), KeyModifiers::NONE));

        let content = rendered(|frame| render(frame, &app));
        assert!(content.contains("Log in"));
        assert!(content.contains("Username"));
    }

    #[test]
    fn test_centered_rect_fits_small_area() {
        let area = Rect::new(0, 0, 20, 10);
        let rect = centered_rect(50, 20, area);
        assert!(rect.width <= 20 && rect.height <= 10);
    }
}
