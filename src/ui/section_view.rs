//! Browse screen rendering
//!
//! Shows the region tabs, the page on display (or the region's empty banner),
//! the buttons of the selected post, the status line and key hints.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::App;
use crate::region::{PostEntry, Region};
use crate::section::DisplayRegion;
use crate::toggle::{StateLabel, TwoState};

pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Region tabs
            Constraint::Min(3),    // Page
            Constraint::Length(1), // Selected post actions
            Constraint::Length(1), // Status
            Constraint::Length(1), // Help text
        ])
        .split(area);

    render_tabs(frame, app, chunks[0]);
    match app.active_region() {
        Some(region) => {
            render_page(frame, region, chunks[1]);
            render_actions(frame, app, region, chunks[2]);
        }
        None => {
            let paragraph = Paragraph::new("No regions configured")
                .style(Style::default().fg(Color::DarkGray));
            frame.render_widget(paragraph, chunks[1]);
        }
    }
    render_status(frame, app, chunks[3]);
    render_help(frame, app, chunks[4]);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = app
        .regions
        .iter()
        .map(|region| {
            if region.is_loading() {
                Line::from(format!("{}…", region.label))
            } else {
                Line::from(region.label.clone())
            }
        })
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.active)
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

/// "Page x/y" for the region, or `None` before the first page
pub fn page_indicator(region: &Region) -> Option<String> {
    let section = region.section();
    if section.is_empty() {
        return None;
    }
    Some(format!(
        "Page {}/{}",
        section.current_index() + 1,
        section.len()
    ))
}

fn render_page(frame: &mut Frame, region: &Region, area: Rect) {
    let section = region.section();
    let title = match page_indicator(region) {
        Some(indicator) => format!(" {} · {} ", region.label, indicator),
        None => format!(" {} ", region.label),
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    // Until the first page arrives the banner stands in for the display
    let paragraph = match section.empty_state().and_then(|banner| banner.message()) {
        Some(message) => Paragraph::new(message.to_string())
            .style(Style::default().fg(Color::DarkGray)),
        None => Paragraph::new(page_lines(region)).wrap(Wrap { trim: false }),
    };
    frame.render_widget(paragraph.block(block), area);
}

/// Lines of the displayed page, with the selected post's heading highlighted
fn page_lines(region: &Region) -> Vec<Line<'static>> {
    let selected_heading = region
        .selected_entry()
        .map(|_| format!("{}. ", region.selected + 1));

    region
        .section()
        .display()
        .content()
        .lines()
        .map(|line| {
            let is_selected = selected_heading
                .as_deref()
                .is_some_and(|prefix| line.starts_with(prefix));
            if is_selected {
                Line::from(Span::styled(
                    format!("▶ {}", line),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(format!("  {}", line))
            }
        })
        .collect()
}

fn button_spans(key: &str, label: String, pending: bool, active: bool) -> Vec<Span<'static>> {
    let style = if pending {
        Style::default().fg(Color::DarkGray)
    } else if active {
        Style::default().fg(Color::Green)
    } else {
        Style::default()
    };
    vec![
        Span::styled(format!("[{}] ", key), Style::default().fg(Color::Yellow)),
        Span::styled(label, style),
        Span::raw("  "),
    ]
}

fn render_actions(frame: &mut Frame, app: &App, region: &Region, area: Rect) {
    let Some(PostEntry { post, upvote, save }) = region.selected_entry() else {
        frame.render_widget(Paragraph::new(""), area);
        return;
    };

    let mut spans = Vec::new();
    if let Some(button) = upvote {
        spans.extend(button_spans(
            "u",
            button.label(),
            button.is_pending(),
            button.state().is_active(),
        ));
    }
    if let Some(button) = save {
        spans.extend(button_spans(
            "s",
            button.label().to_string(),
            button.is_pending(),
            button.state().is_active(),
        ));
    }
    let own_post = app.username.as_deref() == Some(post.username.as_str());
    if !post.username.is_empty() && !own_post {
        let state = app.follow_state(&post.username).unwrap_or_default();
        spans.extend(button_spans(
            "f",
            format!("{} {}", state.label(), post.username),
            false,
            state.is_active(),
        ));
    }
    if post.can_reply() {
        spans.extend(button_spans("r", "Reply".to_string(), false, false));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let text = app.status.clone().unwrap_or_default();
    let paragraph = Paragraph::new(text).style(Style::default().fg(Color::Magenta));
    frame.render_widget(paragraph, area);
}

/// Renders the help text at the bottom of the screen with page freshness
fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let mut help_spans = vec![
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Region  "),
        Span::styled("h/l", Style::default().fg(Color::Yellow)),
        Span::raw(" Page  "),
        Span::styled("n", Style::default().fg(Color::Yellow)),
        Span::raw(" More  "),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::raw(" Help  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ];

    if let Some(loaded_at) = app.active_region().and_then(|region| region.loaded_at) {
        let elapsed = Local::now() - loaded_at;
        let mins_ago = elapsed.num_minutes();
        let freshness_text = if mins_ago < 1 {
            " │ Loaded: just now".to_string()
        } else if mins_ago < 60 {
            format!(" │ Loaded: {}m ago", mins_ago)
        } else {
            format!(" │ Loaded: {}h ago", elapsed.num_hours())
        };
        help_spans.push(Span::styled(
            freshness_text,
            Style::default().fg(Color::DarkGray),
        ));
    }
    if let Some(username) = &app.username {
        help_spans.push(Span::styled(
            format!(" │ {}", username),
            Style::default().fg(Color::Green),
        ));
    }

    let paragraph =
        Paragraph::new(Line::from(help_spans)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use crate::config::RegionConfig;
    use crate::data::{Feed, Post};
    use crate::ui::test_support::rendered;
    use crate::worker::{Job, Outcome, Response};

    fn app_with_pages(pages: &[&[&str]]) -> App {
        let mut app = App::new(vec![
            RegionConfig::board_section("mylife"),
            RegionConfig::new("Saved", "/recyclesaved"),
        ]);
        app.state = AppState::Browse;
        for titles in pages {
            let region = &mut app.regions[0];
            let ticket = region.begin_load().unwrap();
            let feed = Feed {
                contents: titles
                    .iter()
                    .map(|title| Post {
                        title: title.to_string(),
                        username: "bep".to_string(),
                        upvotes: 2,
                        upvote_link: "/u".to_string(),
                        undo_upvote_link: "/uu".to_string(),
                        save_link: "/s".to_string(),
                        undo_save_link: "/us".to_string(),
                        ..Default::default()
                    })
                    .collect(),
            };
            region.finish_load(ticket, feed).unwrap();
        }
        app
    }

    #[test]
    fn test_empty_region_shows_banner() {
        let app = app_with_pages(&[]);
        let content = rendered(|frame| render(frame, &app));
        assert!(content.contains("Nothing here yet. Press n to load content."));
        assert!(!content.contains("Page 1/"));
    }

    #[test]
    fn test_tabs_are_rendered() {
        let app = app_with_pages(&[]);
        let content = rendered(|frame| render(frame, &app));
        assert!(content.contains("mylife"));
        assert!(content.contains("Saved"));
    }

    #[test]
    fn test_page_and_indicator_are_rendered() {
        let app = app_with_pages(&[&["First thread"], &["Second thread"]]);
        let content = rendered(|frame| render(frame, &app));
        assert!(content.contains("Page 2/2"));
        assert!(content.contains("Second thread"));
        assert!(!content.contains("Nothing here yet"));
    }

    #[test]
    fn test_page_indicator_follows_navigation() {
        let mut app = app_with_pages(&[&["a"], &["b"], &["c"]]);
        app.regions[0].previous().unwrap();
        assert_eq!(page_indicator(&app.regions[0]).as_deref(), Some("Page 2/3"));
        assert_eq!(page_indicator(&app.regions[1]), None);
    }

    #[test]
    fn test_selected_post_actions() {
        let app = app_with_pages(&[&["a"]]);
        let content = rendered(|frame| render(frame, &app));
        assert!(content.contains("2 Upvotes"));
        assert!(content.contains("Save this post"));
        assert!(content.contains("Follow bep"));
    }

    #[test]
    fn test_own_post_has_no_follow_button() {
        let mut app = app_with_pages(&[&["a"]]);
        app.username = Some("bep".to_string());
        let content = rendered(|frame| render(frame, &app));
        assert!(!content.contains("Follow bep"));
    }

    #[test]
    fn test_toggled_save_label() {
        let mut app = app_with_pages(&[&["a"]]);
        app.handle_key(crossterm::event::KeyEvent::new(
            crossterm::event::KeyCode::Char('s'),
            crossterm::event::KeyModifiers::NONE,
        ));
        let request = app.take_requests().remove(0);
        let Job::Toggle { target, .. } = request.job else {
            panic!("Expected a toggle job");
        };
        app.apply(Response {
            generation: request.generation,
            outcome: Outcome::Toggled {
                target,
                result: Ok(()),
            },
        });

        let content = rendered(|frame| render(frame, &app));
        assert!(content.contains("You saved this post"));
    }

    #[test]
    fn test_status_and_freshness_are_rendered() {
        let mut app = app_with_pages(&[&["a"]]);
        app.status = Some("Posted /mylife/a".to_string());
        let content = rendered(|frame| render(frame, &app));
        assert!(content.contains("Posted /mylife/a"));
        assert!(content.contains("Loaded: just now"));
    }
}
