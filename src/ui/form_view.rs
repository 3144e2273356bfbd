//! Login, sign-in and compose dialogs

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::app::{ComposeScreen, ComposeTarget, LoginMode, LoginScreen};
use crate::form::Form;

use super::centered_rect;

pub fn render_login(frame: &mut Frame, screen: &LoginScreen, status: Option<&str>) {
    let (title, hint) = match screen.mode {
        LoginMode::Login => (" Log in ", "F2 Sign up instead"),
        LoginMode::Signin => (" Sign up ", "F2 Log in instead"),
    };
    render_dialog(frame, title, &screen.form, screen.submitting, hint, status);
}

pub fn render_compose(frame: &mut Frame, screen: &ComposeScreen, status: Option<&str>) {
    let title = match &screen.target {
        ComposeTarget::Thread { .. } => " New thread ".to_string(),
        ComposeTarget::Reply { title, .. } if !title.is_empty() => format!(" Reply to {} ", title),
        ComposeTarget::Reply { .. } => " Reply ".to_string(),
    };
    render_dialog(frame, &title, &screen.form, screen.submitting, "", status);
}

/// Text shown for a field value; secrets are masked
pub fn display_value(value: &str, secret: bool) -> String {
    if secret {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    }
}

fn form_lines(form: &Form) -> Vec<Line<'static>> {
    form.fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let focused = i == form.focus;
            let label_style = if focused {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let marker = if field.required { "" } else { " (optional)" };
            let cursor = if focused { "▏" } else { "" };
            Line::from(vec![
                Span::styled(format!("{:<12}", field.label), label_style),
                Span::raw(display_value(&field.value, field.secret)),
                Span::styled(cursor, Style::default().fg(Color::Cyan)),
                Span::styled(marker, Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect()
}

fn render_dialog(
    frame: &mut Frame,
    title: &str,
    form: &Form,
    submitting: bool,
    hint: &str,
    status: Option<&str>,
) {
    let height = form.fields.len() as u16 + 6;
    let area: Rect = centered_rect(64, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = form_lines(form);
    lines.push(Line::from(""));
    if submitting {
        lines.push(Line::from(Span::styled(
            "Sending...",
            Style::default().fg(Color::Yellow),
        )));
    } else if let Some(status) = status {
        lines.push(Line::from(Span::styled(
            status.to_string(),
            Style::default().fg(Color::Magenta),
        )));
    } else {
        lines.push(Line::from(""));
    }

    let mut keys = "Tab Next  Enter Submit  Esc Cancel".to_string();
    if !hint.is_empty() {
        keys.push_str("  ");
        keys.push_str(hint);
    }
    lines.push(Line::from(Span::styled(
        keys,
        Style::default().fg(Color::DarkGray),
    )));

    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
