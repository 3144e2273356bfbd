//! Text-entry forms for login, sign-in, new threads and replies
//!
//! A form is a list of named fields with one focused field. Key presses edit
//! the focused field; the owner decides what `Submit` and `Cancel` mean.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// One named input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Form field name sent to the server
    pub name: &'static str,
    pub label: &'static str,
    pub value: String,
    /// Rendered masked (passwords)
    pub secret: bool,
    pub required: bool,
}

impl Field {
    fn text(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            value: String::new(),
            secret: false,
            required: true,
        }
    }

    fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    fn secret(mut self) -> Self {
        self.secret = true;
        self
    }
}

/// Result of feeding a key to a form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormInput {
    Edited,
    Submit,
    Cancel,
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub fields: Vec<Field>,
    pub focus: usize,
}

impl Form {
    fn new(fields: Vec<Field>) -> Self {
        Self { fields, focus: 0 }
    }

    pub fn login() -> Self {
        Self::new(vec![
            Field::text("username", "Username"),
            Field::text("password", "Password").secret(),
        ])
    }

    pub fn signin() -> Self {
        Self::new(vec![
            Field::text("email", "Email"),
            Field::text("name", "Name"),
            Field::text("alias", "Alias"),
            Field::text("about", "About").optional(),
            Field::text("username", "Username"),
            Field::text("password", "Password").secret(),
        ])
    }

    /// New thread: title, content and an optional path to a featured file
    pub fn thread() -> Self {
        Self::new(vec![
            Field::text("title", "Title"),
            Field::text("content", "Content"),
            Field::text("ft_file", "Image file").optional(),
        ])
    }

    pub fn reply() -> Self {
        Self::new(vec![Field::text("content", "Reply")])
    }

    pub fn value(&self, name: &str) -> &str {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.value.as_str())
            .unwrap_or("")
    }

    /// Whether every required field has a value
    pub fn is_complete(&self) -> bool {
        self.fields
            .iter()
            .all(|field| !field.required || !field.value.trim().is_empty())
    }

    /// Name/value pairs of every field except those listed in `skip`
    pub fn pairs(&self, skip: &[&str]) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter(|field| !skip.contains(&field.name))
            .map(|field| (field.name.to_string(), field.value.clone()))
            .collect()
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_previous(&mut self) {
        if self.fields.is_empty() {
            return;
        }
        self.focus = if self.focus == 0 {
            self.fields.len() - 1
        } else {
            self.focus - 1
        };
    }

    /// Applies a key press to the focused field
    ///
    /// `Enter` on the last field submits; on any other field it moves on.
    pub fn handle_key(&mut self, key_event: KeyEvent) -> FormInput {
        match key_event.code {
            KeyCode::Esc => FormInput::Cancel,
            KeyCode::Tab | KeyCode::Down => {
                self.focus_next();
                FormInput::Edited
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus_previous();
                FormInput::Edited
            }
            KeyCode::Enter => {
                if self.focus + 1 >= self.fields.len() {
                    FormInput::Submit
                } else {
                    self.focus_next();
                    FormInput::Edited
                }
            }
            KeyCode::Backspace => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    field.value.pop();
                }
                FormInput::Edited
            }
            KeyCode::Char(c) if !key_event.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(field) = self.fields.get_mut(self.focus) {
                    field.value.push(c);
                }
                FormInput::Edited
            }
            _ => FormInput::Ignored,
        }
    }
}
