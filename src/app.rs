//! Application state management for cheroterm
//!
//! This module contains the main application state: the content regions,
//! keyboard handling, queued network requests and how their responses are
//! applied. Nothing here awaits; the event loop hands queued requests to the
//! worker and feeds responses back through `apply`.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent};
use tracing::{debug, info, warn};

use crate::config::RegionConfig;
use crate::data::client::{LOGIN_PATH, SIGNIN_PATH};
use crate::data::{Attachment, SiteError};
use crate::form::{Form, FormInput};
use crate::region::{LoadOutcome, Region, RegionId};
use crate::section::SectionNotice;
use crate::toggle::{FollowState, ToggleButton, ToggleLinks};
use crate::worker::{FormKind, Job, LoadReason, Outcome, Request, Response, ToggleTarget};

/// Whether the login screen logs in or registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    Login,
    Signin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginScreen {
    pub mode: LoginMode,
    pub form: Form,
    /// A submission is waiting for the server
    pub submitting: bool,
}

impl LoginScreen {
    pub fn new(mode: LoginMode) -> Self {
        let form = match mode {
            LoginMode::Login => Form::login(),
            LoginMode::Signin => Form::signin(),
        };
        Self {
            mode,
            form,
            submitting: false,
        }
    }
}

/// What a compose screen posts
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposeTarget {
    Thread { region: RegionId, link: String },
    Reply { link: String, title: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeScreen {
    pub target: ComposeTarget,
    pub form: Form,
    pub submitting: bool,
}

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Initial loading state while the first pages are fetched
    Loading,
    /// Browsing the content regions
    Browse,
    Login(LoginScreen),
    Compose(ComposeScreen),
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    /// One region per configured tab
    pub regions: Vec<Region>,
    /// Index of the region on display
    pub active: usize,
    /// Notices waiting for the user to acknowledge them, oldest first
    pub notices: VecDeque<String>,
    /// One-line message at the bottom of the screen
    pub status: Option<String>,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
    /// Username of the logged-in user, if any
    pub username: Option<String>,
    /// User id that post upvote and save states are shown for
    viewer_id: Option<String>,
    /// Follow buttons keyed by author username
    follows: HashMap<String, ToggleButton<FollowState>>,
    region_configs: Vec<RegionConfig>,
    /// Bumped whenever the session changes; older responses are dropped
    generation: u64,
    /// Requests waiting to be handed to the worker
    pending: Vec<Request>,
}

impl App {
    /// Creates a new App with one region per entry of `regions`
    pub fn new(regions: Vec<RegionConfig>) -> Self {
        let mut app = Self {
            state: AppState::Loading,
            regions: Vec::new(),
            active: 0,
            notices: VecDeque::new(),
            status: None,
            should_quit: false,
            show_help: false,
            username: None,
            viewer_id: None,
            follows: HashMap::new(),
            region_configs: regions,
            generation: 0,
            pending: Vec::new(),
        };
        app.build_regions();
        app
    }

    /// Shows posts as seen by the user with `viewer_id`
    pub fn with_viewer_id(mut self, viewer_id: Option<String>) -> Self {
        self.viewer_id = viewer_id;
        self.build_regions();
        self
    }

    fn build_regions(&mut self) {
        self.regions = self
            .region_configs
            .iter()
            .enumerate()
            .map(|(i, config)| {
                Region::new(RegionId(i), config).with_viewer_id(self.viewer_id.clone())
            })
            .collect();
        self.active = self.active.min(self.regions.len().saturating_sub(1));
    }

    /// Tears down every region and invalidates outstanding requests
    fn reset_session(&mut self) {
        self.generation += 1;
        self.follows.clear();
        self.build_regions();
    }

    /// Takes the requests queued since the last call
    pub fn take_requests(&mut self) -> Vec<Request> {
        std::mem::take(&mut self.pending)
    }

    fn queue(&mut self, job: Job) {
        self.pending.push(Request {
            generation: self.generation,
            job,
        });
    }

    pub fn active_region(&self) -> Option<&Region> {
        self.regions.get(self.active)
    }

    fn active_region_mut(&mut self) -> Option<&mut Region> {
        self.regions.get_mut(self.active)
    }

    /// Follow button state for `username`
    pub fn follow_state(&self, username: &str) -> Option<FollowState> {
        self.follows.get(username).map(ToggleButton::state)
    }

    /// Queues a first page for every region
    pub fn load_all(&mut self) {
        for index in 0..self.regions.len() {
            self.request_load(index, LoadReason::Initial);
        }
        if self.regions.iter().any(Region::is_loading) {
            self.state = AppState::Loading;
        } else {
            self.state = AppState::Browse;
        }
    }

    fn request_load(&mut self, index: usize, reason: LoadReason) {
        let Some(region) = self.regions.get_mut(index) else {
            return;
        };
        match region.begin_load() {
            Some(ticket) => {
                let job = Job::LoadPage {
                    region: region.id,
                    ticket,
                    link: region.recycle_link.clone(),
                    reason,
                };
                self.queue(job);
            }
            None => {
                self.status = Some(format!("Still loading {}...", region.label));
            }
        }
    }

    fn show_notice(&mut self, notice: SectionNotice) {
        self.notices.push_back(notice.to_string());
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `Enter`/`Esc` (notice shown): acknowledge the notice
    /// - `Tab`/`BackTab`: switch region
    /// - `h`/`Left`, `l`/`Right`: previous / next cached page
    /// - `n`: load more content into the region
    /// - `j`/`Down`, `k`/`Up`: select post
    /// - `u`, `s`, `f`: upvote, save, follow author
    /// - `c`: new thread, `r`: reply
    /// - `L`: login screen, `O`: logout
    /// - `?`: help, `q`/`Esc`: quit
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        // A notice blocks everything until acknowledged
        if !self.notices.is_empty() {
            if matches!(key_event.code, KeyCode::Enter | KeyCode::Esc) {
                self.notices.pop_front();
            }
            return;
        }

        if self.show_help {
            match key_event.code {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') => {
                    self.show_help = false;
                }
                _ => {}
            }
            return;
        }

        match self.state {
            AppState::Loading => {
                if key_event.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
            }
            AppState::Browse => self.handle_browse_key(key_event),
            AppState::Login(_) => self.handle_login_key(key_event),
            AppState::Compose(_) => self.handle_compose_key(key_event),
        }
    }

    fn handle_browse_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Tab => self.next_region(),
            KeyCode::BackTab => self.previous_region(),
            KeyCode::Char('h') | KeyCode::Left => {
                if let Some(Err(notice)) = self.active_region_mut().map(Region::previous) {
                    self.show_notice(notice);
                }
            }
            KeyCode::Char('l') | KeyCode::Right => {
                if let Some(Err(notice)) = self.active_region_mut().map(Region::next) {
                    self.show_notice(notice);
                }
            }
            KeyCode::Char('n') => self.request_load(self.active, LoadReason::User),
            KeyCode::Char('j') | KeyCode::Down => {
                if let Some(region) = self.active_region_mut() {
                    region.select_next();
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if let Some(region) = self.active_region_mut() {
                    region.select_previous();
                }
            }
            KeyCode::Char('u') => self.toggle_upvote(),
            KeyCode::Char('s') => self.toggle_save(),
            KeyCode::Char('f') => self.toggle_follow(),
            KeyCode::Char('c') => self.compose_thread(),
            KeyCode::Char('r') => self.compose_reply(),
            KeyCode::Char('L') => {
                self.state = AppState::Login(LoginScreen::new(LoginMode::Login));
            }
            KeyCode::Char('O') => {
                self.queue(Job::Logout);
                self.status = Some("Logging out...".to_string());
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
    }

    fn next_region(&mut self) {
        let count = self.regions.len();
        if count > 0 {
            self.active = (self.active + 1) % count;
        }
    }

    fn previous_region(&mut self) {
        let count = self.regions.len();
        if count == 0 {
            return;
        }
        self.active = if self.active == 0 {
            count - 1
        } else {
            self.active - 1
        };
    }

    /// Region, page and post index of the selected post
    fn selected_position(&self) -> Option<(usize, usize, usize)> {
        let region = self.active_region()?;
        region.selected_entry()?;
        Some((self.active, region.current_page(), region.selected))
    }

    fn toggle_upvote(&mut self) {
        let Some((index, page, post)) = self.selected_position() else {
            self.status = Some("Select a post first".to_string());
            return;
        };
        let region = &mut self.regions[index];
        let region_id = region.id;
        let Some(button) = region
            .entry_mut(page, post)
            .and_then(|entry| entry.upvote.as_mut())
        else {
            self.status = Some("This post cannot be upvoted".to_string());
            return;
        };
        match button.begin() {
            Some(link) => self.queue(Job::Toggle {
                target: ToggleTarget::Upvote {
                    region: region_id,
                    page,
                    post,
                },
                link,
            }),
            None => self.status = Some("Upvote already in progress".to_string()),
        }
    }

    fn toggle_save(&mut self) {
        let Some((index, page, post)) = self.selected_position() else {
            self.status = Some("Select a post first".to_string());
            return;
        };
        let region = &mut self.regions[index];
        let region_id = region.id;
        let Some(button) = region
            .entry_mut(page, post)
            .and_then(|entry| entry.save.as_mut())
        else {
            self.status = Some("This post cannot be saved".to_string());
            return;
        };
        match button.begin() {
            Some(link) => self.queue(Job::Toggle {
                target: ToggleTarget::Save {
                    region: region_id,
                    page,
                    post,
                },
                link,
            }),
            None => self.status = Some("Save already in progress".to_string()),
        }
    }

    fn toggle_follow(&mut self) {
        let Some(username) = self
            .active_region()
            .and_then(Region::selected_entry)
            .map(|entry| entry.post.username.clone())
            .filter(|username| !username.is_empty())
        else {
            self.status = Some("Select a post with a known author".to_string());
            return;
        };
        // No follow button for your own posts
        if self.username.as_deref() == Some(username.as_str()) {
            self.status = Some("You cannot follow yourself".to_string());
            return;
        }

        let button = self.follows.entry(username.clone()).or_insert_with(|| {
            ToggleButton::new(FollowState::NotFollowing, ToggleLinks::follow(&username))
        });
        match button.begin() {
            Some(link) => self.queue(Job::Toggle {
                target: ToggleTarget::Follow { username },
                link,
            }),
            None => self.status = Some("Follow already in progress".to_string()),
        }
    }

    fn compose_thread(&mut self) {
        let Some(region) = self.active_region() else {
            return;
        };
        match &region.post_link {
            Some(link) => {
                let target = ComposeTarget::Thread {
                    region: region.id,
                    link: link.clone(),
                };
                self.state = AppState::Compose(ComposeScreen {
                    target,
                    form: Form::thread(),
                    submitting: false,
                });
            }
            None => {
                self.status = Some(format!("{} does not accept new threads", region.label));
            }
        }
    }

    fn compose_reply(&mut self) {
        let Some(entry) = self.active_region().and_then(Region::selected_entry) else {
            self.status = Some("Select a post to reply to".to_string());
            return;
        };
        if !entry.post.can_reply() {
            self.status = Some("This post does not take replies".to_string());
            return;
        }
        let target = ComposeTarget::Reply {
            link: entry.post.reply_link.clone(),
            title: entry.post.title.clone(),
        };
        self.state = AppState::Compose(ComposeScreen {
            target,
            form: Form::reply(),
            submitting: false,
        });
    }

    fn handle_login_key(&mut self, key_event: KeyEvent) {
        let AppState::Login(screen) = &mut self.state else {
            return;
        };
        if key_event.code == KeyCode::F(2) {
            let mode = match screen.mode {
                LoginMode::Login => LoginMode::Signin,
                LoginMode::Signin => LoginMode::Login,
            };
            *screen = LoginScreen::new(mode);
            return;
        }
        match screen.form.handle_key(key_event) {
            FormInput::Cancel => self.state = AppState::Browse,
            FormInput::Submit => {
                if screen.submitting {
                    return;
                }
                if !screen.form.is_complete() {
                    self.status = Some("Fill in all required fields".to_string());
                    return;
                }
                let username = screen.form.value("username").to_string();
                let (kind, link) = match screen.mode {
                    LoginMode::Login => (FormKind::Login { username }, LOGIN_PATH),
                    LoginMode::Signin => (FormKind::Signin { username }, SIGNIN_PATH),
                };
                let fields = screen.form.pairs(&[]);
                screen.submitting = true;
                self.queue(Job::SubmitForm {
                    kind,
                    link: link.to_string(),
                    fields,
                    attachment: None,
                });
            }
            FormInput::Edited | FormInput::Ignored => {}
        }
    }

    fn handle_compose_key(&mut self, key_event: KeyEvent) {
        let AppState::Compose(screen) = &mut self.state else {
            return;
        };
        match screen.form.handle_key(key_event) {
            FormInput::Cancel => self.state = AppState::Browse,
            FormInput::Submit => {
                if screen.submitting {
                    return;
                }
                if !screen.form.is_complete() {
                    self.status = Some("Fill in all required fields".to_string());
                    return;
                }
                let job = match &screen.target {
                    ComposeTarget::Thread { region, link } => {
                        let file = screen.form.value("ft_file").trim();
                        let attachment =
                            (!file.is_empty()).then(|| Attachment::new(PathBuf::from(file)));
                        Job::SubmitForm {
                            kind: FormKind::Thread { region: *region },
                            link: link.clone(),
                            fields: screen.form.pairs(&["ft_file"]),
                            attachment,
                        }
                    }
                    ComposeTarget::Reply { link, .. } => Job::SubmitForm {
                        kind: FormKind::Reply,
                        link: link.clone(),
                        fields: screen.form.pairs(&[]),
                        attachment: None,
                    },
                };
                screen.submitting = true;
                self.queue(job);
            }
            FormInput::Edited | FormInput::Ignored => {}
        }
    }

    /// Applies the result of a finished request
    pub fn apply(&mut self, response: Response) {
        if response.generation != self.generation {
            debug!(
                generation = response.generation,
                current = self.generation,
                "dropping response from an earlier session"
            );
            return;
        }

        match response.outcome {
            Outcome::PageLoaded {
                region,
                ticket,
                reason,
                result,
            } => {
                let Some(target) = self.regions.get_mut(region.0) else {
                    return;
                };
                match result {
                    Ok(feed) => match target.finish_load(ticket, feed) {
                        Ok(LoadOutcome::Appended) | Ok(LoadOutcome::Stale) => {}
                        Err(SectionNotice::NoNewContent) if reason == LoadReason::Initial => {
                            debug!(region = %target.label, "region starts empty");
                        }
                        Err(notice) => self.show_notice(notice),
                    },
                    Err(err) => {
                        if target.abort_load(ticket) {
                            self.status = Some(load_failure_message(&target.label, &err));
                        }
                    }
                }
                if self.state == AppState::Loading && !self.regions.iter().any(Region::is_loading)
                {
                    self.state = AppState::Browse;
                }
            }
            Outcome::Toggled { target, result } => self.apply_toggle(target, result),
            Outcome::FormSubmitted { kind, result } => self.apply_form(kind, result),
            Outcome::LoggedOut(result) => match result {
                Ok(()) => {
                    info!("logged out");
                    self.username = None;
                    self.reset_session();
                    self.status = Some("Logged out".to_string());
                    self.load_all();
                }
                Err(err) => self.status = Some(format!("Logout failed: {}", err)),
            },
        }
    }

    fn apply_toggle(&mut self, target: ToggleTarget, result: Result<(), SiteError>) {
        let failed = result.as_ref().err().map(ToString::to_string);
        match &target {
            ToggleTarget::Upvote { region, page, post } => {
                let Some(button) = self
                    .regions
                    .get_mut(region.0)
                    .and_then(|r| r.entry_mut(*page, *post))
                    .and_then(|entry| entry.upvote.as_mut())
                else {
                    return;
                };
                if result.is_ok() {
                    button.complete();
                } else {
                    button.abort();
                }
            }
            ToggleTarget::Save { region, page, post } => {
                let Some(button) = self
                    .regions
                    .get_mut(region.0)
                    .and_then(|r| r.entry_mut(*page, *post))
                    .and_then(|entry| entry.save.as_mut())
                else {
                    return;
                };
                if result.is_ok() {
                    button.complete();
                } else {
                    button.abort();
                }
            }
            ToggleTarget::Follow { username } => {
                let Some(button) = self.follows.get_mut(username) else {
                    return;
                };
                if result.is_ok() {
                    button.complete();
                } else {
                    button.abort();
                }
            }
        }
        match failed {
            Some(message) => {
                warn!(?target, %message, "toggle failed");
                self.status = Some(message);
            }
            None => debug!(?target, "toggle applied"),
        }
    }

    fn apply_form(&mut self, kind: FormKind, result: Result<String, SiteError>) {
        let body = match result {
            Ok(body) => body,
            Err(err) => {
                match &mut self.state {
                    AppState::Login(screen) => screen.submitting = false,
                    AppState::Compose(screen) => screen.submitting = false,
                    _ => {}
                }
                self.status = Some(err.to_string());
                return;
            }
        };

        match kind {
            FormKind::Login { username } | FormKind::Signin { username } => {
                info!(%username, "logged in");
                self.reset_session();
                self.status = Some(format!("Logged in as {}", username));
                self.username = Some(username);
                self.load_all();
            }
            FormKind::Thread { region } => {
                let permalink = body.trim().to_string();
                info!(%permalink, "thread posted");
                self.state = AppState::Browse;
                self.status = Some(format!("Posted {}", permalink));
                self.request_load(region.0, LoadReason::User);
            }
            FormKind::Reply => {
                info!(response = %body.trim(), "reply posted");
                self.state = AppState::Browse;
                self.status = Some("Reply posted".to_string());
            }
        }
    }
}

fn load_failure_message(label: &str, err: &SiteError) -> String {
    if err.is_unauthorized() {
        format!("Log in (L) to see {}", label)
    } else {
        format!("Could not load {}: {}", label, err)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(crate::config::Config::default().regions)
    }
}
