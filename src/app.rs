use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

use crate::action::{Action, Command};
use crate::error::LazybbError;
use crate::event::Event;
use crate::fetch_guard::{Accepted, FetchGuard, FetchKey, RequestToken};
use crate::focus::{FocusContext, FocusCoordinator, Pane};
use crate::forge::DEFAULT_REPO;
use crate::list::ListState;
use crate::scroll::ScrollState;
use crate::types::{PullRequest, Repository};
use crate::view::{self, PaneLayout};

/// Rows taken by the header and status bars around the panes.
pub const CHROME_HEIGHT: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Motion {
    Up,
    Down,
    HalfUp,
    HalfDown,
}

/// The single owner of UI state. Every change goes through [`App::update`],
/// one action at a time.
pub struct App {
    pub repos: ListState<Repository>,
    pub prs: ListState<PullRequest>,
    pub selected_repo: Option<String>,
    pub focus: FocusCoordinator,
    pub loading_repos: bool,
    pub loading_prs: bool,
    pub last_requested: String,
    pub detail_scroll: ScrollState,
    pub fatal_error: Option<LazybbError>,
    pub layout: PaneLayout,
    pub tick: usize,
    guard: FetchGuard,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self {
            repos: ListState::default(),
            prs: ListState::default(),
            selected_repo: None,
            focus: FocusCoordinator::default(),
            loading_repos: true,
            loading_prs: false,
            last_requested: String::new(),
            detail_scroll: ScrollState::default(),
            fatal_error: None,
            layout: PaneLayout::default(),
            tick: 0,
            guard: FetchGuard::default(),
        }
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::Start,
            Event::Tick => Action::Tick,
            Event::Resize(width, height) => Action::Resize {
                width,
                height: height.saturating_sub(CHROME_HEIGHT),
            },
            Event::Key(_) if event.is_quit() => Action::Quit,
            Event::Key(key) => self.handle_key(key),
            Event::Render => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('u') => Action::HalfPageUp,
                KeyCode::Char('d') => Action::HalfPageDown,
                _ => Action::None,
            };
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::Enter => Action::Select,
            KeyCode::Tab => Action::CyclePane,
            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Char('1') => Action::FocusPane(Pane::PrList),
            KeyCode::Char('2') => Action::FocusPane(Pane::Detail),
            KeyCode::Char('3') => Action::FocusPane(Pane::RepoList),
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) -> Vec<Command> {
        if self.fatal_error.is_some() && action.is_user_input() {
            self.fatal_error = None;
        }

        match action {
            Action::Start => {
                self.loading_repos = true;
                let token = self.guard.issue(FetchKey::Repos);
                vec![Command::FetchRepos { token }]
            }
            Action::Quit => vec![Command::Terminate],
            Action::Refresh => {
                if self.loading_prs {
                    return vec![];
                }
                let key = self
                    .selected_repo
                    .clone()
                    .unwrap_or_else(|| DEFAULT_REPO.to_string());
                self.request_prs(key)
            }
            Action::FocusPane(pane) => {
                let ctx = self.focus_context();
                self.focus.focus(pane, ctx);
                vec![]
            }
            Action::CyclePane => {
                let ctx = self.focus_context();
                self.focus.cycle(ctx);
                vec![]
            }
            Action::ScrollUp => self.navigate(Motion::Up),
            Action::ScrollDown => self.navigate(Motion::Down),
            Action::HalfPageUp => self.navigate(Motion::HalfUp),
            Action::HalfPageDown => self.navigate(Motion::HalfDown),
            Action::Select => self.select(),
            Action::Tick => {
                self.tick = self.tick.wrapping_add(1);
                vec![]
            }
            Action::Resize { width, height } => {
                self.layout = PaneLayout::split(width, height);
                self.sync_detail_bounds();
                vec![]
            }
            Action::ReposLoaded { token, result } => self.repos_loaded(token, result),
            Action::PrsLoaded { key, token, result } => self.prs_loaded(key, token, result),
            Action::OpenFailed(err) => {
                warn!(error = %err, "could not open pull request in browser");
                self.fatal_error = Some(err);
                vec![]
            }
            Action::None => vec![],
        }
    }

    fn focus_context(&self) -> FocusContext {
        FocusContext {
            repos_empty: self.repos.is_empty(),
            prs_empty: self.prs.is_empty(),
            loading_prs: self.loading_prs,
        }
    }

    fn request_prs(&mut self, key: String) -> Vec<Command> {
        let token = self.guard.issue(FetchKey::pull_requests(&key));
        self.last_requested = key.clone();
        self.loading_prs = true;
        vec![Command::FetchPrs { key, token }]
    }

    fn navigate(&mut self, motion: Motion) -> Vec<Command> {
        match self.focus.current() {
            Some(Pane::RepoList) => match motion {
                Motion::Up => self.repos.move_up(),
                Motion::Down => self.repos.move_down(),
                Motion::HalfUp | Motion::HalfDown => {}
            },
            Some(Pane::PrList) if !self.loading_prs => {
                let before = self.prs.cursor();
                match motion {
                    Motion::Up => self.prs.move_up(),
                    Motion::Down => self.prs.move_down(),
                    Motion::HalfUp | Motion::HalfDown => return vec![],
                }
                if self.prs.cursor() != before {
                    self.detail_scroll.reset();
                }
                self.sync_detail_bounds();
            }
            Some(Pane::Detail) if !self.loading_prs => {
                self.sync_detail_bounds();
                match motion {
                    Motion::Up => self.detail_scroll.up(),
                    Motion::Down => self.detail_scroll.down(),
                    Motion::HalfUp => self.detail_scroll.half_up(),
                    Motion::HalfDown => self.detail_scroll.half_down(),
                }
            }
            _ => {}
        }
        vec![]
    }

    fn select(&mut self) -> Vec<Command> {
        match self.focus.current() {
            Some(Pane::RepoList) => {
                let cursor = self.repos.cursor();
                let Some(slug) = self.repos.selected().map(|r| r.slug.clone()) else {
                    return vec![];
                };
                self.repos.set_active(cursor);
                self.selected_repo = Some(slug.clone());
                self.request_prs(slug)
            }
            Some(Pane::PrList) if !self.loading_prs => match self.prs.selected() {
                Some(pr) => vec![Command::OpenUrl(pr.url.clone())],
                None => vec![],
            },
            _ => vec![],
        }
    }

    fn repos_loaded(
        &mut self,
        token: RequestToken,
        result: crate::error::Result<Vec<Repository>>,
    ) -> Vec<Command> {
        let result = match self.guard.accept(&FetchKey::Repos, token, result) {
            Accepted::Current(result) => result,
            Accepted::Stale => return vec![],
        };

        let repos = match result {
            Ok(repos) => repos,
            Err(err) => {
                warn!(error = %err, "failed to fetch repositories");
                self.loading_repos = false;
                self.fatal_error = Some(err);
                return vec![];
            }
        };

        debug!(count = repos.len(), "repositories loaded");
        self.repos.set_items(repos);

        let Some(first) = self.repos.items().first().map(|r| r.slug.clone()) else {
            self.loading_repos = false;
            return vec![];
        };
        self.repos.set_active(0);
        self.selected_repo = Some(first.clone());
        self.request_prs(first)
    }

    fn prs_loaded(
        &mut self,
        key: String,
        token: RequestToken,
        result: crate::error::Result<Vec<PullRequest>>,
    ) -> Vec<Command> {
        if key != self.last_requested {
            debug!(%key, current = %self.last_requested, "dropping pull requests for another repository");
            self.loading_prs = false;
            return vec![];
        }
        let result = match self.guard.accept(&FetchKey::pull_requests(&key), token, result) {
            Accepted::Current(result) => result,
            Accepted::Stale => {
                self.loading_prs = false;
                return vec![];
            }
        };

        self.loading_prs = false;
        self.loading_repos = false;

        let prs = match result {
            Ok(prs) => prs,
            Err(err) => {
                warn!(%key, error = %err, "failed to fetch pull requests");
                self.fatal_error = Some(err);
                return vec![];
            }
        };

        debug!(%key, count = prs.len(), "pull requests loaded");
        self.prs.set_items(prs);
        if !self.prs.is_empty() {
            self.prs.select(0);
            self.detail_scroll.reset();
        }
        self.sync_detail_bounds();
        let ctx = self.focus_context();
        self.focus.settle(ctx);
        vec![]
    }

    /// Recompute the detail document length for the selected pull request
    /// and clamp the scroll offset to it.
    fn sync_detail_bounds(&mut self) {
        let total = self
            .prs
            .selected()
            .map(|pr| view::detail_lines(pr, self.layout.detail_text_width()).len())
            .unwrap_or(0);
        self.detail_scroll
            .set_bounds(total, self.layout.detail_viewport());
    }
}
