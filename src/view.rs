//! Plain-text frames for the three panes. Everything here is computed from
//! the current state on demand; nothing is cached between renders.

use std::ops::Range;

use crate::app::App;
use crate::focus::Pane;
use crate::markdown;
use crate::text::{display_width, pad, truncate, wrap, wrap_lines};
use crate::types::{PrState, PullRequest};

pub const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const COLUMN_SEPARATOR: &str = " │ ";

/// Inner size of a pane (inside its border, including padding).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneSize {
    pub width: u16,
    pub height: u16,
}

/// Sizes of the three panes: the PR list above the repository list on the
/// left, detail on the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaneLayout {
    pub pr_list: PaneSize,
    pub repo_list: PaneSize,
    pub detail: PaneSize,
}

impl Default for PaneLayout {
    fn default() -> Self {
        let list = PaneSize {
            width: 90,
            height: 15,
        };
        Self {
            pr_list: list,
            repo_list: list,
            detail: PaneSize {
                width: 90,
                height: 30,
            },
        }
    }
}

impl PaneLayout {
    /// Split a `width` x `height` area in half each way, leaving room for the
    /// borders.
    pub fn split(width: u16, height: u16) -> Self {
        let panel_width = width.saturating_sub(4) / 2;
        let list = PaneSize {
            width: panel_width,
            height: height.saturating_sub(4) / 2,
        };
        Self {
            pr_list: list,
            repo_list: list,
            detail: PaneSize {
                width: panel_width,
                height: height.saturating_sub(2),
            },
        }
    }

    /// Text columns available to the detail document.
    pub fn detail_text_width(&self) -> usize {
        self.detail.width.saturating_sub(4) as usize
    }

    /// Lines of the detail document visible at once.
    pub fn detail_viewport(&self) -> usize {
        self.detail.height.saturating_sub(2) as usize
    }
}

/// A rendered pane: its title, the text lines to draw, and which line (if
/// any) carries the cursor highlight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneView {
    pub title: String,
    pub lines: Vec<String>,
    pub highlight: Option<usize>,
    pub focused: bool,
    /// Lines are a centered message rather than content.
    pub placeholder: bool,
    pub accents: Vec<Accent>,
}

/// A byte range of one line drawn in the colour of a pull request state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accent {
    pub line: usize,
    pub range: Range<usize>,
    pub state: PrState,
}

impl PaneView {
    fn message(title: &str, text: String, focused: bool) -> Self {
        Self {
            title: title.to_string(),
            lines: vec![text],
            highlight: None,
            focused,
            placeholder: true,
            accents: Vec::new(),
        }
    }
}

pub fn spinner_frame(tick: usize) -> &'static str {
    SPINNER[tick % SPINNER.len()]
}

pub fn pr_list(app: &App) -> PaneView {
    let title = "[1]-PRs";
    let focused = app.focus.is_focused(Pane::PrList);

    if app.loading_prs {
        return PaneView::message(
            title,
            format!("{} Loading PRs...", spinner_frame(app.tick)),
            focused,
        );
    }
    if app.prs.is_empty() {
        return PaneView::message(title, "No pull requests found".to_string(), focused);
    }

    let available = app.layout.pr_list.width.saturating_sub(2) as usize;
    let columns = Columns::fit(available);

    let mut lines = vec![
        columns.row(["PR#", "Title", "Author", "State", "Workspace/Repo"]),
        "─".repeat(available),
    ];

    let rows = (app.layout.pr_list.height as usize).saturating_sub(4);
    let range = app.prs.visible_range(rows);
    let highlight = (!range.is_empty()).then(|| lines.len() + app.prs.cursor() - range.start);
    let mut accents = Vec::new();
    for pr in &app.prs.items()[range] {
        let id = pr.id.to_string();
        let state = pr.state.to_string();
        let source = pr.source_path();
        let cells = [
            id.as_str(),
            pr.title.as_str(),
            pr.author.as_str(),
            state.as_str(),
            source.as_str(),
        ];
        let row = columns.row(cells);
        if display_width(&row) <= available {
            let start = columns.offset(cells, 3);
            let len = pad(&state, columns.0[3]).trim_end().len();
            accents.push(Accent {
                line: lines.len(),
                range: start..start + len,
                state: pr.state,
            });
        }
        lines.push(truncate(&row, available));
    }

    lines.push(String::new());
    lines.push(truncate(
        &format!(
            "[{}/{}] ↑↓ navigate, Enter open, r refresh, q quit",
            app.prs.cursor() + 1,
            app.prs.len()
        ),
        available,
    ));

    PaneView {
        title: title.to_string(),
        lines,
        highlight,
        focused,
        placeholder: false,
        accents,
    }
}

/// Column widths for the PR table. Title, author and repository shrink in
/// proportion when the pane is too narrow for the full table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns([usize; 5]);

impl Columns {
    const BASE: [usize; 5] = [5, 40, 15, 10, 40];
    const FLEXIBLE: [usize; 3] = [1, 2, 4];

    fn fit(available: usize) -> Self {
        let separators = display_width(COLUMN_SEPARATOR) * (Self::BASE.len() - 1);
        let total: usize = Self::BASE.iter().sum::<usize>() + separators;
        let mut widths = Self::BASE;
        if available < total {
            let flexible: usize = Self::FLEXIBLE.iter().map(|&i| Self::BASE[i]).sum();
            let room = available.saturating_sub(total - flexible);
            for i in Self::FLEXIBLE {
                widths[i] = Self::BASE[i] * room / flexible;
            }
        }
        Columns(widths)
    }

    fn row(&self, cells: [&str; 5]) -> String {
        cells
            .iter()
            .zip(self.0)
            .map(|(cell, width)| pad(cell, width))
            .collect::<Vec<_>>()
            .join(COLUMN_SEPARATOR)
    }

    /// Byte offset of cell `index` within `row(cells)`.
    fn offset(&self, cells: [&str; 5], index: usize) -> usize {
        cells
            .iter()
            .zip(self.0)
            .take(index)
            .map(|(cell, width)| pad(cell, width).len() + COLUMN_SEPARATOR.len())
            .sum()
    }
}

pub fn repo_list(app: &App) -> PaneView {
    let title = "[3]-Repositories";
    let focused = app.focus.is_focused(Pane::RepoList);

    if app.repos.is_empty() {
        let text = if app.loading_repos {
            format!("{} Loading repositories...", spinner_frame(app.tick))
        } else {
            "No repositories found".to_string()
        };
        return PaneView::message(title, text, focused);
    }

    let available = app.layout.repo_list.width.saturating_sub(2) as usize;
    let rows = (app.layout.repo_list.height as usize).saturating_sub(2);
    let range = app.repos.visible_range(rows);
    let highlight = (!range.is_empty()).then(|| app.repos.cursor() - range.start);
    let active = app.repos.active_index();

    let mut lines: Vec<String> = app.repos.items()[range.clone()]
        .iter()
        .zip(range)
        .map(|(repo, index)| {
            let marker = if Some(index) == active { "● " } else { "  " };
            pad(&format!("{}{}", marker, repo.name), available)
        })
        .collect();

    lines.push(String::new());
    lines.push(truncate(
        &format!(
            "[{}/{}] Enter to load pull requests",
            app.repos.cursor() + 1,
            app.repos.len()
        ),
        available,
    ));

    PaneView {
        title: title.to_string(),
        lines,
        highlight,
        focused,
        placeholder: false,
        accents: Vec::new(),
    }
}

/// The full detail document for `pr`, wrapped to `width` columns.
pub fn detail_lines(pr: &PullRequest, width: usize) -> Vec<String> {
    detail_document(pr, width).lines
}

/// Detail lines under construction. Headings wrap at the full width; body
/// lines wrap inside their indent so continuations stay aligned.
struct Document {
    width: usize,
    lines: Vec<String>,
    state_line: Option<usize>,
}

impl Document {
    fn heading(&mut self, text: &str) {
        self.lines
            .extend(wrap(text, self.width).split('\n').map(str::to_string));
    }

    fn body(&mut self, text: &str) {
        let content = text.trim_start_matches(' ');
        if content.is_empty() {
            self.lines.push(String::new());
            return;
        }
        let indent = " ".repeat(2 + text.len() - content.len());
        let inner = self.width.saturating_sub(indent.len()).max(1);
        for piece in wrap_lines(content, inner) {
            self.lines.push(format!("{}{}", indent, piece));
        }
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }
}

fn detail_document(pr: &PullRequest, width: usize) -> Document {
    let mut doc = Document {
        width,
        lines: Vec::new(),
        state_line: None,
    };

    doc.heading("Title");
    doc.body(&pr.title);
    doc.blank();

    let state = format!("PR #{} - {}", pr.id, pr.state);
    if display_width(&state) <= width {
        doc.state_line = Some(doc.lines.len());
    }
    doc.heading(&state);
    doc.blank();

    doc.heading("Author");
    doc.body(&pr.author);
    doc.blank();

    if !pr.source_workspace.is_empty() && !pr.source_repo.is_empty() {
        doc.heading("Repository");
        doc.body(&pr.source_path());
        doc.blank();
    }

    doc.heading("Dates");
    doc.body(&format!("Created: {}", pr.created_at));
    doc.body(&format!("Updated: {}", pr.updated_at));
    doc.blank();

    if !pr.description.trim().is_empty() {
        doc.heading("Description");
        for line in markdown::render(&pr.description) {
            doc.body(&line);
        }
        doc.blank();
    }

    doc.heading("Link");
    doc.body(&pr.url);
    doc
}

pub fn detail(app: &App) -> PaneView {
    let title = "[2]-Detail";
    let focused = app.focus.is_focused(Pane::Detail);

    let Some(pr) = app.prs.selected() else {
        return PaneView::message(title, "Select a PR to view details".to_string(), focused);
    };

    let doc = detail_document(pr, app.layout.detail_text_width());
    let mut scroll = app.detail_scroll;
    scroll.set_bounds(doc.lines.len(), app.layout.detail_viewport());
    let visible = scroll.window(&doc.lines).to_vec();
    let accents = doc
        .state_line
        .and_then(|line| line.checked_sub(scroll.offset()))
        .filter(|&line| line < visible.len())
        .map(|line| {
            let start = format!("PR #{} - ", pr.id).len();
            Accent {
                line,
                range: start..start + pr.state.to_string().len(),
                state: pr.state,
            }
        })
        .into_iter()
        .collect();

    let title = if scroll.max_offset() > 0 {
        format!("{} ({}/{})", title, scroll.offset() + 1, scroll.max_offset() + 1)
    } else {
        title.to_string()
    };

    PaneView {
        title,
        lines: visible,
        highlight: None,
        focused,
        placeholder: false,
        accents,
    }
}

pub fn status_line(app: &App) -> String {
    if let Some(error) = &app.fatal_error {
        return format!("Error: {}", error);
    }
    let hint = match app.focus.current() {
        Some(Pane::RepoList) => "j/k: move | Enter: load PRs | Tab: PRs | 1/2/3: focus | r: refresh | q: quit",
        Some(Pane::PrList) => "j/k: move | Enter: open in browser | Tab: repos | 1/2/3: focus | r: refresh | q: quit",
        Some(Pane::Detail) => "j/k: scroll | Ctrl+d/u: half page | 1/3: lists | q: quit",
        None => "1/2/3: focus | q: quit",
    };
    hint.to_string()
}
