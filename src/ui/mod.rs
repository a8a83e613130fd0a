mod loading;
mod pane;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Padding, Paragraph};
use ratatui::Frame;

use crate::app::App;
use crate::view;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    if app.loading_repos && app.repos.is_empty() {
        loading::render(frame, app, chunks[1]);
    } else {
        render_panes(frame, app, chunks[1]);
    }

    render_status_bar(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = match &app.selected_repo {
        Some(slug) => format!("lazybb - {}", slug),
        None => "lazybb".to_string(),
    };

    let header = Paragraph::new(Line::from(vec![Span::styled(
        title,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )]))
    .style(Style::default().bg(Color::DarkGray));

    frame.render_widget(header, area);
}

fn render_panes(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(app.layout.pr_list.width + 2),
            Constraint::Min(0),
        ])
        .split(area);

    let lists = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(app.layout.pr_list.height + 2),
            Constraint::Min(0),
        ])
        .split(columns[0]);

    let list_padding = Padding::horizontal(1);
    pane::render(frame, view::pr_list(app), list_padding, lists[0]);
    pane::render(frame, view::repo_list(app), list_padding, lists[1]);
    pane::render(frame, view::detail(app), Padding::new(2, 2, 1, 1), columns[1]);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let style = if app.fatal_error.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Gray)
    };
    let status = Line::from(vec![Span::styled(view::status_line(app), style)]);

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;
    use crate::action::{Action, Command};
    use crate::error::LazybbError;
    use crate::event::Event;
    use crate::types::{PrState, PullRequest, Repository};

    fn screen(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .chunks(width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn loaded_app(width: u16, height: u16) -> App {
        let mut app = App::new();
        let action = app.handle_event(Event::Resize(width, height));
        app.update(action);

        let commands = app.update(Action::Start);
        let Some(Command::FetchRepos { token }) = commands.first().cloned() else {
            panic!("expected repository fetch");
        };
        let commands = app.update(Action::ReposLoaded {
            token,
            result: Ok(vec![Repository {
                slug: "api".to_string(),
                name: "api".to_string(),
                url: String::new(),
            }]),
        });
        let Some(Command::FetchPrs { key, token }) = commands.first().cloned() else {
            panic!("expected pull request fetch");
        };
        app.update(Action::PrsLoaded {
            key,
            token,
            result: Ok(vec![PullRequest {
                id: 42,
                title: "Add retry to webhook sender".to_string(),
                description: "Retries **three** times.".to_string(),
                author: "Grace".to_string(),
                state: PrState::Open,
                created_at: "2024-03-01 10:00:00".to_string(),
                updated_at: "2024-03-02 11:30:00".to_string(),
                source_workspace: "acme".to_string(),
                source_repo: "api".to_string(),
                url: "https://bitbucket.org/acme/api/pull-requests/42".to_string(),
            }]),
        });
        app
    }

    #[test]
    fn loading_screen_before_repositories_arrive() {
        let app = App::new();
        let out = screen(&app, 80, 20);
        assert!(out.contains("Loading repositories..."));
    }

    #[test]
    fn draws_all_three_panes() {
        let app = loaded_app(120, 30);
        let out = screen(&app, 120, 30);
        assert!(out.contains("[1]-PRs"));
        assert!(out.contains("[2]-Detail"));
        assert!(out.contains("[3]-Repositories"));
        assert!(out.contains("Add retry"));
        assert!(out.contains("Retries three times."));
        assert!(out.contains("● api"));
        assert!(out.starts_with("lazybb - api"));
    }

    #[test]
    fn status_bar_shows_errors() {
        let mut app = loaded_app(100, 24);
        app.update(Action::OpenFailed(LazybbError::Open("no browser".to_string())));
        let out = screen(&app, 100, 24);
        let last = out.lines().last().unwrap_or_default();
        assert!(last.starts_with("Error: Failed to open browser: no browser"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let app = loaded_app(10, 4);
        screen(&app, 10, 4);
    }

    #[test]
    fn detail_state_is_coloured() {
        let app = loaded_app(120, 30);
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let buffer = terminal.backend().buffer();
        let (row, x) = buffer
            .content
            .chunks(120)
            .find_map(|row| {
                let text: String = row.iter().map(|cell| cell.symbol()).collect();
                let at = text.find("PR #42 - OPEN")? + "PR #42 - ".len();
                Some((row, text[..at].chars().count()))
            })
            .expect("state line on screen");
        assert_eq!(row[x].fg, Color::Green);
        assert_eq!(row[x + 3].fg, Color::Green);
        assert_eq!(row[x - 2].fg, Color::Reset);
    }
}
