use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::cli::Cli;
use crate::error::{LazybbError, Result};

pub const TOKEN_VAR: &str = "BITBUCKET_TOKEN";
pub const WORKSPACE_VAR: &str = "BITBUCKET_WORKSPACE";
pub const REPO_VAR: &str = "BITBUCKET_REPO";
pub const PROJECT_VAR: &str = "BITBUCKET_PROJECT";
pub const API_URL_VAR: &str = "BITBUCKET_API_URL";
pub const ROLE_VAR: &str = "LAZYBB_REPO_ROLE";
pub const MAX_PAGES_VAR: &str = "LAZYBB_MAX_PAGES";
pub const LOG_VAR: &str = "LAZYBB_LOG";

const DEFAULT_API_URL: &str = "https://api.bitbucket.org/2.0";

/// Optional settings from `config.toml`. Every key may be overridden by the
/// environment or the command line.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct FileConfig {
    pub token: Option<String>,
    pub workspace: Option<String>,
    pub repo: Option<String>,
    pub project: Option<String>,
    pub api_url: Option<String>,
    pub repo_role: Option<String>,
    pub max_pages: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub workspace: String,
    pub repo: String,
    pub project: Option<String>,
    pub api_url: String,
    pub repo_role: String,
    pub max_pages: u32,
    pub timeout_secs: u64,
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: String::new(),
            workspace: String::new(),
            repo: String::new(),
            project: None,
            api_url: DEFAULT_API_URL.to_string(),
            repo_role: "admin".to_string(),
            max_pages: 5,
            timeout_secs: 30,
            log_file: None,
        }
    }
}

fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("lazybb").join("config.toml"))
}

impl FileConfig {
    /// Read the config file. A missing file is an empty config; a malformed
    /// one is reported and ignored.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path.map(Path::to_path_buf).or_else(config_path) else {
            return FileConfig::default();
        };

        let Ok(content) = std::fs::read_to_string(&path) else {
            return FileConfig::default();
        };

        match toml::from_str::<FileConfig>(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring malformed config file");
                FileConfig::default()
            }
        }
    }
}

impl Config {
    /// Load from every source: flags, environment, `./.env`, config file.
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = FileConfig::load(cli.config.as_deref());
        let dotenv = load_dotenv_file(Path::new(".env"));
        Self::resolve(cli, |key| {
            std::env::var(key)
                .ok()
                .or_else(|| dotenv.get(key).cloned())
        }, file)
    }

    /// Merge the sources, highest precedence first: `cli`, `lookup`
    /// (environment then `.env`), `file`, defaults.
    pub fn resolve(
        cli: &Cli,
        lookup: impl Fn(&str) -> Option<String>,
        file: FileConfig,
    ) -> Result<Self> {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let token = get(TOKEN_VAR).or(file.token);
        let workspace = cli.workspace.clone().or_else(|| get(WORKSPACE_VAR)).or(file.workspace);
        let repo = cli.repo.clone().or_else(|| get(REPO_VAR)).or(file.repo);

        let mut missing = Vec::new();
        if token.is_none() {
            missing.push(TOKEN_VAR);
        }
        if workspace.is_none() {
            missing.push(WORKSPACE_VAR);
        }
        if repo.is_none() {
            missing.push(REPO_VAR);
        }
        if !missing.is_empty() {
            return Err(LazybbError::Config(format!(
                "missing required environment variables: [{}]",
                missing.join(", ")
            )));
        }

        let max_pages = match get(MAX_PAGES_VAR) {
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                LazybbError::Config(format!("{} must be a positive integer, got {:?}", MAX_PAGES_VAR, raw))
            })?,
            None => file.max_pages.unwrap_or(defaults.max_pages),
        };

        Ok(Config {
            token: token.unwrap_or_default(),
            workspace: workspace.unwrap_or_default(),
            repo: repo.unwrap_or_default(),
            project: get(PROJECT_VAR).or(file.project),
            api_url: cli
                .api_url
                .clone()
                .or_else(|| get(API_URL_VAR))
                .or(file.api_url)
                .unwrap_or(defaults.api_url),
            repo_role: get(ROLE_VAR).or(file.repo_role).unwrap_or(defaults.repo_role),
            max_pages,
            timeout_secs: file.timeout_secs.unwrap_or(defaults.timeout_secs),
            log_file: cli
                .log_file
                .clone()
                .or_else(|| get(LOG_VAR).map(PathBuf::from))
                .or(file.log_file),
        })
    }
}

impl Config {
    /// Where logs go: the configured file, otherwise `lazybb.log` in the
    /// user's cache directory. Never the terminal the UI is drawn on.
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file
            .clone()
            .or_else(|| dirs::cache_dir().map(|dir| dir.join("lazybb").join("lazybb.log")))
    }
}

fn load_dotenv_file(path: &Path) -> HashMap<String, String> {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return HashMap::new();
    };
    parse_dotenv(&contents)
}

/// Parse `.env` contents. Malformed lines are reported and skipped.
pub fn parse_dotenv(contents: &str) -> HashMap<String, String> {
    dotenvy::from_read_iter(contents.as_bytes())
        .filter_map(|item| match item {
            Ok(pair) => Some(pair),
            Err(e) => {
                warn!(error = %e, "skipping malformed .env line");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            (TOKEN_VAR, "secret"),
            (WORKSPACE_VAR, "acme"),
            (REPO_VAR, "api"),
        ]
    }

    #[test]
    fn resolves_from_environment_with_defaults() {
        let config = Config::resolve(&Cli::default(), env(&required()), FileConfig::default()).unwrap();
        assert_eq!(config.token, "secret");
        assert_eq!(config.workspace, "acme");
        assert_eq!(config.repo, "api");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.repo_role, "admin");
        assert_eq!(config.max_pages, 5);
        assert!(config.log_file.is_none());
    }

    #[test]
    fn reports_every_missing_variable() {
        let err = Config::resolve(&Cli::default(), env(&[(WORKSPACE_VAR, "acme")]), FileConfig::default())
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains(TOKEN_VAR));
        assert!(message.contains(REPO_VAR));
        assert!(!message.contains(WORKSPACE_VAR));
    }

    #[test]
    fn empty_values_count_as_missing() {
        let err = Config::resolve(
            &Cli::default(),
            env(&[(TOKEN_VAR, ""), (WORKSPACE_VAR, "acme"), (REPO_VAR, "api")]),
            FileConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, LazybbError::Config(_)));
    }

    #[test]
    fn cli_beats_environment_beats_file() {
        let cli = Cli {
            workspace: Some("from-cli".to_string()),
            ..Cli::default()
        };
        let file = FileConfig {
            repo: Some("from-file".to_string()),
            workspace: Some("file-ws".to_string()),
            repo_role: Some("member".to_string()),
            max_pages: Some(2),
            ..FileConfig::default()
        };
        let config = Config::resolve(&cli, env(&[(TOKEN_VAR, "t"), (REPO_VAR, "from-env")]), file).unwrap();
        assert_eq!(config.workspace, "from-cli");
        assert_eq!(config.repo, "from-env");
        assert_eq!(config.repo_role, "member");
        assert_eq!(config.max_pages, 2);
    }

    #[test]
    fn rejects_bad_page_limit() {
        let mut vars = required();
        vars.push((MAX_PAGES_VAR, "lots"));
        assert!(Config::resolve(&Cli::default(), env(&vars), FileConfig::default()).is_err());
    }

    #[test]
    fn parse_file_config() {
        let toml_str = r#"
workspace = "acme"
repo = "api"
api_url = "https://bitbucket.example.com/2.0"
max_pages = 3
"#;
        let file: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(file.workspace.as_deref(), Some("acme"));
        assert_eq!(file.max_pages, Some(3));
        assert!(file.token.is_none());
    }

    #[test]
    fn missing_config_file_is_empty() {
        let file = FileConfig::load(Some(Path::new("/nonexistent/lazybb/config.toml")));
        assert!(file.workspace.is_none());
    }

    #[test]
    fn parse_dotenv_lines() {
        let contents = r#"
# credentials
BITBUCKET_TOKEN="abc 123"
export BITBUCKET_WORKSPACE=acme
BITBUCKET_REPO='api'
"#;
        let map = parse_dotenv(contents);
        assert_eq!(map.get(TOKEN_VAR).map(String::as_str), Some("abc 123"));
        assert_eq!(map.get(WORKSPACE_VAR).map(String::as_str), Some("acme"));
        assert_eq!(map.get(REPO_VAR).map(String::as_str), Some("api"));
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn dotenv_inline_comments_are_stripped() {
        let map = parse_dotenv("BITBUCKET_REPO=api # main repo\n");
        assert_eq!(map.get(REPO_VAR).map(String::as_str), Some("api"));
    }

    #[test]
    fn environment_beats_dotenv() {
        let dotenv = parse_dotenv("BITBUCKET_REPO=from-dotenv\nBITBUCKET_TOKEN=t\n");
        let process = env(&[(WORKSPACE_VAR, "acme"), (REPO_VAR, "from-env")]);
        let config = Config::resolve(
            &Cli::default(),
            |key| process(key).or_else(|| dotenv.get(key).cloned()),
            FileConfig::default(),
        )
        .unwrap();
        assert_eq!(config.repo, "from-env");
        assert_eq!(config.token, "t");
    }

    #[test]
    fn log_path_prefers_configured_file() {
        let config = Config {
            log_file: Some(PathBuf::from("/tmp/bb.log")),
            ..Config::default()
        };
        assert_eq!(config.log_path(), Some(PathBuf::from("/tmp/bb.log")));

        let default = Config::default().log_path();
        if dirs::cache_dir().is_some() {
            assert!(default.is_some_and(|p| p.ends_with("lazybb/lazybb.log")));
        }
    }
}
