use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::action::{Action, Command};
use crate::error::{LazybbError, Result};
use crate::forge::Forge;

/// Hands a URL to whatever the desktop uses for links.
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

pub struct SystemOpener;

impl UrlOpener for SystemOpener {
    fn open(&self, url: &str) -> Result<()> {
        open::that(url).map_err(|e| LazybbError::Open(format!("{}: {}", url, e)))
    }
}

/// Carries out the commands the app asks for. Fetches run on their own task
/// and report back through `action_tx`.
pub struct Runtime {
    forge: Arc<dyn Forge>,
    opener: Arc<dyn UrlOpener>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl Runtime {
    pub fn new(
        forge: Arc<dyn Forge>,
        opener: Arc<dyn UrlOpener>,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            forge,
            opener,
            action_tx,
        }
    }

    /// Run one command. Returns `false` once the app has asked to terminate.
    pub fn execute(&self, command: Command) -> bool {
        match command {
            Command::FetchRepos { token } => {
                let tx = self.action_tx.clone();
                let forge = Arc::clone(&self.forge);
                tokio::spawn(async move {
                    let result = forge.fetch_repositories().await;
                    tx.send(Action::ReposLoaded { token, result }).ok();
                });
            }
            Command::FetchPrs { key, token } => {
                debug!(%key, "fetching pull requests");
                let tx = self.action_tx.clone();
                let forge = Arc::clone(&self.forge);
                tokio::spawn(async move {
                    let result = forge.fetch_pull_requests(&key).await;
                    tx.send(Action::PrsLoaded { key, token, result }).ok();
                });
            }
            Command::OpenUrl(url) => {
                info!(%url, "opening pull request");
                if let Err(e) = self.opener.open(&url) {
                    self.action_tx.send(Action::OpenFailed(e)).ok();
                }
            }
            Command::Terminate => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::fetch_guard::RequestToken;
    use crate::forge::DEFAULT_REPO;
    use crate::types::{PrState, PullRequest, Repository};

    #[derive(Debug)]
    struct FakeForge;

    #[async_trait]
    impl Forge for FakeForge {
        fn name(&self) -> &str {
            "fake"
        }

        async fn fetch_repositories(&self) -> Result<Vec<Repository>> {
            Ok(vec![Repository {
                slug: "api".to_string(),
                name: "API".to_string(),
                url: String::new(),
            }])
        }

        async fn fetch_pull_requests(&self, repo: &str) -> Result<Vec<PullRequest>> {
            if repo == DEFAULT_REPO {
                return Err(LazybbError::Api("API returned status 404: not found".to_string()));
            }
            Ok(vec![PullRequest {
                id: 3,
                title: format!("change in {}", repo),
                description: String::new(),
                author: "Ada".to_string(),
                state: PrState::Open,
                created_at: String::new(),
                updated_at: String::new(),
                source_workspace: String::new(),
                source_repo: String::new(),
                url: String::new(),
            }])
        }
    }

    #[derive(Default)]
    struct RecordingOpener {
        opened: Mutex<Vec<String>>,
        fail: bool,
    }

    impl UrlOpener for RecordingOpener {
        fn open(&self, url: &str) -> Result<()> {
            if self.fail {
                return Err(LazybbError::Open(url.to_string()));
            }
            self.opened.lock().unwrap().push(url.to_string());
            Ok(())
        }
    }

    fn runtime(opener: Arc<RecordingOpener>) -> (Runtime, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Runtime::new(Arc::new(FakeForge), opener, tx), rx)
    }

    #[tokio::test]
    async fn fetch_results_come_back_with_their_token() {
        let (runtime, mut rx) = runtime(Arc::default());
        let token = RequestToken::new(7);

        assert!(runtime.execute(Command::FetchPrs {
            key: "api".to_string(),
            token,
        }));
        match rx.recv().await {
            Some(Action::PrsLoaded { key, token: got, result }) => {
                assert_eq!(key, "api");
                assert_eq!(got, token);
                assert_eq!(result.unwrap()[0].title, "change in api");
            }
            other => panic!("unexpected {:?}", other),
        }

        runtime.execute(Command::FetchRepos { token });
        assert!(matches!(
            rx.recv().await,
            Some(Action::ReposLoaded { result: Ok(repos), .. }) if repos.len() == 1
        ));
    }

    #[tokio::test]
    async fn fetch_errors_are_delivered_as_results() {
        let (runtime, mut rx) = runtime(Arc::default());
        runtime.execute(Command::FetchPrs {
            key: DEFAULT_REPO.to_string(),
            token: RequestToken::new(1),
        });
        assert!(matches!(
            rx.recv().await,
            Some(Action::PrsLoaded { result: Err(LazybbError::Api(_)), .. })
        ));
    }

    #[tokio::test]
    async fn open_url_uses_opener() {
        let opener = Arc::new(RecordingOpener::default());
        let (runtime, mut rx) = runtime(Arc::clone(&opener));
        assert!(runtime.execute(Command::OpenUrl("https://example.com/pr/1".to_string())));
        assert_eq!(*opener.opened.lock().unwrap(), vec!["https://example.com/pr/1"]);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn open_failure_is_reported() {
        let opener = Arc::new(RecordingOpener {
            fail: true,
            ..Default::default()
        });
        let (runtime, mut rx) = runtime(opener);
        runtime.execute(Command::OpenUrl("https://example.com".to_string()));
        assert!(matches!(rx.try_recv(), Ok(Action::OpenFailed(LazybbError::Open(_)))));
    }

    #[tokio::test]
    async fn terminate_stops_the_loop() {
        let (runtime, _rx) = runtime(Arc::default());
        assert!(!runtime.execute(Command::Terminate));
    }
}
