use async_trait::async_trait;

use crate::error::Result;
use crate::types::{PullRequest, Repository};

/// Repository argument meaning "the configured default repository".
pub const DEFAULT_REPO: &str = "";

/// Remote source of repositories and pull requests. Each call resolves
/// exactly once; timeouts are the implementation's business.
#[async_trait]
pub trait Forge: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    async fn fetch_repositories(&self) -> Result<Vec<Repository>>;

    /// `repo` is a repository slug, or [`DEFAULT_REPO`] for the configured
    /// default repository.
    async fn fetch_pull_requests(&self, repo: &str) -> Result<Vec<PullRequest>>;
}
