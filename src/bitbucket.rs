use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{LazybbError, Result};
use crate::forge::{Forge, DEFAULT_REPO};
use crate::types::{PrState, PullRequest, Repository};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct Bitbucket {
    client: Client,
    api_url: String,
    token: String,
    workspace: String,
    default_repo: String,
    role: String,
    max_pages: u32,
}

impl std::fmt::Debug for Bitbucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitbucket")
            .field("workspace", &self.workspace)
            .finish_non_exhaustive()
    }
}

impl Bitbucket {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LazybbError::Config(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            workspace: config.workspace.clone(),
            default_repo: config.repo.clone(),
            role: config.repo_role.clone(),
            max_pages: config.max_pages.max(1),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn resolve_repo<'a>(&'a self, repo: &'a str) -> &'a str {
        if repo == DEFAULT_REPO {
            &self.default_repo
        } else {
            repo
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            let message = format!("API returned status {}: {}", status.as_u16(), text);
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(LazybbError::Auth(message));
            }
            return Err(LazybbError::Api(message));
        }

        response.json().await.map_err(|e| LazybbError::Decode(e.to_string()))
    }

    async fn get_paged<T: DeserializeOwned>(&self, url: String) -> Result<Vec<T>> {
        collect_pages(url, &self.api_url, self.max_pages, |url| async move {
            self.get_json::<Page<T>>(&url).await
        })
        .await
    }
}

/// Walk `next` links from `first`, collecting every page's values until the
/// page cap is hit. Links outside `base` are not followed, so the token only
/// goes to the configured API.
async fn collect_pages<T, F, Fut>(
    first: String,
    base: &str,
    max_pages: u32,
    mut fetch: F,
) -> Result<Vec<T>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut items = Vec::new();
    let mut next = Some(first);
    let mut pages = 0;

    while let Some(url) = next.take() {
        if pages == max_pages {
            warn!(max_pages, "page limit reached, list is partial");
            break;
        }
        if !is_under(&url, base) {
            warn!(%url, "not following pagination link outside the API");
            break;
        }
        let page = fetch(url).await?;
        pages += 1;
        items.extend(page.values);
        next = page.next;
    }

    debug!(pages, count = items.len(), "fetched paged listing");
    Ok(items)
}

fn is_under(url: &str, base: &str) -> bool {
    url.strip_prefix(base)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'))
}

// Bitbucket API response types

#[derive(Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    values: Vec<T>,
    next: Option<String>,
}

#[derive(Deserialize)]
struct BbRepository {
    slug: String,
    name: Option<String>,
    links: Option<BbLinks>,
}

#[derive(Deserialize)]
struct BbLinks {
    html: Option<BbHref>,
}

#[derive(Deserialize)]
struct BbHref {
    href: String,
}

#[derive(Deserialize)]
struct BbUser {
    display_name: Option<String>,
    username: Option<String>,
    nickname: Option<String>,
}

#[derive(Deserialize)]
struct BbBranch {
    repository: Option<BbRepoRef>,
}

#[derive(Deserialize)]
struct BbRepoRef {
    full_name: Option<String>,
}

#[derive(Deserialize)]
struct BbPullRequest {
    id: u64,
    title: String,
    description: Option<String>,
    author: Option<BbUser>,
    state: Option<String>,
    created_on: Option<String>,
    updated_on: Option<String>,
    links: Option<BbLinks>,
    source: Option<BbBranch>,
}

fn html_href(links: Option<BbLinks>) -> String {
    links
        .and_then(|l| l.html)
        .map(|h| h.href)
        .unwrap_or_default()
}

fn format_timestamp(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return String::new();
    };
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&chrono::Utc).format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn author_name(user: Option<BbUser>) -> String {
    let Some(user) = user else {
        return String::new();
    };
    [user.display_name, user.username, user.nickname]
        .into_iter()
        .flatten()
        .find(|name| !name.is_empty())
        .unwrap_or_default()
}

/// Split `workspace/repo`; anything else yields two empty strings.
fn split_full_name(full_name: &str) -> (String, String) {
    match full_name.split_once('/') {
        Some((workspace, repo)) if !workspace.is_empty() && !repo.is_empty() => {
            (workspace.to_string(), repo.to_string())
        }
        _ => (String::new(), String::new()),
    }
}

impl From<BbRepository> for Repository {
    fn from(r: BbRepository) -> Self {
        Repository {
            name: r.name.filter(|n| !n.is_empty()).unwrap_or_else(|| r.slug.clone()),
            slug: r.slug,
            url: html_href(r.links),
        }
    }
}

impl From<BbPullRequest> for PullRequest {
    fn from(pr: BbPullRequest) -> Self {
        let full_name = pr
            .source
            .and_then(|s| s.repository)
            .and_then(|r| r.full_name)
            .unwrap_or_default();
        let (source_workspace, source_repo) = split_full_name(&full_name);

        PullRequest {
            id: pr.id,
            title: pr.title,
            description: pr.description.unwrap_or_default(),
            author: author_name(pr.author),
            state: PrState::from_api(pr.state.as_deref().unwrap_or_default()),
            created_at: format_timestamp(pr.created_on.as_deref()),
            updated_at: format_timestamp(pr.updated_on.as_deref()),
            source_workspace,
            source_repo,
            url: html_href(pr.links),
        }
    }
}

#[async_trait]
impl Forge for Bitbucket {
    fn name(&self) -> &str {
        "Bitbucket"
    }

    async fn fetch_repositories(&self) -> Result<Vec<Repository>> {
        let url = self.api_url(&format!(
            "/repositories/{}?role={}&pagelen=100",
            urlencoding::encode(&self.workspace),
            urlencoding::encode(&self.role)
        ));
        let repos: Vec<BbRepository> = self.get_paged(url).await?;
        Ok(repos.into_iter().map(Repository::from).collect())
    }

    async fn fetch_pull_requests(&self, repo: &str) -> Result<Vec<PullRequest>> {
        let repo = self.resolve_repo(repo);
        let url = self.api_url(&format!(
            "/repositories/{}/{}/pullrequests?pagelen=50",
            urlencoding::encode(&self.workspace),
            urlencoding::encode(repo)
        ));
        let prs: Vec<BbPullRequest> = self.get_paged(url).await?;
        Ok(prs.into_iter().map(PullRequest::from).collect())
    }
}
