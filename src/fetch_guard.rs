use std::collections::HashMap;
use std::fmt;

use tracing::debug;

/// The resource a fetch is for. The repository listing and each repository's
/// pull requests get separate slots, whatever the slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FetchKey {
    Repos,
    PullRequests(String),
}

impl FetchKey {
    pub fn pull_requests(slug: &str) -> Self {
        FetchKey::PullRequests(slug.to_string())
    }
}

impl fmt::Display for FetchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchKey::Repos => write!(f, "repositories"),
            FetchKey::PullRequests(slug) => write!(f, "pull requests of {:?}", slug),
        }
    }
}

/// Correlation id handed to a background fetch. Tokens only grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Outcome of checking a completed fetch against the latest request.
#[derive(Debug, PartialEq, Eq)]
pub enum Accepted<T> {
    Current(T),
    Stale,
}

/// Remembers the latest request per resource key so that only the newest
/// response for a key can reach visible state.
#[derive(Debug, Default)]
pub struct FetchGuard {
    next: u64,
    current: HashMap<FetchKey, RequestToken>,
}

impl FetchGuard {
    pub fn issue(&mut self, key: FetchKey) -> RequestToken {
        self.next += 1;
        let token = RequestToken(self.next);
        debug!(%key, token = token.0, "issued fetch token");
        self.current.insert(key, token);
        token
    }

    pub fn is_current(&self, key: &FetchKey, token: RequestToken) -> bool {
        self.current.get(key) == Some(&token)
    }

    pub fn accept<T>(&self, key: &FetchKey, token: RequestToken, result: T) -> Accepted<T> {
        if self.is_current(key, token) {
            Accepted::Current(result)
        } else {
            debug!(%key, token = token.0, "dropping stale fetch result");
            Accepted::Stale
        }
    }
}

#[cfg(test)]
impl RequestToken {
    pub fn new(raw: u64) -> Self {
        RequestToken(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prs(slug: &str) -> FetchKey {
        FetchKey::pull_requests(slug)
    }

    #[test]
    fn newer_token_supersedes_older() {
        let mut guard = FetchGuard::default();
        let t1 = guard.issue(prs("repo-a"));
        let t2 = guard.issue(prs("repo-a"));
        assert!(t2 > t1);
        assert_eq!(guard.accept(&prs("repo-a"), t1, "old"), Accepted::Stale);
        assert_eq!(guard.accept(&prs("repo-a"), t2, "new"), Accepted::Current("new"));
    }

    #[test]
    fn keys_are_independent() {
        let mut guard = FetchGuard::default();
        let a = guard.issue(prs("repo-a"));
        let b = guard.issue(prs("repo-b"));
        assert_eq!(guard.accept(&prs("repo-a"), a, 1), Accepted::Current(1));
        assert_eq!(guard.accept(&prs("repo-b"), b, 2), Accepted::Current(2));
    }

    #[test]
    fn token_for_other_key_is_stale() {
        let mut guard = FetchGuard::default();
        let a = guard.issue(prs("repo-a"));
        guard.issue(prs("repo-b"));
        assert_eq!(guard.accept(&prs("repo-b"), a, ()), Accepted::Stale);
    }

    #[test]
    fn repository_named_repos_has_its_own_slot() {
        let mut guard = FetchGuard::default();
        let listing = guard.issue(FetchKey::Repos);
        let repo = guard.issue(prs("repos"));
        assert_eq!(guard.accept(&FetchKey::Repos, listing, ()), Accepted::Current(()));
        assert_eq!(guard.accept(&prs("repos"), repo, ()), Accepted::Current(()));
        assert_eq!(guard.accept(&FetchKey::Repos, repo, ()), Accepted::Stale);
    }

    #[test]
    fn unknown_key_is_stale() {
        let guard = FetchGuard::default();
        assert_eq!(
            guard.accept(&FetchKey::Repos, RequestToken::new(1), ()),
            Accepted::Stale
        );
    }

    #[test]
    fn accepting_does_not_consume_the_token() {
        let mut guard = FetchGuard::default();
        let t = guard.issue(FetchKey::Repos);
        assert!(guard.is_current(&FetchKey::Repos, t));
        let _ = guard.accept(&FetchKey::Repos, t, ());
        assert!(guard.is_current(&FetchKey::Repos, t));
    }
}
