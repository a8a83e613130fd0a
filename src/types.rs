use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub slug: String,
    pub name: String,
    pub url: String,
}

/// Pull request state. Bitbucket adds states over time (e.g. `SUPERSEDED`),
/// so anything unrecognised lands in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrState {
    Open,
    Merged,
    Declined,
    Other,
}

impl PrState {
    pub fn from_api(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "OPEN" => PrState::Open,
            "MERGED" => PrState::Merged,
            "DECLINED" => PrState::Declined,
            _ => PrState::Other,
        }
    }
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrState::Open => write!(f, "OPEN"),
            PrState::Merged => write!(f, "MERGED"),
            PrState::Declined => write!(f, "DECLINED"),
            PrState::Other => write!(f, "OTHER"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub author: String,
    pub state: PrState,
    pub created_at: String,
    pub updated_at: String,
    pub source_workspace: String,
    pub source_repo: String,
    pub url: String,
}

impl PullRequest {
    /// `workspace/repo` of the source branch, or empty when unknown.
    pub fn source_path(&self) -> String {
        if self.source_workspace.is_empty() && self.source_repo.is_empty() {
            String::new()
        } else {
            format!("{}/{}", self.source_workspace, self.source_repo)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_states_map() {
        assert_eq!(PrState::from_api("OPEN"), PrState::Open);
        assert_eq!(PrState::from_api("merged"), PrState::Merged);
        assert_eq!(PrState::from_api("DECLINED"), PrState::Declined);
    }

    #[test]
    fn unknown_state_falls_back() {
        assert_eq!(PrState::from_api("SUPERSEDED"), PrState::Other);
        assert_eq!(PrState::from_api(""), PrState::Other);
        assert_eq!(PrState::Other.to_string(), "OTHER");
    }
}
