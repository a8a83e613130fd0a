use crate::error::{LazybbError, Result};
use crate::fetch_guard::RequestToken;
use crate::focus::Pane;
use crate::types::{PullRequest, Repository};

/// Everything the coordinator reacts to. Key presses (already mapped to
/// intents) and background fetch completions travel through the same
/// channel, so they are handled strictly in arrival order.
#[derive(Debug)]
pub enum Action {
    Start,
    Quit,
    Refresh,
    FocusPane(Pane),
    CyclePane,
    ScrollUp,
    ScrollDown,
    HalfPageUp,
    HalfPageDown,
    Select,
    Tick,
    Resize {
        width: u16,
        height: u16,
    },

    ReposLoaded {
        token: RequestToken,
        result: Result<Vec<Repository>>,
    },
    PrsLoaded {
        key: String,
        token: RequestToken,
        result: Result<Vec<PullRequest>>,
    },
    OpenFailed(LazybbError),

    None,
}

impl Action {
    /// Actions triggered directly by the user, as opposed to completions and
    /// timer ticks.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            Action::Refresh
                | Action::FocusPane(_)
                | Action::CyclePane
                | Action::ScrollUp
                | Action::ScrollDown
                | Action::HalfPageUp
                | Action::HalfPageDown
                | Action::Select
        )
    }
}

/// Side effects requested by the coordinator, executed by the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchRepos {
        token: RequestToken,
    },
    FetchPrs {
        key: String,
        token: RequestToken,
    },
    OpenUrl(String),
    Terminate,
}
