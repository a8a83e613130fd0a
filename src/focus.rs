/// The three independently focusable regions of the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    RepoList,
    PrList,
    Detail,
}

/// What the focus rules need to know about the rest of the state.
#[derive(Debug, Clone, Copy, Default)]
pub struct FocusContext {
    pub repos_empty: bool,
    pub prs_empty: bool,
    pub loading_prs: bool,
}

impl FocusContext {
    fn can_enter(&self, pane: Pane) -> bool {
        match pane {
            Pane::RepoList => !self.repos_empty,
            // PR data may be mid-replacement while a fetch is in flight
            Pane::PrList => !self.prs_empty && !self.loading_prs,
            Pane::Detail => !self.loading_prs,
        }
    }
}

/// Owner of keyboard focus. `None` until the first load gives some pane
/// something to show.
#[derive(Debug, Clone, Copy, Default)]
pub struct FocusCoordinator {
    current: Option<Pane>,
}

impl FocusCoordinator {
    pub fn current(&self) -> Option<Pane> {
        self.current
    }

    pub fn is_focused(&self, pane: Pane) -> bool {
        self.current == Some(pane)
    }

    /// Move focus straight to `pane`. Returns whether focus changed hands.
    pub fn focus(&mut self, pane: Pane, ctx: FocusContext) -> bool {
        if !ctx.can_enter(pane) {
            return false;
        }
        self.current = Some(pane);
        true
    }

    /// Alternate between the two list panes. Detail and the unfocused state
    /// never take part in the cycle.
    pub fn cycle(&mut self, ctx: FocusContext) -> bool {
        let target = match self.current {
            Some(Pane::PrList) => Pane::RepoList,
            Some(Pane::RepoList) => Pane::PrList,
            Some(Pane::Detail) | None => return false,
        };
        self.focus(target, ctx)
    }

    /// Hand focus to the first list with rows, but only if nothing holds it.
    pub fn settle(&mut self, ctx: FocusContext) {
        if self.current.is_some() {
            return;
        }
        if !self.focus(Pane::PrList, ctx) {
            self.focus(Pane::RepoList, ctx);
        }
    }
}
