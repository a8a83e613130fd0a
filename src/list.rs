use std::ops::Range;

/// Cursor bookkeeping over an ordered list of rows.
///
/// `cursor` is where the highlight is; `active` is the row whose children are
/// currently loaded, which can differ on the repository list until Enter is
/// pressed.
#[derive(Debug, Clone)]
pub struct ListState<T> {
    items: Vec<T>,
    cursor: usize,
    active: Option<usize>,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: 0,
            active: None,
        }
    }
}

impl<T> ListState<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn move_up(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if !self.items.is_empty() && self.cursor < self.items.len() - 1 {
            self.cursor += 1;
        }
    }

    /// Replace the rows. The cursor goes back to the top when the new list is
    /// too short to hold it.
    pub fn set_items(&mut self, items: Vec<T>) {
        if items.len() <= self.cursor {
            self.cursor = 0;
        }
        if self.active.is_some_and(|i| i >= items.len()) {
            self.active = None;
        }
        self.items = items;
    }

    /// Move the cursor to `index`, clamped to the last row.
    pub fn select(&mut self, index: usize) {
        self.cursor = index.min(self.items.len().saturating_sub(1));
    }

    pub fn selected(&self) -> Option<&T> {
        self.items.get(self.cursor)
    }

    pub fn set_active(&mut self, index: usize) {
        if index < self.items.len() {
            self.active = Some(index);
        }
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// Rows to draw in a viewport of `height` rows so the cursor stays
    /// visible. Scrolls only once the cursor passes the bottom edge.
    pub fn visible_range(&self, height: usize) -> Range<usize> {
        if height == 0 || self.items.is_empty() {
            return 0..0;
        }
        let start = (self.cursor + 1).saturating_sub(height);
        let end = (start + height).min(self.items.len());
        start..end
    }
}

impl<T> From<Vec<T>> for ListState<T> {
    fn from(items: Vec<T>) -> Self {
        let mut state = Self::default();
        state.set_items(items);
        state
    }
}
