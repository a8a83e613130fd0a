/// Scroll position over a document of `total` rendered lines shown through a
/// viewport of `viewport` lines. The offset never passes
/// `total - viewport`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScrollState {
    offset: usize,
    viewport: usize,
    total: usize,
}

impl ScrollState {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn max_offset(&self) -> usize {
        self.total.saturating_sub(self.viewport)
    }

    /// Record the current document length and viewport height, pulling the
    /// offset back inside the new bounds.
    pub fn set_bounds(&mut self, total: usize, viewport: usize) {
        self.total = total;
        self.viewport = viewport;
        self.offset = self.offset.min(self.max_offset());
    }

    pub fn up(&mut self) {
        self.offset = self.offset.saturating_sub(1);
    }

    pub fn down(&mut self) {
        self.offset = (self.offset + 1).min(self.max_offset());
    }

    pub fn half_up(&mut self) {
        self.offset = self.offset.saturating_sub(self.viewport / 2);
    }

    pub fn half_down(&mut self) {
        self.offset = (self.offset + self.viewport / 2).min(self.max_offset());
    }

    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// The part of `lines` inside the viewport.
    pub fn window<'a, T>(&self, lines: &'a [T]) -> &'a [T] {
        let start = self.offset.min(lines.len());
        let end = (start + self.viewport).min(lines.len());
        &lines[start..end]
    }
}
