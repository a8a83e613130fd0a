//! Fixed-width text layout: truncation, padding and wrapping measured in
//! terminal cells rather than bytes or chars. Every pane renders through
//! these helpers.

use unicode_width::UnicodeWidthStr;

pub const ELLIPSIS: &str = "..";

/// Number of terminal columns `s` occupies.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Shorten `s` so that it fits in `width` cells, ending in [`ELLIPSIS`].
///
/// Strings that already fit are returned unchanged. When `width` is 3 or
/// less and `s` does not fit, the result is the bare ellipsis, which is
/// wider than `width` when `width < 2`.
pub fn truncate(s: &str, width: usize) -> String {
    if display_width(s) <= width {
        return s.to_string();
    }
    if width <= 3 {
        return ELLIPSIS.to_string();
    }

    let budget = width - display_width(ELLIPSIS);
    let mut kept = s.to_string();
    while display_width(&kept) > budget && kept.pop().is_some() {}
    kept.push_str(ELLIPSIS);
    kept
}

/// Right-pad `s` with spaces to exactly `width` cells, truncating when it is
/// already too wide.
pub fn pad(s: &str, width: usize) -> String {
    let current = display_width(s);
    if current >= width {
        return truncate(s, width);
    }
    let mut out = String::with_capacity(s.len() + width - current);
    out.push_str(s);
    out.extend(std::iter::repeat(' ').take(width - current));
    out
}

/// Wrap `text` to `width` cells and return the individual lines.
///
/// Existing line breaks are kept. A line that already fits is kept verbatim;
/// longer lines are re-packed greedily on whitespace. A single token wider
/// than `width` gets a line of its own and is never split.
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let mut wrapped = Vec::new();

    for line in text.split('\n') {
        if display_width(line) <= width {
            wrapped.push(line.to_string());
            continue;
        }

        let mut current = String::new();
        let mut current_width = 0;
        let mut emitted = false;

        for word in line.split_whitespace() {
            let word_width = display_width(word);
            if current.is_empty() {
                current.push_str(word);
                current_width = word_width;
            } else if current_width + 1 + word_width > width {
                wrapped.push(std::mem::take(&mut current));
                emitted = true;
                current.push_str(word);
                current_width = word_width;
            } else {
                current.push(' ');
                current.push_str(word);
                current_width += 1 + word_width;
            }
        }

        if !current.is_empty() || !emitted {
            wrapped.push(current);
        }
    }

    wrapped
}

/// [`wrap_lines`] joined back with `\n`; `wrap(&wrap(x, w), w) == wrap(x, w)`.
pub fn wrap(text: &str, width: usize) -> String {
    wrap_lines(text, width).join("\n")
}
