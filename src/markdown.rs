//! Flatten pull request descriptions from markdown into plain text lines for
//! the detail pane. Wrapping is left to `text::wrap`.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

pub fn render(markdown: &str) -> Vec<String> {
    let mut out = Renderer::default();

    for event in Parser::new_ext(markdown, Options::ENABLE_TASKLISTS | Options::ENABLE_STRIKETHROUGH) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                out.block_gap();
                out.current.push_str(heading_prefix(level));
            }
            Event::End(TagEnd::Heading(_)) | Event::End(TagEnd::Paragraph) => {
                out.flush();
                out.pending_gap = true;
            }
            Event::Start(Tag::Paragraph) => {
                if out.lists.is_empty() {
                    out.block_gap();
                }
            }
            Event::Start(Tag::BlockQuote(_)) => {
                out.block_gap();
                out.quote_depth += 1;
            }
            Event::End(TagEnd::BlockQuote(_)) => {
                out.flush();
                out.quote_depth -= 1;
                out.pending_gap = true;
            }
            Event::Start(Tag::CodeBlock(kind)) => {
                out.block_gap();
                out.in_code = true;
                if let CodeBlockKind::Fenced(lang) = kind {
                    if !lang.is_empty() {
                        out.lines.push(format!("[{}]", lang));
                    }
                }
            }
            Event::End(TagEnd::CodeBlock) => {
                out.in_code = false;
                out.pending_gap = true;
            }
            Event::Start(Tag::List(start)) => {
                if out.lists.is_empty() {
                    out.block_gap();
                } else {
                    out.flush();
                }
                out.lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                out.flush();
                out.lists.pop();
                if out.lists.is_empty() {
                    out.pending_gap = true;
                }
            }
            Event::Start(Tag::Item) => {
                out.flush();
                let depth = out.lists.len().saturating_sub(1);
                let marker = match out.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{}. ", n);
                        *n += 1;
                        marker
                    }
                    _ => "- ".to_string(),
                };
                out.current.push_str(&"  ".repeat(depth));
                out.current.push_str(&marker);
            }
            Event::End(TagEnd::Item) => out.flush(),
            Event::TaskListMarker(done) => {
                out.current.push_str(if done { "[x] " } else { "[ ] " });
            }
            Event::End(TagEnd::Link) => {
                if let Some(url) = out.link_urls.pop() {
                    out.current.push_str(&format!(" ({})", url));
                }
            }
            Event::Start(Tag::Link { dest_url, .. }) => {
                out.link_urls.push(dest_url.to_string());
            }
            Event::Code(code) => {
                out.current.push('`');
                out.current.push_str(&code);
                out.current.push('`');
            }
            Event::Text(text) => {
                if out.in_code {
                    for line in text.lines() {
                        out.lines.push(format!("    {}", line));
                    }
                } else {
                    out.current.push_str(&text);
                }
            }
            Event::SoftBreak => out.current.push(' '),
            Event::HardBreak => out.flush(),
            Event::Rule => {
                out.block_gap();
                out.lines.push("────────".to_string());
                out.pending_gap = true;
            }
            _ => {}
        }
    }

    out.flush();
    out.lines
}

#[derive(Default)]
struct Renderer {
    lines: Vec<String>,
    current: String,
    lists: Vec<Option<u64>>,
    link_urls: Vec<String>,
    quote_depth: usize,
    in_code: bool,
    pending_gap: bool,
}

impl Renderer {
    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.current);
        self.lines.push(format!("{}{}", "> ".repeat(self.quote_depth), text));
    }

    /// Separate blocks with one blank line, never at the very top.
    fn block_gap(&mut self) {
        self.flush();
        if self.pending_gap && !self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.pending_gap = false;
    }
}

fn heading_prefix(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "# ",
        HeadingLevel::H2 => "## ",
        HeadingLevel::H3 => "### ",
        HeadingLevel::H4 => "#### ",
        HeadingLevel::H5 => "##### ",
        HeadingLevel::H6 => "###### ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paragraphs_are_separated() {
        let lines = render("First paragraph\ncontinues here.\n\nSecond one.");
        assert_eq!(
            lines,
            vec!["First paragraph continues here.", "", "Second one."]
        );
    }

    #[test]
    fn headings_and_lists() {
        let lines = render("## Changes\n\n- one\n- two\n\n1. first\n2. second");
        assert_eq!(
            lines,
            vec!["## Changes", "", "- one", "- two", "", "1. first", "2. second"]
        );
    }

    #[test]
    fn emphasis_is_dropped_and_links_keep_url() {
        let lines = render("Fixes **the** [bug](https://example.com/1).");
        assert_eq!(lines, vec!["Fixes the bug (https://example.com/1)."]);
    }

    #[test]
    fn code_blocks_are_indented() {
        let lines = render("Run:\n\n```sh\ncargo run\n```");
        assert_eq!(lines, vec!["Run:", "", "[sh]", "    cargo run"]);
    }

    #[test]
    fn task_list_markers() {
        let lines = render("- [x] done\n- [ ] todo");
        assert_eq!(lines, vec!["- [x] done", "- [ ] todo"]);
    }

    #[test]
    fn block_quotes_are_prefixed() {
        let lines = render("> quoted text");
        assert_eq!(lines, vec!["> quoted text"]);
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(render("").is_empty());
    }
}
