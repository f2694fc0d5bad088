use crossterm::style::{Attribute, ContentStyle, Stylize};
use std::mem;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::render::Theme;

#[derive(Debug, Clone, PartialEq)]
pub struct StyledSpan {
    pub content: String,
    pub style: ContentStyle,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyledLine {
    pub spans: Vec<StyledSpan>,
}

impl StyledLine {
    pub fn new() -> Self {
        Self { spans: Vec::new() }
    }

    pub fn text(&self) -> String {
        self.spans
            .iter()
            .map(|s| s.content.as_str())
            .collect::<String>()
    }

    pub fn prepend_margin(&mut self, margin: &str, style: ContentStyle) {
        if margin.is_empty() {
            return;
        }
        self.spans.insert(
            0,
            StyledSpan {
                content: margin.to_string(),
                style,
            },
        );
    }
}

fn flush_segment(segments: &mut Vec<StyledSpan>, buffer: &mut String, style: ContentStyle) {
    if buffer.is_empty() {
        return;
    }
    segments.push(StyledSpan {
        content: mem::take(buffer),
        style,
    });
}

/// Hard-wrap styled spans at `width` terminal columns.
pub fn wrap_segments(segments: &[StyledSpan], width: usize) -> Vec<StyledLine> {
    if width == 0 {
        return vec![StyledLine::new()];
    }

    let mut lines: Vec<StyledLine> = Vec::new();
    let mut current: Vec<StyledSpan> = Vec::new();
    let mut buffer = String::new();
    let mut current_style: Option<ContentStyle> = None;
    let mut current_width = 0usize;

    for seg in segments {
        for ch in seg.content.chars() {
            match current_style {
                Some(style) if style != seg.style => {
                    flush_segment(&mut current, &mut buffer, style);
                    current_style = Some(seg.style);
                }
                None => current_style = Some(seg.style),
                _ => {}
            }
            let style = seg.style;

            if ch == '\n' {
                flush_segment(&mut current, &mut buffer, style);
                lines.push(StyledLine {
                    spans: mem::take(&mut current),
                });
                current_width = 0;
                continue;
            }

            let ch_width = ch.width().unwrap_or(0);
            if ch_width > 0 && current_width + ch_width > width && current_width > 0 {
                flush_segment(&mut current, &mut buffer, style);
                lines.push(StyledLine {
                    spans: mem::take(&mut current),
                });
                current_width = 0;
            }

            buffer.push(ch);
            current_width += ch_width;
        }
    }

    if let Some(style) = current_style {
        flush_segment(&mut current, &mut buffer, style);
    }
    if !current.is_empty() {
        lines.push(StyledLine { spans: current });
    }
    if lines.is_empty() {
        lines.push(StyledLine::new());
    }
    lines
}

/// Split a line into spans for `**bold**`, `*italic*`, `~~strike~~` and `` `code` ``.
pub fn apply_inline_styles(
    text: &str,
    base_style: ContentStyle,
    code_style: ContentStyle,
) -> Vec<StyledSpan> {
    let mut spans = Vec::new();
    let mut buffer = String::new();
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0usize;
    let mut bold = false;
    let mut italic = false;
    let mut strike = false;
    let mut code = false;

    while i < chars.len() {
        let ch = chars[i];
        let style = compose_inline_style(base_style, bold, italic, strike, code, code_style);
        if !code && i + 1 < chars.len() && chars[i + 1] == ch {
            if ch == '*' || ch == '_' {
                flush_segment(&mut spans, &mut buffer, style);
                bold = !bold;
                i += 2;
                continue;
            }
            if ch == '~' {
                flush_segment(&mut spans, &mut buffer, style);
                strike = !strike;
                i += 2;
                continue;
            }
        }

        // A lone '_' inside a word (snake_case) is literal.
        let intraword = ch == '_'
            && i > 0
            && chars[i - 1].is_alphanumeric()
            && chars.get(i + 1).is_some_and(|c| c.is_alphanumeric());
        if !code && (ch == '*' || ch == '_') && !intraword {
            flush_segment(&mut spans, &mut buffer, style);
            italic = !italic;
            i += 1;
            continue;
        }

        if ch == '`' {
            flush_segment(&mut spans, &mut buffer, style);
            code = !code;
            i += 1;
            continue;
        }

        buffer.push(ch);
        i += 1;
    }

    flush_segment(
        &mut spans,
        &mut buffer,
        compose_inline_style(base_style, bold, italic, strike, code, code_style),
    );
    spans
}

fn compose_inline_style(
    base: ContentStyle,
    bold: bool,
    italic: bool,
    strike: bool,
    code: bool,
    code_style: ContentStyle,
) -> ContentStyle {
    if code {
        return code_style;
    }
    let mut style = base;
    if bold {
        style = style.attribute(Attribute::Bold);
    }
    if italic {
        style = style.attribute(Attribute::Italic);
    }
    if strike {
        style = style.attribute(Attribute::CrossedOut);
    }
    style
}

fn parse_ordered_marker(line: &str) -> Option<(&str, &str)> {
    let mut has_digit = false;
    for (idx, ch) in line.char_indices() {
        if ch.is_ascii_digit() {
            has_digit = true;
            continue;
        }
        if (ch == '.' || ch == ')') && has_digit && line[idx + 1..].starts_with(' ') {
            return Some((&line[..=idx], line[idx + 1..].trim_start()));
        }
        break;
    }
    None
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&level) && line[level..].starts_with(' ') {
        Some((level, line[level..].trim_start()))
    } else {
        None
    }
}

// Wrap `spans` into the space left after `first`, continuing under `rest`.
fn push_block(
    lines: &mut Vec<StyledLine>,
    spans: &[StyledSpan],
    width: usize,
    first: &str,
    rest: &str,
    margin_style: ContentStyle,
) {
    let lead = UnicodeWidthStr::width(first).max(UnicodeWidthStr::width(rest));
    let mut block = wrap_segments(spans, width.saturating_sub(lead).max(1));
    for (idx, line) in block.iter_mut().enumerate() {
        line.prepend_margin(if idx == 0 { first } else { rest }, margin_style);
    }
    lines.extend(block);
}

/// Render markdown-ish text into styled, wrapped terminal lines.
pub fn render_markdown(text: &str, width: usize, theme: &Theme) -> Vec<StyledLine> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut in_code_block = false;

    for raw_line in text.lines() {
        let line = raw_line.trim_end_matches('\r');
        let indent_count = line.chars().take_while(|c| *c == ' ').count();
        let indent = " ".repeat(indent_count);
        let trimmed = line[indent_count..].trim_end();

        if trimmed.starts_with("```") {
            in_code_block = !in_code_block;
            let span = StyledSpan {
                content: trimmed.to_string(),
                style: theme.code_block_style,
            };
            push_block(&mut lines, &[span], width, &indent, &indent, theme.code_block_style);
            continue;
        }

        if in_code_block {
            let span = StyledSpan {
                content: line.to_string(),
                style: theme.code_block_style,
            };
            push_block(&mut lines, &[span], width, "", "", theme.code_block_style);
            continue;
        }

        if trimmed.is_empty() {
            lines.push(StyledLine::new());
            continue;
        }

        if let Some(stripped) = trimmed.strip_prefix('>') {
            let spans =
                apply_inline_styles(stripped.trim_start(), theme.quote_style, theme.code_block_style);
            let bar = format!("{indent}│ ");
            push_block(&mut lines, &spans, width, &bar, &bar, theme.quote_style);
            continue;
        }

        if let Some(rest) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
            .or_else(|| trimmed.strip_prefix("+ "))
        {
            let spans =
                apply_inline_styles(rest.trim_start(), theme.text_style, theme.code_block_style);
            let first = format!("{indent}• ");
            let cont = format!("{indent}  ");
            push_block(&mut lines, &spans, width, &first, &cont, theme.text_style);
            continue;
        }

        if let Some((marker, rest)) = parse_ordered_marker(trimmed) {
            let spans = apply_inline_styles(rest, theme.text_style, theme.code_block_style);
            let first = format!("{indent}{marker} ");
            let cont = " ".repeat(UnicodeWidthStr::width(first.as_str()));
            push_block(&mut lines, &spans, width, &first, &cont, theme.text_style);
            continue;
        }

        if let Some((level, title)) = heading(trimmed) {
            let style = theme.heading_style(level);
            let spans = apply_inline_styles(title, style, theme.code_block_style);
            push_block(&mut lines, &spans, width, "", "", style);
            continue;
        }

        if trimmed.chars().all(|c| c == '-' || c == '*' || c == '_') && trimmed.len() >= 3 {
            let rule = StyledSpan {
                content: "─".repeat(width),
                style: theme.quote_style,
            };
            lines.push(StyledLine { spans: vec![rule] });
            continue;
        }

        let spans = apply_inline_styles(trimmed, theme.text_style, theme.code_block_style);
        push_block(&mut lines, &spans, width, &indent, &indent, theme.text_style);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(lines: &[StyledLine]) -> Vec<String> {
        lines.iter().map(StyledLine::text).collect()
    }

    #[test]
    fn wraps_by_display_width() {
        let span = StyledSpan {
            content: "abcdef".into(),
            style: ContentStyle::new(),
        };
        let lines = wrap_segments(&[span], 4);
        assert_eq!(texts(&lines), vec!["abcd", "ef"]);

        let wide = StyledSpan {
            content: "日本語".into(),
            style: ContentStyle::new(),
        };
        let lines = wrap_segments(&[wide], 4);
        assert_eq!(texts(&lines), vec!["日本", "語"]);
    }

    #[test]
    fn inline_markers_are_stripped() {
        let base = ContentStyle::new();
        let code = ContentStyle::new().attribute(Attribute::Reverse);
        let spans = apply_inline_styles("a **b** `c` d", base, code);
        let joined: String = spans.iter().map(|s| s.content.as_str()).collect();
        assert_eq!(joined, "a b c d");
        let bold = spans.iter().find(|s| s.content == "b").unwrap();
        assert!(bold.style.attributes.has(Attribute::Bold));
        let code_span = spans.iter().find(|s| s.content == "c").unwrap();
        assert_eq!(code_span.style, code);
    }

    #[test]
    fn snake_case_is_not_italic() {
        let spans = apply_inline_styles("run get_current_date now", ContentStyle::new(), ContentStyle::new());
        let joined: String = spans.iter().map(|s| s.content.as_str()).collect();
        assert_eq!(joined, "run get_current_date now");
    }

    #[test]
    fn renders_common_blocks() {
        let md = "# Title\n- one\n2. two\n> quote\n```\nlet x = 1;\n```\nplain";
        let lines = render_markdown(md, 40, &Theme::dark());
        assert_eq!(
            texts(&lines),
            vec![
                "Title",
                "• one",
                "2. two",
                "│ quote",
                "```",
                "let x = 1;",
                "```",
                "plain"
            ]
        );
    }

    #[test]
    fn partial_markdown_does_not_panic() {
        let theme = Theme::dark();
        for md in ["**unterminated", "```rust\nfn main() {", "1.", "#", "> ", "- "] {
            let _ = render_markdown(md, 10, &theme);
        }
    }
}
