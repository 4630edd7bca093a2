// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Rendering of card text into HTML.
//!
//! Math is not typeset here. It is emitted as `<span class="math ...">`
//! elements holding the escaped TeX, which KaTeX picks up in the browser.

use std::borrow::Cow;
use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use pulldown_cmark::CowStr;
use pulldown_cmark::Event;
use pulldown_cmark::Options;
use pulldown_cmark::Parser;
use pulldown_cmark::html::push_html;

/// Turns the text of one side of a card into displayable markup.
///
/// Rendering never fails: malformed input degrades to an error fragment.
pub trait Renderer {
    fn render(&self, text: &str) -> String;
}

/// Markdown with inline (`$...$`) and display (`$$...$$`, or `$...$` spanning
/// lines) math.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkdownRenderer;

impl Renderer for MarkdownRenderer {
    fn render(&self, text: &str) -> String {
        markdown_to_html_inline(text)
    }
}

/// Returns the text unchanged. Useful for checking deck structure without
/// caring about markup.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainRenderer;

impl Renderer for PlainRenderer {
    fn render(&self, text: &str) -> String {
        text.to_string()
    }
}

/// A math fragment that could not be rendered.
#[derive(Debug, PartialEq)]
pub struct RenderFailure {
    pub tex: String,
    pub reason: String,
}

impl Display for RenderFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to render math '{}': {}", self.tex, self.reason)
    }
}

impl Error for RenderFailure {}

/// Convert Markdown to HTML.
pub fn markdown_to_html(markdown: &str) -> String {
    let source = pad_block_math(markdown);
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_MATH);
    let parser = Parser::new_ext(&source, options);
    let events = parser.map(|event| match event {
        // Math that spans lines is display math, whatever its delimiters.
        Event::InlineMath(tex) => math_event(&tex, tex.contains('\n')),
        Event::DisplayMath(tex) => math_event(&tex, true),
        _ => event,
    });
    let mut html_output: String = String::new();
    push_html(&mut html_output, events);
    html_output
}

/// Like [`markdown_to_html`], but a lone wrapping paragraph is removed, so
/// plain text renders to itself.
pub fn markdown_to_html_inline(markdown: &str) -> String {
    let text = markdown_to_html(markdown);
    match text
        .strip_prefix("<p>")
        .and_then(|rest| rest.strip_suffix("</p>\n"))
    {
        Some(inner) if !inner.contains("<p>") && !inner.contains("</p>") => inner.to_string(),
        _ => text,
    }
}

fn math_event(tex: &str, display: bool) -> Event<'static> {
    Event::InlineHtml(CowStr::Boxed(render_math(tex, display).into_boxed_str()))
}

/// pulldown-cmark only opens math on a `$` followed by a non-space, so a block
/// written as `$\n...\n$` is rewritten to `$$\n...\n$$`. Text is only split at
/// `$` and backtick positions, which are always character boundaries.
fn pad_block_math(text: &str) -> Cow<'_, str> {
    let bytes = text.as_bytes();
    let mut padded: Option<String> = None;
    let mut copied = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'`' => i = skip_code_span(bytes, i),
            b'$' if bytes.get(i + 1) == Some(&b'$') => i += 2,
            b'$' if bytes.get(i + 1).is_some_and(u8::is_ascii_whitespace) => {
                match closing_dollar(bytes, i + 1) {
                    Some(end) if is_block(&text[i + 1..end]) => {
                        let out = padded
                            .get_or_insert_with(|| String::with_capacity(text.len() + 2));
                        out.push_str(&text[copied..i]);
                        out.push_str("$$");
                        out.push_str(&text[i + 1..end]);
                        out.push_str("$$");
                        i = end + 1;
                        copied = i;
                    }
                    _ => i += 1,
                }
            }
            _ => i += 1,
        }
    }
    match padded {
        Some(mut out) => {
            out.push_str(&text[copied..]);
            Cow::Owned(out)
        }
        None => Cow::Borrowed(text),
    }
}

/// Index of the next unescaped lone `$` at or after `from`.
fn closing_dollar(bytes: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'$' if bytes.get(i + 1) == Some(&b'$') => return None,
            b'$' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Multi-line math within a single paragraph.
fn is_block(tex: &str) -> bool {
    let inner = tex.trim();
    !inner.is_empty() && inner.contains('\n') && !inner.lines().any(|l| l.trim().is_empty())
}

/// Returns the index just past the code span starting at `start`, or just
/// past the opening backticks if the span is never closed.
fn skip_code_span(bytes: &[u8], start: usize) -> usize {
    let run = bytes[start..].iter().take_while(|b| **b == b'`').count();
    let mut i = start + run;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let closing = bytes[i..].iter().take_while(|b| **b == b'`').count();
            if closing == run {
                return i + closing;
            }
            i += closing;
        } else {
            i += 1;
        }
    }
    start + run
}

fn render_math(tex: &str, display: bool) -> String {
    let tex = tex.trim();
    match check_tex(tex) {
        Ok(()) => {
            let class = if display {
                "math math-display"
            } else {
                "math math-inline"
            };
            format!(r#"<span class="{class}">{}</span>"#, escape_html(tex))
        }
        Err(failure) => {
            log::warn!("{failure}");
            format!(
                r#"<span class="math-error" title="{}">${}$</span>"#,
                escape_html(&failure.reason),
                escape_html(tex)
            )
        }
    }
}

/// Structural checks KaTeX would otherwise reject at display time.
pub fn check_tex(tex: &str) -> Result<(), RenderFailure> {
    let failure = |reason: String| RenderFailure {
        tex: tex.to_string(),
        reason,
    };
    let mut depth: usize = 0;
    let mut environments: Vec<&str> = Vec::new();
    let mut chars = tex.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                None => return Err(failure("dangling backslash".to_string())),
                Some((start, c)) if c.is_ascii_alphabetic() => {
                    let mut end = start + c.len_utf8();
                    while let Some(&(pos, c)) = chars.peek() {
                        if !c.is_ascii_alphabetic() {
                            break;
                        }
                        end = pos + c.len_utf8();
                        chars.next();
                    }
                    match &tex[start..end] {
                        "begin" => {
                            if let Some(name) = environment_name(&tex[end..]) {
                                environments.push(name);
                            }
                        }
                        "end" => {
                            if let Some(name) = environment_name(&tex[end..]) {
                                match environments.pop() {
                                    Some(open) if open == name => {}
                                    Some(open) => {
                                        return Err(failure(format!(
                                            "\\begin{{{open}}} closed by \\end{{{name}}}"
                                        )));
                                    }
                                    None => {
                                        return Err(failure(format!(
                                            "\\end{{{name}}} without \\begin"
                                        )));
                                    }
                                }
                            }
                        }
                        _ => {}
                    }
                }
                // Escaped character, e.g. `\{` or `\\`.
                Some(_) => {}
            },
            '{' => depth += 1,
            '}' => {
                if depth == 0 {
                    return Err(failure("unmatched '}'".to_string()));
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    if depth > 0 {
        return Err(failure("unmatched '{'".to_string()));
    }
    if let Some(open) = environments.pop() {
        return Err(failure(format!("\\begin{{{open}}} is never closed")));
    }
    Ok(())
}

fn environment_name(rest: &str) -> Option<&str> {
    let rest = rest.trim_start().strip_prefix('{')?;
    let end = rest.find('}')?;
    Some(rest[..end].trim())
}

pub(crate) fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_to_html_basic() {
        let html = markdown_to_html("This is **bold** text.");
        assert_eq!(html, "<p>This is <strong>bold</strong> text.</p>\n");
    }

    #[test]
    fn test_markdown_to_html_inline() {
        let html = markdown_to_html_inline("This is **bold** text.");
        assert_eq!(html, "This is <strong>bold</strong> text.");
    }

    #[test]
    fn test_markdown_to_html_inline_heading() {
        let html = markdown_to_html_inline("# Foo");
        assert_eq!(html, "<h1>Foo</h1>\n");
    }

    #[test]
    fn test_inline_keeps_multiple_paragraphs() {
        let html = markdown_to_html_inline("one\n\ntwo");
        assert_eq!(html, "<p>one</p>\n<p>two</p>\n");
    }

    #[test]
    fn test_plain_text_renders_to_itself() {
        assert_eq!(MarkdownRenderer.render("Q1"), "Q1");
    }

    #[test]
    fn test_inline_math() {
        let html = MarkdownRenderer.render("$x^2$");
        assert_eq!(html, r#"<span class="math math-inline">x^2</span>"#);
    }

    #[test]
    fn test_multiline_math_is_display() {
        let html = MarkdownRenderer.render("$x\ny$");
        assert_eq!(html, "<span class=\"math math-display\">x\ny</span>");
    }

    #[test]
    fn test_double_dollar_is_display() {
        let html = MarkdownRenderer.render("$$\\sum_i i$$");
        assert_eq!(html, r#"<span class="math math-display">\sum_i i</span>"#);
    }

    #[test]
    fn test_block_math_inside_prose() {
        let html = MarkdownRenderer.render("a $\nblock math\n$ fragment");
        assert_eq!(
            html,
            r#"a <span class="math math-display">block math</span> fragment"#
        );
    }

    #[test]
    fn test_math_is_not_markdown() {
        // Underscores and asterisks inside math must not become emphasis.
        let html = MarkdownRenderer.render("$a_1 * b_1 * c$ and **bold**");
        assert_eq!(
            html,
            r#"<span class="math math-inline">a_1 * b_1 * c</span> and <strong>bold</strong>"#
        );
    }

    #[test]
    fn test_math_is_escaped() {
        let html = MarkdownRenderer.render("$a < b$");
        assert_eq!(html, r#"<span class="math math-inline">a &lt; b</span>"#);
    }

    #[test]
    fn test_unclosed_dollar_is_literal() {
        let html = MarkdownRenderer.render("costs $5");
        assert_eq!(html, "costs $5");
    }

    #[test]
    fn test_escaped_dollar_is_literal() {
        let html = MarkdownRenderer.render(r"\$x\$");
        assert_eq!(html, "$x$");
    }

    #[test]
    fn test_dollar_in_code_span() {
        let html = MarkdownRenderer.render("`$x$`");
        assert_eq!(html, "<code>$x$</code>");
    }

    #[test]
    fn test_malformed_math_degrades() {
        let html = MarkdownRenderer.render(r"see $\begin{matrix} a \end{pmatrix}$ here");
        assert!(html.starts_with("see <span class=\"math-error\""));
        assert!(html.contains(r"\begin{matrix} closed by \end{pmatrix}"));
        assert!(html.ends_with(" here"));
    }

    #[test]
    fn test_unbalanced_braces_stay_literal() {
        let html = MarkdownRenderer.render(r"see $\frac{1}{2$ here");
        assert_eq!(html, r"see $\frac{1}{2$ here");
    }

    #[test]
    fn test_non_ascii_math() {
        let html = MarkdownRenderer.render("$α$");
        assert_eq!(html, r#"<span class="math math-inline">α</span>"#);
        let html = MarkdownRenderer.render(r"$\é$");
        assert_eq!(html, r#"<span class="math math-inline">\é</span>"#);
    }

    #[test]
    fn test_non_ascii_after_unclosed_dollar() {
        let html = MarkdownRenderer.render("costs $5 — cheap");
        assert_eq!(html, "costs $5 — cheap");
        let html = MarkdownRenderer.render("a $ — \nβ $ b");
        assert_eq!(html, "a <span class=\"math math-display\">—\nβ</span> b");
    }

    #[test]
    fn test_private_use_characters_are_text() {
        let text = "\u{E000}0\u{E001} and $x$";
        let html = MarkdownRenderer.render(text);
        assert_eq!(
            html,
            "\u{E000}0\u{E001} and <span class=\"math math-inline\">x</span>"
        );
    }

    #[test]
    fn test_check_tex() {
        assert!(check_tex(r"\frac{1}{2}").is_ok());
        assert!(check_tex(r"\{ x \}").is_ok());
        assert!(check_tex(r"\begin{matrix} a \\ b \end{matrix}").is_ok());
        assert_eq!(
            check_tex("x}").unwrap_err().reason,
            "unmatched '}'".to_string()
        );
        assert_eq!(
            check_tex("x \\").unwrap_err().reason,
            "dangling backslash".to_string()
        );
        assert!(check_tex(r"\begin{matrix} a").is_err());
        assert!(check_tex(r"\begin{matrix} a \end{pmatrix}").is_err());
    }

    #[test]
    fn test_pad_block_math() {
        assert_eq!(pad_block_math("a $\nx\n$ b"), "a $$\nx\n$$ b");
        assert_eq!(pad_block_math("$x$"), "$x$");
        // Blank lines end the paragraph, and code spans are left alone.
        assert_eq!(pad_block_math("$\nx\n\ny\n$"), "$\nx\n\ny\n$");
        assert_eq!(pad_block_math("` $\nx\n$ `"), "` $\nx\n$ `");
    }

    #[test]
    fn test_plain_renderer() {
        assert_eq!(PlainRenderer.render("**x** $y$"), "**x** $y$");
    }
}
