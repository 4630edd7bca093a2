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

//! Parser for Markdown decks.
//!
//! ```markdown
//! ---
//! title: Physics
//! ---
//! What is $F$?
//! ???
//! $F = ma$
//! ---
//! What is **inertia**?
//! ???
//! Resistance to changes in motion.
//! ```

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;

use crate::markdown::MarkdownRenderer;
use crate::markdown::Renderer;
use crate::types::card::Flashcard;

/// Title used when neither the front matter nor the caller provides one.
pub const UNTITLED_DECK: &str = "Untitled Deck";

const CARD_SEPARATOR: &str = "---";
const ANSWER_SEPARATOR: &str = "???";

/// Metadata that can be specified at the top of a deck file.
#[derive(Debug, Default, PartialEq, Deserialize)]
pub struct FrontMatter {
    #[serde(alias = "name")]
    pub title: Option<String>,
}

/// The result of parsing a deck: its title and its cards in file order.
#[derive(Debug, PartialEq)]
pub struct ParsedDeck {
    pub title: String,
    pub cards: Vec<Flashcard>,
}

/// Which side of a card is at fault.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Question,
    Answer,
}

impl Display for Side {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Question => write!(f, "question"),
            Side::Answer => write!(f, "answer"),
        }
    }
}

/// Structural errors. Card indices and lines are 1-based.
#[derive(Debug, PartialEq)]
pub enum ParseError {
    /// The body holds no non-empty blocks.
    NoCardsFound,
    /// A block does not have exactly one `???` line.
    MalformedCardSeparator { card: usize, line: usize },
    /// A block has an empty question or answer.
    EmptyQuestionOrAnswer { card: usize, side: Side, line: usize },
}

impl ParseError {
    /// The 1-based index of the offending card, if any.
    pub fn card(&self) -> Option<usize> {
        match self {
            ParseError::NoCardsFound => None,
            ParseError::MalformedCardSeparator { card, .. } => Some(*card),
            ParseError::EmptyQuestionOrAnswer { card, .. } => Some(*card),
        }
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::NoCardsFound => write!(
                f,
                "No cards found in the deck. Make sure to separate cards with \"{CARD_SEPARATOR}\" on its own line."
            ),
            ParseError::MalformedCardSeparator { card, line } => write!(
                f,
                "Invalid card format at card {card} (line {line}). Each card must have exactly one question and one answer separated by \"{ANSWER_SEPARATOR}\" on its own line."
            ),
            ParseError::EmptyQuestionOrAnswer { card, side, line } => write!(
                f,
                "Empty {side} at card {card} (line {line}). Both question and answer must have content."
            ),
        }
    }
}

impl Error for ParseError {}

/// Parse a deck with the Markdown renderer.
///
/// `fallback_title` is used when the front matter has no title, typically
/// the uploaded file's name.
pub fn parse_deck_content(
    text: &str,
    fallback_title: Option<&str>,
) -> Result<ParsedDeck, ParseError> {
    let renderer = MarkdownRenderer;
    let mut parser = Parser::new(&renderer);
    if let Some(title) = fallback_title {
        parser = parser.with_fallback_title(title);
    }
    parser.parse(text)
}

/// Derive a deck title from an uploaded file name: `notes.md` becomes `notes`.
pub fn fallback_title_from_filename(filename: &str) -> String {
    const EXTENSIONS: [&str; 4] = [".md", ".markdown", ".pdf", ".docx"];
    let lower = filename.to_ascii_lowercase();
    for ext in EXTENSIONS {
        if lower.ends_with(ext) && filename.len() > ext.len() {
            return filename[..filename.len() - ext.len()].to_string();
        }
    }
    filename.to_string()
}

/// Pick the first non-blank title, falling back to [`UNTITLED_DECK`].
pub(crate) fn resolve_title(primary: Option<&str>, fallback: Option<&str>) -> String {
    [primary, fallback]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|title| !title.is_empty())
        .unwrap_or(UNTITLED_DECK)
        .to_string()
}

/// Extract front matter from the top of a deck.
///
/// Returns the metadata, the body, and the 0-based line at which the body
/// starts. A leading `---` block only counts as front matter if it is closed
/// and every line in it is metadata; otherwise it is left for the card
/// splitter, which sees an empty first block and a card.
pub fn extract_frontmatter(text: &str) -> (FrontMatter, &str, usize) {
    let mut lines = text.lines().enumerate();

    // Check if the file starts with frontmatter delimiter
    match lines.next() {
        Some((_, line)) if is_separator(line) => {}
        _ => return (FrontMatter::default(), text, 0),
    };

    let mut frontmatter_lines = Vec::new();
    let mut closing_line_idx = None;
    for (idx, line) in lines {
        if is_separator(line) {
            closing_line_idx = Some(idx);
            break;
        }
        if !is_metadata_line(line) {
            return (FrontMatter::default(), text, 0);
        }
        frontmatter_lines.push(line);
    }
    let Some(closing_line_idx) = closing_line_idx else {
        return (FrontMatter::default(), text, 0);
    };

    let frontmatter_str = frontmatter_lines.join("\n");
    let metadata = match toml::from_str::<FrontMatter>(&frontmatter_str) {
        Ok(metadata) => metadata,
        Err(_) => parse_key_values(&frontmatter_lines),
    };

    let content_start_line = closing_line_idx + 1;
    let content = match nth_line_offset(text, content_start_line) {
        Some(pos) => &text[pos..],
        None => "",
    };
    (metadata, content, content_start_line)
}

/// Byte offset of the start of the given 0-based line.
fn nth_line_offset(text: &str, line: usize) -> Option<usize> {
    if line == 0 {
        return Some(0);
    }
    text.match_indices('\n')
        .nth(line - 1)
        .map(|(pos, _)| pos + 1)
        .filter(|pos| *pos < text.len())
}

/// A line such as `title: Foo`, `title = "Foo"`, a comment, or a blank line.
fn is_metadata_line(line: &str) -> bool {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return true;
    }
    match line.find([':', '=']) {
        Some(pos) => {
            let key = line[..pos].trim();
            !key.is_empty()
                && key
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        }
        None => false,
    }
}

fn parse_key_values(lines: &[&str]) -> FrontMatter {
    let mut metadata = FrontMatter::default();
    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(pos) = line.find([':', '=']) else {
            continue;
        };
        let key = line[..pos].trim();
        let value = unquote(line[pos + 1..].trim());
        match key {
            "title" | "name" => metadata.title = Some(value.to_string()),
            _ => log::debug!("Ignoring front matter key '{key}'"),
        }
    }
    metadata
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn is_separator(line: &str) -> bool {
    line.trim() == CARD_SEPARATOR
}

fn is_answer_separator(line: &str) -> bool {
    line.trim() == ANSWER_SEPARATOR
}

/// A run of lines between card separators.
struct Block<'a> {
    /// 0-based line of the first line in the block.
    start_line: usize,
    lines: Vec<&'a str>,
}

impl Block<'_> {
    fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }

    /// 1-based line of the first non-blank line.
    fn first_content_line(&self) -> usize {
        let offset = self
            .lines
            .iter()
            .position(|line| !line.trim().is_empty())
            .unwrap_or(0);
        self.start_line + offset + 1
    }
}

pub struct Parser<'r> {
    renderer: &'r dyn Renderer,
    fallback_title: Option<String>,
}

impl<'r> Parser<'r> {
    pub fn new(renderer: &'r dyn Renderer) -> Self {
        Parser {
            renderer,
            fallback_title: None,
        }
    }

    pub fn with_fallback_title(mut self, title: impl Into<String>) -> Self {
        self.fallback_title = Some(title.into());
        self
    }

    /// Parse a whole deck. Either every card parses or nothing is returned.
    pub fn parse(&self, text: &str) -> Result<ParsedDeck, ParseError> {
        let (metadata, body, body_line) = extract_frontmatter(text);

        let blocks: Vec<Block> = split_blocks(body, body_line)
            .into_iter()
            .filter(|block| !block.is_blank())
            .collect();
        log::debug!("Found {} card blocks", blocks.len());
        if blocks.is_empty() {
            return Err(ParseError::NoCardsFound);
        }

        let cards = blocks
            .iter()
            .enumerate()
            .map(|(idx, block)| self.parse_card(idx + 1, block))
            .collect::<Result<Vec<_>, _>>()?;

        if metadata.title.is_none() {
            log::warn!("No title found in front matter.");
        }
        let title = resolve_title(metadata.title.as_deref(), self.fallback_title.as_deref());
        Ok(ParsedDeck { title, cards })
    }

    fn parse_card(&self, card: usize, block: &Block) -> Result<Flashcard, ParseError> {
        let line = block.first_content_line();
        let pieces: Vec<String> = block
            .lines
            .split(|line| is_answer_separator(line))
            .map(|piece| piece.join("\n").trim().to_string())
            .collect();
        let [question, answer] = pieces.as_slice() else {
            return Err(ParseError::MalformedCardSeparator { card, line });
        };
        if question.is_empty() {
            return Err(ParseError::EmptyQuestionOrAnswer {
                card,
                side: Side::Question,
                line,
            });
        }
        if answer.is_empty() {
            return Err(ParseError::EmptyQuestionOrAnswer {
                card,
                side: Side::Answer,
                line,
            });
        }
        Ok(Flashcard::new(
            self.renderer.render(question),
            self.renderer.render(answer),
        ))
    }
}

fn split_blocks(body: &str, body_line: usize) -> Vec<Block<'_>> {
    let mut blocks = Vec::new();
    let mut current = Block {
        start_line: body_line,
        lines: Vec::new(),
    };
    for (idx, line) in body.lines().enumerate() {
        if is_separator(line) {
            let next = Block {
                start_line: body_line + idx + 1,
                lines: Vec::new(),
            };
            blocks.push(std::mem::replace(&mut current, next));
        } else {
            current.lines.push(line);
        }
    }
    blocks.push(current);
    blocks
}
