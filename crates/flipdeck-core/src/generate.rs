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

//! The contract with the model that turns PDF and Word documents into cards.
//!
//! The network call itself lives with the caller; this module decides which
//! uploads need it, what to ask for, and how to read the answer.

use std::error::Error;
use std::fmt::Display;
use std::fmt::Formatter;

use serde_json::Value;

use crate::markdown::Renderer;
use crate::parser::resolve_title;
use crate::types::card::Flashcard;

pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const PDF_MIME: &str = "application/pdf";
const MARKDOWN_MIME: &str = "text/markdown";

pub const GENERATION_PROMPT: &str = "\
You are a helpful AI that creates flashcards from documents. For the given document:
1. Identify the key concepts, facts, and ideas
2. Create question-answer pairs that test understanding of these concepts
3. Make sure questions are clear and specific
4. Ensure answers are concise but complete
5. Return ONLY a JSON object in this exact format, with no markdown formatting or code blocks:
{
  \"title\": \"Document Title\",
  \"cards\": [
    {
      \"question\": \"Question text here\",
      \"answer\": \"Answer text here\"
    }
  ]
}
6. Create at least 10 flashcards, but no more than 20
7. Do not include any text before or after the JSON
8. Do not wrap the JSON in code blocks or markdown
";

/// Documents the generator accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim() {
            PDF_MIME => Some(DocumentKind::Pdf),
            DOCX_MIME => Some(DocumentKind::Docx),
            _ => None,
        }
    }

    pub fn from_filename(filename: &str) -> Option<Self> {
        match extension(filename)?.as_str() {
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            DocumentKind::Pdf => PDF_MIME,
            DocumentKind::Docx => DOCX_MIME,
        }
    }
}

/// How an uploaded file becomes a deck.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadKind {
    /// Parsed locally.
    Markdown,
    /// Sent to the generator.
    Document(DocumentKind),
}

impl UploadKind {
    /// Decide from the declared MIME type, falling back to the extension.
    pub fn classify(filename: &str, mime: Option<&str>) -> Result<Self, GenerateError> {
        if mime.is_some_and(|m| m.trim() == MARKDOWN_MIME) {
            return Ok(UploadKind::Markdown);
        }
        if let Some(kind) = mime.and_then(DocumentKind::from_mime) {
            return Ok(UploadKind::Document(kind));
        }
        match extension(filename).as_deref() {
            Some("md" | "markdown") => Ok(UploadKind::Markdown),
            _ => DocumentKind::from_filename(filename)
                .map(UploadKind::Document)
                .ok_or_else(|| GenerateError::UnsupportedFileType(filename.to_string())),
        }
    }
}

fn extension(filename: &str) -> Option<String> {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
}

#[derive(Debug, PartialEq)]
pub enum GenerateError {
    /// No API key is configured.
    MissingCredential,
    /// The file is neither Markdown nor a supported document.
    UnsupportedFileType(String),
    /// The model's answer is not a `{title, cards}` object.
    MalformedResponse(String),
    /// The request to the model failed.
    Request(String),
    /// The document could not be read.
    Document(String),
}

impl Display for GenerateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerateError::MissingCredential => write!(
                f,
                "Gemini API key not found. Set the GEMINI_API_KEY environment variable to your API key (no spaces or quotes) and try again."
            ),
            GenerateError::UnsupportedFileType(name) => write!(
                f,
                "Unsupported file type: '{name}'. Upload a Markdown (.md), PDF (.pdf) or Word (.docx) file."
            ),
            GenerateError::MalformedResponse(detail) => {
                write!(f, "Failed to parse AI response: {detail}. Please try again.")
            }
            GenerateError::Request(detail) => {
                write!(f, "Failed to generate flashcards: {detail}")
            }
            GenerateError::Document(detail) => write!(f, "Failed to read document: {detail}"),
        }
    }
}

impl Error for GenerateError {}

/// A deck produced by the generator.
#[derive(Debug, PartialEq)]
pub struct GeneratedDeck {
    pub title: String,
    pub cards: Vec<Flashcard>,
}

/// Find the JSON object in a model response: the body of a fenced code block
/// if there is one, else everything from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> &str {
    if let Some(fenced) = fenced_block(text) {
        return fenced;
    }
    match (text.find('{'), text.rfind('}')) {
        (Some(first), Some(last)) if first < last => &text[first..=last],
        _ => text,
    }
}

fn fenced_block(text: &str) -> Option<&str> {
    let start = text.find("```")?;
    let after = &text[start + 3..];
    let after = after.strip_prefix("json").unwrap_or(after);
    let end = after.find("```")?;
    let inner = after[..end].trim();
    inner.starts_with('{').then_some(inner)
}

/// Turn a model response into a deck. Card sides go through the renderer so
/// generated decks hold the same markup as parsed ones.
pub fn interpret_response(
    text: &str,
    fallback_title: Option<&str>,
    renderer: &dyn Renderer,
) -> Result<GeneratedDeck, GenerateError> {
    let json = extract_json(text);
    let value: Value = serde_json::from_str(json).map_err(|e| {
        log::debug!("Unparseable response: {text}");
        GenerateError::MalformedResponse(e.to_string())
    })?;
    let cards = value
        .get("cards")
        .and_then(Value::as_array)
        .ok_or_else(|| GenerateError::MalformedResponse("missing cards array".to_string()))?;
    if cards.is_empty() {
        return Err(GenerateError::MalformedResponse(
            "the cards array is empty".to_string(),
        ));
    }
    let cards = cards
        .iter()
        .enumerate()
        .map(|(idx, card)| {
            let side = |key: &str| {
                card.get(key)
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
            };
            match (side("question"), side("answer")) {
                (Some(question), Some(answer)) => Ok(Flashcard::new(
                    renderer.render(question),
                    renderer.render(answer),
                )),
                _ => Err(GenerateError::MalformedResponse(format!(
                    "card {} needs a question and an answer",
                    idx + 1
                ))),
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    let title = resolve_title(value.get("title").and_then(Value::as_str), fallback_title);
    log::debug!("Generated {} cards for '{title}'", cards.len());
    Ok(GeneratedDeck { title, cards })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::MarkdownRenderer;
    use crate::markdown::PlainRenderer;
    use crate::parser::UNTITLED_DECK;

    #[test]
    fn test_classify() {
        assert_eq!(
            UploadKind::classify("deck.md", None),
            Ok(UploadKind::Markdown)
        );
        assert_eq!(
            UploadKind::classify("deck.txt", Some("text/markdown")),
            Ok(UploadKind::Markdown)
        );
        assert_eq!(
            UploadKind::classify("Paper.PDF", None),
            Ok(UploadKind::Document(DocumentKind::Pdf))
        );
        assert_eq!(
            UploadKind::classify("blob", Some(DOCX_MIME)),
            Ok(UploadKind::Document(DocumentKind::Docx))
        );
        assert_eq!(
            UploadKind::classify("photo.png", Some("image/png")),
            Err(GenerateError::UnsupportedFileType("photo.png".to_string()))
        );
    }

    #[test]
    fn test_mime_round_trip() {
        for kind in [DocumentKind::Pdf, DocumentKind::Docx] {
            assert_eq!(DocumentKind::from_mime(kind.mime()), Some(kind));
        }
    }

    #[test]
    fn test_extract_json_bare() {
        assert_eq!(extract_json(r#"{"a":1}"#), r#"{"a":1}"#);
    }

    #[test]
    fn test_extract_json_fenced() {
        let text = "Here you go:\n```json\n{\"a\": 1}\n```\nEnjoy! {not this}";
        assert_eq!(extract_json(text), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_json_embedded() {
        let text = "Sure! {\"a\": {\"b\": 2}} Hope that helps.";
        assert_eq!(extract_json(text), "{\"a\": {\"b\": 2}}");
    }

    #[test]
    fn test_extract_json_no_object() {
        assert_eq!(extract_json("no json here"), "no json here");
    }

    #[test]
    fn test_interpret_response() -> Result<(), GenerateError> {
        let text = r#"{"title": "Photosynthesis", "cards": [
            {"question": "Where does it happen?", "answer": "In the **chloroplast**."},
            {"question": "Output?", "answer": "$O_2$"}
        ]}"#;
        let deck = interpret_response(text, Some("bio"), &MarkdownRenderer)?;
        assert_eq!(deck.title, "Photosynthesis");
        assert_eq!(deck.cards.len(), 2);
        assert_eq!(deck.cards[0].answer, "In the <strong>chloroplast</strong>.");
        assert_eq!(
            deck.cards[1].answer,
            r#"<span class="math math-inline">O_2</span>"#
        );
        Ok(())
    }

    #[test]
    fn test_interpret_response_title_fallback() -> Result<(), GenerateError> {
        let text = r#"{"cards": [{"question": "Q", "answer": "A"}]}"#;
        let deck = interpret_response(text, Some("lecture"), &PlainRenderer)?;
        assert_eq!(deck.title, "lecture");
        let deck = interpret_response(text, None, &PlainRenderer)?;
        assert_eq!(deck.title, UNTITLED_DECK);
        Ok(())
    }

    #[test]
    fn test_interpret_response_missing_cards() {
        let result = interpret_response(r#"{"title": "T"}"#, None, &PlainRenderer);
        assert_eq!(
            result,
            Err(GenerateError::MalformedResponse(
                "missing cards array".to_string()
            ))
        );
        let result = interpret_response(r#"{"cards": "lots"}"#, None, &PlainRenderer);
        assert!(matches!(result, Err(GenerateError::MalformedResponse(_))));
    }

    #[test]
    fn test_interpret_response_bad_card() {
        let text = r#"{"cards": [{"question": "Q", "answer": "A"}, {"question": "Q2"}]}"#;
        let result = interpret_response(text, None, &PlainRenderer);
        assert_eq!(
            result,
            Err(GenerateError::MalformedResponse(
                "card 2 needs a question and an answer".to_string()
            ))
        );
    }

    #[test]
    fn test_interpret_response_not_json() {
        let result = interpret_response("I cannot help with that.", None, &PlainRenderer);
        assert!(matches!(result, Err(GenerateError::MalformedResponse(_))));
    }

    #[test]
    fn test_missing_credential_message() {
        let message = GenerateError::MissingCredential.to_string();
        assert!(message.contains("GEMINI_API_KEY"));
    }
}
