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

//! Decks from PDF and Word documents, written by Gemini.

pub mod docx;
pub mod gemini;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flipdeck_core::generate::DocumentKind;
use flipdeck_core::generate::GENERATION_PROMPT;
use flipdeck_core::generate::GenerateError;
use flipdeck_core::generate::GeneratedDeck;
use flipdeck_core::generate::interpret_response;
use flipdeck_core::markdown::MarkdownRenderer;
use flipdeck_core::parser::fallback_title_from_filename;

use crate::generate::docx::docx_to_text;
use crate::generate::gemini::Attachment;
use crate::generate::gemini::GeminiClient;

/// What to send for a document: PDFs go as they are, Word files as text.
pub fn attachment(kind: DocumentKind, bytes: &[u8]) -> Result<Attachment, GenerateError> {
    match kind {
        DocumentKind::Pdf => Ok(Attachment::Inline {
            mime_type: kind.mime(),
            data: STANDARD.encode(bytes),
        }),
        DocumentKind::Docx => docx_to_text(bytes).map(Attachment::Text),
    }
}

/// Ask the model for a deck covering the document.
pub async fn generate_deck(
    client: &GeminiClient,
    filename: &str,
    kind: DocumentKind,
    bytes: &[u8],
) -> Result<GeneratedDeck, GenerateError> {
    let attachment = attachment(kind, bytes)?;
    let text = client.generate(GENERATION_PROMPT, &attachment).await?;
    let fallback = fallback_title_from_filename(filename);
    interpret_response(&text, Some(fallback.as_str()), &MarkdownRenderer)
}

#[cfg(test)]
mod tests {
    use axum::Json;
    use axum::Router;
    use axum::http::HeaderMap;
    use axum::http::StatusCode;
    use axum::routing::post;
    use flipdeck_core::error::Fallible;
    use portpicker::pick_unused_port;
    use serde_json::Value;
    use serde_json::json;
    use tokio::net::TcpListener;
    use tokio::spawn;

    use super::*;
    use crate::utils::wait_for_server;

    const TEST_HOST: &str = "127.0.0.1";

    #[test]
    fn test_pdf_attachment() -> Result<(), GenerateError> {
        let attachment = attachment(DocumentKind::Pdf, b"%PDF")?;
        assert_eq!(
            attachment,
            Attachment::Inline {
                mime_type: "application/pdf",
                data: "JVBERg==".to_string(),
            }
        );
        Ok(())
    }

    #[test]
    fn test_bad_docx_attachment() {
        let result = attachment(DocumentKind::Docx, b"nope");
        assert!(matches!(result, Err(GenerateError::Document(_))));
    }

    async fn fake_gemini(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some("secret") {
            return (
                StatusCode::FORBIDDEN,
                Json(json!({"error": {"message": "API key not valid."}})),
            );
        }
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], GENERATION_PROMPT);
        assert_eq!(parts[1]["inline_data"]["mime_type"], "application/pdf");
        let answer = r#"```json
{"title": "Cells", "cards": [{"question": "Powerhouse of the cell?", "answer": "The **mitochondria**"}]}
```"#;
        (
            StatusCode::OK,
            Json(json!({"candidates": [{"content": {"parts": [{"text": answer}]}}]})),
        )
    }

    async fn start_fake_gemini() -> Fallible<u16> {
        let port = pick_unused_port().unwrap();
        let app = Router::new().route("/models/{*rest}", post(fake_gemini));
        let listener = TcpListener::bind(format!("{TEST_HOST}:{port}")).await?;
        spawn(async move { axum::serve(listener, app).await });
        wait_for_server(TEST_HOST, port).await?;
        Ok(port)
    }

    #[tokio::test]
    async fn test_generate_deck() -> Fallible<()> {
        let port = start_fake_gemini().await?;
        let client = GeminiClient::new("secret", "test-model")
            .with_base_url(format!("http://{TEST_HOST}:{port}"));
        let deck = generate_deck(&client, "biology.pdf", DocumentKind::Pdf, b"%PDF-1.4").await?;
        assert_eq!(deck.title, "Cells");
        assert_eq!(deck.cards.len(), 1);
        assert_eq!(deck.cards[0].answer, "The <strong>mitochondria</strong>");
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_deck_rejected_key() -> Fallible<()> {
        let port = start_fake_gemini().await?;
        let client = GeminiClient::new("wrong", "test-model")
            .with_base_url(format!("http://{TEST_HOST}:{port}"));
        let result = generate_deck(&client, "biology.pdf", DocumentKind::Pdf, b"%PDF-1.4").await;
        assert_eq!(
            result,
            Err(GenerateError::Request("API key not valid.".to_string()))
        );
        Ok(())
    }
}
