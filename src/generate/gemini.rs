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

//! Client for the Gemini `generateContent` endpoint.

use std::env;

use flipdeck_core::generate::GenerateError;
use serde::Deserialize;
use serde::Serialize;

const API_KEY_VAR: &str = "GEMINI_API_KEY";
const MODEL_VAR: &str = "GEMINI_MODEL";
const BASE_URL_VAR: &str = "GEMINI_BASE_URL";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A part of the prompt sent alongside the instructions.
#[derive(Debug, PartialEq)]
pub enum Attachment {
    /// Raw file bytes, base64-encoded.
    Inline { mime_type: &'static str, data: String },
    /// Text extracted from the file.
    Text(String),
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text { text: &'a str },
    Inline { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct GeminiClient {
    api_key: String,
    model: String,
    base_url: String,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Configure the client from `GEMINI_API_KEY`, `GEMINI_MODEL` and
    /// `GEMINI_BASE_URL`.
    pub fn from_env() -> Result<Self, GenerateError> {
        let api_key = env::var(API_KEY_VAR)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(GenerateError::MissingCredential)?;
        let model = env::var(MODEL_VAR)
            .ok()
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let client = Self::new(api_key, model);
        Ok(match env::var(BASE_URL_VAR) {
            Ok(url) if !url.trim().is_empty() => client.with_base_url(url.trim_end_matches('/')),
            _ => client,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send the prompt and attachment, returning the model's text.
    pub async fn generate(
        &self,
        prompt: &str,
        attachment: &Attachment,
    ) -> Result<String, GenerateError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let attachment_part = match attachment {
            Attachment::Inline { mime_type, data } => RequestPart::Inline {
                inline_data: InlineData { mime_type, data },
            },
            Attachment::Text(text) => RequestPart::Text { text },
        };
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![RequestPart::Text { text: prompt }, attachment_part],
            }],
        };

        log::debug!("Requesting cards from {}", self.model);
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerateError::Request(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| GenerateError::Request(e.to_string()))?;
        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}"));
            return Err(GenerateError::Request(detail));
        }
        response_text(&text)
    }
}

/// Concatenate the text parts of the first candidate.
fn response_text(body: &str) -> Result<String, GenerateError> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| GenerateError::MalformedResponse(e.to_string()))?;
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(GenerateError::MalformedResponse(
            "the response contains no text".to_string(),
        ));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text() -> Result<(), GenerateError> {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "{\"title\": "}, {"text": "\"T\"}"}]}}]}"#;
        assert_eq!(response_text(body)?, r#"{"title": "T"}"#);
        Ok(())
    }

    #[test]
    fn test_response_without_candidates() {
        let result = response_text(r#"{"candidates": []}"#);
        assert_eq!(
            result,
            Err(GenerateError::MalformedResponse(
                "the response contains no text".to_string()
            ))
        );
        let result = response_text(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_request_body_shape() -> Result<(), serde_json::Error> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    RequestPart::Text { text: "prompt" },
                    RequestPart::Inline {
                        inline_data: InlineData {
                            mime_type: "application/pdf",
                            data: "JVBERg==",
                        },
                    },
                ],
            }],
        };
        let json = serde_json::to_value(&body)?;
        assert_eq!(json["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(
            json["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "application/pdf"
        );
        assert_eq!(
            json["contents"][0]["parts"][1]["inline_data"]["data"],
            "JVBERg=="
        );
        Ok(())
    }
}
