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

//! WASM bindings for flipdeck: upload, store and study decks in the browser.

use flipdeck_core::error::ErrorReport;
use flipdeck_core::types::deck::DeckId;
use flipdeck_core::types::timestamp::Timestamp;
use wasm_bindgen::prelude::*;
use web_sys::console;

mod library;
mod storage;

use library::DeckLibrary;
use storage::LocalStorage;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    console::log_1(&"flipdeck WASM initialized".into());
}

fn to_js(e: ErrorReport) -> JsValue {
    JsValue::from_str(e.message())
}

fn now() -> Result<Timestamp, JsValue> {
    Timestamp::from_unix_millis(js_sys::Date::now() as i64)
        .ok_or_else(|| JsValue::from_str("Clock out of range"))
}

/// The application state managed from JavaScript.
#[wasm_bindgen]
pub struct FlipdeckApp {
    library: DeckLibrary<LocalStorage>,
}

#[wasm_bindgen]
impl FlipdeckApp {
    /// Load decks from localStorage and select the first one.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let seed = js_sys::Date::now() as u64;
        Self {
            library: DeckLibrary::open(LocalStorage::new(), seed),
        }
    }

    /// Parse and store a Markdown deck. Returns the new deck's id.
    #[wasm_bindgen]
    pub fn upload_markdown(&mut self, filename: &str, content: &str) -> Result<String, JsValue> {
        let id = self
            .library
            .upload_markdown(filename, content, now()?)
            .map_err(to_js)?;
        Ok(id.to_string())
    }

    /// Store a deck from the generator's response to a PDF or Word upload.
    /// Returns the new deck's id.
    #[wasm_bindgen]
    pub fn import_generated(&mut self, filename: &str, response_text: &str) -> Result<String, JsValue> {
        let id = self
            .library
            .import_generated(filename, response_text, now()?)
            .map_err(to_js)?;
        Ok(id.to_string())
    }

    /// Deck metadata as a JSON array.
    #[wasm_bindgen]
    pub fn decks_json(&self) -> String {
        serde_json::to_string(&self.library.decks()).unwrap_or_else(|_| "[]".to_string())
    }

    #[wasm_bindgen]
    pub fn selected_deck(&self) -> Option<String> {
        self.library.selected().map(DeckId::to_string)
    }

    #[wasm_bindgen]
    pub fn select_deck(&mut self, id: &str) -> Result<(), JsValue> {
        self.library.select(&DeckId::new(id)).map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn delete_deck(&mut self, id: &str) -> Result<(), JsValue> {
        self.library.delete(&DeckId::new(id)).map_err(to_js)
    }

    /// Delete every deck.
    #[wasm_bindgen]
    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.library.reset().map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn flip(&mut self) {
        self.library.session_mut().flip();
    }

    #[wasm_bindgen]
    pub fn next(&mut self) -> bool {
        self.library.session_mut().next()
    }

    #[wasm_bindgen]
    pub fn previous(&mut self) -> bool {
        self.library.session_mut().previous()
    }

    #[wasm_bindgen]
    pub fn shuffle(&mut self) {
        self.library.shuffle();
    }

    #[wasm_bindgen]
    pub fn current_question_html(&self) -> Option<String> {
        self.library.session().current().map(|c| c.question.clone())
    }

    #[wasm_bindgen]
    pub fn current_answer_html(&self) -> Option<String> {
        self.library.session().current().map(|c| c.answer.clone())
    }

    #[wasm_bindgen]
    pub fn is_flipped(&self) -> bool {
        self.library.session().is_flipped()
    }

    /// 1-based position of the current card.
    #[wasm_bindgen]
    pub fn position(&self) -> usize {
        self.library.session().position()
    }

    #[wasm_bindgen]
    pub fn total(&self) -> usize {
        self.library.session().len()
    }

    /// Percentage of the deck seen.
    #[wasm_bindgen]
    pub fn progress(&self) -> f64 {
        self.library.session().progress()
    }
}

impl Default for FlipdeckApp {
    fn default() -> Self {
        Self::new()
    }
}
