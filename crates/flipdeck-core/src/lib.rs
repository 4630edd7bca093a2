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

//! flipdeck-core: the parts of flipdeck shared by the command line and the
//! browser.
//!
//! - Parsing Markdown decks into flashcards
//! - Rendering card text, including TeX math, to HTML
//! - Reading decks generated from PDF and Word documents
//! - Storing decks in a key-value blob store
//! - Study sessions: flipping, navigating and shuffling

pub mod error;
pub mod generate;
pub mod markdown;
pub mod parser;
pub mod rng;
pub mod session;
pub mod store;
pub mod types;

pub use error::ErrorReport;
pub use error::Fallible;
pub use error::fail;
pub use generate::GenerateError;
pub use generate::UploadKind;
pub use markdown::MarkdownRenderer;
pub use markdown::Renderer;
pub use parser::ParseError;
pub use parser::parse_deck_content;
pub use session::StudySession;
pub use store::BlobDeckStore;
pub use store::BlobStorage;
pub use store::DeckStore;
pub use types::card::Flashcard;
pub use types::deck::Deck;
pub use types::deck::DeckId;
pub use types::timestamp::Timestamp;
