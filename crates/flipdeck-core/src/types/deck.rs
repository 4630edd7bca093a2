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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::types::card::Flashcard;
use crate::types::timestamp::Timestamp;

/// Identifies a deck in the store. Minted by whoever creates the deck.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeckId(String);

impl DeckId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id given to an uploaded file: its name plus the upload time.
    pub fn for_upload(filename: &str, uploaded_at: Timestamp) -> Self {
        Self(format!("{filename}-{}", uploaded_at.unix_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for DeckId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DeckId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A named, ordered collection of flashcards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    pub id: DeckId,
    pub name: String,
    pub cards: Vec<Flashcard>,
    pub created_at: Timestamp,
    pub last_modified: Timestamp,
}

impl Deck {
    pub fn new(id: DeckId, name: impl Into<String>, cards: Vec<Flashcard>, now: Timestamp) -> Self {
        Self {
            id,
            name: name.into(),
            cards,
            created_at: now,
            last_modified: now,
        }
    }

    pub fn metadata(&self) -> DeckMetadata {
        DeckMetadata {
            id: self.id.clone(),
            name: self.name.clone(),
            card_count: self.cards.len(),
            created_at: self.created_at,
            last_modified: self.last_modified,
        }
    }
}

/// A deck without its cards, for listings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeckMetadata {
    pub id: DeckId,
    pub name: String,
    pub card_count: usize,
    pub created_at: Timestamp,
    pub last_modified: Timestamp,
}

pub fn deck_metadata(decks: &[Deck]) -> Vec<DeckMetadata> {
    decks.iter().map(Deck::metadata).collect()
}
