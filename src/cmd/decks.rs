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

use clap::ValueEnum;
use flipdeck_core::error::Fallible;
use flipdeck_core::error::fail;
use flipdeck_core::store::DeckStore;
use flipdeck_core::types::deck::DeckId;
use flipdeck_core::types::deck::DeckMetadata;
use flipdeck_core::types::deck::deck_metadata;

use crate::store::open_store;

#[derive(ValueEnum, Clone, Copy, PartialEq)]
pub enum ListFormat {
    /// One line per deck.
    Text,
    /// A JSON array of deck metadata.
    Json,
}

impl Display for ListFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ListFormat::Text => write!(f, "text"),
            ListFormat::Json => write!(f, "json"),
        }
    }
}

pub fn list_decks(store: Option<String>, format: ListFormat) -> Fallible<()> {
    let store = open_store(store)?;
    let metadata = deck_metadata(&store.load());
    println!("{}", format_decks(&metadata, format)?);
    Ok(())
}

fn format_decks(decks: &[DeckMetadata], format: ListFormat) -> Fallible<String> {
    match format {
        ListFormat::Json => Ok(serde_json::to_string_pretty(decks)?),
        ListFormat::Text => {
            if decks.is_empty() {
                return Ok("No decks.".to_string());
            }
            let lines: Vec<String> = decks
                .iter()
                .map(|deck| {
                    format!(
                        "{}\t{}\t{} cards\t{}",
                        deck.id, deck.name, deck.card_count, deck.last_modified
                    )
                })
                .collect();
            Ok(lines.join("\n"))
        }
    }
}

pub fn delete_deck(id: String, store: Option<String>) -> Fallible<()> {
    let store = open_store(store)?;
    let id = DeckId::new(id);
    if !store.load().iter().any(|deck| deck.id == id) {
        return fail(format!("No deck with id '{id}'."));
    }
    store.delete(&id)?;
    println!("Deleted {id}");
    Ok(())
}

pub fn reset_store(store: Option<String>) -> Fallible<()> {
    let store = open_store(store)?;
    let count = store.load().len();
    store.clear()?;
    println!("Deleted {count} decks");
    Ok(())
}

#[cfg(test)]
mod tests {
    use flipdeck_core::types::card::Flashcard;
    use flipdeck_core::types::deck::Deck;
    use flipdeck_core::types::timestamp::Timestamp;
    use tempfile::tempdir;

    use super::*;

    fn make_metadata() -> Vec<DeckMetadata> {
        let now = Timestamp::from_unix_millis(1_700_000_000_000).unwrap();
        let deck = Deck::new(
            DeckId::new("physics"),
            "Physics",
            vec![Flashcard::new("F", "ma")],
            now,
        );
        deck_metadata(&[deck])
    }

    #[test]
    fn test_format_text() -> Fallible<()> {
        let text = format_decks(&make_metadata(), ListFormat::Text)?;
        assert_eq!(text, "physics\tPhysics\t1 cards\t2023-11-14T22:13:20.000Z");
        assert_eq!(format_decks(&[], ListFormat::Text)?, "No decks.");
        Ok(())
    }

    #[test]
    fn test_format_json() -> Fallible<()> {
        let json = format_decks(&make_metadata(), ListFormat::Json)?;
        let value: serde_json::Value = serde_json::from_str(&json)?;
        assert_eq!(value[0]["cardCount"], 1);
        assert_eq!(value[0]["name"], "Physics");
        Ok(())
    }

    #[test]
    fn test_delete_and_reset() -> Fallible<()> {
        let dir = tempdir()?;
        let directory = dir.path().display().to_string();
        let store = open_store(Some(directory.clone()))?;
        let now = Timestamp::now();
        for id in ["a", "b"] {
            store.save(&Deck::new(DeckId::new(id), id, vec![Flashcard::new("Q", "A")], now))?;
        }

        delete_deck("a".to_string(), Some(directory.clone()))?;
        assert_eq!(store.load().len(), 1);
        let err = delete_deck("a".to_string(), Some(directory.clone())).err().unwrap();
        assert_eq!(err.to_string(), "error: No deck with id 'a'.");

        reset_store(Some(directory))?;
        assert!(store.load().is_empty());
        Ok(())
    }
}
