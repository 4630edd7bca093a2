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

//! Deck persistence.
//!
//! All decks live in a single JSON array under [`STORAGE_KEY`] in a
//! string-keyed blob store: `localStorage` in the browser, a directory of
//! files on the command line, a map in tests.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::error::Fallible;
use crate::types::deck::Deck;
use crate::types::deck::DeckId;

/// The key the deck list is stored under.
pub const STORAGE_KEY: &str = "flashcard-decks";

/// A string key-value store.
pub trait BlobStorage {
    fn get(&self, key: &str) -> Fallible<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Fallible<()>;
    fn remove(&self, key: &str) -> Fallible<()>;
}

pub trait DeckStore {
    /// All stored decks. Missing or unreadable data is an empty list.
    fn load(&self) -> Vec<Deck>;
    /// Insert the deck, or replace the stored deck with the same id.
    fn save(&self, deck: &Deck) -> Fallible<()>;
    /// Remove the deck with the given id, if any.
    fn delete(&self, id: &DeckId) -> Fallible<()>;
    /// Remove every deck.
    fn clear(&self) -> Fallible<()>;
}

/// A [`DeckStore`] over any [`BlobStorage`].
pub struct BlobDeckStore<S> {
    storage: S,
}

impl<S: BlobStorage> BlobDeckStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn write(&self, decks: &[Deck]) -> Fallible<()> {
        let data = serde_json::to_string(decks)?;
        self.storage.set(STORAGE_KEY, &data)
    }
}

impl<S: BlobStorage> DeckStore for BlobDeckStore<S> {
    fn load(&self) -> Vec<Deck> {
        let data = match self.storage.get(STORAGE_KEY) {
            Ok(Some(data)) => data,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("Error loading decks: {e}");
                return Vec::new();
            }
        };
        match serde_json::from_str(&data) {
            Ok(decks) => decks,
            Err(e) => {
                log::warn!("Error loading decks: {e}");
                Vec::new()
            }
        }
    }

    fn save(&self, deck: &Deck) -> Fallible<()> {
        let mut decks = self.load();
        match decks.iter_mut().find(|d| d.id == deck.id) {
            Some(existing) => *existing = deck.clone(),
            None => decks.push(deck.clone()),
        }
        self.write(&decks)
    }

    fn delete(&self, id: &DeckId) -> Fallible<()> {
        let mut decks = self.load();
        decks.retain(|d| &d.id != id);
        self.write(&decks)
    }

    fn clear(&self) -> Fallible<()> {
        self.storage.remove(STORAGE_KEY)
    }
}

/// In-memory [`BlobStorage`].
#[derive(Default)]
pub struct MemoryStorage {
    entries: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStorage for MemoryStorage {
    fn get(&self, key: &str) -> Fallible<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Fallible<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Fallible<()> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::card::Flashcard;
    use crate::types::timestamp::Timestamp;

    fn make_deck(id: &str, name: &str) -> Deck {
        let now = Timestamp::from_unix_millis(1_700_000_000_000).unwrap();
        Deck::new(
            DeckId::new(id),
            name,
            vec![Flashcard::new("Q", "A")],
            now,
        )
    }

    fn make_store() -> BlobDeckStore<MemoryStorage> {
        BlobDeckStore::new(MemoryStorage::new())
    }

    #[test]
    fn test_load_empty() {
        assert!(make_store().load().is_empty());
    }

    #[test]
    fn test_save_then_load() -> Fallible<()> {
        let store = make_store();
        let deck = make_deck("a", "Alpha");
        store.save(&deck)?;
        let decks = store.load();
        assert_eq!(decks, vec![deck]);
        Ok(())
    }

    #[test]
    fn test_save_upserts_in_place() -> Fallible<()> {
        let store = make_store();
        store.save(&make_deck("a", "Alpha"))?;
        store.save(&make_deck("b", "Beta"))?;
        store.save(&make_deck("a", "Alpha v2"))?;
        let names: Vec<String> = store.load().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["Alpha v2", "Beta"]);
        Ok(())
    }

    #[test]
    fn test_delete() -> Fallible<()> {
        let store = make_store();
        store.save(&make_deck("a", "Alpha"))?;
        store.save(&make_deck("b", "Beta"))?;
        store.delete(&DeckId::new("a"))?;
        let ids: Vec<DeckId> = store.load().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![DeckId::new("b")]);
        // Deleting a missing id is not an error.
        store.delete(&DeckId::new("zzz"))?;
        assert_eq!(store.load().len(), 1);
        Ok(())
    }

    #[test]
    fn test_corrupt_blob_is_empty() -> Fallible<()> {
        let store = make_store();
        store.storage().set(STORAGE_KEY, "{not json")?;
        assert!(store.load().is_empty());
        // Saving over a corrupt blob replaces it.
        store.save(&make_deck("a", "Alpha"))?;
        assert_eq!(store.load().len(), 1);
        Ok(())
    }

    #[test]
    fn test_clear() -> Fallible<()> {
        let store = make_store();
        store.save(&make_deck("a", "Alpha"))?;
        store.clear()?;
        assert!(store.load().is_empty());
        assert_eq!(store.storage().get(STORAGE_KEY)?, None);
        Ok(())
    }

    #[test]
    fn test_reads_browser_written_blob() -> Fallible<()> {
        let store = make_store();
        let blob = r#"[{"id":"bio.md-1","name":"Bio","cards":[{"question":"Q","answer":"A"}],
            "createdAt":"2024-03-01T10:00:00.000Z","lastModified":"2024-03-02T10:00:00.000Z"}]"#;
        store.storage().set(STORAGE_KEY, blob)?;
        let decks = store.load();
        assert_eq!(decks.len(), 1);
        assert_eq!(decks[0].id.as_str(), "bio.md-1");
        assert_eq!(decks[0].metadata().card_count, 1);
        assert_eq!(
            decks[0].last_modified.to_string(),
            "2024-03-02T10:00:00.000Z"
        );
        Ok(())
    }
}
