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

//! The deck list and study session behind the browser UI.

use flipdeck_core::error::Fallible;
use flipdeck_core::error::fail;
use flipdeck_core::generate::interpret_response;
use flipdeck_core::markdown::MarkdownRenderer;
use flipdeck_core::parser::Parser;
use flipdeck_core::parser::fallback_title_from_filename;
use flipdeck_core::rng::TinyRng;
use flipdeck_core::session::StudySession;
use flipdeck_core::store::BlobDeckStore;
use flipdeck_core::store::BlobStorage;
use flipdeck_core::store::DeckStore;
use flipdeck_core::types::card::Flashcard;
use flipdeck_core::types::deck::Deck;
use flipdeck_core::types::deck::DeckId;
use flipdeck_core::types::deck::DeckMetadata;
use flipdeck_core::types::deck::deck_metadata;
use flipdeck_core::types::timestamp::Timestamp;

pub struct DeckLibrary<S> {
    store: BlobDeckStore<S>,
    decks: Vec<Deck>,
    selected: Option<DeckId>,
    session: StudySession,
    rng: TinyRng,
}

impl<S: BlobStorage> DeckLibrary<S> {
    /// Load the stored decks and start studying the first one.
    pub fn open(storage: S, seed: u64) -> Self {
        let store = BlobDeckStore::new(storage);
        let decks = store.load();
        log::debug!("Loaded {} decks", decks.len());
        let mut library = Self {
            store,
            decks,
            selected: None,
            session: StudySession::in_order(Vec::new()),
            rng: TinyRng::from_seed(seed),
        };
        library.select_first();
        library
    }

    pub fn decks(&self) -> Vec<DeckMetadata> {
        deck_metadata(&self.decks)
    }

    pub fn selected(&self) -> Option<&DeckId> {
        self.selected.as_ref()
    }

    pub fn session(&self) -> &StudySession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut StudySession {
        &mut self.session
    }

    /// Parse an uploaded Markdown file, store it and select it.
    pub fn upload_markdown(
        &mut self,
        filename: &str,
        content: &str,
        now: Timestamp,
    ) -> Fallible<DeckId> {
        let renderer = MarkdownRenderer;
        let parsed = Parser::new(&renderer)
            .with_fallback_title(fallback_title_from_filename(filename))
            .parse(content)?;
        self.add(filename, parsed.title, parsed.cards, now)
    }

    /// Store a deck from a generator response and select it.
    pub fn import_generated(
        &mut self,
        filename: &str,
        response: &str,
        now: Timestamp,
    ) -> Fallible<DeckId> {
        let fallback = fallback_title_from_filename(filename);
        let generated = interpret_response(response, Some(fallback.as_str()), &MarkdownRenderer)?;
        self.add(filename, generated.title, generated.cards, now)
    }

    fn add(
        &mut self,
        filename: &str,
        name: String,
        cards: Vec<Flashcard>,
        now: Timestamp,
    ) -> Fallible<DeckId> {
        let deck = Deck::new(DeckId::for_upload(filename, now), name, cards, now);
        self.store.save(&deck)?;
        let id = deck.id.clone();
        match self.decks.iter_mut().find(|d| d.id == id) {
            Some(existing) => *existing = deck,
            None => self.decks.push(deck),
        }
        self.select(&id)?;
        Ok(id)
    }

    /// Start a fresh shuffled session over the given deck.
    pub fn select(&mut self, id: &DeckId) -> Fallible<()> {
        let Some(deck) = self.decks.iter().find(|d| &d.id == id) else {
            return fail(format!("No deck with id '{id}'."));
        };
        self.session = StudySession::new(deck.cards.clone(), &mut self.rng);
        self.selected = Some(id.clone());
        Ok(())
    }

    fn select_first(&mut self) {
        match self.decks.first() {
            Some(deck) => {
                self.session = StudySession::new(deck.cards.clone(), &mut self.rng);
                self.selected = Some(deck.id.clone());
            }
            None => {
                self.session = StudySession::in_order(Vec::new());
                self.selected = None;
            }
        }
    }

    pub fn delete(&mut self, id: &DeckId) -> Fallible<()> {
        self.store.delete(id)?;
        self.decks.retain(|d| &d.id != id);
        if self.selected.as_ref() == Some(id) {
            self.select_first();
        }
        Ok(())
    }

    /// Remove every deck.
    pub fn reset(&mut self) -> Fallible<()> {
        self.store.clear()?;
        self.decks.clear();
        self.select_first();
        Ok(())
    }

    pub fn shuffle(&mut self) {
        self.session.shuffle(&mut self.rng);
    }
}
