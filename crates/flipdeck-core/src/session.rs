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

//! Study state for one deck: which card is showing and whether it has been
//! flipped.

use crate::rng::TinyRng;
use crate::rng::shuffle;
use crate::types::card::Flashcard;

pub struct StudySession {
    cards: Vec<Flashcard>,
    index: usize,
    flipped: bool,
}

impl StudySession {
    /// Start a session over the cards in a random order.
    pub fn new(cards: Vec<Flashcard>, rng: &mut TinyRng) -> Self {
        Self::in_order(shuffle(cards, rng))
    }

    /// Start a session over the cards in the order given.
    pub fn in_order(cards: Vec<Flashcard>) -> Self {
        Self {
            cards,
            index: 0,
            flipped: false,
        }
    }

    pub fn current(&self) -> Option<&Flashcard> {
        self.cards.get(self.index)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The 1-based position of the current card, 0 for an empty session.
    pub fn position(&self) -> usize {
        if self.is_empty() { 0 } else { self.index + 1 }
    }

    pub fn is_first(&self) -> bool {
        self.index == 0
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 >= self.cards.len()
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Toggle between question and answer.
    pub fn flip(&mut self) {
        if !self.is_empty() {
            self.flipped = !self.flipped;
        }
    }

    /// Move to the next card. Returns false at the end of the deck.
    pub fn next(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        self.flipped = false;
        true
    }

    /// Move to the previous card. Returns false at the start of the deck.
    pub fn previous(&mut self) -> bool {
        if self.is_first() {
            return false;
        }
        self.index -= 1;
        self.flipped = false;
        true
    }

    /// Reshuffle and start over from the first card.
    pub fn shuffle(&mut self, rng: &mut TinyRng) {
        let cards = std::mem::take(&mut self.cards);
        self.cards = shuffle(cards, rng);
        self.index = 0;
        self.flipped = false;
    }

    /// Percentage of the deck seen so far, counting the current card.
    pub fn progress(&self) -> f64 {
        if self.is_empty() {
            0.0
        } else {
            (self.position() as f64 / self.cards.len() as f64) * 100.0
        }
    }
}
