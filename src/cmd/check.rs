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

use std::fs::read_to_string;
use std::path::Path;

use flipdeck_core::error::Fallible;
use flipdeck_core::parser::ParsedDeck;
use flipdeck_core::parser::fallback_title_from_filename;
use flipdeck_core::parser::parse_deck_content;

/// Parse a Markdown deck without storing it.
pub fn check_deck(path: &str) -> Fallible<()> {
    let deck = parse_file(Path::new(path))?;
    println!("{}: {} cards", deck.title, deck.cards.len());
    Ok(())
}

pub fn parse_file(path: &Path) -> Fallible<ParsedDeck> {
    let text = read_to_string(path)?;
    let fallback = fallback_title_from_filename(&file_name(path));
    let deck = parse_deck_content(&text, Some(fallback.as_str()))?;
    log::debug!("Parsed {} cards from {}", deck.cards.len(), path.display());
    Ok(deck)
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
