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

use std::fs::read;
use std::path::Path;

use flipdeck_core::error::Fallible;
use flipdeck_core::generate::UploadKind;
use flipdeck_core::store::DeckStore;
use flipdeck_core::types::deck::Deck;
use flipdeck_core::types::deck::DeckId;
use flipdeck_core::types::timestamp::Timestamp;
use walkdir::WalkDir;

use crate::cmd::check::file_name;
use crate::cmd::check::parse_file;
use crate::generate::gemini::GeminiClient;
use crate::generate::generate_deck;
use crate::store::open_store;

/// Import a deck file, or every Markdown deck under a directory.
pub async fn import(path: String, store: Option<String>, name: Option<String>) -> Fallible<()> {
    let store = open_store(store)?;
    let path = Path::new(&path);
    let ids = if path.is_dir() {
        import_directory(&store, path)?
    } else {
        vec![import_file(&store, path, name).await?]
    };
    for id in ids {
        println!("{id}");
    }
    Ok(())
}

async fn import_file(
    store: &impl DeckStore,
    path: &Path,
    name: Option<String>,
) -> Fallible<DeckId> {
    let filename = file_name(path);
    let now = Timestamp::now();
    let (title, cards) = match UploadKind::classify(&filename, None)? {
        UploadKind::Markdown => {
            let parsed = parse_file(path)?;
            (parsed.title, parsed.cards)
        }
        UploadKind::Document(kind) => {
            let client = GeminiClient::from_env()?;
            let bytes = read(path)?;
            log::info!("Generating cards for {filename} with {}", client.model());
            let generated = generate_deck(&client, &filename, kind, &bytes).await?;
            (generated.title, generated.cards)
        }
    };
    let deck = Deck::new(
        DeckId::for_upload(&filename, now),
        name.unwrap_or(title),
        cards,
        now,
    );
    store.save(&deck)?;
    Ok(deck.id)
}

/// Every `.md` file under the directory becomes a deck whose id is the
/// file's stem, so importing the directory again updates the same decks.
fn import_directory(store: &impl DeckStore, directory: &Path) -> Fallible<Vec<DeckId>> {
    let now = Timestamp::now();
    let mut paths = Vec::new();
    for entry in WalkDir::new(directory) {
        let entry = entry.map_err(std::io::Error::from)?;
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md") {
            paths.push(path.to_path_buf());
        }
    }
    paths.sort();

    let mut ids = Vec::new();
    for path in paths {
        let parsed = parse_file(&path)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| file_name(&path));
        let id = DeckId::new(stem);
        let created_at = store
            .load()
            .into_iter()
            .find(|d| d.id == id)
            .map(|d| d.created_at)
            .unwrap_or(now);
        let mut deck = Deck::new(id, parsed.title, parsed.cards, now);
        deck.created_at = created_at;
        store.save(&deck)?;
        ids.push(deck.id);
    }
    log::debug!("Imported {} decks from {}", ids.len(), directory.display());
    Ok(ids)
}
