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

//! A directory of JSON files as deck blob storage: each key is stored in
//! `<directory>/<key>.json`.

use std::env::current_dir;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use flipdeck_core::error::Fallible;
use flipdeck_core::error::fail;
use flipdeck_core::store::BlobDeckStore;
use flipdeck_core::store::BlobStorage;

pub struct FileStorage {
    directory: PathBuf,
}

impl FileStorage {
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.json"))
    }
}

impl BlobStorage for FileStorage {
    fn get(&self, key: &str) -> Fallible<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Fallible<()> {
        let path = self.path(key);
        let tmp = self.directory.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Fallible<()> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Open the deck store in the given directory, or the current directory.
pub fn open_store(directory: Option<String>) -> Fallible<BlobDeckStore<FileStorage>> {
    let directory: PathBuf = match directory {
        Some(dir) => PathBuf::from(dir),
        None => current_dir()?,
    };
    if !directory.is_dir() {
        return fail("directory does not exist.");
    }
    log::debug!("Using deck store in {}", directory.display());
    Ok(BlobDeckStore::new(FileStorage::new(directory)))
}

#[cfg(test)]
mod tests {
    use flipdeck_core::store::DeckStore;
    use flipdeck_core::store::STORAGE_KEY;
    use flipdeck_core::types::card::Flashcard;
    use flipdeck_core::types::deck::Deck;
    use flipdeck_core::types::deck::DeckId;
    use flipdeck_core::types::timestamp::Timestamp;
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_get_missing_key() -> Fallible<()> {
        let dir = tempdir()?;
        let storage = FileStorage::new(dir.path().to_path_buf());
        assert_eq!(storage.get("nothing")?, None);
        storage.remove("nothing")?;
        Ok(())
    }

    #[test]
    fn test_set_get_remove() -> Fallible<()> {
        let dir = tempdir()?;
        let storage = FileStorage::new(dir.path().to_path_buf());
        storage.set("k", "v1")?;
        storage.set("k", "v2")?;
        assert_eq!(storage.get("k")?, Some("v2".to_string()));
        assert!(dir.path().join("k.json").exists());
        storage.remove("k")?;
        assert_eq!(storage.get("k")?, None);
        Ok(())
    }

    #[test]
    fn test_deck_store_round_trip() -> Fallible<()> {
        let dir = tempdir()?;
        let directory = dir.path().display().to_string();
        let store = open_store(Some(directory.clone()))?;
        let now = Timestamp::now();
        let deck = Deck::new(
            DeckId::new("physics"),
            "Physics",
            vec![Flashcard::new("F", "<em>ma</em>")],
            now,
        );
        store.save(&deck)?;
        assert!(dir.path().join(format!("{STORAGE_KEY}.json")).exists());

        let reopened = open_store(Some(directory))?;
        assert_eq!(reopened.load(), vec![deck]);
        Ok(())
    }

    #[test]
    fn test_open_missing_directory() {
        let result = open_store(Some("./derpherp".to_string()));
        let err = result.err().unwrap();
        assert_eq!(err.to_string(), "error: directory does not exist.");
    }
}
