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

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use flipdeck_core::error::ErrorReport;
use flipdeck_core::error::Fallible;
use flipdeck_core::rng::TinyRng;
use flipdeck_core::session::StudySession;
use tokio::sync::oneshot::Sender;

#[derive(Clone)]
pub struct ServerState {
    pub deck_name: String,
    pub mutable: Arc<Mutex<MutableState>>,
    pub shutdown_tx: Arc<Mutex<Option<Sender<()>>>>,
}

pub struct MutableState {
    pub session: StudySession,
    pub rng: TinyRng,
    pub finished: bool,
}

impl ServerState {
    pub fn lock(&self) -> Fallible<MutexGuard<'_, MutableState>> {
        self.mutable
            .lock()
            .map_err(|_| ErrorReport::new("session state is poisoned"))
    }

    /// Stop the server once the current response is sent.
    pub fn shutdown(&self) {
        if let Ok(mut tx) = self.shutdown_tx.lock() {
            if let Some(tx) = tx.take() {
                let _ = tx.send(());
            }
        }
    }
}
