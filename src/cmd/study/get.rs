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

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;

use crate::cmd::study::state::ServerState;
use crate::cmd::study::template::completed_page;
use crate::cmd::study::template::error_page;
use crate::cmd::study::template::session_page;

pub async fn get_handler(State(state): State<ServerState>) -> (StatusCode, Html<String>) {
    match state.lock() {
        Ok(mutable) => {
            let page = if mutable.finished {
                completed_page(&state.deck_name, mutable.session.len())
            } else {
                session_page(&state.deck_name, &mutable.session)
            };
            (StatusCode::OK, Html(page.into_string()))
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(error_page(e.message()).into_string()),
        ),
    }
}
