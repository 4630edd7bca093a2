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

use axum::Form;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use serde::Deserialize;

use crate::cmd::study::state::ServerState;
use crate::cmd::study::template::completed_page;
use crate::cmd::study::template::error_page;
use crate::cmd::study::template::session_page;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Flip,
    Previous,
    Next,
    Shuffle,
    End,
}

#[derive(Deserialize)]
pub struct FormData {
    action: Action,
}

pub async fn post_handler(
    State(state): State<ServerState>,
    Form(form): Form<FormData>,
) -> (StatusCode, Html<String>) {
    let mut mutable = match state.lock() {
        Ok(mutable) => mutable,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(error_page(e.message()).into_string()),
            );
        }
    };
    if mutable.finished {
        let page = completed_page(&state.deck_name, mutable.session.len());
        return (StatusCode::OK, Html(page.into_string()));
    }
    log::debug!("Action: {:?}", form.action);
    match form.action {
        Action::Flip => mutable.session.flip(),
        Action::Previous => {
            mutable.session.previous();
        }
        Action::Next => {
            mutable.session.next();
        }
        Action::Shuffle => {
            let inner = &mut *mutable;
            inner.session.shuffle(&mut inner.rng);
        }
        Action::End => {
            mutable.finished = true;
            state.shutdown();
            let page = completed_page(&state.deck_name, mutable.session.len());
            return (StatusCode::OK, Html(page.into_string()));
        }
    }
    let page = session_page(&state.deck_name, &mutable.session);
    (StatusCode::OK, Html(page.into_string()))
}
