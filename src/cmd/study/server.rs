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

use axum::Router;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use axum::routing::post;
use flipdeck_core::error::Fallible;
use flipdeck_core::error::fail;
use flipdeck_core::rng::TinyRng;
use flipdeck_core::session::StudySession;
use flipdeck_core::store::DeckStore;
use flipdeck_core::types::deck::Deck;
use tokio::net::TcpListener;
use tokio::select;
use tokio::signal;
use tokio::sync::oneshot::Receiver;
use tokio::sync::oneshot::channel;

use crate::cmd::study::get::get_handler;
use crate::cmd::study::post::post_handler;
use crate::cmd::study::state::MutableState;
use crate::cmd::study::state::ServerState;
use crate::store::open_store;
use crate::utils::CACHE_CONTROL_IMMUTABLE;
use crate::utils::clock_seed;

pub struct ServerConfig {
    pub store: Option<String>,
    pub deck: Option<String>,
    pub host: String,
    pub port: u16,
    pub shuffle: bool,
}

pub async fn start_server(config: ServerConfig) -> Fallible<()> {
    let store = open_store(config.store)?;
    let decks = store.load();
    let deck: Deck = match config.deck {
        Some(id) => match decks.into_iter().find(|deck| deck.id.as_str() == id) {
            Some(deck) => deck,
            None => return fail(format!("No deck with id '{id}'.")),
        },
        None => match decks.into_iter().next() {
            Some(deck) => deck,
            None => {
                println!("No decks to study.");
                return Ok(());
            }
        },
    };
    log::debug!("Studying '{}' ({} cards)", deck.name, deck.cards.len());

    let mut rng = TinyRng::from_seed(clock_seed());
    let session = if config.shuffle {
        StudySession::new(deck.cards, &mut rng)
    } else {
        StudySession::in_order(deck.cards)
    };

    // Create shutdown channel
    let (shutdown_tx, shutdown_rx) = channel();

    let state = ServerState {
        deck_name: deck.name,
        mutable: Arc::new(Mutex::new(MutableState {
            session,
            rng,
            finished: false,
        })),
        shutdown_tx: Arc::new(Mutex::new(Some(shutdown_tx))),
    };
    let app = Router::new();
    let app = app.route("/", get(get_handler));
    let app = app.route("/", post(post_handler));
    let app = app.route("/script.js", get(script_handler));
    let app = app.route("/style.css", get(style_handler));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state);
    let bind = format!("{}:{}", config.host, config.port);

    // Start the server with graceful shutdown on Ctrl+C or the End button.
    log::debug!("Starting server on {bind}");
    let listener = TcpListener::bind(bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_rx))
        .await?;
    Ok(())
}

async fn script_handler() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("script.js");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/javascript"),
            (CACHE_CONTROL, CACHE_CONTROL_IMMUTABLE),
        ],
        bytes,
    )
}

async fn style_handler() -> (StatusCode, [(HeaderName, &'static str); 2], &'static [u8]) {
    let bytes = include_bytes!("style.css");
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, CACHE_CONTROL_IMMUTABLE),
        ],
        bytes,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}

async fn shutdown_signal(shutdown_rx: Receiver<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            log::warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    let shutdown = async {
        shutdown_rx.await.ok();
    };

    select! {
        _ = ctrl_c => {
            log::debug!("Received Ctrl+C, shutting down gracefully");
        },
        _ = shutdown => {
            log::debug!("Session ended, shutting down gracefully");
        },
    }
}
