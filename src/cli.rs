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

use std::process::exit;

use clap::Parser;
use flipdeck_core::error::Fallible;
use tokio::spawn;

use crate::cmd::check::check_deck;
use crate::cmd::decks::ListFormat;
use crate::cmd::decks::delete_deck;
use crate::cmd::decks::list_decks;
use crate::cmd::decks::reset_store;
use crate::cmd::import::import;
use crate::cmd::study::server::ServerConfig;
use crate::cmd::study::server::start_server;
use crate::utils::wait_for_server;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Study a deck through a web interface.
    Study {
        /// Id of the deck to study. By default, the first stored deck is used.
        deck: Option<String>,
        /// Path to the deck store directory. By default, the current working directory is used.
        #[arg(long)]
        store: Option<String>,
        /// The host address to bind to. Default is 127.0.0.1.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// The port to use for the web server. Default is 8000.
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// Whether to open the browser automatically. Default is true.
        #[arg(long)]
        open_browser: Option<bool>,
        /// Show the cards in file order instead of shuffling them.
        #[arg(long)]
        no_shuffle: bool,
    },
    /// Check that a Markdown deck parses.
    Check {
        /// Path to the Markdown file.
        file: String,
    },
    /// Import a Markdown, PDF or Word file, or a directory of Markdown decks.
    Import {
        /// Path to the file or directory.
        path: String,
        /// Path to the deck store directory. By default, the current working directory is used.
        #[arg(long)]
        store: Option<String>,
        /// Name for the deck, instead of its title.
        #[arg(long)]
        name: Option<String>,
    },
    /// List the stored decks.
    List {
        /// Path to the deck store directory. By default, the current working directory is used.
        #[arg(long)]
        store: Option<String>,
        /// Which output format to use.
        #[arg(long, default_value_t = ListFormat::Text)]
        format: ListFormat,
    },
    /// Delete a stored deck.
    Delete {
        /// Id of the deck.
        id: String,
        /// Path to the deck store directory. By default, the current working directory is used.
        #[arg(long)]
        store: Option<String>,
    },
    /// Delete every stored deck.
    Reset {
        /// Path to the deck store directory. By default, the current working directory is used.
        #[arg(long)]
        store: Option<String>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Study {
            deck,
            store,
            host,
            port,
            open_browser,
            no_shuffle,
        } => {
            if open_browser.unwrap_or(true) {
                // Start a separate task to open the browser once the server is up.
                let browser_host = host.clone();
                spawn(async move {
                    match wait_for_server(&browser_host, port).await {
                        Ok(_) => {
                            let _ = open::that(format!("http://{browser_host}:{port}/"));
                        }
                        Err(e) => {
                            eprintln!("Failed to connect to server: {e}");
                            exit(-1)
                        }
                    }
                });
            }
            let config = ServerConfig {
                store,
                deck,
                host,
                port,
                shuffle: !no_shuffle,
            };
            start_server(config).await
        }
        Command::Check { file } => check_deck(&file),
        Command::Import { path, store, name } => import(path, store, name).await,
        Command::List { store, format } => list_decks(store, format),
        Command::Delete { id, store } => delete_deck(id, store),
        Command::Reset { store } => reset_store(store),
    }
}
