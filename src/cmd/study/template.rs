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

use maud::DOCTYPE;
use maud::Markup;
use maud::PreEscaped;
use maud::html;

use flipdeck_core::session::StudySession;

const KATEX_CSS_URL: &str = "https://cdn.jsdelivr.net/npm/katex@0.16.9/dist/katex.min.css";
const KATEX_JS_URL: &str = "https://cdn.jsdelivr.net/npm/katex@0.16.9/dist/katex.min.js";

pub fn page_template(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " - flipdeck" }
                link rel="stylesheet" href=(KATEX_CSS_URL);
                script defer src=(KATEX_JS_URL) {};
                link rel="stylesheet" href="/style.css";
            }
            body {
                (body)
                script src="/script.js" {};
            }
        }
    }
}

pub fn session_page(deck_name: &str, session: &StudySession) -> Markup {
    let Some(card) = session.current() else {
        return page_template(
            deck_name,
            html! {
                div.root {
                    h1 { (deck_name) }
                    p.empty { "This deck has no cards." }
                }
            },
        );
    };
    let progress = format!("width: {:.2}%;", session.progress());
    let body = html! {
        div.root {
            header {
                h1 { (deck_name) }
                span.counter { "Card " (session.position()) " of " (session.len()) }
            }
            div.progress-bar {
                div.progress-fill style=(progress) {}
            }
            div.card {
                div.question.card-content {
                    (PreEscaped(&card.question))
                }
                @if session.is_flipped() {
                    hr;
                    div.answer.card-content {
                        (PreEscaped(&card.answer))
                    }
                }
            }
            form.controls action="/" method="post" {
                button #previous type="submit" name="action" value="Previous" disabled[session.is_first()] {
                    "Previous"
                }
                button #flip type="submit" name="action" value="Flip" {
                    @if session.is_flipped() { "Show Question" } @else { "Show Answer" }
                }
                button #next type="submit" name="action" value="Next" disabled[session.is_last()] {
                    "Next"
                }
                button #shuffle type="submit" name="action" value="Shuffle" {
                    "Shuffle"
                }
                button #end type="submit" name="action" value="End" {
                    "End"
                }
            }
        }
    };
    page_template(deck_name, body)
}

pub fn completed_page(deck_name: &str, card_count: usize) -> Markup {
    page_template(
        deck_name,
        html! {
            div.root.finished {
                h1 { "Session Completed" }
                p { "You studied " (card_count) " cards from " (deck_name) "." }
            }
        },
    )
}

pub fn error_page(message: &str) -> Markup {
    page_template(
        "Error",
        html! {
            div.root {
                h1 { "Error" }
                p.error { (message) }
            }
        },
    )
}
