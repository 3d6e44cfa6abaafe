//! Static HTML pages for the publish root.
//!
//! Article pages embed their body as-is. The index page is a fixed shell
//! whose script fetches `articles.json` and builds the list, the article
//! selector and the date filter in the browser, so it only has to be
//! rewritten when the shell itself changes.

use maud::{html, Markup, PreEscaped, DOCTYPE};

const CSS: &str = include_str!("../static/style.css");
const INDEX_JS: &str = include_str!("../static/index.js");

/// File name of the index page inside the publish root.
pub const INDEX_FILE: &str = "index.html";

const SITE_TITLE: &str = "Articles";

fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="zh-CN" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
            }
            body {
                (content)
            }
        }
    }
}

/// Full page for one article. `body_html` is trusted markup and is not escaped.
pub fn render_article_page(title: &str, date: &str, body_html: &str) -> String {
    let content = html! {
        a.back href=(INDEX_FILE) { "← All articles" }
        article {
            h1 { (title) }
            p.meta { "Published " time datetime=(date) { (date) } }
            (PreEscaped(body_html))
        }
    };
    base_document(title, content).into_string()
}

/// The index page listing everything in `articles.json`.
pub fn render_index_page() -> String {
    let content = html! {
        h1 { (SITE_TITLE) }
        div.controls {
            select id="article-select" aria-label="Jump to article" {
                option value="" { "Jump to an article…" }
            }
            label {
                "Date "
                input id="date-filter" type="date";
            }
            button id="clear-filter" type="button" { "Clear" }
        }
        ul id="article-list" {}
        script { (PreEscaped(INDEX_JS)) }
    };
    base_document(SITE_TITLE, content).into_string()
}
