use std::borrow::Cow;
use std::fmt::Write;

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};

use crate::catalog::Catalog;
use crate::config::MediaSettings;
use crate::delivery::DeliveryStrategy;
use crate::http::state::AppState;

const PAGE_STYLE: &str = r#"
body { background-color: #f1f3f5; font-family: system-ui, sans-serif; margin: 0; }
main { max-width: 1200px; margin: 2rem auto; padding: 0 1rem; }
.grid { display: grid; gap: 1.5rem; grid-template-columns: repeat(auto-fill, minmax(320px, 1fr)); }
.card { background: #fff; border-radius: 6px; box-shadow: 0 6px 18px rgba(0,0,0,.06); overflow: hidden; }
.card video { width: 100%; aspect-ratio: 16 / 9; background: #000; display: block; }
.card-body { display: flex; align-items: flex-start; justify-content: space-between; padding: .75rem; gap: .5rem; }
.title { font-size: .95rem; word-break: break-word; }
.badge { background: #212529; color: #fff; border-radius: 4px; font-size: .75rem; padding: .15rem .4rem; }
.notice { background: #fff3cd; border-radius: 6px; padding: 1rem; }
"#;

/// HTML-escape text for element content and double-quoted attributes.
pub fn html_escape(s: &str) -> Cow<'_, str> {
    quick_xml::escape::escape(s)
}

/// Render the catalog as a page of `<video>` cards, one per entry.
///
/// Each `<source>` advertises the content type the client will actually get:
/// `video/mp4` for transcoded entries, the native MIME type otherwise.
pub fn render_listing(title: &str, catalog: &Catalog, settings: &MediaSettings) -> String {
    let title = html_escape(title);
    let mut html = String::with_capacity(1024 + catalog.len() * 512);
    let _ = write!(
        html,
        "<!doctype html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<style>{PAGE_STYLE}</style>\n</head>\n<body>\n<main>\n\
         <h1>{title}</h1>\n"
    );

    if catalog.is_empty() {
        let root = catalog.root().display().to_string();
        let _ = writeln!(
            html,
            "<div class=\"notice\">No video files found in \"{}\".</div>",
            html_escape(&root)
        );
    } else {
        html.push_str("<div class=\"grid\">\n");
        for entry in catalog.entries() {
            let strategy = DeliveryStrategy::for_extension(&entry.extension, settings);
            let _ = write!(
                html,
                "<div class=\"card\">\n\
                 <video controls muted preload=\"none\">\
                 <source src=\"/video/{id}\" type=\"{mime}\">\
                 Your browser does not support the video element.</video>\n\
                 <div class=\"card-body\"><div class=\"title\">{name}</div>\
                 <span class=\"badge\">{ext}</span></div>\n</div>\n",
                id = entry.id,
                mime = strategy.content_type(entry),
                name = html_escape(&entry.relative_path),
                ext = html_escape(&entry.extension.to_ascii_uppercase()),
            );
        }
        html.push_str("</div>\n");
    }

    html.push_str("</main>\n</body>\n</html>\n");
    html
}

/// GET / — the catalog listing.
pub async fn serve_listing(State(state): State<AppState>) -> impl IntoResponse {
    let html = render_listing(
        &state.title,
        state.router.catalog(),
        state.router.settings(),
    );
    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], html)
}
