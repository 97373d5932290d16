//! Landing page and static assets.
//!
//! The page, its script and its stylesheet are compiled into the binary.
//! Setting `PARLEY_STATIC_DIR` serves `/static` from that directory instead.

use std::sync::Arc;

use axum::Router;
use axum::http::header;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use tower_http::services::ServeDir;

use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../../assets/index.html");
const SCRIPT_JS: &str = include_str!("../../assets/static/script.js");
const STYLE_CSS: &str = include_str!("../../assets/static/style.css");

pub fn router(state: &Arc<AppState>) -> Router<Arc<AppState>> {
    let router = Router::new().route("/", get(index));

    match &state.config.static_dir {
        Some(dir) => router.nest_service("/static", ServeDir::new(dir)),
        None => router
            .route("/static/script.js", get(script))
            .route("/static/style.css", get(style)),
    }
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn script() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript; charset=utf-8")], SCRIPT_JS)
}

async fn style() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], STYLE_CSS)
}
