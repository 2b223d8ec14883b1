//! Static markup and assets. The server holds no task data.

use std::path::PathBuf;

use axum::Router;
use http::{header, HeaderValue};
use tower_http::{
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
};

#[derive(Clone)]
pub struct AssetState {
    pub dir: PathBuf,
}

/// Serves files under `dir`; unknown paths fall back to `index.html`.
pub fn router(state: AssetState) -> Router {
    let index = state.dir.join("index.html");
    let files = ServeDir::new(&state.dir)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(index));
    Router::new()
        .fallback_service(files)
        .layer(SetResponseHeaderLayer::if_not_present(header::CACHE_CONTROL, HeaderValue::from_static("no-cache")))
}
