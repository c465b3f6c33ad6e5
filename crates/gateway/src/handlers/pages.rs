//! HTML shell routing
//!
//! The browsing UI is four static documents; the page itself fetches data
//! from the JSON API, so the `{id}` segment is only read client-side.

use axum::{routing::get_service, Router};
use std::path::Path;
use tower_http::services::ServeFile;

use crate::AppState;

pub const INDEX_PAGE: &str = "index.html";
pub const ADMIN_PAGE: &str = "admin.html";
pub const MANGA_PAGE: &str = "manga.html";
pub const READER_PAGE: &str = "reader.html";

/// Routes for `/`, `/admin`, `/manga/{id}` and `/read/{id}`
pub fn routes(public_dir: &Path) -> Router<AppState> {
    Router::new()
        .route("/", get_service(ServeFile::new(public_dir.join(INDEX_PAGE))))
        .route("/admin", get_service(ServeFile::new(public_dir.join(ADMIN_PAGE))))
        .route("/manga/{id}", get_service(ServeFile::new(public_dir.join(MANGA_PAGE))))
        .route("/read/{id}", get_service(ServeFile::new(public_dir.join(READER_PAGE))))
}
