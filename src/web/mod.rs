//! HTTP surface: upload pages, URL mirroring and the calculator API.

pub mod calc;
pub mod error;
pub mod handlers;

use crate::app::App;
use crate::storage::local::UPLOAD_SUBDIR;
use axum::{extract::DefaultBodyLimit, routing::get, routing::post, Router};
use std::path::Path;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Build the router. Paths match case-sensitively. Files stored by the local
/// backend are served from `<web_root>/upload`.
pub fn create_app(app: Arc<App>, web_root: &Path) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/UploadFiles",
            post(handlers::upload_files).layer(DefaultBodyLimit::disable()),
        )
        .route("/UploadFileByUrl", get(handlers::upload_file_by_url))
        .route("/api/Calc/Sum", get(calc::sum))
        .route("/api/Calc/SumInts", get(calc::sum_ints))
        .route("/api/Calc/SumDoubles", get(calc::sum_doubles))
        .nest_service(
            &format!("/{}", UPLOAD_SUBDIR),
            ServeDir::new(web_root.join(UPLOAD_SUBDIR)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}
