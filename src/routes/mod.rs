pub mod process;
pub mod results;
pub mod upload;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

use crate::state::SharedState;

pub fn scan_routes(max_body_size: usize) -> Router<SharedState> {
    Router::new()
        .route(
            "/upload",
            post(upload::upload).layer(DefaultBodyLimit::max(max_body_size)),
        )
        .route("/process/{upload_id}", post(process::process))
        .route("/results", get(results::list))
        .route("/results/{id}", get(results::get))
}
