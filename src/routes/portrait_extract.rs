use axum::extract::DefaultBodyLimit;
use axum::Router;
use axum::routing::post;
use tower_http::limit::RequestBodyLimitLayer;
use crate::handler::portrait_handler::extract_portrait;
use crate::state::portrait_state::PortraitState;

pub fn new_portrait_extract_route(max_upload_bytes: usize) -> Router<PortraitState> {

    let router = Router::new()
        .route("/extract-portrait", post(extract_portrait))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes));
    router
}
