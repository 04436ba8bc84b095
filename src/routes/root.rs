use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use axum::http::header;
use axum::routing::get;
use http::{Method, StatusCode, Uri};
use log::info;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::propagate_header::PropagateHeaderLayer;
use tower_http::timeout::TimeoutLayer;
use crate::config::settings::Settings;
use crate::error::errors::Error;
use crate::middleware::failure_json_mw::failure_json_mw;
use crate::middleware::request_id_mw::{generate_request_id_mw, REQUEST_ID_HEADER};
use crate::pipeline::portrait_pipeline::portrait_pipeline::PortraitPipeline;
use crate::response::common_response::{GeneralResponseBuilder, GeneralResponseResult, HealthResponse, InfoResponse};
use crate::routes::portrait_extract::new_portrait_extract_route;
use crate::state::portrait_state::PortraitState;

const SERVICE_TITLE: &str = "Portrait Extraction API";

#[derive(Clone)]
pub struct RouterState {
    portrait_pipeline: Arc<PortraitPipeline>,
}

impl RouterState {
    pub fn new(portrait_pipeline: PortraitPipeline) -> Self {
        RouterState {
            portrait_pipeline: Arc::new(portrait_pipeline),
        }
    }
}

pub fn root_routes(router_state: RouterState, settings: &Settings) -> Router {

    let portrait_router = {
        let portrait_state = PortraitState::new(&router_state.portrait_pipeline);
        new_portrait_extract_route(settings.server.max_upload_bytes())
            .with_state(portrait_state)
    };

    let version = settings.app.version.clone();

    let app_router = Router::new()
        .route("/", get(move || service_info(version.clone())))
        .route("/health", get(healthcheck))
        .merge(portrait_router)
        .fallback(fallback)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(settings.server.request_timeout_secs())))
        .layer(middleware::map_response(failure_json_mw))
        .layer(PropagateHeaderLayer::new(header::HeaderName::from_static(REQUEST_ID_HEADER)))
        .layer(CorsLayer::permissive().allow_methods([Method::GET, Method::POST, Method::HEAD, Method::OPTIONS]))
        .layer(middleware::from_fn(generate_request_id_mw));
    app_router
}

async fn fallback(uri: Uri) -> Error {
    info!("no route for {uri}");
    Error::not_found()
}

async fn healthcheck() -> GeneralResponseResult<HealthResponse> {
    Ok(GeneralResponseBuilder::new()
        .status_code(StatusCode::OK)
        .body(HealthResponse { status: "healthy" })
        .build())
}

async fn service_info(version: String) -> GeneralResponseResult<InfoResponse> {
    Ok(GeneralResponseBuilder::new()
        .status_code(StatusCode::OK)
        .body(InfoResponse {
            message: SERVICE_TITLE,
            version,
        })
        .build())
}
