mod routes;
mod logger;
mod config;
mod response;
mod error;
mod models;
mod middleware;
mod state;
mod handler;
mod service;
mod pipeline;

mod tracer;

use std::sync::Arc;
use anyhow::Context;
use log::info;
use opentelemetry::global;
use opentelemetry::global::shutdown_tracer_provider;
use tokio::signal;
use crate::logger::logger::setup_logger;
use config::settings::SETTINGS;
use crate::pipeline::cascade::haar_cascade::HaarCascade;
use crate::pipeline::model_config::config::FaceDetectionConfig;
use crate::pipeline::module::face_detection::HaarCascadeDetector;
use crate::pipeline::portrait_pipeline::portrait_pipeline::PortraitPipeline;
use crate::routes::root::{root_routes, RouterState};


#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
use crate::tracer::tracer::init_tracer_provider;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

#[tokio::main]
async fn main() {
    // Setup logger
    setup_logger();
    let addr = format!("0.0.0.0:{}", SETTINGS.server.http_port);

    // Setup pipeline
    let portrait_pipeline = build_pipeline(SETTINGS.detector.cascade_path.as_str())
        .unwrap_or_else(|e| panic!("Failed to init portrait pipeline: {e:#}"));
    info!("completed initializing pipeline");

    // Setup tracing
    let tracing_enabled = match &SETTINGS.tracer {
        Some(tracer) => {
            let tracer_provider = init_tracer_provider(tracer.uri.as_str(), SETTINGS.app.name.as_str())
                .expect("Failed to initialize tracer provider.");
            global::set_tracer_provider(tracer_provider);
            true
        }
        None => false,
    };

    // Init server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to create new listener: {}", e.to_string()));
    info!("starting {} v{} on {:?}", SETTINGS.app.name, SETTINGS.app.version, addr);
    let router_state = RouterState::new(portrait_pipeline);

    axum::serve(listener, root_routes(router_state, &SETTINGS))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| panic!("Failed to start api server: {}", e.to_string()));

    if tracing_enabled {
        shutdown_tracer_provider();
    }
}

fn build_pipeline(cascade_path: &str) -> anyhow::Result<PortraitPipeline> {
    let cascade = HaarCascade::from_file(cascade_path).with_context(|| {
        format!("failed to load face cascade from {cascade_path} (see assets/README.md for where to get it)")
    })?;
    info!(
        "loaded cascade {:?} window with {} stages and {} features",
        cascade.window_size(), cascade.stage_count(), cascade.feature_count()
    );

    let detector = HaarCascadeDetector::new(Arc::new(cascade), FaceDetectionConfig::new());
    Ok(PortraitPipeline::new(Arc::new(detector)))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received");
}


#[cfg(test)]
mod tests {
    use super::build_pipeline;

    #[test]
    fn test_build_pipeline() {
        assert!(build_pipeline("test_data/square_cascade.xml").is_ok());
    }

    #[test]
    fn test_missing_cascade_points_to_readme() {
        let err = match build_pipeline("assets/not-a-cascade.xml") {
            Ok(_) => panic!("missing cascade must fail"),
            Err(e) => format!("{e:#}"),
        };

        assert!(err.contains("assets/not-a-cascade.xml"));
        assert!(err.contains("assets/README.md"));
    }
}
