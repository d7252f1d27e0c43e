//! Dental clinic back-office API
//!
//! Patient records, visits with their service and product lines, payments,
//! the warehouse and supplier orders, served over HTTP/JSON.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod services;
pub mod tracing;

use axum::{http::HeaderValue, Router};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: Arc<config::AppConfig>,
    pub services: handlers::AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let services = handlers::AppServices::new(db.clone(), &config);
        Self {
            db,
            config: Arc::new(config),
            services,
        }
    }
}

/// Every JSON route of the clinic, without middleware.
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(handlers::patients::patient_routes())
        .merge(handlers::employees::employee_routes())
        .merge(handlers::visits::visit_routes())
        .merge(handlers::payments::payment_routes())
        .merge(handlers::warehouse::warehouse_routes())
        .merge(handlers::supplier_orders::supplier_order_routes())
        .merge(handlers::contractors::contractor_routes())
        .merge(handlers::reports::report_routes())
        .merge(handlers::health::health_routes())
}

/// CORS from config: the allow-list when set, permissive when allowed,
/// `None` when a non-development deployment has no policy.
pub fn cors_layer(cfg: &config::AppConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        Some(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any),
        )
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        Some(CorsLayer::permissive())
    } else {
        None
    }
}

/// Full application: routes behind the API key guard, Swagger UI, CORS,
/// HTTP tracing and request ids.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let guard = auth::ApiKeyGuard::new(state.config.api_key());
    if guard.is_enabled() {
        ::tracing::info!("API key guard enabled");
    }

    app_routes()
        .layer(axum::middleware::from_fn_with_state(
            guard,
            auth::api_key_middleware,
        ))
        .merge(openapi::swagger_ui())
        .layer(cors)
        // HTTP tracing layer for consistent request/response telemetry
        .layer(crate::tracing::configure_http_tracing())
        // Ensure every request carries a request id for traceability
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id::request_id_middleware,
        ))
        .with_state(state)
}
