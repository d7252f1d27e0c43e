#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use chrono::Utc;
use dental_clinic_api::{
    config::AppConfig,
    db,
    entities::{contractor, dental_service, employee, patient, warehouse_unit},
    models::StockStatus,
    AppState,
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::Value;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

/// Helper harness for spinning up the full router backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        Self::with_api_key(None).await
    }

    /// Same as [`TestApp::new`] with the access guard enabled.
    pub async fn with_api_key(api_key: Option<&str>) -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // Every sqlite::memory: connection is its own database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.api_key = api_key.map(str::to_string);

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = dental_clinic_api::build_router(state.clone(), CorsLayer::permissive());

        Self { router, state }
    }

    pub fn db(&self) -> &sea_orm::DatabaseConnection {
        self.state.db.as_ref()
    }

    /// Send a request against the router.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Response {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Response {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn seed_patient(&self, last_name: &str, first_name: &str) -> patient::Model {
        let now = Utc::now().naive_utc();
        patient::ActiveModel {
            last_name: Set(last_name.to_string()),
            first_name: Set(first_name.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed patient")
    }

    pub async fn seed_employee(&self, last_name: &str, position: &str) -> employee::Model {
        employee::ActiveModel {
            last_name: Set(last_name.to_string()),
            first_name: Set("Test".to_string()),
            position: Set(position.to_string()),
            access_level: Set(1),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed employee")
    }

    pub async fn seed_service(&self, name: &str, price: &str) -> dental_service::Model {
        dental_service::ActiveModel {
            name: Set(name.to_string()),
            category: Set(Some("Therapy".to_string())),
            price: Set(dec(price)),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed dental service")
    }

    pub async fn seed_unit(&self, id: i32, name: &str, amount: i32) -> warehouse_unit::Model {
        warehouse_unit::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            specs: Set(None),
            amount: Set(amount),
            unit: Set(Some("pcs".to_string())),
            status: Set(StockStatus::for_amount(amount)),
            updated_at: Set(Utc::now().naive_utc()),
        }
        .insert(self.db())
        .await
        .expect("seed warehouse unit")
    }

    pub async fn seed_contractor(&self, name: &str, inn: &str) -> contractor::Model {
        contractor::ActiveModel {
            name: Set(name.to_string()),
            inn: Set(inn.to_string()),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .expect("seed contractor")
    }

    pub async fn unit_amount(&self, id: i32) -> Option<i32> {
        warehouse_unit::Entity::find_by_id(id)
            .one(self.db())
            .await
            .expect("load warehouse unit")
            .map(|u| u.amount)
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    serde_json::from_slice(&bytes).expect("json response")
}

pub fn dec(raw: &str) -> Decimal {
    Decimal::from_str(raw).expect("decimal literal")
}

/// Decimal from a JSON field serialized either as a string or a number.
pub fn dec_field(value: &Value) -> Decimal {
    match value {
        Value::String(s) => dec(s),
        Value::Number(n) => dec(&n.to_string()),
        other => panic!("expected a decimal, got {other}"),
    }
}
