#![allow(dead_code)]

use axum::{
    Router,
    body::{self, Body},
    http::{Method, Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;
use vendor_crm::{
    api::{self, AppState},
    config::{AppConfig, database},
};

/// Router over a fresh in-memory database.
pub struct TestApp {
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = sea_orm::Database::connect("sqlite::memory:")
            .await
            .expect("failed to open in-memory database");
        database::create_tables(&db)
            .await
            .expect("failed to create tables");
        let state = AppState::new(db, AppConfig::default()).expect("invalid default config");
        Self {
            router: api::router(state),
        }
    }

    /// Sends a request and returns the status with the decoded JSON body
    /// (`Value::Null` for an empty body).
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request");

        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is not JSON")
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    /// Creates a client through the admin API and returns `(client_id, user_id)`.
    pub async fn create_client(&self, email: &str, business_name: &str) -> (i64, i64) {
        let (status, body) = self
            .post(
                "/api/admin/clients",
                serde_json::json!({
                    "email": email,
                    "owner_name": "Owner",
                    "business_name": business_name,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create client failed: {body}");
        (
            body["id"].as_i64().expect("client id"),
            body["user_id"].as_i64().expect("user id"),
        )
    }

    /// Creates a product with 10 units at 5.0 and returns its id.
    pub async fn create_product(&self, client_id: i64, sku: &str) -> i64 {
        let (status, body) = self
            .post(
                &format!("/api/clients/{client_id}/products"),
                serde_json::json!({
                    "name": format!("Product {sku}"),
                    "sku": sku,
                    "price": 5.0,
                    "stock": 10,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create product failed: {body}");
        body["id"].as_i64().expect("product id")
    }

    pub async fn subscribe(&self, client_id: i64, plan: &str) {
        let (status, body) = self
            .post(
                &format!("/api/admin/clients/{client_id}/subscriptions"),
                serde_json::json!({ "plan": plan, "end_date": "2099-12-31" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "subscribe failed: {body}");
    }
}
