// tests/common/mod.rs
#![allow(dead_code)]

use std::path::Path;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use heroad::{
    config::{AppState, Config},
    db::Store,
};

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_media_root(Path::new("./target/test-media"))
    }

    pub fn with_media_root(media_root: &Path) -> Self {
        let media_root = media_root.display().to_string();
        let config = Config::from_vars(|key| match key {
            "STORAGE_BACKEND" => Some("memory".to_string()),
            "JWT_SECRET" => Some("segredo-de-teste".to_string()),
            "BCRYPT_COST" => Some("4".to_string()),
            "MEDIA_ROOT" => Some(media_root.clone()),
            _ => None,
        })
        .expect("config de teste");

        let state = AppState::from_parts(config, Store::in_memory(), None);
        Self {
            router: heroad::app(state.clone()),
            state,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.expect("resposta");
        let status = response.status();
        let bytes = response.into_body().collect().await.expect("corpo").to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");
        self.send(request).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Registra uma conta e devolve o token.
    pub async fn register(&self, email: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "email": email, "password": "testpass123", "name": "Test" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["token"].as_str().expect("token").to_string()
    }

    pub async fn me(&self, token: &str) -> Value {
        let (status, body) = self.get("/api/users/me", token).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body
    }

    // --- fixtures ---

    pub async fn create(&self, uri: &str, token: &str, body: Value) -> Value {
        let (status, created) = self.post(uri, token, body).await;
        assert_eq!(status, StatusCode::CREATED, "{created}");
        created
    }

    pub async fn address(&self, token: &str, city: &str, address1: &str) -> Value {
        self.create(
            "/api/heroad/addresses",
            token,
            json!({
                "name": "Domicile",
                "address1": address1,
                "zip_code": 33000,
                "city": city,
            }),
        )
        .await
    }

    pub async fn patient(&self, token: &str, firstname: &str, address: &Value) -> Value {
        self.create(
            "/api/heroad/patients",
            token,
            json!({
                "firstname": firstname,
                "lastname": "Henry",
                "phone_number": "0756897687",
                "address": address["id"],
            }),
        )
        .await
    }

    pub async fn vehicle(&self, token: &str, plate: &str) -> Value {
        self.create(
            "/api/heroad/vehicles",
            token,
            json!({ "type": "VSL", "license_plate": plate }),
        )
        .await
    }

    pub async fn master_run(&self, token: &str, vehicle: &Value, comments: &str) -> Value {
        self.create(
            "/api/heroad/master-runs",
            token,
            json!({
                "comments": comments,
                "date": "2024-03-01T07:00:00Z",
                "am": true,
                "vehicle": vehicle["id"],
            }),
        )
        .await
    }

    pub async fn run(
        &self,
        token: &str,
        master_run: &Value,
        patient: &Value,
        pick_up: &Value,
        deposit: &Value,
        date: &str,
    ) -> Value {
        self.create(
            "/api/heroad/runs",
            token,
            json!({
                "date": date,
                "departure_time": date,
                "arriving_time": date,
                "pick_up_location": pick_up["id"],
                "deposit_location": deposit["id"],
                "master_run": master_run["id"],
                "patient": patient["id"],
            }),
        )
        .await
    }
}

pub fn ids(list: &Value) -> Vec<String> {
    list.as_array()
        .expect("lista")
        .iter()
        .map(|item| item["id"].as_str().expect("id").to_string())
        .collect()
}
