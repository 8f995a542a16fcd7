// tests/address_api.rs

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{ids, TestApp};

#[tokio::test]
async fn create_then_get_address() {
    let app = TestApp::new();
    let token = app.register("addr@heroad.fr").await;

    let created = app.address(&token, "Bordeaux", "1 rue de la fontaine").await;
    assert_eq!(created["address2"], "");

    let uri = format!("/api/heroad/addresses/{}", created["id"].as_str().unwrap());
    let (status, fetched) = app.get(&uri, &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn missing_required_fields_are_reported() {
    let app = TestApp::new();
    let token = app.register("addr@heroad.fr").await;

    let (status, body) = app
        .post("/api/heroad/addresses", &token, json!({ "zip_code": 33000 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    for field in ["name", "address1", "city"] {
        assert!(body["details"].get(field).is_some(), "{field}");
    }

    let (_, list) = app.get("/api/heroad/addresses", &token).await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn location_filter_matches_any_part() {
    let app = TestApp::new();
    let token = app.register("addr@heroad.fr").await;

    let bordeaux = app.address(&token, "Bordeaux", "1 rue de la fontaine").await;
    let merignac = app.address(&token, "Mérignac", "2 avenue Victoire").await;

    let (_, found) = app.get("/api/heroad/addresses?location=bordeaux", &token).await;
    assert_eq!(ids(&found), vec![bordeaux["id"].as_str().unwrap().to_string()]);

    let (_, found) = app.get("/api/heroad/addresses?location=VICTOIRE", &token).await;
    assert_eq!(ids(&found), vec![merignac["id"].as_str().unwrap().to_string()]);

    let (_, found) = app.get("/api/heroad/addresses?location=", &token).await;
    assert_eq!(ids(&found).len(), 2);
}

#[tokio::test]
async fn patch_keeps_untouched_fields_and_put_replaces() {
    let app = TestApp::new();
    let token = app.register("addr@heroad.fr").await;
    let created = app.address(&token, "Bordeaux", "1 rue de la fontaine").await;
    let uri = format!("/api/heroad/addresses/{}", created["id"].as_str().unwrap());

    let (status, patched) = app.patch(&uri, &token, json!({ "address2": "Bat B" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["address2"], "Bat B");
    assert_eq!(patched["city"], "Bordeaux");
    assert_eq!(patched["created_at"], created["created_at"]);

    let (status, _) = app.put(&uri, &token, json!({ "city": "Pessac" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_cascades_to_patients() {
    let app = TestApp::new();
    let token = app.register("addr@heroad.fr").await;
    let home = app.address(&token, "Bordeaux", "1 rue de la fontaine").await;
    app.patient(&token, "Thierry", &home).await;

    let uri = format!("/api/heroad/addresses/{}", home["id"].as_str().unwrap());
    let (status, _) = app.delete(&uri, &token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, patients) = app.get("/api/heroad/patients", &token).await;
    assert_eq!(patients, json!([]));

    let (status, _) = app.delete(&uri, &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
