// tests/patient_api.rs

mod common;

use axum::http::StatusCode;
use rstest::rstest;
use serde_json::{json, Value};

use common::{ids, TestApp};

fn payload(address: &Value) -> Value {
    json!({
        "firstname": "Testfirst",
        "lastname": "Testlast",
        "phone_number": "0756897687",
        "description": "This is a description",
        "address": address["id"],
    })
}

#[tokio::test]
async fn create_patient_and_fetch_it() {
    let app = TestApp::new();
    let token = app.register("patients@heroad.fr").await;
    let home = app.address(&token, "Bordeaux", "1 rue de la fontaine").await;

    let created = app.create("/api/heroad/patients", &token, payload(&home)).await;
    assert_eq!(created["firstname"], "Testfirst");
    assert_eq!(created["special"], false);
    assert_eq!(created["address"], home["id"]);

    let uri = format!("/api/heroad/patients/{}", created["id"].as_str().unwrap());
    let (status, fetched) = app.get(&uri, &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn phone_number_longer_than_ten_chars_is_rejected() {
    let app = TestApp::new();
    let token = app.register("patients@heroad.fr").await;
    let home = app.address(&token, "Bordeaux", "1 rue de la fontaine").await;

    let mut body = payload(&home);
    body["phone_number"] = json!("0987978987890");
    let (status, response) = app.post("/api/heroad/patients", &token, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["details"].get("phone_number").is_some());

    let (_, list) = app.get("/api/heroad/patients", &token).await;
    assert_eq!(list, json!([]));
}

#[rstest]
#[case("firstname")]
#[case("lastname")]
#[case("phone_number")]
#[case("address")]
#[tokio::test]
async fn missing_field_is_rejected(#[case] field: &str) {
    let app = TestApp::new();
    let token = app.register("patients@heroad.fr").await;
    let home = app.address(&token, "Bordeaux", "1 rue de la fontaine").await;

    let mut body = payload(&home);
    body.as_object_mut().unwrap().remove(field);
    let (status, response) = app.post("/api/heroad/patients", &token, body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["details"].get(field).is_some());
}

#[tokio::test]
async fn unknown_address_is_rejected() {
    let app = TestApp::new();
    let token = app.register("patients@heroad.fr").await;

    let ghost = json!({ "id": "6f1c1a52-7a8e-4c2a-9a55-0f3a2f1b9c10" });
    let (status, response) = app.post("/api/heroad/patients", &token, payload(&ghost)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["details"].get("address").is_some());
}

#[tokio::test]
async fn search_by_name_or_phone() {
    let app = TestApp::new();
    let token = app.register("patients@heroad.fr").await;
    let home = app.address(&token, "Bordeaux", "1 rue de la fontaine").await;

    let thierry = app.patient(&token, "Thierry", &home).await;
    let mut other = payload(&home);
    other["phone_number"] = json!("0611111111");
    let other = app.create("/api/heroad/patients", &token, other).await;

    let (_, found) = app.get("/api/heroad/patients?search=thier", &token).await;
    assert_eq!(ids(&found), vec![thierry["id"].as_str().unwrap().to_string()]);

    let (_, found) = app.get("/api/heroad/patients?search=061111", &token).await;
    assert_eq!(ids(&found), vec![other["id"].as_str().unwrap().to_string()]);
}
