// tests/master_run_api.rs

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{ids, TestApp};

#[tokio::test]
async fn drivers_accept_the_users_alias_and_are_deduplicated() {
    let app = TestApp::new();
    let token = app.register("dispatch@heroad.fr").await;
    let driver = app.register("driver@heroad.fr").await;
    let driver_id = app.me(&driver).await["id"].clone();
    let vehicle = app.vehicle(&token, "AA-123-AA").await;

    let created = app
        .create(
            "/api/heroad/master-runs",
            &token,
            json!({
                "date": "2024-03-01T07:00:00Z",
                "vehicle": vehicle["id"],
                "users": [driver_id, driver_id],
            }),
        )
        .await;

    assert_eq!(created["drivers"], json!([driver_id]));
    assert_eq!(created["patients"], json!([]));
    assert_eq!(created["runs"], json!([]));
    assert_eq!(created["comments"], "");
}

#[tokio::test]
async fn unknown_driver_or_vehicle_is_rejected() {
    let app = TestApp::new();
    let token = app.register("dispatch@heroad.fr").await;
    let vehicle = app.vehicle(&token, "AA-123-AA").await;
    let ghost = "6f1c1a52-7a8e-4c2a-9a55-0f3a2f1b9c10";

    let (status, body) = app
        .post(
            "/api/heroad/master-runs",
            &token,
            json!({ "date": "2024-03-01T07:00:00Z", "vehicle": vehicle["id"], "drivers": [ghost] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].get("drivers").is_some());

    let (status, body) = app
        .post(
            "/api/heroad/master-runs",
            &token,
            json!({ "date": "2024-03-01T07:00:00Z", "vehicle": ghost }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].get("vehicle").is_some());
}

#[tokio::test]
async fn search_matches_plate_or_comments() {
    let app = TestApp::new();
    let token = app.register("dispatch@heroad.fr").await;
    let first = app.vehicle(&token, "AA-123-AA").await;
    let second = app.vehicle(&token, "BB-456-BB").await;

    let by_plate = app.master_run(&token, &first, "matin").await;
    let by_comment = app.master_run(&token, &second, "dialyse AA-123").await;
    app.master_run(&token, &second, "soir").await;

    let (status, found) = app.get("/api/heroad/master-runs?search=AA-123", &token).await;
    assert_eq!(status, StatusCode::OK);
    let mut found = ids(&found);
    found.sort();
    let mut expected = vec![
        by_plate["id"].as_str().unwrap().to_string(),
        by_comment["id"].as_str().unwrap().to_string(),
    ];
    expected.sort();
    assert_eq!(found, expected);
}

#[tokio::test]
async fn runs_are_a_read_only_back_reference() {
    let app = TestApp::new();
    let token = app.register("dispatch@heroad.fr").await;
    let home = app.address(&token, "Bordeaux", "1 rue de la fontaine").await;
    let patient = app.patient(&token, "Thierry", &home).await;
    let vehicle = app.vehicle(&token, "AA-123-AA").await;
    let master_run = app.master_run(&token, &vehicle, "matin").await;
    let run = app
        .run(&token, &master_run, &patient, &home, &home, "2024-03-01T08:00:00Z")
        .await;

    let uri = format!("/api/heroad/master-runs/{}", master_run["id"].as_str().unwrap());
    let (_, detail) = app.get(&uri, &token).await;
    assert_eq!(detail["runs"], json!([run["id"]]));

    // "runs" no corpo é ignorado
    let (status, patched) = app
        .patch(&uri, &token, json!({ "runs": [], "patients": [patient["id"]] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["runs"], json!([run["id"]]));
    assert_eq!(patched["patients"], json!([patient["id"]]));

    // Apagar a tournée leva as corridas junto
    let (status, _) = app.delete(&uri, &token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, runs) = app.get("/api/heroad/runs", &token).await;
    assert_eq!(runs, json!([]));
}

#[tokio::test]
async fn deleting_the_vehicle_removes_its_master_runs() {
    let app = TestApp::new();
    let token = app.register("dispatch@heroad.fr").await;
    let vehicle = app.vehicle(&token, "AA-123-AA").await;
    app.master_run(&token, &vehicle, "matin").await;

    let uri = format!("/api/heroad/vehicles/{}", vehicle["id"].as_str().unwrap());
    let (status, _) = app.delete(&uri, &token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, master_runs) = app.get("/api/heroad/master-runs", &token).await;
    assert_eq!(master_runs, json!([]));
}

#[tokio::test]
async fn each_master_run_lists_only_its_own_runs() {
    let app = TestApp::new();
    let token = app.register("dispatch@heroad.fr").await;
    let home = app.address(&token, "Bordeaux", "1 rue de la fontaine").await;
    let patient = app.patient(&token, "Thierry", &home).await;
    let vehicle = app.vehicle(&token, "AA-123-AA").await;
    let morning = app.master_run(&token, &vehicle, "matin").await;
    let evening = app.master_run(&token, &vehicle, "soir").await;
    app.master_run(&token, &vehicle, "vide").await;

    let first = app
        .run(&token, &morning, &patient, &home, &home, "2024-03-01T08:00:00Z")
        .await;
    let back = app
        .run(&token, &evening, &patient, &home, &home, "2024-03-01T18:00:00Z")
        .await;
    let second = app
        .run(&token, &morning, &patient, &home, &home, "2024-03-01T10:00:00Z")
        .await;

    let (status, list) = app.get("/api/heroad/master-runs", &token).await;
    assert_eq!(status, StatusCode::OK);
    let runs: Vec<&serde_json::Value> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|m| &m["runs"])
        .collect();
    assert_eq!(runs[0], &json!([first["id"], second["id"]]));
    assert_eq!(runs[1], &json!([back["id"]]));
    assert_eq!(runs[2], &json!([]));
}
