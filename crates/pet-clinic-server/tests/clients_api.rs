use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use pet_clinic_core::{ClientStore, StoreConfig};
use pet_clinic_server::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let store = Arc::new(ClientStore::new(StoreConfig::in_memory()));
    build_router(AppState::new(store))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, value)
}

async fn create(app: &Router, payload: Value) -> Value {
    let (status, body) = send(app, Method::POST, "/clients", Some(&payload.to_string())).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"].clone()
}

fn jane() -> Value {
    json!({
        "name": "Jane",
        "phone": "050-1111111",
        "petName": "Rex",
        "petBirthDate": "2020-01-01",
        "petType": "dog"
    })
}

#[tokio::test]
async fn create_get_update_delete_scenario() {
    let app = app();

    let created = create(&app, jane()).await;
    assert_eq!(created["name"], "Jane");
    assert_eq!(created["phone"], "050-1111111");
    assert_eq!(created["petName"], "Rex");
    assert_eq!(created["petBirthDate"], "2020-01-01");
    assert_eq!(created["petType"], "dog");
    assert_eq!(created["createdAt"], created["updatedAt"]);
    let id = created["id"].as_str().expect("id").to_string();

    let (status, body) = send(&app, Method::GET, "/clients/not-a-valid-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["error"]["message"], "Invalid client id");

    let (status, body) = send(&app, Method::GET, &format!("/clients/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], created);
    assert_eq!(body["error"], Value::Null);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/clients/{id}"),
        Some(r#"{"notes":"vaccinated"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated = &body["data"];
    assert_eq!(updated["notes"], "vaccinated");
    assert_ne!(updated["updatedAt"], created["updatedAt"]);
    for field in ["id", "name", "phone", "petName", "petBirthDate", "petType", "createdAt"] {
        assert_eq!(updated[field], created[field], "{field} changed");
    }

    let (status, body) = send(&app, Method::DELETE, &format!("/clients/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"data": {"deleted": true}, "error": null}));

    let (status, body) = send(&app, Method::DELETE, &format!("/clients/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Client not found");
}

#[tokio::test]
async fn create_reports_every_validation_error() {
    let app = app();
    let payload = json!({
        "petName": "Rex",
        "petBirthDate": "2020-01-01",
        "petType": "hamster"
    });
    let (status, body) = send(&app, Method::POST, "/clients", Some(&payload.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Validation failed");
    assert_eq!(
        body["error"]["details"],
        json!([
            "name is required",
            "phone is required",
            "petType must be one of: dog, cat, parrot"
        ])
    );
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/clients", Some("{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid JSON body");

    let created = create(&app, jane()).await;
    let uri = format!("/clients/{}", created["id"].as_str().unwrap());
    let (status, body) = send(&app, Method::PUT, &uri, Some("[1,")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid JSON body");
}

#[tokio::test]
async fn update_validation_and_lookup_failures() {
    let app = app();
    let created = create(&app, jane()).await;
    let uri = format!("/clients/{}", created["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::PUT, &uri, Some(r#"{"name":"  ","age":4}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["details"],
        json!(["unknown field: age", "name is required"])
    );

    let (status, body) = send(&app, Method::PUT, &uri, Some(r#"{"notes":"   "}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"]["details"],
        json!(["no valid fields were provided for update"])
    );

    let (status, _) = send(&app, Method::PUT, "/clients/12345", Some(r#"{"name":"Jo"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = "/clients/6f1c2f4e-0c5b-4d8e-9a59-3e2f1a0b7c11";
    let (status, _) = send(&app, Method::PUT, missing, Some(r#"{"name":"Jo"}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::GET, missing, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::DELETE, "/clients/nope", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_filters_and_order() {
    let app = app();
    for (name, pet_name, pet_type) in [
        ("Captain Hook", "Tick", "parrot"),
        ("Escape Artist", "Houdini", "cat"),
        ("Jane", "Rex", "dog"),
    ] {
        let mut payload = jane();
        payload["name"] = json!(name);
        payload["petName"] = json!(pet_name);
        payload["petType"] = json!(pet_type);
        create(&app, payload).await;
    }

    let names = |body: &Value| -> Vec<String> {
        body["data"]
            .as_array()
            .expect("array")
            .iter()
            .map(|c| c["name"].as_str().unwrap().to_string())
            .collect()
    };

    let (status, body) = send(&app, Method::GET, "/clients", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), ["Jane", "Escape Artist", "Captain Hook"]);

    let (_, body) = send(&app, Method::GET, "/clients?name=CAP", None).await;
    assert_eq!(names(&body), ["Escape Artist", "Captain Hook"]);

    let (_, body) = send(&app, Method::GET, "/clients?petType=dog&petType=cat", None).await;
    assert_eq!(names(&body), ["Jane", "Escape Artist"]);

    let (_, body) = send(&app, Method::GET, "/api/clients?petTypes=dog,cat&name=cap", None).await;
    assert_eq!(names(&body), ["Escape Artist"]);

    let (_, body) = send(&app, Method::GET, "/clients?petName=zzz", None).await;
    assert_eq!(body["data"], json!([]));

    let (_, body) = send(&app, Method::GET, "/clients?sortBy=name&sortDirection=asc", None).await;
    assert_eq!(names(&body), ["Captain Hook", "Escape Artist", "Jane"]);

    let (status, body) = send(&app, Method::GET, "/clients?petType=hamster", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid petType filter");
}

#[tokio::test]
async fn storage_failure_is_a_500_envelope() {
    let store = Arc::new(ClientStore::new(StoreConfig::default()));
    let app = build_router(AppState::new(store));

    let (status, body) = send(&app, Method::GET, "/clients", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["message"], "Failed to fetch clients");
    let detail = body["error"]["details"][0].as_str().unwrap();
    assert!(detail.contains("CLINIC_DATABASE_URL"), "{detail}");

    // Malformed ids are still reported as such
    let (status, _) = send(&app, Method::GET, "/clients/bad", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn healthz_and_body_limit() {
    let store = Arc::new(ClientStore::new(StoreConfig::in_memory()));
    let app = build_router(AppState::new(store).with_body_limit(64));

    let (status, body) = send(&app, Method::GET, "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");

    let oversized = json!({"name": "x".repeat(200)}).to_string();
    let (status, body) = send(&app, Method::POST, "/clients", Some(&oversized)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["error"]["message"], "Invalid request body");
}

#[tokio::test]
async fn unmatched_requests_use_the_envelope() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/owners", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["error"]["message"], "Route not found");

    let (status, body) = send(&app, Method::PATCH, "/clients", Some("{}")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"]["message"], "Method not allowed");

    let (status, body) = send(&app, Method::POST, "/api/clients/abc", Some("{}")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["data"], Value::Null);

    // Not valid UTF-8 once percent-decoded
    let (status, body) = send(&app, Method::GET, "/clients/%FF", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Invalid client id");
}

#[tokio::test]
async fn name_filters_fold_non_ascii_case() {
    let app = app();
    let mut payload = jane();
    payload["name"] = json!("ÉLODIE Müller");
    payload["petName"] = json!("Öskar");
    create(&app, payload).await;
    create(&app, jane()).await;

    let (status, body) = send(&app, Method::GET, "/clients?name=%C3%A9lodie", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["name"], "ÉLODIE Müller");

    let (_, body) = send(&app, Method::GET, "/clients?petName=%C3%B6sk", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["petName"], "Öskar");
}
