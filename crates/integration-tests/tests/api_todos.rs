//! Todo API: every operation is scoped to the token's owner.

use axum::http::{Method, StatusCode, header::WWW_AUTHENTICATE};
use serde_json::{Value, json};

use online_store_integration_tests::TestApp;

async fn create_todo(app: &mut TestApp, token: &str, content: &str) -> Value {
    let response = app
        .api(
            Method::POST,
            "/api/todos",
            Some(json!({ "content": content })),
            Some(token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.text());
    response.json()
}

#[tokio::test]
async fn test_requires_token() {
    let mut app = TestApp::new();

    let response = app.api(Method::GET, "/api/todos", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers[WWW_AUTHENTICATE], "Token");

    let response = app
        .api(Method::GET, "/api/todos", None, Some("not-a-real-token"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_scheme_is_accepted() {
    let mut app = TestApp::new();
    let token = app.signup("alice", "s3cret").await;

    let response = app
        .send(
            axum::http::Request::get("/api/todos")
                .header("authorization", format!("Bearer {token}"))
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json(), json!([]));
}

#[tokio::test]
async fn test_other_users_todos_are_invisible() {
    let mut app = TestApp::new();
    let alice = app.signup("alice", "s3cret").await;
    let bob = app.signup("bob", "hunter2").await;

    let todo = create_todo(&mut app, &alice, "buy milk").await;
    let uri = format!("/api/todos/{}", todo["id"]);

    let response = app.api(Method::GET, &uri, None, Some(&bob)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .api(
            Method::PUT,
            &uri,
            Some(json!({ "content": "hijacked" })),
            Some(&bob),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app
        .api(Method::PUT, &format!("{uri}/toggle"), None, Some(&bob))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = app.api(Method::DELETE, &uri, None, Some(&bob)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let list = app.api(Method::GET, "/api/todos", None, Some(&bob)).await;
    assert_eq!(list.json(), json!([]));

    let still_there = app.api(Method::GET, &uri, None, Some(&alice)).await;
    assert_eq!(still_there.status, StatusCode::OK);
    assert_eq!(still_there.json()["content"], "buy milk");
    assert_eq!(still_there.json()["completed"], false);
}

#[tokio::test]
async fn test_owner_in_body_is_ignored() {
    let mut app = TestApp::new();
    let alice = app.signup("alice", "s3cret").await;
    let bob = app.signup("bob", "hunter2").await;

    let response = app
        .api(
            Method::POST,
            "/api/todos",
            Some(json!({ "content": "mine", "owner": 999 })),
            Some(&alice),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert!(response.json().get("owner").is_none());

    let alice_list = app.api(Method::GET, "/api/todos", None, Some(&alice)).await;
    assert_eq!(alice_list.json().as_array().unwrap().len(), 1);

    let bob_list = app.api(Method::GET, "/api/todos", None, Some(&bob)).await;
    assert_eq!(bob_list.json(), json!([]));
}

#[tokio::test]
async fn test_list_is_newest_first() {
    let mut app = TestApp::new();
    let token = app.signup("alice", "s3cret").await;

    for content in ["first", "second", "third"] {
        create_todo(&mut app, &token, content).await;
    }

    let list = app.api(Method::GET, "/api/todos", None, Some(&token)).await;
    let contents: Vec<_> = list
        .json()
        .as_array()
        .unwrap()
        .iter()
        .map(|todo| todo["content"].as_str().unwrap().to_owned())
        .collect();

    assert_eq!(contents, ["third", "second", "first"]);
}

#[tokio::test]
async fn test_toggle_twice_restores_state() {
    let mut app = TestApp::new();
    let token = app.signup("alice", "s3cret").await;
    let todo = create_todo(&mut app, &token, "walk the dog").await;
    let toggle_uri = format!("/api/todos/{}/toggle", todo["id"]);

    let once = app.api(Method::PUT, &toggle_uri, None, Some(&token)).await;
    assert_eq!(once.status, StatusCode::OK);
    assert_eq!(once.json()["completed"], true);

    // A body asking for a specific value does not change the outcome.
    let twice = app
        .api(
            Method::PATCH,
            &toggle_uri,
            Some(json!({ "completed": true })),
            Some(&token),
        )
        .await;
    assert_eq!(twice.json()["completed"], false);
    assert_eq!(twice.json()["content"], "walk the dog");
}

#[tokio::test]
async fn test_update_and_delete() {
    let mut app = TestApp::new();
    let token = app.signup("alice", "s3cret").await;
    let todo = create_todo(&mut app, &token, "draft").await;
    let uri = format!("/api/todos/{}", todo["id"]);

    let updated = app
        .api(
            Method::PUT,
            &uri,
            Some(json!({ "content": "final" })),
            Some(&token),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.json()["content"], "final");
    assert_eq!(updated.json()["completed"], false);

    let blank = app
        .api(Method::PATCH, &uri, Some(json!({ "content": "  " })), Some(&token))
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);

    let deleted = app.api(Method::DELETE, &uri, None, Some(&token)).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);

    let gone = app.api(Method::GET, &uri, None, Some(&token)).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_path_and_method_use_error_shape() {
    let mut app = TestApp::new();
    let token = app.signup("alice", "s3cret").await;

    let response = app.api(Method::GET, "/api/nope", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.json(), json!({ "error": "Not found." }));

    let todo = create_todo(&mut app, &token, "buy milk").await;
    let toggle = format!("/api/todos/{}/toggle", todo["id"]);
    let response = app.api(Method::GET, &toggle, None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.json(), json!({ "error": "Method not allowed." }));

    let response = app.api(Method::DELETE, "/api/todos", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.json(), json!({ "error": "Method not allowed." }));

    let response = app.api(Method::GET, "/api/login", None, None).await;
    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.json(), json!({ "error": "Method not allowed." }));
}
