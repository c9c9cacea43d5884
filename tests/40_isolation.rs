mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{build_test_app, create_project, create_supply, delete, get, login_as, names, put_json};

#[tokio::test]
async fn users_only_see_their_own_records() {
    let app = build_test_app();
    let alice = login_as(&app, "Alice", "alice@example.com").await;
    let bob = login_as(&app, "Bob", "bob@example.com").await;

    create_project(&app, &alice, json!({ "name": "Alice Quilt" })).await;
    create_supply(&app, &alice, json!({ "name": "Alice Yarn" })).await;
    create_project(&app, &bob, json!({ "name": "Bob Scarf" })).await;

    let (_, body) = get(&app, "/projects", Some(&alice)).await;
    assert_eq!(names(&body["projects"]), vec!["Alice Quilt"]);
    let (_, body) = get(&app, "/projects", Some(&bob)).await;
    assert_eq!(names(&body["projects"]), vec!["Bob Scarf"]);
    let (_, body) = get(&app, "/supplies", Some(&bob)).await;
    assert_eq!(body["supplies"], json!([]));
}

#[tokio::test]
async fn foreign_records_look_missing() {
    let app = build_test_app();
    let alice = login_as(&app, "Alice", "alice@example.com").await;
    let bob = login_as(&app, "Bob", "bob@example.com").await;

    let project = create_project(&app, &alice, json!({ "name": "Alice Quilt", "progress": 10 })).await;
    let supply = create_supply(&app, &alice, json!({ "name": "Alice Yarn" })).await;
    let project_uri = format!("/projects/{}", project["id"].as_str().unwrap());
    let supply_uri = format!("/supplies/{}", supply["id"].as_str().unwrap());

    let (status, body) = get(&app, &project_uri, Some(&bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Project not found");

    let (status, _) = put_json(&app, &project_uri, Some(&bob), json!({ "progress": 99 })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = delete(&app, &project_uri, Some(&bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = get(&app, &supply_uri, Some(&bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Supply not found");
    let (status, _) = put_json(&app, &supply_uri, Some(&bob), json!({ "quantity": 0, "color": "Green" })).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = delete(&app, &supply_uri, Some(&bob)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get(&app, &project_uri, Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project"]["progress"], 10);
    let (status, body) = get(&app, &supply_uri, Some(&alice)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["supply"]["quantity"].as_f64(), Some(1.0));
    assert_eq!(body["supply"]["color"], json!(null));
    assert_eq!(body["supply"]["updatedAt"], supply["updatedAt"]);
}
