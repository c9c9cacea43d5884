mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{build_test_app, create_project, delete, get, login_as, names, post_json, put_json};

#[tokio::test]
async fn create_applies_defaults_and_round_trips() {
    let app = build_test_app();
    let token = login_as(&app, "Demo User", "demo@example.com").await;

    let payload = json!({
        "name": "Baby Blanket",
        "description": "Granny squares",
        "supplies": ["Baby yarn in pink"],
        "progress": 75,
        "status": "ongoing",
        "isImportant": true,
        "tasks": [{ "title": "Buy yarn", "completed": true }, { "title": "Add border" }]
    });
    let project = create_project(&app, &token, payload.clone()).await;
    assert!(project["id"].is_string());
    assert!(project["createdAt"].is_string());
    assert!(project["startDate"].is_string());

    let (status, body) = get(&app, &format!("/projects/{}", project["id"].as_str().unwrap()), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    let read = &body["project"];
    for field in ["name", "description", "supplies", "progress", "status", "isImportant"] {
        assert_eq!(read[field], payload[field], "field {}", field);
    }
    assert_eq!(read["tasks"], json!([{ "title": "Buy yarn", "completed": true }, { "title": "Add border", "completed": false }]));

    let minimal = create_project(&app, &token, json!({ "name": "Sweater" })).await;
    assert_eq!(minimal["status"], "planning");
    assert_eq!(minimal["progress"], 0);
    assert_eq!(minimal["isImportant"], false);
    assert_eq!(minimal["tasks"], json!([]));
}

#[tokio::test]
async fn create_rejects_invalid_fields() {
    let app = build_test_app();
    let token = login_as(&app, "Demo User", "demo@example.com").await;

    let (status, body) = post_json(&app, "/projects", Some(&token), json!({ "name": "Too far", "progress": 150 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["progress"].is_string());

    let (status, body) = post_json(&app, "/projects", Some(&token), json!({ "status": "abandoned" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["field_errors"]["name"].is_string());
    assert!(body["field_errors"]["status"].is_string());

    let (status, body) = post_json(&app, "/projects", Some(&token), json!({ "name": "x", "progress": "abc" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_JSON");

    let (_, list) = get(&app, "/projects", Some(&token)).await;
    assert_eq!(list["projects"], json!([]));
}

#[tokio::test]
async fn list_filters_by_status_importance_and_search() {
    let app = build_test_app();
    let token = login_as(&app, "Demo User", "demo@example.com").await;

    create_project(&app, &token, json!({ "name": "Baby Blanket", "status": "ongoing", "progress": 75 })).await;
    create_project(&app, &token, json!({ "name": "Table Runner", "description": "Autumn QUILT", "status": "completed", "progress": 100 })).await;
    create_project(&app, &token, json!({ "name": "Stockings", "isImportant": true })).await;

    let (_, body) = get(&app, "/projects?status=ongoing", Some(&token)).await;
    assert_eq!(names(&body["projects"]), vec!["Baby Blanket"]);

    let (_, body) = get(&app, "/projects?status=completed", Some(&token)).await;
    assert!(!names(&body["projects"]).contains(&"Baby Blanket".to_string()));

    let (_, body) = get(&app, "/projects?status=all", Some(&token)).await;
    assert_eq!(names(&body["projects"]), vec!["Stockings", "Table Runner", "Baby Blanket"]);

    let (_, body) = get(&app, "/projects?important=true", Some(&token)).await;
    assert_eq!(names(&body["projects"]), vec!["Stockings"]);

    let (_, body) = get(&app, "/projects?important=yes", Some(&token)).await;
    assert_eq!(body["projects"].as_array().unwrap().len(), 3);

    let (_, body) = get(&app, "/projects?search=quilt", Some(&token)).await;
    assert_eq!(names(&body["projects"]), vec!["Table Runner"]);

    let (_, body) = get(&app, "/projects?status=ongoing&search=quilt", Some(&token)).await;
    assert_eq!(body["projects"], json!([]));

    let (_, body) = get(&app, "/projects?status=unknown", Some(&token)).await;
    assert_eq!(body["projects"], json!([]));
}

#[tokio::test]
async fn update_merges_and_clears_nullable_fields() {
    let app = build_test_app();
    let token = login_as(&app, "Demo User", "demo@example.com").await;
    let project = create_project(
        &app,
        &token,
        json!({ "name": "Pillowcases", "description": "Floral", "dueDate": "2024-12-01", "progress": 40 }),
    )
    .await;
    let uri = format!("/projects/{}", project["id"].as_str().unwrap());

    let (status, body) = put_json(
        &app,
        &uri,
        Some(&token),
        json!({ "status": "paused", "description": null, "dueDate": null, "id": "ignored", "ownerId": "ignored" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated = &body["project"];
    assert_eq!(updated["name"], "Pillowcases");
    assert_eq!(updated["progress"], 40);
    assert_eq!(updated["status"], "paused");
    assert_eq!(updated["description"], json!(null));
    assert_eq!(updated["dueDate"], json!(null));
    assert_eq!(updated["id"], project["id"]);
    assert_eq!(updated["ownerId"], project["ownerId"]);
    assert_eq!(updated["createdAt"], project["createdAt"]);

    // Free status transitions
    let (status, body) = put_json(&app, &uri, Some(&token), json!({ "status": "planning" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project"]["status"], "planning");

    let (status, _) = put_json(&app, &uri, Some(&token), json!({ "progress": 101 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, body) = get(&app, &uri, Some(&token)).await;
    assert_eq!(body["project"]["progress"], 40);
}

#[tokio::test]
async fn delete_twice_yields_not_found() {
    let app = build_test_app();
    let token = login_as(&app, "Demo User", "demo@example.com").await;
    let project = create_project(&app, &token, json!({ "name": "Christmas Stockings" })).await;
    let uri = format!("/projects/{}", project["id"].as_str().unwrap());

    let (status, body) = delete(&app, &uri, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Project deleted successfully");

    let (status, body) = delete(&app, &uri, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Project not found");

    let (status, _) = get(&app, &uri, Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_id_is_not_found() {
    let app = build_test_app();
    let token = login_as(&app, "Demo User", "demo@example.com").await;

    let (status, body) = get(&app, "/projects/not-a-uuid", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}
