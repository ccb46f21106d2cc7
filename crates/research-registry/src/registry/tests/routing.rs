use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use serde_json::json;

use super::common::*;
use crate::registry::auth::{AuthUser, ContentEditor};
use crate::registry::domain::Role;
use crate::registry::router::delete_research_handler;

#[tokio::test]
async fn reads_require_a_token() {
    let state = api_state();
    let response = send(router(&state), "GET", "/api/research", None, None).await;
    assert_status(&response, StatusCode::UNAUTHORIZED);

    let response = send(
        router(&state),
        "GET",
        "/api/research",
        Some("not-a-token"),
        None,
    )
    .await;
    assert_status(&response, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn guest_can_read_but_not_write() {
    let state = api_state();
    let token = token_for(&state, Role::Guest);

    let response = send(router(&state), "GET", "/api/research", Some(&token), None).await;
    assert_status(&response, StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload.as_array().map(Vec::len), Some(2));

    let response = send(
        router(&state),
        "POST",
        "/api/research",
        Some(&token),
        Some(json!({"title": "Guest attempt", "centreId": "centre-rmu"})),
    )
    .await;
    assert_status(&response, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn co_host_creates_and_deletes_research() {
    let state = api_state();
    let token = token_for(&state, Role::CoHost);

    let response = send(
        router(&state),
        "POST",
        "/api/research",
        Some(&token),
        Some(json!({
            "title": "Digital waqf governance",
            "centreId": "centre-emas",
            "status": "Active-Ongoing (New)",
            "progress": 5
        })),
    )
    .await;
    assert_status(&response, StatusCode::CREATED);
    let created = read_json_body(response).await;
    let id = created["id"].as_str().expect("id").to_string();
    assert!(created["createdBy"]
        .as_str()
        .is_some_and(|actor| actor.starts_with("cohost-")));

    let uri = format!("/api/research/{id}");
    let response = send(router(&state), "DELETE", &uri, Some(&token), None).await;
    assert_status(&response, StatusCode::NO_CONTENT);

    let response = send(router(&state), "GET", &uri, Some(&token), None).await;
    assert_status(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_payload_is_unprocessable() {
    let state = api_state();
    let token = token_for(&state, Role::Host);

    let response = send(
        router(&state),
        "PUT",
        "/api/research/res-a",
        Some(&token),
        Some(json!({"progress": 140})),
    )
    .await;
    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);

    let response = send(
        router(&state),
        "POST",
        "/api/research",
        Some(&token),
        Some(json!({"title": "No status", "centreId": "centre-rmu", "status": "Finished"})),
    )
    .await;
    assert_status(&response, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn centre_in_use_is_a_conflict_with_usage() {
    let state = api_state();
    let token = token_for(&state, Role::Host);

    let response = send(
        router(&state),
        "DELETE",
        "/api/academicCentres/centre-kias",
        Some(&token),
        None,
    )
    .await;
    assert_status(&response, StatusCode::CONFLICT);
    let payload = read_json_body(response).await;
    assert_eq!(payload["usage"]["research"], json!(1));
}

#[tokio::test]
async fn collaborations_carry_derived_status() {
    let state = api_state();
    let token = token_for(&state, Role::Guest);

    let response = send(
        router(&state),
        "GET",
        "/api/collaborations?today=2031-01-01",
        Some(&token),
        None,
    )
    .await;
    assert_status(&response, StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload[0]["status"], json!(["Expired"]));
    assert_eq!(payload[0]["effectiveEndDate"], json!("2030-01-01"));
}

#[tokio::test]
async fn login_signup_and_user_management() {
    let state = api_state();

    let response = send(
        router(&state),
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "name": "Aminah",
            "email": "aminah@example.org",
            "password": "s3cret"
        })),
    )
    .await;
    assert_status(&response, StatusCode::CREATED);
    let profile = read_json_body(response).await;
    assert_eq!(profile["approved"], json!(true));
    assert!(profile.get("passwordHash").is_none());

    let credentials = json!({"email": "aminah@example.org", "password": "s3cret"});
    let response = send(
        router(&state),
        "POST",
        "/api/auth/login",
        None,
        Some(credentials.clone()),
    )
    .await;
    assert_status(&response, StatusCode::OK);
    let session = read_json_body(response).await;
    assert_eq!(session["user"]["role"], json!("guest"));
    let guest = session["token"].as_str().expect("token").to_string();

    let response = send(router(&state), "GET", "/api/research", Some(&guest), None).await;
    assert_status(&response, StatusCode::OK);

    let co_host = token_for(&state, Role::CoHost);
    let response = send(router(&state), "GET", "/api/users", Some(&co_host), None).await;
    assert_status(&response, StatusCode::FORBIDDEN);

    let host = token_for(&state, Role::Host);
    let uri = format!("/api/users/{}", profile["id"].as_str().expect("user id"));
    let response = send(
        router(&state),
        "PUT",
        &uri,
        Some(&host),
        Some(json!({"approved": false})),
    )
    .await;
    assert_status(&response, StatusCode::OK);

    let response = send(
        router(&state),
        "POST",
        "/api/auth/login",
        None,
        Some(credentials),
    )
    .await;
    assert_status(&response, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn duplicate_signup_is_a_conflict() {
    let state = api_state();
    let response = send(
        router(&state),
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({"name": "Copy", "email": HOST_EMAIL, "password": "x"})),
    )
    .await;
    assert_status(&response, StatusCode::CONFLICT);
}

#[tokio::test]
async fn dashboard_honours_as_of_date() {
    let state = api_state();
    let token = token_for(&state, Role::Guest);

    let response = send(
        router(&state),
        "GET",
        "/api/dashboard?today=2025-01-01",
        Some(&token),
        None,
    )
    .await;
    assert_status(&response, StatusCode::OK);
    let payload = read_json_body(response).await;
    assert_eq!(payload["asOf"], json!("2025-01-01"));
    assert_eq!(payload["totalResearch"], json!(2));

    let response = send(
        router(&state),
        "GET",
        "/api/dashboard?today=01/02/2025",
        Some(&token),
        None,
    )
    .await;
    assert_status(&response, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reports_render_as_csv_or_json() {
    let state = api_state();
    let token = token_for(&state, Role::Guest);

    let response = send(
        router(&state),
        "GET",
        "/api/reports/project-status?format=csv",
        Some(&token),
        None,
    )
    .await;
    assert_status(&response, StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok()),
        Some("text/csv; charset=utf-8")
    );
    let body = read_text_body(response).await;
    assert!(body.starts_with("Project Status Summary"));

    let response = send(
        router(&state),
        "GET",
        "/api/reports/research-list",
        Some(&token),
        None,
    )
    .await;
    assert_status(&response, StatusCode::OK);
    let document = read_json_body(response).await;
    assert_eq!(document["tables"][0]["body"].as_array().map(Vec::len), Some(2));

    let response = send(
        router(&state),
        "GET",
        "/api/reports/unknown",
        Some(&token),
        None,
    )
    .await;
    assert_status(&response, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_handler_reports_missing_research() {
    let state = api_state();
    let editor = state
        .auth
        .verify_token(&token_for(&state, Role::Host))
        .map(|claims| AuthUser {
            subject: claims.sub,
            email: claims.email,
            role: claims.role,
        })
        .expect("host claims");

    let response = delete_research_handler(
        State(state.clone()),
        ContentEditor(editor),
        Path("res-missing".to_string()),
    )
    .await;

    assert_status(&response, StatusCode::NOT_FOUND);
}
