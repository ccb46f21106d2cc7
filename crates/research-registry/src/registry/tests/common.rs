use std::sync::Arc;

use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::registry::auth::{AuthService, LoginRequest, NewUser, TokenSigner};
use crate::registry::domain::{Collaboration, Research, Researcher, Role};
use crate::registry::repository::default_centres;
use crate::registry::snapshot::Dataset;
use crate::registry::{registry_router, ApiState, RegistryService, RegistryStore};

pub(super) const HOST_EMAIL: &str = "host@research.local";
pub(super) const HOST_PASSWORD: &str = "password";
pub(super) const SECRET: &str = "registry-routing-test-secret";

pub(super) fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

pub(super) fn at(raw: &str) -> DateTime<Utc> {
    raw.parse().expect("valid timestamp")
}

pub(super) fn parse<T: DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).expect("fixture parses")
}

pub(super) fn research(id: &str, centre: &str, status: &str, progress: f64) -> Research {
    parse(json!({
        "id": id,
        "title": format!("Study {id}"),
        "centreId": centre,
        "startDate": "2024-02-01",
        "endDate": "2025-12-31",
        "budget": 10000,
        "spending": 2500,
        "status": status,
        "progress": progress,
        "createdAt": "2024-01-01T00:00:00Z"
    }))
}

pub(super) fn collaboration(id: &str, end: &str, extensions: &[&str]) -> Collaboration {
    parse(json!({
        "id": id,
        "organization": format!("Partner {id}"),
        "type": "MoA",
        "startDate": "2021-01-01",
        "endDate": end,
        "extensionPeriods": extensions,
        "centreId": "centre-emas",
        "createdAt": "2021-01-01T00:00:00Z"
    }))
}

pub(super) fn researcher(id: &str, centre: &str, involvements: Value) -> Researcher {
    parse(json!({
        "id": id,
        "name": format!("Researcher {id}"),
        "email": format!("{id}@research.local"),
        "centreId": centre,
        "involvements": involvements,
        "createdAt": "2024-01-01T00:00:00Z"
    }))
}

/// Two research records, one collaboration and two researchers over the default centres.
pub(super) fn sample_dataset() -> Dataset {
    Dataset {
        research: vec![
            research("res-a", "centre-syarak", "Active-Ongoing (New)", 20.0),
            research("res-b", "centre-kias", "Completed", 100.0),
        ],
        collaborations: vec![collaboration("col-a", "2030-01-01", &[])],
        academic_centres: default_centres(),
        researchers: vec![
            researcher(
                "rsr-a",
                "centre-syarak",
                json!([
                    {"type": "internal", "researchId": "res-a", "role": "Principal Investigator"},
                    {"type": "internal", "researchId": "res-b", "role": "Research Member"}
                ]),
            ),
            researcher(
                "rsr-b",
                "centre-kias",
                json!([
                    {"type": "internal", "researchId": "res-a", "role": "Research Member"},
                    {"type": "external", "externalProjectTitle": "Outside grant", "externalProjectStatus": "Active-Ongoing", "role": "Research Member"}
                ]),
            ),
        ],
    }
}

pub(super) fn registry_service() -> RegistryService {
    RegistryService::new(sample_dataset().into_store()).expect("builds registry service")
}

pub(super) fn auth_service(store: &RegistryStore) -> Arc<AuthService> {
    let auth = AuthService::new(
        store.users.clone(),
        TokenSigner::new(SECRET, Duration::hours(1)),
    );
    auth.seed_host("Host", HOST_EMAIL, HOST_PASSWORD)
        .expect("seeds host");
    Arc::new(auth)
}

pub(super) fn api_state() -> ApiState {
    let registry = registry_service();
    let auth = auth_service(registry.store());
    ApiState::new(registry, auth)
}

pub(super) fn router(state: &ApiState) -> Router {
    registry_router(state.clone())
}

/// Bearer token for a freshly created, approved account with `role`.
pub(super) fn token_for(state: &ApiState, role: Role) -> String {
    match role {
        Role::Host => login(state, HOST_EMAIL, HOST_PASSWORD),
        Role::Guest => state.auth.guest_session().expect("guest session").token,
        Role::CoHost => {
            let email = format!(
                "cohost-{}@research.local",
                Utc::now().timestamp_nanos_opt().unwrap_or_default()
            );
            state
                .auth
                .create_user(NewUser {
                    name: "Co-host".to_string(),
                    email: email.clone(),
                    password: "cohost-pass".to_string(),
                    role: Role::CoHost,
                    approved: true,
                    organization: String::new(),
                })
                .expect("creates co-host");
            login(state, &email, "cohost-pass")
        }
    }
}

fn login(state: &ApiState, email: &str, password: &str) -> String {
    state
        .auth
        .login(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })
        .expect("logs in")
        .token
}

pub(super) async fn send(
    router: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(axum::body::Body::from(
                serde_json::to_vec(&body).expect("serializes"),
            )),
        None => builder.body(axum::body::Body::empty()),
    }
    .expect("request builds");

    router.oneshot(request).await.expect("route executes")
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}
