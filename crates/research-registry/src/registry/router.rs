use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{FromRef, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::auth::{
    AuthService, AuthUser, ContentEditor, HostUser, LoginRequest, NewUser, SignupRequest,
    UserPatch,
};
use super::changes::{
    CentreDraft, CentrePatch, CollaborationDraft, CollaborationPatch, ResearchDraft,
    ResearchPatch, ResearcherDraft, ResearcherPatch,
};
use super::dates::{parse_date, today_local};
use super::domain::{CentreId, CollaborationId, ResearchId, ResearcherId, UserId};
use super::filters::{ResearchFilter, ResearcherFilter};
use super::report::{
    build_report, CsvRenderer, EnglishLabels, ReportBuilder, ReportDocument, ReportKind,
    TableRenderer,
};
use super::repository::RepositoryError;
use super::service::{RegistryError, RegistryService};

/// Shared state behind every registry endpoint.
#[derive(Clone)]
pub struct ApiState {
    pub registry: RegistryService,
    pub auth: Arc<AuthService>,
}

impl ApiState {
    pub fn new(registry: RegistryService, auth: Arc<AuthService>) -> Self {
        Self { registry, auth }
    }
}

impl FromRef<ApiState> for Arc<AuthService> {
    fn from_ref(state: &ApiState) -> Self {
        state.auth.clone()
    }
}

/// Router exposing authentication, content CRUD, the dashboard and report export.
pub fn registry_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/signup", post(signup_handler))
        .route("/api/auth/guest", post(guest_handler))
        .route(
            "/api/research",
            get(list_research_handler).post(create_research_handler),
        )
        .route("/api/research/options", get(research_options_handler))
        .route(
            "/api/research/:research_id",
            get(get_research_handler)
                .put(update_research_handler)
                .delete(delete_research_handler),
        )
        .route(
            "/api/research/:research_id/report",
            get(research_report_handler),
        )
        .route(
            "/api/collaborations",
            get(list_collaborations_handler).post(create_collaboration_handler),
        )
        .route(
            "/api/collaborations/:collaboration_id",
            get(get_collaboration_handler)
                .put(update_collaboration_handler)
                .delete(delete_collaboration_handler),
        )
        .route(
            "/api/academicCentres",
            get(list_centres_handler).post(create_centre_handler),
        )
        .route(
            "/api/academicCentres/:centre_id",
            put(update_centre_handler).delete(delete_centre_handler),
        )
        .route(
            "/api/academicCentres/:centre_id/usage",
            get(centre_usage_handler),
        )
        .route(
            "/api/researchers",
            get(list_researchers_handler).post(create_researcher_handler),
        )
        .route(
            "/api/researchers/:researcher_id",
            get(get_researcher_handler)
                .put(update_researcher_handler)
                .delete(delete_researcher_handler),
        )
        .route(
            "/api/researchers/:researcher_id/report",
            get(researcher_report_handler),
        )
        .route("/api/users", get(list_users_handler).post(create_user_handler))
        .route(
            "/api/users/:user_id",
            put(update_user_handler).delete(delete_user_handler),
        )
        .route("/api/dataset", get(dataset_handler))
        .route("/api/dashboard", get(dashboard_handler))
        .route("/api/reports/:kind", get(report_handler))
        .with_state(state)
}

fn error_payload(status: StatusCode, message: impl Into<String>) -> Response {
    let payload = json!({
        "error": message.into(),
    });
    (status, axum::Json(payload)).into_response()
}

fn registry_error(err: RegistryError) -> Response {
    match err {
        RegistryError::Validation(error) => {
            error_payload(StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
        }
        RegistryError::Repository(RepositoryError::NotFound) => {
            error_payload(StatusCode::NOT_FOUND, "record not found")
        }
        RegistryError::Repository(RepositoryError::Conflict) => {
            error_payload(StatusCode::CONFLICT, "record already exists")
        }
        RegistryError::CentreInUse { centre_id, usage } => {
            let payload = json!({
                "error": format!("centre {centre_id} is still in use"),
                "usage": usage,
            });
            (StatusCode::CONFLICT, axum::Json(payload)).into_response()
        }
        other => {
            error!(error = %other, "registry request failed");
            error_payload(StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    }
}

fn respond<T: serde::Serialize>(status: StatusCode, result: Result<T, RegistryError>) -> Response {
    match result {
        Ok(body) => (status, axum::Json(body)).into_response(),
        Err(err) => registry_error(err),
    }
}

fn deleted<T>(result: Result<T, RegistryError>) -> Response {
    match result {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => registry_error(err),
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AsOfQuery {
    today: Option<String>,
}

impl AsOfQuery {
    fn resolve(&self) -> Result<NaiveDate, Response> {
        match self.today.as_deref() {
            Some(raw) => {
                parse_date(raw).map_err(|err| error_payload(StatusCode::BAD_REQUEST, err))
            }
            None => Ok(today_local()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ReportFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ReportQuery {
    #[serde(default)]
    format: ReportFormat,
    today: Option<String>,
}

fn report_response(document: ReportDocument, format: ReportFormat, slug: &str) -> Response {
    match format {
        ReportFormat::Json => (StatusCode::OK, axum::Json(document)).into_response(),
        ReportFormat::Csv => match CsvRenderer.render(&document) {
            Ok(body) => (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{slug}.csv\""),
                    ),
                ],
                body,
            )
                .into_response(),
            Err(err) => {
                error!(error = %err, report = slug, "report rendering failed");
                error_payload(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        },
    }
}

pub(crate) async fn login_handler(
    State(state): State<ApiState>,
    axum::Json(request): axum::Json<LoginRequest>,
) -> Response {
    match state.auth.login(&request) {
        Ok(session) => (StatusCode::OK, axum::Json(session)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn signup_handler(
    State(state): State<ApiState>,
    axum::Json(request): axum::Json<SignupRequest>,
) -> Response {
    match state.auth.signup(request) {
        Ok(profile) => (StatusCode::CREATED, axum::Json(profile)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn guest_handler(State(state): State<ApiState>) -> Response {
    match state.auth.guest_session() {
        Ok(session) => (StatusCode::OK, axum::Json(session)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn list_research_handler(
    State(state): State<ApiState>,
    _user: AuthUser,
    Query(filter): Query<ResearchFilter>,
) -> Response {
    respond(StatusCode::OK, state.registry.list_research(&filter))
}

pub(crate) async fn research_options_handler(
    State(state): State<ApiState>,
    _user: AuthUser,
) -> Response {
    respond(StatusCode::OK, state.registry.research_year_options())
}

pub(crate) async fn get_research_handler(
    State(state): State<ApiState>,
    _user: AuthUser,
    Path(research_id): Path<String>,
) -> Response {
    respond(
        StatusCode::OK,
        state.registry.get_research(&ResearchId(research_id)),
    )
}

pub(crate) async fn create_research_handler(
    State(state): State<ApiState>,
    ContentEditor(user): ContentEditor,
    axum::Json(draft): axum::Json<ResearchDraft>,
) -> Response {
    respond(
        StatusCode::CREATED,
        state.registry.create_research(draft, &user.email),
    )
}

pub(crate) async fn update_research_handler(
    State(state): State<ApiState>,
    _editor: ContentEditor,
    Path(research_id): Path<String>,
    axum::Json(patch): axum::Json<ResearchPatch>,
) -> Response {
    respond(
        StatusCode::OK,
        state
            .registry
            .update_research(&ResearchId(research_id), patch),
    )
}

pub(crate) async fn delete_research_handler(
    State(state): State<ApiState>,
    _editor: ContentEditor,
    Path(research_id): Path<String>,
) -> Response {
    deleted(state.registry.delete_research(&ResearchId(research_id)))
}

pub(crate) async fn research_report_handler(
    State(state): State<ApiState>,
    _user: AuthUser,
    Path(research_id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Response {
    let dataset = match state.registry.dataset() {
        Ok(dataset) => dataset,
        Err(err) => return registry_error(err),
    };
    let id = ResearchId(research_id);
    let Some(research) = dataset.research_by_id(&id) else {
        return registry_error(RepositoryError::NotFound.into());
    };

    let labels = EnglishLabels;
    let builder = ReportBuilder::new(&dataset.academic_centres, &dataset.research, &labels);
    let slug = format!("research-{id}");
    report_response(builder.single_research(research), query.format, &slug)
}

pub(crate) async fn list_collaborations_handler(
    State(state): State<ApiState>,
    _user: AuthUser,
    Query(as_of): Query<AsOfQuery>,
) -> Response {
    let today = match as_of.resolve() {
        Ok(today) => today,
        Err(response) => return response,
    };
    let views = state.registry.list_collaborations().map(|items| {
        items
            .iter()
            .map(|collaboration| collaboration.view(today))
            .collect::<Vec<_>>()
    });
    respond(StatusCode::OK, views)
}

pub(crate) async fn get_collaboration_handler(
    State(state): State<ApiState>,
    _user: AuthUser,
    Path(collaboration_id): Path<String>,
) -> Response {
    let view = state
        .registry
        .get_collaboration(&CollaborationId(collaboration_id))
        .map(|collaboration| collaboration.view(today_local()));
    respond(StatusCode::OK, view)
}

pub(crate) async fn create_collaboration_handler(
    State(state): State<ApiState>,
    ContentEditor(user): ContentEditor,
    axum::Json(draft): axum::Json<CollaborationDraft>,
) -> Response {
    let view = state
        .registry
        .create_collaboration(draft, &user.email)
        .map(|collaboration| collaboration.view(today_local()));
    respond(StatusCode::CREATED, view)
}

pub(crate) async fn update_collaboration_handler(
    State(state): State<ApiState>,
    _editor: ContentEditor,
    Path(collaboration_id): Path<String>,
    axum::Json(patch): axum::Json<CollaborationPatch>,
) -> Response {
    let view = state
        .registry
        .update_collaboration(&CollaborationId(collaboration_id), patch)
        .map(|collaboration| collaboration.view(today_local()));
    respond(StatusCode::OK, view)
}

pub(crate) async fn delete_collaboration_handler(
    State(state): State<ApiState>,
    _editor: ContentEditor,
    Path(collaboration_id): Path<String>,
) -> Response {
    deleted(
        state
            .registry
            .delete_collaboration(&CollaborationId(collaboration_id)),
    )
}

pub(crate) async fn list_centres_handler(
    State(state): State<ApiState>,
    _user: AuthUser,
) -> Response {
    respond(StatusCode::OK, state.registry.list_centres())
}

pub(crate) async fn create_centre_handler(
    State(state): State<ApiState>,
    _editor: ContentEditor,
    axum::Json(draft): axum::Json<CentreDraft>,
) -> Response {
    respond(StatusCode::CREATED, state.registry.create_centre(draft))
}

pub(crate) async fn update_centre_handler(
    State(state): State<ApiState>,
    _editor: ContentEditor,
    Path(centre_id): Path<String>,
    axum::Json(patch): axum::Json<CentrePatch>,
) -> Response {
    respond(
        StatusCode::OK,
        state.registry.update_centre(&CentreId(centre_id), patch),
    )
}

pub(crate) async fn centre_usage_handler(
    State(state): State<ApiState>,
    _user: AuthUser,
    Path(centre_id): Path<String>,
) -> Response {
    respond(
        StatusCode::OK,
        state.registry.centre_usage(&CentreId(centre_id)),
    )
}

pub(crate) async fn delete_centre_handler(
    State(state): State<ApiState>,
    _editor: ContentEditor,
    Path(centre_id): Path<String>,
) -> Response {
    deleted(state.registry.delete_centre(&CentreId(centre_id)))
}

pub(crate) async fn list_researchers_handler(
    State(state): State<ApiState>,
    _user: AuthUser,
    Query(filter): Query<ResearcherFilter>,
) -> Response {
    respond(StatusCode::OK, state.registry.list_researchers(&filter))
}

pub(crate) async fn get_researcher_handler(
    State(state): State<ApiState>,
    _user: AuthUser,
    Path(researcher_id): Path<String>,
) -> Response {
    respond(
        StatusCode::OK,
        state.registry.get_researcher(&ResearcherId(researcher_id)),
    )
}

pub(crate) async fn create_researcher_handler(
    State(state): State<ApiState>,
    ContentEditor(user): ContentEditor,
    axum::Json(draft): axum::Json<ResearcherDraft>,
) -> Response {
    respond(
        StatusCode::CREATED,
        state.registry.create_researcher(draft, &user.email),
    )
}

pub(crate) async fn update_researcher_handler(
    State(state): State<ApiState>,
    _editor: ContentEditor,
    Path(researcher_id): Path<String>,
    axum::Json(patch): axum::Json<ResearcherPatch>,
) -> Response {
    respond(
        StatusCode::OK,
        state
            .registry
            .update_researcher(&ResearcherId(researcher_id), patch),
    )
}

pub(crate) async fn delete_researcher_handler(
    State(state): State<ApiState>,
    _editor: ContentEditor,
    Path(researcher_id): Path<String>,
) -> Response {
    deleted(
        state
            .registry
            .delete_researcher(&ResearcherId(researcher_id)),
    )
}

pub(crate) async fn researcher_report_handler(
    State(state): State<ApiState>,
    _user: AuthUser,
    Path(researcher_id): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Response {
    let id = ResearcherId(researcher_id);
    let researcher = match state.registry.get_researcher(&id) {
        Ok(researcher) => researcher,
        Err(err) => return registry_error(err),
    };
    let dataset = match state.registry.dataset() {
        Ok(dataset) => dataset,
        Err(err) => return registry_error(err),
    };

    let labels = EnglishLabels;
    let builder = ReportBuilder::new(&dataset.academic_centres, &dataset.research, &labels);
    let slug = format!("researcher-{id}");
    report_response(
        builder.researcher_involvements(&researcher),
        query.format,
        &slug,
    )
}

pub(crate) async fn list_users_handler(
    State(state): State<ApiState>,
    _host: HostUser,
) -> Response {
    match state.auth.list_users() {
        Ok(users) => (StatusCode::OK, axum::Json(users)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn create_user_handler(
    State(state): State<ApiState>,
    _host: HostUser,
    axum::Json(request): axum::Json<NewUser>,
) -> Response {
    match state.auth.create_user(request) {
        Ok(profile) => (StatusCode::CREATED, axum::Json(profile)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn update_user_handler(
    State(state): State<ApiState>,
    _host: HostUser,
    Path(user_id): Path<String>,
    axum::Json(patch): axum::Json<UserPatch>,
) -> Response {
    match state.auth.update_user(&UserId(user_id), patch) {
        Ok(profile) => (StatusCode::OK, axum::Json(profile)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn delete_user_handler(
    State(state): State<ApiState>,
    _host: HostUser,
    Path(user_id): Path<String>,
) -> Response {
    match state.auth.delete_user(&UserId(user_id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}

pub(crate) async fn dataset_handler(State(state): State<ApiState>, _user: AuthUser) -> Response {
    respond(StatusCode::OK, state.registry.dataset())
}

pub(crate) async fn dashboard_handler(
    State(state): State<ApiState>,
    _user: AuthUser,
    Query(as_of): Query<AsOfQuery>,
) -> Response {
    match as_of.resolve() {
        Ok(today) => respond(StatusCode::OK, state.registry.dashboard(today)),
        Err(response) => response,
    }
}

pub(crate) async fn report_handler(
    State(state): State<ApiState>,
    _user: AuthUser,
    Path(kind): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Response {
    let kind = match ReportKind::from_str(&kind) {
        Ok(kind) => kind,
        Err(err) => return error_payload(StatusCode::NOT_FOUND, err.to_string()),
    };
    let as_of = AsOfQuery {
        today: query.today.clone(),
    };
    let today = match as_of.resolve() {
        Ok(today) => today,
        Err(response) => return response,
    };
    let dataset = match state.registry.dataset() {
        Ok(dataset) => dataset,
        Err(err) => return registry_error(err),
    };

    let document = build_report(kind, &dataset, &EnglishLabels, today);
    report_response(document, query.format, kind.slug())
}
