use metrics_exporter_prometheus::PrometheusHandle;
use research_registry::config::AuthConfig;
use research_registry::error::AppError;
use research_registry::registry::auth::{AuthService, TokenSigner};
use research_registry::registry::{ApiState, Dataset, RegistryService, RegistryStore};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

pub(crate) use research_registry::registry::dates::parse_date;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Registry and auth services over an in-memory store, optionally preloaded from a snapshot.
pub(crate) fn build_api_state(
    auth_config: &AuthConfig,
    snapshot: Option<&Path>,
) -> Result<ApiState, AppError> {
    let store = match snapshot {
        Some(path) => {
            let dataset = Dataset::load(path)?;
            info!(
                path = %path.display(),
                research = dataset.research.len(),
                researchers = dataset.researchers.len(),
                "loaded registry snapshot"
            );
            dataset.into_store()
        }
        None => RegistryStore::seeded(),
    };

    let registry = RegistryService::new(store)?;
    let auth = AuthService::new(
        registry.store().users.clone(),
        TokenSigner::new(&auth_config.jwt_secret, auth_config.token_ttl()),
    );
    auth.seed_host(
        "Host",
        &auth_config.seed_host_email,
        &auth_config.seed_host_password,
    )?;

    Ok(ApiState::new(registry, Arc::new(auth)))
}

#[cfg(test)]
pub(crate) fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "api-test-secret".to_string(),
        token_ttl_hours: 1,
        seed_host_email: "host@research.local".to_string(),
        seed_host_password: "password".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use research_registry::registry::auth::LoginRequest;
    use research_registry::registry::domain::Role;

    #[test]
    fn empty_state_has_default_centres_and_seeded_host() {
        let state = build_api_state(&test_auth_config(), None).expect("state builds");

        let centres = state.registry.list_centres().expect("centres");
        assert_eq!(centres.len(), 5);

        let session = state
            .auth
            .login(&LoginRequest {
                email: "host@research.local".to_string(),
                password: "password".to_string(),
            })
            .expect("seeded host logs in");
        assert_eq!(session.user.role, Role::Host);
    }

    #[test]
    fn missing_snapshot_is_reported() {
        let result = build_api_state(
            &test_auth_config(),
            Some(Path::new("does/not/exist.json")),
        );
        assert!(matches!(result, Err(AppError::Snapshot(_))));
    }
}
