//! Session store: the single authentication record of a running client.
//!
//! State is only ever changed through the mutation methods
//! (`login_success`, `logout_success`, `set_*`). The actions (`login`,
//! `logout`, `init`, `fetch_*`) talk to the backend and storage and then
//! commit mutations. Lookup failures after sign-in are reported through the
//! notifier rather than returned.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;
use zeroize::Zeroize;

use super::jwt::{parse_jwt, JwtClaims, JwtError};
use super::storage::{StorageError, TokenStorage, TOKEN_KEY};
use crate::api;
use crate::api::client::{ApiClient, ApiError};
use crate::api::types::{AuthRequest, Institution, InstitutionType, User};
use crate::notification::{Notification, Notifier};
use crate::routes::{self, AppRoute, APP_ROUTE, LOGIN_ROUTE};

const SESSION_EXPIRED_MESSAGE: &str = "Session Expired";
const SESSION_EXPIRED_DESCRIPTION: &str = "Ihre Sitzung ist abgelaufen";
const INSTITUTION_FAILED_DESCRIPTION: &str = "Institution konnte nicht geladen werden";
const USER_FAILED_DESCRIPTION: &str = "Nutzer konnte nicht geladen werden";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Jwt(#[from] JwtError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The session record. No token means signed out.
#[derive(Debug, Default)]
pub struct AuthState {
    pub jwt_token: Option<String>,
    pub jwt_data: Option<JwtClaims>,
    pub user: Option<User>,
    pub institution: Option<Institution>,
}

impl AuthState {
    fn clear_session(&mut self) {
        if let Some(ref mut token) = self.jwt_token {
            token.zeroize();
        }
        self.jwt_token = None;
        self.jwt_data = None;
        self.user = None;
        self.institution = None;
    }
}

/// An institution member together with the role derived from its authorities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstitutionUser {
    #[serde(flatten)]
    pub user: User,
    pub role: String,
}

impl From<&User> for InstitutionUser {
    fn from(user: &User) -> Self {
        // Accounts carry either one authority or exactly two, the second
        // being the role within the institution.
        let role = match user.authorities.as_deref() {
            Some([_, second]) => second.authority.clone(),
            _ => String::new(),
        };
        Self {
            user: user.clone(),
            role,
        }
    }
}

pub struct AuthStore {
    api: Arc<ApiClient>,
    storage: Arc<dyn TokenStorage>,
    notifier: Arc<dyn Notifier>,
    show_all_views: bool,
    state: RwLock<AuthState>,
    current_route: RwLock<&'static str>,
}

impl AuthStore {
    pub fn new(
        api: Arc<ApiClient>,
        storage: Arc<dyn TokenStorage>,
        notifier: Arc<dyn Notifier>,
        show_all_views: bool,
    ) -> Self {
        Self {
            api,
            storage,
            notifier,
            show_all_views,
            state: RwLock::new(AuthState::default()),
            current_route: RwLock::new(LOGIN_ROUTE),
        }
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    // ── Getters ──────────────────────────────────────────────────────────

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.jwt_token.is_some()
    }

    /// Institution types from the token's claims, empty when signed out.
    pub async fn roles(&self) -> Vec<InstitutionType> {
        self.state
            .read()
            .await
            .jwt_data
            .as_ref()
            .map(|claims| claims.institution_roles())
            .unwrap_or_default()
    }

    /// Navigation routes the current roles may open.
    pub async fn routes(&self) -> Vec<AppRoute> {
        let roles = self.roles().await;
        routes::routes_for(&roles, self.show_all_views)
    }

    /// Members of the current institution, empty when none is loaded.
    pub async fn institution_users(&self) -> Vec<InstitutionUser> {
        self.state
            .read()
            .await
            .institution
            .as_ref()
            .and_then(|inst| inst.users.as_ref())
            .map(|users| users.iter().map(InstitutionUser::from).collect())
            .unwrap_or_default()
    }

    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    pub async fn institution(&self) -> Option<Institution> {
        self.state.read().await.institution.clone()
    }

    pub async fn claims(&self) -> Option<JwtClaims> {
        self.state.read().await.jwt_data.clone()
    }

    /// Name of the route the session last navigated to.
    pub async fn current_route(&self) -> &'static str {
        *self.current_route.read().await
    }

    // ── Mutations ────────────────────────────────────────────────────────

    /// Adopt `token` as the session token and attach it to API requests.
    ///
    /// The token is decoded first; an undecodable token leaves the state untouched.
    pub async fn login_success(&self, token: &str) -> Result<(), JwtError> {
        let claims = parse_jwt(token)?;
        {
            let mut state = self.state.write().await;
            if let Some(ref mut old) = state.jwt_token {
                old.zeroize();
            }
            state.jwt_token = Some(token.to_string());
            state.jwt_data = Some(claims);
        }
        self.api.set_bearer_token(token).await;
        Ok(())
    }

    /// Drop the session and detach the token from API requests.
    pub async fn logout_success(&self) {
        self.state.write().await.clear_session();
        self.api.remove_bearer_token().await;
    }

    pub async fn set_authenticated_institution(&self, institution: Institution) {
        self.state.write().await.institution = Some(institution);
    }

    pub async fn set_user(&self, user: User) {
        self.state.write().await.user = Some(user);
    }

    async fn navigate(&self, route: &'static str) {
        log::debug!("navigating to {}", route);
        *self.current_route.write().await = route;
    }

    // ── Actions ──────────────────────────────────────────────────────────

    /// Sign in with credentials.
    ///
    /// Returns `false` when the backend answered without a token; the session
    /// is left unchanged in that case. Backend rejections are returned as
    /// `AuthError::Api` so the caller can inspect the status.
    pub async fn login(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        let request = AuthRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = api::auth::post_authentication(&self.api, &request).await?;

        let Some(mut token) = response.jwt_token.filter(|t| !t.is_empty()) else {
            log::warn!("Sign-in for {} returned no token", username);
            return Ok(false);
        };

        self.login_success(&token).await?;
        self.load_session_details().await;
        self.storage.set(TOKEN_KEY, &token)?;
        token.zeroize();
        self.navigate(APP_ROUTE).await;

        log::info!("Signed in as {}", username);
        Ok(true)
    }

    /// Sign out locally and wipe storage.
    pub async fn logout(&self) -> Result<(), AuthError> {
        log::info!("Signing out");
        self.logout_success().await;
        self.storage.clear()?;
        self.navigate(LOGIN_ROUTE).await;
        Ok(())
    }

    /// Restore a stored session.
    ///
    /// Returns `true` when an unexpired token was found and adopted. An
    /// expired token raises a "session expired" notification; expired and
    /// undecodable tokens are both wiped from storage.
    pub async fn init(&self) -> Result<bool, AuthError> {
        let Some(token) = self.storage.get(TOKEN_KEY)?.filter(|t| !t.is_empty()) else {
            log::debug!("No stored session");
            return Ok(false);
        };

        let claims = match parse_jwt(&token) {
            Ok(claims) => claims,
            Err(e) => {
                log::warn!("Stored token is unreadable, discarding: {}", e);
                self.storage.clear()?;
                return Ok(false);
            }
        };

        if claims.is_expired() {
            log::info!("Stored session expired");
            self.notifier.notify(Notification::info(
                SESSION_EXPIRED_MESSAGE,
                SESSION_EXPIRED_DESCRIPTION,
            ));
            self.storage.clear()?;
            return Ok(false);
        }

        self.login_success(&token).await?;
        self.load_session_details().await;
        log::info!("Restored stored session");
        Ok(true)
    }

    pub async fn fetch_authenticated_institution(&self) {
        match api::auth::get_authenticated_institution(&self.api).await {
            Ok(institution) => self.set_authenticated_institution(institution).await,
            Err(e) => {
                log::warn!("Institution lookup failed: {}", e);
                self.notifier
                    .notify(Notification::error("", INSTITUTION_FAILED_DESCRIPTION));
            }
        }
    }

    pub async fn fetch_authenticated_user(&self) {
        match api::auth::get_current_user(&self.api).await {
            Ok(user) => self.set_user(user).await,
            Err(e) => {
                log::warn!("User lookup failed: {}", e);
                self.notifier
                    .notify(Notification::error("", USER_FAILED_DESCRIPTION));
            }
        }
    }

    async fn load_session_details(&self) {
        tokio::join!(
            self.fetch_authenticated_institution(),
            self.fetch_authenticated_user()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use axum::http::{HeaderMap, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::json;

    use crate::api::client::test_server;
    use crate::api::types::Authority;
    use crate::auth::jwt::test_tokens::{make_token, now_secs};
    use crate::auth::storage::MemoryStorage;
    use crate::notification::recording::RecordingNotifier;
    use crate::notification::Level;

    // ── Fake backend ─────────────────────────────────────────────────────

    #[derive(Clone)]
    struct Backend {
        token: Option<String>,
        reject_credentials: bool,
        institution_ok: bool,
        user_ok: bool,
        lookup_auth: Arc<Mutex<Vec<Option<String>>>>,
    }

    impl Backend {
        fn issuing(token: &str) -> Self {
            Self {
                token: Some(token.to_string()),
                reject_credentials: false,
                institution_ok: true,
                user_ok: true,
                lookup_auth: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn record_auth(&self, headers: &HeaderMap) {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(String::from);
            self.lookup_auth.lock().unwrap().push(auth);
        }

        fn router(self) -> Router {
            let sign_in = self.clone();
            let inst = self.clone();
            let user = self;
            Router::new()
                .route(
                    "/auth",
                    post(move || async move {
                        if sign_in.reject_credentials {
                            return StatusCode::UNAUTHORIZED.into_response();
                        }
                        Json(json!({ "jwtToken": sign_in.token })).into_response()
                    }),
                )
                .route(
                    "/auth/institution",
                    get(move |headers: HeaderMap| async move {
                        inst.record_auth(&headers);
                        if !inst.institution_ok {
                            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                        }
                        Json(json!({
                            "id": "inst-1",
                            "name": "Labor Berlin",
                            "institutionType": "LABORATORY",
                            "users": [
                                { "username": "admin", "authorities": [
                                    { "authority": "ROLE_LABORATORY" },
                                    { "authority": "USER_ROLE_ADMIN" }
                                ] },
                                { "username": "tech", "authorities": [
                                    { "authority": "ROLE_LABORATORY" }
                                ] },
                                { "username": "legacy" }
                            ]
                        }))
                        .into_response()
                    }),
                )
                .route(
                    "/auth/user",
                    get(move |headers: HeaderMap| async move {
                        user.record_auth(&headers);
                        if !user.user_ok {
                            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
                        }
                        Json(json!({ "id": 1, "username": "admin" })).into_response()
                    }),
                )
        }
    }

    struct Harness {
        store: AuthStore,
        storage: Arc<MemoryStorage>,
        notifier: Arc<RecordingNotifier>,
        lookup_auth: Arc<Mutex<Vec<Option<String>>>>,
    }

    async fn harness(backend: Backend, show_all_views: bool) -> Harness {
        let lookup_auth = backend.lookup_auth.clone();
        let base = test_server::spawn(backend.router()).await;
        let storage = Arc::new(MemoryStorage::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let store = AuthStore::new(
            Arc::new(ApiClient::new(&base)),
            storage.clone(),
            notifier.clone(),
            show_all_views,
        );
        Harness {
            store,
            storage,
            notifier,
            lookup_auth,
        }
    }

    fn valid_token(roles: &[&str]) -> String {
        make_token(&json!({ "sub": "admin", "roles": roles, "exp": now_secs() + 3600 }))
    }

    fn expired_token() -> String {
        make_token(&json!({ "sub": "admin", "roles": ["LABORATORY"], "exp": now_secs() - 60 }))
    }

    // ── Tests ────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_initial_state_is_signed_out() {
        let h = harness(Backend::issuing("unused"), false).await;
        assert!(!h.store.is_authenticated().await);
        assert!(h.store.roles().await.is_empty());
        assert!(h.store.routes().await.is_empty());
        assert!(h.store.institution_users().await.is_empty());
        assert_eq!(h.store.current_route().await, LOGIN_ROUTE);
    }

    #[tokio::test]
    async fn test_login_stores_token_and_loads_session() {
        let token = valid_token(&["LABORATORY"]);
        let h = harness(Backend::issuing(&token), false).await;

        assert!(h.store.login("admin", "pw").await.unwrap());

        assert!(h.store.is_authenticated().await);
        assert_eq!(h.store.roles().await, vec![InstitutionType::Laboratory]);
        assert_eq!(h.storage.get(TOKEN_KEY).unwrap(), Some(token.clone()));
        assert_eq!(h.store.current_route().await, APP_ROUTE);
        assert!(h.store.api().has_bearer_token().await);

        let inst = h.store.institution().await.unwrap();
        assert_eq!(inst.id.as_deref(), Some("inst-1"));
        let user = h.store.user().await.unwrap();
        assert_eq!(user.username.as_deref(), Some("admin"));

        // both lookups carried the new bearer token
        let expected = Some(format!("Bearer {}", token));
        let seen = h.lookup_auth.lock().unwrap().clone();
        assert_eq!(seen, vec![expected.clone(), expected]);
        assert!(h.notifier.take().is_empty());
    }

    #[tokio::test]
    async fn test_login_without_token_changes_nothing() {
        let mut backend = Backend::issuing("");
        backend.token = None;
        let h = harness(backend, false).await;

        assert!(!h.store.login("admin", "pw").await.unwrap());
        assert!(!h.store.is_authenticated().await);
        assert!(h.storage.is_empty());
        assert_eq!(h.store.current_route().await, LOGIN_ROUTE);
        assert!(h.lookup_auth.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_login_rejected_returns_status() {
        let mut backend = Backend::issuing("unused");
        backend.reject_credentials = true;
        let h = harness(backend, false).await;

        let err = h.store.login("admin", "wrong").await.unwrap_err();
        match err {
            AuthError::Api(api_err) => {
                assert_eq!(api_err.status(), Some(StatusCode::UNAUTHORIZED))
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!h.store.is_authenticated().await);
        assert!(h.storage.is_empty());
    }

    #[tokio::test]
    async fn test_login_with_undecodable_token_fails() {
        let h = harness(Backend::issuing("garbage"), false).await;

        let err = h.store.login("admin", "pw").await.unwrap_err();
        assert!(matches!(err, AuthError::Jwt(JwtError::Format)));
        assert!(!h.store.is_authenticated().await);
        assert!(h.storage.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failures_notify_but_keep_session() {
        let token = valid_token(&["CLINIC"]);
        let mut backend = Backend::issuing(&token);
        backend.institution_ok = false;
        backend.user_ok = false;
        let h = harness(backend, false).await;

        assert!(h.store.login("admin", "pw").await.unwrap());
        assert!(h.store.is_authenticated().await);
        assert!(h.store.institution().await.is_none());
        assert!(h.store.user().await.is_none());

        let mut descriptions: Vec<String> = h
            .notifier
            .take()
            .into_iter()
            .inspect(|n| assert_eq!(n.level, Level::Error))
            .map(|n| n.description)
            .collect();
        descriptions.sort();
        assert_eq!(
            descriptions,
            vec![INSTITUTION_FAILED_DESCRIPTION, USER_FAILED_DESCRIPTION]
        );
    }

    #[tokio::test]
    async fn test_logout_clears_everything() {
        let token = valid_token(&["LABORATORY"]);
        let h = harness(Backend::issuing(&token), false).await;
        h.storage.set("locale", "de").unwrap();
        h.store.login("admin", "pw").await.unwrap();

        h.store.logout().await.unwrap();

        assert!(!h.store.is_authenticated().await);
        assert!(h.store.claims().await.is_none());
        assert!(h.store.user().await.is_none());
        assert!(h.store.institution().await.is_none());
        assert!(h.storage.is_empty());
        assert!(!h.store.api().has_bearer_token().await);
        assert_eq!(h.store.current_route().await, LOGIN_ROUTE);
    }

    #[tokio::test]
    async fn test_init_restores_valid_session() {
        let token = valid_token(&["GOVERNMENT_AGENCY"]);
        let h = harness(Backend::issuing("unused"), false).await;
        h.storage.set(TOKEN_KEY, &token).unwrap();

        assert!(h.store.init().await.unwrap());
        assert!(h.store.is_authenticated().await);
        assert_eq!(h.store.roles().await, vec![InstitutionType::GovernmentAgency]);
        assert!(h.store.institution().await.is_some());
        assert_eq!(h.storage.get(TOKEN_KEY).unwrap(), Some(token));
        assert!(h.notifier.take().is_empty());
    }

    #[tokio::test]
    async fn test_init_with_expired_token_notifies_and_clears() {
        let h = harness(Backend::issuing("unused"), false).await;
        h.storage.set(TOKEN_KEY, &expired_token()).unwrap();

        assert!(!h.store.init().await.unwrap());
        assert!(!h.store.is_authenticated().await);
        assert!(h.storage.is_empty());
        assert!(h.lookup_auth.lock().unwrap().is_empty());
        assert_eq!(
            h.notifier.take(),
            vec![Notification::info(
                SESSION_EXPIRED_MESSAGE,
                SESSION_EXPIRED_DESCRIPTION
            )]
        );
    }

    #[tokio::test]
    async fn test_init_with_token_without_exp_notifies_and_clears() {
        let h = harness(Backend::issuing("unused"), false).await;
        let token = make_token(&json!({ "sub": "admin", "roles": ["LABORATORY"] }));
        h.storage.set(TOKEN_KEY, &token).unwrap();

        assert!(!h.store.init().await.unwrap());
        assert!(!h.store.is_authenticated().await);
        assert!(h.storage.is_empty());
        assert_eq!(
            h.notifier.take(),
            vec![Notification::info(
                SESSION_EXPIRED_MESSAGE,
                SESSION_EXPIRED_DESCRIPTION
            )]
        );
    }

    #[tokio::test]
    async fn test_init_with_garbage_token_clears_silently() {
        let h = harness(Backend::issuing("unused"), false).await;
        h.storage.set(TOKEN_KEY, "garbage").unwrap();

        assert!(!h.store.init().await.unwrap());
        assert!(h.storage.is_empty());
        assert!(h.notifier.take().is_empty());
    }

    #[tokio::test]
    async fn test_init_without_token_is_noop() {
        let h = harness(Backend::issuing("unused"), false).await;
        assert!(!h.store.init().await.unwrap());
        assert!(!h.store.is_authenticated().await);
        assert!(h.notifier.take().is_empty());
    }

    #[tokio::test]
    async fn test_routes_follow_roles() {
        let token = valid_token(&["ROLE_LABORATORY"]);
        let h = harness(Backend::issuing(&token), false).await;
        h.store.login("admin", "pw").await.unwrap();

        let names: Vec<&str> = h.store.routes().await.iter().map(|r| r.name).collect();
        assert!(names.contains(&"submit-test-result"));
        assert!(!names.contains(&"register-patient"));
    }

    #[tokio::test]
    async fn test_show_all_views_ignores_roles() {
        let h = harness(Backend::issuing("unused"), true).await;
        assert_eq!(
            h.store.routes().await.len(),
            routes::navigation_routes().len()
        );
    }

    #[tokio::test]
    async fn test_institution_users_derive_role() {
        let token = valid_token(&["LABORATORY"]);
        let h = harness(Backend::issuing(&token), false).await;
        h.store.login("admin", "pw").await.unwrap();

        let users = h.store.institution_users().await;
        let roles: Vec<(&str, &str)> = users
            .iter()
            .map(|u| (u.user.username.as_deref().unwrap(), u.role.as_str()))
            .collect();
        assert_eq!(
            roles,
            vec![("admin", "USER_ROLE_ADMIN"), ("tech", ""), ("legacy", "")]
        );
    }

    #[test]
    fn test_institution_user_serializes_flat() {
        let user = User {
            username: Some("admin".into()),
            authorities: Some(vec![
                Authority { authority: "ROLE_CLINIC".into() },
                Authority { authority: "USER_ROLE_REGULAR".into() },
            ]),
            ..Default::default()
        };
        let value = serde_json::to_value(InstitutionUser::from(&user)).unwrap();
        assert_eq!(value["username"], "admin");
        assert_eq!(value["role"], "USER_ROLE_REGULAR");
    }

    #[tokio::test]
    async fn test_login_success_rejects_bad_token_without_side_effects() {
        let h = harness(Backend::issuing("unused"), false).await;
        assert!(h.store.login_success("a.b").await.is_err());
        assert!(!h.store.is_authenticated().await);
        assert!(!h.store.api().has_bearer_token().await);
    }
}
