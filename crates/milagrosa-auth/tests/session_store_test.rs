//! Integration tests for the session store.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header};
use milagrosa_auth::{AuthConfig, SessionStore, capability, navigation, role, token};
use milagrosa_core::error::{MilagrosaError, MilagrosaResult};
use milagrosa_core::gateway::{AuthApi, AuthResponse, TokenStorage};
use milagrosa_core::models::role::Role;
use milagrosa_core::models::section::Section;
use milagrosa_core::models::user::{Credentials, RegistrationRequest};
use parking_lot::Mutex;
use serde_json::json;

fn mint(sub: &str, authorities: &[&str], exp_offset: i64) -> String {
    let now = Utc::now().timestamp();
    jsonwebtoken::encode(
        &Header::default(),
        &json!({
            "sub": sub,
            "authorities": authorities,
            "iat": now,
            "exp": now + exp_offset,
        }),
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .unwrap()
}

#[derive(Default)]
struct MemStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemStorage {
    fn with_token(token: &str) -> Arc<Self> {
        let storage = Arc::new(Self::default());
        storage.set("authToken", token).unwrap();
        storage
    }

    fn value(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }
}

impl TokenStorage for MemStorage {
    fn get(&self, key: &str) -> MilagrosaResult<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> MilagrosaResult<()> {
        self.values.lock().insert(key.into(), value.into());
        Ok(())
    }

    fn remove(&self, key: &str) -> MilagrosaResult<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// Accounts keyed by e-mail: (password, token to hand out).
#[derive(Default)]
struct FakeAuthApi {
    accounts: HashMap<String, (String, String)>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    registrations: AtomicUsize,
}

impl FakeAuthApi {
    fn with_account(email: &str, password: &str, token: String) -> Self {
        let mut api = Self::default();
        api.accounts.insert(email.into(), (password.into(), token));
        api
    }

    fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

impl AuthApi for FakeAuthApi {
    async fn authenticate(&self, credentials: &Credentials) -> MilagrosaResult<AuthResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match self.accounts.get(&credentials.email) {
            Some((password, token)) if *password == credentials.password => Ok(AuthResponse {
                token: token.clone(),
            }),
            _ => Err(MilagrosaError::AuthenticationFailed {
                reason: "bad credentials".into(),
            }),
        }
    }

    async fn register(&self, request: &RegistrationRequest) -> MilagrosaResult<bool> {
        self.registrations.fetch_add(1, Ordering::SeqCst);
        Ok(!self.accounts.contains_key(&request.email))
    }
}

fn new_store(
    api: FakeAuthApi,
    storage: Arc<MemStorage>,
) -> SessionStore<FakeAuthApi, Arc<MemStorage>> {
    SessionStore::new(api, storage, AuthConfig::default())
}

fn creds(email: &str, password: &str) -> Credentials {
    Credentials::new(email, password)
}

// -----------------------------------------------------------------------
// init
// -----------------------------------------------------------------------

#[test]
fn init_restores_session_from_persisted_token() {
    let jwt = mint("admin@salsamentaria.com", &["ROLE_ADMIN"], 3600);
    let storage = MemStorage::with_token(&jwt);
    let store = new_store(FakeAuthApi::default(), storage.clone());

    store.init();
    let session = store.current().expect("session restored");

    let claims = token::decode(&jwt).unwrap();
    assert_eq!(session.role, role::resolve_role(&claims.authorities).unwrap());
    assert_eq!(session.role, Role::Admin);
    assert_eq!(session.identity, "admin@salsamentaria.com");
    assert_eq!(store.bearer_token().as_deref(), Some(jwt.as_str()));
    assert_eq!(
        storage.value("userEmail").as_deref(),
        Some("admin@salsamentaria.com")
    );
}

#[test]
fn init_without_token_is_empty() {
    let store = new_store(FakeAuthApi::default(), Arc::new(MemStorage::default()));
    assert!(store.init().is_none());
    assert!(store.current().is_none());
    assert!(store.bearer_token().is_none());
}

#[test]
fn init_with_corrupt_token_clears_storage() {
    let storage = MemStorage::with_token("definitely.not-a.jwt");
    storage.set("currentUser", "{}").unwrap();
    let store = new_store(FakeAuthApi::default(), storage.clone());

    assert!(store.init().is_none());
    assert!(storage.value("authToken").is_none());
    assert!(storage.value("currentUser").is_none());
}

#[test]
fn init_with_expired_token_clears_storage() {
    let storage = MemStorage::with_token(&mint("e@x.co", &["EMPLOYEE"], -3600));
    let store = new_store(FakeAuthApi::default(), storage.clone());

    assert!(store.init().is_none());
    assert!(storage.value("authToken").is_none());
}

#[test]
fn expiry_check_can_be_disabled() {
    let storage = MemStorage::with_token(&mint("e@x.co", &["EMPLOYEE"], -3600));
    let config = AuthConfig {
        enforce_expiry: false,
        ..Default::default()
    };
    let store = SessionStore::new(FakeAuthApi::default(), storage, config);

    assert_eq!(store.init().map(|s| s.role), Some(Role::Employee));
}

#[test]
fn init_with_no_authorities_clears_storage() {
    let storage = MemStorage::with_token(&mint("c@x.co", &[], 3600));
    let store = new_store(FakeAuthApi::default(), storage.clone());

    assert!(store.init().is_none());
    assert!(storage.value("authToken").is_none());
}

#[test]
fn init_runs_once() {
    let storage = Arc::new(MemStorage::default());
    let store = new_store(FakeAuthApi::default(), storage.clone());
    assert!(store.init().is_none());

    storage
        .set("authToken", &mint("late@x.co", &["ADMIN"], 3600))
        .unwrap();
    assert!(store.init().is_none());
    assert!(store.current().is_none());
}

// -----------------------------------------------------------------------
// login / logout
// -----------------------------------------------------------------------

#[tokio::test]
async fn login_resolves_highest_role_and_staff_navigation() {
    let jwt = mint("boss@x.co", &["EMPLOYEE", "ADMIN"], 3600);
    let storage = Arc::new(MemStorage::default());
    let store = new_store(
        FakeAuthApi::with_account("boss@x.co", "admin123", jwt.clone()),
        storage.clone(),
    );

    let session = store.login(creds("boss@x.co", "admin123")).await.unwrap();

    assert_eq!(session.role, Role::Admin);
    assert_eq!(navigation::project_sections(session.role)[0], Section::Sales);
    assert!(capability::can_manage_catalog(session.role));
    assert_eq!(store.current(), Some(session));
    assert_eq!(storage.value("authToken"), Some(jwt));
    assert!(storage.value("currentUser").unwrap().contains("ADMIN"));
}

#[tokio::test]
async fn login_wrong_password() {
    let storage = Arc::new(MemStorage::default());
    let store = new_store(
        FakeAuthApi::with_account("c@x.co", "cliente123", mint("c@x.co", &["USER"], 3600)),
        storage.clone(),
    );

    let err = store.login(creds("c@x.co", "wrong")).await.unwrap_err();

    assert!(
        matches!(err, MilagrosaError::AuthenticationFailed { .. }),
        "expected AuthenticationFailed, got: {err:?}"
    );
    assert!(store.current().is_none());
    assert!(storage.value("authToken").is_none());
}

#[tokio::test]
async fn login_with_undecodable_token_leaves_store_empty() {
    let storage = Arc::new(MemStorage::default());
    let store = new_store(
        FakeAuthApi::with_account("c@x.co", "pw", "garbage".into()),
        storage.clone(),
    );

    let err = store.login(creds("c@x.co", "pw")).await.unwrap_err();

    assert!(matches!(err, MilagrosaError::InvalidToken { .. }));
    assert!(store.current().is_none());
    assert!(storage.value("authToken").is_none());
}

#[tokio::test]
async fn login_with_roleless_token_fails() {
    let store = new_store(
        FakeAuthApi::with_account("c@x.co", "pw", mint("c@x.co", &[], 3600)),
        Arc::new(MemStorage::default()),
    );

    let err = store.login(creds("c@x.co", "pw")).await.unwrap_err();
    assert!(matches!(err, MilagrosaError::NoAuthorities));
}

#[tokio::test]
async fn logout_then_reload_is_empty() {
    let storage = Arc::new(MemStorage::default());
    let api = FakeAuthApi::with_account("e@x.co", "pw", mint("e@x.co", &["ROLE_EMPLOYEE"], 3600));
    let first = new_store(api, storage.clone());

    first.login(creds("e@x.co", "pw")).await.unwrap();
    first.logout();
    assert!(first.current().is_none());
    assert!(first.bearer_token().is_none());

    // Simulated reload: a fresh store over the same storage.
    let reloaded = new_store(FakeAuthApi::default(), storage.clone());
    assert!(reloaded.init().is_none());
    assert!(storage.value("authToken").is_none());
    assert!(storage.value("userEmail").is_none());
}

#[tokio::test]
async fn logout_is_idempotent() {
    let store = new_store(FakeAuthApi::default(), Arc::new(MemStorage::default()));
    store.logout();
    store.logout();
    assert!(store.current().is_none());
}

#[tokio::test]
async fn expire_clears_like_logout() {
    let storage = MemStorage::with_token(&mint("c@x.co", &["USER"], 3600));
    let store = new_store(FakeAuthApi::default(), storage.clone());
    store.init();
    assert!(store.current().is_some());

    store.expire();

    assert!(store.current().is_none());
    assert!(storage.value("authToken").is_none());
}

#[tokio::test]
async fn rejection_of_replaced_token_keeps_newer_session() {
    let old_jwt = mint("old@x.co", &["EMPLOYEE"], 3600);
    let mut api = FakeAuthApi::with_account("old@x.co", "pw", old_jwt.clone());
    api.accounts
        .insert("new@x.co".into(), ("pw".into(), mint("new@x.co", &["ADMIN"], 3600)));
    let storage = Arc::new(MemStorage::default());
    let store = new_store(api, storage.clone());

    store.login(creds("old@x.co", "pw")).await.unwrap();
    store.logout();
    store.login(creds("new@x.co", "pw")).await.unwrap();

    assert!(!store.expire_token(&old_jwt));
    assert_eq!(store.current().unwrap().identity, "new@x.co");
    assert!(storage.value("authToken").is_some());

    let current = store.bearer_token().unwrap();
    assert!(store.expire_token(&current));
    assert!(store.current().is_none());
    assert!(storage.value("authToken").is_none());
}

#[tokio::test(start_paused = true)]
async fn login_times_out() {
    let api = FakeAuthApi::with_account("c@x.co", "pw", mint("c@x.co", &["USER"], 3600))
        .delayed(Duration::from_secs(60));
    let store = new_store(api, Arc::new(MemStorage::default()));

    let err = store.login(creds("c@x.co", "pw")).await.unwrap_err();

    assert!(matches!(err, MilagrosaError::Timeout { secs: 10 }));
    assert!(store.current().is_none());
}

#[tokio::test(start_paused = true)]
async fn concurrent_login_is_rejected() {
    let api = FakeAuthApi::with_account("c@x.co", "pw", mint("c@x.co", &["USER"], 3600))
        .delayed(Duration::from_secs(1));
    let store = new_store(api, Arc::new(MemStorage::default()));

    let (first, second) = tokio::join!(
        store.login(creds("c@x.co", "pw")),
        store.login(creds("c@x.co", "pw")),
    );

    assert_eq!(first.unwrap().role, Role::User);
    assert!(matches!(
        second.unwrap_err(),
        MilagrosaError::AuthenticationFailed { .. }
    ));

    // The guard is released once the first login completes.
    assert!(store.login(creds("c@x.co", "pw")).await.is_ok());
}

#[tokio::test(start_paused = true)]
async fn logout_during_login_discards_response() {
    let api = FakeAuthApi::with_account("c@x.co", "pw", mint("c@x.co", &["USER"], 3600))
        .delayed(Duration::from_secs(1));
    let storage = Arc::new(MemStorage::default());
    let store = new_store(api, storage.clone());

    let (result, ()) = tokio::join!(store.login(creds("c@x.co", "pw")), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        store.logout();
    });

    assert!(result.is_err());
    assert!(store.current().is_none());
    assert!(storage.value("authToken").is_none());
}

// -----------------------------------------------------------------------
// register
// -----------------------------------------------------------------------

#[tokio::test]
async fn register_validates_before_calling_api() {
    let api = Arc::new(FakeAuthApi::default());
    let store = SessionStore::new(api.clone(), Arc::new(MemStorage::default()), AuthConfig::default());

    let err = store
        .register(RegistrationRequest {
            name: "María".into(),
            email: "maria@example.com".into(),
            password: "short".into(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, MilagrosaError::Validation { .. }));
    assert_eq!(api.registrations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn register_reports_server_answer_without_logging_in() {
    let api = Arc::new(FakeAuthApi::with_account(
        "taken@x.co",
        "pw",
        mint("taken@x.co", &["USER"], 3600),
    ));
    let store = SessionStore::new(api.clone(), Arc::new(MemStorage::default()), AuthConfig::default());

    let fresh = RegistrationRequest {
        name: "Nueva".into(),
        email: "nueva@x.co".into(),
        password: "cliente123".into(),
    };
    assert!(store.register(fresh).await.unwrap());

    let taken = RegistrationRequest {
        name: "Otra".into(),
        email: "taken@x.co".into(),
        password: "cliente123".into(),
    };
    assert!(!store.register(taken).await.unwrap());

    assert!(store.current().is_none());
    assert_eq!(api.calls.load(Ordering::SeqCst), 0);
}
