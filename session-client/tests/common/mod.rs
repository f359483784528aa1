use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration as StdDuration;

use auth::Claims;
use auth::JwtHandler;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use axum::routing::get;
use axum::routing::post;
use axum::Json;
use axum::Router;
use chrono::Duration;
use serde::Deserialize;
use serde_json::json;
use serde_json::Value;
use session_client::outbound::http::HttpAuthApi;
use session_client::outbound::http::MediatorSettings;
use session_client::outbound::http::RequestMediator;
use session_client::outbound::storage::FileTokenStore;
use session_client::session::service::SessionManager;
use tempfile::TempDir;

pub const SECRET: &[u8] = b"integration-test-secret-at-least-32-bytes";
pub const PASSWORD: &str = "pass_word!";

pub type TestSession = SessionManager<FileTokenStore, HttpAuthApi>;

/// Account known to the mock Auth API
#[derive(Clone)]
struct Account {
    id: i64,
    password: String,
    first_name: String,
    last_name: String,
    role: String,
}

/// Shared state of the mock Auth API and its protected resource
pub struct MockAuthState {
    jwt_handler: JwtHandler,
    accounts: Mutex<HashMap<String, Account>>,
    /// Lifetime in seconds of issued access tokens; negative issues expired ones
    pub access_lifetime: AtomicI64,
    pub reject_refresh: AtomicBool,
    /// Upcoming protected-resource calls to refuse regardless of token
    pub resource_rejections: AtomicUsize,
    pub login_hits: AtomicUsize,
    pub refresh_hits: AtomicUsize,
    pub resource_hits: AtomicUsize,
}

/// Test application with a mock Auth API on a random port
pub struct TestApp {
    pub address: String,
    pub state: Arc<MockAuthState>,
    pub storage_dir: TempDir,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginBody {
    username: String,
    password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterBody {
    username: String,
    password: String,
    first_name: String,
    last_name: String,
    role: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshBody {
    refresh_token: String,
}

type Reply = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn reject(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "message": message })))
}

impl MockAuthState {
    fn new() -> Self {
        let mut accounts = HashMap::new();
        accounts.insert(
            "alice".to_string(),
            Account {
                id: 1,
                password: PASSWORD.to_string(),
                first_name: "Alice".to_string(),
                last_name: "Admin".to_string(),
                role: "ADMIN".to_string(),
            },
        );
        accounts.insert(
            "bob".to_string(),
            Account {
                id: 2,
                password: PASSWORD.to_string(),
                first_name: "Bob".to_string(),
                last_name: "User".to_string(),
                role: "USER".to_string(),
            },
        );

        Self {
            jwt_handler: JwtHandler::new(SECRET),
            accounts: Mutex::new(accounts),
            access_lifetime: AtomicI64::new(600),
            reject_refresh: AtomicBool::new(false),
            resource_rejections: AtomicUsize::new(0),
            login_hits: AtomicUsize::new(0),
            refresh_hits: AtomicUsize::new(0),
            resource_hits: AtomicUsize::new(0),
        }
    }

    fn issue(&self, username: &str, account: &Account) -> Value {
        let lifetime = self.access_lifetime.load(Ordering::SeqCst);
        let access = Claims::for_account(
            account.id,
            username,
            &account.role,
            Duration::seconds(lifetime),
        )
        .with_token_id(uuid::Uuid::new_v4())
        .with_extra("firstName", &account.first_name)
        .with_extra("lastName", &account.last_name);
        let refresh = Claims::new()
            .with_subject(username)
            .with_expiration((chrono::Utc::now() + Duration::days(7)).timestamp())
            .with_token_id(uuid::Uuid::new_v4())
            .with_extra("kind", "refresh");

        let access_token = self
            .jwt_handler
            .encode(&access)
            .expect("Failed to encode access token");
        let refresh_token = self
            .jwt_handler
            .encode(&refresh)
            .expect("Failed to encode refresh token");

        json!({
            "accessToken": access_token,
            "refreshToken": refresh_token,
            "expiresIn": lifetime.max(0),
        })
    }

    fn account(&self, username: &str) -> Option<Account> {
        self.accounts.lock().unwrap().get(username).cloned()
    }
}

async fn login(State(state): State<Arc<MockAuthState>>, Json(body): Json<LoginBody>) -> Reply {
    state.login_hits.fetch_add(1, Ordering::SeqCst);

    match state.account(&body.username) {
        Some(account) if account.password == body.password => {
            Ok(Json(state.issue(&body.username, &account)))
        }
        _ => Err(reject(StatusCode::UNAUTHORIZED, "Invalid username or password")),
    }
}

async fn register(
    State(state): State<Arc<MockAuthState>>,
    Json(body): Json<RegisterBody>,
) -> Reply {
    let account = {
        let mut accounts = state.accounts.lock().unwrap();
        if accounts.contains_key(&body.username) {
            return Err(reject(StatusCode::CONFLICT, "Username already exists"));
        }

        let account = Account {
            id: accounts.len() as i64 + 1,
            password: body.password,
            first_name: body.first_name,
            last_name: body.last_name,
            role: body.role.unwrap_or_else(|| "USER".to_string()),
        };
        accounts.insert(body.username.clone(), account.clone());
        account
    };

    Ok(Json(state.issue(&body.username, &account)))
}

async fn refresh_token(
    State(state): State<Arc<MockAuthState>>,
    Json(body): Json<RefreshBody>,
) -> Reply {
    state.refresh_hits.fetch_add(1, Ordering::SeqCst);

    if state.reject_refresh.load(Ordering::SeqCst) {
        return Err(reject(StatusCode::UNAUTHORIZED, "Refresh token revoked"));
    }

    let claims: Claims = state
        .jwt_handler
        .decode(&body.refresh_token)
        .map_err(|_| reject(StatusCode::UNAUTHORIZED, "Invalid refresh token"))?;

    let username = claims.sub.unwrap_or_default();
    match state.account(&username) {
        Some(account) => Ok(Json(state.issue(&username, &account))),
        None => Err(reject(StatusCode::UNAUTHORIZED, "Unknown account")),
    }
}

/// Protected resource: echoes the caller when the bearer token verifies.
async fn me(State(state): State<Arc<MockAuthState>>, headers: HeaderMap) -> Reply {
    state.resource_hits.fetch_add(1, Ordering::SeqCst);

    let revoked = state
        .resource_rejections
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
        .is_ok();
    if revoked {
        return Err(reject(StatusCode::UNAUTHORIZED, "Token revoked"));
    }

    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Missing bearer token"))?;

    let claims: Claims = state
        .jwt_handler
        .decode(token)
        .map_err(|e| reject(StatusCode::UNAUTHORIZED, &e.to_string()))?;

    Ok(Json(json!({ "username": claims.sub })))
}

/// Reports the Authorization header it received, if any.
async fn echo_authorization(headers: HeaderMap) -> Json<Value> {
    let authorization = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    Json(json!({ "authorization": authorization }))
}

impl TestApp {
    /// Spawn the mock Auth API in a background task and return TestApp
    pub async fn spawn() -> Self {
        let state = Arc::new(MockAuthState::new());

        let router = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/auth/refresh-token", post(refresh_token))
            .route("/api/users/me", get(me))
            .route("/api/echo/login", get(echo_authorization))
            .with_state(Arc::clone(&state));

        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        let storage_dir = tempfile::tempdir().expect("Failed to create temp dir");

        Self {
            address,
            state,
            storage_dir,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn store_path(&self) -> PathBuf {
        self.storage_dir.path().join("tokens.json")
    }

    pub fn store(&self) -> Arc<FileTokenStore> {
        Arc::new(FileTokenStore::new(self.store_path()))
    }

    pub fn auth_api(&self) -> Arc<HttpAuthApi> {
        let api = HttpAuthApi::new(self.url("/api/auth"), StdDuration::from_secs(5))
            .expect("Failed to create Auth API client");
        Arc::new(api)
    }

    /// Session manager over this app's store, as a fresh process would build it.
    pub fn session(&self) -> Arc<TestSession> {
        Arc::new(SessionManager::new(self.store(), self.auth_api()))
    }

    pub fn mediator(&self, session: &Arc<TestSession>) -> RequestMediator<TestSession> {
        RequestMediator::new(
            self.auth_api().client().clone(),
            Arc::clone(session),
            MediatorSettings::default(),
        )
    }

    /// Refuse the next `count` protected-resource calls.
    pub fn reject_next_resource_calls(&self, count: usize) {
        self.state.resource_rejections.store(count, Ordering::SeqCst);
    }

    pub fn set_access_lifetime(&self, seconds: i64) {
        self.state.access_lifetime.store(seconds, Ordering::SeqCst);
    }

    pub fn login_hits(&self) -> usize {
        self.state.login_hits.load(Ordering::SeqCst)
    }

    pub fn refresh_hits(&self) -> usize {
        self.state.refresh_hits.load(Ordering::SeqCst)
    }

    pub fn resource_hits(&self) -> usize {
        self.state.resource_hits.load(Ordering::SeqCst)
    }
}
