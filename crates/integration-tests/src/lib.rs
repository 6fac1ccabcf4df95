//! Integration tests for the parish client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p parish-integration-tests
//! ```
//!
//! No external services are needed: [`FakeBackend`] serves the parish REST
//! API in-process on an ephemeral port, with bearer-token auth, role
//! checks, per-user donation scoping, and an inspectable request log.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::{Path, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parish_client::{ClientConfig, MemorySessionStore, ParishClient, SessionStore};
use parish_core::Role;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Collections served, with the fields a create must carry.
const COLLECTIONS: &[(&str, &[&str])] = &[
    ("members", &["name"]),
    ("events", &["name", "date"]),
    ("donations", &["amount"]),
    ("sacraments", &["member_id", "type"]),
    ("districts", &["name"]),
    ("announcements", &["title", "message"]),
    ("attendance", &["event_id", "member_id"]),
];

/// Collections only admins may touch at all.
const ADMIN_ONLY: &[&str] = &["members", "districts"];

/// Collections only admins may modify.
const ADMIN_WRITE: &[&str] = &["members", "districts", "announcements"];

/// One request as the backend saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
}

#[derive(Debug, Clone)]
struct Account {
    id: i32,
    name: String,
    email: String,
    password: String,
    role: Role,
    member_id: Option<i32>,
}

impl Account {
    fn to_json(&self) -> Value {
        let mut user = json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "role": self.role.as_str(),
        });
        if let Some(member_id) = self.member_id {
            user["member_id"] = json!(member_id);
        }
        user
    }
}

#[derive(Default)]
struct BackendData {
    accounts: Vec<Account>,
    tokens: HashMap<String, i32>,
    issued: u64,
    collections: HashMap<String, Vec<Value>>,
    next_id: i32,
    claim_codes: HashMap<String, i32>,
    requests: Vec<RecordedRequest>,
}

impl BackendData {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

type Shared = Arc<Mutex<BackendData>>;

fn lock(shared: &Shared) -> MutexGuard<'_, BackendData> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process parish backend.
pub struct FakeBackend {
    addr: SocketAddr,
    data: Shared,
    server: JoinHandle<()>,
}

impl FakeBackend {
    /// Bind to `127.0.0.1:0` and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    #[allow(clippy::expect_used)]
    pub async fn start() -> Self {
        let data: Shared = Arc::new(Mutex::new(BackendData::default()));
        {
            let mut guard = lock(&data);
            for (name, _) in COLLECTIONS {
                guard.collections.insert((*name).to_string(), Vec::new());
            }
        }

        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/register", post(register))
            .route("/auth/me", get(me))
            .route("/auth/link", post(link))
            .route("/{collection}/", get(list).post(create))
            .route(
                "/{collection}/{id}",
                get(show).put(update).delete(remove),
            )
            .layer(middleware::from_fn_with_state(data.clone(), record))
            .with_state(data.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Listener has no address");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, data, server }
    }

    /// Base URL of the backend, with trailing slash.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Client configuration pointing at this backend.
    ///
    /// # Panics
    ///
    /// Panics if the URL is rejected, which cannot happen for a bound address.
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&self.url(), "unused-session.json").expect("valid backend URL")
    }

    /// Client with an in-memory session store.
    pub async fn client(&self) -> ParishClient {
        self.client_with_store(MemorySessionStore::new()).await
    }

    /// Client with the given session store.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[allow(clippy::expect_used)]
    pub async fn client_with_store(&self, store: impl SessionStore) -> ParishClient {
        ParishClient::with_store(&self.config(), store)
            .await
            .expect("client starts")
    }

    /// Add an account. Returns its user ID.
    pub fn add_account(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: Role,
        member_id: Option<i32>,
    ) -> i32 {
        let mut data = lock(&self.data);
        let id = data.next_id();
        data.accounts.push(Account {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role,
            member_id,
        });
        id
    }

    /// Insert a record directly. Returns its ID.
    pub fn seed(&self, collection: &str, mut record: Value) -> i32 {
        let mut data = lock(&self.data);
        let id = data.next_id();
        record["id"] = json!(id);
        data.collections
            .entry(collection.to_string())
            .or_default()
            .push(record);
        id
    }

    /// Register a claim code for a member record.
    pub fn add_claim_code(&self, code: &str, member_id: i32) {
        lock(&self.data)
            .claim_codes
            .insert(code.to_string(), member_id);
    }

    /// Invalidate every issued token, as if they all expired.
    pub fn revoke_tokens(&self) {
        lock(&self.data).tokens.clear();
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.data).requests.clone()
    }

    /// Records currently stored in `collection`.
    #[must_use]
    pub fn records(&self, collection: &str) -> Vec<Value> {
        lock(&self.data)
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }
}

impl Drop for FakeBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Middleware and helpers
// =============================================================================

async fn record(State(data): State<Shared>, request: Request, next: Next) -> Response {
    let entry = RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        authorization: request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    };
    lock(&data).requests.push(entry);
    next.run(request).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Resolve the bearer token to an account.
fn caller(data: &BackendData, headers: &HeaderMap) -> Result<Account, Response> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Authorization required"))?;

    let user_id = data
        .tokens
        .get(token)
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Token has expired"))?;

    data.accounts
        .iter()
        .find(|a| a.id == *user_id)
        .cloned()
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Unknown user"))
}

fn known(collection: &str) -> Result<&'static [&'static str], Response> {
    COLLECTIONS
        .iter()
        .find(|(name, _)| *name == collection)
        .map(|(_, required)| *required)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Not found"))
}

fn check_access(account: &Account, collection: &str, write: bool) -> Result<(), Response> {
    let admin_needed = ADMIN_ONLY.contains(&collection)
        || (write && ADMIN_WRITE.contains(&collection));
    if admin_needed && account.role != Role::Admin {
        return Err(error(StatusCode::FORBIDDEN, "Admin access required"));
    }
    Ok(())
}

/// Whether `record` in `collection` is visible to `account`.
fn visible(account: &Account, collection: &str, record: &Value) -> bool {
    if account.role == Role::Admin || collection != "donations" {
        return true;
    }
    record.get("user_id").and_then(Value::as_i64) == Some(i64::from(account.id))
}

// =============================================================================
// Auth handlers
// =============================================================================

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(data): State<Shared>, Json(body): Json<LoginBody>) -> Response {
    let mut data = lock(&data);
    let Some(account) = data
        .accounts
        .iter()
        .find(|a| a.email.eq_ignore_ascii_case(&body.email) && a.password == body.password)
        .cloned()
    else {
        return error(StatusCode::UNAUTHORIZED, "Invalid email or password");
    };

    data.issued += 1;
    let token = format!("token-{}-{}", account.id, data.issued);
    data.tokens.insert(token.clone(), account.id);

    Json(json!({ "access_token": token, "user": account.to_json() })).into_response()
}

#[derive(Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    password: String,
    #[serde(default)]
    claim_code: Option<String>,
}

async fn register(State(data): State<Shared>, Json(body): Json<RegisterBody>) -> Response {
    let mut data = lock(&data);
    if body.name.is_empty() || body.email.is_empty() || body.password.is_empty() {
        return error(StatusCode::BAD_REQUEST, "Missing required fields");
    }
    if data
        .accounts
        .iter()
        .any(|a| a.email.eq_ignore_ascii_case(&body.email))
    {
        return error(StatusCode::CONFLICT, "User already exists");
    }

    let member_id = match body.claim_code {
        Some(code) => match data.claim_codes.remove(&code) {
            Some(member_id) => Some(member_id),
            None => return error(StatusCode::BAD_REQUEST, "Invalid claim code"),
        },
        None => None,
    };

    let id = data.next_id();
    data.accounts.push(Account {
        id,
        name: body.name,
        email: body.email,
        password: body.password,
        role: Role::Member,
        member_id,
    });

    (
        StatusCode::CREATED,
        Json(json!({ "message": "User registered", "user_id": id, "member_id": member_id })),
    )
        .into_response()
}

async fn me(State(data): State<Shared>, headers: HeaderMap) -> Response {
    let data = lock(&data);
    match caller(&data, &headers) {
        Ok(account) => Json(account.to_json()).into_response(),
        Err(response) => response,
    }
}

#[derive(Deserialize)]
struct LinkBody {
    claim_code: String,
}

async fn link(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<LinkBody>,
) -> Response {
    let mut data = lock(&data);
    let account = match caller(&data, &headers) {
        Ok(account) => account,
        Err(response) => return response,
    };
    if account.member_id.is_some() {
        return error(StatusCode::BAD_REQUEST, "Profile already linked");
    }
    let Some(member_id) = data.claim_codes.remove(&body.claim_code) else {
        return error(StatusCode::NOT_FOUND, "Invalid claim code");
    };

    if let Some(stored) = data.accounts.iter_mut().find(|a| a.id == account.id) {
        stored.member_id = Some(member_id);
    }
    Json(json!({ "message": "Profile linked", "member_id": member_id })).into_response()
}

// =============================================================================
// Collection handlers
// =============================================================================

async fn list(
    State(data): State<Shared>,
    Path(collection): Path<String>,
    headers: HeaderMap,
) -> Response {
    let data = lock(&data);
    let account = match caller(&data, &headers) {
        Ok(account) => account,
        Err(response) => return response,
    };
    if let Err(response) = known(&collection).and_then(|_| check_access(&account, &collection, false)) {
        return response;
    }

    let records: Vec<Value> = data
        .collections
        .get(&collection)
        .map(|records| {
            records
                .iter()
                .filter(|r| visible(&account, &collection, r))
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    Json(records).into_response()
}

async fn show(
    State(data): State<Shared>,
    Path((collection, id)): Path<(String, i64)>,
    headers: HeaderMap,
) -> Response {
    let data = lock(&data);
    let account = match caller(&data, &headers) {
        Ok(account) => account,
        Err(response) => return response,
    };
    if let Err(response) = known(&collection).and_then(|_| check_access(&account, &collection, false)) {
        return response;
    }

    data.collections
        .get(&collection)
        .and_then(|records| {
            records.iter().find(|r| {
                r.get("id").and_then(Value::as_i64) == Some(id) && visible(&account, &collection, r)
            })
        })
        .map_or_else(
            || error(StatusCode::NOT_FOUND, "Record not found"),
            |record| Json(record.clone()).into_response(),
        )
}

async fn create(
    State(data): State<Shared>,
    Path(collection): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut data = lock(&data);
    let account = match caller(&data, &headers) {
        Ok(account) => account,
        Err(response) => return response,
    };
    let required = match known(&collection) {
        Ok(required) => required,
        Err(response) => return response,
    };
    if let Err(response) = check_access(&account, &collection, true) {
        return response;
    }

    let Value::Object(mut record) = body else {
        return error(StatusCode::BAD_REQUEST, "Expected a JSON object");
    };
    if required.iter().any(|field| !record.contains_key(*field)) {
        return error(StatusCode::BAD_REQUEST, "Missing required fields");
    }

    match collection.as_str() {
        "donations" => {
            record.insert("user_id".into(), json!(account.id));
            if account.role != Role::Admin {
                record.insert("member_id".into(), json!(account.member_id));
            }
        }
        "announcements" => {
            record
                .entry("category")
                .or_insert_with(|| json!("general"));
            record.insert("publish_date".into(), json!("2025-01-01T00:00:00"));
        }
        _ => {}
    }

    let id = data.next_id();
    record.insert("id".into(), json!(id));
    data.collections
        .entry(collection)
        .or_default()
        .push(Value::Object(record));

    (
        StatusCode::CREATED,
        Json(json!({ "message": "Created", "id": id })),
    )
        .into_response()
}

async fn update(
    State(data): State<Shared>,
    Path((collection, id)): Path<(String, i64)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut data = lock(&data);
    let account = match caller(&data, &headers) {
        Ok(account) => account,
        Err(response) => return response,
    };
    if let Err(response) = known(&collection).and_then(|_| check_access(&account, &collection, true)) {
        return response;
    }
    let Value::Object(changes) = body else {
        return error(StatusCode::BAD_REQUEST, "Expected a JSON object");
    };

    let Some(record) = data.collections.get_mut(&collection).and_then(|records| {
        records.iter_mut().find(|r| {
            r.get("id").and_then(Value::as_i64) == Some(id) && visible(&account, &collection, r)
        })
    }) else {
        return error(StatusCode::NOT_FOUND, "Record not found");
    };

    if let Value::Object(stored) = record {
        for (key, value) in changes {
            if key != "id" {
                stored.insert(key, value);
            }
        }
    }
    Json(json!({ "message": "Updated" })).into_response()
}

async fn remove(
    State(data): State<Shared>,
    Path((collection, id)): Path<(String, i64)>,
    headers: HeaderMap,
) -> Response {
    let mut data = lock(&data);
    let account = match caller(&data, &headers) {
        Ok(account) => account,
        Err(response) => return response,
    };
    if let Err(response) = known(&collection).and_then(|_| check_access(&account, &collection, true)) {
        return response;
    }

    let Some(records) = data.collections.get_mut(&collection) else {
        return error(StatusCode::NOT_FOUND, "Record not found");
    };
    let before = records.len();
    records.retain(|r| {
        !(r.get("id").and_then(Value::as_i64) == Some(id) && visible(&account, &collection, r))
    });
    if records.len() == before {
        return error(StatusCode::NOT_FOUND, "Record not found");
    }
    Json(json!({ "message": "Deleted" })).into_response()
}
