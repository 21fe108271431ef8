use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
    time::Duration,
};

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const DEFAULT_PER_PAGE: u32 = 6;

const SEED: [(&str, &str); 12] = [
    ("George", "Bluth"),
    ("Janet", "Weaver"),
    ("Emma", "Wong"),
    ("Eve", "Holt"),
    ("Charles", "Morris"),
    ("Tracey", "Ramos"),
    ("Michael", "Lawson"),
    ("Lindsay", "Ferguson"),
    ("Tobias", "Funke"),
    ("Byron", "Fields"),
    ("George", "Edwards"),
    ("Rachel", "Howell"),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Support {
    pub url: String,
    pub text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SingleUser {
    pub data: User,
    pub support: Support,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserPage {
    pub page: u32,
    pub per_page: u32,
    pub total: u32,
    pub total_pages: u32,
    pub data: Vec<User>,
    pub support: Support,
}

#[derive(Deserialize)]
pub struct UserInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub job: String,
}

#[derive(Deserialize)]
pub struct RegisterInput {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    /// Seconds to wait before answering.
    pub delay: Option<u64>,
}

pub type Db = Arc<RwLock<BTreeMap<u32, User>>>;

#[derive(Clone)]
pub struct AppState {
    db: Db,
    next_id: Arc<AtomicU32>,
    api_key: Option<String>,
}

fn seed() -> BTreeMap<u32, User> {
    SEED.iter()
        .zip(1u32..)
        .map(|((first, last), id)| {
            let user = User {
                id,
                email: format!("{}.{}@reqres.in", first.to_lowercase(), last.to_lowercase()),
                first_name: first.to_string(),
                last_name: last.to_string(),
                avatar: format!("https://reqres.in/img/faces/{id}-image.jpg"),
            };
            (id, user)
        })
        .collect()
}

fn support() -> Support {
    Support {
        url: "https://reqres.in/#support-heading".to_string(),
        text: "To keep ReqRes free, contributions towards server costs are appreciated!".to_string(),
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

/// Router with no API key check.
pub fn app() -> Router {
    app_with_api_key(None)
}

/// Router that answers 401 unless `x-api-key` matches `api_key`.
pub fn app_with_api_key(api_key: Option<String>) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(seed())),
        next_id: Arc::new(AtomicU32::new(SEED.len() as u32 + 1)),
        api_key,
    };
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/register", post(register))
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key))
        .with_state(state)
}

pub async fn run(listener: TcpListener, api_key: Option<String>) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_api_key(api_key)).await
}

async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(expected) = &state.api_key {
        let presented = request
            .headers()
            .get("x-api-key")
            .and_then(|v| v.to_str().ok());
        if presented != Some(expected.as_str()) {
            tracing::warn!(path = %request.uri().path(), "rejected request without API key");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Missing API key" })),
            )
                .into_response();
        }
    }
    next.run(request).await
}

async fn list_users(State(state): State<AppState>, Query(params): Query<ListParams>) -> Json<UserPage> {
    if let Some(delay) = params.delay {
        tokio::time::sleep(Duration::from_secs(delay)).await;
    }
    let users = state.db.read().await;
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(DEFAULT_PER_PAGE).max(1);
    let total = users.len() as u32;
    let offset = (page as usize - 1).saturating_mul(per_page as usize);
    let data = users
        .values()
        .skip(offset)
        .take(per_page as usize)
        .cloned()
        .collect();
    Json(UserPage {
        page,
        per_page,
        total,
        total_pages: total.div_ceil(per_page),
        data,
        support: support(),
    })
}

async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let users = state.db.read().await;
    match id.parse::<u32>().ok().and_then(|id| users.get(&id)) {
        Some(user) => Json(SingleUser {
            data: user.clone(),
            support: support(),
        })
        .into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

async fn create_user(State(state): State<AppState>, Json(input): Json<UserInput>) -> (StatusCode, Json<Value>) {
    let id = state.next_id.fetch_add(1, Ordering::SeqCst);
    (
        StatusCode::CREATED,
        Json(json!({
            "name": input.name,
            "job": input.job,
            "id": id.to_string(),
            "createdAt": timestamp(),
        })),
    )
}

async fn update_user(Path(_id): Path<String>, Json(input): Json<UserInput>) -> Json<Value> {
    Json(json!({
        "name": input.name,
        "job": input.job,
        "updatedAt": timestamp(),
    }))
}

async fn delete_user(Path(_id): Path<String>) -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn register(State(state): State<AppState>, Json(input): Json<RegisterInput>) -> Response {
    let identity = input
        .email
        .as_deref()
        .or(input.username.as_deref())
        .filter(|s| !s.is_empty());
    let Some(identity) = identity else {
        return bad_request("Missing email or username");
    };
    if input.password.as_deref().filter(|p| !p.is_empty()).is_none() {
        return bad_request("Missing password");
    }
    let users = state.db.read().await;
    match users.values().find(|u| u.email == identity) {
        Some(user) => {
            let token = Uuid::new_v4().simple().to_string()[..17].to_string();
            Json(json!({ "id": user.id, "token": token })).into_response()
        }
        None => bad_request("Note: Only defined users succeed registration"),
    }
}
