//! In-process stand-in for the clinic REST API.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::net::TcpListener;

pub const GOOD_TOKEN: &str = "good-token";

/// Id whose mutations always fail with a 500.
pub const FAILING_ID: &str = "500";

pub struct ApiState {
    pub queue: Mutex<Vec<Value>>,
    pub requests: Mutex<Vec<String>>,
}

impl ApiState {
    fn new() -> Self {
        Self {
            queue: Mutex::new(default_queue()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, line: String) {
        self.requests.lock().push(line);
    }
}

pub fn default_queue() -> Vec<Value> {
    vec![
        json!({
            "id": 41, "patientName": "Alice", "doctorName": "Dr. Rao", "doctorId": 3,
            "shiftTime": "MORNING", "queueNo": 1, "patientPhoneNumber": "9876543210",
            "patientReached": "false", "time": "09:00"
        }),
        json!({
            "id": 42, "patientName": "Bob", "doctorName": "Dr. Rao", "doctorId": 3,
            "shiftTime": "MORNING", "queueNo": 2, "patientPhoneNumber": "9876543211",
            "patientReached": "false", "time": "09:10"
        }),
        json!({
            "id": 43, "patientName": "Alicia", "doctorName": "Dr. Sen", "doctorId": 4,
            "shiftTime": "EVENING", "queueNo": 1, "patientPhoneNumber": "9876543212",
            "patientReached": "true", "time": "18:00"
        }),
        json!({
            "id": 500, "patientName": "Zed", "doctorName": "Dr. Sen", "doctorId": 4,
            "shiftTime": "EVENING", "queueNo": 2, "patientPhoneNumber": "9876543213",
            "patientReached": "false", "time": "18:10"
        }),
    ]
}

pub struct FakeApi {
    pub base_url: String,
    pub state: Arc<ApiState>,
}

impl FakeApi {
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }
}

type ApiResult = Result<Response, (StatusCode, Json<Value>)>;

fn reject(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "message": message })))
}

fn check_auth(headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let expected = format!("Bearer {GOOD_TOKEN}");
    match headers.get(header::AUTHORIZATION) {
        Some(value) if value.as_bytes() == expected.as_bytes() => Ok(()),
        _ => Err(reject(StatusCode::UNAUTHORIZED, "invalid token")),
    }
}

async fn login(State(state): State<Arc<ApiState>>, Json(body): Json<Value>) -> ApiResult {
    state.record("POST /auth/login".to_string());
    if body["password"] == "pw" {
        Ok(Json(json!({ "token": GOOD_TOKEN })).into_response())
    } else {
        Err(reject(StatusCode::UNAUTHORIZED, "Invalid credentials"))
    }
}

async fn validate(State(state): State<Arc<ApiState>>, headers: HeaderMap) -> ApiResult {
    state.record("GET /auth/validate".to_string());
    check_auth(&headers)?;
    Ok(Json(json!({ "username": "desk", "role": "STAFF", "clinicId": 7 })).into_response())
}

async fn queue_details(State(state): State<Arc<ApiState>>, headers: HeaderMap) -> ApiResult {
    state.record("GET /api/queue/details".to_string());
    check_auth(&headers)?;
    Ok(Json(Value::Array(state.queue.lock().clone())).into_response())
}

async fn doctor_queue(
    State(state): State<Arc<ApiState>>,
    Path((clinic, doctor)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult {
    state.record(format!("GET /api/queue/details/{clinic}/{doctor}"));
    check_auth(&headers)?;
    let rows: Vec<Value> = state
        .queue
        .lock()
        .iter()
        .filter(|e| e["doctorId"].to_string() == doctor)
        .cloned()
        .collect();
    Ok(Json(Value::Array(rows)).into_response())
}

async fn queue_action(
    State(state): State<Arc<ApiState>>,
    Path((action, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> ApiResult {
    state.record(format!("PUT /api/queue/{action}/{id}"));
    check_auth(&headers)?;
    if id == FAILING_ID {
        return Err(reject(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable"));
    }

    let mut queue = state.queue.lock();
    let pos = queue
        .iter()
        .position(|e| e["id"].to_string() == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "no such entry"))?;
    match action.as_str() {
        "patientReached" => queue[pos]["patientReached"] = json!("true"),
        "patientDelete" | "cancel" | "visitDone" => {
            queue.remove(pos);
        }
        _ => return Err(reject(StatusCode::NOT_FOUND, "unknown action")),
    }
    Ok(StatusCode::OK.into_response())
}

async fn doctor_options(State(state): State<Arc<ApiState>>, headers: HeaderMap) -> ApiResult {
    state.record("GET /api/doctor-clinic".to_string());
    check_auth(&headers)?;
    Ok(Json(json!([
        { "doctorId": 3, "doctorName": "Dr. Rao" },
        { "doctorId": 4, "doctorName": "Dr. Sen" }
    ]))
    .into_response())
}

async fn list_clinics(State(state): State<Arc<ApiState>>, headers: HeaderMap) -> ApiResult {
    state.record("GET /api/clinic".to_string());
    check_auth(&headers)?;
    Ok(Json(json!([])).into_response())
}

async fn create_clinic(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> ApiResult {
    state.record("POST /api/clinic".to_string());
    check_auth(&headers)?;
    body["id"] = json!(1);
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

async fn create_absence(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> ApiResult {
    state.record("POST /api/doctor-absence".to_string());
    check_auth(&headers)?;
    body["id"] = json!(9);
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/validate", get(validate))
        .route("/api/queue/details", get(queue_details))
        .route("/api/queue/details/{clinic}/{doctor}", get(doctor_queue))
        .route("/api/queue/{action}/{id}", put(queue_action))
        .route("/api/doctor-clinic", get(doctor_options))
        .route("/api/clinic", get(list_clinics).post(create_clinic))
        .route("/api/doctor-absence", post(create_absence))
        .with_state(state)
}

/// Start the fake API on an ephemeral local port.
pub async fn spawn_fake_api() -> FakeApi {
    let state = Arc::new(ApiState::new());
    let app = router(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake API");
    let addr = listener.local_addr().expect("Failed to read fake API address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake API crashed");
    });

    FakeApi {
        base_url: format!("http://{addr}"),
        state,
    }
}
