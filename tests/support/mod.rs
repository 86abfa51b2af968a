//! In-process mock of the rental backend (axum on 127.0.0.1:0).
//!
//! Holds JSON rows in memory and records every request so tests can assert
//! what the client sent, including the Authorization header.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use estate_console::config::{AppProfile, ClientConfig};
use estate_console::console::AppContext;
use estate_console::crud::Dialog;
use estate_console::storage::Storage;
use serde_json::{json, Value};
use tokio::net::TcpListener;

pub const ADMIN_TOKEN: &str = "t1";
pub const TENANT_TOKEN: &str = "t2";

#[derive(Debug, Clone, PartialEq)]
pub struct Seen {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct Backend {
    pub towers: Mutex<Vec<Value>>,
    pub units: Mutex<Vec<Value>>,
    pub amenities: Mutex<Vec<Value>>,
    pub bookings: Mutex<Vec<Value>>,
    pub leases: Mutex<Vec<Value>>,
    pub payments: Mutex<Vec<Value>>,
    pub seen: Mutex<Vec<Seen>>,
    next_id: AtomicI64,
}

impl Backend {
    pub fn seeded() -> Self {
        let backend = Self {
            next_id: AtomicI64::new(100),
            ..Self::default()
        };
        *backend.towers.lock().unwrap() = vec![
            json!({"id": 1, "name": "Tower A", "address": "123 Main Street", "total_floors": 15, "unit_count": 3}),
            json!({"id": 2, "name": "Tower B", "address": "456 Park Avenue", "total_floors": 20, "unit_count": 1}),
            json!({"id": 3, "name": "Tower C", "address": "789 Lake Drive", "total_floors": 12, "unit_count": 0}),
        ];
        *backend.units.lock().unwrap() = vec![
            unit(11, 1, "101", "available"),
            unit(12, 1, "201", "occupied"),
            unit(13, 1, "301", "available"),
            unit(21, 2, "1001", "maintenance"),
        ];
        *backend.amenities.lock().unwrap() = vec![
            json!({"id": 1, "name": "Swimming Pool", "availability_hours": "6:00 AM - 10:00 PM", "is_active": true}),
            json!({"id": 2, "name": "Sauna", "is_active": false}),
            json!({"id": 3, "name": "Clubhouse", "is_active": null}),
        ];
        *backend.bookings.lock().unwrap() = vec![
            json!({"id": 7, "user_id": 5, "user_name": "Priya", "unit_id": 11, "unit_number": "101",
                   "tower_name": "Tower A", "requested_move_in_date": "2025-03-01", "lease_duration": 12,
                   "status": "pending"}),
            json!({"id": 8, "user_id": 6, "unit_id": 12, "status": "approved", "admin_comments": "Welcome"}),
        ];
        *backend.leases.lock().unwrap() = vec![json!({
            "id": 1, "booking_id": 8, "user_id": 6, "unit_id": 12,
            "start_date": "2025-01-01", "end_date": "2025-12-31",
            "monthly_rent": 1500.0, "status": "active"
        })];
        *backend.payments.lock().unwrap() = vec![json!({
            "id": 1, "lease_id": 1, "amount": 1500.0, "payment_date": "2025-01-05",
            "payment_method": "bank_transfer", "status": "completed"
        })];
        backend
    }

    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    /// Requests other than the login call.
    pub fn seen_except_login(&self) -> Vec<Seen> {
        self.seen()
            .into_iter()
            .filter(|s| s.path != "/api/auth/login")
            .collect()
    }

    fn record(&self, seen: Seen) {
        self.seen.lock().unwrap().push(seen);
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

pub fn unit(id: i64, tower_id: i64, number: &str, status: &str) -> Value {
    json!({
        "id": id, "tower_id": tower_id, "unit_number": number, "floor": 1,
        "bedrooms": 2, "bathrooms": 1, "size_sqft": 850, "rent_amount": 1500.0,
        "status": status
    })
}

pub struct MockServer {
    pub base_url: String,
    pub backend: Arc<Backend>,
}

/// Start the mock on an ephemeral port; the task lives as long as the runtime.
pub async fn spawn(backend: Backend) -> MockServer {
    let backend = Arc::new(backend);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = router(backend.clone());
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });
    MockServer {
        base_url: format!("http://{addr}/api"),
        backend,
    }
}

/// Server whose `GET /api/stats` answers 500 and drops the connection
/// partway through the error body.
pub async fn spawn_truncating() -> MockServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new().route("/api/stats", get(truncated_error));
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });
    MockServer {
        base_url: format!("http://{addr}/api"),
        backend: Arc::new(Backend::default()),
    }
}

async fn truncated_error() -> Response {
    let chunks = futures::stream::unfold(0u8, |step| async move {
        match step {
            0 => Some((Ok::<_, io::Error>(Bytes::from_static(b"{\"error\": \"Datab")), 1)),
            1 => {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Some((Err(io::Error::other("connection cut")), 2))
            }
            _ => None,
        }
    });
    (StatusCode::INTERNAL_SERVER_ERROR, Body::from_stream(chunks)).into_response()
}

/// Context against the mock with a throwaway session store.
pub fn context(server: &MockServer, profile: AppProfile) -> AppContext {
    let config = ClientConfig {
        api_url: server.base_url.clone(),
        ..ClientConfig::default()
    };
    let storage = Storage::temporary(profile.namespace()).unwrap();
    AppContext::with_storage(profile, config, storage)
}

/// Context whose store already holds `token` (and no identity).
pub fn context_with_token(server: &MockServer, profile: AppProfile, token: &str) -> AppContext {
    let config = ClientConfig {
        api_url: server.base_url.clone(),
        ..ClientConfig::default()
    };
    let storage = Storage::temporary(profile.namespace()).unwrap();
    storage.set_item(profile.token_key(), token).unwrap();
    AppContext::with_storage(profile, config, storage)
}

/// Answers every confirmation with `answer` and keeps the alerts.
pub struct RecordingDialog {
    pub answer: bool,
    pub prompts: RefCell<Vec<String>>,
    pub alerts: RefCell<Vec<String>>,
}

impl RecordingDialog {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: RefCell::new(Vec::new()),
            alerts: RefCell::new(Vec::new()),
        }
    }
}

impl Dialog for RecordingDialog {
    fn confirm(&self, message: &str) -> bool {
        self.prompts.borrow_mut().push(message.to_string());
        self.answer
    }

    fn alert(&self, message: &str) {
        self.alerts.borrow_mut().push(message.to_string());
    }
}

fn error(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

async fn recorder(State(backend): State<Arc<Backend>>, req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    backend.record(Seen {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        authorization: parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body: serde_json::from_slice(&bytes).ok(),
    });
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn bearer(req: &Request) -> Option<&str> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

async fn require_token(req: Request, next: Next) -> Response {
    let known = matches!(bearer(&req), Some(ADMIN_TOKEN | TENANT_TOKEN));
    let present = bearer(&req).is_some();
    match (known, present) {
        (true, _) => next.run(req).await,
        (false, true) => error(StatusCode::UNAUTHORIZED, json!({"msg": "Token has expired"})),
        (false, false) => error(
            StatusCode::UNAUTHORIZED,
            json!({"msg": "Missing Authorization Header"}),
        ),
    }
}

fn router(backend: Arc<Backend>) -> Router {
    let protected = Router::new()
        .route("/auth/me", get(me))
        .route("/towers", get(list_towers).post(create_tower))
        .route(
            "/towers/:id",
            get(get_tower).put(update_tower).delete(delete_tower),
        )
        .route("/units", get(list_units).post(create_unit))
        .route("/units/:id", get(get_unit).put(update_unit).delete(delete_unit))
        .route("/amenities", get(list_amenities))
        .route("/amenities/:id", get(get_amenity))
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/:id", get(get_booking))
        .route("/bookings/:id/approve", put(approve_booking))
        .route("/bookings/:id/reject", put(reject_booking))
        .route("/leases", get(list_leases))
        .route("/leases/:id", get(get_lease))
        .route("/payments", get(list_payments))
        .route("/stats", get(stats))
        .route_layer(middleware::from_fn(require_token));

    let api = Router::new()
        .route("/auth/login", post(login))
        .merge(protected);

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(backend.clone(), recorder))
        .with_state(backend)
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match (email, password) {
        ("admin@rental.com", "admin123") => Json(json!({
            "message": "Login successful",
            "access_token": ADMIN_TOKEN,
            "user": {"id": 1, "role": "admin", "name": "A"}
        }))
        .into_response(),
        ("john@example.com", "password123") => Json(json!({
            "access_token": TENANT_TOKEN,
            "user": {"id": 5, "email": "john@example.com", "role": "user", "name": "John"}
        }))
        .into_response(),
        ("legacy@rental.com", _) => Json(json!({
            "token": "old",
            "user": {"id": 9, "role": "admin", "name": "Legacy"}
        }))
        .into_response(),
        _ => error(StatusCode::UNAUTHORIZED, json!({"error": "Invalid credentials"})),
    }
}

async fn me(req: Request) -> Response {
    match bearer(&req) {
        Some(ADMIN_TOKEN) => Json(json!({"id": 1, "role": "admin", "name": "A"})).into_response(),
        _ => Json(json!({"id": 5, "role": "user", "name": "John"})).into_response(),
    }
}

/// `GET /<rows>/:id`: the row, or 404 with the backend's `{error}` body.
fn find(rows: &Mutex<Vec<Value>>, id: i64, missing: &str) -> Response {
    match rows.lock().unwrap().iter().find(|row| row["id"] == json!(id)) {
        Some(row) => Json(row.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, json!({"error": missing})),
    }
}

async fn get_tower(State(backend): State<Arc<Backend>>, Path(id): Path<i64>) -> Response {
    find(&backend.towers, id, "Tower not found")
}

async fn get_unit(State(backend): State<Arc<Backend>>, Path(id): Path<i64>) -> Response {
    find(&backend.units, id, "Unit not found")
}

async fn get_amenity(State(backend): State<Arc<Backend>>, Path(id): Path<i64>) -> Response {
    find(&backend.amenities, id, "Amenity not found")
}

async fn get_booking(State(backend): State<Arc<Backend>>, Path(id): Path<i64>) -> Response {
    find(&backend.bookings, id, "Booking not found")
}

async fn get_lease(State(backend): State<Arc<Backend>>, Path(id): Path<i64>) -> Response {
    find(&backend.leases, id, "Lease not found")
}

async fn list_payments(State(backend): State<Arc<Backend>>) -> Json<Value> {
    Json(Value::Array(backend.payments.lock().unwrap().clone()))
}

async fn list_towers(State(backend): State<Arc<Backend>>) -> Json<Value> {
    Json(Value::Array(backend.towers.lock().unwrap().clone()))
}

async fn create_tower(State(backend): State<Arc<Backend>>, Json(mut body): Json<Value>) -> Response {
    body["id"] = json!(backend.next_id());
    backend.towers.lock().unwrap().push(body.clone());
    (StatusCode::CREATED, Json(json!({"message": "Tower created", "tower": body}))).into_response()
}

async fn update_tower(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut towers = backend.towers.lock().unwrap();
    let Some(tower) = towers.iter_mut().find(|t| t["id"] == json!(id)) else {
        return error(StatusCode::NOT_FOUND, json!({"error": "Tower not found"}));
    };
    if let (Some(target), Some(changes)) = (tower.as_object_mut(), body.as_object()) {
        for (key, value) in changes {
            target.insert(key.clone(), value.clone());
        }
    }
    Json(json!({"message": "Tower updated"})).into_response()
}

async fn delete_tower(State(backend): State<Arc<Backend>>, Path(id): Path<i64>) -> Response {
    let has_units = backend
        .units
        .lock()
        .unwrap()
        .iter()
        .any(|u| u["tower_id"] == json!(id));
    if has_units {
        // no error text on purpose: the client supplies its own
        return error(StatusCode::BAD_REQUEST, json!({}));
    }
    backend.towers.lock().unwrap().retain(|t| t["id"] != json!(id));
    Json(json!({"message": "Tower deleted"})).into_response()
}

async fn list_units(
    State(backend): State<Arc<Backend>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let units = backend.units.lock().unwrap();
    let shown = units
        .iter()
        .filter(|u| {
            params
                .get("tower_id")
                .map_or(true, |t| u["tower_id"].to_string() == *t)
        })
        .filter(|u| params.get("status").map_or(true, |s| u["status"] == json!(s)))
        .cloned()
        .collect();
    Json(Value::Array(shown))
}

async fn create_unit(State(backend): State<Arc<Backend>>, Json(mut body): Json<Value>) -> Response {
    body["id"] = json!(backend.next_id());
    backend.units.lock().unwrap().push(body);
    (StatusCode::CREATED, Json(json!({"message": "Unit created"}))).into_response()
}

async fn update_unit(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<i64>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut units = backend.units.lock().unwrap();
    match units.iter_mut().find(|u| u["id"] == json!(id)) {
        Some(unit) => {
            body["id"] = json!(id);
            *unit = body;
            Json(json!({"message": "Unit updated"})).into_response()
        }
        None => error(StatusCode::NOT_FOUND, json!({"error": "Unit not found"})),
    }
}

async fn delete_unit(State(backend): State<Arc<Backend>>, Path(id): Path<i64>) -> Response {
    backend.units.lock().unwrap().retain(|u| u["id"] != json!(id));
    Json(json!({"message": "Unit deleted"})).into_response()
}

async fn list_amenities(State(backend): State<Arc<Backend>>) -> Json<Value> {
    Json(Value::Array(backend.amenities.lock().unwrap().clone()))
}

async fn list_bookings(
    State(backend): State<Arc<Backend>>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let bookings = backend.bookings.lock().unwrap();
    let shown = bookings
        .iter()
        .filter(|b| params.get("status").map_or(true, |s| b["status"] == json!(s)))
        .cloned()
        .collect();
    Json(Value::Array(shown))
}

async fn create_booking(State(backend): State<Arc<Backend>>, Json(body): Json<Value>) -> Response {
    let available = backend
        .units
        .lock()
        .unwrap()
        .iter()
        .any(|u| u["id"] == body["unit_id"] && u["status"] == json!("available"));
    if !available {
        return error(StatusCode::BAD_REQUEST, json!({"msg": "Unit is not available"}));
    }
    let mut booking = body;
    booking["id"] = json!(backend.next_id());
    booking["user_id"] = json!(5);
    booking["status"] = json!("pending");
    backend.bookings.lock().unwrap().push(booking);
    (StatusCode::CREATED, Json(json!({"message": "Booking created"}))).into_response()
}

fn review(backend: &Backend, id: i64, status: &str, comments: &Value) -> Response {
    let mut bookings = backend.bookings.lock().unwrap();
    let Some(booking) = bookings.iter_mut().find(|b| b["id"] == json!(id)) else {
        return error(StatusCode::NOT_FOUND, json!({"error": "Booking not found"}));
    };
    if booking["status"] != json!("pending") {
        return error(
            StatusCode::BAD_REQUEST,
            json!({"error": "Booking already processed"}),
        );
    }
    booking["status"] = json!(status);
    booking["admin_comments"] = comments.clone();
    Json(json!({"message": format!("Booking {status}")})).into_response()
}

async fn approve_booking(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    review(&backend, id, "approved", &body["admin_comments"])
}

async fn reject_booking(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    review(&backend, id, "rejected", &body["comments"])
}

async fn list_leases(State(backend): State<Arc<Backend>>) -> Json<Value> {
    Json(Value::Array(backend.leases.lock().unwrap().clone()))
}

async fn stats(State(backend): State<Arc<Backend>>) -> Json<Value> {
    let units = backend.units.lock().unwrap();
    let count = |status: &str| units.iter().filter(|u| u["status"] == json!(status)).count();
    Json(json!({
        "total_towers": backend.towers.lock().unwrap().len(),
        "total_units": units.len(),
        "occupied_units": count("occupied"),
        "available_units": count("available"),
        "pending_bookings": backend.bookings.lock().unwrap().iter().filter(|b| b["status"] == json!("pending")).count(),
        "active_leases": backend.leases.lock().unwrap().len(),
    }))
}
