use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use studiobook::clock::FixedClock;
use studiobook::config::{default_locations, AppConfig};
use studiobook::db;
use studiobook::handlers;
use studiobook::services::ai::{LlmProvider, Message};
use studiobook::services::submitter::relay::FormRelaySubmitter;
use studiobook::services::submitter::{BookingPayload, BookingSubmitter, SubmitError};
use studiobook::state::AppState;

// ── Mock Providers ──

struct MockLlm;

#[async_trait]
impl LlmProvider for MockLlm {
    async fn chat(&self, system_prompt: &str, messages: &[Message]) -> anyhow::Result<String> {
        let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");

        if last.contains("parking") && system_prompt.contains("Parking on Tooley St") {
            Ok("There is parking on Tooley St.".to_string())
        } else if last.contains("deposit") {
            Ok("A 10% deposit secures your booking.".to_string())
        } else {
            Ok("Please contact the studio for details.".to_string())
        }
    }
}

struct FailingLlm;

#[async_trait]
impl LlmProvider for FailingLlm {
    async fn chat(&self, _system_prompt: &str, _messages: &[Message]) -> anyhow::Result<String> {
        anyhow::bail!("model offline")
    }
}

struct MockSubmitter {
    calls: Arc<AtomicUsize>,
    payloads: Arc<Mutex<Vec<BookingPayload>>>,
}

#[async_trait]
impl BookingSubmitter for MockSubmitter {
    async fn deliver(&self, payload: &BookingPayload) -> Result<(), SubmitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

// ── Helpers ──

fn test_config() -> AppConfig {
    AppConfig {
        port: 3000,
        database_url: ":memory:".to_string(),
        admin_token: "test-token".to_string(),
        booking_relay_url: String::new(),
        locations: default_locations(),
        krw_per_gbp: 1700,
        llm_provider: "ollama".to_string(),
        groq_api_key: String::new(),
        groq_model: "llama-3.1-8b-instant".to_string(),
        ollama_url: "http://localhost:11434".to_string(),
        ollama_model: "llama3.2".to_string(),
    }
}

/// 2025-05-20 09:00 in London (BST).
fn test_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(Utc.with_ymd_and_hms(2025, 5, 20, 8, 0, 0).unwrap()))
}

fn build_state(llm: Box<dyn LlmProvider>, submitter: Box<dyn BookingSubmitter>) -> Arc<AppState> {
    let conn = db::init_db(":memory:").unwrap();
    Arc::new(AppState::new(conn, test_config(), test_clock(), llm, submitter))
}

fn test_state() -> Arc<AppState> {
    test_state_with_submissions().0
}

fn test_state_with_submissions() -> (
    Arc<AppState>,
    Arc<AtomicUsize>,
    Arc<Mutex<Vec<BookingPayload>>>,
) {
    let calls = Arc::new(AtomicUsize::new(0));
    let payloads = Arc::new(Mutex::new(vec![]));
    let submitter = MockSubmitter {
        calls: Arc::clone(&calls),
        payloads: Arc::clone(&payloads),
    };
    let state = build_state(Box::new(MockLlm), Box::new(submitter));
    (state, calls, payloads)
}

fn test_app(state: Arc<AppState>) -> Router {
    handlers::router(state)
}

async fn send(state: &Arc<AppState>, req: Request<Body>) -> (StatusCode, Value) {
    let res = test_app(state.clone()).oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn admin_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", "Bearer test-token");
    match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn start_session(state: &Arc<AppState>) -> String {
    start_session_with(state, json!({"locale": "en"})).await
}

async fn start_session_with(state: &Arc<AppState>, request: Value) -> String {
    let (status, body) = send(state, post_json("/api/booking", request)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["step"], "date");
    body["id"].as_str().unwrap().to_string()
}

async fn act(state: &Arc<AppState>, id: &str, action: Value) -> (StatusCode, Value) {
    send(state, post_json(&format!("/api/booking/{id}/actions"), action)).await
}

async fn confirm_booking(state: &Arc<AppState>, id: &str) -> (StatusCode, Value) {
    send(state, post_json(&format!("/api/booking/{id}/confirm"), json!({}))).await
}

/// Walks a fresh session up to the confirmation step.
async fn fill_booking(state: &Arc<AppState>, id: &str) {
    let steps = [
        json!({"action": "select_date", "date": "2025-06-01"}),
        json!({"action": "toggle_time", "time": "10:00"}),
        json!({"action": "toggle_time", "time": "11:00"}),
        json!({"action": "next"}),
        json!({"action": "toggle_location", "location": "Tower Bridge"}),
        json!({"action": "next"}),
        json!({"action": "select_product", "product_id": "90min"}),
        json!({"action": "next"}),
        json!({"action": "enter_details", "client": {"name": "Jane", "email": "jane@x.com"}}),
    ];
    for step in steps {
        let (status, body) = act(state, id, step.clone()).await;
        assert_eq!(status, StatusCode::OK, "{step} failed: {body}");
    }
}

// ── Public API Tests ──

#[tokio::test]
async fn test_health() {
    let state = test_state();
    let (status, body) = send(&state, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_packages_include_price_breakdown() {
    let state = test_state();
    let (status, body) = send(&state, get("/api/packages")).await;
    assert_eq!(status, StatusCode::OK);

    let packages = body.as_array().unwrap();
    assert_eq!(packages.len(), 3);

    let ninety = packages.iter().find(|p| p["id"] == "90min").unwrap();
    assert_eq!(ninety["price"], "£250 / ₩500,000");
    assert_eq!(ninety["breakdown"]["kind"], "parsed");
    assert_eq!(ninety["breakdown"]["primary"]["total"], 250);
    assert_eq!(ninety["breakdown"]["primary"]["deposit"], 25);
    assert_eq!(ninety["breakdown"]["primary"]["balance"], 225);
    assert_eq!(ninety["breakdown"]["secondary"]["deposit"], 50000);
    assert_eq!(ninety["breakdown"]["converted"], false);
}

#[tokio::test]
async fn test_unparseable_price_is_passed_through() {
    let state = test_state();
    let packages = json!([
        {
            "id": "mini",
            "title": {"en": "Mini", "ko": "미니"},
            "price": "Price on request",
            "features": {"en": [], "ko": []}
        }
    ]);
    let (status, _) = send(
        &state,
        admin_request("PUT", "/api/admin/content/packages", Some(packages)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&state, get("/api/packages")).await;
    assert_eq!(body[0]["breakdown"]["kind"], "unparsed");
    assert_eq!(body[0]["breakdown"]["raw"], "Price on request");
}

#[tokio::test]
async fn test_availability_for_unmanaged_date_is_open() {
    let state = test_state();
    let (status, body) = send(&state, get("/api/availability/2025-06-01")).await;
    assert_eq!(status, StatusCode::OK);

    let slots = body.as_array().unwrap();
    assert_eq!(slots.len(), 10);
    assert_eq!(slots[0]["time"], "09:00");
    assert!(slots.iter().all(|s| s["selectable"] == true));
}

#[tokio::test]
async fn test_availability_respects_lead_time() {
    let state = test_state();
    // 09:00 London now, so nothing before 12:00 today is selectable
    let (_, body) = send(&state, get("/api/availability/2025-05-20")).await;
    let slots = body.as_array().unwrap();

    let selectable = |time: &str| {
        slots
            .iter()
            .find(|s| s["time"] == time)
            .map(|s| s["selectable"] == true)
            .unwrap()
    };
    assert!(!selectable("11:00"));
    assert!(selectable("12:00"));
}

#[tokio::test]
async fn test_availability_bad_date() {
    let state = test_state();
    let (status, body) = send(&state, get("/api/availability/2025-13-01")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_missing_content_is_not_found() {
    let state = test_state();
    let (status, _) = send(&state, get("/api/content/notice")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // packages always resolve, falling back to the built-in catalogue
    let (status, body) = send(&state, get("/api/content/packages")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

// ── Admin API Tests ──

#[tokio::test]
async fn test_admin_requires_auth() {
    let state = test_state();
    let req = Request::builder()
        .method("POST")
        .uri("/api/admin/availability/2025-06-01")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&state, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_wrong_token() {
    let state = test_state();
    let req = Request::builder()
        .method("PUT")
        .uri("/api/admin/content/notice")
        .header("Authorization", "Bearer wrong-token")
        .header("Content-Type", "application/json")
        .body(Body::from(json!({"en": "Closed", "ko": "휴무"}).to_string()))
        .unwrap();
    let (status, _) = send(&state, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_ensure_day_is_idempotent() {
    let state = test_state();
    let uri = "/api/admin/availability/2025-06-01";

    let (status, body) = send(&state, admin_request("POST", uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["created"], true);

    let (_, body) = send(&state, admin_request("POST", uri, None)).await;
    assert_eq!(body["created"], false);
}

#[tokio::test]
async fn test_admin_block_toggle_changes_availability() {
    let state = test_state();
    let uri = "/api/admin/availability/2025-06-01/10:00/block";

    let (status, body) = send(&state, admin_request("POST", uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_blocked"], true);

    let (_, slots) = send(&state, get("/api/availability/2025-06-01")).await;
    let ten = slots
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["time"] == "10:00")
        .unwrap()
        .clone();
    assert_eq!(ten["is_blocked"], true);
    assert_eq!(ten["selectable"], false);

    let (_, body) = send(&state, admin_request("POST", uri, None)).await;
    assert_eq!(body["is_blocked"], false);
}

#[tokio::test]
async fn test_admin_rejects_unknown_slot_time() {
    let state = test_state();
    let (status, _) = send(
        &state,
        admin_request("POST", "/api/admin/availability/2025-06-01/10:30/block", None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_mark_booked() {
    let state = test_state();
    let (status, body) = send(
        &state,
        admin_request(
            "POST",
            "/api/admin/availability/2025-06-01/14:00/booked",
            Some(json!({"booked": true})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_booked"], true);

    let (_, slots) = send(&state, get("/api/availability/2025-06-01")).await;
    let two = slots
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["time"] == "14:00")
        .unwrap()
        .clone();
    assert_eq!(two["is_booked"], true);
    assert_eq!(two["selectable"], false);
}

#[tokio::test]
async fn test_admin_content_round_trip() {
    let state = test_state();
    let notice = json!({"en": "Closed on bank holidays", "ko": "공휴일 휴무"});

    let (status, _) = send(
        &state,
        admin_request("PUT", "/api/admin/content/notice", Some(notice.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&state, get("/api/content/notice")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, notice);

    let (status, keys) = send(&state, admin_request("GET", "/api/admin/content", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(keys, json!(["notice"]));
}

#[tokio::test]
async fn test_admin_content_validation() {
    let state = test_state();

    let (status, _) = send(
        &state,
        admin_request("PUT", "/api/admin/content/faqs", Some(json!({"not": "a list"}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let duplicated = json!([
        {"id": "a", "title": {"en": "A"}, "price": "£1", "features": {"en": []}},
        {"id": "a", "title": {"en": "B"}, "price": "£2", "features": {"en": []}}
    ]);
    let (status, _) = send(
        &state,
        admin_request("PUT", "/api/admin/content/packages", Some(duplicated)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &state,
        admin_request("PUT", "/api/admin/content/Bad-Key", Some(json!("x"))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Booking Wizard Tests ──

#[tokio::test]
async fn test_full_booking_flow() {
    let (state, calls, payloads) = test_state_with_submissions();
    let id = start_session_with(
        &state,
        json!({"locale": "en", "liked_photos": ["bridge-01.jpg", "park-07.jpg"]}),
    )
    .await;
    fill_booking(&state, &id).await;

    let (status, snapshot) = send(&state, get(&format!("/api/booking/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["step"], "confirmation");
    assert_eq!(snapshot["product_title"], "90 Minute Session");
    assert_eq!(snapshot["draft"]["times"], json!(["10:00", "11:00"]));
    assert_eq!(
        snapshot["draft"]["liked_photo_refs"],
        json!(["bridge-01.jpg", "park-07.jpg"])
    );

    let (status, body) = confirm_booking(&state, &id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "submitted");
    assert_eq!(body["step"], "date");
    assert!(body["draft"]["date"].is_null());
    assert_eq!(body["draft"]["times"], json!([]));
    assert!(body["last_submitted_at"].is_string());

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let payload = payloads.lock().unwrap()[0].clone();
    assert_eq!(payload.name, "Jane");
    assert_eq!(payload.date, "Sunday, 1 June 2025");
    assert_eq!(payload.time, "10:00, 11:00");
    assert_eq!(payload.price_total, "£250 / ₩500,000");
    assert_eq!(payload.price_deposit, "£25 / ₩50,000");
    assert_eq!(payload.price_balance, "£225 / ₩450,000");
    assert_eq!(payload.liked_photos, "bridge-01.jpg\npark-07.jpg");
}

#[tokio::test]
async fn test_liked_photos_are_per_session() {
    let (state, calls, payloads) = test_state_with_submissions();

    let first = start_session_with(&state, json!({"liked_photos": ["bridge-01.jpg"]})).await;
    let second = start_session(&state).await;

    fill_booking(&state, &first).await;

    // the second visitor picks their photos at the review step
    let steps = [
        json!({"action": "select_date", "date": "2025-06-01"}),
        json!({"action": "toggle_time", "time": "14:00"}),
        json!({"action": "next"}),
        json!({"action": "toggle_location", "location": "Greenwich"}),
        json!({"action": "next"}),
        json!({"action": "select_product", "product_id": "60min"}),
        json!({"action": "set_liked_photos", "refs": ["park-07.jpg", "river-02.jpg"]}),
        json!({"action": "next"}),
        json!({"action": "enter_details", "client": {"name": "Min", "contact_id": "min_k"}}),
    ];
    for step in steps {
        let (status, body) = act(&state, &second, step.clone()).await;
        assert_eq!(status, StatusCode::OK, "{step} failed: {body}");
    }

    for id in [&first, &second] {
        let (_, body) = confirm_booking(&state, &id).await;
        assert_eq!(body["status"], "submitted");
    }

    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let payloads = payloads.lock().unwrap();
    assert_eq!(payloads[0].liked_photos, "bridge-01.jpg");
    assert_eq!(payloads[1].liked_photos, "park-07.jpg\nriver-02.jpg");
}

#[tokio::test]
async fn test_invalid_liked_photos_rejected() {
    let state = test_state();
    let refs: Vec<String> = (0..60).map(|i| format!("photo-{i}.jpg")).collect();
    let (status, _) = send(&state, post_json("/api/booking", json!({"liked_photos": refs}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let id = start_session(&state).await;
    let (status, _) = act(
        &state,
        &id,
        json!({"action": "set_liked_photos", "refs": ["a.jpg"]}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_confirm_twice_submits_once() {
    let (state, calls, _) = test_state_with_submissions();
    let id = start_session(&state).await;
    fill_booking(&state, &id).await;

    let uri = format!("/api/booking/{id}/confirm");
    let (status, _) = send(&state, post_json(&uri, json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    // the wizard is back at the date step, so a repeat confirm is refused
    let (status, _) = send(&state, post_json(&uri, json!({}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_wrong_step_is_conflict() {
    let state = test_state();
    let id = start_session(&state).await;

    let (status, body) = act(
        &state,
        &id,
        json!({"action": "select_product", "product_id": "90min"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("date"));
}

#[tokio::test]
async fn test_invalid_selections_are_unprocessable() {
    let state = test_state();
    let id = start_session(&state).await;

    let past = json!({"action": "select_date", "date": "2025-05-19"});
    let (status, _) = act(&state, &id, past).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = act(&state, &id, json!({"action": "next"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    send(
        &state,
        admin_request("POST", "/api/admin/availability/2025-06-01/10:00/block", None),
    )
    .await;
    act(&state, &id, json!({"action": "select_date", "date": "2025-06-01"})).await;

    let (status, _) = act(&state, &id, json!({"action": "toggle_time", "time": "10:00"})).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, times) = send(&state, get(&format!("/api/booking/{id}/times"))).await;
    assert_eq!(status, StatusCode::OK);
    let times = times.as_array().unwrap();
    assert_eq!(times.len(), 9);
    assert!(times.iter().all(|t| t["time"] != "10:00"));
}

#[tokio::test]
async fn test_back_keeps_selections() {
    let state = test_state();
    let id = start_session(&state).await;
    act(&state, &id, json!({"action": "select_date", "date": "2025-06-01"})).await;
    act(&state, &id, json!({"action": "toggle_time", "time": "15:00"})).await;
    act(&state, &id, json!({"action": "next"})).await;

    let (status, body) = act(&state, &id, json!({"action": "back"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "time");
    assert_eq!(body["draft"]["times"], json!(["15:00"]));
    assert_eq!(body["can_go_back"], true);
}

#[tokio::test]
async fn test_session_offset_validation() {
    let state = test_state();
    let (status, _) = send(
        &state,
        post_json("/api/booking", json!({"locale": "ko", "utc_offset_minutes": 540})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &state,
        post_json("/api/booking", json!({"utc_offset_minutes": 100000})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_and_abandoned_sessions() {
    let state = test_state();
    let missing = uuid::Uuid::new_v4();
    let (status, _) = send(&state, get(&format!("/api/booking/{missing}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let id = start_session(&state).await;
    let delete = |id: &str| {
        Request::builder()
            .method("DELETE")
            .uri(format!("/api/booking/{id}"))
            .body(Body::empty())
            .unwrap()
    };
    let (status, _) = send(&state, delete(&id)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&state, delete(&id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── FAQ Chat Tests ──

#[tokio::test]
async fn test_chat_uses_admin_context() {
    let state = test_state();
    send(
        &state,
        admin_request(
            "PUT",
            "/api/admin/content/chat_context",
            Some(json!("Parking on Tooley St")),
        ),
    )
    .await;

    let (status, body) = send(
        &state,
        post_json("/api/chat", json!({"question": "Where is parking?"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["answer"], "There is parking on Tooley St.");
}

#[tokio::test]
async fn test_chat_rejects_empty_question() {
    let state = test_state();
    let (status, _) = send(&state, post_json("/api/chat", json!({"question": "  "}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_model_failure_is_bad_gateway() {
    let calls = Arc::new(AtomicUsize::new(0));
    let submitter = MockSubmitter {
        calls,
        payloads: Arc::new(Mutex::new(vec![])),
    };
    let state = build_state(Box::new(FailingLlm), Box::new(submitter));
    let (status, _) = send(
        &state,
        post_json("/api/chat", json!({"question": "How much is the deposit?"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

// ── Relay Tests ──

async fn spawn_relay(status: StatusCode) -> (String, Arc<Mutex<Vec<Value>>>) {
    let received = Arc::new(Mutex::new(vec![]));
    let sink = Arc::clone(&received);
    let app = Router::new().route(
        "/relay",
        post(move |Json(body): Json<Value>| {
            let sink = Arc::clone(&sink);
            async move {
                sink.lock().unwrap().push(body);
                status
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/relay"), received)
}

fn relay_state(endpoint: String) -> Arc<AppState> {
    let submitter = FormRelaySubmitter::new(endpoint).unwrap();
    build_state(Box::new(MockLlm), Box::new(submitter))
}

#[tokio::test]
async fn test_relay_receives_booking() {
    let (endpoint, received) = spawn_relay(StatusCode::OK).await;
    let state = relay_state(endpoint);
    let id = start_session(&state).await;
    fill_booking(&state, &id).await;

    let (_, body) = confirm_booking(&state, &id).await;
    assert_eq!(body["status"], "submitted");

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0]["_subject"], "New booking: Jane (Sunday, 1 June 2025)");
    assert_eq!(received[0]["location"], "Tower Bridge");
    assert_eq!(received[0]["priceDeposit"], "£25 / ₩50,000");
    assert_eq!(received[0]["people"], 1);
}

#[tokio::test]
async fn test_relay_error_keeps_draft_for_retry() {
    let (endpoint, _) = spawn_relay(StatusCode::INTERNAL_SERVER_ERROR).await;
    let state = relay_state(endpoint);
    let id = start_session(&state).await;
    fill_booking(&state, &id).await;

    let (status, body) = confirm_booking(&state, &id).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "failed");
    assert_eq!(body["step"], "submit_failed");
    assert!(body["error"].as_str().unwrap().contains("500"));
    assert_eq!(body["draft"]["times"], json!(["10:00", "11:00"]));

    let (status, body) = act(&state, &id, json!({"action": "retry"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["step"], "confirmation");
    assert!(body["last_error"].is_null());
}

#[tokio::test]
async fn test_unconfigured_relay_fails_submission() {
    let state = relay_state(String::new());
    let id = start_session(&state).await;
    fill_booking(&state, &id).await;

    let (_, body) = confirm_booking(&state, &id).await;
    assert_eq!(body["status"], "failed");
    assert_eq!(body["error"], "booking relay is not configured");
}
