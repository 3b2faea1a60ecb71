use std::sync::{Arc, Once};

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio_test::assert_ok;
use tower::ServiceExt;

use health_tracker_api::api::{routes::create_app, AppState};
use health_tracker_data::database::create_in_memory_pool;
use health_tracker_domain::services::LlmClient;
use health_tracker_domain::testing::ScriptedLlmClient;

static INIT: Once = Once::new();

// Initialize environment and logging once for all tests
fn initialize() {
    INIT.call_once(|| {
        std::env::set_var("JWT_SECRET", "integration-test-secret");
        std::env::set_var("JWT_ISSUER", "health-tracker-tests");
        std::env::set_var("PASSWORD_HASH_ITERATIONS", "1000");

        let _ = tracing_subscriber::fmt()
            .with_env_filter("health_tracker_api=debug,health_tracker_domain=debug")
            .with_test_writer()
            .try_init();
    });
}

fn app() -> Router {
    initialize();
    let pool = create_in_memory_pool().expect("in-memory pool");
    create_app(AppState::new(pool))
}

// Helper function to get the body bytes as JSON; empty bodies become Null
async fn get_body_json(body: Body) -> Value {
    let bytes = assert_ok!(to_bytes(body, usize::MAX).await);
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("JSON body")
}

async fn send(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, get_body_json(response.into_body()).await)
}

async fn login(app: &Router, email: &str, password: &str) -> Value {
    let (status, body) = send(
        app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed for {}: {}", email, body);
    body
}

async fn access_token(app: &Router, email: &str, password: &str) -> String {
    login(app, email, password).await["access_token"]
        .as_str()
        .expect("access token")
        .to_string()
}

async fn user_id(app: &Router, token: &str) -> i64 {
    let (status, body) = send(app, Method::GET, "/protected", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    body["user"]["sub"].as_str().expect("subject").parse().expect("numeric subject")
}

struct Demo {
    doctor: String,
    patient: String,
    caregiver: String,
    patient_id: i64,
}

async fn seed(app: &Router) -> Demo {
    let (status, _) = send(app, Method::POST, "/seed-demo-users", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let doctor = access_token(app, "doctor@example.com", "doctor123").await;
    let patient = access_token(app, "patient@example.com", "patient123").await;
    let caregiver = access_token(app, "caregiver@example.com", "caregiver123").await;
    let patient_id = user_id(app, &patient).await;

    Demo {
        doctor,
        patient,
        caregiver,
        patient_id,
    }
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["database"]["status"], "ok");
}

#[tokio::test]
async fn test_register_login_and_protected() {
    let app = app();

    let registration = json!({
        "name": "Alice",
        "email": "Alice@Example.com",
        "password": "secret123",
        "role": "patient"
    });
    let (status, body) = send(&app, Method::POST, "/register", None, Some(registration.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["role"], "patient");

    let (status, body) = send(&app, Method::POST, "/register", None, Some(registration)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("already registered"));

    let tokens = login(&app, "alice@example.com", "secret123").await;
    assert_eq!(tokens["token_type"], "bearer");
    assert_eq!(tokens["role"], "patient");
    let token = tokens["access_token"].as_str().unwrap();

    let (status, body) = send(&app, Method::GET, "/protected", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert_eq!(body["user"]["role"], "patient");

    let (status, body) = send(&app, Method::GET, "/healthdata", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Welcome Alice");
    assert_eq!(body["steps"], 0);
}

#[tokio::test]
async fn test_bad_credentials_and_missing_token() {
    let app = app();
    seed(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": "doctor@example.com", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "detail": "Invalid credentials" }));

    let (status, _) = send(&app, Method::GET, "/protected", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, Method::GET, "/protected", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

async fn refresh(app: &Router, refresh_token: &str) -> StatusCode {
    send(
        app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh_token })),
    )
    .await
    .0
}

#[tokio::test]
async fn test_logout_revokes_token() {
    let app = app();
    let demo = seed(&app).await;

    let session = login(&app, "patient@example.com", "patient123").await;
    let access = session["access_token"].as_str().unwrap();
    let refresh_token = session["refresh_token"].as_str().unwrap();

    let (status, body) = send(&app, Method::POST, "/auth/logout", Some(access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully logged out");

    let (status, _) = send(&app, Method::GET, "/protected", Some(access), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // The refresh token of the same login cannot mint new access tokens
    assert_eq!(refresh(&app, refresh_token).await, StatusCode::UNAUTHORIZED);

    // The patient's earlier login is a separate session
    let (status, _) = send(&app, Method::GET, "/protected", Some(&demo.patient), None).await;
    assert_eq!(status, StatusCode::OK);

    // Other sessions are unaffected
    let (status, _) = send(&app, Method::GET, "/protected", Some(&demo.doctor), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_token() {
    let app = app();
    seed(&app).await;

    let tokens = login(&app, "patient@example.com", "patient123").await;
    let refresh = tokens["refresh_token"].as_str().unwrap();
    let access = tokens["access_token"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refresh_token": refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let renewed = body["access_token"].as_str().unwrap();

    let (status, _) = send(&app, Method::GET, "/protected", Some(renewed), None).await;
    assert_eq!(status, StatusCode::OK);

    // Access tokens cannot be used as refresh tokens
    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/refresh",
        None,
        Some(json!({ "refresh_token": access })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_medication_access_by_role() {
    let app = app();
    let demo = seed(&app).await;
    let uri = format!("/api/v1/patients/{}/medications", demo.patient_id);
    let medication = json!({ "med_name": "Aspirin", "schedule": "Once daily", "notes": "After food" });

    let (status, body) = send(&app, Method::POST, &uri, Some(&demo.doctor), Some(medication.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["med_name"], "Aspirin");
    let medication_id = body["id"].as_i64().unwrap();

    // Patients and caregivers cannot prescribe
    let (status, _) = send(&app, Method::POST, &uri, Some(&demo.patient), Some(medication.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::POST, &uri, Some(&demo.caregiver), Some(medication.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Patient and caregiver can read
    for token in [&demo.patient, &demo.caregiver] {
        let (status, body) = send(&app, Method::GET, &uri, Some(token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    // A doctor who is not assigned to the patient is refused
    let (status, _) = send(
        &app,
        Method::POST,
        "/register",
        None,
        Some(json!({ "name": "Dr. Other", "email": "other@example.com", "password": "other123", "role": "doctor" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let other = access_token(&app, "other@example.com", "other123").await;

    let (status, _) = send(&app, Method::GET, &uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/medications/{}", medication_id), Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/medications/{}", medication_id),
        Some(&demo.doctor),
        Some(json!({ "med_name": "Aspirin", "schedule": "Twice daily" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["schedule"], "Twice daily");

    let (status, body) = send(&app, Method::DELETE, &format!("/api/v1/medications/{}", medication_id), Some(&demo.doctor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Medication deleted");

    let (status, _) = send(&app, Method::DELETE, &format!("/api/v1/medications/{}", medication_id), Some(&demo.doctor), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_doctor_patient_list() {
    let app = app();
    let demo = seed(&app).await;

    let (status, body) = send(&app, Method::GET, "/api/v1/doctor/patients", Some(&demo.doctor), None).await;
    assert_eq!(status, StatusCode::OK);
    let patients = body.as_array().unwrap();
    assert_eq!(patients.len(), 1);
    assert_eq!(patients[0]["email"], "patient@example.com");

    let (status, _) = send(&app, Method::GET, "/api/v1/doctor/patients", Some(&demo.patient), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_fitness_and_report() {
    let app = app();
    let demo = seed(&app).await;

    let entry = json!({ "steps": 800, "calories": 1500, "heart_rate": 130, "sleep": 6.5, "date": "2024-05-01" });
    let (status, body) = send(&app, Method::POST, "/api/v1/fitness", Some(&demo.patient), Some(entry.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user_id"], demo.patient_id);

    // Only patients log their own data
    let (status, _) = send(&app, Method::POST, "/api/v1/fitness", Some(&demo.doctor), Some(entry)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/patients/{}/fitness/latest", demo.patient_id),
        Some(&demo.caregiver),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["heart_rate"], 130);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/patients/{}/report", demo.patient_id),
        Some(&demo.doctor),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["risk"]["level"], "High");
    assert!(body["report"]["summary"].as_str().unwrap().contains("High"));

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/patients/{}/analytics?limit=7", demo.patient_id),
        Some(&demo.patient),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["records"], 1);
    assert_eq!(body["heart_rate_status"], "High");
}

#[tokio::test]
async fn test_fitness_rejects_out_of_range_entries() {
    let app = app();
    let demo = seed(&app).await;

    for entry in [
        json!({ "steps": 9223372036854775000i64, "heart_rate": 70 }),
        json!({ "calories": 20001 }),
        json!({ "steps": 4000, "date": "05/01/2024" }),
    ] {
        let (status, body) = send(&app, Method::POST, "/api/v1/fitness", Some(&demo.patient), Some(entry.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} accepted: {}", entry, body);
    }

    // Nothing was stored
    let (status, body) = send(&app, Method::GET, "/api/v1/goals/progress", Some(&demo.patient), None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["steps"], 0);
    assert_eq!(body["steps_percent"], 0);
}

#[tokio::test]
async fn test_fitness_csv_import() {
    let app = app();
    let demo = seed(&app).await;

    let csv = "steps,calories,heart_rate,date\n4000,1800,72,2024-05-01\n6000,2100,75,2024-05-02\n";
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/fitness/import")
        .header(header::AUTHORIZATION, format!("Bearer {}", demo.patient))
        .header(header::CONTENT_TYPE, mime::TEXT_CSV.as_ref())
        .body(Body::from(csv))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = get_body_json(response.into_body()).await;
    assert_eq!(body["imported"], 2);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/patients/{}/fitness", demo.patient_id),
        Some(&demo.patient),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_chat_uses_medications_and_llm() {
    initialize();
    let llm = Arc::new(ScriptedLlmClient::answering("Stay active and hydrated."));
    let state = AppState::new(create_in_memory_pool().unwrap()).with_llm(llm.clone() as Arc<dyn LlmClient>);
    let app = create_app(state);
    let demo = seed(&app).await;

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/patients/{}/medications", demo.patient_id),
        Some(&demo.doctor),
        Some(json!({ "med_name": "Metformin", "schedule": "With meals" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/chat",
        Some(&demo.patient),
        Some(json!({ "query": "When do I take my metformin medication?" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let answer = body["response"].as_str().unwrap();
    assert!(answer.contains("Metformin"));
    assert!(answer.contains("With meals"));
    assert_eq!(llm.calls(), 0);

    let general = json!({ "query": "Any tips for today?" });
    let (_, body) = send(&app, Method::POST, "/api/v1/chat", Some(&demo.patient), Some(general.clone())).await;
    assert_eq!(body["response"], "Stay active and hydrated.");
    let (_, body) = send(&app, Method::POST, "/api/v1/chat", Some(&demo.patient), Some(general)).await;
    assert_eq!(body["response"], "(cached) Stay active and hydrated.");
    assert_eq!(llm.calls(), 1);

    let (status, _) = send(&app, Method::POST, "/api/v1/chat", Some(&demo.patient), Some(json!({ "query": "   " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_goals() {
    let app = app();
    let demo = seed(&app).await;

    let (status, body) = send(&app, Method::GET, "/api/v1/goals", Some(&demo.patient), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["steps_goal"], 5000);
    assert_eq!(body["calories_goal"], 2000);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/v1/goals",
        Some(&demo.patient),
        Some(json!({ "steps_goal": 50, "calories_goal": 2000 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/v1/goals",
        Some(&demo.patient),
        Some(json!({ "steps_goal": 8000, "calories_goal": 2500 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/fitness",
        Some(&demo.patient),
        Some(json!({ "steps": 4000, "calories": 2500 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::GET, "/api/v1/goals/progress", Some(&demo.patient), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["steps_goal"], 8000);
    assert_eq!(body["steps_percent"], 50);
}

#[tokio::test]
async fn test_symptoms() {
    let app = app();
    let demo = seed(&app).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/symptoms",
        Some(&demo.patient),
        Some(json!({ "symptom": "Headache", "severity": "mild" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["severity"], "mild");

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/v1/patients/{}/symptoms", demo.patient_id),
        Some(&demo.doctor),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["symptom"], "Headache");
}

#[tokio::test]
async fn test_medicine_reference_and_interactions() {
    let app = app();
    let demo = seed(&app).await;

    let (status, body) = send(&app, Method::GET, "/api/v1/medicines", Some(&demo.patient), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.as_array().unwrap().is_empty());

    let (status, body) = send(&app, Method::GET, "/api/v1/medicines/paracetamol", Some(&demo.patient), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Paracetamol");

    let (status, _) = send(&app, Method::GET, "/api/v1/medicines/unobtainium", Some(&demo.patient), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/interactions/check",
        Some(&demo.patient),
        Some(json!({ "medications": ["Warfarin", "Aspirin", "Paracetamol", "aspirin"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let conflicts: Vec<String> = serde_json::from_value(body["conflicts"].clone()).unwrap();
    assert!(conflicts.contains(&"Interaction detected between 'warfarin' and 'aspirin'".to_string()));
    assert!(conflicts.contains(&"Duplicate medication entry: 'aspirin'".to_string()));
    assert!(conflicts
        .iter()
        .any(|c| c.starts_with("Reference interaction between 'aspirin' and 'paracetamol'")));

    let too_many: Vec<String> = (0..51).map(|i| format!("med-{}", i)).collect();
    for medications in [json!([]), json!(too_many)] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/v1/interactions/check",
            Some(&demo.patient),
            Some(json!({ "medications": medications })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_delete_account() {
    let app = app();
    let demo = seed(&app).await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/v1/account",
        Some(&demo.caregiver),
        Some(json!({ "confirmation": "yes" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let session = login(&app, "caregiver@example.com", "caregiver123").await;
    let session_refresh = session["refresh_token"].as_str().unwrap().to_string();
    let other_device = login(&app, "caregiver@example.com", "caregiver123").await;
    let other_refresh = other_device["refresh_token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/api/v1/account",
        session["access_token"].as_str(),
        Some(json!({ "confirmation": "DELETE" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Account deleted");

    let (status, _) = send(&app, Method::GET, "/protected", session["access_token"].as_str(), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Neither the deleting session nor any other login may refresh
    assert_eq!(refresh(&app, &session_refresh).await, StatusCode::UNAUTHORIZED);
    assert_eq!(refresh(&app, &other_refresh).await, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/login",
        None,
        Some(json!({ "email": "caregiver@example.com", "password": "caregiver123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
