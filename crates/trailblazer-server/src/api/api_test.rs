use super::*;
use axum::body::{to_bytes, Body};
use axum::http::{header::AUTHORIZATION, Request};
use serde_json::{json, Value};
use tower::ServiceExt;
use trailblazer_db::LocalStore;

const SPEEDCROSS: &str = "6c1e0b7a-4d2f-4f61-9a31-5e0c7d1a0001";
const ADMIN_KEY: &str = "admin-key";

fn make_state() -> AppState {
    AppState::new(
        Catalog::local(LocalStore::in_memory()),
        Duration::from_millis(1),
    )
}

fn make_app(state: AppState) -> Router {
    let auth = AuthState::from_keys(ADMIN_KEY, false).expect("auth");
    build_app(state, auth, default_rate_limit_state())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn send_json(method: &str, uri: &str, body: &Value, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(key) = key {
        builder = builder.header(AUTHORIZATION, format!("Bearer {key}"));
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    serde_json::from_slice(&body).expect("json parse")
}

// ---------------------------------------------------------------------------
// Envelope + errors
// ---------------------------------------------------------------------------

#[test]
fn validation_error_maps_to_bad_request() {
    let response = ApiError::new("req-1", "validation_error", "invalid input").into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[test]
fn field_errors_serialize_the_field() {
    let error = ApiError::invalid_field("req-1", "product_data", "bad json");
    let json = serde_json::to_value(&error).expect("serialize");
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(json["error"]["field"], "product_data");

    let plain = serde_json::to_value(ApiError::new("req-1", "not_found", "x")).expect("ser");
    assert!(plain["error"].get("field").is_none());
}

#[test]
fn db_not_found_maps_to_404() {
    let response = map_db_error("req-1".to_string(), &DbError::NotFound).into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_mock_mode() {
    let response = make_app(make_state())
        .oneshot(get("/api/v1/health"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    let json = read_json(response).await;
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["mode"], "mock");
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn caller_request_id_is_echoed() {
    let request = Request::builder()
        .uri("/api/v1/health")
        .header(REQUEST_ID_HEADER, "trace-123")
        .body(Body::empty())
        .expect("request");
    let response = make_app(make_state()).oneshot(request).await.expect("response");

    assert_eq!(
        response.headers()[REQUEST_ID_HEADER].to_str().expect("ascii"),
        "trace-123"
    );
    assert_eq!(read_json(response).await["meta"]["request_id"], "trace-123");
}

// ---------------------------------------------------------------------------
// Shoes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_returns_seed_cards_newest_first() {
    let response = make_app(make_state())
        .oneshot(get("/api/v1/shoes"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    let cards = json["data"].as_array().expect("data array");
    assert_eq!(cards.len(), trailblazer_db::seed_shoes().len());
    assert_eq!(cards.last().expect("oldest")["id"], SPEEDCROSS);

    let speedcross = cards.last().expect("speedcross");
    // The seed document only carries example.com media; the placeholder wins.
    assert_eq!(speedcross["image"], resolve_placeholder());
    assert_eq!(speedcross["brand"], "Salomon");
}

fn resolve_placeholder() -> &'static str {
    trailblazer_core::resolve::PLACEHOLDER_IMAGE
}

#[tokio::test]
async fn list_filters_by_query() {
    let app = make_app(make_state());
    let json = read_json(
        app.clone()
            .oneshot(get("/api/v1/shoes?q=SALOMON"))
            .await
            .expect("response"),
    )
    .await;
    let cards = json["data"].as_array().expect("data array");
    assert!(!cards.is_empty());
    assert!(cards.iter().all(|c| c["brand"] == "Salomon"));

    let none = read_json(
        app.oneshot(get("/api/v1/shoes?q=xyz123"))
            .await
            .expect("response"),
    )
    .await;
    assert_eq!(none["data"].as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn detail_includes_normalized_document_and_structured_data() {
    let response = make_app(make_state())
        .oneshot(get(&format!("/api/v1/shoes/{SPEEDCROSS}")))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    let data = &json["data"];
    assert_eq!(data["shoe"]["id"], SPEEDCROSS);
    assert!(data["product_data"].is_object());
    assert!(data["sections"].is_object());
    assert_eq!(data["structured_data"]["@type"], "Product");
    assert!(data["resolved"]["performance"].is_array());
}

#[tokio::test]
async fn detail_for_unknown_or_malformed_id_is_404() {
    let app = make_app(make_state());
    let missing = app
        .clone()
        .oneshot(get(&format!("/api/v1/shoes/{}", Uuid::new_v4())))
        .await
        .expect("response");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let malformed = app
        .oneshot(get("/api/v1/shoes/not-a-uuid"))
        .await
        .expect("response");
    assert_eq!(malformed.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json(malformed).await["error"]["code"], "not_found");
}

#[tokio::test]
async fn admin_routes_require_bearer_key() {
    let body = json!({"name": "Cascadia 18", "brand": "Brooks"});
    let response = make_app(make_state())
        .oneshot(send_json("POST", "/api/v1/shoes", &body, None))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = read_json(response).await;
    assert_eq!(json["error"]["code"], "unauthorized");
    assert!(json["meta"]["request_id"].is_string());
}

#[tokio::test]
async fn create_then_list_shows_new_shoe_first() {
    let app = make_app(make_state());
    let body = json!({
        "name": "Cascadia 18",
        "brand": "Brooks",
        "drop": "8",
        "release_year": "2024",
        "release_month": "5",
        "product_data": "",
    });
    let response = app
        .clone()
        .oneshot(send_json("POST", "/api/v1/shoes", &body, Some(ADMIN_KEY)))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = read_json(response).await;
    assert_eq!(created["data"]["drop"], 8.0);
    assert_eq!(
        created["data"]["product_data"],
        json!({"product_identity": {"release_year": 2024, "release_month": 5}})
    );

    let list = read_json(app.oneshot(get("/api/v1/shoes")).await.expect("response")).await;
    assert_eq!(list["data"][0]["id"], created["data"]["id"]);
    assert_eq!(list["data"][0]["release_date"], "2024年5月");
}

#[tokio::test]
async fn invalid_product_data_is_a_field_error() {
    let body = json!({"name": "X", "brand": "Y", "product_data": "{not json"});
    let response = make_app(make_state())
        .oneshot(send_json("POST", "/api/v1/shoes", &body, Some(ADMIN_KEY)))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = read_json(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(json["error"]["field"], "product_data");
}

#[tokio::test]
async fn edit_form_is_prefilled_from_record() {
    let request = Request::builder()
        .uri(format!("/api/v1/shoes/{SPEEDCROSS}/form"))
        .header(AUTHORIZATION, format!("Bearer {ADMIN_KEY}"))
        .body(Body::empty())
        .expect("request");
    let response = make_app(make_state()).oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let form = read_json(response).await;
    assert_eq!(form["data"]["name"], "Speedcross 6");
    assert_eq!(form["data"]["release_month"], "2");
    assert!(form["data"]["product_data"]
        .as_str()
        .is_some_and(|text| text.contains("product_identity")));
}

#[tokio::test]
async fn update_changes_only_supplied_keys() {
    let body = json!({"short_desc": "Updated blurb", "weight": "305"});
    let response = make_app(make_state())
        .oneshot(send_json(
            "PUT",
            &format!("/api/v1/shoes/{SPEEDCROSS}"),
            &body,
            Some(ADMIN_KEY),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    let shoe = &json["data"];
    assert_eq!(shoe["short_desc"], "Updated blurb");
    assert_eq!(shoe["weight"], 305.0);
    assert_eq!(shoe["name"], "Speedcross 6");
    assert_eq!(shoe["pros"], json!(["Grip in mud"]));
    assert_eq!(shoe["product_data"]["product_identity"]["nickname"], "SC6");
}

#[tokio::test]
async fn update_tolerates_double_encoded_document() {
    let id = Uuid::new_v4();
    let inner = json!({"product_identity": {"nickname": "LEG"}}).to_string();
    let legacy = trailblazer_core::ShoeRecord {
        id,
        name: "Legacy Trail".to_string(),
        brand: "Salomon".to_string(),
        product_data: Some(Value::String(Value::String(inner).to_string())),
        ..trailblazer_core::ShoeRecord::default()
    };
    let store = LocalStore::in_memory();
    store
        .set(
            &trailblazer_db::local::shoes_key(),
            serde_json::to_value(vec![legacy]).expect("encode record"),
        )
        .await
        .expect("store record");
    let state = AppState::new(Catalog::local(store), Duration::from_millis(1));

    let response = make_app(state)
        .oneshot(send_json(
            "PUT",
            &format!("/api/v1/shoes/{id}"),
            &json!({"short_desc": "x"}),
            Some(ADMIN_KEY),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let shoe = &read_json(response).await["data"];
    assert_eq!(shoe["short_desc"], "x");
    assert_eq!(shoe["product_data"]["product_identity"]["nickname"], "LEG");
}

#[tokio::test]
async fn update_unknown_shoe_is_404() {
    let response = make_app(make_state())
        .oneshot(send_json(
            "PUT",
            &format!("/api/v1/shoes/{}", Uuid::new_v4()),
            &json!({"name": "x"}),
            Some(ADMIN_KEY),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_removes_shoe() {
    let app = make_app(make_state());
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/v1/shoes/{SPEEDCROSS}"))
        .header(AUTHORIZATION, format!("Bearer {ADMIN_KEY}"))
        .body(Body::empty())
        .expect("request");
    let response = app.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["data"]["deleted"], true);

    let gone = app
        .oneshot(get(&format!("/api/v1/shoes/{SPEEDCROSS}")))
        .await
        .expect("response");
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[tokio::test]
async fn posted_review_is_listed_first_and_signalled() {
    let state = make_state();
    let mut receiver = state.events.subscribe();
    let app = make_app(state);
    let uri = format!("/api/v1/shoes/{SPEEDCROSS}/reviews");

    let body = json!({
        "user_id": "u-42",
        "email": "mud.runner@example.org",
        "content": "  Unreal grip on wet rock  ",
    });
    let response = app
        .clone()
        .oneshot(send_json("POST", &uri, &body, None))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let posted = read_json(response).await;
    assert_eq!(posted["data"]["user_name"], "mud.runner");
    assert_eq!(posted["data"]["content"], "Unreal grip on wet rock");

    let event = receiver.recv().await.expect("reviewAdded");
    assert_eq!(event.shoe_id.to_string(), SPEEDCROSS);

    let list = read_json(app.oneshot(get(&uri)).await.expect("response")).await;
    let reviews = list["data"].as_array().expect("data array");
    assert_eq!(reviews.len(), 3);
    assert_eq!(reviews[0]["id"], posted["data"]["id"]);
}

#[tokio::test]
async fn blank_review_content_is_rejected() {
    let body = json!({"user_id": "u-42", "content": "   "});
    let response = make_app(make_state())
        .oneshot(send_json(
            "POST",
            &format!("/api/v1/shoes/{SPEEDCROSS}/reviews"),
            &body,
            None,
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"]["field"], "content");
}

#[tokio::test]
async fn anonymous_review_is_unauthorized() {
    let body = json!({"content": "hello"});
    let response = make_app(make_state())
        .oneshot(send_json(
            "POST",
            &format!("/api/v1/shoes/{SPEEDCROSS}/reviews"),
            &body,
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn review_for_unknown_shoe_is_404() {
    let body = json!({"user_id": "u-1", "content": "hello"});
    let response = make_app(make_state())
        .oneshot(send_json(
            "POST",
            &format!("/api/v1/shoes/{}/reviews", Uuid::new_v4()),
            &body,
            None,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn review_events_open_an_event_stream() {
    let response = make_app(make_state())
        .oneshot(get(&format!("/api/v1/shoes/{SPEEDCROSS}/reviews/events")))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE]
        .to_str()
        .expect("ascii");
    assert!(content_type.starts_with("text/event-stream"));
}

// ---------------------------------------------------------------------------
// Postgres mode (with DB)
// ---------------------------------------------------------------------------

fn make_pg_state(pool: sqlx::PgPool) -> AppState {
    AppState::new(Catalog::postgres(pool), Duration::from_millis(1))
}

#[sqlx::test(migrations = "../../migrations")]
async fn health_reports_postgres_mode(pool: sqlx::PgPool) {
    let response = make_app(make_pg_state(pool))
        .oneshot(get("/api/v1/health"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let json = read_json(response).await;
    assert_eq!(json["data"]["mode"], "postgres");
    assert_eq!(json["data"]["database"], "ok");
}

#[sqlx::test(migrations = "../../migrations")]
async fn postgres_create_detail_and_review_flow(pool: sqlx::PgPool) {
    let app = make_app(make_pg_state(pool));
    let body = json!({
        "name": "Tecton X 3",
        "brand": "Hoka",
        "stack_height": "33",
        "product_data": "{\"marketing_copy\": {\"slogan\": \"Carbon for the trail\"}}",
    });
    let created = read_json(
        app.clone()
            .oneshot(send_json("POST", "/api/v1/shoes", &body, Some(ADMIN_KEY)))
            .await
            .expect("response"),
    )
    .await;
    let id = created["data"]["id"].as_str().expect("id").to_string();

    let detail = read_json(
        app.clone()
            .oneshot(get(&format!("/api/v1/shoes/{id}")))
            .await
            .expect("response"),
    )
    .await;
    assert_eq!(detail["data"]["resolved"]["slogan"], "Carbon for the trail");
    assert_eq!(detail["data"]["resolved"]["specs"]["stack_height"], "33mm");

    let review = json!({"user_id": "u-7", "full_name": "Scree Runner", "content": "Fast"});
    let posted = app
        .clone()
        .oneshot(send_json(
            "POST",
            &format!("/api/v1/shoes/{id}/reviews"),
            &review,
            None,
        ))
        .await
        .expect("response");
    assert_eq!(posted.status(), StatusCode::CREATED);

    let reviews = read_json(
        app.oneshot(get(&format!("/api/v1/shoes/{id}/reviews")))
            .await
            .expect("response"),
    )
    .await;
    assert_eq!(reviews["data"][0]["user_name"], "Scree Runner");
}
