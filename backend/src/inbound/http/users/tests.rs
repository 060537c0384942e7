//! Tests for users API handlers.

use super::*;
use crate::domain::ports::{CacheKey, MockUserCache, UserCache, UserCacheError};
use crate::domain::UserCollectionService;
use crate::outbound::cache::InMemoryUserCache;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use std::sync::Arc;

#[fixture]
fn cache() -> Arc<InMemoryUserCache> {
    Arc::new(InMemoryUserCache::new())
}

fn state_over<C: UserCache + 'static>(cache: Arc<C>) -> HttpState {
    HttpState::new(Arc::new(UserCollectionService::new(cache)))
}

fn test_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .configure(configure)
}

async fn send(state: HttpState, request: actix_http::Request) -> (StatusCode, Value) {
    let app = actix_test::init_service(test_app(state)).await;
    let response = actix_test::call_service(&app, request).await;
    let status = response.status();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON response body")
    };
    (status, value)
}

fn post_users(body: Value) -> actix_http::Request {
    actix_test::TestRequest::post()
        .uri("/users/add/user")
        .set_json(body)
        .to_request()
}

async fn seed(cache: &Arc<InMemoryUserCache>, users: Value) {
    let payload = serde_json::to_string(&users).expect("seed payload");
    cache
        .set(CacheKey::Users, &payload, None)
        .await
        .expect("seed cache");
}

#[rstest]
#[actix_web::test]
async fn list_returns_empty_array_for_absent_key(cache: Arc<InMemoryUserCache>) {
    let request = actix_test::TestRequest::get().uri("/users").to_request();
    let (status, body) = send(state_over(cache), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[rstest]
#[actix_web::test]
async fn list_returns_users_in_insertion_order(cache: Arc<InMemoryUserCache>) {
    seed(&cache, json!([{"id": 2, "name": "B"}, {"id": 1, "name": "A"}])).await;
    let request = actix_test::TestRequest::get().uri("/users").to_request();
    let (_, body) = send(state_over(cache), request).await;
    assert_eq!(body, json!([{"id": 2, "name": "B"}, {"id": 1, "name": "A"}]));
}

#[rstest]
#[actix_web::test]
async fn add_single_user_reports_outcome(cache: Arc<InMemoryUserCache>) {
    let (status, body) = send(
        state_over(cache.clone()),
        post_users(json!({"id": 1, "name": "Ada"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"addedCount": 1, "added": [{"id": 1, "name": "Ada"}]})
    );
    let counter = cache.get(CacheKey::UserNumber).await.expect("counter");
    assert_eq!(counter.as_deref(), Some("1"));
}

#[rstest]
#[actix_web::test]
async fn add_batch_appends_all_users(cache: Arc<InMemoryUserCache>) {
    let (status, body) = send(
        state_over(cache.clone()),
        post_users(json!([{"id": 1}, {"id": 2, "role": "admin"}])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.get("addedCount"), Some(&json!(2)));

    let stored = cache.get(CacheKey::Users).await.expect("get").expect("users");
    let stored: Value = serde_json::from_str(&stored).expect("stored JSON");
    assert_eq!(stored, json!([{"id": 1}, {"id": 2, "role": "admin"}]));
}

#[rstest]
#[actix_web::test]
async fn add_duplicate_id_is_conflict(cache: Arc<InMemoryUserCache>) {
    seed(&cache, json!([{"id": 1, "name": "A"}])).await;
    let (status, body) = send(
        state_over(cache.clone()),
        post_users(json!([{"id": 2}, {"id": 1}])),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("User with the same ID already exists.")
    );
    assert_eq!(body.get("code").and_then(Value::as_str), Some("conflict"));
    assert_eq!(body.pointer("/details/ids"), Some(&json!([1])));

    let stored = cache.get(CacheKey::Users).await.expect("get").expect("users");
    assert_eq!(stored, r#"[{"id":1,"name":"A"}]"#);
}

#[rstest]
#[case::not_json(b"{not json".to_vec())]
#[case::missing_id(br#"{"name": "no id"}"#.to_vec())]
#[case::string_id(br#"{"id": "7"}"#.to_vec())]
#[case::scalar(b"42".to_vec())]
#[actix_web::test]
async fn add_rejects_malformed_bodies(cache: Arc<InMemoryUserCache>, #[case] body: Vec<u8>) {
    let request = actix_test::TestRequest::post()
        .uri("/users/add/user")
        .insert_header(("content-type", "application/json"))
        .set_payload(body)
        .to_request();
    let (status, body) = send(state_over(cache.clone()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("invalid_request")
    );
    assert!(!cache.exists(CacheKey::Users).await.expect("exists"));
}

#[rstest]
#[actix_web::test]
async fn get_returns_matching_user(cache: Arc<InMemoryUserCache>) {
    seed(&cache, json!([{"id": 1, "name": "A"}, {"id": 2, "name": "B"}])).await;
    let request = actix_test::TestRequest::get().uri("/users/2").to_request();
    let (status, body) = send(state_over(cache), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": 2, "name": "B"}));
}

#[rstest]
#[actix_web::test]
async fn get_unknown_user_is_not_found(cache: Arc<InMemoryUserCache>) {
    seed(&cache, json!([{"id": 1}])).await;
    let request = actix_test::TestRequest::get().uri("/users/9").to_request();
    let (status, body) = send(state_over(cache), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("User not found.")
    );
}

#[rstest]
#[case("GET")]
#[case("PUT")]
#[case("DELETE")]
#[actix_web::test]
async fn non_integer_id_is_invalid_request(cache: Arc<InMemoryUserCache>, #[case] method: &str) {
    let uri = "/users/abc";
    let request = match method {
        "GET" => actix_test::TestRequest::get().uri(uri),
        "PUT" => actix_test::TestRequest::put().uri(uri).set_json(json!({"name": "x"})),
        _ => actix_test::TestRequest::delete().uri(uri),
    }
    .to_request();
    let (status, body) = send(state_over(cache), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.pointer("/details/field"), Some(&json!("id")));
}

#[rstest]
#[actix_web::test]
async fn update_merges_fields_and_keeps_id(cache: Arc<InMemoryUserCache>) {
    seed(&cache, json!([{"id": 1, "name": "A", "age": 30}])).await;
    let request = actix_test::TestRequest::put()
        .uri("/users/1")
        .set_json(json!({"id": 99, "name": "Z", "email": "z@example.com"}))
        .to_request();
    let (status, body) = send(state_over(cache.clone()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"id": 1, "name": "Z", "age": 30, "email": "z@example.com"})
    );
}

#[rstest]
#[actix_web::test]
async fn update_requires_an_object_body(cache: Arc<InMemoryUserCache>) {
    seed(&cache, json!([{"id": 1}])).await;
    let request = actix_test::TestRequest::put()
        .uri("/users/1")
        .set_json(json!(["not", "an", "object"]))
        .to_request();
    let (status, _) = send(state_over(cache), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[rstest]
#[actix_web::test]
async fn update_unknown_user_is_not_found(cache: Arc<InMemoryUserCache>) {
    seed(&cache, json!([{"id": 1}])).await;
    let request = actix_test::TestRequest::put()
        .uri("/users/5")
        .set_json(json!({"name": "x"}))
        .to_request();
    let (status, body) = send(state_over(cache), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.get("code").and_then(Value::as_str), Some("not_found"));
}

#[rstest]
#[actix_web::test]
async fn delete_removes_user_and_reports_success(cache: Arc<InMemoryUserCache>) {
    seed(&cache, json!([{"id": 1}, {"id": 2}])).await;
    let request = actix_test::TestRequest::delete().uri("/users/1").to_request();
    let (status, body) = send(state_over(cache.clone()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let stored = cache.get(CacheKey::Users).await.expect("get").expect("users");
    assert_eq!(stored, r#"[{"id":2}]"#);
}

#[rstest]
#[actix_web::test]
async fn delete_unknown_user_is_not_found(cache: Arc<InMemoryUserCache>) {
    let request = actix_test::TestRequest::delete().uri("/users/1").to_request();
    let (status, _) = send(state_over(cache), request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[rstest]
#[actix_web::test]
async fn unreachable_cache_is_service_unavailable() {
    let mut cache = MockUserCache::new();
    cache
        .expect_get()
        .returning(|_| Err(UserCacheError::connection("connection refused")));
    let request = actix_test::TestRequest::get().uri("/users").to_request();
    let (status, body) = send(state_over(Arc::new(cache)), request).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("service_unavailable")
    );
}

#[rstest]
#[actix_web::test]
async fn failed_write_is_redacted_internal_error() {
    let mut cache = MockUserCache::new();
    cache.expect_get().returning(|_| Ok(None));
    cache
        .expect_set()
        .returning(|_, _, _| Err(UserCacheError::command("OOM command not allowed")));
    let (status, body) = send(state_over(Arc::new(cache)), post_users(json!({"id": 1}))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body.get("code").and_then(Value::as_str),
        Some("internal_error")
    );
    assert_eq!(
        body.get("message").and_then(Value::as_str),
        Some("Internal server error")
    );
}
