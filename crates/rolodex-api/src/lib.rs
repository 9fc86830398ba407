//! JSON REST API for Rolodex.
//!
//! Exposes an axum [`Router`] backed by any
//! [`rolodex_core::store::PersonRepository`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! The server binary serves the router at the root:
//!
//! ```rust,ignore
//! axum::serve(listener, rolodex_api::api_router(Arc::new(store))).await?;
//! ```

pub mod contacts;
pub mod error;
pub mod loader;
pub mod persons;
pub mod validate;

use std::sync::Arc;

use axum::{
  Json, Router,
  routing::{delete, get, post},
};
use rolodex_core::store::PersonRepository;
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use loader::{ContactsLoader, LoadError};

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: PersonRepository + 'static,
{
  Router::new()
    .route("/health", get(health))
    // Persons
    .route("/persons", get(persons::list::<S>).post(persons::create::<S>))
    .route(
      "/persons/{id}",
      get(persons::get_one::<S>)
        .patch(persons::update::<S>)
        .delete(persons::delete::<S>),
    )
    // Contacts
    .route("/persons/{id}/contacts", post(contacts::add::<S>))
    .route("/persons/{id}/contacts/{contact_id}", delete(contacts::remove::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(store)
}

/// `GET /health`
async fn health() -> Json<bool> { Json(true) }

#[cfg(test)]
mod tests {
  use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
  };
  use rolodex_cache::{MemoryKv, PersonCache};
  use rolodex_store_sqlite::SqliteRepository;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::*;

  async fn make_store() -> Arc<SqliteRepository<MemoryKv>> {
    let cache = PersonCache::new(Arc::new(MemoryKv::new()));
    Arc::new(SqliteRepository::open_in_memory(cache).await.unwrap())
  }

  async fn call(
    store: &Arc<SqliteRepository<MemoryKv>>,
    method: &str,
    uri: &str,
    body: Option<Value>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    let resp = api_router(Arc::clone(store))
      .oneshot(builder.body(body).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
      Value::Null
    } else {
      serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
  }

  async fn create(
    store: &Arc<SqliteRepository<MemoryKv>>,
    name: &str,
    email: &str,
  ) -> Uuid {
    let (status, body) = call(
      store,
      "POST",
      "/persons",
      Some(json!({ "name": name, "surname": "Tester", "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().parse().unwrap()
  }

  #[tokio::test]
  async fn health_is_true() {
    let store = make_store().await;
    let (status, body) = call(&store, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(true));
  }

  #[tokio::test]
  async fn create_then_get_includes_age() {
    let store = make_store().await;
    let (status, body) = call(
      &store,
      "POST",
      "/persons",
      Some(json!({
        "name": "Grace",
        "surname": "Hopper",
        "email": "grace@example.com",
        "gender": "female",
        "birthdate": "1906-12-09"
      })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["created"], body["modified"]);
    assert!(body["age"].as_u64().unwrap() >= 119);

    let id = body["id"].as_str().unwrap();
    let (status, fetched) = call(&store, "GET", &format!("/persons/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["email"], "grace@example.com");
    assert_eq!(fetched["birthdate"], "1906-12-09");
    assert!(fetched.get("contacts").is_none());
  }

  #[tokio::test]
  async fn get_unknown_is_404() {
    let store = make_store().await;
    let (status, body) =
      call(&store, "GET", &format!("/persons/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("not found"));
  }

  #[tokio::test]
  async fn invalid_email_is_400() {
    let store = make_store().await;
    let (status, _) = call(
      &store,
      "POST",
      "/persons",
      Some(json!({ "name": "A", "surname": "B", "email": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, page) = call(&store, "GET", "/persons", None).await;
    assert_eq!(page["total_count"], 0);
  }

  #[tokio::test]
  async fn list_pages_by_email_with_total() {
    let store = make_store().await;
    create(&store, "C", "c@example.com").await;
    create(&store, "A", "a@example.com").await;
    create(&store, "B", "b@example.com").await;

    let (status, page) = call(&store, "GET", "/persons?limit=2&offset=1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["total_count"], 3);
    let emails: Vec<&str> = page["persons"]
      .as_array()
      .unwrap()
      .iter()
      .map(|p| p["email"].as_str().unwrap())
      .collect();
    assert_eq!(emails, vec!["b@example.com", "c@example.com"]);
  }

  #[tokio::test]
  async fn list_limit_out_of_range_is_400() {
    let store = make_store().await;
    let (status, _) = call(&store, "GET", "/persons?limit=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = call(&store, "GET", "/persons?limit=101", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn list_with_contacts_attaches_each_persons_edges() {
    let store = make_store().await;
    let a = create(&store, "A", "a@example.com").await;
    let b = create(&store, "B", "b@example.com").await;
    let c = create(&store, "C", "c@example.com").await;

    call(&store, "POST", &format!("/persons/{a}/contacts"), Some(json!({ "contact_id": b })))
      .await;
    call(&store, "POST", &format!("/persons/{a}/contacts"), Some(json!({ "contact_id": c })))
      .await;

    let (_, page) = call(&store, "GET", "/persons?contacts=true", None).await;
    let persons = page["persons"].as_array().unwrap();
    assert_eq!(persons[0]["id"], a.to_string());
    assert_eq!(persons[0]["contacts"].as_array().unwrap().len(), 2);
    assert!(persons[1]["contacts"].as_array().unwrap().is_empty());
    assert!(persons[2]["contacts"].as_array().unwrap().is_empty());
  }

  #[tokio::test]
  async fn add_and_remove_contact() {
    let store = make_store().await;
    let a = create(&store, "A", "a@example.com").await;
    let b = create(&store, "B", "b@example.com").await;
    let uri = format!("/persons/{a}/contacts");

    let (status, body) = call(&store, "POST", &uri, Some(json!({ "contact_id": b }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["person"]["id"], a.to_string());
    assert_eq!(body["contact"]["id"], b.to_string());

    // Already present.
    let (_, body) = call(&store, "POST", &uri, Some(json!({ "contact_id": b }))).await;
    assert_eq!(body, json!({ "person": null, "contact": null }));

    let (_, fetched) = call(&store, "GET", &format!("/persons/{a}?contacts=true"), None).await;
    assert_eq!(fetched["contacts"][0]["id"], b.to_string());

    let (_, body) = call(&store, "DELETE", &format!("{uri}/{b}"), None).await;
    assert_eq!(body["contact"]["id"], b.to_string());
    let (_, body) = call(&store, "DELETE", &format!("{uri}/{b}"), None).await;
    assert_eq!(body, json!({ "person": null, "contact": null }));
  }

  #[tokio::test]
  async fn add_contact_to_unknown_person_is_null_pair() {
    let store = make_store().await;
    let a = create(&store, "A", "a@example.com").await;
    let (status, body) = call(
      &store,
      "POST",
      &format!("/persons/{a}/contacts"),
      Some(json!({ "contact_id": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "person": null, "contact": null }));
  }

  #[tokio::test]
  async fn update_merges_and_bumps_modified() {
    let store = make_store().await;
    let id = create(&store, "Old", "old@example.com").await;
    let (_, before) = call(&store, "GET", &format!("/persons/{id}"), None).await;

    let (status, body) = call(
      &store,
      "PATCH",
      &format!("/persons/{id}"),
      Some(json!({ "name": "New", "phone": "555-0100" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "New");
    assert_eq!(body["phone"], "555-0100");
    assert_eq!(body["email"], "old@example.com");
    assert_eq!(body["created"], before["created"]);
    assert!(body["modified"].as_str().unwrap() >= before["modified"].as_str().unwrap());

    // The cached copy was invalidated.
    let (_, after) = call(&store, "GET", &format!("/persons/{id}"), None).await;
    assert_eq!(after["name"], "New");
  }

  #[tokio::test]
  async fn update_null_clears_optional_fields() {
    let store = make_store().await;
    let (_, body) = call(
      &store,
      "POST",
      "/persons",
      Some(json!({
        "name": "Old",
        "surname": "Tester",
        "email": "clear@example.com",
        "gender": "male",
        "phone": "555",
        "birthdate": "1990-04-01"
      })),
    )
    .await;
    let id = body["id"].as_str().unwrap().to_owned();

    let (status, body) = call(
      &store,
      "PATCH",
      &format!("/persons/{id}"),
      Some(json!({ "name": "New", "phone": null, "gender": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "New");
    assert_eq!(body["phone"], Value::Null);
    assert_eq!(body["gender"], Value::Null);
    // Omitted, so kept.
    assert_eq!(body["birthdate"], "1990-04-01");

    let (_, fetched) = call(&store, "GET", &format!("/persons/{id}"), None).await;
    assert_eq!(fetched["phone"], Value::Null);
    assert_eq!(fetched["gender"], Value::Null);

    let (_, body) =
      call(&store, "PATCH", &format!("/persons/{id}"), Some(json!({ "birthdate": null }))).await;
    assert_eq!(body["birthdate"], Value::Null);
    assert_eq!(body["age"], Value::Null);
  }

  #[tokio::test]
  async fn empty_update_is_400() {
    let store = make_store().await;
    let id = create(&store, "Same", "same@example.com").await;
    let (status, _) = call(&store, "PATCH", &format!("/persons/{id}"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn update_and_delete_unknown_are_null() {
    let store = make_store().await;
    let uri = format!("/persons/{}", Uuid::new_v4());
    let (status, body) = call(&store, "PATCH", &uri, Some(json!({ "name": "X" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
    let (status, body) = call(&store, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);
  }

  #[tokio::test]
  async fn delete_returns_record_and_get_is_404() {
    let store = make_store().await;
    let id = create(&store, "Gone", "gone@example.com").await;
    // Warm the cache so deletion has something to invalidate.
    call(&store, "GET", &format!("/persons/{id}"), None).await;

    let (status, body) = call(&store, "DELETE", &format!("/persons/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "gone@example.com");

    let (status, _) = call(&store, "GET", &format!("/persons/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
