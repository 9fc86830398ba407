//! Handlers for the contact edges hanging off a person.
//!
//! | Method   | Path                                   | Notes |
//! |----------|----------------------------------------|-------|
//! | `POST`   | `/persons/:id/contacts`                | Body: `{"contact_id":"<uuid>"}` |
//! | `DELETE` | `/persons/:id/contacts/:contact_id`    | |
//!
//! Both answer `{person, contact}` on success and `{person: null, contact:
//! null}` when nothing changed.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use rolodex_core::{contact::ContactEdge, store::PersonRepository};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, persons::PersonView};

#[derive(Debug, Default, Serialize)]
pub struct EdgeBody {
  pub person:  Option<PersonView>,
  pub contact: Option<PersonView>,
}

impl EdgeBody {
  /// Re-read both endpoints after a successful change.
  async fn resolve<S>(store: &S, edge: ContactEdge) -> Result<Self, ApiError>
  where
    S: PersonRepository,
  {
    let (person, contact) = tokio::try_join!(
      store.find_person_by_id(edge.person_id),
      store.find_person_by_id(edge.contact_id),
    )
    .map_err(ApiError::store)?;
    Ok(Self {
      person:  person.map(PersonView::from),
      contact: contact.map(PersonView::from),
    })
  }
}

// ─── Add ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AddBody {
  pub contact_id: Uuid,
}

/// `POST /persons/:id/contacts`
pub async fn add<S>(
  State(store): State<Arc<S>>,
  Path(person_id): Path<Uuid>,
  Json(body): Json<AddBody>,
) -> Result<Json<EdgeBody>, ApiError>
where
  S: PersonRepository + 'static,
{
  let edge = ContactEdge::new(person_id, body.contact_id);
  let created = store.insert_contact(edge).await.map_err(ApiError::store)?;
  tracing::info!(%person_id, contact_id = %edge.contact_id, created, "added contact");
  if !created {
    return Ok(Json(EdgeBody::default()));
  }
  Ok(Json(EdgeBody::resolve(store.as_ref(), edge).await?))
}

// ─── Remove ───────────────────────────────────────────────────────────────────

/// `DELETE /persons/:id/contacts/:contact_id`
pub async fn remove<S>(
  State(store): State<Arc<S>>,
  Path((person_id, contact_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<EdgeBody>, ApiError>
where
  S: PersonRepository + 'static,
{
  let edge = ContactEdge::new(person_id, contact_id);
  let removed = store.remove_contact(edge).await.map_err(ApiError::store)?;
  tracing::info!(%person_id, %contact_id, removed, "removed contact");
  if !removed {
    return Ok(Json(EdgeBody::default()));
  }
  Ok(Json(EdgeBody::resolve(store.as_ref(), edge).await?))
}
