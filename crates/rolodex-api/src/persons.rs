//! Handlers for `/persons` endpoints.
//!
//! | Method   | Path            | Notes |
//! |----------|-----------------|-------|
//! | `GET`    | `/persons`      | `?limit=&offset=&contacts=true` |
//! | `POST`   | `/persons`      | Body: [`NewPerson`] |
//! | `GET`    | `/persons/:id`  | 404 if not found; `?contacts=true` |
//! | `PATCH`  | `/persons/:id`  | Body: [`UpdateBody`]; `null` if not found |
//! | `DELETE` | `/persons/:id`  | Deleted record, or `null` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use rolodex_core::{
  date::deserialize_nullable_date,
  person::{Gender, NewPerson, Person, PersonPatch, deserialize_nullable},
  store::{Pagination, PersonRepository},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, loader::ContactsLoader, validate};

// ─── Views ────────────────────────────────────────────────────────────────────

/// A person as rendered by the API, with the derived `age` and, on request,
/// its direct contacts.
#[derive(Debug, Serialize)]
pub struct PersonView {
  #[serde(flatten)]
  pub person:   Person,
  pub age:      Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub contacts: Option<Vec<PersonView>>,
}

impl From<Person> for PersonView {
  fn from(person: Person) -> Self {
    Self { age: person.age(), person, contacts: None }
  }
}

impl PersonView {
  fn with_contacts(mut self, contacts: Vec<Person>) -> Self {
    self.contacts = Some(contacts.into_iter().map(Self::from).collect());
    self
  }
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactsParam {
  #[serde(default)]
  pub contacts: bool,
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub limit:    Option<u32>,
  pub offset:   Option<u32>,
  #[serde(default)]
  pub contacts: bool,
}

#[derive(Debug, Serialize)]
pub struct PageBody {
  pub total_count: u64,
  pub persons:     Vec<PersonView>,
}

/// `GET /persons[?limit=<n>&offset=<n>&contacts=true]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<PageBody>, ApiError>
where
  S: PersonRepository + 'static,
{
  let page = Pagination::new(params.limit, params.offset);
  validate::page_limit(page.limit)?;

  let (total_count, persons) = tokio::try_join!(
    store.get_total_person_count(),
    store.find_persons_paginated(page),
  )
  .map_err(ApiError::store)?;

  let persons = if params.contacts {
    let ids: Vec<Uuid> = persons.iter().map(|p| p.id).collect();
    let contacts = ContactsLoader::new(Arc::clone(&store)).load_many(&ids).await?;
    persons
      .into_iter()
      .zip(contacts)
      .map(|(person, contacts)| PersonView::from(person).with_contacts(contacts))
      .collect()
  } else {
    persons.into_iter().map(PersonView::from).collect()
  };

  Ok(Json(PageBody { total_count, persons }))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /persons` — body: `{"name":..,"surname":..,"email":..}`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewPerson>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PersonRepository + 'static,
{
  validate::new_person(&body)?;
  let person = store
    .insert_person(body.into_person())
    .await
    .map_err(ApiError::store)?;
  tracing::info!(id = %person.id, "created person");
  Ok((StatusCode::CREATED, Json(PersonView::from(person))))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /persons/:id[?contacts=true]`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<ContactsParam>,
) -> Result<Json<PersonView>, ApiError>
where
  S: PersonRepository + 'static,
{
  let person = store
    .find_person_by_id(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("person {id} not found")))?;

  let view = PersonView::from(person);
  if !params.contacts {
    return Ok(Json(view));
  }
  let contacts = ContactsLoader::new(Arc::clone(&store)).load(id).await?;
  Ok(Json(view.with_contacts(contacts)))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// Fields to change. Omitted fields keep their current value; an explicit
/// `null` clears `gender`, `phone` or `birthdate`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateBody {
  pub name:      Option<String>,
  pub surname:   Option<String>,
  pub email:     Option<String>,
  #[serde(default, deserialize_with = "deserialize_nullable")]
  pub gender:    Option<Option<Gender>>,
  #[serde(default, deserialize_with = "deserialize_nullable")]
  pub phone:     Option<Option<String>>,
  #[serde(default, deserialize_with = "deserialize_nullable_date")]
  pub birthdate: Option<Option<NaiveDate>>,
}

impl UpdateBody {
  fn into_patch(self, id: Uuid) -> PersonPatch {
    PersonPatch {
      id,
      name: self.name,
      surname: self.surname,
      email: self.email,
      gender: self.gender,
      phone: self.phone,
      birthdate: self.birthdate,
    }
  }
}

/// `PATCH /persons/:id`
pub async fn update<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Option<PersonView>>, ApiError>
where
  S: PersonRepository + 'static,
{
  validate::update(&body)?;
  let patch = body.into_patch(id);
  if patch.is_empty() {
    return Err(ApiError::BadRequest("no fields to update".to_owned()));
  }
  let updated = store
    .update_person(patch)
    .await
    .map_err(ApiError::store)?;
  tracing::info!(%id, found = updated.is_some(), "updated person");
  Ok(Json(updated.map(PersonView::from)))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /persons/:id`
pub async fn delete<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Option<PersonView>>, ApiError>
where
  S: PersonRepository + 'static,
{
  let removed = store.remove_person_by_id(id).await.map_err(ApiError::store)?;
  tracing::info!(%id, found = removed.is_some(), "deleted person");
  Ok(Json(removed.map(PersonView::from)))
}
