//! Input constraints enforced before anything reaches the repository.

use rolodex_core::person::NewPerson;

use crate::{error::ApiError, persons::UpdateBody};

pub const MAX_NAME_LEN: usize = 256;
pub const MAX_EMAIL_LEN: usize = 320;
pub const MAX_PHONE_LEN: usize = 32;
pub const MAX_PAGE_LIMIT: u32 = 100;

fn name(field: &str, value: &str) -> Result<(), ApiError> {
  let len = value.chars().count();
  if len == 0 || len > MAX_NAME_LEN {
    return Err(ApiError::BadRequest(format!(
      "{field} must be between 1 and {MAX_NAME_LEN} characters"
    )));
  }
  Ok(())
}

fn email(value: &str) -> Result<(), ApiError> {
  let well_formed = value.chars().count() <= MAX_EMAIL_LEN
    && !value.chars().any(char::is_whitespace)
    && matches!(
      value.split_once('@'),
      Some((local, domain)) if !local.is_empty() && !domain.is_empty() && !domain.contains('@')
    );
  if !well_formed {
    return Err(ApiError::BadRequest(format!("invalid email: {value:?}")));
  }
  Ok(())
}

fn phone(value: &str) -> Result<(), ApiError> {
  if value.chars().count() > MAX_PHONE_LEN {
    return Err(ApiError::BadRequest(format!(
      "phone must be at most {MAX_PHONE_LEN} characters"
    )));
  }
  Ok(())
}

pub fn new_person(input: &NewPerson) -> Result<(), ApiError> {
  name("name", &input.name)?;
  name("surname", &input.surname)?;
  email(&input.email)?;
  input.phone.as_deref().map(phone).transpose()?;
  Ok(())
}

pub fn update(body: &UpdateBody) -> Result<(), ApiError> {
  body.name.as_deref().map(|v| name("name", v)).transpose()?;
  body.surname.as_deref().map(|v| name("surname", v)).transpose()?;
  body.email.as_deref().map(email).transpose()?;
  body.phone.as_ref().and_then(Option::as_deref).map(phone).transpose()?;
  Ok(())
}

pub fn page_limit(limit: u32) -> Result<(), ApiError> {
  if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
    return Err(ApiError::BadRequest(format!(
      "limit must be between 1 and {MAX_PAGE_LIMIT}"
    )));
  }
  Ok(())
}
