// farmconnect/src/web/extractors.rs

use actix_web::{FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

use crate::errors::AppError;
use crate::models::CurrentUser;

pub const USER_ID_HEADER: &str = "X-User-ID";
pub const USER_EMAIL_HEADER: &str = "X-User-Email";

/// The caller, as vouched for by the auth layer in front of this service.
///
/// Identity comes from the `X-User-ID` and `X-User-Email` headers.
#[derive(Debug)]
pub struct AuthenticatedUser(pub CurrentUser);

impl AuthenticatedUser {
  pub fn user(&self) -> &CurrentUser {
    &self.0
  }
}

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
  req
    .headers()
    .get(name)
    .and_then(|v| v.to_str().ok())
    .map(str::trim)
    .filter(|v| !v.is_empty())
    .map(str::to_string)
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    match header_value(req, USER_ID_HEADER) {
      Some(uid) => {
        let email = header_value(req, USER_EMAIL_HEADER).unwrap_or_default();
        ready(Ok(AuthenticatedUser(CurrentUser { uid, email })))
      }
      None => {
        warn!("AuthenticatedUser extractor: missing X-User-ID header.");
        ready(Err(AppError::Auth(
          "User authentication required. Missing X-User-ID header.".to_string(),
        )))
      }
    }
  }
}
