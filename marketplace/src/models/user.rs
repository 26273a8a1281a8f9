// farmconnect/src/models/user.rs

use serde::Serialize;

/// The signed-in customer as reported by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
  pub uid: String,
  pub email: String,
}
