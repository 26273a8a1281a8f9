// farmconnect/src/models/delivery.rs

use crate::models::PaymentMethod;
use serde::{Deserialize, Serialize};

/// What the customer enters at checkout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryDetails {
  #[serde(default)]
  pub delivery_address: String,
  #[serde(default)]
  pub phone: String,
  #[serde(default)]
  pub notes: String,
  #[serde(default)]
  pub payment_method: PaymentMethod,
}
