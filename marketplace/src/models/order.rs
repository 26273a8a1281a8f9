// farmconnect/src/models/order.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown {kind} value: '{value}'")]
pub struct UnknownVariant {
  pub kind: &'static str,
  pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Confirmed,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Confirmed => "confirmed",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }
}

impl FromStr for OrderStatus {
  type Err = UnknownVariant;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(OrderStatus::Pending),
      "confirmed" => Ok(OrderStatus::Confirmed),
      "delivered" => Ok(OrderStatus::Delivered),
      "cancelled" => Ok(OrderStatus::Cancelled),
      other => Err(UnknownVariant {
        kind: "order status",
        value: other.to_string(),
      }),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  Pending,
  Completed,
  Failed,
}

impl PaymentStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      PaymentStatus::Pending => "pending",
      PaymentStatus::Completed => "completed",
      PaymentStatus::Failed => "failed",
    }
  }
}

impl FromStr for PaymentStatus {
  type Err = UnknownVariant;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "pending" => Ok(PaymentStatus::Pending),
      "completed" => Ok(PaymentStatus::Completed),
      "failed" => Ok(PaymentStatus::Failed),
      other => Err(UnknownVariant {
        kind: "payment status",
        value: other.to_string(),
      }),
    }
  }
}

/// How the customer intends to pay. No payment is processed; this is a label on the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
  #[default]
  #[serde(rename = "cash_on_delivery", alias = "cod")]
  CashOnDelivery,
  #[serde(rename = "online")]
  Online,
}

impl PaymentMethod {
  pub fn as_str(self) -> &'static str {
    match self {
      PaymentMethod::CashOnDelivery => "cash_on_delivery",
      PaymentMethod::Online => "online",
    }
  }
}

impl FromStr for PaymentMethod {
  type Err = UnknownVariant;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "cash_on_delivery" | "cod" => Ok(PaymentMethod::CashOnDelivery),
      "online" => Ok(PaymentMethod::Online),
      other => Err(UnknownVariant {
        kind: "payment method",
        value: other.to_string(),
      }),
    }
  }
}

impl fmt::Display for PaymentMethod {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
  pub product_id: Uuid,
  pub product_name: String,
  pub quantity: u32,
  #[serde(with = "rust_decimal::serde::str")]
  pub price_per_unit: Decimal,
  #[serde(with = "rust_decimal::serde::str")]
  pub total_price: Decimal,
  pub image_url: Option<String>,
}

/// An order as handed to the order store, before an id is assigned.
///
/// `checkout_key` together with `farmer_id` identifies the write: creating the
/// same pair twice yields the order stored the first time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
  pub checkout_key: Uuid,
  pub customer_id: String,
  pub customer_email: String,
  pub farmer_id: String,
  pub farmer_name: String,
  pub items: Vec<OrderItem>,
  pub total_amount: Decimal,
  pub delivery_address: String,
  pub phone: String,
  pub notes: String,
  pub payment_method: PaymentMethod,
  pub status: OrderStatus,
  pub payment_status: PaymentStatus,
  pub order_date: DateTime<Utc>,
  pub estimated_delivery: DateTime<Utc>,
}

impl NewOrder {
  pub fn into_order(self, id: Uuid) -> Order {
    Order {
      id,
      checkout_key: self.checkout_key,
      customer_id: self.customer_id,
      customer_email: self.customer_email,
      farmer_id: self.farmer_id,
      farmer_name: self.farmer_name,
      items: self.items,
      total_amount: self.total_amount,
      delivery_address: self.delivery_address,
      phone: self.phone,
      notes: self.notes,
      payment_method: self.payment_method,
      status: self.status,
      payment_status: self.payment_status,
      order_date: self.order_date,
      estimated_delivery: self.estimated_delivery,
    }
  }
}

/// A persisted, farmer-scoped order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  #[serde(skip_serializing)]
  pub checkout_key: Uuid,
  pub customer_id: String,
  pub customer_email: String,
  pub farmer_id: String,
  pub farmer_name: String,
  pub items: Vec<OrderItem>,
  #[serde(with = "rust_decimal::serde::str")]
  pub total_amount: Decimal,
  pub delivery_address: String,
  pub phone: String,
  pub notes: String,
  pub payment_method: PaymentMethod,
  pub status: OrderStatus,
  pub payment_status: PaymentStatus,
  pub order_date: DateTime<Utc>,
  pub estimated_delivery: DateTime<Utc>,
}
