// farmconnect/src/config.rs

use crate::errors::{AppError, Result};
use crate::services::money;
use dotenvy::dotenv;
use rusty_money::iso::Currency;
use std::env;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
  Memory,
  Postgres,
}

impl FromStr for StoreBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "memory" => Ok(StoreBackend::Memory),
      "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
      other => Err(AppError::Config(format!("Invalid STORE_BACKEND: '{}'", other))),
    }
  }
}

/// How the checkout reduces product stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StockPolicy {
  /// Write `max(0, cached stock - purchased)`. Concurrent checkouts can oversell.
  #[default]
  Clamp,
  /// Decrement atomically only if enough units remain; otherwise the checkout fails.
  Conditional,
}

impl FromStr for StockPolicy {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "clamp" => Ok(StockPolicy::Clamp),
      "conditional" => Ok(StockPolicy::Conditional),
      other => Err(AppError::Config(format!("Invalid STOCK_POLICY: '{}'", other))),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub store_backend: StoreBackend,
  pub database_url: Option<String>,
  pub currency: &'static Currency,
  pub delivery_lead_days: i64,
  pub confirmation_display_secs: u64,
  pub stock_policy: StockPolicy,
  pub seed_catalog: bool,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      store_backend: StoreBackend::Memory,
      database_url: None,
      currency: rusty_money::iso::INR,
      delivery_lead_days: 2,
      confirmation_display_secs: 5,
      stock_policy: StockPolicy::Clamp,
      seed_catalog: false,
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();
    let config = Self::from_lookup(|name| env::var(name).ok())?;
    tracing::info!(
      backend = ?config.store_backend,
      currency = config.currency.iso_alpha_code,
      stock_policy = ?config.stock_policy,
      "Application configuration loaded successfully."
    );
    Ok(config)
  }

  /// Builds the config from any variable source; unset variables take their defaults.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let defaults = Self::default();
    let parse_num = |name: &str| -> Result<Option<u64>> {
      lookup(name)
        .map(|v| {
          v.trim()
            .parse::<u64>()
            .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e)))
        })
        .transpose()
    };

    let server_host = lookup("SERVER_HOST").unwrap_or(defaults.server_host);
    let server_port = match parse_num("SERVER_PORT")? {
      Some(port) => u16::try_from(port).map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?,
      None => defaults.server_port,
    };
    let store_backend = match lookup("STORE_BACKEND") {
      Some(v) => v.parse()?,
      None => defaults.store_backend,
    };
    let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());
    if store_backend == StoreBackend::Postgres && database_url.is_none() {
      return Err(AppError::Config(
        "Missing environment variable 'DATABASE_URL' (required by STORE_BACKEND=postgres)".to_string(),
      ));
    }
    let currency = match lookup("CURRENCY_CODE") {
      Some(code) => {
        money::currency_for(&code).ok_or_else(|| AppError::Config(format!("Unknown CURRENCY_CODE: '{}'", code)))?
      }
      None => defaults.currency,
    };
    let delivery_lead_days = match parse_num("DELIVERY_LEAD_DAYS")? {
      Some(days) => i64::try_from(days).map_err(|e| AppError::Config(format!("Invalid DELIVERY_LEAD_DAYS: {}", e)))?,
      None => defaults.delivery_lead_days,
    };
    let confirmation_display_secs = parse_num("CONFIRMATION_DISPLAY_SECS")?.unwrap_or(defaults.confirmation_display_secs);
    let stock_policy = match lookup("STOCK_POLICY") {
      Some(v) => v.parse()?,
      None => defaults.stock_policy,
    };
    let seed_catalog = match lookup("SEED_CATALOG") {
      Some(v) => v
        .trim()
        .parse::<bool>()
        .map_err(|e| AppError::Config(format!("Invalid SEED_CATALOG value: {}", e)))?,
      None => defaults.seed_catalog,
    };

    Ok(Self {
      server_host,
      server_port,
      store_backend,
      database_url,
      currency,
      delivery_lead_days,
      confirmation_display_secs,
      stock_policy,
      seed_catalog,
    })
  }
}
