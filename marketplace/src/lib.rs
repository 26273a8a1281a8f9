// farmconnect/src/lib.rs

//! FarmConnect marketplace: session carts, per-farmer order splitting and the
//! checkout workflow, served over a JSON API.
//!
//! The checkout runs as a `farmflow` pipeline:
//!
//! ```text
//! validate_delivery_details -> split_cart_by_farmer -> create_farmer_orders
//!   -> decrement_product_stock -> clear_cart -> log_checkout_summary
//! ```

pub mod config;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod state;
pub mod stores;
pub mod web;

pub use config::AppConfig;
pub use errors::AppError;
pub use state::AppState;
