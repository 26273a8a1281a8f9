// farmconnect/src/web/handlers/product_handlers.rs

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::Product;
use crate::services::money;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
pub struct ListProductsQuery {
  pub search: Option<String>,
}

/// A catalog entry with the display fields the storefront shows on each card.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
  #[serde(flatten)]
  pub product: Product,
  pub formatted_price: String,
  pub in_stock: bool,
  pub low_stock: bool,
}

impl ProductView {
  pub fn new(product: Product, app_state: &AppState) -> Self {
    Self {
      formatted_price: money::format_amount(product.price, app_state.config.currency),
      in_stock: product.is_in_stock(),
      low_stock: product.is_low_stock(),
      product,
    }
  }
}

#[instrument(name = "handler::list_products", skip(app_state), fields(search = ?query.search))]
pub async fn list_products_handler(
  app_state: web::Data<AppState>,
  query: web::Query<ListProductsQuery>,
) -> Result<HttpResponse, AppError> {
  let products = app_state.catalog.list_products(query.search.as_deref()).await?;
  info!(count = products.len(), "Products fetched.");

  let products: Vec<ProductView> = products.into_iter().map(|p| ProductView::new(p, &app_state)).collect();
  Ok(HttpResponse::Ok().json(json!({
      "count": products.len(),
      "products": products
  })))
}

#[instrument(name = "handler::get_product", skip(app_state, path), fields(product_id = %path.as_ref()))]
pub async fn get_product_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  match app_state.catalog.get_product(product_id).await? {
    Some(product) => Ok(HttpResponse::Ok().json(json!({ "product": ProductView::new(product, &app_state) }))),
    None => {
      warn!(%product_id, "Product not found.");
      Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)))
    }
  }
}
