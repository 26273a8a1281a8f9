// farmconnect/src/services/catalog_seed.rs

//! Sample produce loaded at startup when `SEED_CATALOG=true`.

use crate::models::Product;
use crate::stores::{CatalogStore, StoreError};
use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

pub const GREEN_VALLEY_FARMER_ID: &str = "farmer-green-valley";
pub const SUNRISE_FARMER_ID: &str = "farmer-sunrise";

struct SeedProduct {
  name: &'static str,
  description: &'static str,
  price: i64,
  quantity: u32,
  farmer_id: &'static str,
  farmer_name: &'static str,
  location: &'static str,
  image_url: &'static str,
}

const SEED_PRODUCTS: [SeedProduct; 3] = [
  SeedProduct {
    name: "Fresh Organic Tomatoes",
    description: "Juicy red tomatoes grown without pesticides",
    price: 45,
    quantity: 50,
    farmer_id: GREEN_VALLEY_FARMER_ID,
    farmer_name: "Green Valley Organic Farm",
    location: "Pune, Maharashtra",
    image_url: "https://images.unsplash.com/photo-1546470427-e2c3d8b2e7f0?w=400",
  },
  SeedProduct {
    name: "Fresh Green Lettuce",
    description: "Crispy lettuce leaves, perfect for salads",
    price: 30,
    quantity: 35,
    farmer_id: GREEN_VALLEY_FARMER_ID,
    farmer_name: "Green Valley Organic Farm",
    location: "Pune, Maharashtra",
    image_url: "https://images.unsplash.com/photo-1556909114-4e3b9c1c0b6d?w=400",
  },
  SeedProduct {
    name: "Sweet Orange Carrots",
    description: "Crunchy carrots rich in vitamins",
    price: 40,
    quantity: 60,
    farmer_id: SUNRISE_FARMER_ID,
    farmer_name: "Sunrise Fresh Produce",
    location: "Nashik, Maharashtra",
    image_url: "https://images.unsplash.com/photo-1598170845058-32b9d6a5da37?w=400",
  },
];

/// The sample products. Ids are derived from the names so reseeding is stable.
pub fn sample_products() -> Vec<Product> {
  let now = Utc::now();
  SEED_PRODUCTS
    .iter()
    .map(|seed| Product {
      id: Uuid::new_v5(&Uuid::NAMESPACE_OID, seed.name.as_bytes()),
      name: seed.name.to_string(),
      description: seed.description.to_string(),
      price: Decimal::from(seed.price),
      quantity: seed.quantity,
      category: "vegetables".to_string(),
      farmer_id: seed.farmer_id.to_string(),
      farmer_name: seed.farmer_name.to_string(),
      location: seed.location.to_string(),
      image_url: Some(seed.image_url.to_string()),
      is_available: true,
      created_at: now,
      updated_at: now,
    })
    .collect()
}

pub async fn seed_catalog(catalog: &dyn CatalogStore) -> Result<usize, StoreError> {
  let mut inserted = 0;
  for product in sample_products() {
    if catalog.get_product(product.id).await?.is_some() {
      continue;
    }
    catalog.insert_product(product).await?;
    inserted += 1;
  }
  info!(inserted, "Catalog seeded.");
  Ok(inserted)
}
