//! Product row model.

use kiraa_core::error::CoreError;
use kiraa_core::product::Product;
use kiraa_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `products` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: DbId,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub daily_price: f64,
    pub weekly_price: Option<f64>,
    pub monthly_price: Option<f64>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub image_url: Option<String>,
    pub rating: f64,
    pub reviews_count: i32,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<ProductRow> for Product {
    type Error = CoreError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        Ok(Product {
            status: row.status.parse()?,
            id: row.id,
            name: row.name,
            category: row.category,
            description: row.description,
            daily_price: row.daily_price,
            weekly_price: row.weekly_price,
            monthly_price: row.monthly_price,
            city: row.city,
            phone: row.phone,
            image_url: row.image_url,
            rating: row.rating,
            reviews_count: row.reviews_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
