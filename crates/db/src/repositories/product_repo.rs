//! Repository for the `products` table.

use kiraa_core::product::{NewProduct, ProductStatus, ProductUpdate};
use kiraa_core::store::{Pagination, ProductFilter};
use kiraa_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::product::ProductRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, category, description, daily_price, weekly_price, \
    monthly_price, city, phone, image_url, rating, reviews_count, status, created_at, updated_at";

/// Provides CRUD operations for catalogue products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a new product, returning the created row.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &NewProduct,
    ) -> Result<ProductRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO products
                (name, category, description, daily_price, weekly_price, monthly_price,
                 city, phone, image_url, rating, reviews_count, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductRow>(&query)
            .bind(&input.name)
            .bind(&input.category)
            .bind(&input.description)
            .bind(input.daily_price)
            .bind(input.weekly_price)
            .bind(input.monthly_price)
            .bind(&input.city)
            .bind(&input.phone)
            .bind(&input.image_url)
            .bind(input.rating)
            .bind(input.reviews_count)
            .bind(input.status.as_str())
            .fetch_one(executor)
            .await
    }

    /// Find an available product by ID. Hidden rows are excluded.
    pub async fn find_available<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<ProductRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM products WHERE id = $1 AND status = 'available'");
        sqlx::query_as::<_, ProductRow>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// List available products matching `filter`, newest first.
    pub async fn list_available<'e>(
        executor: impl PgExecutor<'e>,
        filter: &ProductFilter,
        page: Pagination,
    ) -> Result<Vec<ProductRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM products
             WHERE status = 'available'
               AND ($1::TEXT IS NULL OR category = $1)
               AND ($2::TEXT IS NULL OR city = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, ProductRow>(&query)
            .bind(&filter.category)
            .bind(&filter.city)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(executor)
            .await
    }

    /// Update an available product. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no available row with the given `id` exists.
    pub async fn update<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        input: &ProductUpdate,
    ) -> Result<Option<ProductRow>, sqlx::Error> {
        let query = format!(
            "UPDATE products SET
                name = COALESCE($2, name),
                category = COALESCE($3, category),
                description = COALESCE($4, description),
                daily_price = COALESCE($5, daily_price),
                weekly_price = COALESCE($6, weekly_price),
                monthly_price = COALESCE($7, monthly_price),
                city = COALESCE($8, city),
                phone = COALESCE($9, phone),
                image_url = COALESCE($10, image_url)
             WHERE id = $1 AND status = 'available'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductRow>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.category)
            .bind(&input.description)
            .bind(input.daily_price)
            .bind(input.weekly_price)
            .bind(input.monthly_price)
            .bind(&input.city)
            .bind(&input.phone)
            .bind(&input.image_url)
            .fetch_optional(executor)
            .await
    }

    /// Hide an available product from listings. Returns `true` if a row changed.
    pub async fn hide<'e>(executor: impl PgExecutor<'e>, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE products SET status = $2 WHERE id = $1 AND status = 'available'",
        )
        .bind(id)
        .bind(ProductStatus::Hidden.as_str())
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
