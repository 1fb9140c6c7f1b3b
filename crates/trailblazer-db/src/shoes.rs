//! Database operations for the `shoes` table.

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use trailblazer_core::{NewShoe, ShoePatch, ShoeRecord};
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `shoes` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ShoeRow {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub category: Option<String>,
    pub short_desc: Option<String>,
    pub description: Option<String>,
    pub stack_height: Option<f64>,
    pub drop: Option<f64>,
    pub lug_depth: Option<f64>,
    pub weight: Option<f64>,
    pub release_year: Option<i32>,
    pub image_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub video_url: Option<String>,
    pub youtube_video_url: Option<String>,
    pub pdf_url: Option<String>,
    pub slides: Vec<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub product_data: Option<Value>,
    pub created_at: DateTime<Utc>,
}

impl From<ShoeRow> for ShoeRecord {
    fn from(row: ShoeRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            brand: row.brand,
            category: row.category,
            short_desc: row.short_desc,
            description: row.description,
            stack_height: row.stack_height,
            drop: row.drop,
            lug_depth: row.lug_depth,
            weight: row.weight,
            release_year: row.release_year,
            image_url: row.image_url,
            cover_image_url: row.cover_image_url,
            video_url: row.video_url,
            youtube_video_url: row.youtube_video_url,
            pdf_url: row.pdf_url,
            slides: row.slides,
            pros: row.pros,
            cons: row.cons,
            product_data: row.product_data,
            created_at: row.created_at,
        }
    }
}

const SHOE_COLUMNS: &str = "id, name, brand, category, short_desc, description, \
     stack_height, \"drop\", lug_depth, weight, release_year, image_url, cover_image_url, \
     video_url, youtube_video_url, pdf_url, slides, pros, cons, product_data, created_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns every shoe, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_shoes(pool: &PgPool) -> Result<Vec<ShoeRecord>, DbError> {
    let rows = sqlx::query_as::<_, ShoeRow>(&format!(
        "SELECT {SHOE_COLUMNS} FROM shoes ORDER BY created_at DESC, id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ShoeRecord::from).collect())
}

/// Returns a single shoe by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_shoe(pool: &PgPool, id: Uuid) -> Result<Option<ShoeRecord>, DbError> {
    let row = sqlx::query_as::<_, ShoeRow>(&format!(
        "SELECT {SHOE_COLUMNS} FROM shoes WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(ShoeRecord::from))
}

/// Inserts a shoe and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_shoe(pool: &PgPool, shoe: &NewShoe) -> Result<ShoeRecord, DbError> {
    let row = sqlx::query_as::<_, ShoeRow>(&format!(
        "INSERT INTO shoes (name, brand, category, short_desc, description, stack_height, \
             \"drop\", lug_depth, weight, release_year, image_url, cover_image_url, video_url, \
             youtube_video_url, pdf_url, slides, pros, cons, product_data) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19) \
         RETURNING {SHOE_COLUMNS}"
    ))
    .bind(&shoe.name)
    .bind(&shoe.brand)
    .bind(&shoe.category)
    .bind(&shoe.short_desc)
    .bind(&shoe.description)
    .bind(shoe.stack_height)
    .bind(shoe.drop)
    .bind(shoe.lug_depth)
    .bind(shoe.weight)
    .bind(shoe.release_year)
    .bind(&shoe.image_url)
    .bind(&shoe.cover_image_url)
    .bind(&shoe.video_url)
    .bind(&shoe.youtube_video_url)
    .bind(&shoe.pdf_url)
    .bind(&shoe.slides)
    .bind(&shoe.pros)
    .bind(&shoe.cons)
    .bind(&shoe.product_data)
    .fetch_one(pool)
    .await?;

    Ok(row.into())
}

/// Applies a partial update and returns the updated row, or `None` if the
/// shoe does not exist.
///
/// The row is locked, merged in memory, and written back in one transaction,
/// so concurrent patches to different fields do not clobber each other.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any statement fails.
pub async fn update_shoe(
    pool: &PgPool,
    id: Uuid,
    patch: ShoePatch,
) -> Result<Option<ShoeRecord>, DbError> {
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, ShoeRow>(&format!(
        "SELECT {SHOE_COLUMNS} FROM shoes WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(current) = current else {
        return Ok(None);
    };

    let mut shoe = ShoeRecord::from(current);
    if patch.is_empty() {
        return Ok(Some(shoe));
    }
    patch.apply(&mut shoe);

    let row = sqlx::query_as::<_, ShoeRow>(&format!(
        "UPDATE shoes SET \
             name = $2, brand = $3, category = $4, short_desc = $5, description = $6, \
             stack_height = $7, \"drop\" = $8, lug_depth = $9, weight = $10, release_year = $11, \
             image_url = $12, cover_image_url = $13, video_url = $14, youtube_video_url = $15, \
             pdf_url = $16, slides = $17, pros = $18, cons = $19, product_data = $20 \
         WHERE id = $1 \
         RETURNING {SHOE_COLUMNS}"
    ))
    .bind(id)
    .bind(&shoe.name)
    .bind(&shoe.brand)
    .bind(&shoe.category)
    .bind(&shoe.short_desc)
    .bind(&shoe.description)
    .bind(shoe.stack_height)
    .bind(shoe.drop)
    .bind(shoe.lug_depth)
    .bind(shoe.weight)
    .bind(shoe.release_year)
    .bind(&shoe.image_url)
    .bind(&shoe.cover_image_url)
    .bind(&shoe.video_url)
    .bind(&shoe.youtube_video_url)
    .bind(&shoe.pdf_url)
    .bind(&shoe.slides)
    .bind(&shoe.pros)
    .bind(&shoe.cons)
    .bind(&shoe.product_data)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(Some(row.into()))
}

/// Deletes a shoe (its reviews cascade). Returns `false` if nothing matched.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_shoe(pool: &PgPool, id: Uuid) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM shoes WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
