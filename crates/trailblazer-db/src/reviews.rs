//! Database operations for the `reviews` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use trailblazer_core::{NewReview, Review};
use uuid::Uuid;

use crate::DbError;

/// A row from the `reviews` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ReviewRow {
    pub id: Uuid,
    pub shoe_id: Uuid,
    pub user_id: String,
    pub user_name: String,
    pub user_photo: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            shoe_id: row.shoe_id,
            user_id: row.user_id,
            user_name: row.user_name,
            user_photo: row.user_photo,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

/// Returns the reviews for one shoe, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_reviews(pool: &PgPool, shoe_id: Uuid) -> Result<Vec<Review>, DbError> {
    let rows = sqlx::query_as::<_, ReviewRow>(
        "SELECT id, shoe_id, user_id, user_name, user_photo, content, created_at \
         FROM reviews \
         WHERE shoe_id = $1 \
         ORDER BY created_at DESC, id",
    )
    .bind(shoe_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Review::from).collect())
}

/// Inserts a review and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including a foreign-key
/// violation when the shoe does not exist.
pub async fn insert_review(pool: &PgPool, review: &NewReview) -> Result<Review, DbError> {
    let row = sqlx::query_as::<_, ReviewRow>(
        "INSERT INTO reviews (shoe_id, user_id, user_name, user_photo, content) \
         VALUES ($1, $2, $3, $4, $5) \
         RETURNING id, shoe_id, user_id, user_name, user_photo, content, created_at",
    )
    .bind(review.shoe_id)
    .bind(&review.user_id)
    .bind(&review.user_name)
    .bind(&review.user_photo)
    .bind(&review.content)
    .fetch_one(pool)
    .await?;

    Ok(row.into())
}
