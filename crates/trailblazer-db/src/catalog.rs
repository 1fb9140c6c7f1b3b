//! The backend facade handed to request handlers and CLI commands.
//!
//! Reads against Postgres degrade to the local mock dataset when the query
//! fails; writes always surface their error.

use sqlx::PgPool;
use trailblazer_core::{AppConfig, NewReview, NewShoe, Review, ShoePatch, ShoeRecord};
use uuid::Uuid;

use crate::{local::LocalStore, reviews, shoes, DbError};

#[derive(Debug, Clone)]
pub enum Catalog {
    Postgres { pool: PgPool, fallback: LocalStore },
    Local(LocalStore),
}

impl Catalog {
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self::Postgres {
            pool,
            fallback: LocalStore::in_memory(),
        }
    }

    #[must_use]
    pub fn local(store: LocalStore) -> Self {
        Self::Local(store)
    }

    /// Builds the catalog selected by `config`: Postgres when a database URL
    /// is set, otherwise the local store (file-backed when a path is set).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the pool cannot connect or the mock store file
    /// cannot be read.
    pub async fn from_config(config: &AppConfig) -> Result<Self, DbError> {
        if config.database_url.is_some() {
            let pool = crate::connect_pool_from_config(config).await?;
            return Ok(Self::postgres(pool));
        }

        let store = match &config.mock_store_path {
            Some(path) => LocalStore::open(path.clone()).await?,
            None => LocalStore::in_memory(),
        };
        tracing::warn!("no database configured; serving the catalog in mock mode");
        Ok(Self::Local(store))
    }

    #[must_use]
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Postgres { .. } => "postgres",
            Self::Local(_) => "mock",
        }
    }

    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        match self {
            Self::Postgres { pool, .. } => Some(pool),
            Self::Local(_) => None,
        }
    }

    /// # Errors
    ///
    /// Returns [`DbError`] if the database does not answer a ping.
    pub async fn health(&self) -> Result<(), DbError> {
        match self {
            Self::Postgres { pool, .. } => crate::health_check(pool).await,
            Self::Local(_) => Ok(()),
        }
    }

    // -----------------------------------------------------------------------
    // Shoes
    // -----------------------------------------------------------------------

    /// Every shoe, newest first.
    pub async fn list_shoes(&self) -> Vec<ShoeRecord> {
        match self {
            Self::Postgres { pool, fallback } => match shoes::list_shoes(pool).await {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::error!(error = %e, "listing shoes failed; serving mock data");
                    fallback.list_shoes().await
                }
            },
            Self::Local(store) => store.list_shoes().await,
        }
    }

    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] for an unknown id, or [`DbError::Sqlx`]
    /// if the query fails.
    pub async fn get_shoe(&self, id: Uuid) -> Result<ShoeRecord, DbError> {
        let shoe = match self {
            Self::Postgres { pool, .. } => shoes::get_shoe(pool, id).await?,
            Self::Local(store) => store.get_shoe(id).await,
        };
        shoe.ok_or(DbError::NotFound)
    }

    /// # Errors
    ///
    /// Returns [`DbError`] if the write fails.
    pub async fn create_shoe(&self, shoe: NewShoe) -> Result<ShoeRecord, DbError> {
        let created = match self {
            Self::Postgres { pool, .. } => shoes::insert_shoe(pool, &shoe).await?,
            Self::Local(store) => store.create_shoe(shoe).await?,
        };
        tracing::info!(shoe_id = %created.id, name = %created.name, "shoe created");
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] for an unknown id, or [`DbError`] if the
    /// write fails.
    pub async fn update_shoe(&self, id: Uuid, patch: ShoePatch) -> Result<ShoeRecord, DbError> {
        let updated = match self {
            Self::Postgres { pool, .. } => shoes::update_shoe(pool, id, patch)
                .await?
                .ok_or(DbError::NotFound)?,
            Self::Local(store) => store.update_shoe(id, patch).await?,
        };
        tracing::info!(shoe_id = %id, "shoe updated");
        Ok(updated)
    }

    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] for an unknown id, or [`DbError`] if the
    /// write fails.
    pub async fn delete_shoe(&self, id: Uuid) -> Result<(), DbError> {
        match self {
            Self::Postgres { pool, .. } => {
                if !shoes::delete_shoe(pool, id).await? {
                    return Err(DbError::NotFound);
                }
            }
            Self::Local(store) => store.delete_shoe(id).await?,
        }
        tracing::info!(shoe_id = %id, "shoe deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reviews
    // -----------------------------------------------------------------------

    /// Reviews for one shoe, newest first.
    pub async fn list_reviews(&self, shoe_id: Uuid) -> Vec<Review> {
        match self {
            Self::Postgres { pool, fallback } => match reviews::list_reviews(pool, shoe_id).await {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        shoe_id = %shoe_id,
                        "listing reviews failed; serving mock data"
                    );
                    fallback.list_reviews(shoe_id).await
                }
            },
            Self::Local(store) => store.list_reviews(shoe_id).await,
        }
    }

    /// # Errors
    ///
    /// Returns [`DbError`] if the write fails.
    pub async fn add_review(&self, review: NewReview) -> Result<Review, DbError> {
        let added = match self {
            Self::Postgres { pool, .. } => reviews::insert_review(pool, &review).await?,
            Self::Local(store) => store.add_review(review).await?,
        };
        tracing::info!(shoe_id = %added.shoe_id, review_id = %added.id, "review added");
        Ok(added)
    }
}
