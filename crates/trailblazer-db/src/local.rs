//! Mock-mode storage: a namespaced key-value map of JSON documents.
//!
//! Keys follow `"<ns>_<entity>"` / `"<ns>_<entity>_<id>"`. The map lives in
//! memory and, when a path is configured, is rewritten to a single JSON file
//! after every mutation. New shoes and reviews are prepended so lists stay
//! newest first.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;
use trailblazer_core::{NewReview, NewShoe, Review, ShoePatch, ShoeRecord};
use uuid::Uuid;

use crate::{seed, DbError};

pub const NAMESPACE: &str = "trailblazer_mock";

type Entries = BTreeMap<String, Value>;

#[must_use]
pub fn shoes_key() -> String {
    format!("{NAMESPACE}_shoes")
}

#[must_use]
pub fn reviews_key(shoe_id: Uuid) -> String {
    format!("{NAMESPACE}_reviews_{shoe_id}")
}

#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    entries: Arc<Mutex<Entries>>,
    path: Option<Arc<PathBuf>>,
}

impl LocalStore {
    /// An empty, memory-only store.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens a file-backed store, loading existing entries when the file
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] if the file cannot be read, or
    /// [`DbError::Json`] if it is not a JSON object.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, DbError> {
        let path = path.into();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => serde_json::from_slice::<Entries>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Entries::new(),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(path = %path.display(), keys = entries.len(), "opened mock store");

        Ok(Self {
            entries: Arc::new(Mutex::new(entries)),
            path: Some(Arc::new(path)),
        })
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref().map(PathBuf::as_path)
    }

    // -----------------------------------------------------------------------
    // Raw key-value access
    // -----------------------------------------------------------------------

    pub async fn get(&self, key: &str) -> Option<Value> {
        self.entries.lock().await.get(key).cloned()
    }

    /// # Errors
    ///
    /// Returns [`DbError`] if the backing file cannot be written.
    pub async fn set(&self, key: &str, value: Value) -> Result<(), DbError> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value);
        self.persist(&entries).await
    }

    /// # Errors
    ///
    /// Returns [`DbError`] if the backing file cannot be written.
    pub async fn remove(&self, key: &str) -> Result<Option<Value>, DbError> {
        let mut entries = self.entries.lock().await;
        let removed = entries.remove(key);
        if removed.is_some() {
            self.persist(&entries).await?;
        }
        Ok(removed)
    }

    // Written while the lock is held so file contents follow mutation order.
    async fn persist(&self, entries: &Entries) -> Result<(), DbError> {
        let Some(path) = self.path.as_deref() else {
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(path, bytes).await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Shoes
    // -----------------------------------------------------------------------

    /// Stored shoes, or the seed dataset when nothing has been stored yet.
    pub async fn list_shoes(&self) -> Vec<ShoeRecord> {
        let entries = self.entries.lock().await;
        shoes_in(&entries)
    }

    pub async fn get_shoe(&self, id: Uuid) -> Option<ShoeRecord> {
        self.list_shoes().await.into_iter().find(|s| s.id == id)
    }

    /// Prepends a new shoe with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be persisted.
    pub async fn create_shoe(&self, shoe: NewShoe) -> Result<ShoeRecord, DbError> {
        let mut record = shoe.into_record(Uuid::new_v4(), Utc::now());
        record.product_data = record.product_data.map(decode_document);

        let mut entries = self.entries.lock().await;
        let mut shoes = shoes_in(&entries);
        shoes.insert(0, record.clone());
        entries.insert(shoes_key(), serde_json::to_value(&shoes)?);
        self.persist(&entries).await?;

        tracing::debug!(shoe_id = %record.id, "created mock shoe");
        Ok(record)
    }

    /// Merges `patch` into the stored shoe.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] for an unknown id, or [`DbError`] if the
    /// store cannot be persisted.
    pub async fn update_shoe(&self, id: Uuid, patch: ShoePatch) -> Result<ShoeRecord, DbError> {
        let mut entries = self.entries.lock().await;
        let mut shoes = shoes_in(&entries);
        let shoe = shoes
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(DbError::NotFound)?;

        patch.apply(shoe);
        shoe.product_data = shoe.product_data.take().map(decode_document);
        let updated = shoe.clone();

        entries.insert(shoes_key(), serde_json::to_value(&shoes)?);
        self.persist(&entries).await?;
        Ok(updated)
    }

    /// Removes a shoe and its reviews.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] for an unknown id, or [`DbError`] if the
    /// store cannot be persisted.
    pub async fn delete_shoe(&self, id: Uuid) -> Result<(), DbError> {
        let mut entries = self.entries.lock().await;
        let mut shoes = shoes_in(&entries);
        let before = shoes.len();
        shoes.retain(|s| s.id != id);
        if shoes.len() == before {
            return Err(DbError::NotFound);
        }

        entries.insert(shoes_key(), serde_json::to_value(&shoes)?);
        entries.remove(&reviews_key(id));
        self.persist(&entries).await
    }

    // -----------------------------------------------------------------------
    // Reviews
    // -----------------------------------------------------------------------

    /// Stored reviews for a shoe, or its seed reviews when none were stored.
    pub async fn list_reviews(&self, shoe_id: Uuid) -> Vec<Review> {
        let entries = self.entries.lock().await;
        reviews_in(&entries, shoe_id)
    }

    /// Prepends a review to the shoe's list.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the store cannot be persisted.
    pub async fn add_review(&self, review: NewReview) -> Result<Review, DbError> {
        let review = review.into_review(Uuid::new_v4(), Utc::now());

        let mut entries = self.entries.lock().await;
        let mut reviews = reviews_in(&entries, review.shoe_id);
        reviews.insert(0, review.clone());
        entries.insert(reviews_key(review.shoe_id), serde_json::to_value(&reviews)?);
        self.persist(&entries).await?;

        tracing::debug!(shoe_id = %review.shoe_id, review_id = %review.id, "added mock review");
        Ok(review)
    }
}

fn shoes_in(entries: &Entries) -> Vec<ShoeRecord> {
    decode_list(entries, &shoes_key()).unwrap_or_else(seed::seed_shoes)
}

fn reviews_in(entries: &Entries, shoe_id: Uuid) -> Vec<Review> {
    decode_list(entries, &reviews_key(shoe_id)).unwrap_or_else(|| seed::seed_reviews(shoe_id))
}

/// `None` when the key is missing or holds something that is not a list of
/// `T`; callers then fall back to seed data.
fn decode_list<T: DeserializeOwned>(entries: &Entries, key: &str) -> Option<Vec<T>> {
    let value = entries.get(key)?;
    match Vec::<T>::deserialize(value) {
        Ok(items) => Some(items),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring unreadable mock store entry");
            None
        }
    }
}

/// Mock mode keeps `product_data` as a document rather than a string.
fn decode_document(value: Value) -> Value {
    match value {
        Value::String(text) => serde_json::from_str(&text).unwrap_or(Value::String(text)),
        other => other,
    }
}

#[cfg(test)]
#[path = "local_test.rs"]
mod tests;
