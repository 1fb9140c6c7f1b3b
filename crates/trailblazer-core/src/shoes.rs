use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A persisted shoe model.
///
/// `product_data` is kept exactly as stored: it may be an object, a JSON
/// string of an object, or a doubly-encoded JSON string. Use
/// [`crate::normalize_product_data`] or [`crate::ProductData::from_raw`]
/// before reading it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShoeRecord {
    pub id: Uuid,
    pub name: String,
    pub brand: String,
    pub category: Option<String>,
    pub short_desc: Option<String>,
    pub description: Option<String>,
    /// Legacy flat spec fields, millimetres / grams.
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

/// Fields for a new shoe row, as produced by the admin form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewShoe {
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
}

impl NewShoe {
    /// Materializes the row with a fresh id and creation timestamp.
    #[must_use]
    pub fn into_record(self, id: Uuid, created_at: DateTime<Utc>) -> ShoeRecord {
        ShoeRecord {
            id,
            name: self.name,
            brand: self.brand,
            category: self.category,
            short_desc: self.short_desc,
            description: self.description,
            stack_height: self.stack_height,
            drop: self.drop,
            lug_depth: self.lug_depth,
            weight: self.weight,
            release_year: self.release_year,
            image_url: self.image_url,
            cover_image_url: self.cover_image_url,
            video_url: self.video_url,
            youtube_video_url: self.youtube_video_url,
            pdf_url: self.pdf_url,
            slides: self.slides,
            pros: self.pros,
            cons: self.cons,
            product_data: self.product_data,
            created_at,
        }
    }
}

// Option<Option<T>> separates "not supplied" (outer None, keep current) from
// "explicitly cleared" (Some(None)) for nullable columns.
/// A partial update. Only supplied fields change; everything else is kept.
#[allow(clippy::option_option)]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShoePatch {
    pub name: Option<String>,
    pub brand: Option<String>,
    pub category: Option<Option<String>>,
    pub short_desc: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub stack_height: Option<Option<f64>>,
    pub drop: Option<Option<f64>>,
    pub lug_depth: Option<Option<f64>>,
    pub weight: Option<Option<f64>>,
    pub release_year: Option<Option<i32>>,
    pub image_url: Option<Option<String>>,
    pub cover_image_url: Option<Option<String>>,
    pub video_url: Option<Option<String>>,
    pub youtube_video_url: Option<Option<String>>,
    pub pdf_url: Option<Option<String>>,
    pub slides: Option<Vec<String>>,
    pub pros: Option<Vec<String>>,
    pub cons: Option<Vec<String>>,
    pub product_data: Option<Option<Value>>,
}

impl ShoePatch {
    /// Returns `true` if the patch would not change anything.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Merges the supplied fields into `record`. `id` and `created_at` are
    /// never touched.
    pub fn apply(self, record: &mut ShoeRecord) {
        fn set<T>(slot: &mut T, value: Option<T>) {
            if let Some(value) = value {
                *slot = value;
            }
        }

        set(&mut record.name, self.name);
        set(&mut record.brand, self.brand);
        set(&mut record.category, self.category);
        set(&mut record.short_desc, self.short_desc);
        set(&mut record.description, self.description);
        set(&mut record.stack_height, self.stack_height);
        set(&mut record.drop, self.drop);
        set(&mut record.lug_depth, self.lug_depth);
        set(&mut record.weight, self.weight);
        set(&mut record.release_year, self.release_year);
        set(&mut record.image_url, self.image_url);
        set(&mut record.cover_image_url, self.cover_image_url);
        set(&mut record.video_url, self.video_url);
        set(&mut record.youtube_video_url, self.youtube_video_url);
        set(&mut record.pdf_url, self.pdf_url);
        set(&mut record.slides, self.slides);
        set(&mut record.pros, self.pros);
        set(&mut record.cons, self.cons);
        set(&mut record.product_data, self.product_data);
    }
}

/// A full form submission replaces every form-backed field.
impl From<NewShoe> for ShoePatch {
    fn from(shoe: NewShoe) -> Self {
        Self {
            name: Some(shoe.name),
            brand: Some(shoe.brand),
            category: Some(shoe.category),
            short_desc: Some(shoe.short_desc),
            description: Some(shoe.description),
            stack_height: Some(shoe.stack_height),
            drop: Some(shoe.drop),
            lug_depth: Some(shoe.lug_depth),
            weight: Some(shoe.weight),
            release_year: Some(shoe.release_year),
            image_url: Some(shoe.image_url),
            cover_image_url: Some(shoe.cover_image_url),
            video_url: Some(shoe.video_url),
            youtube_video_url: Some(shoe.youtube_video_url),
            pdf_url: Some(shoe.pdf_url),
            slides: Some(shoe.slides),
            pros: Some(shoe.pros),
            cons: Some(shoe.cons),
            product_data: Some(shoe.product_data),
        }
    }
}
