//! The admin create/edit form and its conversion into a persistable shoe.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::product_data::{lenient, normalize_product_data, ProductData};
use crate::shoes::{NewShoe, ShoeRecord};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("{field} is required")]
    MissingField { field: &'static str },

    #[error("product_data JSON 格式錯誤：{message}")]
    ProductData { message: String },
}

impl FormError {
    /// The form field the error belongs to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field } => field,
            Self::ProductData { .. } => "product_data",
        }
    }
}

/// Raw admin form payload. Every scalar is free text, as typed by the editor;
/// numbers sent as JSON numbers are accepted too.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShoeForm {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub brand: String,
    #[serde(deserialize_with = "lenient::text")]
    pub category: String,
    #[serde(deserialize_with = "lenient::text")]
    pub release_year: String,
    #[serde(deserialize_with = "lenient::text")]
    pub release_month: String,
    #[serde(deserialize_with = "lenient::text")]
    pub stack_height: String,
    #[serde(deserialize_with = "lenient::text")]
    pub drop: String,
    #[serde(deserialize_with = "lenient::text")]
    pub lug_depth: String,
    #[serde(deserialize_with = "lenient::text")]
    pub weight: String,
    #[serde(deserialize_with = "lenient::text")]
    pub cover_image_url: String,
    #[serde(deserialize_with = "lenient::text")]
    pub youtube_video_url: String,
    #[serde(deserialize_with = "lenient::text")]
    pub image_url: String,
    #[serde(deserialize_with = "lenient::text")]
    pub video_url: String,
    #[serde(deserialize_with = "lenient::text")]
    pub pdf_url: String,
    pub slides: Vec<String>,
    #[serde(deserialize_with = "lenient::text")]
    pub short_desc: String,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    /// The free-form JSON textarea.
    #[serde(deserialize_with = "lenient::text")]
    pub product_data: String,
}

impl ShoeForm {
    /// Validates and coerces the form.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::MissingField`] when `name` or `brand` is blank, and
    /// [`FormError::ProductData`] when the textarea is not a JSON object.
    pub fn into_submission(self) -> Result<NewShoe, FormError> {
        let name = required("name", &self.name)?;
        let brand = required("brand", &self.brand)?;

        let release_year = parse_int(&self.release_year);
        let release_month = parse_int(&self.release_month);
        let product_data = merge_release(&self.product_data, release_year, release_month)?;

        Ok(NewShoe {
            name,
            brand,
            category: optional(self.category),
            short_desc: optional(self.short_desc),
            description: optional(self.description),
            stack_height: parse_float(&self.stack_height),
            drop: parse_float(&self.drop),
            lug_depth: parse_float(&self.lug_depth),
            weight: parse_float(&self.weight),
            release_year: release_year.and_then(|y| i32::try_from(y).ok()),
            image_url: optional(self.image_url),
            cover_image_url: optional(self.cover_image_url),
            video_url: optional(self.video_url),
            youtube_video_url: optional(self.youtube_video_url),
            pdf_url: optional(self.pdf_url),
            slides: tags(self.slides),
            pros: tags(self.pros),
            cons: tags(self.cons),
            product_data: Some(Value::Object(product_data)),
        })
    }

    /// Pre-fills the edit form from a stored row. The textarea holds the
    /// normalized document, so legacy string encodings resubmit as objects.
    /// The release month is read back out of `product_data`.
    #[must_use]
    pub fn from_record(shoe: &ShoeRecord) -> Self {
        let document = normalize_product_data(shoe.product_data.as_ref());
        let product_data = if document.is_empty() {
            String::new()
        } else {
            serde_json::to_string_pretty(&document).unwrap_or_default()
        };
        let release_month = ProductData::from_map(&document)
            .identity()
            .and_then(|i| i.release_month)
            .filter(|m| *m != 0)
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();

        Self {
            name: shoe.name.clone(),
            brand: shoe.brand.clone(),
            category: shoe.category.clone().unwrap_or_default(),
            release_year: shoe
                .release_year
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            release_month,
            stack_height: number_text(shoe.stack_height),
            drop: number_text(shoe.drop),
            lug_depth: number_text(shoe.lug_depth),
            weight: number_text(shoe.weight),
            cover_image_url: shoe.cover_image_url.clone().unwrap_or_default(),
            youtube_video_url: shoe.youtube_video_url.clone().unwrap_or_default(),
            image_url: shoe.image_url.clone().unwrap_or_default(),
            video_url: shoe.video_url.clone().unwrap_or_default(),
            pdf_url: shoe.pdf_url.clone().unwrap_or_default(),
            slides: shoe.slides.clone(),
            short_desc: shoe.short_desc.clone().unwrap_or_default(),
            description: shoe.description.clone().unwrap_or_default(),
            pros: shoe.pros.clone(),
            cons: shoe.cons.clone(),
            product_data,
        }
    }
}

fn merge_release(
    textarea: &str,
    release_year: Option<i64>,
    release_month: Option<i64>,
) -> Result<Map<String, Value>, FormError> {
    let mut document = if textarea.trim().is_empty() {
        Map::new()
    } else {
        match serde_json::from_str::<Value>(textarea) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(FormError::ProductData {
                    message: "expected a JSON object".to_string(),
                })
            }
            Err(e) => {
                return Err(FormError::ProductData {
                    message: e.to_string(),
                })
            }
        }
    };

    let identity = document
        .entry("product_identity")
        .or_insert_with(|| Value::Object(Map::new()));
    if !identity.is_object() {
        *identity = Value::Object(Map::new());
    }
    if let Value::Object(identity) = identity {
        if let Some(year) = release_year {
            identity.insert("release_year".to_string(), Value::from(year));
        }
        if let Some(month) = release_month {
            identity.insert("release_month".to_string(), Value::from(month));
        }
    }

    Ok(document)
}

fn required(field: &'static str, value: &str) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(FormError::MissingField { field });
    }
    Ok(value.to_string())
}

fn optional(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn tags(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

fn number_text(value: Option<f64>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// Leading integer of `text`, e.g. `"2024"` and `"2024年"` give 2024.
fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let sign_len = usize::from(text.starts_with(['+', '-']));
    let digits = text[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len() - sign_len);
    if digits == 0 {
        return None;
    }
    text[..sign_len + digits].parse().ok()
}

/// Leading decimal number of `text`, e.g. `"31.5mm"` gives 31.5.
fn parse_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = usize::from(text.starts_with(['+', '-']));
    let mut seen_digit = false;
    let mut seen_dot = false;

    while let Some(&b) = bytes.get(end) {
        match b {
            b'0'..=b'9' => seen_digit = true,
            b'.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end += 1;
    }
    if !seen_digit {
        return None;
    }

    let mut number = &text[..end];
    // Optional exponent, only when it carries digits.
    if let Some(rest) = text[end..].strip_prefix(['e', 'E']) {
        let sign = usize::from(rest.starts_with(['+', '-']));
        let exp_digits = rest[sign..]
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len() - sign);
        if exp_digits > 0 {
            number = &text[..=end + sign + exp_digits];
        }
    }

    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
