//! Normalization of the free-form `product_data` document.
//!
//! Rows written by older admin builds stored `product_data` as an object, as
//! a JSON string, or as a JSON string of a JSON string. [`normalize_product_data`]
//! folds all of those into a plain object; [`ProductData`] is the typed,
//! all-optional view over the result.

pub(crate) mod lenient;
mod sections;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub use sections::{
    ApproxPrice, BuyingGuide, BuyingScenario, CommunitySentiment, CompetitorEntry, Component,
    Components, FitAlert, FitAndSizing, MarketingCopy, PerformanceAnalysis, PerformanceScore,
    PriceInfo, ProductIdentity, ProsAndCons, SentimentDetail, Specifications, SplitStackHeight,
    StackHeight,
};

/// Trimmed string payloads that mean "no document".
const EMPTY_SENTINELS: [&str; 3] = ["", "null", "\"\""];

/// Folds a stored `product_data` value into a JSON object.
///
/// Strings are decoded, and a decoded string is decoded exactly once more.
/// Anything that does not end up as an object yields an empty map. Decode
/// failures are logged and never returned.
#[must_use]
pub fn normalize_product_data(raw: Option<&Value>) -> Map<String, Value> {
    match raw {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(Value::String(text)) => decode_text(text),
        Some(other) => {
            tracing::debug!(kind = value_kind(other), "product_data is not an object");
            Map::new()
        }
    }
}

fn decode_text(text: &str) -> Map<String, Value> {
    let trimmed = text.trim();
    if EMPTY_SENTINELS.contains(&trimmed) {
        return Map::new();
    }

    let decoded = match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::String(inner)) => match serde_json::from_str::<Value>(&inner) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, "product_data inner string is not JSON");
                Value::String(inner)
            }
        },
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "failed to decode product_data; treating as empty");
            return Map::new();
        }
    };

    match decoded {
        Value::Object(map) => map,
        other => {
            tracing::debug!(kind = value_kind(&other), "decoded product_data is not an object");
            Map::new()
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Typed view of a normalized `product_data` document. Every section is
/// optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_identity: Option<ProductIdentity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing_copy: Option<MarketingCopy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specifications: Option<Specifications>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_analysis: Option<PerformanceAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fit_and_sizing: Option<FitAndSizing>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub community_sentiment: Option<CommunitySentiment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub competitor_comparison: Option<Vec<CompetitorEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buying_guide: Option<BuyingGuide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pros_and_cons: Option<ProsAndCons>,
}

impl ProductData {
    /// Normalizes a stored value and reads the typed sections from it.
    #[must_use]
    pub fn from_raw(raw: Option<&Value>) -> Self {
        Self::from_map(&normalize_product_data(raw))
    }

    /// Reads each section independently; a malformed section is dropped
    /// without affecting its siblings.
    #[must_use]
    pub fn from_map(map: &Map<String, Value>) -> Self {
        Self {
            product_identity: section(map, "product_identity"),
            marketing_copy: section(map, "marketing_copy"),
            specifications: section(map, "specifications"),
            performance_analysis: section(map, "performance_analysis"),
            fit_and_sizing: section(map, "fit_and_sizing"),
            community_sentiment: section(map, "community_sentiment"),
            competitor_comparison: list_section(map, "competitor_comparison"),
            buying_guide: section(map, "buying_guide"),
            pros_and_cons: section(map, "pros_and_cons"),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    #[must_use]
    pub fn identity(&self) -> Option<&ProductIdentity> {
        self.product_identity.as_ref()
    }

    #[must_use]
    pub fn marketing(&self) -> Option<&MarketingCopy> {
        self.marketing_copy.as_ref()
    }

    #[must_use]
    pub fn specs(&self) -> Option<&Specifications> {
        self.specifications.as_ref()
    }
}

fn section<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    let value = map.get(key).filter(|v| !v.is_null())?;
    if !value.is_object() {
        tracing::warn!(
            section = key,
            kind = value_kind(value),
            "dropping product_data section that is not an object"
        );
        return None;
    }
    match T::deserialize(value) {
        Ok(section) => Some(section),
        Err(e) => {
            tracing::warn!(section = key, error = %e, "dropping malformed product_data section");
            None
        }
    }
}

fn list_section<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<Vec<T>> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .filter(|item| item.is_object())
                .filter_map(|item| T::deserialize(item).ok())
                .collect(),
        ),
        Some(other) => {
            tracing::warn!(
                section = key,
                kind = value_kind(other),
                "dropping product_data section that is not a list"
            );
            None
        }
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
