//! Derived display fields over a shoe row and its normalized `product_data`.
//!
//! Generic fields prefer the flat row column, then the nested document, then
//! a placeholder. Media URLs from the document are ignored when they are seed
//! placeholders.

use serde::Serialize;
use serde_json::{json, Value};

use crate::product_data::{ProductData, StackHeight};
use crate::shoes::ShoeRecord;

/// Inline SVG shown when a shoe has no usable image.
pub const PLACEHOLDER_IMAGE: &str = "data:image/svg+xml,%3Csvg xmlns=\"http://www.w3.org/2000/svg\" width=\"400\" height=\"300\"%3E%3Crect width=\"400\" height=\"300\" fill=\"%23f1f5f9\"/%3E%3Ctext x=\"50%25\" y=\"50%25\" font-family=\"Arial, sans-serif\" font-size=\"18\" fill=\"%2394a3b8\" text-anchor=\"middle\" dy=\".3em\"%3ENo Image%3C/text%3E%3C/svg%3E";

/// Rendered for any spec value that is missing.
pub const MISSING: &str = "-";

const SEED_IMAGE_MARKER: &str = "example.com";
const SEED_VIDEO_MARKER: &str = "watch?v=example";
const DEFAULT_CATEGORY: &str = "越野跑鞋";
const DEFAULT_CURRENCY: &str = "TWD";

/// Cover image: row `cover_image_url`, row `image_url`, then the document's
/// image unless it points at `example.com`.
#[must_use]
pub fn resolve_image<'a>(shoe: &'a ShoeRecord, data: &'a ProductData) -> Option<&'a str> {
    present(shoe.cover_image_url.as_deref())
        .or_else(|| present(shoe.image_url.as_deref()))
        .or_else(|| {
            data.identity()
                .and_then(|i| present(i.cover_image_url.as_deref()))
                .filter(|url| !url.contains(SEED_IMAGE_MARKER))
        })
}

/// [`resolve_image`], or [`PLACEHOLDER_IMAGE`].
#[must_use]
pub fn resolve_image_or_placeholder<'a>(shoe: &'a ShoeRecord, data: &'a ProductData) -> &'a str {
    resolve_image(shoe, data).unwrap_or(PLACEHOLDER_IMAGE)
}

/// Video: row `youtube_video_url`, row `video_url`, then the document's video
/// unless it is the `watch?v=example` seed link.
#[must_use]
pub fn resolve_video<'a>(shoe: &'a ShoeRecord, data: &'a ProductData) -> Option<&'a str> {
    present(shoe.youtube_video_url.as_deref())
        .or_else(|| present(shoe.video_url.as_deref()))
        .or_else(|| {
            data.identity()
                .and_then(|i| present(i.youtube_video_url.as_deref()))
                .filter(|url| !url.contains(SEED_VIDEO_MARKER))
        })
}

/// Stack height label, e.g. `"32mm (後) / 22mm (前)"`, `"30mm"`, or `"-"`.
#[must_use]
pub fn resolve_stack_height(shoe: &ShoeRecord, data: &ProductData) -> String {
    match data.specs().and_then(|s| s.stack_height.as_ref()) {
        Some(StackHeight::Split(split)) => {
            match (nonzero(split.heel_mm), nonzero(split.forefoot_mm)) {
                (Some(heel), Some(forefoot)) => {
                    return format!("{heel}mm (後) / {forefoot}mm (前)");
                }
                (Some(heel), None) => return format!("{heel}mm (後)"),
                _ => {}
            }
        }
        Some(StackHeight::Millimetres(mm)) => {
            if let Some(mm) = nonzero(Some(*mm)) {
                return format!("{mm}mm");
            }
        }
        None => {}
    }

    with_unit(nonzero(shoe.stack_height), "mm")
}

/// Release date label from the document: `"2024年5月"`, `"2024年"`, or `"-"`.
#[must_use]
pub fn resolve_release_date(data: &ProductData) -> String {
    let identity = data.identity();
    let year = identity.and_then(|i| i.release_year).filter(|y| *y != 0);
    let month = identity.and_then(|i| i.release_month).filter(|m| *m != 0);

    match (year, month) {
        (Some(year), Some(month)) => format!("{year}年{month}月"),
        (Some(year), None) => format!("{year}年"),
        _ => MISSING.to_string(),
    }
}

#[must_use]
pub fn resolve_brand<'a>(shoe: &'a ShoeRecord, data: &'a ProductData) -> Option<&'a str> {
    present(Some(shoe.brand.as_str()))
        .or_else(|| data.identity().and_then(|i| present(i.brand.as_deref())))
}

#[must_use]
pub fn resolve_model_name<'a>(shoe: &'a ShoeRecord, data: &'a ProductData) -> Option<&'a str> {
    present(Some(shoe.name.as_str()))
        .or_else(|| data.identity().and_then(|i| present(i.model_name.as_deref())))
}

#[must_use]
pub fn resolve_summary<'a>(shoe: &'a ShoeRecord, data: &'a ProductData) -> Option<&'a str> {
    present(shoe.short_desc.as_deref()).or_else(|| {
        data.marketing()
            .and_then(|m| present(m.one_sentence_summary.as_deref()))
    })
}

#[must_use]
pub fn resolve_introduction<'a>(shoe: &'a ShoeRecord, data: &'a ProductData) -> Option<&'a str> {
    present(shoe.description.as_deref()).or_else(|| {
        data.marketing()
            .and_then(|m| present(m.detailed_introduction.as_deref()))
    })
}

#[must_use]
pub fn nickname(data: &ProductData) -> Option<&str> {
    data.identity().and_then(|i| present(i.nickname.as_deref()))
}

#[must_use]
pub fn slogan(data: &ProductData) -> Option<&str> {
    data.marketing().and_then(|m| present(m.slogan.as_deref()))
}

/// The four headline spec labels shown on cards and detail pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecSummary {
    pub stack_height: String,
    pub drop: String,
    pub lug_depth: String,
    pub weight: String,
}

#[must_use]
pub fn resolve_specs(shoe: &ShoeRecord, data: &ProductData) -> SpecSummary {
    let specs = data.specs();
    SpecSummary {
        stack_height: resolve_stack_height(shoe, data),
        drop: with_unit(
            nonzero(shoe.drop).or_else(|| nonzero(specs.and_then(|s| s.drop_mm))),
            "mm",
        ),
        lug_depth: with_unit(
            nonzero(shoe.lug_depth).or_else(|| nonzero(specs.and_then(|s| s.lug_depth_mm))),
            "mm",
        ),
        weight: with_unit(
            nonzero(shoe.weight).or_else(|| nonzero(specs.and_then(|s| s.weight_g))),
            "g",
        ),
    }
}

// ---------------------------------------------------------------------------
// Performance metrics
// ---------------------------------------------------------------------------

/// Metrics rendered on the detail page, in display order.
pub const PERFORMANCE_METRICS: [(&str, &str); 5] = [
    ("grip", "抓地力"),
    ("cushioning", "緩震與腳感"),
    ("stability", "防護性"),
    ("breathability", "透氣性"),
    ("durability", "耐用度"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl ScoreBand {
    #[must_use]
    pub fn for_score(score: f64) -> Self {
        if score >= 9.0 {
            Self::Excellent
        } else if score >= 7.0 {
            Self::Good
        } else if score >= 5.0 {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricView {
    pub key: &'static str,
    pub label: &'static str,
    pub score: f64,
    pub band: ScoreBand,
    pub summary: Option<String>,
    pub description: Option<String>,
}

/// Known metrics present in the document, in [`PERFORMANCE_METRICS`] order.
/// A metric without a score counts as 0.
#[must_use]
pub fn performance_metrics(data: &ProductData) -> Vec<MetricView> {
    let Some(analysis) = data.performance_analysis.as_ref() else {
        return Vec::new();
    };

    PERFORMANCE_METRICS
        .iter()
        .filter_map(|&(key, label)| {
            let entry = analysis.get(key)?;
            let score = entry.score.unwrap_or(0.0);
            Some(MetricView {
                key,
                label,
                score,
                band: ScoreBand::for_score(score),
                summary: entry.summary.clone(),
                description: entry.description.clone(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Structured data
// ---------------------------------------------------------------------------

/// schema.org `Product` JSON-LD for the detail page.
#[must_use]
pub fn structured_data(shoe: &ShoeRecord, data: &ProductData) -> Value {
    let brand = resolve_brand(shoe, data).unwrap_or_default();
    let model = resolve_model_name(shoe, data).unwrap_or_default();
    let category = data
        .identity()
        .and_then(|i| present(i.category.as_deref()))
        .or_else(|| present(shoe.category.as_deref()))
        .unwrap_or(DEFAULT_CATEGORY);

    let mut doc = json!({
        "@context": "https://schema.org",
        "@type": "Product",
        "name": format!("{brand} {model}").trim().to_string(),
        "description": resolve_summary(shoe, data).unwrap_or_default(),
        "image": resolve_image(shoe, data),
        "brand": {
            "@type": "Brand",
            "name": brand,
        },
        "category": category,
    });

    if let Some(price) = data.identity().and_then(|i| i.price_info.as_ref()) {
        let amount = price
            .twd_approx
            .as_ref()
            .and_then(|t| present(t.regular.as_deref()))
            .or_else(|| present(price.msrp.as_deref()))
            .unwrap_or_default();
        doc["offers"] = json!({
            "@type": "Offer",
            "priceCurrency": present(price.currency.as_deref()).unwrap_or(DEFAULT_CURRENCY),
            "price": amount,
            "availability": "https://schema.org/InStock",
        });
    }

    if let Some(rating) = five_star_rating(data) {
        doc["aggregateRating"] = json!({
            "@type": "AggregateRating",
            "ratingValue": format!("{rating:.1}"),
            "reviewCount": "1",
        });
    }

    doc
}

/// Mean of the positive performance scores, rescaled from 10 to 5 stars.
fn five_star_rating(data: &ProductData) -> Option<f64> {
    let scores: Vec<f64> = data
        .performance_analysis
        .as_ref()?
        .values()
        .filter_map(|entry| entry.score.filter(|score| *score > 0.0))
        .collect();

    if scores.is_empty() {
        return None;
    }

    #[allow(clippy::cast_precision_loss)]
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    Some(mean / 10.0 * 5.0)
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

fn nonzero(value: Option<f64>) -> Option<f64> {
    value.filter(|n| n.is_finite() && n.abs() > f64::EPSILON)
}

fn with_unit(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| MISSING.to_string(), |n| format!("{n}{unit}"))
}

#[cfg(test)]
#[path = "resolve_test.rs"]
mod tests;
