//! Built-in demo catalog, used by mock mode and by `trailblazer-cli seed`.

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use trailblazer_core::{Review, ShoeRecord};
use uuid::Uuid;

use crate::DbError;

pub const SPEEDCROSS_ID: Uuid = Uuid::from_u128(0x6c1e_0b7a_4d2f_4f61_9a31_5e0c_7d1a_0001);
pub const SPEEDGOAT_ID: Uuid = Uuid::from_u128(0x6c1e_0b7a_4d2f_4f61_9a31_5e0c_7d1a_0002);
pub const BUSHIDO_ID: Uuid = Uuid::from_u128(0x6c1e_0b7a_4d2f_4f61_9a31_5e0c_7d1a_0003);

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

/// The demo shoes, newest first. The Speedcross row stores its document as a
/// JSON string, the way older admin builds wrote it.
#[must_use]
pub fn seed_shoes() -> Vec<ShoeRecord> {
    let speedcross_doc = json!({
        "product_identity": {
            "brand": "Salomon",
            "model_name": "Speedcross 6",
            "nickname": "SC6",
            "category": "越野跑鞋",
            "release_year": 2023,
            "release_month": 2,
            "cover_image_url": "https://example.com/speedcross-6.jpg",
            "youtube_video_url": "https://www.youtube.com/watch?v=example",
            "price_info": {"currency": "TWD", "msrp": "145", "twd_approx": {"regular": "5280"}}
        },
        "marketing_copy": {
            "slogan": "Own the mud",
            "one_sentence_summary": "Aggressive 5mm lugs for soft, technical ground.",
            "detailed_introduction": "The sixth Speedcross keeps its chevron lugs and gains a roomier forefoot."
        },
        "specifications": {
            "stack_height": {"heel_mm": 32, "forefoot_mm": 22},
            "drop_mm": 10,
            "lug_depth_mm": 5,
            "weight_g": 298,
            "components": {
                "outsole": {"tech": "Mud Contagrip", "feature": "Chevron lugs shed mud"},
                "midsole": {"tech": "Energy Cell", "feature": "Firm, protective ride"}
            }
        },
        "performance_analysis": {
            "grip": {"score": 9.5, "summary": "Best in class on mud"},
            "cushioning": {"score": 7, "summary": "Firm but protective"},
            "stability": {"score": 7.5},
            "breathability": {"score": 6},
            "durability": {"score": 8}
        },
        "fit_and_sizing": {
            "overall_fit": "Narrow",
            "alerts": [{"type": "warning", "title": "Narrow toe box", "content": "Wide feet should size up half a size."}]
        },
        "pros_and_cons": {"pros": ["Grip in mud"], "cons": ["Harsh on hardpack"]}
    });

    vec![
        ShoeRecord {
            id: BUSHIDO_ID,
            name: "Bushido III".to_string(),
            brand: "La Sportiva".to_string(),
            category: Some("越野跑鞋".to_string()),
            short_desc: Some("Precise, low-slung technical trail racer.".to_string()),
            stack_height: Some(24.0),
            drop: Some(6.0),
            lug_depth: Some(4.5),
            weight: Some(290.0),
            release_year: Some(2023),
            pros: vec!["Rock-solid lockdown".to_string()],
            cons: vec!["Firm underfoot".to_string()],
            created_at: at(1_700_000_300),
            ..ShoeRecord::default()
        },
        ShoeRecord {
            id: SPEEDGOAT_ID,
            name: "Speedgoat 6".to_string(),
            brand: "Hoka".to_string(),
            category: Some("越野跑鞋".to_string()),
            short_desc: Some("Max-cushion mountain trainer.".to_string()),
            release_year: Some(2024),
            product_data: Some(json!({
                "product_identity": {"nickname": "Goat", "release_year": 2024, "release_month": 6},
                "marketing_copy": {"slogan": "Go further on any mountain"},
                "specifications": {"stack_height": 38, "drop_mm": 5, "weight_g": 278}
            })),
            created_at: at(1_700_000_200),
            ..ShoeRecord::default()
        },
        ShoeRecord {
            id: SPEEDCROSS_ID,
            name: "Speedcross 6".to_string(),
            brand: "Salomon".to_string(),
            category: Some("越野跑鞋".to_string()),
            pros: vec!["Grip in mud".to_string()],
            cons: vec!["Harsh on hardpack".to_string()],
            product_data: Some(json!(speedcross_doc.to_string())),
            created_at: at(1_700_000_100),
            ..ShoeRecord::default()
        },
    ]
}

/// Demo reviews for `shoe_id`, newest first. Shoes without demo reviews get
/// an empty list.
#[must_use]
pub fn seed_reviews(shoe_id: Uuid) -> Vec<Review> {
    if shoe_id != SPEEDCROSS_ID {
        return Vec::new();
    }
    vec![
        Review {
            id: Uuid::from_u128(0x9b2d_11aa_0c4e_4a7e_8f10_3b6a_2c9d_0002),
            shoe_id,
            user_id: "demo-runner-2".to_string(),
            user_name: "Trail Fox".to_string(),
            user_photo: None,
            content: "Unbeatable on muddy descents, a bit firm on fire roads.".to_string(),
            created_at: at(1_700_100_200),
        },
        Review {
            id: Uuid::from_u128(0x9b2d_11aa_0c4e_4a7e_8f10_3b6a_2c9d_0001),
            shoe_id,
            user_id: "demo-runner-1".to_string(),
            user_name: "Ridge Walker".to_string(),
            user_photo: None,
            content: "Third pair. Sizing runs narrow, go half up.".to_string(),
            created_at: at(1_700_100_100),
        },
    ]
}

/// Inserts the demo shoes and reviews into Postgres, skipping rows that
/// already exist.
///
/// Returns the number of shoes inserted. All inserts run inside a single
/// transaction; if any fails the batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_catalog(pool: &PgPool) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for shoe in seed_shoes() {
        let inserted = sqlx::query(
            "INSERT INTO shoes (id, name, brand, category, short_desc, description, stack_height, \
                 \"drop\", lug_depth, weight, release_year, image_url, cover_image_url, video_url, \
                 youtube_video_url, pdf_url, slides, pros, cons, product_data, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21) \
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(shoe.id)
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
        .bind(shoe.created_at)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            continue;
        }
        count += 1;

        for review in seed_reviews(shoe.id) {
            sqlx::query(
                "INSERT INTO reviews (id, shoe_id, user_id, user_name, user_photo, content, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7) \
                 ON CONFLICT (id) DO NOTHING",
            )
            .bind(review.id)
            .bind(review.shoe_id)
            .bind(&review.user_id)
            .bind(&review.user_name)
            .bind(&review.user_photo)
            .bind(&review.content)
            .bind(review.created_at)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trailblazer_core::ProductData;

    #[test]
    fn seed_shoes_are_newest_first() {
        let shoes = seed_shoes();
        assert!(shoes
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at));
    }

    #[test]
    fn string_encoded_seed_document_normalizes() {
        let shoes = seed_shoes();
        let speedcross = shoes
            .iter()
            .find(|s| s.id == SPEEDCROSS_ID)
            .expect("speedcross");
        assert!(speedcross.product_data.as_ref().is_some_and(serde_json::Value::is_string));
        let data = ProductData::from_raw(speedcross.product_data.as_ref());
        assert_eq!(
            data.identity().and_then(|i| i.nickname.as_deref()),
            Some("SC6")
        );
    }

    #[test]
    fn only_speedcross_has_demo_reviews() {
        assert_eq!(seed_reviews(SPEEDCROSS_ID).len(), 2);
        assert!(seed_reviews(SPEEDGOAT_ID).is_empty());
    }
}
