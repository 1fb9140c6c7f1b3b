//! Case-insensitive catalog search.

use crate::product_data::ProductData;
use crate::shoes::ShoeRecord;

/// Whether `shoe` matches `query`.
///
/// A blank query matches everything. Otherwise the lowercased query is tested
/// as a substring of `name`, `brand` and `short_desc`, and only then of the
/// identity and marketing fields inside `product_data`.
#[must_use]
pub fn matches(query: &str, shoe: &ShoeRecord) -> bool {
    if query.trim().is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    let hit = |field: Option<&str>| field.is_some_and(|f| f.to_lowercase().contains(&needle));

    if hit(Some(shoe.name.as_str()))
        || hit(Some(shoe.brand.as_str()))
        || hit(shoe.short_desc.as_deref())
    {
        return true;
    }

    let data = ProductData::from_raw(shoe.product_data.as_ref());
    if data.is_empty() {
        return false;
    }

    let identity = data.identity();
    let marketing = data.marketing();
    let found = [
        identity.and_then(|i| i.brand.as_deref()),
        identity.and_then(|i| i.model_name.as_deref()),
        identity.and_then(|i| i.nickname.as_deref()),
        marketing.and_then(|m| m.slogan.as_deref()),
        marketing.and_then(|m| m.one_sentence_summary.as_deref()),
    ]
    .into_iter()
    .any(hit);
    found
}

/// Matching shoes, in their original order.
#[must_use]
pub fn filter_shoes<'a>(query: &str, shoes: &'a [ShoeRecord]) -> Vec<&'a ShoeRecord> {
    shoes.iter().filter(|shoe| matches(query, shoe)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_shoe(name: &str, brand: &str) -> ShoeRecord {
        ShoeRecord {
            name: name.to_string(),
            brand: brand.to_string(),
            ..ShoeRecord::default()
        }
    }

    #[test]
    fn blank_query_matches_everything() {
        let shoe = make_shoe("Speedcross 6", "Salomon");
        assert!(matches("", &shoe));
        assert!(matches("   ", &shoe));
        assert!(matches("", &ShoeRecord::default()));
    }

    #[test]
    fn direct_fields_are_case_insensitive() {
        let shoe = ShoeRecord {
            short_desc: Some("Built for Mud".to_string()),
            ..make_shoe("Speedcross 6", "Salomon")
        };
        assert!(matches("SALOMON", &shoe));
        assert!(matches("speedcross", &shoe));
        assert!(matches("mud", &shoe));
    }

    #[test]
    fn unmatched_query_is_rejected() {
        let shoe = make_shoe("Speedcross 6", "Salomon");
        assert!(!matches("xyz123", &shoe));
    }

    #[test]
    fn nickname_in_encoded_document_matches() {
        let shoe = ShoeRecord {
            product_data: Some(json!("{\"product_identity\":{\"nickname\":\"SC6\"}}")),
            ..make_shoe("Speedcross 6", "Salomon")
        };
        assert!(matches("sc6", &shoe));
    }

    #[test]
    fn marketing_fields_match() {
        let shoe = ShoeRecord {
            product_data: Some(json!({
                "marketing_copy": {"slogan": "Own the Mountain", "one_sentence_summary": "Plush ride"}
            })),
            ..make_shoe("Mafate Speed 4", "Hoka")
        };
        assert!(matches("mountain", &shoe));
        assert!(matches("plush", &shoe));
        assert!(!matches("rocket", &shoe));
    }

    #[test]
    fn undecodable_document_does_not_match() {
        let shoe = ShoeRecord {
            product_data: Some(json!("{not json")),
            ..make_shoe("Speedcross 6", "Salomon")
        };
        assert!(!matches("sc6", &shoe));
    }

    #[test]
    fn array_identity_section_does_not_match() {
        let shoe = ShoeRecord {
            product_data: Some(json!({"product_identity": ["Hoka", "Speedgoat 6"]})),
            ..make_shoe("Speedcross 6", "Salomon")
        };
        assert!(!matches("hoka", &shoe));
        assert!(!matches("speedgoat", &shoe));
    }

    #[test]
    fn query_whitespace_is_significant() {
        let shoe = make_shoe("Speedcross 6", "Salomon");
        assert!(matches("cross 6", &shoe));
        assert!(!matches(" salomon ", &shoe));
    }

    #[test]
    fn filter_preserves_order() {
        let shoes = vec![
            make_shoe("Speedcross 6", "Salomon"),
            make_shoe("Mafate Speed 4", "Hoka"),
            make_shoe("Ultra Glide", "Salomon"),
        ];
        let names: Vec<_> = filter_shoes("salomon", &shoes)
            .into_iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, vec!["Speedcross 6", "Ultra Glide"]);
        assert_eq!(filter_shoes("", &shoes).len(), 3);
    }
}
