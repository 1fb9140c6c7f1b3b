use serde_json::json;

use super::*;

fn sample_document() -> Value {
    json!({
        "product_identity": {
            "brand": "Salomon",
            "model_name": "Speedcross 6",
            "nickname": "SC6",
            "release_year": 2023,
            "release_month": 2
        },
        "marketing_copy": {
            "slogan": "Own the mud",
            "one_sentence_summary": "Aggressive lugs for soft ground."
        },
        "specifications": {
            "stack_height": {"heel_mm": 32, "forefoot_mm": 22},
            "drop_mm": 10,
            "weight_g": 298
        }
    })
}

fn as_map(value: &Value) -> Map<String, Value> {
    value.as_object().cloned().expect("object")
}

// -----------------------------------------------------------------------
// normalize_product_data
// -----------------------------------------------------------------------

#[test]
fn absent_and_null_are_empty() {
    assert!(normalize_product_data(None).is_empty());
    assert!(normalize_product_data(Some(&Value::Null)).is_empty());
}

#[test]
fn empty_sentinel_strings_are_empty() {
    for raw in ["", "   ", "null", " null ", "\"\""] {
        let value = Value::String(raw.to_string());
        assert!(
            normalize_product_data(Some(&value)).is_empty(),
            "expected empty map for {raw:?}"
        );
    }
}

#[test]
fn object_is_returned_as_is() {
    let doc = sample_document();
    assert_eq!(normalize_product_data(Some(&doc)), as_map(&doc));
}

#[test]
fn json_string_round_trips() {
    let doc = sample_document();
    let encoded = Value::String(doc.to_string());
    assert_eq!(normalize_product_data(Some(&encoded)), as_map(&doc));
}

#[test]
fn double_encoded_string_round_trips() {
    let doc = sample_document();
    let once = doc.to_string();
    let twice = Value::String(Value::String(once).to_string());
    assert_eq!(normalize_product_data(Some(&twice)), as_map(&doc));
}

#[test]
fn surrounding_whitespace_is_ignored() {
    let doc = sample_document();
    let padded = Value::String(format!("\n  {doc}  \t"));
    assert_eq!(normalize_product_data(Some(&padded)), as_map(&doc));
}

#[test]
fn triple_encoding_is_not_unwrapped() {
    let doc = sample_document();
    let once = doc.to_string();
    let twice = Value::String(once).to_string();
    let thrice = Value::String(Value::String(twice).to_string());
    assert!(normalize_product_data(Some(&thrice)).is_empty());
}

#[test]
fn invalid_json_is_empty() {
    let value = Value::String("{\"product_identity\": ".to_string());
    assert!(normalize_product_data(Some(&value)).is_empty());
}

#[test]
fn non_object_payloads_are_empty() {
    for raw in [
        json!("42"),
        json!("[1, 2]"),
        json!("\"just text\""),
        json!([{"product_identity": {}}]),
        json!(7),
        json!(true),
    ] {
        assert!(
            normalize_product_data(Some(&raw)).is_empty(),
            "expected empty map for {raw}"
        );
    }
}

#[test]
fn normalization_is_idempotent() {
    let doc = sample_document();
    let inputs = [
        doc.clone(),
        Value::String(doc.to_string()),
        Value::String(Value::String(doc.to_string()).to_string()),
        json!("null"),
    ];
    for input in inputs {
        let once = normalize_product_data(Some(&input));
        let twice = normalize_product_data(Some(&Value::Object(once.clone())));
        assert_eq!(once, twice);
    }
}

// -----------------------------------------------------------------------
// ProductData
// -----------------------------------------------------------------------

#[test]
fn typed_view_reads_sections() {
    let data = ProductData::from_raw(Some(&Value::String(sample_document().to_string())));
    let identity = data.identity().expect("identity");
    assert_eq!(identity.nickname.as_deref(), Some("SC6"));
    assert_eq!(identity.release_year, Some(2023));
    assert_eq!(
        data.marketing().and_then(|m| m.slogan.as_deref()),
        Some("Own the mud")
    );
    let specs = data.specs().expect("specs");
    assert_eq!(specs.drop_mm, Some(10.0));
    assert!(matches!(
        specs.stack_height,
        Some(StackHeight::Split(SplitStackHeight {
            heel_mm: Some(_),
            forefoot_mm: Some(_),
            ..
        }))
    ));
}

#[test]
fn typed_view_of_empty_document_is_empty() {
    assert!(ProductData::from_raw(None).is_empty());
    assert!(ProductData::from_raw(Some(&json!("null"))).is_empty());
}

#[test]
fn plain_number_stack_height_is_supported() {
    let data = ProductData::from_raw(Some(&json!({"specifications": {"stack_height": 28.5}})));
    assert_eq!(
        data.specs().and_then(|s| s.stack_height.clone()),
        Some(StackHeight::Millimetres(28.5))
    );
}

#[test]
fn malformed_section_does_not_poison_siblings() {
    let data = ProductData::from_raw(Some(&json!({
        "product_identity": "Salomon",
        "marketing_copy": {"slogan": "Own the mud"},
        "competitor_comparison": [
            {"competitor_brand": "Hoka", "competitor_model": "Speedgoat 6"},
            "not an entry"
        ]
    })));
    assert!(data.product_identity.is_none());
    assert_eq!(
        data.marketing().and_then(|m| m.slogan.as_deref()),
        Some("Own the mud")
    );
    let competitors = data.competitor_comparison.expect("competitors");
    assert_eq!(competitors.len(), 1);
    assert_eq!(competitors[0].competitor_model.as_deref(), Some("Speedgoat 6"));
}

#[test]
fn nested_lists_skip_malformed_entries() {
    let data = ProductData::from_raw(Some(&json!({
        "fit_and_sizing": {
            "overall_fit": "narrow",
            "alerts": [{"type": "warning", "title": "Tight toe box"}, 5]
        },
        "pros_and_cons": {"pros": ["grip", null], "cons": "none"}
    })));
    let fit = data.fit_and_sizing.expect("fit");
    assert_eq!(fit.alerts.len(), 1);
    assert_eq!(fit.alerts[0].kind.as_deref(), Some("warning"));
    let pros_cons = data.pros_and_cons.expect("pros and cons");
    assert_eq!(pros_cons.pros, vec!["grip"]);
    assert!(pros_cons.cons.is_empty());
}

#[test]
fn performance_analysis_is_keyed_by_metric() {
    let data = ProductData::from_raw(Some(&json!({
        "performance_analysis": {
            "grip": {"score": 9.5, "summary": "Sticky"},
            "durability": {"score": "7"}
        }
    })));
    let analysis = data.performance_analysis.expect("analysis");
    assert_eq!(analysis["grip"].score, Some(9.5));
    assert_eq!(analysis["durability"].score, Some(7.0));
}

#[test]
fn array_sections_are_not_read_positionally() {
    let data = ProductData::from_raw(Some(&json!({
        "product_identity": ["Hoka", "Speedgoat 6"],
        "specifications": {"components": {"outsole": ["Vibram", "Megagrip"]}},
        "competitor_comparison": [["Hoka", "Speedgoat 6"], {"competitor_brand": "Nike"}],
        "fit_and_sizing": {"alerts": [["warning", "Tight"]]}
    })));
    assert!(data.product_identity.is_none());
    let components = data
        .specs()
        .and_then(|s| s.components.clone())
        .expect("components object");
    assert!(components.outsole.is_none());
    let competitors = data.competitor_comparison.expect("competitors");
    assert_eq!(competitors.len(), 1);
    assert_eq!(competitors[0].competitor_brand.as_deref(), Some("Nike"));
    assert!(data.fit_and_sizing.expect("fit").alerts.is_empty());
}
