//! Offline tests for trailblazer-db pool configuration and row conversion.
//! These tests do not require a live database connection.

use chrono::Utc;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use trailblazer_core::{AppConfig, Environment, Review, ShoeRecord};
use trailblazer_db::{Catalog, PoolConfig, ReviewRow, ShoeRow};
use uuid::Uuid;

fn make_app_config() -> AppConfig {
    AppConfig {
        database_url: None,
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        mock_store_path: None,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        review_refetch_delay_ms: 300,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&make_app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn pool_config_clamps_min_to_max() {
    let app_config = AppConfig {
        db_max_connections: 2,
        db_min_connections: 5,
        ..make_app_config()
    };
    assert_eq!(PoolConfig::from_app_config(&app_config).min_connections, 2);
}

#[tokio::test]
async fn missing_database_url_selects_mock_mode() {
    let catalog = Catalog::from_config(&make_app_config())
        .await
        .expect("mock catalog");
    assert_eq!(catalog.mode(), "mock");
}

#[tokio::test]
async fn mock_store_path_is_used_when_set() {
    let path = std::env::temp_dir().join(format!("trailblazer-cat-{}.json", Uuid::new_v4()));
    let app_config = AppConfig {
        mock_store_path: Some(path.clone()),
        ..make_app_config()
    };
    let catalog = Catalog::from_config(&app_config).await.expect("mock catalog");
    let Catalog::Local(store) = &catalog else {
        panic!("expected local catalog");
    };
    assert_eq!(store.path(), Some(PathBuf::from(&path).as_path()));
}

#[test]
fn shoe_row_converts_to_record() {
    let id = Uuid::new_v4();
    let now = Utc::now();
    let row = ShoeRow {
        id,
        name: "Speedcross 6".to_string(),
        brand: "Salomon".to_string(),
        category: None,
        short_desc: None,
        description: None,
        stack_height: Some(30.0),
        drop: Some(10.0),
        lug_depth: None,
        weight: None,
        release_year: Some(2023),
        image_url: None,
        cover_image_url: None,
        video_url: None,
        youtube_video_url: None,
        pdf_url: None,
        slides: vec!["a.png".to_string()],
        pros: vec![],
        cons: vec![],
        product_data: Some(serde_json::json!("{\"product_identity\":{}}")),
        created_at: now,
    };

    let record = ShoeRecord::from(row);
    assert_eq!(record.id, id);
    assert_eq!(record.stack_height, Some(30.0));
    assert_eq!(record.slides, vec!["a.png"]);
    assert!(record.product_data.is_some());
    assert_eq!(record.created_at, now);
}

#[test]
fn review_row_converts_to_review() {
    let row = ReviewRow {
        id: Uuid::new_v4(),
        shoe_id: Uuid::new_v4(),
        user_id: "u-1".to_string(),
        user_name: "Runner".to_string(),
        user_photo: None,
        content: "Grippy".to_string(),
        created_at: Utc::now(),
    };
    let review = Review::from(row.clone());
    assert_eq!(review.id, row.id);
    assert_eq!(review.content, "Grippy");
}
