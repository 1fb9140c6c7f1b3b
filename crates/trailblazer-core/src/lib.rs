pub mod admin;
pub mod app_config;
pub mod config;
pub mod product_data;
pub mod resolve;
pub mod reviews;
pub mod search;
pub mod shoes;

use thiserror::Error;

pub use admin::{FormError, ShoeForm};
pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use product_data::{normalize_product_data, ProductData};
pub use reviews::{reviewer_display_name, NewReview, Review, ReviewerProfile};
pub use search::{filter_shoes, matches};
pub use shoes::{NewShoe, ShoePatch, ShoeRecord};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
