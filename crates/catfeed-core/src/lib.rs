pub mod app_config;
pub mod categories;
pub mod config;
pub mod ids;
pub mod products;
pub mod shops;

pub use app_config::{AppConfig, Environment};
pub use categories::CategoryStreamBinding;
pub use config::{load_app_config, load_app_config_from_env};
pub use ids::{CategoryId, ProductId, StreamId};
pub use products::{CurrencyPrice, PriceTier, Product, VariantFamily};
pub use shops::{
    load_shops, AdvancedPricingMode, CustomerGroup, ShopConfig, ShopsFile, VariantPolicy,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read shops file {path}: {source}")]
    ShopsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse shops file: {0}")]
    ShopsFileParse(#[source] serde_yaml::Error),

    #[error("shop configuration is invalid: {0}")]
    Validation(String),
}
