use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub shops_path: PathBuf,
    pub catalog_path: PathBuf,
    /// Lifetime of every dynamic-category cache entry, refreshed on read.
    pub cache_ttl_secs: u64,
    pub default_page_size: usize,
    pub max_page_size: usize,
    pub max_concurrent_pages: usize,
}
