use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON deserialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid catalog row for product {product_id}: {reason}")]
    InvalidRow { product_id: u64, reason: String },

    #[error("Catalog not available: {0}")]
    Unavailable(String),
}
