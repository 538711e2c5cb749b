/// Tables the SQLite catalog is expected to contain. The catalog is written
/// by whatever system owns product master data and only read here.
///
/// ```sql
/// CREATE TABLE IF NOT EXISTS products (
///     product_id  INTEGER PRIMARY KEY,
///     data_json   TEXT NOT NULL,
///     updated_at  TEXT NOT NULL
/// );
///
/// CREATE TABLE IF NOT EXISTS stock (
///     product_id  INTEGER PRIMARY KEY,
///     quantity    INTEGER NOT NULL,
///     updated_at  TEXT NOT NULL
/// );
/// ```
pub const CATALOG_TABLE_DDL: &str = "\
CREATE TABLE IF NOT EXISTS products (
    product_id  INTEGER PRIMARY KEY,
    data_json   TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS stock (
    product_id  INTEGER PRIMARY KEY,
    quantity    INTEGER NOT NULL,
    updated_at  TEXT NOT NULL
);
";

/// Hot-cache key conventions for catalog lookups.
pub mod key_patterns {
    use crate::product::ProductId;

    pub fn product(product_id: ProductId) -> String {
        format!("product:{product_id}")
    }

    pub fn stock(product_id: ProductId) -> String {
        format!("stock:{product_id}")
    }
}

/// A raw product row as read from SQLite. `data_json` holds a serialized `ProductData`.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub product_id: i64,
    pub data_json: String,
    pub updated_at: String,
}
