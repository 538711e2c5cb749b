use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use shelfwise_models::catalog_schema::{ProductRow, CATALOG_TABLE_DDL};
use shelfwise_models::product::{ProductData, ProductId};

use crate::error::CatalogError;

/// Read-only SQLite catalog accessor.
///
/// The catalog database is maintained by whatever owns product master
/// data; Shelfwise only reads it.
pub struct SqliteCatalog {
    conn: Connection,
}

impl SqliteCatalog {
    /// Open a read-only connection to a catalog database.
    pub fn open(path: &str) -> Result<Self, CatalogError> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Create (or open) a writable catalog file and ensure the schema exists.
    pub fn create(path: &str) -> Result<Self, CatalogError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(CATALOG_TABLE_DDL)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database with the schema created. Writable, so tests can seed it.
    pub fn open_in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(CATALOG_TABLE_DDL)?;
        Ok(Self { conn })
    }

    /// Raw product row, or None if the product is not in the catalog.
    pub fn product_row(&self, product_id: ProductId) -> Result<Option<ProductRow>, CatalogError> {
        let Ok(key) = i64::try_from(product_id) else {
            return Ok(None);
        };
        let mut stmt = self.conn.prepare_cached(
            "SELECT product_id, data_json, updated_at FROM products WHERE product_id = ?1",
        )?;
        let row = stmt
            .query_row(rusqlite::params![key], |row| {
                Ok(ProductRow {
                    product_id: row.get(0)?,
                    data_json: row.get(1)?,
                    updated_at: row.get(2)?,
                })
            })
            .optional()?;
        Ok(row)
    }

    /// Parsed product data, or None if the product is not in the catalog.
    pub fn product(&self, product_id: ProductId) -> Result<Option<ProductData>, CatalogError> {
        match self.product_row(product_id)? {
            Some(row) => Ok(Some(serde_json::from_str(&row.data_json)?)),
            None => Ok(None),
        }
    }

    /// Stock on hand, or None if no stock row exists.
    pub fn stock(&self, product_id: ProductId) -> Result<Option<u64>, CatalogError> {
        let Ok(key) = i64::try_from(product_id) else {
            return Ok(None);
        };
        let mut stmt = self
            .conn
            .prepare_cached("SELECT quantity FROM stock WHERE product_id = ?1")?;
        let quantity: Option<i64> = stmt
            .query_row(rusqlite::params![key], |row| row.get(0))
            .optional()?;

        quantity
            .map(|q| {
                u64::try_from(q).map_err(|_| CatalogError::InvalidRow {
                    product_id,
                    reason: format!("negative stock quantity {q}"),
                })
            })
            .transpose()
    }

    /// Insert or replace a product. Used by tests and seeding tools.
    pub fn insert_product(&self, product_id: ProductId, data: &ProductData) -> Result<(), CatalogError> {
        let key = sql_key(product_id)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO products (product_id, data_json, updated_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, serde_json::to_string(data)?, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Insert or replace a stock level. Used by tests and seeding tools.
    pub fn set_stock(&self, product_id: ProductId, quantity: u64) -> Result<(), CatalogError> {
        let key = sql_key(product_id)?;
        let quantity = i64::try_from(quantity).map_err(|_| CatalogError::InvalidRow {
            product_id,
            reason: format!("stock quantity {quantity} does not fit in SQLite INTEGER"),
        })?;
        self.conn.execute(
            "INSERT OR REPLACE INTO stock (product_id, quantity, updated_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![key, quantity, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

fn sql_key(product_id: ProductId) -> Result<i64, CatalogError> {
    i64::try_from(product_id).map_err(|_| CatalogError::InvalidRow {
        product_id,
        reason: "product id does not fit in SQLite INTEGER".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product() -> ProductData {
        ProductData {
            base_cost: Some(dec!(100)),
            min_price: Some(dec!(110)),
            max_price: Some(dec!(130)),
            supplier: Some("SUP1".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn get_existing_product() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        catalog.insert_product(1, &product()).unwrap();

        let result = catalog.product(1).unwrap();
        assert_eq!(result, Some(product()));

        let row = catalog.product_row(1).unwrap().unwrap();
        assert_eq!(row.product_id, 1);
        assert!(row.data_json.contains("SUP1"));
    }

    #[test]
    fn get_missing_product() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        assert!(catalog.product(404).unwrap().is_none());
        assert!(catalog.product(u64::MAX).unwrap().is_none());
    }

    #[test]
    fn stock_roundtrip_and_missing() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        catalog.set_stock(1, 100).unwrap();

        assert_eq!(catalog.stock(1).unwrap(), Some(100));
        assert_eq!(catalog.stock(2).unwrap(), None);
    }

    #[test]
    fn negative_stock_is_an_invalid_row() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        catalog
            .conn
            .execute(
                "INSERT INTO stock (product_id, quantity, updated_at) VALUES (3, -1, 'now')",
                [],
            )
            .unwrap();

        assert!(matches!(
            catalog.stock(3),
            Err(CatalogError::InvalidRow { product_id: 3, .. })
        ));
    }

    #[test]
    fn corrupt_product_json_is_an_error() {
        let catalog = SqliteCatalog::open_in_memory().unwrap();
        catalog
            .conn
            .execute(
                "INSERT INTO products (product_id, data_json, updated_at) VALUES (9, 'not json', 'now')",
                [],
            )
            .unwrap();

        assert!(matches!(catalog.product(9), Err(CatalogError::Json(_))));
    }

    #[test]
    fn created_file_reopens_read_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        let path = path.to_str().unwrap();

        let writer = SqliteCatalog::create(path).unwrap();
        writer.insert_product(1, &product()).unwrap();
        writer.set_stock(1, 100).unwrap();
        drop(writer);

        let reader = SqliteCatalog::open(path).unwrap();
        assert_eq!(reader.product(1).unwrap(), Some(product()));
        assert_eq!(reader.stock(1).unwrap(), Some(100));
        assert!(reader.set_stock(1, 5).is_err());
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.db");
        assert!(SqliteCatalog::open(path.to_str().unwrap()).is_err());
    }
}
