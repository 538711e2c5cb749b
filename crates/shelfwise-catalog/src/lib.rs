pub mod error;
pub mod memory;
pub mod reader;
pub mod seeded;
pub mod source;
pub mod sqlite;

pub use error::CatalogError;
pub use reader::CatalogReader;
pub use seeded::SeededCatalog;
pub use source::ProductSource;
pub use sqlite::SqliteCatalog;
