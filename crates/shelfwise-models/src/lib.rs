pub mod catalog_schema;
pub mod clock;
pub mod config;
pub mod error;
pub mod forecast;
pub mod pricing;
pub mod product;
pub mod purchase;
pub mod stage;

pub use catalog_schema::ProductRow;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{
    AgentsConfig, CatalogBackend, CatalogConfig, CollaboratorBackend, PipelineConfig,
    ShelfwiseConfig, StageAgentConfig,
};
pub use error::ValidationError;
pub use forecast::{ForecastDraft, ForecastResult, MarketSignal};
pub use pricing::{PriceDraft, PriceResult, PricingStrategy};
pub use product::{MarketData, ProductData, ProductId};
pub use purchase::{PurchaseDraft, PurchaseResult};
pub use stage::{FailedStep, Stage, StageContext, StageRequest};
