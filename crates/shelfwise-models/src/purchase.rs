use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{parse_draft, ValidationError};
use crate::product::ProductId;

const RECORD: &str = "purchase";

pub const MIN_PRIORITY: u8 = 1;
pub const MAX_PRIORITY: u8 = 5;

/// Unvalidated purchase order fields as produced by a decision collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseDraft {
    pub product_id: ProductId,
    pub supplier_id: String,
    pub quantity: i64,
    pub unit_cost: Decimal,
    /// Ignored: the total is always recomputed from quantity and unit cost.
    #[serde(default)]
    pub total_cost: Option<Decimal>,
    pub expected_delivery: DateTime<Utc>,
    pub priority: i64,
}

/// A validated purchase order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PurchaseResult {
    product_id: ProductId,
    supplier_id: String,
    quantity: u64,
    unit_cost: Decimal,
    total_cost: Decimal,
    expected_delivery: DateTime<Utc>,
    priority: u8,
}

impl PurchaseResult {
    /// Validate a draft against the supplied current time.
    ///
    /// `total_cost` is derived as `quantity * unit_cost`; a delivery that is
    /// not strictly after `now` is rejected.
    pub fn construct(draft: PurchaseDraft, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        let quantity = u64::try_from(draft.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| {
                ValidationError::field(
                    RECORD,
                    "quantity",
                    format!("must be > 0, got {}", draft.quantity),
                )
            })?;
        if draft.unit_cost <= Decimal::ZERO {
            return Err(ValidationError::field(
                RECORD,
                "unit_cost",
                format!("must be > 0, got {}", draft.unit_cost),
            ));
        }
        let priority = u8::try_from(draft.priority)
            .ok()
            .filter(|p| (MIN_PRIORITY..=MAX_PRIORITY).contains(p))
            .ok_or_else(|| {
                ValidationError::field(
                    RECORD,
                    "priority",
                    format!(
                        "must be within [{MIN_PRIORITY}, {MAX_PRIORITY}], got {}",
                        draft.priority
                    ),
                )
            })?;

        let total_cost = Decimal::from(quantity)
            .checked_mul(draft.unit_cost)
            .ok_or_else(|| {
                ValidationError::field(
                    RECORD,
                    "total_cost",
                    format!("{quantity} x {} overflows", draft.unit_cost),
                )
            })?;

        if draft.expected_delivery <= now {
            return Err(ValidationError::cross_field(
                RECORD,
                format!(
                    "expected delivery {} is not after {}",
                    draft.expected_delivery.to_rfc3339(),
                    now.to_rfc3339()
                ),
            ));
        }

        Ok(Self {
            product_id: draft.product_id,
            supplier_id: draft.supplier_id,
            quantity,
            unit_cost: draft.unit_cost,
            total_cost,
            expected_delivery: draft.expected_delivery,
            priority,
        })
    }

    /// Parse and validate a raw JSON mapping.
    pub fn from_raw(raw: &serde_json::Value, now: DateTime<Utc>) -> Result<Self, ValidationError> {
        Self::construct(parse_draft(RECORD, raw)?, now)
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn supplier_id(&self) -> &str {
        &self.supplier_id
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    pub fn unit_cost(&self) -> Decimal {
        self.unit_cost
    }

    pub fn total_cost(&self) -> Decimal {
        self.total_cost
    }

    pub fn expected_delivery(&self) -> DateTime<Utc> {
        self.expected_delivery
    }

    pub fn priority(&self) -> u8 {
        self.priority
    }
}
