use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{parse_draft, ValidationError};
use crate::product::ProductId;

const RECORD: &str = "pricing";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PricingStrategy {
    CostPlus,
    MarketBased,
    Dynamic,
}

/// Unvalidated pricing fields as produced by a decision collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceDraft {
    pub product_id: ProductId,
    pub base_cost: Decimal,
    pub suggested_price: Decimal,
    pub min_price: Decimal,
    pub max_price: Decimal,
    pub strategy: PricingStrategy,
    pub margin: Decimal,
}

/// A validated price recommendation.
///
/// Invariants: `min_price <= suggested_price <= max_price` and
/// `suggested_price > base_cost`. Violations are rejected, never repaired.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriceResult {
    product_id: ProductId,
    base_cost: Decimal,
    suggested_price: Decimal,
    min_price: Decimal,
    max_price: Decimal,
    strategy: PricingStrategy,
    margin: Decimal,
}

impl PriceResult {
    pub fn construct(draft: PriceDraft) -> Result<Self, ValidationError> {
        if draft.base_cost <= Decimal::ZERO {
            return Err(ValidationError::field(
                RECORD,
                "base_cost",
                format!("must be > 0, got {}", draft.base_cost),
            ));
        }
        if draft.suggested_price <= Decimal::ZERO {
            return Err(ValidationError::field(
                RECORD,
                "suggested_price",
                format!("must be > 0, got {}", draft.suggested_price),
            ));
        }
        if draft.margin < Decimal::ZERO {
            return Err(ValidationError::field(
                RECORD,
                "margin",
                format!("must be >= 0, got {}", draft.margin),
            ));
        }

        if draft.suggested_price < draft.min_price || draft.suggested_price > draft.max_price {
            return Err(ValidationError::cross_field(
                RECORD,
                format!(
                    "suggested price {} is outside the allowed range [{}, {}]",
                    draft.suggested_price, draft.min_price, draft.max_price
                ),
            ));
        }
        if draft.suggested_price <= draft.base_cost {
            return Err(ValidationError::cross_field(
                RECORD,
                format!(
                    "suggested price {} does not exceed base cost {}",
                    draft.suggested_price, draft.base_cost
                ),
            ));
        }

        Ok(Self {
            product_id: draft.product_id,
            base_cost: draft.base_cost,
            suggested_price: draft.suggested_price,
            min_price: draft.min_price,
            max_price: draft.max_price,
            strategy: draft.strategy,
            margin: draft.margin,
        })
    }

    /// Parse and validate a raw JSON mapping.
    pub fn from_raw(raw: &serde_json::Value) -> Result<Self, ValidationError> {
        Self::construct(parse_draft(RECORD, raw)?)
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn base_cost(&self) -> Decimal {
        self.base_cost
    }

    pub fn suggested_price(&self) -> Decimal {
        self.suggested_price
    }

    pub fn min_price(&self) -> Decimal {
        self.min_price
    }

    pub fn max_price(&self) -> Decimal {
        self.max_price
    }

    pub fn strategy(&self) -> PricingStrategy {
        self.strategy
    }

    pub fn margin(&self) -> Decimal {
        self.margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft() -> PriceDraft {
        PriceDraft {
            product_id: 1,
            base_cost: dec!(100),
            suggested_price: dec!(125),
            min_price: dec!(110),
            max_price: dec!(130),
            strategy: PricingStrategy::MarketBased,
            margin: dec!(0.2),
        }
    }

    fn is_cross_field(result: Result<PriceResult, ValidationError>) -> bool {
        matches!(result, Err(ValidationError::CrossFieldInvariant { .. }))
    }

    #[test]
    fn valid_draft_is_kept_as_is() {
        let price = PriceResult::construct(draft()).unwrap();
        assert_eq!(price.product_id(), 1);
        assert_eq!(price.base_cost(), dec!(100));
        assert_eq!(price.suggested_price(), dec!(125));
        assert_eq!(price.min_price(), dec!(110));
        assert_eq!(price.max_price(), dec!(130));
        assert_eq!(price.strategy(), PricingStrategy::MarketBased);
        assert_eq!(price.margin(), dec!(0.2));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        for suggested_price in [dec!(110), dec!(130)] {
            assert!(PriceResult::construct(PriceDraft {
                suggested_price,
                ..draft()
            })
            .is_ok());
        }
    }

    #[test]
    fn rejects_price_outside_range() {
        for suggested_price in [dec!(109.99), dec!(130.01), dec!(500)] {
            assert!(is_cross_field(PriceResult::construct(PriceDraft {
                suggested_price,
                ..draft()
            })));
        }
    }

    #[test]
    fn rejects_price_not_above_cost() {
        // Range allows it but the cost rule does not.
        let at_cost = PriceDraft {
            min_price: dec!(90),
            suggested_price: dec!(100),
            ..draft()
        };
        assert!(is_cross_field(PriceResult::construct(at_cost)));

        let below_cost = PriceDraft {
            min_price: dec!(90),
            suggested_price: dec!(95),
            ..draft()
        };
        assert!(is_cross_field(PriceResult::construct(below_cost)));
    }

    #[test]
    fn field_constraints_come_before_cross_field_rules() {
        let err = PriceResult::construct(PriceDraft {
            base_cost: dec!(-1),
            suggested_price: dec!(500),
            ..draft()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ValidationError::FieldConstraint {
                field: "base_cost",
                ..
            }
        ));
    }

    #[test]
    fn zero_margin_is_allowed_negative_is_not() {
        assert!(PriceResult::construct(PriceDraft {
            margin: Decimal::ZERO,
            ..draft()
        })
        .is_ok());
        assert!(matches!(
            PriceResult::construct(PriceDraft {
                margin: dec!(-0.1),
                ..draft()
            }),
            Err(ValidationError::FieldConstraint { field: "margin", .. })
        ));
    }

    #[test]
    fn from_raw_parses_strategy() {
        let raw = serde_json::json!({
            "product_id": 1,
            "base_cost": 100,
            "suggested_price": "120.00",
            "min_price": 110,
            "max_price": 130,
            "strategy": "cost_plus",
            "margin": 0.1667
        });
        let price = PriceResult::from_raw(&raw).unwrap();
        assert_eq!(price.strategy(), PricingStrategy::CostPlus);
        assert_eq!(price.suggested_price(), dec!(120));
    }

    #[test]
    fn from_raw_missing_field_is_malformed() {
        let raw = serde_json::json!({"product_id": 1, "base_cost": 100});
        assert!(matches!(
            PriceResult::from_raw(&raw),
            Err(ValidationError::Malformed { record: "pricing", .. })
        ));
    }
}
