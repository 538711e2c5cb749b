use serde::de::DeserializeOwned;
use thiserror::Error;

/// Why a stage's raw fields could not become a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A single field violates its own constraint (e.g. a negative cost).
    #[error("{record}.{field}: {reason}")]
    FieldConstraint {
        record: &'static str,
        field: &'static str,
        reason: String,
    },

    /// A rule spanning several fields of one record was violated.
    #[error("{record}: {rule}")]
    CrossFieldInvariant { record: &'static str, rule: String },

    /// The raw mapping does not have the shape of the record at all.
    #[error("{record}: malformed raw fields: {reason}")]
    Malformed { record: &'static str, reason: String },
}

impl ValidationError {
    pub fn field(record: &'static str, field: &'static str, reason: impl Into<String>) -> Self {
        Self::FieldConstraint {
            record,
            field,
            reason: reason.into(),
        }
    }

    pub fn cross_field(record: &'static str, rule: impl Into<String>) -> Self {
        Self::CrossFieldInvariant {
            record,
            rule: rule.into(),
        }
    }

    pub fn record(&self) -> &'static str {
        match self {
            Self::FieldConstraint { record, .. }
            | Self::CrossFieldInvariant { record, .. }
            | Self::Malformed { record, .. } => record,
        }
    }
}

/// Deserialize a draft from a raw JSON mapping produced by a collaborator.
pub(crate) fn parse_draft<T: DeserializeOwned>(
    record: &'static str,
    raw: &serde_json::Value,
) -> Result<T, ValidationError> {
    if !raw.is_object() {
        return Err(ValidationError::Malformed {
            record,
            reason: format!("expected a JSON object, got {raw}"),
        });
    }
    T::deserialize(raw).map_err(|e| ValidationError::Malformed {
        record,
        reason: e.to_string(),
    })
}
