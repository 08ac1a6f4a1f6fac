//! Shared DTO types used across multiple endpoints.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::Money;
use crate::error::TrackerError;

/// Query flag that destructive endpoints require.
#[derive(Debug, Clone, Copy, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ConfirmQuery {
    /// Must be `true` to perform the action.
    #[serde(default)]
    pub confirm: bool,
}

impl ConfirmQuery {
    /// Fails unless the caller confirmed `action`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::ConfirmationRequired`] when `confirm` is
    /// not set.
    pub fn require(self, action: &str) -> Result<(), TrackerError> {
        if self.confirm {
            Ok(())
        } else {
            Err(TrackerError::ConfirmationRequired(format!(
                "{action} requires ?confirm=true"
            )))
        }
    }
}

/// Count of records removed by a bulk delete.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RemovedResponse {
    /// Number of records removed.
    pub removed: usize,
}

/// Converts a decimal reais amount from a request body.
///
/// # Errors
///
/// Returns [`TrackerError::InvalidRequest`] for NaN or infinite values.
pub fn parse_money(value: f64, field: &str) -> Result<Money, TrackerError> {
    Money::from_decimal(value)
        .ok_or_else(|| TrackerError::InvalidRequest(format!("{field} must be a finite amount")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_confirmation_is_rejected() {
        let query = ConfirmQuery::default();
        assert!(matches!(
            query.require("clear history"),
            Err(TrackerError::ConfirmationRequired(_))
        ));
        assert!(ConfirmQuery { confirm: true }.require("clear history").is_ok());
    }

    #[test]
    fn non_finite_amounts_are_rejected() {
        assert!(parse_money(f64::NAN, "buy_in").is_err());
        assert_eq!(parse_money(12.5, "buy_in").ok(), Some(Money::from_cents(1250)));
    }
}
