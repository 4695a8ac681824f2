//! Loan type configuration
//!
//! A loan type is a named product bounding the amounts an applicant may
//! request. It also carries the annual interest rate used for installment
//! math and the flag that routes new applications to automatic assessment.

use core_kernel::LoanTypeId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{LendingError, LendingResult};

/// Inclusive range check `min <= amount <= max`
pub fn validate_range(amount: Decimal, min: Decimal, max: Decimal) -> bool {
    amount >= min && amount <= max
}

/// A loan product definition, immutable once loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanTypeConfig {
    pub id: LoanTypeId,
    pub name: String,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
    /// Annual rate as a percentage, e.g. `12.5` for 12.5%
    pub annual_interest_rate: Decimal,
    pub automatic_review: bool,
}

impl LoanTypeConfig {
    /// Builds a loan type, enforcing `0 < min <= max` and a non-negative rate
    pub fn new(
        id: LoanTypeId,
        name: impl Into<String>,
        min_amount: Decimal,
        max_amount: Decimal,
        annual_interest_rate: Decimal,
        automatic_review: bool,
    ) -> LendingResult<Self> {
        if min_amount <= Decimal::ZERO {
            return Err(LendingError::validation("minimum amount must be greater than zero"));
        }
        if max_amount < min_amount {
            return Err(LendingError::validation(
                "maximum amount must be greater than or equal to the minimum amount",
            ));
        }
        if annual_interest_rate < Decimal::ZERO {
            return Err(LendingError::validation("interest rate cannot be negative"));
        }

        Ok(Self {
            id,
            name: name.into(),
            min_amount,
            max_amount,
            annual_interest_rate,
            automatic_review,
        })
    }

    /// Whether `amount` lies within this product's bounds, inclusive
    pub fn accepts_amount(&self, amount: Decimal) -> bool {
        validate_range(amount, self.min_amount, self.max_amount)
    }
}
