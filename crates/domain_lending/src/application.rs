//! Loan application entity
//!
//! An application is created in the pending-review status and afterwards only
//! changes through [`Application::change_status`], which also refreshes the
//! update timestamp. Applications are never deleted.

use chrono::{DateTime, NaiveDate, Utc};
use core_kernel::{ApplicationId, LoanTypeId, StatusId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::FinancialCalculator;
use crate::error::{LendingError, LendingResult};

/// A single loan request submitted by an applicant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    /// Absent until the application is persisted
    pub id: Option<ApplicationId>,
    /// Applicant identity document
    pub applicant_id: String,
    pub email: String,
    pub amount: Decimal,
    /// Due date of the loan; the installment count is derived from it
    pub term: NaiveDate,
    pub loan_type_id: LoanTypeId,
    pub status_id: StatusId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Builds a new, not yet persisted application
    ///
    /// # Errors
    ///
    /// Returns `LendingError::Validation` when the applicant id or email is
    /// blank or the amount is not positive.
    pub fn new(
        applicant_id: &str,
        email: &str,
        amount: Decimal,
        term: NaiveDate,
        loan_type_id: LoanTypeId,
        status_id: StatusId,
    ) -> LendingResult<Self> {
        let applicant_id = applicant_id.trim();
        let email = email.trim();

        if applicant_id.is_empty() {
            return Err(LendingError::validation_field("applicant id is required", "idUser"));
        }
        if email.is_empty() {
            return Err(LendingError::validation_field("email is required", "email"));
        }
        if amount <= Decimal::ZERO {
            return Err(LendingError::validation_field("amount must be greater than zero", "monto"));
        }

        let now = Utc::now();
        Ok(Self {
            id: None,
            applicant_id: applicant_id.to_string(),
            email: email.to_string(),
            amount,
            term,
            loan_type_id,
            status_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns a copy carrying the key assigned by the store
    pub fn with_id(mut self, id: ApplicationId) -> Self {
        self.id = Some(id);
        self
    }

    /// Moves the application to `status_id` and refreshes `updated_at`
    pub fn change_status(&mut self, status_id: StatusId) {
        self.status_id = status_id;
        self.updated_at = Utc::now();
    }

    /// The persisted key; an unsaved application here is a programming error
    pub fn require_id(&self) -> LendingResult<ApplicationId> {
        self.id
            .ok_or_else(|| LendingError::internal("application has not been persisted"))
    }

    /// Monthly installment for this application at `annual_rate_percent`
    pub fn monthly_installment(
        &self,
        calculator: &FinancialCalculator,
        annual_rate_percent: Decimal,
    ) -> LendingResult<Decimal> {
        calculator.monthly_installment(self.amount, annual_rate_percent, self.term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn term() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()
    }

    #[test]
    fn test_new_trims_and_defaults() {
        let app = Application::new(
            "  1020304050 ",
            " ana@example.com ",
            dec!(2500),
            term(),
            LoanTypeId::new(1),
            StatusId::new(1),
        )
        .unwrap();

        assert_eq!(app.applicant_id, "1020304050");
        assert_eq!(app.email, "ana@example.com");
        assert!(app.id.is_none());
        assert_eq!(app.created_at, app.updated_at);
    }

    #[test]
    fn test_new_rejects_invalid_input() {
        let blank_id = Application::new(" ", "a@b.co", dec!(1), term(), LoanTypeId::new(1), StatusId::new(1));
        assert_eq!(blank_id.unwrap_err().field(), Some("idUser"));

        let blank_email = Application::new("1", "", dec!(1), term(), LoanTypeId::new(1), StatusId::new(1));
        assert_eq!(blank_email.unwrap_err().field(), Some("email"));

        let zero = Application::new("1", "a@b.co", dec!(0), term(), LoanTypeId::new(1), StatusId::new(1));
        assert_eq!(zero.unwrap_err().field(), Some("monto"));
    }

    #[test]
    fn test_change_status_refreshes_timestamp() {
        let mut app = Application::new("1", "a@b.co", dec!(10), term(), LoanTypeId::new(1), StatusId::new(1))
            .unwrap()
            .with_id(ApplicationId::new(5));
        let before = app.updated_at;

        app.change_status(StatusId::new(2));

        assert_eq!(app.status_id, StatusId::new(2));
        assert!(app.updated_at >= before);
        assert_eq!(app.require_id().unwrap(), ApplicationId::new(5));
    }
}
