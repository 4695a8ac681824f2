//! Installment math
//!
//! Standard French amortization of a principal over the whole months left until
//! the application's due date:
//!
//! ```text
//! r   = annual_rate / 12 / 100
//! n   = max(1, months_between(today, due_date))
//! v   = 1 / (1 + r)
//! PMT = P * r / (1 - v^n)      (P / n when r = 0)
//! ```
//!
//! `v^n` only shrinks toward zero, so distant due dates cannot overflow.
//!
//! Only the final installment is rounded, half-up to two decimal places.
//! A due date in the past or less than a month away is clamped to a single
//! installment instead of being rejected.

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::error::{LendingError, LendingResult};

const INSTALLMENT_DECIMALS: u32 = 2;

/// Signed count of whole calendar months from `from` to `to`
///
/// A trailing partial month does not count: Jan 31 to Feb 28 is zero months.
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i64 {
    let start = i64::from(from.year()) * 12 + i64::from(from.month0());
    let end = i64::from(to.year()) * 12 + i64::from(to.month0());
    let mut months = end - start;

    if months > 0 && to.day() < from.day() {
        months -= 1;
    } else if months < 0 && to.day() > from.day() {
        months += 1;
    }
    months
}

/// Computes monthly installments for a principal and a due date
#[derive(Debug, Clone, Copy, Default)]
pub struct FinancialCalculator {
    today: Option<NaiveDate>,
}

impl FinancialCalculator {
    /// A calculator that measures terms from the current UTC date
    pub fn new() -> Self {
        Self { today: None }
    }

    /// A calculator pinned to a fixed date
    pub fn fixed(today: NaiveDate) -> Self {
        Self { today: Some(today) }
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }

    /// Number of installments until `due_date`, never less than one
    pub fn installment_count(&self, due_date: NaiveDate) -> u32 {
        let months = months_between(self.today(), due_date).max(1);
        u32::try_from(months).unwrap_or(u32::MAX)
    }

    /// Monthly installment for `principal` at `annual_rate_percent` until `due_date`
    pub fn monthly_installment(
        &self,
        principal: Decimal,
        annual_rate_percent: Decimal,
        due_date: NaiveDate,
    ) -> LendingResult<Decimal> {
        let n = self.installment_count(due_date);
        let rate = annual_rate_percent / dec!(12) / dec!(100);

        if rate.is_zero() {
            return Ok(round_half_up(principal / Decimal::from(n)));
        }

        let discount = Decimal::ONE / (Decimal::ONE + rate);
        let denominator = Decimal::ONE - discounted(discount, n)?;
        if denominator.is_zero() {
            // rate too small to register at 28 digits of precision
            return Ok(round_half_up(principal / Decimal::from(n)));
        }

        let numerator = principal
            .checked_mul(rate)
            .ok_or_else(|| LendingError::internal("installment computation overflowed"))?;

        Ok(round_half_up(numerator / denominator))
    }
}

/// `factor^periods`; bounded for the `0 < factor <= 1` a non-negative rate gives
fn discounted(factor: Decimal, periods: u32) -> LendingResult<Decimal> {
    let mut acc = Decimal::ONE;
    for _ in 0..periods {
        acc = acc
            .checked_mul(factor)
            .ok_or_else(|| LendingError::internal("installment computation overflowed"))?;
        if acc.is_zero() {
            break;
        }
    }
    Ok(acc)
}

fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(INSTALLMENT_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_months_between_counts_whole_months() {
        assert_eq!(months_between(date(2025, 1, 15), date(2025, 4, 15)), 3);
        assert_eq!(months_between(date(2025, 1, 15), date(2025, 4, 14)), 2);
        assert_eq!(months_between(date(2025, 1, 31), date(2025, 2, 28)), 0);
        assert_eq!(months_between(date(2025, 1, 1), date(2026, 1, 1)), 12);
    }

    #[test]
    fn test_months_between_negative() {
        assert_eq!(months_between(date(2025, 6, 10), date(2025, 3, 10)), -3);
        assert_eq!(months_between(date(2025, 6, 10), date(2025, 3, 11)), -2);
    }

    #[test]
    fn test_known_amortization() {
        // 10,000 at 12% over 12 months -> 888.49
        let calc = FinancialCalculator::fixed(date(2025, 1, 1));
        let pmt = calc
            .monthly_installment(dec!(10000), dec!(12), date(2026, 1, 1))
            .unwrap();
        assert_eq!(pmt, dec!(888.49));
    }

    #[test]
    fn test_zero_rate_is_straight_division() {
        let calc = FinancialCalculator::fixed(date(2025, 1, 1));
        let pmt = calc
            .monthly_installment(dec!(1000), dec!(0), date(2025, 4, 1))
            .unwrap();
        assert_eq!(pmt, dec!(333.33));
    }

    #[test]
    fn test_overdue_term_is_single_installment() {
        let calc = FinancialCalculator::fixed(date(2025, 6, 1));
        assert_eq!(calc.installment_count(date(2024, 1, 1)), 1);
        assert_eq!(calc.installment_count(date(2025, 6, 20)), 1);

        let pmt = calc
            .monthly_installment(dec!(500), dec!(24), date(2024, 1, 1))
            .unwrap();
        // one period at 2%: 500 * 1.02
        assert_eq!(pmt, dec!(510.00));
    }

    #[test]
    fn test_distant_due_date_converges_to_interest_only() {
        // ~6,900 periods at 18.5% a year: v^n vanishes and PMT = P * r
        let calc = FinancialCalculator::fixed(date(2025, 1, 1));
        let pmt = calc
            .monthly_installment(dec!(1000000), dec!(18.5), date(2600, 1, 1))
            .unwrap();
        assert_eq!(pmt, dec!(15416.67));
    }

    #[test]
    fn test_rounding_is_half_up() {
        assert_eq!(round_half_up(dec!(1.005)), dec!(1.01));
        assert_eq!(round_half_up(dec!(1.004)), dec!(1.00));
    }
}
