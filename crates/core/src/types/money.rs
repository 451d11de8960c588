//! Invoice money math.
//!
//! All amounts are decimal values in the currency's standard unit. The
//! helpers here are the single source of truth for invoice arithmetic:
//! both the admin invoice endpoint and the chat invoice tool go through
//! them so the stored totals always satisfy the same relations.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

/// Number of days between an invoice's issue date and its due date.
pub const PAYMENT_TERMS_DAYS: u64 = 30;

/// Compute the total for a single invoice line.
#[must_use]
pub fn line_total(quantity: u32, unit_price: Decimal) -> Decimal {
    Decimal::from(quantity) * unit_price
}

/// Sum line totals into an invoice grand total.
#[must_use]
pub fn invoice_total<I>(line_totals: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    line_totals.into_iter().sum()
}

/// Compute the due date from the issue date using standard payment terms.
///
/// Saturates at the calendar boundary rather than panicking; dates that far
/// out do not occur in practice.
#[must_use]
pub fn due_date(issue_date: NaiveDate) -> NaiveDate {
    issue_date
        .checked_add_days(Days::new(PAYMENT_TERMS_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_line_total() {
        assert_eq!(line_total(3, dec("12.50")), dec("37.50"));
        assert_eq!(line_total(0, dec("99.99")), dec("0.00"));
    }

    #[test]
    fn test_line_total_keeps_precision() {
        // 7 * 0.1 must be exactly 0.7, not a float approximation
        assert_eq!(line_total(7, dec("0.1")), dec("0.7"));
    }

    #[test]
    fn test_invoice_total() {
        let totals = vec![dec("37.50"), dec("100.00"), dec("0.25")];
        assert_eq!(invoice_total(totals), dec("137.75"));
    }

    #[test]
    fn test_invoice_total_empty() {
        assert_eq!(invoice_total(Vec::new()), Decimal::ZERO);
    }

    #[test]
    fn test_due_date_thirty_days() {
        let issued = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let due = NaiveDate::from_ymd_opt(2025, 2, 14).unwrap();
        assert_eq!(due_date(issued), due);
    }

    #[test]
    fn test_due_date_crosses_year() {
        let issued = NaiveDate::from_ymd_opt(2025, 12, 20).unwrap();
        let due = NaiveDate::from_ymd_opt(2026, 1, 19).unwrap();
        assert_eq!(due_date(issued), due);
    }
}
