//! Invoice money and date invariants.
//!
//! Both invoice entry points (the chat tool and the admin endpoint) build
//! their lines through these helpers, so the invariants are checked once
//! here against the shared math.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use harvestline_core::{PAYMENT_TERMS_DAYS, due_date, invoice_total, line_total};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn dec(s: &str) -> Decimal {
    s.parse().expect("valid decimal")
}

// =============================================================================
// Line totals
// =============================================================================

#[test]
fn test_line_total_is_quantity_times_unit_price() {
    assert_eq!(line_total(3, dec("28.50")), dec("85.50"));
    assert_eq!(line_total(1, dec("0.01")), dec("0.01"));
}

#[test]
fn test_line_total_keeps_cent_precision() {
    // 7 * 41.99 must not pick up float error
    assert_eq!(line_total(7, dec("41.99")), dec("293.93"));
}

#[test]
fn test_large_quantity_does_not_overflow() {
    let total = line_total(1_000_000, dec("245.00"));
    assert_eq!(total, dec("245000000.00"));
}

// =============================================================================
// Invoice totals
// =============================================================================

#[test]
fn test_invoice_total_is_sum_of_line_totals() {
    let lines = [dec("85.50"), dec("293.93"), dec("0.57")];
    assert_eq!(invoice_total(lines), dec("380.00"));
}

#[test]
fn test_invoice_total_of_no_lines_is_zero() {
    assert_eq!(invoice_total(std::iter::empty()), Decimal::ZERO);
}

// =============================================================================
// Due dates
// =============================================================================

#[test]
fn test_due_date_is_thirty_days_after_issue() {
    assert_eq!(PAYMENT_TERMS_DAYS, 30);
    assert_eq!(due_date(date(2026, 8, 28)), date(2026, 9, 27));
}

#[test]
fn test_due_date_crosses_year_boundary() {
    assert_eq!(due_date(date(2026, 12, 15)), date(2027, 1, 14));
}

#[test]
fn test_due_date_handles_leap_february() {
    assert_eq!(due_date(date(2028, 2, 1)), date(2028, 3, 2));
}
