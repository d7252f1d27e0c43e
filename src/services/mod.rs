// Patient records and staff
pub mod employees;
pub mod patients;

// Visit ledger and payments
pub mod payments;
pub mod visits;

// Warehouse and suppliers
pub mod contractors;
pub mod supplier_orders;
pub mod warehouse;

// Aggregates
pub mod reports;

use crate::errors::ServiceError;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Largest money amount accepted from a client
pub(crate) const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// Display format used by every read projection
pub(crate) const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

pub(crate) fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Parses `YYYY-MM-DD`, falling back to the `dd.mm.yyyy` display format.
pub(crate) fn parse_date(raw: &str, field: &str) -> Result<NaiveDate, ServiceError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, DISPLAY_DATE_FORMAT))
        .map_err(|_| {
            ServiceError::ValidationError(format!(
                "{} must be a date in YYYY-MM-DD format, got '{}'",
                field, raw
            ))
        })
}

pub(crate) fn parse_optional_date(
    raw: Option<&str>,
    field: &str,
) -> Result<Option<NaiveDate>, ServiceError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => parse_date(value, field).map(Some),
        None => Ok(None),
    }
}

/// Parses `HH:MM` or `HH:MM:SS`.
pub(crate) fn parse_time(raw: &str, field: &str) -> Result<NaiveTime, ServiceError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| {
            ServiceError::ValidationError(format!(
                "{} must be a time in HH:MM format, got '{}'",
                field, raw
            ))
        })
}

pub(crate) fn parse_optional_time(
    raw: Option<&str>,
    field: &str,
) -> Result<Option<NaiveTime>, ServiceError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(value) => parse_time(value, field).map(Some),
        None => Ok(None),
    }
}

/// Trims and drops empty strings so optional text columns store NULL.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Returns the trimmed value or a validation error naming the field.
pub(crate) fn required_text(value: Option<&str>, field: &str) -> Result<String, ServiceError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ServiceError::ValidationError(format!("{} is required", field)))
}

/// Rejects amounts outside `0..=MAX_AMOUNT`.
pub(crate) fn check_amount(value: Decimal, field: &str) -> Result<(), ServiceError> {
    if value < Decimal::ZERO {
        return Err(ServiceError::ValidationError(format!(
            "{} must not be negative",
            field
        )));
    }
    if value > MAX_AMOUNT {
        return Err(ServiceError::ValidationError(format!(
            "{} must not exceed {}",
            field, MAX_AMOUNT
        )));
    }
    Ok(())
}

fn amount_overflow() -> ServiceError {
    ServiceError::ValidationError("amount is out of range".into())
}

/// `price × quantity`, failing instead of overflowing.
pub(crate) fn extended_amount(price: Decimal, quantity: i32) -> Result<Decimal, ServiceError> {
    price
        .checked_mul(Decimal::from(quantity))
        .ok_or_else(amount_overflow)
}

pub(crate) fn sum_amounts<I>(amounts: I) -> Result<Decimal, ServiceError>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or_else(amount_overflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn dates_accept_iso_and_display_format() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(parse_date("2024-03-07", "date").unwrap(), expected);
        assert_eq!(parse_date("07.03.2024", "date").unwrap(), expected);
        assert_eq!(format_date(expected), "07.03.2024");
    }

    #[test]
    fn malformed_date_is_a_validation_error() {
        assert_matches!(
            parse_date("March 7", "date"),
            Err(ServiceError::ValidationError(msg)) if msg.contains("date")
        );
    }

    #[test]
    fn times_accept_minutes_and_seconds() {
        assert_eq!(
            parse_time("09:30", "startTime").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time("18:00:00", "endTime").unwrap(),
            NaiveTime::from_hms_opt(18, 0, 0).unwrap()
        );
        assert!(parse_optional_time(Some("  "), "startTime").unwrap().is_none());
    }

    #[test]
    fn required_text_rejects_blank() {
        assert_eq!(required_text(Some(" Ivanov "), "lastname").unwrap(), "Ivanov");
        assert_matches!(
            required_text(Some("   "), "lastname"),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(required_text(None, "lastname"), Err(ServiceError::ValidationError(_)));
    }

    #[test]
    fn amounts_are_bounded() {
        assert!(check_amount(Decimal::ZERO, "price").is_ok());
        assert!(check_amount(MAX_AMOUNT, "price").is_ok());
        assert_matches!(
            check_amount(MAX_AMOUNT + Decimal::ONE, "price"),
            Err(ServiceError::ValidationError(msg)) if msg.contains("price")
        );
        assert_matches!(
            check_amount(Decimal::NEGATIVE_ONE, "price"),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn arithmetic_overflow_is_an_error() {
        assert_eq!(extended_amount(dec!(3.20), 100).unwrap(), dec!(320.00));
        assert_matches!(
            extended_amount(Decimal::MAX, 2),
            Err(ServiceError::ValidationError(_))
        );
        assert_eq!(sum_amounts([dec!(1.5), dec!(2.5)]).unwrap(), dec!(4.0));
        assert_matches!(
            sum_amounts([Decimal::MAX, Decimal::ONE]),
            Err(ServiceError::ValidationError(_))
        );
    }
}
