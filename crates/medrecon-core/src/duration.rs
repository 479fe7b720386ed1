//! Treatment end-date calculation.
//!
//! DAY and WEEK add fixed day counts. MONTH and YEAR add calendar months,
//! clamping to the last day of the target month (Jan 31 + 1 month = Feb 28/29).

use chrono::{DateTime, Days, Months, NaiveDate};

use crate::models::{DurationUnit, TreatmentProtocol};
use crate::reconcile::{ReconcileError, ReconcileResult};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse an ISO date, or the date part of an RFC 3339 timestamp.
pub fn parse_iso_date(raw: &str) -> ReconcileResult<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .map_err(|_| ReconcileError::InvalidDate(raw.to_string()))
}

/// Compute the end date for a start date and a duration.
pub fn compute_end_date(
    start_date: &str,
    duration_value: u32,
    unit: DurationUnit,
) -> ReconcileResult<String> {
    let start = parse_iso_date(start_date)?;
    let overflow = || ReconcileError::InvalidDate(start_date.to_string());

    let end = match unit {
        DurationUnit::Day => start.checked_add_days(Days::new(u64::from(duration_value))),
        DurationUnit::Week => start.checked_add_days(Days::new(7 * u64::from(duration_value))),
        DurationUnit::Month => start.checked_add_months(Months::new(duration_value)),
        DurationUnit::Year => duration_value
            .checked_mul(12)
            .and_then(|months| start.checked_add_months(Months::new(months))),
    }
    .ok_or_else(overflow)?;

    Ok(end.format(DATE_FORMAT).to_string())
}

/// End date for a session: empty means open-ended treatment.
///
/// Empty when either input is missing, the protocol carries no valid
/// duration, or the start date cannot be parsed.
pub fn end_date_for(start_date: &str, protocol: Option<&TreatmentProtocol>) -> String {
    let Some(protocol) = protocol else {
        return String::new();
    };
    if start_date.trim().is_empty() {
        return String::new();
    }
    let Some((value, unit)) = protocol.duration() else {
        return String::new();
    };

    match compute_end_date(start_date, value, unit) {
        Ok(end) => end,
        Err(e) => {
            tracing::warn!(protocol_id = protocol.id, "Leaving end date unset: {e}");
            String::new()
        }
    }
}
