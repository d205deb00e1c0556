// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for profile timestamps and dates.

use chrono::{DateTime, Datelike, NaiveDate, SecondsFormat, Utc};

/// Oldest plausible date of birth.
const MIN_DOB_YEAR: i32 = 1900;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Check a date of birth against `now`.
pub fn check_dob(dob: NaiveDate, now: DateTime<Utc>) -> Result<(), &'static str> {
    if dob > now.date_naive() {
        return Err("dob must not be in the future");
    }
    if dob.year() < MIN_DOB_YEAR {
        return Err("dob is too far in the past");
    }
    Ok(())
}
