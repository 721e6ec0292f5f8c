// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Calendar tick generation and formatting over epoch milliseconds (UTC).

use chrono::{DateTime, Datelike, Month, NaiveDate};

use crate::format::format_number;

/// Returns the timestamp (ms, UTC) of January 1st of `year`.
pub fn year_start_millis(year: i32) -> Option<i64> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?.and_hms_opt(0, 0, 0)?;
    Some(start.and_utc().timestamp_millis())
}

fn year_of(ms: f64) -> Option<i32> {
    if !ms.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, reason = "saturating cast of a finite value")]
    let ms = ms as i64;
    DateTime::from_timestamp_millis(ms).map(|d| d.year())
}

fn nice_year_step(raw: f64) -> i32 {
    const STEPS: &[i32] = &[1, 2, 5, 10, 20, 25, 50, 100, 200, 500];
    STEPS
        .iter()
        .copied()
        .find(|&s| f64::from(s) >= raw)
        .unwrap_or(1000)
}

/// Returns January 1st timestamps inside `[min, max]`, spaced by a round number of years so
/// that roughly `count` ticks are produced.
pub fn year_ticks_millis(mut min: f64, mut max: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    if min > max {
        core::mem::swap(&mut min, &mut max);
    }
    let (Some(y0), Some(y1)) = (year_of(min), year_of(max)) else {
        return Vec::new();
    };
    let span = f64::from(y1 - y0).max(1.0);
    let step = nice_year_step(span / count as f64);

    let mut out = Vec::new();
    let mut year = y0.div_euclid(step) * step;
    while year <= y1 {
        if let Some(ms) = year_start_millis(year).map(|ms| ms as f64)
            && ms >= min
            && ms <= max
        {
            out.push(ms);
        }
        year += step;
    }
    out
}

/// Formats a timestamp (ms) as its calendar year.
pub fn format_year(ms: f64) -> String {
    year_of(ms).map_or_else(|| format_number(ms), |y| y.to_string())
}

/// Returns the English month name for a 0-based month index.
pub fn month_name(index: usize) -> Option<&'static str> {
    let number = u8::try_from(index + 1).ok()?;
    Month::try_from(number).ok().map(|m| m.name())
}
