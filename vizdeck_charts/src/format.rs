// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Number formatting for tick labels, attributes and tooltips.

/// Formats a tick value with as many decimals as the tick step needs.
pub fn format_tick_with_step(v: f64, step: f64) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }
    let step = step.abs();
    let decimals = if !step.is_finite() || step == 0.0 || step >= 1.0 {
        0
    } else {
        let d = (-step.log10()).ceil().clamp(0.0, 10.0);
        #[allow(clippy::cast_possible_truncation, reason = "clamped to 0..=10")]
        {
            d as usize
        }
    };
    format_fixed(v, decimals)
}

/// Formats `v` with a fixed number of decimals, never producing `-0`.
pub fn format_fixed(v: f64, decimals: usize) -> String {
    let s = format!("{v:.decimals$}");
    match s.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => s,
    }
}

/// Formats a datum value verbatim: shortest round-trip representation, integers without a
/// fractional part.
pub fn format_number(v: f64) -> String {
    if v == 0.0 {
        return "0".to_string();
    }
    format!("{v}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_decimals_follow_the_step() {
        assert_eq!(format_tick_with_step(2000.0, 2000.0), "2000");
        assert_eq!(format_tick_with_step(0.5, 0.5), "0.5");
        assert_eq!(format_tick_with_step(0.25, 0.05), "0.25");
        assert_eq!(format_tick_with_step(-0.0001, 0.1), "0.0");
    }

    #[test]
    fn numbers_keep_their_source_precision() {
        assert_eq!(format_number(243.1), "243.1");
        assert_eq!(format_number(20_338_986.0), "20338986");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_fixed(7.294, 1), "7.3");
    }
}
