// Copyright 2025 the Vizdeck Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Color ramps and color scales.
//!
//! - [`ScaleQuantize`] buckets a continuous domain into `step` equal-width intervals, each
//!   painted with one sample of a [`ColorRamp`]. The same bucket bounds drive the legend.
//! - [`ScaleOrdinal`] assigns palette colors to categories in first-seen order.

use hashbrown::HashMap;
use peniko::Color;
use peniko::color::Srgb;

/// Hex stops of common palettes.
pub mod palettes {
    /// The ten-color categorical palette (`category10`).
    pub const CATEGORY10: [&str; 10] = [
        "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
        "#bcbd22", "#17becf",
    ];

    /// Diverging red-yellow-blue, from red to blue.
    pub const RD_YL_BU: [&str; 11] = [
        "#a50026", "#d73027", "#f46d43", "#fdae61", "#fee090", "#ffffbf", "#e0f3f8", "#abd9e9",
        "#74add1", "#4575b4", "#313695",
    ];

    /// Sequential greens, from light to dark.
    pub const GREENS: [&str; 9] = [
        "#f7fcf5", "#e5f5e0", "#c7e9c0", "#a1d99b", "#74c476", "#41ab5d", "#238b45", "#006d2c",
        "#00441b",
    ];
}

/// Errors raised while building colors from configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    /// The string is not a CSS color.
    #[error("invalid color `{input}`: {reason}")]
    Invalid {
        /// The rejected string.
        input: String,
        /// Parser error description.
        reason: String,
    },
    /// A ramp was configured without stops.
    #[error("a color ramp needs at least one stop")]
    EmptyRamp,
}

/// Parses any CSS color string (`#rgb`, `#rrggbb`, named colors, `rgb()`, `hsl()`, ...).
pub fn parse_css_color(s: &str) -> Result<Color, ColorError> {
    peniko::color::parse_color(s.trim())
        .map(|c| c.to_alpha_color::<Srgb>())
        .map_err(|e| ColorError::Invalid {
            input: s.to_string(),
            reason: e.to_string(),
        })
}

/// Formats the RGB channels of `color` as `#rrggbb`.
pub fn to_hex(color: Color) -> String {
    let rgba = color.to_rgba8();
    format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
}

/// A piecewise-linear color ramp over `[0, 1]`.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorRamp {
    stops: Vec<Color>,
}

impl ColorRamp {
    /// Creates a ramp from evenly spaced stops.
    pub fn new(stops: Vec<Color>) -> Result<Self, ColorError> {
        if stops.is_empty() {
            return Err(ColorError::EmptyRamp);
        }
        Ok(Self { stops })
    }

    /// Creates a ramp from CSS color stops.
    pub fn from_css<S: AsRef<str>>(stops: &[S]) -> Result<Self, ColorError> {
        let stops = stops
            .iter()
            .map(|s| parse_css_color(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(stops)
    }

    /// Samples the ramp at `t` (clamped to `[0, 1]`).
    pub fn sample(&self, t: f64) -> Color {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let last = self.stops.len() - 1;
        if last == 0 {
            return self.stops[0];
        }
        let pos = t * last as f64;
        let i = {
            #[allow(clippy::cast_possible_truncation, reason = "pos is within 0..=last")]
            let i = pos.floor() as usize;
            i.min(last - 1)
        };
        lerp(self.stops[i], self.stops[i + 1], pos - i as f64)
    }
}

#[allow(clippy::cast_possible_truncation, reason = "interpolation factor is within 0..=1")]
fn lerp(a: Color, b: Color, t: f64) -> Color {
    let t = t as f32;
    let mut out = [0.0_f32; 4];
    for (o, (x, y)) in out.iter_mut().zip(a.components.iter().zip(b.components)) {
        *o = x + (y - x) * t;
    }
    Color::new(out)
}

/// A quantize scale: equal-width buckets over a continuous domain.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleQuantize {
    domain: (f64, f64),
    colors: Vec<Color>,
}

impl ScaleQuantize {
    /// Creates a scale with `steps` buckets (at least one) over `domain`.
    ///
    /// Bucket `i` is painted with the ramp sampled at `i / (steps - 1)`, or at `0.5` when
    /// there is a single bucket.
    pub fn new(domain: (f64, f64), steps: usize, ramp: &ColorRamp) -> Self {
        let steps = steps.max(1);
        let colors = (0..steps)
            .map(|i| {
                let t = if steps == 1 {
                    0.5
                } else {
                    i as f64 / (steps - 1) as f64
                };
                ramp.sample(t)
            })
            .collect();
        Self { domain, colors }
    }

    /// Returns the bucket index of `v`: `floor(t * steps)` clamped to `[0, steps - 1]`.
    ///
    /// Degenerate domains and non-finite values fall into bucket `0`.
    pub fn bucket(&self, v: f64) -> usize {
        let (lo, hi) = self.domain;
        let span = hi - lo;
        if !v.is_finite() || span.is_nan() || span <= 0.0 {
            return 0;
        }
        let idx = ((v - lo) / span * self.colors.len() as f64).floor();
        if idx <= 0.0 {
            return 0;
        }
        #[allow(clippy::cast_possible_truncation, reason = "positive and clamped below")]
        let idx = idx.min(usize::MAX as f64) as usize;
        idx.min(self.colors.len() - 1)
    }

    /// Maps a value to its bucket color.
    pub fn map(&self, v: f64) -> Color {
        self.colors[self.bucket(v)]
    }

    /// Returns the color of bucket `i`.
    pub fn color(&self, i: usize) -> Option<Color> {
        self.colors.get(i).copied()
    }

    /// Returns all bucket colors in order.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Returns the number of buckets.
    pub fn steps(&self) -> usize {
        self.colors.len()
    }

    /// Returns the domain.
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Returns the `steps + 1` bucket boundaries, from `min` to `max`.
    pub fn thresholds(&self) -> Vec<f64> {
        let (lo, hi) = self.domain;
        let n = self.colors.len();
        (0..=n)
            .map(|i| lo + (hi - lo) * i as f64 / n as f64)
            .collect()
    }

    /// Returns `(lower, upper)` per bucket.
    pub fn bucket_bounds(&self) -> Vec<(f64, f64)> {
        self.thresholds().windows(2).map(|w| (w[0], w[1])).collect()
    }
}

/// An ordinal scale assigning palette colors to categories in first-seen order.
///
/// The palette is reused cyclically once it runs out.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleOrdinal {
    palette: Vec<Color>,
    domain: Vec<String>,
    index: HashMap<String, usize>,
}

impl ScaleOrdinal {
    /// Creates a scale; duplicate categories keep their first position.
    pub fn new<I, S>(palette: Vec<Color>, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut domain = Vec::new();
        let mut index = HashMap::new();
        for c in categories {
            let c = c.into();
            if !index.contains_key(&c) {
                index.insert(c.clone(), domain.len());
                domain.push(c);
            }
        }
        Self {
            palette,
            domain,
            index,
        }
    }

    /// Returns the color of `category`, or `None` for an unknown category or empty palette.
    pub fn map(&self, category: &str) -> Option<Color> {
        if self.palette.is_empty() {
            return None;
        }
        let i = *self.index.get(category)?;
        Some(self.palette[i % self.palette.len()])
    }

    /// Returns the categories in first-seen order.
    pub fn domain(&self) -> &[String] {
        &self.domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greens() -> ColorRamp {
        ColorRamp::from_css(&palettes::GREENS).unwrap()
    }

    #[test]
    fn parses_css_color_forms() {
        assert_eq!(to_hex(parse_css_color("#ddf").unwrap()), "#ddddff");
        assert_eq!(to_hex(parse_css_color(" #1f77b4 ").unwrap()), "#1f77b4");
        assert_eq!(to_hex(parse_css_color("orange").unwrap()), "#ffa500");
        assert_eq!(to_hex(parse_css_color("rgb(255, 165, 0)").unwrap()), "#ffa500");
        assert!(
            matches!(parse_css_color("#12345"), Err(ColorError::Invalid { input, .. }) if input == "#12345"),
            "five hex digits are rejected"
        );
        assert!(parse_css_color("not-a-color").is_err(), "unknown names are rejected");
    }

    #[test]
    fn ramp_hits_its_stops() {
        let ramp = greens();
        assert_eq!(to_hex(ramp.sample(0.0)), "#f7fcf5");
        assert_eq!(to_hex(ramp.sample(1.0)), "#00441b");
        assert_eq!(to_hex(ramp.sample(0.5)), "#74c476");
        assert_eq!(ColorRamp::new(Vec::new()), Err(ColorError::EmptyRamp));
    }

    #[test]
    fn quantize_extremes_and_monotonicity() {
        let q = ScaleQuantize::new((2.6, 75.1), 9, &greens());
        assert_eq!(q.bucket(2.6), 0, "min falls in the first bucket");
        assert_eq!(q.bucket(75.1), 8, "max falls in the last bucket");
        assert_eq!(q.bucket(-10.0), 0);
        assert_eq!(q.bucket(1000.0), 8);

        let mut prev = 0;
        for i in 0..=200 {
            let v = 2.6 + (75.1 - 2.6) * f64::from(i) / 200.0;
            let b = q.bucket(v);
            assert!(b >= prev, "bucket index never decreases");
            prev = b;
        }
    }

    #[test]
    fn bucket_colors_sample_the_ramp_endpoints() {
        let q = ScaleQuantize::new((0.0, 1.0), 9, &greens());
        assert_eq!(q.colors().len(), 9);
        assert_eq!(to_hex(q.map(0.0)), "#f7fcf5");
        assert_eq!(to_hex(q.map(1.0)), "#00441b");

        let single = ScaleQuantize::new((0.0, 1.0), 1, &greens());
        assert_eq!(to_hex(single.map(0.3)), "#74c476", "one bucket samples the ramp middle");
    }

    #[test]
    fn bucket_bounds_split_the_domain_evenly() {
        let q = ScaleQuantize::new((0.0, 10.0), 4, &greens());
        assert_eq!(q.thresholds(), [0.0, 2.5, 5.0, 7.5, 10.0]);
        assert_eq!(q.bucket_bounds()[1], (2.5, 5.0));
        assert_eq!(q.bucket(5.0), 2);
        assert_eq!(q.bucket(4.99), 1);
    }

    #[test]
    fn degenerate_domain_uses_the_first_bucket() {
        let q = ScaleQuantize::new((3.0, 3.0), 9, &greens());
        assert_eq!(q.bucket(3.0), 0);
    }

    #[test]
    fn ordinal_assigns_first_seen_order() {
        let palette = ColorRamp::from_css(&palettes::CATEGORY10).unwrap().stops;
        let s = ScaleOrdinal::new(palette, ["Wii", "NES", "Wii", "GB"]);
        assert_eq!(s.domain(), ["Wii", "NES", "GB"]);
        assert_eq!(s.map("NES").map(to_hex).as_deref(), Some("#ff7f0e"));
        assert_eq!(s.map("PS4"), None);
    }
}
