//! Length conversions between the DOCX native unit (twips) and the units the
//! layout works in. 1 inch = 1440 twips = 72 pt = 96 CSS px.
//!
//! Every function accepts a plain `f64` or an `Option<f64>` and returns `0.0`
//! for absent, NaN or infinite input.

pub const TWIPS_PER_PIXEL: f64 = 15.0;
pub const TWIPS_PER_POINT: f64 = 20.0;
pub const PIXELS_PER_POINT: f64 = 96.0 / 72.0;

fn finite(value: impl Into<Option<f64>>) -> Option<f64> {
    value.into().filter(|v| v.is_finite())
}

pub fn twips_to_pixels(twips: impl Into<Option<f64>>) -> f64 {
    finite(twips).map_or(0.0, |v| v / TWIPS_PER_PIXEL)
}

/// Rounded to whole twips, the granularity DOCX stores.
pub fn pixels_to_twips(pixels: impl Into<Option<f64>>) -> f64 {
    finite(pixels).map_or(0.0, |v| (v * TWIPS_PER_PIXEL).round())
}

pub fn twips_to_points(twips: impl Into<Option<f64>>) -> f64 {
    finite(twips).map_or(0.0, |v| v / TWIPS_PER_POINT)
}

pub fn points_to_twips(points: impl Into<Option<f64>>) -> f64 {
    finite(points).map_or(0.0, |v| v * TWIPS_PER_POINT)
}

/// `w:sz` values are half-points.
pub fn half_points_to_points(half_points: impl Into<Option<f64>>) -> f64 {
    finite(half_points).map_or(0.0, |v| v / 2.0)
}

pub fn points_to_half_points(points: impl Into<Option<f64>>) -> f64 {
    finite(points).map_or(0.0, |v| v * 2.0)
}

pub fn points_to_pixels(points: impl Into<Option<f64>>) -> f64 {
    finite(points).map_or(0.0, |v| v * PIXELS_PER_POINT)
}

pub fn pixels_to_points(pixels: impl Into<Option<f64>>) -> f64 {
    finite(pixels).map_or(0.0, |v| v / PIXELS_PER_POINT)
}
