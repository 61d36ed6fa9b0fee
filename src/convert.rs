//! Pixel/rem/em unit conversion.
//!
//! Conversions follow the CSS conventions used throughout the preset:
//! `0` serializes without a unit, trailing zeros are trimmed, and `rem`/`em`
//! input to [`px`] is scaled by the root font size so that
//! `px(rem(x)) == x` round-trips exactly.

use crate::error::{Error, Result};

/// Default root font size in pixels, matching the browser default.
pub const DEFAULT_ROOT_FONT_SIZE: f64 = 16.0;

/// Converts between pixel values and rem/em strings for a fixed root font
/// size.
///
/// The root font size is validated once at construction and immutable
/// afterwards, so a converter can be shared freely across declarations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitConverter {
    root_font_size: f64,
}

impl Default for UnitConverter {
    fn default() -> Self {
        UnitConverter {
            root_font_size: DEFAULT_ROOT_FONT_SIZE,
        }
    }
}

impl UnitConverter {
    /// Create a converter with the given root font size in pixels.
    ///
    /// Fails with [`Error::InvalidConfig`] for a zero, negative, or
    /// non-finite size.
    pub fn new(root_font_size: f64) -> Result<Self> {
        if !root_font_size.is_finite() || root_font_size <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "root font size must be a positive number, got {root_font_size}"
            )));
        }
        Ok(UnitConverter { root_font_size })
    }

    /// The configured root font size in pixels.
    pub fn root_font_size(&self) -> f64 {
        self.root_font_size
    }

    /// Parse a length into its pixel magnitude.
    ///
    /// Strips a trailing unit suffix if present. `rem`/`em` values are
    /// scaled by the root font size; all other units (including `%`) keep
    /// their numeric magnitude. Fails with [`Error::InvalidLength`] if the
    /// remaining text is not numeric.
    pub fn px(&self, value: &str) -> Result<f64> {
        let trimmed = value.trim();
        let number_part = trimmed.trim_end_matches(|c: char| c.is_ascii_alphabetic() || c == '%');
        let unit = &trimmed[number_part.len()..];

        let magnitude: f64 = number_part
            .trim_end()
            .parse()
            .map_err(|_| Error::InvalidLength(value.to_string()))?;

        if unit.eq_ignore_ascii_case("rem") || unit.eq_ignore_ascii_case("em") {
            Ok(magnitude * self.root_font_size)
        } else {
            Ok(magnitude)
        }
    }

    /// Convert a pixel magnitude to an `em` string.
    pub fn em(&self, px: f64) -> String {
        self.to_unit(px, "em")
    }

    /// Convert a pixel magnitude to a `rem` string.
    pub fn rem(&self, px: f64) -> String {
        self.to_unit(px, "rem")
    }

    fn to_unit(&self, px: f64, unit: &str) -> String {
        // CSS-zero convention: zero lengths carry no unit
        if px == 0.0 {
            return "0".to_string();
        }
        format!("{}{}", format_number(px / self.root_font_size), unit)
    }
}

/// Parse a length into pixels using the default 16px root font size.
pub fn px(value: &str) -> Result<f64> {
    UnitConverter::default().px(value)
}

/// Convert a pixel magnitude to an `em` string using the default root size.
pub fn em(px: f64) -> String {
    UnitConverter::default().em(px)
}

/// Convert a pixel magnitude to a `rem` string using the default root size.
pub fn rem(px: f64) -> String {
    UnitConverter::default().rem(px)
}

/// Format a magnitude with trailing zeros trimmed.
///
/// `f64` Display already produces the shortest representation that
/// round-trips, which keeps `px(rem(x)) == x` exact.
pub(crate) fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{value}")
}
