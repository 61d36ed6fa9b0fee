//! Color parsing and build-time blending.
//!
//! Supports hex colors (`#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`) and
//! `rgb()`/`rgba()` functional notation. Anything else — CSS variables,
//! other color functions, keywords — is only known at runtime, so blending
//! against it emits a `color-mix()` expression instead of a computed
//! literal.

use crate::error::{Error, Result};

/// An RGBA color with 8-bit channels and a fractional alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity in `0.0..=1.0`.
    pub a: f64,
}

impl Rgba {
    /// A fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 1.0 }
    }

    /// Serialize as `rgb(r, g, b)` when fully opaque, `rgba(...)` otherwise.
    pub fn to_css(&self) -> String {
        if self.a >= 1.0 {
            format!("rgb({}, {}, {})", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {})",
                self.r,
                self.g,
                self.b,
                format_alpha(self.a)
            )
        }
    }
}

/// A color token as seen by the build-time resolver.
///
/// Every consumer must handle both branches: `Literal` colors can be blended
/// at build time, `Dynamic` expressions must be deferred to the browser.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedColor {
    /// A color fully known at build time.
    Literal(Rgba),
    /// An expression whose value is only known at runtime, kept verbatim.
    Dynamic(String),
}

impl ResolvedColor {
    /// Parse a color-like token. Never fails: tokens the resolver cannot
    /// evaluate become [`ResolvedColor::Dynamic`].
    pub fn parse(token: &str) -> Self {
        let trimmed = token.trim();

        if let Some(color) = parse_hex(trimmed) {
            return ResolvedColor::Literal(color);
        }
        if let Some(color) = parse_rgb_function(trimmed) {
            return ResolvedColor::Literal(color);
        }

        ResolvedColor::Dynamic(trimmed.to_string())
    }
}

/// Set the alpha channel of a color.
///
/// Literal colors get a computed `rgba()` string; dynamic expressions get a
/// `color-mix()` against `transparent` that preserves runtime resolution.
/// `amount` must already be normalized to `0..=1` (see [`parse_amount`]).
pub fn alpha(color: &str, amount: f64) -> Result<String> {
    let amount = validate_amount(amount)?;

    match ResolvedColor::parse(color) {
        ResolvedColor::Literal(c) => Ok(format!(
            "rgba({}, {}, {}, {})",
            c.r,
            c.g,
            c.b,
            format_alpha(amount)
        )),
        ResolvedColor::Dynamic(expr) => Ok(format!(
            "color-mix(in srgb, {} {}, transparent)",
            expr,
            format_percent(amount)
        )),
    }
}

/// Interpolate a color toward white by `amount`.
pub fn lighten(color: &str, amount: f64) -> Result<String> {
    mix(color, amount, 255, "white")
}

/// Interpolate a color toward black by `amount`.
pub fn darken(color: &str, amount: f64) -> Result<String> {
    mix(color, amount, 0, "black")
}

fn mix(color: &str, amount: f64, target: u8, target_name: &str) -> Result<String> {
    let amount = validate_amount(amount)?;

    match ResolvedColor::parse(color) {
        ResolvedColor::Literal(c) => {
            let mixed = Rgba {
                r: mix_channel(c.r, target, amount),
                g: mix_channel(c.g, target, amount),
                b: mix_channel(c.b, target, amount),
                a: c.a,
            };
            Ok(mixed.to_css())
        }
        ResolvedColor::Dynamic(expr) => Ok(format!(
            "color-mix(in srgb, {} {}, {} {})",
            expr,
            format_percent(1.0 - amount),
            target_name,
            format_percent(amount)
        )),
    }
}

/// Normalize an amount argument: a `0..=1` decimal or an `N%` percentage.
///
/// Fails with [`Error::InvalidAlpha`] if the result is outside `0..=1`.
pub fn parse_amount(value: &str) -> Result<f64> {
    let trimmed = value.trim();
    let parsed = if let Some(percent) = trimmed.strip_suffix('%') {
        percent
            .trim_end()
            .parse::<f64>()
            .map(|p| p / 100.0)
            .map_err(|_| Error::InvalidAlpha(value.to_string()))?
    } else {
        trimmed
            .parse::<f64>()
            .map_err(|_| Error::InvalidAlpha(value.to_string()))?
    };
    validate_amount(parsed)
}

fn validate_amount(amount: f64) -> Result<f64> {
    if !amount.is_finite() || !(0.0..=1.0).contains(&amount) {
        return Err(Error::InvalidAlpha(format!(
            "amount must be between 0 and 1, got {amount}"
        )));
    }
    Ok(amount)
}

/// 8-bit channel interpolation: `max(0, min(255, round(x)))`.
fn mix_channel(channel: u8, target: u8, amount: f64) -> u8 {
    let mixed = channel as f64 + (target as f64 - channel as f64) * amount;
    mixed.round().clamp(0.0, 255.0) as u8
}

/// Alpha rounded to at most 3 decimal places to avoid float noise in output.
pub(crate) fn format_alpha(alpha: f64) -> String {
    crate::convert::format_number((alpha * 1000.0).round() / 1000.0)
}

/// Percentage rounded to at most 4 decimal places, e.g. `0.1` -> `10%`.
pub(crate) fn format_percent(fraction: f64) -> String {
    format!(
        "{}%",
        crate::convert::format_number((fraction * 1_000_000.0).round() / 10_000.0)
    )
}

fn parse_hex(s: &str) -> Option<Rgba> {
    let hex = s.strip_prefix('#')?.as_bytes();
    if !hex.iter().all(u8::is_ascii_hexdigit) {
        return None;
    }

    match hex.len() {
        // Shorthand digits are doubled: #F00 -> #FF0000
        3 => Some(Rgba::opaque(
            hex_digit(hex[0]) * 17,
            hex_digit(hex[1]) * 17,
            hex_digit(hex[2]) * 17,
        )),
        4 => Some(Rgba {
            r: hex_digit(hex[0]) * 17,
            g: hex_digit(hex[1]) * 17,
            b: hex_digit(hex[2]) * 17,
            a: hex_digit(hex[3]) as f64 * 17.0 / 255.0,
        }),
        6 => Some(Rgba::opaque(
            hex_pair(hex[0], hex[1]),
            hex_pair(hex[2], hex[3]),
            hex_pair(hex[4], hex[5]),
        )),
        8 => Some(Rgba {
            r: hex_pair(hex[0], hex[1]),
            g: hex_pair(hex[2], hex[3]),
            b: hex_pair(hex[4], hex[5]),
            a: hex_pair(hex[6], hex[7]) as f64 / 255.0,
        }),
        _ => None,
    }
}

/// Single hex digit to 0-15. Caller has already validated the input.
fn hex_digit(byte: u8) -> u8 {
    match byte {
        b'0'..=b'9' => byte - b'0',
        b'a'..=b'f' => byte - b'a' + 10,
        _ => byte - b'A' + 10,
    }
}

fn hex_pair(high: u8, low: u8) -> u8 {
    hex_digit(high) * 16 + hex_digit(low)
}

/// Parse `rgb()`/`rgba()` notation, both comma-separated and
/// space-separated (`rgb(255 0 0 / 50%)`) forms.
fn parse_rgb_function(s: &str) -> Option<Rgba> {
    let inner = strip_function(s, "rgba").or_else(|| strip_function(s, "rgb"))?;

    let (channels, alpha_part) = if inner.contains(',') {
        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        match parts.len() {
            3 => (parts, None),
            4 => (parts[..3].to_vec(), Some(parts[3])),
            _ => return None,
        }
    } else {
        let (rgb_part, alpha_part) = match inner.split_once('/') {
            Some((rgb, alpha)) => (rgb, Some(alpha.trim())),
            None => (inner, None),
        };
        let parts: Vec<&str> = rgb_part.split_whitespace().collect();
        if parts.len() != 3 {
            return None;
        }
        (parts, alpha_part)
    };

    let r = parse_channel(channels[0])?;
    let g = parse_channel(channels[1])?;
    let b = parse_channel(channels[2])?;
    let a = match alpha_part {
        Some(part) => parse_alpha_component(part)?,
        None => 1.0,
    };

    Some(Rgba { r, g, b, a })
}

/// Strip `name(` ... `)` from a function token, case-insensitively.
fn strip_function<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    let prefix = s.as_bytes().get(..name.len())?;
    if !prefix.eq_ignore_ascii_case(name.as_bytes()) {
        return None;
    }
    // The matched prefix is ASCII, so this split is on a char boundary
    let rest = s[name.len()..].trim_start();
    rest.strip_prefix('(')?.strip_suffix(')')
}

/// A color channel: `0..255` number or percentage.
fn parse_channel(s: &str) -> Option<u8> {
    let value = if let Some(percent) = s.strip_suffix('%') {
        percent.trim_end().parse::<f64>().ok()? / 100.0 * 255.0
    } else {
        s.parse::<f64>().ok()?
    };
    if !value.is_finite() {
        return None;
    }
    Some(value.round().clamp(0.0, 255.0) as u8)
}

fn parse_alpha_component(s: &str) -> Option<f64> {
    let value = if let Some(percent) = s.strip_suffix('%') {
        percent.trim_end().parse::<f64>().ok()? / 100.0
    } else {
        s.parse::<f64>().ok()?
    };
    if !value.is_finite() {
        return None;
    }
    Some(value.clamp(0.0, 1.0))
}
