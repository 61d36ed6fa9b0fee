//! Declaration value rewriting.
//!
//! Scans a declaration's raw value text for recognized function calls
//! (`rem()`, `em()`, `alpha()`, `lighten()`, `darken()`, `light-dark()`)
//! and splices computed replacements back in at the original spans.
//!
//! The scan is fail-open: unknown function names, mismatched parentheses,
//! and wrong arities are left as literal text. Only recognized calls with
//! invalid argument values (a non-numeric length, an out-of-range amount)
//! fail. Because no output form (`rgb`, `rgba`, `color-mix`, plain
//! dimensions) is a recognized input name, the rewrite is idempotent.

use memchr::memchr3;

use crate::color;
use crate::convert::UnitConverter;
use crate::error::Result;
use crate::preset::Features;

/// Shared state for a rewrite pass: the unit converter and the feature
/// toggles that gate which function names are recognized.
pub(crate) struct RewriteContext<'a> {
    pub converter: &'a UnitConverter,
    pub features: &'a Features,
}

impl RewriteContext<'_> {
    fn recognizes(&self, name: &str) -> bool {
        let features = self.features;
        if name.eq_ignore_ascii_case("rem") || name.eq_ignore_ascii_case("em") {
            return features.rem_em;
        }
        if name.eq_ignore_ascii_case("alpha")
            || name.eq_ignore_ascii_case("lighten")
            || name.eq_ignore_ascii_case("darken")
        {
            return features.color_functions;
        }
        if name.eq_ignore_ascii_case("light-dark") {
            return features.light_dark;
        }
        false
    }
}

/// Rewrite a single declaration value.
pub(crate) fn rewrite_value(value: &str, ctx: &RewriteContext<'_>) -> Result<String> {
    let bytes = value.as_bytes();
    let mut out = String::with_capacity(value.len());
    // Start of the span not yet copied to the output
    let mut copied = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        let Some(offset) = memchr3(b'(', b'\'', b'"', &bytes[pos..]) else {
            break;
        };
        let at = pos + offset;

        if bytes[at] != b'(' {
            pos = skip_string(bytes, at);
            continue;
        }

        let name_start = ident_start(bytes, at);
        let name = &value[name_start..at];
        if name.is_empty() || !ctx.recognizes(name) {
            pos = at + 1;
            continue;
        }

        let Some(close) = matching_close(bytes, at) else {
            // Unbalanced parentheses: leave the rest as literal text
            break;
        };

        // Arguments are rewritten inside-out, so nested calls resolve first
        let mut args = Vec::new();
        for arg in split_arguments(&value[at + 1..close]) {
            args.push(rewrite_value(arg, ctx)?);
        }

        match apply(name, &args, ctx)? {
            Some(replacement) => {
                out.push_str(&value[copied..name_start]);
                out.push_str(&replacement);
                copied = close + 1;
                pos = close + 1;
            }
            // Wrong arity: not our call shape, leave it alone
            None => pos = at + 1,
        }
    }

    out.push_str(&value[copied..]);
    Ok(out)
}

/// Dispatch a recognized call. Returns `None` when the arity doesn't match,
/// which leaves the original text untouched.
fn apply(name: &str, args: &[String], ctx: &RewriteContext<'_>) -> Result<Option<String>> {
    if name.eq_ignore_ascii_case("rem") || name.eq_ignore_ascii_case("em") {
        let [length] = args else { return Ok(None) };
        let magnitude = ctx.converter.px(length.trim())?;
        let result = if name.eq_ignore_ascii_case("rem") {
            ctx.converter.rem(magnitude)
        } else {
            ctx.converter.em(magnitude)
        };
        return Ok(Some(result));
    }

    if name.eq_ignore_ascii_case("light-dark") {
        let [light, dark] = args else { return Ok(None) };
        return Ok(Some(format!("light-dark({}, {})", light.trim(), dark.trim())));
    }

    let [token, amount] = args else { return Ok(None) };
    let amount = color::parse_amount(amount)?;
    let result = if name.eq_ignore_ascii_case("alpha") {
        color::alpha(token, amount)?
    } else if name.eq_ignore_ascii_case("lighten") {
        color::lighten(token, amount)?
    } else {
        color::darken(token, amount)?
    };
    Ok(Some(result))
}

/// Walk back over identifier characters to find the start of the function
/// name ending at `open`. Maximal munch means `lorem(` never matches `rem(`.
fn ident_start(bytes: &[u8], open: usize) -> usize {
    let mut start = open;
    while start > 0 {
        let byte = bytes[start - 1];
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            start -= 1;
        } else {
            break;
        }
    }
    start
}

/// Find the `)` matching the `(` at `open`, skipping quoted strings.
fn matching_close(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut pos = open + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'(' => {
                depth += 1;
                pos += 1;
            }
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(pos);
                }
                pos += 1;
            }
            b'\'' | b'"' => pos = skip_string(bytes, pos),
            _ => pos += 1,
        }
    }
    None
}

/// Skip a quoted string starting at `quote`, honoring backslash escapes.
/// Returns the index just past the closing quote (or end of input).
fn skip_string(bytes: &[u8], quote: usize) -> usize {
    let delimiter = bytes[quote];
    let mut pos = quote + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            byte if byte == delimiter => return pos + 1,
            _ => pos += 1,
        }
    }
    pos
}

/// Split an argument list on top-level commas. Commas inside nested
/// parentheses or quoted strings do not split.
fn split_arguments(args: &str) -> Vec<&str> {
    let bytes = args.as_bytes();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut pos = 0;

    while pos < bytes.len() {
        match bytes[pos] {
            b'(' => {
                depth += 1;
                pos += 1;
            }
            b')' => {
                depth = depth.saturating_sub(1);
                pos += 1;
            }
            b',' if depth == 0 => {
                parts.push(&args[start..pos]);
                start = pos + 1;
                pos += 1;
            }
            b'\'' | b'"' => pos = skip_string(bytes, pos),
            _ => pos += 1,
        }
    }

    if start < bytes.len() || !parts.is_empty() {
        parts.push(&args[start..]);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn rewrite(value: &str) -> Result<String> {
        let converter = UnitConverter::default();
        let features = Features::default();
        rewrite_value(
            value,
            &RewriteContext {
                converter: &converter,
                features: &features,
            },
        )
    }

    #[test]
    fn test_rem_em_calls() {
        assert_eq!(rewrite("rem(16px)").unwrap(), "1rem");
        assert_eq!(rewrite("em(24px)").unwrap(), "1.5em");
        assert_eq!(rewrite("rem(0)").unwrap(), "0");
        assert_eq!(
            rewrite("rem(1px) solid #000").unwrap(),
            "0.0625rem solid #000"
        );
    }

    #[test]
    fn test_alpha_call() {
        assert_eq!(
            rewrite("alpha(#ff0000, 0.5)").unwrap(),
            "rgba(255, 0, 0, 0.5)"
        );
        assert_eq!(
            rewrite("alpha(#ff0000, 50%)").unwrap(),
            "rgba(255, 0, 0, 0.5)"
        );
    }

    #[test]
    fn test_dynamic_color_falls_back_to_color_mix() {
        assert_eq!(
            rewrite("alpha(var(--gray-4), 0.1)").unwrap(),
            "color-mix(in srgb, var(--gray-4) 10%, transparent)"
        );
        assert_eq!(
            rewrite("lighten(var(--gray-4), 0.1)").unwrap(),
            "color-mix(in srgb, var(--gray-4) 90%, white 10%)"
        );
    }

    #[test]
    fn test_nested_calls_resolve_inside_out() {
        assert_eq!(
            rewrite("lighten(alpha(#f00, 0.5), 0.2)").unwrap(),
            "rgba(255, 51, 51, 0.5)"
        );
    }

    #[test]
    fn test_light_dark_rewrites_arguments() {
        assert_eq!(
            rewrite("light-dark(alpha(#fff, 0.5), #000)").unwrap(),
            "light-dark(rgba(255, 255, 255, 0.5), #000)"
        );
        assert_eq!(
            rewrite("light-dark(white, black)").unwrap(),
            "light-dark(white, black)"
        );
    }

    #[test]
    fn test_unknown_functions_pass_through() {
        assert_eq!(rewrite("calc(100% - 20px)").unwrap(), "calc(100% - 20px)");
        assert_eq!(rewrite("var(--spacing)").unwrap(), "var(--spacing)");
    }

    #[test]
    fn test_rewrites_inside_unknown_functions() {
        assert_eq!(
            rewrite("linear-gradient(alpha(#f00, 0.5), #fff)").unwrap(),
            "linear-gradient(rgba(255, 0, 0, 0.5), #fff)"
        );
    }

    #[test]
    fn test_word_boundary() {
        // `lorem(` must not match `rem(`
        assert_eq!(rewrite("lorem(16px)").unwrap(), "lorem(16px)");
        assert_eq!(rewrite("--rem(16px)").unwrap(), "--rem(16px)");
    }

    #[test]
    fn test_idempotence() {
        for value in [
            "rgba(255, 0, 0, 0.5)",
            "color-mix(in srgb, var(--x) 10%, transparent)",
            "light-dark(white, black)",
            "0.0625rem solid rgb(128, 0, 0)",
        ] {
            assert_eq!(rewrite(value).unwrap(), value);
        }
    }

    #[test]
    fn test_unbalanced_parens_left_alone() {
        assert_eq!(rewrite("alpha(#f00, 0.5").unwrap(), "alpha(#f00, 0.5");
    }

    #[test]
    fn test_wrong_arity_left_alone() {
        assert_eq!(rewrite("alpha(#f00)").unwrap(), "alpha(#f00)");
        assert_eq!(
            rewrite("rem(16px, 32px)").unwrap(),
            "rem(16px, 32px)"
        );
    }

    #[test]
    fn test_invalid_arguments_fail() {
        assert!(matches!(rewrite("rem(abc)"), Err(Error::InvalidLength(_))));
        assert!(matches!(
            rewrite("alpha(#f00, 1.5)"),
            Err(Error::InvalidAlpha(_))
        ));
    }

    #[test]
    fn test_quoted_strings_are_opaque() {
        assert_eq!(
            rewrite(r#""rem(16px)" rem(16px)"#).unwrap(),
            r#""rem(16px)" 1rem"#
        );
    }

    #[test]
    fn test_split_arguments() {
        assert_eq!(split_arguments("a, b"), vec!["a", " b"]);
        assert_eq!(split_arguments("var(--x, red), 0.5"), vec![
            "var(--x, red)",
            " 0.5"
        ]);
        assert_eq!(split_arguments(""), Vec::<&str>::new());
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn prop_rewriting_output_is_a_fixed_point(
            r in 0u8..=255,
            g in 0u8..=255,
            b in 0u8..=255,
            amount in 0.0f64..=1.0,
        ) {
            let value = format!("alpha(#{r:02x}{g:02x}{b:02x}, {amount})");
            let once = rewrite(&value).unwrap();
            let twice = rewrite(&once).unwrap();
            prop_assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_disabled_features_are_not_recognized() {
        let converter = UnitConverter::default();
        let features = Features {
            rem_em: false,
            ..Features::default()
        };
        let ctx = RewriteContext {
            converter: &converter,
            features: &features,
        };
        assert_eq!(rewrite_value("rem(16px)", &ctx).unwrap(), "rem(16px)");
        assert_eq!(
            rewrite_value("alpha(#f00, 0.5)", &ctx).unwrap(),
            "rgba(255, 0, 0, 0.5)"
        );
    }
}
