//! Mixin templates and expansion.
//!
//! A `@mixin <name>;` or `@mixin <name> { ... }` at-rule expands to a
//! selector or media-query template with the at-rule body substituted for
//! the `@mixin-content;` slot. Expanded output uses native CSS nesting
//! (`&`); flattening is the host pipeline's concern.
//!
//! Built-in templates cover color-scheme styling (`light`, `dark` and
//! their `root`/`where` variants), hover with a pointer-device fallback,
//! text direction (`rtl`, `ltr`, `not-*`, `where-*`), and responsive
//! breakpoints (`smaller-than`, `larger-than`). Custom templates can be
//! registered per preset and take precedence over built-ins.

use crate::convert::UnitConverter;
use crate::error::Result;

/// Placeholder replaced by the processed at-rule body during expansion.
pub const CONTENT_SLOT: &str = "@mixin-content;";

const LIGHT: &str = "[data-umbra-color-scheme='light'] & {\n  @mixin-content;\n}";
const DARK: &str = "[data-umbra-color-scheme='dark'] & {\n  @mixin-content;\n}";
const LIGHT_ROOT: &str = "&[data-umbra-color-scheme='light'] {\n  @mixin-content;\n}";
const DARK_ROOT: &str = "&[data-umbra-color-scheme='dark'] {\n  @mixin-content;\n}";
const WHERE_LIGHT: &str = ":where([data-umbra-color-scheme='light']) & {\n  @mixin-content;\n}";
const WHERE_DARK: &str = ":where([data-umbra-color-scheme='dark']) & {\n  @mixin-content;\n}";
const WHERE_LIGHT_ROOT: &str =
    "&:where(:root[data-umbra-color-scheme='light']) {\n  @mixin-content;\n}";
const WHERE_DARK_ROOT: &str =
    "&:where(:root[data-umbra-color-scheme='dark']) {\n  @mixin-content;\n}";

const HOVER: &str = "@media (hover: hover) {\n  &:hover {\n    @mixin-content;\n  }\n}\n\
                     @media (hover: none) {\n  &:active {\n    @mixin-content;\n  }\n}";
const WHERE_HOVER: &str =
    "@media (hover: hover) {\n  &:where(:hover) {\n    @mixin-content;\n  }\n}\n\
     @media (hover: none) {\n  &:where(:active) {\n    @mixin-content;\n  }\n}";

const RTL: &str = "[dir=\"rtl\"] & {\n  @mixin-content;\n}";
const LTR: &str = "[dir=\"ltr\"] & {\n  @mixin-content;\n}";
const NOT_RTL: &str = ":root:not([dir=\"rtl\"]) & {\n  @mixin-content;\n}";
const NOT_LTR: &str = ":root:not([dir=\"ltr\"]) & {\n  @mixin-content;\n}";
const WHERE_RTL: &str = ":where([dir=\"rtl\"]) & {\n  @mixin-content;\n}";
const WHERE_LTR: &str = ":where([dir=\"ltr\"]) & {\n  @mixin-content;\n}";
const WHERE_NOT_RTL: &str = ":where(:root:not([dir=\"rtl\"])) & {\n  @mixin-content;\n}";
const WHERE_NOT_LTR: &str = ":where(:root:not([dir=\"ltr\"])) & {\n  @mixin-content;\n}";

/// A built-in mixin: either a static template or a breakpoint computed
/// from the at-rule argument.
pub(crate) enum BuiltinMixin {
    Template(&'static str),
    SmallerThan,
    LargerThan,
}

/// Look up a built-in mixin by name.
pub(crate) fn builtin(name: &str) -> Option<BuiltinMixin> {
    use BuiltinMixin::*;

    Some(match name {
        "light" => Template(LIGHT),
        "dark" => Template(DARK),
        "light-root" => Template(LIGHT_ROOT),
        "dark-root" => Template(DARK_ROOT),
        "where-light" => Template(WHERE_LIGHT),
        "where-dark" => Template(WHERE_DARK),
        "where-light-root" => Template(WHERE_LIGHT_ROOT),
        "where-dark-root" => Template(WHERE_DARK_ROOT),
        "hover" => Template(HOVER),
        "where-hover" => Template(WHERE_HOVER),
        "rtl" => Template(RTL),
        "ltr" => Template(LTR),
        "not-rtl" => Template(NOT_RTL),
        "not-ltr" => Template(NOT_LTR),
        "where-rtl" => Template(WHERE_RTL),
        "where-ltr" => Template(WHERE_LTR),
        "where-not-rtl" => Template(WHERE_NOT_RTL),
        "where-not-ltr" => Template(WHERE_NOT_LTR),
        "smaller-than" => SmallerThan,
        "larger-than" => LargerThan,
        _ => return None,
    })
}

impl BuiltinMixin {
    /// Produce the template for this mixin, computing breakpoint media
    /// queries from the at-rule argument.
    pub(crate) fn template(&self, argument: &str, converter: &UnitConverter) -> Result<String> {
        match self {
            BuiltinMixin::Template(template) => Ok((*template).to_string()),
            BuiltinMixin::SmallerThan => {
                // Exclusive upper bound: back off a tenth of a pixel so the
                // breakpoint itself belongs to larger-than
                let breakpoint = converter.px(argument)? - 0.1;
                Ok(format!(
                    "@media (max-width: {}) {{\n  {CONTENT_SLOT}\n}}",
                    converter.em(breakpoint)
                ))
            }
            BuiltinMixin::LargerThan => {
                let breakpoint = converter.px(argument)?;
                Ok(format!(
                    "@media (min-width: {}) {{\n  {CONTENT_SLOT}\n}}",
                    converter.em(breakpoint)
                ))
            }
        }
    }
}

/// Substitute the processed at-rule body into a template.
pub(crate) fn substitute_content(template: &str, content: &str) -> String {
    template.replace(CONTENT_SLOT, content)
}
