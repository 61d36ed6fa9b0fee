//! Preset configuration and entry points.
//!
//! A [`Preset`] bundles the individual transforms behind one configuration
//! surface: feature toggles for each function family, the root font size
//! used by unit conversion, the optional px->rem pass, and custom mixin
//! templates.

use std::collections::HashMap;

use crate::convert::UnitConverter;
use crate::error::Result;
use crate::rewrite::{self, RewriteContext};
use crate::transform;

/// Toggles for each transform family. All features default to enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Features {
    /// Recognize `light-dark()` and rewrite its arguments.
    pub light_dark: bool,
    /// Recognize `alpha()`, `lighten()`, and `darken()`.
    pub color_functions: bool,
    /// Recognize `rem()` and `em()`.
    pub rem_em: bool,
    /// Expand `@mixin` at-rules.
    pub mixins: bool,
}

impl Default for Features {
    fn default() -> Self {
        Features {
            light_dark: true,
            color_functions: true,
            rem_em: true,
            mixins: true,
        }
    }
}

/// Preset configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Options {
    /// Root font size in pixels used for px/rem/em conversion.
    pub root_font_size: f64,
    /// Convert every `px` dimension in declaration values to `rem`.
    pub auto_rem: bool,
    /// Per-family feature toggles.
    pub features: Features,
    /// Custom mixin templates (name -> template with an `@mixin-content;`
    /// slot). Custom names take precedence over built-ins.
    pub mixins: HashMap<String, String>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            root_font_size: crate::convert::DEFAULT_ROOT_FONT_SIZE,
            auto_rem: false,
            features: Features::default(),
            mixins: HashMap::new(),
        }
    }
}

impl Options {
    /// Set the root font size in pixels.
    pub fn with_root_font_size(mut self, px: f64) -> Self {
        self.root_font_size = px;
        self
    }

    /// Enable or disable the automatic px->rem pass.
    pub fn with_auto_rem(mut self, enabled: bool) -> Self {
        self.auto_rem = enabled;
        self
    }

    /// Replace the feature toggles.
    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    /// Register a custom mixin template.
    pub fn with_mixin(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.mixins.insert(name.into(), template.into());
        self
    }
}

/// A configured preset, immutable after construction and safe to share
/// across threads. Each declaration is rewritten independently.
#[derive(Debug, Clone)]
pub struct Preset {
    options: Options,
    converter: UnitConverter,
}

impl Preset {
    /// Build a preset, validating the configuration once.
    ///
    /// Fails with [`crate::Error::InvalidConfig`] for a zero or negative
    /// root font size.
    pub fn new(options: Options) -> Result<Self> {
        let converter = UnitConverter::new(options.root_font_size)?;
        Ok(Preset { options, converter })
    }

    /// Transform a whole stylesheet: rewrite declaration values and at-rule
    /// preludes, expand mixins, pass everything else through verbatim.
    pub fn process(&self, css: &str) -> Result<String> {
        transform::process_stylesheet(css, self)
    }

    /// Rewrite a single declaration value.
    ///
    /// This is the hook for host pipelines that walk the stylesheet
    /// themselves and hand over one value at a time.
    pub fn rewrite_value(&self, value: &str) -> Result<String> {
        let result = rewrite::rewrite_value(value, &self.rewrite_context())?;
        if self.options.auto_rem {
            Ok(transform::auto_rem_value(&result, &self.converter))
        } else {
            Ok(result)
        }
    }

    /// The preset's configuration.
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub(crate) fn rewrite_context(&self) -> RewriteContext<'_> {
        RewriteContext {
            converter: &self.converter,
            features: &self.options.features,
        }
    }

    pub(crate) fn converter(&self) -> &UnitConverter {
        &self.converter
    }

    pub(crate) fn features(&self) -> &Features {
        &self.options.features
    }

    pub(crate) fn auto_rem(&self) -> bool {
        self.options.auto_rem
    }

    pub(crate) fn custom_mixin(&self, name: &str) -> Option<&str> {
        self.options.mixins.get(name).map(String::as_str)
    }
}

/// Transform a stylesheet with default options.
pub fn process(css: &str) -> Result<String> {
    Preset::new(Options::default())?.process(css)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_default_features_all_enabled() {
        let features = Features::default();
        assert!(features.light_dark);
        assert!(features.color_functions);
        assert!(features.rem_em);
        assert!(features.mixins);
    }

    #[test]
    fn test_invalid_root_font_size_rejected_at_construction() {
        let options = Options::default().with_root_font_size(0.0);
        assert!(matches!(Preset::new(options), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_rewrite_value_hook() {
        let preset = Preset::new(Options::default()).unwrap();
        assert_eq!(
            preset.rewrite_value("alpha(#f00, 0.5)").unwrap(),
            "rgba(255, 0, 0, 0.5)"
        );
    }

    #[test]
    fn test_rewrite_value_applies_auto_rem() {
        let preset = Preset::new(Options::default().with_auto_rem(true)).unwrap();
        assert_eq!(
            preset.rewrite_value("1px solid alpha(#000, 0.1)").unwrap(),
            "0.0625rem solid rgba(0, 0, 0, 0.1)"
        );
    }

    #[test]
    fn test_custom_root_font_size() {
        let preset = Preset::new(Options::default().with_root_font_size(10.0)).unwrap();
        assert_eq!(preset.rewrite_value("rem(15px)").unwrap(), "1.5rem");
    }

    #[test]
    fn test_process_convenience() {
        let css = ".a { color: alpha(#f00, 50%); }";
        assert_eq!(
            process(css).unwrap(),
            ".a { color: rgba(255, 0, 0, 0.5); }"
        );
    }
}
