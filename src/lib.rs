//! # umbra
//!
//! A build-time CSS preset: small authoring conveniences rewritten into
//! plain CSS before the stylesheet ships.
//!
//! ## Features
//!
//! - `alpha()`, `lighten()`, `darken()` color functions, computed at build
//!   time for literal colors and degraded to `color-mix()` for CSS
//!   variables
//! - `rem()` / `em()` unit helpers with a configurable root font size
//! - `light-dark()` argument rewriting
//! - `@mixin` expansion: light/dark color schemes, hover with pointer
//!   fallback, RTL/LTR, responsive breakpoints
//! - optional automatic px -> rem conversion
//!
//! ## Quick Start
//!
//! ```
//! let css = r#"
//! .demo {
//!   background: alpha(#f00, 0.5);
//!   border: rem(1px) solid lighten(var(--gray-4), 0.1);
//! }
//! "#;
//!
//! let output = umbra::process(css).unwrap();
//! assert!(output.contains("rgba(255, 0, 0, 0.5)"));
//! assert!(output.contains("0.0625rem"));
//! assert!(output.contains("color-mix(in srgb, var(--gray-4) 90%, white 10%)"));
//! ```
//!
//! ## Hosting in a pipeline
//!
//! Stylesheet walking is deliberately thin: if your toolchain already
//! parses CSS, skip [`Preset::process`] and call [`Preset::rewrite_value`]
//! on each declaration value instead. Rewrites are independent per
//! declaration, so values can be processed in any order.
//!
//! ```
//! use umbra::{Options, Preset};
//!
//! let preset = Preset::new(Options::default().with_root_font_size(10.0)).unwrap();
//! assert_eq!(preset.rewrite_value("rem(15px)").unwrap(), "1.5rem");
//! ```

pub mod color;
pub mod convert;
pub mod error;
pub mod preset;

pub(crate) mod mixin;
pub(crate) mod rewrite;
pub(crate) mod transform;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use color::{Rgba, ResolvedColor, alpha, darken, lighten, parse_amount};
pub use convert::{DEFAULT_ROOT_FONT_SIZE, UnitConverter, em, px, rem};
pub use error::{Error, Result};
pub use preset::{Features, Options, Preset, process};
