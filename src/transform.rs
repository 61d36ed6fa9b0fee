//! Whole-stylesheet transformation.
//!
//! Walks the cssparser token stream, copying source text through verbatim
//! by position slicing, except for the three places the preset acts on:
//! declaration values and at-rule preludes are run through the value
//! rewriter (so `em()`/`rem()` work inside `@media` parameters), and
//! `@mixin` at-rules are expanded. No selector matching, no AST, no source
//! maps — untouched input comes out byte-identical.

use cssparser::{ParseError, ParseErrorKind, Parser, ParserInput, SourcePosition, Token};

use crate::convert::UnitConverter;
use crate::error::{Error, Result};
use crate::mixin;
use crate::preset::Preset;
use crate::rewrite::rewrite_value;

type WalkError<'i> = ParseError<'i, Error>;

/// Transform a stylesheet (or a rule-body fragment; the grammar is the
/// same to this walker).
pub(crate) fn process_stylesheet(css: &str, preset: &Preset) -> Result<String> {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut out = String::with_capacity(css.len());
    walk(&mut parser, &mut out, preset)?;
    Ok(out)
}

fn walk<'i>(parser: &mut Parser<'i, '_>, out: &mut String, preset: &Preset) -> Result<()> {
    loop {
        let start = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };

        match token {
            Token::AtKeyword(name) => at_rule(&name, start, parser, out, preset)?,
            Token::Ident(_) => prelude_or_declaration(start, parser, out, preset)?,
            Token::CurlyBracketBlock => {
                out.push('{');
                walk_nested(parser, out, preset)?;
            }
            // Block-opening tokens would be silently skipped by the next
            // call to next(), so consume and copy them whole
            Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock => {
                drain_block(parser);
                out.push_str(parser.slice_from(start));
            }
            _ => out.push_str(parser.slice_from(start)),
        }
    }
    Ok(())
}

/// Recurse into a `{}` block, threading the crate error back out of
/// cssparser's error type. The closing brace is emitted from its source
/// span, so a block left unterminated in the input stays unterminated in
/// the output.
fn walk_nested<'i>(parser: &mut Parser<'i, '_>, out: &mut String, preset: &Preset) -> Result<()> {
    let mut inner_end = parser.position();
    let result = parser.parse_nested_block(|p| {
        walk(p, out, preset).map_err(|e| p.new_custom_error(e))?;
        inner_end = p.position();
        Ok(())
    });
    match result {
        Ok(()) => {
            out.push_str(parser.slice(inner_end..parser.position()));
            Ok(())
        }
        Err(ParseError {
            kind: ParseErrorKind::Custom(error),
            ..
        }) => Err(error),
        Err(_) => unreachable!("nested walk only fails with custom errors"),
    }
}

/// Consume the contents of an already-returned block-opening token so the
/// enclosing span can be sliced verbatim.
fn drain_block(parser: &mut Parser<'_, '_>) {
    let _ = parser.parse_nested_block(|p| {
        while p.next_including_whitespace_and_comments().is_ok() {}
        Ok::<_, WalkError>(())
    });
}

/// An `Ident` was just consumed. Decide whether this is a declaration
/// (`prop: value`) or a selector prelude (`div p`, `a:hover`), and emit
/// accordingly.
fn prelude_or_declaration<'i>(
    ident_start: SourcePosition,
    parser: &mut Parser<'i, '_>,
    out: &mut String,
    preset: &Preset,
) -> Result<()> {
    loop {
        let before = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => {
                out.push_str(parser.slice_from(ident_start));
                return Ok(());
            }
        };
        match token {
            Token::WhiteSpace(_) | Token::Comment(_) => continue,
            Token::Colon => return declaration(ident_start, parser, out, preset),
            Token::CurlyBracketBlock => {
                out.push_str(parser.slice(ident_start..before));
                out.push('{');
                walk_nested(parser, out, preset)?;
                return Ok(());
            }
            Token::Semicolon => {
                out.push_str(parser.slice_from(ident_start));
                return Ok(());
            }
            other => {
                // Selector prelude: copy tokens until its block opens
                if is_block_open(&other) {
                    drain_block(parser);
                }
                return selector_prelude(ident_start, parser, out, preset);
            }
        }
    }
}

/// Copy a selector prelude through until its `{` block, then recurse.
fn selector_prelude<'i>(
    prelude_start: SourcePosition,
    parser: &mut Parser<'i, '_>,
    out: &mut String,
    preset: &Preset,
) -> Result<()> {
    loop {
        let before = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => {
                out.push_str(parser.slice_from(prelude_start));
                return Ok(());
            }
        };
        match token {
            Token::CurlyBracketBlock => {
                out.push_str(parser.slice(prelude_start..before));
                out.push('{');
                walk_nested(parser, out, preset)?;
                return Ok(());
            }
            Token::Semicolon => {
                out.push_str(parser.slice_from(prelude_start));
                return Ok(());
            }
            other => {
                if is_block_open(&other) {
                    drain_block(parser);
                }
            }
        }
    }
}

/// A declaration's `prop:` has been consumed; rewrite the value text and
/// emit. Falls back to the selector path if a `{` shows up first
/// (`a:hover span { ... }`).
fn declaration<'i>(
    decl_start: SourcePosition,
    parser: &mut Parser<'i, '_>,
    out: &mut String,
    preset: &Preset,
) -> Result<()> {
    let value_start = parser.position();
    loop {
        let before = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => {
                out.push_str(parser.slice(decl_start..value_start));
                let value = parser.slice_from(value_start);
                out.push_str(&rewritten_value(value, preset)?);
                return Ok(());
            }
        };
        match token {
            Token::Semicolon => {
                out.push_str(parser.slice(decl_start..value_start));
                out.push_str(&rewritten_value(parser.slice(value_start..before), preset)?);
                out.push(';');
                return Ok(());
            }
            Token::CurlyBracketBlock => {
                out.push_str(parser.slice(decl_start..before));
                out.push('{');
                walk_nested(parser, out, preset)?;
                return Ok(());
            }
            other => {
                if is_block_open(&other) {
                    drain_block(parser);
                }
            }
        }
    }
}

fn is_block_open(token: &Token<'_>) -> bool {
    matches!(
        token,
        Token::Function(_) | Token::ParenthesisBlock | Token::SquareBracketBlock
    )
}

/// Rewrite a declaration value: recognized functions first, then the
/// optional px->rem pass.
fn rewritten_value(value: &str, preset: &Preset) -> Result<String> {
    let result = rewrite_value(value, &preset.rewrite_context())?;
    if preset.auto_rem() {
        Ok(auto_rem_value(&result, preset.converter()))
    } else {
        Ok(result)
    }
}

fn at_rule<'i>(
    name: &str,
    at_start: SourcePosition,
    parser: &mut Parser<'i, '_>,
    out: &mut String,
    preset: &Preset,
) -> Result<()> {
    if name.eq_ignore_ascii_case("mixin") && preset.features().mixins {
        return expand_mixin(at_start, parser, out, preset);
    }

    // Generic at-rule: run the prelude through the rewriter so em()/rem()
    // work in @media parameters, then recurse into the block if present
    let prelude_start = parser.position();
    loop {
        let before = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => {
                out.push_str(parser.slice(at_start..prelude_start));
                let prelude = parser.slice_from(prelude_start);
                out.push_str(&rewrite_value(prelude, &preset.rewrite_context())?);
                return Ok(());
            }
        };
        match token {
            Token::Semicolon => {
                out.push_str(parser.slice(at_start..prelude_start));
                let prelude = parser.slice(prelude_start..before);
                out.push_str(&rewrite_value(prelude, &preset.rewrite_context())?);
                out.push(';');
                return Ok(());
            }
            Token::CurlyBracketBlock => {
                out.push_str(parser.slice(at_start..prelude_start));
                let prelude = parser.slice(prelude_start..before);
                out.push_str(&rewrite_value(prelude, &preset.rewrite_context())?);
                out.push('{');
                walk_nested(parser, out, preset)?;
                return Ok(());
            }
            other => {
                if is_block_open(&other) {
                    drain_block(parser);
                }
            }
        }
    }
}

/// Expand a `@mixin` at-rule. Unknown mixin names leave the at-rule in
/// place unchanged.
fn expand_mixin<'i>(
    at_start: SourcePosition,
    parser: &mut Parser<'i, '_>,
    out: &mut String,
    preset: &Preset,
) -> Result<()> {
    let prelude_start = parser.position();
    let mut has_block = false;
    let prelude_end;
    loop {
        let before = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => {
                prelude_end = parser.position();
                break;
            }
        };
        match token {
            Token::Semicolon => {
                prelude_end = before;
                break;
            }
            Token::CurlyBracketBlock => {
                prelude_end = before;
                has_block = true;
                break;
            }
            other => {
                if is_block_open(&other) {
                    drain_block(parser);
                }
            }
        }
    }

    let prelude = parser.slice(prelude_start..prelude_end).trim();
    let (mixin_name, argument) = match prelude.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (prelude, ""),
    };

    let mut content = String::new();
    if has_block {
        let _ = parser.parse_nested_block(|p| {
            let body_start = p.position();
            while p.next_including_whitespace_and_comments().is_ok() {}
            content = p.slice_from(body_start).to_string();
            Ok::<_, WalkError>(())
        });
    }

    let template = if let Some(custom) = preset.custom_mixin(mixin_name) {
        custom.to_string()
    } else if let Some(builtin) = mixin::builtin(mixin_name) {
        builtin.template(argument, preset.converter())?
    } else {
        out.push_str(parser.slice_from(at_start));
        return Ok(());
    };

    let expansion = mixin::substitute_content(&template, content.trim());
    out.push_str(&process_stylesheet(&expansion, preset)?);
    Ok(())
}

/// Replace every `px` dimension in a value with its rem equivalent.
///
/// Works from the token's source text, not the tokenizer's f32 value, so
/// fractional pixel sizes convert without float noise. `url()` interiors
/// are never touched.
pub(crate) fn auto_rem_value(value: &str, converter: &UnitConverter) -> String {
    let mut input = ParserInput::new(value);
    let mut parser = Parser::new(&mut input);
    let mut out = String::with_capacity(value.len());
    auto_rem_tokens(&mut parser, &mut out, converter);
    out
}

fn auto_rem_tokens(parser: &mut Parser<'_, '_>, out: &mut String, converter: &UnitConverter) {
    loop {
        let start = parser.position();
        let token = match parser.next_including_whitespace_and_comments() {
            Ok(token) => token.clone(),
            Err(_) => break,
        };
        match token {
            Token::Dimension { ref unit, .. } if unit.eq_ignore_ascii_case("px") => {
                let text = parser.slice_from(start);
                match converter.px(text) {
                    Ok(magnitude) => out.push_str(&converter.rem(magnitude)),
                    Err(_) => out.push_str(text),
                }
            }
            Token::Function(ref name) if name.eq_ignore_ascii_case("url") => {
                drain_block(parser);
                out.push_str(parser.slice_from(start));
            }
            Token::Function(_)
            | Token::ParenthesisBlock
            | Token::SquareBracketBlock
            | Token::CurlyBracketBlock => {
                // Opening delimiter text, e.g. "calc(" or "["
                out.push_str(parser.slice_from(start));
                auto_rem_nested(parser, out, converter);
            }
            _ => out.push_str(parser.slice_from(start)),
        }
    }
}

/// Recurse into a nested block, emitting the closing delimiter from its
/// source span.
fn auto_rem_nested(parser: &mut Parser<'_, '_>, out: &mut String, converter: &UnitConverter) {
    let mut inner_end = parser.position();
    let _ = parser.parse_nested_block(|p| {
        auto_rem_tokens(p, out, converter);
        inner_end = p.position();
        Ok::<_, WalkError>(())
    });
    out.push_str(parser.slice(inner_end..parser.position()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preset::{Options, Preset};

    fn process(css: &str) -> String {
        Preset::new(Options::default()).unwrap().process(css).unwrap()
    }

    #[test]
    fn test_untouched_css_is_byte_identical() {
        let css = r#"
.demo {
  color: red;
  background: url("a(b.png");
}

@media (min-width: 700px) {
  .demo > .other { margin: 0 auto; }
}
"#;
        assert_eq!(process(css), css);
    }

    #[test]
    fn test_rewrites_declaration_values() {
        let css = ".demo {\n  background: alpha(#f00, 0.5);\n  border: rem(1px) solid #000;\n}\n";
        let expected =
            ".demo {\n  background: rgba(255, 0, 0, 0.5);\n  border: 0.0625rem solid #000;\n}\n";
        assert_eq!(process(css), expected);
    }

    #[test]
    fn test_rewrites_media_query_preludes() {
        let css = "@media (min-width: em(750px)) {\n  .demo { color: red; }\n}\n";
        let expected = "@media (min-width: 46.875em) {\n  .demo { color: red; }\n}\n";
        assert_eq!(process(css), expected);
    }

    #[test]
    fn test_selectors_with_colons_are_not_declarations() {
        let css = "a:hover {\n  color: alpha(#f00, 0.5);\n}\n";
        let expected = "a:hover {\n  color: rgba(255, 0, 0, 0.5);\n}\n";
        assert_eq!(process(css), expected);
    }

    #[test]
    fn test_nested_rules() {
        let css = ".a {\n  color: red;\n  &:hover {\n    color: alpha(#00f, 0.1);\n  }\n}\n";
        let expected = ".a {\n  color: red;\n  &:hover {\n    color: rgba(0, 0, 255, 0.1);\n  }\n}\n";
        assert_eq!(process(css), expected);
    }

    #[test]
    fn test_custom_property_values_are_rewritten() {
        let css = ":root {\n  --overlay: alpha(#000, 0.6);\n}\n";
        let expected = ":root {\n  --overlay: rgba(0, 0, 0, 0.6);\n}\n";
        assert_eq!(process(css), expected);
    }

    #[test]
    fn test_declaration_without_trailing_semicolon() {
        assert_eq!(
            process(".a { color: alpha(#f00, 0.5) }"),
            ".a { color: rgba(255, 0, 0, 0.5) }"
        );
    }

    #[test]
    fn test_auto_rem_value() {
        let converter = UnitConverter::default();
        assert_eq!(auto_rem_value("16px", &converter), "1rem");
        assert_eq!(
            auto_rem_value("1px solid #000", &converter),
            "0.0625rem solid #000"
        );
        assert_eq!(
            auto_rem_value("calc(100% - 16px)", &converter),
            "calc(100% - 1rem)"
        );
    }

    #[test]
    fn test_auto_rem_skips_urls() {
        let converter = UnitConverter::default();
        assert_eq!(
            auto_rem_value("url(\"16px.png\") 16px", &converter),
            "url(\"16px.png\") 1rem"
        );
    }

    #[test]
    fn test_auto_rem_leaves_other_units() {
        let converter = UnitConverter::default();
        assert_eq!(auto_rem_value("50% 2em 3pt", &converter), "50% 2em 3pt");
    }
}
