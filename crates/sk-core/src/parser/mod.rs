//! Parsers: dialect text → entities.
//!
//! Built on `winnow` 0.7. Each parser follows the exact grammar its sibling
//! emitter writes: unknown elements, selectors and types are skipped, while
//! any syntax error fails the whole document so a half-typed edit never
//! yields a partial scene.

pub mod component;
pub(crate) mod declarations;
pub mod markup;
pub mod stylesheet;

pub use component::parse_component;
pub use markup::parse_markup;
pub use stylesheet::parse_stylesheet;

use crate::dialect::Dialect;
use crate::error::{ParseError, ParseResult};
use std::str::FromStr;
use winnow::ascii::multispace0;
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

// ─── Low-level parsers ──────────────────────────────────────────────────

/// Consume optional whitespace, newlines included.
pub(crate) fn skip_ws(input: &mut &str) {
    let _: Result<&str, ErrMode<ContextError>> = multispace0.parse_next(input);
}

/// Tag, attribute and property names: letters, digits, `-`, `_`, `:`.
pub(crate) fn parse_name<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| {
        c.is_alphanumeric() || c == '-' || c == '_' || c == ':'
    })
    .parse_next(input)
}

pub(crate) fn backtrack<T>() -> ModalResult<T> {
    Err(ErrMode::Backtrack(ContextError::new()))
}

/// Skip a block comment opened by `open` and closed by `close`. Returns
/// `false` when the comment never ends.
pub(crate) fn skip_block_comment(input: &mut &str, open: &str, close: &str) -> bool {
    let Some(body) = input.strip_prefix(open) else {
        return true;
    };
    match body.find(close) {
        Some(end) => {
            *input = &body[end + close.len()..];
            true
        }
        None => false,
    }
}

// ─── Errors ──────────────────────────────────────────────────────────────

/// A syntax error pointing at where parsing stopped.
pub(crate) fn syntax_at(dialect: Dialect, source: &str, rest: &str) -> ParseError {
    let offset = source.len() - rest.len();
    let line = source[..offset].matches('\n').count() + 1;
    let near: String = rest.chars().take(24).collect();
    if rest.is_empty() {
        ParseError::syntax(dialect, format!("unexpected end of input on line {line}"))
    } else {
        ParseError::syntax(dialect, format!("unexpected input on line {line} near `{near}`"))
    }
}

/// Read a typed field value, reporting which field was malformed.
pub(crate) fn parse_field<T: FromStr>(dialect: Dialect, field: &str, value: &str) -> ParseResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ParseError::invalid(dialect, field, value))
}

/// A pixel length: `10px`, `10` or `0`.
pub(crate) fn parse_length(dialect: Dialect, field: &str, value: &str) -> ParseResult<i32> {
    let v = value.trim();
    parse_field(dialect, field, v.strip_suffix("px").unwrap_or(v))
}

// ─── Text decoding ──────────────────────────────────────────────────────

/// Decode XML character and entity references. `None` on an unknown or
/// unterminated reference.
pub(crate) fn xml_unescape(raw: &str) -> Option<String> {
    if !raw.contains('&') {
        return Some(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after.find(';')?;
        let entity = &after[..semi];
        let c = match entity {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            _ => {
                let code = if let Some(hex) = entity.strip_prefix("#x") {
                    u32::from_str_radix(hex, 16).ok()?
                } else {
                    entity.strip_prefix('#')?.parse().ok()?
                };
                char::from_u32(code)?
            }
        };
        out.push(c);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Some(out)
}

/// Unquote a CSS string literal. Unquoted input is returned trimmed.
pub(crate) fn css_unquote(raw: &str) -> String {
    let raw = raw.trim();
    let quote = match raw.chars().next() {
        Some(q @ ('"' | '\'')) if raw.len() >= 2 && raw.ends_with(q) => q,
        _ => return raw.to_string(),
    };
    let inner = &raw[quote.len_utf8()..raw.len() - quote.len_utf8()];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let mut hex = String::new();
        while hex.len() < 6 && chars.peek().is_some_and(|h| h.is_ascii_hexdigit()) {
            hex.extend(chars.next());
        }
        if hex.is_empty() {
            match chars.next() {
                // Escaped newline is a line continuation.
                Some('\n') | None => {}
                Some(other) => out.push(other),
            }
            continue;
        }
        if chars.peek().is_some_and(|w| w.is_whitespace()) {
            chars.next();
        }
        let decoded = u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .unwrap_or(char::REPLACEMENT_CHARACTER);
        out.push(decoded);
    }
    out
}

/// Split on `sep` where it is not nested in parentheses or quotes.
pub(crate) fn split_top_level(s: &str, sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 && sep(c) => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts.into_iter().filter(|p| !p.trim().is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xml_entities() {
        assert_eq!(xml_unescape("a &lt;b&gt; &amp; &#10;&#x41;").as_deref(), Some("a <b> & \nA"));
        assert_eq!(xml_unescape("broken &nope; entity"), None);
        assert_eq!(xml_unescape("dangling &amp"), None);
    }

    #[test]
    fn css_strings() {
        assert_eq!(css_unquote(r#""say \"hi\"\a bye""#), "say \"hi\"\nbye");
        assert_eq!(css_unquote("'single'"), "single");
        assert_eq!(css_unquote("  bare "), "bare");
        assert_eq!(css_unquote(r#""back\\slash""#), "back\\slash");
    }

    #[test]
    fn top_level_split_respects_nesting() {
        let parts = split_top_level("1px 2px 3px rgba(0, 0, 0, 0.3), 0px 0px 4px red", |c| c == ',');
        assert_eq!(parts, vec!["1px 2px 3px rgba(0, 0, 0, 0.3)", " 0px 0px 4px red"]);
        let words = split_top_level("inset  1px rgba(1, 2, 3)", char::is_whitespace);
        assert_eq!(words, vec!["inset", "1px", "rgba(1, 2, 3)"]);
    }

    #[test]
    fn lengths() {
        assert_eq!(parse_length(Dialect::Stylesheet, "left", "10px"), Ok(10));
        assert_eq!(parse_length(Dialect::Stylesheet, "left", " -4 "), Ok(-4));
        assert!(parse_length(Dialect::Stylesheet, "left", "ten").is_err());
    }
}
