//! Rewriting of bound expressions and interpolated text into prop reads.
//!
//! This is a token-level rewrite, not an expression parser: only identifier
//! tokens naming a declared prop are replaced, everything else is copied
//! through untouched.

use indexmap::IndexSet;
use logos::Logos;
use once_cell::sync::Lazy;
use regex::Regex;

/// `{{ expr }}` span inside element content
static INTERPOLATION_REGEXP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*(.*?)\s*\}\}").unwrap());

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum ExprToken {
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    #[regex(r#""([^"\\]|\\.)*""#)]
    #[regex(r"'([^'\\]|\\.)*'")]
    #[regex(r"`[^`]*`")]
    Literal,

    #[regex(r"[0-9][0-9A-Za-z_]*")]
    Number,

    #[token(".")]
    #[token("::")]
    Member,

    #[token("..")]
    #[token("..=")]
    Range,

    #[regex(r"[ \t\r\n]+")]
    Whitespace,
}

/// Call reading the current value of `name` through `receiver`
pub fn prop_accessor(receiver: &str, name: &str) -> String {
    format!("{}.get_prop({})", receiver, string_literal(name))
}

/// Replace every identifier that names a declared prop with a prop read.
///
/// Identifiers inside string literals and identifiers reached through `.`
/// or `::` are left alone, which also makes the rewrite idempotent.
pub fn prop_string(expr: &str, props: &IndexSet<String>, receiver: &str) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut after_member = false;

    let mut lexer = ExprToken::lexer(expr);
    while let Some(token) = lexer.next() {
        let slice = lexer.slice();
        match token {
            Ok(ExprToken::Ident) if !after_member && props.contains(slice) => {
                out.push_str(&prop_accessor(receiver, slice));
            }
            _ => out.push_str(slice),
        }

        match token {
            Ok(ExprToken::Whitespace) => {}
            Ok(ExprToken::Member) => after_member = true,
            _ => after_member = false,
        }
    }

    out.trim().to_string()
}

/// Build an expression producing the element's text.
///
/// Literal segments and `{{ }}` expressions are joined by a single
/// `format!`, so the text is recomputed every time it is evaluated.
pub fn prop_content(content: &str, props: &IndexSet<String>, receiver: &str) -> String {
    let content = content.trim();
    if content.is_empty() {
        return "String::new()".to_string();
    }

    let mut template = String::new();
    let mut args: Vec<String> = Vec::new();
    let mut last = 0;

    for captures in INTERPOLATION_REGEXP.captures_iter(content) {
        let Some(span) = captures.get(0) else {
            continue;
        };
        template.push_str(&escape_format(&content[last..span.start()]));
        template.push_str("{}");

        let expr = captures.get(1).map_or("", |m| m.as_str());
        let expr = prop_string(expr, props, receiver);
        args.push(if expr.is_empty() {
            "\"\"".to_string()
        } else {
            expr
        });
        last = span.end();
    }

    if args.is_empty() {
        return format!("String::from({})", string_literal(content));
    }

    template.push_str(&escape_format(&content[last..]));
    format!("format!({}, {})", string_literal(&template), args.join(", "))
}

/// Rust string literal for `s`
pub fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            _ => out.push(ch),
        }
    }
    out.push('"');
    out
}

fn escape_format(s: &str) -> String {
    s.replace('{', "{{").replace('}', "}}")
}
