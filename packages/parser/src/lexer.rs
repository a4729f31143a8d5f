//! Markup tokenizer for Spark templates
//!
//! Content is scanned by hand (text, tags, comments); the inside of a start
//! tag is handed to a logos lexer that splits it into attribute names,
//! `=` and values.

use crate::ast::Span;
use crate::error::{ParseError, ParseResult};
use logos::Logos;

/// Elements whose content is never tokenized as markup
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Token types inside a start tag
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum AttrToken<'src> {
    #[regex(r#"[^ \t\r\n\f"'=<>/]+"#, |lex| lex.slice())]
    Name(&'src str),

    #[regex(r#""[^"]*""#, |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    #[regex(r"'[^']*'", |lex| {
        let s = lex.slice();
        &s[1..s.len() - 1]
    })]
    Quoted(&'src str),

    #[token("=")]
    Eq,

    #[token("/")]
    Slash,
}

/// Attribute as written in the markup, before prefix handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAttribute {
    /// ASCII lower-cased name, prefixes included
    pub key: String,
    /// Entity-decoded value, empty when the attribute has none
    pub value: String,
    pub span: Span,
}

/// Start or self-closing tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub attributes: Vec<RawAttribute>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupToken {
    StartTag(Tag),
    SelfClosingTag(Tag),
    EndTag { name: String, span: Span },
    Text { text: String, span: Span },
    Comment { span: Span },
    Doctype { span: Span },
}

/// Forward-only scanner over template markup.
///
/// Yields `Err` at most once; iteration ends after an error.
pub struct Tokenizer<'src> {
    source: &'src str,
    pos: usize,
    raw_text: Option<String>,
    failed: bool,
}

impl<'src> Tokenizer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            raw_text: None,
            failed: false,
        }
    }

    /// Start scanning at byte `offset`; spans stay relative to the full source
    pub fn starting_at(mut self, offset: usize) -> Self {
        self.pos = offset.min(self.source.len());
        self
    }

    fn rest(&self) -> &'src str {
        &self.source[self.pos..]
    }

    fn next_token(&mut self) -> Option<ParseResult<MarkupToken>> {
        if let Some(tag) = self.raw_text.take() {
            if let Some(token) = self.lex_raw_text(&tag) {
                return Some(Ok(token));
            }
        }

        if self.pos >= self.source.len() {
            return None;
        }

        let rest = self.rest();
        let token = if rest.starts_with("<!--") {
            self.lex_comment()
        } else if rest.starts_with("</") {
            self.lex_end_tag()
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            self.lex_doctype()
        } else if starts_tag(rest) {
            self.lex_start_tag()
        } else {
            Ok(self.lex_text())
        };

        Some(token)
    }

    fn lex_text(&mut self) -> MarkupToken {
        let start = self.pos;
        // The first byte may be a stray '<' that does not open a tag
        let mut end = self.source.len();
        let mut search_from = start + self.rest().chars().next().map_or(1, char::len_utf8);
        while let Some(offset) = self.source[search_from..].find('<') {
            let candidate = search_from + offset;
            if opens_markup(&self.source[candidate..]) {
                end = candidate;
                break;
            }
            search_from = candidate + 1;
        }

        self.pos = end;
        MarkupToken::Text {
            text: decode_entities(&self.source[start..end]),
            span: Span::new(start, end),
        }
    }

    fn lex_raw_text(&mut self, tag: &str) -> Option<MarkupToken> {
        let start = self.pos;
        let closing = format!("</{}", tag);
        let end = self.source[start..]
            .to_ascii_lowercase()
            .find(&closing)
            .map(|offset| start + offset)
            .unwrap_or(self.source.len());

        if end == start {
            return None;
        }

        self.pos = end;
        Some(MarkupToken::Text {
            text: self.source[start..end].to_string(),
            span: Span::new(start, end),
        })
    }

    fn lex_comment(&mut self) -> ParseResult<MarkupToken> {
        let start = self.pos;
        let body = start + "<!--".len();
        match self.source[body..].find("-->") {
            Some(offset) => {
                self.pos = body + offset + "-->".len();
                Ok(MarkupToken::Comment {
                    span: Span::new(start, self.pos),
                })
            }
            None => Err(ParseError::unterminated_comment(start, self.source.len())),
        }
    }

    fn lex_doctype(&mut self) -> ParseResult<MarkupToken> {
        let start = self.pos;
        match self.source[start..].find('>') {
            Some(offset) => {
                self.pos = start + offset + 1;
                Ok(MarkupToken::Doctype {
                    span: Span::new(start, self.pos),
                })
            }
            None => Err(ParseError::unterminated_tag(start, self.source.len())),
        }
    }

    fn lex_end_tag(&mut self) -> ParseResult<MarkupToken> {
        let start = self.pos;
        let Some(offset) = self.source[start..].find('>') else {
            return Err(ParseError::unterminated_tag(start, self.source.len()));
        };
        let end = start + offset + 1;
        let name = self.source[start + "</".len()..end - 1]
            .split(|c: char| c.is_whitespace())
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        self.pos = end;
        Ok(MarkupToken::EndTag {
            name,
            span: Span::new(start, end),
        })
    }

    fn lex_start_tag(&mut self) -> ParseResult<MarkupToken> {
        let start = self.pos;
        let name_start = start + 1;
        let name_end = self.source[name_start..]
            .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
            .map(|offset| name_start + offset)
            .unwrap_or(self.source.len());

        let name = &self.source[name_start..name_end];
        if let Some(bad) = name.chars().find(|c| matches!(c, '"' | '\'' | '<' | '=')) {
            return Err(ParseError::invalid_tag_name(
                name_start,
                name_end,
                format!("tag name cannot contain {:?}", bad),
            ));
        }

        let Some(close) = find_tag_end(self.source, name_end) else {
            return Err(ParseError::unterminated_tag(start, self.source.len()));
        };

        let mut inner = &self.source[name_end..close];
        let trimmed = inner.trim_end();
        let self_closing = trimmed.ends_with('/');
        if self_closing {
            inner = &trimmed[..trimmed.len() - 1];
        }

        let tag = Tag {
            name: name.to_ascii_lowercase(),
            attributes: lex_attributes(inner, name_end)?,
            span: Span::new(start, close + 1),
        };
        self.pos = close + 1;

        if self_closing {
            return Ok(MarkupToken::SelfClosingTag(tag));
        }

        if RAW_TEXT_ELEMENTS.contains(&tag.name.as_str()) {
            self.raw_text = Some(tag.name.clone());
        }
        Ok(MarkupToken::StartTag(tag))
    }
}

impl<'src> Iterator for Tokenizer<'src> {
    type Item = ParseResult<MarkupToken>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let token = self.next_token();
        if matches!(token, Some(Err(_))) {
            self.failed = true;
        }
        token
    }
}

/// Tokenize a whole template
pub fn tokenize(source: &str) -> ParseResult<Vec<MarkupToken>> {
    Tokenizer::new(source).collect()
}

fn starts_tag(rest: &str) -> bool {
    rest.strip_prefix('<')
        .and_then(|r| r.chars().next())
        .is_some_and(|c| c.is_ascii_alphabetic())
}

fn opens_markup(rest: &str) -> bool {
    starts_tag(rest) || rest.starts_with("</") || rest.starts_with("<!") || rest.starts_with("<?")
}

/// Position of the `>` closing a start tag, skipping quoted attribute values
fn find_tag_end(source: &str, from: usize) -> Option<usize> {
    let mut quote: Option<u8> = None;
    for (offset, byte) in source.as_bytes()[from..].iter().enumerate() {
        match (quote, byte) {
            (Some(q), b) if *b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"') | (None, b'\'') => quote = Some(*byte),
            (None, b'>') => return Some(from + offset),
            (None, _) => {}
        }
    }
    None
}

fn lex_attributes(inner: &str, offset: usize) -> ParseResult<Vec<RawAttribute>> {
    let mut attributes = Vec::new();
    let mut pending: Option<RawAttribute> = None;
    let mut expect_value = false;

    let mut lexer = AttrToken::lexer(inner);
    while let Some(result) = lexer.next() {
        let span = lexer.span();
        let span = Span::new(offset + span.start, offset + span.end);

        match result {
            Ok(AttrToken::Name(value)) | Ok(AttrToken::Quoted(value)) if expect_value => {
                if let Some(mut attribute) = pending.take() {
                    attribute.value = decode_entities(value);
                    attribute.span.end = span.end;
                    attributes.push(attribute);
                }
                expect_value = false;
            }
            Ok(AttrToken::Name(name)) => {
                if let Some(attribute) = pending.take() {
                    attributes.push(attribute);
                }
                pending = Some(RawAttribute {
                    key: name.to_ascii_lowercase(),
                    value: String::new(),
                    span,
                });
            }
            Ok(AttrToken::Eq) if pending.is_some() && !expect_value => expect_value = true,
            Ok(AttrToken::Slash) => {}
            _ => {
                return Err(ParseError::invalid_attribute(
                    span.start,
                    span.end,
                    lexer.slice(),
                ))
            }
        }
    }

    if let Some(attribute) = pending {
        attributes.push(attribute);
    }
    Ok(attributes)
}

/// Decode character references in text and attribute values.
///
/// Unknown or malformed references are left untouched.
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match decode_entity(tail) {
            Some((ch, len)) => {
                out.push(ch);
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(tail: &str) -> Option<(char, usize)> {
    let (semi, _) = tail.char_indices().take(12).find(|(_, c)| *c == ';')?;
    let name = &tail[1..semi];
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let number = name.strip_prefix('#')?;
            let code = match number.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)?
        }
    };
    Some((ch, semi + 1))
}
