//! Error types for the Spark template parser

use crate::ast::Span;
use thiserror::Error;

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, ParseError>;

/// Tokenizer failure with the location of the offending markup
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Unterminated tag at {}..{}: expected '>' before end of input", .span.start, .span.end)]
    UnterminatedTag { span: Span },

    #[error("Unterminated comment at {}..{}: expected '-->' before end of input", .span.start, .span.end)]
    UnterminatedComment { span: Span },

    #[error("Invalid attribute syntax at {}..{}: unexpected {found:?}", .span.start, .span.end)]
    InvalidAttribute { span: Span, found: String },

    #[error("Invalid tag name at {}..{}: {message}", .span.start, .span.end)]
    InvalidTagName { span: Span, message: String },
}

impl ParseError {
    pub fn unterminated_tag(start: usize, end: usize) -> Self {
        Self::UnterminatedTag {
            span: Span::new(start, end),
        }
    }

    pub fn unterminated_comment(start: usize, end: usize) -> Self {
        Self::UnterminatedComment {
            span: Span::new(start, end),
        }
    }

    pub fn invalid_attribute(start: usize, end: usize, found: impl Into<String>) -> Self {
        Self::InvalidAttribute {
            span: Span::new(start, end),
            found: found.into(),
        }
    }

    pub fn invalid_tag_name(start: usize, end: usize, message: impl Into<String>) -> Self {
        Self::InvalidTagName {
            span: Span::new(start, end),
            message: message.into(),
        }
    }

    pub fn span(&self) -> Span {
        match self {
            ParseError::UnterminatedTag { span }
            | ParseError::UnterminatedComment { span }
            | ParseError::InvalidAttribute { span, .. }
            | ParseError::InvalidTagName { span, .. } => *span,
        }
    }

    fn label(&self) -> String {
        match self {
            ParseError::UnterminatedTag { .. } => "tag is never closed".to_string(),
            ParseError::UnterminatedComment { .. } => "comment is never closed".to_string(),
            ParseError::InvalidAttribute { found, .. } => format!("unexpected {:?}", found),
            ParseError::InvalidTagName { message, .. } => message.clone(),
        }
    }
}

/// Pretty-print a parse error with source context
#[cfg(feature = "pretty-errors")]
pub mod pretty {
    use super::ParseError;
    use ariadne::{Color, Label, Report, ReportKind, Source};

    pub fn format_error(error: &ParseError, filename: &str, source: &str) -> String {
        let span = error.span();
        let start = span.start.min(source.len());
        let end = span.end.clamp(start, source.len());

        let mut output = Vec::new();
        let report = Report::build(ReportKind::Error, filename, start)
            .with_message(error.to_string())
            .with_label(
                Label::new((filename, start..end))
                    .with_color(Color::Red)
                    .with_message(error.label()),
            )
            .finish();

        if report
            .write((filename, Source::from(source)), &mut output)
            .is_err()
        {
            return error.to_string();
        }

        String::from_utf8(output).unwrap_or_else(|_| error.to_string())
    }
}
