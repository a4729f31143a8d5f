use crate::ast::{Attribute, Component, Element};
use crate::error::ParseResult;
use crate::lexer::{MarkupToken, RawAttribute, Tag, Tokenizer};
use crate::naming::camel_case;
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

/// First-line marker introducing the prop declaration list
pub const PROPS_DIRECTIVE: &str = "!!";

/// Attribute name prefix: value is a host expression
pub const EXPRESSION_PREFIX: char = ':';
/// Attribute name prefix: value is executed by the runtime
pub const EVENT_HANDLER_PREFIX: char = '@';
/// Attribute name prefix: value is a default
pub const DEFAULT_VALUE_PREFIX: char = '!';

/// Builds a [`Component`] from one template file
pub struct Parser<'src> {
    source: &'src str,
    path: String,
    props: IndexSet<String>,
    markup_start: usize,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, path: impl Into<String>) -> Self {
        let (props, markup_start) = parse_props_directive(source);
        Self {
            source,
            path: path.into(),
            props,
            markup_start,
        }
    }

    /// Tokenize the markup and assemble the element forest.
    ///
    /// End tags are not matched against the open element's name: any end tag
    /// closes the innermost open element. Elements still open at the end of
    /// input are closed implicitly.
    pub fn parse(self) -> ParseResult<Component> {
        let mut roots: Vec<Element> = Vec::new();
        let mut stack: Vec<Element> = Vec::new();

        for token in Tokenizer::new(self.source).starting_at(self.markup_start) {
            match token? {
                MarkupToken::StartTag(tag) => {
                    stack.push(build_element(tag, false));
                }
                MarkupToken::SelfClosingTag(tag) => {
                    attach(&mut stack, &mut roots, build_element(tag, true));
                }
                MarkupToken::EndTag { span, .. } => {
                    if let Some(mut element) = stack.pop() {
                        element.span.end = span.end;
                        attach(&mut stack, &mut roots, element);
                    }
                }
                MarkupToken::Text { text, .. } => {
                    if let Some(current) = stack.last_mut() {
                        current.content.push_str(&text);
                    }
                }
                MarkupToken::Comment { .. } | MarkupToken::Doctype { .. } => {}
            }
        }

        while let Some(element) = stack.pop() {
            attach(&mut stack, &mut roots, element);
        }

        debug!(
            path = %self.path,
            roots = roots.len(),
            props = self.props.len(),
            "parsed template"
        );

        Ok(Component {
            source_file: self.path,
            elements: roots,
            props: self.props,
        })
    }
}

/// Parse one template file
pub fn parse(source: &str, path: &str) -> ParseResult<Component> {
    Parser::new(source, path).parse()
}

/// Split a leading `!!a, b` line into prop names.
///
/// Returns the declared props and the byte offset where markup begins.
fn parse_props_directive(source: &str) -> (IndexSet<String>, usize) {
    let mut props = IndexSet::new();

    let (first_line, markup_start) = match source.find('\n') {
        Some(newline) => (&source[..newline], newline + 1),
        None => (source, source.len()),
    };

    let Some(list) = first_line.strip_prefix(PROPS_DIRECTIVE) else {
        return (props, 0);
    };

    for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        props.insert(name.to_string());
    }

    (props, markup_start)
}

/// Add a finished element under the innermost open element, or as a root
fn attach(stack: &mut [Element], roots: &mut Vec<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => roots.push(element),
    }
}

fn build_element(tag: Tag, self_closing: bool) -> Element {
    Element::new(tag.name, self_closing, tag.span).with_attributes(parse_attributes(tag.attributes))
}

/// Strip the `:`, `@` and `!` prefixes (in that order) and camel-case the rest.
///
/// A repeated name overwrites the earlier value.
pub fn parse_attributes(raw: Vec<RawAttribute>) -> IndexMap<String, Attribute> {
    let mut attributes = IndexMap::new();

    for RawAttribute { key, value, .. } in raw {
        let mut attribute = Attribute::literal(value);
        let mut name = key.as_str();

        if let Some(rest) = name.strip_prefix(EXPRESSION_PREFIX) {
            attribute.is_expression = true;
            name = rest;
        }
        if let Some(rest) = name.strip_prefix(EVENT_HANDLER_PREFIX) {
            attribute.is_event_handler = true;
            name = rest;
        }
        if let Some(rest) = name.strip_prefix(DEFAULT_VALUE_PREFIX) {
            attribute.is_default_value = true;
            name = rest;
        }

        attributes.insert(camel_case(name), attribute);
    }

    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_props_directive() {
        let component = parse("!!title, count\n<div>{{ title }}</div>", "card.st").unwrap();
        let props: Vec<&str> = component.props.iter().map(String::as_str).collect();
        assert_eq!(props, vec!["title", "count"]);
        assert_eq!(component.elements.len(), 1);
        assert_eq!(component.elements[0].tag_name, "div");
        assert_eq!(component.elements[0].content, "{{ title }}");
    }

    #[test]
    fn test_props_directive_skips_empty_and_duplicate_names() {
        let component = parse("!! a, ,b, a ,\n<p></p>", "x.st").unwrap();
        let props: Vec<&str> = component.props.iter().map(String::as_str).collect();
        assert_eq!(props, vec!["a", "b"]);
    }

    #[test]
    fn test_no_directive_means_no_props() {
        let component = parse("<p>!!not a directive</p>", "x.st").unwrap();
        assert!(component.props.is_empty());
        assert_eq!(component.elements[0].content, "!!not a directive");
    }

    #[test]
    fn test_directive_only_file_has_no_elements() {
        let component = parse("!!title", "x.st").unwrap();
        assert_eq!(component.props.len(), 1);
        assert!(component.is_empty());
    }

    #[test]
    fn test_spans_are_relative_to_full_source() {
        let source = "!!a\n<p></p>";
        let component = parse(source, "x.st").unwrap();
        let span = component.elements[0].span;
        assert_eq!(&source[span.start..span.end], "<p></p>");
    }

    #[test]
    fn test_attribute_prefixes() {
        let component = parse(
            r#"<button :grid-id="id + 1" @click="inc" !label="Go" :!both="x" class="btn"></button>"#,
            "x.st",
        )
        .unwrap();
        let attrs = &component.elements[0].attributes;
        let keys: Vec<&str> = attrs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["gridId", "click", "label", "both", "class"]);

        assert!(attrs["gridId"].is_expression);
        assert_eq!(attrs["gridId"].value, "id + 1");
        assert!(attrs["click"].is_event_handler);
        assert!(!attrs["click"].is_expression);
        assert!(attrs["label"].is_default_value);
        assert!(attrs["both"].is_expression && attrs["both"].is_default_value);
        assert_eq!(attrs["class"], Attribute::literal("btn"));
    }

    #[test]
    fn test_duplicate_attribute_last_wins() {
        let component = parse(r#"<p class="a" class="b" data-x="1"></p>"#, "x.st").unwrap();
        let attrs = &component.elements[0].attributes;
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs["class"].value, "b");
        assert_eq!(attrs.get_index_of("class"), Some(0));
        assert_eq!(attrs["dataX"].value, "1");
    }

    #[test]
    fn test_text_outside_elements_is_discarded() {
        let component = parse("hello <p>inside</p> bye", "x.st").unwrap();
        assert_eq!(component.elements.len(), 1);
        assert_eq!(component.elements[0].content, "inside");
    }
}
