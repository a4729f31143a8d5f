//! Tests for attribute prefixes and names
//!
//! Validates:
//! - `:`, `@` and `!` set their flags and are stripped from the key
//! - Keys are lowerCamelCase, duplicates keep the last value
//! - Values are entity-decoded, valueless attributes are empty

use spark_parser::{parse, Attribute};

fn attributes(source: &str) -> Vec<(String, Attribute)> {
    let component = parse(source, "attrs.st").expect("template should parse");
    component.elements[0]
        .attributes
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

#[test]
fn test_literal_attributes() {
    let attrs = attributes(r#"<div id="container" class='card wide'></div>"#);

    assert_eq!(
        attrs,
        vec![
            ("id".to_string(), Attribute::literal("container")),
            ("class".to_string(), Attribute::literal("card wide")),
        ]
    );
}

#[test]
fn test_prefixes_set_flags() {
    let attrs = attributes(r#"<input :value="name" @input="update(value)" !placeholder="Your name"/>"#);

    let (key, value) = &attrs[0];
    assert_eq!(key, "value");
    assert!(value.is_expression && !value.is_event_handler && !value.is_default_value);
    assert_eq!(value.value, "name");

    let (key, input) = &attrs[1];
    assert_eq!(key, "input");
    assert!(input.is_event_handler && !input.is_expression);
    assert_eq!(input.value, "update(value)");

    let (key, placeholder) = &attrs[2];
    assert_eq!(key, "placeholder");
    assert!(placeholder.is_default_value);
    assert_eq!(placeholder.value, "Your name");
}

#[test]
fn test_prefixes_combine_in_order() {
    let attrs = attributes(r#"<div :@!mode="x"></div>"#);
    let (key, attr) = &attrs[0];
    assert_eq!(key, "mode");
    assert!(attr.is_expression && attr.is_event_handler && attr.is_default_value);

    // out of order prefixes stay part of the name
    let attrs = attributes(r#"<div @:mode="x"></div>"#);
    let (key, attr) = &attrs[0];
    assert!(attr.is_event_handler);
    assert!(!attr.is_expression);
    assert_eq!(key, ":mode");
}

#[test]
fn test_names_are_camel_cased() {
    let attrs = attributes(r#"<div data-user-id="1" aria_label="x" :Grid-ID="g"></div>"#);
    let keys: Vec<&str> = attrs.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["dataUserId", "ariaLabel", "gridId"]);
}

#[test]
fn test_duplicate_names_keep_last_value() {
    let attrs = attributes(r#"<div class="a" id="x" class="b" data-id="1" :data-id="n"></div>"#);

    assert_eq!(attrs.len(), 3);
    assert_eq!(attrs[0], ("class".to_string(), Attribute::literal("b")));
    assert_eq!(attrs[1].0, "id");
    assert_eq!(attrs[2], ("dataId".to_string(), Attribute::expression("n")));
}

#[test]
fn test_valueless_and_entity_values() {
    let attrs = attributes(r#"<input disabled :checked title="Tom &amp; Jerry &#62;"/>"#);

    assert_eq!(attrs[0], ("disabled".to_string(), Attribute::literal("")));
    assert_eq!(attrs[1], ("checked".to_string(), Attribute::expression("")));
    assert_eq!(attrs[2].1.value, "Tom & Jerry >");
}
