//! Identifier case conversions shared by the parser and the code generator.
//!
//! Generated function names are derived from these, so their output must
//! stay stable between releases.

use once_cell::sync::Lazy;
use regex::Regex;

/// A lower-case letter or digit directly followed by an upper-case letter
static CAMEL_BOUNDARY_REGEXP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").unwrap());

/// Convert `snake_case`, `kebab-case`, `space separated` or `camelCase` words to `PascalCase`
pub fn pascal_case(input: &str) -> String {
    let input = input.replace(['_', '-'], " ");
    let mut result = String::with_capacity(input.len());

    let mut capitalize_next = true;
    let mut prev: Option<char> = None;
    for ch in input.chars() {
        if ch.is_uppercase() && prev.is_some_and(char::is_lowercase) {
            capitalize_next = true;
        }

        if capitalize_next {
            result.extend(ch.to_uppercase());
            capitalize_next = false;
        } else {
            result.extend(ch.to_lowercase());
        }

        if ch.is_whitespace() {
            capitalize_next = true;
        }
        prev = Some(ch);
    }

    result.replace(' ', "")
}

/// `pascal_case` with a lower-case first character
pub fn camel_case(input: &str) -> String {
    let pascal = pascal_case(input);
    let mut chars = pascal.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Canonical component name for a dotted or slashed path.
///
/// `ui.button` and `ui/button` both become `Ui_Button`.
pub fn component_case(input: &str) -> String {
    input
        .replace('.', "/")
        .split(['/', '\\'])
        .map(pascal_case)
        .collect::<Vec<_>>()
        .join("_")
}

/// `dataId` -> `data-id`
pub fn camel_to_kebab(input: &str) -> String {
    CAMEL_BOUNDARY_REGEXP
        .replace_all(input, "${1}-${2}")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("my-card"), "MyCard");
        assert_eq!(pascal_case("my_card"), "MyCard");
        assert_eq!(pascal_case("gridId"), "GridId");
        assert_eq!(pascal_case("HTML"), "Html");
        assert_eq!(pascal_case("div"), "Div");
        assert_eq!(pascal_case("st-ui"), "StUi");
        assert_eq!(pascal_case(""), "");
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("data-id"), "dataId");
        assert_eq!(camel_case("class"), "class");
        assert_eq!(camel_case("Card"), "card");
        assert_eq!(camel_case("Ui_Button"), "uiButton");
        assert_eq!(camel_case("card_0_Div"), "card0Div");
        assert_eq!(camel_case(""), "");
    }

    #[test]
    fn test_component_case() {
        assert_eq!(component_case("ui.button"), "Ui_Button");
        assert_eq!(component_case("ui/button"), "Ui_Button");
        assert_eq!(component_case("forms/text-field"), "Forms_TextField");
        assert_eq!(component_case("card"), "Card");
        assert_eq!(component_case("st-ui.button"), "StUi_Button");
    }

    #[test]
    fn test_camel_to_kebab() {
        assert_eq!(camel_to_kebab("dataId"), "data-id");
        assert_eq!(camel_to_kebab("class"), "class");
        assert_eq!(camel_to_kebab("ariaLabelledBy"), "aria-labelled-by");
        assert_eq!(camel_to_kebab("h1Title"), "h1-title");
    }
}
