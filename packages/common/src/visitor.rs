use spark_parser::ast::*;

/// Visitor pattern for traversing the component IR immutably
///
/// This trait provides default implementations that walk the entire tree.
/// Override specific visit_* methods to perform custom actions on nodes.
pub trait Visitor: Sized {
    fn visit_component_map(&mut self, components: &ComponentMap) {
        walk_component_map(self, components);
    }

    fn visit_component(&mut self, name: &str, component: &Component) {
        walk_component(self, name, component);
    }

    fn visit_element(&mut self, element: &Element) {
        walk_element(self, element);
    }

    fn visit_attribute(&mut self, _name: &str, _attribute: &Attribute) {
        // Leaf node, no children to walk
    }
}

pub fn walk_component_map<V: Visitor>(visitor: &mut V, components: &ComponentMap) {
    for (name, component) in components {
        visitor.visit_component(name, component);
    }
}

pub fn walk_component<V: Visitor>(visitor: &mut V, _name: &str, component: &Component) {
    for element in &component.elements {
        visitor.visit_element(element);
    }
}

pub fn walk_element<V: Visitor>(visitor: &mut V, element: &Element) {
    for (name, attribute) in &element.attributes {
        visitor.visit_attribute(name, attribute);
    }
    for child in &element.children {
        visitor.visit_element(child);
    }
}
