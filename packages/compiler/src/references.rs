use spark_common::visitor::{walk_component, Visitor};
use spark_parser::ast::{Component, ComponentMap, Element};
use spark_parser::naming::component_case;
use std::collections::{BTreeMap, BTreeSet};

/// Component name a reference tag points at, if `tag_name` is a reference
pub fn referenced_component(tag_name: &str, prefix: &str) -> Option<String> {
    tag_name
        .strip_prefix(prefix)
        .filter(|rest| !rest.is_empty())
        .map(component_case)
}

/// Which components each component instantiates through reference tags
pub type ReferenceGraph = BTreeMap<String, BTreeSet<String>>;

struct ReferenceCollector<'a> {
    prefix: &'a str,
    current: String,
    graph: ReferenceGraph,
}

impl Visitor for ReferenceCollector<'_> {
    fn visit_component(&mut self, name: &str, component: &Component) {
        self.current = name.to_string();
        self.graph.entry(self.current.clone()).or_default();
        walk_component(self, name, component);
    }

    fn visit_element(&mut self, element: &Element) {
        if let Some(target) = referenced_component(&element.tag_name, self.prefix) {
            self.graph
                .entry(self.current.clone())
                .or_default()
                .insert(target);
        }
        // attribute values never contain references
        for child in &element.children {
            self.visit_element(child);
        }
    }
}

pub fn reference_graph(components: &ComponentMap, prefix: &str) -> ReferenceGraph {
    let mut collector = ReferenceCollector {
        prefix,
        current: String::new(),
        graph: ReferenceGraph::new(),
    };
    collector.visit_component_map(components);
    collector.graph
}

/// Every reference cycle among known components.
///
/// Each cycle is listed once, starting and ending with the component where
/// the depth-first search first entered it, e.g. `["A", "B", "A"]`.
/// References to unknown components are ignored.
pub fn find_reference_cycles(graph: &ReferenceGraph) -> Vec<Vec<String>> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Visiting,
        Done,
    }

    fn visit<'g>(
        node: &'g str,
        graph: &'g ReferenceGraph,
        states: &mut BTreeMap<&'g str, State>,
        path: &mut Vec<&'g str>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        states.insert(node, State::Visiting);
        path.push(node);

        for next in graph.get(node).into_iter().flatten() {
            if !graph.contains_key(next) {
                continue;
            }
            match states.get(next.as_str()) {
                Some(State::Visiting) => {
                    if let Some(pos) = path.iter().position(|n| *n == next.as_str()) {
                        let mut cycle: Vec<String> =
                            path[pos..].iter().map(|n| n.to_string()).collect();
                        cycle.push(next.clone());
                        cycles.push(cycle);
                    }
                }
                Some(State::Done) => {}
                None => visit(next, graph, states, path, cycles),
            }
        }

        path.pop();
        states.insert(node, State::Done);
    }

    let mut states = BTreeMap::new();
    let mut cycles = Vec::new();
    for node in graph.keys() {
        if !states.contains_key(node.as_str()) {
            visit(node, graph, &mut states, &mut Vec::new(), &mut cycles);
        }
    }
    cycles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn components(files: &[(&str, &str)]) -> ComponentMap {
        files
            .iter()
            .map(|(name, src)| {
                (
                    name.to_string(),
                    spark_parser::parse(src, &format!("{name}.st")).unwrap(),
                )
            })
            .collect()
    }

    #[test]
    fn test_referenced_component() {
        assert_eq!(
            referenced_component("st-ui.button", "st-").as_deref(),
            Some("Ui_Button")
        );
        assert_eq!(
            referenced_component("st-card", "st-").as_deref(),
            Some("Card")
        );
        assert_eq!(referenced_component("div", "st-"), None);
        assert_eq!(referenced_component("st-", "st-"), None);
    }

    #[test]
    fn test_graph_collects_nested_references() {
        let map = components(&[
            ("Page", "<main><section><st-card/></section><st-ui.button/></main>"),
            ("Card", "<div/>"),
        ]);
        let graph = reference_graph(&map, "st-");

        let page: Vec<_> = graph["Page"].iter().cloned().collect();
        assert_eq!(page, vec!["Card", "Ui_Button"]);
        assert!(graph["Card"].is_empty());
    }

    #[test]
    fn test_no_cycles() {
        let map = components(&[
            ("Page", "<main><st-card/></main>"),
            ("Card", "<div><st-button/></div>"),
            ("Button", "<button/>"),
        ]);
        assert!(find_reference_cycles(&reference_graph(&map, "st-")).is_empty());
    }

    #[test]
    fn test_detects_cycles() {
        let map = components(&[
            ("A", "<div><st-b/></div>"),
            ("B", "<div><st-a/></div>"),
            ("Tree", "<ul><st-tree/></ul>"),
        ]);
        let cycles = find_reference_cycles(&reference_graph(&map, "st-"));
        assert_eq!(
            cycles,
            vec![
                vec!["A".to_string(), "B".to_string(), "A".to_string()],
                vec!["Tree".to_string(), "Tree".to_string()],
            ]
        );
    }
}
