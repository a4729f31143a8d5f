use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use spark_common::{load_components, walk_element, RealFileSystem, Visitor};
use spark_parser::ast::{Component, ComponentMap, Element};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Directory containing the templates (overrides config)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Template file extension
    #[arg(short, long)]
    pub ext: Option<String>,

    /// Print the parsed components as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn inspect(args: InspectArgs, cwd: &Path) -> Result<()> {
    let config = Config::load(cwd)?;
    let src_dir = args
        .dir
        .map(|dir| cwd.join(dir))
        .or_else(|| config.get_src_dir(cwd))
        .ok_or_else(|| anyhow!("No template directory given, pass --dir or set srcDir"))?;
    let ext = args.ext.unwrap_or(config.ext);

    let components = load_components(&RealFileSystem, &src_dir, &ext)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&components)?);
    } else {
        print!("{}", render_tree(&components));
    }

    Ok(())
}

/// Indented outline of every component's elements
pub fn render_tree(components: &ComponentMap) -> String {
    let mut printer = TreePrinter::default();
    printer.visit_component_map(components);
    printer.out
}

#[derive(Default)]
struct TreePrinter {
    out: String,
    depth: usize,
}

impl Visitor for TreePrinter {
    fn visit_component(&mut self, name: &str, component: &Component) {
        self.out.push_str(&format!(
            "{} {} {}\n",
            "component:".bold(),
            name,
            format!("({})", component.source_file).dimmed()
        ));
        if !component.props.is_empty() {
            let props: Vec<&str> = component.props.iter().map(String::as_str).collect();
            self.out.push_str(&format!("  props: {}\n", props.join(", ")));
        }

        self.depth = 1;
        for element in &component.elements {
            self.visit_element(element);
        }
        self.depth = 0;
    }

    fn visit_element(&mut self, element: &Element) {
        let indent = "  ".repeat(self.depth);
        self.out.push_str(&format!("{}<{}", indent, element.tag_name.cyan()));

        for (name, attribute) in &element.attributes {
            let mut marker = String::new();
            if attribute.is_expression {
                marker.push(':');
            }
            if attribute.is_event_handler {
                marker.push('@');
            }
            if attribute.is_default_value {
                marker.push('!');
            }
            self.out.push_str(&format!(" {}{}={:?}", marker, name, attribute.value));
        }
        self.out.push_str(if element.self_closing { " />\n" } else { ">\n" });

        let content = element.content.trim();
        if !content.is_empty() {
            self.out.push_str(&format!("{}  {:?}\n", indent, content));
        }

        self.depth += 1;
        walk_element(self, element);
        self.depth -= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_tree() {
        colored::control::set_override(false);

        let mut components = ComponentMap::new();
        components.insert(
            "Card".to_string(),
            spark_parser::parse(
                "!!title\n<div :id=\"title\" @click=\"go\"><h1>{{ title }}</h1><br/></div>",
                "card.st",
            )
            .unwrap(),
        );

        assert_eq!(
            render_tree(&components),
            concat!(
                "component: Card (card.st)\n",
                "  props: title\n",
                "  <div :id=\"title\" @click=\"go\">\n",
                "    <h1>\n",
                "      \"{{ title }}\"\n",
                "    <br />\n",
            )
        );
    }
}
