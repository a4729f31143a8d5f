use crate::context::{CompileOptions, CompilerContext};
use crate::error::{CompileError, CompileResult};
use crate::expr::{prop_accessor, prop_content, prop_string, string_literal};
use crate::references::{find_reference_cycles, reference_graph, referenced_component};
use indexmap::{IndexMap, IndexSet};
use spark_common::{FileSystem, RealFileSystem};
use spark_parser::ast::{Attribute, Component, ComponentMap, Element};
use spark_parser::naming::{camel_case, camel_to_kebab, component_case, pascal_case};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Name of the helper building the `index`-th child of `owner`.
///
/// `owner` is the component name for root elements and the parent helper's
/// name for nested ones, so names never collide across components.
pub fn helper_name(owner: &str, index: usize, tag_name: &str) -> String {
    format!(
        "{}_{}_{}",
        camel_case(owner),
        index,
        pascal_case(&component_case(tag_name))
    )
}

/// Two components whose elements map to the same helper function name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelperCollision {
    pub helper: String,
    pub first: String,
    pub second: String,
}

/// Generates one Rust module holding a factory per component plus the
/// helpers building their elements.
pub struct Generator<'a> {
    components: &'a ComponentMap,
    options: CompileOptions,
}

impl<'a> Generator<'a> {
    pub fn new(components: &'a ComponentMap, options: CompileOptions) -> Self {
        Self {
            components,
            options,
        }
    }

    /// Components that produce no factory because they have no elements
    pub fn skipped(&self) -> Vec<&'a str> {
        self.components
            .iter()
            .filter(|(_, component)| component.is_empty())
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Helper names emitted by more than one component.
    ///
    /// Owner names are camel-cased, so `Ui_Button` and `UiButton` both
    /// produce `uiButton_*` helpers.
    pub fn helper_collisions(&self) -> Vec<HelperCollision> {
        let prefix = self.options.reference_prefix();
        let mut owners: IndexMap<String, &str> = IndexMap::new();
        let mut collisions = Vec::new();

        for (name, component) in self.components {
            let mut helpers = Vec::new();
            for (i, element) in component.elements.iter().enumerate() {
                collect_helper_names(
                    element,
                    helper_name(name, i, &element.tag_name),
                    &prefix,
                    &mut helpers,
                );
            }

            for helper in helpers {
                match owners.get(&helper) {
                    Some(first) if *first != name.as_str() => collisions.push(HelperCollision {
                        helper,
                        first: first.to_string(),
                        second: name.clone(),
                    }),
                    Some(_) => {}
                    None => {
                        owners.insert(helper, name);
                    }
                }
            }
        }

        collisions
    }

    #[instrument(skip(self), fields(components = self.components.len(), package = %self.options.package))]
    pub fn generate(&self) -> String {
        self.report_reference_cycles();
        self.report_helper_collisions();

        let ctx = CompilerContext::new(self.options.clone());
        compile_header(&ctx);

        ctx.indent();
        let helpers = ctx.with_new_buffer();
        for (name, component) in self.components {
            self.compile_component(name, component, &ctx, &helpers);
        }

        ctx.add_line("");
        ctx.add_line("// Helpers");
        ctx.merge_buffer(&helpers);
        ctx.dedent();
        ctx.add_line("}");

        ctx.get_output()
    }

    /// Generate and write the module to `path`
    pub fn save(&self, path: &Path) -> CompileResult<()> {
        let output = self.generate();
        RealFileSystem
            .write(path, &output)
            .map_err(|source| CompileError::Write {
                path: path.to_path_buf(),
                source,
            })
    }

    fn report_reference_cycles(&self) {
        let graph = reference_graph(self.components, &self.options.reference_prefix());
        for cycle in find_reference_cycles(&graph) {
            warn!(
                cycle = %cycle.join(" -> "),
                "components reference each other, their factories will recurse without end"
            );
        }
    }

    fn report_helper_collisions(&self) {
        for collision in self.helper_collisions() {
            warn!(
                helper = %collision.helper,
                first = %collision.first,
                second = %collision.second,
                "components generate the same helper name, the module will not compile"
            );
        }
    }

    fn compile_component(
        &self,
        name: &str,
        component: &Component,
        ctx: &CompilerContext,
        helpers: &CompilerContext,
    ) {
        if component.is_empty() {
            warn!(component = %name, file = %component.source_file, "component has no elements, skipping");
            return;
        }

        let start = Instant::now();
        let props: Vec<String> = component.props.iter().map(|p| string_literal(p)).collect();
        let roots: Vec<String> = component
            .elements
            .iter()
            .enumerate()
            .map(|(i, el)| helper_name(name, i, &el.tag_name))
            .collect();

        ctx.add_line("");
        ctx.add_line(&format!(
            "/// {} is a {}::Component -> {}",
            name, ctx.options.runtime, component.source_file
        ));
        ctx.add_line(&format!("pub fn {}() -> Component {{", name));
        ctx.indent();
        ctx.add_line(&format!(
            "let _component = Component::new(&[{}]);",
            props.join(", ")
        ));
        for root in &roots {
            ctx.add_line(&format!("_component.push({}(&_component));", root));
        }
        ctx.add_line("_component");
        ctx.dedent();
        ctx.add_line("}");

        for (element, root) in component.elements.iter().zip(&roots) {
            self.compile_element(element, root, &component.props, helpers);
        }

        info!(component = %name, elapsed = ?start.elapsed(), "generated component");
    }

    /// Emit the helper for `element` followed by the helpers of its children
    fn compile_element(
        &self,
        element: &Element,
        name: &str,
        props: &IndexSet<String>,
        ctx: &CompilerContext,
    ) {
        ctx.add_line("");
        ctx.add_line(&format!("fn {}(base: &Component) -> Element {{", name));
        ctx.indent();

        let prefix = ctx.options.reference_prefix();
        match referenced_component(&element.tag_name, &prefix) {
            Some(target) => self.compile_reference(element, name, &target, props, ctx),
            None => compile_plain_element(element, name, props, ctx),
        }

        ctx.dedent();
        ctx.add_line("}");

        if referenced_component(&element.tag_name, &prefix).is_some() {
            if !element.children.is_empty() {
                debug!(helper = %name, "children of a reference tag are not rendered");
            }
            return;
        }

        for (i, child) in element.children.iter().enumerate() {
            self.compile_element(child, &helper_name(name, i, &child.tag_name), props, ctx);
        }
    }

    fn compile_reference(
        &self,
        element: &Element,
        name: &str,
        target: &str,
        props: &IndexSet<String>,
        ctx: &CompilerContext,
    ) {
        ctx.add_line(&format!(
            "let _ref = Element::reference({}(), base);",
            target
        ));

        match self.components.get(target) {
            Some(referenced) => {
                for (key, attribute) in &element.attributes {
                    let value = attribute_value(key, attribute, props, "_ref");
                    let call = if referenced.declares_prop(key) {
                        format!("_ref.component().bind({}, ", string_literal(key))
                    } else {
                        format!(
                            "_ref.first_child().set_attribute({}, ",
                            string_literal(&camel_to_kebab(key))
                        )
                    };
                    compile_binding(&call, "_ref", &value, ctx);
                }
            }
            None => {
                warn!(
                    helper = %name,
                    component = %target,
                    "reference to unknown component, attributes are not wired"
                );
            }
        }

        ctx.add_line("_ref");
    }
}

/// Generate the module for `components` in one call
pub fn generate(components: &ComponentMap, options: CompileOptions) -> String {
    Generator::new(components, options).generate()
}

/// Helper names for `element` and its rendered descendants, in emission order
fn collect_helper_names(element: &Element, name: String, prefix: &str, out: &mut Vec<String>) {
    out.push(name.clone());
    if referenced_component(&element.tag_name, prefix).is_some() {
        return;
    }
    for (i, child) in element.children.iter().enumerate() {
        collect_helper_names(child, helper_name(&name, i, &child.tag_name), prefix, out);
    }
}

fn compile_header(ctx: &CompilerContext) {
    ctx.add_line("// This file is auto generated. Please do not edit.");
    ctx.add_line(
        "// To regenerate, run: spark-gen compile --dir <templates dir> --out-dir <out dir> --pkg <module name>",
    );
    ctx.add_line("#[allow(non_snake_case, dead_code, unused_imports)]");
    ctx.add_line(&format!("pub mod {} {{", ctx.options.package));
    ctx.indent();
    ctx.add_line(&format!("use {}::{{Component, Element}};", ctx.options.runtime));
    ctx.dedent();
}

fn compile_plain_element(
    element: &Element,
    name: &str,
    props: &IndexSet<String>,
    ctx: &CompilerContext,
) {
    ctx.add_line(&format!(
        "let _el = Element::new({}, {}, base);",
        string_literal(&element.tag_name),
        element.self_closing
    ));

    for (key, attribute) in &element.attributes {
        let value = attribute_value(key, attribute, props, "_el");
        compile_binding(
            &format!("_el.set_attribute({}, ", string_literal(key)),
            "_el",
            &value,
            ctx,
        );
    }

    for (i, child) in element.children.iter().enumerate() {
        ctx.add_line(&format!(
            "_el.add_child({}(base));",
            helper_name(name, i, &child.tag_name)
        ));
    }

    if !element.self_closing {
        let content = prop_content(&element.content, props, "_el");
        compile_binding("_el.content(", "_el", &content, ctx);
    }

    ctx.add_line("_el");
}

/// Expression producing the attribute's current value as a `String`
fn attribute_value(
    key: &str,
    attribute: &Attribute,
    props: &IndexSet<String>,
    receiver: &str,
) -> String {
    if !attribute.is_expression {
        return format!("String::from({})", string_literal(&attribute.value));
    }

    let expr = prop_string(&attribute.value, props, receiver);
    if expr.is_empty() {
        format!("{}.to_string()", prop_accessor(receiver, key))
    } else {
        format!("({}).to_string()", expr)
    }
}

/// Emit `<call>move || <body>);`, capturing a clone of `receiver` when the
/// body reads through it.
fn compile_binding(call: &str, receiver: &str, body: &str, ctx: &CompilerContext) {
    if !body.contains(&format!("{}.", receiver)) {
        ctx.add_line(&format!("{}move || {});", call, body));
        return;
    }

    ctx.add_line(&format!("{}{{", call));
    ctx.indent();
    ctx.add_line(&format!("let {0} = {0}.clone();", receiver));
    ctx.add_line(&format!("move || {}", body));
    ctx.dedent();
    ctx.add_line("});");
}
