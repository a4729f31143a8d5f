//! Discovery and parsing of every template under a source directory.

use crate::error::CommonError;
use crate::filesystem::FileSystem;
use crate::result::CommonResult;
use spark_parser::naming::component_case;
use spark_parser::ComponentMap;
use std::path::Path;
use tracing::{debug, instrument, warn};

/// Canonical component name for a template path.
///
/// The path is taken relative to `root` when it lives under it, the
/// extension is dropped and the remaining segments are joined with `_`:
/// `<root>/ui/primary-button.st` becomes `Ui_PrimaryButton`.
pub fn component_name(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let stem = relative.with_extension("");
    let segments: Vec<_> = stem
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(segment) => Some(segment.to_string_lossy()),
            _ => None,
        })
        .collect();
    component_case(&segments.join("/"))
}

/// Parse every `*.<extension>` file under `root` into a [`ComponentMap`].
///
/// Fails on the first unreadable or unparsable file so that nothing is
/// generated from a partial map. Two files mapping to the same name keep
/// the one discovered last.
#[instrument(skip(fs, root), fields(root = %root.display()))]
pub fn load_components(
    fs: &dyn FileSystem,
    root: &Path,
    extension: &str,
) -> CommonResult<ComponentMap> {
    let files = fs
        .find_files(root, extension)
        .map_err(|source| CommonError::io(root, source))?;

    let mut components = ComponentMap::new();
    for path in files {
        let source = fs
            .read_to_string(&path)
            .map_err(|err| CommonError::io(&path, err))?;

        let source_file = path.to_string_lossy();
        let component = spark_parser::parse(&source, &source_file)
            .map_err(|err| CommonError::parse(&path, err))?;

        let name = component_name(&path, root);
        debug!(
            component = %name,
            file = %source_file,
            elements = component.elements.len(),
            props = component.props.len(),
            "loaded template"
        );

        if let Some(previous) = components.insert(name.clone(), component) {
            warn!(
                component = %name,
                replaced = %previous.source_file,
                "duplicate component name, keeping {}", source_file
            );
        }
    }

    Ok(components)
}
