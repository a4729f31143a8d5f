use crate::config::{resolve_out_dir, Config};
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use spark_common::{load_components, CommonError, FileSystem, RealFileSystem};
use spark_compiler::{CompileOptions, Generator};
use spark_parser::ComponentMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

pub const GENERATED_FILE: &str = "spark_gen.rs";
pub const IR_FILE: &str = "spark_gen.json";

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// Directory containing the templates (overrides config)
    #[arg(short, long)]
    pub dir: Option<PathBuf>,

    /// Output directory, start with @ to place it inside the template directory
    #[arg(short, long)]
    pub out_dir: Option<String>,

    /// Template file extension
    #[arg(short, long)]
    pub ext: Option<String>,

    /// Name of the generated module
    #[arg(short, long)]
    pub pkg: Option<String>,

    /// Crate path of the component runtime
    #[arg(long)]
    pub runtime: Option<String>,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Skip writing the parsed components as JSON
    #[arg(long)]
    pub no_ir: bool,
}

/// Everything a compile run needs once flags and config are merged
#[derive(Debug, Clone, PartialEq)]
pub struct CompileSettings {
    pub src_dir: PathBuf,
    pub out_dir: PathBuf,
    pub options: CompileOptions,
    pub write_ir: bool,
    pub stdout: bool,
}

impl CompileSettings {
    pub fn resolve(args: CompileArgs, config: Config, cwd: &Path) -> Result<Self> {
        let src_dir = args
            .dir
            .map(|dir| cwd.join(dir))
            .or_else(|| config.get_src_dir(cwd))
            .ok_or_else(|| anyhow!("No template directory given, pass --dir or set srcDir"))?;

        let out_dir = args.out_dir.unwrap_or(config.out_dir);
        let out_dir = resolve_out_dir(&out_dir, &src_dir, cwd);

        Ok(Self {
            src_dir,
            out_dir,
            options: CompileOptions {
                package: args.pkg.unwrap_or(config.pkg),
                extension: args.ext.unwrap_or(config.ext),
                runtime: args.runtime.unwrap_or(config.runtime),
            },
            write_ir: config.write_ir && !args.no_ir,
            stdout: args.stdout,
        })
    }
}

pub fn compile(args: CompileArgs, cwd: &Path) -> Result<()> {
    let start = Instant::now();
    let config = Config::load(cwd)?;
    let settings = CompileSettings::resolve(args, config, cwd)?;
    debug!(?settings, "resolved compile settings");

    if !settings.src_dir.is_dir() {
        return Err(anyhow!(
            "Template directory does not exist: {}",
            settings.src_dir.display()
        ));
    }

    eprintln!("{}", "Compiling Spark templates...".bright_blue().bold());

    let components = load(&RealFileSystem, &settings)?;

    if components.is_empty() {
        eprintln!(
            "{}",
            format!("No .{} files found", settings.options.extension).yellow()
        );
    } else {
        eprintln!("Found {} templates", components.len());
    }

    let generator = Generator::new(&components, settings.options.clone());

    if settings.stdout {
        println!("{}", generator.generate());
        return Ok(());
    }

    let output = write_outputs(&RealFileSystem, &generator, &components, &settings)?;

    for skipped in generator.skipped() {
        eprintln!("  {} {} has no elements", "!".yellow(), skipped);
    }
    for collision in generator.helper_collisions() {
        eprintln!(
            "  {} {} and {} both generate {}",
            "!".yellow(),
            collision.first,
            collision.second,
            collision.helper
        );
    }

    eprintln!();
    eprintln!(
        "{} Generated {} in {:?}",
        "Done".green().bold(),
        output.display(),
        start.elapsed()
    );

    Ok(())
}

/// Parse every template, rendering parse errors against their source
fn load(fs: &dyn FileSystem, settings: &CompileSettings) -> Result<ComponentMap> {
    load_components(fs, &settings.src_dir, &settings.options.extension).map_err(|err| match err {
        CommonError::Parse { path, source } => {
            use spark_parser::error::pretty;
            let file_name = path.display().to_string();
            match fs.read_to_string(&path) {
                Ok(text) => anyhow!("\n{}", pretty::format_error(&source, &file_name, &text)),
                Err(_) => anyhow!("Failed to parse {}: {}", file_name, source),
            }
        }
        other => anyhow::Error::from(other),
    })
}

/// Write the generated module, then the IR dump when enabled, returning
/// the path of the module.
pub fn write_outputs(
    fs: &dyn FileSystem,
    generator: &Generator,
    components: &ComponentMap,
    settings: &CompileSettings,
) -> Result<PathBuf> {
    let source = generator.generate();
    let ir = if settings.write_ir {
        Some(serde_json::to_string_pretty(components)?)
    } else {
        None
    };

    let output = settings.out_dir.join(GENERATED_FILE);
    fs.write(&output, &source)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if let Some(ir) = ir {
        let ir_path = settings.out_dir.join(IR_FILE);
        fs.write(&ir_path, &ir)
            .with_context(|| format!("Failed to write {}", ir_path.display()))?;
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_common::MockFileSystem;

    fn args() -> CompileArgs {
        CompileArgs {
            dir: None,
            out_dir: None,
            ext: None,
            pkg: None,
            runtime: None,
            stdout: false,
            no_ir: false,
        }
    }

    #[test]
    fn test_settings_from_defaults() {
        let cwd = Path::new("/work");
        let settings = CompileSettings::resolve(
            CompileArgs {
                dir: Some(PathBuf::from("templates")),
                ..args()
            },
            Config::default(),
            cwd,
        )
        .unwrap();

        assert_eq!(settings.src_dir, PathBuf::from("/work/templates"));
        assert_eq!(settings.out_dir, PathBuf::from("/work/templates/dist"));
        assert_eq!(settings.options, CompileOptions::default());
        assert!(settings.write_ir);
    }

    #[test]
    fn test_flags_override_config() {
        let config = Config {
            src_dir: Some("from-config".to_string()),
            pkg: "configured".to_string(),
            ext: "tpl".to_string(),
            ..Config::default()
        };
        let settings = CompileSettings::resolve(
            CompileArgs {
                pkg: Some("flagged".to_string()),
                out_dir: Some("build".to_string()),
                no_ir: true,
                ..args()
            },
            config,
            Path::new("/work"),
        )
        .unwrap();

        assert_eq!(settings.src_dir, PathBuf::from("/work/from-config"));
        assert_eq!(settings.out_dir, PathBuf::from("/work/build"));
        assert_eq!(settings.options.package, "flagged");
        assert_eq!(settings.options.extension, "tpl");
        assert!(!settings.write_ir);
    }

    #[test]
    fn test_missing_dir_is_an_error() {
        let err = CompileSettings::resolve(args(), Config::default(), Path::new("/work"))
            .unwrap_err();
        assert!(err.to_string().contains("--dir"));
    }

    #[test]
    fn test_write_outputs() {
        let mut fs = MockFileSystem::new();
        fs.add_file("/t/card.st", "!!title\n<div>{{ title }}</div>");
        let settings = CompileSettings {
            src_dir: PathBuf::from("/t"),
            out_dir: PathBuf::from("/t/dist"),
            options: CompileOptions::default(),
            write_ir: true,
            stdout: false,
        };

        let components = load(&fs, &settings).unwrap();
        let generator = Generator::new(&components, settings.options.clone());
        let output = write_outputs(&fs, &generator, &components, &settings).unwrap();

        assert_eq!(output, PathBuf::from("/t/dist/spark_gen.rs"));
        let module = fs.get_file(&output).unwrap();
        assert!(module.contains("pub fn Card() -> Component {"));

        let ir = fs.get_file(Path::new("/t/dist/spark_gen.json")).unwrap();
        let ir: serde_json::Value = serde_json::from_str(&ir).unwrap();
        assert_eq!(ir["Card"]["props"][0], "title");
        assert_eq!(ir["Card"]["elements"][0]["tagName"], "div");
    }

    #[test]
    fn test_failed_module_write_leaves_no_ir() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("dist");
        // a directory where the module should go makes its write fail
        std::fs::create_dir_all(out_dir.join(GENERATED_FILE)).unwrap();

        let mut components = ComponentMap::new();
        components.insert(
            "Card".to_string(),
            spark_parser::parse("<div/>", "card.st").unwrap(),
        );
        let settings = CompileSettings {
            src_dir: dir.path().to_path_buf(),
            out_dir: out_dir.clone(),
            options: CompileOptions::default(),
            write_ir: true,
            stdout: false,
        };
        let generator = Generator::new(&components, settings.options.clone());

        let err = write_outputs(&RealFileSystem, &generator, &components, &settings).unwrap_err();
        assert!(err.to_string().contains(GENERATED_FILE));
        assert!(!out_dir.join(IR_FILE).exists());
    }

    #[test]
    fn test_parse_error_is_rendered_with_source() {
        let mut fs = MockFileSystem::new();
        fs.add_file("/t/bad.st", "<div class=\"x\"");
        let settings = CompileSettings {
            src_dir: PathBuf::from("/t"),
            out_dir: PathBuf::from("/t/dist"),
            options: CompileOptions::default(),
            write_ir: false,
            stdout: false,
        };

        let err = load(&fs, &settings).unwrap_err().to_string();
        assert!(err.contains("/t/bad.st"));
        assert!(err.contains("Unterminated tag"));
    }

    #[test]
    fn test_compile_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let templates = dir.path().join("templates");
        std::fs::create_dir_all(templates.join("ui")).unwrap();
        std::fs::write(templates.join("ui/button.st"), "!!label\n<button>{{ label }}</button>").unwrap();
        std::fs::write(templates.join("empty.st"), "<!-- todo -->").unwrap();

        compile(
            CompileArgs {
                dir: Some(templates.clone()),
                no_ir: true,
                ..args()
            },
            dir.path(),
        )
        .unwrap();

        let module = std::fs::read_to_string(templates.join("dist").join(GENERATED_FILE)).unwrap();
        assert!(module.contains("pub fn Ui_Button() -> Component {"));
        assert!(!module.contains("fn Empty()"));
        assert!(!templates.join("dist").join(IR_FILE).exists());
    }

    #[test]
    fn test_compile_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = compile(
            CompileArgs {
                dir: Some(PathBuf::from("nope")),
                ..args()
            },
            dir.path(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
