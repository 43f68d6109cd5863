use std::io::Read;
use std::path::Path;

use ecow::eco_format;
use texpat_syntax::diag::bail;
use texpat_syntax::{Registry, StrResult, StylePackage};

use crate::args::StyleArgs;

/// Load all given style packages into a fresh registry.
///
/// Each package is named after its file's stem. Files are loaded in order,
/// so that packages given later take priority.
pub fn registry(args: &StyleArgs) -> StrResult<Registry> {
    let mut registry = Registry::new();
    for path in &args.styles {
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            bail!("cannot derive a package name from {}", path.display());
        };

        let package = package(path)?;
        tracing::info!(package = name, items = package.len(), "read style package");
        registry
            .load_package(name, package)
            .map_err(|err| eco_format!("failed to load {} ({err})", path.display()))?;
    }

    if registry.packages().is_empty() {
        tracing::warn!("no style packages given, nothing will be recognized");
    }

    Ok(registry)
}

/// Read a style package, choosing the format by the file extension.
pub fn package(path: &Path) -> StrResult<StylePackage> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| eco_format!("failed to read {} ({err})", path.display()))?;

    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or_default();
    let result = match extension {
        "json" => serde_json::from_str(&text).map_err(|err| eco_format!("{err}")),
        "yaml" | "yml" => serde_yaml::from_str(&text).map_err(|err| eco_format!("{err}")),
        "toml" => toml::from_str(&text).map_err(|err| eco_format!("{err}")),
        _ => bail!(
            "unsupported style package format of {} (expected json, yaml or toml)",
            path.display()
        ),
    };

    result.map_err(|err| eco_format!("failed to parse {} ({err})", path.display()))
}

/// Read the input document. A path of `-` reads from stdin.
pub fn input(path: &Path) -> StrResult<(String, String)> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .map_err(|err| eco_format!("failed to read from stdin ({err})"))?;
        return Ok(("<stdin>".into(), text));
    }

    let text = std::fs::read_to_string(path)
        .map_err(|err| eco_format!("failed to read {} ({err})", path.display()))?;
    Ok((path.display().to_string(), text))
}
