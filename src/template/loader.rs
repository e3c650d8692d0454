//! Template discovery and parsing.
//!
//! Builds a registry snapshot from a directory of YAML documents: event
//! templates anywhere under the base directory (top-level `_`-prefixed
//! entries are skipped), reference fragments under `_ref/`. The whole load
//! aborts on the first parse failure or duplicate; a partial registry is
//! never returned.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::registry::TemplateRegistry;
use super::types::{EventTemplate, ReferenceTemplate};
use super::{TemplateError, TemplateResult};

/// Directory under the template base holding reference fragments
const REF_DIR: &str = "_ref";

/// Load every template under `dir` into a fresh registry snapshot
pub fn load_registry(dir: &Path) -> TemplateResult<TemplateRegistry> {
    let mut registry = TemplateRegistry::new();

    for path in yaml_files(dir, true)? {
        let template = parse_event_file(&path)?;
        registry.register_event(template)?;
    }

    let ref_dir = dir.join(REF_DIR);
    if ref_dir.is_dir() {
        for path in yaml_files(&ref_dir, false)? {
            let reference = parse_reference_file(&path)?;
            registry.register_reference(reference)?;
        }
    }

    registry.validate_references()?;

    tracing::info!(
        event_types = registry.event_count(),
        references = registry.reference_count(),
        dir = %dir.display(),
        "Template registry loaded"
    );

    Ok(registry)
}

/// Parse one event template document and enforce its metadata invariants
pub fn parse_event_file(path: &Path) -> TemplateResult<EventTemplate> {
    let contents = fs::read_to_string(path).map_err(|source| TemplateError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut template: EventTemplate =
        serde_yaml_ng::from_str(&contents).map_err(|source| TemplateError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    template.filepath = path.to_path_buf();

    if template.metadata.supported_transports.is_empty() {
        return Err(TemplateError::MissingTransports {
            path: path.to_path_buf(),
        });
    }

    if template.metadata.event_type.is_empty() || template.metadata.version.is_empty() {
        return Err(TemplateError::MissingIdentity {
            path: path.to_path_buf(),
        });
    }

    Ok(template)
}

/// Parse one reference fragment document
pub fn parse_reference_file(path: &Path) -> TemplateResult<ReferenceTemplate> {
    let contents = fs::read_to_string(path).map_err(|source| TemplateError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reference: ReferenceTemplate =
        serde_yaml_ng::from_str(&contents).map_err(|source| TemplateError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    reference.filepath = path.to_path_buf();

    Ok(reference)
}

/// Collect `.yaml` files under `dir`, sorted by name for a stable
/// registration order. With `skip_hidden`, top-level entries whose name
/// starts with `_` (the `_ref` directory among them) are left out.
fn yaml_files(dir: &Path, skip_hidden: bool) -> TemplateResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(move |entry| {
            !(skip_hidden
                && entry.depth() == 1
                && entry.file_name().to_string_lossy().starts_with('_'))
        });

    for entry in walker {
        let entry = entry.map_err(|err| {
            let path = err
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| dir.to_path_buf());
            TemplateError::Io {
                path,
                source: err.into(),
            }
        })?;

        if entry.file_type().is_file()
            && entry
                .file_name()
                .to_string_lossy()
                .to_lowercase()
                .ends_with(".yaml")
        {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}
