//! Package ingestion.
//!
//! Flattens the nested designer package JSON into the path-keyed file map
//! the compiler walks. Keys ending in `.json` become documents; every
//! `srcAction`/`srcActions` reference found anywhere in the tree pulls its
//! script source out of the package's `dashboard` subtree.

use serde_json::Value;

use crate::document::{Document, FileEntry, FileMap};
use crate::error::CompileError;

/// Builds the file map for one package.
pub fn build_file_map(package: &Value) -> Result<FileMap, CompileError> {
    let mut files = FileMap::new();
    walk(package, "", package, &mut files)?;
    Ok(files)
}

fn walk(
    value: &Value,
    base_path: &str,
    package: &Value,
    files: &mut FileMap,
) -> Result<(), CompileError> {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let current_path = if base_path.is_empty() {
                    key.clone()
                } else {
                    format!("{}/{}", base_path, key)
                };

                if key.ends_with(".json") {
                    let parsed: Document =
                        serde_json::from_value(child.clone()).map_err(|e| {
                            CompileError::MalformedDocument {
                                path: current_path.clone(),
                                reason: e.to_string(),
                            }
                        })?;
                    files.insert(
                        current_path.clone(),
                        FileEntry::from_document(parsed, child.clone()),
                    );
                }

                if key == "srcAction" || key == "srcActions" {
                    register_script_action(child, package, files)?;
                }

                walk(child, &current_path, package, files)?;
            }
        }
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                let current_path = format!("{}/{}", base_path, i);
                walk(item, &current_path, package, files)?;
            }
        }
        _ => {}
    }

    Ok(())
}

fn register_script_action(
    reference: &Value,
    package: &Value,
    files: &mut FileMap,
) -> Result<(), CompileError> {
    let Some(path) = reference.get("path").and_then(Value::as_str) else {
        // References without a static path (parameterized actions) are left
        // for the property compiler to reject or resolve.
        return Ok(());
    };

    let source = resolve_script_source(package, path)
        .ok_or_else(|| CompileError::MissingScriptSource(path.to_string()))?;

    files.insert(path.to_string(), FileEntry::from_script(source));

    Ok(())
}

/// Script sources live in the package's `dashboard` subtree as `<name>.js`
/// leaves alongside the documents that reference them.
fn resolve_script_source(package: &Value, path: &str) -> Option<String> {
    let mut node = package.get("dashboard")?;

    let segments: Vec<&str> = path.split('/').collect();
    for (i, segment) in segments.iter().enumerate() {
        if i == segments.len() - 1 {
            node = node.get(format!("{}.js", segment))?;
        } else {
            node = node.get(*segment)?;
        }
    }

    node.as_str().map(str::to_string)
}
