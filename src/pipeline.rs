//! Per-run compilation driver.
//!
//! Fully synchronous: one document is resolved and emitted before the next
//! begins, and every file gets a fresh emission context. Only the run-level
//! bookkeeping (diagnostics, anonymous-trait counts) spans documents.

use std::fs;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::builders::{build_helpers, build_main, build_script_action, build_theme};
use crate::context::CompilerRun;
use crate::document::{FileKind, FileMap};
use crate::emit::compile_document;
use crate::error::CompileError;
use crate::imports::LibraryProbe;
use crate::ingest::build_file_map;

/// Destination for generated files. Parent structure is created as needed;
/// existing content is overwritten.
pub trait OutputWriter {
    fn write(&mut self, path: &str, contents: &str) -> Result<(), CompileError>;
}

/// Writes generated files under a root directory.
pub struct FsWriter {
    root: PathBuf,
}

impl FsWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl OutputWriter for FsWriter {
    fn write(&mut self, path: &str, contents: &str) -> Result<(), CompileError> {
        let full = self.root.join(path);

        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).map_err(|e| CompileError::Write {
                path: path.to_string(),
                source: e,
            })?;
        }

        fs::write(&full, contents).map_err(|e| CompileError::Write {
            path: path.to_string(),
            source: e,
        })
    }
}

/// Collects generated files in memory, in emission order.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    pub files: IndexMap<String, String>,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }
}

impl OutputWriter for MemoryWriter {
    fn write(&mut self, path: &str, contents: &str) -> Result<(), CompileError> {
        self.files.insert(path.to_string(), contents.to_string());
        Ok(())
    }
}

/// Ingests a package and compiles everything in it.
pub fn compile(
    package: &Value,
    probe: &dyn LibraryProbe,
    writer: &mut dyn OutputWriter,
) -> Result<CompilerRun, CompileError> {
    let mut files = build_file_map(package)?;
    compile_package(&mut files, probe, writer)
}

/// Compiles an already-ingested file map: one generated source file per
/// entry, plus the helper module and the application entry file.
pub fn compile_package(
    files: &mut FileMap,
    probe: &dyn LibraryProbe,
    writer: &mut dyn OutputWriter,
) -> Result<CompilerRun, CompileError> {
    let startup_path = files
        .get_document("dashboard/index")
        .and_then(|d| d.startup.clone())
        .ok_or_else(|| CompileError::MissingPackageEntry("dashboard/index.json".to_string()))?;

    let (helpers_path, helpers_source) = build_helpers();
    writer.write(&helpers_path, &helpers_source)?;

    // Designer-tool bookkeeping, never compiled.
    files.remove("dashboard/contentsIndex.json");
    let files: &FileMap = files;

    let mut run = CompilerRun::new();
    let mut theme_names = Vec::new();

    for (path, entry) in files.iter() {
        debug!(%path, "compiling");

        match entry.kind {
            FileKind::ScriptAction => {
                let source = entry.script().unwrap_or_default();
                let (out_path, text) = build_script_action(path, source);
                writer.write(&out_path, &text)?;
            }
            FileKind::Document if path.starts_with("theme/") => {
                let raw = entry.raw().unwrap_or(&Value::Null);
                let (out_path, text) = build_theme(path, raw)?;
                writer.write(&out_path, &text)?;

                if let Some(name) = path.split('/').last() {
                    theme_names.push(name.replace(".json", ""));
                }
            }
            FileKind::Document => {
                let Some(doc) = entry.document() else {
                    continue;
                };
                let text = compile_document(path, doc, files, probe, &mut run)?;
                writer.write(&path.replace(".json", ".jsx"), &text)?;
            }
        }
    }

    let (main_path, main_text) = build_main(&startup_path, &theme_names);
    writer.write(&main_path, &main_text)?;

    Ok(run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::StaticProbe;
    use serde_json::json;

    fn sample_package() -> Value {
        json!({
            "dashboard": {
                "index.json": {
                    "startup": "screens/home/index",
                    "type": "container"
                },
                "contentsIndex.json": { "type": "label" },
                "card.json": {
                    "type": "container",
                    "acceptPrps": { "title": { "dft": "Card" } },
                    "prps": { "cpt": "%title%" }
                },
                "screens": {
                    "home": {
                        "index.json": {
                            "type": "container",
                            "scope": "home",
                            "traits": ["card"],
                            "wgts": [{
                                "type": "button",
                                "prps": {
                                    "cpt": "Save",
                                    "srcActions": { "path": "actions/save" }
                                }
                            }]
                        }
                    }
                },
                "actions": {
                    "save.js": "export default () => {};"
                }
            },
            "theme/base.json": { "global": { "padding": "12px" } }
        })
    }

    fn probe() -> StaticProbe {
        StaticProbe::with_fallback(
            &[("grid", "@intenda/opus-ui-grid")],
            "@intenda/opus-ui",
        )
    }

    #[test]
    fn compiles_every_package_entry_to_its_output_file() {
        let mut writer = MemoryWriter::new();
        let run = compile(&sample_package(), &probe(), &mut writer).unwrap();

        assert!(writer.get("helpers.jsx").is_some());
        assert!(writer.get("dashboard/index.jsx").is_some());
        assert!(writer.get("dashboard/card.jsx").is_some());
        assert!(writer.get("dashboard/screens/home/index.jsx").is_some());
        assert!(writer.get("dashboard/actions/save.js").is_some());
        assert!(writer.get("themes/base.jsx").is_some());
        assert!(writer.get("main.jsx").is_some());
        assert!(run.diagnostics.is_empty());
    }

    #[test]
    fn contents_index_is_never_compiled() {
        let mut writer = MemoryWriter::new();
        compile(&sample_package(), &probe(), &mut writer).unwrap();
        assert!(writer.get("dashboard/contentsIndex.jsx").is_none());
    }

    #[test]
    fn screen_with_main_trait_imports_and_renders_it() {
        let mut writer = MemoryWriter::new();
        compile(&sample_package(), &probe(), &mut writer).unwrap();

        let screen = writer.get("dashboard/screens/home/index.jsx").unwrap();
        assert!(screen.contains("import Card from '../../card';"));
        assert!(screen.contains("<Card"));
        assert!(screen.contains("scope={['home', scope]}"));
        assert!(screen.contains("import actionsSave from '../../actions/save';"));
        assert!(screen.contains("handler: actionsSave"));
    }

    #[test]
    fn trait_document_compiles_with_lifecycle_gate() {
        let mut writer = MemoryWriter::new();
        compile(&sample_package(), &probe(), &mut writer).unwrap();

        let card = writer.get("dashboard/card.jsx").unwrap();
        assert!(card.contains("const setTraitPrps = (traitPrps, setReady) => {"));
        assert!(card.contains("if (traitPrps.title === undefined)"));
        assert!(card.contains("cpt: traitPrps.title"));
        assert!(card.contains("...prps"));
    }

    #[test]
    fn main_entry_references_startup_screen_and_theme() {
        let mut writer = MemoryWriter::new();
        compile(&sample_package(), &probe(), &mut writer).unwrap();

        let main = writer.get("main.jsx").unwrap();
        assert!(main.contains("import Startup from './dashboard/screens/home/index';"));
        assert!(main.contains("import theme_base from './themes/base';"));
    }

    #[test]
    fn missing_index_document_is_an_error() {
        let package = json!({ "dashboard": { "a.json": { "type": "label" } } });
        let mut writer = MemoryWriter::new();
        let err = compile(&package, &probe(), &mut writer).unwrap_err();
        assert!(matches!(err, CompileError::MissingPackageEntry(_)));
    }
}
