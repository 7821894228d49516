//! Compilation state: one `EmitCtx` per output file, one `CompilerRun` per
//! package build.
//!
//! The context is threaded explicitly through every recursive emission call;
//! nothing is shared between files except the run-level bookkeeping.

use std::collections::HashMap;

use crate::document::FileMap;
use crate::error::Diagnostic;

/// A deduplicated import of a trait or script module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    /// Derived identifier, also the dedup key.
    pub type_name: String,
    /// Logical path, without extension.
    pub path: String,
}

/// State that survives across documents within a single run.
#[derive(Debug, Default)]
pub struct CompilerRun {
    /// Reference counts for anonymous (untyped) traits. Write-only
    /// bookkeeping carried over from the original builder; nothing in the
    /// compiler reads it back.
    pub anon_trait_refs: HashMap<String, u32>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilerRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count_anon_trait(&mut self, type_name: &str) {
        *self.anon_trait_refs.entry(type_name.to_string()).or_insert(0) += 1;
    }

    pub fn warn(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

/// Mutable per-file emission state.
pub struct EmitCtx<'a> {
    pub files: &'a FileMap,
    pub current_path: String,

    /// Trait imports in first-encountered order, unique by type.
    pub trait_imports: Vec<ImportRecord>,
    /// Script imports in first-encountered order, unique by type.
    pub script_imports: Vec<ImportRecord>,
    /// Component types needing a library import, first-encountered order.
    pub used_component_types: Vec<String>,

    pub is_trait: bool,
    pub is_functional_trait: bool,
    /// Set when any node in this file used other traits, forcing an import
    /// of the shared runtime composition helper.
    pub needs_helpers: bool,

    pub run: &'a mut CompilerRun,
}

impl<'a> EmitCtx<'a> {
    pub fn new(files: &'a FileMap, current_path: &str, run: &'a mut CompilerRun) -> Self {
        Self {
            files,
            current_path: current_path.to_string(),
            trait_imports: Vec::new(),
            script_imports: Vec::new(),
            used_component_types: Vec::new(),
            is_trait: false,
            is_functional_trait: false,
            needs_helpers: false,
            run,
        }
    }

    pub fn register_trait_import(&mut self, type_name: &str, path: &str) {
        if !self.trait_imports.iter().any(|r| r.type_name == type_name) {
            self.trait_imports.push(ImportRecord {
                type_name: type_name.to_string(),
                path: path.to_string(),
            });
        }
    }

    pub fn register_script_import(&mut self, type_name: &str, path: &str) {
        if !self.script_imports.iter().any(|r| r.type_name == type_name) {
            self.script_imports.push(ImportRecord {
                type_name: type_name.to_string(),
                path: path.to_string(),
            });
        }
    }

    pub fn register_component_type(&mut self, component_type: &str) {
        if !self
            .used_component_types
            .iter()
            .any(|t| t == component_type)
        {
            self.used_component_types.push(component_type.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imports_dedupe_by_type_and_keep_order() {
        let files = FileMap::new();
        let mut run = CompilerRun::new();
        let mut ctx = EmitCtx::new(&files, "dashboard/index.json", &mut run);

        ctx.register_trait_import("Card", "dashboard/card");
        ctx.register_trait_import("Tooltip", "dashboard/tooltip");
        ctx.register_trait_import("Card", "dashboard/card");

        let names: Vec<_> = ctx.trait_imports.iter().map(|r| r.type_name.as_str()).collect();
        assert_eq!(names, vec!["Card", "Tooltip"]);
    }

    #[test]
    fn anon_trait_counter_accumulates_across_files() {
        let mut run = CompilerRun::new();
        run.count_anon_trait("HoverState");
        run.count_anon_trait("HoverState");
        assert_eq!(run.anon_trait_refs.get("HoverState"), Some(&2));
    }
}
