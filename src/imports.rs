//! Module/Import Resolver.
//!
//! Assembles the import header of a generated file: component types grouped
//! by owning library package, trait and script modules at lexically
//! computed relative paths, and the shared runtime composition helper when
//! a file used other traits.

use std::path::PathBuf;

use indexmap::IndexMap;
use walkdir::WalkDir;

use crate::context::EmitCtx;
use crate::error::Diagnostic;
use crate::paths::{capitalize, relative_import_path};

/// Emitted verbatim as the package name when no installed library provides
/// a component type. Kept byte-compatible with the original builder's
/// output; the condition is additionally reported as a diagnostic.
const UNRESOLVED_PACKAGE: &str = "null";

/// Logical path of the shared runtime helper module.
const HELPERS_PATH: &str = "helpers";

/// Decides which installed component library supplies a component type.
pub trait LibraryProbe {
    fn resolve_library(&self, component_type: &str) -> Option<String>;
}

/// Probes the installed `@intenda` packages on disk. The base `opus-ui`
/// package is ordered last: it only supplies a type no other library
/// provides.
pub struct NodeModulesProbe {
    scope_dir: PathBuf,
}

impl NodeModulesProbe {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            scope_dir: project_root
                .into()
                .join("node_modules")
                .join("@intenda"),
        }
    }

    fn installed_packages(&self) -> Vec<String> {
        let mut packages: Vec<String> = WalkDir::new(&self.scope_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect();

        packages.sort_by_key(|p| p == "opus-ui");
        packages
    }
}

impl LibraryProbe for NodeModulesProbe {
    fn resolve_library(&self, component_type: &str) -> Option<String> {
        for pkg in self.installed_packages() {
            let component_dir = self
                .scope_dir
                .join(&pkg)
                .join("dist")
                .join("components")
                .join(component_type);
            if component_dir.exists() {
                return Some(format!("@intenda/{}", pkg));
            }
        }

        None
    }
}

/// In-memory probe for tests and embedding: an explicit type-to-package
/// table plus an optional fallback package consulted last.
pub struct StaticProbe {
    table: IndexMap<String, String>,
    fallback: Option<String>,
}

impl StaticProbe {
    pub fn empty() -> Self {
        Self {
            table: IndexMap::new(),
            fallback: None,
        }
    }

    pub fn with_default(entries: &[(&str, &str)]) -> Self {
        Self {
            table: entries
                .iter()
                .map(|(t, p)| (t.to_string(), p.to_string()))
                .collect(),
            fallback: None,
        }
    }

    pub fn with_fallback(entries: &[(&str, &str)], fallback: &str) -> Self {
        Self {
            table: entries
                .iter()
                .map(|(t, p)| (t.to_string(), p.to_string()))
                .collect(),
            fallback: Some(fallback.to_string()),
        }
    }
}

impl LibraryProbe for StaticProbe {
    fn resolve_library(&self, component_type: &str) -> Option<String> {
        self.table
            .get(component_type)
            .cloned()
            .or_else(|| self.fallback.clone())
    }
}

/// Builds the full import header for the current file. Component imports
/// come first, grouped one statement per package in first-encountered
/// order, then trait and script default imports, then the runtime helper.
pub fn generate_imports(ctx: &mut EmitCtx, probe: &dyn LibraryProbe) -> String {
    let mut grouped: IndexMap<Option<String>, Vec<String>> = IndexMap::new();
    for component_type in &ctx.used_component_types {
        grouped
            .entry(probe.resolve_library(component_type))
            .or_default()
            .push(component_type.clone());
    }

    let mut lines = Vec::new();

    for (package, types) in &grouped {
        if package.is_none() {
            for component_type in types {
                ctx.run.warn(Diagnostic::UnresolvedComponentLibrary {
                    component_type: component_type.clone(),
                });
            }
        }

        let names: Vec<String> = types.iter().map(|t| capitalize(t)).collect();
        lines.push(format!(
            "import {{ {} }} from '{}';",
            names.join(", "),
            package.as_deref().unwrap_or(UNRESOLVED_PACKAGE)
        ));
    }

    for record in ctx.trait_imports.iter().chain(ctx.script_imports.iter()) {
        lines.push(format!(
            "import {} from '{}';",
            record.type_name,
            relative_import_path(&ctx.current_path, &record.path)
        ));
    }

    if ctx.needs_helpers {
        lines.push(format!(
            "import {{ applyTraits }} from '{}';",
            relative_import_path(&ctx.current_path, HELPERS_PATH)
        ));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CompilerRun;
    use crate::document::FileMap;

    #[test]
    fn component_imports_group_by_package() {
        let files = FileMap::new();
        let mut run = CompilerRun::new();
        let mut ctx = EmitCtx::new(&files, "dashboard/index.json", &mut run);
        ctx.register_component_type("grid");
        ctx.register_component_type("label");
        ctx.register_component_type("repeater");

        let probe = StaticProbe::with_default(&[
            ("grid", "@intenda/opus-ui-grid"),
            ("repeater", "@intenda/opus-ui-grid"),
            ("label", "@intenda/opus-ui"),
        ]);

        let out = generate_imports(&mut ctx, &probe);
        assert!(out.contains("import { Grid, Repeater } from '@intenda/opus-ui-grid';"));
        assert!(out.contains("import { Label } from '@intenda/opus-ui';"));
    }

    #[test]
    fn unresolved_types_group_under_sentinel_with_diagnostics() {
        let files = FileMap::new();
        let mut run = CompilerRun::new();
        let mut ctx = EmitCtx::new(&files, "dashboard/index.json", &mut run);
        ctx.register_component_type("mystery");

        let out = generate_imports(&mut ctx, &StaticProbe::empty());
        assert!(out.contains("import { Mystery } from 'null';"));
        assert_eq!(
            run.diagnostics,
            vec![Diagnostic::UnresolvedComponentLibrary {
                component_type: "mystery".to_string(),
            }]
        );
    }

    #[test]
    fn trait_and_script_imports_use_relative_paths_in_order() {
        let files = FileMap::new();
        let mut run = CompilerRun::new();
        let mut ctx = EmitCtx::new(&files, "dashboard/a/b/index.json", &mut run);
        ctx.register_trait_import("Card", "dashboard/a/c/card");
        ctx.register_script_import("actionsSave", "dashboard/actions/save");

        let out = generate_imports(&mut ctx, &StaticProbe::empty());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "import Card from '../c/card';");
        assert_eq!(lines[1], "import actionsSave from '../../actions/save';");
    }

    #[test]
    fn helper_import_resolves_against_fixed_logical_path() {
        let files = FileMap::new();
        let mut run = CompilerRun::new();
        let mut ctx = EmitCtx::new(&files, "dashboard/screens/grid/index.json", &mut run);
        ctx.needs_helpers = true;

        let out = generate_imports(&mut ctx, &StaticProbe::empty());
        assert_eq!(out, "import { applyTraits } from '../../../helpers';");
    }

    #[test]
    fn fallback_package_only_wins_when_table_misses() {
        let probe = StaticProbe::with_fallback(
            &[("grid", "@intenda/opus-ui-grid")],
            "@intenda/opus-ui",
        );
        assert_eq!(
            probe.resolve_library("grid").as_deref(),
            Some("@intenda/opus-ui-grid")
        );
        assert_eq!(
            probe.resolve_library("label").as_deref(),
            Some("@intenda/opus-ui")
        );
    }
}
