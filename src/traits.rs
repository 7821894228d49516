//! Trait Resolver.
//!
//! Traits are reusable behavior/property bundles referenced by name. At most
//! one trait per node supplies the node's rendered component type (the
//! "main" trait, first candidate in declaration order, candidacy transitive
//! through nested trait lists); the rest only contribute properties through
//! the runtime composition helper.

use serde_json::Value;

use crate::context::EmitCtx;
use crate::document::{Document, FileMap, TraitRef};
use crate::emit::generate_component;
use crate::error::{CompileError, Diagnostic};
use crate::paths::trait_type_ident;

/// A trait reference resolved against the file map.
#[derive(Debug, Clone)]
pub struct ResolvedTrait {
    /// PascalCase identifier derived from the trait's logical path.
    pub type_name: String,
    pub path: String,
    pub contents: Document,
    /// Forwarded properties, with slot-bound lists already inlined as
    /// fragment markup.
    pub trait_prps: serde_json::Map<String, Value>,
}

/// Per-node resolution result.
#[derive(Debug, Clone)]
pub struct TraitsInfo {
    pub main_trait: Option<ResolvedTrait>,
    pub other_traits: Vec<ResolvedTrait>,
    /// Union of every other trait's own properties, later traits
    /// overwriting earlier keys. Consumed by the runtime helper, not here.
    pub combined_prps: serde_json::Map<String, Value>,
}

/// Index of the first trait reference that resolves (transitively) to a
/// component type. `None` when no reference is a candidate.
pub fn identify_main_trait(refs: &[TraitRef], files: &FileMap) -> Option<usize> {
    refs.iter().position(|r| is_candidate(r, files))
}

fn is_candidate(r: &TraitRef, files: &FileMap) -> bool {
    let Some(doc) = files.get_document(&r.logical_path()) else {
        // Missing documents are skipped, not errors.
        return false;
    };

    if doc.doc_type.is_some() {
        return true;
    }

    doc.trait_refs().iter().any(|inner| is_candidate(inner, files))
}

/// Resolves a node's declared traits into main/other partitions. `None`
/// when the node declares no traits.
pub fn build_traits_info(
    node: &Document,
    ctx: &mut EmitCtx,
) -> Result<Option<TraitsInfo>, CompileError> {
    let refs = node.trait_refs();
    if refs.is_empty() {
        return Ok(None);
    }

    // The main trait is excluded from the others by position, never by
    // value: two identical refs stay distinct.
    let main_idx = identify_main_trait(refs, ctx.files);

    let main_trait = match main_idx {
        Some(i) => resolve_trait_details(&refs[i], ctx)?,
        None => None,
    };

    let mut other_traits = Vec::new();
    for (i, r) in refs.iter().enumerate() {
        if Some(i) == main_idx {
            continue;
        }
        if let Some(resolved) = resolve_trait_details(r, ctx)? {
            other_traits.push(resolved);
        }
    }

    let mut combined_prps = serde_json::Map::new();
    for t in &other_traits {
        for (k, v) in &t.contents.prps {
            combined_prps.insert(k.clone(), v.clone());
        }
    }

    Ok(Some(TraitsInfo {
        main_trait,
        other_traits,
        combined_prps,
    }))
}

/// Loads one trait reference. Parameterized paths (`$`/`%`) are not yet
/// resolvable statically and missing documents follow the best-effort skip
/// policy; both return `None`.
fn resolve_trait_details(
    r: &TraitRef,
    ctx: &mut EmitCtx,
) -> Result<Option<ResolvedTrait>, CompileError> {
    let path = r.logical_path();

    if path.contains('$') || path.contains('%') {
        return Ok(None);
    }

    let files = ctx.files;
    let Some(entry) = files.get_entry(&path) else {
        ctx.run.warn(Diagnostic::MissingTrait {
            referenced_from: ctx.current_path.clone(),
            trait_path: path,
        });
        return Ok(None);
    };
    let Some(contents) = entry.document() else {
        return Ok(None);
    };

    let type_name = trait_type_ident(&path);

    if contents.doc_type.is_none() {
        ctx.run.count_anon_trait(&type_name);
    }

    ctx.register_trait_import(&type_name, &path);

    let mut trait_prps = r.trait_prps().cloned().unwrap_or_default();

    // List-valued forwarded properties whose key appears as a slot marker
    // inside the trait are compiled into inline fragment markup here; the
    // trait will splice it into its slot position.
    let serialized = serde_json::to_string(entry.raw().unwrap_or(&Value::Null))?;
    let keys: Vec<String> = trait_prps.keys().cloned().collect();
    for k in keys {
        let marker = format!("\"wgts\":\"${}$\"", k);
        if !serialized.contains(&marker) {
            continue;
        }
        if let Some(Value::Array(items)) = trait_prps.get(&k) {
            let mut rendered = Vec::with_capacity(items.len());
            for item in items.clone() {
                let child: Document =
                    serde_json::from_value(item).map_err(CompileError::Json)?;
                rendered.push(generate_component(&child, false, ctx)?);
            }
            trait_prps.insert(
                k,
                Value::String(format!("<>{}</>", rendered.join(","))),
            );
        }
    }

    Ok(Some(ResolvedTrait {
        type_name,
        path,
        contents: contents.clone(),
        trait_prps,
    }))
}
