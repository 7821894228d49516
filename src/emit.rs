//! Component Emitter.
//!
//! Walks a document's node tree and renders it into generated JSX text.
//! The shape of the surrounding file — header imports, component binding,
//! readiness gate, property factory — is decided once per document by
//! `DocumentShape`; per-node emission then only varies on the two
//! system-property syntaxes (markup attributes vs object entries for the
//! runtime composition call).

use crate::context::{CompilerRun, EmitCtx};
use crate::document::{Document, FileMap, Wgts};
use crate::error::CompileError;
use crate::imports::{generate_imports, LibraryProbe};
use crate::lifecycle::generate_trait_on_mount;
use crate::paths::capitalize;
use crate::props::{attribute_block, compile_entries};
use crate::traits::{build_traits_info, identify_main_trait};
use crate::code::render_entries;

const HEADER: &str = "\
import React from 'react';
import { ExternalComponent, isConditionMet, getThemeValue } from '@intenda/opus-ui';
";

const HEADER_LIFECYCLE: &str = "\
import React, { useEffect, useState } from 'react';
import { ExternalComponent, getSyncScriptResult, isConditionMet, getThemeValue } from '@intenda/opus-ui';
";

const PREFIX_PLAIN: &str = "\
const Component = rest => {
\treturn (
";

const PREFIX_BOUND: &str = "\
const Component = ({ scope, prps, traitPrps = {}, ...rest }) => {
\treturn (
";

const PREFIX_GATED: &str = "\
const Component = ({ scope, prps, traitPrps = {}, ...rest }) => {
\tconst [ready, setReady] = useState(false);

\tuseEffect(setTraitPrps.bind(null, traitPrps, setReady), [traitPrps]);

\tif (!ready)
\t\treturn null;

\treturn (
";

const PREFIX_FUNCTIONAL: &str = "\
/* eslint-disable */

const FunctionalTrait = traitPrps => {
\treturn {
";

const SUFFIX_COMPONENT: &str = "
\t);
};

export default Component;
";

const SUFFIX_FUNCTIONAL: &str = "
\t};
};

export default FunctionalTrait;
";

/// The four structural templates a generated file can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentShape {
    /// Plain screen: no traits involved at the root.
    Plain,
    /// The root resolves a main trait; the component receives and forwards
    /// the inherited scope and trait properties.
    MainTrait,
    /// A trait document with markup: render is gated until the
    /// initialization routine has applied defaults and morphs.
    Trait,
    /// A trait with no component type of its own: a pure property factory,
    /// never markup.
    FunctionalTrait,
}

impl DocumentShape {
    pub fn select(doc: &Document, has_main_trait: bool) -> Self {
        if doc.is_trait() {
            if doc.doc_type.is_none() && !has_main_trait {
                Self::FunctionalTrait
            } else {
                Self::Trait
            }
        } else if has_main_trait {
            Self::MainTrait
        } else {
            Self::Plain
        }
    }

    pub fn header(&self) -> &'static str {
        match self {
            Self::Trait => HEADER_LIFECYCLE,
            _ => HEADER,
        }
    }

    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Plain => PREFIX_PLAIN,
            Self::MainTrait => PREFIX_BOUND,
            Self::Trait => PREFIX_GATED,
            Self::FunctionalTrait => PREFIX_FUNCTIONAL,
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::FunctionalTrait => SUFFIX_FUNCTIONAL,
            _ => SUFFIX_COMPONENT,
        }
    }
}

/// Renders one node (and its subtree) to generated source. Inside a
/// functional trait the node contributes a property-object expression
/// instead of markup.
pub fn generate_component(
    node: &Document,
    is_root: bool,
    ctx: &mut EmitCtx,
) -> Result<String, CompileError> {
    let traits_info = build_traits_info(node, ctx)?;
    let has_other_traits = traits_info
        .as_ref()
        .map_or(false, |t| !t.other_traits.is_empty());

    if has_other_traits {
        ctx.needs_helpers = true;
    }

    let component_type = match traits_info.as_ref().and_then(|t| t.main_trait.as_ref()) {
        Some(main) => main.type_name.clone(),
        None => {
            let own = node.doc_type.as_deref().unwrap_or("label");
            ctx.register_component_type(own);
            capitalize(own)
        }
    };

    let wrap_own = !ctx.is_functional_trait && !has_other_traits;
    let own_entries = compile_entries(ctx, &node.prps, is_root)?;
    let mut prps_string = if wrap_own {
        attribute_block("prps", &own_entries)
    } else {
        render_entries(&own_entries)
    };

    let main_trait_prps_string = match traits_info.as_ref().and_then(|t| t.main_trait.as_ref()) {
        Some(main) if !main.trait_prps.is_empty() => {
            let entries = compile_entries(ctx, &main.trait_prps, false)?;
            attribute_block("traitPrps", &entries)
        }
        _ => String::new(),
    };

    let children = match &node.wgts {
        Some(Wgts::Children(list)) => {
            let mut rendered = Vec::with_capacity(list.len());
            for child in list {
                rendered.push(generate_component(child, false, ctx)?);
            }
            rendered.join("")
        }
        Some(Wgts::Slot(slot)) if slot.starts_with('$') => {
            // Slot content is supplied by the caller at runtime.
            format!("{{traitPrps.{}}}", slot.replace('$', ""))
        }
        _ => String::new(),
    };

    let sys_prps = compile_sys_prps(node, is_root, has_other_traits, &traits_info);
    let mut sys_prps_string = sys_prps.join(if has_other_traits { "," } else { " " });

    let rest_string = if is_root && !ctx.is_functional_trait {
        "{...rest}"
    } else {
        ""
    };

    // With other traits in play the node's own and system properties travel
    // through the runtime composition call instead of markup attributes.
    let mut traits_string = String::new();
    if let Some(info) = traits_info.as_ref().filter(|t| !t.other_traits.is_empty()) {
        let mut invocations = Vec::with_capacity(info.other_traits.len());
        for t in &info.other_traits {
            invocations.push(format!(
                "{}({})",
                t.type_name,
                serde_json::to_string(&t.trait_prps)?
            ));
        }
        traits_string = format!(
            "{{...applyTraits({{ sysPrps: {{{}}}, prps: {{{}}}, traits: [{}] }})}}",
            sys_prps_string,
            prps_string,
            invocations.join(",")
        );
        sys_prps_string.clear();
        prps_string.clear();
    }

    if ctx.is_functional_trait {
        return Ok(format!("prps: {{ {} }}", prps_string));
    }

    let attrs: Vec<&str> = [
        traits_string.as_str(),
        sys_prps_string.as_str(),
        main_trait_prps_string.as_str(),
        prps_string.as_str(),
        rest_string,
    ]
    .into_iter()
    .filter(|s| !s.is_empty())
    .collect();

    let inner = if attrs.is_empty() {
        format!("<{0}>{1}</{0}>", component_type, children)
    } else {
        format!("<{0} {1}>{2}</{0}>", component_type, attrs.join(" "), children)
    };

    if let Some(condition) = &node.condition {
        let cond_entries = compile_entries(ctx, condition, false)?;
        return Ok(format!(
            "{{isConditionMet({{{}}}) ? {} : null}}",
            render_entries(&cond_entries),
            inner
        ));
    }

    Ok(inner)
}

fn compile_sys_prps(
    node: &Document,
    is_root: bool,
    object_syntax: bool,
    traits_info: &Option<crate::traits::TraitsInfo>,
) -> Vec<String> {
    let mut out = Vec::new();

    for key in ["id", "scope", "relId", "container"] {
        let Some(value) = node.sys_prp(key) else {
            continue;
        };

        // The document root pairs its own scope with the inherited one.
        let scope_pair = key == "scope" && is_root;

        let emitted = match (object_syntax, scope_pair) {
            (true, true) => format!("{}:['{}', scope]", key, value),
            (true, false) => format!("{}:'{}'", key, value),
            (false, true) => format!("{}={{['{}', scope]}}", key, value),
            (false, false) => format!("{}={{'{}'}}", key, value),
        };
        out.push(emitted);
    }

    // A root that resolved a main trait but declares no scope of its own
    // still forwards the inherited scope.
    let has_main = traits_info
        .as_ref()
        .map_or(false, |t| t.main_trait.is_some());
    if is_root && node.sys_prp("scope").is_none() && has_main {
        out.push(if object_syntax {
            "scope:scope".to_string()
        } else {
            "scope={scope}".to_string()
        });
    }

    out
}

/// Compiles one document into the full text of its generated source file.
pub fn compile_document(
    path: &str,
    doc: &Document,
    files: &FileMap,
    probe: &dyn LibraryProbe,
    run: &mut CompilerRun,
) -> Result<String, CompileError> {
    let has_main_trait = identify_main_trait(doc.trait_refs(), files).is_some();

    let mut ctx = EmitCtx::new(files, path, run);
    ctx.is_trait = doc.is_trait();
    ctx.is_functional_trait = ctx.is_trait && doc.doc_type.is_none() && !has_main_trait;

    let shape = DocumentShape::select(doc, has_main_trait);

    let root = generate_component(doc, true, &mut ctx)?;

    let on_mount = match (shape, &doc.accept_prps) {
        (DocumentShape::Trait, Some(schema)) => generate_trait_on_mount(schema, &mut ctx)?,
        _ => String::new(),
    };

    let imports = generate_imports(&mut ctx, probe);

    let mut out = String::new();
    out.push_str(shape.header());
    out.push_str(&imports);
    out.push_str("\n\n");
    if !on_mount.is_empty() {
        out.push_str(&on_mount);
        out.push('\n');
    }
    out.push_str(shape.prefix());
    out.push_str("\t\t");
    out.push_str(&root);
    out.push_str(shape.suffix());

    Ok(out)
}
