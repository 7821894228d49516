//! Trait Lifecycle Generator.
//!
//! A trait document's `acceptPrps` schema compiles into one initialization
//! routine that runs after the generated component mounts: defaults are
//! applied first, then morph entries compute properties from other
//! properties via the synchronous script evaluator. Until the routine
//! signals readiness the component renders nothing.

use serde_json::Value;

use crate::code::render_entries;
use crate::context::EmitCtx;
use crate::error::CompileError;
use crate::props::compile_entries;

/// Generates the `setTraitPrps` routine for a trait document.
pub fn generate_trait_on_mount(
    accept_prps: &serde_json::Map<String, Value>,
    ctx: &mut EmitCtx,
) -> Result<String, CompileError> {
    let mut body = String::new();

    // Defaults pass. Caller-supplied values win, except for internal
    // properties, which are not externally overridable and always get
    // their declared value.
    for (key, descriptor) in accept_prps {
        let Some(desc) = descriptor.as_object() else {
            continue;
        };
        let Some(dft) = desc.get("dft") else {
            continue;
        };

        let internal = desc.get("internal").and_then(Value::as_bool).unwrap_or(false);
        let literal = serde_json::to_string_pretty(dft)?;

        if internal {
            body.push_str(&format!("\ttraitPrps.{} = {};\n", key, literal));
        } else {
            body.push_str(&format!(
                "\tif (traitPrps.{0} === undefined) {{\n\t\ttraitPrps.{0} = {1};\n\t}}\n",
                key, literal
            ));
        }
    }

    // Morph pass. The descriptor itself is compiled as a property mapping
    // into a synchronous script call; string-literal delimiters become
    // template delimiters so the `%key%` substitutions interpolate live
    // values instead of literal text.
    for (key, descriptor) in accept_prps {
        let Some(desc) = descriptor.as_object() else {
            continue;
        };
        if desc.get("morph") != Some(&Value::Bool(true)) {
            continue;
        }

        let entries = compile_entries(ctx, desc, false)?;
        let mut morpher = format!(
            "\ttraitPrps.{} = getSyncScriptResult({{{}}});\n",
            key,
            render_entries(&entries)
        );

        morpher = morpher.replace('"', "`");

        for other_key in accept_prps.keys() {
            morpher = morpher.replace(
                &format!("%{}%", other_key),
                &format!("${{traitPrps.{}}}", other_key),
            );
        }

        body.push_str(&morpher);
    }

    Ok(format!(
        "const setTraitPrps = (traitPrps, setReady) => {{\n{}\tsetReady(true);\n}};\n",
        body
    ))
}
