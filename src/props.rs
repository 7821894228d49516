//! Property Expression Compiler.
//!
//! Turns an arbitrary nested designer value into compiled expression
//! entries. Binding sigils (`%name%`, `$name$`) never resolve here — they
//! always compile to a reference into the runtime trait-property container.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::code::{object_key, render_entries, Code, ObjectEntry, TemplatePart};
use crate::context::EmitCtx;
use crate::error::CompileError;
use crate::paths::script_handler_ident;

lazy_static! {
    /// `{theme.<dotted.path>}` tokens embedded in string values.
    static ref THEME_TOKEN_RE: Regex = Regex::new(r"\{theme\.([^}]+)\}").unwrap();
}

/// Compiles a property mapping into object entries, applying the per-entry
/// precedence rules. `is_root_level` marks a document root's own
/// properties, which gain a trailing caller-override spread inside
/// non-functional trait documents.
pub fn compile_entries(
    ctx: &mut EmitCtx,
    prps: &serde_json::Map<String, Value>,
    is_root_level: bool,
) -> Result<Vec<ObjectEntry>, CompileError> {
    let mut entries = Vec::new();

    let action_gated = prps.contains_key("srcAction");

    for (k, v) in prps {
        // An action-bound mapping exposes only the action.
        if action_gated && k != "srcAction" {
            continue;
        }

        if k == "srcAction" || k == "srcActions" {
            entries.push(compile_action(ctx, k, v, prps)?);
            continue;
        }

        if k == "spread-" {
            let name = v
                .as_str()
                .ok_or_else(|| malformed(ctx, "spread- expects a trait-property name"))?
                .replace('$', "");
            entries.push(ObjectEntry::Spread(Code::TraitProp(name)));
            continue;
        }

        let value = compile_value(ctx, k, v)?;
        entries.push(ObjectEntry::prop(object_key(k), value));
    }

    if is_root_level && ctx.is_trait && !ctx.is_functional_trait {
        entries.push(ObjectEntry::Spread(Code::Raw("prps".to_string())));
    }

    Ok(entries)
}

/// Compiles an ordered list into element expressions.
pub fn compile_array(ctx: &mut EmitCtx, items: &[Value]) -> Result<Vec<Code>, CompileError> {
    items.iter().map(|v| compile_value(ctx, "", v)).collect()
}

/// Attribute block form: `name={{ entries }}`, or empty when there is
/// nothing to emit.
pub fn attribute_block(key_name: &str, entries: &[ObjectEntry]) -> String {
    if entries.is_empty() {
        String::new()
    } else {
        format!("{}={{{{{}}}}}", key_name, render_entries(entries))
    }
}

fn compile_value(ctx: &mut EmitCtx, key: &str, v: &Value) -> Result<Code, CompileError> {
    Ok(match v {
        Value::String(s) => compile_string(key, s),
        Value::Array(items) => Code::Array(compile_array(ctx, items)?),
        Value::Object(map) => Code::Object(compile_entries(ctx, map, false)?),
        other => Code::Json(other.clone()),
    })
}

fn compile_string(key: &str, s: &str) -> Code {
    if is_sigil_wrapped(s, '%') || is_sigil_wrapped(s, '$') {
        return Code::TraitProp(s.replace(['%', '$'], ""));
    }

    // Fragment markup, handler references and inline function literals have
    // already been compiled by an earlier pass; splice them through.
    if s.starts_with("<>") || key == "handler" || s.starts_with("(() => {") {
        return Code::Raw(s.to_string());
    }

    if THEME_TOKEN_RE.is_match(s) {
        return theme_template(s);
    }

    Code::Json(Value::String(s.to_string()))
}

fn is_sigil_wrapped(s: &str, sigil: char) -> bool {
    s.len() >= 2 && s.starts_with(sigil) && s.ends_with(sigil)
}

/// Rewrites `"0 0 {theme.global.padding}"` into
/// `` `0 0 ${getThemeValue('global.padding')}` ``; every token in the
/// string is rewritten.
fn theme_template(s: &str) -> Code {
    let mut parts = Vec::new();
    let mut last = 0;

    for caps in THEME_TOKEN_RE.captures_iter(s) {
        let m = caps.get(0).unwrap();
        if m.start() > last {
            parts.push(TemplatePart::Lit(s[last..m.start()].to_string()));
        }
        parts.push(TemplatePart::Interp(Box::new(Code::Call {
            callee: "getThemeValue".to_string(),
            args: vec![Code::Raw(format!("'{}'", &caps[1]))],
        })));
        last = m.end();
    }
    if last < s.len() {
        parts.push(TemplatePart::Lit(s[last..].to_string()));
    }

    Code::Template(parts)
}

/// `srcAction` / `srcActions`: resolve the referenced script module,
/// register its import and emit a handler reference. The singular form with
/// sibling keys binds those siblings as a leading argument object.
fn compile_action(
    ctx: &mut EmitCtx,
    key: &str,
    v: &Value,
    enclosing: &serde_json::Map<String, Value>,
) -> Result<ObjectEntry, CompileError> {
    let script_path = v
        .get("path")
        .and_then(Value::as_str)
        .ok_or_else(|| malformed(ctx, "srcAction without a script path"))?;

    let path = format!("dashboard/{}", script_path);
    let ident = script_handler_ident(&path);
    ctx.register_script_import(&ident, &path);

    if key == "srcAction" && enclosing.len() > 1 {
        let siblings: serde_json::Map<String, Value> = enclosing
            .iter()
            .filter(|(k, _)| *k != "srcAction")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let bound = compile_entries(ctx, &siblings, false)?;

        return Ok(ObjectEntry::prop(
            "handler",
            Code::Call {
                callee: format!("{}.bind", ident),
                args: vec![Code::Raw("null".to_string()), Code::Object(bound)],
            },
        ));
    }

    Ok(ObjectEntry::prop("handler", Code::Raw(ident)))
}

fn malformed(ctx: &EmitCtx, reason: &str) -> CompileError {
    CompileError::MalformedDocument {
        path: ctx.current_path.clone(),
        reason: reason.to_string(),
    }
}
