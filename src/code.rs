//! Intermediate representation for generated JavaScript expressions.
//!
//! The property compiler builds these tagged values and renders them to
//! text in one final pass, so escaping happens exactly once and the shape
//! of an expression can be asserted without string matching.

use serde_json::Value;

/// One compiled expression value.
#[derive(Debug, Clone, PartialEq)]
pub enum Code {
    /// Already-valid source text, spliced through verbatim.
    Raw(String),
    /// A JSON value serialized as a JS literal.
    Json(Value),
    /// Reference into the runtime trait-property container.
    TraitProp(String),
    /// Template literal with interleaved text and interpolations.
    Template(Vec<TemplatePart>),
    /// `callee(arg, ...)`
    Call { callee: String, args: Vec<Code> },
    /// `{ entries }`
    Object(Vec<ObjectEntry>),
    /// `[ elements ]`
    Array(Vec<Code>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Lit(String),
    Interp(Box<Code>),
}

/// One entry of an object literal.
#[derive(Debug, Clone, PartialEq)]
pub enum ObjectEntry {
    Prop { key: String, value: Code },
    Spread(Code),
}

impl ObjectEntry {
    pub fn prop(key: impl Into<String>, value: Code) -> Self {
        Self::Prop {
            key: key.into(),
            value,
        }
    }
}

/// Keys starting with `^` or `.`, or containing `-`, are not valid bare
/// identifiers and get emitted as quoted string keys.
pub fn object_key(key: &str) -> String {
    if key.starts_with('^') || key.starts_with('.') || key.contains('-') {
        format!("\"{}\"", key)
    } else {
        key.to_string()
    }
}

impl Code {
    pub fn render(&self) -> String {
        match self {
            Self::Raw(src) => src.clone(),
            Self::Json(v) => serde_json::to_string(v).unwrap_or_else(|_| "null".to_string()),
            Self::TraitProp(name) => format!("traitPrps.{}", name),
            Self::Template(parts) => {
                let mut out = String::from("`");
                for part in parts {
                    match part {
                        TemplatePart::Lit(text) => out.push_str(text),
                        TemplatePart::Interp(code) => {
                            out.push_str("${");
                            out.push_str(&code.render());
                            out.push('}');
                        }
                    }
                }
                out.push('`');
                out
            }
            Self::Call { callee, args } => {
                let rendered: Vec<String> = args.iter().map(Code::render).collect();
                format!("{}({})", callee, rendered.join(", "))
            }
            Self::Object(entries) => format!("{{{}}}", render_entries(entries)),
            Self::Array(elements) => {
                let rendered: Vec<String> = elements.iter().map(Code::render).collect();
                format!("[{}]", rendered.join(","))
            }
        }
    }
}

/// Comma-joined object entries without surrounding braces, the raw fragment
/// form nested structures and attribute blocks are assembled from.
pub fn render_entries(entries: &[ObjectEntry]) -> String {
    entries
        .iter()
        .map(|entry| match entry {
            ObjectEntry::Prop { key, value } => format!("{}: {}", key, value.render()),
            ObjectEntry::Spread(code) => format!("...{}", code.render()),
        })
        .collect::<Vec<_>>()
        .join(",")
}
