//! Document model for the dashboard compiler.
//!
//! A `Document` is one parsed designer file: a screen, a trait, a theme or a
//! script wrapper. Everything is optional — designer documents are free-form
//! and the compiler treats absent fields as absent features, not errors.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One node of a document tree. The root of a file and every child under
/// `wgts` share this shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Component kind. Absent means the node renders as a generic label
    /// unless a main trait supplies the type.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,

    /// The node's own properties, in declaration order.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub prps: serde_json::Map<String, Value>,

    /// Children: either an ordered list of nodes or a slot-binding string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wgts: Option<Wgts>,

    /// Compiled into a boolean guard around the node's markup.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<serde_json::Map<String, Value>>,

    /// Trait references, resolution order significant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traits: Option<Vec<TraitRef>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,

    /// Property-acceptance schema. Present iff this document is a trait.
    /// Each entry is a descriptor mapping (`dft`, `morph`, `internal`, plus
    /// an embedded expression for morph entries).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_prps: Option<serde_json::Map<String, Value>>,

    /// Only meaningful on `dashboard/index`: the startup screen path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub startup: Option<String>,
}

impl Document {
    /// A trait document declares a property-acceptance schema.
    pub fn is_trait(&self) -> bool {
        self.accept_prps.is_some()
    }

    pub fn trait_refs(&self) -> &[TraitRef] {
        self.traits.as_deref().unwrap_or(&[])
    }

    /// System-property value, skipping empty strings the way the original
    /// format treats falsy values.
    pub fn sys_prp(&self, key: &str) -> Option<&str> {
        let v = match key {
            "id" => &self.id,
            "scope" => &self.scope,
            "relId" => &self.rel_id,
            "container" => &self.container,
            _ => return None,
        };
        v.as_deref().filter(|s| !s.is_empty())
    }
}

/// Child position of a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Wgts {
    /// Slot binding: `"$name$"` — content supplied by the caller at runtime.
    Slot(String),
    Children(Vec<Document>),
}

/// A reference to a trait document: either a bare name or a name plus
/// forwarded properties.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TraitRef {
    Name(String),
    Detailed {
        #[serde(rename = "trait")]
        name: String,
        #[serde(rename = "traitPrps", default)]
        trait_prps: serde_json::Map<String, Value>,
    },
}

impl TraitRef {
    pub fn name(&self) -> &str {
        match self {
            Self::Name(n) => n,
            Self::Detailed { name, .. } => name,
        }
    }

    pub fn trait_prps(&self) -> Option<&serde_json::Map<String, Value>> {
        match self {
            Self::Name(_) => None,
            Self::Detailed { trait_prps, .. } => Some(trait_prps),
        }
    }

    /// Logical path of the referenced document, without the `.json` suffix.
    pub fn logical_path(&self) -> String {
        format!("dashboard/{}", self.name())
    }
}

/// Contents of one file-map entry. Documents keep their raw JSON alongside
/// the parsed form: themes serialize the raw value directly, and the
/// slot-marker scan matches against the original serialized contents.
#[derive(Debug, Clone)]
pub enum FileContents {
    Document { parsed: Box<Document>, raw: Value },
    /// Verbatim script source, copied through untouched.
    Script(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Document,
    ScriptAction,
}

#[derive(Debug, Clone)]
pub struct FileEntry {
    pub contents: FileContents,
    pub kind: FileKind,
}

impl FileEntry {
    pub fn from_document(doc: Document, raw: Value) -> Self {
        Self {
            contents: FileContents::Document {
                parsed: Box::new(doc),
                raw,
            },
            kind: FileKind::Document,
        }
    }

    pub fn from_script(source: String) -> Self {
        Self {
            contents: FileContents::Script(source),
            kind: FileKind::ScriptAction,
        }
    }

    pub fn document(&self) -> Option<&Document> {
        match &self.contents {
            FileContents::Document { parsed, .. } => Some(parsed),
            FileContents::Script(_) => None,
        }
    }

    pub fn raw(&self) -> Option<&Value> {
        match &self.contents {
            FileContents::Document { raw, .. } => Some(raw),
            FileContents::Script(_) => None,
        }
    }

    pub fn script(&self) -> Option<&str> {
        match &self.contents {
            FileContents::Script(s) => Some(s),
            FileContents::Document { .. } => None,
        }
    }
}

/// Path-keyed map of every document in a package, iteration in insertion
/// order. Populated by ingestion; the compiler core only reads it.
#[derive(Debug, Clone, Default)]
pub struct FileMap {
    entries: IndexMap<String, FileEntry>,
}

impl FileMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: String, entry: FileEntry) {
        self.entries.insert(path, entry);
    }

    pub fn get(&self, path: &str) -> Option<&FileEntry> {
        self.entries.get(path)
    }

    /// Loads the document stored at `<path>.json`, the shape trait
    /// references resolve through.
    pub fn get_document(&self, logical_path: &str) -> Option<&Document> {
        self.get_entry(logical_path).and_then(|e| e.document())
    }

    /// File-map entry for a logical (extensionless) path.
    pub fn get_entry(&self, logical_path: &str) -> Option<&FileEntry> {
        self.entries.get(&format!("{}.json", logical_path))
    }

    pub fn remove(&mut self, path: &str) -> Option<FileEntry> {
        self.entries.shift_remove(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FileEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_parses_designer_fields() {
        let doc: Document = serde_json::from_value(json!({
            "type": "container",
            "prps": { "cpt": "Hello" },
            "wgts": [{ "type": "label" }],
            "relId": "row",
            "traits": ["tooltip", { "trait": "card", "traitPrps": { "title": "t" } }]
        }))
        .unwrap();

        assert_eq!(doc.doc_type.as_deref(), Some("container"));
        assert_eq!(doc.rel_id.as_deref(), Some("row"));
        assert!(!doc.is_trait());

        let refs = doc.trait_refs();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].name(), "tooltip");
        assert_eq!(refs[1].name(), "card");
        assert_eq!(refs[1].logical_path(), "dashboard/card");
        assert!(refs[1].trait_prps().is_some());
    }

    #[test]
    fn wgts_slot_binding_parses_as_string() {
        let doc: Document = serde_json::from_value(json!({ "wgts": "$content$" })).unwrap();
        match doc.wgts {
            Some(Wgts::Slot(s)) => assert_eq!(s, "$content$"),
            other => panic!("expected slot binding, got {:?}", other),
        }
    }

    #[test]
    fn trait_document_detected_by_accept_prps() {
        let doc: Document =
            serde_json::from_value(json!({ "acceptPrps": { "cpt": { "dft": "x" } } })).unwrap();
        assert!(doc.is_trait());
    }

    #[test]
    fn file_map_preserves_insertion_order() {
        let mut files = FileMap::new();
        for p in ["dashboard/b.json", "dashboard/a.json", "dashboard/c.json"] {
            files.insert(
                p.to_string(),
                FileEntry::from_document(Document::default(), json!({})),
            );
        }
        let order: Vec<_> = files.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            order,
            vec!["dashboard/b.json", "dashboard/a.json", "dashboard/c.json"]
        );
        assert!(files.get_document("dashboard/a").is_some());
    }
}
