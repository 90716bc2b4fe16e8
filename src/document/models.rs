//! Core data structures for questionnaire extraction
//!
//! This module defines the raw OOXML tree handed over by the package reader,
//! the simplified tree both extractors walk, and the questionnaire record they
//! produce.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::fmt;

/// Namespace of the `w:` prefix in WordprocessingML parts
pub const WORDPROCESSING_NAMESPACE: &str =
    "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Root element name of every extracted record
pub const QUESTIONNAIRE: &str = "questionnaire";

/// Name of the record's source-file element and of the root marker attribute
pub const FILE_NAME: &str = "fileName";

/// Field name used for content controls without a `tag`
pub const NO_TAG: &str = "noTag";

/// An element name as it appears in the source XML, namespace resolved
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub namespace: Option<String>,
    pub local: String,
}

impl QualifiedName {
    pub fn new(namespace: Option<&str>, local: &str) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            local: local.to_string(),
        }
    }

    /// A name in the WordprocessingML namespace
    pub fn word(local: &str) -> Self {
        Self::new(Some(WORDPROCESSING_NAMESPACE), local)
    }

    /// A name with no namespace
    pub fn plain(local: &str) -> Self {
        Self::new(None, local)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawAttribute {
    pub name: QualifiedName,
    pub value: String,
}

/// Element of the unprocessed document part
///
/// `text` holds the element's own character data. It is only meaningful when
/// the element has no child elements.
#[derive(Debug, Clone, PartialEq)]
pub struct RawNode {
    pub name: QualifiedName,
    pub attributes: Vec<RawAttribute>,
    pub text: String,
    pub children: Vec<RawNode>,
}

impl RawNode {
    pub fn new(name: QualifiedName) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: QualifiedName, value: &str) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_child(mut self, child: RawNode) -> Self {
        self.children.push(child);
        self
    }

    /// Replace or add an attribute
    pub fn set_attribute(&mut self, name: QualifiedName, value: &str) {
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(existing) => existing.value = value.to_string(),
            None => self.attributes.push(RawAttribute {
                name,
                value: value.to_string(),
            }),
        }
    }

    /// Value of an attribute without a namespace, such as the `fileName` marker
    pub fn plain_attribute(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name.namespace.is_none() && a.name.local == local)
            .map(|a| a.value.as_str())
    }

    /// Value of a namespaced attribute, preferring the WordprocessingML namespace
    pub fn namespaced_attribute(&self, local: &str) -> Option<&str> {
        let mut candidates = self
            .attributes
            .iter()
            .filter(|a| a.name.namespace.is_some() && a.name.local == local);

        candidates
            .clone()
            .find(|a| a.name.namespace.as_deref() == Some(WORDPROCESSING_NAMESPACE))
            .or_else(|| candidates.next())
            .map(|a| a.value.as_str())
    }
}

/// The attributes that survive simplification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreservedAttributes {
    /// Source document name, only ever set on the root
    pub file_name: Option<String>,
    /// `begin`, `separate` or `end` on field characters
    pub fld_char_type: Option<String>,
    /// ISO 8601 value of a date content control
    pub full_date: Option<String>,
}

/// A simplified node is either a leaf holding a value or a branch holding children
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeContent {
    Leaf(String),
    Branch(Vec<SimplifiedNode>),
}

/// Namespace-free, attribute-minimised view of an OOXML element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimplifiedNode {
    pub name: String,
    pub content: NodeContent,
    pub attributes: PreservedAttributes,
}

impl SimplifiedNode {
    pub fn leaf(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            content: NodeContent::Leaf(value.to_string()),
            attributes: PreservedAttributes::default(),
        }
    }

    pub fn branch(name: &str, children: Vec<SimplifiedNode>) -> Self {
        Self {
            name: name.to_string(),
            content: NodeContent::Branch(children),
            attributes: PreservedAttributes::default(),
        }
    }

    pub fn with_file_name(mut self, file_name: &str) -> Self {
        self.attributes.file_name = Some(file_name.to_string());
        self
    }

    pub fn with_fld_char_type(mut self, fld_char_type: &str) -> Self {
        self.attributes.fld_char_type = Some(fld_char_type.to_string());
        self
    }

    pub fn with_full_date(mut self, full_date: &str) -> Self {
        self.attributes.full_date = Some(full_date.to_string());
        self
    }
}

impl From<&SimplifiedNode> for RawNode {
    /// Re-express a simplified node as raw markup, preserved attributes included
    fn from(node: &SimplifiedNode) -> Self {
        let mut raw = RawNode::new(QualifiedName::plain(&node.name));
        match &node.content {
            NodeContent::Leaf(value) => raw.text = value.clone(),
            NodeContent::Branch(children) => {
                raw.children = children.iter().map(RawNode::from).collect();
            }
        }
        if let Some(file_name) = &node.attributes.file_name {
            raw.set_attribute(QualifiedName::plain(FILE_NAME), file_name);
        }
        if let Some(kind) = &node.attributes.fld_char_type {
            raw.set_attribute(QualifiedName::word("fldCharType"), kind);
        }
        if let Some(date) = &node.attributes.full_date {
            raw.set_attribute(QualifiedName::word("fullDate"), date);
        }
        raw
    }
}

/// Extracted value of one response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Boolean(bool),
    /// One entry per checkbox found inside a single form field
    Checkboxes(Vec<bool>),
    Date(NaiveDateTime),
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Text(String::new())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Boolean(value) => write!(f, "{value}"),
            FieldValue::Checkboxes(values) => {
                let joined: Vec<String> = values.iter().map(bool::to_string).collect();
                f.write_str(&joined.join(";"))
            }
            FieldValue::Date(date) => write!(f, "{}", date.format("%Y-%m-%dT%H:%M:%S")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseField {
    pub name: String,
    pub value: FieldValue,
}

impl ResponseField {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// One extracted document: its source name and responses in document order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Questionnaire {
    pub file_name: Option<String>,
    pub fields: Vec<ResponseField>,
}

impl Questionnaire {
    pub fn new(file_name: Option<&str>) -> Self {
        Self {
            file_name: file_name.map(str::to_string),
            fields: Vec::new(),
        }
    }

    /// Value of the first response with the given name
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.value)
    }

    /// Column names: `fileName` followed by the response names
    pub fn headers(&self) -> Vec<&str> {
        std::iter::once(FILE_NAME)
            .chain(self.fields.iter().map(|field| field.name.as_str()))
            .collect()
    }
}
