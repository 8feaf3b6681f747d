use std::path::Path;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::decode::decode_fields;
use crate::error::{Result, SchemaError};
use crate::path::NodePath;
use crate::types::{Node, ObjectNode};

/// Top-level schema: declared corpus files plus the root object definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    /// Names that file-backed strings may reference.
    pub files: Vec<String>,
    /// Root node; always an object built from the document's `root` fields.
    pub root: Node,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaDocument {
    #[serde(default)]
    files: Vec<String>,
    root: Option<Mapping>,
}

impl Schema {
    pub fn new(files: Vec<String>, root: ObjectNode) -> Self {
        Self {
            files,
            root: Node::Object(root),
        }
    }

    /// Decode a schema from YAML (or JSON) text.
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(source)?;
        Self::from_yaml(&value)
    }

    /// Read and decode a schema file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    pub fn from_yaml(value: &Value) -> Result<Self> {
        let root_path = NodePath::root();
        let document: SchemaDocument = serde_yaml::from_value(value.clone())
            .map_err(|err| SchemaError::invalid(&root_path, err.to_string()))?;
        let Some(fields) = document.root else {
            return Err(SchemaError::invalid(&root_path, "root is required"));
        };
        let root = decode_fields(&fields, &root_path)?;
        Ok(Self::new(document.files, root))
    }
}
