//! Build node trees from decoded YAML values.
//!
//! Each variant has its own document struct with typed fields and defaults;
//! the builder checks mutually exclusive keys and required children, and
//! reports failures with the structural path of the offending node.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use crate::error::{Result, SchemaError};
use crate::path::{NodePath, PathSegment};
use crate::range::{decode_float_range, decode_int_range, decode_length};
use crate::types::{
    ArrayNode, EnumNode, FloatNode, IntegerNode, Node, NodeError, ObjectNode, StringNode,
};

/// Node type tag as written in schema documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
enum NodeType {
    Bool,
    #[serde(alias = "int")]
    Integer,
    Float,
    String,
    Array,
    Object,
    Enum,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct BoolDocument {
    #[serde(rename = "type")]
    _type: NodeType,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct NumberDocument<T> {
    #[serde(rename = "type")]
    _type: NodeType,
    #[serde(default)]
    range: Option<Value>,
    #[serde(default)]
    choices: Option<Vec<T>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct StringDocument {
    #[serde(rename = "type")]
    _type: NodeType,
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    choices: Option<Vec<String>>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ArrayDocument {
    #[serde(rename = "type")]
    _type: NodeType,
    #[serde(default)]
    length: Option<Value>,
    #[serde(default)]
    elements: Option<Value>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ObjectDocument {
    #[serde(rename = "type")]
    _type: NodeType,
    #[serde(default)]
    fields: Option<Mapping>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct EnumDocument {
    #[serde(rename = "type")]
    _type: NodeType,
    #[serde(default)]
    choices: Vec<Value>,
}

impl Node {
    /// Decode a single node from YAML (or JSON) text.
    pub fn from_yaml_str(source: &str) -> Result<Node> {
        let value: Value = serde_yaml::from_str(source)?;
        Node::from_yaml(&value, &NodePath::root())
    }

    /// Build a node from an already decoded YAML value located at `path`.
    pub fn from_yaml(value: &Value, path: &NodePath) -> Result<Node> {
        match value {
            Value::String(_) => decode_shorthand(value, path),
            Value::Mapping(mapping) => decode_mapping(value, mapping, path),
            Value::Null => Err(SchemaError::invalid(path, "empty node")),
            _ => Err(SchemaError::invalid(
                path,
                format!(
                    "node should be either a type name or a mapping, got {}",
                    kind_of(value)
                ),
            )),
        }
    }
}

/// Build an object node from a `field: node` mapping.
pub(crate) fn decode_fields(fields: &Mapping, path: &NodePath) -> Result<ObjectNode> {
    let mut decoded = Vec::with_capacity(fields.len());
    for (key, value) in fields {
        let Some(name) = key.as_str() else {
            return Err(SchemaError::invalid(
                path,
                format!("field names must be strings, got {}", kind_of(key)),
            ));
        };
        let field_path = path.join(PathSegment::Field(name.to_string()));
        decoded.push((name.to_string(), Node::from_yaml(value, &field_path)?));
    }
    ObjectNode::new(decoded).map_err(|err| node_error(path, err))
}

fn decode_shorthand(value: &Value, path: &NodePath) -> Result<Node> {
    let node_type = parse_type(value, path)?;
    match node_type {
        NodeType::Bool => Ok(Node::Bool),
        NodeType::Integer => Ok(Node::Integer(IntegerNode::default())),
        NodeType::Float => Ok(Node::Float(FloatNode::default())),
        other => Err(SchemaError::invalid(
            path,
            format!("unable to decode inline {:?}", type_label(other)),
        )),
    }
}

fn decode_mapping(value: &Value, mapping: &Mapping, path: &NodePath) -> Result<Node> {
    let Some(type_value) = mapping.get("type") else {
        return Err(SchemaError::invalid(path, "type is required"));
    };

    match parse_type(type_value, path)? {
        NodeType::Bool => {
            let _: BoolDocument = document(value, path)?;
            Ok(Node::Bool)
        }
        NodeType::Integer => {
            let doc: NumberDocument<i64> = document(value, path)?;
            let node = match (doc.range, doc.choices) {
                (Some(_), Some(_)) => return Err(exclusive(path, "range", "choices")),
                (None, Some(choices)) => {
                    IntegerNode::choices(choices).map_err(|err| node_error(path, err))?
                }
                (range, None) => IntegerNode::Range(decode_int_range(
                    range.as_ref().unwrap_or(&Value::Null),
                    path,
                )?),
            };
            Ok(Node::Integer(node))
        }
        NodeType::Float => {
            let doc: NumberDocument<f64> = document(value, path)?;
            let node = match (doc.range, doc.choices) {
                (Some(_), Some(_)) => return Err(exclusive(path, "range", "choices")),
                (None, Some(choices)) => {
                    FloatNode::choices(choices).map_err(|err| node_error(path, err))?
                }
                (range, None) => FloatNode::Range(decode_float_range(
                    range.as_ref().unwrap_or(&Value::Null),
                    path,
                )?),
            };
            Ok(Node::Float(node))
        }
        NodeType::String => {
            let doc: StringDocument = document(value, path)?;
            let node = match (doc.from, doc.choices) {
                (Some(_), Some(_)) => return Err(exclusive(path, "from", "choices")),
                (Some(from), None) => StringNode::from_file(from),
                (None, Some(choices)) => StringNode::choices(choices),
                (None, None) => {
                    return Err(SchemaError::invalid(
                        path,
                        "string should have either from or choices",
                    ));
                }
            };
            node.map(Node::String).map_err(|err| node_error(path, err))
        }
        NodeType::Array => {
            let doc: ArrayDocument = document(value, path)?;
            let length = decode_length(doc.length.as_ref().unwrap_or(&Value::Null), path)?;
            let Some(elements) = doc.elements else {
                return Err(SchemaError::invalid(path, "array must specify its elements"));
            };
            let elements = Node::from_yaml(&elements, &path.join(PathSegment::Elements))?;
            Ok(Node::Array(ArrayNode::new(length, elements)))
        }
        NodeType::Object => {
            let doc: ObjectDocument = document(value, path)?;
            let Some(fields) = doc.fields else {
                return Err(SchemaError::invalid(path, "object must specify its fields"));
            };
            Ok(Node::Object(decode_fields(&fields, path)?))
        }
        NodeType::Enum => {
            let doc: EnumDocument = document(value, path)?;
            let choices = doc
                .choices
                .iter()
                .map(|choice| json_choice(choice, path))
                .collect::<Result<Vec<_>>>()?;
            EnumNode::new(choices)
                .map(Node::Enum)
                .map_err(|err| node_error(path, err))
        }
    }
}

/// Convert one enum choice to JSON. JSON has no NaN or infinity, and serde
/// would quietly turn them into `null`, so they are rejected up front.
fn json_choice(choice: &Value, path: &NodePath) -> Result<serde_json::Value> {
    if !is_finite_tree(choice) {
        return Err(SchemaError::invalid(path, "choices must be finite numbers"));
    }
    serde_json::to_value(choice)
        .map_err(|err| SchemaError::invalid(path, format!("choice is not valid JSON: {err}")))
}

fn is_finite_tree(value: &Value) -> bool {
    match value {
        Value::Number(number) => number.as_f64().is_none_or(f64::is_finite),
        Value::Sequence(items) => items.iter().all(is_finite_tree),
        Value::Mapping(mapping) => mapping.values().all(is_finite_tree),
        Value::Tagged(tagged) => is_finite_tree(&tagged.value),
        Value::Null | Value::Bool(_) | Value::String(_) => true,
    }
}

fn parse_type(value: &Value, path: &NodePath) -> Result<NodeType> {
    serde_yaml::from_value(value.clone()).map_err(|_| {
        let shown = match value {
            Value::String(name) => format!("{name:?}"),
            other => kind_of(other).to_string(),
        };
        SchemaError::invalid(path, format!("unsupported type: {shown}"))
    })
}

fn document<T: DeserializeOwned>(value: &Value, path: &NodePath) -> Result<T> {
    serde_yaml::from_value(value.clone()).map_err(|err| SchemaError::invalid(path, err.to_string()))
}

fn exclusive(path: &NodePath, a: &str, b: &str) -> SchemaError {
    SchemaError::invalid(path, format!("{a} and {b} are mutually exclusive"))
}

fn node_error(path: &NodePath, err: NodeError) -> SchemaError {
    SchemaError::invalid(path, err.to_string())
}

fn type_label(node_type: NodeType) -> &'static str {
    match node_type {
        NodeType::Bool => "bool",
        NodeType::Integer => "integer",
        NodeType::Float => "float",
        NodeType::String => "string",
        NodeType::Array => "array",
        NodeType::Object => "object",
        NodeType::Enum => "enum",
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}
