use std::collections::HashSet;

use serde_json::Value;

use crate::range::{DEFAULT_FLOAT_RANGE, DEFAULT_INT_RANGE, FloatRange, IntRange, Length};

/// Construction-time violations of a node's own invariants.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    #[error("choices must not be empty")]
    EmptyChoices,
    #[error("choices must be finite numbers")]
    NonFiniteChoice,
    #[error("not enough choices, should be >= {required}, got {got}")]
    NotEnoughChoices { required: usize, got: usize },
    #[error("file name must not be empty")]
    EmptyFileName,
    #[error("duplicate field {0:?}")]
    DuplicateField(String),
}

/// One node of the schema tree. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Bool,
    Integer(IntegerNode),
    Float(FloatNode),
    String(StringNode),
    Array(ArrayNode),
    Object(ObjectNode),
    Enum(EnumNode),
}

impl Node {
    /// Short type name as written in schema documents.
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Bool => "bool",
            Node::Integer(_) => "integer",
            Node::Float(_) => "float",
            Node::String(_) => "string",
            Node::Array(_) => "array",
            Node::Object(_) => "object",
            Node::Enum(_) => "enum",
        }
    }
}

/// Integer generator: a range or an explicit set of values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegerNode {
    Range(IntRange),
    Choices(Vec<i64>),
}

impl IntegerNode {
    pub fn choices(choices: Vec<i64>) -> Result<Self, NodeError> {
        if choices.is_empty() {
            return Err(NodeError::EmptyChoices);
        }
        Ok(IntegerNode::Choices(choices))
    }
}

impl Default for IntegerNode {
    fn default() -> Self {
        IntegerNode::Range(DEFAULT_INT_RANGE)
    }
}

/// Float generator: a range or an explicit set of values.
#[derive(Debug, Clone, PartialEq)]
pub enum FloatNode {
    Range(FloatRange),
    Choices(Vec<f64>),
}

impl FloatNode {
    pub fn choices(choices: Vec<f64>) -> Result<Self, NodeError> {
        if choices.is_empty() {
            return Err(NodeError::EmptyChoices);
        }
        if choices.iter().any(|choice| !choice.is_finite()) {
            return Err(NodeError::NonFiniteChoice);
        }
        Ok(FloatNode::Choices(choices))
    }
}

impl Default for FloatNode {
    fn default() -> Self {
        FloatNode::Range(DEFAULT_FLOAT_RANGE)
    }
}

/// String generator: inline choices or lines sampled from a named file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StringNode {
    Choices(Vec<String>),
    File(String),
}

impl StringNode {
    pub fn choices(choices: Vec<String>) -> Result<Self, NodeError> {
        if choices.is_empty() {
            return Err(NodeError::EmptyChoices);
        }
        Ok(StringNode::Choices(choices))
    }

    pub fn from_file(name: impl Into<String>) -> Result<Self, NodeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(NodeError::EmptyFileName);
        }
        Ok(StringNode::File(name))
    }

    /// Name of the referenced file, if this string is file-backed.
    pub fn file(&self) -> Option<&str> {
        match self {
            StringNode::File(name) => Some(name),
            StringNode::Choices(_) => None,
        }
    }
}

/// Array of independently generated elements sharing one definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayNode {
    length: Length,
    elements: Box<Node>,
}

impl ArrayNode {
    pub fn new(length: Length, elements: Node) -> Self {
        Self {
            length,
            elements: Box::new(elements),
        }
    }

    pub fn length(&self) -> Length {
        self.length
    }

    pub fn elements(&self) -> &Node {
        &self.elements
    }
}

/// Object with a fixed field set.
///
/// Fields keep their declaration order; the lexicographic order is computed
/// once here so generation with key sorting does not sort per document.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode {
    fields: Vec<(String, Node)>,
    sorted: Vec<usize>,
}

impl ObjectNode {
    pub fn new(fields: Vec<(String, Node)>) -> Result<Self, NodeError> {
        let mut seen = HashSet::with_capacity(fields.len());
        for (name, _) in &fields {
            if !seen.insert(name.as_str()) {
                return Err(NodeError::DuplicateField(name.clone()));
            }
        }

        let mut sorted: Vec<usize> = (0..fields.len()).collect();
        sorted.sort_by(|&a, &b| fields[a].0.cmp(&fields[b].0));

        Ok(Self { fields, sorted })
    }

    pub fn empty() -> Self {
        Self {
            fields: Vec::new(),
            sorted: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Node> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, node)| node)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = (&str, &Node)> {
        self.fields.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// Fields in lexicographic order of their names.
    pub fn sorted_fields(&self) -> impl ExactSizeIterator<Item = (&str, &Node)> {
        self.sorted.iter().map(|&idx| {
            let (name, node) = &self.fields[idx];
            (name.as_str(), node)
        })
    }
}

/// Pick one of several heterogeneous JSON values.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumNode {
    choices: Vec<Value>,
}

impl EnumNode {
    pub const MIN_CHOICES: usize = 2;

    pub fn new(choices: Vec<Value>) -> Result<Self, NodeError> {
        if choices.len() < Self::MIN_CHOICES {
            return Err(NodeError::NotEnoughChoices {
                required: Self::MIN_CHOICES,
                got: choices.len(),
            });
        }
        Ok(Self { choices })
    }

    pub fn choices(&self) -> &[Value] {
        &self.choices
    }
}
