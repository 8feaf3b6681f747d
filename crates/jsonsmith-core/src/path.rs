use std::collections::VecDeque;
use std::fmt;

/// One step of a structural path through the node tree or a generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object field by name.
    Field(String),
    /// Concrete array element in a generated document.
    Index(usize),
    /// The element definition of an array node (any index).
    Elements,
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) if is_plain_field(name) => write!(f, ".{name}"),
            PathSegment::Field(name) => write!(f, "[{name:?}]"),
            PathSegment::Index(index) => write!(f, "[{index}]"),
            PathSegment::Elements => f.write_str("[*]"),
        }
    }
}

/// Chain of field names and array positions, rendered as `$.users[*].name`.
///
/// Paths are built outward while errors propagate, so prepending is the
/// common operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePath {
    segments: VecDeque<PathSegment>,
}

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Prepend a segment (used when an error bubbles up one level).
    pub fn push_front(&mut self, segment: PathSegment) {
        self.segments.push_front(segment);
    }

    /// Append a segment (used when descending).
    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push_back(segment);
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop_back()
    }

    /// Copy of this path extended by one segment.
    pub fn join(&self, segment: PathSegment) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }

    pub fn field(&self, name: &str) -> Self {
        self.join(PathSegment::Field(name.to_string()))
    }
}

impl From<PathSegment> for NodePath {
    fn from(segment: PathSegment) -> Self {
        let mut path = NodePath::root();
        path.push(segment);
        path
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

fn is_plain_field(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_fields_indices_and_elements() {
        let mut path = NodePath::root();
        path.push(PathSegment::Field("users".to_string()));
        path.push(PathSegment::Elements);
        path.push(PathSegment::Field("first name".to_string()));
        assert_eq!(path.to_string(), "$.users[*][\"first name\"]");

        path.push_front(PathSegment::Index(3));
        assert_eq!(path.to_string(), "$[3].users[*][\"first name\"]");
    }

    #[test]
    fn root_renders_as_dollar() {
        assert_eq!(NodePath::root().to_string(), "$");
        assert!(NodePath::root().is_root());
    }
}
