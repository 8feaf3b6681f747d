use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::path::{NodePath, PathSegment};
use crate::schema::Schema;
use crate::types::Node;

/// Whether [`walk`] should recurse into a node's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Descend,
    Skip,
}

/// Visit `node` and, unless the visitor returns [`Walk::Skip`], every
/// structural child below it (array element definitions and object fields).
///
/// The visitor receives the structural path of each node.
pub fn walk<F>(node: &Node, visit: &mut F)
where
    F: FnMut(&NodePath, &Node) -> Walk,
{
    let mut path = NodePath::root();
    walk_at(node, &mut path, visit);
}

fn walk_at<F>(node: &Node, path: &mut NodePath, visit: &mut F)
where
    F: FnMut(&NodePath, &Node) -> Walk,
{
    if visit(path, node) == Walk::Skip {
        return;
    }
    match node {
        Node::Array(array) => {
            path.push(PathSegment::Elements);
            walk_at(array.elements(), path, visit);
            path.pop();
        }
        Node::Object(object) => {
            for (name, child) in object.fields() {
                path.push(PathSegment::Field(name.to_string()));
                walk_at(child, path, visit);
                path.pop();
            }
        }
        Node::Bool | Node::Integer(_) | Node::Float(_) | Node::String(_) | Node::Enum(_) => {}
    }
}

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Error,
    Warning,
}

/// Structured validation issue with location and hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub code: String,
    pub path: NodePath,
    pub message: String,
    pub hint: Option<String>,
}

impl ValidationIssue {
    /// Create a new validation issue.
    pub fn new(
        severity: IssueSeverity,
        code: impl Into<String>,
        path: NodePath,
        message: impl Into<String>,
        hint: Option<String>,
    ) -> Self {
        Self {
            severity,
            code: code.into(),
            path,
            message: message.into(),
            hint,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " ({hint})")?;
        }
        Ok(())
    }
}

/// Aggregated validation report with errors and warnings.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Returns true when there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error issue.
    pub fn push_error(&mut self, issue: ValidationIssue) {
        self.errors.push(issue);
    }

    /// Add a warning issue.
    pub fn push_warning(&mut self, issue: ValidationIssue) {
        self.warnings.push(issue);
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.errors.iter().enumerate() {
            if idx > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationReport {}

impl Schema {
    /// Check that every file-backed string references a declared file.
    ///
    /// All dangling references are collected into one report. On success the
    /// warnings (such as declared but unused files) are returned.
    pub fn validate(&self) -> Result<Vec<ValidationIssue>, ValidationReport> {
        let mut report = ValidationReport::default();

        let mut declared = HashSet::with_capacity(self.files.len());
        for name in &self.files {
            if !declared.insert(name.as_str()) {
                report.push_error(ValidationIssue::new(
                    IssueSeverity::Error,
                    "file_duplicate",
                    NodePath::root(),
                    format!("file {name:?} is declared more than once"),
                    None,
                ));
            }
        }

        let mut referenced = BTreeSet::new();
        walk(&self.root, &mut |path, node| {
            if let Node::String(string) = node {
                if let Some(name) = string.file() {
                    referenced.insert(name.to_string());
                    if !declared.contains(name) {
                        report.push_error(ValidationIssue::new(
                            IssueSeverity::Error,
                            "file_undeclared",
                            path.clone(),
                            format!("unknown file {name:?}"),
                            Some(format!("add {name:?} to the schema's files list")),
                        ));
                    }
                }
            }
            Walk::Descend
        });

        for name in &self.files {
            if !referenced.contains(name) {
                report.push_warning(ValidationIssue::new(
                    IssueSeverity::Warning,
                    "file_unused",
                    NodePath::root(),
                    format!("file {name:?} is declared but never used"),
                    None,
                ));
            }
        }

        if report.is_ok() {
            Ok(report.warnings)
        } else {
            Err(report)
        }
    }
}
