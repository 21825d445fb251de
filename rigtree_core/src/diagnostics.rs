//! Recoverable problems found while parsing or building
//!
//! Parsing and tree construction degrade gracefully: anything short of a
//! malformed document or a cyclic description is recorded here and the
//! pipeline carries on with the most complete result it can produce.

use thiserror::Error;

/// Coarse classification of a [`Diagnostic`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Canonical joint name has no entry in the index registry
    UnmappedJoint,
    /// A name refers to a link or joint that does not exist
    MissingReference,
    /// Mesh path could not be resolved; the primitive was omitted
    UnresolvedResource,
    /// Input was irregular and a default or first-wins rule was applied
    Recovered,
}

/// A single non-fatal finding
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
    #[error("Joint '{joint}' (canonical '{canonical}') has no index mapping")]
    UnmappedJoint { joint: String, canonical: String },

    #[error("Link '{link}' referenced by joint '{joint}' does not exist")]
    MissingLink { joint: String, link: String },

    #[error("Joint '{joint}' listed under link '{parent_link}' does not exist")]
    MissingJoint { parent_link: String, joint: String },

    #[error("Mesh '{path}' for link '{link}' could not be resolved")]
    UnresolvedResource { link: String, path: String },

    #[error("<{element}> element without a name was skipped")]
    MissingName { element: &'static str },

    #[error("Duplicate <{element}> name '{name}', keeping the first definition")]
    DuplicateName { element: &'static str, name: String },

    #[error("Joint '{joint}' has no parent link")]
    MissingParent { joint: String },

    #[error("Revolute joint '{joint}' has a zero-length axis")]
    DegenerateAxis { joint: String },

    #[error("Joint '{joint}' replaces an earlier revolute joint at index {index}")]
    DuplicateIndex { index: i32, joint: String },

    #[error("Link '{link}' is already attached; joint '{joint}' was left without a child")]
    SharedChildLink { link: String, joint: String },
}

impl Diagnostic {
    pub fn kind(&self) -> DiagnosticKind {
        match self {
            Diagnostic::UnmappedJoint { .. } => DiagnosticKind::UnmappedJoint,
            Diagnostic::MissingLink { .. }
            | Diagnostic::MissingJoint { .. }
            | Diagnostic::MissingParent { .. }
            | Diagnostic::SharedChildLink { .. } => DiagnosticKind::MissingReference,
            Diagnostic::UnresolvedResource { .. } => DiagnosticKind::UnresolvedResource,
            Diagnostic::MissingName { .. }
            | Diagnostic::DuplicateName { .. }
            | Diagnostic::DegenerateAxis { .. }
            | Diagnostic::DuplicateIndex { .. } => DiagnosticKind::Recovered,
        }
    }
}

/// Ordered collection of diagnostics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it
    pub fn push(&mut self, diagnostic: Diagnostic) {
        tracing::warn!("{}", diagnostic);
        self.entries.push(diagnostic);
    }

    /// Append all entries from another collection, preserving order
    pub fn merge(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Entries of one kind, in recording order
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind() == kind)
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.of_kind(kind).count()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
