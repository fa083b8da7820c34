use thiserror::Error;

/// Violations of the manifest schema and invariants of the data model.
///
/// This type does not cover XML syntax errors — those surface from the
/// caller's `quick-xml` deserialization step before a [`crate::Manifest`]
/// value exists at all. It covers the semantic checks layered on top: a
/// missing default remote, a project lacking a required attribute, or a
/// dangling remote reference.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("manifest has no <default> element")]
    MissingDefaultRemote,

    #[error("project {0:?} has no @name attribute")]
    ProjectMissingName(String),

    #[error("project {0:?} has no @revision attribute and none is inherited from <default>")]
    ProjectMissingRevision(String),

    #[error("project {project:?} references remote {remote:?}, which is not defined")]
    UnknownRemote { project: String, remote: String },
}
