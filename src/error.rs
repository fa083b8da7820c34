//! The crate-wide error taxonomy (§7) and its exit-code projection (§4.J).
//!
//! Every fallible public function in this crate returns `Result<T, Error>`.
//! `Error` implements [`miette::Diagnostic`] so the CLI front end (§4.M)
//! prints a source-highlighted, linked diagnostic instead of a bare panic;
//! [`Error::exit_code`] gives the binary entry point a small stable integer
//! per taxonomy kind so calling scripts can branch on failure class without
//! parsing text.

use miette::Diagnostic;
use thiserror::Error;

use buildcore_client::ClientError;
use buildcore_manifest::error::ManifestError;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("remote call failed: {0}")]
    #[diagnostic(code(buildcore::transport))]
    Transport(#[from] ClientError),

    /// A fan-out task observed the request's cancellation token fire before
    /// its remote call completed (§5 Cancellation).
    #[error("request was cancelled")]
    #[diagnostic(code(buildcore::cancelled))]
    Cancelled,

    #[error(transparent)]
    #[diagnostic(code(buildcore::malformed_manifest))]
    MalformedManifest(#[from] ManifestError),

    #[error("manifest repository history is malformed: {0}")]
    #[diagnostic(code(buildcore::malformed_history))]
    MalformedHistory(String),

    #[error("tag ref {0:?} is malformed (expected refs/tags/<buildNum>)")]
    #[diagnostic(code(buildcore::malformed_tag))]
    MalformedTag(String),

    /// A windowed manifest's XML failed to parse, or failed the semantic
    /// checks in [`buildcore_manifest::error::ManifestError`] with no
    /// pre-built value to wrap — e.g. the byte content at a committish
    /// was not UTF-8.
    #[error("windowed manifest is malformed: {0}")]
    #[diagnostic(code(buildcore::malformed_manifest_content))]
    MalformedManifestContent(String),

    #[error("no change matching {0:?} was found")]
    #[diagnostic(code(buildcore::change_not_found))]
    ChangeNotFound(String),

    #[error("identifier {0:?} matched more than one change")]
    #[diagnostic(code(buildcore::ambiguous_identifier))]
    AmbiguousIdentifier(String),

    #[error("change {0} has not been submitted")]
    #[diagnostic(code(buildcore::change_not_submitted))]
    ChangeNotSubmitted(u64),

    #[error("no manifest in the window pins {repo:?} on branch {branch:?}")]
    #[diagnostic(code(buildcore::no_branch_match))]
    NoBranchMatch { repo: String, branch: String },

    #[error("repository {0:?} migrated instance URL within the manifest window")]
    #[diagnostic(code(buildcore::inconsistent_remote))]
    InconsistentRemote(String),

    #[error("windowed manifest commit {0} has no build tag")]
    #[diagnostic(code(buildcore::unmapped_manifest))]
    UnmappedManifest(String),

    #[error("change {0} has not landed in any build within the window")]
    #[diagnostic(code(buildcore::change_not_landed))]
    ChangeNotLanded(String),

    #[error("invalid configuration: {0}")]
    #[diagnostic(code(buildcore::config))]
    Config(String),
}

impl Error {
    /// Maps each taxonomy kind (§7) onto a small stable non-zero process
    /// exit code; `0` (success) is never produced here.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Transport(_) => 10,
            Error::Cancelled => 11,
            Error::MalformedManifest(_) => 20,
            Error::MalformedHistory(_) => 21,
            Error::MalformedTag(_) => 22,
            Error::MalformedManifestContent(_) => 23,
            Error::ChangeNotFound(_) => 30,
            Error::AmbiguousIdentifier(_) => 31,
            Error::ChangeNotSubmitted(_) => 32,
            Error::NoBranchMatch { .. } => 40,
            Error::InconsistentRemote(_) => 41,
            Error::UnmappedManifest(_) => 42,
            Error::ChangeNotLanded(_) => 43,
            Error::Config(_) => 2,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
