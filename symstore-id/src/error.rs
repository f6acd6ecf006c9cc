use std::error::Error;
use std::io;

use thiserror::Error;

/// The kind of an [`IdentError`].
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdentErrorKind {
    /// The file does not start with the MSF 7.00 signature.
    ///
    /// This means the PDB decoder does not apply, not that the file is
    /// corrupt.
    #[error("missing MSF signature, not a PDB file")]
    NotAPdb,
    /// The file does not carry the `MZ`/`PE\0\0` signature pair.
    #[error("missing MZ/PE signature, not a PE image")]
    NotAPe,
    /// A recognized PE container with an optional header magic other than
    /// PE32 or PE32+.
    #[error("unsupported optional header magic")]
    UnsupportedImage,
    /// The file ends before a required field.
    #[error("file is truncated")]
    TruncatedFile,
    /// A header field is internally inconsistent, such as a zero MSF page
    /// size.
    #[error("malformed header field")]
    MalformedInput,
    /// Neither the PDB nor the PE signature matched.
    #[error("unrecognized file format")]
    UnknownFileFormat,
    /// The file could not be opened or mapped.
    #[error("failed to read file")]
    Io,
}

/// An error encountered while deriving a symbol store identifier.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct IdentError {
    kind: IdentErrorKind,
    #[source]
    source: Option<Box<dyn Error + Send + Sync + 'static>>,
}

impl IdentError {
    /// Creates a new error from a known kind of error as well as an
    /// arbitrary error payload.
    pub(crate) fn new<E>(kind: IdentErrorKind, source: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        let source = Some(source.into());
        Self { kind, source }
    }

    /// Returns the corresponding [`IdentErrorKind`] for this error.
    pub fn kind(&self) -> IdentErrorKind {
        self.kind
    }
}

impl From<IdentErrorKind> for IdentError {
    fn from(kind: IdentErrorKind) -> Self {
        Self { kind, source: None }
    }
}

impl From<io::Error> for IdentError {
    fn from(e: io::Error) -> Self {
        Self::new(IdentErrorKind::Io, e)
    }
}
