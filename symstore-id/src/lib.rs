//! Derives Microsoft Symbol Server identifiers from PDB debug files and
//! PE executable images.
//!
//! A symbol store files every binary and its debug companion under a path
//! of the form `<filename>/<identifier>/<filename>`. The identifier in the
//! middle is what this crate computes:
//!
//! * For PDB files, the GUID and age stored in stream 1 of the MSF
//!   container, rendered as 32 uppercase hex digits followed by the age in
//!   lowercase hex.
//! * For PE images, the COFF `TimeDateStamp` and the optional header's
//!   `SizeOfImage`, rendered as eight uppercase hex digits followed by the
//!   size in lowercase hex.
//!
//! # Functionality
//!
//! * Derive an identifier straight from a path with [`identify`], or with
//!   [`identify_pdb`] / [`identify_pe`] when the format is already known.
//! * Parse in-memory buffers with [`PdbObject::parse`] and
//!   [`PeObject::parse`].
//! * Recognize a buffer's format without parsing it via
//!   [`FileFormat::peek`].
//!
//! # Example
//!
//! ```no_run
//! let id = symstore_id::identify("crash_handler.dll")?;
//! println!("{id}");
//! # Ok::<_, symstore_id::IdentError>(())
//! ```
//!
//! Decoding never panics on malformed input: every field access is bounds
//! checked and converted into a typed [`IdentError`].

#![warn(missing_docs)]

mod byteview;
mod error;
mod msf;
mod pe;
mod utils;

pub use byteview::ByteView;
pub use error::{IdentError, IdentErrorKind};
pub use msf::PdbObject;
pub use pe::{PeCodeId, PeObject};

pub use debugid::{CodeId, DebugId};
pub use uuid::Uuid;

use std::fmt;
use std::path::Path;

/// The file format of a buffer, recognized by content signature.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    /// A PDB debug file in the MSF container format.
    Pdb,
    /// A PE executable or library image.
    Pe,
    /// Neither signature matched.
    Unknown,
}

impl FileFormat {
    /// Peeks at the start of the buffer to recognize its file format.
    pub fn peek(data: &[u8]) -> Self {
        if PdbObject::test(data) {
            FileFormat::Pdb
        } else if PeObject::test(data) {
            FileFormat::Pe
        } else {
            FileFormat::Unknown
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileFormat::Pdb => write!(f, "pdb"),
            FileFormat::Pe => write!(f, "pe"),
            FileFormat::Unknown => write!(f, "unknown"),
        }
    }
}

/// Derives the symbol store identifier for the file at the given path.
///
/// The file format is recognized by content signature rather than by file
/// extension. Returns [`IdentErrorKind::UnknownFileFormat`] when neither
/// the MSF nor the DOS signature matches.
pub fn identify<P: AsRef<Path>>(path: P) -> Result<String, IdentError> {
    let view = ByteView::open(path)?;
    match FileFormat::peek(&view) {
        FileFormat::Pdb => Ok(PdbObject::parse(&view)?.symstore_id()),
        FileFormat::Pe => Ok(PeObject::parse(&view)?.symstore_id()),
        FileFormat::Unknown => Err(IdentErrorKind::UnknownFileFormat.into()),
    }
}

/// Derives the symbol store identifier for the PDB file at the given path.
pub fn identify_pdb<P: AsRef<Path>>(path: P) -> Result<String, IdentError> {
    let view = ByteView::open(path)?;
    Ok(PdbObject::parse(&view)?.symstore_id())
}

/// Derives the symbol store identifier for the PE image at the given path.
pub fn identify_pe<P: AsRef<Path>>(path: P) -> Result<String, IdentError> {
    let view = ByteView::open(path)?;
    Ok(PeObject::parse(&view)?.symstore_id())
}
