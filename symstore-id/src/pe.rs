//! Support for Portable Executables, an extension of COFF used on Windows.
//!
//! PE images do not carry debug information themselves; it lives in a
//! separate PDB. What a PE image does carry is its code identity: the
//! `TimeDateStamp` field of the COFF header and the `SizeOfImage` field of
//! the optional header, which together form the symbol store identifier
//! under which the image itself is filed.

use std::fmt;

use debugid::CodeId;

use crate::error::{IdentError, IdentErrorKind};
use crate::utils::{read_u16, read_u32};

/// Signature of the legacy DOS header.
const DOS_MAGIC: &[u8] = b"MZ";
/// Offset of `e_lfanew` in the DOS header, the file offset of the PE header.
const PE_POINTER_OFFSET: u64 = 60;
/// Signature of the PE header.
const PE_MAGIC: &[u8] = b"PE\0\0";

/// Offset of the COFF `TimeDateStamp` field, relative to the PE signature.
const TIMESTAMP_OFFSET: u64 = 8;
/// Offset of the optional header, relative to the PE signature.
const OPTIONAL_HEADER_OFFSET: u64 = 24;
/// Optional header magic of a 32-bit image.
const PE32_MAGIC: u16 = 0x010b;
/// Optional header magic of a 64-bit (PE32+) image.
const PE64_MAGIC: u16 = 0x020b;
/// Offset of `SizeOfImage` within the optional header.
///
/// PE32 and PE32+ lay out the leading optional header fields differently,
/// but `SizeOfImage` lands at the same offset in both.
const SIZE_OF_IMAGE_OFFSET: u64 = 56;

/// The code identifier of a PE image.
///
/// Concatenation of the COFF `TimeDateStamp` as eight uppercase hex digits
/// and the optional header's `SizeOfImage` in lowercase hex without
/// padding. Symbol servers expect exactly this mixed-case convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PeCodeId {
    timestamp: u32,
    size_of_image: u32,
}

impl PeCodeId {
    /// Creates a code identifier from its raw header fields.
    pub fn new(timestamp: u32, size_of_image: u32) -> Self {
        Self {
            timestamp,
            size_of_image,
        }
    }

    /// The `TimeDateStamp` field of the COFF header.
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// The `SizeOfImage` field of the optional header.
    pub fn size_of_image(&self) -> u32 {
        self.size_of_image
    }
}

impl fmt::Display for PeCodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The structured portion is uppercase and fixed-width, the
        // trailing counter lowercase and unpadded. Keep the two renderings
        // separate so neither convention drifts into the other.
        write!(f, "{:08X}", self.timestamp)?;
        write!(f, "{:x}", self.size_of_image)
    }
}

impl From<PeCodeId> for CodeId {
    fn from(id: PeCodeId) -> Self {
        CodeId::new(id.to_string())
    }
}

/// Portable Executable, an `.exe` or `.dll` image.
///
/// Decoded just far enough to recover the code identity fields from the
/// COFF and optional headers.
#[derive(Clone, Copy, Debug)]
pub struct PeObject {
    code_id: PeCodeId,
}

impl PeObject {
    /// Tests whether the buffer starts with the DOS signature.
    pub fn test(data: &[u8]) -> bool {
        data.starts_with(DOS_MAGIC)
    }

    /// Parses the code identity out of a PE image buffer.
    ///
    /// Follows `e_lfanew` in the DOS header to the PE header, reads the
    /// COFF timestamp, classifies the optional header as PE32 or PE32+ by
    /// its magic, and reads `SizeOfImage`.
    pub fn parse(data: &[u8]) -> Result<Self, IdentError> {
        if !Self::test(data) {
            return Err(IdentErrorKind::NotAPe.into());
        }

        let pe_offset = read_u32(data, PE_POINTER_OFFSET)? as usize;
        let header = data
            .get(pe_offset..)
            .ok_or(IdentErrorKind::TruncatedFile)?;
        let signature = header
            .get(..PE_MAGIC.len())
            .ok_or(IdentErrorKind::TruncatedFile)?;
        if signature != PE_MAGIC {
            return Err(IdentErrorKind::NotAPe.into());
        }

        let timestamp = read_u32(header, TIMESTAMP_OFFSET)?;

        match read_u16(header, OPTIONAL_HEADER_OFFSET)? {
            PE32_MAGIC | PE64_MAGIC => (),
            _ => return Err(IdentErrorKind::UnsupportedImage.into()),
        }

        let size_of_image =
            read_u32(header, OPTIONAL_HEADER_OFFSET + SIZE_OF_IMAGE_OFFSET)?;

        Ok(PeObject {
            code_id: PeCodeId::new(timestamp, size_of_image),
        })
    }

    /// The `TimeDateStamp` field of the COFF header.
    pub fn timestamp(&self) -> u32 {
        self.code_id.timestamp()
    }

    /// The `SizeOfImage` field of the optional header.
    pub fn size_of_image(&self) -> u32 {
        self.code_id.size_of_image()
    }

    /// The code identifier of this image.
    pub fn code_id(&self) -> PeCodeId {
        self.code_id
    }

    /// The symbol store identifier of this image.
    pub fn symstore_id(&self) -> String {
        self.code_id.to_string()
    }
}
