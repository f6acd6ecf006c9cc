use scroll::{Pread, LE};

use crate::error::{IdentError, IdentErrorKind};

/// Reads a little-endian `u32` at the given file offset.
///
/// Out-of-bounds access converts into [`IdentErrorKind::TruncatedFile`];
/// the buffer is never indexed past its end.
pub(crate) fn read_u32(data: &[u8], offset: u64) -> Result<u32, IdentError> {
    let offset = usize::try_from(offset).map_err(|_| IdentErrorKind::TruncatedFile)?;
    data.pread_with(offset, LE)
        .map_err(|e| IdentError::new(IdentErrorKind::TruncatedFile, e))
}

/// Reads a little-endian `u16` at the given file offset.
pub(crate) fn read_u16(data: &[u8], offset: u64) -> Result<u16, IdentError> {
    let offset = usize::try_from(offset).map_err(|_| IdentErrorKind::TruncatedFile)?;
    data.pread_with(offset, LE)
        .map_err(|e| IdentError::new(IdentErrorKind::TruncatedFile, e))
}
