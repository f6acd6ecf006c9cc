//! Support for the Multi-Stream File container used by PDB debug files.
//!
//! An MSF file is divided into fixed-size pages. Logical streams are
//! scattered over possibly non-contiguous pages; the root directory stream
//! records the size and page list of every stream. Stream 1 conventionally
//! holds the PDB identity information (GUID and age), which is all this
//! module extracts.

use debugid::DebugId;
use uuid::Uuid;

use crate::error::{IdentError, IdentErrorKind};
use crate::utils::read_u32;

/// Signature of a version 7.00 MSF file.
const MSF_MAGIC: &[u8] = b"Microsoft C/C++ MSF 7.00\r\n\x1a\x44\x53\x00\x00\x00";

/// Size of the superblock, the signature plus six `u32` fields.
const MSF_SUPERBLOCK_SIZE: usize = 56;

const PAGE_SIZE_OFFSET: u64 = 32;
const FREE_PAGE_MAP_OFFSET: u64 = 36;
const PAGE_COUNT_OFFSET: u64 = 40;
const DIRECTORY_SIZE_OFFSET: u64 = 44;
const RESERVED_OFFSET: u64 = 48;
const DIRECTORY_PAGE_LIST_OFFSET: u64 = 52;

/// Offset of the age counter within the PDB info stream.
const INFO_AGE_OFFSET: u64 = 8;
/// Offset of the little-endian GUID within the PDB info stream.
const INFO_GUID_OFFSET: u64 = 12;

/// The fixed structure at offset 0 of every MSF file.
struct MsfSuperblock {
    /// Size of a page in bytes, typically 512 to 4096.
    page_size: u32,
    /// Page number of the free page map.
    _free_page_map: u32,
    /// Total number of pages in the file.
    _page_count: u32,
    /// Size of the root directory stream in bytes.
    directory_size: u32,
    /// Reserved field, read but never validated.
    _reserved: u32,
    /// Page holding the page numbers of the root directory stream.
    directory_page_list_page: u32,
}

impl MsfSuperblock {
    fn parse(data: &[u8]) -> Result<Self, IdentError> {
        if data.len() < MSF_SUPERBLOCK_SIZE {
            return Err(IdentErrorKind::TruncatedFile.into());
        }

        Ok(MsfSuperblock {
            page_size: read_u32(data, PAGE_SIZE_OFFSET)?,
            _free_page_map: read_u32(data, FREE_PAGE_MAP_OFFSET)?,
            _page_count: read_u32(data, PAGE_COUNT_OFFSET)?,
            directory_size: read_u32(data, DIRECTORY_SIZE_OFFSET)?,
            _reserved: read_u32(data, RESERVED_OFFSET)?,
            directory_page_list_page: read_u32(data, DIRECTORY_PAGE_LIST_OFFSET)?,
        })
    }
}

/// Program Database, the debug companion format on Windows.
///
/// Decoded just far enough to recover the identity of the PDB: the GUID
/// and age stored in stream 1. The pair forms the symbol store identifier
/// that debuggers use to locate this file on a symbol server.
#[derive(Clone, Copy, Debug)]
pub struct PdbObject {
    debug_id: DebugId,
}

impl PdbObject {
    /// Tests whether the buffer starts with the MSF signature.
    pub fn test(data: &[u8]) -> bool {
        data.starts_with(MSF_MAGIC)
    }

    /// Parses the identity information out of an MSF buffer.
    ///
    /// This walks the page indirection of the container: the superblock
    /// points at the page list of the root directory stream, the root
    /// directory records the page list of every stream, and stream 1's
    /// first page holds the PDB info header with GUID and age.
    pub fn parse(data: &[u8]) -> Result<Self, IdentError> {
        if !Self::test(data) {
            return Err(IdentErrorKind::NotAPdb.into());
        }

        let superblock = MsfSuperblock::parse(data)?;
        if superblock.page_size == 0 {
            return Err(IdentErrorKind::MalformedInput.into());
        }

        let page_size = u64::from(superblock.page_size);

        // The root directory spans one or more pages; their page numbers
        // sit on a single dedicated page referenced by the superblock, so
        // the list can hold at most a page worth of entries.
        let directory_page_count = superblock
            .directory_size
            .div_ceil(superblock.page_size);
        if directory_page_count == 0 || directory_page_count > superblock.page_size / 4 {
            return Err(IdentErrorKind::MalformedInput.into());
        }

        let page_list_offset = u64::from(superblock.directory_page_list_page) * page_size;
        let mut directory_pages = Vec::with_capacity(directory_page_count as usize);
        for idx in 0..u64::from(directory_page_count) {
            let page = read_u32(data, page_list_offset + idx * 4)?;
            directory_pages.push(u64::from(page) * page_size);
        }

        // The directory starts with the stream count and one size field
        // per stream, followed by the concatenated page lists.
        let first_page = directory_pages[0];
        let stream_count = read_u32(data, first_page)?;
        if stream_count < 2 {
            return Err(IdentErrorKind::MalformedInput.into());
        }
        let stream0_size = read_u32(data, first_page + 4)?;
        // Unused, but documents the layout: the size of the info stream.
        let _stream1_size = read_u32(data, first_page + 8)?;

        // Offset of stream 1's first page number within the flattened
        // directory: behind the count, the size table, and stream 0's page
        // list. This may fall past the first directory page.
        let pointer_offset = 4
            + 4 * u64::from(stream_count)
            + 4 * u64::from(stream0_size.div_ceil(superblock.page_size));
        let page_index = (pointer_offset / page_size) as usize;
        let pointer_page = directory_pages
            .get(page_index)
            .copied()
            .ok_or(IdentErrorKind::MalformedInput)?;

        let info_page = read_u32(data, pointer_page + pointer_offset % page_size)?;
        let info_offset = u64::from(info_page) * page_size;

        // The info stream stores the age at offset 8 and the GUID in
        // little-endian field order at offset 12. The version field ahead
        // of them is not validated.
        let age = read_u32(data, info_offset + INFO_AGE_OFFSET)?;
        let guid_offset = usize::try_from(info_offset + INFO_GUID_OFFSET)
            .map_err(|_| IdentErrorKind::TruncatedFile)?;
        let guid: [u8; 16] = data
            .get(guid_offset..guid_offset + 16)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(IdentErrorKind::TruncatedFile)?;

        // Converts the little-endian stored fields into canonical display
        // order: the first three GUID fields reverse, the rest stays.
        let uuid = Uuid::from_bytes_le(guid);

        Ok(PdbObject {
            debug_id: DebugId::from_parts(uuid, age),
        })
    }

    /// The debug identifier of this PDB, the GUID and age pair.
    pub fn debug_id(&self) -> DebugId {
        self.debug_id
    }

    /// The age counter, bumped on every rebuild of the PDB.
    pub fn age(&self) -> u32 {
        self.debug_id.appendix()
    }

    /// The symbol store identifier of this PDB.
    ///
    /// Renders the GUID as 32 uppercase hex digits immediately followed by
    /// the age in lowercase hex without padding.
    pub fn symstore_id(&self) -> String {
        self.debug_id.breakpad().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magic_must_match_exactly() {
        let mut data = MSF_MAGIC.to_vec();
        data.resize(256, 0);
        assert!(PdbObject::test(&data));

        data[24] = b'8';
        assert!(!PdbObject::test(&data));
        assert_eq!(
            PdbObject::parse(&data).unwrap_err().kind(),
            IdentErrorKind::NotAPdb
        );
    }

    #[test]
    fn test_short_buffer_is_not_a_pdb() {
        assert_eq!(
            PdbObject::parse(&MSF_MAGIC[..16]).unwrap_err().kind(),
            IdentErrorKind::NotAPdb
        );
    }

    #[test]
    fn test_zero_page_size() {
        let mut data = MSF_MAGIC.to_vec();
        data.resize(256, 0);
        assert_eq!(
            PdbObject::parse(&data).unwrap_err().kind(),
            IdentErrorKind::MalformedInput
        );
    }
}
