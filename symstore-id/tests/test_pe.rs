use std::io::Write;

use similar_asserts::assert_eq;

use symstore_id::{identify, identify_pe, IdentErrorKind, PeObject};

const PE_OFFSET: usize = 0x80;
const PE32_MAGIC: u16 = 0x010b;
const PE64_MAGIC: u16 = 0x020b;

fn put_u32(data: &mut [u8], offset: usize, value: u32) {
    data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

/// Builds a minimal PE image: DOS header pointing at a PE header with the
/// given optional header magic, timestamp and image size.
fn build_pe(magic: u16, timestamp: u32, size_of_image: u32) -> Vec<u8> {
    let mut data = vec![0u8; PE_OFFSET + 0x100];
    data[0] = b'M';
    data[1] = b'Z';
    put_u32(&mut data, 60, PE_OFFSET as u32);

    data[PE_OFFSET..PE_OFFSET + 4].copy_from_slice(b"PE\0\0");
    put_u32(&mut data, PE_OFFSET + 8, timestamp);
    data[PE_OFFSET + 24..PE_OFFSET + 26].copy_from_slice(&magic.to_le_bytes());
    put_u32(&mut data, PE_OFFSET + 80, size_of_image);

    data
}

#[test]
fn test_pe32_identifier() {
    let data = build_pe(PE32_MAGIC, 0x5eb8_1a2c, 0x0002_1000);
    let pe = PeObject::parse(&data).unwrap();

    assert_eq!(pe.symstore_id(), "5EB81A2C21000");
    assert_eq!(pe.timestamp(), 0x5eb8_1a2c);
    assert_eq!(pe.size_of_image(), 0x0002_1000);
}

#[test]
fn test_pe64_identifier() {
    let data = build_pe(PE64_MAGIC, 0x3d28_d3d9, 0x0019_b000);
    let pe = PeObject::parse(&data).unwrap();
    assert_eq!(pe.symstore_id(), "3D28D3D919b000");
}

#[test]
fn test_timestamp_displays_big_endian() {
    // Stored on disk as 2c 1a b8 5e, printed most-significant byte first.
    let data = build_pe(PE32_MAGIC, u32::from_le_bytes([0x2c, 0x1a, 0xb8, 0x5e]), 1);
    let pe = PeObject::parse(&data).unwrap();
    assert_eq!(pe.symstore_id(), "5EB81A2C1");
}

#[test]
fn test_size_zero_renders_single_digit() {
    let data = build_pe(PE32_MAGIC, 1, 0);
    let pe = PeObject::parse(&data).unwrap();
    assert_eq!(pe.symstore_id(), "000000010");
}

#[test]
fn test_unsupported_optional_header() {
    // 0x0107 is the ROM image magic, which symbol stores do not cover.
    let data = build_pe(0x0107, 0x5eb8_1a2c, 0x0002_1000);
    assert_eq!(
        PeObject::parse(&data).unwrap_err().kind(),
        IdentErrorKind::UnsupportedImage
    );
}

#[test]
fn test_not_mz_prefixed() {
    let mut data = build_pe(PE32_MAGIC, 1, 1);
    data[0] = b'E';
    assert_eq!(
        PeObject::parse(&data).unwrap_err().kind(),
        IdentErrorKind::NotAPe
    );
}

#[test]
fn test_bad_pe_signature() {
    let mut data = build_pe(PE32_MAGIC, 1, 1);
    data[PE_OFFSET + 1] = b'F';
    assert_eq!(
        PeObject::parse(&data).unwrap_err().kind(),
        IdentErrorKind::NotAPe
    );
}

#[test]
fn test_pe_header_past_end_of_file() {
    let mut data = build_pe(PE32_MAGIC, 1, 1);
    put_u32(&mut data, 60, 0x10_0000);
    assert_eq!(
        PeObject::parse(&data).unwrap_err().kind(),
        IdentErrorKind::TruncatedFile
    );
}

#[test]
fn test_truncated_optional_header() {
    let data = build_pe(PE32_MAGIC, 1, 1);
    assert_eq!(
        PeObject::parse(&data[..PE_OFFSET + 30]).unwrap_err().kind(),
        IdentErrorKind::TruncatedFile
    );
}

#[test]
fn test_decode_is_idempotent() {
    let data = build_pe(PE64_MAGIC, 0x1234_5678, 0x9a000);
    let first = PeObject::parse(&data).unwrap().symstore_id();
    let second = PeObject::parse(&data).unwrap().symstore_id();
    assert_eq!(first, second);
}

#[test]
fn test_identify_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&build_pe(PE32_MAGIC, 0x5eb8_1a2c, 0x0002_1000))
        .unwrap();

    assert_eq!(identify(file.path()).unwrap(), "5EB81A2C21000");
    assert_eq!(identify_pe(file.path()).unwrap(), "5EB81A2C21000");
}
