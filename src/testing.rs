//! Synthetic frame files for the test suite.

use std::{
    fs,
    path::{Path, PathBuf},
};

/// One 80-character header record in the Bruker layout: 7-character key
/// field, `:`, 72-character value field.
pub(crate) fn sfrm_record(key: &str, value: &str) -> String {
    format!("{:<7}:{:<72}", key, value)
}

/// A header of `blocks` 512-byte blocks, space padded behind the records.
pub(crate) fn sfrm_header(blocks: usize, fields: &[(&str, &str)]) -> Vec<u8> {
    let text: String = fields
        .iter()
        .map(|(key, value)| sfrm_record(key, value))
        .collect();
    let mut raw = text.into_bytes();
    assert!(raw.len() <= blocks * 512);
    raw.resize(blocks * 512, b' ');
    raw
}

pub(crate) fn le_bytes_u16(values: &[u16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub(crate) fn le_bytes_u32(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Zero-pad a table buffer to the on-disk 16-byte granularity.
pub(crate) fn padded(mut table: Vec<u8>) -> Vec<u8> {
    table.resize(table.len().div_ceil(16) * 16, 0);
    table
}

/// A complete `.sfrm` file from header fields, payload bytes and overflow
/// tables. `HDRBLKS` must be among the fields.
pub(crate) fn sfrm_bytes(
    fields: &[(&str, &str)],
    payload: &[u8],
    table_16: &[u16],
    table_32: &[u32],
) -> Vec<u8> {
    let blocks = fields
        .iter()
        .find(|(key, _)| *key == "HDRBLKS")
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or(1);
    let mut raw = sfrm_header(blocks, fields);
    raw.extend_from_slice(payload);
    raw.extend(padded(le_bytes_u16(table_16)));
    raw.extend(padded(le_bytes_u32(table_32)));
    raw
}

/// A single-block 8-bit `.sfrm` file.
pub(crate) fn sfrm_bytes_u8(
    rows: usize,
    cols: usize,
    noverfl: &str,
    payload: &[u8],
    table_16: &[u16],
    table_32: &[u32],
) -> Vec<u8> {
    let nrows = rows.to_string();
    let ncols = cols.to_string();
    sfrm_bytes(
        &[
            ("FORMAT", "100"),
            ("HDRBLKS", "1"),
            ("NROWS", &nrows),
            ("NCOLS", &ncols),
            ("NPIXELB", "1"),
            ("NOVERFL", noverfl),
        ],
        payload,
        table_16,
        table_32,
    )
}

/// A Rayonix `.img` file: zeroed 4096-byte header, little-endian payload.
pub(crate) fn rayonix_bytes(pixels: &[i16]) -> Vec<u8> {
    let mut raw = vec![0u8; 4096];
    raw.extend(pixels.iter().flat_map(|v| v.to_le_bytes()));
    raw
}

/// A Pilatus `.tif` file: zeroed 4096-byte header, little-endian payload.
pub(crate) fn pilatus_bytes(pixels: &[i32]) -> Vec<u8> {
    let mut raw = vec![0u8; 4096];
    raw.extend(pixels.iter().flat_map(|v| v.to_le_bytes()));
    raw
}

pub(crate) fn write_frame(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}

/// A stack of single-block 8-bit 2x2 `.sfrm` files, one per payload.
pub(crate) fn sfrm_stack(dir: &Path, payloads: &[[u8; 4]]) -> Vec<PathBuf> {
    payloads
        .iter()
        .enumerate()
        .map(|(i, payload)| {
            write_frame(
                dir,
                &format!("frame_{:04}.sfrm", i + 1),
                &sfrm_bytes_u8(2, 2, "0 0 0", payload, &[], &[]),
            )
        })
        .collect()
}
