//! Little-endian payload decoding shared by the frame readers.
//!
//! Detector files interleave text headers with raw binary payloads whose
//! sizes are known exactly, either as format constants or computed from
//! header fields. Payloads are read with [`read_exact_payload`] so that a
//! short file fails loudly instead of yielding a partial image.

use std::{io::Read, path::Path};

use crate::error::FrameError;

/// Read exactly `len` bytes or fail with [`FrameError::Truncated`].
///
/// Bytes past `len` are left in the reader: a frame file may carry trailing
/// garbage after its payload. The buffer grows with the bytes actually
/// read, a length claim far beyond the file size fails on `Truncated`
/// rather than on allocation.
pub fn read_exact_payload<R: Read>(
    reader: &mut R,
    len: usize,
    path: &Path,
) -> Result<Vec<u8>, FrameError> {
    let mut buf = Vec::new();
    reader
        .take(len as u64)
        .read_to_end(&mut buf)
        .map_err(|e| FrameError::Io(e, path.to_path_buf()))?;
    if buf.len() < len {
        return Err(FrameError::Truncated {
            path: path.to_path_buf(),
            expected: len,
            got: buf.len(),
        });
    }
    Ok(buf)
}

/// Decode a byte slice as little-endian `i16`.
///
/// The slice length must be a multiple of 2, a ragged tail is a caller bug.
pub fn i16_slice_le(bytes: &[u8]) -> Vec<i16> {
    debug_assert_eq!(bytes.len() % 2, 0);
    bytes
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect()
}

/// Decode a byte slice as little-endian `i32`.
pub fn i32_slice_le(bytes: &[u8]) -> Vec<i32> {
    debug_assert_eq!(bytes.len() % 4, 0);
    bytes
        .chunks_exact(4)
        .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// Decode a byte slice as little-endian `u16`.
pub fn u16_slice_le(bytes: &[u8]) -> Vec<u16> {
    debug_assert_eq!(bytes.len() % 2, 0);
    bytes
        .chunks_exact(2)
        .map(|b| u16::from_le_bytes([b[0], b[1]]))
        .collect()
}

/// Decode a byte slice as little-endian `u32`.
pub fn u32_slice_le(bytes: &[u8]) -> Vec<u32> {
    debug_assert_eq!(bytes.len() % 4, 0);
    bytes
        .chunks_exact(4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}
