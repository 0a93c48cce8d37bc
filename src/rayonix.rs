//! Rayonix `.img` frame reader.
//!
//! The 4096-byte header is skipped, the detector geometry is fixed.

use std::{
    fs::File,
    io::{BufReader, Seek, SeekFrom},
    path::Path,
    time::Instant,
};

use ndarray::Array2;

use crate::{
    bytes,
    error::FrameError,
    frame::{Frame, PixelData},
};

/// Header length in bytes, never parsed.
pub const HEADER_LEN: u64 = 4096;
/// Fixed detector geometry.
pub const ROWS: usize = 1920;
pub const COLS: usize = 1920;

/// Read one Rayonix frame: 1920x1920 little-endian `i16`, row-major.
pub fn read<P: AsRef<Path>>(path: P) -> Result<Frame, FrameError> {
    let path = path.as_ref();
    log::info!("Loading {:?}...", path);
    let now = Instant::now();
    let file = File::open(path).map_err(|e| FrameError::Io(e, path.to_path_buf()))?;
    let mut reader = BufReader::new(file);
    reader
        .seek(SeekFrom::Start(HEADER_LEN))
        .map_err(|e| FrameError::Io(e, path.to_path_buf()))?;
    let raw = bytes::read_exact_payload(&mut reader, ROWS * COLS * 2, path)?;
    let data = Array2::from_shape_vec((ROWS, COLS), bytes::i16_slice_le(&raw)).unwrap();
    log::info!("... loaded in {}ms", now.elapsed().as_millis());
    Ok(Frame {
        data: PixelData::I16(data),
    })
}
