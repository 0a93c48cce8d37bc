//! Pilatus3 X 1M frame reader.
//!
//! The files carry a `.tif` extension but are read as raw fixed-geometry
//! payloads behind a 4096-byte header, there is no TIFF directory parsing.

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
pub const ROWS: usize = 1043;
pub const COLS: usize = 981;
/// Exact payload size: ROWS x COLS x 4.
pub const PAYLOAD_LEN: usize = 4_092_732;

/// Read one Pilatus3 X 1M frame: 1043x981 little-endian `i32`, row-major.
pub fn read<P: AsRef<Path>>(path: P) -> Result<Frame, FrameError> {
    let path = path.as_ref();
    log::info!("Loading {:?}...", path);
    let now = Instant::now();
    let file = File::open(path).map_err(|e| FrameError::Io(e, path.to_path_buf()))?;
    let mut reader = BufReader::new(file);
    reader
        .seek(SeekFrom::Start(HEADER_LEN))
        .map_err(|e| FrameError::Io(e, path.to_path_buf()))?;
    let raw = bytes::read_exact_payload(&mut reader, PAYLOAD_LEN, path)?;
    let data = Array2::from_shape_vec((ROWS, COLS), bytes::i32_slice_le(&raw)).unwrap();
    log::info!("... loaded in {}ms", now.elapsed().as_millis());
    Ok(Frame {
        data: PixelData::I32(data),
    })
}
