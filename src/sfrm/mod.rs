//! Bruker `.sfrm` frame reader.
//!
//! The format is self-describing: a variable-length ASCII header gives the
//! image geometry and pixel width, then comes the primary payload and two
//! overflow tables. Detectors write compact 8- or 16-bit primary images and
//! move the rare pixels that saturate that range out-of-band: such a pixel
//! holds a sentinel value (255, resp. 65535) and its true value is the next
//! entry of the matching table. Sentinels are replaced in row-major order,
//! 16-bit table first, so a 16-bit entry of 65535 escalates to the 32-bit
//! table.

mod header;
pub use header::{HeaderError, SfrmHeader, SfrmInfo};

use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
    time::Instant,
};

use ndarray::Array2;

use crate::{
    bytes,
    error::FrameError,
    frame::{Frame, PixelData},
};

/// Sentinel marking a pixel whose value lives in the 16-bit overflow table.
pub const OVERFLOW_16: u32 = 255;
/// Sentinel marking a pixel whose value lives in the 32-bit overflow table.
pub const OVERFLOW_32: u32 = 65535;
/// Overflow tables are padded to this many bytes.
const TABLE_PADDING: usize = 16;

/// Read one Bruker frame, returned as unsigned 32-bit after overflow
/// resolution.
pub fn read<P: AsRef<Path>>(path: P) -> Result<Frame, FrameError> {
    let path = path.as_ref();
    log::info!("Loading {:?}...", path);
    let now = Instant::now();
    let file = File::open(path).map_err(|e| FrameError::Io(e, path.to_path_buf()))?;
    let mut reader = BufReader::new(file);

    // HDRBLKS in the first block sizes the complete header
    let mut raw = bytes::read_exact_payload(&mut reader, header::BLOCK_LEN, path)?;
    let blocks = SfrmHeader::parse(&raw)?.blocks()?;
    let tail = (blocks - 1)
        .checked_mul(header::BLOCK_LEN)
        .ok_or(HeaderError::Oversized("HDRBLKS"))?;
    raw.append(&mut bytes::read_exact_payload(&mut reader, tail, path)?);
    let header = SfrmHeader::parse(&raw)?;
    let info = header.info()?;
    log::debug!(
        "{} header records in {} blocks, {:?}",
        header.len(),
        blocks,
        info
    );

    let mut data = read_pixels(&mut reader, &info, path)?;
    let table_16 = read_table_16(&mut reader, info.overflows_16, path)?;
    let table_32 = read_table_32(&mut reader, info.overflows_32, path)?;
    patch_overflows(&mut data, OVERFLOW_16, &table_16)?;
    patch_overflows(&mut data, OVERFLOW_32, &table_32)?;

    log::info!("... loaded in {}ms", now.elapsed().as_millis());
    Ok(Frame {
        data: PixelData::U32(data),
    })
}

/// Primary payload: `rows x cols x bytes_per_pixel` bytes, widened to `u32`.
fn read_pixels<R: Read>(
    reader: &mut R,
    info: &SfrmInfo,
    path: &Path,
) -> Result<Array2<u32>, FrameError> {
    let len = info
        .rows
        .checked_mul(info.cols)
        .and_then(|n| n.checked_mul(info.bytes_per_pixel))
        .ok_or(HeaderError::Oversized("NROWS x NCOLS x NPIXELB"))?;
    let raw = bytes::read_exact_payload(reader, len, path)?;
    let pixels: Vec<u32> = match info.bytes_per_pixel {
        1 => raw.iter().map(|&v| v as u32).collect(),
        2 => bytes::u16_slice_le(&raw).into_iter().map(u32::from).collect(),
        // `SfrmInfo` only lets 1, 2 or 4 through
        _ => bytes::u32_slice_le(&raw),
    };
    Ok(Array2::from_shape_vec((info.rows, info.cols), pixels).unwrap())
}

/// On-disk length of an overflow table: entries rounded up to the padding.
/// `None` when the claimed size has no `usize` representation.
fn padded_len(entries: usize, width: usize) -> Option<usize> {
    entries.checked_mul(width)?.checked_next_multiple_of(TABLE_PADDING)
}

fn read_table_16<R: Read>(
    reader: &mut R,
    entries: usize,
    path: &Path,
) -> Result<Vec<u32>, FrameError> {
    let len = padded_len(entries, 2).ok_or(HeaderError::Oversized("NOVERFL"))?;
    let raw = bytes::read_exact_payload(reader, len, path)?;
    let mut table = bytes::u16_slice_le(&raw);
    trim_trailing_zeros(&mut table);
    Ok(table.into_iter().map(u32::from).collect())
}

fn read_table_32<R: Read>(
    reader: &mut R,
    entries: usize,
    path: &Path,
) -> Result<Vec<u32>, FrameError> {
    let len = padded_len(entries, 4).ok_or(HeaderError::Oversized("NOVERFL"))?;
    let raw = bytes::read_exact_payload(reader, len, path)?;
    let mut table = bytes::u32_slice_le(&raw);
    trim_trailing_zeros(&mut table);
    Ok(table)
}

/// Drop the zero entries the padding appends. Strictly from the end: an
/// interior zero is a table value, not padding.
fn trim_trailing_zeros<T: PartialEq + Default>(table: &mut Vec<T>) {
    while table.last() == Some(&T::default()) {
        table.pop();
    }
}

/// Replace every pixel equal to `sentinel` by the next table entry, in
/// row-major order. The sentinel pixel count must equal the table length,
/// anything else means corrupt overflow data.
fn patch_overflows(
    data: &mut Array2<u32>,
    sentinel: u32,
    table: &[u32],
) -> Result<(), FrameError> {
    let pixels = data.iter().filter(|&&v| v == sentinel).count();
    if pixels != table.len() {
        return Err(FrameError::OverflowMismatch {
            sentinel,
            pixels,
            entries: table.len(),
        });
    }
    for (pixel, &value) in data.iter_mut().filter(|v| **v == sentinel).zip(table) {
        *pixel = value;
    }
    Ok(())
}
