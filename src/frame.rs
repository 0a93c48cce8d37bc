//! Decoded detector frames.
//!
//! A [`Frame`] is an immutable snapshot of one capture file: a rectangular
//! grid of pixel intensities in the pixel type the detector writes. Readers
//! build one fresh on every call, there is no shared state between reads.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use itertools::{Itertools, MinMaxResult};
use ndarray::Array2;
use npyz::WriterBuilder;

use crate::error::FrameError;

/// Pixel storage, one variant per detector family.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    /// Rayonix, 16-bit signed.
    I16(Array2<i16>),
    /// Pilatus3 X 1M, 32-bit signed.
    I32(Array2<i32>),
    /// Bruker, unsigned after overflow resolution.
    U32(Array2<u32>),
}

/// One decoded 2D pixel-intensity grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub data: PixelData,
}

impl Frame {
    /// (rows, columns)
    pub fn dim(&self) -> (usize, usize) {
        match &self.data {
            PixelData::I16(a) => a.dim(),
            PixelData::I32(a) => a.dim(),
            PixelData::U32(a) => a.dim(),
        }
    }

    /// Number of pixels.
    pub fn len(&self) -> usize {
        let (rows, cols) = self.dim();
        rows * cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the pixel type as stored.
    pub fn dtype(&self) -> &'static str {
        match &self.data {
            PixelData::I16(_) => "i16",
            PixelData::I32(_) => "i32",
            PixelData::U32(_) => "u32",
        }
    }

    /// Single pixel, widened.
    pub fn get(&self, row: usize, col: usize) -> Option<i64> {
        match &self.data {
            PixelData::I16(a) => a.get((row, col)).map(|&v| v as i64),
            PixelData::I32(a) => a.get((row, col)).map(|&v| v as i64),
            PixelData::U32(a) => a.get((row, col)).map(|&v| v as i64),
        }
    }

    /// Widened copy for lossless accumulation over a stack.
    pub fn to_i64(&self) -> Array2<i64> {
        match &self.data {
            PixelData::I16(a) => a.mapv(|v| v as i64),
            PixelData::I32(a) => a.mapv(|v| v as i64),
            PixelData::U32(a) => a.mapv(|v| v as i64),
        }
    }

    /// Smallest and largest pixel value in one pass, `None` on an empty frame.
    pub fn minmax(&self) -> Option<(i64, i64)> {
        let minmax = match &self.data {
            PixelData::I16(a) => a.iter().map(|&v| v as i64).minmax(),
            PixelData::I32(a) => a.iter().map(|&v| v as i64).minmax(),
            PixelData::U32(a) => a.iter().map(|&v| v as i64).minmax(),
        };
        match minmax {
            MinMaxResult::NoElements => None,
            MinMaxResult::OneElement(v) => Some((v, v)),
            MinMaxResult::MinMax(min, max) => Some((min, max)),
        }
    }

    pub fn min(&self) -> Option<i64> {
        self.minmax().map(|(min, _)| min)
    }

    pub fn max(&self) -> Option<i64> {
        self.minmax().map(|(_, max)| max)
    }

    pub fn mean(&self) -> f64 {
        if self.is_empty() {
            return f64::NAN;
        }
        let sum = match &self.data {
            PixelData::I16(a) => a.iter().map(|&v| v as f64).sum::<f64>(),
            PixelData::I32(a) => a.iter().map(|&v| v as f64).sum::<f64>(),
            PixelData::U32(a) => a.iter().map(|&v| v as f64).sum::<f64>(),
        };
        sum / self.len() as f64
    }

    /// Median pixel value, the average of the two middle values for an even
    /// pixel count.
    pub fn median(&self) -> f64 {
        let values = match &self.data {
            PixelData::I16(a) => a.iter().map(|&v| v as i64).collect(),
            PixelData::I32(a) => a.iter().map(|&v| v as i64).collect(),
            PixelData::U32(a) => a.iter().map(|&v| v as i64).collect(),
        };
        median_i64(values)
    }

    /// Save as a 2D `.npy` file in the frame's stored pixel type.
    pub fn write_npy<P: AsRef<Path>>(&self, path: P) -> Result<(), FrameError> {
        let path = path.as_ref();
        let (rows, cols) = self.dim();
        let shape = [rows as u64, cols as u64];
        let file = File::create(path).map_err(|e| FrameError::Io(e, path.to_path_buf()))?;
        let mut out = BufWriter::new(file);
        match &self.data {
            PixelData::I16(a) => write_npy_2d(&mut out, shape, a.iter().copied()),
            PixelData::I32(a) => write_npy_2d(&mut out, shape, a.iter().copied()),
            PixelData::U32(a) => write_npy_2d(&mut out, shape, a.iter().copied()),
        }
        .map_err(|e| FrameError::Io(e, path.to_path_buf()))
    }
}

/// Save a widened image, e.g. a session's summed display, as 2D `.npy`.
pub(crate) fn write_npy_i64(image: &Array2<i64>, path: &Path) -> Result<(), FrameError> {
    let (rows, cols) = image.dim();
    let file = File::create(path).map_err(|e| FrameError::Io(e, path.to_path_buf()))?;
    let mut out = BufWriter::new(file);
    write_npy_2d(&mut out, [rows as u64, cols as u64], image.iter().copied())
        .map_err(|e| FrameError::Io(e, path.to_path_buf()))
}

fn write_npy_2d<T, W>(
    out: &mut W,
    shape: [u64; 2],
    values: impl IntoIterator<Item = T>,
) -> std::io::Result<()>
where
    T: npyz::AutoSerialize,
    W: Write,
{
    let mut writer = npyz::WriteOptions::new()
        .default_dtype()
        .shape(&shape)
        .writer(out)
        .begin_nd()?;
    writer.extend(values)?;
    writer.finish()
}

pub(crate) fn median_i64(mut values: Vec<i64>) -> f64 {
    let n = values.len();
    if n == 0 {
        return f64::NAN;
    }
    let mid = n / 2;
    let (_, &mut hi, _) = values.select_nth_unstable(mid);
    if n % 2 == 1 {
        hi as f64
    } else {
        let (_, &mut lo, _) = values.select_nth_unstable(mid - 1);
        (lo as f64 + hi as f64) / 2.
    }
}
