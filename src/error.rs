use std::path::PathBuf;

use crate::{sfrm::HeaderError, stack::StackError};

/// Errors of the frame decoding layer.
///
/// All of them are terminal for the file in question: there is no retry and
/// no fallback format guessing, the caller decides whether to skip the file
/// or abort the batch.
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error("no reader matches {0:?}, expected a .img, .tif or .sfrm file")]
    UnsupportedFormat(PathBuf),
    #[error("{path:?} is truncated: expected {expected} bytes, read {got}")]
    Truncated {
        path: PathBuf,
        expected: usize,
        got: usize,
    },
    #[error("invalid frame header")]
    Header(#[from] HeaderError),
    #[error("overflow table mismatch: {pixels} pixels at sentinel {sentinel} for {entries} table entries")]
    OverflowMismatch {
        sentinel: u32,
        pixels: usize,
        entries: usize,
    },
    #[error("failed to read {1:?}")]
    Io(#[source] std::io::Error, PathBuf),
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Error in the frame decoder")]
    Frame(#[from] FrameError),
    #[error("Error in the `stack` module")]
    Stack(#[from] StackError),
}

pub type Result<T> = std::result::Result<T, Error>;
