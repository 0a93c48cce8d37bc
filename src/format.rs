//! Detector format dispatch.
//!
//! The format set is closed: three detectors, recognized by file extension
//! alone. There is no content sniffing, an unknown extension is an error the
//! caller has to deal with.

use std::{fmt, path::Path};

use strum_macros::EnumIter;

use crate::{error::FrameError, frame::Frame, pilatus, rayonix, sfrm};

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Format {
    Rayonix,
    Pilatus3X1M,
    BrukerSfrm,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Rayonix => write!(f, "Rayonix"),
            Format::Pilatus3X1M => write!(f, "Pilatus3 X 1M"),
            Format::BrukerSfrm => write!(f, "Bruker"),
        }
    }
}

impl Format {
    /// Match a path's extension, case-insensitively.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, FrameError> {
        let path = path.as_ref();
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .as_deref()
        {
            Some("img") => Ok(Format::Rayonix),
            Some("tif") => Ok(Format::Pilatus3X1M),
            Some("sfrm") => Ok(Format::BrukerSfrm),
            _ => Err(FrameError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// Canonical (lowercase) file extension.
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Rayonix => "img",
            Format::Pilatus3X1M => "tif",
            Format::BrukerSfrm => "sfrm",
        }
    }

    /// Decode one frame with this format's reader.
    pub fn read<P: AsRef<Path>>(&self, path: P) -> Result<Frame, FrameError> {
        match self {
            Format::Rayonix => rayonix::read(path),
            Format::Pilatus3X1M => pilatus::read(path),
            Format::BrukerSfrm => sfrm::read(path),
        }
    }
}

/// Decode the frame at `path`, dispatching on its extension.
pub fn read_image<P: AsRef<Path>>(path: P) -> Result<Frame, FrameError> {
    Format::from_path(&path)?.read(path)
}
