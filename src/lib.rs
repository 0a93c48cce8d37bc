//! Readers for the 2D X-ray detector frames around a diffraction beamline:
//! Rayonix `.img`, Pilatus3 X 1M `.tif` and Bruker `.sfrm` images, plus the
//! stack/session layer a frame viewer sits on.
//!
//! A single frame comes back as a typed [`Frame`]:
//! ```no_run
//! # fn main() -> parse_frames::Result<()> {
//! let frame = parse_frames::read_image("run7/frame_0001.sfrm")?;
//! let (rows, cols) = frame.dim();
//! # Ok(())
//! # }
//! ```
//!
//! A directory of like frames loads into a [`FrameStack`] through
//! [`StackLoader`], and [`Session`] drives scrubbing, frame summing and
//! hot-pixel picking over it.

pub mod bytes;
pub mod error;
pub mod format;
pub mod frame;
pub mod pilatus;
pub mod rayonix;
pub mod session;
pub mod sfrm;
pub mod stack;
#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, FrameError, Result};
pub use format::{read_image, Format};
pub use frame::{Frame, PixelData};
pub use session::{HotPixel, Session};
pub use stack::{FrameStack, StackError, StackLoader};
