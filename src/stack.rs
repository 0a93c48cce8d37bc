//! Frame stack discovery.
//!
//! A measurement writes one file per frame into a single folder. A stack is
//! derived from any one of those files: every sibling with the seed's
//! extension, lexicographically sorted. Decoding stays per-call, the stack
//! only holds paths.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::{error::FrameError, format::Format, frame::Frame};

type Result<T> = std::result::Result<T, StackError>;

#[derive(thiserror::Error, Debug)]
pub enum StackError {
    #[error("cannot derive a stack from {0:?}: no file extension")]
    NoExtension(PathBuf),
    #[error("invalid stack pattern")]
    Pattern(#[from] glob::PatternError),
    #[error("failed to list frame files")]
    Glob(#[from] glob::GlobError),
    #[error("invalid name filter")]
    Filter(#[from] regex::Error),
    #[error("no frames found in {0:?}")]
    Empty(PathBuf),
    #[error("frame index {index} out of range (stack holds {len})")]
    OutOfRange { index: usize, len: usize },
    #[error("cannot sum frame {index}: shape {got:?} differs from {expected:?}")]
    ShapeMismatch {
        index: usize,
        expected: (usize, usize),
        got: (usize, usize),
    },
    #[error("frame decoding failed")]
    Frame(#[from] FrameError),
}

/// [`FrameStack`] builder.
///
/// ```no_run
/// # fn main() -> Result<(), parse_frames::StackError> {
/// use parse_frames::StackLoader;
///
/// let stack = StackLoader::default()
///     .seed("data/rubrene_21_data_00_0001.sfrm")
///     .name_filter(r"_data_")
///     .load()?;
/// # Ok(())
/// # }
/// ```
pub struct StackLoader {
    seed: PathBuf,
    name_filter: Option<String>,
}

impl Default for StackLoader {
    fn default() -> Self {
        Self {
            seed: PathBuf::from("frame_0001.sfrm"),
            name_filter: None,
        }
    }
}

impl StackLoader {
    /// Any frame of the stack; its folder and extension define the stack.
    pub fn seed<P: AsRef<Path>>(self, seed: P) -> Self {
        Self {
            seed: seed.as_ref().to_path_buf(),
            ..self
        }
    }

    /// Regular expression applied to the file stems.
    pub fn name_filter<S: Into<String>>(self, name_filter: S) -> Self {
        Self {
            name_filter: Some(name_filter.into()),
            ..self
        }
    }

    pub fn load(self) -> Result<FrameStack> {
        let ext = match self.seed.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => ext,
            None => return Err(StackError::NoExtension(self.seed.clone())),
        };
        let format = Format::from_path(&self.seed)?;
        let dir = self.seed.parent().unwrap_or_else(|| Path::new(""));
        // sibling frames keep the seed's extension spelling
        let pattern = dir.join(format!("*.{}", ext));
        let mut paths = glob::glob(&pattern.to_string_lossy())?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if let Some(filter) = &self.name_filter {
            let re = Regex::new(filter)?;
            paths.retain(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(|stem| re.is_match(stem))
                    .unwrap_or(false)
            });
        }
        paths.sort();
        if paths.is_empty() {
            return Err(StackError::Empty(dir.to_path_buf()));
        }
        log::info!("{} {} frames in {:?}", paths.len(), format, dir);
        Ok(FrameStack { format, paths })
    }
}

/// An ordered list of frame files sharing one folder and one format.
///
/// Never empty: [`StackLoader::load`] fails instead of returning an empty
/// stack.
#[derive(Debug, Clone)]
pub struct FrameStack {
    format: Format,
    paths: Vec<PathBuf>,
}

impl FrameStack {
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    pub fn path(&self, index: usize) -> Option<&Path> {
        self.paths.get(index).map(PathBuf::as_path)
    }

    /// Index of a frame file in the stack.
    pub fn position<P: AsRef<Path>>(&self, path: P) -> Option<usize> {
        self.paths.iter().position(|p| p == path.as_ref())
    }

    /// Decode the frame at `index`. Every call reads the file afresh.
    pub fn frame(&self, index: usize) -> Result<Frame> {
        let path = self.paths.get(index).ok_or(StackError::OutOfRange {
            index,
            len: self.paths.len(),
        })?;
        Ok(self.format.read(path)?)
    }
}
