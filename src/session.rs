//! Viewing session over a frame stack.
//!
//! Everything a frame viewer mutates while the user scrubs lives here, in
//! one explicit struct: the current index, the summing toggle, the working
//! image, the display levels and the hot-pixel cache. The widgets around it
//! stay stateless consumers.

use std::path::Path;

use ndarray::Array2;
use serde::Serialize;

use crate::{
    error::FrameError,
    frame,
    stack::{FrameStack, StackError},
};

type Result<T> = std::result::Result<T, StackError>;

/// Lower display level.
pub const LEVEL_FLOOR: f64 = -1.;
/// The upper display level sits this far above the median.
pub const THRESHOLD_GAIN: f64 = 15.;

/// A pixel at or above the display threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HotPixel {
    pub row: usize,
    pub col: usize,
    pub value: i64,
}

/// Mutable state of one viewing session.
pub struct Session {
    stack: FrameStack,
    index: usize,
    summing: bool,
    image: Array2<i64>,
    value_threshold: f64,
    cursor: (usize, usize),
    // hot pixels of (generation, level), recomputed when either moves
    spots: Vec<HotPixel>,
    spots_key: Option<(u64, u64)>,
    generation: u64,
}

impl Session {
    /// Open a session on the stack's first frame.
    pub fn new(stack: FrameStack) -> Result<Self> {
        let image = stack.frame(0)?.to_i64();
        let value_threshold = threshold_of(&image);
        Ok(Self {
            stack,
            index: 0,
            summing: false,
            image,
            value_threshold,
            cursor: (0, 0),
            spots: Vec::new(),
            spots_key: None,
            generation: 0,
        })
    }

    pub fn stack(&self) -> &FrameStack {
        &self.stack
    }

    pub fn len(&self) -> usize {
        self.stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn summing(&self) -> bool {
        self.summing
    }

    /// The current display image, widened.
    pub fn image(&self) -> &Array2<i64> {
        &self.image
    }

    /// `max(median, 1) x 15`, the auto-level heuristic.
    pub fn value_threshold(&self) -> f64 {
        self.value_threshold
    }

    /// Display range for a histogram/LUT widget.
    pub fn levels(&self) -> (f64, f64) {
        (LEVEL_FLOOR, self.value_threshold)
    }

    /// Move to frame `index` (clamped to the stack) and re-read it.
    ///
    /// Summing mode accumulates the frame onto the working image and tracks
    /// the threshold; otherwise the frame replaces the image and the
    /// threshold keeps its opening value. Frames only sum over a matching
    /// shape: a stack that changes geometry mid-way fails with
    /// [`StackError::ShapeMismatch`], leaving the session as it was.
    pub fn goto(&mut self, index: usize) -> Result<&Array2<i64>> {
        let index = index.min(self.stack.len().saturating_sub(1));
        let frame = self.stack.frame(index)?.to_i64();
        if self.summing && frame.dim() != self.image.dim() {
            return Err(StackError::ShapeMismatch {
                index,
                expected: self.image.dim(),
                got: frame.dim(),
            });
        }
        self.index = index;
        if self.summing {
            self.image += &frame;
            self.value_threshold = threshold_of(&self.image);
        } else {
            self.image = frame;
        }
        self.generation += 1;
        Ok(&self.image)
    }

    /// Step forward; a no-op on the last frame.
    pub fn next(&mut self) -> Result<&Array2<i64>> {
        if self.index + 1 < self.stack.len() {
            self.goto(self.index + 1)
        } else {
            Ok(&self.image)
        }
    }

    /// Step backward; a no-op on the first frame.
    pub fn prev(&mut self) -> Result<&Array2<i64>> {
        if self.index > 0 {
            self.goto(self.index - 1)
        } else {
            Ok(&self.image)
        }
    }

    /// Flip summing mode, returns the new state.
    pub fn toggle_summing(&mut self) -> bool {
        self.summing = !self.summing;
        self.summing
    }

    /// Park the cursor, clamped to the image bounds. `x` is the column.
    pub fn cursor_at(&mut self, x: usize, y: usize) {
        let (rows, cols) = self.image.dim();
        self.cursor = (x.min(cols.saturating_sub(1)), y.min(rows.saturating_sub(1)));
    }

    pub fn cursor_value(&self) -> i64 {
        let (x, y) = self.cursor;
        self.image.get((y, x)).copied().unwrap_or(0)
    }

    /// Label text: frame counter, cursor position, pixel value.
    pub fn status_line(&self) -> String {
        let (x, y) = self.cursor;
        format!(
            "{:>4}/{} {:>4}x{:<4}: {}",
            self.index + 1,
            self.stack.len(),
            x,
            y,
            self.cursor_value()
        )
    }

    /// Pixels at or above `max(value_threshold, upper_level)`, row-major.
    ///
    /// Cached: recomputed only when the image or the level changed since the
    /// last call.
    pub fn hot_pixels(&mut self, upper_level: f64) -> &[HotPixel] {
        let key = (self.generation, upper_level.to_bits());
        if self.spots_key != Some(key) {
            let threshold = self.value_threshold.max(upper_level);
            self.spots = self
                .image
                .indexed_iter()
                .filter(|&(_, &value)| value as f64 >= threshold)
                .map(|((row, col), &value)| HotPixel { row, col, value })
                .collect();
            self.spots_key = Some(key);
        }
        &self.spots
    }

    /// Save the display image as 2D `.npy`.
    pub fn write_npy<P: AsRef<Path>>(&self, path: P) -> std::result::Result<(), FrameError> {
        frame::write_npy_i64(&self.image, path.as_ref())
    }

    /// Print out a session summary.
    pub fn summary(&mut self) {
        let (rows, cols) = self.image.dim();
        let (lo, hi) = self.levels();
        println!("SUMMARY:");
        println!(" - # of frames: {}", self.stack.len());
        println!(" - format: {}", self.stack.format());
        println!(
            " - frame {:>4}/{}: {:?}",
            self.index + 1,
            self.stack.len(),
            self.stack
                .path(self.index)
                .and_then(Path::file_name)
                .unwrap_or_default()
        );
        println!(" - shape: {}x{}", rows, cols);
        println!(" - summing: {}", if self.summing { "on" } else { "off" });
        let values: Vec<i64> = self.image.iter().copied().collect();
        if let (Some(min), Some(max)) = (
            self.image.iter().min().copied(),
            self.image.iter().max().copied(),
        ) {
            let mean = values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64;
            println!(
                " - pixel range: [{}-{}], mean: {:.3}, median: {:.1}",
                min,
                max,
                mean,
                frame::median_i64(values)
            );
        }
        println!(" - levels: [{:.1}-{:.1}]", lo, hi);
        println!(
            " - # of hot pixels: {}",
            self.hot_pixels(self.value_threshold).len()
        );
    }
}

fn threshold_of(image: &Array2<i64>) -> f64 {
    frame::median_i64(image.iter().copied().collect()).max(1.) * THRESHOLD_GAIN
}

#[cfg(test)]
mod tests {
    use crate::{stack::StackLoader, testing};

    use super::*;

    fn session(dir: &Path, payloads: &[[u8; 4]]) -> Session {
        testing::sfrm_stack(dir, payloads);
        let stack = StackLoader::default()
            .seed(dir.join("frame_0001.sfrm"))
            .load()
            .unwrap();
        Session::new(stack).unwrap()
    }

    #[test]
    fn opens_on_the_first_frame() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path(), &[[1, 2, 3, 4], [10, 20, 30, 40]]);
        assert_eq!(session.index(), 0);
        assert_eq!(session.len(), 2);
        assert_eq!(
            session.image().iter().copied().collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn threshold_and_levels() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path(), &[[1, 2, 3, 4]]);
        // median of 1 2 3 4 is 2.5
        assert_eq!(session.value_threshold(), 2.5 * 15.);
        assert_eq!(session.levels(), (-1., 37.5));
    }

    #[test]
    fn threshold_floor_is_one() {
        let dir = tempfile::tempdir().unwrap();
        let session = session(dir.path(), &[[0, 0, 0, 9]]);
        // median 0 is lifted to 1
        assert_eq!(session.value_threshold(), 15.);
    }

    #[test]
    fn scrubbing_replaces_the_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path(), &[[1, 2, 3, 4], [10, 20, 30, 40]]);
        session.goto(1).unwrap();
        assert_eq!(session.index(), 1);
        assert_eq!(
            session.image().iter().copied().collect::<Vec<_>>(),
            vec![10, 20, 30, 40]
        );
        // threshold stays at its opening value while not summing
        assert_eq!(session.value_threshold(), 2.5 * 15.);
    }

    #[test]
    fn summing_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path(), &[[1, 2, 3, 4], [10, 20, 30, 40]]);
        assert!(session.toggle_summing());
        session.goto(1).unwrap();
        assert_eq!(
            session.image().iter().copied().collect::<Vec<_>>(),
            vec![11, 22, 33, 44]
        );
        // median of 11 22 33 44 is 27.5
        assert_eq!(session.value_threshold(), 27.5 * 15.);
    }

    #[test]
    fn summing_rejects_a_shape_change() {
        // .sfrm geometry is per-file, a folder can mix shapes
        let dir = tempfile::tempdir().unwrap();
        testing::write_frame(
            dir.path(),
            "frame_0001.sfrm",
            &testing::sfrm_bytes_u8(2, 2, "0 0 0", &[1, 2, 3, 4], &[], &[]),
        );
        testing::write_frame(
            dir.path(),
            "frame_0002.sfrm",
            &testing::sfrm_bytes_u8(1, 4, "0 0 0", &[5, 6, 7, 8], &[], &[]),
        );
        let stack = StackLoader::default()
            .seed(dir.path().join("frame_0001.sfrm"))
            .load()
            .unwrap();
        let mut session = Session::new(stack).unwrap();

        // scrubbing replaces the image wholesale, shape changes are fine
        session.goto(1).unwrap();
        assert_eq!(session.image().dim(), (1, 4));

        session.goto(0).unwrap();
        session.toggle_summing();
        assert!(matches!(
            session.goto(1).unwrap_err(),
            StackError::ShapeMismatch {
                index: 1,
                expected: (2, 2),
                got: (1, 4),
            }
        ));
        // the failed step leaves the session where it was
        assert_eq!(session.index(), 0);
        assert_eq!(
            session.image().iter().copied().collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn navigation_clamps_at_the_ends() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path(), &[[1, 1, 1, 1], [2, 2, 2, 2]]);
        session.prev().unwrap();
        assert_eq!(session.index(), 0);
        session.next().unwrap();
        session.next().unwrap();
        assert_eq!(session.index(), 1);
        session.goto(99).unwrap();
        assert_eq!(session.index(), 1);
    }

    #[test]
    fn cursor_and_status_line() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path(), &[[1, 2, 3, 4]]);
        session.cursor_at(1, 1);
        assert_eq!(session.cursor_value(), 4);
        assert_eq!(session.status_line(), "   1/1    1x1   : 4");
        // clamped
        session.cursor_at(10, 10);
        assert_eq!(session.cursor_value(), 4);
    }

    #[test]
    fn hot_pixels_and_their_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path(), &[[0, 0, 0, 200]]);
        // threshold 15, only the 200 clears it
        let spots = session.hot_pixels(0.).to_vec();
        assert_eq!(
            spots,
            vec![HotPixel {
                row: 1,
                col: 1,
                value: 200
            }]
        );
        // raising the level above 200 empties the list
        assert!(session.hot_pixels(201.).is_empty());
        // and dropping it back recomputes
        assert_eq!(session.hot_pixels(0.).len(), 1);
    }

    #[test]
    fn hot_pixels_follow_navigation() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path(), &[[0, 0, 0, 200], [0, 0, 0, 0]]);
        assert_eq!(session.hot_pixels(0.).len(), 1);
        session.goto(1).unwrap();
        assert!(session.hot_pixels(0.).is_empty());
    }

    #[test]
    fn npy_export_of_the_display_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(dir.path(), &[[1, 2, 3, 4], [10, 20, 30, 40]]);
        session.toggle_summing();
        session.goto(1).unwrap();
        let path = dir.path().join("sum.npy");
        session.write_npy(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let npy = npyz::NpyFile::new(&bytes[..]).unwrap();
        assert_eq!(npy.shape(), &[2, 2]);
        assert_eq!(npy.into_vec::<i64>().unwrap(), vec![11, 22, 33, 44]);
    }
}
