use crate::detection::Detection;
use crate::error::Error;

use ndarray::prelude::*;

/// Capability of an external blob detector.
///
/// The detector owns the pixel-level algorithm. After a successful
/// [`compute_blobs`](BlobDetector::compute_blobs) the blobs of that frame are
/// retrievable by index, each with normalized center and size.
pub trait BlobDetector {
    /// Analyses one frame. `pixels` is laid out as rows x columns.
    fn compute_blobs(&mut self, pixels: ArrayView2<'_, u32>) -> Result<(), Error>;

    fn blob_count(&self) -> usize;

    fn blob(&self, index: usize) -> Option<Detection>;

    fn detections(&self) -> Vec<Detection> {
        (0..self.blob_count())
            .filter_map(|idx| self.blob(idx))
            .collect()
    }
}

impl<D: BlobDetector + ?Sized> BlobDetector for Box<D> {
    #[inline]
    fn compute_blobs(&mut self, pixels: ArrayView2<'_, u32>) -> Result<(), Error> {
        (**self).compute_blobs(pixels)
    }

    #[inline]
    fn blob_count(&self) -> usize {
        (**self).blob_count()
    }

    #[inline]
    fn blob(&self, index: usize) -> Option<Detection> {
        (**self).blob(index)
    }
}
