use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

/// Contains (x,y) of the center and (width,height) of a blob, all normalized to
/// the frame size, so every component is expected to lie in `0..=1`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Detection {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Detection {
    #[inline]
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline(always)]
    pub fn center(&self) -> na::Point2<f32> {
        na::Point2::new(self.x, self.y)
    }

    /// Euclidean distance between the two centers; size is ignored.
    #[inline]
    pub fn distance(&self, other: &Detection) -> f32 {
        na::distance(&self.center(), &other.center())
    }

    /// Moves every component towards `next` by `factor`:
    /// `next * factor + self * (1 - factor)`.
    #[inline]
    pub fn blend(&mut self, next: &Detection, factor: f32) {
        let keep = 1.0 - factor;

        self.x = next.x * factor + self.x * keep;
        self.y = next.y * factor + self.y * keep;
        self.w = next.w * factor + self.w * keep;
        self.h = next.h * factor + self.h * keep;
    }

    #[inline(always)]
    pub fn pixel_width(&self, frame_width: u32) -> f32 {
        self.w * frame_width as f32
    }

    #[inline(always)]
    pub fn pixel_height(&self, frame_height: u32) -> f32 {
        self.h * frame_height as f32
    }
}

impl From<[f32; 4]> for Detection {
    #[inline]
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Detection> for [f32; 4] {
    #[inline]
    fn from(d: Detection) -> Self {
        [d.x, d.y, d.w, d.h]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn distance_ignores_size() {
        let a = Detection::new(0.1, 0.1, 0.5, 0.5);
        let b = Detection::new(0.4, 0.5, 0.01, 0.9);

        assert_relative_eq!(a.distance(&b), 0.5, epsilon = 1e-6);
        assert_relative_eq!(b.distance(&a), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn blend_extremes() {
        let prev = Detection::new(0.2, 0.3, 0.1, 0.1);
        let next = Detection::new(0.25, 0.35, 0.2, 0.05);

        let mut full = prev;
        full.blend(&next, 1.0);
        assert_eq!(full, next);

        let mut none = prev;
        none.blend(&next, 0.0);
        assert_eq!(none, prev);
    }

    #[test]
    fn blend_midway() {
        let mut det = Detection::new(0.0, 0.0, 0.2, 0.2);
        det.blend(&Detection::new(1.0, 0.5, 0.4, 0.0), 0.25);

        assert_relative_eq!(det.x, 0.25);
        assert_relative_eq!(det.y, 0.125);
        assert_relative_eq!(det.w, 0.25);
        assert_relative_eq!(det.h, 0.15);
    }

    #[test]
    fn pixel_size() {
        let det = Detection::new(0.5, 0.5, 0.25, 0.1);

        assert_relative_eq!(det.pixel_width(200), 50.0);
        assert_relative_eq!(det.pixel_height(100), 10.0);
    }
}
