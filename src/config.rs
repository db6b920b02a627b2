use crate::error::{Error, Result};
use crate::Detection;
use serde_derive::{Deserialize, Serialize};

pub const MAX_WIDTH: u32 = 10_000;
pub const MAX_HEIGHT: u32 = 10_000;

pub const DEFAULT_CLOSENESS: f32 = 0.1;
pub const DEFAULT_SMOOTHING: f32 = 0.1;

fn check_unit(name: &str, value: f32) -> Result<()> {
    // also rejects NaN
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::invalid(format!(
            "{} must lie in [0.0, 1.0], got {}",
            name, value
        )));
    }

    Ok(())
}

fn check_non_negative(name: &str, value: f32) -> Result<()> {
    if value.is_nan() || value < 0.0 {
        return Err(Error::invalid(format!(
            "{} must be non-negative, got {}",
            name, value
        )));
    }

    Ok(())
}

/// Frame size in pixels
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let dims = Self { width, height };
        dims.validate()?;

        Ok(dims)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.width > MAX_WIDTH {
            return Err(Error::invalid(format!(
                "frame width must lie in [1, {}], got {}",
                MAX_WIDTH, self.width
            )));
        }

        if self.height == 0 || self.height > MAX_HEIGHT {
            return Err(Error::invalid(format!(
                "frame height must lie in [1, {}], got {}",
                MAX_HEIGHT, self.height
            )));
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct LivenessConfig {
    pub add: f32,
    pub subtract: f32,
    pub max: f32,
}

impl LivenessConfig {
    pub fn new(add: f32, subtract: f32, max: f32) -> Result<Self> {
        let cfg = Self { add, subtract, max };
        cfg.validate()?;

        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        check_non_negative("liveness add", self.add)?;
        check_non_negative("liveness subtract", self.subtract)?;
        check_non_negative("liveness maximum", self.max)
    }
}

impl Default for LivenessConfig {
    fn default() -> Self {
        Self {
            add: 5.0,
            subtract: 5.0,
            max: 100.0,
        }
    }
}

/// Pixel-space filter applied to raw detections before matching.
///
/// Bounds are inclusive. `max_count` limits how many raw detections are
/// *examined* (in input order), not how many are kept.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeFilter {
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,
    #[serde(default)]
    pub max_count: Option<usize>,
}

impl SizeFilter {
    pub fn new(
        min_width: u32,
        max_width: u32,
        min_height: u32,
        max_height: u32,
        max_count: Option<usize>,
        dims: Dimensions,
    ) -> Result<Self> {
        let filter = Self {
            min_width,
            max_width,
            min_height,
            max_height,
            max_count,
        };
        filter.validate(dims)?;

        Ok(filter)
    }

    /// Checks that both ranges are ordered.
    pub fn check_ranges(&self) -> Result<()> {
        if self.min_width > self.max_width || self.min_height > self.max_height {
            return Err(Error::invalid(format!(
                "size filter ranges are inverted: width [{}, {}], height [{}, {}]",
                self.min_width, self.max_width, self.min_height, self.max_height
            )));
        }

        Ok(())
    }

    /// Checks that the ranges are ordered and fit a `dims` frame.
    pub fn validate(&self, dims: Dimensions) -> Result<()> {
        if self.min_width > self.max_width || self.max_width > dims.width {
            return Err(Error::invalid(format!(
                "width filter [{}, {}] does not fit a frame {} pixels wide",
                self.min_width, self.max_width, dims.width
            )));
        }

        if self.min_height > self.max_height || self.max_height > dims.height {
            return Err(Error::invalid(format!(
                "height filter [{}, {}] does not fit a frame {} pixels high",
                self.min_height, self.max_height, dims.height
            )));
        }

        Ok(())
    }

    #[inline]
    pub fn admits(&self, det: &Detection, dims: Dimensions) -> bool {
        let w = det.pixel_width(dims.width);
        let h = det.pixel_height(dims.height);

        w >= self.min_width as f32
            && w <= self.max_width as f32
            && h >= self.min_height as f32
            && h <= self.max_height as f32
    }

    pub fn apply<'a>(
        &'a self,
        dims: Dimensions,
        raw: &'a [Detection],
    ) -> impl Iterator<Item = &'a Detection> + 'a {
        raw.iter()
            .take(self.max_count.unwrap_or(usize::MAX))
            .filter(move |det| self.admits(det, dims))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    pub closeness: f32,
    pub smoothing: f32,
    pub liveness: LivenessConfig,
    pub dimensions: Option<Dimensions>,
    pub size_filter: Option<SizeFilter>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            closeness: DEFAULT_CLOSENESS,
            smoothing: DEFAULT_SMOOTHING,
            liveness: LivenessConfig::default(),
            dimensions: None,
            size_filter: None,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        check_unit("closeness", self.closeness)?;
        check_unit("smoothing", self.smoothing)?;
        self.liveness.validate()?;

        if let Some(dims) = &self.dimensions {
            dims.validate()?;
        }

        match (&self.size_filter, self.dimensions) {
            // the frame may have been resized since the filter was set
            (Some(filter), Some(_)) => filter.check_ranges(),
            (Some(_), None) => Err(Error::precondition(
                "size filter requires frame dimensions",
            )),
            (None, _) => Ok(()),
        }
    }

    pub fn set_closeness(&mut self, closeness: f32) -> Result<()> {
        check_unit("closeness", closeness)?;
        self.closeness = closeness;

        Ok(())
    }

    pub fn set_smoothing(&mut self, smoothing: f32) -> Result<()> {
        check_unit("smoothing", smoothing)?;
        self.smoothing = smoothing;

        Ok(())
    }

    pub fn set_liveness(&mut self, add: f32, subtract: f32, max: f32) -> Result<()> {
        self.liveness = LivenessConfig::new(add, subtract, max)?;

        Ok(())
    }

    pub fn set_dimensions(&mut self, width: u32, height: u32) -> Result<()> {
        self.dimensions = Some(Dimensions::new(width, height)?);

        Ok(())
    }

    pub fn set_size_filter(
        &mut self,
        min_width: u32,
        max_width: u32,
        min_height: u32,
        max_height: u32,
        max_count: Option<usize>,
    ) -> Result<()> {
        let dims = self.dimensions.ok_or_else(|| {
            Error::precondition("pixel size filters need frame dimensions to be set first")
        })?;

        self.size_filter = Some(SizeFilter::new(
            min_width, max_width, min_height, max_height, max_count, dims,
        )?);

        Ok(())
    }

    pub fn clear_size_filter(&mut self) {
        self.size_filter = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = TrackerConfig::default();

        assert_eq!(cfg.closeness, 0.1);
        assert_eq!(cfg.smoothing, 0.1);
        assert_eq!(cfg.liveness, LivenessConfig::new(5.0, 5.0, 100.0).unwrap());
        assert!(cfg.dimensions.is_none());
        assert!(cfg.size_filter.is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn unit_range_checks() {
        let mut cfg = TrackerConfig::default();

        assert!(cfg.set_closeness(0.0).is_ok());
        assert!(cfg.set_closeness(1.0).is_ok());
        assert!(matches!(
            cfg.set_closeness(1.01),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            cfg.set_smoothing(-0.1),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            cfg.set_smoothing(f32::NAN),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(cfg.closeness, 1.0);
        assert_eq!(cfg.smoothing, 0.1);
    }

    #[test]
    fn liveness_checks() {
        let mut cfg = TrackerConfig::default();

        assert!(cfg.set_liveness(0.0, 0.0, 0.0).is_ok());
        assert!(matches!(
            cfg.set_liveness(-1.0, 5.0, 100.0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            cfg.set_liveness(1.0, -5.0, 100.0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            cfg.set_liveness(1.0, 5.0, f32::NAN),
            Err(Error::InvalidArgument(_))
        ));
        assert_eq!(cfg.liveness, LivenessConfig::new(0.0, 0.0, 0.0).unwrap());
    }

    #[test]
    fn dimension_limits() {
        assert!(Dimensions::new(1, 1).is_ok());
        assert!(Dimensions::new(MAX_WIDTH, MAX_HEIGHT).is_ok());
        assert!(matches!(
            Dimensions::new(0, 10),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            Dimensions::new(10, 0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            Dimensions::new(MAX_WIDTH + 1, 10),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn size_filter_needs_dimensions() {
        let mut cfg = TrackerConfig::default();

        assert!(matches!(
            cfg.set_size_filter(0, 10, 0, 10, None),
            Err(Error::FailedPrecondition(_))
        ));

        cfg.set_dimensions(100, 50).unwrap();
        assert!(cfg.set_size_filter(0, 100, 0, 50, None).is_ok());
        assert!(matches!(
            cfg.set_size_filter(20, 10, 0, 50, None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            cfg.set_size_filter(0, 101, 0, 50, None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            cfg.set_size_filter(0, 100, 40, 30, None),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            cfg.set_size_filter(0, 100, 0, 51, Some(3)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn shrinking_frame_under_active_filter() {
        let mut cfg = TrackerConfig::default();
        cfg.set_dimensions(100, 100).unwrap();
        cfg.set_size_filter(10, 80, 10, 80, None).unwrap();

        let filter = cfg.size_filter;

        assert!(cfg.set_dimensions(50, 100).is_ok());
        assert_eq!(cfg.dimensions, Some(Dimensions::new(50, 100).unwrap()));
        assert_eq!(cfg.size_filter, filter);
        assert!(cfg.validate().is_ok());

        assert!(cfg.set_dimensions(200, 100).is_ok());
        cfg.clear_size_filter();
        assert!(cfg.set_dimensions(50, 50).is_ok());
    }

    #[test]
    fn filter_examines_at_most_max_count() {
        let dims = Dimensions::new(100, 100).unwrap();
        let filter = SizeFilter::new(20, 80, 0, 100, Some(3), dims).unwrap();
        let raw = [
            Detection::new(0.1, 0.1, 0.05, 0.1),
            Detection::new(0.2, 0.2, 0.50, 0.1),
            Detection::new(0.3, 0.3, 0.20, 0.1),
            Detection::new(0.4, 0.4, 0.30, 0.1),
        ];

        let kept: Vec<_> = filter.apply(dims, &raw).copied().collect();

        assert_eq!(kept, vec![raw[1], raw[2]]);
    }

    #[test]
    fn filter_zero_count_keeps_nothing() {
        let dims = Dimensions::new(100, 100).unwrap();
        let filter = SizeFilter::new(0, 100, 0, 100, Some(0), dims).unwrap();
        let raw = [Detection::new(0.5, 0.5, 0.1, 0.1)];

        assert_eq!(filter.apply(dims, &raw).count(), 0);
    }

    #[test]
    fn config_from_json() {
        let cfg: TrackerConfig = serde_json::from_str(
            r#"{
                "closeness": 0.2,
                "liveness": { "add": 2.0 },
                "dimensions": { "width": 640, "height": 480 },
                "size_filter": {
                    "min_width": 4, "max_width": 320,
                    "min_height": 4, "max_height": 240
                }
            }"#,
        )
        .unwrap();

        assert_eq!(cfg.closeness, 0.2);
        assert_eq!(cfg.smoothing, DEFAULT_SMOOTHING);
        assert_eq!(cfg.liveness.add, 2.0);
        assert_eq!(cfg.liveness.subtract, 5.0);
        assert_eq!(cfg.size_filter.unwrap().max_count, None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn config_validate_catches_bad_file() {
        let cfg: TrackerConfig = serde_json::from_str(
            r#"{ "size_filter": { "min_width": 0, "max_width": 10, "min_height": 0, "max_height": 10 } }"#,
        )
        .unwrap();

        assert!(matches!(cfg.validate(), Err(Error::FailedPrecondition(_))));
    }
}
