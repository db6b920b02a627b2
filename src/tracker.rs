use crate::config::TrackerConfig;
use crate::detector::BlobDetector;
use crate::error::{Error, Result};
use crate::scene::Scene;
use crate::track::{EntityId, TrackedEntity};
use crate::Detection;

use ndarray::prelude::*;
use std::ops::{Deref, DerefMut};

/// Configuration, entity state and the outputs of the latest update.
///
/// A `Tracker` is never driven directly: it is reached through one of the two
/// variants, [`BlobTracker`] (fed with detections) or [`DetectorTracker`]
/// (fed with pixels), which dereference to it for configuration and
/// per-entity access. `T` is the type of the caller's per-entity payload.
///
/// Slices returned by [`active`](Tracker::active), [`dead`](Tracker::dead)
/// and [`new_entities`](Tracker::new_entities) describe the latest update
/// only; the borrow checker keeps them from outliving the next one.
#[derive(Debug)]
pub struct Tracker<T = ()> {
    config: TrackerConfig,
    scene: Scene<T>,
}

impl<T> Default for Tracker<T> {
    fn default() -> Self {
        Self {
            config: TrackerConfig::default(),
            scene: Scene::new(),
        }
    }
}

impl<T> Tracker<T> {
    fn with_config(config: TrackerConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            config,
            scene: Scene::new(),
        })
    }

    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn set_dimensions(&mut self, width: u32, height: u32) -> Result<()> {
        self.config.set_dimensions(width, height)?;
        log::debug!("frame dimensions set to {}x{}", width, height);

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
        self.config
            .set_size_filter(min_width, max_width, min_height, max_height, max_count)?;
        log::debug!("size filter set to {:?}", self.config.size_filter);

        Ok(())
    }

    pub fn clear_size_filter(&mut self) {
        self.config.clear_size_filter();
        log::debug!("size filter cleared");
    }

    pub fn set_closeness(&mut self, closeness: f32) -> Result<()> {
        self.config.set_closeness(closeness)?;
        log::debug!("closeness set to {}", closeness);

        Ok(())
    }

    pub fn set_smoothing(&mut self, smoothing: f32) -> Result<()> {
        self.config.set_smoothing(smoothing)?;
        log::debug!("smoothing set to {}", smoothing);

        Ok(())
    }

    pub fn set_liveness(&mut self, add: f32, subtract: f32, max: f32) -> Result<()> {
        self.config.set_liveness(add, subtract, max)?;
        log::debug!("liveness set to {:?}", self.config.liveness);

        Ok(())
    }

    #[inline]
    pub fn active(&self) -> &[TrackedEntity] {
        &self.scene.output().active
    }

    #[inline]
    pub fn dead(&self) -> &[TrackedEntity] {
        &self.scene.output().dead
    }

    #[inline]
    pub fn new_entities(&self) -> &[TrackedEntity] {
        &self.scene.output().new
    }

    /// Number of completed update calls.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.scene.frame()
    }

    pub fn entity(&self, id: EntityId) -> Result<TrackedEntity> {
        self.scene.entity(id)
    }

    pub fn liveness(&self, id: EntityId) -> Result<f32> {
        self.scene.liveness(id)
    }

    pub fn data(&self, id: EntityId) -> Result<Option<&T>> {
        self.scene.data(id)
    }

    pub fn data_mut(&mut self, id: EntityId) -> Result<Option<&mut T>> {
        self.scene.data_mut(id)
    }

    pub fn set_data(&mut self, id: EntityId, value: T) -> Result<()> {
        self.scene.set_data(id, value)
    }

    pub fn take_data(&mut self, id: EntityId) -> Result<Option<T>> {
        self.scene.take_data(id)
    }

    fn advance(&mut self, raw: &[Detection]) -> Result<&[TrackedEntity]> {
        self.scene.update(&self.config, raw)
    }
}

/// Tracker fed with the detections of each frame by the caller.
#[derive(Debug)]
pub struct BlobTracker<T = ()> {
    tracker: Tracker<T>,
}

impl<T> Default for BlobTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BlobTracker<T> {
    pub fn new() -> Self {
        Self {
            tracker: Tracker::default(),
        }
    }

    pub fn with_config(config: TrackerConfig) -> Result<Self> {
        Ok(Self {
            tracker: Tracker::with_config(config)?,
        })
    }

    /// Associates one frame's detections with the tracked entities and
    /// returns the new active set. An empty slice is a frame without blobs.
    pub fn update(&mut self, detections: &[Detection]) -> Result<&[TrackedEntity]> {
        self.tracker.advance(detections)
    }
}

impl<T> Deref for BlobTracker<T> {
    type Target = Tracker<T>;

    #[inline]
    fn deref(&self) -> &Tracker<T> {
        &self.tracker
    }
}

impl<T> DerefMut for BlobTracker<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Tracker<T> {
        &mut self.tracker
    }
}

/// Tracker that owns a blob detector and is fed with raw pixel buffers.
#[derive(Debug)]
pub struct DetectorTracker<D, T = ()> {
    detector: D,
    tracker: Tracker<T>,
}

impl<D: BlobDetector, T> DetectorTracker<D, T> {
    pub fn new(detector: D) -> Self {
        Self {
            detector,
            tracker: Tracker::default(),
        }
    }

    pub fn with_config(detector: D, config: TrackerConfig) -> Result<Self> {
        Ok(Self {
            detector,
            tracker: Tracker::with_config(config)?,
        })
    }

    #[inline]
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Runs the detector over `pixels` (rows x columns) and associates the
    /// resulting blobs with the tracked entities. Returns the new active set.
    pub fn update(&mut self, pixels: ArrayView2<'_, u32>) -> Result<&[TrackedEntity]> {
        if pixels.is_empty() {
            return Err(Error::invalid("empty pixel buffer"));
        }

        self.detector.compute_blobs(pixels)?;
        let detections = self.detector.detections();

        self.tracker.advance(&detections)
    }
}

impl<D, T> Deref for DetectorTracker<D, T> {
    type Target = Tracker<T>;

    #[inline]
    fn deref(&self) -> &Tracker<T> {
        &self.tracker
    }
}

impl<D, T> DerefMut for DetectorTracker<D, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Tracker<T> {
        &mut self.tracker
    }
}
