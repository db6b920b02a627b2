//! Frame-to-frame blob tracking.
//!
//! Detections of successive frames are associated greedily by nearest
//! center; matched entities keep their identity and have their geometry
//! smoothed, unmatched ones lose liveness until they die.

pub mod config;
pub mod detection;
pub mod detector;
pub mod error;
pub mod liveness;
mod scene;
pub mod track;
pub mod tracker;

pub use config::{Dimensions, LivenessConfig, SizeFilter, TrackerConfig};
pub use detection::Detection;
pub use detector::BlobDetector;
pub use error::{Error, Result};
pub use track::{EntityId, TrackedEntity};
pub use tracker::{BlobTracker, DetectorTracker, Tracker};
