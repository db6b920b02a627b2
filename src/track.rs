use crate::Detection;
use std::fmt;

/// Tracker-assigned identifier of an entity. Stable for the whole life of the
/// entity and never reused by the tracker that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub(crate) u64);

impl EntityId {
    #[inline]
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Snapshot of one entity as of the update call that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedEntity {
    pub id: EntityId,

    // normalized, possibly smoothed
    pub detection: Detection,

    pub liveness: f32,
}
