use crate::config::TrackerConfig;
use crate::error::{Error, Result};
use crate::liveness::Liveness;
use crate::track::{EntityId, TrackedEntity};
use crate::Detection;

use std::collections::HashMap;

#[derive(Debug)]
struct Record<T> {
    detection: Detection,
    liveness: Liveness,
    data: Option<T>,
}

impl<T> Record<T> {
    fn snapshot(&self, id: EntityId) -> TrackedEntity {
        TrackedEntity {
            id,
            detection: self.detection,
            liveness: self.liveness.value(),
        }
    }
}

/// Result of one update call. Rebuilt from scratch on every call.
#[derive(Debug, Default, Clone)]
pub struct FrameOutput {
    pub active: Vec<TrackedEntity>,
    pub dead: Vec<TrackedEntity>,
    pub new: Vec<TrackedEntity>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Outcome {
    Matched,
    Missed,
    Died,
}

#[derive(Debug)]
struct Transition {
    id: EntityId,
    detection: Detection,
    liveness: Liveness,
    outcome: Outcome,
}

/// Index of the candidate nearest to `target` and its distance.
///
/// Scans in order with a strict `<`, so the first of several equally near
/// candidates wins.
fn nearest(target: &Detection, candidates: &[Detection]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    let mut min_dist = f32::MAX;

    for (idx, det) in candidates.iter().enumerate() {
        let dist = target.distance(det);

        if dist < min_dist {
            min_dist = dist;
            best = Some((idx, dist));
        }
    }

    best
}

/// Entity arena plus the state carried between update calls.
///
/// `existing` holds the active entities in insertion order; it drives the
/// matching order of the next update. Records of entities that died during
/// the latest update are kept in `dying` until the next update starts, so
/// their data can still be inspected.
#[derive(Debug)]
pub struct Scene<T> {
    records: HashMap<EntityId, Record<T>>,
    existing: Vec<EntityId>,
    dying: Vec<EntityId>,
    output: FrameOutput,
    next_id: u64,
    frame: u64,
}

impl<T> Default for Scene<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scene<T> {
    pub fn new() -> Self {
        Self {
            records: HashMap::with_capacity(64),
            existing: Vec::with_capacity(64),
            dying: Vec::new(),
            output: FrameOutput::default(),
            next_id: 1,
            frame: 0,
        }
    }

    #[inline]
    pub fn output(&self) -> &FrameOutput {
        &self.output
    }

    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.existing.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.existing.is_empty()
    }

    fn record(&self, id: EntityId) -> Result<&Record<T>> {
        self.records.get(&id).ok_or(Error::NotFound(id))
    }

    fn record_mut(&mut self, id: EntityId) -> Result<&mut Record<T>> {
        self.records.get_mut(&id).ok_or(Error::NotFound(id))
    }

    pub fn entity(&self, id: EntityId) -> Result<TrackedEntity> {
        Ok(self.record(id)?.snapshot(id))
    }

    pub fn liveness(&self, id: EntityId) -> Result<f32> {
        Ok(self.record(id)?.liveness.value())
    }

    pub fn data(&self, id: EntityId) -> Result<Option<&T>> {
        Ok(self.record(id)?.data.as_ref())
    }

    pub fn data_mut(&mut self, id: EntityId) -> Result<Option<&mut T>> {
        Ok(self.record_mut(id)?.data.as_mut())
    }

    pub fn set_data(&mut self, id: EntityId, value: T) -> Result<()> {
        self.record_mut(id)?.data = Some(value);

        Ok(())
    }

    pub fn take_data(&mut self, id: EntityId) -> Result<Option<T>> {
        Ok(self.record_mut(id)?.data.take())
    }

    /// Runs one association step over the raw detections of a frame and
    /// returns the new active set.
    ///
    /// Nothing is committed unless the whole step succeeds.
    pub fn update(
        &mut self,
        config: &TrackerConfig,
        raw: &[Detection],
    ) -> Result<&[TrackedEntity]> {
        config.validate()?;

        let mut working: Vec<Detection> = match (&config.size_filter, config.dimensions) {
            (Some(filter), Some(dims)) => filter.apply(dims, raw).copied().collect(),
            _ => raw.to_vec(),
        };

        if working.len() < raw.len() {
            log::debug!(
                "frame {}: size filter dropped {} of {} detections",
                self.frame + 1,
                raw.len() - working.len(),
                raw.len()
            );
        }

        let live = &config.liveness;
        let mut transitions = Vec::with_capacity(self.existing.len());

        for &id in &self.existing {
            let record = self.records.get(&id).ok_or_else(|| {
                Error::Internal(format!("no record for existing entity {}", id))
            })?;

            let mut liveness = record.liveness;
            let mut detection = record.detection;

            let outcome = match nearest(&detection, &working) {
                Some((idx, dist)) if dist <= config.closeness => {
                    let matched = working.remove(idx);
                    detection.blend(&matched, config.smoothing);
                    liveness.add(live.add, live.max);

                    log::trace!("{} matched at distance {}", id, dist);
                    Outcome::Matched
                }
                _ => {
                    liveness.subtract(live.subtract, live.max);

                    if liveness.is_dead() {
                        log::trace!("{} died", id);
                        Outcome::Died
                    } else {
                        Outcome::Missed
                    }
                }
            };

            transitions.push(Transition {
                id,
                detection,
                liveness,
                outcome,
            });
        }

        for id in self.dying.drain(..) {
            self.records.remove(&id);
        }

        let mut output = FrameOutput {
            active: Vec::with_capacity(transitions.len() + working.len()),
            dead: Vec::new(),
            new: Vec::with_capacity(working.len()),
        };
        let mut existing = Vec::with_capacity(output.active.capacity());
        let mut matched = 0;

        for t in transitions {
            // presence was checked while computing the transitions
            if let Some(record) = self.records.get_mut(&t.id) {
                record.detection = t.detection;
                record.liveness = t.liveness;

                match t.outcome {
                    Outcome::Died => {
                        output.dead.push(record.snapshot(t.id));
                        self.dying.push(t.id);
                    }
                    outcome => {
                        if outcome == Outcome::Matched {
                            matched += 1;
                        }

                        output.active.push(record.snapshot(t.id));
                        existing.push(t.id);
                    }
                }
            }
        }

        for detection in working {
            let id = EntityId(self.next_id);
            self.next_id += 1;

            let record = Record {
                detection,
                liveness: Liveness::new(live.add, live.max),
                data: None,
            };

            let entity = record.snapshot(id);
            log::trace!("{} born at ({}, {})", id, detection.x, detection.y);

            self.records.insert(id, record);
            output.active.push(entity);
            output.new.push(entity);
            existing.push(id);
        }

        self.frame += 1;
        log::debug!(
            "frame {}: {} matched, {} dead, {} new, {} active",
            self.frame,
            matched,
            output.dead.len(),
            output.new.len(),
            output.active.len()
        );

        self.existing = existing;
        self.output = output;

        Ok(&self.output.active)
    }
}
