use crate::bbox::BBox;
use crate::error::Error;
use crate::math;
use crate::tracker::Object;
use crate::Track;

use serde_derive::{Deserialize, Serialize};

#[derive(Debug, Clone)]
enum IndexedSliceKind {
    All,
    Indexes(Vec<usize>),
}

/// A slice restricted to a subset of its positions.
pub struct IndexedSlice<'a, T> {
    pub slice: &'a [T],
    kind: IndexedSliceKind,
}

impl<'a, T> Clone for IndexedSlice<'a, T> {
    fn clone(&self) -> Self {
        Self {
            slice: self.slice,
            kind: self.kind.clone(),
        }
    }
}

impl<'a, T> IndexedSlice<'a, T> {
    pub fn new(slice: &'a [T]) -> Self {
        Self {
            slice,
            kind: IndexedSliceKind::All,
        }
    }

    pub fn new_with_indexes(slice: &'a [T], idx: Vec<usize>) -> Self {
        Self {
            slice,
            kind: IndexedSliceKind::Indexes(idx),
        }
    }

    /// Maps a position in the subset to a position in the underlying slice.
    #[inline]
    pub fn get_index(&self, idx: usize) -> usize {
        match &self.kind {
            IndexedSliceKind::All => idx,
            IndexedSliceKind::Indexes(idxs) => idxs[idx],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        match &self.kind {
            IndexedSliceKind::All => self.slice.len(),
            IndexedSliceKind::Indexes(idxs) => idxs.len(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a, T> std::ops::Index<usize> for IndexedSlice<'a, T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        &self.slice[self.get_index(index)]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Relative center distance below which a box joins an object
    pub dist_thresh: f32,
    /// Multiplier of `dist_thresh` used when looking for a box to unhide an object
    pub unhide_factor: f32,
    /// Frames without a match before an object is dropped
    pub last_seen_thresh: u32,
    /// Hidden objects younger than this are dropped; also the visibility age
    pub age_threshold: u32,
    /// Length of the smoothing window
    pub num_frames: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            dist_thresh: 0.1,
            unhide_factor: 1.5,
            last_seen_thresh: 24,
            age_threshold: 8,
            num_frames: 10,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.dist_thresh > 0.0 && self.dist_thresh.is_finite()) {
            return Err(Error::invalid_config(format!(
                "dist_thresh must be positive, got {}",
                self.dist_thresh
            )));
        }

        if !(self.unhide_factor > 0.0 && self.unhide_factor.is_finite()) {
            return Err(Error::invalid_config(format!(
                "unhide_factor must be positive, got {}",
                self.unhide_factor
            )));
        }

        if self.num_frames == 0 {
            return Err(Error::invalid_config("num_frames must be at least 1"));
        }

        if self.last_seen_thresh == 0 {
            return Err(Error::invalid_config("last_seen_thresh must be at least 1"));
        }

        Ok(())
    }
}

/// Counters of a single `Scene::update`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    pub matched: usize,
    pub missed: usize,
    pub collided: usize,
    pub unhidden: usize,
    pub spawned: usize,
    pub removed: usize,
}

pub struct Scene {
    pub objects: Vec<Object>,
    config: TrackerConfig,
    next_id: u32,
}

impl Scene {
    pub fn new(config: TrackerConfig) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            objects: Vec::with_capacity(32),
            config,
            next_id: 1,
        })
    }

    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Runs one frame: match, unhide, spawn, prune. Order matters, each step
    /// only sees the boxes the previous steps left unclaimed.
    pub fn update(&mut self, candidates: &[BBox]) -> UpdateStats {
        let mut stats = UpdateStats::default();
        let mut claimed = vec![false; candidates.len()];

        self.match_objects(candidates, &mut claimed, &mut stats);
        self.unhide_objects(candidates, &mut claimed, &mut stats);
        self.spawn_objects(candidates, &claimed, &mut stats);
        self.remove_lost_objects(&mut stats);

        log::debug!(
            "scene: {} candidates, {:?}, {} live objects",
            candidates.len(),
            stats,
            self.objects.len()
        );

        stats
    }

    fn match_objects(
        &mut self,
        candidates: &[BBox],
        claimed: &mut [bool],
        stats: &mut UpdateStats,
    ) {
        let all = IndexedSlice::new(candidates);
        let thresh = self.config.dist_thresh;

        for obj in &mut self.objects {
            match math::closest(&obj.bbox(), &all) {
                Some((idx, dist)) if dist < thresh => {
                    if claimed[idx] {
                        obj.collide();
                        stats.collided += 1;
                    }

                    obj.update(candidates[idx]);
                    claimed[idx] = true;
                    stats.matched += 1;
                }
                _ => {
                    obj.miss();
                    stats.missed += 1;
                }
            }
        }
    }

    fn unhide_objects(
        &mut self,
        candidates: &[BBox],
        claimed: &mut [bool],
        stats: &mut UpdateStats,
    ) {
        let thresh = self.config.unhide_factor * self.config.dist_thresh;

        // hidden objects only compete for boxes left over by matching
        let unclaimed = unclaimed_indexes(claimed);
        if unclaimed.is_empty() {
            return;
        }

        let free = IndexedSlice::new_with_indexes(candidates, unclaimed);

        for obj in self.objects.iter_mut().filter(|o| o.is_hidden()) {
            if let Some((idx, dist)) = math::closest(&obj.bbox(), &free) {
                if dist < thresh && obj.unhide(candidates[idx]) {
                    claimed[idx] = true;
                    stats.unhidden += 1;
                }
            }
        }
    }

    fn spawn_objects(
        &mut self,
        candidates: &[BBox],
        claimed: &[bool],
        stats: &mut UpdateStats,
    ) {
        for idx in unclaimed_indexes(claimed) {
            let id = self.next_id;
            self.next_id += 1;

            log::trace!("object {} spawned at {:?}", id, candidates[idx]);
            let obj = Object::new(id, candidates[idx], self.config.num_frames);
            self.objects.push(obj);
            stats.spawned += 1;
        }
    }

    fn remove_lost_objects(&mut self, stats: &mut UpdateStats) {
        let before = self.objects.len();
        let (last_seen, age) = (self.config.last_seen_thresh, self.config.age_threshold);

        self.objects.retain(|o| {
            let lost = o.is_lost(last_seen, age);
            if lost {
                log::trace!(
                    "object {} removed (age {}, unseen {}, hidden {})",
                    o.id,
                    o.age,
                    o.frames_since_seen,
                    o.is_hidden()
                );
            }

            !lost
        });

        stats.removed = before - self.objects.len();
    }

    /// Snapshot of every live object
    pub fn tracks(&self) -> Vec<Track> {
        self.objects.iter().map(Into::into).collect()
    }

    /// Objects that received more than `min_age` boxes
    pub fn visible_tracks(&self, min_age: usize) -> Vec<Track> {
        self.objects
            .iter()
            .filter(|o| o.history.hits() > min_age)
            .map(Into::into)
            .collect()
    }

    pub fn detected_count(&self, min_age: usize) -> usize {
        self.objects
            .iter()
            .filter(|o| o.history.hits() > min_age)
            .count()
    }
}

fn unclaimed_indexes(claimed: &[bool]) -> Vec<usize> {
    claimed
        .iter()
        .enumerate()
        .filter(|(_, c)| !**c)
        .map(|(i, _)| i)
        .collect()
}

impl From<&Object> for Track {
    fn from(o: &Object) -> Track {
        Track {
            track_id: o.id,
            age: o.age,
            frames_since_seen: o.frames_since_seen,
            hidden: o.is_hidden(),
            hits: o.history.hits(),
            bbox: o.bbox(),
        }
    }
}
