use crate::bbox::BBox;
use crate::rolling_avg::RollingAvg;

/// Occlusion state of a tracked object.
///
/// Transitions:
/// * `Match`: any state, a box is pushed into the history.
/// * `Collide`: `Active -> Hidden`, the box the object matched was already claimed this frame.
/// * `Unhide`: `Hidden -> Active`, the history is reseeded with the new box.
/// * `Timeout`: the object is dropped by the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    Active,
    Hidden,
}

#[derive(Debug, Clone)]
pub struct Object {
    pub id: u32,
    pub history: RollingAvg,
    pub age: u32,
    pub frames_since_seen: u32,
    pub state: TrackState,
}

impl Object {
    pub fn new(id: u32, bbox: BBox, num_frames: usize) -> Self {
        Self {
            id,
            history: RollingAvg::new(bbox, num_frames),
            age: 1,
            frames_since_seen: 0,
            state: TrackState::Active,
        }
    }

    #[inline]
    pub fn bbox(&self) -> BBox {
        self.history.current()
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.state == TrackState::Hidden
    }

    /// One frame passes with a matched box.
    pub fn update(&mut self, bbox: BBox) {
        self.history.push(bbox);
        self.frames_since_seen = 0;
        self.age += 1;
    }

    /// One frame passes without a matched box.
    pub fn miss(&mut self) {
        self.frames_since_seen += 1;
        self.age += 1;
    }

    pub fn collide(&mut self) {
        if self.state == TrackState::Active {
            log::trace!("object {} hidden after collision", self.id);
        }

        self.state = TrackState::Hidden;
    }

    /// Returns `false` when the object was not hidden.
    pub fn unhide(&mut self, bbox: BBox) -> bool {
        if self.state != TrackState::Hidden {
            return false;
        }

        self.history.reset(bbox);
        self.state = TrackState::Active;
        log::trace!("object {} unhidden at {:?}", self.id, bbox);

        true
    }

    pub fn is_lost(&self, last_seen_thresh: u32, age_threshold: u32) -> bool {
        self.frames_since_seen >= last_seen_thresh
            || (self.is_hidden() && self.age < age_threshold)
    }
}
