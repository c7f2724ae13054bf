use crate::bbox::BBox;
use serde_derive::{Deserialize, Serialize};

const HIDDEN_INSET: f32 = 25.0;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Track {
    pub track_id: u32,
    pub age: u32,
    pub frames_since_seen: u32,
    pub hidden: bool,

    // number of boxes received over the whole lifetime
    pub hits: usize,

    // smoothed over the last `num_frames` boxes
    pub bbox: BBox,
}

impl Track {
    /// Box to draw: hidden tracks get a shrunk inset box as an occlusion cue.
    pub fn display_box(&self) -> BBox {
        if self.hidden {
            let dx = HIDDEN_INSET.min(self.bbox.width() / 2.0);
            let dy = HIDDEN_INSET.min(self.bbox.height() / 2.0);

            self.bbox.inset(dx, dy)
        } else {
            self.bbox
        }
    }
}
