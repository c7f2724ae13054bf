pub mod bbox;
pub mod config;
pub mod detector;
pub mod error;
pub mod frame;
pub mod fusion;
pub mod heatmap;
pub mod math;
pub mod rolling_avg;
pub mod scene;
pub mod tracker;

mod circular_queue;
mod track;

#[cfg(test)]
#[path = "../tests/common/labeler.rs"]
mod test_labeler;

pub use bbox::BBox;
pub use config::FinderConfig;
pub use frame::Frame;
pub use fusion::ComponentLabeler;
pub use track::Track;

use detector::{WindowClassifier, WindowSearch};
use error::Error;
use fusion::HeatmapFusion;
use scene::{Scene, UpdateStats};
use std::rc::Rc;

pub trait Tracking {
    fn update(&mut self, frame: &Frame) -> Result<(), Error>;
    fn tracks(&self) -> Rc<[Track]>;
}

/// Frame by frame pipeline: window search, heatmap fusion, tracking.
pub struct ObjectFinder<L> {
    fusion: HeatmapFusion<L>,
    search: WindowSearch,
    scene: Scene,
    frames: u64,
}

impl<L: ComponentLabeler> ObjectFinder<L> {
    pub fn new(config: FinderConfig, labeler: L) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self {
            fusion: HeatmapFusion::new(config.fusion, labeler)?,
            search: WindowSearch::new(config.search)?,
            scene: Scene::new(config.tracking)?,
            frames: 0,
        })
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn fusion(&self) -> &HeatmapFusion<L> {
        &self.fusion
    }

    #[inline]
    pub fn search(&self) -> &WindowSearch {
        &self.search
    }

    #[inline]
    fn min_age(&self) -> usize {
        self.scene.config().age_threshold as usize
    }

    /// Fuses the frame's hits and advances every track by one frame.
    pub fn step(&mut self, frame: &Frame) -> Result<UpdateStats, Error> {
        let boxes = self.fusion.fuse(frame.dims, &frame.candidates)?;
        let stats = self.scene.update(&boxes);
        self.frames += 1;

        log::debug!(
            "frame {}: {} hits, {} boxes, {} objects detected",
            self.frames,
            frame.len(),
            boxes.len(),
            self.detected_count()
        );

        Ok(stats)
    }

    /// Processes one frame and returns the tracks old enough to be shown.
    pub fn process(&mut self, frame: &Frame) -> Result<Rc<[Track]>, Error> {
        self.step(frame)?;

        Ok(self.tracks())
    }

    /// Runs the window search over `image` with `classifier`, then `process`.
    pub fn process_image<I, C>(
        &mut self,
        image: &I,
        dims: (u32, u32),
        classifier: &C,
    ) -> Result<Rc<[Track]>, Error>
    where
        I: Sync + ?Sized,
        C: WindowClassifier<I>,
    {
        let hits = self.search.detect(image, dims, classifier);

        self.process(&Frame::new(dims, hits))
    }

    /// The "objects detected" readout
    #[inline]
    pub fn detected_count(&self) -> usize {
        self.scene.detected_count(self.min_age())
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl<L: ComponentLabeler> Tracking for ObjectFinder<L> {
    #[inline]
    fn update(&mut self, frame: &Frame) -> Result<(), Error> {
        self.step(frame).map(|_| ())
    }

    #[inline]
    fn tracks(&self) -> Rc<[Track]> {
        self.scene.visible_tracks(self.min_age()).into()
    }
}
