use crate::bbox::BBox;
use crate::error::Error;

use rayon::prelude::*;
use serde_derive::{Deserialize, Serialize};

/// Decides whether a single window of a frame contains an object.
///
/// The frame type is opaque to the crate; implementations own feature
/// extraction and the trained model.
pub trait WindowClassifier<I: ?Sized>: Sync {
    fn is_object(&self, frame: &I, window: &BBox) -> bool;
}

impl<I, F> WindowClassifier<I> for F
where
    I: ?Sized,
    F: Fn(&I, &BBox) -> bool + Sync,
{
    #[inline]
    fn is_object(&self, frame: &I, window: &BBox) -> bool {
        self(frame, window)
    }
}

/// A band of the frame scanned with one window size. Unset bounds span the frame.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchArea {
    #[serde(default)]
    pub x_start_stop: (Option<u32>, Option<u32>),
    #[serde(default)]
    pub y_start_stop: (Option<u32>, Option<u32>),
    pub window: (u32, u32),
    pub overlap: (f32, f32),
}

impl SearchArea {
    pub fn rows(y_start: u32, y_stop: u32, window: u32, overlap: f32) -> Self {
        Self {
            x_start_stop: (None, None),
            y_start_stop: (Some(y_start), Some(y_stop)),
            window: (window, window),
            overlap: (overlap, overlap),
        }
    }

    /// Pixels between two neighbouring windows
    #[inline]
    pub fn step(&self) -> (u32, u32) {
        (
            (self.window.0 as f32 * (1.0 - self.overlap.0)) as u32,
            (self.window.1 as f32 * (1.0 - self.overlap.1)) as u32,
        )
    }

    fn validate(&self) -> Result<(), Error> {
        let (sx, sy) = self.step();

        if !(0.0..1.0).contains(&self.overlap.0) || !(0.0..1.0).contains(&self.overlap.1) {
            return Err(Error::invalid_config(format!(
                "overlap must be in [0, 1), got {:?}",
                self.overlap
            )));
        }

        if sx == 0 || sy == 0 {
            return Err(Error::invalid_config(format!(
                "window {:?} with overlap {:?} does not advance",
                self.window, self.overlap
            )));
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub workers: usize,
    pub areas: Vec<SearchArea>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            workers: 8,
            areas: vec![
                SearchArea::rows(400, 483, 64, 0.75),
                SearchArea::rows(483, 650, 96, 0.75),
            ],
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.workers == 0 {
            return Err(Error::invalid_config("workers must be at least 1"));
        }

        self.areas.iter().try_for_each(SearchArea::validate)
    }
}

/// Windows of `area` over a `dims` sized frame, row by row.
pub fn slide_window(dims: (u32, u32), area: &SearchArea) -> Vec<BBox> {
    let x_start = area.x_start_stop.0.unwrap_or(0);
    let x_stop = area.x_start_stop.1.unwrap_or(dims.0);
    let y_start = area.y_start_stop.0.unwrap_or(0);
    let y_stop = area.y_start_stop.1.unwrap_or(dims.1);

    let (step_x, step_y) = area.step();
    if step_x == 0 || step_y == 0 {
        return Vec::new();
    }

    let span_x = x_stop.saturating_sub(x_start);
    let span_y = y_stop.saturating_sub(y_start);

    let nx = (span_x / step_x).saturating_sub(1);
    let ny = (span_y / step_y).saturating_sub(1);

    let (ww, wh) = (area.window.0 as f32, area.window.1 as f32);

    (0..ny)
        .flat_map(|ys| {
            (0..nx).map(move |xs| {
                let x = (xs * step_x + x_start) as f32;
                let y = (ys * step_y + y_start) as f32;

                BBox::ltwh(x, y, ww, wh)
            })
        })
        .collect()
}

/// Classifies windows on a fixed pool of worker threads.
pub struct WindowSearch {
    config: SearchConfig,
    pool: rayon::ThreadPool,
}

impl WindowSearch {
    pub fn new(config: SearchConfig) -> Result<Self, Error> {
        config.validate()?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .thread_name(|idx| format!("window-search-{}", idx))
            .build()?;

        Ok(Self { config, pool })
    }

    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Every window of every configured area
    pub fn windows(&self, dims: (u32, u32)) -> Vec<BBox> {
        self.config
            .areas
            .iter()
            .flat_map(|area| slide_window(dims, area))
            .collect()
    }

    /// Splits `windows` into one chunk per worker and returns the positive ones.
    /// Returns once every chunk is done.
    pub fn search<I, C>(&self, frame: &I, classifier: &C, windows: &[BBox]) -> Vec<BBox>
    where
        I: Sync + ?Sized,
        C: WindowClassifier<I>,
    {
        if windows.is_empty() {
            return Vec::new();
        }

        let chunk = ((windows.len() + self.config.workers - 1) / self.config.workers).max(1);

        let parts: Vec<Vec<BBox>> = self.pool.install(|| {
            windows
                .par_chunks(chunk)
                .map(|part| {
                    part.iter()
                        .filter(|w| classifier.is_object(frame, w))
                        .copied()
                        .collect()
                })
                .collect()
        });

        let hits: Vec<BBox> = parts.into_iter().flatten().collect();

        log::debug!(
            "search: {} windows in {} chunks -> {} hits",
            windows.len(),
            (windows.len() + chunk - 1) / chunk,
            hits.len()
        );

        hits
    }

    pub fn detect<I, C>(&self, frame: &I, dims: (u32, u32), classifier: &C) -> Vec<BBox>
    where
        I: Sync + ?Sized,
        C: WindowClassifier<I>,
    {
        let windows = self.windows(dims);
        self.search(frame, classifier, &windows)
    }
}
