use crate::bbox::BBox;
use crate::error::Error;
use crate::heatmap::{boxes_from_labels, Heatmap};

use ndarray::prelude::*;
use serde_derive::{Deserialize, Serialize};

/// Connected-component labeling of a vote map.
///
/// Zero means background. Implementations return a label grid of the same shape
/// (`0` background, `1..=count` component ids) and the number of components.
pub trait ComponentLabeler {
    fn label(&self, map: ArrayView2<'_, u32>) -> Result<(Array2<u32>, usize), Error>;
}

impl<F> ComponentLabeler for F
where
    F: Fn(ArrayView2<'_, u32>) -> Result<(Array2<u32>, usize), Error>,
{
    #[inline]
    fn label(&self, map: ArrayView2<'_, u32>) -> Result<(Array2<u32>, usize), Error> {
        self(map)
    }
}

/// Range dependent minimum box size. Boxes starting above `split_row` are far
/// from the camera and may be smaller.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct OutlierFilter {
    pub split_row: f32,
    pub far_min_size: f32,
    pub near_min_size: f32,
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self {
            split_row: 450.0,
            far_min_size: 32.0,
            near_min_size: 64.0,
        }
    }
}

impl OutlierFilter {
    #[inline]
    pub fn accepts(&self, bbox: &BBox) -> bool {
        let min_size = if bbox.y1 < self.split_row {
            self.far_min_size
        } else {
            self.near_min_size
        };

        bbox.width() > min_size && bbox.height() > min_size
    }

    pub fn reject_outliers(&self, boxes: Vec<BBox>) -> Vec<BBox> {
        let before = boxes.len();
        let kept: Vec<_> = boxes.into_iter().filter(|b| self.accepts(b)).collect();

        if kept.len() < before {
            log::trace!("outlier filter dropped {} boxes", before - kept.len());
        }

        kept
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FusionConfig {
    /// A pixel needs more than this many overlapping boxes to survive
    pub vote_threshold: u32,
    pub outliers: OutlierFilter,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            vote_threshold: 1,
            outliers: OutlierFilter::default(),
        }
    }
}

impl FusionConfig {
    pub fn validate(&self) -> Result<(), Error> {
        let o = &self.outliers;

        if !(o.split_row.is_finite() && o.far_min_size >= 0.0 && o.near_min_size >= 0.0) {
            return Err(Error::invalid_config(format!("invalid outlier filter {:?}", o)));
        }

        Ok(())
    }
}

/// Merges the overlapping window hits of a frame into one box per object.
pub struct HeatmapFusion<L> {
    config: FusionConfig,
    labeler: L,
}

impl<L: ComponentLabeler> HeatmapFusion<L> {
    pub fn new(config: FusionConfig, labeler: L) -> Result<Self, Error> {
        config.validate()?;

        Ok(Self { config, labeler })
    }

    #[inline]
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Vote map of `boxes` after the noise threshold.
    pub fn heatmap(&self, dims: (u32, u32), boxes: &[BBox]) -> Result<Heatmap, Error> {
        let mut heat = Heatmap::new(dims.0, dims.1)?;
        heat.accumulate(boxes)?.threshold(self.config.vote_threshold);

        Ok(heat)
    }

    pub fn extract_components(&self, heat: &Heatmap) -> Result<(Array2<u32>, usize), Error> {
        let (labels, count) = self.labeler.label(heat.view())?;

        let expected = (heat.height(), heat.width());
        let actual = labels.dim();
        if expected != actual {
            return Err(Error::DimensionMismatch { expected, actual });
        }

        Ok((labels, count))
    }

    pub fn fuse(&self, dims: (u32, u32), boxes: &[BBox]) -> Result<Vec<BBox>, Error> {
        let heat = self.heatmap(dims, boxes)?;
        let (labels, count) = self.extract_components(&heat)?;
        let merged = boxes_from_labels(labels.view(), count)?;
        let merged_count = merged.len();
        let filtered = self.config.outliers.reject_outliers(merged);

        log::debug!(
            "fusion: {} hits -> {} components -> {} boxes",
            boxes.len(),
            merged_count,
            filtered.len()
        );

        Ok(filtered)
    }
}
