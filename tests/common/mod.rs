mod labeler;

use heatfinder::error::Error;
use heatfinder::BBox;
use ndarray::prelude::*;

pub fn label(map: ArrayView2<'_, u32>) -> Result<(Array2<u32>, usize), Error> {
    Ok(labeler::flood_fill(map))
}

/// A cluster of window hits around `(x, y)`, as a detector produces for one object:
/// four windows of `size` offset by `size / 4`.
pub fn cluster(x: f32, y: f32, size: f32) -> Vec<BBox> {
    let d = size / 4.0;

    vec![
        BBox::ltwh(x, y, size, size),
        BBox::ltwh(x + d, y, size, size),
        BBox::ltwh(x, y + d, size, size),
        BBox::ltwh(x + d, y + d, size, size),
    ]
}

pub const DIMS: (u32, u32) = (1280, 720);
