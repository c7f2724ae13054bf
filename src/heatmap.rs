use crate::bbox::BBox;
use crate::error::Error;

use ndarray::prelude::*;
use num_traits::NumCast;

/// Per-pixel vote counts, one row per image row.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    grid: Array2<u32>,
}

impl Heatmap {
    pub fn new(width: u32, height: u32) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyFrame { width, height });
        }

        Ok(Self {
            grid: Array2::zeros((height as usize, width as usize)),
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.grid.ncols()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.grid.nrows()
    }

    #[inline]
    pub fn view(&self) -> ArrayView2<'_, u32> {
        self.grid.view()
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        self.grid.get((y, x)).copied()
    }

    pub fn max(&self) -> u32 {
        self.grid.iter().copied().max().unwrap_or(0)
    }

    /// Adds one vote to every pixel of `[x1, x2) x [y1, y2)` for each box.
    /// Boxes reaching past the map are clipped. Nothing is touched if any box is invalid.
    pub fn accumulate(&mut self, boxes: &[BBox]) -> Result<&mut Self, Error> {
        let (w, h) = (self.width(), self.height());

        let mut spans = Vec::with_capacity(boxes.len());
        for b in boxes {
            if b.x1 > b.x2 || b.y1 > b.y2 {
                return Err(Error::invalid_box(b));
            }

            match (to_pixel(b.x1, w), to_pixel(b.y1, h), to_pixel(b.x2, w), to_pixel(b.y2, h)) {
                (Some(x1), Some(y1), Some(x2), Some(y2)) => spans.push((x1, y1, x2, y2)),
                _ => return Err(Error::invalid_box(b)),
            }
        }

        for (x1, y1, x2, y2) in spans {
            self.grid
                .slice_mut(s![y1..y2, x1..x2])
                .map_inplace(|v| *v += 1);
        }

        Ok(self)
    }

    /// Zeroes every pixel with `threshold` votes or fewer.
    pub fn threshold(&mut self, threshold: u32) -> &mut Self {
        self.grid.mapv_inplace(|v| if v <= threshold { 0 } else { v });

        self
    }
}

/// Floors a coordinate to a pixel index clipped to `[0, max]`, `None` if negative or not finite.
fn to_pixel(v: f32, max: usize) -> Option<usize> {
    if !v.is_finite() || v < 0.0 {
        return None;
    }

    let px: usize = NumCast::from(v.floor())?;

    Some(px.min(max))
}

/// Bounding box of each component, `(min_x, min_y, max_x, max_y)` over its pixels.
/// Labels without pixels yield no box.
pub fn boxes_from_labels(labels: ArrayView2<'_, u32>, count: usize) -> Result<Vec<BBox>, Error> {
    // every component owns at least one pixel
    if count > labels.len() {
        return Err(Error::ComponentCount {
            count,
            pixels: labels.len(),
        });
    }

    let mut extents: Vec<Option<(usize, usize, usize, usize)>> = vec![None; count];

    for ((y, x), &label) in labels.indexed_iter() {
        if label == 0 {
            continue;
        }

        let slot = extents
            .get_mut(label as usize - 1)
            .ok_or(Error::LabelOutOfRange { label, count })?;

        *slot = Some(match *slot {
            Some((x1, y1, x2, y2)) => (x1.min(x), y1.min(y), x2.max(x), y2.max(y)),
            None => (x, y, x, y),
        });
    }

    Ok(extents
        .into_iter()
        .flatten()
        .map(|(x1, y1, x2, y2)| BBox::ltrb(x1 as f32, y1 as f32, x2 as f32, y2 as f32))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use proptest::prelude::*;

    #[test]
    fn single_box_does_not_survive_threshold() {
        let mut heat = Heatmap::new(32, 32).unwrap();
        heat.accumulate(&[BBox::ltrb(4., 4., 12., 12.)])
            .unwrap()
            .threshold(1);

        assert_eq!(heat.max(), 0);
    }

    #[test]
    fn overlap_survives_threshold() {
        let mut heat = Heatmap::new(32, 32).unwrap();
        heat.accumulate(&[BBox::ltrb(4., 4., 12., 12.), BBox::ltrb(8., 8., 16., 16.)])
            .unwrap();

        assert_eq!(heat.get(4, 4), Some(1));
        assert_eq!(heat.get(8, 8), Some(2));
        assert_eq!(heat.get(11, 11), Some(2));
        // exclusive far edge
        assert_eq!(heat.get(12, 12), Some(1));
        assert_eq!(heat.get(16, 16), Some(0));

        heat.threshold(1);
        let alive = heat.view().iter().filter(|&&v| v > 0).count();
        assert_eq!(alive, 4 * 4);
        assert_eq!(heat.get(8, 8), Some(2));
        assert_eq!(heat.get(4, 4), Some(0));
    }

    #[test]
    fn boxes_are_clipped_to_the_map() {
        let mut heat = Heatmap::new(10, 10).unwrap();
        heat.accumulate(&[BBox::ltrb(5., 5., 50., 50.)]).unwrap();

        assert_eq!(heat.get(9, 9), Some(1));
        assert_eq!(heat.view().sum(), 25);
    }

    #[test]
    fn invalid_boxes_are_rejected_before_accumulating() {
        let mut heat = Heatmap::new(10, 10).unwrap();

        let res = heat.accumulate(&[BBox::ltrb(0., 0., 5., 5.), BBox::ltrb(-1., 0., 5., 5.)]);
        assert!(matches!(res, Err(Error::InvalidBox { .. })));
        assert_eq!(heat.max(), 0);

        let res = heat.accumulate(&[BBox::ltrb(6., 0., 5., 5.)]);
        assert!(matches!(res, Err(Error::InvalidBox { .. })));

        let res = heat.accumulate(&[BBox::ltrb(0., 0., f32::NAN, 5.)]);
        assert!(matches!(res, Err(Error::InvalidBox { .. })));
    }

    #[test]
    fn empty_frame_is_rejected() {
        assert!(matches!(
            Heatmap::new(0, 10),
            Err(Error::EmptyFrame {
                width: 0,
                height: 10
            })
        ));
    }

    #[test]
    fn empty_box_list_leaves_zero_map() {
        let mut heat = Heatmap::new(8, 8).unwrap();
        heat.accumulate(&[]).unwrap().threshold(1);

        assert_eq!(heat.max(), 0);
    }

    #[test]
    fn labels_to_boxes() {
        let labels = array![
            [0, 1, 1, 0, 0],
            [0, 1, 0, 0, 2],
            [0, 0, 0, 0, 2],
            [3, 0, 0, 0, 2],
        ];

        let boxes = boxes_from_labels(labels.view(), 3).unwrap();
        assert_eq!(
            boxes,
            vec![
                BBox::ltrb(1., 0., 2., 1.),
                BBox::ltrb(4., 1., 4., 3.),
                BBox::ltrb(0., 3., 0., 3.),
            ]
        );
    }

    #[test]
    fn label_above_count_is_an_error() {
        let labels = array![[0, 1], [2, 0]];
        let res = boxes_from_labels(labels.view(), 1);

        assert!(matches!(
            res,
            Err(Error::LabelOutOfRange { label: 2, count: 1 })
        ));
    }

    #[test]
    fn impossible_component_count_is_an_error() {
        let labels = Array2::<u32>::zeros((3, 4));

        assert!(matches!(
            boxes_from_labels(labels.view(), usize::MAX),
            Err(Error::ComponentCount {
                count: usize::MAX,
                pixels: 12
            })
        ));
        assert!(boxes_from_labels(labels.view(), 12).unwrap().is_empty());
    }

    #[test]
    fn missing_label_yields_no_box() {
        let labels = array![[0, 2], [2, 0]];
        let boxes = boxes_from_labels(labels.view(), 2).unwrap();

        assert_eq!(boxes, vec![BBox::ltrb(0., 0., 1., 1.)]);
    }

    fn boxes_strategy() -> impl Strategy<Value = Vec<BBox>> {
        prop::collection::vec(
            (0u32..40, 0u32..30, 1u32..20, 1u32..20).prop_map(|(x, y, w, h)| {
                BBox::ltwh(x as f32, y as f32, w as f32, h as f32)
            }),
            0..12,
        )
    }

    proptest! {
        #[test]
        fn accumulation_is_order_independent(
            (boxes, shuffled) in boxes_strategy()
                .prop_flat_map(|b| (Just(b.clone()), Just(b).prop_shuffle()))
        ) {
            let mut a = Heatmap::new(48, 40).unwrap();
            a.accumulate(&boxes).unwrap();

            let mut b = Heatmap::new(48, 40).unwrap();
            for bbox in shuffled.iter() {
                b.accumulate(std::slice::from_ref(bbox)).unwrap();
            }

            prop_assert_eq!(a, b);
        }
    }
}
