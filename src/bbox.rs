use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

/// Left-top-right-bottom box in image pixel coordinates
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Default)]
pub struct BBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl From<BBox> for [f32; 4] {
    fn from(bbox: BBox) -> Self {
        [bbox.x1, bbox.y1, bbox.x2, bbox.y2]
    }
}

impl From<[f32; 4]> for BBox {
    #[inline]
    fn from(v: [f32; 4]) -> Self {
        BBox::ltrb(v[0], v[1], v[2], v[3])
    }
}

impl BBox {
    #[inline]
    pub fn ltrb(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Left-top corner plus width-height
    #[inline]
    pub fn ltwh(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self::ltrb(left, top, left + width, top + height)
    }

    #[inline(always)]
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    #[inline]
    pub fn center(&self) -> na::Point2<f32> {
        na::Point2::new(
            self.x1 + self.width() / 2.0,
            self.y1 + self.height() / 2.0,
        )
    }

    #[inline]
    pub fn diagonal(&self) -> f32 {
        na::Vector2::new(self.width(), self.height()).norm()
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x1.is_finite() && self.y1.is_finite() && self.x2.is_finite() && self.y2.is_finite()
    }

    #[inline]
    pub fn scaled(&self, k: f32) -> Self {
        Self::ltrb(self.x1 * k, self.y1 * k, self.x2 * k, self.y2 * k)
    }

    /// Shrinks the box by `dx` on the left and right edges and `dy` on the top and bottom.
    #[inline]
    pub fn inset(&self, dx: f32, dy: f32) -> Self {
        Self::ltrb(self.x1 + dx, self.y1 + dy, self.x2 - dx, self.y2 - dy)
    }

    /// Component-wise mean, `None` for an empty iterator
    pub fn mean<'a, I: IntoIterator<Item = &'a BBox>>(boxes: I) -> Option<BBox> {
        let mut count = 0usize;
        let mut acc = na::Vector4::zeros();

        for b in boxes {
            acc += na::Vector4::new(b.x1, b.y1, b.x2, b.y2);
            count += 1;
        }

        if count == 0 {
            return None;
        }

        let m = acc / count as f32;
        Some(BBox::ltrb(m.x, m.y, m.z, m.w))
    }
}
