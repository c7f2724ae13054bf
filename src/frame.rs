use crate::bbox::BBox;

/// Raw window hits of a single frame
pub struct Frame {
    pub dims: (u32, u32),
    pub candidates: Vec<BBox>,
}

impl Frame {
    #[inline]
    pub fn new(dims: (u32, u32), candidates: Vec<BBox>) -> Self {
        Self { dims, candidates }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
