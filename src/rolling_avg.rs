use crate::bbox::BBox;
use crate::circular_queue::CircularQueue;

/// Rolling mean over the last `hcount` boxes.
#[derive(Debug, Clone)]
pub struct RollingAvg {
    curr: BBox,
    hits: usize,
    history: CircularQueue<BBox>,
}

impl RollingAvg {
    pub fn new(first: BBox, hcount: usize) -> Self {
        let mut history = CircularQueue::with_capacity(hcount);
        history.push(first);

        Self {
            curr: first,
            hits: 1,
            history,
        }
    }

    pub fn push(&mut self, bbox: BBox) -> BBox {
        self.history.push(bbox);
        self.hits += 1;
        self.recompute();

        self.curr
    }

    /// Drops everything seen so far and seeds the window with copies of `bbox`,
    /// so the mean snaps to it.
    pub fn reset(&mut self, bbox: BBox) -> BBox {
        self.history.fill(bbox);
        self.hits += self.history.capacity();
        self.curr = bbox;

        self.curr
    }

    fn recompute(&mut self) {
        if let Some(avg) = BBox::mean(self.history.iter()) {
            self.curr = avg;
        }
    }

    #[inline]
    pub fn current(&self) -> BBox {
        self.curr
    }

    /// Total number of boxes received, including those evicted from the window
    #[inline]
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Boxes currently in the window
    #[inline]
    pub fn len(&self) -> usize {
        self.history.len()
    }
}
