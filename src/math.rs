use crate::bbox::BBox;
use crate::scene::IndexedSlice;
use nalgebra as na;

/// Distance between box centers relative to the mean diagonal of both boxes.
///
/// Symmetric and invariant to a common scaling of both boxes. Two degenerate
/// (zero diagonal) boxes are infinitely far apart.
#[inline]
pub fn normalized_distance(a: &BBox, b: &BBox) -> f32 {
    let mean_diag = (a.diagonal() + b.diagonal()) / 2.0;

    if mean_diag <= f32::EPSILON {
        return f32::INFINITY;
    }

    na::distance(&a.center(), &b.center()) / mean_diag
}

/// Closest candidate to `bbox`: `(index into the underlying slice, distance)`.
/// Ties keep the lowest position.
pub fn closest(bbox: &BBox, candidates: &IndexedSlice<'_, BBox>) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;

    for i in 0..candidates.len() {
        let dist = normalized_distance(bbox, &candidates[i]);

        match best {
            Some((_, d)) if d <= dist => {}
            _ => best = Some((candidates.get_index(i), dist)),
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn close_boxes_are_near() {
        let a = BBox::ltrb(100., 100., 164., 164.);
        let b = BBox::ltrb(102., 101., 166., 165.);

        let d = normalized_distance(&a, &b);
        assert!(d < 0.1, "{}", d);
        assert_relative_eq!(d, 5f32.sqrt() / (64.0 * 2f32.sqrt()), epsilon = 1e-6);
    }

    #[test]
    fn degenerate_boxes_never_match() {
        let a = BBox::ltrb(10., 10., 10., 10.);
        assert_eq!(normalized_distance(&a, &a), f32::INFINITY);
    }

    #[test]
    fn closest_skips_excluded_and_reports_slice_index() {
        let boxes = vec![
            BBox::ltrb(0., 0., 10., 10.),
            BBox::ltrb(100., 100., 110., 110.),
            BBox::ltrb(1., 1., 11., 11.),
        ];
        let probe = BBox::ltrb(0., 0., 10., 10.);

        let all = IndexedSlice::new(&boxes);
        assert_eq!(closest(&probe, &all).map(|x| x.0), Some(0));

        let subset = IndexedSlice::new_with_indexes(&boxes, vec![1, 2]);
        assert_eq!(closest(&probe, &subset).map(|x| x.0), Some(2));

        let none = IndexedSlice::new_with_indexes(&boxes, vec![]);
        assert_eq!(closest(&probe, &none), None);
    }

    #[test]
    fn closest_tie_keeps_first() {
        let boxes = vec![BBox::ltrb(5., 0., 15., 10.), BBox::ltrb(-5., 0., 5., 10.)];
        let probe = BBox::ltrb(0., 0., 10., 10.);

        assert_eq!(closest(&probe, &IndexedSlice::new(&boxes)).map(|x| x.0), Some(0));
    }

    fn bbox_strategy() -> impl Strategy<Value = BBox> {
        (0f32..1000., 0f32..1000., 1f32..300., 1f32..300.)
            .prop_map(|(x, y, w, h)| BBox::ltwh(x, y, w, h))
    }

    proptest! {
        #[test]
        fn distance_is_symmetric(a in bbox_strategy(), b in bbox_strategy()) {
            prop_assert_eq!(normalized_distance(&a, &b), normalized_distance(&b, &a));
        }

        #[test]
        fn distance_is_scale_invariant(
            a in bbox_strategy(),
            b in bbox_strategy(),
            k in 0.1f32..10.
        ) {
            let d = normalized_distance(&a, &b);
            let dk = normalized_distance(&a.scaled(k), &b.scaled(k));

            prop_assert!((d - dk).abs() <= 1e-3 * d.max(1.0), "{} vs {}", d, dk);
        }
    }
}
