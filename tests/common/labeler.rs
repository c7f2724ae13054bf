use ndarray::prelude::*;

/// 4-connected component labeling, labels start at 1 in scan order.
pub fn flood_fill(map: ArrayView2<'_, u32>) -> (Array2<u32>, usize) {
    let (h, w) = map.dim();
    let mut labels = Array2::<u32>::zeros((h, w));
    let mut count = 0;
    let mut stack = Vec::new();

    for ((y, x), &v) in map.indexed_iter() {
        if v == 0 || labels[(y, x)] != 0 {
            continue;
        }

        count += 1;
        labels[(y, x)] = count;
        stack.push((y, x));

        while let Some((cy, cx)) = stack.pop() {
            let mut visit = |ny: usize, nx: usize| {
                if map[(ny, nx)] != 0 && labels[(ny, nx)] == 0 {
                    labels[(ny, nx)] = count;
                    stack.push((ny, nx));
                }
            };

            if cy > 0 {
                visit(cy - 1, cx);
            }
            if cy + 1 < h {
                visit(cy + 1, cx);
            }
            if cx > 0 {
                visit(cy, cx - 1);
            }
            if cx + 1 < w {
                visit(cy, cx + 1);
            }
        }
    }

    (labels, count as usize)
}
