use crate::pipeline::processing::rect::Rect;

fn is_similar(r1: &Rect, r2: &Rect, eps: f64) -> bool {
    let delta = eps * (r1.width.min(r2.width) as f64 + r1.height.min(r2.height) as f64) * 0.5;
    let (x1, y1, x2, y2) = (r1.x as f64, r1.y as f64, r2.x as f64, r2.y as f64);

    (x1 - x2).abs() <= delta
        && (y1 - y2).abs() <= delta
        && (r1.right() as f64 - r2.right() as f64).abs() <= delta
        && (r1.bottom() as f64 - r2.bottom() as f64).abs() <= delta
}

fn find_root(parents: &mut [usize], mut i: usize) -> usize {
    while parents[i] != i {
        parents[i] = parents[parents[i]];
        i = parents[i];
    }
    i
}

/// Label every rectangle with its cluster under the transitive closure of `is_similar`.
/// Clusters are numbered in order of their first member.
fn partition(rects: &[Rect], eps: f64) -> (Vec<usize>, usize) {
    let mut parents: Vec<usize> = (0..rects.len()).collect();

    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            if is_similar(&rects[i], &rects[j], eps) {
                let root_i = find_root(&mut parents, i);
                let root_j = find_root(&mut parents, j);
                if root_i != root_j {
                    parents[root_j.max(root_i)] = root_i.min(root_j);
                }
            }
        }
    }

    let mut class_of_root: Vec<Option<usize>> = vec![None; rects.len()];
    let mut labels = Vec::with_capacity(rects.len());
    let mut n_classes = 0;

    for i in 0..rects.len() {
        let root = find_root(&mut parents, i);
        let label = match class_of_root[root] {
            Some(label) => label,
            None => {
                class_of_root[root] = Some(n_classes);
                n_classes += 1;
                n_classes - 1
            }
        };
        labels.push(label);
    }

    (labels, n_classes)
}

/// Merge raw sliding-window hits into detections.
///
/// Similar rectangles are clustered and averaged; clusters with `group_threshold`
/// members or fewer are discarded, as are clusters nested inside a stronger one.
/// A `group_threshold` of zero returns the input unchanged.
pub fn group_rectangles(rects: &[Rect], group_threshold: usize, eps: f64) -> Vec<Rect> {
    if group_threshold == 0 || rects.is_empty() {
        return rects.to_vec();
    }

    let (labels, n_classes) = partition(rects, eps);

    let mut sums = vec![[0u64; 4]; n_classes];
    let mut counts = vec![0usize; n_classes];
    for (rect, &label) in rects.iter().zip(labels.iter()) {
        sums[label][0] += rect.x as u64;
        sums[label][1] += rect.y as u64;
        sums[label][2] += rect.width as u64;
        sums[label][3] += rect.height as u64;
        counts[label] += 1;
    }

    let averaged: Vec<Rect> = sums
        .iter()
        .zip(counts.iter())
        .map(|(sum, &count)| {
            let s = 1.0 / count as f64;
            Rect::new(
                (sum[0] as f64 * s).round() as u32,
                (sum[1] as f64 * s).round() as u32,
                (sum[2] as f64 * s).round() as u32,
                (sum[3] as f64 * s).round() as u32,
            )
        })
        .collect();

    let mut grouped = Vec::with_capacity(n_classes);

    for i in 0..n_classes {
        let n1 = counts[i];
        if n1 <= group_threshold {
            continue;
        }
        let r1 = &averaged[i];

        let nested = (0..n_classes).any(|j| {
            let n2 = counts[j];
            if j == i || n2 <= group_threshold {
                return false;
            }
            let r2 = &averaged[j];
            let dx = (r2.width as f64 * eps).round() as i64;
            let dy = (r2.height as f64 * eps).round() as i64;

            r1.x as i64 >= r2.x as i64 - dx
                && r1.y as i64 >= r2.y as i64 - dy
                && r1.right() as i64 <= r2.right() as i64 + dx
                && r1.bottom() as i64 <= r2.bottom() as i64 + dy
                && (n2 > n1.max(3) || n1 < 3)
        });

        if !nested {
            grouped.push(*r1);
        }
    }

    grouped
}


#[cfg(test)]
mod tests {
    use crate::pipeline::processing::grouping::group_rectangles;
    use crate::pipeline::processing::rect::Rect;

    fn jittered(x: u32, y: u32, size: u32, count: u32) -> Vec<Rect> {
        (0..count).map(|i| Rect::new(x + i % 2, y + i % 3, size, size)).collect()
    }

    #[test]
    fn test_group_merges_cluster() {
        let rects = jittered(100, 100, 50, 8);
        let grouped = group_rectangles(&rects, 5, 0.2);

        assert_eq!(grouped.len(), 1);
        let rect = grouped[0];
        assert!(rect.x >= 100 && rect.x <= 101);
        assert!(rect.y >= 100 && rect.y <= 102);
        assert_eq!(rect.width, 50);
    }

    #[test]
    fn test_group_drops_weak_clusters() {
        let mut rects = jittered(100, 100, 50, 8);
        rects.extend(jittered(300, 20, 40, 3));

        let grouped = group_rectangles(&rects, 5, 0.2);
        assert_eq!(grouped.len(), 1);
        assert!(grouped[0].x < 200);
    }

    #[test]
    fn test_group_chains_transitively() {
        // Neighbours are similar pairwise, the ends are not; they still form one cluster.
        let rects: Vec<Rect> = (0..10).map(|i| Rect::new(100 + i * 4, 100, 60, 60)).collect();
        let grouped = group_rectangles(&rects, 5, 0.2);

        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].x, 118);
    }

    #[test]
    fn test_group_suppresses_nested() {
        let mut rects = jittered(100, 100, 100, 12);
        rects.extend(jittered(130, 130, 30, 6));

        let grouped = group_rectangles(&rects, 5, 0.2);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].width, 100);
    }

    #[test]
    fn test_group_threshold_zero_is_identity() {
        let rects = vec![Rect::new(1, 2, 3, 4), Rect::new(50, 50, 10, 10)];
        assert_eq!(group_rectangles(&rects, 0, 0.2), rects);
    }
}
