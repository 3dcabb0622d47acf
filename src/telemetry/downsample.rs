//! Largest-Triangle-Three-Buckets down-sampling for line series.
//!
//! Gaps survive: a bucket holding any `None` value contributes one `None`
//! point besides its selected vertex, so a failed probe never turns into
//! a continuous line after reduction.

/// `[time_ms, value]`; `None` is a gap in the line.
pub type Point = (i64, Option<f64>);

/// Reduce `points` to roughly `threshold` points, keeping visual extremes.
///
/// Series at or below the threshold (or thresholds below 3) are returned
/// unchanged. The output can exceed `threshold` by one gap marker per
/// bucket that contained a gap.
pub fn lttb(points: &[Point], threshold: usize) -> Vec<Point> {
    let len = points.len();
    if threshold < 3 || len <= threshold {
        return points.to_vec();
    }

    let mut out = Vec::with_capacity(threshold + 8);
    out.push(points[0]);

    let bucket_size = (len - 2) as f64 / (threshold - 2) as f64;
    let mut anchor = (points[0].0 as f64, points[0].1.unwrap_or(0.0));

    for bucket in 0..threshold - 2 {
        let start = (bucket as f64 * bucket_size) as usize + 1;
        let end = (((bucket + 1) as f64 * bucket_size) as usize + 1).min(len - 1);

        let next_start = end;
        let next_end = (((bucket + 2) as f64 * bucket_size) as usize + 1).min(len);
        let next_avg = average(&points[next_start..next_end]).unwrap_or(anchor);

        let mut best: Option<(usize, f64)> = None;
        let mut gap: Option<usize> = None;
        for (offset, point) in points[start..end].iter().enumerate() {
            let idx = start + offset;
            let Some(y) = point.1 else {
                gap.get_or_insert(idx);
                continue;
            };
            let area = ((anchor.0 - next_avg.0) * (y - anchor.1)
                - (anchor.0 - point.0 as f64) * (next_avg.1 - anchor.1))
                .abs();
            if best.map_or(true, |(_, a)| area > a) {
                best = Some((idx, area));
            }
        }

        let mut picked: Vec<usize> = best.map(|(i, _)| i).into_iter().chain(gap).collect();
        picked.sort_unstable();
        for idx in picked {
            out.push(points[idx]);
        }
        if let Some((idx, _)) = best {
            anchor = (points[idx].0 as f64, points[idx].1.unwrap_or(anchor.1));
        }
    }

    out.push(points[len - 1]);
    out
}

fn average(points: &[Point]) -> Option<(f64, f64)> {
    let (mut sx, mut sy, mut n) = (0.0, 0.0, 0usize);
    for (x, y) in points {
        if let Some(y) = y {
            sx += *x as f64;
            sy += *y;
            n += 1;
        }
    }
    (n > 0).then(|| (sx / n as f64, sy / n as f64))
}
