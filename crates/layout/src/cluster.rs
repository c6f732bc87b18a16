//! Line position collection and clustering

use crate::{round_to, Axis, CanonicalLine, Tolerances};

/// Fixed coordinates of every line of one orientation
///
/// Vertical lines give x positions, horizontal lines give y positions.
pub fn line_positions(lines: &[CanonicalLine], axis: Axis, tolerance: f64) -> Vec<f64> {
    lines
        .iter()
        .filter(|line| line.axis(tolerance) == Some(axis))
        .map(|line| match axis {
            Axis::Vertical => line.x0,
            Axis::Horizontal => line.y0,
        })
        .collect()
}

/// Group sorted values whose gap to the previous member is at most `tolerance`
///
/// Each cluster is represented by the mean of its members, rounded to
/// `digits` decimals. Neighbouring clusters whose rounded representatives
/// end up within `tolerance` are merged, so adjacent outputs are always more
/// than `tolerance` apart and re-clustering the output returns it unchanged.
pub fn cluster_positions(values: &[f64], tolerance: f64, digits: u32) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(f64::total_cmp);

    let mut clusters: Vec<Vec<f64>> = Vec::new();
    for value in sorted {
        match clusters.last_mut() {
            Some(cluster) if cluster.last().is_some_and(|last| value - last <= tolerance) => {
                cluster.push(value)
            }
            _ => clusters.push(vec![value]),
        }
    }

    let representative =
        |cluster: &Vec<f64>| round_to(cluster.iter().sum::<f64>() / cluster.len() as f64, digits);

    loop {
        let representatives: Vec<f64> = clusters.iter().map(representative).collect();
        match representatives
            .windows(2)
            .position(|pair| pair[1] - pair[0] <= tolerance)
        {
            Some(i) => {
                let next = clusters.remove(i + 1);
                clusters[i].extend(next);
            }
            None => return representatives,
        }
    }
}

/// Clustered line positions of one orientation
pub fn clustered_positions(lines: &[CanonicalLine], axis: Axis, tolerances: &Tolerances) -> Vec<f64> {
    cluster_positions(
        &line_positions(lines, axis, tolerances.orientation_tolerance_pt),
        tolerances.cluster_tolerance_pt,
        tolerances.position_round_digits,
    )
}

/// Sorted, de-duplicated (after rounding) line positions of one orientation
pub fn unique_positions(lines: &[CanonicalLine], axis: Axis, tolerances: &Tolerances) -> Vec<f64> {
    let mut positions: Vec<f64> = line_positions(lines, axis, tolerances.orientation_tolerance_pt)
        .into_iter()
        .map(|p| round_to(p, tolerances.position_round_digits))
        .collect();
    positions.sort_by(f64::total_cmp);
    positions.dedup();
    positions
}

/// Position closest to `value`; ties resolve to the earlier position
pub fn nearest_position(value: f64, positions: &[f64]) -> Option<f64> {
    positions.iter().copied().fold(None, |best, pos| match best {
        Some(b) if (b - value).abs() <= (pos - value).abs() => Some(b),
        _ => Some(pos),
    })
}

/// Closest positions at or below and at or above `value`
pub fn nearest_bounds(value: f64, positions: &[f64]) -> (Option<f64>, Option<f64>) {
    let below = positions
        .iter()
        .copied()
        .filter(|p| *p <= value)
        .max_by(f64::total_cmp);
    let above = positions
        .iter()
        .copied()
        .filter(|p| *p >= value)
        .min_by(f64::total_cmp);
    (below, above)
}

/// Closest position at or left of `value`
pub fn nearest_left(value: f64, positions: &[f64]) -> Option<f64> {
    nearest_bounds(value, positions).0
}
