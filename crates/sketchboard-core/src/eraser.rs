//! Non-destructive eraser masking.
//!
//! An eraser stroke never becomes ink. When it ends, every ink path it
//! touches receives a copy of the stroke as an [`EraserMask`]; the path's own
//! points are left alone.

use crate::scene::{EraserMask, Path, PathId, contains_inclusive};
use crate::shapes::point_to_polyline_dist;
use kurbo::Point;

/// Samples closer than this on both axes are treated as duplicates.
const DUPLICATE_EPSILON: f64 = 1e-4;
/// Slack added to the hit threshold.
const HIT_SLACK: f64 = 0.5;

/// Effective radius of an eraser of the given stroke width.
pub fn eraser_radius(width: f64) -> f64 {
    (width / 2.0).max(2.0)
}

/// Resample a stroke so consecutive samples are at most `step` apart.
///
/// Zero-length segments contribute nothing. A single point is returned as-is.
pub fn sample_stroke_points(points: &[Point], step: f64) -> Vec<Point> {
    match points {
        [] => return Vec::new(),
        [only] => return vec![*only],
        _ => {}
    }

    let mut samples: Vec<Point> = Vec::new();
    for pair in points.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let delta = end - start;
        let length = delta.hypot();
        if length == 0.0 {
            continue;
        }
        let segments = ((length / step).ceil() as usize).max(1);
        for s in 0..=segments {
            let point = start + delta * (s as f64 / segments as f64);
            let duplicate = samples.last().is_some_and(|prev| {
                (prev.x - point.x).abs() < DUPLICATE_EPSILON && (prev.y - point.y).abs() < DUPLICATE_EPSILON
            });
            if !duplicate {
                samples.push(point);
            }
        }
    }
    samples
}

/// Whether any sample comes within reach of the path's stroke.
///
/// Samples outside the path's bounding box grown by the threshold are
/// skipped before the exact distance is computed.
pub fn mask_affects_path(path: &Path, samples: &[Point], radius: f64) -> bool {
    let Some(bounds) = path.bounds() else {
        return false;
    };
    let threshold = radius + path.width.max(0.0) / 2.0 + HIT_SLACK;
    let reach = bounds.inflate(threshold, threshold);
    samples
        .iter()
        .filter(|sample| contains_inclusive(reach, **sample))
        .any(|sample| point_to_polyline_dist(*sample, &path.points) <= threshold)
}

/// Attach a mask copied from the eraser stroke to every ink path it touches.
///
/// Returns the ids of the paths that received a mask. An empty stroke
/// changes nothing.
pub fn apply_eraser(paths: &mut [Path], stroke: &[Point], width: f64) -> Vec<PathId> {
    if stroke.is_empty() {
        return Vec::new();
    }
    let radius = eraser_radius(width);
    let step = (radius * 0.5).max(1.0);
    let samples = sample_stroke_points(stroke, step);

    let mut affected = Vec::new();
    for path in paths.iter_mut().filter(|path| !path.is_eraser()) {
        if mask_affects_path(path, &samples, radius) {
            path.eraser_masks.push(EraserMask::new(stroke.to_vec(), width));
            affected.push(path.id);
        }
    }
    log::debug!("eraser stroke masked {} path(s)", affected.len());
    affected
}
