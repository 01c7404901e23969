//! Barcode border localization.
//!
//! Scans probe lines from each image edge inward for the transition from
//! background to the outer black frame, fits one line per edge, and
//! intersects adjacent edges to produce the four corners. Right and bottom
//! edges are reported one past the last black pixel, so the corners
//! delimit the barcode as a half-open rectangle in the undistorted case.

use super::{BinaryMatrix, LocateError};

/// Probe lines scanned per edge.
const PROBES: usize = 7;
/// Minimum probe hits required to fit an edge line.
const MIN_HITS: usize = 3;
/// Probe band: central fraction of the orthogonal dimension.
const BAND_START: f64 = 0.25;
const BAND_SPAN: f64 = 0.5;
/// Minimum quadrilateral area in square pixels.
const MIN_AREA: f64 = 64.0;

/// Locates the four outer corners of the barcode.
///
/// Returns `(x0,y0,..,x3,y3)` in TL, TR, BR, BL scan order.
pub(super) fn find_borders(matrix: &BinaryMatrix) -> Result<[i32; 8], LocateError> {
    let w = matrix.width() as i32;
    let h = matrix.height() as i32;
    let run = (w.min(h) / 128).max(2);

    let mut left = Vec::with_capacity(PROBES);
    let mut right = Vec::with_capacity(PROBES);
    let mut top = Vec::with_capacity(PROBES);
    let mut bottom = Vec::with_capacity(PROBES);

    for i in 0..PROBES {
        let t = BAND_START + BAND_SPAN * i as f64 / (PROBES - 1) as f64;

        let y = (f64::from(h) * t) as i32;
        if let Some(x) = scan_run(|x| matrix.get(x, y), 0, w, 1, run) {
            left.push((f64::from(y), f64::from(x)));
        }
        if let Some(x) = scan_run(|x| matrix.get(x, y), w - 1, -1, -1, run) {
            right.push((f64::from(y), f64::from(x + 1)));
        }

        let x = (f64::from(w) * t) as i32;
        if let Some(y) = scan_run(|y| matrix.get(x, y), 0, h, 1, run) {
            top.push((f64::from(x), f64::from(y)));
        }
        if let Some(y) = scan_run(|y| matrix.get(x, y), h - 1, -1, -1, run) {
            bottom.push((f64::from(x), f64::from(y + 1)));
        }
    }

    for hits in [&left, &right, &top, &bottom] {
        if hits.len() < MIN_HITS {
            return Err(LocateError::BorderNotFound("too few edge transitions"));
        }
    }

    // Near-vertical edges are fit as x = a + b*y, near-horizontal as
    // y = a + b*x, so the fits stay well conditioned under skew.
    let left_line = fit_line(&left).ok_or(LocateError::BorderNotFound("left edge degenerate"))?;
    let right_line =
        fit_line(&right).ok_or(LocateError::BorderNotFound("right edge degenerate"))?;
    let top_line = fit_line(&top).ok_or(LocateError::BorderNotFound("top edge degenerate"))?;
    let bottom_line =
        fit_line(&bottom).ok_or(LocateError::BorderNotFound("bottom edge degenerate"))?;

    let tl = intersect(left_line, top_line)
        .ok_or(LocateError::BorderNotFound("left/top edges parallel"))?;
    let tr = intersect(right_line, top_line)
        .ok_or(LocateError::BorderNotFound("right/top edges parallel"))?;
    let br = intersect(right_line, bottom_line)
        .ok_or(LocateError::BorderNotFound("right/bottom edges parallel"))?;
    let bl = intersect(left_line, bottom_line)
        .ok_or(LocateError::BorderNotFound("left/bottom edges parallel"))?;

    validate_quad(&[tl, tr, br, bl], w, h)?;

    Ok([
        tl.0.round() as i32,
        tl.1.round() as i32,
        tr.0.round() as i32,
        tr.1.round() as i32,
        br.0.round() as i32,
        br.1.round() as i32,
        bl.0.round() as i32,
        bl.1.round() as i32,
    ])
}

/// Scans from `start` in `step` direction for the first run of `run`
/// consecutive black pixels; returns the outermost black pixel of the
/// confirmed run.
fn scan_run(sample: impl Fn(i32) -> u8, start: i32, end: i32, step: i32, run: i32) -> Option<i32> {
    let mut count = 0;
    let mut pos = start;
    while pos != end {
        if sample(pos) == 0 {
            count += 1;
            if count == run {
                // Outermost black pixel of the confirmed run.
                return Some(pos - step * (run - 1));
            }
        } else {
            count = 0;
        }
        pos += step;
    }
    None
}

/// Least-squares fit of `v = a + b*u` over `(u, v)` samples.
fn fit_line(samples: &[(f64, f64)]) -> Option<(f64, f64)> {
    let n = samples.len() as f64;
    let mean_u = samples.iter().map(|s| s.0).sum::<f64>() / n;
    let mean_v = samples.iter().map(|s| s.1).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut variance = 0.0;
    for &(u, v) in samples {
        covariance += (u - mean_u) * (v - mean_v);
        variance += (u - mean_u) * (u - mean_u);
    }
    if variance < f64::EPSILON {
        return None;
    }
    let slope = covariance / variance;
    Some((mean_v - slope * mean_u, slope))
}

/// Intersects `x = av + bv*y` with `y = ah + bh*x`.
fn intersect(vertical: (f64, f64), horizontal: (f64, f64)) -> Option<(f64, f64)> {
    let (av, bv) = vertical;
    let (ah, bh) = horizontal;
    let denominator = 1.0 - bv * bh;
    if denominator.abs() < 1e-9 {
        return None;
    }
    let x = (av + bv * ah) / denominator;
    let y = ah + bh * x;
    (x.is_finite() && y.is_finite()).then_some((x, y))
}

/// Rejects non-convex, tiny, or out-of-frame corner sets.
fn validate_quad(corners: &[(f64, f64); 4], w: i32, h: i32) -> Result<(), LocateError> {
    let slack_x = f64::from(w) * 0.1;
    let slack_y = f64::from(h) * 0.1;
    for &(x, y) in corners {
        if x < -slack_x || x > f64::from(w) + slack_x || y < -slack_y || y > f64::from(h) + slack_y
        {
            return Err(LocateError::BorderNotFound("corner outside frame"));
        }
    }

    // Clockwise in image coordinates (y down): every consecutive edge pair
    // must turn the same way.
    let mut area = 0.0;
    for i in 0..4 {
        let a = corners[i];
        let b = corners[(i + 1) % 4];
        let c = corners[(i + 2) % 4];
        let cross = (b.0 - a.0) * (c.1 - b.1) - (b.1 - a.1) * (c.0 - b.0);
        if cross <= 0.0 {
            return Err(LocateError::BorderNotFound("corners not convex"));
        }
        area += a.0 * b.1 - b.0 * a.1;
    }
    if area.abs() / 2.0 < MIN_AREA {
        return Err(LocateError::BorderNotFound("barcode area too small"));
    }
    Ok(())
}
