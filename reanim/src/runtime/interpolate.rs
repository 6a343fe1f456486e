use crate::{Frame, VisibilityWindow};

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Blend two dense frames. Image and marker always come from `a`.
pub fn lerp_frame(a: &Frame, b: &Frame, t: f32) -> Frame {
    Frame {
        x: lerp(a.x, b.x, t),
        y: lerp(a.y, b.y, t),
        scale_x: lerp(a.scale_x, b.scale_x, t),
        scale_y: lerp(a.scale_y, b.scale_y, t),
        skew_x: lerp(a.skew_x, b.skew_x, t),
        skew_y: lerp(a.skew_y, b.skew_y, t),
        alpha: lerp(a.alpha, b.alpha, t),
        marker: a.marker,
        image: a.image.clone(),
    }
}

/// Sample a track at a fractional logical frame of `window`.
///
/// Returns `None` when the window is empty or maps outside `frames`. Never extrapolates: at the
/// last logical frame the frame itself is returned.
pub fn interpolate_frame(window: &VisibilityWindow, frames: &[Frame], frame: f32) -> Option<Frame> {
    let frame = if frame.is_finite() { frame.max(0.0) } else { 0.0 };
    let logical = frame.floor();
    let t = frame - logical;
    let logical = logical as usize;

    let physical = window.logical_to_physical(logical)?;
    let current = frames.get(physical)?;
    if t <= 0.0 {
        return Some(current.clone());
    }

    let next = window
        .logical_to_physical_checked(logical + 1)
        .and_then(|p| frames.get(p));
    match next {
        Some(next) => Some(lerp_frame(current, next, t)),
        None => Some(current.clone()),
    }
}

/// Physical frame that `frame` reads from, with the same clamping as [`interpolate_frame`].
pub fn physical_frame(window: &VisibilityWindow, frame: f32) -> Option<usize> {
    let frame = if frame.is_finite() { frame.max(0.0) } else { 0.0 };
    window.logical_to_physical(frame.floor() as usize)
}
