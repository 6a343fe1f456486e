use crate::{Diagnostic, DiagnosticSink, Frame, MergedTracks, TrackId};

/// A child track riding on a parent track's movement relative to the parent's bind pose.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ParentBinding {
    pub child: TrackId,
    pub parent: TrackId,
    /// Propagate skew deltas as a rotation about the parent's bind position.
    pub rotate: bool,
}

/// Movement of a parent track away from its bind pose.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ParentOffset {
    pub dx: f32,
    pub dy: f32,
    pub skew_x: f32,
    pub skew_y: f32,
    /// Parent bind position; the rotation pivot.
    pub pivot: [f32; 2],
}

impl ParentOffset {
    pub fn between(bind: &Frame, current: &Frame, rotate: bool) -> Self {
        let (skew_x, skew_y) = if rotate {
            (current.skew_x - bind.skew_x, current.skew_y - bind.skew_y)
        } else {
            (0.0, 0.0)
        };
        Self {
            dx: current.x - bind.x,
            dy: current.y - bind.y,
            skew_x,
            skew_y,
            pivot: [bind.x, bind.y],
        }
    }

    pub fn is_identity(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0 && self.skew_x == 0.0 && self.skew_y == 0.0
    }

    pub fn apply(&self, child: &mut Frame) {
        if self.skew_x != 0.0 {
            let (sin, cos) = self.skew_x.to_radians().sin_cos();
            let rx = child.x - self.pivot[0];
            let ry = child.y - self.pivot[1];
            child.x = self.pivot[0] + rx * cos - ry * sin;
            child.y = self.pivot[1] + rx * sin + ry * cos;
        }
        child.x += self.dx;
        child.y += self.dy;
        child.skew_x += self.skew_x;
        child.skew_y += self.skew_y;
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Visit {
    Pending,
    Active,
    Done,
}

/// Offset every bound child in `resolved` (indexed by track id), parents before children.
///
/// `fallback(parent, child)` supplies the parent's current frame when the parent itself produced
/// nothing this tick. Cyclic bindings are reported and skipped.
pub(crate) fn apply_parent_offsets(
    bindings: &[ParentBinding],
    tracks: &MergedTracks,
    resolved: &mut [Option<Frame>],
    fallback: &dyn Fn(TrackId, TrackId) -> Option<Frame>,
    sink: &mut dyn DiagnosticSink,
) {
    if bindings.is_empty() {
        return;
    }
    let mut visits = vec![Visit::Pending; resolved.len()];
    for binding in bindings {
        visit(
            binding.child,
            bindings,
            tracks,
            resolved,
            &mut visits,
            fallback,
            sink,
        );
    }
}

fn visit(
    track: TrackId,
    bindings: &[ParentBinding],
    tracks: &MergedTracks,
    resolved: &mut [Option<Frame>],
    visits: &mut [Visit],
    fallback: &dyn Fn(TrackId, TrackId) -> Option<Frame>,
    sink: &mut dyn DiagnosticSink,
) {
    let index = track.index();
    match visits.get(index) {
        Some(Visit::Pending) => {}
        Some(Visit::Active) => {
            sink.report(Diagnostic::ParentCycle {
                track: tracks.name(track).unwrap_or_default().to_string(),
            });
            return;
        }
        Some(Visit::Done) | None => return,
    }
    let Some(binding) = bindings.iter().find(|b| b.child == track) else {
        visits[index] = Visit::Done;
        return;
    };

    visits[index] = Visit::Active;
    visit(
        binding.parent,
        bindings,
        tracks,
        resolved,
        visits,
        fallback,
        sink,
    );
    if visits.get(binding.parent.index()) == Some(&Visit::Active) {
        // Parent is still on the stack: the cycle was reported above.
        visits[index] = Visit::Done;
        return;
    }
    visits[index] = Visit::Done;

    if resolved.get(index).is_none_or(Option::is_none) {
        return;
    }
    let Some(bind) = tracks.get(binding.parent).and_then(|p| p.bind_pose()) else {
        return;
    };
    let current = match resolved.get(binding.parent.index()).cloned().flatten() {
        Some(frame) => frame,
        None => match fallback(binding.parent, track) {
            Some(frame) => frame,
            None => return,
        },
    };

    let offset = ParentOffset::between(bind, &current, binding.rotate);
    if offset.is_identity() {
        return;
    }
    if let Some(Some(child)) = resolved.get_mut(index) {
        offset.apply(child);
    }
}
