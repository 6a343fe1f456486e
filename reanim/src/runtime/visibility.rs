use crate::{
    Diagnostic, DiagnosticSink, Error, MARKER_VISIBLE, MergedTracks, TrackId, TrackKind,
};

/// Time window of one animation name over the shared dense timeline.
///
/// Logical frame `i` is the `i`-th physical frame whose marker is visible.
#[derive(Clone, Debug, PartialEq)]
pub struct VisibilityWindow {
    animation: String,
    track: Option<TrackId>,
    markers: Vec<i32>,
    visible: Vec<usize>,
}

impl VisibilityWindow {
    pub fn from_markers(animation: impl Into<String>, track: Option<TrackId>, markers: Vec<i32>) -> Self {
        let visible = markers
            .iter()
            .enumerate()
            .filter(|(_, m)| **m == MARKER_VISIBLE)
            .map(|(i, _)| i)
            .collect();
        Self {
            animation: animation.into(),
            track,
            markers,
            visible,
        }
    }

    /// Window covering every physical frame, for modes without time-window tracks.
    pub fn full(animation: impl Into<String>, frame_count: usize) -> Self {
        Self::from_markers(animation, None, vec![MARKER_VISIBLE; frame_count])
    }

    pub fn animation(&self) -> &str {
        &self.animation
    }

    /// Definition track the window was read from; `None` for full windows.
    pub fn track(&self) -> Option<TrackId> {
        self.track
    }

    pub fn markers(&self) -> &[i32] {
        &self.markers
    }

    /// Physical length (equal to the merged track length).
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// A window without visible frames cannot be played.
    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn is_visible(&self, physical: usize) -> bool {
        self.markers.get(physical) == Some(&MARKER_VISIBLE)
    }

    /// Out-of-range logical frames clamp to the last visible frame so finished animations hold.
    pub fn logical_to_physical(&self, logical: usize) -> Option<usize> {
        let last = self.visible.len().checked_sub(1)?;
        Some(self.visible[logical.min(last)])
    }

    pub fn logical_to_physical_checked(&self, logical: usize) -> Option<usize> {
        self.visible.get(logical).copied()
    }

    pub fn physical_to_logical(&self, physical: usize) -> Option<usize> {
        self.visible.binary_search(&physical).ok()
    }

    pub fn first_physical(&self) -> Option<usize> {
        self.visible.first().copied()
    }

    pub fn last_physical(&self) -> Option<usize> {
        self.visible.last().copied()
    }
}

/// Build the time window for `name` from its definition track.
///
/// A definition track without transform data is preferred. Any other track carrying the name is
/// accepted as a fallback and reported as ambiguous.
pub fn resolve_visibility(
    tracks: &MergedTracks,
    name: &str,
    sink: &mut dyn DiagnosticSink,
) -> Result<VisibilityWindow, Error> {
    let mut fallback = None;
    for (id, track) in tracks.all_named(name) {
        if track.kind == TrackKind::Definition && !track.has_transform {
            let markers = track.frames.iter().map(|f| f.marker).collect();
            return Ok(VisibilityWindow::from_markers(name, Some(id), markers));
        }
        if fallback.is_none() {
            fallback = Some((id, track));
        }
    }

    let Some((id, track)) = fallback else {
        return Err(Error::UnknownAnimation {
            name: name.to_string(),
        });
    };
    sink.report(Diagnostic::AmbiguousDefinitionTrack {
        animation: name.to_string(),
        track: track.name.clone(),
    });
    let markers = track.frames.iter().map(|f| f.marker).collect();
    Ok(VisibilityWindow::from_markers(name, Some(id), markers))
}
