/// Marker value for a frame inside an animation's time window.
pub const MARKER_VISIBLE: i32 = 0;

/// Marker value for a frame outside an animation's time window.
pub const MARKER_HIDDEN: i32 = -1;

/// Authored playback rate used when a definition does not carry one.
pub const DEFAULT_FPS: f32 = 12.0;

/// One authored sample. `None` fields are inherited from the previous frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Keyframe {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub scale_x: Option<f32>,
    pub scale_y: Option<f32>,
    pub skew_x: Option<f32>,
    pub skew_y: Option<f32>,
    pub alpha: Option<f32>,
    pub marker: Option<i32>,
    pub image: Option<String>,
}

impl Keyframe {
    pub fn has_transform(&self) -> bool {
        self.x.is_some()
            || self.y.is_some()
            || self.scale_x.is_some()
            || self.scale_y.is_some()
            || self.skew_x.is_some()
            || self.skew_y.is_some()
    }

    pub fn has_image(&self) -> bool {
        self.image.as_deref().is_some_and(|i| !i.is_empty())
    }
}

/// A fully resolved frame. Every field always has a value.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub skew_x: f32,
    pub skew_y: f32,
    pub alpha: f32,
    pub marker: i32,
    pub image: String,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            skew_x: 0.0,
            skew_y: 0.0,
            alpha: 1.0,
            marker: MARKER_VISIBLE,
            image: String::new(),
        }
    }
}

impl Frame {
    pub fn is_visible(&self) -> bool {
        self.marker == MARKER_VISIBLE
    }

    /// Overwrite every field the keyframe specifies.
    pub(crate) fn apply(&mut self, key: &Keyframe) {
        if let Some(v) = key.x {
            self.x = v;
        }
        if let Some(v) = key.y {
            self.y = v;
        }
        if let Some(v) = key.scale_x {
            self.scale_x = v;
        }
        if let Some(v) = key.scale_y {
            self.scale_y = v;
        }
        if let Some(v) = key.skew_x {
            self.skew_x = v;
        }
        if let Some(v) = key.skew_y {
            self.skew_y = v;
        }
        if let Some(v) = key.alpha {
            self.alpha = v;
        }
        if let Some(v) = key.marker {
            self.marker = v;
        }
        if let Some(v) = key.image.as_deref() {
            self.image.clear();
            self.image.push_str(v);
        }
    }
}

/// Capability tag computed once per track when it is merged.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum TrackKind {
    /// Carries only visibility markers; names an animation's time window.
    Definition,
    /// Carries image references and is drawn.
    Visual,
    /// Carries neither images nor markers (anchors, attach points).
    Logical,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Track {
    pub name: String,
    pub keyframes: Vec<Keyframe>,
}

impl Track {
    pub fn new(name: impl Into<String>, keyframes: Vec<Keyframe>) -> Self {
        Self {
            name: name.into(),
            keyframes,
        }
    }

    pub fn kind(&self) -> TrackKind {
        if self.keyframes.iter().any(Keyframe::has_image) {
            TrackKind::Visual
        } else if self.keyframes.iter().any(|k| k.marker.is_some()) {
            TrackKind::Definition
        } else {
            TrackKind::Logical
        }
    }

    pub fn has_transform(&self) -> bool {
        self.keyframes.iter().any(Keyframe::has_transform)
    }

    pub fn has_hidden_marker(&self) -> bool {
        self.keyframes.iter().any(|k| k.marker == Some(MARKER_HIDDEN))
    }
}

/// Immutable authored asset shared by every entity bound to it.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationDefinition {
    pub name: String,
    pub fps: f32,
    pub tracks: Vec<Track>,
}

impl AnimationDefinition {
    pub fn new(name: impl Into<String>, fps: f32, tracks: Vec<Track>) -> Self {
        let fps = if fps.is_finite() && fps > 0.0 {
            fps
        } else {
            DEFAULT_FPS
        };
        Self {
            name: name.into(),
            fps,
            tracks,
        }
    }

    /// Longest keyframe sequence across all tracks.
    pub fn frame_count(&self) -> usize {
        self.tracks
            .iter()
            .map(|t| t.keyframes.len())
            .max()
            .unwrap_or(0)
    }

    pub fn track(&self, name: &str) -> Option<(usize, &Track)> {
        self.tracks.iter().enumerate().find(|(_, t)| t.name == name)
    }
}
