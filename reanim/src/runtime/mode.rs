//! Playback modes and the per-mode strategies that the scheduler and resolver call into.

use crate::{
    AnimationConfig, DiagnosticSink, Error, MARKER_HIDDEN, MergedTracks, TrackKind,
    VisibilityWindow, resolve_visibility,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub enum PlaybackMode {
    /// At most two tracks, no time windows; always loops.
    Simple,
    /// A rig of parts on one shared timeline, no definition tracks.
    Skeleton,
    /// Time windows gate sub-sequences of one timeline.
    Sequence,
    /// Many independent sub-element timelines.
    ComplexScene,
    /// Time-window state layer composited with a part layer.
    Blended,
}

/// Track statistics the mode heuristic looks at.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct TrackStats {
    pub tracks: usize,
    pub definition_tracks: usize,
    pub visual_tracks: usize,
    /// Any track carries a hidden marker.
    pub has_time_markers: bool,
}

impl TrackStats {
    pub fn of(tracks: &MergedTracks) -> Self {
        Self {
            tracks: tracks.len(),
            definition_tracks: tracks.count_kind(TrackKind::Definition),
            visual_tracks: tracks.count_kind(TrackKind::Visual),
            has_time_markers: tracks
                .iter()
                .any(|(_, t)| t.frames.iter().any(|f| f.marker == MARKER_HIDDEN)),
        }
    }
}

impl PlaybackMode {
    pub const COMPLEX_SCENE_MIN_TRACKS: usize = 40;
    pub const COMPLEX_SCENE_MIN_DEFINITIONS: usize = 10;
    pub const SIMPLE_MAX_TRACKS: usize = 2;
    pub const SKELETON_MAX_TRACKS: usize = 30;

    /// Heuristic decision tree. Large scenes are checked before Blended so that they are not
    /// mistaken for a two-layer rig.
    pub fn classify(stats: &TrackStats) -> Self {
        if stats.tracks >= Self::COMPLEX_SCENE_MIN_TRACKS
            || stats.definition_tracks >= Self::COMPLEX_SCENE_MIN_DEFINITIONS
        {
            return PlaybackMode::ComplexScene;
        }
        if stats.definition_tracks >= 2 && stats.visual_tracks >= 2 {
            return PlaybackMode::Blended;
        }
        if stats.definition_tracks > 0 || stats.has_time_markers {
            return PlaybackMode::Sequence;
        }
        if stats.tracks <= Self::SIMPLE_MAX_TRACKS {
            return PlaybackMode::Simple;
        }
        if stats.tracks > Self::SKELETON_MAX_TRACKS {
            // Too small for a scene and no sub-timelines to drive independently.
            log::debug!(
                "{} plain tracks is above the usual rig size; sharing one timeline",
                stats.tracks
            );
        }
        PlaybackMode::Skeleton
    }

    /// Explicit configuration first, then the heuristic.
    pub fn select(config: &AnimationConfig, skeleton: &str, stats: &TrackStats) -> Self {
        config
            .configured_mode(skeleton)
            .unwrap_or_else(|| Self::classify(stats))
    }

    pub fn strategy(self) -> &'static dyn PlaybackStrategy {
        match self {
            PlaybackMode::Simple => &SimpleMode,
            PlaybackMode::Skeleton => &SkeletonMode,
            PlaybackMode::Sequence => &SequenceMode,
            PlaybackMode::ComplexScene => &ComplexSceneMode,
            PlaybackMode::Blended => &BlendedMode,
        }
    }
}

/// Mode-specific behaviour, chosen once when a skeleton is bound.
pub trait PlaybackStrategy: Send + Sync {
    fn mode(&self) -> PlaybackMode;

    /// Loop flag that overrides every request.
    fn forced_loop(&self) -> Option<bool> {
        None
    }

    /// Loop flag when neither the request nor the entity has one.
    fn default_loop(&self) -> bool;

    /// Whether playing a single animation replaces the whole active set.
    fn replaces_on_play(&self) -> bool;

    /// Whether all active animations run on one synchronized clock.
    fn shared_timeline(&self) -> bool;

    fn honors_track_markers(&self) -> bool {
        true
    }

    fn window(
        &self,
        tracks: &MergedTracks,
        skeleton: &str,
        name: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<VisibilityWindow, Error>;

    /// Per-animation override wins, then the entity flag, then the mode default.
    fn resolve_loop(&self, requested: Option<bool>, entity: Option<bool>) -> bool {
        self.forced_loop()
            .unwrap_or_else(|| requested.or(entity).unwrap_or(self.default_loop()))
    }
}

/// Whole-timeline window for modes without definition tracks. Accepts the skeleton's own name
/// or any track name.
fn whole_timeline(
    tracks: &MergedTracks,
    skeleton: &str,
    name: &str,
) -> Result<VisibilityWindow, Error> {
    if name == skeleton || tracks.id(name).is_some() {
        Ok(VisibilityWindow::full(name, tracks.frame_count()))
    } else {
        Err(Error::UnknownAnimation {
            name: name.to_string(),
        })
    }
}

#[derive(Debug)]
pub struct SimpleMode;

impl PlaybackStrategy for SimpleMode {
    fn mode(&self) -> PlaybackMode {
        PlaybackMode::Simple
    }

    fn forced_loop(&self) -> Option<bool> {
        Some(true)
    }

    fn default_loop(&self) -> bool {
        true
    }

    fn replaces_on_play(&self) -> bool {
        true
    }

    fn shared_timeline(&self) -> bool {
        true
    }

    fn honors_track_markers(&self) -> bool {
        false
    }

    fn window(
        &self,
        tracks: &MergedTracks,
        skeleton: &str,
        name: &str,
        _sink: &mut dyn DiagnosticSink,
    ) -> Result<VisibilityWindow, Error> {
        whole_timeline(tracks, skeleton, name)
    }
}

#[derive(Debug)]
pub struct SkeletonMode;

impl PlaybackStrategy for SkeletonMode {
    fn mode(&self) -> PlaybackMode {
        PlaybackMode::Skeleton
    }

    fn default_loop(&self) -> bool {
        true
    }

    fn replaces_on_play(&self) -> bool {
        true
    }

    fn shared_timeline(&self) -> bool {
        true
    }

    fn window(
        &self,
        tracks: &MergedTracks,
        skeleton: &str,
        name: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<VisibilityWindow, Error> {
        let has_definition = tracks
            .all_named(name)
            .any(|(_, t)| t.kind == TrackKind::Definition);
        if has_definition {
            resolve_visibility(tracks, name, sink)
        } else {
            whole_timeline(tracks, skeleton, name)
        }
    }
}

#[derive(Debug)]
pub struct SequenceMode;

impl PlaybackStrategy for SequenceMode {
    fn mode(&self) -> PlaybackMode {
        PlaybackMode::Sequence
    }

    fn default_loop(&self) -> bool {
        false
    }

    fn replaces_on_play(&self) -> bool {
        true
    }

    fn shared_timeline(&self) -> bool {
        true
    }

    fn window(
        &self,
        tracks: &MergedTracks,
        _skeleton: &str,
        name: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<VisibilityWindow, Error> {
        resolve_visibility(tracks, name, sink)
    }
}

#[derive(Debug)]
pub struct ComplexSceneMode;

impl PlaybackStrategy for ComplexSceneMode {
    fn mode(&self) -> PlaybackMode {
        PlaybackMode::ComplexScene
    }

    fn default_loop(&self) -> bool {
        true
    }

    fn replaces_on_play(&self) -> bool {
        false
    }

    fn shared_timeline(&self) -> bool {
        false
    }

    fn window(
        &self,
        tracks: &MergedTracks,
        _skeleton: &str,
        name: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<VisibilityWindow, Error> {
        resolve_visibility(tracks, name, sink)
    }
}

#[derive(Debug)]
pub struct BlendedMode;

impl PlaybackStrategy for BlendedMode {
    fn mode(&self) -> PlaybackMode {
        PlaybackMode::Blended
    }

    fn default_loop(&self) -> bool {
        true
    }

    fn replaces_on_play(&self) -> bool {
        false
    }

    fn shared_timeline(&self) -> bool {
        false
    }

    fn window(
        &self,
        tracks: &MergedTracks,
        _skeleton: &str,
        name: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<VisibilityWindow, Error> {
        resolve_visibility(tracks, name, sink)
    }
}
