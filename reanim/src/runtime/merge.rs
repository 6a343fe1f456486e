use crate::ids::NameTable;
use crate::{AnimationDefinition, Frame, TrackId, TrackKind};

/// Dense per-frame array of one track, produced by frame inheritance.
#[derive(Clone, Debug, PartialEq)]
pub struct MergedTrack {
    pub name: String,
    pub kind: TrackKind,
    /// Any keyframe set a position, scale or skew field.
    pub has_transform: bool,
    pub frames: Vec<Frame>,
}

impl MergedTrack {
    pub fn frame(&self, physical: usize) -> Option<&Frame> {
        self.frames.get(physical)
    }

    /// Bind pose used as the reference for parent offsets.
    pub fn bind_pose(&self) -> Option<&Frame> {
        self.frames.first()
    }
}

/// All merged tracks of one definition. Every track has `frame_count` frames.
#[derive(Clone, Debug, Default)]
pub struct MergedTracks {
    tracks: Vec<MergedTrack>,
    names: NameTable,
    frame_count: usize,
}

impl MergedTracks {
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn id(&self, name: &str) -> Option<TrackId> {
        self.names.get(name)
    }

    pub fn get(&self, id: TrackId) -> Option<&MergedTrack> {
        self.tracks.get(id.index())
    }

    pub fn by_name(&self, name: &str) -> Option<&MergedTrack> {
        self.id(name).and_then(|id| self.get(id))
    }

    pub fn name(&self, id: TrackId) -> Option<&str> {
        self.names.name(id)
    }

    /// Tracks in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (TrackId, &MergedTrack)> {
        self.tracks
            .iter()
            .enumerate()
            .map(|(i, t)| (TrackId(i as u32), t))
    }

    /// Every track sharing `name`, including later duplicates.
    pub fn all_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = (TrackId, &'a MergedTrack)> + 'a {
        self.iter().filter(move |(_, t)| t.name == name)
    }

    pub fn count_kind(&self, kind: TrackKind) -> usize {
        self.tracks.iter().filter(|t| t.kind == kind).count()
    }
}

/// Compile sparse keyframes into dense frames.
///
/// Each field keeps an accumulator seeded with [`Frame::default`]; a keyframe overwrites only
/// the fields it specifies, and every frame index receives its own copy of the accumulator.
/// A definition with no tracks or no frames yields empty merged tracks.
pub fn build_merged_tracks(definition: &AnimationDefinition) -> MergedTracks {
    let frame_count = definition.frame_count();
    if definition.tracks.is_empty() || frame_count == 0 {
        return MergedTracks::default();
    }

    let mut names = NameTable::default();
    let mut tracks = Vec::with_capacity(definition.tracks.len());
    for track in &definition.tracks {
        names.push(track.name.as_str());

        let mut current = Frame::default();
        let mut frames = Vec::with_capacity(frame_count);
        for index in 0..frame_count {
            if let Some(key) = track.keyframes.get(index) {
                current.apply(key);
            }
            frames.push(current.clone());
        }

        tracks.push(MergedTrack {
            name: track.name.clone(),
            kind: track.kind(),
            has_transform: track.has_transform(),
            frames,
        });
    }
    debug_assert_eq!(names.len(), tracks.len());

    MergedTracks {
        tracks,
        names,
        frame_count,
    }
}
