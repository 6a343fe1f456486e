//! Hand-built fixtures shared by the unit tests.

use crate::{
    AnimationDefinition, Keyframe, MARKER_HIDDEN, MARKER_VISIBLE, MemoryAssets, Track,
};

pub(crate) fn assert_approx(actual: f32, expected: f32) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= 1.0e-4,
        "expected {expected}, got {actual} (diff {diff})"
    );
}

pub(crate) fn at(x: f32, y: f32) -> Keyframe {
    Keyframe {
        x: Some(x),
        y: Some(y),
        ..Keyframe::default()
    }
}

pub(crate) fn image(path: &str) -> Keyframe {
    Keyframe {
        image: Some(path.to_string()),
        ..Keyframe::default()
    }
}

pub(crate) fn marker(value: i32) -> Keyframe {
    Keyframe {
        marker: Some(value),
        ..Keyframe::default()
    }
}

/// Time-window track: `true` frames are visible.
pub(crate) fn window_track(name: &str, visible: &[bool]) -> Track {
    Track::new(
        name,
        visible
            .iter()
            .map(|v| marker(if *v { MARKER_VISIBLE } else { MARKER_HIDDEN }))
            .collect(),
    )
}

/// Drawn track whose x equals `x_step * physical frame`, with an optional per-frame marker.
pub(crate) fn part_track(name: &str, frames: usize, x_step: f32, hidden: &[usize]) -> Track {
    let keyframes = (0..frames)
        .map(|i| {
            let mut key = at(x_step * i as f32, 0.0);
            if i == 0 {
                key.image = Some(format!("IMAGE_{}", name.to_uppercase()));
            }
            key.marker = Some(if hidden.contains(&i) {
                MARKER_HIDDEN
            } else {
                MARKER_VISIBLE
            });
            key
        })
        .collect();
    Track::new(name, keyframes)
}

/// Two-layer plant: `anim_idle` owns physical frames 0..3, `anim_shoot` owns 3..6.
///
/// `stem` is drawn only inside the idle window, `barrel` only inside the shoot window, `head`
/// everywhere. Every part's x is ten times the physical frame.
pub(crate) fn plant() -> AnimationDefinition {
    AnimationDefinition::new(
        "plant",
        12.0,
        vec![
            window_track("anim_idle", &[true, true, true, false, false, false]),
            window_track("anim_shoot", &[false, false, false, true, true, true]),
            part_track("stem", 6, 10.0, &[3, 4, 5]),
            part_track("head", 6, 10.0, &[]),
            part_track("barrel", 6, 10.0, &[0, 1, 2]),
        ],
    )
}

/// A rig of parts on one timeline with no time windows.
pub(crate) fn rig(frames: usize) -> AnimationDefinition {
    AnimationDefinition::new(
        "rig",
        10.0,
        vec![
            part_track("body", frames, 1.0, &[]),
            part_track("arm", frames, 2.0, &[]),
            part_track("hand", frames, 3.0, &[]),
        ],
    )
}

pub(crate) fn assets_with(definitions: impl IntoIterator<Item = AnimationDefinition>) -> MemoryAssets {
    let mut assets = MemoryAssets::new().with_implicit_images();
    for definition in definitions {
        assets.insert_definition(definition);
    }
    assets
}
