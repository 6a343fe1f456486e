use crate::test_support::{plant, rig, window_track};
use crate::{
    AnimationConfig, DiagnosticLog, Error, PlaybackMode, SkeletonConfig,
    TrackStats, build_merged_tracks,
};

fn stats(tracks: usize, definition_tracks: usize, visual_tracks: usize) -> TrackStats {
    TrackStats {
        tracks,
        definition_tracks,
        visual_tracks,
        has_time_markers: definition_tracks > 0,
    }
}

#[test]
fn heuristic_follows_precedence() {
    assert_eq!(PlaybackMode::classify(&stats(45, 3, 30)), PlaybackMode::ComplexScene);
    assert_eq!(PlaybackMode::classify(&stats(20, 10, 8)), PlaybackMode::ComplexScene);
    assert_eq!(PlaybackMode::classify(&stats(12, 3, 8)), PlaybackMode::Blended);
    assert_eq!(PlaybackMode::classify(&stats(4, 3, 1)), PlaybackMode::Sequence);
    assert_eq!(PlaybackMode::classify(&stats(2, 0, 2)), PlaybackMode::Simple);
    assert_eq!(PlaybackMode::classify(&stats(12, 0, 12)), PlaybackMode::Skeleton);
}

#[test]
fn large_rigs_below_the_scene_threshold_stay_on_one_timeline() {
    let top = PlaybackMode::SKELETON_MAX_TRACKS;
    assert_eq!(PlaybackMode::classify(&stats(top, 0, top)), PlaybackMode::Skeleton);
    assert_eq!(PlaybackMode::classify(&stats(top + 5, 0, top + 5)), PlaybackMode::Skeleton);
    let scene = PlaybackMode::COMPLEX_SCENE_MIN_TRACKS;
    assert_eq!(PlaybackMode::classify(&stats(scene, 0, scene)), PlaybackMode::ComplexScene);
}

#[test]
fn hidden_markers_alone_make_a_sequence() {
    let stats = TrackStats {
        tracks: 5,
        definition_tracks: 0,
        visual_tracks: 5,
        has_time_markers: true,
    };
    assert_eq!(PlaybackMode::classify(&stats), PlaybackMode::Sequence);
}

#[test]
fn stats_are_read_from_merged_tracks() {
    let plant = build_merged_tracks(&plant());
    let stats = TrackStats::of(&plant);
    assert_eq!(stats.tracks, 5);
    assert_eq!(stats.definition_tracks, 2);
    assert_eq!(stats.visual_tracks, 3);
    assert!(stats.has_time_markers);
    assert_eq!(PlaybackMode::classify(&stats), PlaybackMode::Blended);

    let rig = build_merged_tracks(&rig(4));
    assert_eq!(PlaybackMode::classify(&TrackStats::of(&rig)), PlaybackMode::Skeleton);
}

#[test]
fn explicit_configuration_wins_over_heuristic() {
    let mut config = AnimationConfig::default();
    let heuristic = stats(12, 3, 8);
    assert_eq!(PlaybackMode::select(&config, "plant", &heuristic), PlaybackMode::Blended);

    config.skeletons.insert(
        "plant".to_string(),
        SkeletonConfig {
            mode: Some(PlaybackMode::Sequence),
            ..SkeletonConfig::default()
        },
    );
    assert_eq!(PlaybackMode::select(&config, "plant", &heuristic), PlaybackMode::Sequence);

    config
        .modes
        .insert("plant".to_string(), PlaybackMode::ComplexScene);
    assert_eq!(
        PlaybackMode::select(&config, "plant", &heuristic),
        PlaybackMode::ComplexScene
    );
}

#[test]
fn loop_resolution_prefers_request_then_entity_then_mode() {
    let sequence = PlaybackMode::Sequence.strategy();
    assert!(!sequence.resolve_loop(None, None));
    assert!(sequence.resolve_loop(None, Some(true)));
    assert!(!sequence.resolve_loop(Some(false), Some(true)));

    let simple = PlaybackMode::Simple.strategy();
    assert!(simple.resolve_loop(Some(false), Some(false)));
}

#[test]
fn whole_timeline_modes_accept_skeleton_and_track_names() {
    let tracks = build_merged_tracks(&rig(6));
    let strategy = PlaybackMode::Skeleton.strategy();
    let mut log = DiagnosticLog::default();

    let window = strategy.window(&tracks, "rig", "rig", &mut log).expect("skeleton name");
    assert_eq!(window.visible_count(), 6);
    assert!(strategy.window(&tracks, "rig", "arm", &mut log).is_ok());
    assert_eq!(
        strategy.window(&tracks, "rig", "anim_fly", &mut log).unwrap_err(),
        Error::UnknownAnimation {
            name: "anim_fly".to_string()
        }
    );
}

#[test]
fn skeleton_mode_uses_a_definition_track_when_present() {
    let mut definition = rig(4);
    definition
        .tracks
        .push(window_track("anim_blink", &[false, true, true, false]));
    let tracks = build_merged_tracks(&definition);
    let window = PlaybackMode::Skeleton
        .strategy()
        .window(&tracks, "rig", "anim_blink", &mut DiagnosticLog::default())
        .expect("window");
    assert_eq!(window.visible_count(), 2);
}

#[test]
fn only_independent_modes_layer_on_play() {
    for mode in [PlaybackMode::Simple, PlaybackMode::Skeleton, PlaybackMode::Sequence] {
        assert!(mode.strategy().replaces_on_play(), "{mode:?}");
        assert!(mode.strategy().shared_timeline(), "{mode:?}");
    }
    for mode in [PlaybackMode::ComplexScene, PlaybackMode::Blended] {
        assert!(!mode.strategy().replaces_on_play(), "{mode:?}");
        assert!(!mode.strategy().shared_timeline(), "{mode:?}");
    }
}
