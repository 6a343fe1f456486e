use crate::test_support::{assert_approx, assets_with, plant, rig};
use crate::{
    AnimationComponent, AnimationConfig, AnimationEngine, AnimationRequest, ComboConfig,
    ComponentStore, Diagnostic, DrawInstruction, EntityId, Error, MemoryAssets, PlayOptions,
    PlaybackEvent, SkeletonConfig,
};
use std::cell::RefCell;
use std::rc::Rc;

type Reports = Rc<RefCell<Vec<Diagnostic>>>;

fn engine_with(config: AnimationConfig) -> (AnimationEngine, Reports) {
    let reports: Reports = Rc::default();
    let sink = reports.clone();
    let engine = AnimationEngine::new(config, assets_with([plant(), rig(4)]))
        .expect("engine")
        .with_diagnostics(move |d: Diagnostic| sink.borrow_mut().push(d));
    (engine, reports)
}

fn draws(engine: &mut AnimationEngine, entity: EntityId) -> Vec<DrawInstruction> {
    engine.render_data(entity).expect("render data").to_vec()
}

fn draw<'a>(draws: &'a [DrawInstruction], track: &str) -> Option<&'a DrawInstruction> {
    draws.iter().find(|d| d.track_name == track)
}

fn attack_config() -> AnimationConfig {
    let mut attack = ComboConfig::new(["anim_idle", "anim_shoot"]);
    attack.delays.insert("anim_shoot".to_string(), 0.5);
    attack.loops.insert("anim_shoot".to_string(), false);
    let mut plant = SkeletonConfig::default();
    plant.combos.insert("attack".to_string(), attack);

    let mut config = AnimationConfig::default();
    config.skeletons.insert("plant".to_string(), plant);
    config
}

#[test]
fn finished_one_shot_hands_shared_track_back_to_the_looping_animation() {
    let (mut engine, _) = engine_with(AnimationConfig::default());
    let plant = EntityId(7);
    engine.spawn(plant, "plant").expect("spawn");
    engine
        .play_animation(plant, "anim_idle", PlayOptions::looped(true).with_fps(2.0))
        .expect("idle");
    engine
        .play_animation(plant, "anim_shoot", PlayOptions::looped(false).with_fps(20.0))
        .expect("shoot");

    engine.update(0.1);
    let first = draws(&mut engine, plant);
    let names: Vec<_> = first.iter().map(|d| d.track_name.as_str()).collect();
    assert_eq!(names, vec!["stem", "head", "barrel"]);
    let head = draw(&first, "head").expect("head");
    assert_eq!(head.animation, "anim_shoot");
    assert_approx(head.transform.x, 50.0);
    assert_eq!(draw(&first, "stem").expect("stem").animation, "anim_idle");
    assert_approx(draw(&first, "stem").expect("stem").transform.x, 2.0);
    assert!(engine.drain_events().is_empty());

    engine.update(0.1);
    let second = draws(&mut engine, plant);
    let head = draw(&second, "head").expect("head");
    assert_eq!(head.animation, "anim_idle");
    assert_approx(head.transform.x, 4.0);
    assert!(draw(&second, "barrel").is_none());
    assert_approx(draw(&second, "stem").expect("stem").transform.x, 4.0);
    assert_eq!(
        engine.drain_events(),
        vec![PlaybackEvent::Completed {
            entity: plant,
            animation: "anim_shoot".to_string()
        }]
    );

    let idle = engine
        .component(plant)
        .and_then(|c| c.state("anim_idle"))
        .expect("idle state");
    assert!(!idle.is_finished());
    assert_approx(idle.frame(), 0.4);
}

#[test]
fn invalid_command_does_not_disturb_the_rest_of_the_batch() {
    let (mut engine, reports) = engine_with(AnimationConfig::default());
    let a = EntityId(1);
    let b = EntityId(2);
    engine.spawn(a, "plant").expect("spawn a");
    engine.spawn(b, "plant").expect("spawn b");

    let first = engine.enqueue_command(a, AnimationRequest::animation("anim_idle"));
    let invalid = engine.enqueue_command(a, AnimationRequest::default());
    let last = engine.enqueue_command(b, AnimationRequest::animation("anim_shoot"));

    let failures = engine.update(0.0);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].error, Error::InvalidCommand { command: invalid });
    assert!(matches!(
        reports.borrow().as_slice(),
        [Diagnostic::CommandFailed { command, .. }] if *command == invalid
    ));

    for id in [first, invalid, last] {
        assert!(engine.commands().get(id).expect("command").is_processed());
    }
    let active = |e| {
        engine
            .component(e)
            .map(|c: &AnimationComponent| c.active_names().map(str::to_string).collect::<Vec<_>>())
            .unwrap_or_default()
    };
    assert_eq!(active(a), vec!["anim_idle"]);
    assert_eq!(active(b), vec!["anim_shoot"]);

    // A second pass over already processed commands changes nothing.
    assert!(engine.update(0.0).is_empty());
    assert_eq!(reports.borrow().len(), 1);
}

#[test]
fn commands_for_missing_entities_fail_without_panicking() {
    let (mut engine, _) = engine_with(AnimationConfig::default());
    engine.enqueue_command(EntityId(40), AnimationRequest::animation("anim_idle"));
    let failures = engine.update(0.016);
    assert_eq!(
        failures[0].error,
        Error::MissingComponent {
            entity: EntityId(40)
        }
    );
}

#[test]
fn combo_command_applies_start_delays() {
    let (mut engine, _) = engine_with(attack_config());
    let plant = EntityId(3);
    engine.spawn(plant, "plant").expect("spawn");
    engine.enqueue_command(plant, AnimationRequest::bound_combo("attack"));

    engine.update(0.1);
    let waiting = draws(&mut engine, plant);
    assert_eq!(draw(&waiting, "head").expect("head").animation, "anim_idle");
    assert!(draw(&waiting, "barrel").is_none());

    engine.update(0.5);
    let started = draws(&mut engine, plant);
    assert_eq!(draw(&started, "head").expect("head").animation, "anim_shoot");
    let shoot = engine
        .component(plant)
        .and_then(|c| c.state("anim_shoot"))
        .expect("shoot");
    assert!(!shoot.looped);
    assert_approx(shoot.frame(), 1.2);
}

#[test]
fn combo_for_another_skeleton_switches_the_binding() {
    let (mut engine, _) = engine_with(attack_config());
    let entity = EntityId(11);
    engine.spawn(entity, "rig").expect("spawn");
    engine.play_combo(entity, Some("plant"), "attack").expect("combo");

    let component = engine.component(entity).expect("component");
    assert_eq!(component.skeleton(), Some("plant"));
    assert_eq!(component.states().len(), 2);

    assert_eq!(
        engine.play_combo(entity, None, "dance").unwrap_err(),
        Error::UnknownCombo {
            skeleton: "plant".to_string(),
            combo: "dance".to_string()
        }
    );
}

#[test]
fn default_animation_starts_on_spawn() {
    let mut config = AnimationConfig::default();
    config.skeletons.insert(
        "rig".to_string(),
        SkeletonConfig {
            default_animation: Some("rig".to_string()),
            ..SkeletonConfig::default()
        },
    );
    let (mut engine, _) = engine_with(config);
    engine.spawn(EntityId(1), "rig").expect("spawn");
    let component = engine.component(EntityId(1)).expect("component");
    assert_eq!(component.active_names().collect::<Vec<_>>(), vec!["rig"]);

    engine.update(0.5);
    assert_eq!(
        engine.drain_events(),
        vec![PlaybackEvent::Looped {
            entity: EntityId(1),
            animation: "rig".to_string()
        }]
    );
}

#[test]
fn preview_frame_is_drawn_while_nothing_plays() {
    let mut config = AnimationConfig::default();
    config.skeletons.insert(
        "rig".to_string(),
        SkeletonConfig {
            preview_frame: Some(3),
            center_offset: Some([0.0, 0.0]),
            ..SkeletonConfig::default()
        },
    );
    let (mut engine, _) = engine_with(config);
    engine.spawn(EntityId(1), "rig").expect("spawn");

    let preview = draws(&mut engine, EntityId(1));
    assert_eq!(preview.len(), 3);
    assert_approx(draw(&preview, "hand").expect("hand").transform.x, 9.0);
    assert!(preview.iter().all(|d| d.animation.is_empty()));
}

#[test]
fn processed_commands_are_dropped_after_the_cleanup_delay() {
    let mut config = AnimationConfig::default();
    config.engine.command_cleanup_delay = Some(1.0);
    let (mut engine, _) = engine_with(config);
    engine.spawn(EntityId(1), "rig").expect("spawn");
    engine.enqueue_command(EntityId(1), AnimationRequest::animation("rig"));

    engine.update(0.5);
    assert_eq!(engine.commands().len(), 1);
    engine.update(0.6);
    assert_eq!(engine.commands().len(), 1);
    engine.update(0.5);
    assert!(engine.commands().is_empty());
}

#[test]
fn default_config_keeps_only_the_latest_command_batch() {
    let (mut engine, _) = engine_with(AnimationConfig::default());
    engine.spawn(EntityId(1), "rig").expect("spawn");

    for _ in 0..100 {
        let id = engine.enqueue_command(EntityId(1), AnimationRequest::animation("rig"));
        engine.update(1.0 / 60.0);
        assert_eq!(engine.commands().len(), 1);
        assert!(engine.commands().get(id).expect("latest").is_processed());
    }
    engine.update(1.0 / 60.0);
    assert!(engine.commands().is_empty());
}

#[test]
fn fixed_tick_uses_the_fps_override() {
    let mut config = AnimationConfig::default();
    config.engine.fps_override = Some(60.0);
    let (mut engine, _) = engine_with(config);
    engine.spawn(EntityId(1), "rig").expect("spawn");
    engine
        .play_animation(EntityId(1), "rig", PlayOptions::default())
        .expect("play");

    engine.tick();
    let state = engine
        .component(EntityId(1))
        .and_then(|c| c.state("rig"))
        .expect("state");
    assert_approx(state.frame(), 1.0);
}

#[test]
fn contract_violations_are_returned() {
    let (mut engine, _) = engine_with(AnimationConfig::default());
    assert_eq!(
        engine.render_data(EntityId(9)).unwrap_err(),
        Error::MissingComponent {
            entity: EntityId(9)
        }
    );

    engine.store_mut().insert(EntityId(5), AnimationComponent::new());
    assert_eq!(
        engine
            .play_animation(EntityId(5), "anim_idle", PlayOptions::default())
            .unwrap_err(),
        Error::MissingAnimationData {
            entity: EntityId(5)
        }
    );

    engine.spawn(EntityId(6), "plant").expect("spawn");
    assert_eq!(
        engine
            .play_animation(EntityId(6), "anim_fly", PlayOptions::default())
            .unwrap_err(),
        Error::UnknownAnimation {
            name: "anim_fly".to_string()
        }
    );
    assert!(matches!(
        engine.spawn(EntityId(7), "zombie"),
        Err(Error::UnknownSkeleton { .. })
    ));
}

#[test]
fn invalid_configuration_is_rejected_up_front() {
    let mut config = AnimationConfig::default();
    config.engine.tick_rate = 0.0;
    assert!(matches!(
        AnimationEngine::new(config, MemoryAssets::new()),
        Err(Error::InvalidValue { .. })
    ));
}

#[test]
fn images_missing_from_the_loader_are_skipped_and_reported() {
    let mut assets = MemoryAssets::new();
    assets.insert_definition(rig(4));
    assets.insert_image("IMAGE_BODY");
    let reports: Reports = Rc::default();
    let sink = reports.clone();
    let mut engine = AnimationEngine::new(AnimationConfig::default(), assets)
        .expect("engine")
        .with_diagnostics(move |d: Diagnostic| sink.borrow_mut().push(d));

    engine.spawn(EntityId(1), "rig").expect("spawn");
    engine
        .play_animation(EntityId(1), "rig", PlayOptions::default())
        .expect("play");
    let drawn = draws(&mut engine, EntityId(1));
    assert_eq!(drawn.len(), 1);
    assert!(drawn[0].image_handle.is_some());
    let unresolved = reports
        .borrow()
        .iter()
        .filter(|d| matches!(d, Diagnostic::UnresolvedImage { .. }))
        .count();
    assert_eq!(unresolved, 2);
}
