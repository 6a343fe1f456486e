use crate::{
    AnimationComponent, AnimationConfig, AnimationRequest, AssetSource, CommandFailure, CommandId,
    CommandQueue, ComponentStore, Diagnostic, DiagnosticSink, DrawInstruction, EntityId,
    EntityStore, Error, ImageAtlas, LogSink, PlayOptions, PlaybackMode, RequestTarget,
    SkeletonBinding, SkeletonConfig, TrackStats, Transition, build_merged_tracks,
};
use std::collections::HashMap;
use std::sync::Arc;

/// Emitted by [`AnimationEngine::update`]; collect with [`AnimationEngine::drain_events`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PlaybackEvent {
    /// A looping animation wrapped around.
    Looped { entity: EntityId, animation: String },
    /// A one-shot reached its end. Reported once per play.
    Completed { entity: EntityId, animation: String },
}

impl PlaybackEvent {
    fn new(entity: EntityId, animation: String, transition: Transition) -> Self {
        match transition {
            Transition::Looped => PlaybackEvent::Looped { entity, animation },
            Transition::Completed => PlaybackEvent::Completed { entity, animation },
        }
    }

    pub fn entity(&self) -> EntityId {
        match self {
            PlaybackEvent::Looped { entity, .. } | PlaybackEvent::Completed { entity, .. } => {
                *entity
            }
        }
    }

    pub fn animation(&self) -> &str {
        match self {
            PlaybackEvent::Looped { animation, .. }
            | PlaybackEvent::Completed { animation, .. } => animation,
        }
    }
}

fn lookup<S: ComponentStore>(
    store: &mut S,
    entity: EntityId,
) -> Result<&mut AnimationComponent, Error> {
    store
        .get_mut(entity)
        .ok_or(Error::MissingComponent { entity })
}

fn lookup_bound<S: ComponentStore>(
    store: &mut S,
    entity: EntityId,
) -> Result<&mut AnimationComponent, Error> {
    let component = lookup(store, entity)?;
    if !component.is_bound() {
        return Err(Error::MissingAnimationData { entity });
    }
    Ok(component)
}

/// Start the configured default animation (or combo of that name), if any.
fn start_default(
    component: &mut AnimationComponent,
    config: Option<&SkeletonConfig>,
    sink: &mut dyn DiagnosticSink,
) -> Result<(), Error> {
    let Some(config) = config else {
        return Ok(());
    };
    let Some(name) = config.default_animation.as_deref() else {
        return Ok(());
    };
    match config.combos.get(name) {
        Some(combo) => component.apply_combo(combo, sink),
        None => component.play(name, PlayOptions::default(), sink),
    }
}

/// Owns every animated entity and drives them one tick at a time.
///
/// Configuration, asset loading and diagnostics are injected; entity storage is pluggable through
/// [`ComponentStore`].
pub struct AnimationEngine<S: ComponentStore = EntityStore> {
    config: AnimationConfig,
    assets: Box<dyn AssetSource>,
    store: S,
    diagnostics: Box<dyn DiagnosticSink>,
    /// Compiled data per definition name, shared by every entity bound to it.
    skeletons: HashMap<String, SkeletonBinding>,
    commands: CommandQueue,
    clock: f64,
    events: Vec<PlaybackEvent>,
}

impl AnimationEngine<EntityStore> {
    pub fn new(config: AnimationConfig, assets: impl AssetSource + 'static) -> Result<Self, Error> {
        Self::with_store(config, assets, EntityStore::new())
    }
}

impl<S: ComponentStore> AnimationEngine<S> {
    pub fn with_store(
        config: AnimationConfig,
        assets: impl AssetSource + 'static,
        store: S,
    ) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            config,
            assets: Box::new(assets),
            store,
            diagnostics: Box::new(LogSink),
            skeletons: HashMap::new(),
            commands: CommandQueue::new(),
            clock: 0.0,
            events: Vec::new(),
        })
    }

    pub fn with_diagnostics(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.set_diagnostics(sink);
        self
    }

    pub fn set_diagnostics(&mut self, sink: impl DiagnosticSink + 'static) {
        self.diagnostics = Box::new(sink);
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Seconds accumulated by [`Self::update`].
    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn component(&self, entity: EntityId) -> Option<&AnimationComponent> {
        self.store.get(entity)
    }

    pub fn component_mut(&mut self, entity: EntityId) -> Option<&mut AnimationComponent> {
        self.store.get_mut(entity)
    }

    pub fn commands(&self) -> &CommandQueue {
        &self.commands
    }

    /// Compiled binding for a definition, loading and caching it on first use.
    pub fn load_skeleton(&mut self, name: &str) -> Result<SkeletonBinding, Error> {
        if let Some(binding) = self.skeletons.get(name) {
            return Ok(binding.clone());
        }
        let definition = self.assets.load_definition(name)?;
        let tracks = Arc::new(build_merged_tracks(&definition));
        let atlas = ImageAtlas::load(&definition, self.assets.as_ref());
        let mode = PlaybackMode::select(&self.config, name, &TrackStats::of(&tracks));
        log::debug!(
            "compiled '{}': {} tracks, {} frames at {} fps, {:?} mode, {} images",
            name,
            tracks.len(),
            tracks.frame_count(),
            definition.fps,
            mode,
            atlas.len()
        );
        let binding = SkeletonBinding {
            definition,
            tracks,
            atlas: Some(Arc::new(atlas)),
            mode,
        };
        self.skeletons.insert(name.to_string(), binding.clone());
        Ok(binding)
    }

    /// Attach a component bound to `skeleton` and start its default animation.
    ///
    /// An entity that already has a component is rebound.
    pub fn spawn(&mut self, entity: EntityId, skeleton: &str) -> Result<(), Error> {
        let binding = self.load_skeleton(skeleton)?;
        let config = self.config.skeleton(skeleton);
        let component = AnimationComponent::bound(binding, config, self.diagnostics.as_mut());
        self.store.insert(entity, component);
        log::debug!("spawned entity {entity} with '{skeleton}'");
        let component = lookup(&mut self.store, entity)?;
        start_default(component, config, self.diagnostics.as_mut())
    }

    /// Switch an existing entity to another skeleton. Playback restarts from the default.
    pub fn bind_skeleton(&mut self, entity: EntityId, skeleton: &str) -> Result<(), Error> {
        if self.store.get(entity).is_none() {
            return Err(Error::MissingComponent { entity });
        }
        let binding = self.load_skeleton(skeleton)?;
        let config = self.config.skeleton(skeleton);
        let component = lookup(&mut self.store, entity)?;
        component.bind(binding, config, self.diagnostics.as_mut());
        log::debug!("entity {entity} switched to '{skeleton}'");
        start_default(component, config, self.diagnostics.as_mut())
    }

    pub fn despawn(&mut self, entity: EntityId) -> Option<AnimationComponent> {
        self.store.remove(entity)
    }

    pub fn play_animation(
        &mut self,
        entity: EntityId,
        name: &str,
        options: PlayOptions,
    ) -> Result<(), Error> {
        let component = lookup_bound(&mut self.store, entity)?;
        component.play(name, options, self.diagnostics.as_mut())
    }

    /// Layer an animation over the running ones without replacing them.
    pub fn add_animation(
        &mut self,
        entity: EntityId,
        name: &str,
        options: PlayOptions,
    ) -> Result<(), Error> {
        let component = lookup_bound(&mut self.store, entity)?;
        component.add(name, options, self.diagnostics.as_mut())
    }

    /// Returns whether `name` was active.
    pub fn stop_animation(&mut self, entity: EntityId, name: &str) -> Result<bool, Error> {
        Ok(lookup(&mut self.store, entity)?.stop(name))
    }

    pub fn stop_all(&mut self, entity: EntityId) -> Result<(), Error> {
        lookup(&mut self.store, entity)?.stop_all();
        Ok(())
    }

    /// Apply a configured combo. Naming a skeleton other than the bound one switches to it first.
    pub fn play_combo(
        &mut self,
        entity: EntityId,
        skeleton: Option<&str>,
        combo: &str,
    ) -> Result<(), Error> {
        let bound = lookup_bound(&mut self.store, entity)?
            .skeleton()
            .unwrap_or_default()
            .to_string();
        let skeleton = skeleton.map(str::to_string).unwrap_or_else(|| bound.clone());
        self.config.combo(&skeleton, combo)?;
        if skeleton != bound {
            let binding = self.load_skeleton(&skeleton)?;
            let config = self.config.skeleton(&skeleton);
            lookup(&mut self.store, entity)?.bind(
                binding,
                config,
                self.diagnostics.as_mut(),
            );
        }
        let combo = self.config.combo(&skeleton, combo)?;
        let component = lookup(&mut self.store, entity)?;
        component.apply_combo(combo, self.diagnostics.as_mut())
    }

    /// Defer a request to the start of the next [`Self::update`].
    pub fn enqueue_command(&mut self, entity: EntityId, request: AnimationRequest) -> CommandId {
        let id = self.commands.enqueue(entity, request);
        log::trace!("queued {id} for entity {entity}");
        id
    }

    pub fn hide_track(&mut self, entity: EntityId, track: &str) -> Result<(), Error> {
        lookup_bound(&mut self.store, entity)?.hide_track(track)
    }

    pub fn show_track(&mut self, entity: EntityId, track: &str) -> Result<(), Error> {
        lookup_bound(&mut self.store, entity)?.show_track(track)
    }

    /// Pause one animation, or every animation of the entity when `name` is `None`.
    pub fn pause(&mut self, entity: EntityId, name: Option<&str>) -> Result<(), Error> {
        let component = lookup(&mut self.store, entity)?;
        match name {
            Some(name) => component.pause(name),
            None => {
                component.pause_all();
                Ok(())
            }
        }
    }

    pub fn resume(&mut self, entity: EntityId, name: Option<&str>) -> Result<(), Error> {
        let component = lookup(&mut self.store, entity)?;
        match name {
            Some(name) => component.resume(name),
            None => {
                component.resume_all();
                Ok(())
            }
        }
    }

    pub fn set_speed(&mut self, entity: EntityId, name: &str, speed: f32) -> Result<(), Error> {
        lookup(&mut self.store, entity)?.set_speed(name, speed)
    }

    pub fn restart(&mut self, entity: EntityId, name: &str) -> Result<(), Error> {
        lookup(&mut self.store, entity)?.restart(name)
    }

    pub fn seek(&mut self, entity: EntityId, name: &str, frame: f32) -> Result<(), Error> {
        lookup(&mut self.store, entity)?.seek(name, frame)
    }

    /// Entity-level loop default for animations started without their own loop flag.
    pub fn set_entity_loop(&mut self, entity: EntityId, looped: Option<bool>) -> Result<(), Error> {
        lookup(&mut self.store, entity)?.set_looped(looped);
        Ok(())
    }

    fn dispatch(&mut self, entity: EntityId, target: RequestTarget<'_>) -> Result<(), Error> {
        match target {
            RequestTarget::Animation(name) => {
                self.play_animation(entity, name, PlayOptions::default())
            }
            RequestTarget::Combo { skeleton, combo } => self.play_combo(entity, skeleton, combo),
        }
    }

    /// Run one tick: apply queued commands, then advance every entity by `delta` seconds.
    ///
    /// Failed commands are reported to the diagnostics sink and returned.
    pub fn update(&mut self, delta: f32) -> Vec<CommandFailure> {
        let delta = if delta.is_finite() && delta >= 0.0 {
            delta
        } else {
            log::warn!("ignoring invalid tick delta {delta}");
            0.0
        };
        self.clock += f64::from(delta);

        let mut commands = std::mem::take(&mut self.commands);
        // Without a cleanup delay, the previous batch stays inspectable until the next update.
        let dropped = match self.config.engine.command_cleanup_delay {
            Some(_) => 0,
            None => commands.clear_processed(),
        };
        let failures = commands.process(self.clock, |entity, target| self.dispatch(entity, target));
        let dropped = match self.config.engine.command_cleanup_delay {
            Some(delay) => dropped + commands.collect_garbage(self.clock, delay),
            None => dropped,
        };
        if dropped > 0 {
            log::trace!("dropped {dropped} processed commands");
        }
        self.commands = commands;
        for failure in &failures {
            self.diagnostics.report(Diagnostic::CommandFailed {
                command: failure.command,
                entity: failure.entity,
                message: failure.error.to_string(),
            });
        }

        let fps_override = self.config.engine.fps_override;
        for entity in self.store.entities() {
            let Some(component) = self.store.get_mut(entity) else {
                continue;
            };
            for (animation, transition) in component.advance(delta, fps_override) {
                self.events
                    .push(PlaybackEvent::new(entity, animation, transition));
            }
        }
        failures
    }

    /// One fixed step of `1 / tick_rate` seconds.
    pub fn tick(&mut self) -> Vec<CommandFailure> {
        self.update(1.0 / self.config.engine.tick_rate)
    }

    /// Ordered draw list for this tick, rebuilt only when playback or structure changed.
    pub fn render_data(&mut self, entity: EntityId) -> Result<&[DrawInstruction], Error> {
        let component = lookup_bound(&mut self.store, entity)?;
        Ok(&component.render_data(self.diagnostics.as_mut()).draws)
    }

    /// Resolved position of a track plus the entity's center offset.
    pub fn track_world_offset(&mut self, entity: EntityId, track: &str) -> Result<[f32; 2], Error> {
        let component = lookup_bound(&mut self.store, entity)?;
        component.track_world_offset(track, self.diagnostics.as_mut())
    }

    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.events)
    }
}
