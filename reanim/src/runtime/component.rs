use crate::{
    AnimationDefinition, CacheKey, ComboConfig, Diagnostic, DiagnosticSink, Error, ImageAtlas,
    MergedTracks, ParentBinding, ParentBindingConfig, PlaybackMode, PlaybackState,
    PlaybackStrategy, RenderCache, RenderData, SkeletonConfig, TrackId, TrackKind, Transition,
    build_render_data,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Overrides for starting one animation.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PlayOptions {
    pub looped: Option<bool>,
    pub fps: Option<f32>,
    pub speed: Option<f32>,
    /// Start delay in seconds.
    pub delay: f32,
}

impl PlayOptions {
    pub fn looped(looped: bool) -> Self {
        Self {
            looped: Some(looped),
            ..Self::default()
        }
    }

    pub fn with_fps(mut self, fps: f32) -> Self {
        self.fps = Some(fps);
        self
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }
}

/// Shared, immutable data an entity is bound to.
#[derive(Clone, Debug)]
pub struct SkeletonBinding {
    pub definition: Arc<AnimationDefinition>,
    pub tracks: Arc<MergedTracks>,
    pub atlas: Option<Arc<ImageAtlas>>,
    pub mode: PlaybackMode,
}

/// Per-entity animation state.
#[derive(Debug, Default)]
pub struct AnimationComponent {
    binding: Option<SkeletonBinding>,
    empty_tracks: Arc<MergedTracks>,
    states: Vec<PlaybackState>,
    hidden: HashSet<TrackId>,
    combo_hidden: HashSet<TrackId>,
    always_visible: HashSet<TrackId>,
    base_bindings: Vec<ParentBinding>,
    bindings: Vec<ParentBinding>,
    center_offset: [f32; 2],
    preview_frame: Option<usize>,
    looped: Option<bool>,
    generation: u64,
    cache: RenderCache,
}

/// Midpoint of the visible positional extent of all drawable tracks, negated.
///
/// Computed once per bind so that switching between animations with different extents does not
/// shift the entity.
pub fn compute_center_offset(tracks: &MergedTracks) -> [f32; 2] {
    let mut min = [f32::INFINITY; 2];
    let mut max = [f32::NEG_INFINITY; 2];
    for (_, track) in tracks.iter() {
        if track.kind != TrackKind::Visual {
            continue;
        }
        for frame in track.frames.iter().filter(|f| f.is_visible()) {
            min[0] = min[0].min(frame.x);
            min[1] = min[1].min(frame.y);
            max[0] = max[0].max(frame.x);
            max[1] = max[1].max(frame.y);
        }
    }
    if !min[0].is_finite() || !max[0].is_finite() {
        return [0.0, 0.0];
    }
    [-(min[0] + max[0]) * 0.5, -(min[1] + max[1]) * 0.5]
}

fn resolve_bindings(
    skeleton: &str,
    tracks: &MergedTracks,
    configs: &[ParentBindingConfig],
    sink: &mut dyn DiagnosticSink,
) -> Vec<ParentBinding> {
    let mut out: Vec<ParentBinding> = Vec::with_capacity(configs.len());
    for config in configs {
        let mut lookup = |name: &str| {
            let id = tracks.id(name);
            if id.is_none() {
                sink.report(Diagnostic::MissingTrack {
                    skeleton: skeleton.to_string(),
                    track: name.to_string(),
                });
            }
            id
        };
        let (Some(child), Some(parent)) = (lookup(&config.child), lookup(&config.parent)) else {
            continue;
        };
        let binding = ParentBinding {
            child,
            parent,
            rotate: config.rotate,
        };
        // A later binding for the same child replaces the earlier one.
        match out.iter_mut().find(|b| b.child == child) {
            Some(existing) => *existing = binding,
            None => out.push(binding),
        }
    }
    out
}

fn resolve_track_set(
    skeleton: &str,
    tracks: &MergedTracks,
    names: &[String],
    sink: &mut dyn DiagnosticSink,
) -> HashSet<TrackId> {
    let mut out = HashSet::new();
    for name in names {
        let mut found = false;
        for (id, _) in tracks.all_named(name) {
            out.insert(id);
            found = true;
        }
        if !found {
            sink.report(Diagnostic::MissingTrack {
                skeleton: skeleton.to_string(),
                track: name.clone(),
            });
        }
    }
    out
}

impl AnimationComponent {
    /// A component with no skeleton bound yet.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bound(
        binding: SkeletonBinding,
        config: Option<&SkeletonConfig>,
        sink: &mut dyn DiagnosticSink,
    ) -> Self {
        let mut component = Self::new();
        component.bind(binding, config, sink);
        component
    }

    /// Bind (or switch) the skeleton. Clears playback and recomputes the center offset.
    pub fn bind(
        &mut self,
        binding: SkeletonBinding,
        config: Option<&SkeletonConfig>,
        sink: &mut dyn DiagnosticSink,
    ) {
        let skeleton = binding.definition.name.clone();
        let tracks = binding.tracks.as_ref();
        let default_config = SkeletonConfig::default();
        let config = config.unwrap_or(&default_config);

        self.states.clear();
        self.hidden = resolve_track_set(&skeleton, tracks, &config.hidden_tracks, sink);
        self.combo_hidden.clear();
        self.always_visible = resolve_track_set(&skeleton, tracks, &config.always_visible, sink);
        self.base_bindings = resolve_bindings(&skeleton, tracks, &config.parent_bindings, sink);
        self.bindings = self.base_bindings.clone();
        self.center_offset = config
            .center_offset
            .unwrap_or_else(|| compute_center_offset(tracks));
        self.preview_frame = config.preview_frame;
        log::debug!(
            "bound skeleton '{}' ({} tracks, {} frames, {:?})",
            skeleton,
            tracks.len(),
            tracks.frame_count(),
            binding.mode
        );
        self.binding = Some(binding);
        self.touch();
    }

    pub fn is_bound(&self) -> bool {
        self.binding.is_some()
    }

    pub fn binding(&self) -> Option<&SkeletonBinding> {
        self.binding.as_ref()
    }

    pub fn skeleton(&self) -> Option<&str> {
        self.binding.as_ref().map(|b| b.definition.name.as_str())
    }

    pub fn definition(&self) -> Option<&Arc<AnimationDefinition>> {
        self.binding.as_ref().map(|b| &b.definition)
    }

    pub fn tracks(&self) -> &MergedTracks {
        match &self.binding {
            Some(b) => b.tracks.as_ref(),
            None => self.empty_tracks.as_ref(),
        }
    }

    pub fn atlas(&self) -> Option<&ImageAtlas> {
        self.binding.as_ref().and_then(|b| b.atlas.as_deref())
    }

    pub fn mode(&self) -> PlaybackMode {
        self.binding
            .as_ref()
            .map(|b| b.mode)
            .unwrap_or(PlaybackMode::Simple)
    }

    fn strategy(&self) -> &'static dyn PlaybackStrategy {
        self.mode().strategy()
    }

    /// Authored frame rate of the bound definition.
    pub fn default_fps(&self) -> f32 {
        self.binding
            .as_ref()
            .map(|b| b.definition.fps)
            .unwrap_or(crate::DEFAULT_FPS)
    }

    /// Active animations in their defined order; later ones win shared tracks.
    pub fn states(&self) -> &[PlaybackState] {
        &self.states
    }

    pub fn state(&self, name: &str) -> Option<&PlaybackState> {
        self.states.iter().find(|s| s.name() == name)
    }

    fn state_mut(&mut self, name: &str) -> Result<&mut PlaybackState, Error> {
        self.states
            .iter_mut()
            .find(|s| s.name() == name)
            .ok_or_else(|| Error::UnknownAnimation {
                name: name.to_string(),
            })
    }

    pub fn active_names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(PlaybackState::name)
    }

    pub fn is_hidden(&self, track: TrackId) -> bool {
        self.hidden.contains(&track) || self.combo_hidden.contains(&track)
    }

    pub fn is_always_visible(&self, track: TrackId) -> bool {
        self.always_visible.contains(&track)
    }

    pub fn parent_bindings(&self) -> &[ParentBinding] {
        &self.bindings
    }

    pub fn center_offset(&self) -> [f32; 2] {
        self.center_offset
    }

    pub fn preview_frame(&self) -> Option<usize> {
        self.preview_frame
    }

    /// Entity-level loop flag, used when a request carries no loop override.
    pub fn looped(&self) -> Option<bool> {
        self.looped
    }

    pub fn set_looped(&mut self, looped: Option<bool>) {
        self.looped = looped;
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.cache.invalidate();
    }

    fn new_state(
        &self,
        name: &str,
        options: PlayOptions,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<PlaybackState, Error> {
        let Some(binding) = &self.binding else {
            return Err(Error::InvalidValue {
                message: "no skeleton bound".to_string(),
            });
        };
        let strategy = self.strategy();
        let window = strategy.window(&binding.tracks, &binding.definition.name, name, sink)?;
        let mut state = PlaybackState::new(window, strategy.resolve_loop(options.looped, self.looped))?;
        if let Some(fps) = options.fps {
            if !fps.is_finite() || fps < 0.0 {
                return Err(Error::InvalidValue {
                    message: format!("fps for '{name}' must be finite and >= 0"),
                });
            }
            state.fps = Some(fps);
        }
        if let Some(speed) = options.speed {
            if !speed.is_finite() || speed < 0.0 {
                return Err(Error::InvalidValue {
                    message: format!("speed for '{name}' must be finite and >= 0"),
                });
            }
            state.speed = speed;
        }
        if options.delay.is_finite() && options.delay > 0.0 {
            state.delay = options.delay;
        }
        Ok(state)
    }

    /// Switch to `name`. Shared-timeline modes replace the active set; independent modes add
    /// the animation next to the running ones. Already active names restart in place.
    pub fn play(
        &mut self,
        name: &str,
        options: PlayOptions,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), Error> {
        let state = self.new_state(name, options, sink)?;
        if self.strategy().replaces_on_play() {
            self.states.clear();
            self.combo_hidden.clear();
            self.bindings = self.base_bindings.clone();
        }
        self.insert_state(state);
        self.touch();
        Ok(())
    }

    /// Layer `name` on top of the active set regardless of mode.
    pub fn add(
        &mut self,
        name: &str,
        options: PlayOptions,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), Error> {
        let state = self.new_state(name, options, sink)?;
        self.insert_state(state);
        self.touch();
        Ok(())
    }

    fn insert_state(&mut self, state: PlaybackState) {
        match self.states.iter_mut().find(|s| s.name() == state.name()) {
            Some(existing) => *existing = state,
            None => self.states.push(state),
        }
    }

    /// Replace the active set with a combo. Nothing changes if any animation fails to resolve.
    pub fn apply_combo(
        &mut self,
        combo: &ComboConfig,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<(), Error> {
        let skeleton = self.skeleton().unwrap_or_default().to_string();
        let mut states = Vec::with_capacity(combo.animations.len());
        for name in &combo.animations {
            let options = PlayOptions {
                looped: combo.loop_for(name),
                fps: combo.fps.get(name).copied(),
                speed: combo.speed.get(name).copied(),
                delay: combo.delays.get(name).copied().unwrap_or(0.0),
            };
            states.push(self.new_state(name, options, sink)?);
        }

        let tracks = self.tracks();
        let combo_hidden = resolve_track_set(&skeleton, tracks, &combo.hidden_tracks, sink);
        let mut bindings = self.base_bindings.clone();
        for binding in resolve_bindings(&skeleton, tracks, &combo.parent_bindings, sink) {
            match bindings.iter_mut().find(|b| b.child == binding.child) {
                Some(existing) => *existing = binding,
                None => bindings.push(binding),
            }
        }

        self.states.clear();
        for state in states {
            self.insert_state(state);
        }
        self.combo_hidden = combo_hidden;
        self.bindings = bindings;
        self.touch();
        Ok(())
    }

    pub fn stop(&mut self, name: &str) -> bool {
        let before = self.states.len();
        self.states.retain(|s| s.name() != name);
        let removed = self.states.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    pub fn stop_all(&mut self) {
        if !self.states.is_empty() {
            self.states.clear();
            self.touch();
        }
    }

    pub fn restart(&mut self, name: &str) -> Result<(), Error> {
        self.state_mut(name)?.restart();
        self.touch();
        Ok(())
    }

    pub fn pause(&mut self, name: &str) -> Result<(), Error> {
        self.state_mut(name)?.pause();
        Ok(())
    }

    pub fn resume(&mut self, name: &str) -> Result<(), Error> {
        self.state_mut(name)?.resume();
        Ok(())
    }

    pub fn pause_all(&mut self) {
        self.states.iter_mut().for_each(PlaybackState::pause);
    }

    pub fn resume_all(&mut self) {
        self.states.iter_mut().for_each(PlaybackState::resume);
    }

    pub fn set_speed(&mut self, name: &str, speed: f32) -> Result<(), Error> {
        if !speed.is_finite() || speed < 0.0 {
            return Err(Error::InvalidValue {
                message: format!("speed must be finite and >= 0, got {speed}"),
            });
        }
        self.state_mut(name)?.speed = speed;
        Ok(())
    }

    pub fn seek(&mut self, name: &str, frame: f32) -> Result<(), Error> {
        self.state_mut(name)?.seek(frame);
        Ok(())
    }

    pub fn hide_track(&mut self, name: &str) -> Result<(), Error> {
        let ids: Vec<TrackId> = self.tracks().all_named(name).map(|(id, _)| id).collect();
        if ids.is_empty() {
            return Err(Error::UnknownTrack {
                name: name.to_string(),
            });
        }
        self.hidden.extend(ids);
        self.touch();
        Ok(())
    }

    pub fn show_track(&mut self, name: &str) -> Result<(), Error> {
        let ids: Vec<TrackId> = self.tracks().all_named(name).map(|(id, _)| id).collect();
        if ids.is_empty() {
            return Err(Error::UnknownTrack {
                name: name.to_string(),
            });
        }
        for id in ids {
            self.hidden.remove(&id);
            self.combo_hidden.remove(&id);
        }
        self.touch();
        Ok(())
    }

    /// Advance every active cursor by `delta` seconds.
    ///
    /// Shared-timeline modes drive all cursors from the first one so they stay in step. A
    /// delayed follower joins the lead's timeline once its own delay has run out.
    pub fn advance(&mut self, delta: f32, fps_override: Option<f32>) -> Vec<(String, Transition)> {
        let default_fps = fps_override.unwrap_or_else(|| self.default_fps());
        let shared = self.strategy().shared_timeline();
        let waiting = self.waiting_count();
        let mut transitions = Vec::new();

        let Some((lead, followers)) = self.states.split_first_mut() else {
            return transitions;
        };
        let lead_before = lead.elapsed();
        if let Some(t) = lead.advance(delta, default_fps) {
            transitions.push((lead.name().to_string(), t));
        }
        let lead_after = lead.elapsed();
        for state in followers {
            let transition = if shared {
                let was_waiting = state.is_waiting();
                match state.consume_delay(delta) {
                    Some(remaining) => {
                        if was_waiting {
                            let waited = (delta - remaining) / delta;
                            let origin = lead_before + (lead_after - lead_before) * waited;
                            state.set_follow_origin(origin);
                        }
                        state.follow(lead_after)
                    }
                    None => None,
                }
            } else {
                state.advance(delta, default_fps)
            };
            if let Some(t) = transition {
                transitions.push((state.name().to_string(), t));
            }
        }

        // A cursor leaving its delay starts drawing even if it has not moved yet.
        if self.waiting_count() != waiting {
            self.touch();
        }
        transitions
    }

    fn waiting_count(&self) -> usize {
        self.states.iter().filter(|s| s.is_waiting()).count()
    }

    /// Sum of every cursor's monotonic progress.
    pub fn progress_sum(&self) -> f64 {
        self.states.iter().map(PlaybackState::progress).sum()
    }

    pub fn cache_key(&self) -> CacheKey {
        CacheKey::new(self.generation, self.progress_sum())
    }

    /// Draw list for the current tick, rebuilt only when the cache key changed.
    pub fn render_data(&mut self, sink: &mut dyn DiagnosticSink) -> &RenderData {
        let key = self.cache_key();
        if !self.cache.is_valid_for(key) {
            let data = build_render_data(self, sink);
            return self.cache.store(key, data);
        }
        self.cache.data()
    }

    /// Current resolved position of a track plus the center offset, e.g. for projectile spawn
    /// points. Tracks without a contribution this tick report their bind pose.
    pub fn track_world_offset(
        &mut self,
        name: &str,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<[f32; 2], Error> {
        let Some(id) = self.tracks().id(name) else {
            return Err(Error::UnknownTrack {
                name: name.to_string(),
            });
        };
        let offset = self.center_offset;
        if let Some(frame) = self.render_data(sink).frame(id) {
            return Ok([frame.x + offset[0], frame.y + offset[1]]);
        }
        let bind = self
            .tracks()
            .get(id)
            .and_then(|t| t.bind_pose())
            .map(|f| [f.x, f.y])
            .unwrap_or([0.0, 0.0]);
        Ok([bind[0] + offset[0], bind[1] + offset[1]])
    }
}
