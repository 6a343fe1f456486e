use crate::{Error, VisibilityWindow};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PlaybackStatus {
    Active,
    Paused,
    /// Terminal until restarted.
    Finished,
}

/// What an advance did to a playback cursor, beyond moving it.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Transition {
    Looped,
    Completed,
}

/// Mutable playback cursor of one animation name on one entity.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaybackState {
    window: VisibilityWindow,
    frame: f32,
    elapsed: f32,
    /// Monotonic total advance, never reset; feeds the render cache key.
    progress: f64,
    pub fps: Option<f32>,
    pub speed: f32,
    pub looped: bool,
    paused: bool,
    finished: bool,
    /// Seconds left before the cursor starts moving.
    pub delay: f32,
    /// Lead elapsed frames at which a delayed shared-timeline follower started.
    follow_origin: f32,
}

impl PlaybackState {
    pub fn new(window: VisibilityWindow, looped: bool) -> Result<Self, Error> {
        if window.is_empty() {
            return Err(Error::EmptyAnimation {
                name: window.animation().to_string(),
            });
        }
        Ok(Self {
            window,
            frame: 0.0,
            elapsed: 0.0,
            progress: 0.0,
            fps: None,
            speed: 1.0,
            looped,
            paused: false,
            finished: false,
            delay: 0.0,
            follow_origin: 0.0,
        })
    }

    pub fn name(&self) -> &str {
        self.window.animation()
    }

    pub fn window(&self) -> &VisibilityWindow {
        &self.window
    }

    pub fn visible_count(&self) -> usize {
        self.window.visible_count()
    }

    /// Stored fractional frame. May reach `visible_count` once a one-shot completes.
    pub fn frame(&self) -> f32 {
        self.frame
    }

    /// Logical frames advanced since the last (re)start, without wrapping.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Frame to sample for rendering; finished one-shots hold their last frame.
    pub fn render_frame(&self) -> f32 {
        if self.finished {
            self.window.visible_count().saturating_sub(1) as f32
        } else {
            self.frame
        }
    }

    pub fn status(&self) -> PlaybackStatus {
        if self.finished {
            PlaybackStatus::Finished
        } else if self.paused {
            PlaybackStatus::Paused
        } else {
            PlaybackStatus::Active
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Still inside its start delay; such a cursor does not draw.
    pub fn is_waiting(&self) -> bool {
        self.delay > 0.0
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn restart(&mut self) {
        self.frame = 0.0;
        self.elapsed = 0.0;
        self.paused = false;
        self.finished = false;
    }

    /// Jump to a logical frame, re-projecting into the window.
    pub fn seek(&mut self, frame: f32) {
        if !frame.is_finite() {
            return;
        }
        let frame = frame.max(0.0);
        self.progress += f64::from((frame - self.frame).abs());
        self.elapsed = frame;
        self.finished = false;
        self.frame = frame;
        self.project();
    }

    pub fn effective_fps(&self, default_fps: f32) -> f32 {
        self.fps.unwrap_or(default_fps)
    }

    /// Count `delta` seconds against the start delay. Returns the part of `delta` left to play,
    /// or `None` while the cursor is waiting, paused or finished.
    pub(crate) fn consume_delay(&mut self, delta: f32) -> Option<f32> {
        if self.paused || self.finished || !delta.is_finite() || delta <= 0.0 {
            return None;
        }
        if self.delay <= 0.0 {
            return Some(delta);
        }
        self.delay -= delta;
        if self.delay > 0.0 {
            return None;
        }
        let remaining = (-self.delay).max(0.0);
        self.delay = 0.0;
        Some(remaining)
    }

    /// Move the cursor by `delta` seconds at `effective_fps * speed` logical frames per second.
    pub fn advance(&mut self, delta: f32, default_fps: f32) -> Option<Transition> {
        let delta = self.consume_delay(delta)?;
        self.step(self.effective_fps(default_fps) * delta * self.speed)
    }

    /// Record where on the lead's timeline this follower's frame zero lies.
    pub(crate) fn set_follow_origin(&mut self, lead_elapsed: f32) {
        self.follow_origin = lead_elapsed;
    }

    /// Place the cursor at `lead_elapsed` logical frames of its lead, measured from the moment
    /// this cursor started; keeps shared-timeline followers in step with the lead.
    pub(crate) fn follow(&mut self, lead_elapsed: f32) -> Option<Transition> {
        if self.paused || self.finished || self.is_waiting() {
            return None;
        }
        self.step(lead_elapsed - self.follow_origin - self.elapsed)
    }

    fn step(&mut self, increment: f32) -> Option<Transition> {
        if !increment.is_finite() || increment <= 0.0 {
            return None;
        }
        self.frame += increment;
        self.elapsed += increment;
        self.progress += f64::from(increment);
        self.project()
    }

    fn project(&mut self) -> Option<Transition> {
        let count = self.window.visible_count() as f32;
        if self.frame < count {
            return None;
        }
        if self.looped {
            self.frame = self.frame.rem_euclid(count);
            if self.frame >= count {
                self.frame = 0.0;
            }
            Some(Transition::Looped)
        } else {
            // Stored value stays past the end; readers clamp through `render_frame`.
            self.finished = true;
            Some(Transition::Completed)
        }
    }
}
