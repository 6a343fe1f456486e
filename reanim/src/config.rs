//! Externally supplied configuration: combos, per-skeleton overrides and the playback-mode table.
//!
//! All types are plain data with defaults so they can be built in code; with the `json` feature
//! they also deserialize (see [`AnimationConfig::from_json_str`]).

use crate::{Error, PlaybackMode};
use std::collections::HashMap;

/// Ticks per second used by [`crate::AnimationEngine::tick`].
pub const DEFAULT_TICK_RATE: f32 = 60.0;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct EngineSettings {
    pub tick_rate: f32,
    /// Overrides every definition's authored fps when set.
    pub fps_override: Option<f32>,
    /// Seconds after processing before a command is dropped; `None` drops each batch at the start of
    /// the next update.
    pub command_cleanup_delay: Option<f32>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tick_rate: DEFAULT_TICK_RATE,
            fps_override: None,
            command_cleanup_delay: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct ParentBindingConfig {
    pub child: String,
    pub parent: String,
    /// Also propagate the parent's skew delta, pivoting about its bind pose.
    #[cfg_attr(feature = "json", serde(default))]
    pub rotate: bool,
}

impl ParentBindingConfig {
    pub fn new(child: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            child: child.into(),
            parent: parent.into(),
            rotate: false,
        }
    }

    pub fn rotating(mut self) -> Self {
        self.rotate = true;
        self
    }
}

/// A named bundle of animations started together.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct ComboConfig {
    pub animations: Vec<String>,
    /// Loop flag for every animation of the combo without its own entry in `loops`.
    pub looped: Option<bool>,
    pub loops: HashMap<String, bool>,
    pub fps: HashMap<String, f32>,
    pub speed: HashMap<String, f32>,
    /// Start delay in seconds per animation.
    pub delays: HashMap<String, f32>,
    pub hidden_tracks: Vec<String>,
    pub parent_bindings: Vec<ParentBindingConfig>,
}

impl ComboConfig {
    pub fn new<I, S>(animations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            animations: animations.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Per-animation override first, then the combo-wide flag.
    pub fn loop_for(&self, animation: &str) -> Option<bool> {
        self.loops.get(animation).copied().or(self.looped)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct SkeletonConfig {
    pub mode: Option<PlaybackMode>,
    pub combos: HashMap<String, ComboConfig>,
    pub parent_bindings: Vec<ParentBindingConfig>,
    /// Replaces the computed center offset.
    pub center_offset: Option<[f32; 2]>,
    /// Physical frame drawn when nothing is playing.
    pub preview_frame: Option<usize>,
    /// Tracks drawn even where their own marker says hidden.
    pub always_visible: Vec<String>,
    pub hidden_tracks: Vec<String>,
    /// Animation or combo started when an entity is spawned.
    pub default_animation: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(default))]
pub struct AnimationConfig {
    pub engine: EngineSettings,
    pub skeletons: HashMap<String, SkeletonConfig>,
    /// Explicit playback modes keyed by skeleton name; wins over per-skeleton `mode`.
    pub modes: HashMap<String, PlaybackMode>,
}

impl AnimationConfig {
    pub fn skeleton(&self, name: &str) -> Option<&SkeletonConfig> {
        self.skeletons.get(name)
    }

    pub fn combo(&self, skeleton: &str, combo: &str) -> Result<&ComboConfig, Error> {
        self.skeletons
            .get(skeleton)
            .and_then(|s| s.combos.get(combo))
            .ok_or_else(|| Error::UnknownCombo {
                skeleton: skeleton.to_string(),
                combo: combo.to_string(),
            })
    }

    pub fn configured_mode(&self, skeleton: &str) -> Option<PlaybackMode> {
        self.modes
            .get(skeleton)
            .copied()
            .or_else(|| self.skeleton(skeleton).and_then(|s| s.mode))
    }

    pub fn validate(&self) -> Result<(), Error> {
        let tick_rate = self.engine.tick_rate;
        if !tick_rate.is_finite() || tick_rate <= 0.0 {
            return Err(Error::InvalidValue {
                message: format!("tick_rate must be finite and > 0, got {tick_rate}"),
            });
        }
        if let Some(fps) = self.engine.fps_override {
            if !fps.is_finite() || fps <= 0.0 {
                return Err(Error::InvalidValue {
                    message: format!("fps_override must be finite and > 0, got {fps}"),
                });
            }
        }
        if let Some(delay) = self.engine.command_cleanup_delay {
            if delay.is_nan() || delay < 0.0 {
                return Err(Error::InvalidValue {
                    message: "command_cleanup_delay must be >= 0".to_string(),
                });
            }
        }
        for (skeleton_name, skeleton) in &self.skeletons {
            for (combo_name, combo) in &skeleton.combos {
                if combo.animations.is_empty() {
                    return Err(Error::InvalidValue {
                        message: format!(
                            "combo '{combo_name}' of skeleton '{skeleton_name}' names no animations"
                        ),
                    });
                }
                let bad_rate = combo
                    .fps
                    .values()
                    .chain(combo.speed.values())
                    .any(|v| !v.is_finite() || *v < 0.0);
                if bad_rate {
                    return Err(Error::InvalidValue {
                        message: format!(
                            "combo '{combo_name}' of skeleton '{skeleton_name}' has a negative or non-finite rate"
                        ),
                    });
                }
            }
        }
        Ok(())
    }
}
