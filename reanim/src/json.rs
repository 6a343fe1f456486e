//! JSON loaders for authored definitions and engine configuration.
//!
//! Definitions use the compact per-keyframe keys of the authoring tool:
//!
//! ```json
//! { "name": "peashooter", "fps": 12,
//!   "tracks": [ { "name": "head", "frames": [ { "x": 4.5, "i": "IMAGE_HEAD" }, {}, { "f": -1 } ] } ] }
//! ```
//!
//! `x`/`y` position, `sx`/`sy` scale, `kx`/`ky` skew in degrees, `a` alpha, `f` visibility
//! marker, `i` image path. Missing keys inherit from the previous frame.

use crate::{AnimationConfig, AnimationDefinition, DEFAULT_FPS, Error, Keyframe, Track};
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize, Serialize)]
struct KeyframeDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sx: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sy: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    kx: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ky: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    a: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    f: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    i: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
struct TrackDef {
    name: String,
    #[serde(default, alias = "keyframes")]
    frames: Vec<KeyframeDef>,
}

#[derive(Debug, Deserialize, Serialize)]
struct DefinitionRoot {
    #[serde(default)]
    name: String,
    #[serde(default)]
    fps: Option<f32>,
    #[serde(default)]
    tracks: Vec<TrackDef>,
}

impl From<KeyframeDef> for Keyframe {
    fn from(def: KeyframeDef) -> Self {
        Self {
            x: def.x,
            y: def.y,
            scale_x: def.sx,
            scale_y: def.sy,
            skew_x: def.kx,
            skew_y: def.ky,
            alpha: def.a,
            marker: def.f,
            image: def.i,
        }
    }
}

impl From<&Keyframe> for KeyframeDef {
    fn from(key: &Keyframe) -> Self {
        Self {
            x: key.x,
            y: key.y,
            sx: key.scale_x,
            sy: key.scale_y,
            kx: key.skew_x,
            ky: key.skew_y,
            a: key.alpha,
            f: key.marker,
            i: key.image.clone(),
        }
    }
}

fn json_error(context: &str, error: serde_json::Error) -> Error {
    Error::JsonParse {
        context: context.to_string(),
        message: error.to_string(),
    }
}

impl AnimationDefinition {
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let root: DefinitionRoot =
            serde_json::from_str(input).map_err(|e| json_error("definition", e))?;
        if root.name.is_empty() {
            return Err(Error::InvalidValue {
                message: "definition has no name".to_string(),
            });
        }
        Ok(Self::from_root(root))
    }

    /// Like [`Self::from_json_str`] but the asset name comes from the caller, e.g. a file stem.
    pub fn from_json_str_named(name: &str, input: &str) -> Result<Self, Error> {
        let mut root: DefinitionRoot =
            serde_json::from_str(input).map_err(|e| json_error(name, e))?;
        root.name = name.to_string();
        Ok(Self::from_root(root))
    }

    fn from_root(root: DefinitionRoot) -> Self {
        let tracks = root
            .tracks
            .into_iter()
            .map(|t| Track::new(t.name, t.frames.into_iter().map(Keyframe::from).collect()))
            .collect();
        Self::new(root.name, root.fps.unwrap_or(DEFAULT_FPS), tracks)
    }

    pub fn to_json_string(&self) -> Result<String, Error> {
        let root = DefinitionRoot {
            name: self.name.clone(),
            fps: Some(self.fps),
            tracks: self
                .tracks
                .iter()
                .map(|t| TrackDef {
                    name: t.name.clone(),
                    frames: t.keyframes.iter().map(KeyframeDef::from).collect(),
                })
                .collect(),
        };
        serde_json::to_string(&root).map_err(|e| json_error(&self.name, e))
    }
}

impl AnimationConfig {
    /// Parse and validate an engine configuration.
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let config: Self = serde_json::from_str(input).map_err(|e| json_error("config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| json_error("config", e))
    }
}
