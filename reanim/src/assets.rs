use crate::{AnimationDefinition, Error};
use std::collections::HashMap;
use std::sync::Arc;

/// Renderer-side image identifier returned by the asset loader.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ImageHandle(pub u32);

/// External asset loader. Parsing of authored files and of images happens behind this trait.
pub trait AssetSource {
    fn load_definition(&self, name: &str) -> Result<Arc<AnimationDefinition>, Error>;

    fn load_image(&self, path: &str) -> Option<ImageHandle>;
}

/// Image paths of one definition resolved to handles once, at bind time.
#[derive(Clone, Debug, Default)]
pub struct ImageAtlas {
    handles: HashMap<String, Option<ImageHandle>>,
}

impl ImageAtlas {
    pub fn load(definition: &AnimationDefinition, assets: &dyn AssetSource) -> Self {
        let mut handles = HashMap::new();
        for track in &definition.tracks {
            for key in &track.keyframes {
                let Some(path) = key.image.as_deref() else {
                    continue;
                };
                if path.is_empty() || handles.contains_key(path) {
                    continue;
                }
                handles.insert(path.to_string(), assets.load_image(path));
            }
        }
        Self { handles }
    }

    /// `None` when the path was never seen or the loader could not provide it.
    pub fn image(&self, path: &str) -> Option<ImageHandle> {
        self.handles.get(path).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// In-memory [`AssetSource`]; images get sequential handles on registration.
#[derive(Clone, Debug, Default)]
pub struct MemoryAssets {
    definitions: HashMap<String, Arc<AnimationDefinition>>,
    images: HashMap<String, ImageHandle>,
    /// Hand out a handle for any image path, registered or not.
    pub implicit_images: bool,
}

impl MemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_implicit_images(mut self) -> Self {
        self.implicit_images = true;
        self
    }

    pub fn insert_definition(&mut self, definition: AnimationDefinition) -> Arc<AnimationDefinition> {
        let definition = Arc::new(definition);
        self.definitions
            .insert(definition.name.clone(), definition.clone());
        definition
    }

    pub fn insert_image(&mut self, path: impl Into<String>) -> ImageHandle {
        let next = ImageHandle(self.images.len() as u32);
        *self.images.entry(path.into()).or_insert(next)
    }
}

impl AssetSource for MemoryAssets {
    fn load_definition(&self, name: &str) -> Result<Arc<AnimationDefinition>, Error> {
        self.definitions
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownSkeleton {
                name: name.to_string(),
            })
    }

    fn load_image(&self, path: &str) -> Option<ImageHandle> {
        if let Some(handle) = self.images.get(path) {
            return Some(*handle);
        }
        if self.implicit_images {
            // Stable per path so repeated binds agree.
            let hash = path
                .bytes()
                .fold(0x811c_9dc5u32, |h, b| (h ^ u32::from(b)).wrapping_mul(0x0100_0193));
            return Some(ImageHandle(hash | 0x8000_0000));
        }
        None
    }
}
