use crate::{AnimationComponent, EntityId};
use std::collections::BTreeMap;

/// The slice of an entity/component store the engine needs.
///
/// Games plug in their own ECS through this trait; [`EntityStore`] is a minimal standalone
/// implementation.
pub trait ComponentStore {
    fn get(&self, entity: EntityId) -> Option<&AnimationComponent>;

    fn get_mut(&mut self, entity: EntityId) -> Option<&mut AnimationComponent>;

    /// Returns the component previously attached to `entity`, if any.
    fn insert(
        &mut self,
        entity: EntityId,
        component: AnimationComponent,
    ) -> Option<AnimationComponent>;

    fn remove(&mut self, entity: EntityId) -> Option<AnimationComponent>;

    /// Every entity carrying an animation component, in a stable order.
    fn entities(&self) -> Vec<EntityId>;
}

#[derive(Debug, Default)]
pub struct EntityStore {
    components: BTreeMap<EntityId, AnimationComponent>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl ComponentStore for EntityStore {
    fn get(&self, entity: EntityId) -> Option<&AnimationComponent> {
        self.components.get(&entity)
    }

    fn get_mut(&mut self, entity: EntityId) -> Option<&mut AnimationComponent> {
        self.components.get_mut(&entity)
    }

    fn insert(
        &mut self,
        entity: EntityId,
        component: AnimationComponent,
    ) -> Option<AnimationComponent> {
        self.components.insert(entity, component)
    }

    fn remove(&mut self, entity: EntityId) -> Option<AnimationComponent> {
        self.components.remove(&entity)
    }

    fn entities(&self) -> Vec<EntityId> {
        self.components.keys().copied().collect()
    }
}
