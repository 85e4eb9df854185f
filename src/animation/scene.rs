use super::{
    host::AnimationHost,
    types::{AnimationChannel, EntityKey, EntityKind, Handle, Interpolation},
    util,
};
use crate::{pm_error::PmError, types::Transform};
use ahash::{HashMap, HashMapExt};
use log::trace;
use nalgebra_glm as glm;

/// One entity of a `Scene` with its current state and recorded keyframes
#[derive(Clone, Debug)]
pub struct Entity {
    pub key: EntityKey,
    pub kind: EntityKind,
    pub transform: Transform,
    pub weight: f32,
    pub transform_keys: AnimationChannel<Transform>,
    pub weight_keys: AnimationChannel<f32>,
}

/// In-memory animation host. Holds entities in creation order, indexed by
/// key, and records keyframes per entity. Useful on its own for inspecting
/// or exporting results and as a reference for adapting other hosts.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    entities: Vec<Entity>,
    index: HashMap<EntityKey, Handle>,
    frame_range: Option<(usize, usize)>,
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            index: HashMap::new(),
            frame_range: None,
        }
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn entity(&self, handle: Handle) -> Option<&Entity> {
        self.entities.get(handle.0)
    }

    #[must_use]
    pub fn get(&self, key: &EntityKey) -> Option<&Entity> {
        self.index.get(key).and_then(|h| self.entity(*h))
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    #[must_use]
    pub const fn frame_range(&self) -> Option<(usize, usize)> {
        self.frame_range
    }

    /// Spatial state of an entity at an arbitrary time, interpolated from
    /// its transform keyframes
    #[must_use]
    pub fn sample_transform(&self, key: &EntityKey, time: f32) -> Option<Transform> {
        self.get(key)
            .and_then(|e| util::sample(&e.transform_keys, time))
    }

    /// Weight of a shape channel at an arbitrary time
    #[must_use]
    pub fn sample_weight(&self, key: &EntityKey, time: f32) -> Option<f32> {
        self.get(key).and_then(|e| util::sample(&e.weight_keys, time))
    }

    fn entity_mut(&mut self, handle: Handle) -> Result<&mut Entity, PmError> {
        self.entities
            .get_mut(handle.0)
            .ok_or(PmError::UnknownHandle(handle.0))
    }

    fn channel_mut(&mut self, handle: Handle) -> Result<&mut Entity, PmError> {
        let entity = self.entity_mut(handle)?;
        if matches!(entity.kind, EntityKind::ShapeChannel { .. }) {
            Ok(entity)
        } else {
            Err(PmError::WrongEntityKind(handle.0))
        }
    }
}

impl AnimationHost for Scene {
    fn find(&self, key: &EntityKey) -> Option<Handle> {
        self.index.get(key).copied()
    }

    fn spawn(
        &mut self,
        key: EntityKey,
        kind: EntityKind,
    ) -> Result<Handle, PmError> {
        if let EntityKind::ShapeChannel { mesh, .. } = &kind {
            let is_mesh = self
                .entity(*mesh)
                .map(|e| matches!(e.kind, EntityKind::Mesh(_)));
            match is_mesh {
                Some(true) => {}
                Some(false) => return Err(PmError::WrongEntityKind(mesh.0)),
                None => return Err(PmError::UnknownHandle(mesh.0)),
            }
        }
        let handle = Handle(self.entities.len());
        trace!("spawn {} as {:?}", key, handle);
        self.index.insert(key.clone(), handle);
        self.entities.push(Entity {
            key,
            kind,
            transform: Transform::default(),
            weight: 0.0,
            transform_keys: AnimationChannel::new(Interpolation::Linear),
            // Shape channels switch on and off, they never blend
            weight_keys: AnimationChannel::new(Interpolation::Step),
        });
        Ok(handle)
    }

    fn set_transform(
        &mut self,
        handle: Handle,
        transform: Transform,
    ) -> Result<(), PmError> {
        self.entity_mut(handle)?.transform = transform;
        Ok(())
    }

    fn key_transform(
        &mut self,
        handle: Handle,
        frame: usize,
    ) -> Result<(), PmError> {
        let entity = self.entity_mut(handle)?;
        entity.transform_keys.insert(frame, entity.transform);
        Ok(())
    }

    fn set_shape(
        &mut self,
        channel: Handle,
        positions: &[glm::Vec3],
    ) -> Result<(), PmError> {
        if let EntityKind::ShapeChannel { positions: p, .. } =
            &mut self.channel_mut(channel)?.kind
        {
            p.clear();
            p.extend_from_slice(positions);
        }
        Ok(())
    }

    fn set_weight(&mut self, channel: Handle, weight: f32) -> Result<(), PmError> {
        self.channel_mut(channel)?.weight = weight;
        Ok(())
    }

    fn key_weight(
        &mut self,
        channel: Handle,
        frame: usize,
    ) -> Result<(), PmError> {
        let entity = self.channel_mut(channel)?;
        entity.weight_keys.insert(frame, entity.weight);
        Ok(())
    }

    fn set_frame_range(&mut self, start: usize, end: usize) {
        self.frame_range = Some((start, end));
    }
}
