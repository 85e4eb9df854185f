use super::types::{EntityKey, EntityKind, Handle};
use crate::{pm_error::PmError, types::Transform};
use nalgebra_glm as glm;

/// Trait for the rendering or animation system that receives entities and
/// keyframes. The host owns a namespace of entities keyed by `EntityKey`.
pub trait AnimationHost {
    /// Looks up an existing entity
    fn find(&self, key: &EntityKey) -> Option<Handle>;

    /// Creates a new entity. Callers check `find` first, see `acquire`.
    ///
    /// # Errors
    /// May return `PmError` if the host rejects the entity
    fn spawn(&mut self, key: EntityKey, kind: EntityKind)
        -> Result<Handle, PmError>;

    /// Sets the current spatial state of a joint or segment
    ///
    /// # Errors
    /// May return `PmError` for an unknown handle
    fn set_transform(
        &mut self,
        handle: Handle,
        transform: Transform,
    ) -> Result<(), PmError>;

    /// Records the current spatial state as a keyframe
    ///
    /// # Errors
    /// May return `PmError` for an unknown handle
    fn key_transform(&mut self, handle: Handle, frame: usize)
        -> Result<(), PmError>;

    /// Replaces the vertex positions of a shape channel
    ///
    /// # Errors
    /// May return `PmError` for an unknown handle or a handle that is not a
    /// shape channel
    fn set_shape(
        &mut self,
        channel: Handle,
        positions: &[glm::Vec3],
    ) -> Result<(), PmError>;

    /// Sets the current blend weight of a shape channel
    ///
    /// # Errors
    /// May return `PmError` for an unknown handle or a handle that is not a
    /// shape channel
    fn set_weight(&mut self, channel: Handle, weight: f32) -> Result<(), PmError>;

    /// Records the current blend weight as a keyframe
    ///
    /// # Errors
    /// May return `PmError` for an unknown handle or a handle that is not a
    /// shape channel
    fn key_weight(&mut self, channel: Handle, frame: usize)
        -> Result<(), PmError>;

    /// Tells the host which frames hold animation. Hosts without a playback
    /// range can ignore this.
    fn set_frame_range(&mut self, _start: usize, _end: usize) {}

    /// Returns the entity for `key`, creating it if the host does not have
    /// one yet. The flag is true when the entity was created.
    ///
    /// # Errors
    /// As `spawn`
    fn acquire(
        &mut self,
        key: EntityKey,
        kind: EntityKind,
    ) -> Result<(Handle, bool), PmError> {
        match self.find(&key) {
            Some(handle) => Ok((handle, false)),
            None => self.spawn(key, kind).map(|h| (h, true)),
        }
    }
}
