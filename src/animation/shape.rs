use super::{
    host::AnimationHost,
    types::{EntityKey, EntityKind, Handle, MeshData},
};
use crate::{
    frames::FrameArray,
    pm_error::PmError,
    region::{Regions, Topology},
};
use log::info;
use std::collections::BTreeMap;

/// Deformable mesh animated by switching between one shape channel per
/// frame. At every recorded frame exactly one channel has weight 1 and all
/// others weight 0.
#[derive(Clone, Debug)]
pub struct ShapeSequence {
    name: String,
    mesh: Option<Handle>,
    channels: BTreeMap<usize, Handle>,
}

impl ShapeSequence {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            mesh: None,
            channels: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn mesh(&self) -> Option<Handle> {
        self.mesh
    }

    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    #[must_use]
    pub fn channel(&self, frame: usize) -> Option<Handle> {
        self.channels.get(&frame).copied()
    }

    /// Creates or reuses the mesh entity and one shape channel per frame of
    /// `vertices`. The mesh is created from frame 0 and tagged with the face
    /// regions if given. Channel positions are refreshed on every build.
    ///
    /// # Errors
    /// Returns `PmError::PointCountMismatch` if `vertices` does not match
    /// the topology, `PmError::FrameOutOfRange` if it has no frames, or
    /// `PmError` from the host
    pub fn build<H: AnimationHost>(
        &mut self,
        host: &mut H,
        topology: &Topology,
        vertices: &FrameArray,
        regions: Option<&Regions>,
    ) -> Result<(), PmError> {
        if vertices.point_count() != topology.vertex_count() {
            return Err(PmError::PointCountMismatch {
                expected: topology.vertex_count(),
                actual: vertices.point_count(),
            });
        }
        let mesh = match self.mesh {
            Some(mesh) => mesh,
            None => {
                let data = MeshData {
                    topology: topology.clone(),
                    base: vertices.try_frame(0)?.to_vec(),
                    face_regions: regions
                        .map(|r| r.faces.clone())
                        .unwrap_or_default(),
                };
                let (mesh, _) = host.acquire(
                    EntityKey::Mesh(self.name.clone()),
                    EntityKind::Mesh(data),
                )?;
                self.mesh = Some(mesh);
                mesh
            }
        };

        let mut created = 0;
        for (frame, positions) in vertices.frames().enumerate() {
            if let Some(channel) = self.channels.get(&frame) {
                host.set_shape(*channel, positions)?;
                continue;
            }
            let key = EntityKey::ShapeChannel {
                mesh: self.name.clone(),
                frame,
            };
            let (channel, fresh) = host.acquire(
                key,
                EntityKind::ShapeChannel {
                    mesh,
                    positions: positions.to_vec(),
                },
            )?;
            if fresh {
                created += 1;
            } else {
                host.set_shape(channel, positions)?;
            }
            self.channels.insert(frame, channel);
        }
        info!(
            "Shape sequence {}: channels={}, created={}",
            self.name,
            self.channels.len(),
            created
        );
        Ok(())
    }

    /// Activates the channel of `frame` alone and keyframes every channel's
    /// weight at `frame`
    ///
    /// # Errors
    /// Returns `PmError::FrameOutOfRange` if there is no channel for
    /// `frame`, or `PmError` from the host
    pub fn record<H: AnimationHost>(
        &self,
        host: &mut H,
        frame: usize,
    ) -> Result<(), PmError> {
        if !self.channels.contains_key(&frame) {
            return Err(PmError::FrameOutOfRange {
                frame,
                frame_count: self.channels.len(),
            });
        }
        for (f, channel) in &self.channels {
            let weight = if *f == frame { 1.0 } else { 0.0 };
            host.set_weight(*channel, weight)?;
            host.key_weight(*channel, frame)?;
        }
        Ok(())
    }
}
