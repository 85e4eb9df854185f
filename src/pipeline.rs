use crate::{
    animation::{AnimationHost, Rig, ShapeSequence},
    config::Config,
    frames::FrameArray,
    normalize::normalize,
    pm_error::PmError,
    region::{classify, Adjacency, Regions, Topology},
    skeleton::{remap, PoseSource, Remapped},
};
use log::{info, warn};
use nalgebra_glm as glm;

/// Completeness signals gathered over a run and logged once at its end
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Diagnostics {
    pub frames: usize,
    pub valid_joints: usize,
    /// Canonical joints whose table entry has no source
    pub unmapped_joints: usize,
    /// Canonical joints whose source index is beyond the source joints
    pub out_of_range_joints: usize,
    pub synthesized_joints: usize,
    pub hand_vertices: usize,
    pub hand_faces: usize,
    pub fallback_seeding: bool,
    pub skipped_anchors: usize,
}

impl Diagnostics {
    fn add_skeleton(&mut self, remapped: &Remapped) {
        self.valid_joints = remapped.valid_count();
        self.unmapped_joints = remapped.report.missing.len();
        self.out_of_range_joints = remapped.report.out_of_range.len();
        self.synthesized_joints = remapped.report.synthesized;
    }

    fn add_regions(&mut self, regions: &Regions) {
        self.hand_vertices = regions.hand_vertex_count();
        self.hand_faces = regions.hand_face_count();
        self.fallback_seeding = regions.fallback;
        self.skipped_anchors = regions.skipped_anchors;
    }

    pub fn log(&self) {
        info!(
            "Processed {} frames: joints valid={}, synthesized={}; hand \
             vertices={}, faces={}",
            self.frames,
            self.valid_joints,
            self.synthesized_joints,
            self.hand_vertices,
            self.hand_faces,
        );
        if self.unmapped_joints + self.out_of_range_joints > 0 {
            warn!(
                "{} canonical joints have no source, {} have a source \
                 beyond the input",
                self.unmapped_joints, self.out_of_range_joints
            );
        }
        if self.skipped_anchors > 0 {
            warn!("{} anchor joints were unusable", self.skipped_anchors);
        }
        if self.fallback_seeding {
            warn!("Too few hand seeds near anchors, used extremity heuristics");
        }
    }
}

/// Estimated mesh sequence with the raw joints of the same estimator
#[derive(Clone, Debug)]
pub struct MeshInput {
    pub topology: Topology,
    /// Vertex positions shaped (frames, vertices)
    pub vertices: FrameArray,
    /// Joint positions used as hand anchors. Only frame 0 is read.
    pub joints: FrameArray,
}

/// What a run produced besides the entities on the host
#[derive(Clone, Debug, Default)]
pub struct Output {
    pub skeleton: Option<Remapped>,
    pub regions: Option<Regions>,
    pub diagnostics: Diagnostics,
}

/// One configured conversion run. Frames are processed strictly in
/// ascending order and the first failure aborts the run.
#[derive(Clone, Debug, Default)]
pub struct Pipeline {
    config: Config,
    dataset: Option<String>,
}

impl Pipeline {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            config,
            dataset: None,
        }
    }

    /// Selects the per-dataset entry of the offset table
    #[must_use]
    pub fn with_dataset(mut self, dataset: &str) -> Self {
        self.dataset = Some(dataset.to_string());
        self
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn offset(&self) -> glm::Vec3 {
        self.config.offsets.offset(self.dataset.as_deref())
    }

    /// Normalizes and remaps `source`, builds or reuses `rig` on `host` and
    /// records every frame
    ///
    /// # Errors
    /// May return `PmError`, in particular `PmError::NonFinite` if a joint
    /// that has data in general is missing in some frame
    pub fn run_skeleton<H: AnimationHost>(
        &self,
        host: &mut H,
        source: &PoseSource,
        rig: &mut Rig,
        diagnostics: &mut Diagnostics,
    ) -> Result<Remapped, PmError> {
        let combined = source.combined()?;
        let normalized = normalize(&combined, &self.offset());
        let remapped = remap(&self.config.mapping, &normalized);
        diagnostics.add_skeleton(&remapped);

        rig.build(host, &remapped.mask)?;
        for frame in 0..remapped.joints.frame_count() {
            rig.advance(host, &remapped.joints, frame)?;
            rig.record(host, frame)?;
        }
        Ok(remapped)
    }

    /// Segments the mesh on its raw first frame, then normalizes it and
    /// builds or reuses `shape` on `host` with one channel per frame
    ///
    /// # Errors
    /// May return `PmError`, including `PmError::FrameOutOfRange` if either
    /// input has no frames
    pub fn run_mesh<H: AnimationHost>(
        &self,
        host: &mut H,
        input: &MeshInput,
        shape: &mut ShapeSequence,
        diagnostics: &mut Diagnostics,
    ) -> Result<Regions, PmError> {
        let adjacency = Adjacency::new(&input.topology);
        let regions = classify(
            input.vertices.try_frame(0)?,
            input.joints.try_frame(0)?,
            &input.topology,
            &adjacency,
            &self.config.region,
        )?;
        diagnostics.add_regions(&regions);

        let normalized = normalize(&input.vertices, &self.offset());
        shape.build(host, &input.topology, &normalized, Some(&regions))?;
        for frame in 0..normalized.frame_count() {
            shape.record(host, frame)?;
        }
        Ok(regions)
    }

    /// Runs whichever of the skeleton and mesh paths has input, sets the
    /// host's frame range and logs the diagnostics
    ///
    /// # Errors
    /// Returns `PmError::FrameCountMismatch` if skeleton and mesh differ in
    /// length, otherwise as `run_skeleton` and `run_mesh`
    pub fn run<H: AnimationHost>(
        &self,
        host: &mut H,
        skeleton: Option<(&PoseSource, &mut Rig)>,
        mesh: Option<(&MeshInput, &mut ShapeSequence)>,
    ) -> Result<Output, PmError> {
        if let (Some((source, _)), Some((input, _))) = (&skeleton, &mesh) {
            if source.frame_count() != input.vertices.frame_count() {
                return Err(PmError::FrameCountMismatch {
                    expected: source.frame_count(),
                    actual: input.vertices.frame_count(),
                });
            }
        }
        let mut output = Output::default();
        if let Some((source, rig)) = skeleton {
            output.diagnostics.frames = source.frame_count();
            output.skeleton = Some(self.run_skeleton(
                host,
                source,
                rig,
                &mut output.diagnostics,
            )?);
        }
        if let Some((input, shape)) = mesh {
            output.diagnostics.frames = input.vertices.frame_count();
            output.regions = Some(self.run_mesh(
                host,
                input,
                shape,
                &mut output.diagnostics,
            )?);
        }
        if output.diagnostics.frames > 0 {
            host.set_frame_range(0, output.diagnostics.frames - 1);
        }
        output.diagnostics.log();
        Ok(output)
    }
}
