use super::{adjacency::Adjacency, topology::Topology};
use crate::{pm_error::PmError, skeleton::SMPLX_HAND_ANCHORS, types::Region};
use itertools::Itertools;
use log::{debug, info};
use nalgebra_glm as glm;
use serde::{Deserialize, Serialize};

/// Percentile used for the extremity heuristics of fallback seeding
const FALLBACK_PERCENTILE: f32 = 5.0;

/// How vertex membership turns into face membership
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FacePolicy {
    /// A face is a hand face if any of its vertices is a hand vertex
    #[default]
    Any,
    /// A face is a hand face only if all of its vertices are hand vertices
    All,
}

/// Parameters of hand region detection
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionOptions {
    /// Vertices within this distance of an anchor joint become seeds
    pub seed_radius: f32,
    /// Breadth-first expansion depth from the seeds
    pub hops: usize,
    /// Fewer proximity seeds than this triggers the fallback heuristics
    pub min_seeds: usize,
    pub face_policy: FacePolicy,
    /// Joint indices used as proximity anchors, normally wrists and
    /// fingertips
    pub anchors: Vec<usize>,
}

impl Default for RegionOptions {
    fn default() -> Self {
        Self {
            seed_radius: 0.06,
            hops: 2,
            min_seeds: 50,
            face_policy: FacePolicy::Any,
            anchors: SMPLX_HAND_ANCHORS.to_vec(),
        }
    }
}

/// Seeds picked for one reference frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Seeds {
    pub mask: Vec<bool>,
    /// True when the fallback heuristics were used
    pub fallback: bool,
    /// Anchors that were out of range or had no valid position
    pub skipped_anchors: usize,
}

impl Seeds {
    #[must_use]
    pub fn count(&self) -> usize {
        self.mask.iter().filter(|m| **m).count()
    }
}

/// Per-vertex and per-face region labels. Computed once from a reference
/// frame and held for the whole sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct Regions {
    pub vertices: Vec<Region>,
    pub faces: Vec<Region>,
    pub seed_count: usize,
    pub fallback: bool,
    pub skipped_anchors: usize,
}

impl Regions {
    #[must_use]
    pub fn hand_vertex_count(&self) -> usize {
        self.vertices.iter().filter(|r| **r == Region::Hand).count()
    }

    #[must_use]
    pub fn hand_face_count(&self) -> usize {
        self.faces.iter().filter(|r| **r == Region::Hand).count()
    }

    /// Indices of hand vertices in ascending order
    #[must_use]
    pub fn hand_vertices(&self) -> Vec<usize> {
        self.vertices.iter().positions(|r| *r == Region::Hand).collect()
    }

    /// Indices of hand faces in ascending order
    #[must_use]
    pub fn hand_faces(&self) -> Vec<usize> {
        self.faces.iter().positions(|r| *r == Region::Hand).collect()
    }

    /// Material slot per face
    #[must_use]
    pub fn material_indices(&self) -> Vec<usize> {
        self.faces.iter().map(|r| r.material_index()).collect()
    }

    /// Flag per face that is true for hand faces, for use with
    /// `Topology::select_faces`
    #[must_use]
    pub fn hand_face_mask(&self) -> Vec<bool> {
        self.faces.iter().map(|r| *r == Region::Hand).collect()
    }
}

/// Percentile of `values` with linear interpolation between the closest
/// ranks. Non-finite values are ignored. Returns `None` when nothing is
/// left.
#[must_use]
pub fn percentile(values: &[f32], q: f32) -> Option<f32> {
    let mut sorted: Vec<f32> =
        values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_unstable_by(f32::total_cmp);
    #[allow(clippy::cast_precision_loss)]
    let rank = (sorted.len() - 1) as f32 * (q / 100.0).clamp(0.0, 1.0);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(sorted.len() - 1);
    let frac = rank - rank.floor();
    Some((sorted[hi] - sorted[lo]).mul_add(frac, sorted[lo]))
}

/// Marks every vertex within `radius` of any anchor joint. Anchors outside
/// `joints` or without a finite position are skipped and counted.
#[must_use]
pub fn proximity_seeds(
    vertices: &[glm::Vec3],
    joints: &[glm::Vec3],
    anchors: &[usize],
    radius: f32,
) -> (Vec<bool>, usize) {
    let mut mask = vec![false; vertices.len()];
    let mut skipped = 0;
    for &a in anchors {
        let Some(anchor) = joints.get(a).filter(|j| j.iter().all(|c| c.is_finite()))
        else {
            debug!("anchor joint {} skipped", a);
            skipped += 1;
            continue;
        };
        for (m, v) in mask.iter_mut().zip(vertices) {
            if glm::distance(v, anchor) <= radius {
                *m = true;
            }
        }
    }
    (mask, skipped)
}

/// Seeds from vertex positions alone: the lowest and highest 5% along x and
/// the 5% furthest from the centroid
#[must_use]
pub fn fallback_seeds(vertices: &[glm::Vec3]) -> Vec<bool> {
    if vertices.is_empty() {
        return Vec::new();
    }
    let xs: Vec<f32> = vertices.iter().map(|v| v.x).collect();
    #[allow(clippy::cast_precision_loss)]
    let centroid = vertices.iter().fold(glm::Vec3::zeros(), |acc, v| acc + v)
        / vertices.len() as f32;
    let dists: Vec<f32> =
        vertices.iter().map(|v| glm::distance(v, &centroid)).collect();

    let left = percentile(&xs, FALLBACK_PERCENTILE);
    let right = percentile(&xs, 100.0 - FALLBACK_PERCENTILE);
    let far = percentile(&dists, 100.0 - FALLBACK_PERCENTILE);
    xs.iter()
        .zip(&dists)
        .map(|(x, d)| {
            left.is_some_and(|l| *x <= l)
                || right.is_some_and(|r| *x >= r)
                || far.is_some_and(|f| *d >= f)
        })
        .collect()
}

/// Proximity seeding with the fallback heuristics when it finds fewer than
/// `options.min_seeds` vertices. Fallback seeds are added to whatever the
/// proximity pass found.
#[must_use]
pub fn select_seeds(
    vertices: &[glm::Vec3],
    joints: &[glm::Vec3],
    options: &RegionOptions,
) -> Seeds {
    let (mut mask, skipped_anchors) =
        proximity_seeds(vertices, joints, &options.anchors, options.seed_radius);
    let found = mask.iter().filter(|m| **m).count();
    let fallback = found < options.min_seeds;
    if fallback {
        debug!(
            "{} proximity seeds below minimum {}, using fallback",
            found, options.min_seeds
        );
        for (m, f) in mask.iter_mut().zip(fallback_seeds(vertices)) {
            *m |= f;
        }
    }
    Seeds {
        mask,
        fallback,
        skipped_anchors,
    }
}

/// Converts vertex membership into a label per face
#[must_use]
pub fn classify_faces(
    topology: &Topology,
    hand: &[bool],
    policy: FacePolicy,
) -> Vec<Region> {
    let is_hand = |v: &u32| hand.get(*v as usize).copied().unwrap_or(false);
    topology
        .faces()
        .iter()
        .map(|face| {
            let hit = match policy {
                FacePolicy::Any => face.iter().any(is_hand),
                FacePolicy::All => face.iter().all(is_hand),
            };
            if hit {
                Region::Hand
            } else {
                Region::Body
            }
        })
        .collect()
}

/// Detects the hand region of a mesh from one reference frame.
///
/// `vertices` and `joints` must be in the same coordinate space. The result
/// is an empty hand region when no seed could be found, which is a valid
/// outcome.
///
/// # Errors
/// Returns `PmError::PointCountMismatch` if `vertices` does not match the
/// topology's vertex count
pub fn classify(
    vertices: &[glm::Vec3],
    joints: &[glm::Vec3],
    topology: &Topology,
    adjacency: &Adjacency,
    options: &RegionOptions,
) -> Result<Regions, PmError> {
    if vertices.len() != topology.vertex_count() {
        return Err(PmError::PointCountMismatch {
            expected: topology.vertex_count(),
            actual: vertices.len(),
        });
    }
    let seeds = select_seeds(vertices, joints, options);
    let hand = adjacency.expand(&seeds.mask, options.hops);
    let faces = classify_faces(topology, &hand, options.face_policy);
    let regions = Regions {
        vertices: hand
            .iter()
            .map(|h| if *h { Region::Hand } else { Region::Body })
            .collect(),
        faces,
        seed_count: seeds.count(),
        fallback: seeds.fallback,
        skipped_anchors: seeds.skipped_anchors,
    };
    info!(
        "Hand region: seeds={}, vertices={}, faces={}, fallback={}",
        regions.seed_count,
        regions.hand_vertex_count(),
        regions.hand_face_count(),
        regions.fallback,
    );
    Ok(regions)
}
