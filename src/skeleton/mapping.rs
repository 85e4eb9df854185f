use crate::pm_error::PmError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel used in mapping tables for "no source available"
pub const NO_SOURCE: i64 = -1;

/// Where a canonical joint gets its data from
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JointSource {
    /// Left unfilled and flagged invalid
    None,
    /// Copied from one source joint
    Joint(usize),
    /// Arithmetic mean of two source joints
    Midpoint(usize, usize),
}

/// Table form used in configuration files: an integer index, `-1` for no
/// source, or a pair of indices for a midpoint
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSource {
    Index(i64),
    Pair([usize; 2]),
}

impl TryFrom<RawSource> for JointSource {
    type Error = PmError;

    fn try_from(raw: RawSource) -> Result<Self, Self::Error> {
        match raw {
            RawSource::Index(NO_SOURCE) => Ok(Self::None),
            RawSource::Index(i) => usize::try_from(i)
                .map(Self::Joint)
                .map_err(|_| PmError::InvalidSource(i)),
            RawSource::Pair([a, b]) => Ok(Self::Midpoint(a, b)),
        }
    }
}

impl From<JointSource> for RawSource {
    fn from(source: JointSource) -> Self {
        match source {
            JointSource::None => Self::Index(NO_SOURCE),
            // Joint counts are tiny so this never saturates in practice
            JointSource::Joint(i) => {
                Self::Index(i64::try_from(i).unwrap_or(i64::MAX))
            }
            JointSource::Midpoint(a, b) => Self::Pair([a, b]),
        }
    }
}

/// Mapping from canonical target index to source. Entries are kept ordered
/// by target index and every consumer iterates them in ascending order.
///
/// Each target appears at most once. Inserting a target that is already
/// present replaces the earlier entry, so when a table lists the same target
/// twice the entry listed last is the one used.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<usize, RawSource>",
    into = "BTreeMap<usize, RawSource>"
)]
pub struct JointMapping {
    entries: BTreeMap<usize, JointSource>,
}

impl TryFrom<BTreeMap<usize, RawSource>> for JointMapping {
    type Error = PmError;

    fn try_from(raw: BTreeMap<usize, RawSource>) -> Result<Self, Self::Error> {
        let mut mapping = Self::default();
        for (target, source) in raw {
            mapping.insert(target, source.try_into()?);
        }
        Ok(mapping)
    }
}

impl From<JointMapping> for BTreeMap<usize, RawSource> {
    fn from(mapping: JointMapping) -> Self {
        mapping
            .entries
            .into_iter()
            .map(|(t, s)| (t, s.into()))
            .collect()
    }
}

impl JointMapping {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `(target, source)` pairs where the source uses
    /// `NO_SOURCE` for missing joints.
    ///
    /// # Errors
    /// Returns `PmError::InvalidSource` for negative sources other than
    /// `NO_SOURCE`
    pub fn from_pairs<I>(pairs: I) -> Result<Self, PmError>
    where
        I: IntoIterator<Item = (usize, i64)>,
    {
        let mut mapping = Self::new();
        for (target, source) in pairs {
            mapping.insert(target, RawSource::Index(source).try_into()?);
        }
        Ok(mapping)
    }

    /// Sets the source of `target`, returning the entry it replaced
    pub fn insert(
        &mut self,
        target: usize,
        source: JointSource,
    ) -> Option<JointSource> {
        let old = self.entries.insert(target, source);
        if let Some(old) = old {
            debug!("target {} remapped from {:?} to {:?}", target, old, source);
        }
        old
    }

    #[must_use]
    pub fn get(&self, target: usize) -> Option<JointSource> {
        self.entries.get(&target).copied()
    }

    /// Entries in ascending target order
    pub fn iter(&self) -> impl Iterator<Item = (usize, JointSource)> + '_ {
        self.entries.iter().map(|(t, s)| (*t, *s))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Size of the canonical skeleton: one more than the largest target
    #[must_use]
    pub fn target_count(&self) -> usize {
        self.entries.keys().next_back().map_or(0, |t| t + 1)
    }

    /// Targets that are synthesized as midpoints
    pub fn midpoints(&self) -> impl Iterator<Item = (usize, (usize, usize))> + '_ {
        self.iter().filter_map(|(t, s)| match s {
            JointSource::Midpoint(a, b) => Some((t, (a, b))),
            _ => None,
        })
    }

    /// Identity mapping over concatenated body and hand keypoints with the
    /// neck and pelvis synthesized from the shoulders and hips
    #[must_use]
    pub fn stick_figure(body_len: usize, hand_len: usize) -> Self {
        let mut mapping = Self::new();
        for i in 0..body_len + hand_len {
            mapping.insert(i, JointSource::Joint(i));
        }
        for (target, (a, b)) in super::layout::STICK_MIDPOINTS {
            mapping.insert(target, JointSource::Midpoint(a, b));
        }
        mapping
    }

    /// Table from the 76 joint SMPL-X output to the 57 joint canonical
    /// skeleton. The nose has no SMPL-X counterpart.
    #[must_use]
    pub fn smplx() -> Self {
        let entries = SMPLX_SOURCES
            .iter()
            .enumerate()
            .map(|(target, source)| {
                let source = usize::try_from(*source)
                    .map_or(JointSource::None, JointSource::Joint);
                (target, source)
            })
            .collect();
        Self { entries }
    }
}

/// SMPL-X source index for each canonical target, in target order
const SMPLX_SOURCES: [i64; 57] = [
    NO_SOURCE, // nose
    12,        // neck
    0,         // pelvis
    59, 58, // ears
    16, 17, // shoulders
    18, 19, // elbows
    1, 2, // hips
    4, 5, // knees
    7, 8, // ankles
    20, // left wrist
    37, 38, 39, 66, // left thumb
    25, 26, 27, 67, // left index
    28, 29, 30, 68, // left middle
    34, 35, 36, 69, // left ring
    31, 32, 33, 70, // left pinky
    21, // right wrist
    52, 53, 54, 71, // right thumb
    40, 41, 42, 72, // right index
    43, 44, 45, 73, // right middle
    49, 50, 51, 74, // right ring
    46, 47, 48, 75, // right pinky
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_entries_replace_earlier() {
        let m = JointMapping::from_pairs([(3, 7), (1, 2), (3, 9)]).unwrap();
        assert_eq!(m.len(), 2);
        assert_eq!(m.get(3), Some(JointSource::Joint(9)));
        assert_eq!(m.target_count(), 4);
        let targets: Vec<usize> = m.iter().map(|(t, _)| t).collect();
        assert_eq!(targets, [1, 3]);
    }

    #[test]
    fn negative_sources() {
        let m = JointMapping::from_pairs([(0, NO_SOURCE)]).unwrap();
        assert_eq!(m.get(0), Some(JointSource::None));
        assert!(matches!(
            JointMapping::from_pairs([(0, -4)]),
            Err(PmError::InvalidSource(-4))
        ));
    }

    #[test]
    fn smplx_table() {
        let m = JointMapping::smplx();
        assert_eq!(m.target_count(), 57);
        assert_eq!(m.get(0), Some(JointSource::None));
        assert_eq!(m.get(36), Some(JointSource::Joint(21)));
        assert_eq!(m.get(56), Some(JointSource::Joint(75)));
    }

    #[test]
    fn stick_figure_midpoints() {
        let m = JointMapping::stick_figure(17, 42);
        assert_eq!(m.target_count(), 59);
        let mids: Vec<_> = m.midpoints().collect();
        assert_eq!(mids, [(1, (5, 6)), (2, (11, 12))]);
    }

    #[test]
    fn yaml_round_trip() {
        let yaml = "0: -1\n1: [5, 6]\n4: 10\n";
        let m: JointMapping = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(m.get(0), Some(JointSource::None));
        assert_eq!(m.get(1), Some(JointSource::Midpoint(5, 6)));
        assert_eq!(m.get(4), Some(JointSource::Joint(10)));
        let back: JointMapping =
            serde_yaml::from_str(&serde_yaml::to_string(&m).unwrap()).unwrap();
        assert_eq!(back, m);
    }
}
