use crate::types::{Region, Style, BODY_RADIUS, HAND_RADIUS, WRIST_RADIUS};
use serde::{Deserialize, Serialize};

/// Keypoints produced by the body estimator
pub const BODY_LEN: usize = 17;

/// Keypoints produced by the hand estimator for one hand
pub const HAND_LEN: usize = 21;

/// First hand keypoint in the combined index space. Every index at or above
/// this belongs to a hand.
pub const RIGHT_HAND_START: usize = BODY_LEN;

pub const LEFT_HAND_START: usize = RIGHT_HAND_START + HAND_LEN;

pub const NECK: usize = 1;
pub const PELVIS: usize = 2;

/// Synthesized joints and the body keypoints they are the midpoint of
pub const STICK_MIDPOINTS: [(usize, (usize, usize)); 2] =
    [(NECK, (5, 6)), (PELVIS, (11, 12))];

/// SMPL-X joints used as anchors for hand region seeding: both wrists and
/// the fingertips
pub const SMPLX_HAND_ANCHORS: [usize; 12] =
    [20, 21, 36, 37, 38, 39, 40, 41, 42, 43, 44, 45];

const BODY_CONNECTIONS: [(usize, usize); 14] = [
    (0, 1),
    (1, 2),
    (1, 5),
    (1, 6),
    (5, 7),
    (6, 8),
    (7, RIGHT_HAND_START),
    (8, LEFT_HAND_START),
    (2, 11),
    (2, 12),
    (11, 13),
    (12, 14),
    (13, 15),
    (14, 16),
];

/// Four segments running from the wrist out along one finger
const fn finger(wrist: usize, finger: usize) -> [(usize, usize); 4] {
    let base = wrist + finger * 4;
    [
        (wrist, base + 1),
        (base + 1, base + 2),
        (base + 2, base + 3),
        (base + 3, base + 4),
    ]
}

/// All finger segments of the hand whose wrist keypoint is `wrist`
#[must_use]
pub fn hand_connections(wrist: usize) -> Vec<(usize, usize)> {
    (0..5).flat_map(|f| finger(wrist, f)).collect()
}

/// Connectivity and presentation of the canonical skeleton
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Joints at or above this index are hand joints
    pub hand_start: usize,
    /// Wrist joints, drawn at a size between body and finger joints
    pub wrists: Vec<usize>,
    /// Segments as (start, end) joint pairs
    pub connections: Vec<(usize, usize)>,
    /// Joints that are never instantiated, along with every segment
    /// touching them
    pub hidden: Vec<usize>,
}

impl Default for Layout {
    fn default() -> Self {
        Self::stick_figure()
    }
}

impl Layout {
    /// Body keypoints followed by the right and left hand. The body
    /// estimator's wrists are hidden since the hand wrists replace them.
    #[must_use]
    pub fn stick_figure() -> Self {
        let mut connections = BODY_CONNECTIONS.to_vec();
        connections.extend(hand_connections(RIGHT_HAND_START));
        connections.extend(hand_connections(LEFT_HAND_START));
        Self {
            hand_start: RIGHT_HAND_START,
            wrists: vec![RIGHT_HAND_START, LEFT_HAND_START],
            connections,
            hidden: vec![9, 10],
        }
    }

    #[must_use]
    pub fn is_hidden(&self, joint: usize) -> bool {
        self.hidden.contains(&joint)
    }

    #[must_use]
    pub const fn region_of(&self, joint: usize) -> Region {
        if joint >= self.hand_start {
            Region::Hand
        } else {
            Region::Body
        }
    }

    /// Connections with no hidden end, in table order
    pub fn visible_connections(
        &self,
    ) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.connections
            .iter()
            .copied()
            .filter(|(a, b)| !self.is_hidden(*a) && !self.is_hidden(*b))
    }

    #[must_use]
    pub fn joint_style(&self, joint: usize) -> Style {
        let region = self.region_of(joint);
        let radius = if self.wrists.contains(&joint) {
            WRIST_RADIUS
        } else if region == Region::Body {
            BODY_RADIUS
        } else {
            HAND_RADIUS
        };
        Style { region, radius }
    }

    /// A segment is a hand segment only when both of its joints are
    #[must_use]
    pub fn segment_style(&self, start: usize, end: usize) -> Style {
        let (a, b) = (self.joint_style(start), self.joint_style(end));
        let region = if a.region == Region::Hand && b.region == Region::Hand {
            Region::Hand
        } else {
            Region::Body
        };
        Style {
            region,
            radius: a.radius.min(b.radius) * 0.5,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stick_figure_connections() {
        let layout = Layout::stick_figure();
        assert_eq!(layout.connections.len(), 14 + 2 * 20);
        assert!(layout.connections.contains(&(38, 39)));
        assert!(layout.connections.contains(&(57, 58)));
        // Body wrists are hidden but no segment touches them
        assert_eq!(layout.visible_connections().count(), 54);
    }

    #[test]
    fn hidden_connections_are_dropped() {
        let mut layout = Layout::stick_figure();
        layout.hidden.push(RIGHT_HAND_START);
        // The wrist has one arm segment and five finger roots
        assert_eq!(layout.visible_connections().count(), 54 - 6);
    }

    #[test]
    fn styles() {
        let layout = Layout::stick_figure();
        assert_eq!(layout.joint_style(3).radius, BODY_RADIUS);
        assert_eq!(layout.joint_style(LEFT_HAND_START).radius, WRIST_RADIUS);
        assert_eq!(layout.joint_style(40).radius, HAND_RADIUS);
        assert_eq!(layout.segment_style(7, RIGHT_HAND_START).region, Region::Body);
        assert_eq!(layout.segment_style(17, 18).region, Region::Hand);
        assert_eq!(layout.segment_style(17, 18).radius, HAND_RADIUS * 0.5);
    }
}
