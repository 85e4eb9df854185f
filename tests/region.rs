//! Tests for hand region segmentation on small closed meshes

use log::info;
use nalgebra_glm as glm;
use posemesh::{
    region::{
        classify, classify_faces, Adjacency, FacePolicy, RegionOptions,
        Topology,
    },
    types::Region,
};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes logging in a "once per test run" manner. Call at the start of
/// each test that needs logging.
fn init_tests() {
    INIT.call_once(|| {
        env_logger::init();
    });
}

/// Unit cube with vertex index x + 2y + 4z, two triangles per side
fn cube() -> (Vec<glm::Vec3>, Topology) {
    let vertices = (0..8_u8)
        .map(|i| {
            glm::vec3(
                f32::from(i & 1),
                f32::from((i >> 1) & 1),
                f32::from((i >> 2) & 1),
            )
        })
        .collect();
    let faces = vec![
        [0, 1, 3],
        [0, 3, 2],
        [4, 6, 7],
        [4, 7, 5],
        [0, 4, 5],
        [0, 5, 1],
        [2, 3, 7],
        [2, 7, 6],
        [0, 2, 6],
        [0, 6, 4],
        [1, 5, 7],
        [1, 7, 3],
    ];
    (vertices, Topology::new(8, faces).unwrap())
}

fn members(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, m)| m.then_some(i))
        .collect()
}

#[test]
fn cube_expansion() {
    init_tests();
    let (_, topology) = cube();
    let adj = Adjacency::new(&topology);
    assert_eq!(adj.edge_count(), 18);
    let mut seeds = vec![false; 8];
    seeds[0] = true;
    assert_eq!(members(&adj.expand(&seeds, 0)), vec![0]);
    // Everything but the opposite corner shares a face with vertex 0
    assert_eq!(members(&adj.expand(&seeds, 1)), vec![0, 1, 2, 3, 4, 5, 6]);
    assert_eq!(members(&adj.expand(&seeds, 2)), (0..8).collect::<Vec<_>>());
    info!("cube adjacency {:?}", adj);
}

#[test]
fn adjacency_is_symmetric() {
    init_tests();
    let (_, topology) = cube();
    let adj = Adjacency::new(&topology);
    for a in 0..adj.vertex_count() {
        assert!(!adj.is_adjacent(a, a));
        for b in adj.neighbours(a) {
            assert!(adj.is_adjacent(*b as usize, a));
        }
    }
}

#[test]
fn expansion_is_monotonic() {
    init_tests();
    // Larger strip so the hop limit matters for several steps
    let faces = (0..18).map(|i| [i, i + 1, i + 2]).collect();
    let topology = Topology::new(20, faces).unwrap();
    let adj = Adjacency::new(&topology);
    let mut seeds = vec![false; 20];
    seeds[3] = true;
    seeds[15] = true;
    let mut previous = adj.expand(&seeds, 0);
    assert_eq!(previous, seeds);
    for hops in 1..8 {
        let next = adj.expand(&seeds, hops);
        assert!(previous.iter().zip(&next).all(|(p, n)| !p || *n));
        previous = next;
    }
}

#[test]
fn cube_regions() {
    init_tests();
    let (vertices, topology) = cube();
    let adj = Adjacency::new(&topology);
    // One anchor next to vertex 0 only
    let joints = vec![glm::vec3(-0.01, 0.0, 0.0)];
    let options = RegionOptions {
        anchors: vec![0],
        hops: 1,
        min_seeds: 1,
        ..Default::default()
    };
    let regions = classify(&vertices, &joints, &topology, &adj, &options).unwrap();
    assert!(!regions.fallback);
    assert_eq!(regions.seed_count, 1);
    assert_eq!(regions.hand_vertices(), vec![0, 1, 2, 3, 4, 5, 6]);
    // Any face touches a hand vertex
    assert_eq!(regions.hand_face_count(), 12);

    let all = classify_faces(&topology, &adj.expand(&[true], 1), FacePolicy::All);
    // Faces without vertex 7
    assert_eq!(all.iter().filter(|r| **r == Region::Hand).count(), 6);
}

#[test]
fn empty_region_is_valid() {
    init_tests();
    let (vertices, topology) = cube();
    let adj = Adjacency::new(&topology);
    let options = RegionOptions {
        anchors: vec![],
        min_seeds: 0,
        ..Default::default()
    };
    let regions = classify(&vertices, &[], &topology, &adj, &options).unwrap();
    assert_eq!(regions.hand_vertex_count(), 0);
    assert_eq!(regions.hand_face_count(), 0);
    assert_eq!(regions.material_indices(), vec![0; 12]);
}
