//! End to end runs of the pipeline against the in-memory host

use log::info;
use nalgebra_glm as glm;
use posemesh::{
    animation::{AnimationHost, EntityKey, Rig, Scene, ShapeSequence},
    config::Config,
    frames::FrameArray,
    mesh_import,
    pipeline::{MeshInput, Pipeline},
    pm_error::PmError,
    region::Topology,
    skeleton::{PoseSource, BODY_LEN, HAND_LEN},
    types::Region,
};
use std::sync::Once;

const EPSILON: f32 = 0.0001f32; // Small value for float comparisons
static INIT: Once = Once::new();

/// Initializes logging in a "once per test run" manner. Call at the start of
/// each test that needs logging.
fn init_tests() {
    INIT.call_once(|| {
        env_logger::init();
    });
}

fn keypoints(frames: usize, joints: usize, salt: f32) -> FrameArray {
    let mut out = FrameArray::filled(0, joints, glm::Vec3::zeros());
    for f in 0..frames {
        let frame: Vec<glm::Vec3> = (0..joints)
            .map(|j| {
                #[allow(clippy::cast_precision_loss)]
                let (f, j) = (f as f32, j as f32);
                glm::vec3(j * 0.01 + salt, f * 0.05, j * 0.02 - 1.0)
            })
            .collect();
        out.push_frame(&frame).unwrap();
    }
    out
}

/// Unit cube mesh rising one unit per frame, with an anchor joint next to
/// vertex 0 at SMPL-X index 20
fn mesh(frames: usize) -> MeshInput {
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
    let mut vertices = FrameArray::filled(0, 8, glm::Vec3::zeros());
    for f in 0..frames {
        #[allow(clippy::cast_precision_loss)]
        let h = f as f32;
        let frame: Vec<glm::Vec3> = (0..8_u8)
            .map(|i| {
                glm::vec3(
                    f32::from(i & 1),
                    f32::from((i >> 1) & 1) + h,
                    f32::from((i >> 2) & 1),
                )
            })
            .collect();
        vertices.push_frame(&frame).unwrap();
    }
    let mut joints = FrameArray::filled(1, 76, glm::vec3(9.0, 9.0, 9.0));
    joints.set(0, 20, glm::vec3(0.0, 0.0, -0.01));
    MeshInput {
        topology: Topology::new(8, faces).unwrap(),
        vertices,
        joints,
    }
}

fn config() -> Config {
    Config::from_yaml_str(
        "
region:
  hops: 1
  min_seeds: 1
offsets:
  base: [0.0, 0.0, 0.0]
  datasets:
    lab: [1.0, 0.0, 0.0]
",
    )
    .unwrap()
}

#[test]
fn full_run() {
    init_tests();
    let pipeline = Pipeline::new(config());
    let source = PoseSource::new(
        keypoints(3, BODY_LEN, 0.0),
        keypoints(3, 2 * HAND_LEN, 1.0),
    )
    .unwrap();
    let input = mesh(3);
    let mut scene = Scene::new();
    let mut rig = Rig::new(pipeline.config().layout.clone());
    let mut shape = ShapeSequence::new("Body");
    let out = pipeline
        .run(&mut scene, Some((&source, &mut rig)), Some((&input, &mut shape)))
        .unwrap();
    info!("diagnostics {:?}", out.diagnostics);

    let d = &out.diagnostics;
    assert_eq!(d.frames, 3);
    assert_eq!(d.valid_joints, 59);
    assert_eq!(d.synthesized_joints, 2);
    assert_eq!(d.unmapped_joints + d.out_of_range_joints, 0);
    assert_eq!(d.hand_vertices, 7);
    assert_eq!(d.hand_faces, 12);
    assert!(!d.fallback_seeding);
    // Only index 20 of the twelve anchors is close, the rest are far away
    // but present
    assert_eq!(d.skipped_anchors, 0);

    // 57 joints, 54 segments, the mesh and three channels
    assert_eq!(scene.entity_count(), 57 + 54 + 1 + 3);
    assert_eq!(scene.frame_range(), Some((0, 2)));

    let mesh = scene.get(&EntityKey::Mesh("Body".to_string())).unwrap();
    match &mesh.kind {
        posemesh::animation::EntityKind::Mesh(data) => {
            assert_eq!(data.face_regions, vec![Region::Hand; 12]);
            // Normalized frame 0 sits on the ground
            let min = data.base.iter().map(|p| p.z).fold(f32::INFINITY, f32::min);
            assert!(min.abs() < EPSILON);
        }
        _ => unreachable!(),
    }
}

#[test]
fn rerun_with_extra_frame() {
    init_tests();
    let pipeline = Pipeline::new(config()).with_dataset("lab");
    let c = glm::equal_eps(&pipeline.offset(), &glm::vec3(1.0, 0.0, 0.0), EPSILON);
    assert!(c.x && c.y && c.z);
    let mut scene = Scene::new();

    let run = |scene: &mut Scene, frames: usize| {
        let source = PoseSource::new(
            keypoints(frames, BODY_LEN, 0.0),
            keypoints(frames, 2 * HAND_LEN, 1.0),
        )
        .unwrap();
        let mut rig = Rig::new(pipeline.config().layout.clone());
        pipeline
            .run(scene, Some((&source, &mut rig)), None)
            .unwrap()
    };
    run(&mut scene, 3);
    let key = EntityKey::Joint(0);
    let before = scene.get(&key).unwrap().transform_keys.clone();
    let count = scene.entity_count();
    run(&mut scene, 3);
    assert_eq!(scene.entity_count(), count);
    // The appended frame is not lower than frame 0, so the ground stays put
    // and earlier keyframes come back unchanged
    run(&mut scene, 4);
    assert_eq!(scene.entity_count(), count);
    assert_eq!(scene.frame_range(), Some((0, 3)));
    let after = &scene.get(&key).unwrap().transform_keys;
    assert_eq!(after.len(), 4);
    for k in &before.data {
        assert_eq!(after.get(k.frame), Some(&k.data));
    }
}

/// Copy of `frames` with one more frame whose points are all at height
/// `y` in estimator coordinates
fn with_low_frame(frames: &FrameArray, y: f32) -> FrameArray {
    let mut out = frames.clone();
    let last = frames.frame(frames.frame_count() - 1);
    let low: Vec<glm::Vec3> = last.iter().map(|p| glm::vec3(p.x, y, p.z)).collect();
    out.push_frame(&low).unwrap();
    out
}

#[test]
fn lower_appended_frame_regrounds() {
    init_tests();
    let pipeline = Pipeline::new(config());
    let mut scene = Scene::new();
    let body = keypoints(3, BODY_LEN, 0.0);
    let hand = keypoints(3, 2 * HAND_LEN, 1.0);

    let source = PoseSource::new(body.clone(), hand.clone()).unwrap();
    let mut rig = Rig::new(pipeline.config().layout.clone());
    pipeline
        .run(&mut scene, Some((&source, &mut rig)), None)
        .unwrap();
    let key = EntityKey::Joint(3);
    let before = scene.get(&key).unwrap().transform_keys.clone();

    // Half a unit below everything seen so far. Grounding is global, so
    // every frame moves up by the same amount and is recorded again.
    let source =
        PoseSource::new(with_low_frame(&body, -0.5), with_low_frame(&hand, -0.5))
            .unwrap();
    let mut rig = Rig::new(pipeline.config().layout.clone());
    pipeline
        .run(&mut scene, Some((&source, &mut rig)), None)
        .unwrap();
    let after = &scene.get(&key).unwrap().transform_keys;
    assert_eq!(after.len(), 4);
    for k in &before.data {
        let moved = after.get(k.frame).unwrap();
        let expected = k.data.location + glm::vec3(0.0, 0.0, 0.5);
        let c = glm::equal_eps(&moved.location, &expected, EPSILON);
        assert!(c.x && c.y && c.z);
    }
    assert!(after.get(3).unwrap().location.z.abs() < EPSILON);
}

#[test]
fn mesh_rerun_with_extra_frame() {
    init_tests();
    let pipeline = Pipeline::new(config());
    let mut scene = Scene::new();

    let run = |scene: &mut Scene, frames: usize| {
        let input = mesh(frames);
        let mut shape = ShapeSequence::new("Body");
        pipeline
            .run(scene, None, Some((&input, &mut shape)))
            .unwrap();
    };
    run(&mut scene, 3);
    assert_eq!(scene.entity_count(), 4);
    let mesh_key = EntityKey::Mesh("Body".to_string());
    let mesh_handle = scene.find(&mesh_key).unwrap();

    run(&mut scene, 4);
    // Same mesh, one new channel
    assert_eq!(scene.entity_count(), 5);
    assert_eq!(scene.find(&mesh_key), Some(mesh_handle));
    assert_eq!(scene.frame_range(), Some((0, 3)));
    for frame in 0..4 {
        let active: Vec<usize> = (0..4)
            .filter(|c| {
                let key = EntityKey::ShapeChannel {
                    mesh: "Body".to_string(),
                    frame: *c,
                };
                scene.get(&key).unwrap().weight_keys.get(frame) == Some(&1.0)
            })
            .collect();
        assert_eq!(active, vec![frame]);
    }
}

#[test]
fn mismatched_lengths_abort() {
    init_tests();
    let pipeline = Pipeline::new(config());
    let source = PoseSource::new(
        keypoints(3, BODY_LEN, 0.0),
        keypoints(3, 2 * HAND_LEN, 1.0),
    )
    .unwrap();
    let input = mesh(2);
    let mut scene = Scene::new();
    let mut rig = Rig::new(pipeline.config().layout.clone());
    let mut shape = ShapeSequence::new("Body");
    let res = pipeline.run(
        &mut scene,
        Some((&source, &mut rig)),
        Some((&input, &mut shape)),
    );
    assert!(matches!(
        res,
        Err(PmError::FrameCountMismatch {
            expected: 3,
            actual: 2
        })
    ));
    assert_eq!(scene.entity_count(), 0);
}

#[test]
fn files_on_disk() {
    init_tests();
    let dir = std::env::temp_dir().join(format!("posemesh-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let obj = dir.join("cube.obj");
    let mut text = String::new();
    for i in 0..8_u8 {
        text += &format!("v {} {} {}\n", i & 1, (i >> 1) & 1, (i >> 2) & 1);
    }
    for f in mesh(1).topology.faces() {
        text += &format!("f {} {} {}\n", f[0] + 1, f[1] + 1, f[2] + 1);
    }
    std::fs::write(&obj, text).unwrap();
    let imported = mesh_import::load_obj(&obj).unwrap();
    let cube = mesh(1);
    assert_eq!(imported.vertices.len(), 8);
    assert_eq!(imported.topology.face_count(), 12);
    // The importer may renumber vertices but every corner keeps its place
    for (a, b) in imported.topology.faces().iter().zip(cube.topology.faces()) {
        for k in 0..3 {
            assert_eq!(
                imported.vertices[a[k] as usize],
                cube.vertices.frame(0)[b[k] as usize]
            );
        }
    }

    let yaml = dir.join("config.yaml");
    std::fs::write(&yaml, "region:\n  face_policy: all\n").unwrap();
    let loaded = Config::load(&yaml).unwrap();
    assert_eq!(loaded.region.face_policy, posemesh::region::FacePolicy::All);
    assert!(matches!(
        Config::load(&dir.join("missing.yaml")),
        Err(PmError::StdIoError(_))
    ));
    assert!(matches!(
        mesh_import::load_obj(&dir.join("missing.obj")),
        Err(PmError::TObjLoadError(_))
    ));
    std::fs::remove_dir_all(&dir).unwrap();
}
