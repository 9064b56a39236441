//! 端到端导入与播放测试（合成的 5 顶点 / 5 关节头部）

use std::sync::Arc;

use flame_engine::animation::{EyeRotation, FrameArrays};
use flame_engine::dataset::{AdditiveDataset, ModelDataset};
use flame_engine::tensor::{Tensor, TensorDocument};
use flame_engine::{
    build_rig, import_flame_head, load_flame_head, FlameError, FlameFrames, FramePlayer,
    RigConfig, RiggedMesh,
};
use glam::{Mat3, Quat, Vec3};

const V: usize = 5;
const J: usize = 5;
const PERSONAL: usize = 2;
const EXPRESSIONS: usize = 3;

fn template() -> Vec<Vec3> {
    vec![
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(-1.0, 0.0, 0.0),
        Vec3::new(0.0, -1.0, 0.0),
    ]
}

fn config() -> RigConfig {
    RigConfig {
        expression_count: EXPRESSIONS,
        ..RigConfig::default()
    }
}

fn model_document(parents: &[i32]) -> TensorDocument {
    let mut doc = TensorDocument::default();
    doc.push(
        "f",
        &Tensor::new(vec![3, 3], vec![0u32, 1, 2, 0, 2, 3, 0, 3, 4]).unwrap(),
    );

    // 根关节取质心，其余关节各取一个顶点
    let mut regressor = vec![0.2f32; V];
    for j in 1..J {
        let mut row = vec![0.0f32; V];
        row[j] = 1.0;
        regressor.extend(row);
    }
    doc.push("J_regressor", &Tensor::new(vec![J, V], regressor).unwrap());

    let mut kintree = parents.to_vec();
    kintree.extend(0..J as i32);
    doc.push("kintree_table", &Tensor::new(vec![2, J], kintree).unwrap());
    doc.push("J", &Tensor::from_vec(vec![Vec3::ZERO; J]));

    // 顶点 i 完全绑定到关节 i
    let mut weights = vec![0.0f32; V * J];
    for i in 0..V {
        weights[i * J + i] = 1.0;
    }
    doc.push("weights", &Tensor::new(vec![V, J], weights).unwrap());

    let mut posedirs = vec![Vec3::ZERO; 36 * V];
    posedirs[..V].fill(Vec3::X);
    doc.push("posedirs", &Tensor::new(vec![36, V], posedirs).unwrap());

    doc.push("v_template", &Tensor::from_vec(template()));

    let mut shapedirs = Vec::new();
    shapedirs.extend(vec![Vec3::X; V]);
    shapedirs.extend(vec![Vec3::Y; V]);
    shapedirs.extend((0..V).map(|i| Vec3::new(0.0, 0.0, i as f32)));
    shapedirs.extend(vec![Vec3::ONE; V]);
    shapedirs.extend(vec![Vec3::ONE; V]);
    doc.push(
        "shapedirs",
        &Tensor::new(vec![PERSONAL + EXPRESSIONS, V], shapedirs).unwrap(),
    );

    // 未使用的张量应被忽略
    doc.push("bs_style", &Tensor::from_vec(vec![0.0f32]));
    doc
}

fn additive_document() -> TensorDocument {
    let mut doc = TensorDocument::default();
    doc.push("shape", &Tensor::from_vec(vec![0.5f32, 1.0]));
    doc.push("static_offset", &Tensor::from_vec(vec![Vec3::new(0.0, 0.0, 0.1); V]));
    doc
}

fn rig() -> RiggedMesh {
    let model = ModelDataset::from_document(model_document(&[-1, 0, 1, 1, 1])).unwrap();
    let additive = AdditiveDataset::from_document(additive_document()).unwrap();
    build_rig(&model, &additive, &config()).unwrap()
}

fn baked_positions() -> Vec<Vec3> {
    template()
        .into_iter()
        .map(|p| p + Vec3::new(0.5, 1.0, 0.1))
        .collect()
}

fn frames(jaw: Vec3) -> FlameFrames {
    let arrays = FrameArrays {
        root_positions: vec![Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0)],
        root_rotations: vec![Vec3::ZERO; 2],
        neck_rotations: vec![Vec3::ZERO; 2],
        jaw_rotations: vec![Vec3::ZERO, jaw],
        eye_rotations: vec![EyeRotation::default(); 2],
        expressions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
    };
    FlameFrames::new(arrays, &config()).unwrap()
}

fn assert_close(actual: &[Vec3], expected: &[Vec3]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert!((*a - *e).length() < 1e-5, "{:?} != {:?}", actual, expected);
    }
}

#[test]
fn test_rig_layout() {
    let rig = rig();
    assert_eq!(rig.vertex_count(), V);
    assert_eq!(rig.triangle_count(), 3);
    assert_eq!(rig.bone_count(), J);
    assert_eq!(rig.root_bone_index(), 0);

    assert_eq!(rig.blend_shape_count(), 36 + EXPRESSIONS);
    assert_eq!(rig.pose_shape_count(), 36);
    assert_eq!(rig.expression_shape_count(), EXPRESSIONS);
    assert_eq!(rig.blend_shape_name(0), Some("Pose 0"));
    assert_eq!(rig.blend_shape_name(35), Some("Pose 35"));
    assert_eq!(rig.find_blend_shape("Expression 0"), Some(36));
    assert_eq!(rig.find_blend_shape("Expression 2"), Some(38));
    assert_eq!(rig.find_blend_shape("Shape 0"), None);
    assert_eq!(rig.find_blend_shape("StaticOffset"), None);
    assert!((0..rig.blend_shape_count()).all(|i| rig.blend_shape_weight(i) == Some(0.0)));

    let names: Vec<&str> = rig
        .bone_manager
        .bones()
        .iter()
        .map(|b| b.name.as_str())
        .collect();
    assert_eq!(names, ["Root", "Neck", "Jaw", "RightEye", "LeftEye"]);
}

#[test]
fn test_bake_and_joints_use_personalized_mesh() {
    let rig = rig();
    let baked = baked_positions();
    assert_close(&rig.geometry().positions, &baked);

    // 根骨骼在原点，其余关节为烘焙后的顶点
    let bones = rig.bone_manager.bones();
    assert_eq!(bones[0].initial_position, Vec3::ZERO);
    for j in 1..J {
        assert!((bones[j].initial_position - baked[j]).length() < 1e-6);
    }

    let influences = rig.bone_weights().vertex(3);
    assert_eq!(influences.len(), 4);
    assert_eq!(influences[0].bone_index, 3);
    assert_eq!(influences[0].weight, 1.0);
    assert_eq!(influences[1].bone_index, 0);
}

#[test]
fn test_rest_update_reproduces_baked_mesh() {
    let mut rig = rig();
    rig.update();
    assert_close(rig.positions(), &rig.geometry().positions);
    assert_eq!(rig.positions_raw().len(), V * 3);
}

#[test]
fn test_frame_drives_expressions_and_root() {
    let mut rig = rig();
    let config = config();
    let mut player = FramePlayer::new(Arc::new(frames(Vec3::ZERO)));

    player.set_current_frame(1);
    assert!(player.apply(&mut rig, &config));
    assert_eq!(rig.blend_shape_weight(36), Some(1.0));
    assert_eq!(rig.blend_shape_weight(37), Some(0.0));
    assert!((0..36).all(|i| rig.blend_shape_weight(i) == Some(0.0)));

    rig.update();
    let expected: Vec<Vec3> = baked_positions()
        .into_iter()
        .enumerate()
        .map(|(i, p)| p + Vec3::new(0.0, 0.0, i as f32 + 1.0))
        .collect();
    assert_close(rig.positions(), &expected);

    player.reset(&mut rig);
    assert_eq!(player.current_frame(), 0);
    assert_eq!(rig.blend_shape_weight(36), Some(0.0));
    rig.update();
    assert_close(rig.positions(), &baked_positions());
}

#[test]
fn test_jaw_rotation_drives_pose_correctives() {
    let mut rig = rig();
    let config = config();
    let angle = 0.3f32;
    let mut player = FramePlayer::new(Arc::new(frames(Vec3::new(angle, 0.0, 0.0))));
    player.set_current_frame(1);
    assert!(player.apply(&mut rig, &config));

    // Jaw 是第二个非根骨骼，占用槽位 9..18
    let r = Mat3::from_quat(Quat::from_rotation_x(angle));
    let expected = (r - Mat3::IDENTITY).transpose().to_cols_array();
    for (k, e) in expected.iter().enumerate() {
        let w = rig.blend_shape_weight(9 + k).unwrap();
        assert!((w - e).abs() < 1e-6, "slot {}: {} != {}", 9 + k, w, e);
    }
    assert!((0..9).all(|i| rig.blend_shape_weight(i) == Some(0.0)));

    rig.apply_pose_correctives(false);
    assert!((0..36).all(|i| rig.blend_shape_weight(i) == Some(0.0)));
    // 表情不受影响
    assert_eq!(rig.blend_shape_weight(36), Some(1.0));
}

#[test]
fn test_import_from_json() {
    let model_json = model_document(&[-1, 0, 1, 1, 1]).to_json().unwrap();
    let additive_json = additive_document().to_json().unwrap();
    let rig = import_flame_head(&model_json, &additive_json, &config()).unwrap();
    assert_eq!(rig.blend_shape_count(), 39);
}

#[test]
fn test_load_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("model.json");
    let additive_path = dir.path().join("additive.json");
    std::fs::write(&model_path, model_document(&[-1, 0, 1, 1, 1]).to_json().unwrap()).unwrap();
    std::fs::write(&additive_path, additive_document().to_json().unwrap()).unwrap();

    let rig = load_flame_head(&model_path, &additive_path, &config()).unwrap();
    assert_eq!(rig.vertex_count(), V);

    assert!(matches!(
        load_flame_head(dir.path().join("missing.json"), &additive_path, &config()),
        Err(FlameError::Io(_))
    ));
}

#[test]
fn test_import_errors() {
    let additive_json = additive_document().to_json().unwrap();

    let mut doc = model_document(&[-1, 0, 1, 1, 1]);
    doc.data.retain(|r| r.name != "posedirs");
    assert!(matches!(
        import_flame_head(&doc.to_json().unwrap(), &additive_json, &config()),
        Err(FlameError::MissingFrame(name)) if name == "posedirs"
    ));

    let two_roots = model_document(&[-1, -1, 1, 1, 1]).to_json().unwrap();
    assert!(matches!(
        import_flame_head(&two_roots, &additive_json, &config()),
        Err(FlameError::InvalidTopology(_))
    ));

    let fewer_pose_slots = RigConfig {
        pose_shape_count: 27,
        ..config()
    };
    let model_json = model_document(&[-1, 0, 1, 1, 1]).to_json().unwrap();
    assert!(matches!(
        import_flame_head(&model_json, &additive_json, &fewer_pose_slots),
        Err(FlameError::ShapeMismatch(_))
    ));

    assert!(matches!(
        import_flame_head("{\"data\": 1}", &additive_json, &config()),
        Err(FlameError::Json(_))
    ));
}

#[test]
fn test_pose_slot_mismatch_fails_before_baking() {
    let model = ModelDataset::from_document(model_document(&[-1, 0, 1, 1, 1])).unwrap();
    // 静态偏移长度也不对，但应先报告姿势形状数量
    let additive = AdditiveDataset {
        shape_weights: vec![0.5, 1.0],
        static_offset: vec![Vec3::ZERO; V - 1],
    };
    let fewer_pose_slots = RigConfig {
        pose_shape_count: 27,
        ..config()
    };
    match build_rig(&model, &additive, &fewer_pose_slots) {
        Err(FlameError::ShapeMismatch(message)) => assert!(message.contains("posedirs")),
        Err(e) => panic!("unexpected error: {}", e),
        Ok(_) => panic!("mismatched pose slots must fail"),
    }
}

#[test]
fn test_frames_expression_count_must_match() {
    let arrays = FrameArrays {
        root_positions: vec![Vec3::ZERO; 2],
        root_rotations: vec![Vec3::ZERO; 2],
        neck_rotations: vec![Vec3::ZERO; 2],
        jaw_rotations: vec![Vec3::ZERO; 2],
        eye_rotations: vec![EyeRotation::default(); 2],
        expressions: vec![0.0; 200],
    };
    // 默认配置每帧 100 个表情
    assert!(FlameFrames::new(arrays.clone(), &RigConfig::default()).is_ok());
    assert!(matches!(
        FlameFrames::new(arrays, &config()),
        Err(FlameError::InconsistentFrameData(_))
    ));
}
