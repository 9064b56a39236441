//! FLAME 头部导入

use std::path::Path;

use super::{BakedMesh, RawMesh, RiggedMesh};
use crate::config::RigConfig;
use crate::dataset::{AdditiveDataset, ModelDataset};
use crate::morph::{build_blend_shapes, MorphManager};
use crate::skeleton::{regress_joints, BoneManager};
use crate::skinning::select_bone_weights;
use crate::{FlameError, Result};

/// 从模型和叠加数据的 JSON 文本导入
pub fn import_flame_head(
    model_json: &str,
    additive_json: &str,
    config: &RigConfig,
) -> Result<RiggedMesh> {
    let model = ModelDataset::from_json(model_json)?;
    let additive = AdditiveDataset::from_json(additive_json)?;
    build_rig(&model, &additive, config)
}

/// 从文件导入
pub fn load_flame_head<P: AsRef<Path>, Q: AsRef<Path>>(
    model_path: P,
    additive_path: Q,
    config: &RigConfig,
) -> Result<RiggedMesh> {
    let model_json = std::fs::read_to_string(model_path.as_ref())?;
    let additive_json = std::fs::read_to_string(additive_path.as_ref())?;
    import_flame_head(&model_json, &additive_json, config)
}

/// 完整构建流程：原始网格 → 叠加个性化数据 → 烘焙 → 绑定
pub fn build_rig(
    model: &ModelDataset,
    additive: &AdditiveDataset,
    config: &RigConfig,
) -> Result<RiggedMesh> {
    config.validate()?;
    check_pose_dirs(model, config)?;
    let raw = RawMesh::from_dataset(model, additive.personal_shape_count())?;
    let baked = raw.apply_additive(additive, config)?.bake();
    rig_baked_mesh(baked, model, config)
}

/// 在烘焙网格上回归关节、选择蒙皮权重、创建骨架并添加姿势/表情形状
pub fn rig_baked_mesh(
    baked: BakedMesh,
    model: &ModelDataset,
    config: &RigConfig,
) -> Result<RiggedMesh> {
    let BakedMesh {
        geometry,
        personal_shape_count,
    } = baked;
    let vertex_count = geometry.vertex_count();

    // 关节位置取自烘焙后的个性化网格
    let joints = regress_joints(model.joint_regressor(), &geometry.positions)?;
    if log::log_enabled!(log::Level::Debug) {
        let template_joints = regress_joints(model.joint_regressor(), model.template())?;
        let residual = template_joints
            .iter()
            .zip(model.reference_joints())
            .map(|(a, b)| a.distance(*b))
            .fold(0.0f32, f32::max);
        log::debug!("模板关节回归与数据集 J 的最大偏差: {:.6}", residual);
    }

    let weights = select_bone_weights(model.skin_weights(), vertex_count, config.max_influences)?;
    let bone_manager = BoneManager::build(model.kinematic_tree(), &joints, &config.bone_names)?;
    check_bone_slots(&bone_manager, config);

    check_pose_dirs(model, config)?;
    let pose_dirs = model.pose_dirs();
    if config.pose_shape_count / 9 < bone_manager.bone_count().saturating_sub(1) {
        log::warn!(
            "{} 个非根关节超出 {} 个姿势矫正形状的容量",
            bone_manager.bone_count() - 1,
            config.pose_shape_count
        );
    }

    let shape_dirs = model.shape_dirs();
    let expression_count = shape_dirs.dim(0).saturating_sub(personal_shape_count);

    let mut morph_manager = MorphManager::new();
    let poses = build_blend_shapes(pose_dirs, vertex_count, 0, pose_dirs.dim(0), |i| {
        format!("Pose {}", i)
    })?;
    let expressions = build_blend_shapes(
        shape_dirs,
        vertex_count,
        personal_shape_count,
        expression_count,
        |i| format!("Expression {}", i - personal_shape_count),
    )?;
    for morph in poses.into_iter().chain(expressions) {
        morph_manager.add_morph(morph);
    }
    morph_manager.reset_all_weights();

    log::info!(
        "FLAME 头部绑定完成: {} 顶点, {} 骨骼, {} 姿势形状, {} 表情形状",
        vertex_count,
        bone_manager.bone_count(),
        config.pose_shape_count,
        expression_count
    );

    Ok(RiggedMesh::new(
        geometry,
        weights,
        bone_manager,
        morph_manager,
        config.pose_shape_count,
    ))
}

/// posedirs 的形状数必须等于姿势矫正槽位数
fn check_pose_dirs(model: &ModelDataset, config: &RigConfig) -> Result<()> {
    let count = model.pose_dirs().dim(0);
    if count != config.pose_shape_count {
        return Err(FlameError::ShapeMismatch(format!(
            "posedirs has {} shapes but the rig reserves {} pose corrective slots",
            count, config.pose_shape_count
        )));
    }
    Ok(())
}

fn check_bone_slots(bones: &BoneManager, config: &RigConfig) {
    let slots = config.bone_slots;
    for (label, index) in [
        ("root", slots.root),
        ("neck", slots.neck),
        ("jaw", slots.jaw),
        ("right_eye", slots.right_eye),
        ("left_eye", slots.left_eye),
    ] {
        if index >= bones.bone_count() {
            log::warn!(
                "骨骼槽位 {} = {} 超出骨骼数量 {}，动画不会驱动该槽位",
                label,
                index,
                bones.bone_count()
            );
        }
    }
    if slots.root != bones.root_index() {
        log::warn!(
            "root 槽位 {} 与运动学树的根 {} 不一致",
            slots.root,
            bones.root_index()
        );
    }
}
