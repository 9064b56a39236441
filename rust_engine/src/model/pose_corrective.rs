//! 姿势矫正驱动值

use crate::skeleton::BoneManager;

/// 每个非根关节 9 个驱动值：`transpose(R - I)` 按列展开
///
/// 按骨骼顺序排列，跳过根骨骼。
pub fn pose_corrective_weights(bones: &BoneManager) -> Vec<f32> {
    bones
        .bones()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != bones.root_index())
        .flat_map(|(_, bone)| bone.rotation_delta().to_cols_array())
        .collect()
}
