//! 顶点蒙皮：影响骨骼选择与线性混合蒙皮

mod skinning;
mod weights;

pub use skinning::compute_skinning;
pub use weights::{select_bone_weights, BoneInfluence, BoneWeights};

use glam::{Mat4, Vec3};

/// 蒙皮输入数据
pub struct SkinningInput<'a> {
    /// 变形（morph 之后）的顶点位置
    pub positions: &'a [Vec3],
    /// 顶点法线
    pub normals: &'a [Vec3],
    /// 每顶点影响骨骼
    pub weights: &'a BoneWeights,
    /// 骨骼变换矩阵（已乘以逆绑定矩阵）
    pub bone_matrices: &'a [Mat4],
}

/// 蒙皮输出数据
pub struct SkinningOutput {
    /// 变换后的顶点位置
    pub positions: Vec<Vec3>,
    /// 变换后的顶点法线
    pub normals: Vec<Vec3>,
}
