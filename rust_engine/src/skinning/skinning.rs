//! 顶点蒙皮计算

use glam::{Mat4, Vec3};
use rayon::prelude::*;

use super::{BoneInfluence, SkinningInput, SkinningOutput};

/// 计算线性混合蒙皮（逐顶点并行）
pub fn compute_skinning(input: &SkinningInput) -> SkinningOutput {
    let (positions, normals) = input
        .positions
        .par_iter()
        .zip(input.normals.par_iter())
        .enumerate()
        .map(|(i, (&position, &normal))| {
            compute_single_vertex(position, normal, input.weights.vertex(i), input.bone_matrices)
        })
        .unzip();

    SkinningOutput { positions, normals }
}

/// 计算单个顶点的蒙皮
fn compute_single_vertex(
    position: Vec3,
    normal: Vec3,
    influences: &[BoneInfluence],
    matrices: &[Mat4],
) -> (Vec3, Vec3) {
    let mut pos = Vec3::ZERO;
    let mut norm = Vec3::ZERO;

    for influence in influences {
        let m = get_matrix(matrices, influence.bone_index);
        pos += m.transform_point3(position) * influence.weight;
        norm += m.transform_vector3(normal) * influence.weight;
    }

    (pos, norm.normalize_or_zero())
}

fn get_matrix(matrices: &[Mat4], index: u32) -> Mat4 {
    matrices
        .get(index as usize)
        .copied()
        .unwrap_or(Mat4::IDENTITY)
}
