//! 关节回归：`joint[j] = Σ_v W[j, v] * vertex[v]`

use glam::Vec3;
use rayon::prelude::*;

use crate::tensor::Tensor;
use crate::{FlameError, Result};

/// 由回归矩阵 `[J, V]` 计算静止姿势关节位置
///
/// 每个关节独立并行计算；单个关节内按顶点顺序累加，结果可复现。
pub fn regress_joints(regressor: &Tensor<f32>, vertices: &[Vec3]) -> Result<Vec<Vec3>> {
    regressor.expect_rank("J_regressor", 2)?;
    let joint_count = regressor.dim(0);
    let vertex_count = regressor.dim(1);
    if vertex_count != vertices.len() {
        return Err(FlameError::ShapeMismatch(format!(
            "J_regressor has {} columns but mesh has {} vertices",
            vertex_count,
            vertices.len()
        )));
    }
    if vertex_count == 0 {
        return Ok(vec![Vec3::ZERO; joint_count]);
    }

    let joints = regressor
        .data()
        .par_chunks_exact(vertex_count)
        .map(|row| {
            row.iter()
                .zip(vertices)
                .fold(Vec3::ZERO, |acc, (&w, &v)| acc + w * v)
        })
        .collect();
    Ok(joints)
}
