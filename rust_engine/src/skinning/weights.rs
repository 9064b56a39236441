//! 每顶点影响骨骼选择

use rayon::prelude::*;

use crate::tensor::Tensor;
use crate::{FlameError, Result};

/// 单个影响骨骼
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoneInfluence {
    pub bone_index: u32,
    pub weight: f32,
}

/// 每顶点固定 K 个影响骨骼，按权重降序排列
#[derive(Clone, Debug, PartialEq)]
pub struct BoneWeights {
    influences_per_vertex: usize,
    influences: Vec<BoneInfluence>,
}

impl BoneWeights {
    pub fn influences_per_vertex(&self) -> usize {
        self.influences_per_vertex
    }

    pub fn vertex_count(&self) -> usize {
        self.influences
            .len()
            .checked_div(self.influences_per_vertex)
            .unwrap_or(0)
    }

    /// 第 `index` 个顶点的影响骨骼
    ///
    /// # Panics
    ///
    /// `index >= vertex_count()` 时 panic
    pub fn vertex(&self, index: usize) -> &[BoneInfluence] {
        let start = index * self.influences_per_vertex;
        &self.influences[start..start + self.influences_per_vertex]
    }

    pub fn influences(&self) -> &[BoneInfluence] {
        &self.influences
    }

    /// 重新归一化后的副本（权重和为零的顶点保持不变）
    ///
    /// 导入流程保存的是截断后的原始权重，需要和为 1 时由调用方显式选择。
    pub fn normalized(&self) -> Self {
        let mut influences = self.influences.clone();
        for chunk in influences.chunks_mut(self.influences_per_vertex.max(1)) {
            let sum: f32 = chunk.iter().map(|i| i.weight).sum();
            if sum > 0.0 {
                for influence in chunk {
                    influence.weight /= sum;
                }
            }
        }
        Self {
            influences_per_vertex: self.influences_per_vertex,
            influences,
        }
    }
}

/// 从稠密权重矩阵 `[V, J]` 中为每个顶点选出权重最大的 `k` 个骨骼
///
/// 稳定排序：权重相同时保留关节索引较小者。截断后的权重不重新归一化。
/// 比较采用 IEEE 全序，NaN 权重不会破坏排序。
pub fn select_bone_weights(
    weights: &Tensor<f32>,
    vertex_count: usize,
    k: usize,
) -> Result<BoneWeights> {
    weights.expect_rank("weights", 2)?;
    let joint_count = weights.dim(1);
    if weights.dim(0) != vertex_count {
        return Err(FlameError::ShapeMismatch(format!(
            "weights has {} rows but mesh has {} vertices",
            weights.dim(0),
            vertex_count
        )));
    }
    if k == 0 || joint_count < k {
        return Err(FlameError::ShapeMismatch(format!(
            "cannot select {} influences from {} joints",
            k, joint_count
        )));
    }

    let influences = weights
        .data()
        .par_chunks_exact(joint_count)
        .flat_map_iter(|row| {
            let mut ranked: Vec<BoneInfluence> = row
                .iter()
                .enumerate()
                .map(|(j, &weight)| BoneInfluence {
                    bone_index: j as u32,
                    weight,
                })
                .collect();
            ranked.sort_by(|a, b| b.weight.total_cmp(&a.weight));
            ranked.truncate(k);
            ranked
        })
        .collect();

    Ok(BoneWeights {
        influences_per_vertex: k,
        influences,
    })
}
