//! 绑定后的 FLAME 头部运行时

use glam::{Mat4, Quat, Vec3};

use super::{pose_corrective_weights, MeshGeometry};
use crate::morph::MorphManager;
use crate::skeleton::BoneManager;
use crate::skinning::{compute_skinning, BoneWeights, SkinningInput};

/// 绑定完成的网格：烘焙几何 + 骨骼 + 混合形状
///
/// 混合形状布局：`[0, P)` 为姿势矫正形状，`[P, P + E)` 为表情形状。
#[derive(Clone, Debug)]
pub struct RiggedMesh {
    // 静态数据
    geometry: MeshGeometry,
    weights: BoneWeights,
    pose_shape_count: usize,
    expression_shape_count: usize,

    // 子系统
    pub bone_manager: BoneManager,
    pub morph_manager: MorphManager,

    // 运行时数据
    update_positions: Vec<Vec3>,
    update_normals: Vec<Vec3>,
}

impl RiggedMesh {
    pub fn new(
        geometry: MeshGeometry,
        weights: BoneWeights,
        bone_manager: BoneManager,
        morph_manager: MorphManager,
        pose_shape_count: usize,
    ) -> Self {
        let expression_shape_count = morph_manager.morph_count().saturating_sub(pose_shape_count);
        Self {
            update_positions: geometry.positions.clone(),
            update_normals: geometry.normals.clone(),
            geometry,
            weights,
            pose_shape_count,
            expression_shape_count,
            bone_manager,
            morph_manager,
        }
    }

    /// 获取顶点数量
    pub fn vertex_count(&self) -> usize {
        self.geometry.vertex_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.geometry.triangle_count()
    }

    pub fn indices(&self) -> &[u32] {
        &self.geometry.indices
    }

    /// 烘焙后的静止几何
    pub fn geometry(&self) -> &MeshGeometry {
        &self.geometry
    }

    pub fn bone_weights(&self) -> &BoneWeights {
        &self.weights
    }

    pub fn bone_count(&self) -> usize {
        self.bone_manager.bone_count()
    }

    pub fn root_bone_index(&self) -> usize {
        self.bone_manager.root_index()
    }

    pub fn bind_matrices(&self) -> Vec<Mat4> {
        self.bone_manager.bind_matrices()
    }

    pub fn blend_shape_count(&self) -> usize {
        self.morph_manager.morph_count()
    }

    pub fn pose_shape_count(&self) -> usize {
        self.pose_shape_count
    }

    pub fn expression_shape_count(&self) -> usize {
        self.expression_shape_count
    }

    pub fn find_blend_shape(&self, name: &str) -> Option<usize> {
        self.morph_manager.find_morph_by_name(name)
    }

    pub fn blend_shape_name(&self, index: usize) -> Option<&str> {
        self.morph_manager.get_morph(index).map(|m| m.get_name())
    }

    pub fn blend_shape_weight(&self, index: usize) -> Option<f32> {
        self.morph_manager.get_morph(index).map(|m| m.get_weight())
    }

    /// 设置混合形状权重，索引越界时返回 false
    pub fn set_blend_shape_weight(&mut self, index: usize, weight: f32) -> bool {
        self.morph_manager.set_morph_weight(index, weight)
    }

    /// 设置骨骼本地平移（相对绑定姿势）
    pub fn set_bone_translation(&mut self, index: usize, translation: Vec3) {
        self.bone_manager.set_bone_translation(index, translation);
    }

    /// 设置骨骼本地旋转
    pub fn set_bone_rotation(&mut self, index: usize, rotation: Quat) {
        self.bone_manager.set_bone_rotation(index, rotation);
    }

    /// 所有混合形状权重归零，骨骼回到绑定姿势
    pub fn reset_pose(&mut self) {
        self.morph_manager.reset_all_weights();
        self.bone_manager.reset_all_transforms();
    }

    /// 根据当前骨骼旋转写入姿势矫正权重；关闭时全部归零
    pub fn apply_pose_correctives(&mut self, enabled: bool) {
        let slots = self.pose_shape_count;
        if slots == 0 {
            return;
        }

        if !enabled {
            for i in 0..slots {
                self.morph_manager.set_morph_weight(i, 0.0);
            }
            return;
        }

        let weights = pose_corrective_weights(&self.bone_manager);
        if weights.len() > slots {
            log::warn!(
                "{} 个姿势驱动值超出 {} 个姿势矫正形状，多余部分被忽略",
                weights.len(),
                slots
            );
        }
        for i in 0..slots {
            let value = weights.get(i).copied().unwrap_or(0.0);
            self.morph_manager.set_morph_weight(i, value);
        }
    }

    /// 更新顶点：混合形状变形 → 骨骼变换 → 线性混合蒙皮
    pub fn update(&mut self) {
        let mut positions = self.geometry.positions.clone();
        self.morph_manager.apply_morphs(&mut positions);
        self.bone_manager.update_transforms();

        let output = compute_skinning(&SkinningInput {
            positions: &positions,
            normals: &self.geometry.normals,
            weights: &self.weights,
            bone_matrices: self.bone_manager.get_skinning_matrices(),
        });
        self.update_positions = output.positions;
        self.update_normals = output.normals;
    }

    /// 最近一次 `update` 的顶点位置
    pub fn positions(&self) -> &[Vec3] {
        &self.update_positions
    }

    /// 最近一次 `update` 的顶点法线
    pub fn normals(&self) -> &[Vec3] {
        &self.update_normals
    }

    /// 平铺的顶点位置（渲染端上传用）
    pub fn positions_raw(&self) -> Vec<f32> {
        self.update_positions.iter().flat_map(|p| p.to_array()).collect()
    }
}
