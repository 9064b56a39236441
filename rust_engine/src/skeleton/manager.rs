//! 骨骼管理器

use glam::{Mat4, Quat, Vec3};
use std::collections::HashMap;

use super::{Bone, KinematicTree};
use crate::{FlameError, Result};

/// 骨骼管理器
#[derive(Clone, Debug)]
pub struct BoneManager {
    bones: Vec<Bone>,
    name_to_index: HashMap<String, usize>,
    sorted_indices: Vec<usize>,
    root_index: usize,
    skinning_matrices: Vec<Mat4>,
}

impl BoneManager {
    /// 由运动学树和静止姿势关节位置创建骨架
    ///
    /// 根骨骼固定在原点，其余骨骼放在各自回归出的关节位置。
    /// `names` 不足时以 `Joint{i}` 补齐。
    pub fn build(tree: &KinematicTree, joints: &[Vec3], names: &[String]) -> Result<Self> {
        if joints.len() != tree.len() {
            return Err(FlameError::ShapeMismatch(format!(
                "kinematic tree has {} joints but {} joint positions were given",
                tree.len(),
                joints.len()
            )));
        }

        let mut manager = Self {
            bones: Vec::with_capacity(tree.len()),
            name_to_index: HashMap::new(),
            sorted_indices: tree.sorted_indices().to_vec(),
            root_index: tree.root(),
            skinning_matrices: Vec::new(),
        };

        for (i, &joint) in joints.iter().enumerate() {
            let name = names
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("Joint{}", i));
            let mut bone = Bone::new(name);
            bone.parent_index = tree.parent(i);
            bone.initial_position = if i == tree.root() { Vec3::ZERO } else { joint };
            manager.add_bone(bone);
        }

        manager.build_hierarchy();
        Ok(manager)
    }

    fn add_bone(&mut self, bone: Bone) {
        let index = self.bones.len();
        // 重名时保留第一个
        self.name_to_index.entry(bone.name.clone()).or_insert(index);
        self.bones.push(bone);
    }

    /// 计算骨骼偏移和逆绑定矩阵
    fn build_hierarchy(&mut self) {
        let root_global = Mat4::from_translation(self.bones[self.root_index].initial_position);

        for i in 0..self.bones.len() {
            let pos = self.bones[i].initial_position;
            let offset = match self.bones[i].parent_index {
                Some(parent) => pos - self.bones[parent].initial_position,
                None => pos,
            };
            self.bones[i].bone_offset = offset;

            // 初始全局变换直接从绑定空间坐标创建
            let init_global = Mat4::from_translation(pos);
            self.bones[i].global_transform = init_global;
            // 逆绑定矩阵 = inverse(骨骼全局) * 根骨骼全局
            self.bones[i].inverse_bind_matrix = init_global.inverse() * root_global;
            self.bones[i].local_transform = Mat4::from_translation(offset);
        }

        // 初始状态下 skinning_matrix = global * inverse_bind = I
        self.skinning_matrices = self.bones.iter().map(Bone::get_skinning_matrix).collect();
    }

    /// 通过名称查找骨骼
    pub fn find_bone_by_name(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    pub fn root_index(&self) -> usize {
        self.root_index
    }

    /// 获取骨骼数量
    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    /// 获取骨骼
    pub fn get_bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    /// 获取可变骨骼引用
    pub fn get_bone_mut(&mut self, index: usize) -> Option<&mut Bone> {
        self.bones.get_mut(index)
    }

    /// 重置所有骨骼变换
    pub fn reset_all_transforms(&mut self) {
        for bone in &mut self.bones {
            bone.reset_animation();
        }
    }

    /// 按父子顺序更新本地/全局变换并刷新蒙皮矩阵
    pub fn update_transforms(&mut self) {
        for &idx in &self.sorted_indices {
            self.bones[idx].update_local_transform();
            let parent_global = self.bones[idx]
                .parent_index
                .map(|parent| self.bones[parent].global_transform);
            let local = self.bones[idx].local_transform;
            self.bones[idx].global_transform = match parent_global {
                Some(parent_global) => parent_global * local,
                None => local,
            };
        }

        for (matrix, bone) in self.skinning_matrices.iter_mut().zip(&self.bones) {
            *matrix = bone.get_skinning_matrix();
        }
    }

    /// 设置骨骼动画平移
    pub fn set_bone_translation(&mut self, index: usize, translation: Vec3) {
        if let Some(bone) = self.bones.get_mut(index) {
            bone.animation_translate = translation;
        }
    }

    /// 设置骨骼动画旋转
    pub fn set_bone_rotation(&mut self, index: usize, rotation: Quat) {
        if let Some(bone) = self.bones.get_mut(index) {
            bone.animation_rotate = rotation;
        }
    }

    /// 获取全局变换
    pub fn get_global_transform(&self, index: usize) -> Mat4 {
        self.bones
            .get(index)
            .map(|b| b.global_transform)
            .unwrap_or(Mat4::IDENTITY)
    }

    /// 获取蒙皮矩阵数组
    pub fn get_skinning_matrices(&self) -> &[Mat4] {
        &self.skinning_matrices
    }

    /// 逆绑定矩阵数组（与骨骼一一对应）
    pub fn bind_matrices(&self) -> Vec<Mat4> {
        self.bones.iter().map(|b| b.inverse_bind_matrix).collect()
    }
}
