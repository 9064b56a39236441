//! 骨骼节点

use glam::{Mat3, Mat4, Quat, Vec3};

/// 骨骼节点
#[derive(Clone, Debug)]
pub struct Bone {
    pub name: String,
    pub parent_index: Option<usize>,

    // 初始位置（绑定空间，根骨骼位于原点）
    pub initial_position: Vec3,
    // 相对于父骨骼的偏移（在build_hierarchy中计算）
    pub bone_offset: Vec3,
    // 逆绑定矩阵（在build_hierarchy中计算）
    pub inverse_bind_matrix: Mat4,

    // 动画状态
    pub animation_translate: Vec3,
    pub animation_rotate: Quat,

    // 变换结果
    pub local_transform: Mat4,
    pub global_transform: Mat4,
}

impl Bone {
    pub fn new(name: String) -> Self {
        Self {
            name,
            parent_index: None,
            initial_position: Vec3::ZERO,
            bone_offset: Vec3::ZERO,
            inverse_bind_matrix: Mat4::IDENTITY,
            animation_translate: Vec3::ZERO,
            animation_rotate: Quat::IDENTITY,
            local_transform: Mat4::IDENTITY,
            global_transform: Mat4::IDENTITY,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_index.is_none()
    }

    /// 重置动画状态
    pub fn reset_animation(&mut self) {
        self.animation_translate = Vec3::ZERO;
        self.animation_rotate = Quat::IDENTITY;
    }

    /// 更新本地变换：平移 = bone_offset + animation_translate，旋转 = animation_rotate
    pub fn update_local_transform(&mut self) {
        let translate = self.bone_offset + self.animation_translate;
        self.local_transform = Mat4::from_rotation_translation(self.animation_rotate, translate);
    }

    /// 获取蒙皮矩阵 = 当前全局变换 * 逆绑定矩阵
    pub fn get_skinning_matrix(&self) -> Mat4 {
        self.global_transform * self.inverse_bind_matrix
    }

    /// 相对静止姿势的旋转偏差 `transpose(R - I)`
    ///
    /// 静止姿势下所有骨骼的本地旋转都是单位旋转，因此偏差只取决于动画旋转。
    pub fn rotation_delta(&self) -> Mat3 {
        (Mat3::from_quat(self.animation_rotate) - Mat3::IDENTITY).transpose()
    }
}

impl Default for Bone {
    fn default() -> Self {
        Self::new(String::new())
    }
}
