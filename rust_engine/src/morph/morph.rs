//! Morph 定义

use glam::Vec3;

/// 稠密顶点 Morph：每个顶点一个偏移，单帧
#[derive(Clone, Debug, PartialEq)]
pub struct Morph {
    pub name: String,
    pub weight: f32,
    /// 帧权重，权重等于该值时偏移完整生效
    pub frame_weight: f32,
    pub vertex_offsets: Vec<Vec3>,
}

impl Morph {
    pub fn new(name: String, vertex_offsets: Vec<Vec3>) -> Self {
        Self {
            name,
            weight: 0.0,
            frame_weight: 1.0,
            vertex_offsets,
        }
    }

    /// 获取名称
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// 获取权重
    pub fn get_weight(&self) -> f32 {
        self.weight
    }

    /// 设置权重（不限制范围：表情系数和姿势矫正值都可能为负或大于 1）
    pub fn set_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    /// 重置权重
    pub fn reset(&mut self) {
        self.weight = 0.0;
    }

    /// 当前权重下的有效缩放
    pub fn effective_scale(&self) -> f32 {
        if self.frame_weight == 0.0 {
            0.0
        } else {
            self.weight / self.frame_weight
        }
    }
}

impl Default for Morph {
    fn default() -> Self {
        Self::new(String::new(), Vec::new())
    }
}
