//! Morph 管理器

use glam::Vec3;
use std::collections::HashMap;

use super::Morph;

/// Morph 管理器，索引即混合形状在网格上的顺序
#[derive(Clone, Debug, Default)]
pub struct MorphManager {
    morphs: Vec<Morph>,
    name_to_index: HashMap<String, usize>,
}

impl MorphManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加 Morph，返回其索引
    pub fn add_morph(&mut self, morph: Morph) -> usize {
        let index = self.morphs.len();
        self.name_to_index.entry(morph.name.clone()).or_insert(index);
        self.morphs.push(morph);
        index
    }

    /// 通过名称查找 Morph
    pub fn find_morph_by_name(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(name).copied()
    }

    /// 获取 Morph 数量
    pub fn morph_count(&self) -> usize {
        self.morphs.len()
    }

    pub fn morphs(&self) -> &[Morph] {
        &self.morphs
    }

    /// 获取 Morph
    pub fn get_morph(&self, index: usize) -> Option<&Morph> {
        self.morphs.get(index)
    }

    /// 获取可变 Morph 引用
    pub fn get_morph_mut(&mut self, index: usize) -> Option<&mut Morph> {
        self.morphs.get_mut(index)
    }

    /// 设置 Morph 权重，索引越界时返回 false
    pub fn set_morph_weight(&mut self, index: usize, weight: f32) -> bool {
        match self.morphs.get_mut(index) {
            Some(morph) => {
                morph.set_weight(weight);
                true
            }
            None => false,
        }
    }

    /// 重置所有 Morph 权重
    pub fn reset_all_weights(&mut self) {
        for morph in &mut self.morphs {
            morph.reset();
        }
    }

    /// 把所有非零权重的 Morph 叠加到顶点上
    pub fn apply_morphs(&self, positions: &mut [Vec3]) {
        for morph in &self.morphs {
            let scale = morph.effective_scale();
            if scale == 0.0 {
                continue;
            }
            for (position, offset) in positions.iter_mut().zip(&morph.vertex_offsets) {
                *position += *offset * scale;
            }
        }
    }
}
