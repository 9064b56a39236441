//! 构建阶段：原始网格 → 个性化网格 → 烘焙网格

use glam::Vec3;

use super::MeshGeometry;
use crate::config::RigConfig;
use crate::dataset::{AdditiveDataset, ModelDataset};
use crate::morph::{build_blend_shapes, Morph, MorphManager};
use crate::{FlameError, Result};

/// 模板网格 + 个性化 shape（`Shape {i}`，权重为零）
#[derive(Clone, Debug)]
pub struct RawMesh {
    geometry: MeshGeometry,
    morph_manager: MorphManager,
    personal_shape_count: usize,
}

impl RawMesh {
    /// 取 `shapedirs` 前 `personal_shape_count` 个方向作为个性化 shape
    pub fn from_dataset(dataset: &ModelDataset, personal_shape_count: usize) -> Result<Self> {
        let geometry = MeshGeometry::new(dataset.template().to_vec(), dataset.faces());
        let shapes = build_blend_shapes(
            dataset.shape_dirs(),
            geometry.vertex_count(),
            0,
            personal_shape_count,
            |i| format!("Shape {}", i),
        )?;

        let mut morph_manager = MorphManager::new();
        for shape in shapes {
            morph_manager.add_morph(shape);
        }

        Ok(Self {
            geometry,
            morph_manager,
            personal_shape_count,
        })
    }

    pub fn geometry(&self) -> &MeshGeometry {
        &self.geometry
    }

    pub fn personal_shape_count(&self) -> usize {
        self.personal_shape_count
    }

    pub fn morph_manager(&self) -> &MorphManager {
        &self.morph_manager
    }

    /// 写入个性化 shape 权重并追加权重为 1 的静态偏移形状
    pub fn apply_additive(
        mut self,
        additive: &AdditiveDataset,
        config: &RigConfig,
    ) -> Result<PersonalizedMesh> {
        if additive.shape_weights.len() != self.personal_shape_count {
            return Err(FlameError::ShapeMismatch(format!(
                "additive data has {} shape weights but mesh has {} personal shapes",
                additive.shape_weights.len(),
                self.personal_shape_count
            )));
        }
        if additive.static_offset.len() != self.geometry.vertex_count() {
            return Err(FlameError::ShapeMismatch(format!(
                "static offset has {} entries but mesh has {} vertices",
                additive.static_offset.len(),
                self.geometry.vertex_count()
            )));
        }

        for (i, &weight) in additive.shape_weights.iter().enumerate() {
            self.morph_manager.set_morph_weight(i, weight);
        }
        let static_offset = self.morph_manager.add_morph(Morph::new(
            config.static_offset_name.clone(),
            additive.static_offset.clone(),
        ));
        self.morph_manager.set_morph_weight(static_offset, 1.0);

        Ok(PersonalizedMesh {
            geometry: self.geometry,
            morph_manager: self.morph_manager,
            personal_shape_count: self.personal_shape_count,
        })
    }
}

/// 个性化权重和静态偏移已生效、尚未烘焙的网格
#[derive(Clone, Debug)]
pub struct PersonalizedMesh {
    geometry: MeshGeometry,
    morph_manager: MorphManager,
    personal_shape_count: usize,
}

impl PersonalizedMesh {
    pub fn morph_manager(&self) -> &MorphManager {
        &self.morph_manager
    }

    /// 当前权重下的变形位置
    pub fn deformed_positions(&self) -> Vec<Vec3> {
        let mut positions = self.geometry.positions.clone();
        self.morph_manager.apply_morphs(&mut positions);
        positions
    }

    /// 快照变形结果并重新计算法线；个性化和静态偏移形状不再保留
    pub fn bake(self) -> BakedMesh {
        let positions = self.deformed_positions();
        let mut geometry = self.geometry;
        geometry.positions = positions;
        geometry.recalculate_normals();

        BakedMesh {
            geometry,
            personal_shape_count: self.personal_shape_count,
        }
    }
}

/// 烘焙后的网格，不带任何混合形状
#[derive(Clone, Debug)]
pub struct BakedMesh {
    pub geometry: MeshGeometry,
    /// 烘焙前的个性化 shape 数量（表情形状从 `shapedirs` 的这一位置开始）
    pub personal_shape_count: usize,
}
