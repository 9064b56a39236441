//! 个性化叠加数据（shape 权重 + 静态顶点偏移）

use glam::Vec3;

use crate::tensor::TensorDocument;
use crate::Result;

use super::{FrameKey, FrameTable};

/// 叠加数据集的张量键
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AdditiveKey {
    ShapeWeights,
    StaticOffset,
}

impl FrameKey for AdditiveKey {
    const ALL: &'static [Self] = &[AdditiveKey::ShapeWeights, AdditiveKey::StaticOffset];

    fn name(self) -> &'static str {
        match self {
            AdditiveKey::ShapeWeights => "shape",
            AdditiveKey::StaticOffset => "static_offset",
        }
    }
}

/// 个性化叠加数据，烘焙基础网格时消费一次
#[derive(Clone, Debug, PartialEq)]
pub struct AdditiveDataset {
    pub shape_weights: Vec<f32>,
    pub static_offset: Vec<Vec3>,
}

impl AdditiveDataset {
    pub fn new(shape_weights: Vec<f32>, static_offset: Vec<Vec3>) -> Self {
        Self {
            shape_weights,
            static_offset,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_document(TensorDocument::from_json(json)?)
    }

    pub fn from_document(document: TensorDocument) -> Result<Self> {
        Self::from_table(&FrameTable::from_document(document)?)
    }

    pub fn from_table(table: &FrameTable<AdditiveKey>) -> Result<Self> {
        let shape_weights = table
            .tensor::<f32>(AdditiveKey::ShapeWeights)?
            .into_vector(AdditiveKey::ShapeWeights.name())?;
        let static_offset = table
            .tensor::<Vec3>(AdditiveKey::StaticOffset)?
            .into_vector(AdditiveKey::StaticOffset.name())?;

        log::info!(
            "叠加数据解码完成: {} 个 shape 权重, {} 个静态偏移",
            shape_weights.len(),
            static_offset.len()
        );

        Ok(Self::new(shape_weights, static_offset))
    }

    /// 个性化 shape 数量
    pub fn personal_shape_count(&self) -> usize {
        self.shape_weights.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::Tensor;
    use crate::FlameError;

    #[test]
    fn test_from_document() {
        let mut doc = TensorDocument::default();
        doc.push("shape", &Tensor::new(vec![1, 2], vec![0.25f32, -0.5]).unwrap());
        doc.push("static_offset", &Tensor::from_vec(vec![Vec3::X, Vec3::Y, Vec3::Z]));

        let additive = AdditiveDataset::from_document(doc).unwrap();
        assert_eq!(additive.shape_weights, vec![0.25, -0.5]);
        assert_eq!(additive.static_offset, vec![Vec3::X, Vec3::Y, Vec3::Z]);
        assert_eq!(additive.personal_shape_count(), 2);
    }

    #[test]
    fn test_missing_static_offset() {
        let mut doc = TensorDocument::default();
        doc.push("shape", &Tensor::from_vec(vec![0.0f32]));
        assert!(matches!(
            AdditiveDataset::from_document(doc),
            Err(FlameError::MissingFrame(name)) if name == "static_offset"
        ));
    }
}
