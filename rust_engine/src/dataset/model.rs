//! FLAME 模型数据集

use glam::Vec3;

use crate::skeleton::KinematicTree;
use crate::tensor::{Tensor, TensorDocument};
use crate::{FlameError, Result};

use super::{FrameKey, FrameTable};

/// 模型数据集的张量键
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModelKey {
    Faces,
    JointRegressor,
    KintreeTable,
    ReferenceJoints,
    SkinWeights,
    PoseDirs,
    Template,
    ShapeDirs,
}

impl FrameKey for ModelKey {
    const ALL: &'static [Self] = &[
        ModelKey::Faces,
        ModelKey::JointRegressor,
        ModelKey::KintreeTable,
        ModelKey::ReferenceJoints,
        ModelKey::SkinWeights,
        ModelKey::PoseDirs,
        ModelKey::Template,
        ModelKey::ShapeDirs,
    ];

    fn name(self) -> &'static str {
        match self {
            ModelKey::Faces => "f",
            ModelKey::JointRegressor => "J_regressor",
            ModelKey::KintreeTable => "kintree_table",
            ModelKey::ReferenceJoints => "J",
            ModelKey::SkinWeights => "weights",
            ModelKey::PoseDirs => "posedirs",
            ModelKey::Template => "v_template",
            ModelKey::ShapeDirs => "shapedirs",
        }
    }
}

/// 解码并校验后的模型数据（构建后不可变）
#[derive(Clone, Debug)]
pub struct ModelDataset {
    faces: Tensor<u32>,
    joint_regressor: Tensor<f32>,
    kinematic_tree: KinematicTree,
    reference_joints: Vec<Vec3>,
    skin_weights: Tensor<f32>,
    pose_dirs: Tensor<Vec3>,
    template: Vec<Vec3>,
    shape_dirs: Tensor<Vec3>,
}

impl ModelDataset {
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_document(TensorDocument::from_json(json)?)
    }

    pub fn from_document(document: TensorDocument) -> Result<Self> {
        Self::from_table(&FrameTable::from_document(document)?)
    }

    /// 解码全部张量并一次性校验维度关系
    pub fn from_table(table: &FrameTable<ModelKey>) -> Result<Self> {
        let template = table
            .tensor::<Vec3>(ModelKey::Template)?
            .into_vector(ModelKey::Template.name())?;
        let vertex_count = template.len();

        let joint_regressor = table.tensor::<f32>(ModelKey::JointRegressor)?;
        joint_regressor.expect_rank(ModelKey::JointRegressor.name(), 2)?;
        let joint_count = joint_regressor.dim(0);
        joint_regressor.expect_shape(ModelKey::JointRegressor.name(), &[joint_count, vertex_count])?;

        let faces = table.tensor::<u32>(ModelKey::Faces)?;
        faces.expect_rank(ModelKey::Faces.name(), 2)?;
        faces.expect_shape(ModelKey::Faces.name(), &[faces.dim(0), 3])?;
        if let Some(&bad) = faces.data().iter().find(|&&i| i as usize >= vertex_count) {
            return Err(FlameError::ShapeMismatch(format!(
                "f: vertex index {} out of range for {} vertices",
                bad, vertex_count
            )));
        }

        let parents = parent_row(table.tensor::<i32>(ModelKey::KintreeTable)?, joint_count)?;
        let kinematic_tree = KinematicTree::from_parents(&parents)?;

        let reference = table.tensor::<Vec3>(ModelKey::ReferenceJoints)?;
        reference.expect_shape(ModelKey::ReferenceJoints.name(), &[joint_count])?;
        let reference_joints = reference.into_data();

        let skin_weights = table.tensor::<f32>(ModelKey::SkinWeights)?;
        skin_weights.expect_shape(ModelKey::SkinWeights.name(), &[vertex_count, joint_count])?;

        let pose_dirs = table.tensor::<Vec3>(ModelKey::PoseDirs)?;
        pose_dirs.expect_rank(ModelKey::PoseDirs.name(), 2)?;
        pose_dirs.expect_shape(ModelKey::PoseDirs.name(), &[pose_dirs.dim(0), vertex_count])?;

        let shape_dirs = table.tensor::<Vec3>(ModelKey::ShapeDirs)?;
        shape_dirs.expect_rank(ModelKey::ShapeDirs.name(), 2)?;
        shape_dirs.expect_shape(ModelKey::ShapeDirs.name(), &[shape_dirs.dim(0), vertex_count])?;

        log::info!(
            "FLAME 数据集解码完成: {} 顶点, {} 三角形, {} 关节, {} pose 形变, {} shape 形变",
            vertex_count,
            faces.dim(0),
            joint_count,
            pose_dirs.dim(0),
            shape_dirs.dim(0)
        );

        Ok(Self {
            faces,
            joint_regressor,
            kinematic_tree,
            reference_joints,
            skin_weights,
            pose_dirs,
            template,
            shape_dirs,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.template.len()
    }

    pub fn joint_count(&self) -> usize {
        self.kinematic_tree.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.faces.dim(0)
    }

    /// 三角形索引 `[T, 3]`
    pub fn faces(&self) -> &Tensor<u32> {
        &self.faces
    }

    /// 关节回归矩阵 `[J, V]`
    pub fn joint_regressor(&self) -> &Tensor<f32> {
        &self.joint_regressor
    }

    pub fn kinematic_tree(&self) -> &KinematicTree {
        &self.kinematic_tree
    }

    /// 数据集自带的关节位置，仅用于诊断
    pub fn reference_joints(&self) -> &[Vec3] {
        &self.reference_joints
    }

    /// 蒙皮权重 `[V, J]`
    pub fn skin_weights(&self) -> &Tensor<f32> {
        &self.skin_weights
    }

    /// pose corrective 形变 `[P, V]`
    pub fn pose_dirs(&self) -> &Tensor<Vec3> {
        &self.pose_dirs
    }

    pub fn template(&self) -> &[Vec3] {
        &self.template
    }

    /// shape + expression 形变 `[S, V]`
    pub fn shape_dirs(&self) -> &Tensor<Vec3> {
        &self.shape_dirs
    }
}

/// 取出父索引行：接受 `[J]` 或 FLAME 原始的 `[2, J]`（第一行为父索引）
fn parent_row(table: Tensor<i32>, joint_count: usize) -> Result<Vec<i32>> {
    let name = ModelKey::KintreeTable.name();
    let shape = table.shape().to_vec();
    match shape.as_slice() {
        [n] if *n == joint_count => Ok(table.into_data()),
        [2, n] if *n == joint_count => Ok(table.data()[..joint_count].to_vec()),
        _ => Err(FlameError::ShapeMismatch(format!(
            "{}: expected [{}] or [2, {}], got {:?}",
            name, joint_count, joint_count, shape
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_row_forms() {
        let flat = Tensor::new(vec![3], vec![-1, 0, 1]).unwrap();
        assert_eq!(parent_row(flat, 3).unwrap(), vec![-1, 0, 1]);

        let full = Tensor::new(vec![2, 3], vec![-1, 0, 1, 0, 1, 2]).unwrap();
        assert_eq!(parent_row(full, 3).unwrap(), vec![-1, 0, 1]);

        let wrong = Tensor::new(vec![4], vec![-1, 0, 1, 2]).unwrap();
        assert!(matches!(parent_row(wrong, 3), Err(FlameError::ShapeMismatch(_))));
    }
}
