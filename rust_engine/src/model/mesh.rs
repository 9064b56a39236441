//! 网格几何

use glam::Vec3;

use crate::tensor::Tensor;

/// 顶点位置、法线和三角形索引
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshGeometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    /// 三个一组
    pub indices: Vec<u32>,
}

impl MeshGeometry {
    /// 由顶点和面张量 `[T, 3]` 创建，并计算法线
    pub fn new(positions: Vec<Vec3>, faces: &Tensor<u32>) -> Self {
        let indices = faces.data().to_vec();
        let normals = compute_normals(&positions, &indices);
        Self {
            positions,
            normals,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// 按当前位置重新计算法线
    pub fn recalculate_normals(&mut self) {
        self.normals = compute_normals(&self.positions, &self.indices);
    }
}

/// 面积加权的顶点法线；没有相邻三角形（或退化）的顶点法线为零
pub fn compute_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        let (Some(&pa), Some(&pb), Some(&pc)) = (positions.get(a), positions.get(b), positions.get(c))
        else {
            continue;
        };
        // 叉积长度即两倍面积
        let face_normal = (pb - pa).cross(pc - pa);
        normals[a] += face_normal;
        normals[b] += face_normal;
        normals[c] += face_normal;
    }

    for normal in &mut normals {
        *normal = normal.normalize_or_zero();
    }
    normals
}
