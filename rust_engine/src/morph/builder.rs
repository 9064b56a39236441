//! 由方向张量 `[S, V]` 构建混合形状

use glam::Vec3;

use super::Morph;
use crate::tensor::Tensor;
use crate::{FlameError, Result};

/// 取 `dirs` 中 `[start, start + count)` 的切片构建混合形状，名称由 `name` 生成
pub fn build_blend_shapes(
    dirs: &Tensor<Vec3>,
    vertex_count: usize,
    start: usize,
    count: usize,
    name: impl Fn(usize) -> String,
) -> Result<Vec<Morph>> {
    dirs.expect_rank("blend shape directions", 2)?;
    if dirs.dim(1) != vertex_count {
        return Err(FlameError::ShapeMismatch(format!(
            "blend shape directions cover {} vertices but mesh has {}",
            dirs.dim(1),
            vertex_count
        )));
    }
    let end = start.checked_add(count).filter(|&end| end <= dirs.dim(0));
    let Some(end) = end else {
        return Err(FlameError::ShapeMismatch(format!(
            "requested blend shapes {}..{}+{} but only {} are available",
            start,
            start,
            count,
            dirs.dim(0)
        )));
    };

    (start..end)
        .map(|i| {
            let offsets = dirs.slab(i).map(<[Vec3]>::to_vec).ok_or_else(|| {
                FlameError::ShapeMismatch(format!("blend shape {} is out of range", i))
            })?;
            Ok(Morph::new(name(i), offsets))
        })
        .collect()
}
