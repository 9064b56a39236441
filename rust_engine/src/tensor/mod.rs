//! 张量解码
//!
//! 数据集里的每个张量都是 `{name, type, shape, data}` 记录：
//! - `shape` 为行主序维度
//! - `data` 为 base64 编码的平铺字节，字节序与宿主一致（逐位重解释，不做转换）

mod decoder;
mod element;

pub use decoder::{TensorDocument, TensorRecord};
pub use element::{Element, ScalarKind};

use crate::{FlameError, Result};

/// 各维乘积，溢出返回 None
///
/// 非零维的乘积也必须不溢出，这样任意后缀维度的跨度都能安全计算。
pub fn element_count(shape: &[usize]) -> Option<usize> {
    let nonzero = shape
        .iter()
        .filter(|&&d| d != 0)
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))?;
    if shape.contains(&0) {
        Some(0)
    } else {
        Some(nonzero)
    }
}

/// 行主序 N 维张量
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor<T> {
    shape: Vec<usize>,
    data: Vec<T>,
}

impl<T> Tensor<T> {
    /// 创建张量，要求 `product(shape) == data.len()`
    pub fn new(shape: Vec<usize>, data: Vec<T>) -> Result<Self> {
        let expected = element_count(&shape).ok_or_else(|| {
            FlameError::ShapeMismatch(format!("shape {:?} overflows the element count", shape))
        })?;
        if expected != data.len() {
            return Err(FlameError::ShapeMismatch(format!(
                "shape {:?} describes {} elements but data holds {}",
                shape,
                expected,
                data.len()
            )));
        }
        Ok(Self { shape, data })
    }

    /// 一维张量
    pub fn from_vec(data: Vec<T>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// 获取某一维大小，越界返回 0
    pub fn dim(&self, axis: usize) -> usize {
        self.shape.get(axis).copied().unwrap_or(0)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// 第一维之后的元素跨度
    pub fn stride(&self) -> usize {
        self.shape.iter().skip(1).product()
    }

    /// 沿第一维取第 `index` 个切片（二维张量即第 `index` 行）
    pub fn slab(&self, index: usize) -> Option<&[T]> {
        if self.shape.is_empty() || index >= self.shape[0] {
            return None;
        }
        let stride = self.stride();
        self.data.get(index * stride..(index + 1) * stride)
    }

    /// 校验形状完全一致
    pub fn expect_shape(&self, name: &str, expected: &[usize]) -> Result<()> {
        if self.shape != expected {
            return Err(FlameError::ShapeMismatch(format!(
                "{}: expected shape {:?}, got {:?}",
                name, expected, self.shape
            )));
        }
        Ok(())
    }

    /// 校验秩
    pub fn expect_rank(&self, name: &str, rank: usize) -> Result<()> {
        if self.shape.len() != rank {
            return Err(FlameError::ShapeMismatch(format!(
                "{}: expected rank {}, got shape {:?}",
                name, rank, self.shape
            )));
        }
        Ok(())
    }

    /// 取出平铺数据，要求除最后一维外都为 1（如 `[N]`、`[1, N]`）
    pub fn into_vector(self, name: &str) -> Result<Vec<T>> {
        let leading = self.shape.len().saturating_sub(1);
        if self.shape[..leading].iter().any(|&d| d != 1) {
            return Err(FlameError::ShapeMismatch(format!(
                "{}: expected a vector, got shape {:?}",
                name, self.shape
            )));
        }
        Ok(self.data)
    }
}
