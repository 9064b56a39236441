//! 张量记录解码

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::{FlameError, Result};

use super::{element_count, Element, Tensor};

/// 数据集中的单个张量记录
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TensorRecord {
    pub name: String,
    #[serde(rename = "type", default)]
    pub dtype: String,
    pub shape: Vec<usize>,
    pub data: String,
}

impl TensorRecord {
    /// 解码 base64 负载
    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        STANDARD
            .decode(self.data.as_bytes())
            .map_err(|e| FlameError::Decode(format!("{}: invalid base64: {}", self.name, e)))
    }

    /// 将字节逐位重解释为 `T` 张量
    pub fn decode<T: Element>(&self) -> Result<Tensor<T>> {
        if let Some(kind) = super::ScalarKind::from_tag(&self.dtype) {
            if kind != T::SCALAR {
                log::warn!(
                    "张量 {} 标记为 {}，按 {} 重解释",
                    self.name,
                    self.dtype,
                    T::SCALAR.tag()
                );
            }
        }

        let bytes = self.decode_bytes()?;
        if bytes.len() % T::SIZE != 0 {
            return Err(FlameError::Decode(format!(
                "{}: {} bytes is not a multiple of element size {}",
                self.name,
                bytes.len(),
                T::SIZE
            )));
        }

        let scalar_count = bytes.len() / T::SCALAR.size();
        let declared = element_count(&self.shape).ok_or_else(|| {
            FlameError::Decode(format!(
                "{}: shape {:?} overflows the element count",
                self.name, self.shape
            ))
        })?;
        if declared != scalar_count {
            return Err(FlameError::Decode(format!(
                "{}: shape {:?} declares {} scalars, payload holds {}",
                self.name, self.shape, declared, scalar_count
            )));
        }

        let shape = element_shape::<T>(&self.name, &self.shape)?;
        Tensor::new(shape, T::decode(&bytes))
    }

    /// 编码张量（解码的逆过程），多分量元素的维度追加在形状末尾
    pub fn encode<T: Element>(name: impl Into<String>, tensor: &Tensor<T>) -> Self {
        let mut shape = tensor.shape().to_vec();
        if T::COMPONENTS > 1 {
            shape.push(T::COMPONENTS);
        }
        Self {
            name: name.into(),
            dtype: T::SCALAR.tag().to_string(),
            shape,
            data: STANDARD.encode(T::encode(tensor.data())),
        }
    }
}

/// 折叠多分量元素占据的末尾维度：`[S, V, 3]` → `[S, V]`，`[N, 2, 3]` → `[N]`
fn element_shape<T: Element>(name: &str, shape: &[usize]) -> Result<Vec<usize>> {
    if T::COMPONENTS == 1 {
        return Ok(shape.to_vec());
    }

    let mut covered = 1usize;
    let mut cut = shape.len();
    while cut > 0 && covered < T::COMPONENTS {
        cut -= 1;
        covered *= shape[cut];
    }

    if covered != T::COMPONENTS {
        return Err(FlameError::ShapeMismatch(format!(
            "{}: trailing dims of {:?} do not form {}-component elements",
            name,
            shape,
            T::COMPONENTS
        )));
    }
    Ok(shape[..cut].to_vec())
}

/// 张量文档 `{ "data": [ ... ] }`
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TensorDocument {
    pub data: Vec<TensorRecord>,
}

impl TensorDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// 追加一个编码后的张量
    pub fn push<T: Element>(&mut self, name: impl Into<String>, tensor: &Tensor<T>) {
        self.data.push(TensorRecord::encode(name, tensor));
    }
}
