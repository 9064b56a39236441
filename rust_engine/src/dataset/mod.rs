//! 数据集：把张量文档按固定键表组织成语义实体
//!
//! 每类数据集定义一个键枚举，文档只在构建时按名称匹配一次，缺少必需键立即失败。

mod additive;
mod model;

pub use additive::{AdditiveDataset, AdditiveKey};
pub use model::{ModelDataset, ModelKey};

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::tensor::{Element, Tensor, TensorDocument, TensorRecord};
use crate::{FlameError, Result};

/// 数据集键
pub trait FrameKey: Copy + Eq + Hash + Debug + 'static {
    /// 全部必需键
    const ALL: &'static [Self];

    /// 文档中的张量名
    fn name(self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|key| key.name() == name)
    }
}

/// 按键索引的张量记录表
#[derive(Clone, Debug)]
pub struct FrameTable<K: FrameKey> {
    records: HashMap<K, TensorRecord>,
}

impl<K: FrameKey> FrameTable<K> {
    /// 从文档建表，缺少任何必需键时返回 `MissingFrame`
    pub fn from_document(document: TensorDocument) -> Result<Self> {
        let mut records = HashMap::with_capacity(K::ALL.len());

        for record in document.data {
            let Some(key) = K::from_name(&record.name) else {
                log::debug!("忽略未使用的张量: {}", record.name);
                continue;
            };
            match records.entry(key) {
                // 重名时保留第一条
                Entry::Occupied(_) => log::warn!("张量 {} 重复出现，忽略后续记录", record.name),
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
            }
        }

        if let Some(missing) = K::ALL.iter().find(|key| !records.contains_key(*key)) {
            return Err(FlameError::MissingFrame(missing.name().to_string()));
        }

        Ok(Self { records })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_document(TensorDocument::from_json(json)?)
    }

    /// 解码指定键的张量
    pub fn tensor<T: Element>(&self, key: K) -> Result<Tensor<T>> {
        self.records
            .get(&key)
            .ok_or_else(|| FlameError::MissingFrame(key.name().to_string()))?
            .decode()
    }

    pub fn record(&self, key: K) -> Option<&TensorRecord> {
        self.records.get(&key)
    }
}
