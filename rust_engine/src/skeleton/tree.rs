//! 运动学树（父索引表）

use crate::{FlameError, Result};

/// 由父索引表构建的关节树
///
/// 表中落在 `[0, J)` 之外的值表示根节点，必须恰好有一个；
/// 所有关节都必须能从根到达（即不存在环）。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KinematicTree {
    parents: Vec<Option<usize>>,
    root: usize,
    /// 父节点总在子节点之前
    sorted_indices: Vec<usize>,
}

impl KinematicTree {
    pub fn from_parents(table: &[i32]) -> Result<Self> {
        let count = table.len();
        let parents: Vec<Option<usize>> = table
            .iter()
            .map(|&p| usize::try_from(p).ok().filter(|&p| p < count))
            .collect();

        let roots: Vec<usize> = parents
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_none())
            .map(|(i, _)| i)
            .collect();
        if roots.len() != 1 {
            return Err(FlameError::InvalidTopology(format!(
                "expected exactly one root joint, found {} among {} joints",
                roots.len(),
                count
            )));
        }
        let root = roots[0];

        let mut children = vec![Vec::new(); count];
        for (i, parent) in parents.iter().enumerate() {
            if let Some(p) = parent {
                children[*p].push(i);
            }
        }

        // 从根广度优先遍历；每个节点只有一个父节点，环上的节点永远不会被访问
        let mut sorted_indices = Vec::with_capacity(count);
        sorted_indices.push(root);
        let mut head = 0;
        while head < sorted_indices.len() {
            let node = sorted_indices[head];
            head += 1;
            sorted_indices.extend_from_slice(&children[node]);
        }

        if sorted_indices.len() != count {
            let unreachable: Vec<usize> = (0..count)
                .filter(|i| !sorted_indices.contains(i))
                .collect();
            return Err(FlameError::InvalidTopology(format!(
                "joints {:?} form a cycle unreachable from root {}",
                unreachable, root
            )));
        }

        Ok(Self {
            parents,
            root,
            sorted_indices,
        })
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn parent(&self, index: usize) -> Option<usize> {
        self.parents.get(index).copied().flatten()
    }

    /// 父节点在前的遍历顺序
    pub fn sorted_indices(&self) -> &[usize] {
        &self.sorted_indices
    }
}
