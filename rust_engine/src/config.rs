//! 绑定配置
//!
//! 所有参数扁平化，`Default` 即 FLAME 头部模型的标准布局；
//! 需要时可从 JSON 读取覆盖（缺省字段保持默认值）。

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::{FlameError, Result};

/// 欧拉角合成顺序（外旋，按字母顺序依次绕轴旋转）
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EulerOrder {
    Xyz,
    Xzy,
    Yxz,
    Yzx,
    #[default]
    Zxy,
    Zyx,
}

impl EulerOrder {
    /// 欧拉角（弧度，分量即绕 X/Y/Z 的角度）转四元数
    pub fn to_quat(self, euler: Vec3) -> Quat {
        let x = Quat::from_rotation_x(euler.x);
        let y = Quat::from_rotation_y(euler.y);
        let z = Quat::from_rotation_z(euler.z);
        // 外旋：先执行的旋转在乘积最右侧
        match self {
            EulerOrder::Xyz => z * y * x,
            EulerOrder::Xzy => y * z * x,
            EulerOrder::Yxz => z * x * y,
            EulerOrder::Yzx => x * z * y,
            EulerOrder::Zxy => y * x * z,
            EulerOrder::Zyx => x * y * z,
        }
    }
}

/// 由动画驱动的骨骼在骨架中的索引
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoneSlots {
    pub root: usize,
    pub neck: usize,
    pub jaw: usize,
    pub right_eye: usize,
    pub left_eye: usize,
}

impl Default for BoneSlots {
    fn default() -> Self {
        Self {
            root: 0,
            neck: 1,
            jaw: 2,
            right_eye: 3,
            left_eye: 4,
        }
    }
}

impl BoneSlots {
    fn as_array(&self) -> [usize; 5] {
        [self.root, self.neck, self.jaw, self.right_eye, self.left_eye]
    }
}

/// 绑定配置（扁平化，不嵌套多层）
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    // ========== 骨骼 ==========
    /// 骨骼名称，按运动学树的关节顺序
    pub bone_names: Vec<String>,
    /// 动画写入的骨骼槽位
    pub bone_slots: BoneSlots,

    // ========== 混合形状布局 ==========
    /// 姿势矫正形状数量，默认 36（4 个非根关节 × 9）
    pub pose_shape_count: usize,
    /// 每帧表情系数数量，默认 100
    pub expression_count: usize,
    /// 静态偏移混合形状名称
    pub static_offset_name: String,

    // ========== 蒙皮 ==========
    /// 每顶点影响骨骼数量，只接受 4 或 5
    pub max_influences: usize,

    // ========== 动画 ==========
    /// 帧数据中欧拉角的合成顺序
    pub euler_order: EulerOrder,
    /// 是否根据关节旋转驱动姿势矫正形状
    pub pose_correctives_enabled: bool,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            bone_names: ["Root", "Neck", "Jaw", "RightEye", "LeftEye"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            bone_slots: BoneSlots::default(),
            pose_shape_count: 36,
            expression_count: 100,
            static_offset_name: "StaticOffset".to_string(),
            max_influences: 4,
            euler_order: EulerOrder::Zxy,
            pose_correctives_enabled: true,
        }
    }
}

impl RigConfig {
    /// 从 JSON 读取
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件读取
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// 姿势矫正形状在绑定网格上的起始索引
    pub fn pose_shape_start(&self) -> usize {
        0
    }

    /// 表情形状在绑定网格上的起始索引（紧随姿势矫正形状）
    pub fn expression_start(&self) -> usize {
        self.pose_shape_start() + self.pose_shape_count
    }

    pub fn validate(&self) -> Result<()> {
        if !(4..=5).contains(&self.max_influences) {
            return Err(FlameError::Config(format!(
                "max_influences must be 4 or 5, got {}",
                self.max_influences
            )));
        }
        if self.pose_shape_count % 9 != 0 {
            return Err(FlameError::Config(format!(
                "pose_shape_count must be a multiple of 9, got {}",
                self.pose_shape_count
            )));
        }
        if self.static_offset_name.is_empty() {
            return Err(FlameError::Config("static_offset_name is empty".into()));
        }

        let mut seen = HashSet::new();
        for name in &self.bone_names {
            if name.is_empty() {
                return Err(FlameError::Config("bone name is empty".into()));
            }
            if !seen.insert(name.as_str()) {
                return Err(FlameError::Config(format!("duplicate bone name {:?}", name)));
            }
        }

        let slots = self.bone_slots.as_array();
        let unique: HashSet<usize> = slots.iter().copied().collect();
        if unique.len() != slots.len() {
            return Err(FlameError::Config(format!(
                "bone slots must be distinct, got {:?}",
                self.bone_slots
            )));
        }
        Ok(())
    }
}
