//! FLAME Engine - FLAME 参数化头部模型的导入与驱动
//!
//! 提供：
//! - 张量文档解码（base64 平铺缓冲区 → 带形状的类型化数组）
//! - 关节回归、蒙皮权重选择、混合形状构建
//! - 分阶段构建绑定网格（个性化叠加 → 烘焙 → 绑定）
//! - 逐帧动画解码与播放、姿势矫正驱动

pub mod animation;
pub mod config;
pub mod dataset;
pub mod model;
pub mod morph;
pub mod skeleton;
pub mod skinning;
pub mod tensor;

pub use animation::{FlameFrame, FlameFrames, FramePlayer};
pub use config::{BoneSlots, EulerOrder, RigConfig};
pub use dataset::{AdditiveDataset, ModelDataset};
pub use model::{build_rig, import_flame_head, load_flame_head, RiggedMesh};
pub use morph::{Morph, MorphManager};
pub use skeleton::{Bone, BoneManager, KinematicTree};
pub use tensor::{Tensor, TensorDocument, TensorRecord};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlameError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Missing frame: {0}")]
    MissingFrame(String),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Invalid topology: {0}")]
    InvalidTopology(String),

    #[error("Inconsistent frame data: {0}")]
    InconsistentFrameData(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FlameError>;
