//! 逐帧 FLAME 动画数据

use glam::{Quat, Vec3};

use crate::config::{EulerOrder, RigConfig};
use crate::dataset::{FrameKey, FrameTable};
use crate::tensor::{Element, ScalarKind, TensorDocument};
use crate::{FlameError, Result};

/// 动画数据集的张量键
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnimationKey {
    RootPosition,
    RootRotation,
    NeckRotation,
    JawRotation,
    EyeRotation,
    Expressions,
}

impl FrameKey for AnimationKey {
    const ALL: &'static [Self] = &[
        AnimationKey::RootPosition,
        AnimationKey::RootRotation,
        AnimationKey::NeckRotation,
        AnimationKey::JawRotation,
        AnimationKey::EyeRotation,
        AnimationKey::Expressions,
    ];

    fn name(self) -> &'static str {
        match self {
            AnimationKey::RootPosition => "translation",
            AnimationKey::RootRotation => "rotation",
            AnimationKey::NeckRotation => "neck_pose",
            AnimationKey::JawRotation => "jaw_pose",
            AnimationKey::EyeRotation => "eyes_pose",
            AnimationKey::Expressions => "expr",
        }
    }
}

/// 一帧的左右眼欧拉角
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EyeRotation {
    pub left: Vec3,
    pub right: Vec3,
}

impl Element for EyeRotation {
    const SCALAR: ScalarKind = ScalarKind::F32;
    const COMPONENTS: usize = 6;

    fn decode(bytes: &[u8]) -> Vec<Self> {
        Vec3::decode(bytes)
            .chunks_exact(2)
            .map(|pair| EyeRotation {
                left: pair[0],
                right: pair[1],
            })
            .collect()
    }

    fn encode(values: &[Self]) -> Vec<u8> {
        let flat: Vec<Vec3> = values.iter().flat_map(|e| [e.left, e.right]).collect();
        Vec3::encode(&flat)
    }
}

/// 未校验的逐帧数组
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameArrays {
    pub root_positions: Vec<Vec3>,
    pub root_rotations: Vec<Vec3>,
    pub neck_rotations: Vec<Vec3>,
    pub jaw_rotations: Vec<Vec3>,
    pub eye_rotations: Vec<EyeRotation>,
    pub expressions: Vec<f32>,
}

/// 校验后的动画帧集合（只读，可跨线程共享）
#[derive(Clone, Debug, PartialEq)]
pub struct FlameFrames {
    frame_count: usize,
    expression_count: usize,
    euler_order: EulerOrder,
    arrays: FrameArrays,
}

impl FlameFrames {
    /// 校验所有逐帧数组长度一致，且每帧表情数量等于配置值
    pub fn new(arrays: FrameArrays, config: &RigConfig) -> Result<Self> {
        let frame_count = arrays.root_positions.len();
        if frame_count == 0 {
            return Err(FlameError::InconsistentFrameData(
                "animation contains no frames".into(),
            ));
        }

        let lengths = [
            (AnimationKey::RootRotation, arrays.root_rotations.len()),
            (AnimationKey::NeckRotation, arrays.neck_rotations.len()),
            (AnimationKey::JawRotation, arrays.jaw_rotations.len()),
            (AnimationKey::EyeRotation, arrays.eye_rotations.len()),
        ];
        for (key, len) in lengths {
            if len != frame_count {
                return Err(FlameError::InconsistentFrameData(format!(
                    "{} has {} frames, expected {}",
                    key.name(),
                    len,
                    frame_count
                )));
            }
        }

        if arrays.expressions.len() % frame_count != 0 {
            return Err(FlameError::InconsistentFrameData(format!(
                "{} expression values do not divide into {} frames",
                arrays.expressions.len(),
                frame_count
            )));
        }
        let expression_count = arrays.expressions.len() / frame_count;
        if expression_count != config.expression_count {
            return Err(FlameError::InconsistentFrameData(format!(
                "{} expressions per frame, expected {}",
                expression_count, config.expression_count
            )));
        }

        Ok(Self {
            frame_count,
            expression_count,
            euler_order: config.euler_order,
            arrays,
        })
    }

    pub fn from_json(json: &str, config: &RigConfig) -> Result<Self> {
        Self::from_document(TensorDocument::from_json(json)?, config)
    }

    pub fn from_document(document: TensorDocument, config: &RigConfig) -> Result<Self> {
        Self::from_table(&FrameTable::from_document(document)?, config)
    }

    pub fn from_table(table: &FrameTable<AnimationKey>, config: &RigConfig) -> Result<Self> {
        let arrays = FrameArrays {
            root_positions: table.tensor::<Vec3>(AnimationKey::RootPosition)?.into_data(),
            root_rotations: table.tensor::<Vec3>(AnimationKey::RootRotation)?.into_data(),
            neck_rotations: table.tensor::<Vec3>(AnimationKey::NeckRotation)?.into_data(),
            jaw_rotations: table.tensor::<Vec3>(AnimationKey::JawRotation)?.into_data(),
            eye_rotations: table.tensor::<EyeRotation>(AnimationKey::EyeRotation)?.into_data(),
            expressions: table.tensor::<f32>(AnimationKey::Expressions)?.into_data(),
        };
        let frames = Self::new(arrays, config)?;
        log::info!(
            "动画帧加载完成: {} 帧, 每帧 {} 个表情系数",
            frames.frame_count,
            frames.expression_count
        );
        Ok(frames)
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn expression_count(&self) -> usize {
        self.expression_count
    }

    pub fn euler_order(&self) -> EulerOrder {
        self.euler_order
    }

    /// 越界（包括负数）时返回 `None`
    pub fn try_get_frame(&self, index: i64) -> Option<FlameFrame<'_>> {
        usize::try_from(index).ok().and_then(|i| self.get(i))
    }

    pub fn get(&self, index: usize) -> Option<FlameFrame<'_>> {
        (index < self.frame_count).then_some(FlameFrame {
            frames: self,
            index,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = FlameFrame<'_>> {
        (0..self.frame_count).map(move |index| FlameFrame {
            frames: self,
            index,
        })
    }
}

/// 指向某一帧的借用视图，旋转在访问时才转换
#[derive(Clone, Copy, Debug)]
pub struct FlameFrame<'a> {
    frames: &'a FlameFrames,
    index: usize,
}

impl<'a> FlameFrame<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn root_position(&self) -> Vec3 {
        self.frames.arrays.root_positions[self.index]
    }

    pub fn root_rotation(&self) -> Quat {
        self.rotation(self.frames.arrays.root_rotations[self.index])
    }

    pub fn neck_rotation(&self) -> Quat {
        self.rotation(self.frames.arrays.neck_rotations[self.index])
    }

    pub fn jaw_rotation(&self) -> Quat {
        self.rotation(self.frames.arrays.jaw_rotations[self.index])
    }

    pub fn left_eye_rotation(&self) -> Quat {
        self.rotation(self.frames.arrays.eye_rotations[self.index].left)
    }

    pub fn right_eye_rotation(&self) -> Quat {
        self.rotation(self.frames.arrays.eye_rotations[self.index].right)
    }

    /// 本帧的表情系数（零拷贝）
    pub fn expressions(&self) -> &'a [f32] {
        let count = self.frames.expression_count;
        let start = self.index * count;
        &self.frames.arrays.expressions[start..start + count]
    }

    fn rotation(&self, euler: Vec3) -> Quat {
        self.frames.euler_order.to_quat(euler)
    }
}
