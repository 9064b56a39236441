//! 帧播放器

use std::sync::Arc;

use super::FlameFrames;
use crate::config::RigConfig;
use crate::model::RiggedMesh;

/// 把指定帧写入绑定网格
pub struct FramePlayer {
    /// 帧数据（可在多个播放器间共享）
    frames: Arc<FlameFrames>,
    /// 当前播放帧
    current_frame: usize,
}

impl FramePlayer {
    pub fn new(frames: Arc<FlameFrames>) -> Self {
        Self {
            frames,
            current_frame: 0,
        }
    }

    pub fn frames(&self) -> &Arc<FlameFrames> {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.frame_count()
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// 跳转到指定帧，超出范围时限制在 `[0, frame_count - 1]`
    pub fn set_current_frame(&mut self, index: i64) {
        let last = self.frames.frame_count().saturating_sub(1);
        self.current_frame = usize::try_from(index.max(0)).unwrap_or(0).min(last);
    }

    /// 前进一帧，到达末尾后停在最后一帧；返回是否移动
    pub fn advance(&mut self) -> bool {
        if self.current_frame + 1 < self.frames.frame_count() {
            self.current_frame += 1;
            true
        } else {
            false
        }
    }

    /// 写入当前帧：表情权重、根骨骼平移/旋转、颈/下颌/双眼旋转，然后刷新姿势矫正
    pub fn apply(&self, rig: &mut RiggedMesh, config: &RigConfig) -> bool {
        let Some(frame) = self.frames.get(self.current_frame) else {
            return false;
        };

        let start = config.expression_start();
        let expressions = frame.expressions();
        let writable = expressions.len().min(rig.expression_shape_count());
        for (i, &value) in expressions[..writable].iter().enumerate() {
            rig.set_blend_shape_weight(start + i, value);
        }

        let slots = config.bone_slots;
        rig.set_bone_translation(slots.root, frame.root_position());
        rig.set_bone_rotation(slots.root, frame.root_rotation());
        rig.set_bone_rotation(slots.neck, frame.neck_rotation());
        rig.set_bone_rotation(slots.jaw, frame.jaw_rotation());
        rig.set_bone_rotation(slots.left_eye, frame.left_eye_rotation());
        rig.set_bone_rotation(slots.right_eye, frame.right_eye_rotation());

        rig.apply_pose_correctives(config.pose_correctives_enabled);
        true
    }

    /// 所有混合形状权重归零，骨骼回到绑定姿势
    pub fn reset(&mut self, rig: &mut RiggedMesh) {
        self.current_frame = 0;
        rig.reset_pose();
    }
}
