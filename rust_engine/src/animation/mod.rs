//! 动画系统：逐帧 FLAME 参数的解码与播放

mod frames;
mod player;

pub use frames::{AnimationKey, EyeRotation, FlameFrame, FlameFrames, FrameArrays};
pub use player::FramePlayer;
