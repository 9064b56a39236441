//! 骨骼系统：运动学树、关节回归和绑定姿势

mod bone;
mod manager;
mod regressor;
mod tree;

pub use bone::Bone;
pub use manager::BoneManager;
pub use regressor::regress_joints;
pub use tree::KinematicTree;
