//! Morph 变形系统（混合形状）

mod builder;
mod manager;
mod morph;

pub use builder::build_blend_shapes;
pub use manager::MorphManager;
pub use morph::Morph;
