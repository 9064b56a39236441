//! FLAME 头部模型：分阶段构建与运行时
//!
//! 构建顺序：`RawMesh`（模板 + 个性化 shape）→ `PersonalizedMesh`（叠加数据生效）
//! → `BakedMesh`（快照）→ `RiggedMesh`（骨骼、权重、姿势/表情混合形状）。

mod loader;
mod mesh;
mod pose_corrective;
mod runtime;
mod stages;

pub use loader::{build_rig, import_flame_head, load_flame_head, rig_baked_mesh};
pub use mesh::{compute_normals, MeshGeometry};
pub use pose_corrective::pose_corrective_weights;
pub use runtime::RiggedMesh;
pub use stages::{BakedMesh, PersonalizedMesh, RawMesh};
