//! 张量元素类型

use byteorder::{ByteOrder, NativeEndian};
use glam::Vec3;

/// 标量类型
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScalarKind {
    F32,
    U32,
    I32,
}

impl ScalarKind {
    /// 字节大小
    pub const fn size(self) -> usize {
        4
    }

    /// 解析记录中的 `type` 标签，未知标签返回 None
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_ascii_lowercase().as_str() {
            "float32" | "float" | "f32" | "single" | "<f4" => Some(Self::F32),
            "uint32" | "uint" | "u32" | "<u4" => Some(Self::U32),
            "int32" | "int" | "i32" | "<i4" => Some(Self::I32),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::F32 => "float32",
            Self::U32 => "uint32",
            Self::I32 => "int32",
        }
    }
}

/// 可从平铺字节重解释的元素
///
/// 多分量元素（如 `Vec3`）占据张量形状的末尾维度，解码时这些维度会被折叠。
pub trait Element: Copy + Sized {
    const SCALAR: ScalarKind;
    const COMPONENTS: usize;
    const SIZE: usize = Self::SCALAR.size() * Self::COMPONENTS;

    /// `bytes.len()` 必须是 `SIZE` 的整数倍
    fn decode(bytes: &[u8]) -> Vec<Self>;

    fn encode(values: &[Self]) -> Vec<u8>;
}

impl Element for f32 {
    const SCALAR: ScalarKind = ScalarKind::F32;
    const COMPONENTS: usize = 1;

    fn decode(bytes: &[u8]) -> Vec<Self> {
        let mut out = vec![0.0f32; bytes.len() / 4];
        NativeEndian::read_f32_into(bytes, &mut out);
        out
    }

    fn encode(values: &[Self]) -> Vec<u8> {
        let mut out = vec![0u8; values.len() * 4];
        NativeEndian::write_f32_into(values, &mut out);
        out
    }
}

impl Element for u32 {
    const SCALAR: ScalarKind = ScalarKind::U32;
    const COMPONENTS: usize = 1;

    fn decode(bytes: &[u8]) -> Vec<Self> {
        let mut out = vec![0u32; bytes.len() / 4];
        NativeEndian::read_u32_into(bytes, &mut out);
        out
    }

    fn encode(values: &[Self]) -> Vec<u8> {
        let mut out = vec![0u8; values.len() * 4];
        NativeEndian::write_u32_into(values, &mut out);
        out
    }
}

impl Element for i32 {
    const SCALAR: ScalarKind = ScalarKind::I32;
    const COMPONENTS: usize = 1;

    fn decode(bytes: &[u8]) -> Vec<Self> {
        let mut out = vec![0i32; bytes.len() / 4];
        NativeEndian::read_i32_into(bytes, &mut out);
        out
    }

    fn encode(values: &[Self]) -> Vec<u8> {
        let mut out = vec![0u8; values.len() * 4];
        NativeEndian::write_i32_into(values, &mut out);
        out
    }
}

impl Element for Vec3 {
    const SCALAR: ScalarKind = ScalarKind::F32;
    const COMPONENTS: usize = 3;

    fn decode(bytes: &[u8]) -> Vec<Self> {
        f32::decode(bytes)
            .chunks_exact(3)
            .map(Vec3::from_slice)
            .collect()
    }

    fn encode(values: &[Self]) -> Vec<u8> {
        let flat: Vec<f32> = values.iter().flat_map(|v| v.to_array()).collect();
        f32::encode(&flat)
    }
}
