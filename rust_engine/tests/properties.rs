//! 基于 proptest 的性质测试：解码、回归、权重选择、运动学树
//!
//! ```bash
//! cargo test -p flame-engine --test properties
//! ```

use proptest::prelude::*;

use flame_engine::skeleton::{regress_joints, KinematicTree};
use flame_engine::skinning::select_bone_weights;
use flame_engine::tensor::{Tensor, TensorRecord};
use flame_engine::FlameError;
use glam::Vec3;

// ============================================================================
// 策略
// ============================================================================

/// 随机矩阵：(行数, 列数, 数据)
fn matrix(max_rows: usize, max_cols: usize) -> impl Strategy<Value = (usize, usize, Vec<f32>)> {
    (1..=max_rows, 1..=max_cols).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(-10.0f32..10.0, rows * cols).prop_map(move |data| (rows, cols, data))
    })
}

fn vertices(count: usize) -> impl Strategy<Value = Vec<Vec3>> {
    prop::collection::vec(
        (-5.0f32..5.0, -5.0f32..5.0, -5.0f32..5.0).prop_map(|(x, y, z)| Vec3::new(x, y, z)),
        count,
    )
}

/// 随机树：关节 i 的父节点在 [0, i) 中，关节 0 为根
fn parent_table(max_joints: usize) -> impl Strategy<Value = Vec<i32>> {
    (1..=max_joints).prop_flat_map(|count| {
        (1..count)
            .map(|i| (0..i as i32).boxed())
            .collect::<Vec<_>>()
            .prop_map(|parents| {
                let mut table = vec![-1];
                table.extend(parents);
                table
            })
    })
}

// ============================================================================
// 1. 张量编码/解码
// ============================================================================

proptest! {
    /// 解码(编码(t)) 逐位相等，包括 NaN 之类的特殊值
    #[test]
    fn tensor_roundtrip_is_bit_exact(bits in prop::collection::vec(any::<u32>(), 0..64)) {
        let values: Vec<f32> = bits.iter().map(|b| f32::from_bits(*b)).collect();
        let tensor = Tensor::from_vec(values);
        let decoded = TensorRecord::encode("t", &tensor).decode::<f32>().unwrap();

        prop_assert_eq!(decoded.shape(), tensor.shape());
        let decoded_bits: Vec<u32> = decoded.data().iter().map(|v| v.to_bits()).collect();
        prop_assert_eq!(decoded_bits, bits);
    }

    /// 形状乘积与元素数量不一致时解码失败
    #[test]
    fn shape_product_mismatch_fails(len in 1usize..32, extra in 1usize..4) {
        let tensor = Tensor::from_vec(vec![0.0f32; len]);
        let mut record = TensorRecord::encode("t", &tensor);
        record.shape = vec![len + extra];
        prop_assert!(matches!(record.decode::<f32>(), Err(FlameError::Decode(_))));
    }
}

// ============================================================================
// 2. 关节回归线性
// ============================================================================

proptest! {
    /// 顶点缩放 s 倍，关节也缩放 s 倍
    #[test]
    fn regression_scales_linearly(
        (joints, count, data) in matrix(4, 8),
        scale in -3.0f32..3.0,
        seed in vertices(8),
    ) {
        let regressor = Tensor::new(vec![joints, count], data).unwrap();
        let verts = &seed[..count];
        let scaled: Vec<Vec3> = verts.iter().map(|v| *v * scale).collect();

        let base = regress_joints(&regressor, verts).unwrap();
        let result = regress_joints(&regressor, &scaled).unwrap();
        for (a, b) in base.iter().zip(&result) {
            prop_assert!((*a * scale - *b).length() < 1e-2);
        }
    }

    /// 每行权重和为 1 时，平移顶点等于平移关节
    #[test]
    fn regression_preserves_translation(
        (joints, count, data) in matrix(4, 8),
        offset in vertices(1),
        seed in vertices(8),
    ) {
        // 行归一化（绝对值避免和为零）
        let mut data: Vec<f32> = data.iter().map(|w| w.abs() + 0.01).collect();
        for row in data.chunks_mut(count) {
            let sum: f32 = row.iter().sum();
            row.iter_mut().for_each(|w| *w /= sum);
        }
        let regressor = Tensor::new(vec![joints, count], data).unwrap();
        let verts = &seed[..count];
        let moved: Vec<Vec3> = verts.iter().map(|v| *v + offset[0]).collect();

        let base = regress_joints(&regressor, verts).unwrap();
        let result = regress_joints(&regressor, &moved).unwrap();
        for (a, b) in base.iter().zip(&result) {
            prop_assert!((*a + offset[0] - *b).length() < 1e-3);
        }
    }
}

// ============================================================================
// 3. 影响骨骼选择
// ============================================================================

proptest! {
    /// 选出的权重是最大的 K 个，降序；同值时索引升序
    #[test]
    fn top_k_is_sorted_prefix(
        (rows, cols, data) in matrix(6, 10),
        k in 4usize..=5,
    ) {
        let weights = Tensor::new(vec![rows, cols], data.clone()).unwrap();
        let result = select_bone_weights(&weights, rows, k);
        if cols < k {
            prop_assert!(matches!(result, Err(FlameError::ShapeMismatch(_))));
            return Ok(());
        }
        let selected = result.unwrap();

        for (v, row) in data.chunks(cols).enumerate() {
            let mut expected: Vec<(usize, f32)> = row.iter().copied().enumerate().collect();
            expected.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap().then(a.0.cmp(&b.0)));
            expected.truncate(k);

            let actual: Vec<(usize, f32)> = selected
                .vertex(v)
                .iter()
                .map(|i| (i.bone_index as usize, i.weight))
                .collect();
            prop_assert_eq!(actual, expected);
        }
    }
}

// ============================================================================
// 4. 运动学树
// ============================================================================

proptest! {
    /// 单一根的随机树总能构建，且遍历顺序中父节点在子节点之前
    #[test]
    fn random_tree_is_valid(parents in parent_table(12)) {
        let tree = KinematicTree::from_parents(&parents).unwrap();
        prop_assert_eq!(tree.root(), 0);
        prop_assert_eq!(tree.len(), parents.len());

        let order = tree.sorted_indices();
        let position = |i: usize| order.iter().position(|&x| x == i).unwrap();
        for i in 1..parents.len() {
            let parent = tree.parent(i).unwrap();
            prop_assert!(position(parent) < position(i));
        }
    }

    /// 再多一个越界项就有两个根
    #[test]
    fn second_root_is_rejected(parents in parent_table(12), pick in any::<prop::sample::Index>(), big in 12i32..1000) {
        prop_assume!(parents.len() > 1);
        let mut parents = parents;
        let i = 1 + pick.index(parents.len() - 1);
        parents[i] = big;
        prop_assert!(matches!(
            KinematicTree::from_parents(&parents),
            Err(FlameError::InvalidTopology(_))
        ));
    }
}
