use super::Tensor;
use crate::errors::TensorError;
use std::collections::HashSet;

impl Tensor {
    /// 将多个形状相同的张量沿着新增的首个维度堆叠起来，返回一个新的张量。
    /// * `tensors` - 一个包含多个张量的数组的引用。
    ///
    /// 如3个形状为`[C, H, W]`的张量堆叠后为`[3, C, H, W]`。
    /// 列表为空或形状不一致时panic。
    pub fn stack(tensors: &[&Self]) -> Self {
        assert!(!tensors.is_empty(), "{}", TensorError::EmptyList);

        let first_shape = tensors[0].shape();
        assert!(
            tensors.iter().all(|t| t.shape() == first_shape),
            "{}",
            TensorError::InconsitentShape
        );

        let data = tensors
            .iter()
            .flat_map(|t| t.data.iter())
            .copied()
            .collect::<Vec<_>>();

        let mut shape = first_shape.to_vec();
        shape.insert(0, tensors.len());

        Self::new(&data, &shape)
    }

    /// 交换张量的两个（以上）维度，并将其返回（不影响原张量）
    /// 返回的张量在内存中是标准的行优先布局。
    pub fn permute(&self, axes: &[usize]) -> Self {
        assert!(axes.len() >= 2, "{}", TensorError::PermuteNeedAtLeast2Dims);
        // 检查axes中的所有元素必须是唯一且在[0, <张量维数>)范围内
        let unique_axes = axes.iter().copied().collect::<HashSet<_>>();
        assert!(
            unique_axes.len() == axes.len()
                && unique_axes.iter().all(|&a| a < self.dimension())
                && axes.len() == self.dimension(),
            "{}",
            TensorError::PermuteNeedUniqueAndInRange
        );

        let permuted = self.data.view().permuted_axes(axes);
        Self {
            data: permuted.as_standard_layout().into_owned(),
        }
    }
}
