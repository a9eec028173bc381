/*
 * @Author       : 老董
 * @Date         : 2025-03-04
 * @Description  : 将同一样本的若干增强变体堆叠成一个小批次
 *
 * - 图像：每个变体`[H, W, C]` -> `[C, H, W]`，再沿新的首维堆叠为`[N, C, H, W]`（f32）；
 * - 标签：每个变体`[H, W]`堆叠为`[N, H, W]`（i64）；
 * - 批次内的顺序与增强器的产出顺序严格一致，不打乱。
 */

use ndarray::{Array3, ArrayView2, Axis};

use super::augment::{AugmentedVariant, Transform};
use super::error::DataError;
use crate::errors::TensorError;
use crate::tensor::Tensor;

/// 单个样本经增强后得到的小批次
#[derive(Debug, Clone)]
pub struct SegmentationBatch {
    /// `[N, C, H, W]`
    pub images: Tensor,
    /// `[N, H, W]`
    pub labels: Array3<i64>,
    /// 第`i`个条目所用的变换
    pub transforms: Vec<Transform>,
}

impl SegmentationBatch {
    /// 批次大小N
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }

    /// `(height, width)`
    pub fn spatial_size(&self) -> (usize, usize) {
        let (_, h, w) = self.labels.dim();
        (h, w)
    }
}

/// 把增强变体堆叠为小批次
///
/// # 返回
/// - 变体列表为空：`DataError::EmptyBatch`
/// - 任一变体的图像/标签形状与首个变体不一致：`DataError::ShapeMismatch`
pub fn assemble(variants: Vec<AugmentedVariant>) -> Result<SegmentationBatch, DataError> {
    let first = variants.first().ok_or(DataError::EmptyBatch)?;
    let image_shape = first.image.shape().to_vec();
    if image_shape.len() != 3 {
        return Err(TensorError::DimensionMismatch {
            expected: 3,
            got: image_shape.len(),
        }
        .into());
    }
    let (h, w) = (image_shape[0], image_shape[1]);

    for variant in &variants {
        if variant.image.shape() != image_shape.as_slice() {
            return Err(DataError::ShapeMismatch {
                expected: image_shape.clone(),
                got: variant.image.shape().to_vec(),
            });
        }
        if variant.label.dim() != (h, w) {
            return Err(DataError::ShapeMismatch {
                expected: vec![h, w],
                got: variant.label.shape().to_vec(),
            });
        }
    }

    let chw = variants
        .iter()
        .map(|v| v.image.permute(&[2, 0, 1]))
        .collect::<Vec<_>>();
    let images = Tensor::stack(&chw.iter().collect::<Vec<_>>());

    let label_views = variants
        .iter()
        .map(|v| v.label.view())
        .collect::<Vec<ArrayView2<u8>>>();
    let labels = ndarray::stack(Axis(0), &label_views)
        .map_err(|_| DataError::ShapeMismatch {
            expected: vec![h, w],
            got: vec![],
        })?
        .mapv(i64::from);

    let transforms = variants.iter().map(|v| v.transform).collect();

    Ok(SegmentationBatch {
        images,
        labels,
        transforms,
    })
}
