//! 数据变换函数
//!
//! 提供均值/标准差归一化、通道顺序转换以及类别权重的计算。

use serde::{Deserialize, Serialize};

use super::error::DataError;
use crate::tensor::Tensor;
use crate::vision::Vision;

/// 图像当前的通道排列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    Rgb,
    /// 与OpenCV读图的默认顺序一致
    #[default]
    Bgr,
}

/// 逐通道的均值与标准差，始终按RGB顺序存放
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationStats {
    pub mean: Vec<f32>,
    pub stdev: Vec<f32>,
}

impl Default for NormalizationStats {
    /// ImageNet统计量（像素值0-255尺度）
    fn default() -> Self {
        Self {
            mean: vec![123.675, 116.28, 103.53],
            stdev: vec![58.395, 57.12, 57.375],
        }
    }
}

impl NormalizationStats {
    pub fn new(mean: Vec<f32>, stdev: Vec<f32>) -> Result<Self, DataError> {
        let stats = Self { mean, stdev };
        stats.validate()?;
        Ok(stats)
    }

    /// 均值与标准差长度一致、非空，且标准差均为正
    pub fn validate(&self) -> Result<(), DataError> {
        if self.mean.is_empty() || self.mean.len() != self.stdev.len() {
            return Err(DataError::Config(format!(
                "归一化均值（{}个）与标准差（{}个）的长度必须相同且不为0",
                self.mean.len(),
                self.stdev.len()
            )));
        }
        if let Some(s) = self.stdev.iter().find(|s| !(s.is_finite() && **s > 0.)) {
            return Err(DataError::Config(format!("标准差必须为正数，实际为{s}")));
        }
        Ok(())
    }

    pub fn channels(&self) -> usize {
        self.mean.len()
    }

    /// 按给定通道顺序排列的（均值, 标准差）
    pub fn ordered(&self, order: ChannelOrder) -> (Vec<f32>, Vec<f32>) {
        match order {
            ChannelOrder::Rgb => (self.mean.clone(), self.stdev.clone()),
            ChannelOrder::Bgr => (
                self.mean.iter().rev().copied().collect(),
                self.stdev.iter().rev().copied().collect(),
            ),
        }
    }

    /// 对`[H, W, C]`的图像逐通道做`(x - mean) / stdev`
    ///
    /// # 参数
    /// - `image`: 当前通道排列为`order`的图像
    /// - `order`: 决定统计量按RGB还是倒序（BGR）使用
    ///
    /// # 返回
    /// 归一化后的新张量；通道数与统计量长度不一致时返回`ChannelMismatch`
    pub fn normalize(&self, image: &Tensor, order: ChannelOrder) -> Result<Tensor, DataError> {
        let view = image.view3()?;
        let channels = view.dim().2;
        if channels != self.channels() {
            return Err(DataError::ChannelMismatch {
                expected: self.channels(),
                got: channels,
            });
        }

        let (mean, stdev) = self.ordered(order);
        let mut out = view.to_owned();
        for ((_, _, c), v) in out.indexed_iter_mut() {
            *v = (*v - mean[c]) / stdev[c];
        }
        Ok(Tensor::from_array(out))
    }
}

/// 把按RGB读入的图像转换为`order`所要求的通道排列
pub fn to_channel_order(image: &Tensor, order: ChannelOrder) -> Result<Tensor, DataError> {
    match order {
        ChannelOrder::Rgb => Ok(image.clone()),
        ChannelOrder::Bgr => Ok(Vision::reverse_channels(image)?),
    }
}

/// 由类别频率计算损失的再平衡权重
///
/// # 参数
/// - `weights`: 每个类别的原始权重（通常是出现频率），须全部为正
///
/// # 返回
/// 形状为`[num_classes]`的张量：`-ln(w)`再除以其中的最大值
///
/// # 示例
/// ```ignore
/// let w = class_weights(&[0.5, 0.25])?;
/// // -ln(0.5)=0.693, -ln(0.25)=1.386 -> [0.5, 1.0]
/// ```
pub fn class_weights(weights: &[f32]) -> Result<Tensor, DataError> {
    if weights.is_empty() {
        return Err(DataError::Config("类别权重不能为空".to_string()));
    }
    if let Some(w) = weights.iter().find(|w| !(w.is_finite() && **w > 0.)) {
        return Err(DataError::Config(format!("类别权重必须为正数，实际为{w}")));
    }

    let neg_log = weights.iter().map(|w| -w.ln()).collect::<Vec<_>>();
    let max = neg_log.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max <= 0. {
        return Err(DataError::Config(
            "类别权重取负对数后的最大值必须为正（至少要有一个权重小于1）".to_string(),
        ));
    }

    let normalized = neg_log.iter().map(|w| w / max).collect::<Vec<_>>();
    Ok(Tensor::new(&normalized, &[weights.len()]))
}
