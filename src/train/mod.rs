/*
 * @Author       : 老董
 * @Date         : 2025-03-06
 * @Description  : 训练循环
 *
 * 网络结构、损失函数与检查点格式都不在本模块内，而是通过两个trait接入：
 * - [`SegmentationModel`]: 一次优化步、优化器重建、检查点保存；
 * - [`SampleSource`]: 按索引取出增强小批次（[`SegmentationDataset`]即是其实现）。
 *
 * [`SegmentationDataset`]: crate::data::SegmentationDataset
 */

mod error;
mod trainer;

#[cfg(test)]
mod tests;

use std::path::Path;

use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::data::{DataError, SegmentationBatch, SegmentationDataset};
use crate::tensor::Tensor;

pub use error::TrainError;
pub use trainer::{EpochSummary, TrainReport, Trainer, TrainerConfig};

/// 带动量与权重衰减的SGD超参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub learning_rate: f32,
    pub momentum: f32,
    pub weight_decay: f32,
}

/// 可被[`Trainer`]驱动的分割模型
pub trait SegmentationModel {
    /// （重新）创建优化器
    ///
    /// 学习率衰减时会以新的学习率再次调用，动量等累积状态随之清空。
    fn configure_optimizer(&mut self, optimizer: &OptimizerConfig) -> Result<(), TrainError>;

    /// 在一个小批次上完成前向、带权交叉熵、反向与参数更新
    ///
    /// # 参数
    /// - `images`: `[N, C, H, W]`
    /// - `labels`: `[N, H, W]`的trainId
    /// - `class_weights`: `[num_classes]`
    ///
    /// # 返回
    /// 本步的损失值
    fn train_step(
        &mut self,
        images: &Tensor,
        labels: &Array3<i64>,
        class_weights: &Tensor,
    ) -> Result<f32, TrainError>;

    fn save_checkpoint(&self, path: &Path) -> Result<(), TrainError>;
}

/// 训练数据来源
pub trait SampleSource {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_item(&self, index: usize) -> Result<SegmentationBatch, DataError>;

    fn num_classes(&self) -> usize;

    fn class_weights(&self) -> Tensor;
}

impl SampleSource for SegmentationDataset {
    fn len(&self) -> usize {
        SegmentationDataset::len(self)
    }

    fn get_item(&self, index: usize) -> Result<SegmentationBatch, DataError> {
        SegmentationDataset::get_item(self, index)
    }

    fn num_classes(&self) -> usize {
        SegmentationDataset::num_classes(self)
    }

    fn class_weights(&self) -> Tensor {
        SegmentationDataset::class_weights(self).clone()
    }
}
