/*
 * @Author       : 老董
 * @Date         : 2025-03-05
 * @Description  : 分割数据集的配置：从JSON读取，构造数据集时统一校验，之后不可变
 */

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::augment::AugmentConfig;
use super::class_table::{ClassEntry, ClassTable};
use super::error::DataError;
use super::transforms::{ChannelOrder, NormalizationStats, class_weights};

/// 分割数据集配置
///
/// # 示例
/// ```ignore
/// let config = SegmentationConfig::from_json_file("visda.json")?
///     .with_samples(100)
///     .with_seed(42);
/// let dataset = SegmentationDataset::new(config)?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// 数据根目录，其下须有`images/`与`annotations/`
    pub data_root: PathBuf,
    /// 标准尺寸`[height, width]`
    pub image_size: [usize; 2],
    pub num_classes: usize,
    /// 颜色表，缺省时使用内置的Cityscapes调色板
    #[serde(default)]
    pub classes: Option<Vec<ClassEntry>>,
    /// 额外需要忽略（解码为背景）的trainId
    #[serde(default)]
    pub ignore_train_ids: Vec<i32>,
    #[serde(default)]
    pub normalization: NormalizationStats,
    #[serde(default)]
    pub channel_order: ChannelOrder,
    /// 各类别的原始权重（频率），缺省时全部为1.0（不做再平衡）
    #[serde(default)]
    pub class_weights: Option<Vec<f32>>,
    /// 子采样个数
    #[serde(default)]
    pub samples: Option<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub augmentation: AugmentConfig,
}

impl SegmentationConfig {
    /// 以默认值创建配置
    pub fn new(data_root: impl Into<PathBuf>, image_size: [usize; 2], num_classes: usize) -> Self {
        Self {
            data_root: data_root.into(),
            image_size,
            num_classes,
            classes: None,
            ignore_train_ids: Vec::new(),
            normalization: NormalizationStats::default(),
            channel_order: ChannelOrder::default(),
            class_weights: None,
            samples: None,
            seed: None,
            augmentation: AugmentConfig::default(),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(DataError::FileNotFound(path.to_path_buf()));
        }
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn with_data_root(mut self, data_root: impl Into<PathBuf>) -> Self {
        self.data_root = data_root.into();
        self
    }

    pub fn with_samples(mut self, samples: usize) -> Self {
        self.samples = Some(samples);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_augmentation(mut self, augmentation: AugmentConfig) -> Self {
        self.augmentation = augmentation;
        self
    }

    pub fn with_classes(mut self, classes: Vec<ClassEntry>) -> Self {
        self.classes = Some(classes);
        self
    }

    pub fn with_normalization(mut self, normalization: NormalizationStats) -> Self {
        self.normalization = normalization;
        self
    }

    pub fn with_channel_order(mut self, channel_order: ChannelOrder) -> Self {
        self.channel_order = channel_order;
        self
    }

    pub fn with_class_weights(mut self, class_weights: Vec<f32>) -> Self {
        self.class_weights = Some(class_weights);
        self
    }

    /// `(height, width)`
    pub fn image_size(&self) -> (usize, usize) {
        (self.image_size[0], self.image_size[1])
    }

    /// 按配置构建颜色表（含额外忽略的trainId）
    pub fn class_table(&self) -> Result<ClassTable, DataError> {
        let table = match &self.classes {
            Some(entries) => ClassTable::new(entries.clone())?,
            None => ClassTable::cityscapes(),
        };
        if self.ignore_train_ids.is_empty() {
            Ok(table)
        } else {
            table.with_ignored_train_ids(&self.ignore_train_ids)
        }
    }

    /// 检查配置自身是否一致（不访问文件系统）
    pub fn validate(&self) -> Result<(), DataError> {
        let (height, width) = self.image_size();
        if height == 0 || width == 0 {
            return Err(DataError::Config(format!(
                "标准尺寸必须大于0，实际为{height}x{width}"
            )));
        }
        if self.num_classes == 0 {
            return Err(DataError::Config("类别数必须大于0".to_string()));
        }

        let table = self.class_table()?;
        if let Some(max_id) = table.max_train_id() {
            if usize::from(max_id) >= self.num_classes {
                return Err(DataError::Config(format!(
                    "颜色表中的trainId {max_id}超出了类别数{}",
                    self.num_classes
                )));
            }
        }

        self.normalization.validate()?;
        if self.normalization.channels() != 3 {
            return Err(DataError::ChannelMismatch {
                expected: 3,
                got: self.normalization.channels(),
            });
        }

        if let Some(weights) = &self.class_weights {
            if weights.len() != self.num_classes {
                return Err(DataError::Config(format!(
                    "类别权重个数{}与类别数{}不一致",
                    weights.len(),
                    self.num_classes
                )));
            }
            class_weights(weights)?;
        }

        self.augmentation.validate(height, width)
    }
}
