/*
 * @Author       : 老董
 * @Date         : 2025-03-05
 * @Description  : 分割数据集：按索引取出一个样本，并展开为其全部增强变体组成的小批次
 *
 * 单次取样的流程：
 *   索引 -> 读取图像与颜色标签 -> 缩放到标准尺寸（图像区域平均，标签最近邻）
 *   -> 颜色解码为trainId -> 通道顺序转换 -> 归一化 -> 几何增强 -> 堆叠成批次
 * 每次取样都重新读盘，不做缓存；构造后数据集不可变，可在多个线程中并发取样。
 */

use std::path::Path;

use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use super::augment::Augmentor;
use super::batch::{SegmentationBatch, assemble};
use super::class_table::ClassTable;
use super::config::SegmentationConfig;
use super::error::DataError;
use super::indexer::{DatasetIndexer, PathPairing, SamplePaths, SiblingDirPairing};
use super::transforms::{class_weights, to_channel_order};
use crate::tensor::Tensor;
use crate::vision::Vision;

/// 带增强的语义分割数据集
///
/// # 示例
/// ```ignore
/// let config = SegmentationConfig::new("data/visda", [512, 512], 19).with_seed(7);
/// let dataset = SegmentationDataset::new(config)?;
/// for i in 0..dataset.len() {
///     let batch = dataset.get_item(i)?; // images: [5, 3, 512, 512]
/// }
/// ```
#[derive(Debug)]
pub struct SegmentationDataset {
    config: SegmentationConfig,
    indexer: DatasetIndexer,
    class_table: ClassTable,
    augmentor: Augmentor,
    class_weights: Tensor,
}

impl SegmentationDataset {
    /// 使用默认的`images/` -> `annotations/`路径配对规则创建数据集
    pub fn new(config: SegmentationConfig) -> Result<Self, DataError> {
        Self::with_pairing(config, &SiblingDirPairing::default())
    }

    /// 使用自定义的路径配对规则创建数据集
    ///
    /// 所有配置错误都在这里暴露，而不是推迟到取样时。
    pub fn with_pairing(
        config: SegmentationConfig,
        pairing: &dyn PathPairing,
    ) -> Result<Self, DataError> {
        config.validate()?;

        let class_table = config.class_table()?;
        let augmentor = Augmentor::new(config.augmentation.clone(), config.image_size())?;
        let class_weights = match &config.class_weights {
            Some(weights) => class_weights(weights)?,
            None => Tensor::full(1.0, &[config.num_classes]),
        };
        let indexer =
            DatasetIndexer::new(&config.data_root, config.samples, config.seed, pairing)?;

        info!(
            "分割数据集就绪：{}个样本（共找到{}个），每个样本{}个增强变体，标准尺寸{:?}",
            indexer.len(),
            indexer.total(),
            augmentor.variant_count(),
            config.image_size
        );

        Ok(Self {
            config,
            indexer,
            class_table,
            augmentor,
            class_weights,
        })
    }

    /// 样本数量
    pub fn len(&self) -> usize {
        self.indexer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexer.is_empty()
    }

    pub fn num_classes(&self) -> usize {
        self.config.num_classes
    }

    /// 损失函数所用的类别权重，形状`[num_classes]`
    pub fn class_weights(&self) -> &Tensor {
        &self.class_weights
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// `(height, width)`
    pub fn image_size(&self) -> (usize, usize) {
        self.config.image_size()
    }

    /// 每次取样得到的批次大小
    pub fn variant_count(&self) -> usize {
        self.augmentor.variant_count()
    }

    pub fn class_table(&self) -> &ClassTable {
        &self.class_table
    }

    pub fn indexer(&self) -> &DatasetIndexer {
        &self.indexer
    }

    /// 取出第`index`个样本的全部增强变体
    ///
    /// # 返回
    /// - images: `[N, C, H, W]`
    /// - labels: `[N, H, W]`
    ///
    /// 其中`N`为启用的变体个数。
    pub fn get_item(&self, index: usize) -> Result<SegmentationBatch, DataError> {
        let (image, label) = self.load_sample(index)?;
        let mut rng = self.rng_for(index);
        let variants = self.augmentor.augment(&image, &label, &mut rng)?;
        assemble(variants)
    }

    /// 读取第`index`个样本并完成增强前的全部处理
    ///
    /// # 返回
    /// 标准尺寸、已归一化的图像`[H, W, C]`，以及解码后的类别图`[H, W]`
    pub fn load_sample(&self, index: usize) -> Result<(Tensor, Array2<u8>), DataError> {
        let SamplePaths { image, label } = self.indexer.get(index)?;
        debug!("取样 #{index}: {}", image.display());

        let raw_image = read_image(image)?;
        let raw_label = read_color_label(label)?;

        let (height, width) = self.image_size();
        let image = Vision::resize_area(&raw_image, height, width)?;
        let label = Vision::resize_color_label(&raw_label, height, width);
        let label = self.class_table.decode(label.view())?;

        let order = self.config.channel_order;
        let image = to_channel_order(&image, order)?;
        let image = self.config.normalization.normalize(&image, order)?;
        Ok((image, label))
    }

    /// 配置了种子时，同一索引总是得到同一个随机源，与取样顺序无关
    fn rng_for(&self, index: usize) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ mix(index as u64)),
            None => StdRng::from_entropy(),
        }
    }
}

/// splitmix64，使相邻索引得到差异较大的种子
fn mix(index: u64) -> u64 {
    let mut z = index.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

fn read_image(path: &Path) -> Result<Tensor, DataError> {
    if !path.exists() {
        return Err(DataError::FileNotFound(path.to_path_buf()));
    }
    Vision::load_image(path).map_err(|source| DataError::ImageError {
        path: path.to_path_buf(),
        source,
    })
}

fn read_color_label(path: &Path) -> Result<ndarray::Array3<u8>, DataError> {
    if !path.exists() {
        return Err(DataError::FileNotFound(path.to_path_buf()));
    }
    Vision::load_color_label(path).map_err(|source| DataError::ImageError {
        path: path.to_path_buf(),
        source,
    })
}
