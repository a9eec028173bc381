/*
 * @Author       : 老董
 * @Date         : 2025-03-06
 * @Description  : 按轮次驱动训练：逐样本优化、周期性学习率衰减与检查点保存
 */

use std::fs;
use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{OptimizerConfig, SampleSource, SegmentationModel, TrainError};

/// 检查点文件名模板中代表轮次的占位符
const EPOCH_PLACEHOLDER: &str = "{epoch}";

/// 训练配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub epochs: usize,
    pub learning_rate: f32,
    pub momentum: f32,
    pub weight_decay: f32,
    /// 每隔多少轮衰减一次学习率并保存检查点，0表示从不
    pub lr_decay_every: usize,
    /// 衰减时学习率除以该值
    pub lr_decay_factor: f32,
    pub checkpoint_dir: PathBuf,
    /// 含`{epoch}`占位符的文件名
    pub checkpoint_template: String,
    pub final_checkpoint: String,
    pub shuffle: bool,
    pub seed: Option<u64>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            epochs: 25,
            learning_rate: 1e-4,
            momentum: 0.9,
            weight_decay: 2e-5,
            lr_decay_every: 25,
            lr_decay_factor: 5.0,
            checkpoint_dir: PathBuf::from("saves"),
            checkpoint_template: "gcn-{epoch}.pth".to_string(),
            final_checkpoint: "gcn-final.pth".to_string(),
            shuffle: false,
            seed: None,
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<(), TrainError> {
        if self.epochs == 0 {
            return Err(TrainError::Config("训练轮数必须大于0".to_string()));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.) {
            return Err(TrainError::Config(format!(
                "学习率必须为正数，实际为{}",
                self.learning_rate
            )));
        }
        if !(self.lr_decay_factor.is_finite() && self.lr_decay_factor > 0.) {
            return Err(TrainError::Config(format!(
                "学习率衰减系数必须为正数，实际为{}",
                self.lr_decay_factor
            )));
        }
        if !self.checkpoint_template.contains(EPOCH_PLACEHOLDER) {
            return Err(TrainError::Config(format!(
                "检查点模板`{}`中缺少`{EPOCH_PLACEHOLDER}`",
                self.checkpoint_template
            )));
        }
        if self.final_checkpoint.is_empty() {
            return Err(TrainError::Config("最终检查点文件名不能为空".to_string()));
        }
        Ok(())
    }

    fn optimizer(&self, learning_rate: f32) -> OptimizerConfig {
        OptimizerConfig {
            learning_rate,
            momentum: self.momentum,
            weight_decay: self.weight_decay,
        }
    }
}

/// 单轮训练的统计
#[derive(Debug, Clone, PartialEq)]
pub struct EpochSummary {
    /// 从1开始
    pub epoch: usize,
    pub steps: usize,
    pub mean_loss: f32,
    /// 本轮使用的学习率
    pub learning_rate: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport {
    pub epochs: Vec<EpochSummary>,
    /// 周期性保存的检查点，按保存顺序
    pub checkpoints: Vec<PathBuf>,
    pub final_checkpoint: PathBuf,
}

/// 训练驱动器
///
/// # 示例
/// ```ignore
/// let trainer = Trainer::new(TrainerConfig::default())?;
/// let report = trainer.fit(&mut model, &dataset)?;
/// println!("最终检查点: {}", report.final_checkpoint.display());
/// ```
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    pub fn new(config: TrainerConfig) -> Result<Self, TrainError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// 第`epoch`轮结束后保存的检查点路径
    pub fn checkpoint_path(&self, epoch: usize) -> PathBuf {
        self.config.checkpoint_dir.join(
            self.config
                .checkpoint_template
                .replace(EPOCH_PLACEHOLDER, &epoch.to_string()),
        )
    }

    pub fn final_checkpoint_path(&self) -> PathBuf {
        self.config.checkpoint_dir.join(&self.config.final_checkpoint)
    }

    /// 完整地训练`epochs`轮
    ///
    /// 任一样本取样失败都会立即中止训练并返回该错误（不重试、不跳过）。
    pub fn fit<M, S>(&self, model: &mut M, source: &S) -> Result<TrainReport, TrainError>
    where
        M: SegmentationModel + ?Sized,
        S: SampleSource + ?Sized,
    {
        if source.is_empty() {
            return Err(TrainError::Config("数据集为空，无法训练".to_string()));
        }
        let class_weights = source.class_weights();
        if class_weights.shape() != [source.num_classes()].as_slice() {
            return Err(TrainError::Config(format!(
                "类别权重的形状{:?}与类别数{}不一致",
                class_weights.shape(),
                source.num_classes()
            )));
        }

        let mut learning_rate = self.config.learning_rate;
        model.configure_optimizer(&self.config.optimizer(learning_rate))?;
        let mut rng = match self.config.seed {
            Some(seed) => rand::rngs::StdRng::seed_from_u64(seed),
            None => rand::rngs::StdRng::from_entropy(),
        };

        info!(
            "开始训练：{}轮，每轮{}个样本，初始学习率{}",
            self.config.epochs,
            source.len(),
            learning_rate
        );

        let mut epochs = Vec::with_capacity(self.config.epochs);
        let mut checkpoints = Vec::new();
        for epoch in 1..=self.config.epochs {
            let mut order = (0..source.len()).collect::<Vec<_>>();
            if self.config.shuffle {
                order.shuffle(&mut rng);
            }

            let mut total_loss = 0f64;
            for &index in &order {
                let batch = source.get_item(index)?;
                let loss = model.train_step(&batch.images, &batch.labels, &class_weights)?;
                debug!("第{epoch}轮 样本#{index}: loss = {loss}");
                total_loss += f64::from(loss);
            }
            let mean_loss = (total_loss / order.len() as f64) as f32;
            info!("Epoch {epoch} completed. mean loss = {mean_loss:.6}");
            epochs.push(EpochSummary {
                epoch,
                steps: order.len(),
                mean_loss,
                learning_rate,
            });

            if self.config.lr_decay_every > 0 && epoch % self.config.lr_decay_every == 0 {
                learning_rate /= self.config.lr_decay_factor;
                model.configure_optimizer(&self.config.optimizer(learning_rate))?;
                let path = self.checkpoint_path(epoch);
                self.save(model, &path)?;
                info!("学习率衰减为{learning_rate}，已保存检查点{}", path.display());
                checkpoints.push(path);
            }
        }

        let final_checkpoint = self.final_checkpoint_path();
        self.save(model, &final_checkpoint)?;
        info!("训练完成，最终检查点{}", final_checkpoint.display());

        Ok(TrainReport {
            epochs,
            checkpoints,
            final_checkpoint,
        })
    }

    fn save<M: SegmentationModel + ?Sized>(&self, model: &M, path: &Path) -> Result<(), TrainError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| TrainError::Checkpoint {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        }
        model.save_checkpoint(path)
    }
}
