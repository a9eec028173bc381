/*
 * @Author       : 老董
 * @Date         : 2025-03-06
 * @Description  : 检查分割数据集配置：打印样本数、类别、类别权重以及前几个样本的批次形状
 */

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::info;

use only_seg::data::{SegmentationConfig, SegmentationDataset};
use only_seg::utils::logger::init_logging;

#[derive(Parser, Debug)]
#[command(name = "seg_inspect", about = "检查分割数据集配置与增强后的批次形状")]
struct Args {
    /// JSON配置文件
    #[arg(long)]
    config: PathBuf,
    /// 覆盖配置中的数据根目录
    #[arg(long)]
    data_root: Option<PathBuf>,
    /// 覆盖子采样个数
    #[arg(long)]
    samples: Option<usize>,
    /// 覆盖随机种子
    #[arg(long)]
    seed: Option<u64>,
    /// 实际取样检查的样本个数
    #[arg(long, default_value_t = 1)]
    limit: usize,
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    let mut config = SegmentationConfig::from_json_file(&args.config)
        .with_context(|| format!("读取配置 {} 失败", args.config.display()))?;
    if let Some(root) = args.data_root {
        config = config.with_data_root(root);
    }
    if let Some(samples) = args.samples {
        config = config.with_samples(samples);
    }
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let dataset = SegmentationDataset::new(config).context("构建数据集失败")?;
    if dataset.is_empty() {
        bail!(
            "{}/images 下没有找到任何png图像",
            dataset.config().data_root.display()
        );
    }

    let (height, width) = dataset.image_size();
    println!("样本数: {}", dataset.len());
    println!("标准尺寸: {height}x{width}");
    println!(
        "类别数: {}（颜色表中{}个训练类别）",
        dataset.num_classes(),
        dataset.class_table().num_train_classes()
    );
    println!("类别权重: {:?}", dataset.class_weights().to_vec());
    println!("每个样本的增强变体: {:?}", dataset.config().augmentation.plan());

    for index in 0..args.limit.min(dataset.len()) {
        let batch = dataset
            .get_item(index)
            .with_context(|| format!("读取第{index}个样本失败"))?;
        info!("样本#{index}: {}", dataset.indexer().get(index)?.image.display());
        println!(
            "#{index}: images {:?}, labels {:?}",
            batch.images.shape(),
            batch.labels.shape()
        );
    }
    Ok(())
}
