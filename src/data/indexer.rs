/*
 * @Author       : 老董
 * @Date         : 2025-03-03
 * @Description  : 数据集索引：枚举`<root>/images`下的png图像，配对标签路径，可选地做可复现的无放回子采样
 */

use std::fmt;
use std::path::{Component, Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use tracing::debug;

use super::error::DataError;

/// 图像目录名
pub const IMAGE_DIR: &str = "images";
/// 标签目录名
pub const LABEL_DIR: &str = "annotations";

/// 由图像路径推出对应标签路径的规则
///
/// 任何`Fn(&Path) -> PathBuf`闭包也可以直接当作配对规则使用（方便测试时注入）。
pub trait PathPairing: Send + Sync {
    fn label_path(&self, image_path: &Path) -> Result<PathBuf, DataError>;
}

impl<F> PathPairing for F
where
    F: Fn(&Path) -> PathBuf + Send + Sync,
{
    fn label_path(&self, image_path: &Path) -> Result<PathBuf, DataError> {
        Ok(self(image_path))
    }
}

/// 默认配对规则：把路径中最后一个名为`image_dir`的目录替换为`label_dir`，文件名不变
///
/// 如`/data/images/0001.png` -> `/data/annotations/0001.png`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingDirPairing {
    pub image_dir: String,
    pub label_dir: String,
}

impl Default for SiblingDirPairing {
    fn default() -> Self {
        Self {
            image_dir: IMAGE_DIR.to_string(),
            label_dir: LABEL_DIR.to_string(),
        }
    }
}

impl PathPairing for SiblingDirPairing {
    fn label_path(&self, image_path: &Path) -> Result<PathBuf, DataError> {
        let components = image_path.components().collect::<Vec<_>>();
        // 文件名本身不参与替换
        let dir_count = components.len().saturating_sub(1);
        let position = components[..dir_count]
            .iter()
            .rposition(|c| matches!(c, Component::Normal(name) if *name == self.image_dir.as_str()))
            .ok_or_else(|| {
                DataError::Config(format!(
                    "图像路径{}中没有名为`{}`的目录，无法推出标签路径",
                    image_path.display(),
                    self.image_dir
                ))
            })?;

        let mut label_path = PathBuf::new();
        for (i, component) in components.iter().enumerate() {
            if i == position {
                label_path.push(&self.label_dir);
            } else {
                label_path.push(component.as_os_str());
            }
        }
        Ok(label_path)
    }
}

/// 一个样本的（图像, 标签）路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePaths {
    pub image: PathBuf,
    pub label: PathBuf,
}

/// 数据集索引，构造后不可变
#[derive(Clone)]
pub struct DatasetIndexer {
    samples: Vec<SamplePaths>,
    /// 第`i`个样本在完整（排序后的）枚举结果中的位置
    indices: Vec<usize>,
    total: usize,
}

impl fmt::Debug for DatasetIndexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetIndexer")
            .field("len", &self.samples.len())
            .field("total", &self.total)
            .finish()
    }
}

impl DatasetIndexer {
    /// 枚举`data_root/images/*.png`并建立索引
    ///
    /// # 参数
    /// - `data_root`: 数据根目录
    /// - `samples`: 可选的子采样个数，超过可用样本数时返回`SampleCountExceeded`
    /// - `seed`: 子采样的随机种子，None则每次不同
    /// - `pairing`: 标签路径的配对规则
    pub fn new(
        data_root: &Path,
        samples: Option<usize>,
        seed: Option<u64>,
        pairing: &dyn PathPairing,
    ) -> Result<Self, DataError> {
        let image_paths = enumerate_images(data_root)?;
        debug!(
            "在{}下找到{}张图像",
            data_root.join(IMAGE_DIR).display(),
            image_paths.len()
        );
        Self::from_image_paths(image_paths, samples, seed, pairing)
    }

    /// 由已知的图像路径列表建立索引（路径会先排序，保证结果与枚举顺序无关）
    pub fn from_image_paths(
        mut image_paths: Vec<PathBuf>,
        samples: Option<usize>,
        seed: Option<u64>,
        pairing: &dyn PathPairing,
    ) -> Result<Self, DataError> {
        image_paths.sort();
        let total = image_paths.len();

        let indices = match samples {
            None => (0..total).collect::<Vec<_>>(),
            Some(requested) if requested > total => {
                return Err(DataError::SampleCountExceeded {
                    requested,
                    available: total,
                });
            }
            Some(requested) => match seed {
                Some(seed) => index::sample(&mut StdRng::seed_from_u64(seed), total, requested),
                None => index::sample(&mut rand::thread_rng(), total, requested),
            }
            .into_vec(),
        };

        let samples = indices
            .iter()
            .map(|&i| {
                let image = image_paths[i].clone();
                let label = pairing.label_path(&image)?;
                Ok(SamplePaths { image, label })
            })
            .collect::<Result<Vec<_>, DataError>>()?;

        Ok(Self {
            samples,
            indices,
            total,
        })
    }

    /// 样本数量
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 子采样前找到的样本总数
    pub fn total(&self) -> usize {
        self.total
    }

    /// 各样本在完整枚举结果中的位置（互不相同）
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// 获取第`index`个样本的路径
    pub fn get(&self, index: usize) -> Result<&SamplePaths, DataError> {
        self.samples.get(index).ok_or(DataError::IndexOutOfBounds {
            index,
            len: self.samples.len(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &SamplePaths> {
        self.samples.iter()
    }
}

/// 列出`data_root/images`下所有`.png`文件（按路径排序），目录不存在时返回空列表
pub fn enumerate_images(data_root: &Path) -> Result<Vec<PathBuf>, DataError> {
    let image_dir = data_root.join(IMAGE_DIR);
    let pattern = format!(
        "{}/*.png",
        glob::Pattern::escape(&image_dir.to_string_lossy())
    );
    let entries = glob::glob(&pattern)
        .map_err(|e| DataError::Config(format!("无效的图像路径模式`{pattern}`: {e}")))?;

    let mut paths = entries
        .map(|entry| entry.map_err(|e| DataError::IoError(e.into_error())))
        .collect::<Result<Vec<_>, _>>()?;
    paths.sort();
    Ok(paths)
}
