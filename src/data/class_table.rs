/*
 * @Author       : 老董
 * @Date         : 2025-03-03
 * @Description  : 颜色编码标签的解码（颜色 -> trainId）
 *
 * 解码规则：
 * - 逐像素按RGB三元组精确匹配颜色表（不是“最近颜色”）；
 * - 匹配到未被忽略的条目时写入其trainId；
 * - 匹配到被忽略的条目、与被忽略条目同trainId的条目，或者没有任何条目匹配时，保持0（背景）。
 *   注意：有损缩放等操作产生的“中间色”会因此被静默地解码为背景，这是已知行为而非错误。
 */

use std::collections::{HashMap, HashSet};

use ndarray::{Array2, ArrayView3};
use serde::{Deserialize, Serialize};

use super::error::DataError;

/// 颜色表中的一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub name: String,
    /// RGB颜色
    pub color: [u8; 3],
    /// 训练用的稠密类别编号；被忽略的条目可以是任意值（如255、-1）
    pub train_id: i32,
    #[serde(default)]
    pub ignored: bool,
}

impl ClassEntry {
    pub fn new(name: &str, color: [u8; 3], train_id: i32, ignored: bool) -> Self {
        Self {
            name: name.to_string(),
            color,
            train_id,
            ignored,
        }
    }
}

/// 有序的颜色表，构造后不可变
#[derive(Debug, Clone)]
pub struct ClassTable {
    entries: Vec<ClassEntry>,
    lookup: HashMap<[u8; 3], u8>,
}

impl ClassTable {
    /// 由条目列表构建颜色表
    ///
    /// 颜色必须唯一；未被忽略的条目其trainId必须在[0, 255]内。
    /// 被忽略条目用到的trainId整体不出现在解码结果中，与之同号的其它颜色也解码为0。
    pub fn new(entries: Vec<ClassEntry>) -> Result<Self, DataError> {
        let ignored_ids = entries
            .iter()
            .filter(|entry| entry.ignored)
            .map(|entry| entry.train_id)
            .collect::<HashSet<_>>();
        let mut seen = HashMap::with_capacity(entries.len());
        let mut lookup = HashMap::with_capacity(entries.len());
        for entry in &entries {
            if let Some(previous) = seen.insert(entry.color, entry.name.as_str()) {
                return Err(DataError::Config(format!(
                    "颜色{:?}同时出现在类别`{}`和`{}`中",
                    entry.color, previous, entry.name
                )));
            }
            if entry.ignored {
                continue;
            }
            let train_id = u8::try_from(entry.train_id).map_err(|_| {
                DataError::Config(format!(
                    "类别`{}`的trainId {}超出了[0, 255]",
                    entry.name, entry.train_id
                ))
            })?;
            if !ignored_ids.contains(&entry.train_id) {
                lookup.insert(entry.color, train_id);
            }
        }
        Ok(Self { entries, lookup })
    }

    /// 灰度恒等颜色表：`(k, k, k) -> k`，`k`取`0..num_classes`
    ///
    /// 用已解码的类别图（扩成3通道）过一遍该表，结果不变。
    pub fn identity(num_classes: usize) -> Result<Self, DataError> {
        if num_classes == 0 || num_classes > 256 {
            return Err(DataError::Config(format!(
                "恒等颜色表的类别数须在[1, 256]内，实际为{num_classes}"
            )));
        }
        let entries = (0..num_classes)
            .map(|k| {
                let v = k as u8;
                ClassEntry::new(&format!("class_{k}"), [v, v, v], k as i32, false)
            })
            .collect();
        Self::new(entries)
    }

    /// 内置的Cityscapes/GTA调色板（19个训练类别，其余颜色被忽略）
    ///
    /// 原始调色板中有几组颜色重复（如多个类别都是黑色），这里每种颜色只保留一项。
    pub fn cityscapes() -> Self {
        let entries = CITYSCAPES_PALETTE
            .iter()
            .map(|&(name, color, train_id)| ClassEntry::new(name, color, train_id, train_id == 255))
            .collect::<Vec<_>>();
        // 内置表的颜色唯一，未忽略的trainId都在0..19内
        let lookup = CITYSCAPES_PALETTE
            .iter()
            .filter(|(_, _, train_id)| *train_id != 255)
            .map(|&(_, color, train_id)| (color, train_id as u8))
            .collect();
        Self { entries, lookup }
    }

    /// 把trainId属于`ignored`的条目都标记为忽略
    pub fn with_ignored_train_ids(self, ignored: &[i32]) -> Result<Self, DataError> {
        let entries = self
            .entries
            .into_iter()
            .map(|mut entry| {
                if ignored.contains(&entry.train_id) {
                    entry.ignored = true;
                }
                entry
            })
            .collect();
        Self::new(entries)
    }

    pub fn entries(&self) -> &[ClassEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 未被忽略的条目所用到的最大trainId
    pub fn max_train_id(&self) -> Option<u8> {
        self.lookup.values().copied().max()
    }

    /// 不同的（未被忽略的）trainId个数
    pub fn num_train_classes(&self) -> usize {
        let mut ids = self.lookup.values().copied().collect::<Vec<_>>();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    /// 查询单个颜色的trainId，未匹配或被忽略时返回0
    pub fn train_id_of(&self, color: [u8; 3]) -> u8 {
        self.lookup.get(&color).copied().unwrap_or(0)
    }

    /// 将`[H, W, 3]`的颜色编码标签图解码为`[H, W]`的类别图
    pub fn decode(&self, raw: ArrayView3<u8>) -> Result<Array2<u8>, DataError> {
        let (height, width, channels) = raw.dim();
        if channels != 3 {
            return Err(DataError::ChannelMismatch {
                expected: 3,
                got: channels,
            });
        }
        Ok(Array2::from_shape_fn((height, width), |(y, x)| {
            self.train_id_of([raw[[y, x, 0]], raw[[y, x, 1]], raw[[y, x, 2]]])
        }))
    }
}

/// (名称, RGB颜色, trainId)，trainId为255的条目被忽略
const CITYSCAPES_PALETTE: [(&str, [u8; 3], i32); 29] = [
    ("unlabeled", [0, 0, 0], 255),
    ("dynamic", [111, 74, 0], 255),
    ("ground", [81, 0, 81], 255),
    ("road", [128, 64, 128], 0),
    ("sidewalk", [244, 35, 232], 1),
    ("parking", [250, 170, 160], 255),
    ("rail track", [230, 150, 140], 255),
    ("building", [70, 70, 70], 2),
    ("wall", [102, 102, 156], 3),
    ("fence", [190, 153, 153], 4),
    ("guard rail", [180, 165, 180], 255),
    ("bridge", [150, 100, 100], 255),
    ("tunnel", [150, 120, 90], 255),
    ("pole", [153, 153, 153], 5),
    ("traffic light", [250, 170, 30], 6),
    ("traffic sign", [220, 220, 0], 7),
    ("vegetation", [107, 142, 35], 8),
    ("terrain", [152, 251, 152], 9),
    ("sky", [70, 130, 180], 10),
    ("person", [220, 20, 60], 11),
    ("rider", [255, 0, 0], 12),
    ("car", [0, 0, 142], 13),
    ("truck", [0, 0, 70], 14),
    ("bus", [0, 60, 100], 15),
    ("caravan", [0, 0, 90], 255),
    ("trailer", [0, 0, 110], 255),
    ("train", [0, 80, 100], 16),
    ("motorcycle", [0, 0, 230], 17),
    ("bicycle", [119, 11, 32], 18),
];
