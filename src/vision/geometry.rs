//! 基于`ndarray`的几何变换核心
//!
//! 所有函数都作用在`[H, W, C]`布局的3维数组上（标签图可先扩成`[H, W, 1]`），
//! 且都不修改输入，而是返回新分配的数组。

use ndarray::{Array3, ArrayView3, s};
use num_traits::Zero;

/// 区域平均（area）插值的缩放，适用于图像
///
/// 每个目标像素对应源图中一个大小为`(src_h/dst_h, src_w/dst_w)`的矩形，
/// 其值为该矩形覆盖到的源像素按覆盖面积加权的平均值。尺寸不变时结果与输入完全一致。
pub fn resize_area(src: ArrayView3<f32>, dst_h: usize, dst_w: usize) -> Array3<f32> {
    let (src_h, src_w, channels) = src.dim();
    assert!(dst_h > 0 && dst_w > 0, "缩放后的尺寸必须大于0");
    assert!(src_h > 0 && src_w > 0, "源图像尺寸必须大于0");

    let rows = area_weights(src_h, dst_h);
    let cols = area_weights(src_w, dst_w);

    let mut out = Array3::<f32>::zeros((dst_h, dst_w, channels));
    let mut acc = vec![0f64; channels];
    for (oy, row_weights) in rows.iter().enumerate() {
        for (ox, col_weights) in cols.iter().enumerate() {
            acc.iter_mut().for_each(|a| *a = 0.);
            let mut total = 0f64;
            for &(iy, wy) in row_weights {
                for &(ix, wx) in col_weights {
                    let w = wy * wx;
                    total += w;
                    for (c, a) in acc.iter_mut().enumerate() {
                        *a += w * src[[iy, ix, c]] as f64;
                    }
                }
            }
            for (c, a) in acc.iter().enumerate() {
                out[[oy, ox, c]] = (a / total) as f32;
            }
        }
    }
    out
}

/// 计算一维上每个目标位置覆盖的源下标及其覆盖长度
fn area_weights(src_len: usize, dst_len: usize) -> Vec<Vec<(usize, f64)>> {
    let scale = src_len as f64 / dst_len as f64;
    (0..dst_len)
        .map(|o| {
            let start = o as f64 * scale;
            let end = (o + 1) as f64 * scale;
            let first = start.floor() as usize;
            let last = (end.ceil() as usize).min(src_len);
            (first..last)
                .filter_map(|i| {
                    let overlap = end.min((i + 1) as f64) - start.max(i as f64);
                    (overlap > 0.).then_some((i, overlap))
                })
                .collect()
        })
        .collect()
}

/// 最近邻插值的缩放，适用于标签图（不会产生新的类别值）
///
/// 目标下标`o`对应源下标`floor(o * src / dst)`。
pub fn resize_nearest<T: Copy + Zero>(src: ArrayView3<T>, dst_h: usize, dst_w: usize) -> Array3<T> {
    let (src_h, src_w, channels) = src.dim();
    assert!(dst_h > 0 && dst_w > 0, "缩放后的尺寸必须大于0");
    assert!(src_h > 0 && src_w > 0, "源图像尺寸必须大于0");

    Array3::from_shape_fn((dst_h, dst_w, channels), |(oy, ox, c)| {
        let iy = (oy * src_h / dst_h).min(src_h - 1);
        let ix = (ox * src_w / dst_w).min(src_w - 1);
        src[[iy, ix, c]]
    })
}

/// 以常数0在四周填充
pub fn pad_constant<T: Copy + Zero>(
    src: ArrayView3<T>,
    top: usize,
    bottom: usize,
    left: usize,
    right: usize,
) -> Array3<T> {
    let (h, w, channels) = src.dim();
    let mut out = Array3::<T>::zeros((top + h + bottom, left + w + right, channels));
    out.slice_mut(s![top..top + h, left..left + w, ..]).assign(&src);
    out
}

/// 将较小的数组居中填充到`(dst_h, dst_w)`
///
/// 差值为奇数时多出的一个像素放在上方/左侧：`top = ceil(dh/2)`，`bottom = floor(dh/2)`。
pub fn pad_to<T: Copy + Zero>(src: ArrayView3<T>, dst_h: usize, dst_w: usize) -> Array3<T> {
    let (h, w, _) = src.dim();
    assert!(h <= dst_h && w <= dst_w, "填充的目标尺寸不能小于原尺寸");
    let (top, bottom) = split_deficit(dst_h - h);
    let (left, right) = split_deficit(dst_w - w);
    pad_constant(src, top, bottom, left, right)
}

/// 把差值拆分成（上/左，下/右）两份，奇数时前者多1
pub fn split_deficit(deficit: usize) -> (usize, usize) {
    (deficit.div_ceil(2), deficit / 2)
}

/// 从`(top, left)`开始裁剪出`(h, w)`大小的窗口
pub fn crop<T: Copy>(src: ArrayView3<T>, top: usize, left: usize, h: usize, w: usize) -> Array3<T> {
    let (src_h, src_w, _) = src.dim();
    assert!(
        top + h <= src_h && left + w <= src_w,
        "裁剪窗口超出了图像范围"
    );
    src.slice(s![top..top + h, left..left + w, ..]).to_owned()
}

/// 绕图像中心旋转时“目标像素 -> 源像素”的坐标映射
///
/// 中心取`((W-1)/2, (H-1)/2)`，角度为正时逆时针旋转，画布尺寸不变。
#[derive(Debug, Clone, Copy)]
struct RotationMap {
    cx: f64,
    cy: f64,
    cos: f64,
    sin: f64,
}

impl RotationMap {
    fn new(h: usize, w: usize, angle_deg: f64) -> Self {
        let theta = angle_deg.to_radians();
        Self {
            cx: (w as f64 - 1.) / 2.,
            cy: (h as f64 - 1.) / 2.,
            cos: theta.cos(),
            sin: theta.sin(),
        }
    }

    /// 输入目标坐标`(y, x)`，返回源坐标`(sy, sx)`
    fn source(&self, y: usize, x: usize) -> (f64, f64) {
        let dx = x as f64 - self.cx;
        let dy = y as f64 - self.cy;
        let sx = self.cos * dx - self.sin * dy + self.cx;
        let sy = self.sin * dx + self.cos * dy + self.cy;
        (sy, sx)
    }
}

/// 最近邻旋转，越界处填0。用于标签图，输出中只会出现输入中已有的值（或0）
pub fn rotate_nearest<T: Copy + Zero>(src: ArrayView3<T>, angle_deg: f64) -> Array3<T> {
    let (h, w, channels) = src.dim();
    let map = RotationMap::new(h, w, angle_deg);

    let mut out = Array3::<T>::zeros((h, w, channels));
    for y in 0..h {
        for x in 0..w {
            let (sy, sx) = map.source(y, x);
            let (iy, ix) = (sy.round(), sx.round());
            if iy < 0. || ix < 0. || iy >= h as f64 || ix >= w as f64 {
                continue;
            }
            let (iy, ix) = (iy as usize, ix as usize);
            for c in 0..channels {
                out[[y, x, c]] = src[[iy, ix, c]];
            }
        }
    }
    out
}

/// 双线性旋转，越界的邻居按0参与插值，不做任何数值范围的重新缩放。用于图像
pub fn rotate_bilinear(src: ArrayView3<f32>, angle_deg: f64) -> Array3<f32> {
    let (h, w, channels) = src.dim();
    let map = RotationMap::new(h, w, angle_deg);

    let fetch = |iy: i64, ix: i64, c: usize| -> f64 {
        if iy < 0 || ix < 0 || iy >= h as i64 || ix >= w as i64 {
            0.
        } else {
            src[[iy as usize, ix as usize, c]] as f64
        }
    };

    let mut out = Array3::<f32>::zeros((h, w, channels));
    for y in 0..h {
        for x in 0..w {
            let (sy, sx) = map.source(y, x);
            // 完全落在画布外（连邻居都不存在）
            if sy <= -1. || sx <= -1. || sy >= h as f64 || sx >= w as f64 {
                continue;
            }
            let (y0, x0) = (sy.floor(), sx.floor());
            let (fy, fx) = (sy - y0, sx - x0);
            let (y0, x0) = (y0 as i64, x0 as i64);
            for c in 0..channels {
                let top = fetch(y0, x0, c) * (1. - fx) + fetch(y0, x0 + 1, c) * fx;
                let bottom = fetch(y0 + 1, x0, c) * (1. - fx) + fetch(y0 + 1, x0 + 1, c) * fx;
                out[[y, x, c]] = (top * (1. - fy) + bottom * fy) as f32;
            }
        }
    }
    out
}
